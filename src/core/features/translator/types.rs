use isolang::Language;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::LanguageOption;

/// Translation targets offered out of the box
pub const DEFAULT_TARGET_CODES: &[&str] = &["en", "pt", "es", "ru", "tr", "fr"];

fn lang_code(lang: &Language) -> String {
    lang.to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| lang.to_639_3().to_string())
}

fn parse_language(code: &str) -> Option<Language> {
    let code = code.trim().to_ascii_lowercase();
    Language::from_639_1(code.as_str()).or_else(|| Language::from_639_3(code.as_str()))
}

/// A language text can be translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetLanguage(Language);

impl TargetLanguage {
    /// Accepts ISO 639-1 or 639-3 codes, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        parse_language(code).map(Self)
    }

    pub fn code(&self) -> String {
        lang_code(&self.0)
    }

    /// English name, used in the translation instruction
    pub fn name(&self) -> &'static str {
        self.0.to_name()
    }

    pub fn option(&self) -> LanguageOption {
        LanguageOption {
            code: self.code(),
            name: self.name().to_string(),
        }
    }
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TargetLanguage {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.code())
    }
}

impl<'de> Deserialize<'de> for TargetLanguage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::from_code(&raw).ok_or_else(|| serde::de::Error::custom("invalid target language"))
    }
}

/// The set of languages the translate picker offers, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCatalog {
    languages: Vec<TargetLanguage>,
}

impl LanguageCatalog {
    /// Build from configured codes. Unknown or duplicate codes are skipped.
    pub fn from_codes<S: AsRef<str>>(codes: &[S]) -> Self {
        let mut languages: Vec<TargetLanguage> = Vec::with_capacity(codes.len());
        for code in codes {
            match TargetLanguage::from_code(code.as_ref()) {
                Some(lang) if !languages.contains(&lang) => languages.push(lang),
                Some(_) => {}
                None => warn!(code = code.as_ref(), "Ignoring unknown target language code"),
            }
        }
        Self { languages }
    }

    /// Resolve a code the user picked; it must be part of the catalog.
    pub fn resolve(&self, code: &str) -> AppResult<TargetLanguage> {
        TargetLanguage::from_code(code)
            .filter(|lang| self.languages.contains(lang))
            .ok_or_else(|| {
                AppError::UnsupportedCapability(format!("translation to '{}' is not available", code))
            })
    }

    pub fn options(&self) -> Vec<LanguageOption> {
        self.languages.iter().map(TargetLanguage::option).collect()
    }

    /// First language in display order, if any
    pub fn first(&self) -> Option<TargetLanguage> {
        self.languages.first().copied()
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::from_codes(DEFAULT_TARGET_CODES)
    }
}
