//! Credential handling

pub mod credential;
