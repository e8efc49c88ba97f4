//! Core logic: transcript, request lifecycle and the provider boundary.

pub mod features;
pub mod lifecycle;
pub mod notifications;
pub mod provider;
pub mod security;
pub mod transcript;
