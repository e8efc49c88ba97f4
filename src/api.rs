//! Host-facing surface of the library.
//!
//! A shell (desktop webview bridge, CLI, test harness) owns an
//! [`AppState`](crate::AppState) and forwards UI calls to `commands`.

pub mod commands;
