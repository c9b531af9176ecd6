/// MedAssist Rust SDK
///
/// Typed client for the MedAssist triage API.

pub mod client;
pub mod types;

pub use client::MedAssistClient;
pub use types::*;
