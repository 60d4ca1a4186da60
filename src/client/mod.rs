//! Provider client for the Gemini API.
//!
//! [`ProviderClient`] is the seam between the gateway and the remote service;
//! [`GeminiProviderClient`] implements it over HTTP and
//! [`HttpProviderClientFactory`] builds one per credential.

mod client;
mod traits;
mod validation;

pub use client::{check_safety_blocks, extract_text, GeminiProviderClient, HttpProviderClientFactory};
pub use traits::{ProviderClient, ProviderClientFactory};
pub use validation::{validate_generate_request, validate_generation_config};
