//! Core types for the Gemini API and the gateway's request content.

pub mod content;
pub mod generation;
pub mod safety;

pub use content::{Blob, Content, ContentPart, Part, Role};

pub use generation::{
    BlockReason, Candidate, FinishReason, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, PromptFeedback, UsageMetadata,
};

pub use safety::{HarmCategory, HarmProbability, SafetyRating};
