//! Services behind the HTTP handlers

pub mod generative_client;
pub mod normalizer;
pub mod practice_set;

pub use generative_client::{GenerativeError, OpenAiClient, TextGenerator};
pub use normalizer::{normalize, MalformedModelOutput};
pub use practice_set::{build_practice_set, GenerationSettings, PracticeSet, PromptPayload};
