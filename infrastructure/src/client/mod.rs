//! Model client adapters
//!
//! - [`OpenAiCompatibleClient`]: HTTP client for OpenAI-style chat completion APIs
//! - [`SimulatedModelClient`]: deterministic in-process endpoint

mod openai;
mod simulated;

pub use openai::{DEFAULT_BASE_URL, OpenAiCompatibleClient};
pub use simulated::SimulatedModelClient;
