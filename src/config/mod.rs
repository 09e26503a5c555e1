//! Configuration module for Samtal.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{CompliancePrompts, Prompts, QuerySummaryPrompts};
pub use settings::{
    ChatSettings, EmbeddingSettings, GeneralSettings, LanguageServiceSettings, PromptSettings,
    SearchSettings, Settings, SpeechSettings, VectorStoreSettings,
};
