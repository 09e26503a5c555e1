//! Compliance question assembly.
//!
//! The compliance check sends the model a fixed set of yes/no questions:
//! vulgarity is always asked; the recording-notice and topic-relevance
//! questions are included only when the caller requests them. The answer
//! comes back as free text and is best-effort, not a guaranteed boolean.

use crate::config::Prompts;
use std::collections::HashMap;

/// Caller-selected compliance checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ComplianceFlags {
    /// Ask whether the caller was told the call is recorded.
    pub requires_recording_notice: bool,
    /// Ask whether the call stayed on topic for the business.
    pub requires_topic_relevance: bool,
}

/// Render the compliance system prompt for the given flags.
pub fn build_compliance_prompt(prompts: &Prompts, flags: ComplianceFlags) -> String {
    let recording_question = if flags.requires_recording_notice {
        "2. Was the caller aware that the call was being recorded?"
    } else {
        ""
    };
    let relevance_question = if flags.requires_topic_relevance {
        "3. Was the call relevant to the hotel and resort industry?"
    } else {
        ""
    };

    let mut vars = HashMap::new();
    vars.insert(
        "recording_question".to_string(),
        recording_question.to_string(),
    );
    vars.insert(
        "relevance_question".to_string(),
        relevance_question.to_string(),
    );

    Prompts::render(&prompts.compliance.system, &vars)
}
