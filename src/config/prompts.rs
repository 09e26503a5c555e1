//! Prompt templates for Samtal.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub compliance: CompliancePrompts,
    pub query_summary: QuerySummaryPrompts,
}

/// Prompts for the compliance check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompliancePrompts {
    pub system: String,
}

impl Default for CompliancePrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an experienced contact center manager for a hotel and resort company, reviewing transcripts of recorded customer calls.

Answer the following questions about the call transcript the user provides. Answer each question you are given with a short justification quoting the transcript where possible.

1. Was there vulgarity on the call?
{{recording_question}}
{{relevance_question}}

If a question cannot be answered from the transcript alone, say so rather than guessing."#
                .to_string(),
        }
    }
}

/// Prompts for the query-oriented summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySummaryPrompts {
    pub system: String,
}

impl Default for QuerySummaryPrompts {
    fn default() -> Self {
        Self {
            system: r#"You summarize customer call transcripts for a hotel and resort company.

Given a call transcript, produce:
- A title of at most five words, labeled call-title
- A summary of at most two sentences, labeled call-summary

Respond with a JSON object containing exactly the keys "call-title" and "call-summary". Do not include any other text."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from defaults, with optional custom directory overrides.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let compliance_path = custom_path.join("compliance.toml");
            if compliance_path.exists() {
                let content = std::fs::read_to_string(&compliance_path)?;
                prompts.compliance = toml::from_str(&content)?;
            }

            let query_summary_path = custom_path.join("query_summary.toml");
            if query_summary_path.exists() {
                let content = std::fs::read_to_string(&query_summary_path)?;
                prompts.query_summary = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.compliance.system.contains("vulgarity"));
        assert!(prompts.query_summary.system.contains("call-summary"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }
}
