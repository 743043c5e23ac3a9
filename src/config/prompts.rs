//! Prompt templates for Waypoint.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub router: RouterPrompts,
    pub rag: RagPrompts,
    pub assistant: AssistantPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompt for intent classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterPrompts {
    pub user: String,
}

impl Default for RouterPrompts {
    fn default() -> Self {
        Self {
            user: r#"You are a routing agent.

Return EXACTLY one word:
- weather → real-time weather (today, tomorrow, temperature, rain)
- rag → explanations, climate, definitions, concepts

Question: {{question}}

Answer:"#
                .to_string(),
        }
    }
}

/// Prompt for document-grounded answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub user: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            user: r#"Use the context below to answer the question.

Context:
{{context}}

Question:
{{question}}"#
                .to_string(),
        }
    }
}

/// Prompts for the tool-calling assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantPrompts {
    pub user: String,
}

impl Default for AssistantPrompts {
    fn default() -> Self {
        Self {
            user: r#"You are a helpful travel assistant.
Use tools when appropriate.

User question: {{question}}
City (if provided): {{city}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let router_path = custom_path.join("router.toml");
            if router_path.exists() {
                let content = std::fs::read_to_string(&router_path)?;
                prompts.router = toml::from_str(&content)?;
            }

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }

            let assistant_path = custom_path.join("assistant.toml");
            if assistant_path.exists() {
                let content = std::fs::read_to_string(&assistant_path)?;
                prompts.assistant = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are filled in one left-to-right pass, so substituted
    /// values are never rescanned. Unknown placeholders are left as-is.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                result.push_str(&rest[start..]);
                return result;
            };

            match vars.get(&after_open[..end]) {
                Some(value) => result.push_str(value),
                None => result.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after_open[end + 2..];
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
