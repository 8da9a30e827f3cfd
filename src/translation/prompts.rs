/*!
 * Prompt templates for changelog translation.
 *
 * A full translation and an incremental one share the system prompt and
 * differ only in the instructions preceding the text.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separates the instructions from the text in every user message
pub const PROMPT_TEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Which instruction template a translation call uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// The whole (version-capped) changelog
    Full,
    /// Only the newest entries, to be prepended to an existing translation
    Incremental,
}

impl fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Incremental => write!(f, "incremental"),
        }
    }
}

/// Prompt templates. Placeholders: `{target_language}`, `{product}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplates {
    #[serde(default = "default_system_prompt")]
    pub system: String,
    #[serde(default = "default_full_instructions")]
    pub full: String,
    #[serde(default = "default_incremental_instructions")]
    pub incremental: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            system: default_system_prompt(),
            full: default_full_instructions(),
            incremental: default_incremental_instructions(),
        }
    }
}

impl PromptTemplates {
    fn fill(template: &str, target_language: &str, product: &str) -> String {
        template
            .replace("{target_language}", target_language)
            .replace("{product}", product)
    }

    /// Rendered system prompt
    pub fn system_prompt(&self, target_language: &str, product: &str) -> String {
        Self::fill(&self.system, target_language, product)
    }

    /// Instructions for `mode`, the separator, then the text
    pub fn user_message(&self, mode: TranslationMode, text: &str, target_language: &str, product: &str) -> String {
        let instructions = match mode {
            TranslationMode::Full => &self.full,
            TranslationMode::Incremental => &self.incremental,
        };
        format!(
            "{}{}{}",
            Self::fill(instructions, target_language, product),
            PROMPT_TEXT_SEPARATOR,
            text
        )
    }
}

const FORMAT_RULES: &str = "Additional instructions:
- Keep the Markdown structure intact
- Keep version numbers, dates and command examples exactly as written
- Keep product and platform names ({product}, MCP, GitHub, Windows, macOS, ...) untranslated
- Use the established {target_language} spelling for technical terms";

fn default_system_prompt() -> String {
    "You are a professional technical translator working into {target_language}.

- Produce text a native {target_language} reader finds natural; prefer idiomatic phrasing over literal translation
- Preserve the intent, nuance and tone of the original
- Keep proper nouns in their original form
- Output only the translation, without commentary or a copy of the source text
- Before answering, check that nothing from the source is missing and nothing is mistranslated"
        .to_string()
}

fn default_full_instructions() -> String {
    format!(
        "Translate the following {{product}} changelog (Markdown) into {{target_language}}.\n\n{}",
        FORMAT_RULES
    )
}

fn default_incremental_instructions() -> String {
    format!(
        "The following is the newest section of the {{product}} changelog. Translate it into {{target_language}} so it can be placed at the top of an existing translation.\n\n{}",
        FORMAT_RULES
    )
}
