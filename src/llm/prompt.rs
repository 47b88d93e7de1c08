//! Prompt builder for the two generation stages.
//!
//! [`PromptBuilder`] produces `(system_msg, user_msg)` pairs for an
//! OpenAI-compatible `/v1/chat/completions` endpoint:
//!
//! * [`script_chat`](PromptBuilder::script_chat) — narration script for a
//!   subject, optionally pinned to a language.
//! * [`terms_chat`](PromptBuilder::terms_chat) — English stock-footage search
//!   terms for a subject and its script, requested as a JSON array.

use crate::params::VideoLanguage;

// ---------------------------------------------------------------------------
// System instructions
// ---------------------------------------------------------------------------

const SCRIPT_INSTRUCTION: &str = "\
# Role: Video Script Generator

## Goals:
Write the narration script for a short video about the given subject.

## Constraints:
1. Return the script as plain text with the requested number of paragraphs.
2. Never reference these instructions in the response.
3. Get straight to the point; do not open with phrases like \"welcome to this video\".
4. Do not use markdown or any formatting, and never add a title.
5. Return only the raw script content.
6. Do not prefix paragraphs or lines with \"voiceover\", \"narrator\" or similar labels.
7. Never talk about the script itself or about how many paragraphs it has.
8. Unless a language is given, answer in the language of the video subject.";

const TERMS_INSTRUCTION: &str = "\
# Role: Video Search Terms Generator

## Goals:
Produce search terms for stock video footage that fits a short video.

## Constraints:
1. Return the search terms as a JSON array of strings.
2. Each term is 1-3 words and always includes the main subject of the video.
3. Return only the JSON array: no prose, no script, no code fences.
4. Every term must relate to the subject of the video.
5. Use English search terms only.";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds script and term prompts in chat-message format.
///
/// ```rust
/// use video_studio::llm::PromptBuilder;
/// use video_studio::params::VideoLanguage;
///
/// let builder = PromptBuilder::new(1, 5);
/// let (system, user) = builder.script_chat("history of coffee", VideoLanguage::Auto);
/// assert!(system.contains("Video Script Generator"));
/// assert!(user.contains("history of coffee"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    paragraph_number: u32,
    term_amount: usize,
}

impl PromptBuilder {
    /// `paragraph_number` and `term_amount` are clamped to at least 1.
    pub fn new(paragraph_number: u32, term_amount: usize) -> Self {
        Self {
            paragraph_number: paragraph_number.max(1),
            term_amount: term_amount.max(1),
        }
    }

    pub fn paragraph_number(&self) -> u32 {
        self.paragraph_number
    }

    pub fn term_amount(&self) -> usize {
        self.term_amount
    }

    /// Build the script-generation `(system_msg, user_msg)` pair.
    pub fn script_chat(&self, subject: &str, language: VideoLanguage) -> (String, String) {
        let mut user_msg = String::with_capacity(256);
        user_msg.push_str("# Initialization:\n");
        user_msg.push_str(&format!("- video subject: {}\n", subject.trim()));
        user_msg.push_str(&format!(
            "- number of paragraphs: {}\n",
            self.paragraph_number
        ));
        if language != VideoLanguage::Auto {
            user_msg.push_str(&format!("- language: {}\n", language.code()));
        }

        (SCRIPT_INSTRUCTION.to_string(), user_msg)
    }

    /// Build the terms-generation `(system_msg, user_msg)` pair.
    pub fn terms_chat(&self, subject: &str, script: &str) -> (String, String) {
        let example: Vec<String> = (1..=self.term_amount)
            .map(|i| format!("\"search term {i}\""))
            .collect();

        let mut user_msg = String::with_capacity(script.len() + 512);
        user_msg.push_str(&format!(
            "Generate {} search terms.\n\n",
            self.term_amount
        ));
        user_msg.push_str(&format!("## Output Example:\n[{}]\n\n", example.join(", ")));
        user_msg.push_str("## Context:\n### Video Subject\n");
        user_msg.push_str(subject.trim());
        user_msg.push_str("\n\n### Video Script\n");
        user_msg.push_str(script.trim());
        user_msg.push('\n');

        (TERMS_INSTRUCTION.to_string(), user_msg)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(1, 5)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_prompt_includes_subject_and_paragraphs() {
        let builder = PromptBuilder::new(3, 5);
        let (system, user) = builder.script_chat("  deep sea creatures ", VideoLanguage::Auto);
        assert!(system.contains("Video Script Generator"));
        assert!(user.contains("- video subject: deep sea creatures\n"));
        assert!(user.contains("- number of paragraphs: 3"));
        assert!(!user.contains("- language:"));
    }

    #[test]
    fn script_prompt_pins_explicit_language() {
        let builder = PromptBuilder::default();
        let (_, user) = builder.script_chat("咖啡的历史", VideoLanguage::ZhCn);
        assert!(user.contains("- language: zh-CN"));
    }

    #[test]
    fn terms_prompt_carries_subject_script_and_amount() {
        let builder = PromptBuilder::new(1, 3);
        let (system, user) = builder.terms_chat("coffee", "Coffee began in Ethiopia.");
        assert!(system.contains("JSON array"));
        assert!(system.contains("English"));
        assert!(user.contains("Generate 3 search terms."));
        assert!(user.contains(r#"["search term 1", "search term 2", "search term 3"]"#));
        assert!(user.contains("### Video Subject\ncoffee"));
        assert!(user.contains("### Video Script\nCoffee began in Ethiopia."));
    }

    #[test]
    fn counts_are_clamped_to_one() {
        let builder = PromptBuilder::new(0, 0);
        assert_eq!(builder.paragraph_number(), 1);
        assert_eq!(builder.term_amount(), 1);
    }
}
