//! Prompt builder.

use serde::{Deserialize, Serialize};

/// Advice given to one regeneration: canned picks plus an optional free note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceSet {
    pub canned: Vec<String>,
    pub note: Option<String>,
}

impl AdviceSet {
    /// Create an advice set.
    #[must_use]
    pub const fn new(canned: Vec<String>, note: Option<String>) -> Self {
        Self { canned, note }
    }

    /// Canned items then the note, joined with ", ". Blank entries are dropped.
    #[must_use]
    pub fn combined(&self) -> String {
        self.canned
            .iter()
            .map(String::as_str)
            .chain(self.note.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether there is no usable advice.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combined().is_empty()
    }
}

fn rules(char_limit: u32) -> String {
    format!(
        "# Rules\n\
         - Write exactly one social media post, in character.\n\
         - The post must be at most {char_limit} characters long. This is a hard limit.\n\
         - Never reveal or hint that the text was written by an AI.\n\
         - Do not use hashtags.\n\
         - Output only the post text."
    )
}

/// Prompt for a new draft about a situation.
#[must_use]
pub fn fresh_draft(sheet: &str, situation: &str, char_limit: u32) -> String {
    format!(
        "# Persona\n{sheet}\n# Situation\n{situation}\n\n{}",
        rules(char_limit)
    )
}

/// Prompt for rewriting an existing draft following operator advice.
#[must_use]
pub fn regeneration(
    sheet: &str,
    theme: &str,
    previous_content: &str,
    advice: &AdviceSet,
    char_limit: u32,
) -> String {
    format!(
        "# Persona\n{sheet}\n# Situation\n{theme}\n\n\
         # Previous post\n{previous_content}\n\n\
         # Advice\n{}\n\n\
         Rewrite the previous post following the advice.\n\n{}",
        advice.combined(),
        rules(char_limit)
    )
}

/// Prompt for a campaign post written by one persona.
#[must_use]
pub fn campaign(sheet: &str, instruction: &str, char_limit: u32) -> String {
    format!(
        "# Persona\n{sheet}\n# Campaign instruction\n{instruction}\n\n\
         Write a post that follows the campaign instruction in this persona's own voice.\n\n{}",
        rules(char_limit)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_drops_blank_entries() {
        let advice = AdviceSet::new(
            vec!["shorter".to_string(), "  ".to_string(), "more emoji".to_string()],
            Some("mention the rain".to_string()),
        );
        assert_eq!(advice.combined(), "shorter, more emoji, mention the rain");

        let blank = AdviceSet::new(vec![String::new()], Some(" ".to_string()));
        assert_eq!(blank.combined(), "");
        assert!(blank.is_empty());
    }

    #[test]
    fn test_every_prompt_states_the_limit_and_bans() {
        let advice = AdviceSet::new(vec!["warmer".to_string()], None);
        for prompt in [
            fresh_draft("SHEET", "rainy night", 140),
            regeneration("SHEET", "rainy night", "old text", &advice, 140),
            campaign("SHEET", "new menu launch", 140),
        ] {
            assert!(prompt.starts_with("# Persona\nSHEET"));
            assert!(prompt.contains("at most 140 characters"));
            assert!(prompt.contains("AI"));
            assert!(prompt.contains("hashtags"));
        }
    }

    #[test]
    fn test_regeneration_carries_previous_text_and_advice() {
        let advice = AdviceSet::new(vec!["warmer".to_string()], Some("say hi".to_string()));
        let prompt = regeneration("S", "theme", "old text", &advice, 80);
        assert!(prompt.contains("# Previous post\nold text"));
        assert!(prompt.contains("# Advice\nwarmer, say hi"));
        assert!(prompt.contains("# Situation\ntheme"));
    }
}
