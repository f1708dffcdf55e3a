// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly from the persona material files.
//!
//! Each file is plain text with one item per line. The persona file is read
//! whole and becomes the request instructions.

use std::path::Path;

use kibitz_core::{GenerationRequest, PromptContext};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

/// Phrases sampled into each prompt.
pub const MAX_PHRASES: usize = 5;

/// Message type used when no types file is available.
pub const DEFAULT_MESSAGE_TYPE: &str = "random thought";

const REPLY_INSTRUCTIONS: &str = "This message is a reply to another message. \
Agree or disagree with it based on the stances you have taken on the topic. \
If someone is nice to you and there is nothing to disagree with, be nice back.";

/// Persona material loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptMaterial {
    pub persona: String,
    pub phrases: Vec<String>,
    pub message_types: Vec<String>,
    pub stances: Vec<String>,
}

/// Instructions and input for one Responses API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltPrompt {
    pub instructions: String,
    pub input: String,
}

impl PromptMaterial {
    /// Loads the material files. Missing or unreadable files yield empty values.
    ///
    /// When no persona file is available, a minimal persona named `name` is used.
    pub async fn load(
        name: &str,
        persona_file: Option<&str>,
        phrases_file: Option<&str>,
        message_types_file: Option<&str>,
        stances_file: Option<&str>,
    ) -> Self {
        let persona = match persona_file {
            Some(path) => read_optional(path).await.unwrap_or_default(),
            None => String::new(),
        };
        let persona = if persona.trim().is_empty() {
            default_persona(name)
        } else {
            persona.trim().to_string()
        };

        let material = Self {
            persona,
            phrases: load_lines("phrases", phrases_file).await,
            message_types: load_lines("message types", message_types_file).await,
            stances: load_lines("stances", stances_file).await,
        };
        debug!(
            phrases = material.phrases.len(),
            message_types = material.message_types.len(),
            stances = material.stances.len(),
            "prompt material loaded"
        );
        material
    }

    /// Builds the prompt for `request` using `rng` for phrase and type selection.
    pub fn build<R: Rng + ?Sized>(&self, request: &GenerationRequest, rng: &mut R) -> BuiltPrompt {
        let message_type = match &request.context {
            PromptContext::Reply { original_text, .. } => {
                format!("reply to this message: {original_text}")
            }
            PromptContext::Introduction { prompt } => format!("introduction: {prompt}"),
            PromptContext::Random | PromptContext::Manual => self
                .message_types
                .choose(&mut *rng)
                .cloned()
                .unwrap_or_else(|| DEFAULT_MESSAGE_TYPE.to_string()),
        };
        let is_reply = matches!(request.context, PromptContext::Reply { .. });

        let mut input = String::new();
        let phrases: Vec<&String> = self
            .phrases
            .choose_multiple(&mut *rng, MAX_PHRASES.min(self.phrases.len()))
            .collect();
        if !phrases.is_empty() {
            input.push_str("Here are some phrases you use:\n");
            for phrase in phrases {
                input.push_str(phrase);
                input.push('\n');
            }
            input.push('\n');
        }
        if is_reply && !self.stances.is_empty() {
            input.push_str("Here are some stances you have taken on various topics:\n");
            for stance in &self.stances {
                input.push_str(stance);
                input.push('\n');
            }
            input.push('\n');
        }
        input.push_str("Here is the kind of message to write:\n");
        input.push_str(&message_type);
        input.push_str(
            "\n\nGenerate a message you would say, based on the message type. \
Only give the message, no explanations.",
        );

        let mut instructions = self.persona.clone();
        if is_reply {
            instructions.push_str("\n\n");
            instructions.push_str(REPLY_INSTRUCTIONS);
        }

        BuiltPrompt {
            instructions,
            input,
        }
    }
}

fn default_persona(name: &str) -> String {
    format!(
        "You are {name}, a regular member of a group chat. Keep messages under \
3 sentences. No emojis. Never explain the joke or give context."
    )
}

async fn read_optional(path: &str) -> Option<String> {
    match tokio::fs::read_to_string(Path::new(path)).await {
        Ok(content) => Some(content),
        Err(e) => {
            warn!(path, error = %e, "prompt file not readable, using empty content");
            None
        }
    }
}

async fn load_lines(what: &str, path: Option<&str>) -> Vec<String> {
    let Some(path) = path else {
        warn!(file = what, "no file configured, using empty list");
        return Vec::new();
    };
    read_optional(path)
        .await
        .map(|content| split_lines(&content))
        .unwrap_or_default()
}

/// Trimmed non-empty lines.
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn material() -> PromptMaterial {
        PromptMaterial {
            persona: "You are Keller.".into(),
            phrases: (1..=8).map(|i| format!("phrase {i}")).collect(),
            message_types: vec!["hype the tailgate".into()],
            stances: vec!["loves the lawn".into()],
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn random_prompt_samples_at_most_five_phrases() {
        let prompt = material().build(&PromptContext::Random.into(), &mut rng());
        let count = prompt.input.matches("phrase ").count();
        assert_eq!(count, MAX_PHRASES);
        assert!(prompt.input.contains("hype the tailgate"));
        assert!(!prompt.input.contains("stances"));
        assert_eq!(prompt.instructions, "You are Keller.");
    }

    #[test]
    fn reply_prompt_carries_original_text_and_stances() {
        let request = PromptContext::Reply {
            original_text: "who's going to class".into(),
            username: "Sam".into(),
        }
        .into();
        let prompt = material().build(&request, &mut rng());
        assert!(prompt.input.contains("reply to this message: who's going to class"));
        assert!(prompt.input.contains("loves the lawn"));
        assert!(prompt.instructions.contains("reply to another message"));
    }

    #[test]
    fn introduction_uses_operator_prompt() {
        let request = PromptContext::Introduction {
            prompt: "say hi to the freshmen".into(),
        }
        .into();
        let prompt = material().build(&request, &mut rng());
        assert!(prompt.input.contains("introduction: say hi to the freshmen"));
    }

    #[test]
    fn empty_material_falls_back_to_default_type() {
        let empty = PromptMaterial {
            persona: "p".into(),
            ..Default::default()
        };
        let prompt = empty.build(&PromptContext::Manual.into(), &mut rng());
        assert!(prompt.input.contains(DEFAULT_MESSAGE_TYPE));
        assert!(!prompt.input.contains("phrases you use"));
    }

    #[test]
    fn split_lines_drops_blanks() {
        assert_eq!(split_lines("a\n\n  b  \n\t\n"), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn load_reads_files_and_tolerates_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        let phrases = dir.path().join("phrases.txt");
        std::fs::write(&phrases, "get drunk\n\nsend it\n").unwrap();
        let missing = dir.path().join("nope.txt");

        let material = PromptMaterial::load(
            "kibitz",
            None,
            phrases.to_str(),
            missing.to_str(),
            None,
        )
        .await;

        assert_eq!(material.phrases, vec!["get drunk", "send it"]);
        assert!(material.message_types.is_empty());
        assert!(material.persona.starts_with("You are kibitz"));
    }
}
