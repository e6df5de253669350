//! System-prompt loading.
//!
//! Prompts live in YAML files with a single `system_message` key; the
//! loaded text becomes the transcript's leading system turn.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use apeiron_core::{ApeironError, Result, TranscriptTurn};

#[derive(Debug, Deserialize)]
struct PromptFile {
    #[serde(default)]
    system_message: String,
}

/// Load a system prompt from a YAML file.
///
/// An unreadable file, an empty document, and an empty `system_message`
/// are all hard errors — a silently blank prompt is worse than failing
/// startup.
pub fn load(path: impl AsRef<Path>) -> Result<TranscriptTurn> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ApeironError::Prompt(format!("{}: {e}", path.display())))?;

    let file: PromptFile = serde_yaml::from_str(&raw)
        .map_err(|e| ApeironError::Prompt(format!("{}: {e}", path.display())))?;

    if file.system_message.is_empty() {
        return Err(ApeironError::Prompt(format!(
            "{}: empty system_message",
            path.display()
        )));
    }

    info!(path = %path.display(), chars = file.system_message.len(), "system prompt loaded");
    Ok(TranscriptTurn::system(file.system_message))
}

/// Built-in fallback prompt for a variant with no prompt file configured.
pub fn default_prompt(variant: &str) -> TranscriptTurn {
    TranscriptTurn::system(format!(
        "You are {variant}, a helpful assistant embedded in a chat server. \
         Answer concisely. Use the provided tools to look up channel \
         context before guessing."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use apeiron_core::{Role, TurnContent};

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "apeiron-prompt-{}-{:?}.yaml",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::write(&path, contents).expect("temp write");
        path
    }

    #[test]
    fn loads_system_message() {
        let path = write_temp("system_message: |\n  Stay in character.\n");
        let turn = load(&path).expect("loads");
        std::fs::remove_file(&path).ok();
        assert_eq!(turn.role, Role::System);
        assert_eq!(
            turn.content,
            TurnContent::Text("Stay in character.\n".to_string())
        );
    }

    #[test]
    fn empty_document_is_an_error() {
        let path = write_temp("");
        let result = load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ApeironError::Prompt(_))));
    }

    #[test]
    fn empty_system_message_is_an_error() {
        let path = write_temp("system_message: \"\"\n");
        let result = load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ApeironError::Prompt(_))));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(matches!(
            load("/nonexistent/prompt.yaml"),
            Err(ApeironError::Prompt(_))
        ));
    }
}
