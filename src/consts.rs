//! Project-wide constants.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Input file used when none is given on the command line.
pub const DEFAULT_INPUT: &str = "subtitles.txt";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// Environment variable naming the model, for any provider.
pub const MODEL_ENV: &str = "AI_MODEL_ID";

/// Environment variable naming the provider.
pub const PROVIDER_ENV: &str = "GLOSSA_PROVIDER";

/// Seconds to wait for one model reply.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Largest input accepted, in characters.
///
/// Bounded by the reply, not the context window: each word comes back as a
/// JSON object of 15-20 output tokens, and output is capped near 8k tokens.
/// That is about 450 words, or roughly 3 000 characters of English prose.
/// Raise it with `--max-chars` for models with a larger output budget.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 3_000;

/// Default settings database: `~/.glossa/glossa.db`.
pub fn default_db_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".glossa").join("glossa.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        assert!(DEFAULT_TIMEOUT_SECS > 0);
        assert!(DEFAULT_MAX_INPUT_CHARS > 0);
        assert!(!DEFAULT_OPENAI_MODEL.is_empty());
        assert!(!DEFAULT_ANTHROPIC_MODEL.is_empty());
    }

    #[test]
    fn default_db_path_is_under_dot_glossa() {
        if let Ok(path) = default_db_path() {
            assert!(path.ends_with(".glossa/glossa.db"));
        }
    }
}
