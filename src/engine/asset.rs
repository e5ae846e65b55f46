//! Engine configuration asset
//!
//! The engine reads a JSON-like configuration blob that may contain `//`
//! and `/* */` comments. Comments are stripped before the text is passed on.

use crate::{BridgeError, Result};
use std::path::PathBuf;
use tracing::debug;

/// Where the engine configuration text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAsset {
    /// Read from disk at every initialization attempt
    File(PathBuf),
    /// Fixed text, mostly for tests and the loopback engine
    Inline(String),
}

impl Default for ConfigAsset {
    fn default() -> Self {
        ConfigAsset::Inline("{}".to_string())
    }
}

impl ConfigAsset {
    /// Read the asset and strip its comments
    pub fn load(&self) -> Result<String> {
        let raw = match self {
            ConfigAsset::File(path) => std::fs::read_to_string(path).map_err(|e| {
                BridgeError::AssetError(format!("Failed to read {}: {}", path.display(), e))
            })?,
            ConfigAsset::Inline(text) => text.clone(),
        };

        let stripped = strip_comments(&raw);
        debug!(
            "Loaded engine config asset ({} bytes, {} after stripping comments)",
            raw.len(),
            stripped.len()
        );
        Ok(stripped)
    }
}

/// Remove `//` line comments and `/* */` block comments.
///
/// Comment markers inside double-quoted strings are kept, so URLs survive.
/// Line comments keep their terminating newline. An unterminated block
/// comment swallows the rest of the input.
pub fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
            }
            _ => out.push(c),
        }
    }

    out
}
