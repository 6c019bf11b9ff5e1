//! Normalization of user-supplied input: comma lists, tone menu choices,
//! document files and interactive prompts.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Tone requested for a drafted email reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Formal tone (also the fallback for unknown choices)
    #[default]
    Formal,
    /// Friendly tone
    Friendly,
    /// Concise tone
    Concise,
    /// Detailed tone
    Detailed,
}

impl Tone {
    /// Returns all tones in menu order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Formal, Self::Friendly, Self::Concise, Self::Detailed]
    }

    /// Maps a menu key (`"1"`..`"4"`) to a tone, defaulting to [`Tone::Formal`].
    #[must_use]
    pub fn from_choice(choice: &str) -> Self {
        match choice.trim() {
            "1" => Self::Formal,
            "2" => Self::Friendly,
            "3" => Self::Concise,
            "4" => Self::Detailed,
            other => {
                debug!("Unknown tone choice '{}', using formal", other);
                Self::default()
            }
        }
    }

    /// Returns the lower-case word used inside prompts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Friendly => "friendly",
            Self::Concise => "concise",
            Self::Detailed => "detailed",
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Formal => "Formal",
            Self::Friendly => "Friendly",
            Self::Concise => "Concise",
            Self::Detailed => "Detailed",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the numbered tone menu shown before asking for a choice.
#[must_use]
pub fn tone_menu() -> String {
    let mut menu = String::from("Choose the tone of the reply:\n");
    for (i, tone) in Tone::all().iter().enumerate() {
        menu.push_str(&format!("{}. {}\n", i + 1, tone.title()));
    }
    menu
}

/// Splits a comma-separated string into trimmed, non-empty items.
///
/// # Examples
///
/// ```
/// use llm_assist::split_items;
///
/// assert_eq!(
///     split_items("thank customer, provide pricing, , send brochure"),
///     ["thank customer", "provide pricing", "send brochure"]
/// );
/// ```
#[must_use]
pub fn split_items(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Loads a text document, trimming surrounding whitespace.
///
/// A missing or unreadable file is logged and yields an empty string.
#[must_use]
pub fn load_document(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();

    match fs::read_to_string(path) {
        Ok(content) => {
            debug!("Loaded {} bytes from {}", content.len(), path.display());
            content.trim().to_string()
        }
        Err(e) => {
            warn!("Could not read document '{}': {}", path.display(), e);
            String::new()
        }
    }
}

/// Writes `message`, reads one line from `reader` and returns it trimmed.
///
/// # Errors
///
/// Returns an error if writing the prompt or reading the line fails.
pub fn prompt_line<R, W>(reader: &mut R, writer: &mut W, message: &str) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    write!(writer, "{message}").map_err(|e| Error::io("<stdout>", e))?;
    writer.flush().map_err(|e| Error::io("<stdout>", e))?;

    let mut line = String::new();
    reader
        .read_line(&mut line)
        .map_err(|e| Error::io("<stdin>", e))?;

    Ok(line.trim().to_string())
}

/// Reads everything from `reader`, trimming surrounding whitespace.
///
/// # Errors
///
/// Returns an error if reading fails or the input is not UTF-8.
pub fn read_all<R: std::io::Read>(reader: &mut R) -> Result<String> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| Error::io("<stdin>", e))?;
    Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::io::Cursor;

    #[test]
    fn test_split_items() {
        assert_eq!(
            split_items("thank customer, provide pricing, send brochure"),
            ["thank customer", "provide pricing", "send brochure"]
        );
        assert_eq!(split_items(" a, ,b ,"), ["a", "b"]);
        assert!(split_items("").is_empty());
        assert!(split_items(" , ,, ").is_empty());
    }

    #[test]
    fn test_tone_from_choice() {
        assert_eq!(Tone::from_choice("1"), Tone::Formal);
        assert_eq!(Tone::from_choice("2"), Tone::Friendly);
        assert_eq!(Tone::from_choice(" 3 "), Tone::Concise);
        assert_eq!(Tone::from_choice("4"), Tone::Detailed);
    }

    #[test]
    fn test_tone_defaults_to_formal() {
        assert_eq!(Tone::from_choice("9"), Tone::Formal);
        assert_eq!(Tone::from_choice(""), Tone::Formal);
        assert_eq!(Tone::from_choice("friendly"), Tone::Formal);
    }

    #[test]
    fn test_tone_display() {
        assert_eq!(Tone::Detailed.to_string(), "detailed");
        assert_eq!(Tone::Friendly.as_str(), "friendly");
    }

    #[test]
    fn test_tone_menu() {
        let menu = tone_menu();
        assert!(menu.starts_with("Choose the tone of the reply:"));
        assert!(menu.contains("1. Formal"));
        assert!(menu.contains("4. Detailed"));
    }

    #[test]
    fn test_load_document() {
        let temp = assert_fs::TempDir::new().unwrap();
        let doc = temp.child("document.txt");
        doc.write_str("\n  Cells are the basic unit of life.  \n").unwrap();

        assert_eq!(load_document(doc.path()), "Cells are the basic unit of life.");
    }

    #[test]
    fn test_load_missing_document_is_empty() {
        let temp = assert_fs::TempDir::new().unwrap();
        assert_eq!(load_document(temp.child("missing.txt").path()), "");
    }

    #[test]
    fn test_prompt_line() {
        let mut input = Cursor::new("  hello there  \nsecond line\n");
        let mut output = Vec::new();

        let line = prompt_line(&mut input, &mut output, "Say something: ").unwrap();
        assert_eq!(line, "hello there");
        assert_eq!(String::from_utf8(output).unwrap(), "Say something: ");

        let line = prompt_line(&mut input, &mut Vec::new(), "").unwrap();
        assert_eq!(line, "second line");
    }

    #[test]
    fn test_prompt_line_at_eof() {
        let mut input = Cursor::new("");
        let line = prompt_line(&mut input, &mut Vec::new(), "> ").unwrap();
        assert_eq!(line, "");
    }

    #[test]
    fn test_read_all() {
        let mut input = Cursor::new("\nApple reported revenue.\n\n");
        assert_eq!(read_all(&mut input).unwrap(), "Apple reported revenue.");
    }
}
