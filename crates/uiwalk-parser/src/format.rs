//! Document format hints.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Errors at the recognizer's input boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognizeError {
    #[error("unsupported document format: '{0}' (expected markdown, plaintext or word)")]
    UnsupportedFormat(String),
}

/// How the document text was produced. Word-derived text has already been
/// extracted from the binary document by an ingestion step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    #[default]
    Markdown,
    PlainText,
    WordDerived,
}

impl DocumentFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, RecognizeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "txt" | "text" => Ok(Self::PlainText),
            _ => Err(RecognizeError::UnsupportedFormat(if ext.is_empty() {
                path.display().to_string()
            } else {
                format!(".{ext}")
            })),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::PlainText => "plaintext",
            Self::WordDerived => "word",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DocumentFormat {
    type Err = RecognizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "txt" | "text" | "plaintext" | "plain" => Ok(Self::PlainText),
            "word" | "docx" | "word-derived" => Ok(Self::WordDerived),
            _ => Err(RecognizeError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_names() {
        assert_eq!("markdown".parse(), Ok(DocumentFormat::Markdown));
        assert_eq!("TXT".parse(), Ok(DocumentFormat::PlainText));
        assert_eq!("word".parse(), Ok(DocumentFormat::WordDerived));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = "pdf".parse::<DocumentFormat>().unwrap_err();
        assert_eq!(err, RecognizeError::UnsupportedFormat("pdf".into()));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("需求.md")),
            Ok(DocumentFormat::Markdown)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("notes.TXT")),
            Ok(DocumentFormat::PlainText)
        );
        assert!(DocumentFormat::from_path(Path::new("需求.docx")).is_err());
        assert!(DocumentFormat::from_path(Path::new("README")).is_err());
    }
}
