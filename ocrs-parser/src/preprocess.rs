//! Input normalization and format classification.
//!
//! Raw recipe text is bounded, normalized into a canonical shape, and tagged
//! with an [`InputFormat`] tier that steers the extraction prompt.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::extraction::error::InputError;

/// Maximum accepted input length, in characters (roughly 12K tokens).
pub const MAX_INPUT_CHARS: usize = 50_000;

/// Compiles a pattern baked into this module.
#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern compiles")
}

/// Section labels that indicate an explicitly structured recipe.
static SECTION_MARKERS: LazyLock<[Regex; 6]> = LazyLock::new(|| {
    [
        r"(?i)ingredients?\s*:",
        r"(?i)instructions?\s*:",
        r"(?i)directions?\s*:",
        r"(?i)method\s*:",
        r"(?i)steps?\s*:",
        r"(?i)procedure\s*:",
    ]
    .map(compile)
});

static BULLET_LINE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^\s*[-*•]\s+"));

static NUMBERED_LINE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?m)^\s*\d+[.)]\s+"));

static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| compile(r"\n{3,}"));

static EXCESS_SPACES: LazyLock<Regex> = LazyLock::new(|| compile(r"[ \t]{2,}"));

static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| compile(r"\n\n+"));

/// How much explicit section structure a recipe text exhibits.
///
/// Variants are ordered from least to most structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputFormat {
    /// Narrative prose with no recognizable sections or lists.
    Unstructured,
    /// One section header, a list, or a titled multi-paragraph layout.
    SemiStructured,
    /// At least two distinct section headers.
    Structured,
}

impl InputFormat {
    /// Returns the lowercase label used in prompts and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unstructured => "unstructured",
            Self::SemiStructured => "semi-structured",
            Self::Structured => "structured",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized recipe text together with its detected format tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessedText {
    /// The normalized text handed to the extraction provider.
    pub text: String,
    /// The detected format tier.
    pub format: InputFormat,
}

/// Normalizes and classifies raw recipe text.
///
/// # Errors
///
/// Returns [`InputError::Empty`] when the trimmed input is empty and
/// [`InputError::TooLarge`] when it exceeds [`MAX_INPUT_CHARS`].
///
/// # Examples
///
/// ```
/// use ocrs_parser::preprocess::{preprocess, InputFormat};
///
/// let result = preprocess("Ingredients:\n- milk\n\nMethod:\n1. Heat").unwrap();
/// assert_eq!(result.format, InputFormat::Structured);
/// ```
pub fn preprocess(raw: &str) -> Result<PreprocessedText, InputError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }

    let length = trimmed.chars().count();
    if length > MAX_INPUT_CHARS {
        return Err(InputError::TooLarge {
            length,
            max: MAX_INPUT_CHARS,
        });
    }

    let text = normalize(trimmed);
    let format = detect_format(&text);

    Ok(PreprocessedText { text, format })
}

/// Applies the normalization passes in order. Later passes rely on earlier ones.
fn normalize(text: &str) -> String {
    let composed: String = text.nfc().collect();

    let quoted: String = composed
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            other => other,
        })
        .collect();

    let newlines = EXCESS_NEWLINES.replace_all(&quoted, "\n\n");
    let spaces = EXCESS_SPACES.replace_all(&newlines, " ");

    spaces.trim().to_string()
}

/// Classifies normalized text. First matching tier wins.
#[must_use]
pub fn detect_format(text: &str) -> InputFormat {
    let marker_count = SECTION_MARKERS.iter().filter(|re| re.is_match(text)).count();

    if marker_count >= 2 {
        return InputFormat::Structured;
    }

    let has_lists = BULLET_LINE.is_match(text) || NUMBERED_LINE.is_match(text);
    if marker_count >= 1 || has_lists {
        return InputFormat::SemiStructured;
    }

    // A short, period-free first paragraph followed by more prose reads like a titled recipe.
    let paragraphs: Vec<&str> = PARAGRAPH_BREAK.split(text).collect();
    if paragraphs.len() >= 3 {
        let title = paragraphs[0].trim();
        if title.chars().count() < 80 && !title.contains('.') {
            return InputFormat::SemiStructured;
        }
    }

    InputFormat::Unstructured
}
