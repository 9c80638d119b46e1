//! Prompt and correction-feedback text sent to extraction providers.
//!
//! The wording here is part of the provider contract. Providers render it
//! verbatim; changing it changes model behavior.

use crate::preprocess::InputFormat;

/// Assistant turn inserted between the recipe text and the correction request.
pub const FEEDBACK_ACKNOWLEDGEMENT: &str = "Let me re-parse with corrections.";

const FEEDBACK_PREAMBLE: &str = "Your previous output had these errors:";
const FEEDBACK_INSTRUCTION: &str = "Please fix these specific issues and re-output.";

/// The guidance sentence for a format tier.
#[must_use]
pub const fn format_hint(format: InputFormat) -> &'static str {
    match format {
        InputFormat::Unstructured => {
            "Pay extra attention to extracting implicit ingredients and step boundaries from the narrative."
        }
        InputFormat::SemiStructured => {
            "Some sections may be identifiable by headers, but instructions may be mixed with narrative."
        }
        InputFormat::Structured => {
            "This input has clear section headers — extract from each section accordingly."
        }
    }
}

/// Appends the format-detection paragraph to a caller-supplied prompt.
///
/// # Examples
///
/// ```
/// use ocrs_parser::extraction::feedback::build_system_prompt;
/// use ocrs_parser::preprocess::InputFormat;
///
/// let prompt = build_system_prompt("Extract the recipe.", InputFormat::Structured);
/// assert!(prompt.starts_with("Extract the recipe.\n\n## Input Format Detection\n"));
/// assert!(prompt.contains("This input appears to be structured."));
/// ```
#[must_use]
pub fn build_system_prompt(base_prompt: &str, format: InputFormat) -> String {
    format!(
        "{base_prompt}\n\n## Input Format Detection\nThis input appears to be {format}. {}",
        format_hint(format)
    )
}

/// Renders prior-attempt errors as a correction request.
///
/// # Examples
///
/// ```
/// use ocrs_parser::extraction::feedback::build_error_feedback;
///
/// let errors = vec!["Step 2 has stepNumber 3, expected 2".to_string()];
/// assert_eq!(
///     build_error_feedback(&errors),
///     "Your previous output had these errors:\n- Step 2 has stepNumber 3, expected 2\nPlease fix these specific issues and re-output."
/// );
/// ```
#[must_use]
pub fn build_error_feedback(errors: &[String]) -> String {
    let mut feedback = String::from(FEEDBACK_PREAMBLE);
    for error in errors {
        feedback.push_str("\n- ");
        feedback.push_str(error);
    }
    feedback.push('\n');
    feedback.push_str(FEEDBACK_INSTRUCTION);
    feedback
}

/// Speaker of a conversation turn following the system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Caller-side content.
    User,
    /// Model-side content.
    Assistant,
}

/// One non-system message sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Who speaks this turn.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl Turn {
    /// A user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Builds the turns that follow the system prompt.
///
/// With no prior errors this is the recipe text alone. Otherwise the text is
/// followed by the acknowledgement and the rendered correction request.
#[must_use]
pub fn extraction_turns(text: &str, errors: &[String]) -> Vec<Turn> {
    let mut turns = vec![Turn::user(text)];
    if !errors.is_empty() {
        turns.push(Turn::assistant(FEEDBACK_ACKNOWLEDGEMENT));
        turns.push(Turn::user(build_error_feedback(errors)));
    }
    turns
}
