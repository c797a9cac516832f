#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Builds the grading prompt from the rubric and the form's context fields.

use std::fmt::Write as _;

use crate::{error::GradeError, request::GradingContext};

/// Opening line that sets up the grader persona.
const INTRO: &str = include_str!("prompts/intro.md");
/// Closing request for per-criterion scores and overall feedback.
const CLOSING: &str = include_str!("prompts/closing.md");

/// Compiles the grading prompt.
///
/// The prompt states the grade level and its expectations, the grading
/// approach for the leniency band, the assignment instructions (when given),
/// every criterion in input order with its weight (names and descriptions
/// are written exactly as given), and finally what the response should
/// contain. The same context always yields the same string.
pub fn compile(context: &GradingContext) -> Result<String, GradeError> {
    if context.rubric.is_empty() {
        return Err(GradeError::EmptyRubric);
    }

    let mut prompt = String::with_capacity(4096);
    prompt.push_str(INTRO.trim_end());
    prompt.push_str("\n\n");

    let level = context.grade_level;
    // Writing into a String cannot fail.
    let _ = writeln!(prompt, "GRADE LEVEL: {}", level.label());
    prompt.push_str("GRADE LEVEL EXPECTATIONS:\n");
    prompt.push_str(level.expectations().trim_end());
    prompt.push_str("\n\n");

    let band = context.leniency.band();
    let _ = writeln!(prompt, "LENIENCY: {}/10 ({})", context.leniency.value(), band.label());
    prompt.push_str(band.instructions().trim_end());
    prompt.push_str("\n\n");

    let instructions = context.assignment_instructions.trim();
    if !instructions.is_empty() {
        let _ = write!(prompt, "ASSIGNMENT INSTRUCTIONS:\n{instructions}\n\n");
    }

    prompt.push_str("RUBRIC CRITERIA:\n");
    for criterion in &context.rubric {
        let _ = writeln!(
            prompt,
            "- {} (weight {}): {}",
            criterion.name,
            criterion.weight_label(),
            criterion.description
        );
    }

    prompt.push('\n');
    prompt.push_str(CLOSING.trim_end());
    Ok(prompt)
}
