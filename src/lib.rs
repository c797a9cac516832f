//! # essay-grader
//!
//! Grades a photographed handwritten essay against a weighted rubric by
//! sending the image and a compiled grading prompt to a vision-language
//! model, and shows the model's answer verbatim.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Grading client for vision-language models
pub mod client;
/// Environment-driven configuration shared across the crate
pub mod config;
/// The error type for grading submissions
pub mod error;
/// Ties validation, prompt compilation and the model call together
pub mod grader;
/// Leniency scale and the grading approach each band implies
pub mod leniency;
/// Student grade levels and their writing expectations
pub mod level;
/// Rubric compiler
pub mod prompt;
/// Grading requests and the uploaded essay image
pub mod request;
/// Weighted rubric criteria
pub mod rubric;
/// Token usage and cost accounting
pub mod usage;
/// The web form
pub mod web;

pub use client::{Completion, OpenAiVision, VisionModel};
pub use error::GradeError;
pub use grader::{Grader, GradingOutcome};
pub use leniency::{Leniency, LeniencyBand};
pub use level::GradeLevel;
pub use request::{EssayImage, GradingContext, GradingRequest, ImageFormat, MAX_IMAGE_BYTES};
pub use rubric::{Rubric, RubricCriterion};
pub use usage::{Pricing, TokenUsage, UsageSummary};
