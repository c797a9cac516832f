#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use async_openai::error::OpenAIError;

/// Everything that can end a grading submission.
///
/// Every variant is terminal for the submission it came from; the form is
/// re-rendered with the message and the user may resubmit.
#[derive(thiserror::Error, Debug)]
pub enum GradeError {
    /// A required configuration value is missing or blank.
    #[error("`{0}` must be set (in the environment or a `.env` file) before essays can be graded.")]
    MissingConfig(&'static str),
    /// The rubric has no criteria, so there is nothing to grade against.
    #[error("The rubric must contain at least one criterion.")]
    EmptyRubric,
    /// No essay image was attached to the submission.
    #[error("Attach an image of the essay before grading.")]
    MissingImage,
    /// The attached file is not a JPEG or PNG image.
    #[error("`{0}` is not a supported image; upload a JPEG or PNG file.")]
    UnsupportedImage(String),
    /// The attached image is over the size limit, given in MiB.
    #[error("The essay image is too large; images up to {0} MiB are accepted.")]
    ImageTooLarge(usize),
    /// Leniency must stay on the 1-10 scale.
    #[error("Leniency must be between 1 and 10, got {0}.")]
    LeniencyOutOfRange(String),
    /// The grade level is not one of the offered options.
    #[error("Unknown grade level: `{0}`.")]
    UnknownGradeLevel(String),
    /// The submitted form could not be read.
    #[error("The form submission could not be read: {0}")]
    InvalidForm(String),
    /// The upstream vision-language API failed or returned nothing usable.
    #[error("API call failed: {0}")]
    Api(String),
}

impl GradeError {
    /// Returns true when the error was raised locally, before any API call.
    pub fn is_local(&self) -> bool {
        !matches!(self, GradeError::Api(_))
    }
}

impl From<OpenAIError> for GradeError {
    fn from(err: OpenAIError) -> Self {
        GradeError::Api(err.to_string())
    }
}
