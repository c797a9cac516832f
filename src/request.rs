#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use bon::Builder;

use crate::{error::GradeError, leniency::Leniency, level::GradeLevel, rubric::Rubric};

/// Largest accepted essay image.
///
/// The attached image is sent back to the browser as base64 and returned
/// with every later submission, next to a possible fresh upload, so the
/// cached copy plus a new file must still fit in one request body.
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Image encodings the upload control accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
}

impl ImageFormat {
    /// MIME type sent to the model and used for previews.
    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    /// Detects the format from the leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageFormat::Png)
        } else {
            None
        }
    }

    /// Guesses the format from a file name extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    /// Parses a MIME type back into a format.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

/// The uploaded photo of the essay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssayImage {
    /// Raw image bytes.
    bytes:  Vec<u8>,
    /// Detected encoding.
    format: ImageFormat,
}

impl EssayImage {
    /// Wraps uploaded bytes, identifying the format from the content first and
    /// the file name second.
    pub fn from_upload(file_name: &str, bytes: Vec<u8>) -> Result<Self, GradeError> {
        if bytes.is_empty() {
            return Err(GradeError::MissingImage);
        }
        check_size(bytes.len())?;
        let format = ImageFormat::sniff(&bytes)
            .or_else(|| ImageFormat::from_file_name(file_name))
            .ok_or_else(|| GradeError::UnsupportedImage(file_name.to_string()))?;
        Ok(Self { bytes, format })
    }

    /// Rebuilds an image from a `data:` URL produced by [`EssayImage::data_url`].
    pub fn from_data_url(url: &str) -> Result<Self, GradeError> {
        let invalid = || GradeError::InvalidForm("the attached image could not be decoded".into());
        let rest = url.strip_prefix("data:").ok_or_else(invalid)?;
        let (mime, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;
        let format = ImageFormat::from_mime(mime)
            .ok_or_else(|| GradeError::UnsupportedImage(mime.to_string()))?;
        let payload = payload.trim();
        // Refuse before decoding; base64 carries 3 bytes in every 4 characters.
        let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
        check_size((payload.len() / 4 * 3).saturating_sub(padding))?;
        let bytes = STANDARD.decode(payload).map_err(|_| invalid())?;
        if bytes.is_empty() {
            return Err(GradeError::MissingImage);
        }
        check_size(bytes.len())?;
        Ok(Self { bytes, format })
    }

    /// Raw bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when no bytes were uploaded.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Detected format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Base64 `data:` URL carrying the image.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime(), STANDARD.encode(&self.bytes))
    }
}

/// Rejects images over [`MAX_IMAGE_BYTES`].
fn check_size(len: usize) -> Result<(), GradeError> {
    if len > MAX_IMAGE_BYTES {
        Err(GradeError::ImageTooLarge(MAX_IMAGE_BYTES / (1024 * 1024)))
    } else {
        Ok(())
    }
}

/// Everything the prompt is built from, apart from the image.
#[derive(Debug, Clone, Default, PartialEq, Builder)]
#[builder(on(String, into))]
pub struct GradingContext {
    /// Instructions or prompt the students were given. May be blank.
    #[builder(default)]
    pub assignment_instructions: String,
    /// Educational level of the student.
    #[builder(default)]
    pub grade_level:             GradeLevel,
    /// How forgiving the grader should be.
    #[builder(default)]
    pub leniency:                Leniency,
    /// Ordered, weighted criteria.
    #[builder(into)]
    pub rubric:                  Rubric,
}

/// One submission: the context plus the essay image, if one was attached.
#[derive(Debug, Clone, Builder)]
pub struct GradingRequest {
    /// Prompt inputs.
    pub context: GradingContext,
    /// The uploaded essay photo.
    pub image:   Option<EssayImage>,
}

impl GradingRequest {
    /// Checks the two preconditions for contacting the model: at least one
    /// criterion and a non-empty image.
    pub fn validate(&self) -> Result<&EssayImage, GradeError> {
        if self.context.rubric.is_empty() {
            return Err(GradeError::EmptyRubric);
        }
        match &self.image {
            Some(image) if !image.is_empty() => Ok(image),
            _ => Err(GradeError::MissingImage),
        }
    }
}
