#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Reading the submitted form back into typed values.

use axum::{
    extract::{Multipart, multipart::MultipartError},
    http::StatusCode,
};

use crate::{
    error::GradeError,
    leniency::Leniency,
    level::GradeLevel,
    request::{EssayImage, GradingContext, GradingRequest, MAX_IMAGE_BYTES},
    rubric::{Rubric, RubricCriterion},
};

/// A single submitted form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Plain text input.
    Text(String),
    /// File input.
    File {
        /// Name of the chosen file; empty when nothing was chosen.
        file_name: String,
        /// File contents.
        bytes:     Vec<u8>,
    },
}

/// Which submit button was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormAction {
    /// Append a placeholder criterion.
    AddCriterion,
    /// Drop the last criterion.
    RemoveCriterion,
    /// Send the essay to the model.
    #[default]
    Grade,
}

impl FormAction {
    /// Parses the `action` button value; anything unknown grades.
    fn parse(value: &str) -> Self {
        match value.trim() {
            "add" => FormAction::AddCriterion,
            "remove" => FormAction::RemoveCriterion,
            _ => FormAction::Grade,
        }
    }
}

/// Current values of every form control.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    /// Assignment instructions text.
    pub instructions: String,
    /// Selected grade level.
    pub grade_level:  GradeLevel,
    /// Selected leniency.
    pub leniency:     Leniency,
    /// Rubric rows, in display order.
    pub rubric:       Rubric,
    /// Attached essay image, carried across re-renders.
    pub image:        Option<EssayImage>,
}

impl FormState {
    /// The form as first shown: default rubric, no image.
    pub fn initial() -> Self {
        Self {
            rubric: Rubric::essay_default(),
            ..Self::default()
        }
    }

    /// Builds the grading request for the current values.
    pub fn to_request(&self) -> GradingRequest {
        GradingRequest {
            context: GradingContext {
                assignment_instructions: self.instructions.clone(),
                grade_level:             self.grade_level,
                leniency:                self.leniency,
                rubric:                  self.rubric.clone(),
            },
            image:   self.image.clone(),
        }
    }
}

/// A submission after parsing. Values that could not be read fall back to
/// their defaults and the first such problem is kept so it can be shown.
#[derive(Debug)]
pub struct ParsedForm {
    /// Parsed (or defaulted) values.
    pub state:   FormState,
    /// Button that submitted the form.
    pub action:  FormAction,
    /// First problem found while parsing.
    pub problem: Option<GradeError>,
}

impl ParsedForm {
    /// Interprets raw fields in submission order.
    ///
    /// Criterion rows are matched up by position across the
    /// `criterion_name`, `criterion_weight`, and `criterion_description`
    /// fields. Rows whose name and description are both blank are dropped.
    pub fn from_fields(fields: Vec<(String, FieldValue)>) -> Self {
        let mut state = FormState::default();
        let mut action = FormAction::default();
        let mut problem: Option<GradeError> = None;
        let mut note = |err: GradeError| {
            problem.get_or_insert(err);
        };

        let mut names = Vec::new();
        let mut weights = Vec::new();
        let mut descriptions = Vec::new();
        let mut upload: Option<EssayImage> = None;
        let mut cached: Option<EssayImage> = None;

        for (name, value) in fields {
            match (name.as_str(), value) {
                ("essay", FieldValue::File { file_name, bytes }) => {
                    if bytes.is_empty() {
                        continue;
                    }
                    match EssayImage::from_upload(&file_name, bytes) {
                        Ok(image) => upload = Some(image),
                        Err(err) => note(err),
                    }
                }
                (_, FieldValue::File { .. }) => {}
                ("instructions", FieldValue::Text(text)) => state.instructions = text,
                ("grade_level", FieldValue::Text(text)) => match text.parse() {
                    Ok(level) => state.grade_level = level,
                    Err(err) => note(err),
                },
                ("leniency", FieldValue::Text(text)) => match text.parse() {
                    Ok(leniency) => state.leniency = leniency,
                    Err(err) => note(err),
                },
                ("criterion_name", FieldValue::Text(text)) => names.push(text),
                ("criterion_weight", FieldValue::Text(text)) => weights.push(text),
                ("criterion_description", FieldValue::Text(text)) => descriptions.push(text),
                ("essay_cached", FieldValue::Text(text)) => {
                    if text.trim().is_empty() {
                        continue;
                    }
                    match EssayImage::from_data_url(&text) {
                        Ok(image) => cached = Some(image),
                        Err(err) => note(err),
                    }
                }
                ("action", FieldValue::Text(text)) => action = FormAction::parse(&text),
                _ => {}
            }
        }

        let rows = names.len().max(weights.len()).max(descriptions.len());
        let mut criteria = Vec::with_capacity(rows);
        for i in 0..rows {
            let name = names.get(i).map(|s| s.trim()).unwrap_or_default();
            let description = descriptions.get(i).map(|s| s.trim()).unwrap_or_default();
            if name.is_empty() && description.is_empty() {
                continue;
            }
            let raw_weight = weights.get(i).map(|s| s.trim()).unwrap_or_default();
            let weight = if raw_weight.is_empty() {
                0.0
            } else {
                match raw_weight.parse::<f64>() {
                    Ok(weight) if weight.is_finite() => weight,
                    _ => {
                        note(GradeError::InvalidForm(format!(
                            "the weight `{raw_weight}` for `{name}` is not a number"
                        )));
                        0.0
                    }
                }
            };
            criteria.push(RubricCriterion::new(name, weight, description));
        }
        state.rubric = Rubric::new(criteria);
        state.image = upload.or(cached);

        Self {
            state,
            action,
            problem,
        }
    }

    /// Interprets a possibly incomplete read.
    ///
    /// When the body failed part way, the fields that did arrive are kept and
    /// the read error becomes the problem. The pressed button is ignored,
    /// since the rubric rows may be cut short.
    pub fn from_read(read: FormFields) -> Self {
        let FormFields { fields, error } = read;
        let Some(err) = error else {
            return Self::from_fields(fields);
        };
        let nothing_read = fields.is_empty();
        let mut parsed = Self::from_fields(fields);
        if nothing_read {
            parsed.state = FormState::initial();
        }
        parsed.action = FormAction::Grade;
        parsed.problem = Some(err);
        parsed
    }
}

/// Fields drained from a multipart body.
#[derive(Debug, Default)]
pub struct FormFields {
    /// Fields read before the body ended or failed, in submission order.
    pub fields: Vec<(String, FieldValue)>,
    /// Why reading stopped early, if it did.
    pub error:  Option<GradeError>,
}

/// Drains a multipart body into named fields, keeping their order.
///
/// A body that fails part way (usually by running past the size limit)
/// still returns every field read up to that point.
pub async fn read_fields(mut multipart: Multipart) -> FormFields {
    let mut read = FormFields::default();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                read.error = Some(unreadable(err));
                break;
            }
        };
        let name = field.name().unwrap_or_default().to_string();
        let value = match field.file_name().map(str::to_owned) {
            Some(file_name) => field.bytes().await.map(|bytes| FieldValue::File {
                file_name,
                bytes: bytes.to_vec(),
            }),
            None => field.text().await.map(FieldValue::Text),
        };
        match value {
            Ok(value) => read.fields.push((name, value)),
            Err(err) => {
                read.error = Some(unreadable(err));
                break;
            }
        }
    }
    read
}

/// Maps a multipart failure to the message shown on the page.
fn unreadable(err: MultipartError) -> GradeError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GradeError::ImageTooLarge(MAX_IMAGE_BYTES / (1024 * 1024))
    } else {
        GradeError::InvalidForm(err.body_text())
    }
}
