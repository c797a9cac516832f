#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{sync::Arc, time::Instant};

use itertools::Itertools;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::{
    client::VisionModel,
    error::GradeError,
    prompt,
    request::GradingRequest,
    usage::{Pricing, UsageSummary},
};

/// The result of grading one essay.
#[derive(Debug, Clone)]
pub struct GradingOutcome {
    /// Model output, shown verbatim.
    pub feedback: String,
    /// Tokens, cost, and time spent on the call.
    pub usage:    UsageSummary,
}

/// Runs a submission end to end: validation, prompt compilation, and a single
/// model call.
#[derive(Clone)]
pub struct Grader {
    /// Model the essays are sent to.
    model:   Arc<dyn VisionModel>,
    /// Token prices for the usage summary.
    pricing: Pricing,
}

impl Grader {
    /// Creates a grader around a model.
    pub fn new(model: Arc<dyn VisionModel>, pricing: Pricing) -> Self {
        Self { model, pricing }
    }

    /// Identifier of the underlying model.
    pub fn model_name(&self) -> &str {
        self.model.model()
    }

    /// Grades one essay.
    ///
    /// An empty rubric or a missing image is rejected before the model is
    /// contacted. Upstream failures are returned as [`GradeError::Api`]
    /// without retrying.
    pub async fn grade(&self, request: GradingRequest) -> Result<GradingOutcome, GradeError> {
        let image = request.validate()?;
        let prompt = prompt::compile(&request.context)?;

        let span = info_span!(
            "grade",
            submission = %Uuid::new_v4(),
            model = %self.model.model(),
            grade_level = %request.context.grade_level,
            leniency = request.context.leniency.value(),
        );

        async {
            info!(
                criteria = %request.context.rubric.iter().map(|c| c.name.as_str()).join(", "),
                prompt_chars = prompt.len(),
                image_bytes = image.len(),
                "sending essay to model"
            );

            let started = Instant::now();
            let completion = match self.model.complete(&prompt, image).await {
                Ok(completion) => completion,
                Err(err) => {
                    warn!(error = %err, "grading call failed");
                    return Err(err);
                }
            };

            let usage = UsageSummary::new(
                self.model.model(),
                completion.usage,
                &prompt,
                image.len(),
                &completion.text,
                self.pricing,
                started.elapsed(),
            );
            match usage.to_json_line() {
                Ok(line) => info!(usage = %line, "api usage"),
                Err(err) => warn!(error = %err, "could not serialize api usage"),
            }

            Ok(GradingOutcome {
                feedback: completion.text,
                usage,
            })
        }
        .instrument(span)
        .await
    }
}
