#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Token usage and cost accounting for a grading call.

use std::{fmt, time::Duration};

use serde::Serialize;

/// Image token baseline used when the API does not report usage.
const IMAGE_BASE_TOKENS: u64 = 85;
/// Image size that adds another [`IMAGE_BASE_TOKENS`] to the estimate.
const IMAGE_SIZE_UNIT: f64 = 100.0 * 1024.0;

/// Estimates the token count of a piece of text (about four characters per
/// token).
pub fn estimate_text_tokens(text: &str) -> u64 {
    (text.chars().count() / 4) as u64
}

/// Estimates the token cost of an image from its encoded size.
pub fn estimate_image_tokens(size_bytes: usize) -> u64 {
    let size_factor = size_bytes as f64 / IMAGE_SIZE_UNIT;
    (IMAGE_BASE_TOKENS as f64 * size_factor) as u64 + IMAGE_BASE_TOKENS
}

/// Token counts reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    /// Tokens in the request, image included.
    pub input_tokens:  u64,
    /// Tokens in the generated response.
    pub output_tokens: u64,
}

/// USD prices per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    /// Price per million input tokens.
    input_per_million:  f64,
    /// Price per million output tokens.
    output_per_million: f64,
}

impl Pricing {
    /// Creates a price table.
    pub fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    /// Price per million input tokens.
    pub fn input_per_million(&self) -> f64 {
        self.input_per_million
    }

    /// Price per million output tokens.
    pub fn output_per_million(&self) -> f64 {
        self.output_per_million
    }

    /// Cost of `tokens` input tokens.
    pub fn input_cost(&self, tokens: u64) -> f64 {
        tokens as f64 / 1_000_000.0 * self.input_per_million
    }

    /// Cost of `tokens` output tokens.
    pub fn output_cost(&self, tokens: u64) -> f64 {
        tokens as f64 / 1_000_000.0 * self.output_per_million
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::new(1.10, 4.40)
    }
}

/// Per-call usage record shown under the feedback and written to the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    /// Model that served the call.
    pub model:         String,
    /// Input tokens, text and image together.
    pub input_tokens:  u64,
    /// Output tokens.
    pub output_tokens: u64,
    /// Whether the counts came from the API or from local estimates.
    pub estimated:     bool,
    /// Input cost in USD.
    pub input_cost:    f64,
    /// Output cost in USD.
    pub output_cost:   f64,
    /// Input and output cost together.
    pub total_cost:    f64,
    /// Wall-clock time of the grading call.
    #[serde(with = "secs")]
    pub elapsed:       Duration,
}

impl UsageSummary {
    /// Builds a summary, preferring API-reported counts and estimating from the
    /// prompt, image size, and response text otherwise.
    pub fn new(
        model: &str,
        reported: Option<TokenUsage>,
        prompt: &str,
        image_bytes: usize,
        output: &str,
        pricing: Pricing,
        elapsed: Duration,
    ) -> Self {
        let (usage, estimated) = match reported {
            Some(usage) => (usage, false),
            None => (
                TokenUsage {
                    input_tokens:  estimate_text_tokens(prompt) + estimate_image_tokens(image_bytes),
                    output_tokens: estimate_text_tokens(output),
                },
                true,
            ),
        };

        let input_cost = pricing.input_cost(usage.input_tokens);
        let output_cost = pricing.output_cost(usage.output_tokens);
        Self {
            model: model.to_string(),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            estimated,
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
            elapsed,
        }
    }

    /// The record as one line of JSON, the form it takes in the log.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let note = if self.estimated { " (estimated)" } else { "" };
        writeln!(f, "Token Usage Summary{note}:")?;
        writeln!(f, "- Model: {}", self.model)?;
        writeln!(
            f,
            "- Input tokens: {} (includes text and image) - Cost: ${:.6}",
            self.input_tokens, self.input_cost
        )?;
        writeln!(f, "- Output tokens: {} - Cost: ${:.6}", self.output_tokens, self.output_cost)?;
        writeln!(f, "- Total estimated cost: ${:.6}", self.total_cost)?;
        write!(f, "- Execution time: {:.2} seconds", self.elapsed.as_secs_f64())
    }
}

/// Serializes a `Duration` as fractional seconds.
mod secs {
    use std::time::Duration;

    use serde::Serializer;

    /// Writes the duration as an `f64` number of seconds.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_estimate_scales_with_size() {
        assert_eq!(estimate_image_tokens(0), 85);
        assert_eq!(estimate_image_tokens(100 * 1024), 170);
        assert_eq!(estimate_image_tokens(250 * 1024), 297);
    }

    #[test]
    fn text_estimate_is_a_quarter_of_chars() {
        assert_eq!(estimate_text_tokens(""), 0);
        assert_eq!(estimate_text_tokens("abcdefgh"), 2);
    }

    #[test]
    fn reported_usage_wins_over_estimates() {
        let summary = UsageSummary::new(
            "gpt-4o",
            Some(TokenUsage {
                input_tokens:  1_000_000,
                output_tokens: 500_000,
            }),
            "prompt",
            10,
            "out",
            Pricing::default(),
            Duration::from_millis(1500),
        );
        assert!(!summary.estimated);
        assert!((summary.input_cost - 1.10).abs() < 1e-9);
        assert!((summary.output_cost - 2.20).abs() < 1e-9);
        assert!((summary.total_cost - 3.30).abs() < 1e-9);
        let text = summary.to_string();
        assert!(text.contains("Input tokens: 1000000"));
        assert!(text.contains("Execution time: 1.50 seconds"));
    }

    #[test]
    fn missing_usage_is_estimated() {
        let summary = UsageSummary::new(
            "gpt-4o",
            None,
            "abcdefgh",
            0,
            "abcd",
            Pricing::new(0.0, 0.0),
            Duration::ZERO,
        );
        assert!(summary.estimated);
        assert_eq!(summary.input_tokens, 2 + 85);
        assert_eq!(summary.output_tokens, 1);
        assert_eq!(summary.total_cost, 0.0);
    }

    #[test]
    fn log_line_is_flat_json() {
        let summary = UsageSummary::new(
            "o4-mini",
            Some(TokenUsage {
                input_tokens:  2_000,
                output_tokens: 1_000,
            }),
            "",
            0,
            "",
            Pricing::new(1.0, 2.0),
            Duration::from_millis(2500),
        );
        let line = summary.to_json_line().unwrap();
        assert!(!line.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["model"], "o4-mini");
        assert_eq!(value["input_tokens"], 2_000);
        assert_eq!(value["estimated"], false);
        assert!((value["total_cost"].as_f64().unwrap() - 0.004).abs() < 1e-12);
        assert_eq!(value["elapsed"], 2.5);
    }
}
