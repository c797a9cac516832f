#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Grading client: one call to a vision-language model per submission.

use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ImageUrlArgs,
    },
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::{config::OpenAiEnv, error::GradeError, request::EssayImage, usage::TokenUsage};

/// Text produced by the model, with token counts when the API reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Generated grade and feedback, displayed verbatim.
    pub text:  String,
    /// API-reported token usage.
    pub usage: Option<TokenUsage>,
}

/// A model that reads an image and a text prompt and answers with text.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Identifier of the model, used in logs and the usage summary.
    fn model(&self) -> &str;

    /// Sends the prompt and the essay image and returns the generated text.
    /// Every failure is reported as [`GradeError::Api`].
    async fn complete(&self, prompt: &str, image: &EssayImage) -> Result<Completion, GradeError>;
}

/// [`VisionModel`] backed by an OpenAI-compatible chat-completions API.
#[derive(Clone)]
pub struct OpenAiVision {
    /// Configured API client.
    client: OpenAIClient<OpenAIConfig>,
    /// Model and tuning settings.
    env:    OpenAiEnv,
}

impl OpenAiVision {
    /// Creates a client for the configured endpoint, reusing `http_client`.
    pub fn new(env: OpenAiEnv, http_client: reqwest::Client) -> Self {
        let client = OpenAIClient::with_config(
            OpenAIConfig::new()
                .with_api_base(env.api_base())
                .with_api_key(env.api_key()),
        )
        .with_http_client(http_client);
        Self { client, env }
    }

    /// Builds the single user message carrying the prompt and the image.
    pub fn build_request(
        &self,
        prompt: &str,
        image: &EssayImage,
    ) -> Result<CreateChatCompletionRequest, GradeError> {
        let parts: Vec<ChatCompletionRequestUserMessageContentPart> = vec![
            ChatCompletionRequestMessageContentPartTextArgs::default()
                .text(prompt)
                .build()?
                .into(),
            ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(
                    ImageUrlArgs::default()
                        .url(image.data_url())
                        .detail(self.env.image_detail())
                        .build()?,
                )
                .build()?
                .into(),
        ];

        let messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestUserMessageArgs::default()
                .content(parts)
                .build()?
                .into()];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.env.model()).messages(messages).n(1u8);
        if let Some(temperature) = self.env.temperature() {
            args.temperature(temperature);
        }
        if let Some(top_p) = self.env.top_p() {
            args.top_p(top_p);
        }
        if let Some(effort) = self.env.reasoning_effort() {
            args.reasoning_effort(effort);
        }
        Ok(args.build()?)
    }
}

#[async_trait]
impl VisionModel for OpenAiVision {
    fn model(&self) -> &str {
        self.env.model()
    }

    #[instrument(skip_all, fields(model = %self.env.model(), image_bytes = image.len()))]
    async fn complete(&self, prompt: &str, image: &EssayImage) -> Result<Completion, GradeError> {
        let request = self.build_request(prompt, image)?;
        let response = self.client.chat().create(request).await?;

        let usage = response.usage.as_ref().map(|usage| TokenUsage {
            input_tokens:  u64::from(usage.prompt_tokens),
            output_tokens: u64::from(usage.completion_tokens),
        });
        debug!(?usage, choices = response.choices.len(), "model responded");

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| GradeError::Api("the model returned no text".to_string()))?;

        Ok(Completion { text, usage })
    }
}
