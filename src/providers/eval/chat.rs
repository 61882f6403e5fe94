//! Chat-completion evaluation backends
//!
//! Two envelopes share this module, both speaking the OpenAI chat schema:
//!
//! - [`CloudChatEvaluator`]: a key-authenticated cloud API; the whole prompt
//!   (which already embeds the solution) goes up as a single user message.
//! - [`GatewayChatEvaluator`]: a self-hosted gateway; the prompt rides as
//!   the system message and the solution as the user message.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Assignment, EvaluationResult};
use crate::providers::eval::{into_result, map_openai_error};
use crate::providers::EvaluationProvider;

/// Builds the chat client from the evaluation backend settings
fn chat_client(config: &Config) -> Client<OpenAIConfig> {
    let mut openai_config = OpenAIConfig::new().with_api_base(&config.eval_base_url);
    if let Some(key) = &config.eval_api_key {
        openai_config = openai_config.with_api_key(key);
    }
    Client::with_config(openai_config)
}

/// Runs one chat completion and extracts the assistant's text
async fn complete(
    provider: &'static str,
    client: &Client<OpenAIConfig>,
    model: &str,
    temperature: f32,
    messages: Vec<ChatCompletionRequestMessage>,
) -> AppResult<String> {
    debug!("calling chat backend '{}', model {}", provider, model);

    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .temperature(temperature)
        .build()
        .map_err(|e| map_openai_error(provider, e))?;

    let response = client
        .chat()
        .create(request)
        .await
        .map_err(|e| map_openai_error(provider, e))?;

    let content = response
        .choices
        .first()
        .and_then(|choice| choice.message.content.clone())
        .ok_or_else(|| AppError::malformed(provider, "response carried no message content"))?;

    Ok(content.trim().to_string())
}

/// Key-authenticated cloud chat API
pub struct CloudChatEvaluator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl CloudChatEvaluator {
    /// Provider identifier
    pub const ID: &'static str = "openai";

    pub fn new(config: &Config) -> Self {
        Self {
            client: chat_client(config),
            model: config.eval_model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl EvaluationProvider for CloudChatEvaluator {
    fn id(&self) -> &'static str {
        Self::ID
    }

    async fn evaluate(
        &self,
        prompt: &str,
        _assignment: &Assignment,
        _solution: &str,
    ) -> AppResult<EvaluationResult> {
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| map_openai_error(Self::ID, e))?;
        let messages = vec![ChatCompletionRequestMessage::User(user)];

        let feedback =
            complete(Self::ID, &self.client, &self.model, self.temperature, messages).await?;
        Ok(into_result(Self::ID, feedback))
    }
}

/// Self-hosted OpenAI-style chat gateway
pub struct GatewayChatEvaluator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl GatewayChatEvaluator {
    /// Provider identifier
    pub const ID: &'static str = "gateway";

    pub fn new(config: &Config) -> Self {
        Self {
            client: chat_client(config),
            model: config.eval_model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl EvaluationProvider for GatewayChatEvaluator {
    fn id(&self) -> &'static str {
        Self::ID
    }

    async fn evaluate(
        &self,
        prompt: &str,
        _assignment: &Assignment,
        solution: &str,
    ) -> AppResult<EvaluationResult> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| map_openai_error(Self::ID, e))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(solution)
            .build()
            .map_err(|e| map_openai_error(Self::ID, e))?;
        let messages = vec![
            ChatCompletionRequestMessage::System(system),
            ChatCompletionRequestMessage::User(user),
        ];

        let feedback =
            complete(Self::ID, &self.client, &self.model, self.temperature, messages).await?;
        Ok(into_result(Self::ID, feedback))
    }
}
