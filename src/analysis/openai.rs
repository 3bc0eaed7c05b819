//! OpenAI chat-completion client.

use super::{CompletionClient, ImageInput};
use crate::config::AiSettings;
use crate::error::{ManualError, Result};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionRequestMessageContentPartImage, ChatCompletionRequestMessageContentPartText,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
    ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// OpenAI-based completion client.
pub struct OpenAiClient {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl OpenAiClient {
    /// Create a client from AI settings. Requires an API key.
    pub fn new(settings: &AiSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ManualError::Config("OpenAI API key not found in configuration".to_string())
            })?;

        Ok(Self {
            client: create_client_with_timeout(
                api_key,
                Duration::from_secs(settings.timeout_secs),
            )?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
        })
    }

    #[allow(deprecated)]
    fn build_request(
        &self,
        prompt: &str,
        image: Option<&ImageInput>,
    ) -> Result<CreateChatCompletionRequest> {
        let content = match image {
            None => ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
            Some(image) => ChatCompletionRequestUserMessageContent::Array(vec![
                ChatCompletionRequestUserMessageContentPart::Text(
                    ChatCompletionRequestMessageContentPartText {
                        text: prompt.to_string(),
                    },
                ),
                ChatCompletionRequestUserMessageContentPart::ImageUrl(
                    ChatCompletionRequestMessageContentPartImage {
                        image_url: ImageUrl {
                            url: image.to_data_url(),
                            detail: Some(ImageDetail::Auto),
                        },
                    },
                ),
            ]),
        };

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| ManualError::OpenAI(e.to_string()))?;

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .temperature(self.temperature)
            .max_tokens(self.max_output_tokens)
            .build()
            .map_err(|e| ManualError::OpenAI(e.to_string()))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, prompt, image), fields(model = %self.model, with_image = image.is_some()))]
    async fn complete(&self, prompt: &str, image: Option<&ImageInput>) -> Result<String> {
        let request = self.build_request(prompt, image)?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            ManualError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| ManualError::Completion("Empty response from LLM".to_string()))?
            .clone();

        debug!("OpenAI returned {} characters", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AiSettings {
        AiSettings {
            api_key: Some("sk-test".to_string()),
            model: "gpt-4o-mini".to_string(),
            ..AiSettings::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        assert!(OpenAiClient::new(&AiSettings::default()).is_err());
    }

    #[test]
    fn test_image_request_uses_data_url() {
        let client = OpenAiClient::new(&settings()).unwrap();
        let image = ImageInput::new("light.jpg", vec![0xff, 0xd8]);
        let request = client.build_request("Identify this", Some(&image)).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        let parts = &json["messages"][0]["content"];
        assert_eq!(parts[0]["text"], "Identify this");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/jpeg;base64,/9g=");
    }

    #[test]
    fn test_text_request() {
        let client = OpenAiClient::new(&settings()).unwrap();
        let request = client.build_request("Why is the AC warm?", None).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["content"], "Why is the AC warm?");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
