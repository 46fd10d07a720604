/// AI-assisted content drafting
///
/// Sends the user's prompt to an OpenAI-compatible chat completions endpoint
/// with a system prompt tailored to the target platform and tone, and
/// returns the generated post text. One request per call, no retries.
///
/// # Example
///
/// ```no_run
/// use pagepilot_shared::generator::{ContentGenerator, GenerationRequest, GeneratorConfig};
///
/// # async fn example() -> Result<(), pagepilot_shared::generator::GeneratorError> {
/// let generator = ContentGenerator::new(GeneratorConfig::new("sk-..."))?;
/// let text = generator
///     .generate(&GenerationRequest {
///         prompt: "Announce our new sourdough",
///         platform: None,
///         tone: Some("playful"),
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::social_account::Platform;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_TOKENS: u32 = 400;
const MAX_TONE_CHARS: usize = 40;

/// Errors from the completions endpoint
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Generator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generator API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Generator returned no text")]
    EmptyResponse,
}

/// Endpoint, credentials and model
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl GeneratorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// A drafting request
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub platform: Option<Platform>,
    pub tone: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Builds the system prompt for a platform and tone
///
/// The tone is free text from the user, so it is trimmed and truncated
/// before it is embedded.
pub fn system_prompt(platform: Option<Platform>, tone: Option<&str>) -> String {
    let audience = match platform {
        Some(Platform::Facebook) => {
            "a Facebook page post. Aim for two to four short paragraphs and end with a clear call to action"
        }
        Some(Platform::Instagram) => {
            "an Instagram caption. Keep it under 2200 characters, open with a strong first line and finish with up to five relevant hashtags"
        }
        None => "a social media post suitable for both Facebook and Instagram",
    };

    let tone = tone
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.chars().take(MAX_TONE_CHARS).collect::<String>())
        .unwrap_or_else(|| "friendly and professional".to_string());

    format!(
        "You write social media content for small businesses. Write {}. Use a {} tone. \
         Reply with the post text only, without quotes or commentary.",
        audience, tone
    )
}

/// Chat completions client
#[derive(Debug, Clone)]
pub struct ContentGenerator {
    http: Client,
    config: GeneratorConfig,
}

impl ContentGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Generates post text for the request
    pub async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, GeneratorError> {
        let system = system_prompt(request.platform, request.tone);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: 0.7,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        tracing::debug!(model = %self.config.model, "Requesting completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| status.to_string());

            tracing::warn!(status = status.as_u16(), error = %message, "Completion request failed");
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(GeneratorError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(server: &MockServer) -> ContentGenerator {
        ContentGenerator::new(
            GeneratorConfig::new("sk-test")
                .with_base_url(server.uri())
                .with_model("test-model"),
        )
        .unwrap()
    }

    #[test]
    fn test_system_prompt_varies_by_platform() {
        let facebook = system_prompt(Some(Platform::Facebook), None);
        let instagram = system_prompt(Some(Platform::Instagram), None);

        assert!(facebook.contains("Facebook page post"));
        assert!(instagram.contains("hashtags"));
        assert!(facebook.contains("friendly and professional"));
    }

    #[test]
    fn test_system_prompt_truncates_tone() {
        let long_tone = "x".repeat(500);
        let prompt = system_prompt(None, Some(&long_tone));
        assert!(prompt.contains(&"x".repeat(MAX_TONE_CHARS)));
        assert!(!prompt.contains(&"x".repeat(MAX_TONE_CHARS + 1)));

        assert!(system_prompt(None, Some("   ")).contains("friendly and professional"));
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "test-model"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "  Fresh sourdough today!  "}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = generator(&server)
            .generate(&GenerationRequest {
                prompt: "Announce sourdough",
                platform: Some(Platform::Facebook),
                tone: Some("warm"),
            })
            .await
            .unwrap();

        assert_eq!(text, "Fresh sourdough today!");
    }

    #[tokio::test]
    async fn test_generate_surfaces_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = generator(&server)
            .generate(&GenerationRequest {
                prompt: "hi",
                platform: None,
                tone: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, GeneratorError::Api { status: 401, .. }));
        assert!(err.to_string().contains("Incorrect API key"));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = generator(&server)
            .generate(&GenerationRequest {
                prompt: "hi",
                platform: None,
                tone: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, GeneratorError::EmptyResponse));
    }
}
