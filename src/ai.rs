use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

pub const KEYRING_SERVICE: &str = "file-catalog";
pub const KEYRING_USER: &str = "gemini";
const API_KEY_ENV: &str = "GEMINI_API_KEY";

const MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MAX_SUGGESTED_TAGS: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct TagSuggestion {
    tags: Vec<String>,
}

/// Fire-and-forget client for the generative suggestion service. No retries,
/// no backpressure: a failed request surfaces once and the caller may simply
/// trigger it again.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }
}

impl GeminiClient {
    /// Suggests up to five short tags for the given free text. Blank input
    /// yields no suggestions without touching the network.
    pub async fn suggest_tags(&self, text: &str) -> AppResult<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let prompt = format!(
            "Based on the following details about a file, suggest up to 5 fitting, concise tags. \
             Each tag should be a single word or a short phrase.\nDetails: \"{text}\""
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(serde_json::json!({
                    "type": "OBJECT",
                    "properties": {
                        "tags": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" }
                        }
                    },
                    "required": ["tags"]
                })),
            },
        };

        let body = self.generate(&request).await?;
        let suggestion: TagSuggestion = serde_json::from_str(body.trim())
            .map_err(|error| AppError::Ai(format!("unexpected tag payload: {error}")))?;
        Ok(suggestion
            .tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .take(MAX_SUGGESTED_TAGS)
            .collect())
    }

    /// Suggests a one-to-two sentence description for a file name.
    pub async fn suggest_description(&self, name: &str) -> AppResult<String> {
        if name.trim().is_empty() {
            return Ok(String::new());
        }

        let prompt = format!(
            "Write a concise description (about 1-2 sentences) for a file or application named \"{name}\"."
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                response_mime_type: None,
                response_schema: None,
            },
        };

        let body = self.generate(&request).await?;
        Ok(body.trim().to_string())
    }

    async fn generate(&self, request: &GenerateRequest) -> AppResult<String> {
        let api_key = resolve_api_key()?;
        let url = format!("{}/{}:generateContent", self.base_url, MODEL);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AppError::Ai(format!(
                "suggestion service returned status {}",
                response.status()
            )));
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| AppError::Ai("suggestion service returned no text".to_string()))
    }
}

/// The credential lives in the platform keyring; the environment variable is
/// a fallback for development setups.
fn resolve_api_key() -> AppResult<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .map_err(|error| AppError::Io(error.to_string()))?;
    match entry.get_password() {
        Ok(key) if !key.is_empty() => return Ok(key),
        Ok(_) | Err(keyring::Error::NoEntry) => {}
        Err(error) => return Err(AppError::Io(error.to_string())),
    }
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(AppError::Ai(
            "no API key configured for the suggestion service".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{GenerateResponse, GeminiClient};

    #[tokio::test]
    async fn blank_inputs_short_circuit_without_a_key() {
        let client = GeminiClient::default();
        assert!(client.suggest_tags("   ").await.expect("tags").is_empty());
        assert_eq!(client.suggest_description("").await.expect("description"), "");
    }

    #[test]
    fn response_text_is_extracted_from_first_candidate() {
        let raw = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "{\"tags\":[\"one\",\"two\"]}" } ] } }
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).expect("parse");
        let text = parsed.candidates[0].content.parts[0].text.clone();
        assert!(text.contains("one"));
    }
}
