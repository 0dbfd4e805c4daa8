use std::time::Instant;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::{PhotoClassifier, Verdict};
use crate::config::ClassifierConfig;
use crate::error::AppError;

const PROMPT: &str = "\
You are a delivery verification assistant. Analyze this image.
Strict rules for validity:
1. visible_package: the image MUST contain a cardboard box, shipping bag, or parcel.
2. visible_address_number: the image MUST contain a visible door number, apartment number, or building number plate.

Return a JSON object with this structure:
{\"valid\": boolean, \"reason\": \"short explanation\"}

If valid is false, the reason must say what is missing (for example \"package visible but the door number is unreadable\").
The response must be ONLY valid JSON.";

const DEFAULT_REASON: &str = "classifier gave no reason";

#[derive(Debug, thiserror::Error)]
enum ClassifierError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error: HTTP {status} - {body}")]
    Server { status: u16, body: String },

    #[error("response contained no text candidate")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    valid: bool,
    #[serde(default)]
    reason: Option<String>,
}

pub struct GeminiClassifier {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| AppError::Internal(format!("failed to build classifier client: {err}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }

    async fn generate(&self, api_key: &str, image: &[u8]) -> Result<String, ClassifierError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [
                    RequestPart::Text { text: PROMPT },
                    RequestPart::Image {
                        inline_data: InlineData {
                            mime_type: sniff_mime_type(image),
                            data: BASE64.encode(image),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .find_map(|part| part.text)
            .ok_or(ClassifierError::EmptyResponse)
    }
}

#[async_trait]
impl PhotoClassifier for GeminiClassifier {
    async fn classify(&self, image: &[u8]) -> Verdict {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("photo classifier API key is not configured");
            return Verdict::unavailable("photo classifier is not configured");
        };

        let start = Instant::now();
        let verdict = match self.generate(api_key, image).await {
            Ok(text) => parse_verdict(&text),
            Err(err) => {
                warn!(error = %err, "photo classification request failed");
                Verdict::unavailable("a technical error occurred while analyzing the photo")
            }
        };

        debug!(
            outcome = verdict.outcome_label(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "photo classified"
        );
        verdict
    }
}

pub fn parse_verdict(text: &str) -> Verdict {
    let cleaned = text.replace("```json", "").replace("```", "");

    match serde_json::from_str::<RawVerdict>(cleaned.trim()) {
        Ok(raw) => {
            let reason = raw
                .reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_REASON.to_string());
            if raw.valid {
                Verdict::Accepted { reason }
            } else {
                Verdict::Rejected { reason }
            }
        }
        Err(err) => {
            warn!(error = %err, "classifier reply was not a verdict");
            Verdict::unavailable("the classifier reply could not be understood")
        }
    }
}

fn sniff_mime_type(image: &[u8]) -> &'static str {
    if image.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if image.len() >= 12 && &image[0..4] == b"RIFF" && &image[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}
