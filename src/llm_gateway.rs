use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::schema::{Content, GenerationConfig, ModelSettings, Part, RemoteFile};

/// The three remote calls the analysis pipeline needs.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn upload_file(&self, path: &Path, display_name: &str, mime_type: &str) -> AppResult<RemoteFile>;

    async fn get_file(&self, name: &str) -> AppResult<RemoteFile>;

    /// Sends the conversation to the model and returns the reply text.
    async fn generate_content(&self, settings: &ModelSettings, contents: &[Content]) -> AppResult<String>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    api_base: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: SystemInstruction,
    contents: &'a [Content],
    generation_config: &'a GenerationConfig,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct UploadEnvelope {
    file: RemoteFile,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.clone(),
        })
    }

    async fn error_text(resp: reqwest::Response) -> String {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        format!("{} {}", status, body.trim())
    }
}

#[async_trait]
impl AnalysisService for GeminiClient {
    async fn upload_file(&self, path: &Path, display_name: &str, mime_type: &str) -> AppResult<RemoteFile> {
        let upload_err = |reason: String| AppError::Upload {
            file: display_name.to_string(),
            reason,
        };
        let bytes = tokio::fs::read(path).await?;

        // Resumable protocol: "start" hands back the URL that receives the bytes.
        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", self.api_base))
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await
            .map_err(|e| upload_err(e.to_string()))?;

        if !start.status().is_success() {
            return Err(upload_err(Self::error_text(start).await));
        }

        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| upload_err("no upload URL in response".to_string()))?;

        let finish = self
            .client
            .post(&upload_url)
            .header("Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await
            .map_err(|e| upload_err(e.to_string()))?;

        if !finish.status().is_success() {
            return Err(upload_err(Self::error_text(finish).await));
        }

        let envelope: UploadEnvelope = finish.json().await.map_err(|e| upload_err(e.to_string()))?;
        tracing::info!(file = %envelope.file.name, state = %envelope.file.state, "uploaded {}", display_name);
        Ok(envelope.file)
    }

    async fn get_file(&self, name: &str) -> AppResult<RemoteFile> {
        let poll_err = |reason: String| AppError::Poll {
            name: name.to_string(),
            reason,
        };
        let resp = self
            .client
            .get(format!("{}/v1beta/{}", self.api_base, name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| poll_err(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(poll_err(Self::error_text(resp).await));
        }

        resp.json().await.map_err(|e| poll_err(e.to_string()))
    }

    async fn generate_content(&self, settings: &ModelSettings, contents: &[Content]) -> AppResult<String> {
        let body = GenerateContentRequest {
            system_instruction: SystemInstruction {
                parts: vec![Part::Text(settings.system_instruction.clone())],
            },
            contents,
            generation_config: &settings.generation_config,
        };

        let resp = self
            .client
            .post(format!("{}/v1beta/models/{}:generateContent", self.api_base, settings.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::LLM(format!(
                "Gemini rejected the API key: {}",
                Self::error_text(resp).await
            )));
        }
        if !status.is_success() {
            return Err(AppError::LLM(format!("Gemini API Error: {}", Self::error_text(resp).await)));
        }

        let parsed: GenerateContentResponse = resp.json().await?;
        response_text(parsed)
    }
}

fn response_text(resp: GenerateContentResponse) -> AppResult<String> {
    let candidate = match resp.candidates.into_iter().next() {
        Some(c) => c,
        None => {
            let feedback = resp
                .prompt_feedback
                .map(|f| f.to_string())
                .unwrap_or_else(|| "none".to_string());
            return Err(AppError::LLM(format!(
                "No candidates in Gemini response (prompt feedback: {})",
                feedback
            )));
        }
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(AppError::LLM(format!(
            "No text in Gemini response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }
    Ok(text)
}
