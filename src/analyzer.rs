use crate::error::AppResult;
use crate::llm_gateway::AnalysisService;
use crate::schema::{ActiveFile, Content, FileData, GenerationConfig, ModelSettings, Part};
use crate::uploader::DEFAULT_MIME_TYPE;

pub const SYSTEM_INSTRUCTION: &str = "You are an expert sentiment analyzer. Analyze the content of the uploaded CSV file and provide sentiment percentages for positive, negative, and neutral reviews, along with the count in each category. Do not give the response in markdown format just give plain string, give the perfect integer numbers";

pub const FOLLOW_UP_PROMPT: &str = "Analyze the sentiment of this file.";

pub fn sentiment_model_settings(model: &str) -> ModelSettings {
    ModelSettings {
        model: model.to_string(),
        generation_config: GenerationConfig {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        },
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
    }
}

/// Conversation history: one turn carrying the file, then the instruction.
pub fn build_conversation(file: &ActiveFile) -> Vec<Content> {
    let remote = file.file();
    let file_part = Part::FileData(FileData {
        mime_type: remote
            .mime_type
            .clone()
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
        file_uri: remote.uri.clone().unwrap_or_else(|| remote.name.clone()),
    });

    vec![
        Content::user(vec![file_part]),
        Content::user(vec![Part::Text(FOLLOW_UP_PROMPT.to_string())]),
    ]
}

pub struct Analyzer {
    settings: ModelSettings,
}

impl Analyzer {
    pub fn new(model: &str) -> Self {
        Self {
            settings: sentiment_model_settings(model),
        }
    }

    /// Runs the fixed sentiment prompt against `file` and returns the model's
    /// raw reply. Failures propagate unchanged; nothing is retried.
    pub async fn analyze(&self, service: &dyn AnalysisService, file: &ActiveFile) -> AppResult<String> {
        let contents = build_conversation(file);
        let text = service.generate_content(&self.settings, &contents).await?;
        tracing::debug!(file = %file.file().name, chars = text.len(), "received analysis");
        Ok(text)
    }
}
