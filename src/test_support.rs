//! In-memory stand-in for the remote analysis service.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{AppError, AppResult};
use crate::llm_gateway::AnalysisService;
use crate::schema::{Content, FileState, ModelSettings, RemoteFile};

pub fn remote_file(name: &str, state: FileState) -> RemoteFile {
    RemoteFile {
        name: name.to_string(),
        display_name: None,
        mime_type: Some("text/csv".to_string()),
        uri: None,
        state,
    }
}

#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub path: PathBuf,
    pub display_name: String,
    pub existed: bool,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct FakeService {
    states: Mutex<VecDeque<FileState>>,
    reply: Option<String>,
    upload_error: Option<String>,
    generate_error: Option<String>,
    get_file_calls: AtomicUsize,
    uploads: Mutex<Vec<UploadRecord>>,
    conversations: Mutex<Vec<Vec<Content>>>,
}

impl FakeService {
    /// States returned by successive `get_file` calls. When non-empty, the
    /// upload itself reports `PROCESSING`.
    pub fn with_states(self, states: Vec<FileState>) -> Self {
        *self.states.lock().unwrap() = states.into();
        self
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = Some(reply.to_string());
        self
    }

    pub fn failing_upload(mut self, reason: &str) -> Self {
        self.upload_error = Some(reason.to_string());
        self
    }

    pub fn failing_generate(mut self, reason: &str) -> Self {
        self.generate_error = Some(reason.to_string());
        self
    }

    pub fn get_file_calls(&self) -> usize {
        self.get_file_calls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn last_conversation(&self) -> Option<Vec<Content>> {
        self.conversations.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AnalysisService for FakeService {
    async fn upload_file(&self, path: &Path, display_name: &str, mime_type: &str) -> AppResult<RemoteFile> {
        self.uploads.lock().unwrap().push(UploadRecord {
            path: path.to_path_buf(),
            display_name: display_name.to_string(),
            existed: path.exists(),
            bytes: std::fs::read(path).unwrap_or_default(),
        });

        if let Some(reason) = &self.upload_error {
            return Err(AppError::Upload {
                file: display_name.to_string(),
                reason: reason.clone(),
            });
        }

        let state = if self.states.lock().unwrap().is_empty() {
            FileState::Active
        } else {
            FileState::Processing
        };
        Ok(RemoteFile {
            name: "files/fake-1".to_string(),
            display_name: Some(display_name.to_string()),
            mime_type: Some(mime_type.to_string()),
            uri: Some("https://files.example/files/fake-1".to_string()),
            state,
        })
    }

    async fn get_file(&self, name: &str) -> AppResult<RemoteFile> {
        self.get_file_calls.fetch_add(1, Ordering::SeqCst);
        let state = self
            .states
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(FileState::Active);
        Ok(remote_file(name, state))
    }

    async fn generate_content(&self, _settings: &ModelSettings, contents: &[Content]) -> AppResult<String> {
        self.conversations.lock().unwrap().push(contents.to_vec());
        if let Some(reason) = &self.generate_error {
            return Err(AppError::LLM(reason.clone()));
        }
        Ok(self
            .reply
            .clone()
            .unwrap_or_else(|| "Positive: 70%\nNegative: 20%\nNeutral: 10%".to_string()))
    }
}
