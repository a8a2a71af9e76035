use std::path::Path;

use crate::error::AppResult;
use crate::llm_gateway::AnalysisService;
use crate::schema::RemoteFile;

pub const DEFAULT_MIME_TYPE: &str = "text/csv";

/// Sends a local file to the remote service. The content is not inspected;
/// a bad file is reported by the service.
pub async fn upload_to_service(
    service: &dyn AnalysisService,
    path: &Path,
    display_name: &str,
    mime_type: Option<&str>,
) -> AppResult<RemoteFile> {
    let mime_type = mime_type.unwrap_or(DEFAULT_MIME_TYPE);
    tracing::debug!(path = %path.display(), mime_type, "uploading {}", display_name);
    service.upload_file(path, display_name, mime_type).await
}
