use crate::services::uploads::{
    mime_from_extension, safe_file_name, sanitize_blob_name, MAX_UPLOAD_SIZE,
};
use crate::startup::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub ok: bool,
    pub url: String,
    pub file_name: String,
    pub size: usize,
}

/// Multipart upload with a `file` part and a `sessionId` part. The
/// stored name is server-generated; the client name only contributes
/// its extension.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut session_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {e}"))
    })? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let original_name = field.file_name().unwrap_or("upload.jpg").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {e}"))
                })?;
                file = Some((original_name, content_type, data.to_vec()));
            }
            Some("sessionId") => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read sessionId: {e}"))
                })?;
                session_id = Some(value);
            }
            _ => {}
        }
    }

    let (original_name, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Lipseste fisierul.")))?;
    let session_id = session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Lipseste sessionId.")))?;

    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Doar imagini pot fi incarcate."
        )));
    }
    if data.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Fisierul este prea mare (maxim 4MB)."
        )));
    }

    let file_name = safe_file_name(&original_name);
    let size = data.len();
    state.blobs.put(&file_name, data).await?;

    let url = format!("/api/assistant/uploads/{file_name}");
    state.store.add_session_image(&session_id, &url).await?;

    tracing::info!(
        session_id = %session_id,
        file_name = %file_name,
        size,
        "Image uploaded"
    );

    Ok(Json(UploadResponse {
        ok: true,
        url,
        file_name,
        size,
    }))
}

pub async fn serve_upload(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let name = sanitize_blob_name(&name);
    let bytes = state
        .blobs
        .get(name)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("no upload named {name}")))?;

    Ok(([(header::CONTENT_TYPE, mime_from_extension(name))], bytes))
}
