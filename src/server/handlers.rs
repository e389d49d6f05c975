//! HTTP request handlers
//!
//! Handlers validate input, take the caller's identity from the gate, apply
//! the ownership check for mutations, and orchestrate ingestion against the
//! repository. Attachment ingestion always happens before the record write;
//! if the record write then fails, the fresh file is best-effort removed.

use axum::{
    extract::{ConnectInfo, Multipart, Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::auth::ensure_owner;
use crate::database::Database;
use crate::error::ApiError;
use crate::models::{
    Item, ItemPatch, LoginRequest, LoginResponse, NewItem, RegisterRequest, UserInfo, UserSummary,
};

use super::middleware::Identity;
use super::router::AppState;

/// Multipart field name for a single attachment
pub const FILE_FIELD: &str = "item_image";

/// Multipart field name for batch uploads
pub const BATCH_FILE_FIELD: &str = "item_images";

/// Maximum number of files accepted by a batch upload
pub const MAX_BATCH_FILES: usize = 5;

// =============================================================================
// Response types
// =============================================================================

/// Create-item response: the record plus echoed file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreated {
    pub item: Item,
    pub file_name: String,
    pub file_path: String,
}

/// Delete confirmation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Standalone upload response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_name: String,
    pub file_path: String,
}

/// Batch upload response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchUploadResponse {
    pub message: String,
    pub count: usize,
    pub files: Vec<String>,
}

// =============================================================================
// User handlers
// =============================================================================

/// POST /users/register
pub async fn register<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserInfo>), ApiError> {
    request.validate()?;

    let user = state.accounts.register(&request).await?;
    Ok((StatusCode::CREATED, Json(UserInfo::from(&user))))
}

/// POST /users/login
pub async fn login<D: Database + 'static>(
    State(state): State<AppState<D>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let user = state
        .accounts
        .verify_credentials(&request.username, &request.password, Some(addr.ip()))
        .await?;
    let token = state.tokens.issue(&user)?;

    tracing::info!(user_id = %user.id, "Login succeeded");
    Ok(Json(LoginResponse {
        token,
        user: UserSummary::from(&user),
    }))
}

// =============================================================================
// Item handlers
// =============================================================================

/// POST /items
pub async fn create_item<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(identity): Extension<Identity>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ItemCreated>), ApiError> {
    let (fields, file) = read_item_multipart(multipart).await?;

    let fields = NewItem {
        title: fields.title.unwrap_or_default(),
        description: fields.description.unwrap_or_default(),
        status: fields.status.unwrap_or_default(),
    };
    fields.validate()?;

    let (original_name, data) =
        file.ok_or_else(|| ApiError::Validation("No file uploaded.".to_string()))?;

    // Ingest first so the record never references a file that does not exist
    let attachment = state
        .ingestor
        .ingest(data, &original_name, FILE_FIELD)
        .await?;

    let item = Item::new(&identity.user_id, fields, attachment.clone());
    if let Err(e) = state.database.create_item(&item).await {
        state.ingestor.discard(&attachment).await;
        return Err(e.into());
    }

    tracing::info!(item_id = %item.id, owner_id = %item.owner_id, "Item created");
    Ok((
        StatusCode::CREATED,
        Json(ItemCreated {
            file_name: attachment.file_name,
            file_path: attachment.file_path,
            item,
        }),
    ))
}

/// GET /items — only the caller's own items
pub async fn list_items<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state.database.list_items_by_owner(&identity.user_id).await?;
    Ok(Json(items))
}

/// GET /items/:id — any item, not owner-scoped
pub async fn item_detail<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let item = state
        .database
        .get_item(&id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(item))
}

/// PATCH /items/:id — owner only; fields absent from the patch are untouched
pub async fn update_item<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Item>, ApiError> {
    let (fields, file) = read_item_multipart(multipart).await?;

    let mut patch = ItemPatch {
        title: fields.title,
        description: fields.description,
        status: fields.status,
        attachment: None,
    };
    if patch.is_empty() && file.is_none() {
        return Err(ApiError::Validation(
            "No updatable fields provided".to_string(),
        ));
    }
    patch.validate()?;

    // Existence before ownership keeps 404 and 403 distinguishable
    let item = state
        .database
        .get_item(&id)
        .await?
        .ok_or(ApiError::NotFound)?;
    ensure_owner(&item, &identity.user_id)?;

    if let Some((original_name, data)) = file {
        let attachment = state
            .ingestor
            .ingest(data, &original_name, FILE_FIELD)
            .await?;
        patch.attachment = Some(attachment);
    }

    match state.database.update_item(&id, &patch).await {
        Ok(Some(updated)) => Ok(Json(updated)),
        Ok(None) => {
            // Deleted between the lookup and the update
            if let Some(attachment) = &patch.attachment {
                state.ingestor.discard(attachment).await;
            }
            Err(ApiError::NotFound)
        }
        Err(e) => {
            if let Some(attachment) = &patch.attachment {
                state.ingestor.discard(attachment).await;
            }
            Err(e.into())
        }
    }
}

/// DELETE /items/:id — owner only
pub async fn delete_item<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let item = state
        .database
        .get_item(&id)
        .await?
        .ok_or(ApiError::NotFound)?;
    ensure_owner(&item, &identity.user_id)?;

    if !state.database.delete_item(&id).await? {
        return Err(ApiError::NotFound);
    }

    tracing::info!(item_id = %id, owner_id = %identity.user_id, "Item deleted");
    Ok(Json(MessageResponse {
        message: "Item deleted successfully!".to_string(),
    }))
}

// =============================================================================
// Standalone upload handlers
// =============================================================================

/// POST /uploads — store a single file without creating an item
pub async fn upload_single<D: Database + 'static>(
    State(state): State<AppState<D>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let files = read_files(multipart, FILE_FIELD, 1).await?;
    let (original_name, data) = files
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Validation("No file uploaded.".to_string()))?;

    let attachment = state
        .ingestor
        .ingest(data, &original_name, FILE_FIELD)
        .await?;

    Ok(Json(UploadResponse {
        message: "File uploaded successfully!".to_string(),
        file_name: attachment.file_name,
        file_path: attachment.file_path,
    }))
}

/// POST /uploads/batch — store up to `MAX_BATCH_FILES` files
pub async fn upload_batch<D: Database + 'static>(
    State(state): State<AppState<D>>,
    multipart: Multipart,
) -> Result<Json<BatchUploadResponse>, ApiError> {
    let files = read_files(multipart, BATCH_FILE_FIELD, MAX_BATCH_FILES).await?;
    if files.is_empty() {
        return Err(ApiError::Validation("No files uploaded.".to_string()));
    }

    let mut stored = Vec::with_capacity(files.len());
    for (original_name, data) in files {
        match state
            .ingestor
            .ingest(data, &original_name, BATCH_FILE_FIELD)
            .await
        {
            Ok(attachment) => stored.push(attachment),
            Err(e) => {
                // A partial batch is worse than none: drop what already landed
                for attachment in &stored {
                    state.ingestor.discard(attachment).await;
                }
                return Err(e.into());
            }
        }
    }

    Ok(Json(BatchUploadResponse {
        message: "Files uploaded successfully!".to_string(),
        count: stored.len(),
        files: stored.into_iter().map(|a| a.file_name).collect(),
    }))
}

// =============================================================================
// Multipart helpers
// =============================================================================

/// Text fields collected from an item multipart payload
#[derive(Debug, Default)]
struct ItemFields {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
}

type UploadedFile = (String, Bytes);

/// Read the item form: known text fields plus at most one `item_image` file
///
/// Unknown fields are skipped; malformed multipart input is a validation
/// failure.
async fn read_item_multipart(
    mut multipart: Multipart,
) -> Result<(ItemFields, Option<UploadedFile>), ApiError> {
    let mut fields = ItemFields::default();
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => {
                fields.title = Some(field.text().await.map_err(malformed_multipart)?);
            }
            Some("description") => {
                fields.description = Some(field.text().await.map_err(malformed_multipart)?);
            }
            Some("status") => {
                fields.status = Some(field.text().await.map_err(malformed_multipart)?);
            }
            Some(name) if name == FILE_FIELD => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await.map_err(malformed_multipart)?;
                file = Some((original_name, data));
            }
            _ => {
                // Drain and ignore anything unrecognized
                let _ = field.bytes().await.map_err(malformed_multipart)?;
            }
        }
    }

    Ok((fields, file))
}

/// Collect files from repeated occurrences of one field, bounded by `max`
async fn read_files(
    mut multipart: Multipart,
    field_name: &str,
    max: usize,
) -> Result<Vec<UploadedFile>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed_multipart)? {
        if field.name() != Some(field_name) {
            let _ = field.bytes().await.map_err(malformed_multipart)?;
            continue;
        }

        if files.len() == max {
            return Err(ApiError::Validation(format!(
                "At most {} files are accepted",
                max
            )));
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let data = field.bytes().await.map_err(malformed_multipart)?;
        files.push((original_name, data));
    }

    Ok(files)
}

fn malformed_multipart(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::Validation(format!("Malformed multipart payload: {}", err))
}
