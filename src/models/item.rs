//! Item models
//!
//! An item is owned by exactly one user, fixed at creation. `ItemPatch`
//! carries a partial update: fields left as `None` are not touched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Title length bounds
pub const TITLE_MIN_LENGTH: usize = 3;
pub const TITLE_MAX_LENGTH: usize = 200;

/// Description length bounds
pub const DESCRIPTION_MIN_LENGTH: usize = 3;
pub const DESCRIPTION_MAX_LENGTH: usize = 400;

/// Reference to a stored attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Derived storage name, unique per upload
    pub file_name: String,

    /// Path the bytes were written to
    pub file_path: String,
}

/// Item record stored in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item ID, assigned at creation
    pub id: String,

    /// Identity of the creating user; never reassigned
    pub owner_id: String,

    pub title: String,
    pub description: String,
    pub status: String,

    /// Attachment reference; required from creation
    #[serde(flatten)]
    pub attachment: AttachmentRef,

    /// When the item was created
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Create a new item owned by `owner_id` with a fresh id
    pub fn new(owner_id: impl Into<String>, fields: NewItem, attachment: AttachmentRef) -> Self {
        Self {
            id: super::new_record_id(),
            owner_id: owner_id.into(),
            title: fields.title,
            description: fields.description,
            status: fields.status,
            attachment,
            created_at: Utc::now(),
        }
    }
}

/// Descriptive fields for item creation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub status: String,
}

impl NewItem {
    /// Validate the create-item field constraints
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_title(&self.title)?;
        validate_description(&self.description)?;
        if self.status.is_empty() {
            return Err(ApiError::Validation(
                "Status must be a non-empty string".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update for an item
///
/// `None` means "leave unchanged". The attachment is set by the handler when
/// a replacement file was uploaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub attachment: Option<AttachmentRef>,
}

impl ItemPatch {
    /// True when the patch carries no change at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.attachment.is_none()
    }

    /// Validate whichever fields are present, with the same bounds as create
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(status) = &self.status {
            if status.is_empty() {
                return Err(ApiError::Validation(
                    "Status must be a non-empty string".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    let len = title.chars().count();
    if !(TITLE_MIN_LENGTH..=TITLE_MAX_LENGTH).contains(&len) {
        return Err(ApiError::Validation(format!(
            "Title must be between {} and {} characters",
            TITLE_MIN_LENGTH, TITLE_MAX_LENGTH
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ApiError> {
    let len = description.chars().count();
    if !(DESCRIPTION_MIN_LENGTH..=DESCRIPTION_MAX_LENGTH).contains(&len) {
        return Err(ApiError::Validation(format!(
            "Description must be between {} and {} characters",
            DESCRIPTION_MIN_LENGTH, DESCRIPTION_MAX_LENGTH
        )));
    }
    Ok(())
}
