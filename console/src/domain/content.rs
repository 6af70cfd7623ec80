//! Portfolio content records shared by the Projects and Templates resources.
//!
//! Both resources carry the same structural shape on the wire; they differ
//! only in route and payload key, which the HTTP adapters own. The form type
//! here mirrors the create/edit modal: required category and title, optional
//! descriptive fields, and a comma-separated badge input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::FieldErrors;
use super::user::RecordId;

/// A project or template record as returned by the content endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Immutable backend-assigned identity.
    pub id: RecordId,
    /// Grouping category shown as a badge.
    pub category: String,
    /// Display title.
    pub title: String,
    /// Optional long description.
    pub desc: Option<String>,
    /// Optional preview image URL.
    pub img_url: Option<String>,
    /// Optional link to the live project.
    pub project_url: Option<String>,
    /// Optional badge labels.
    pub badge: Option<Vec<String>>,
    /// Creation audit timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-modification audit timestamp.
    pub updated_at: DateTime<Utc>,
}

/// One page of a content list plus the server-side count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentListPage {
    /// Records in list order.
    pub items: Vec<Content>,
    /// Server-side count of records.
    pub count: i64,
}

/// Payload for creating a content record.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewContent {
    /// Grouping category.
    pub category: String,
    /// Display title.
    pub title: String,
    /// Optional long description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Optional preview image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    /// Optional link to the live project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    /// Optional badge labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Vec<String>>,
}

/// Partial update for a content record; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentPatch {
    /// Replace the category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Replace the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replace the description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Replace the preview image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    /// Replace the live-project link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    /// Replace the badge labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Vec<String>>,
}

/// Raw create/edit modal state, validated before submission.
#[derive(Debug, Clone, Default)]
pub struct ContentForm {
    /// Category input value (required).
    pub category: String,
    /// Title input value (required).
    pub title: String,
    /// Description textarea value.
    pub desc: String,
    /// Image URL input value.
    pub img_url: String,
    /// Project URL input value.
    pub project_url: String,
    /// Comma-separated badge input value.
    pub badge: String,
}

impl ContentForm {
    /// Seed the form from an existing record for the edit modal.
    #[must_use]
    pub fn from_record(record: &Content) -> Self {
        Self {
            category: record.category.clone(),
            title: record.title.clone(),
            desc: record.desc.clone().unwrap_or_default(),
            img_url: record.img_url.clone().unwrap_or_default(),
            project_url: record.project_url.clone().unwrap_or_default(),
            badge: record
                .badge
                .as_deref()
                .map(|labels| labels.join(", "))
                .unwrap_or_default(),
        }
    }

    /// Run the modal's synchronous validation rules.
    ///
    /// Empty optional inputs become absent fields rather than empty strings;
    /// the badge input splits on commas with blanks dropped.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldErrors`] map when category or title are blank.
    pub fn validate(&self) -> Result<NewContent, FieldErrors> {
        let mut errors = FieldErrors::new();
        let category = self.category.trim();
        if category.is_empty() {
            errors.insert("category", "Category is required");
        }
        let title = self.title.trim();
        if title.is_empty() {
            errors.insert("title", "Title is required");
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewContent {
            category: category.to_owned(),
            title: title.to_owned(),
            desc: optional(&self.desc),
            img_url: optional(&self.img_url),
            project_url: optional(&self.project_url),
            badge: badge_labels(&self.badge),
        })
    }

    /// Same rules as [`ContentForm::validate`], producing a patch for the
    /// edit modal. All shape fields are sent so the edit form's cleared
    /// inputs clear the record.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldErrors`] map when category or title are blank.
    pub fn validate_patch(&self) -> Result<ContentPatch, FieldErrors> {
        let draft = self.validate()?;
        Ok(ContentPatch {
            category: Some(draft.category),
            title: Some(draft.title),
            desc: draft.desc,
            img_url: draft.img_url,
            project_url: draft.project_url,
            badge: draft.badge,
        })
    }
}

fn optional(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn badge_labels(input: &str) -> Option<Vec<String>> {
    let labels: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_owned)
        .collect();
    if labels.is_empty() { None } else { Some(labels) }
}
