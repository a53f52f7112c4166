//! # Wire Models
//!
//! Request and response shapes of the post service. Responses are decoded
//! leniently: unknown fields are kept in `extra` and identifier fields accept
//! both the `postId` and `id` spellings the services use.

use chrono::NaiveDateTime;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{HarnessError, HarnessResult};

/// Body of `POST /api/posts`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPost {
    pub text: String,
    pub reply_id: Option<Uuid>,
    pub repost_id: Option<Uuid>,
    pub media: Option<MediaAttachment>,
}

/// File uploaded alongside a post
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl NewPost {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn reply_to(text: impl Into<String>, reply_id: Uuid) -> Self {
        Self {
            text: text.into(),
            reply_id: Some(reply_id),
            ..Self::default()
        }
    }

    pub fn repost_of(text: impl Into<String>, repost_id: Uuid) -> Self {
        Self {
            text: text.into(),
            repost_id: Some(repost_id),
            ..Self::default()
        }
    }

    pub fn with_media(mut self, media: MediaAttachment) -> Self {
        self.media = Some(media);
        self
    }

    /// Multipart form with the four fields the post service reads
    ///
    /// Absent ids and media are sent as empty fields, which the service
    /// treats as "none".
    pub fn to_form(&self) -> HarnessResult<Form> {
        let form = Form::new()
            .text("text", self.text.clone())
            .text("replyId", optional_id(self.reply_id))
            .text("repostId", optional_id(self.repost_id));

        let form = match &self.media {
            Some(media) => {
                let part = Part::bytes(media.bytes.clone())
                    .file_name(media.file_name.clone())
                    .mime_str(&media.content_type)
                    .map_err(|e| {
                        HarnessError::InvalidInput(format!(
                            "Invalid media content type '{}': {}",
                            media.content_type, e
                        ))
                    })?;
                form.part("media", part)
            }
            None => form.text("media", String::new()),
        };

        Ok(form)
    }
}

fn optional_id(id: Option<Uuid>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

/// `201` body of `POST /api/posts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPost {
    #[serde(rename = "postId", alias = "id")]
    pub post_id: Uuid,
}

/// A post as returned by the post and timeline services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    #[serde(alias = "postId")]
    pub id: Uuid,
    #[serde(default)]
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub media_id: Option<String>,
    #[serde(default)]
    pub repost_id: Option<Uuid>,
    #[serde(default)]
    pub reply_id: Option<Uuid>,
    #[serde(default)]
    pub creation_date: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}
