use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::config::CoreConfig;
use crate::error::DraftError;
use crate::reach_outs::ReachOutsController;
use crate::submission::SubmissionController;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(ReachOutId);
typed_id!(PostId);
typed_id!(UserId);

/// Explicit timestamp unit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixTimeMs(pub u64);

impl UnixTimeMs {
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }
}

// --- Reach outs ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReachOutStatus {
    #[default]
    Open,
    Answered,
    Closed,
    #[serde(other)]
    Unknown,
}

/// A support request as delivered by the record source. Never mutated locally.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReachOutRecord {
    pub id: ReachOutId,
    pub created_at: UnixTimeMs,
    #[serde(default)]
    pub status: ReachOutStatus,
    #[serde(default)]
    pub response_count: u32,
    /// Opaque display payload, rendered by the shell.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl ReachOutRecord {
    pub fn new(id: impl Into<String>, created_at: UnixTimeMs) -> Self {
        Self {
            id: ReachOutId::new(id),
            created_at,
            status: ReachOutStatus::Open,
            response_count: 0,
            payload: serde_json::Value::Null,
        }
    }
}

// --- Community posts ---

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    Testimonies,
    Resources,
    Questions,
    Other,
}

impl PostCategory {
    pub const ALL: [Self; 4] = [
        Self::Testimonies,
        Self::Resources,
        Self::Questions,
        Self::Other,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Testimonies => "Testimonies",
            Self::Resources => "Resources",
            Self::Questions => "Questions",
            Self::Other => "Other",
        }
    }
}

/// Moderation status of a created post, as written by the backend.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Pending,
    Approved,
    Rejected,
}

impl PostStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form state of the post being composed. Lives only while the modal is mounted.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub categories: BTreeSet<PostCategory>,
}

// Redact debug output because this holds user-written content.
impl fmt::Debug for PostDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostDraft")
            .field("title_len", &self.title.chars().count())
            .field("body_len", &self.body.chars().count())
            .field("categories", &self.categories)
            .finish()
    }
}

impl PostDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            categories: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: PostCategory) -> Self {
        self.categories.insert(category);
        self
    }

    /// True when the user typed something worth confirming before a discard.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.title.trim().is_empty() || !self.body.trim().is_empty()
    }

    pub fn toggle_category(&mut self, category: PostCategory) {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
    }

    pub fn clear(&mut self) {
        self.title.clear();
        self.body.clear();
        self.categories.clear();
    }

    pub fn validate(&self, config: &CoreConfig) -> Result<(), DraftError> {
        let title = self.title.trim();
        let body = self.body.trim();

        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        if body.is_empty() {
            return Err(DraftError::EmptyBody);
        }

        let title_len = title.chars().count();
        if title_len > config.max_title_chars {
            return Err(DraftError::TooLong {
                field: "title",
                len: title_len,
                max: config.max_title_chars,
            });
        }

        let body_len = body.chars().count();
        if body_len > config.max_body_chars {
            return Err(DraftError::TooLong {
                field: "body",
                len: body_len,
                max: config.max_body_chars,
            });
        }

        Ok(())
    }
}

/// Root model: one reach-outs screen and one post creation control.
#[derive(Debug, Default)]
pub struct Model {
    pub session: Option<UserId>,
    pub reach_outs: ReachOutsController,
    pub create_post: SubmissionController,
    pub active_error: Option<crate::error::AppError>,
}

impl Model {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}
