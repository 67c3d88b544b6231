//! The shell's document store for community posts.
//!
//! `Create` is a one-shot request; `Watch` is a stream of status snapshots that stays open
//! until the core sends the matching `Unwatch`.

use crux_core::capability::{CapabilityContext, Operation};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{PostCategory, PostDraft, PostId, UserId};

/// Identifies one live status subscription. Never reused within a core instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub categories: Vec<PostCategory>,
    pub author: UserId,
    /// Lets the store drop duplicate creates for one submission.
    pub idempotency_key: Uuid,
}

impl CreatePostRequest {
    #[must_use]
    pub fn new(draft: &PostDraft, author: UserId) -> Self {
        Self {
            title: draft.title.trim().to_string(),
            content: draft.body.trim().to_string(),
            categories: draft.categories.iter().copied().collect(),
            author,
            idempotency_key: Uuid::new_v4(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum PostStoreOperation {
    Create(CreatePostRequest),
    Watch {
        post_id: PostId,
        subscription: SubscriptionId,
    },
    Unwatch {
        subscription: SubscriptionId,
    },
}

/// One delivery on a watch stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StatusUpdate {
    /// `status` is `None` while the document does not exist yet.
    Snapshot { status: Option<String> },
    Failed { error: StoreError },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PostStoreOutput {
    Created(Result<PostId, StoreError>),
    Status(StatusUpdate),
}

impl Operation for PostStoreOperation {
    type Output = PostStoreOutput;
}

#[derive(crux_core::macros::Capability)]
pub struct PostStore<Ev> {
    context: CapabilityContext<PostStoreOperation, Ev>,
}

impl<Ev> PostStore<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<PostStoreOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn create<F>(&self, request: CreatePostRequest, callback: F)
    where
        F: FnOnce(Result<PostId, StoreError>) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx
                .request_from_shell(PostStoreOperation::Create(request))
                .await;
            let result = match output {
                PostStoreOutput::Created(result) => result,
                other => Err(StoreError::Protocol {
                    message: format!("expected Created, got {other:?}"),
                }),
            };
            ctx.update_app(callback(result));
        });
    }

    pub fn watch<F>(&self, post_id: PostId, subscription: SubscriptionId, callback: F)
    where
        F: Fn(StatusUpdate) -> Ev + Send + Sync + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let mut updates = std::pin::pin!(ctx.stream_from_shell(PostStoreOperation::Watch {
                post_id,
                subscription,
            }));
            while let Some(output) = updates.next().await {
                let update = match output {
                    PostStoreOutput::Status(update) => update,
                    other => StatusUpdate::Failed {
                        error: StoreError::Protocol {
                            message: format!("expected Status, got {other:?}"),
                        },
                    },
                };
                ctx.update_app(callback(update));
            }
        });
    }

    pub fn unwatch(&self, subscription: SubscriptionId) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(PostStoreOperation::Unwatch { subscription })
                .await;
        });
    }
}
