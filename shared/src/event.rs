use serde::{Deserialize, Serialize};

use crate::capabilities::{StatusUpdate, SubscriptionId, TimerOutput};
use crate::config::CoreConfig;
use crate::error::StoreError;
use crate::model::{PostCategory, PostId, ReachOutId, ReachOutRecord, UnixTimeMs, UserId};
use crate::reach_outs::PresentationMode;
use crate::transition::Anchor;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    Noop,

    Configure(Box<CoreConfig>),
    SessionChanged {
        user_id: Option<UserId>,
    },
    /// One rendering-clock frame from the shell.
    AnimationFrame {
        elapsed_ms: f64,
    },

    // --- reach outs screen ---
    ReachOutsMounted {
        now: UnixTimeMs,
    },
    ReachOutsUnmounted,
    ReachOutsLoading,
    ReachOutsLoaded {
        records: Vec<ReachOutRecord>,
    },
    ReachOutsFailed {
        message: String,
    },
    DeepLinkRequested {
        target: ReachOutId,
        mode: PresentationMode,
    },
    ReachOutItemMounted {
        id: ReachOutId,
        anchor: Option<Anchor>,
    },
    ReachOutItemUnmounted {
        id: ReachOutId,
    },
    ReachOutPressed {
        id: ReachOutId,
        anchor: Option<Anchor>,
    },
    ReachOutPressIn {
        id: ReachOutId,
    },
    ReachOutPressOut {
        id: ReachOutId,
    },
    ReachOutModalClosed {
        id: ReachOutId,
        velocity: Option<f64>,
    },
    NavigateBack,

    // --- post creation ---
    CreatePostPressed {
        anchor: Option<Anchor>,
    },
    CreatePostPressIn,
    CreatePostPressOut,
    PostTitleChanged(String),
    PostBodyChanged(String),
    PostCategoryToggled(PostCategory),
    SubmitPost,
    RetryPost,
    CloseCreatePost {
        velocity: Option<f64>,
    },
    CreatePostUnmounted,

    // --- capability responses ---
    DiscardAnswered {
        confirmed: bool,
    },
    PostCreated {
        cycle: u64,
        result: Result<PostId, StoreError>,
    },
    PostStatusChanged {
        subscription: SubscriptionId,
        update: StatusUpdate,
    },
    TimerElapsed(TimerOutput),
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Configure(_) => "configure",
            Self::SessionChanged { .. } => "session_changed",
            Self::AnimationFrame { .. } => "animation_frame",
            Self::ReachOutsMounted { .. } => "reach_outs_mounted",
            Self::ReachOutsUnmounted => "reach_outs_unmounted",
            Self::ReachOutsLoading => "reach_outs_loading",
            Self::ReachOutsLoaded { .. } => "reach_outs_loaded",
            Self::ReachOutsFailed { .. } => "reach_outs_failed",
            Self::DeepLinkRequested { .. } => "deep_link_requested",
            Self::ReachOutItemMounted { .. } => "reach_out_item_mounted",
            Self::ReachOutItemUnmounted { .. } => "reach_out_item_unmounted",
            Self::ReachOutPressed { .. } => "reach_out_pressed",
            Self::ReachOutPressIn { .. } => "reach_out_press_in",
            Self::ReachOutPressOut { .. } => "reach_out_press_out",
            Self::ReachOutModalClosed { .. } => "reach_out_modal_closed",
            Self::NavigateBack => "navigate_back",
            Self::CreatePostPressed { .. } => "create_post_pressed",
            Self::CreatePostPressIn => "create_post_press_in",
            Self::CreatePostPressOut => "create_post_press_out",
            Self::PostTitleChanged(_) => "post_title_changed",
            Self::PostBodyChanged(_) => "post_body_changed",
            Self::PostCategoryToggled(_) => "post_category_toggled",
            Self::SubmitPost => "submit_post",
            Self::RetryPost => "retry_post",
            Self::CloseCreatePost { .. } => "close_create_post",
            Self::CreatePostUnmounted => "create_post_unmounted",
            Self::DiscardAnswered { .. } => "discard_answered",
            Self::PostCreated { .. } => "post_created",
            Self::PostStatusChanged { .. } => "post_status_changed",
            Self::TimerElapsed(_) => "timer_elapsed",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::ReachOutPressed { .. }
                | Self::ReachOutPressIn { .. }
                | Self::ReachOutPressOut { .. }
                | Self::ReachOutModalClosed { .. }
                | Self::NavigateBack
                | Self::CreatePostPressed { .. }
                | Self::CreatePostPressIn
                | Self::CreatePostPressOut
                | Self::PostTitleChanged(_)
                | Self::PostBodyChanged(_)
                | Self::PostCategoryToggled(_)
                | Self::SubmitPost
                | Self::RetryPost
                | Self::CloseCreatePost { .. }
                | Self::DiscardAnswered { .. }
        )
    }

    /// Frames arrive at display rate; they are logged at trace level only.
    #[must_use]
    pub const fn is_high_frequency(&self) -> bool {
        matches!(self, Self::AnimationFrame { .. })
    }
}
