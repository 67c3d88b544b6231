mod navigation;
mod post_store;
mod prompt;
mod timer;

pub use self::navigation::{Navigation, NavigationOperation};
pub use self::post_store::{
    CreatePostRequest, PostStore, PostStoreOperation, PostStoreOutput, StatusUpdate,
    SubscriptionId,
};
pub use self::prompt::{ConfirmRequest, Prompt, PromptOperation};
pub use self::timer::{Timer, TimerId, TimerIds, TimerKind, TimerOperation, TimerOutput};

// Crux's built-in Render capability covers view updates as-is.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub post_store: PostStore<Event>,
    pub timer: Timer<Event>,
    pub prompt: Prompt<Event>,
    pub navigation: Navigation<Event>,
}
