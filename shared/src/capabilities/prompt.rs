use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

/// A native two-button confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub destructive: bool,
}

impl ConfirmRequest {
    #[must_use]
    pub fn discard_post() -> Self {
        Self {
            title: "Discard Post?".into(),
            message: "Are you sure you want to discard this post?".into(),
            confirm_label: "Discard".into(),
            cancel_label: "Cancel".into(),
            destructive: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum PromptOperation {
    Confirm(ConfirmRequest),
}

impl Operation for PromptOperation {
    /// `true` when the user picked the confirm button.
    type Output = bool;
}

#[derive(crux_core::macros::Capability)]
pub struct Prompt<Ev> {
    context: CapabilityContext<PromptOperation, Ev>,
}

impl<Ev> Prompt<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<PromptOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn confirm<F>(&self, request: ConfirmRequest, callback: F)
    where
        F: FnOnce(bool) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let confirmed = ctx
                .request_from_shell(PromptOperation::Confirm(request))
                .await;
            ctx.update_app(callback(confirmed));
        });
    }
}
