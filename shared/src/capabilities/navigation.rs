use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationOperation {
    GoBack,
}

impl Operation for NavigationOperation {
    type Output = ();
}

#[derive(crux_core::macros::Capability)]
pub struct Navigation<Ev> {
    context: CapabilityContext<NavigationOperation, Ev>,
}

impl<Ev> Navigation<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<NavigationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn go_back(&self) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(NavigationOperation::GoBack).await;
        });
    }
}
