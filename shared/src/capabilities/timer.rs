use crux_core::capability::{CapabilityContext, Operation};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::model::UnixTimeMs;

/// What a timer is for. Each kind belongs to exactly one controller, which is how
/// `TimerFired` events are routed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    ClockRefresh,
    DeepLinkDelay,
    FrameBarrier,
    ResetDebounce,
    AutoClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId {
    pub kind: TimerKind,
    pub generation: u64,
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}#{}", self.kind, self.generation)
    }
}

/// Hands out timer ids whose generation never repeats for a given owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerIds {
    generation: u64,
}

impl TimerIds {
    pub fn next(&mut self, kind: TimerKind) -> TimerId {
        self.generation += 1;
        TimerId {
            kind,
            generation: self.generation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum TimerOperation {
    Start { id: TimerId, millis: u64 },
    Repeat { id: TimerId, millis: u64 },
    Cancel { id: TimerId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TimerOutput {
    Fired { id: TimerId },
    Tick { id: TimerId, now: UnixTimeMs },
    Cancelled { id: TimerId },
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

#[derive(crux_core::macros::Capability)]
pub struct Timer<Ev> {
    context: CapabilityContext<TimerOperation, Ev>,
}

impl<Ev> Timer<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<TimerOperation, Ev>) -> Self {
        Self { context }
    }

    /// One-shot timer. The shell answers `Fired` or, after a `cancel`, `Cancelled`.
    pub fn start<F>(&self, id: TimerId, millis: u64, callback: F)
    where
        F: FnOnce(TimerOutput) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx
                .request_from_shell(TimerOperation::Start { id, millis })
                .await;
            ctx.update_app(callback(output));
        });
    }

    /// Repeating timer; every `Tick` carries the shell's wall clock.
    pub fn repeat<F>(&self, id: TimerId, millis: u64, callback: F)
    where
        F: Fn(TimerOutput) -> Ev + Send + Sync + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let mut ticks =
                std::pin::pin!(ctx.stream_from_shell(TimerOperation::Repeat { id, millis }));
            while let Some(output) = ticks.next().await {
                ctx.update_app(callback(output));
            }
        });
    }

    pub fn cancel(&self, id: TimerId) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(TimerOperation::Cancel { id }).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_across_kinds() {
        let mut ids = TimerIds::default();
        let a = ids.next(TimerKind::AutoClose);
        let b = ids.next(TimerKind::AutoClose);
        let c = ids.next(TimerKind::FrameBarrier);
        assert_ne!(a, b);
        assert_ne!(b.generation, c.generation);
    }

    #[test]
    fn tick_deserializes_from_shell_payload() {
        let json = r#"{"type":"Tick","data":{"id":{"kind":"clock_refresh","generation":1},"now":1700000000000}}"#;
        let output: TimerOutput = serde_json::from_str(json).unwrap();
        assert_eq!(
            output,
            TimerOutput::Tick {
                id: TimerId {
                    kind: TimerKind::ClockRefresh,
                    generation: 1
                },
                now: UnixTimeMs(1_700_000_000_000),
            }
        );
    }
}
