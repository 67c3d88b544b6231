#![allow(dead_code)]

use std::collections::VecDeque;

use crux_core::capability::Operation;
use crux_core::testing::AppTester;
use crux_core::Request;
use shared::capabilities::{
    NavigationOperation, PostStoreOperation, PromptOperation, TimerId, TimerKind, TimerOperation,
};
use shared::{App, Effect, Event, Model};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Effects from one step, split by capability.
#[derive(Default)]
pub struct Effects {
    pub renders: usize,
    pub store: Vec<Request<PostStoreOperation>>,
    pub timers: Vec<Request<TimerOperation>>,
    pub prompts: Vec<Request<PromptOperation>>,
    pub navigation: Vec<Request<NavigationOperation>>,
}

impl Effects {
    fn absorb(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Render(_) => self.renders += 1,
                Effect::PostStore(request) => self.store.push(request),
                Effect::Timer(request) => self.timers.push(request),
                Effect::Prompt(request) => self.prompts.push(request),
                Effect::Navigation(request) => self.navigation.push(request),
            }
        }
    }

    /// Removes and returns the started one-shot timer of `kind`.
    pub fn take_timer(&mut self, kind: TimerKind) -> Option<Request<TimerOperation>> {
        let index = self.timers.iter().position(|r| {
            matches!(&r.operation, TimerOperation::Start { id, .. } if id.kind == kind)
        })?;
        Some(self.timers.remove(index))
    }

    pub fn take_clock(&mut self) -> Option<Request<TimerOperation>> {
        let index = self
            .timers
            .iter()
            .position(|r| matches!(&r.operation, TimerOperation::Repeat { .. }))?;
        Some(self.timers.remove(index))
    }

    pub fn started(&self, kind: TimerKind) -> usize {
        self.timers
            .iter()
            .filter(|r| matches!(&r.operation, TimerOperation::Start { id, .. } if id.kind == kind))
            .count()
    }

    pub fn cancelled(&self) -> Vec<TimerId> {
        self.timers
            .iter()
            .filter_map(|r| match &r.operation {
                TimerOperation::Cancel { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn take_store(
        &mut self,
        matches: impl Fn(&PostStoreOperation) -> bool,
    ) -> Option<Request<PostStoreOperation>> {
        let index = self.store.iter().position(|r| matches(&r.operation))?;
        Some(self.store.remove(index))
    }

    pub fn unwatches(&self) -> usize {
        self.store
            .iter()
            .filter(|r| matches!(r.operation, PostStoreOperation::Unwatch { .. }))
            .count()
    }
}

pub struct Harness {
    pub app: AppTester<App, Effect>,
    pub model: Model,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        Self {
            app: AppTester::default(),
            model: Model::default(),
        }
    }

    /// Runs `event` and every event the capabilities emit in response, in order.
    pub fn send(&mut self, event: Event) -> Effects {
        let mut effects = Effects::default();
        self.run(VecDeque::from([event]), &mut effects);
        effects
    }

    pub fn resolve<Op: Operation>(&mut self, request: &mut Request<Op>, output: Op::Output) -> Effects {
        let update = self
            .app
            .resolve(request, output)
            .expect("request should resolve");
        let mut effects = Effects::default();
        effects.absorb(update.effects);
        self.run(update.events.into(), &mut effects);
        effects
    }

    fn run(&mut self, mut queue: VecDeque<Event>, effects: &mut Effects) {
        while let Some(event) = queue.pop_front() {
            let update = self.app.update(event, &mut self.model);
            effects.absorb(update.effects);
            queue.extend(update.events);
        }
    }

    pub fn frame(&mut self, elapsed_ms: f64) -> Effects {
        self.send(Event::AnimationFrame { elapsed_ms })
    }
}
