//! Community post submission: form state, the create request, and the moderation-status
//! subscription that moves the screen sequencer through pending → confirmation | rejected.
//!
//! The controller is pure. Side effects are queued as [`SubmissionEffect`]s and executed by the
//! app through capabilities. Asynchronous answers come back tagged (submission cycle,
//! subscription id, timer id) and anything that does not match the live handle is dropped, so
//! at most one subscription is ever live and a closed modal never reacts to an old request.

use tracing::{debug, info, instrument, warn};

use crate::capabilities::{
    CreatePostRequest, StatusUpdate, SubscriptionId, TimerId, TimerIds, TimerKind,
};
use crate::config::CoreConfig;
use crate::error::{AppError, ErrorKind, StoreError, SubmitError};
use crate::model::{PostCategory, PostDraft, PostId, PostStatus, UserId};
use crate::sequencer::{Screen, ScreenSequencer, SequencerStep};
use crate::transition::{Anchor, TransitionController, TransitionOutcome, TransitionPhase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionEffect {
    Create {
        cycle: u64,
        request: CreatePostRequest,
    },
    Watch {
        post_id: PostId,
        subscription: SubscriptionId,
    },
    Unwatch {
        subscription: SubscriptionId,
    },
    StartTimer {
        id: TimerId,
        millis: u64,
    },
    CancelTimer {
        id: TimerId,
    },
    ConfirmDiscard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started { cycle: u64 },
    /// A create or a subscription is still live; nothing changed.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closing,
    AwaitingConfirmation,
    AlreadyClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionController {
    config: CoreConfig,
    fab: TransitionController,
    sequencer: ScreenSequencer,
    draft: PostDraft,
    creating: bool,
    error: Option<AppError>,
    post_id: Option<PostId>,
    subscription: Option<SubscriptionId>,
    cycle: u64,
    subscriptions_opened: u64,
    timers: TimerIds,
    auto_close: Option<TimerId>,
    reset_debounce: Option<TimerId>,
    frame_barrier: Option<TimerId>,
    awaiting_discard: bool,
    effects: Vec<SubmissionEffect>,
}

impl Default for SubmissionController {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}

fn release_timer(slot: &mut Option<TimerId>, effects: &mut Vec<SubmissionEffect>) {
    if let Some(id) = slot.take() {
        effects.push(SubmissionEffect::CancelTimer { id });
    }
}

impl SubmissionController {
    #[must_use]
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            config: config.clone(),
            fab: TransitionController::new(config.transition),
            sequencer: ScreenSequencer::new(config.screen_transition_ms),
            draft: PostDraft::default(),
            creating: false,
            error: None,
            post_id: None,
            subscription: None,
            cycle: 0,
            subscriptions_opened: 0,
            timers: TimerIds::default(),
            auto_close: None,
            reset_debounce: None,
            frame_barrier: None,
            awaiting_discard: false,
            effects: Vec::new(),
        }
    }

    pub fn configure(&mut self, config: &CoreConfig) {
        self.config = config.clone();
        self.fab.set_timing(config.transition);
        self.sequencer.set_duration(config.screen_transition_ms);
    }

    pub fn drain_effects(&mut self) -> Vec<SubmissionEffect> {
        std::mem::take(&mut self.effects)
    }

    // --- floating control ---

    /// Expand the floating control into the modal. Reopening before the reset debounce fires
    /// keeps the current form.
    pub fn open(&mut self, anchor: Option<Anchor>) -> bool {
        release_timer(&mut self.reset_debounce, &mut self.effects);
        self.fab.open(anchor)
    }

    pub fn press_in(&mut self) {
        self.fab.press_in();
    }

    pub fn press_out(&mut self) {
        self.fab.press_out();
    }

    // --- form ---

    pub fn set_title(&mut self, title: String) {
        self.draft.title = title;
    }

    pub fn set_body(&mut self, body: String) {
        self.draft.body = body;
    }

    pub fn toggle_category(&mut self, category: PostCategory) {
        self.draft.toggle_category(category);
    }

    // --- submission cycle ---

    #[instrument(skip_all, fields(cycle = self.cycle))]
    pub fn submit(&mut self, identity: Option<&UserId>) -> Result<SubmitOutcome, SubmitError> {
        if self.is_busy() {
            debug!("submission already in flight");
            return Ok(SubmitOutcome::Busy);
        }

        let Some(author) = identity else {
            warn!("submit attempted without a signed-in user");
            return Err(self.reject(SubmitError::AuthenticationRequired));
        };

        if let Err(e) = self.draft.validate(&self.config) {
            debug!(error = %e, "draft failed local validation");
            return Err(self.reject(e.into()));
        }

        self.error = None;
        self.post_id = None;
        self.creating = true;
        self.cycle += 1;

        let step = self.sequencer.transition_to(Screen::Pending);
        self.follow(step);

        let request = CreatePostRequest::new(&self.draft, author.clone());
        info!(
            cycle = self.cycle,
            title_len = request.title.chars().count(),
            categories = request.categories.len(),
            "submitting post"
        );
        self.effects.push(SubmissionEffect::Create {
            cycle: self.cycle,
            request,
        });
        Ok(SubmitOutcome::Started { cycle: self.cycle })
    }

    fn reject(&mut self, error: SubmitError) -> SubmitError {
        self.error = Some(error.clone().into());
        error
    }

    #[instrument(skip_all, fields(cycle = cycle))]
    pub fn handle_created(&mut self, cycle: u64, result: Result<PostId, StoreError>) {
        if cycle != self.cycle || !self.creating {
            debug!(current = self.cycle, "dropping create response from an abandoned submission");
            return;
        }
        self.creating = false;

        match result {
            Ok(post_id) => {
                self.release_subscription();
                self.subscriptions_opened += 1;
                let subscription = SubscriptionId(self.subscriptions_opened);
                info!(%post_id, subscription = subscription.0, "post created; watching status");

                self.post_id = Some(post_id.clone());
                self.subscription = Some(subscription);
                self.effects.push(SubmissionEffect::Watch {
                    post_id,
                    subscription,
                });
            }
            Err(error) => {
                warn!(%error, "post creation failed");
                self.post_id = None;
                self.error = Some(error.into());
                self.return_to_input();
            }
        }
    }

    #[instrument(skip_all, fields(subscription = subscription.0))]
    pub fn handle_status(&mut self, subscription: SubscriptionId, update: StatusUpdate) {
        if self.subscription != Some(subscription) {
            debug!("dropping update from a released subscription");
            return;
        }

        match update {
            StatusUpdate::Snapshot { status: None } => {
                debug!("post document not visible yet");
            }
            StatusUpdate::Snapshot { status: Some(raw) } => match PostStatus::parse(&raw) {
                Some(PostStatus::Pending) => {}
                Some(PostStatus::Approved) => self.on_approved(),
                Some(PostStatus::Rejected) => self.on_rejected(),
                None => warn!(status = %raw, "ignoring unrecognized post status"),
            },
            StatusUpdate::Failed { error } => {
                warn!(%error, "status subscription failed");
                let mut app_error = AppError::new(ErrorKind::Subscription, error.to_string());
                if let Some(post_id) = &self.post_id {
                    app_error = app_error.with_context("post_id", post_id.as_str());
                }
                self.release_subscription();
                release_timer(&mut self.auto_close, &mut self.effects);
                self.post_id = None;
                self.error = Some(app_error);
                self.return_to_input();
            }
        }
    }

    fn on_approved(&mut self) {
        if self.sequencer.screen() == Screen::Confirmation {
            debug!("repeated approval");
            return;
        }
        info!(post_id = ?self.post_id, "post approved");
        let step = self.sequencer.transition_to(Screen::Confirmation);
        self.follow(step);

        release_timer(&mut self.auto_close, &mut self.effects);
        self.auto_close = Some(self.schedule(TimerKind::AutoClose, self.config.auto_close_ms));
    }

    fn on_rejected(&mut self) {
        if self.sequencer.screen() == Screen::Rejected {
            return;
        }
        info!(post_id = ?self.post_id, "post rejected");
        release_timer(&mut self.auto_close, &mut self.effects);
        let step = self.sequencer.transition_to(Screen::Rejected);
        self.follow(step);
    }

    /// Route a fired one-shot timer. Returns false for timers this controller no longer holds.
    pub fn handle_timer(&mut self, id: TimerId) -> bool {
        match id.kind {
            TimerKind::FrameBarrier if self.frame_barrier == Some(id) => {
                self.frame_barrier = None;
                self.sequencer.release_barrier();
            }
            TimerKind::AutoClose if self.auto_close == Some(id) => {
                self.auto_close = None;
                info!("closing after approval");
                self.close(None);
            }
            TimerKind::ResetDebounce if self.reset_debounce == Some(id) => {
                self.reset_debounce = None;
                self.reset();
            }
            _ => {
                debug!(%id, "ignoring stale timer");
                return false;
            }
        }
        true
    }

    /// Back to an empty-handed `Input` from the rejected screen. The draft is kept so the user
    /// can edit and resubmit it. A submission still in flight or already approved is left alone.
    pub fn retry(&mut self) {
        let screen = self.sequencer.screen();
        if matches!(screen, Screen::Pending | Screen::Confirmation) {
            debug!(?screen, "retry ignored while a submission is live");
            return;
        }
        self.release_subscription();
        release_timer(&mut self.auto_close, &mut self.effects);
        release_timer(&mut self.frame_barrier, &mut self.effects);
        self.abandon_create();
        self.post_id = None;
        self.sequencer.jump_to_input();
    }

    /// Runs once the modal has finished closing: everything back to a blank form.
    pub fn reset(&mut self) {
        self.release_subscription();
        release_timer(&mut self.auto_close, &mut self.effects);
        release_timer(&mut self.frame_barrier, &mut self.effects);
        release_timer(&mut self.reset_debounce, &mut self.effects);
        self.abandon_create();
        self.sequencer.jump_to_input();
        self.draft.clear();
        self.post_id = None;
        self.error = None;
        self.awaiting_discard = false;
    }

    pub fn unmount(&mut self) {
        self.reset();
        self.fab = TransitionController::new(self.config.transition);
    }

    // --- closing ---

    pub fn request_close(&mut self, velocity: Option<f64>) -> CloseOutcome {
        if matches!(
            self.fab.phase(),
            TransitionPhase::Closed | TransitionPhase::Closing
        ) {
            return CloseOutcome::AlreadyClosed;
        }
        if self.awaiting_discard {
            return CloseOutcome::AwaitingConfirmation;
        }
        if self.sequencer.screen() == Screen::Input && self.draft.has_content() {
            self.awaiting_discard = true;
            self.effects.push(SubmissionEffect::ConfirmDiscard);
            return CloseOutcome::AwaitingConfirmation;
        }
        self.close(velocity);
        CloseOutcome::Closing
    }

    pub fn answer_discard(&mut self, confirmed: bool) {
        if !self.awaiting_discard {
            debug!("discard answer without a pending prompt");
            return;
        }
        self.awaiting_discard = false;
        if confirmed {
            self.draft.clear();
            self.close(None);
        }
    }

    fn close(&mut self, velocity: Option<f64>) {
        release_timer(&mut self.auto_close, &mut self.effects);
        self.fab.close(velocity);
    }

    pub fn advance(&mut self, dt_ms: f64) {
        if self.fab.advance(dt_ms) == Some(TransitionOutcome::Closed) {
            release_timer(&mut self.reset_debounce, &mut self.effects);
            self.reset_debounce =
                Some(self.schedule(TimerKind::ResetDebounce, self.config.reset_debounce_ms));
        }
        self.sequencer.advance(dt_ms);
    }

    // --- internals ---

    fn schedule(&mut self, kind: TimerKind, millis: u64) -> TimerId {
        let id = self.timers.next(kind);
        self.effects.push(SubmissionEffect::StartTimer { id, millis });
        id
    }

    fn follow(&mut self, step: SequencerStep) {
        if step == SequencerStep::AwaitingFrame {
            release_timer(&mut self.frame_barrier, &mut self.effects);
            self.frame_barrier =
                Some(self.schedule(TimerKind::FrameBarrier, self.config.frame_barrier_ms));
        }
    }

    fn return_to_input(&mut self) {
        release_timer(&mut self.frame_barrier, &mut self.effects);
        self.sequencer.transition_to(Screen::Input);
    }

    fn release_subscription(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            debug!(subscription = subscription.0, "releasing status subscription");
            self.effects
                .push(SubmissionEffect::Unwatch { subscription });
        }
    }

    fn abandon_create(&mut self) {
        if self.creating {
            self.creating = false;
            self.cycle += 1;
        }
    }

    // --- accessors ---

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.creating || self.subscription.is_some()
    }

    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.sequencer.screen()
    }

    #[must_use]
    pub const fn sequencer(&self) -> &ScreenSequencer {
        &self.sequencer
    }

    #[must_use]
    pub const fn fab(&self) -> &TransitionController {
        &self.fab
    }

    #[must_use]
    pub const fn draft(&self) -> &PostDraft {
        &self.draft
    }

    #[must_use]
    pub const fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    #[must_use]
    pub const fn post_id(&self) -> Option<&PostId> {
        self.post_id.as_ref()
    }

    #[must_use]
    pub const fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    #[must_use]
    pub const fn is_creating(&self) -> bool {
        self.creating
    }

    #[must_use]
    pub const fn awaiting_discard(&self) -> bool {
        self.awaiting_discard
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.is_busy()
            && self.sequencer.screen() == Screen::Input
            && self.draft.validate(&self.config).is_ok()
    }

    /// A live subscription implies a known post and an active screen.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        match self.subscription {
            Some(_) => self.post_id.is_some() && self.sequencer.screen().is_active(),
            None => true,
        }
    }
}
