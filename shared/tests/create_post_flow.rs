mod common;

use assert_matches::assert_matches;
use common::Harness;
use crux_core::Request;
use shared::capabilities::{
    ConfirmRequest, PostStoreOperation, PostStoreOutput, PromptOperation, StatusUpdate,
    TimerKind, TimerOperation, TimerOutput,
};
use shared::model::{PostCategory, PostId, UserId};
use shared::sequencer::Screen;
use shared::transition::TransitionPhase;
use shared::{ErrorKind, Event, StoreError};

fn fired(request: &Request<TimerOperation>) -> TimerOutput {
    match &request.operation {
        TimerOperation::Start { id, .. } => TimerOutput::Fired { id: *id },
        other => panic!("not a one-shot timer: {other:?}"),
    }
}

fn snapshot(status: &str) -> PostStoreOutput {
    PostStoreOutput::Status(StatusUpdate::Snapshot {
        status: Some(status.into()),
    })
}

/// Signed in, modal open, draft filled.
fn ready_to_submit() -> Harness {
    let mut h = Harness::new();
    h.send(Event::SessionChanged {
        user_id: Some(UserId::new("user-1")),
    });
    h.send(Event::CreatePostPressed { anchor: None });
    h.frame(1_000.0);
    h.send(Event::PostTitleChanged("Need support".into()));
    h.send(Event::PostBodyChanged("...".into()));
    h.send(Event::PostCategoryToggled(PostCategory::Questions));
    h
}

/// Submits and resolves the create, returning the live watch request.
fn submitted(h: &mut Harness) -> Request<PostStoreOperation> {
    let mut effects = h.send(Event::SubmitPost);
    let mut create = effects
        .take_store(|op| matches!(op, PostStoreOperation::Create(_)))
        .expect("create request");

    let mut effects = h.resolve(
        &mut create,
        PostStoreOutput::Created(Ok(PostId::new("post-1"))),
    );
    effects
        .take_store(|op| matches!(op, PostStoreOperation::Watch { .. }))
        .expect("watch request")
}

#[test]
fn approved_post_auto_closes_exactly_once() {
    let mut h = ready_to_submit();

    let mut effects = h.send(Event::SubmitPost);
    assert_eq!(h.model.create_post.screen(), Screen::Pending);
    assert!(effects.renders > 0);

    let mut create = effects
        .take_store(|op| matches!(op, PostStoreOperation::Create(_)))
        .expect("create request");
    assert_matches!(
        &create.operation,
        PostStoreOperation::Create(request)
            if request.title == "Need support"
                && request.content == "..."
                && request.categories == vec![PostCategory::Questions]
                && request.author == UserId::new("user-1")
    );

    let mut effects = h.resolve(
        &mut create,
        PostStoreOutput::Created(Ok(PostId::new("post-1"))),
    );
    let mut watch = effects
        .take_store(|op| matches!(op, PostStoreOperation::Watch { .. }))
        .expect("watch request");
    assert_matches!(
        &watch.operation,
        PostStoreOperation::Watch { post_id, .. } if post_id.as_str() == "post-1"
    );

    let effects = h.resolve(&mut watch, snapshot("pending"));
    assert_eq!(h.model.create_post.screen(), Screen::Pending);
    assert!(effects.timers.is_empty());

    let mut effects = h.resolve(&mut watch, snapshot("approved"));
    assert_eq!(h.model.create_post.screen(), Screen::Confirmation);
    assert_eq!(h.model.create_post.sequencer().t(), 0.0);

    let mut barrier = effects.take_timer(TimerKind::FrameBarrier).expect("frame barrier");
    let mut auto_close = effects.take_timer(TimerKind::AutoClose).expect("auto close");
    assert_matches!(
        auto_close.operation,
        TimerOperation::Start { millis: 3_000, .. }
    );

    // A duplicate approval must not arm a second close.
    let effects = h.resolve(&mut watch, snapshot("approved"));
    assert_eq!(effects.started(TimerKind::AutoClose), 0);

    let output = fired(&barrier);
    h.resolve(&mut barrier, output);
    h.frame(1_000.0);
    assert_eq!(h.model.create_post.sequencer().t(), 1.0);

    let output = fired(&auto_close);
    h.resolve(&mut auto_close, output);
    assert_eq!(h.model.create_post.fab().phase(), TransitionPhase::Closing);

    let mut effects = h.frame(1_000.0);
    assert!(!h.model.create_post.fab().is_visible());
    let mut reset = effects
        .take_timer(TimerKind::ResetDebounce)
        .expect("reset debounce");
    assert_matches!(reset.operation, TimerOperation::Start { millis: 200, .. });

    let output = fired(&reset);
    let effects = h.resolve(&mut reset, output);
    assert_eq!(effects.unwatches(), 1);
    assert!(h.model.create_post.subscription().is_none());
    assert!(h.model.create_post.draft().title.is_empty());
}

#[test]
fn submit_without_identity_reports_authentication_required() {
    let mut h = Harness::new();
    h.send(Event::CreatePostPressed { anchor: None });
    h.send(Event::PostTitleChanged("Need support".into()));
    h.send(Event::PostBodyChanged("...".into()));

    let effects = h.send(Event::SubmitPost);

    assert!(effects.store.is_empty());
    assert_eq!(h.model.create_post.screen(), Screen::Input);
    assert!(h.model.create_post.subscription().is_none());
    assert_eq!(
        h.model.create_post.error().map(|e| e.kind),
        Some(ErrorKind::Authentication)
    );

    let view = h.app.view(&h.model);
    let error = view.create_post.error.expect("error shown");
    assert_eq!(error.error_code, "AUTH_REQUIRED");
}

#[test]
fn rejected_post_can_be_retried() {
    let mut h = ready_to_submit();
    let mut watch = submitted(&mut h);

    let mut effects = h.resolve(&mut watch, snapshot("rejected"));
    assert_eq!(h.model.create_post.screen(), Screen::Rejected);
    assert_eq!(effects.started(TimerKind::AutoClose), 0);
    let mut barrier = effects.take_timer(TimerKind::FrameBarrier).expect("frame barrier");

    let effects = h.send(Event::RetryPost);
    assert_eq!(effects.unwatches(), 1);
    assert_eq!(effects.cancelled().len(), 1);
    assert_eq!(h.model.create_post.screen(), Screen::Input);
    assert_eq!(h.model.create_post.sequencer().t(), 0.0);
    assert!(h.model.create_post.post_id().is_none());
    assert!(h.model.create_post.subscription().is_none());
    assert_eq!(h.model.create_post.draft().title, "Need support");

    // Late deliveries on the released stream and the cancelled barrier are ignored.
    h.resolve(&mut watch, snapshot("approved"));
    let output = fired(&barrier);
    h.resolve(&mut barrier, output);
    assert_eq!(h.model.create_post.screen(), Screen::Input);
    assert_eq!(h.model.create_post.sequencer().t(), 0.0);

    let effects = h.send(Event::RetryPost);
    assert!(effects.store.is_empty());
    assert!(effects.timers.is_empty());

    // And the form can go round again.
    let mut effects = h.send(Event::SubmitPost);
    assert!(effects
        .take_store(|op| matches!(op, PostStoreOperation::Create(_)))
        .is_some());
    assert_eq!(h.model.create_post.screen(), Screen::Pending);
}

#[test]
fn create_failure_returns_to_input_with_error() {
    let mut h = ready_to_submit();
    let mut effects = h.send(Event::SubmitPost);
    let mut create = effects
        .take_store(|op| matches!(op, PostStoreOperation::Create(_)))
        .expect("create request");

    let effects = h.resolve(
        &mut create,
        PostStoreOutput::Created(Err(StoreError::ValidationFailed {
            reason: "Title contains blocked words".into(),
        })),
    );

    assert!(effects.store.is_empty());
    assert_eq!(h.model.create_post.screen(), Screen::Input);
    assert!(h.model.create_post.post_id().is_none());
    assert!(h.model.create_post.subscription().is_none());

    let view = h.app.view(&h.model);
    let error = view.create_post.error.expect("error shown");
    assert_eq!(error.message, "Title contains blocked words");
    assert!(!error.is_retryable);
    assert!(view.create_post.can_submit);
}

#[test]
fn subscription_failure_surfaces_as_error() {
    let mut h = ready_to_submit();
    let mut watch = submitted(&mut h);

    let effects = h.resolve(
        &mut watch,
        PostStoreOutput::Status(StatusUpdate::Failed {
            error: StoreError::Network {
                message: "listener detached".into(),
            },
        }),
    );

    assert_eq!(effects.unwatches(), 1);
    assert_eq!(h.model.create_post.screen(), Screen::Input);
    assert_eq!(
        h.model.create_post.error().map(|e| e.kind),
        Some(ErrorKind::Subscription)
    );
}

#[test]
fn closing_a_dirty_form_asks_before_discarding() {
    let mut h = ready_to_submit();

    let mut effects = h.send(Event::CloseCreatePost { velocity: None });
    assert_eq!(h.model.create_post.fab().phase(), TransitionPhase::Open);
    let mut prompt = effects.prompts.pop().expect("discard prompt");
    assert_eq!(
        prompt.operation,
        PromptOperation::Confirm(ConfirmRequest::discard_post())
    );

    h.resolve(&mut prompt, false);
    assert_eq!(h.model.create_post.fab().phase(), TransitionPhase::Open);
    assert_eq!(h.model.create_post.draft().title, "Need support");

    let mut effects = h.send(Event::CloseCreatePost {
        velocity: Some(900.0),
    });
    let mut prompt = effects.prompts.pop().expect("discard prompt");
    h.resolve(&mut prompt, true);
    assert!(h.model.create_post.draft().title.is_empty());
    assert_eq!(h.model.create_post.fab().phase(), TransitionPhase::Closing);
}

#[test]
fn closing_while_pending_skips_the_prompt() {
    let mut h = ready_to_submit();
    let _watch = submitted(&mut h);

    let effects = h.send(Event::CloseCreatePost { velocity: None });
    assert!(effects.prompts.is_empty());
    assert_eq!(h.model.create_post.fab().phase(), TransitionPhase::Closing);
}

#[test]
fn manual_close_cancels_auto_close() {
    let mut h = ready_to_submit();
    let mut watch = submitted(&mut h);
    let mut effects = h.resolve(&mut watch, snapshot("approved"));
    let mut auto_close = effects.take_timer(TimerKind::AutoClose).expect("auto close");

    let effects = h.send(Event::CloseCreatePost { velocity: None });
    assert_matches!(
        auto_close.operation,
        TimerOperation::Start { id, .. } if effects.cancelled().contains(&id)
    );

    // Reopen before the old timer is delivered: it must not close the new session.
    h.frame(1_000.0);
    h.send(Event::CreatePostPressed { anchor: None });
    let output = fired(&auto_close);
    h.resolve(&mut auto_close, output);
    assert_eq!(h.model.create_post.fab().phase(), TransitionPhase::Opening);
}

#[test]
fn unmount_releases_the_subscription() {
    let mut h = ready_to_submit();
    let _watch = submitted(&mut h);

    let effects = h.send(Event::CreatePostUnmounted);
    assert_eq!(effects.unwatches(), 1);
    assert!(h.model.create_post.subscription().is_none());
    assert!(!h.model.create_post.fab().is_visible());
}

#[test]
fn second_submit_while_pending_is_ignored() {
    let mut h = ready_to_submit();
    h.send(Event::SubmitPost);
    let effects = h.send(Event::SubmitPost);
    assert!(effects.store.is_empty());
    assert!(h.model.create_post.error().is_none());
}

#[test]
fn configuration_drives_auto_close_delay() {
    let mut h = ready_to_submit();

    h.send(Event::Configure(Box::new(shared::CoreConfig {
        clock_refresh_ms: 0,
        ..shared::CoreConfig::default()
    })));
    assert_eq!(
        h.model.active_error.as_ref().map(|e| e.kind),
        Some(ErrorKind::Validation)
    );

    h.send(Event::Configure(Box::new(shared::CoreConfig {
        auto_close_ms: 1_000,
        ..shared::CoreConfig::default()
    })));
    assert!(h.model.active_error.is_none());

    let mut watch = submitted(&mut h);
    let mut effects = h.resolve(&mut watch, snapshot("approved"));
    let auto_close = effects.take_timer(TimerKind::AutoClose).expect("auto close");
    assert_matches!(
        auto_close.operation,
        TimerOperation::Start { millis: 1_000, .. }
    );
}
