use tracing::{debug, info, trace, warn};

use crate::capabilities::{Capabilities, ConfirmRequest, TimerKind, TimerOutput};
use crate::error::{AppError, ErrorKind};
use crate::event::Event;
use crate::model::Model;
use crate::reach_outs::ReachOutsEffect;
use crate::submission::{SubmissionEffect, SubmitOutcome};
use crate::view::ViewModel;

#[derive(Default)]
pub struct App;

impl App {
    /// Turn the directives both controllers queued during this update into capability calls.
    fn dispatch(model: &mut Model, caps: &Capabilities) {
        for effect in model.create_post.drain_effects() {
            match effect {
                SubmissionEffect::Create { cycle, request } => {
                    caps.post_store
                        .create(request, move |result| Event::PostCreated { cycle, result });
                }
                SubmissionEffect::Watch {
                    post_id,
                    subscription,
                } => {
                    caps.post_store.watch(post_id, subscription, move |update| {
                        Event::PostStatusChanged {
                            subscription,
                            update,
                        }
                    });
                }
                SubmissionEffect::Unwatch { subscription } => {
                    caps.post_store.unwatch(subscription);
                }
                SubmissionEffect::StartTimer { id, millis } => {
                    caps.timer.start(id, millis, Event::TimerElapsed);
                }
                SubmissionEffect::CancelTimer { id } => caps.timer.cancel(id),
                SubmissionEffect::ConfirmDiscard => {
                    caps.prompt
                        .confirm(ConfirmRequest::discard_post(), |confirmed| {
                            Event::DiscardAnswered { confirmed }
                        });
                }
            }
        }

        for effect in model.reach_outs.drain_effects() {
            match effect {
                ReachOutsEffect::StartClock { id, millis } => {
                    caps.timer.repeat(id, millis, Event::TimerElapsed);
                }
                ReachOutsEffect::StartTimer { id, millis } => {
                    caps.timer.start(id, millis, Event::TimerElapsed);
                }
                ReachOutsEffect::CancelTimer { id } => caps.timer.cancel(id),
                ReachOutsEffect::GoBack => caps.navigation.go_back(),
            }
        }
    }

    fn route_timer(model: &mut Model, output: TimerOutput) {
        match output {
            TimerOutput::Fired { id } => {
                let handled = match id.kind {
                    TimerKind::ClockRefresh | TimerKind::DeepLinkDelay => {
                        model.reach_outs.handle_timer(id)
                    }
                    TimerKind::FrameBarrier | TimerKind::ResetDebounce | TimerKind::AutoClose => {
                        model.create_post.handle_timer(id)
                    }
                };
                trace!(%id, handled, "timer fired");
            }
            TimerOutput::Tick { id, now } => model.reach_outs.clock_tick(id, now),
            TimerOutput::Cancelled { id } => debug!(%id, "timer cancelled"),
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        if event.is_high_frequency() {
            trace!(event = event_name, "update");
        } else {
            debug!(
                event = event_name,
                user_initiated = event.is_user_initiated(),
                "update"
            );
        }

        match event {
            Event::Noop => return,

            Event::Configure(config) => match config.validate() {
                Ok(()) => {
                    model.reach_outs.configure(&config);
                    model.create_post.configure(&config);
                    model.active_error = None;
                    info!("configuration applied");
                }
                Err(e) => {
                    warn!(error = %e, "rejected configuration");
                    model.active_error = Some(e.into());
                }
            },

            Event::SessionChanged { user_id } => {
                info!(signed_in = user_id.is_some(), "session changed");
                model.session = user_id;
            }

            Event::AnimationFrame { elapsed_ms } => {
                model.reach_outs.advance(elapsed_ms);
                model.create_post.advance(elapsed_ms);
            }

            Event::ReachOutsMounted { now } => model.reach_outs.mount(now),
            Event::ReachOutsUnmounted => model.reach_outs.unmount(),
            Event::ReachOutsLoading => model.reach_outs.records_loading(),
            Event::ReachOutsLoaded { records } => model.reach_outs.records_loaded(records),
            Event::ReachOutsFailed { message } => {
                model
                    .reach_outs
                    .records_failed(AppError::new(ErrorKind::Network, message));
            }
            Event::DeepLinkRequested { target, mode } => {
                model.reach_outs.request_deep_link(target, mode);
            }
            Event::ReachOutItemMounted { id, anchor } => model.reach_outs.register_item(id, anchor),
            Event::ReachOutItemUnmounted { id } => model.reach_outs.unregister_item(&id),
            Event::ReachOutPressed { id, anchor } => {
                model.reach_outs.press_card(&id, anchor);
            }
            Event::ReachOutPressIn { id } => model.reach_outs.press_in(&id),
            Event::ReachOutPressOut { id } => model.reach_outs.press_out(&id),
            Event::ReachOutModalClosed { id, velocity } => {
                model.reach_outs.close_modal(&id, velocity);
            }
            Event::NavigateBack => model.reach_outs.go_back(),

            Event::CreatePostPressed { anchor } => {
                model.create_post.open(anchor);
            }
            Event::CreatePostPressIn => model.create_post.press_in(),
            Event::CreatePostPressOut => model.create_post.press_out(),
            Event::PostTitleChanged(title) => model.create_post.set_title(title),
            Event::PostBodyChanged(body) => model.create_post.set_body(body),
            Event::PostCategoryToggled(category) => model.create_post.toggle_category(category),
            Event::SubmitPost => match model.create_post.submit(model.session.as_ref()) {
                Ok(SubmitOutcome::Started { cycle }) => debug!(cycle, "submission started"),
                Ok(SubmitOutcome::Busy) => debug!("submit ignored while busy"),
                Err(e) => debug!(error = %e, "submission refused"),
            },
            Event::RetryPost => model.create_post.retry(),
            Event::CloseCreatePost { velocity } => {
                let outcome = model.create_post.request_close(velocity);
                debug!(?outcome, "close requested");
            }
            Event::CreatePostUnmounted => model.create_post.unmount(),

            Event::DiscardAnswered { confirmed } => model.create_post.answer_discard(confirmed),
            Event::PostCreated { cycle, result } => model.create_post.handle_created(cycle, result),
            Event::PostStatusChanged {
                subscription,
                update,
            } => model.create_post.handle_status(subscription, update),
            Event::TimerElapsed(output) => Self::route_timer(model, output),
        }

        Self::dispatch(model, caps);
        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::build(model)
    }
}
