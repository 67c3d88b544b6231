//! The "my reach outs" screen: a capped, newest-first list with a live relative-time clock,
//! per-card morph transitions, and deep-link driven modal opening.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::capabilities::{TimerId, TimerIds, TimerKind};
use crate::config::CoreConfig;
use crate::error::AppError;
use crate::model::{ReachOutId, ReachOutRecord, UnixTimeMs};
use crate::transition::{Anchor, TransitionController};

/// How a deep-linked modal is presented once its card is registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationMode {
    /// Morph out of the card, same as a tap.
    #[default]
    Morph,
    /// Slide up without a source control, used when arriving from a notification.
    Originless,
}

impl PresentationMode {
    /// Parse the inbound navigation flag. Only `"1"` and `"true"` select the originless path.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("1" | "true") => Self::Originless,
            _ => Self::Morph,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    pub target: ReachOutId,
    pub mode: PresentationMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachOutsEffect {
    StartClock { id: TimerId, millis: u64 },
    StartTimer { id: TimerId, millis: u64 },
    CancelTimer { id: TimerId },
    GoBack,
}

/// A rendered card's slot in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredItem {
    pub transition: TransitionController,
    pub anchor: Option<Anchor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReachOutsController {
    config: CoreConfig,
    mounted: bool,
    records: Vec<ReachOutRecord>,
    loading: bool,
    load_error: Option<AppError>,
    now: UnixTimeMs,
    clock: Option<TimerId>,
    registry: HashMap<ReachOutId, RegisteredItem>,
    selected: Option<ReachOutRecord>,
    deep_link: Option<DeepLink>,
    deep_link_timer: Option<TimerId>,
    timers: TimerIds,
    effects: Vec<ReachOutsEffect>,
}

impl Default for ReachOutsController {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}

fn release_timer(slot: &mut Option<TimerId>, effects: &mut Vec<ReachOutsEffect>) {
    if let Some(id) = slot.take() {
        effects.push(ReachOutsEffect::CancelTimer { id });
    }
}

impl ReachOutsController {
    #[must_use]
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            config: config.clone(),
            mounted: false,
            records: Vec::new(),
            loading: true,
            load_error: None,
            now: UnixTimeMs::default(),
            clock: None,
            registry: HashMap::new(),
            selected: None,
            deep_link: None,
            deep_link_timer: None,
            timers: TimerIds::default(),
            effects: Vec::new(),
        }
    }

    pub fn configure(&mut self, config: &CoreConfig) {
        let interval_changed = config.clock_refresh_ms != self.config.clock_refresh_ms;
        self.config = config.clone();
        for item in self.registry.values_mut() {
            item.transition.set_timing(config.transition);
        }
        if interval_changed && self.clock.is_some() {
            self.start_clock();
        }
    }

    pub fn drain_effects(&mut self) -> Vec<ReachOutsEffect> {
        std::mem::take(&mut self.effects)
    }

    // --- lifecycle ---

    #[instrument(skip_all, fields(now = now.as_millis()))]
    pub fn mount(&mut self, now: UnixTimeMs) {
        self.now = now;
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.start_clock();
        self.evaluate_deep_link();
    }

    pub fn unmount(&mut self) {
        debug!(registered = self.registry.len(), "reach outs screen unmounted");
        release_timer(&mut self.clock, &mut self.effects);
        release_timer(&mut self.deep_link_timer, &mut self.effects);
        self.mounted = false;
        self.registry.clear();
        self.selected = None;
        self.deep_link = None;
        self.records.clear();
        self.loading = true;
        self.load_error = None;
    }

    fn start_clock(&mut self) {
        release_timer(&mut self.clock, &mut self.effects);
        let id = self.timers.next(TimerKind::ClockRefresh);
        self.effects.push(ReachOutsEffect::StartClock {
            id,
            millis: self.config.clock_refresh_ms,
        });
        self.clock = Some(id);
    }

    pub fn clock_tick(&mut self, id: TimerId, now: UnixTimeMs) {
        if self.clock != Some(id) {
            debug!(%id, "ignoring tick from a cancelled clock");
            return;
        }
        self.now = now;
    }

    // --- record source ---

    pub fn records_loading(&mut self) {
        self.loading = true;
        self.evaluate_deep_link();
    }

    pub fn records_loaded(&mut self, records: Vec<ReachOutRecord>) {
        debug!(count = records.len(), "reach outs loaded");
        self.records = records;
        self.loading = false;
        self.load_error = None;
        self.evaluate_deep_link();
    }

    pub fn records_failed(&mut self, error: AppError) {
        debug!(%error, "reach outs failed to load");
        self.loading = false;
        self.load_error = Some(error);
        self.evaluate_deep_link();
    }

    // --- deep links ---

    pub fn request_deep_link(&mut self, target: ReachOutId, mode: PresentationMode) {
        debug!(%target, ?mode, "deep link requested");
        if self.deep_link.as_ref().is_some_and(|link| link.target != target) {
            release_timer(&mut self.deep_link_timer, &mut self.effects);
        }
        self.deep_link = Some(DeepLink { target, mode });
        self.evaluate_deep_link();
    }

    /// Re-run on every change to the records or the loading flag. Schedules the delayed open
    /// when the target is among the loaded records; a miss is not an error. An armed delay is
    /// never restarted, so a busy record stream cannot postpone the open.
    fn evaluate_deep_link(&mut self) {
        let Some(link) = &self.deep_link else {
            return;
        };
        if !self.mounted || self.loading || self.records.is_empty() {
            return;
        }
        if !self.records.iter().any(|r| r.id == link.target) {
            debug!(target = %link.target, "deep link target not among loaded records");
            return;
        }
        if self.deep_link_timer.is_some() {
            debug!(target = %link.target, "deep link open already scheduled");
            return;
        }

        let id = self.timers.next(TimerKind::DeepLinkDelay);
        self.effects.push(ReachOutsEffect::StartTimer {
            id,
            millis: self.config.deep_link_delay_ms,
        });
        self.deep_link_timer = Some(id);
    }

    #[instrument(skip_all)]
    fn open_deep_link(&mut self) {
        let Some(link) = self.deep_link.clone() else {
            return;
        };
        let Some(record) = self.records.iter().find(|r| r.id == link.target).cloned() else {
            debug!(target = %link.target, "deep link target disappeared before opening");
            return;
        };
        self.selected = Some(record);

        let Some(item) = self.registry.get_mut(&link.target) else {
            debug!(target = %link.target, "deep link target not rendered yet");
            return;
        };
        let opened = match link.mode {
            PresentationMode::Originless => item.transition.open_alternate(),
            PresentationMode::Morph => item.transition.open(item.anchor),
        };
        info!(target = %link.target, mode = ?link.mode, opened, "deep link opened");
        self.deep_link = None;
    }

    /// Returns false for timers this controller no longer holds.
    pub fn handle_timer(&mut self, id: TimerId) -> bool {
        match id.kind {
            TimerKind::DeepLinkDelay if self.deep_link_timer == Some(id) => {
                self.deep_link_timer = None;
                self.open_deep_link();
                true
            }
            _ => {
                debug!(%id, "ignoring stale timer");
                false
            }
        }
    }

    // --- item registry ---

    /// Called by each card as it mounts. The slot is created once; later calls only refresh
    /// the anchor.
    pub fn register_item(&mut self, id: ReachOutId, anchor: Option<Anchor>) {
        let timing = self.config.transition;
        let item = self
            .registry
            .entry(id)
            .or_insert_with(|| RegisteredItem {
                transition: TransitionController::new(timing),
                anchor: None,
            });
        if anchor.is_some() {
            item.anchor = anchor;
        }
    }

    pub fn unregister_item(&mut self, id: &ReachOutId) {
        self.registry.remove(id);
    }

    pub fn press_card(&mut self, id: &ReachOutId, anchor: Option<Anchor>) -> bool {
        let Some(record) = self.records.iter().find(|r| &r.id == id).cloned() else {
            debug!(%id, "pressed card has no matching record");
            return false;
        };
        self.selected = Some(record);
        self.register_item(id.clone(), anchor);
        self.registry
            .get_mut(id)
            .is_some_and(|item| item.transition.open(item.anchor))
    }

    pub fn press_in(&mut self, id: &ReachOutId) {
        if let Some(item) = self.registry.get_mut(id) {
            item.transition.press_in();
        }
    }

    pub fn press_out(&mut self, id: &ReachOutId) {
        if let Some(item) = self.registry.get_mut(id) {
            item.transition.press_out();
        }
    }

    pub fn close_modal(&mut self, id: &ReachOutId, velocity: Option<f64>) -> bool {
        self.registry
            .get_mut(id)
            .is_some_and(|item| item.transition.close(velocity))
    }

    pub fn advance(&mut self, dt_ms: f64) {
        for item in self.registry.values_mut() {
            item.transition.advance(dt_ms);
        }
    }

    pub fn go_back(&mut self) {
        self.effects.push(ReachOutsEffect::GoBack);
    }

    // --- queries ---

    /// Newest first, capped. The sort is stable so equal timestamps keep source order.
    #[must_use]
    pub fn displayed(&self) -> Vec<&ReachOutRecord> {
        let mut sorted: Vec<&ReachOutRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted.truncate(self.config.max_reach_outs);
        sorted
    }

    /// The modal's record, re-resolved against the latest list.
    #[must_use]
    pub fn selected_record(&self) -> Option<&ReachOutRecord> {
        let selected = self.selected.as_ref()?;
        self.records
            .iter()
            .find(|r| r.id == selected.id)
            .or(Some(selected))
    }

    #[must_use]
    pub fn item(&self, id: &ReachOutId) -> Option<&RegisteredItem> {
        self.registry.get(id)
    }

    #[must_use]
    pub fn records(&self) -> &[ReachOutRecord] {
        &self.records
    }

    #[must_use]
    pub const fn now(&self) -> UnixTimeMs {
        self.now
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn load_error(&self) -> Option<&AppError> {
        self.load_error.as_ref()
    }

    #[must_use]
    pub const fn deep_link(&self) -> Option<&DeepLink> {
        self.deep_link.as_ref()
    }
}
