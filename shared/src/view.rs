use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::format_time_ago;
use crate::model::{Model, PostCategory, ReachOutId, ReachOutRecord, ReachOutStatus, UnixTimeMs};
use crate::reach_outs::{ReachOutsController, RegisteredItem};
use crate::sequencer::{LayerStyle, Screen};
use crate::transition::{TransitionController, TransitionSnapshot};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFacingError {
    pub message: String,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_retryable: e.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Loading,
    Failed,
    Empty,
    Ready,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReachOutCardView {
    pub id: String,
    pub status: ReachOutStatus,
    pub response_count: u32,
    pub created_at_ms: u64,
    pub time_ago: String,
    pub payload: serde_json::Value,
    /// `None` until the card has mounted and registered its transition.
    pub transition: Option<TransitionSnapshot>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReachOutModalView {
    /// The card whose transition is presenting the modal.
    pub owner_id: String,
    pub record: ReachOutCardView,
    pub transition: TransitionSnapshot,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReachOutsView {
    pub status: ListStatus,
    pub header_subtitle: String,
    pub total_count: usize,
    pub cards: Vec<ReachOutCardView>,
    pub modal: Option<ReachOutModalView>,
    pub error: Option<UserFacingError>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryChip {
    pub category: PostCategory,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CreatePostView {
    pub fab: TransitionSnapshot,
    pub screen: Screen,
    pub t: f64,
    pub input_layer: LayerStyle,
    /// Absent while the input screen is current.
    pub active_layer: Option<LayerStyle>,
    pub title: String,
    pub body: String,
    pub categories: Vec<CategoryChip>,
    pub creating: bool,
    pub can_submit: bool,
    pub awaiting_discard: bool,
    pub error: Option<UserFacingError>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub reach_outs: ReachOutsView,
    pub create_post: CreatePostView,
    pub error: Option<UserFacingError>,
    pub is_authenticated: bool,
}

impl ViewModel {
    #[must_use]
    pub fn build(model: &Model) -> Self {
        Self {
            reach_outs: build_reach_outs(model),
            create_post: build_create_post(model),
            error: model.active_error.as_ref().map(UserFacingError::from),
            is_authenticated: model.is_authenticated(),
        }
    }
}

#[must_use]
pub fn header_subtitle(count: usize) -> String {
    if count == 1 {
        "1 request for support".into()
    } else {
        format!("{count} requests for support")
    }
}

fn card_view(
    record: &ReachOutRecord,
    now: UnixTimeMs,
    transition: Option<&TransitionController>,
) -> ReachOutCardView {
    ReachOutCardView {
        id: record.id.to_string(),
        status: record.status,
        response_count: record.response_count,
        created_at_ms: record.created_at.as_millis(),
        time_ago: format_time_ago(record.created_at.as_millis(), now.as_millis()),
        payload: record.payload.clone(),
        transition: transition.map(TransitionController::snapshot),
    }
}

fn visible_item<'a>(
    controller: &'a ReachOutsController,
    id: &ReachOutId,
) -> Option<&'a RegisteredItem> {
    controller
        .item(id)
        .filter(|item| item.transition.is_visible())
}

fn build_reach_outs(model: &Model) -> ReachOutsView {
    let controller = &model.reach_outs;
    let now = controller.now();

    let status = if controller.is_loading() {
        ListStatus::Loading
    } else if controller.load_error().is_some() {
        ListStatus::Failed
    } else if controller.records().is_empty() {
        ListStatus::Empty
    } else {
        ListStatus::Ready
    };

    let displayed = controller.displayed();
    let cards: Vec<ReachOutCardView> = displayed
        .iter()
        .map(|record| {
            let transition = controller.item(&record.id).map(|item| &item.transition);
            card_view(record, now, transition)
        })
        .collect();

    // The selected card owns the modal. Another card still animating closed must not claim it.
    let modal = controller.selected_record().and_then(|selected| {
        let (owner_id, item) = visible_item(controller, &selected.id)
            .map(|item| (&selected.id, item))
            .or_else(|| {
                displayed.iter().find_map(|record| {
                    visible_item(controller, &record.id).map(|item| (&record.id, item))
                })
            })?;
        Some(ReachOutModalView {
            owner_id: owner_id.to_string(),
            record: card_view(selected, now, None),
            transition: item.transition.snapshot(),
        })
    });

    ReachOutsView {
        status,
        header_subtitle: header_subtitle(controller.records().len()),
        total_count: controller.records().len(),
        cards,
        modal,
        error: controller.load_error().map(UserFacingError::from),
    }
}

fn build_create_post(model: &Model) -> CreatePostView {
    let controller = &model.create_post;
    let sequencer = controller.sequencer();
    let draft = controller.draft();

    CreatePostView {
        fab: controller.fab().snapshot(),
        screen: sequencer.screen(),
        t: sequencer.t(),
        input_layer: sequencer.input_layer(),
        active_layer: sequencer.active_layer(),
        title: draft.title.clone(),
        body: draft.body.clone(),
        categories: PostCategory::ALL
            .iter()
            .map(|&category| CategoryChip {
                category,
                label: category.label().to_string(),
                selected: draft.categories.contains(&category),
            })
            .collect(),
        creating: controller.is_creating(),
        can_submit: controller.can_submit(),
        awaiting_discard: controller.awaiting_discard(),
        error: controller.error().map(UserFacingError::from),
    }
}
