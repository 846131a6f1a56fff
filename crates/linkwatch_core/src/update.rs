use chrono::{DateTime, Local};

use crate::state::{PendingAction, PendingReaction};
use crate::{
    CandidateLink, Effect, MatchResult, MessageLinks, MonitorState, Msg, NotificationRequest,
    OverlayView, SessionState, StopReason, Tone,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: MonitorState, msg: Msg) -> (MonitorState, Vec<Effect>) {
    let mut effects = Vec::new();
    match msg {
        Msg::PageLoaded {
            location,
            monitoring_stopped,
        } => {
            if state.session() != SessionState::Idle
                || location != state.config().target_location()
                || monitoring_stopped
            {
                return (state, effects);
            }
            state.set_session(SessionState::Probing);
            show(
                &mut state,
                &mut effects,
                OverlayView::neutral("Ready to monitor this channel..."),
            );
            effects.push(Effect::StartProbes);
        }
        Msg::ProbesSettled { escaped } => {
            if state.session() != SessionState::Probing || state.reload_scheduled() {
                return (state, effects);
            }
            if escaped {
                // The page never settled; one reload is the escape hatch.
                state.schedule_reload();
                show(
                    &mut state,
                    &mut effects,
                    OverlayView::new("Page did not finish loading, reloading...", Tone::Warning),
                );
                effects.push(Effect::Reload);
            } else {
                arm(&mut state, &mut effects);
            }
        }
        Msg::MessagesInserted {
            messages,
            received_at,
        } => {
            if state.session() != SessionState::Monitoring {
                return (state, effects);
            }
            if let Some(result) = first_match(&state, &messages, received_at) {
                react(&mut state, &mut effects, result);
            }
        }
        Msg::ReactionDelayElapsed { reaction_id } => {
            if state.session() != SessionState::Reacting {
                return (state, effects);
            }
            let Some(PendingReaction { result, action, .. }) = state.take_reaction(reaction_id)
            else {
                return (state, effects);
            };
            match action {
                PendingAction::Open => {
                    show(
                        &mut state,
                        &mut effects,
                        OverlayView::new("Opening link...", Tone::Success),
                    );
                    effects.push(Effect::Speak {
                        message: "Opening link...".to_string(),
                    });
                    effects.push(Effect::OpenLink {
                        url: result.link.url,
                    });
                    state.stop(StopReason::LinkOpened);
                    effects.push(Effect::PersistStopFlag(true));
                }
                PendingAction::Rearm => arm(&mut state, &mut effects),
            }
        }
        Msg::NotificationFinished { outcome, .. } => {
            state.record_notification(outcome.is_ok());
        }
        Msg::StopClicked => {
            if state.session() == SessionState::Stopped {
                return (state, effects);
            }
            if state.has_pending_reaction() {
                effects.push(Effect::CancelReaction);
            }
            effects.push(Effect::DetachObserver);
            state.stop(StopReason::User);
            // The flag must be stored before the reload wipes the page.
            effects.push(Effect::PersistStopFlag(true));
            show(
                &mut state,
                &mut effects,
                OverlayView::neutral("Monitoring stopped"),
            );
            effects.push(Effect::Reload);
        }
        Msg::OpenRequested { url } => {
            if state.has_pending_reaction() {
                effects.push(Effect::CancelReaction);
            }
            effects.push(Effect::DetachObserver);
            if state.session() != SessionState::Stopped {
                state.set_session(SessionState::Idle);
            }
            effects.extend(navigation_effects(url));
        }
        Msg::EnvironmentFault { reason } => {
            if state.session() == SessionState::Stopped {
                return (state, effects);
            }
            if state.has_pending_reaction() {
                effects.push(Effect::CancelReaction);
            }
            effects.push(Effect::DetachObserver);
            state.stop(StopReason::Fault);
            show(
                &mut state,
                &mut effects,
                OverlayView::new(format!("Monitoring stopped: {reason}"), Tone::Error),
            );
        }
    }

    (state, effects)
}

/// Effects of the external "open channel" command: clear the stop flag, then navigate.
pub fn navigation_effects(url: String) -> Vec<Effect> {
    vec![Effect::PersistStopFlag(false), Effect::Navigate { url }]
}

/// Effects of a stop clicked on an overlay that outlived its session.
pub fn stop_effects() -> Vec<Effect> {
    vec![
        Effect::PersistStopFlag(true),
        Effect::ShowOverlay(OverlayView::neutral("Monitoring stopped")),
        Effect::Reload,
    ]
}

fn show(state: &mut MonitorState, effects: &mut Vec<Effect>, view: OverlayView) {
    state.set_overlay(view.clone());
    effects.push(Effect::ShowOverlay(view));
}

fn arm(state: &mut MonitorState, effects: &mut Vec<Effect>) {
    state.set_session(SessionState::Monitoring);
    effects.push(Effect::AttachObserver);
    show(state, effects, OverlayView::neutral("Monitoring channel..."));
}

/// First matching link of the first message (batch order) that has one.
fn first_match(
    state: &MonitorState,
    messages: &[MessageLinks],
    received_at: DateTime<Local>,
) -> Option<MatchResult> {
    let pattern = state.config().pattern();
    messages.iter().find_map(|message| {
        message
            .links
            .iter()
            .find(|url| pattern.test(url))
            .map(|url| MatchResult {
                link: CandidateLink {
                    url: url.clone(),
                    node: message.node,
                },
                matched_at: received_at,
            })
    })
}

fn react(state: &mut MonitorState, effects: &mut Vec<Effect>, result: MatchResult) {
    let config = state.config().clone();
    let action = if config.open_enabled() {
        PendingAction::Open
    } else {
        PendingAction::Rearm
    };

    // Detach before anything else so no later batch can start a second reaction.
    effects.push(Effect::DetachObserver);
    let link = result.link.url.clone();
    let reaction_id = state.begin_reaction(result, action);

    let announcement = if config.open_enabled() {
        format!("Opening link in {}ms...", config.delay_ms())
    } else if config.notify_enabled() {
        "Link found, notification sent".to_string()
    } else {
        "Link found".to_string()
    };
    show(state, effects, OverlayView::new(announcement, Tone::Success));

    if config.notify_enabled() {
        if let Some(endpoint) = config.notify_endpoint() {
            effects.push(Effect::Notify(NotificationRequest {
                reaction_id,
                endpoint: endpoint.to_string(),
                source_label: config.source_label().to_string(),
                pattern: config.pattern().as_str().to_string(),
                delay_ms: config.delay_ms(),
                link,
            }));
        }
    }

    effects.push(Effect::ScheduleReaction {
        reaction_id,
        delay: config.delay(),
    });
}
