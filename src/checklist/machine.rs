//! Conversation phases and the transition table.
//!
//! [`Conversation::apply`] is pure: it mutates in-memory state and returns the
//! effects the controller must carry out against the transport. Nothing here
//! performs I/O.

use super::render::{Controls, NO_TAG, View, YES_TAG};
use super::state::ConversationState;
use super::template::ShiftKind;
use crate::error::InputRejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No conversation in progress.
    Idle,
    SelectingAction,
    AskName,
    AskingTasks,
    /// Terminal. Behaves like `Idle` if more events arrive.
    Done,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SelectingAction => "selecting a shift",
            Self::AskName => "asking for a name",
            Self::AskingTasks => "answering the checklist",
            Self::Done => "done",
        }
    }
}

/// Inbound events, already stripped of transport detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    StartSession,
    Text(String),
    Selection(String),
    Cancel,
}

/// Outbound work produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a standalone message (prompt, reminder, menu).
    Reply(View),
    /// Render the checklist and send it as the new active message.
    SendChecklist,
    /// Render the checklist and edit the active message in place.
    EditChecklist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub effects: Vec<Effect>,
    /// Set when the event was turned away; state is untouched in that case.
    pub rejection: Option<InputRejection>,
}

impl Transition {
    fn accept(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            rejection: None,
        }
    }

    fn reject(rejection: InputRejection, reply: View) -> Self {
        Self {
            effects: vec![Effect::Reply(reply)],
            rejection: Some(rejection),
        }
    }
}

/// Parse a selection tag into the answer it carries.
pub fn parse_selection(tag: &str) -> Option<bool> {
    match tag {
        YES_TAG => Some(true),
        NO_TAG => Some(false),
        _ => None,
    }
}

// ── Canned prompts ──────────────────────────────────────────────────────────

pub fn welcome_view() -> View {
    View::new(
        "☕ Welcome to the shift assistant!\nChoose an action:",
        Some(Controls::ShiftMenu),
    )
}

pub fn cancelled_view() -> View {
    View::new(
        "❌ Cancelled. Press /start to begin again.",
        Some(Controls::ShiftMenu),
    )
}

fn choose_shift_view() -> View {
    View::new(
        "Please choose an action from the keyboard.",
        Some(Controls::ShiftMenu),
    )
}

fn ask_name_view() -> View {
    View::new(
        "👤 Enter your name (or nickname):",
        Some(Controls::DismissMenu),
    )
}

fn empty_name_view() -> View {
    View::new("The name cannot be empty. Please enter your name:", None)
}

fn use_buttons_view() -> View {
    View::new("⚠️ Please use the buttons to answer.", None)
}

fn idle_hint_view() -> View {
    View::new("Press /start to begin a shift checklist.", None)
}

fn stale_selection_view() -> View {
    View::new(
        "This checklist is no longer active. Press /start to begin again.",
        None,
    )
}

// ── State machine ───────────────────────────────────────────────────────────

/// One chat participant's conversation: the current phase plus the checklist
/// state once a shift has been chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    phase: Phase,
    state: Option<ConversationState>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::idle()
    }
}

impl Conversation {
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            state: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> Option<&ConversationState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut ConversationState> {
        self.state.as_mut()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Apply one inbound event. Rejected events leave phase and state as they were.
    pub fn apply(&mut self, event: &InboundEvent) -> Transition {
        match (self.phase, event) {
            (_, InboundEvent::Cancel) => {
                self.reset(Phase::SelectingAction);
                Transition::accept(vec![Effect::Reply(cancelled_view())])
            }
            (_, InboundEvent::StartSession) => {
                self.reset(Phase::SelectingAction);
                Transition::accept(vec![Effect::Reply(welcome_view())])
            }
            (Phase::Idle | Phase::Done | Phase::SelectingAction, InboundEvent::Text(text)) => {
                self.choose_shift(text)
            }
            (Phase::AskName, InboundEvent::Text(text)) => self.capture_name(text),
            (Phase::AskingTasks, InboundEvent::Selection(tag)) => self.answer(tag),
            (Phase::AskingTasks, InboundEvent::Text(_)) => Transition::reject(
                InputRejection::UnexpectedTextInWrongPhase {
                    phase: self.phase.label(),
                },
                use_buttons_view(),
            ),
            (_, InboundEvent::Selection(_)) => Transition::reject(
                InputRejection::SelectionOutsideChecklist,
                stale_selection_view(),
            ),
        }
    }

    fn reset(&mut self, phase: Phase) {
        self.phase = phase;
        self.state = None;
    }

    fn choose_shift(&mut self, text: &str) -> Transition {
        match ShiftKind::from_menu_text(text) {
            Some(kind) => {
                self.phase = Phase::AskName;
                self.state = Some(ConversationState::new(kind));
                Transition::accept(vec![Effect::Reply(ask_name_view())])
            }
            None if self.phase == Phase::SelectingAction => {
                Transition::reject(InputRejection::UnknownShiftKind, choose_shift_view())
            }
            None => Transition::reject(
                InputRejection::UnexpectedTextInWrongPhase {
                    phase: self.phase.label(),
                },
                idle_hint_view(),
            ),
        }
    }

    fn capture_name(&mut self, text: &str) -> Transition {
        let Some(state) = self.state.as_mut() else {
            // AskName is only entered with a fresh state; recover by re-offering the menu.
            self.phase = Phase::SelectingAction;
            return Transition::reject(InputRejection::UnknownShiftKind, choose_shift_view());
        };
        match state.begin_checklist(text) {
            Ok(()) => {
                self.phase = Phase::AskingTasks;
                Transition::accept(vec![Effect::SendChecklist])
            }
            Err(rejection) => Transition::reject(rejection, empty_name_view()),
        }
    }

    fn answer(&mut self, tag: &str) -> Transition {
        let Some(done) = parse_selection(tag) else {
            return Transition::reject(
                InputRejection::UnrecognizedSelectionTag(tag.to_string()),
                use_buttons_view(),
            );
        };
        let Some(state) = self.state.as_mut() else {
            return Transition::reject(
                InputRejection::SelectionOutsideChecklist,
                stale_selection_view(),
            );
        };
        match state.record_answer(done) {
            Ok(complete) => {
                if complete {
                    self.phase = Phase::Done;
                }
                Transition::accept(vec![Effect::EditChecklist])
            }
            Err(rejection) => Transition::reject(rejection, stale_selection_view()),
        }
    }
}
