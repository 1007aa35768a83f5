//! Pure rendering of a [`ConversationState`] into one message payload.
//!
//! The whole text is rebuilt from state on every call, so the first send and
//! every later edit (including a retried one) show exactly what the state says.

use super::state::ConversationState;

/// Callback tag carried by the affirmative selection button.
pub const YES_TAG: &str = "yes";
/// Callback tag carried by the negative selection button.
pub const NO_TAG: &str = "no";

const DONE_GLYPH: &str = "✅";
const MISSED_GLYPH: &str = "❌";

/// Interactive controls attached to an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controls {
    /// Persistent reply menu with one button per shift kind.
    ShiftMenu,
    /// Remove a previously shown reply menu.
    DismissMenu,
    /// Inline yes/no pair tagged [`YES_TAG`] / [`NO_TAG`].
    Confirm,
}

/// Text plus optional controls, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub text: String,
    pub controls: Option<Controls>,
}

impl View {
    pub fn new(text: impl Into<String>, controls: Option<Controls>) -> Self {
        Self {
            text: text.into(),
            controls,
        }
    }
}

/// Escape the characters Telegram legacy Markdown treats as entity markers.
pub fn escape_markdown(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Summary line for an answered task: `<glyph> <1-based index>. <task>`.
pub fn answer_line(done: bool, index: usize, task: &str) -> String {
    let glyph = if done { DONE_GLYPH } else { MISSED_GLYPH };
    format!("{glyph} {}. {}", index + 1, escape_markdown(task))
}

pub fn render(state: &ConversationState) -> View {
    let name = state
        .employee_name()
        .map_or_else(|| "not provided".to_string(), escape_markdown);
    let mut text = format!(
        "📋 *Checklist: {} shift*\n👤 Employee: {name}\n\n",
        state.shift_kind().title()
    );

    if !state.rendered_lines().is_empty() {
        text.push_str(&state.rendered_lines().join("\n"));
        text.push_str("\n\n");
    }

    let total = state.tasks().len();
    if let Some(task) = state.current_task() {
        text.push_str(&format!(
            "Question {}/{total}:\n{}\n\nConfirm completion?",
            state.current_index() + 1,
            escape_markdown(task)
        ));
        return View::new(text, Some(Controls::Confirm));
    }

    text.push_str("🏁 *Checklist complete!*\n\n");
    let missed = state.missed_tasks();
    if missed.is_empty() {
        text.push_str("🎉 *All tasks completed! Great work!*");
    } else {
        let lines: Vec<String> = missed
            .iter()
            .map(|(index, task)| format!("{MISSED_GLYPH} {index}. {}", escape_markdown(task)))
            .collect();
        text.push_str("⚠️ *Not completed:*\n");
        text.push_str(&lines.join("\n"));
    }
    View::new(text, None)
}
