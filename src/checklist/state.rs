use super::render::answer_line;
use super::template::ShiftKind;
use crate::error::InputRejection;

/// Handle of a message already delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: String,
    pub message_id: i64,
}

/// One employee's walk through a checklist.
///
/// `answers`, `rendered_lines` and `current_index` always move together:
/// `answers.len() == rendered_lines.len() == current_index <= tasks.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    shift_kind: ShiftKind,
    employee_name: Option<String>,
    tasks: Vec<String>,
    answers: Vec<bool>,
    current_index: usize,
    rendered_lines: Vec<String>,
    active_message: Option<MessageRef>,
}

impl ConversationState {
    /// Start a session on a fresh copy of the shift's template.
    pub fn new(shift_kind: ShiftKind) -> Self {
        Self {
            shift_kind,
            employee_name: None,
            tasks: shift_kind.snapshot(),
            answers: Vec::new(),
            current_index: 0,
            rendered_lines: Vec::new(),
            active_message: None,
        }
    }

    pub fn shift_kind(&self) -> ShiftKind {
        self.shift_kind
    }

    pub fn employee_name(&self) -> Option<&str> {
        self.employee_name.as_deref()
    }

    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    pub fn answers(&self) -> &[bool] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn rendered_lines(&self) -> &[String] {
        &self.rendered_lines
    }

    pub fn active_message(&self) -> Option<&MessageRef> {
        self.active_message.as_ref()
    }

    /// The task awaiting an answer, if any.
    pub fn current_task(&self) -> Option<&str> {
        self.tasks.get(self.current_index).map(String::as_str)
    }

    pub fn is_complete(&self) -> bool {
        self.current_index == self.tasks.len()
    }

    /// Record the employee name and reset progress so the checklist starts
    /// from the first task. Whitespace-only input is rejected untouched.
    pub fn begin_checklist(&mut self, raw_name: &str) -> Result<(), InputRejection> {
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(InputRejection::EmptyNameInput);
        }
        self.employee_name = Some(name.to_string());
        self.answers.clear();
        self.rendered_lines.clear();
        self.current_index = 0;
        self.active_message = None;
        Ok(())
    }

    /// Append one yes/no answer for the current task.
    ///
    /// Returns `true` when this answer completed the checklist.
    pub fn record_answer(&mut self, done: bool) -> Result<bool, InputRejection> {
        let Some(task) = self.tasks.get(self.current_index) else {
            return Err(InputRejection::SelectionOutsideChecklist);
        };
        let line = answer_line(done, self.current_index, task);
        self.answers.push(done);
        self.rendered_lines.push(line);
        self.current_index += 1;
        debug_assert_eq!(self.answers.len(), self.current_index);
        debug_assert_eq!(self.rendered_lines.len(), self.current_index);
        Ok(self.is_complete())
    }

    /// Remember the checklist message after its first send. The handle is
    /// never replaced afterwards; a second call is ignored.
    pub fn attach_message(&mut self, message: MessageRef) -> bool {
        if self.active_message.is_some() {
            tracing::warn!(
                chat_id = %message.chat_id,
                message_id = message.message_id,
                "checklist message already attached; ignoring new handle"
            );
            return false;
        }
        self.active_message = Some(message);
        true
    }

    /// `(1-based index, task)` pairs for every answered task that was not done.
    pub fn missed_tasks(&self) -> Vec<(usize, &str)> {
        self.tasks
            .iter()
            .zip(&self.answers)
            .enumerate()
            .filter(|(_, (_, done))| !**done)
            .map(|(i, (task, _))| (i + 1, task.as_str()))
            .collect()
    }
}
