use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `shiftcheck`.
///
/// Input validation failures never show up here: they are answered with a
/// re-prompt inside the conversation (see [`InputRejection`]), and config
/// problems surface as [`ConfigError`] before any conversation starts. `main`
/// and the listener loops stay on `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum ChecklistError {
    /// An outbound send or edit failed after the state change was recorded.
    /// Conversation state is kept as is.
    #[error("failed to deliver {action} after {attempts} attempt(s): {source}")]
    TransportDeliveryFailure {
        action: DeliveryAction,
        attempts: u32,
        #[source]
        source: TransportError,
    },
}

/// Which outbound call a [`ChecklistError::TransportDeliveryFailure`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryAction {
    Send,
    Edit,
}

impl std::fmt::Display for DeliveryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Send => f.write_str("sendMessage"),
            Self::Edit => f.write_str("editMessageText"),
        }
    }
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bot token not found: set BOT_TOKEN (or SHIFTCHECK_BOT_TOKEN) or telegram.bot_token")]
    MissingCredential,

    #[error("failed to load config: {0}")]
    Load(String),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Input rejections (recoverable) ──────────────────────────────────────────

/// Why an inbound event was turned away without touching conversation state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputRejection {
    #[error("employee name is empty")]
    EmptyNameInput,

    #[error("unrecognized selection tag: {0:?}")]
    UnrecognizedSelectionTag(String),

    #[error("free text is not accepted while {phase}")]
    UnexpectedTextInWrongPhase { phase: &'static str },

    #[error("text does not name a shift kind")]
    UnknownShiftKind,

    #[error("selection received outside of the checklist")]
    SelectionOutsideChecklist,
}

// ─── Transport / Channel errors ─────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{method} rejected ({status}): {description}")]
    Api {
        method: String,
        status: u16,
        description: String,
    },

    #[error("malformed response from {method}: {reason}")]
    MalformedResponse { method: String, reason: String },

    #[error("{0} is not supported by this channel")]
    Unsupported(&'static str),
}

impl TransportError {
    /// Telegram refuses edits whose text and markup are identical to the
    /// current message. Nothing is stale in that case.
    pub fn is_not_modified(&self) -> bool {
        matches!(self, Self::Api { description, .. } if description.contains("message is not modified"))
    }
}
