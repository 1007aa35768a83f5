pub mod machine;
pub mod render;
pub mod state;
pub mod template;

pub use machine::{Conversation, Effect, InboundEvent, Phase, Transition};
pub use render::{Controls, NO_TAG, View, YES_TAG, render};
pub use state::{ConversationState, MessageRef};
pub use template::ShiftKind;
