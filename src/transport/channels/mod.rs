pub mod dispatch;
pub mod runtime;
mod startup;
pub mod telegram;
pub mod traits;

pub use dispatch::SessionDispatcher;
pub use startup::{check_channel, start_bot};
pub use telegram::TelegramChannel;
pub use traits::{Channel, InboundMessage};
