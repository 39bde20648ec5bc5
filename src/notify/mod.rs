// Notification fan-out: messages, the per-recipient registry, and the
// compose-with-fallback dispatcher

pub mod dispatcher;
pub mod message;
pub mod registry;

pub use dispatcher::Notifier;
pub use message::{EventKind, Message, MessageContext};
pub use registry::{ChannelId, FanoutRegistry};
