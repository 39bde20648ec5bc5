// Per-recipient fan-out over live delivery channels

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use super::message::Message;

/// Handle identifying one registered channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(Uuid);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct RegisteredChannel {
    id: ChannelId,
    sender: mpsc::UnboundedSender<Message>,
}

/// Maps a recipient identity to its live delivery channels and pushes
/// published messages to all of them.
///
/// Channel sets are locked per identity: registrations, removals and
/// publishes for different recipients never contend, while operations on one
/// identity are linearized. Publishing holds the identity lock for the whole
/// delivery loop, so no channel is written after its removal completed and
/// per-recipient delivery order follows publish order.
#[derive(Default)]
pub struct FanoutRegistry {
    channels: RwLock<HashMap<String, Arc<Mutex<Vec<RegisteredChannel>>>>>,
}

impl FanoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    async fn set_for(&self, identity: &str) -> Arc<Mutex<Vec<RegisteredChannel>>> {
        if let Some(set) = self.channels.read().await.get(identity) {
            return set.clone();
        }
        let mut map = self.channels.write().await;
        map.entry(identity.to_string())
            .or_insert_with(Default::default)
            .clone()
    }

    /// Registers a live channel for `identity`, returning its handle and the
    /// receiving end the client consumes from.
    pub async fn register(
        &self,
        identity: &str,
    ) -> (ChannelId, mpsc::UnboundedReceiver<Message>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = ChannelId(Uuid::new_v4());
        let set = self.set_for(identity).await;
        set.lock().await.push(RegisteredChannel { id, sender });
        debug!(identity = %identity, channel = %id, "notification channel registered");
        (id, receiver)
    }

    /// Removes one channel. An in-flight publish holding the identity lock
    /// finishes first; nothing is written to the channel afterwards.
    pub async fn unregister(&self, identity: &str, channel: ChannelId) {
        let set = match self.channels.read().await.get(identity) {
            Some(set) => set.clone(),
            None => return,
        };
        let mut set = set.lock().await;
        let before = set.len();
        set.retain(|registered| registered.id != channel);
        if set.len() < before {
            debug!(identity = %identity, channel = %channel, "notification channel unregistered");
        }
    }

    /// Delivers `message` to every channel currently registered for its
    /// recipient, in registration order. Delivery is attempted independently
    /// per channel: a closed channel is pruned and the rest still receive.
    /// A recipient with no live channel drops the message. Never errors
    /// toward the publisher.
    pub async fn publish(&self, message: Message) {
        let set = match self.channels.read().await.get(&message.recipient) {
            Some(set) => set.clone(),
            None => {
                debug!(
                    recipient = %message.recipient,
                    kind = %message.kind,
                    "no live channel for recipient, message dropped"
                );
                return;
            }
        };

        let mut set = set.lock().await;
        if set.is_empty() {
            debug!(
                recipient = %message.recipient,
                kind = %message.kind,
                "no live channel for recipient, message dropped"
            );
            return;
        }
        set.retain(|channel| match channel.sender.send(message.clone()) {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    recipient = %message.recipient,
                    channel = %channel.id,
                    "channel receiver gone, pruned"
                );
                false
            }
        });
    }

    /// Number of live channels for an identity. Diagnostics only.
    pub async fn channel_count(&self, identity: &str) -> usize {
        match self.channels.read().await.get(identity) {
            Some(set) => set.lock().await.len(),
            None => 0,
        }
    }
}
