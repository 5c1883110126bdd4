use std::sync::mpsc::{channel, Receiver, Sender};
use crate::events::types::RepositoryEvent;

pub struct EventBus {
    sender: Sender<RepositoryEvent>,
    receiver: Receiver<RepositoryEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { sender: tx, receiver: rx }
    }
    pub fn sender(&self) -> Sender<RepositoryEvent> { self.sender.clone() }

    /// Split into the receiving end; senders handed out earlier stay connected
    pub fn into_receiver(self) -> Receiver<RepositoryEvent> { self.receiver }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
