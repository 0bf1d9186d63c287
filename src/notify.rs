//! Message passing between the score producer and its consumers.
//!
//! Each consumer gets its own channel and receives the finished score
//! payload by value, so nothing reads shared mutable state.

use crate::api::ScorePayload;
use log::*;
use std::sync::mpsc::{channel, Receiver, Sender};

#[derive(Default)]
pub struct ScoreFeed {
    subscribers: Vec<Sender<ScorePayload>>,
}

impl ScoreFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<ScorePayload> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Delivers a copy of the payload to every live subscriber. Subscribers
    /// whose receiver was dropped are pruned; publishing never fails.
    pub fn publish(&mut self, payload: &ScorePayload) {
        self.subscribers
            .retain(|tx| tx.send(payload.clone()).is_ok());
        debug!(
            "Published scores for {} stations to {} subscribers",
            payload.count,
            self.subscribers.len()
        );
    }
}
