//! Caller-side handle for a pick that resolves later.

use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome<T> {
    Picked(T),
    Cancelled,
}

/// Receives the outcome of one pick. The outcome is sent from the host's main
/// context, so it only becomes available after a `HostContext::tick`.
#[derive(Debug)]
pub struct PickTask<T> {
    rx: Receiver<PickOutcome<T>>,
    peeked: RefCell<Option<PickOutcome<T>>>,
}

pub(crate) fn channel<T>() -> (Sender<PickOutcome<T>>, PickTask<T>) {
    let (tx, rx) = mpsc::channel();
    (
        tx,
        PickTask {
            rx,
            peeked: RefCell::new(None),
        },
    )
}

impl<T> PickTask<T> {
    /// Take the outcome if it has arrived. A request dropped without an
    /// answer (e.g. the coordinator went away) reads as cancelled.
    pub fn try_take(&self) -> Option<PickOutcome<T>> {
        if let Some(outcome) = self.peeked.borrow_mut().take() {
            return Some(outcome);
        }
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(PickOutcome::Cancelled),
        }
    }

    /// Whether `try_take` would return an outcome. Does not consume it.
    pub fn is_ready(&self) -> bool {
        let mut peeked = self.peeked.borrow_mut();
        if peeked.is_none() {
            *peeked = match self.rx.try_recv() {
                Ok(outcome) => Some(outcome),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(PickOutcome::Cancelled),
            };
        }
        peeked.is_some()
    }
}
