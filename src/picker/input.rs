//! Input suppression while a pick is open.
//!
//! The dialog lives in another process, so the host cannot make it modal.
//! Instead the host routes its input through this gate: while a pick is in
//! flight input is swallowed, and the first touch or a fresh key press asks
//! for an audible alert.

use std::sync::Arc;

use super::coordinator::PickerCoordinator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDecision {
    Dispatch,
    Suppress { alert: bool },
}

#[derive(Clone)]
pub struct InputGate {
    picker: Arc<PickerCoordinator>,
}

impl InputGate {
    pub fn new(picker: Arc<PickerCoordinator>) -> Self {
        Self { picker }
    }

    pub fn touch(&self, index: u32) -> InputDecision {
        self.decide(index == 0)
    }

    pub fn key(&self, is_down: bool, is_repeat: bool) -> InputDecision {
        self.decide(is_down && !is_repeat)
    }

    pub fn scroll(&self) -> InputDecision {
        self.decide(false)
    }

    fn decide(&self, alert: bool) -> InputDecision {
        if self.picker.is_active() {
            InputDecision::Suppress { alert }
        } else {
            InputDecision::Dispatch
        }
    }
}
