//! File picks delegated to a helper process.
//!
//! The host launches the picker helper with the namespace, start path, dialog
//! title, mode keyword and filters. The helper truncates `selectedFile.txt`,
//! shows the dialog and writes the answer there; the coordinator picks the
//! answer up through the directory watcher and resolves the caller's
//! [`PickTask`] on the next host tick.

mod answer;
mod coordinator;
mod error;
mod input;
mod request;
mod task;


pub use answer::{split_paths, Answer, CANCELLED_SENTINEL};
pub use coordinator::PickerCoordinator;
pub use error::PickError;
pub use input::{InputDecision, InputGate};
pub use request::{
    encode_filters, CancelContinuation, Continuation, FileFilter, MultiContinuation, PickMode,
    PickRequest, SingleContinuation,
};
pub use task::{PickOutcome, PickTask};
