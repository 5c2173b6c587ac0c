//! Queue of work that must run on the host's main execution context.
//!
//! Background threads (directory pollers, the heartbeat monitor) never call
//! host code directly. They post closures or an exit request here, and the
//! host loop drains the queue once per tick.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

pub type MainTask = Box<dyn FnOnce() + Send + 'static>;

/// Request to end the host session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitRequest {
    /// Whether host state should be persisted before exiting
    pub save: bool,
    pub reason: String,
}

impl ExitRequest {
    pub fn without_saving(reason: impl Into<String>) -> Self {
        Self {
            save: false,
            reason: reason.into(),
        }
    }
}

enum Message {
    Run(MainTask),
    Exit(ExitRequest),
}

/// Result of one drain pass.
#[derive(Debug, Default)]
pub struct Drained {
    /// Number of tasks executed
    pub ran: usize,
    /// First exit request seen; tasks queued after it stay queued
    pub exit: Option<ExitRequest>,
}

/// Cloneable handle; every clone feeds the same queue.
#[derive(Clone)]
pub struct MainQueue {
    tx: Sender<Message>,
    rx: Arc<Mutex<Receiver<Message>>>,
}

impl MainQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Schedule `task` on the main context.
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // The receiver lives as long as any handle, so sending cannot fail.
        let _ = self.tx.send(Message::Run(Box::new(task)));
    }

    pub fn request_exit(&self, request: ExitRequest) {
        let _ = self.tx.send(Message::Exit(request));
    }

    /// Run every pending task in posting order, stopping at the first exit
    /// request. Must be called from the main context.
    pub fn drain(&self) -> Drained {
        let mut tasks = Vec::new();
        let mut exit = None;

        {
            let rx = match self.rx.lock() {
                Ok(rx) => rx,
                Err(poisoned) => poisoned.into_inner(),
            };
            loop {
                match rx.try_recv() {
                    Ok(Message::Run(task)) => tasks.push(task),
                    Ok(Message::Exit(request)) => {
                        exit = Some(request);
                        break;
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }
        }

        let ran = tasks.len();
        for task in tasks {
            task();
        }

        Drained { ran, exit }
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_tasks_run_only_when_drained() {
        let queue = MainQueue::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        queue.post(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        let drained = queue.drain();
        assert_eq!(drained.ran, 1);
        assert!(drained.exit.is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_tasks_run_in_posting_order() {
        let queue = MainQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let order = Arc::clone(&order);
            queue.post(move || order.lock().unwrap().push(i));
        }
        queue.drain();

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_posts_from_background_threads() {
        let queue = MainQueue::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    queue.post(move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.drain().ran, 4);
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_exit_stops_the_drain() {
        let queue = MainQueue::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        queue.post(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        queue.request_exit(ExitRequest::without_saving("stale"));
        let c = Arc::clone(&counter);
        queue.post(move || {
            c.fetch_add(10, Ordering::SeqCst);
        });

        let drained = queue.drain();
        assert_eq!(drained.ran, 1);
        assert_eq!(drained.exit, Some(ExitRequest::without_saving("stale")));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let drained = queue.drain();
        assert_eq!(drained.ran, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }
}
