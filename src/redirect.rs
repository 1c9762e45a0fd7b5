use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::session::TokenStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    RedirectToLogin,
}

/// Sends the user back to the login flow.
pub trait Redirect: Send + Sync {
    /// Clears the session and leaves the dashboard after `delay`. Not
    /// cancellable once scheduled.
    fn schedule(&self, delay: Duration);
}

pub struct LoginRedirect {
    store: Arc<dyn TokenStore>,
    events: std_mpsc::Sender<UiEvent>,
    handle: Handle,
}

impl LoginRedirect {
    pub fn new(store: Arc<dyn TokenStore>, events: std_mpsc::Sender<UiEvent>, handle: Handle) -> Self {
        Self { store, events, handle }
    }
}

impl Redirect for LoginRedirect {
    fn schedule(&self, delay: Duration) {
        info!(delay_ms = delay.as_millis() as u64, "redirect to login scheduled");
        let store = self.store.clone();
        let events = self.events.clone();
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = store.remove() {
                warn!(error = %e, "could not remove session token");
            }
            let _ = events.send(UiEvent::RedirectToLogin);
        });
    }
}

#[cfg(test)]
pub mod recording {
    use std::sync::Mutex;

    use super::*;

    /// Records scheduled redirects instead of acting on them.
    #[derive(Default)]
    pub struct RecordingRedirect {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingRedirect {
        pub fn count(&self) -> usize {
            self.delays.lock().unwrap().len()
        }

        pub fn delays(&self) -> Vec<Duration> {
            self.delays.lock().unwrap().clone()
        }
    }

    impl Redirect for RecordingRedirect {
        fn schedule(&self, delay: Duration) {
            self.delays.lock().unwrap().push(delay);
        }
    }
}
