//! Drives a [`ViewState`] against a [`SyncService`].
//!
//! Events are applied locally first ([`Session::send`]); the requests they
//! produce wait in an outbox until [`Session::flush`] delivers them and feeds
//! every response back into the state. [`Session::dispatch`] does both.

use std::collections::VecDeque;

use super::state::{self, ViewEvent, ViewState};
use crate::protocol::{Request, SyncService};

pub struct Session<'a> {
    service: &'a SyncService,
    state: ViewState,
    outbox: VecDeque<Request>,
}

impl<'a> Session<'a> {
    /// Initialize the view and load the catalog and the first version.
    pub async fn start(service: &'a SyncService) -> Session<'a> {
        let (state, requests) = state::init();
        let mut session = Session {
            service,
            state,
            outbox: requests.into(),
        };
        session.flush().await;
        session
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Requests waiting to be delivered.
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    /// Apply an event locally and queue its requests.
    pub fn send(&mut self, event: ViewEvent) {
        let current = std::mem::take(&mut self.state);
        let (next, requests) = state::update(current, event);
        self.state = next;
        self.outbox.extend(requests);
    }

    /// Deliver queued requests until none remain. Returns how many responses
    /// were received.
    pub async fn flush(&mut self) -> usize {
        let mut received = 0;
        while let Some(request) = self.outbox.pop_front() {
            if let Some(response) = self.service.handle(request).await {
                received += 1;
                self.send(ViewEvent::Received(response));
            }
        }
        received
    }

    pub async fn dispatch(&mut self, event: ViewEvent) -> usize {
        self.send(event);
        self.flush().await
    }

    pub fn into_state(self) -> ViewState {
        self.state
    }
}
