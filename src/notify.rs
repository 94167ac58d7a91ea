//! User-facing notices.
//!
//! The original surface for these is a transient toast; the services layer
//! only collects them so any front end can drain and display. Fetch
//! failures and the "using sample data" annotation both land here instead
//! of propagating as errors into rendering code.

use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A fetch failed and the view fell back to an empty collection.
    FetchFailed { resource: String, detail: String },
    /// Input was rejected before any network call.
    InvalidInput { detail: String },
    /// Live results were missing or sparse and sample data was merged in.
    UsingSampleData { resource: String },
}

#[derive(Debug, Default)]
pub struct NoticeSink {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    /// Removes and returns all pending notices, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap())
    }

    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }
}
