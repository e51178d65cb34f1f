use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::WordCounts;

/// Running counts of non-empty sub-lines: over the whole run, within the
/// current document and within the current page.
#[derive(Debug, Default)]
pub struct WordStats {
    overall: AtomicU64,
    document: AtomicU64,
    page: AtomicU64,
}

impl WordStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one sub-line and returns the counters including it.
    pub fn increment(&self) -> WordCounts {
        WordCounts {
            overall: self.overall.fetch_add(1, Ordering::Relaxed) + 1,
            document: self.document.fetch_add(1, Ordering::Relaxed) + 1,
            page: self.page.fetch_add(1, Ordering::Relaxed) + 1,
        }
    }

    /// Starts a new document, which also starts a new page.
    pub fn reset_document(&self) {
        self.document.store(0, Ordering::Relaxed);
        self.page.store(0, Ordering::Relaxed);
    }

    pub fn reset_page(&self) {
        self.page.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> WordCounts {
        WordCounts {
            overall: self.overall.load(Ordering::Relaxed),
            document: self.document.load(Ordering::Relaxed),
            page: self.page.load(Ordering::Relaxed),
        }
    }
}
