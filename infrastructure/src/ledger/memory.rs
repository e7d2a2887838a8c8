use ctxprobe_application::{UsageEntry, UsageLedger};
use std::sync::Mutex;

/// Ledger holding entries in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryUsageLedger {
    entries: Mutex<Vec<UsageEntry>>,
}

impl InMemoryUsageLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsageLedger for InMemoryUsageLedger {
    fn record(&self, entry: UsageEntry) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }

    fn entries(&self) -> Vec<UsageEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
