//! Usage ledger adapters
//!
//! Implementations of [`UsageLedger`](ctxprobe_application::UsageLedger):
//! an in-memory ledger for a single process and a JSONL file that also
//! keeps entries in memory so totals can be reported at the end of a run.

mod jsonl;
mod memory;

pub use jsonl::JsonlUsageLedger;
pub use memory::InMemoryUsageLedger;
