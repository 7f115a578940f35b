//! Audit trail
//!
//! - [`Auditor`]: supplies the acting user and the clock, and stamps budgets.
//! - [`AuditEntry`]: one record per domain event (or budget deletion).
//! - [`AuditLogger`]: append-only JSONL file of entries.

mod auditor;
mod entry;
mod logger;

pub use auditor::{Auditor, FixedAuditor, SystemAuditor};
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
