//! Who did it, and when
//!
//! Services never read the clock or decide the acting user themselves; they
//! ask an [`Auditor`]. Production code uses [`SystemAuditor`], tests pin both
//! values with [`FixedAuditor`].

use chrono::{DateTime, Utc};

use crate::models::{AuditStamps, UserId};

/// Supplies the acting user and the current time
pub trait Auditor {
    fn actor(&self) -> UserId;

    fn now(&self) -> DateTime<Utc>;

    /// Stamp a newly created aggregate
    fn stamp_created(&self, stamps: &mut AuditStamps) {
        let (actor, now) = (self.actor(), self.now());
        stamps.created_at = Some(now);
        stamps.created_by = Some(actor);
        stamps.modified_at = Some(now);
        stamps.modified_by = Some(actor);
    }

    /// Stamp a modified aggregate
    fn stamp_modified(&self, stamps: &mut AuditStamps) {
        stamps.modified_at = Some(self.now());
        stamps.modified_by = Some(self.actor());
    }
}

/// Real clock, configured user
#[derive(Debug, Clone, Copy)]
pub struct SystemAuditor {
    actor: UserId,
}

impl SystemAuditor {
    pub fn new(actor: UserId) -> Self {
        Self { actor }
    }
}

impl Auditor for SystemAuditor {
    fn actor(&self) -> UserId {
        self.actor
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed user and timestamp
#[derive(Debug, Clone, Copy)]
pub struct FixedAuditor {
    actor: UserId,
    at: DateTime<Utc>,
}

impl FixedAuditor {
    pub fn new(actor: UserId, at: DateTime<Utc>) -> Self {
        Self { actor, at }
    }
}

impl Auditor for FixedAuditor {
    fn actor(&self) -> UserId {
        self.actor
    }

    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}
