//! Clock Port

use chrono::{DateTime, Utc};

/// Source of the current time for timestamps and expiry checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
