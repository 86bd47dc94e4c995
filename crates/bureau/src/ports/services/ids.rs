//! Id Generator Port

use uuid::Uuid;

/// Source of fresh entity ids
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}
