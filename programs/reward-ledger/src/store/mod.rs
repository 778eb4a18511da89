//! Persistence seam for user records.
//!
//! The ledger only ever talks to a `UserStore`; swapping the in-memory map for a
//! real backend does not touch any reward rule.

use crate::error::Result;
use crate::states::{UserId, UserRecord};

pub mod memory;
pub use memory::*;

pub trait UserStore: Send + Sync {
    /// Called once when the ledger opens.
    fn open(&self) -> Result<()>;

    /// Called once when the ledger closes. Later calls fail with `StoreUnavailable`.
    fn close(&self) -> Result<()>;

    fn get(&self, user_id: &UserId) -> Result<Option<UserRecord>>;

    fn upsert(&self, user_id: &UserId, record: &UserRecord) -> Result<()>;
}
