use crate::error::{ErrorCode, Result};
use crate::states::{UserId, UserRecord};
use crate::store::UserStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Process-local store. Records live until the process exits.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, UserRecord>>,
    open: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_open(&self) -> Result<()> {
        if self.open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ErrorCode::StoreUnavailable)
        }
    }
}

impl UserStore for InMemoryStore {
    fn open(&self) -> Result<()> {
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn get(&self, user_id: &UserId) -> Result<Option<UserRecord>> {
        self.ensure_open()?;
        let users = self.users.read().map_err(|_| ErrorCode::StoreUnavailable)?;
        Ok(users.get(user_id).cloned())
    }

    fn upsert(&self, user_id: &UserId, record: &UserRecord) -> Result<()> {
        self.ensure_open()?;
        let mut users = self.users.write().map_err(|_| ErrorCode::StoreUnavailable)?;
        users.insert(user_id.clone(), record.clone());
        Ok(())
    }
}
