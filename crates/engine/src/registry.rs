// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide active-sessions map.
//!
//! Sessions register on accept and deregister during cleanup. The map
//! is encapsulated rather than a true global; two registries coexist
//! cleanly because sessions are self-contained. Readers take the lock
//! shared for status queries; create/remove take it exclusive.

use crate::session::Session;
use dn_core::{CampaignStatus, SessionId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of active campaign sessions.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<SessionId, Arc<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session. Returns false if the ID is already active.
    pub fn insert(&self, session: Arc<Session>) -> bool {
        let mut map = self.inner.write();
        if map.contains_key(session.id()) {
            return false;
        }
        map.insert(session.id().clone(), session);
        true
    }

    pub fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.inner.read().get(id).cloned()
    }

    /// Deregister a session, returning it if it was present.
    pub fn remove(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.inner.write().remove(id)
    }

    /// Status of an active session, if any.
    pub fn status(&self, id: &SessionId) -> Option<CampaignStatus> {
        self.inner.read().get(id).map(|s| s.status())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
