use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use teloxide::types::UserId;

use super::Fingerprint;

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Bounded FIFO set of fingerprints already shown to one user.
#[derive(Debug, Clone)]
pub struct SeenFingerprints {
    order: VecDeque<Fingerprint>,
    members: HashSet<Fingerprint>,
    capacity: usize,
}

impl SeenFingerprints {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.members.contains(fingerprint)
    }

    pub fn insert(&mut self, fingerprint: Fingerprint) {
        if !self.members.insert(fingerprint.clone()) {
            return;
        }
        self.order.push_back(fingerprint);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.members.remove(&evicted);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Per-user history of served questions.
///
/// Users never see each other's history. The lock is only held for the
/// duration of a lookup or insert, never across an await.
pub struct DuplicateTracker {
    capacity: usize,
    seen: Mutex<HashMap<UserId, SeenFingerprints>>,
}

impl DuplicateTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_fresh(&self, user: UserId, fingerprint: &Fingerprint) -> bool {
        let seen = self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        seen.get(&user).map_or(true, |s| !s.contains(fingerprint))
    }

    pub fn record(&self, user: UserId, fingerprint: Fingerprint) {
        let mut seen = self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        seen.entry(user)
            .or_insert_with(|| SeenFingerprints::new(self.capacity))
            .insert(fingerprint);
    }

    pub fn history_len(&self, user: UserId) -> usize {
        let seen = self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        seen.get(&user).map_or(0, SeenFingerprints::len)
    }
}

impl Default for DuplicateTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
