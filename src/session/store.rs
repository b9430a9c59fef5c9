use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use teloxide::types::UserId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::QuizSession;

type Slot = Arc<AsyncMutex<Option<QuizSession>>>;

/// Process-wide user → session map.
///
/// Each user gets their own async lock, so a transition for one user (which
/// may wait on the question provider) queues that user's later events behind
/// it without holding up anyone else. The map itself is only locked long
/// enough to find or create a user's slot.
#[derive(Default)]
pub struct SessionStore {
    slots: Mutex<HashMap<UserId, Slot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `user`'s session.
    ///
    /// Waiters are served in the order they arrived.
    pub async fn lock(&self, user: UserId) -> SessionGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            slots.entry(user).or_default().clone()
        };
        SessionGuard {
            user,
            inner: slot.lock_owned().await,
        }
    }

    /// Copy of the current session, waiting for any in-flight transition.
    pub async fn snapshot(&self, user: UserId) -> Option<QuizSession> {
        self.lock(user).await.clone()
    }

    pub fn user_count(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

/// Exclusive handle on one user's session; released on drop.
pub struct SessionGuard {
    user: UserId,
    inner: OwnedMutexGuard<Option<QuizSession>>,
}

impl SessionGuard {
    pub fn user(&self) -> UserId {
        self.user
    }
}

impl Deref for SessionGuard {
    type Target = Option<QuizSession>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
