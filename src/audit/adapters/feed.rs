//! In-process change-notification hub shared by repository adapters.
//!
//! Repositories publish a [`TaskChange`] after every successful status
//! write; the hub routes it to the owning user's live subscription. At most
//! one subscription exists per user id: subscribing again replaces the
//! prior channel, whose receiver then drains and closes.

use crate::audit::domain::UserId;
use crate::audit::ports::{TaskChange, TaskChangeSubscription};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

#[derive(Debug)]
struct Registration {
    token: u64,
    sender: mpsc::UnboundedSender<TaskChange>,
}

/// Routes task changes to per-user subscriptions.
#[derive(Debug, Default)]
pub struct TaskChangeHub {
    registrations: Mutex<HashMap<UserId, Registration>>,
    next_token: AtomicU64,
}

impl TaskChangeHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn registrations(&self) -> MutexGuard<'_, HashMap<UserId, Registration>> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers for the user's task changes, replacing any prior
    /// subscription for the same user.
    #[must_use]
    pub fn subscribe(self: &Arc<Self>, user: UserId) -> TaskChangeSubscription {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::unbounded_channel();
        self.registrations()
            .insert(user, Registration { token, sender });

        let hub = Arc::clone(self);
        TaskChangeSubscription::new(receiver, move || hub.remove(user, token))
    }

    /// Removes the registration only when it still belongs to the
    /// cancelling subscription, so a stale cancel cannot tear down a
    /// replacement.
    fn remove(&self, user: UserId, token: u64) {
        let mut registrations = self.registrations();
        if registrations
            .get(&user)
            .is_some_and(|registration| registration.token == token)
        {
            registrations.remove(&user);
        }
    }

    /// Delivers a change to the user's subscription, if one is live.
    pub fn publish(&self, user: UserId, change: TaskChange) {
        if let Some(registration) = self.registrations().get(&user) {
            registration.sender.send(change).ok();
        }
    }
}
