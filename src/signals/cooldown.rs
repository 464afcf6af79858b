//! Per (symbol, direction) publication cooldown
//!
//! Each key owns an async mutex, so the check, the publish and the mark run as
//! one critical section for that key while other keys proceed in parallel.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::core::clock::Clock;
use crate::models::signal::Direction;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CooldownKey {
    pub symbol: String,
    pub direction: Direction,
}

impl CooldownKey {
    pub fn new(symbol: impl Into<String>, direction: Direction) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
        }
    }
}

type Slot = Arc<AsyncMutex<Option<DateTime<Utc>>>>;

/// Outcome of [`CooldownTracker::try_publish`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    Suppressed,
}

pub struct CooldownTracker {
    window: Duration,
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<CooldownKey, Slot>>,
}

impl CooldownTracker {
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window,
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn slot(&self, key: &CooldownKey) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.entry(key.clone()).or_default().clone()
    }

    fn allows(last: Option<DateTime<Utc>>, now: DateTime<Utc>, window: Duration) -> bool {
        match last {
            None => true,
            Some(last) => now - last >= window,
        }
    }

    /// True if the key was never published or its last publication is at
    /// least one window old
    pub async fn can_publish(&self, key: &CooldownKey, now: DateTime<Utc>) -> bool {
        let slot = self.slot(key);
        let last = *slot.lock().await;
        Self::allows(last, now, self.window)
    }

    /// Sets or overwrites the key's last publication time
    pub async fn mark_published(&self, key: &CooldownKey, now: DateTime<Utc>) {
        let slot = self.slot(key);
        *slot.lock().await = Some(now);
    }

    /// Last publication time, if any
    pub async fn last_published(&self, key: &CooldownKey) -> Option<DateTime<Utc>> {
        let slot = self.slot(key);
        let last = *slot.lock().await;
        last
    }

    /// Check, publish and mark under the key's lock. A failed `publish`
    /// leaves the key unmarked and returns its error.
    pub async fn try_publish<F, Fut, E>(&self, key: &CooldownKey, publish: F) -> Result<PublishOutcome, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let slot = self.slot(key);
        let mut last = slot.lock().await;
        let now = self.clock.now();

        if !Self::allows(*last, now, self.window) {
            debug!(
                symbol = %key.symbol,
                direction = ?key.direction,
                "Signal suppressed by cooldown"
            );
            return Ok(PublishOutcome::Suppressed);
        }

        publish().await?;
        *last = Some(now);
        Ok(PublishOutcome::Published)
    }
}
