// Scheduled refresh of a layer feed
use crate::application::layer_feed::LayerFeed;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Refresh timing. Jitter spreads clients polling the same backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshSchedule {
    pub initial_jitter: Duration,
    pub interval: Duration,
    pub interval_jitter: Duration,
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        Self {
            initial_jitter: Duration::from_millis(2_000),
            interval: Duration::from_secs(5 * 60),
            interval_jitter: Duration::from_millis(10_000),
        }
    }
}

fn jitter(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..max_ms))
}

impl RefreshSchedule {
    pub fn initial_delay(&self) -> Duration {
        jitter(self.initial_jitter)
    }

    /// Period for one task, drawn once when the task starts.
    pub fn period(&self) -> Duration {
        (self.interval + jitter(self.interval_jitter)).max(Duration::from_millis(1))
    }
}

/// Background task refreshing one feed until stopped or dropped.
pub struct RefreshTask {
    feed_id: String,
    handle: JoinHandle<()>,
}

impl RefreshTask {
    pub fn start(feed: Arc<LayerFeed>, schedule: RefreshSchedule) -> Self {
        let feed_id = feed.id.clone();
        let initial = schedule.initial_delay();
        let period = schedule.period();
        tracing::debug!(feed = %feed_id, ?initial, ?period, "starting refresh task");

        let handle = tokio::spawn(async move {
            tokio::time::sleep(initial).await;
            let _ = feed.refresh_now().await;

            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                // failures are logged by the feed and retried on the next tick
                let _ = feed.refresh_now().await;
            }
        });

        Self { feed_id, handle }
    }

    pub fn stop(&self) {
        tracing::debug!(feed = %self.feed_id, "stopping refresh task");
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
