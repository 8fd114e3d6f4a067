//! One-second cooldown ticker.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

const TICK: Duration = Duration::from_secs(1);

/// Repeating one-second timer that exists only while armed.
///
/// Cancelling drops the interval, so no tick can be observed afterwards.
#[derive(Debug, Default)]
pub struct CooldownTimer {
    interval: Option<Interval>,
}

impl CooldownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)starts the timer; the first tick is one second from now.
    pub fn arm(&mut self) {
        let mut interval = interval_at(Instant::now() + TICK, TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    pub fn cancel(&mut self) {
        self.interval = None;
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Waits for the next tick. Pends forever while disarmed.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
