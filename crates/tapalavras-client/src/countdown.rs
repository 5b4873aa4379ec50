//! Local turn countdown anchored at the receipt time of the last turn event.
//!
//! The displayed time is advisory. Reaching zero never ends a turn; only a
//! server `player-lost` or `turn-changed` does.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tapalavras_common::room::{Player, Room};

pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Below this share of the limit the timer is drawn as urgent.
const LOW_TIME_FRACTION: f64 = 0.3;

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Idle { limit_ms: u64 },
    Running { anchor_ms: i64, limit_ms: u64 },
}

impl Countdown {
    /// Running only while the viewer holds a live, anchored turn.
    pub fn for_viewer(room: &Room, viewer: &Player) -> Self {
        let viewer_turn = room.active_player_id.as_deref() == Some(viewer.id.as_str());
        match room.current_turn_start_time {
            Some(anchor_ms) if viewer_turn && room.is_turn_live() => Countdown::Running {
                anchor_ms,
                limit_ms: room.time_limit,
            },
            _ => Countdown::Idle {
                limit_ms: room.time_limit,
            },
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Countdown::Running { .. })
    }

    pub fn limit_ms(&self) -> u64 {
        match *self {
            Countdown::Idle { limit_ms } | Countdown::Running { limit_ms, .. } => limit_ms,
        }
    }

    pub fn remaining_ms(&self, now_ms: i64) -> u64 {
        match *self {
            Countdown::Idle { limit_ms } => limit_ms,
            Countdown::Running {
                anchor_ms,
                limit_ms,
            } => {
                let elapsed = u64::try_from(now_ms.saturating_sub(anchor_ms)).unwrap_or(0);
                limit_ms.saturating_sub(elapsed)
            }
        }
    }

    pub fn seconds_left(&self, now_ms: i64) -> u64 {
        self.remaining_ms(now_ms).div_ceil(1000)
    }

    /// Remaining share of the limit in `0.0..=1.0`.
    pub fn fraction(&self, now_ms: i64) -> f64 {
        let limit = self.limit_ms();
        if limit == 0 {
            return 0.0;
        }
        self.remaining_ms(now_ms) as f64 / limit as f64
    }

    pub fn is_low(&self, now_ms: i64) -> bool {
        self.fraction(now_ms) < LOW_TIME_FRACTION
    }
}

/// Repeating redraw timer for a running countdown.
///
/// At most one timer task exists. Syncing to a different countdown aborts the
/// old task before starting a new one, and dropping the ticker aborts it.
#[derive(Debug)]
pub struct CountdownTicker<E> {
    tx: mpsc::Sender<E>,
    tick: E,
    period: Duration,
    current: Option<Countdown>,
    task: Option<JoinHandle<()>>,
}

impl<E: Clone + Send + 'static> CountdownTicker<E> {
    pub fn new(tx: mpsc::Sender<E>, tick: E) -> Self {
        Self {
            tx,
            tick,
            period: TICK_INTERVAL,
            current: None,
            task: None,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn current(&self) -> Option<Countdown> {
        self.current
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn sync(&mut self, countdown: Countdown) {
        if !countdown.is_running() {
            self.stop();
            return;
        }
        if self.current == Some(countdown) && self.is_running() {
            return;
        }

        self.stop();
        tracing::trace!("Countdown timer restarted: {:?}", countdown);

        let tx = self.tx.clone();
        let tick = self.tick.clone();
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if tx.send(tick.clone()).await.is_err() {
                    break;
                }
            }
        }));
        self.current = Some(countdown);
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.current = None;
    }
}

impl<E> Drop for CountdownTicker<E> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
