//! Periodic broadcast scheduling
//!
//! Each message identifier has its own period and last-fire instant. The
//! policy is catch-up-free: when a poll observes one or more elapsed
//! periods, the message fires once and its last-fire time resets to now.
//! Missed periods are absorbed, never queued, so a stalled loop resumes
//! with single frames instead of a burst.

use std::time::{Duration, Instant};

use vecu_can::Frame;

use crate::config::BroadcastConfig;
use crate::state::VehicleState;

type EncodeFn = fn(&VehicleState) -> Frame;

fn encode_engine_1(state: &VehicleState) -> Frame {
    state.engine_data_1().to_frame()
}

fn encode_engine_2(state: &VehicleState) -> Frame {
    state.engine_data_2().to_frame()
}

fn encode_trans(state: &VehicleState) -> Frame {
    state.trans_data().to_frame()
}

fn encode_bcm(state: &VehicleState) -> Frame {
    state.bcm_data().to_frame()
}

struct Slot {
    period: Duration,
    last_fire: Instant,
    encode: EncodeFn,
}

/// Drives the periodic broadcast messages off one monotonic clock.
pub struct Broadcaster {
    slots: Vec<Slot>,
}

impl Broadcaster {
    /// Build the broadcast table with all last-fire times set to `now`,
    /// so each message first fires one period after startup.
    pub fn new(config: &BroadcastConfig, now: Instant) -> Self {
        let slot = |period_ms: u64, encode: EncodeFn| Slot {
            period: Duration::from_millis(period_ms),
            last_fire: now,
            encode,
        };
        Self {
            slots: vec![
                slot(config.engine1_ms, encode_engine_1),
                slot(config.engine2_ms, encode_engine_2),
                slot(config.trans_ms, encode_trans),
                slot(config.bcm_ms, encode_bcm),
            ],
        }
    }

    /// Encode and return every message whose period has elapsed at `now`,
    /// reading the live state once per due message.
    pub fn poll(&mut self, now: Instant, state: &VehicleState) -> Vec<Frame> {
        let mut due = Vec::new();
        for slot in &mut self.slots {
            if now.duration_since(slot.last_fire) >= slot.period {
                due.push((slot.encode)(state));
                slot.last_fire = now;
            }
        }
        due
    }
}
