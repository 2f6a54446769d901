// Delayed, multi-step application of news impacts
//
// Every in-flight impact lives in one schedule keyed by the absolute tick of
// its next step, so overlapping impacts are swept in a single deterministic
// pass per tick.

use crate::core::market::Market;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingImpact {
    pub security_id: String,
    pub step_delta: f64,
    pub ticks_remaining: u32,
    next_fire_tick: u64,
}

/// A single step applied to a security during a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedImpact {
    pub tick: u64,
    pub security_id: String,
    pub step_delta: f64,
    pub applied_delta: f64,
    pub price_after: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ImpactScheduler {
    now: u64,
    schedule: BTreeMap<u64, Vec<PendingImpact>>,
    closed: bool,
}

impl PendingImpact {
    pub fn next_fire_tick(&self) -> u64 {
        self.next_fire_tick
    }

    /// Ticks left before the first step lands; zero once the impact has started
    pub fn ticks_until_start(&self, now: u64) -> u64 {
        self.next_fire_tick.saturating_sub(now + 1)
    }
}

impl ImpactScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick currently being processed
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn begin_tick(&mut self, tick: u64) {
        self.now = tick;
    }

    /// Spread `total_delta` over `duration_ticks` equal steps, the first landing
    /// `delay_ticks + 1` ticks from now. Returns false if nothing was scheduled.
    pub fn schedule_impact(
        &mut self,
        security_id: &str,
        total_delta: f64,
        duration_ticks: u32,
        delay_ticks: u32,
    ) -> bool {
        if self.closed {
            debug!("🚫 Scheduler closed, dropping impact on {}", security_id);
            return false;
        }
        if duration_ticks == 0 {
            warn!("⚠️  Zero-length impact on {} ignored", security_id);
            return false;
        }

        let first_fire = self.now + delay_ticks as u64 + 1;
        let impact = PendingImpact {
            security_id: security_id.to_string(),
            step_delta: total_delta / duration_ticks as f64,
            ticks_remaining: duration_ticks,
            next_fire_tick: first_fire,
        };

        debug!(
            "⏳ Impact scheduled on {}: {:+.2} over {} ticks starting tick {}",
            security_id, total_delta, duration_ticks, first_fire
        );

        self.schedule.entry(first_fire).or_default().push(impact);
        true
    }

    /// Apply every step due at or before `tick`
    pub fn on_tick(&mut self, tick: u64, market: &mut Market) -> Vec<AppliedImpact> {
        self.now = tick;

        let later = self.schedule.split_off(&(tick + 1));
        let due = std::mem::replace(&mut self.schedule, later);

        let mut applied = Vec::new();
        for (_, impacts) in due {
            for mut impact in impacts {
                let Some(security) = market.get_mut(&impact.security_id) else {
                    warn!("⚠️  Dropping impact on unknown security {}", impact.security_id);
                    continue;
                };

                let applied_delta = security.apply_impact_step(tick, impact.step_delta);
                applied.push(AppliedImpact {
                    tick,
                    security_id: impact.security_id.clone(),
                    step_delta: impact.step_delta,
                    applied_delta,
                    price_after: security.price(),
                });

                impact.ticks_remaining -= 1;
                if impact.ticks_remaining > 0 {
                    impact.next_fire_tick = tick + 1;
                    self.schedule.entry(tick + 1).or_default().push(impact);
                }
            }
        }

        applied
    }

    /// In-flight impacts ordered by next fire tick
    pub fn pending(&self) -> Vec<&PendingImpact> {
        self.schedule.values().flatten().collect()
    }

    pub fn len(&self) -> usize {
        self.schedule.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.schedule.is_empty()
    }

    /// Drop everything in flight and refuse further scheduling
    pub fn close(&mut self) {
        self.schedule.clear();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
