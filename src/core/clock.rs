// Simulated calendar: ticks, months and the monthly news triggers

use crate::core::types::month_name;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    pub tick_index: u64,
    pub month_index: u32,
    pub ticks_left_in_month: u32,
    pub ticks_left_total: u64,
}

/// Outcome of a single clock advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    pub state: ClockState,
    /// Offset within the month that just elapsed, 1-based
    pub month_offset: u32,
    pub news_triggered: bool,
    pub month_rolled: bool,
    pub run_ended: bool,
}

#[derive(Debug, Clone)]
pub struct Clock {
    months: u32,
    ticks_per_month: u32,
    min_news: u32,
    max_news: u32,
    state: ClockState,
    triggers: BTreeSet<u32>,
    ended: bool,
}

impl Clock {
    /// `max_news` below `min_news` is raised to `min_news`
    pub fn new<R: Rng + ?Sized>(
        months: u32,
        ticks_per_month: u32,
        min_news: u32,
        max_news: u32,
        rng: &mut R,
    ) -> Self {
        let mut clock = Self {
            months,
            ticks_per_month,
            min_news,
            max_news: max_news.max(min_news),
            state: ClockState {
                tick_index: 0,
                month_index: 0,
                ticks_left_in_month: ticks_per_month,
                ticks_left_total: months as u64 * ticks_per_month as u64,
            },
            triggers: BTreeSet::new(),
            ended: false,
        };
        clock.regenerate_triggers(rng);
        clock
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    pub fn ticks_per_month(&self) -> u32 {
        self.ticks_per_month
    }

    /// Pending news offsets for the current month
    pub fn triggers(&self) -> &BTreeSet<u32> {
        &self.triggers
    }

    pub fn month_name(&self) -> &'static str {
        month_name(self.state.month_index)
    }

    /// Remaining run time as (minutes, seconds) at one tick per second
    pub fn time_left(&self) -> (u64, u64) {
        (self.state.ticks_left_total / 60, self.state.ticks_left_total % 60)
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ClockTick {
        if self.ended {
            return ClockTick {
                state: self.state,
                month_offset: 0,
                news_triggered: false,
                month_rolled: false,
                run_ended: true,
            };
        }

        self.state.tick_index += 1;
        self.state.ticks_left_total = self.state.ticks_left_total.saturating_sub(1);
        self.state.ticks_left_in_month = self.state.ticks_left_in_month.saturating_sub(1);

        let month_offset = self.ticks_per_month - self.state.ticks_left_in_month;
        let news_triggered = self.triggers.remove(&month_offset);

        let mut month_rolled = false;
        if self.state.ticks_left_in_month == 0 {
            // The final month stays current once the run is over
            if self.state.month_index + 1 >= self.months {
                self.ended = true;
            } else {
                self.state.month_index += 1;
                month_rolled = true;
                self.state.ticks_left_in_month = self.ticks_per_month;
                self.regenerate_triggers(rng);
            }
        }

        if self.state.ticks_left_total == 0 {
            self.ended = true;
        }

        ClockTick {
            state: self.state,
            month_offset,
            news_triggered,
            month_rolled,
            run_ended: self.ended,
        }
    }

    // Offsets are distinct draws from 1..ticks_per_month-1 so a trigger never
    // coincides with the month boundary itself.
    fn regenerate_triggers<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.triggers.clear();
        let available = self.ticks_per_month.saturating_sub(1) as usize;
        if available == 0 {
            return;
        }

        let count = rng.gen_range(self.min_news..=self.max_news) as usize;
        let count = count.min(available);
        self.triggers = index::sample(rng, available, count)
            .into_iter()
            .map(|i| i as u32 + 1)
            .collect();
    }
}
