// News generation: headline, target selection and impact sizing

use crate::config::NewsConfig;
use crate::core::market::Market;
use crate::core::types::month_name;
use crate::simulation::impact_scheduler::ImpactScheduler;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewsSource {
    Scheduled,  // One of the month's pre-chosen trigger offsets
    Random,     // The periodic probability check
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
}

/// News-feed record handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEvent {
    pub tick: u64,
    pub month_index: u32,
    pub headline: String,
    pub anchor: String,
    pub affected: Vec<String>,
    pub sentiment: Sentiment,
    pub tier: u32,
    pub source: NewsSource,
}

#[derive(Debug, Clone)]
pub struct NewsGenerator {
    headlines: Vec<String>,
    probability: f64,
    interval_ticks: u32,
    magnitude_unit: f64,
    magnitude_tiers: u32,
    impact_duration_ticks: u32,
    impact_delay_ticks: u32,
}

impl Sentiment {
    pub fn sign(self) -> f64 {
        match self {
            Sentiment::Positive => 1.0,
            Sentiment::Negative => -1.0,
        }
    }
}

impl NewsEvent {
    pub fn month(&self) -> &'static str {
        month_name(self.month_index)
    }
}

impl fmt::Display for NewsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (Affects {})", self.month(), self.headline, self.affected.join(", "))
    }
}

impl NewsGenerator {
    pub fn new(headlines: Vec<String>, config: &NewsConfig) -> Self {
        Self {
            headlines,
            probability: config.probability,
            interval_ticks: config.interval_ticks.max(1),
            magnitude_unit: config.magnitude_unit,
            magnitude_tiers: config.magnitude_tiers.max(1),
            impact_duration_ticks: config.impact_duration_ticks,
            impact_delay_ticks: config.impact_delay_ticks,
        }
    }

    pub fn headlines(&self) -> &[String] {
        &self.headlines
    }

    /// Whether the random headline check runs on this tick
    pub fn is_due(&self, tick: u64) -> bool {
        tick > 0 && tick % self.interval_ticks as u64 == 0
    }

    /// Periodic path: on cadence ticks, fire with the configured probability
    pub fn maybe_fire<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        tick: u64,
        month_index: u32,
        market: &Market,
        scheduler: &mut ImpactScheduler,
    ) -> Option<NewsEvent> {
        if !self.is_due(tick) || !rng.gen_bool(self.probability) {
            return None;
        }
        self.fire(rng, tick, month_index, market, scheduler, NewsSource::Random)
    }

    /// Pick a headline and target, size the move and hand it to the scheduler
    pub fn fire<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        tick: u64,
        month_index: u32,
        market: &Market,
        scheduler: &mut ImpactScheduler,
        source: NewsSource,
    ) -> Option<NewsEvent> {
        let headline = self.headlines.choose(rng)?.clone();
        let anchor = market.securities().choose(rng)?.id().to_string();

        let wants_group = rng.gen_bool(0.5);
        let affiliates = market.affiliates(&anchor);
        let mut affected = vec![anchor.clone()];
        if wants_group && !affiliates.is_empty() {
            affected.extend(affiliates);
        }

        let tier = rng.gen_range(1..=self.magnitude_tiers);
        let sentiment = if rng.gen_bool(0.5) { Sentiment::Positive } else { Sentiment::Negative };
        let factor = sentiment.sign() * tier as f64 * self.magnitude_unit;

        for id in &affected {
            if let Some(price) = market.price_of(id) {
                scheduler.schedule_impact(id, factor * price, self.impact_duration_ticks, self.impact_delay_ticks);
            }
        }

        Some(NewsEvent {
            tick,
            month_index,
            headline,
            anchor,
            affected,
            sentiment,
            tier,
            source,
        })
    }
}
