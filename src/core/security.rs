// Single tradable instrument and its price process

use crate::core::types::{Movement, PRICE_FLOOR};
use crate::core::universe::SecuritySpec;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Bounds of the per-tick random walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceWalk {
    pub max_up: f64,
    pub max_down: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub tick: u64,
    pub price: f64,
}

#[derive(Debug, Clone)]
pub struct Security {
    id: String,
    description: String,
    price: f64,
    initial_price: f64,
    last_delta: f64,
    history: VecDeque<PricePoint>,
    history_capacity: usize,
}

impl PriceWalk {
    /// Uniform draw over [-max_down, +max_up]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen::<f64>() * (self.max_up + self.max_down) - self.max_down
    }
}

impl Security {
    pub fn new(id: impl Into<String>, description: impl Into<String>, price: f64, history_capacity: usize) -> Self {
        let price = price.max(PRICE_FLOOR);
        let history_capacity = history_capacity.max(1);
        let mut history = VecDeque::with_capacity(history_capacity);
        history.push_back(PricePoint { tick: 0, price });

        Self {
            id: id.into(),
            description: description.into(),
            price,
            initial_price: price,
            last_delta: 0.0,
            history,
            history_capacity,
        }
    }

    /// Draw a starting price uniformly from the declared range
    pub fn from_spec<R: Rng + ?Sized>(spec: &SecuritySpec, history_capacity: usize, rng: &mut R) -> Self {
        let price = spec.min_price + (spec.max_price - spec.min_price) * rng.gen::<f64>();
        Self::new(spec.id.clone(), spec.description.clone(), price, history_capacity)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn initial_price(&self) -> f64 {
        self.initial_price
    }

    pub fn last_delta(&self) -> f64 {
        self.last_delta
    }

    pub fn history(&self) -> &VecDeque<PricePoint> {
        &self.history
    }

    /// One random-walk step
    pub fn advance<R: Rng + ?Sized>(&mut self, tick: u64, walk: &PriceWalk, rng: &mut R) -> f64 {
        let step = walk.sample(rng);
        self.set_price(tick, self.price + step)
    }

    /// One deterministic step of a scheduled news impact
    pub fn apply_impact_step(&mut self, tick: u64, delta: f64) -> f64 {
        self.set_price(tick, self.price + delta)
    }

    pub fn percent_change(&self) -> f64 {
        (self.price - self.initial_price) / self.initial_price * 100.0
    }

    pub fn movement(&self) -> Movement {
        if self.last_delta > 0.0 {
            Movement::Up
        } else if self.last_delta < 0.0 {
            Movement::Down
        } else {
            Movement::Flat
        }
    }

    // Every price mutation goes through here so clamping, delta tracking and
    // history stay consistent. Returns the applied delta.
    fn set_price(&mut self, tick: u64, candidate: f64) -> f64 {
        let old = self.price;
        let new = candidate.max(PRICE_FLOOR);

        self.price = new;
        self.last_delta = new - old;

        self.history.push_back(PricePoint { tick, price: new });
        while self.history.len() > self.history_capacity {
            self.history.pop_front();
        }

        self.last_delta
    }
}
