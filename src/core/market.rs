// The set of securities in a run plus their news groups

use crate::core::security::{PriceWalk, Security};
use crate::core::universe::Universe;
use crate::error::{MarketError, MarketResult};
use rand::Rng;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone)]
pub struct Market {
    securities: Vec<Security>,
    index: HashMap<String, usize>,
    /// anchor -> affiliated ids, as declared
    groups: HashMap<String, Vec<String>>,
}

impl Market {
    pub fn new(securities: Vec<Security>, groups: HashMap<String, Vec<String>>) -> MarketResult<Self> {
        if securities.is_empty() {
            return Err(MarketError::InvalidUniverse("no securities".to_string()));
        }

        let mut index = HashMap::with_capacity(securities.len());
        for (i, security) in securities.iter().enumerate() {
            if index.insert(security.id().to_string(), i).is_some() {
                return Err(MarketError::InvalidUniverse(format!("duplicate security id: {}", security.id())));
            }
        }

        for (anchor, members) in &groups {
            for id in std::iter::once(anchor).chain(members.iter()) {
                if !index.contains_key(id) {
                    return Err(MarketError::InvalidUniverse(format!(
                        "group {} references unknown security: {}",
                        anchor, id
                    )));
                }
            }
        }

        Ok(Self { securities, index, groups })
    }

    /// Draw starting prices for every declared security
    pub fn from_universe<R: Rng + ?Sized>(universe: &Universe, history_size: usize, rng: &mut R) -> MarketResult<Self> {
        universe.validate().map_err(MarketError::InvalidUniverse)?;

        let securities = universe
            .securities
            .iter()
            .map(|spec| Security::from_spec(spec, history_size, rng))
            .collect();

        let groups = universe
            .groups
            .iter()
            .map(|g| (g.anchor.clone(), g.members.clone()))
            .collect();

        Self::new(securities, groups)
    }

    pub fn securities(&self) -> &[Security] {
        &self.securities
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Security> {
        self.index.get(id).map(|&i| &self.securities[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Security> {
        match self.index.get(id) {
            Some(&i) => Some(&mut self.securities[i]),
            None => None,
        }
    }

    pub fn require(&self, id: &str) -> MarketResult<&Security> {
        self.get(id).ok_or_else(|| MarketError::UnknownSecurity(id.to_string()))
    }

    pub fn price_of(&self, id: &str) -> Option<f64> {
        self.get(id).map(Security::price)
    }

    /// Securities that move with `id` on news, excluding `id` itself.
    ///
    /// Groups are declared anchor -> members, but membership is resolved in
    /// both directions so any member pulls in the rest of its group.
    pub fn affiliates(&self, id: &str) -> Vec<String> {
        let mut out = BTreeSet::new();
        for (anchor, members) in &self.groups {
            if anchor == id || members.iter().any(|m| m == id) {
                out.insert(anchor.clone());
                out.extend(members.iter().cloned());
            }
        }
        out.remove(id);

        // Keep market order so news-feed output is stable
        let mut affiliates: Vec<String> = out.into_iter().collect();
        affiliates.sort_by_key(|a| self.index.get(a).copied().unwrap_or(usize::MAX));
        affiliates
    }

    pub fn advance_all<R: Rng + ?Sized>(&mut self, tick: u64, walk: &PriceWalk, rng: &mut R) {
        for security in &mut self.securities {
            security.advance(tick, walk, rng);
        }
    }

    /// Mean percent change across all securities
    pub fn index_change(&self) -> f64 {
        let total: f64 = self.securities.iter().map(Security::percent_change).sum();
        total / self.securities.len() as f64
    }
}
