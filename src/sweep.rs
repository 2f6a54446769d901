// Parallel seeded runs for studying the price process

use crate::config::Config;
use crate::core::types::BuyQuantity;
use crate::error::MarketResult;
use crate::progress::SweepProgress;
use crate::simulation::SimulationEngine;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of one headless run under an equal-weight buy-and-hold portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRun {
    pub seed: u64,
    pub market_change_pct: f64,
    pub profit_loss_pct: f64,
    pub news_events: usize,
    pub best_security: String,
    pub best_change_pct: f64,
    pub worst_security: String,
    pub worst_change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub runs: Vec<SweepRun>,
    pub mean_market_change_pct: f64,
    pub mean_profit_loss_pct: f64,
    pub min_profit_loss_pct: f64,
    pub max_profit_loss_pct: f64,
    pub mean_news_events: f64,
}

/// Run one simulation per seed, in parallel, and aggregate the results
pub fn run_sweep(base: &Config, seeds: &[u64], progress: Option<&SweepProgress>) -> MarketResult<SweepSummary> {
    let runs = seeds
        .par_iter()
        .map(|&seed| {
            let run = run_one(base, seed);
            if let Some(progress) = progress {
                progress.inc();
            }
            run
        })
        .collect::<MarketResult<Vec<_>>>()?;

    Ok(summarize(runs))
}

fn run_one(base: &Config, seed: u64) -> MarketResult<SweepRun> {
    let mut config = base.clone();
    config.simulation.seed = Some(seed);
    config.logging.enable_news_logging = false;
    config.logging.enable_trade_logging = false;
    config.logging.enable_price_logging = false;

    let mut engine = SimulationEngine::new(config)?;

    // Equal cash allocation across the market at the opening prices
    let allocation = engine.portfolio().cash() / engine.securities().len() as f64;
    let orders: Vec<(String, i64)> = engine
        .securities()
        .iter()
        .map(|s| (s.id().to_string(), (allocation / s.price()).floor() as i64))
        .filter(|&(_, shares)| shares > 0)
        .collect();
    for (id, shares) in orders {
        engine.buy(Some(&id), BuyQuantity::Shares(shares))?;
    }

    let report = engine.run_to_end();

    let mut best = (String::new(), f64::NEG_INFINITY);
    let mut worst = (String::new(), f64::INFINITY);
    for security in engine.securities() {
        let change = security.percent_change();
        if change > best.1 {
            best = (security.id().to_string(), change);
        }
        if change < worst.1 {
            worst = (security.id().to_string(), change);
        }
    }

    Ok(SweepRun {
        seed,
        market_change_pct: report.market_change_pct,
        profit_loss_pct: report.profit_loss_pct,
        news_events: report.news_events,
        best_security: best.0,
        best_change_pct: best.1,
        worst_security: worst.0,
        worst_change_pct: worst.1,
    })
}

fn summarize(runs: Vec<SweepRun>) -> SweepSummary {
    let n = runs.len().max(1) as f64;
    let mean = |f: fn(&SweepRun) -> f64| runs.iter().map(f).sum::<f64>() / n;

    let mean_market_change_pct = mean(|r| r.market_change_pct);
    let mean_profit_loss_pct = mean(|r| r.profit_loss_pct);
    let mean_news_events = mean(|r| r.news_events as f64);
    let min_profit_loss_pct = runs.iter().map(|r| r.profit_loss_pct).fold(f64::INFINITY, f64::min);
    let max_profit_loss_pct = runs.iter().map(|r| r.profit_loss_pct).fold(f64::NEG_INFINITY, f64::max);

    SweepSummary {
        runs,
        mean_market_change_pct,
        mean_profit_loss_pct,
        min_profit_loss_pct,
        max_profit_loss_pct,
        mean_news_events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_config() -> Config {
        let mut config = Config::default();
        config.simulation.months = 2;
        config.simulation.ticks_per_month = 30;
        config
    }

    #[test]
    fn test_sweep_is_deterministic_per_seed() {
        let config = short_config();
        let first = run_sweep(&config, &[1, 2, 3], None).unwrap();
        let second = run_sweep(&config, &[1, 2, 3], None).unwrap();

        assert_eq!(first.runs.len(), 3);
        assert_eq!(first.runs, second.runs);
        assert!(first.min_profit_loss_pct <= first.mean_profit_loss_pct);
        assert!(first.mean_profit_loss_pct <= first.max_profit_loss_pct);
    }

    #[test]
    fn test_every_run_sees_scheduled_news() {
        let config = short_config();
        let summary = run_sweep(&config, &[10, 20], None).unwrap();
        for run in &summary.runs {
            // At least min_per_month scheduled headlines in each month
            assert!(run.news_events >= 4);
        }
    }
}
