// Headless run and sweep command implementations
use market_sim::progress::SweepProgress;
use market_sim::{Config, RunProgress, SimulationEngine};
use tracing::info;

pub fn run_headless(mut config: Config, json: bool, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    if quiet || json {
        config.logging.enable_news_logging = false;
        config.logging.enable_trade_logging = false;
    }

    let total_ticks = config.simulation.total_ticks();
    let mut engine = SimulationEngine::new(config)?;
    let progress = (!quiet && !json).then(|| RunProgress::new(total_ticks));

    while !engine.is_ended() {
        let report = engine.advance_tick()?;
        if let Some(progress) = &progress {
            progress.update(report.state.tick_index, report.state.month_index, report.net_worth);
        }
    }

    let report = engine.run_to_end();
    if let Some(progress) = &progress {
        progress.finish(&report);
    }

    if json {
        let output = serde_json::json!({
            "report": report,
            "quotes": engine.quotes(),
            "news": engine.news_feed(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    info!("📊 Final quotes");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for quote in engine.quotes() {
        info!("  {:<24} ${:>9.2}  {:>+8.2}%", quote.id, quote.price, quote.percent_change);
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("📰 {} news events, market {:+.2}%", report.news_events, report.market_change_pct);

    Ok(())
}

pub fn run_sweep(config: Config, runs: u64, start_seed: u64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let seeds: Vec<u64> = (start_seed..start_seed.saturating_add(runs)).collect();
    info!("🔬 Sweeping {} seeds starting at {}", seeds.len(), start_seed);

    let progress = (!json).then(|| SweepProgress::new(seeds.len() as u64));
    let summary = market_sim::run_sweep(&config, &seeds, progress.as_ref())?;
    if let Some(progress) = &progress {
        progress.finish();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    info!("📈 Buy-and-hold results over {} runs", summary.runs.len());
    info!("   Mean P/L:       {:+.2}%", summary.mean_profit_loss_pct);
    info!("   Range:          {:+.2}% .. {:+.2}%", summary.min_profit_loss_pct, summary.max_profit_loss_pct);
    info!("   Market change:  {:+.2}%", summary.mean_market_change_pct);
    info!("   News per run:   {:.1}", summary.mean_news_events);

    Ok(())
}
