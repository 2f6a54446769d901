// Integration tests for the simulation engine driving a whole run

mod common;

use common::{create_engine, create_news_only_config, create_test_config, drive_to_end};
use market_sim::{
    BuyQuantity, MarketError, NewsSource, RunPhase, SellQuantity, SimulationEvent, PRICE_FLOOR,
};
use std::collections::HashMap;

#[test]
fn test_run_ends_after_all_months() {
    let mut engine = create_engine(create_test_config(1));
    let reports = drive_to_end(&mut engine);

    assert_eq!(reports.len(), 90);
    assert!(reports.last().unwrap().ended);
    assert!(reports[..89].iter().all(|r| !r.ended));
    assert_eq!(engine.phase(), RunPhase::Ended);

    let report = engine.final_report().expect("Final report missing");
    assert_eq!(report.ticks_elapsed, 90);
    assert_eq!(engine.clock_state().ticks_left_total, 0);
    assert_eq!(engine.clock_state().month_index, 2);
    assert_eq!(engine.clock().month_name(), "March");

    // One sample at open plus one per tick
    assert_eq!(engine.net_worth_history().len(), 91);
    assert_eq!(engine.net_worth_history().last().unwrap().net_worth, report.final_net_worth);

    let log: Vec<&str> = engine.market_log().iter().map(|e| e.message.as_str()).collect();
    assert!(log.iter().any(|m| *m == "All 3 months have passed!"));
    assert!(log.iter().any(|m| m.starts_with("Final Net Worth: $")));
}

#[test]
fn test_nothing_changes_after_run_end() {
    let mut engine = create_engine(create_test_config(2));
    engine.buy(Some("Space Tourism"), BuyQuantity::Shares(5)).unwrap();
    engine.run_to_end();

    let cash = engine.portfolio().cash();
    let quotes = engine.quotes();
    let samples = engine.net_worth_history().len();

    assert!(matches!(engine.advance_tick(), Err(MarketError::RunEnded)));
    assert!(matches!(engine.buy(Some("Space Tourism"), BuyQuantity::Max), Err(MarketError::RunEnded)));
    assert!(matches!(engine.sell(Some("Space Tourism"), SellQuantity::All), Err(MarketError::RunEnded)));
    // Run end takes precedence over a missing selection
    assert!(matches!(engine.buy(None, BuyQuantity::Shares(1)), Err(MarketError::RunEnded)));

    assert_eq!(engine.portfolio().cash(), cash);
    assert_eq!(engine.portfolio().shares("Space Tourism"), 5);
    assert_eq!(engine.quotes(), quotes);
    assert_eq!(engine.net_worth_history().len(), samples);
    assert!(engine.pending_impacts().is_empty());
}

#[test]
fn test_typed_quantities_follow_rejection_order() {
    let mut engine = create_engine(create_test_config(12));

    assert!(matches!(engine.buy_from_input(None, "lots"), Err(MarketError::NoSelection)));
    assert!(matches!(
        engine.buy_from_input(Some("Space Tourism"), ""),
        Err(MarketError::InvalidQuantity(_))
    ));
    assert!(matches!(
        engine.buy_from_input(Some("Pluto Pizza"), "2"),
        Err(MarketError::UnknownSecurity(_))
    ));
    assert_eq!(engine.market_log().len(), 3);

    engine.run_to_end();
    let logged = engine.market_log().len();
    let cash = engine.portfolio().cash();

    assert!(matches!(engine.buy_from_input(Some("Space Tourism"), "1.5"), Err(MarketError::RunEnded)));
    assert!(matches!(engine.sell_from_input(None, "abc"), Err(MarketError::RunEnded)));
    assert_eq!(engine.market_log().len(), logged + 2);
    assert_eq!(engine.market_log().last().unwrap().message, MarketError::RunEnded.to_string());
    assert_eq!(engine.portfolio().cash(), cash);
}

#[test]
fn test_prices_never_fall_below_floor() {
    let mut config = create_test_config(3);
    config.price.max_move_up = 1.0;
    config.price.max_move_down = 400.0;
    let mut engine = create_engine(config);
    drive_to_end(&mut engine);

    for security in engine.securities() {
        assert!(security.price() >= PRICE_FLOOR);
        assert!(security.history().iter().all(|p| p.price >= PRICE_FLOOR));
    }
}

#[test]
fn test_cash_never_negative_while_trading() {
    let mut engine = create_engine(create_test_config(4));
    let ids: Vec<String> = engine.securities().iter().map(|s| s.id().to_string()).collect();

    let mut tick = 0usize;
    while !engine.is_ended() {
        let id = &ids[tick % ids.len()];
        if tick % 3 == 0 {
            let _ = engine.buy(Some(id), BuyQuantity::Max);
        } else if tick % 3 == 1 {
            let _ = engine.sell(Some(&ids[(tick + 5) % ids.len()]), SellQuantity::All);
        } else {
            let _ = engine.buy(Some(id), BuyQuantity::Shares(3));
        }
        assert!(engine.portfolio().cash() >= 0.0);
        engine.advance_tick().unwrap();
        tick += 1;
    }
}

#[test]
fn test_same_seed_replays_identically() {
    let mut first = create_engine(create_test_config(42));
    let mut second = create_engine(create_test_config(42));

    first.buy(Some("Terraform Inc"), BuyQuantity::Shares(4)).unwrap();
    second.buy(Some("Terraform Inc"), BuyQuantity::Shares(4)).unwrap();
    drive_to_end(&mut first);
    drive_to_end(&mut second);

    assert_eq!(first.quotes(), second.quotes());
    assert_eq!(first.news_feed(), second.news_feed());
    assert_eq!(first.net_worth(), second.net_worth());
    assert_ne!(first.run_id(), second.run_id());
}

#[test]
fn test_scheduled_news_per_month_within_range() {
    let config = create_test_config(5);
    let (min, max) = (config.news.min_per_month, config.news.max_per_month);
    let tpm = config.simulation.ticks_per_month;
    let mut engine = create_engine(config);

    let triggers = engine.clock().triggers();
    assert!((min as usize..=max as usize).contains(&triggers.len()));

    while !engine.is_ended() {
        let report = engine.advance_tick().unwrap();
        if report.month_rolled {
            let triggers = engine.clock().triggers();
            assert!((min as usize..=max as usize).contains(&triggers.len()));
            assert!(triggers.iter().all(|&offset| offset >= 1 && offset < tpm));
        }
    }

    let mut per_month: HashMap<u32, u32> = HashMap::new();
    for event in engine.news_feed().iter().filter(|e| e.source == NewsSource::Scheduled) {
        *per_month.entry(event.month_index).or_insert(0) += 1;
    }
    for month in 0..3 {
        let count = per_month.get(&month).copied().unwrap_or(0);
        assert!(count >= min && count <= max, "month {} had {} scheduled headlines", month, count);
    }
}

#[test]
fn test_news_moves_prices_only_after_delay() {
    let config = create_news_only_config(6);
    let delay = config.news.impact_delay_ticks as u64;
    let duration = config.news.impact_duration_ticks as u64;
    let mut engine = create_engine(config);
    let reports = drive_to_end(&mut engine);

    let news = engine.news_feed().to_vec();
    assert!(!news.is_empty());
    for event in &news {
        assert_eq!(event.affected[0], event.anchor);
    }

    let mut applied: HashMap<String, f64> = HashMap::new();
    for report in &reports {
        for impact in &report.impacts {
            let explained = news.iter().any(|n| {
                n.affected.contains(&impact.security_id)
                    && impact.tick > n.tick + delay
                    && impact.tick <= n.tick + delay + duration
            });
            assert!(explained, "impact on {} at tick {} has no matching headline", impact.security_id, impact.tick);
            *applied.entry(impact.security_id.clone()).or_insert(0.0) += impact.applied_delta;
        }
    }

    // Without the random walk every price change is an applied impact step
    for security in engine.securities() {
        let moved = security.price() - security.initial_price();
        let expected = applied.get(security.id()).copied().unwrap_or(0.0);
        assert!((moved - expected).abs() < 1e-6, "{} moved {} but impacts sum to {}", security.id(), moved, expected);
    }
}

#[test]
fn test_buy_then_sell_same_tick_restores_cash() {
    let mut engine = create_engine(create_test_config(7));
    for _ in 0..10 {
        engine.advance_tick().unwrap();
    }
    let before = engine.net_worth();

    let bought = engine.buy(Some("Mars Real Estate"), BuyQuantity::Shares(10)).unwrap();
    assert!((engine.net_worth() - before).abs() < 1e-9);
    assert_eq!(engine.invested_value(), bought.total);

    let sold = engine.sell(Some("Mars Real Estate"), SellQuantity::All).unwrap();
    assert_eq!(sold.shares, 10);
    assert!((engine.portfolio().cash() - before).abs() < 1e-9);
    assert_eq!(engine.portfolio().holdings().count(), 0);
}

#[test]
fn test_rejected_trades_leave_state_unchanged() {
    let mut engine = create_engine(create_test_config(8));
    let cash = engine.portfolio().cash();

    assert!(matches!(engine.buy(None, BuyQuantity::Max), Err(MarketError::NoSelection)));
    assert!(matches!(
        engine.buy(Some("Pluto Pizza"), BuyQuantity::Shares(1)),
        Err(MarketError::UnknownSecurity(_))
    ));
    assert!(matches!(
        engine.buy(Some("Space Tourism"), BuyQuantity::Shares(1_000_000)),
        Err(MarketError::InsufficientFunds { .. })
    ));
    assert!(matches!(
        engine.sell(Some("Space Tourism"), SellQuantity::Shares(1)),
        Err(MarketError::NoPosition(_))
    ));

    assert_eq!(engine.portfolio().cash(), cash);
    assert_eq!(engine.market_log().len(), 4);
    assert_eq!(engine.final_report(), None);
}

#[test]
fn test_subscriber_sees_whole_run() {
    let mut engine = create_engine(create_test_config(9));
    let mut events = engine.subscribe();
    drive_to_end(&mut engine);

    let (mut ticks, mut news, mut ended) = (0, 0, 0);
    while let Ok(event) = events.try_recv() {
        match event {
            SimulationEvent::Tick { .. } => ticks += 1,
            SimulationEvent::News(_) => news += 1,
            SimulationEvent::RunEnded(report) => {
                ended += 1;
                assert_eq!(report.ticks_elapsed, 90);
            }
            _ => {}
        }
    }

    // The run-ending tick is published before the end-of-run report
    assert_eq!(ticks, 90);
    assert_eq!(news, engine.news_feed().len());
    assert_eq!(ended, 1);
}
