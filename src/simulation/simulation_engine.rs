// Simulation Engine Orchestrator
// Coordinates the clock, price process, news and portfolio for one run

use crate::config::Config;
use crate::core::clock::{Clock, ClockState};
use crate::core::market::Market;
use crate::core::portfolio::{Portfolio, TradeRecord};
use crate::core::security::{PriceWalk, Security};
use crate::core::types::{BuyQuantity, Movement, SellQuantity};
use crate::error::{MarketError, MarketResult};
use crate::simulation::impact_scheduler::{AppliedImpact, ImpactScheduler, PendingImpact};
use crate::simulation::news::{NewsEvent, NewsGenerator, NewsSource};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Running,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetWorthSample {
    pub tick: u64,
    pub net_worth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketLogEntry {
    pub tick: u64,
    pub message: String,
}

/// Snapshot of one security for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub price: f64,
    pub last_delta: f64,
    pub percent_change: f64,
    pub movement: Movement,
    pub shares_held: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub run_id: Uuid,
    pub starting_cash: f64,
    pub final_net_worth: f64,
    pub profit_loss: f64,
    pub profit_loss_pct: f64,
    pub ticks_elapsed: u64,
    pub news_events: usize,
    pub trades: usize,
    pub market_change_pct: f64,
}

/// Everything that happened during one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub state: ClockState,
    pub news: Vec<NewsEvent>,
    pub impacts: Vec<AppliedImpact>,
    pub net_worth: f64,
    pub month_rolled: bool,
    pub ended: bool,
}

/// Notifications for a presentation layer
#[derive(Debug, Clone)]
pub enum SimulationEvent {
    Tick { state: ClockState, net_worth: f64 },
    News(NewsEvent),
    Trade(TradeRecord),
    TradeRejected { tick: u64, reason: String },
    RunEnded(FinalReport),
}

/// Owns all mutable state of a run; every tick and command is one `&mut` call
pub struct SimulationEngine {
    run_id: Uuid,
    config: Config,
    rng: StdRng,
    clock: Clock,
    market: Market,
    scheduler: ImpactScheduler,
    news: NewsGenerator,
    portfolio: Portfolio,
    walk: PriceWalk,
    phase: RunPhase,
    net_worth_history: Vec<NetWorthSample>,
    news_feed: Vec<NewsEvent>,
    market_log: Vec<MarketLogEntry>,
    trade_count: usize,
    final_report: Option<FinalReport>,
    events: broadcast::Sender<SimulationEvent>,
}

impl SimulationEngine {
    /// Start a new run from configuration
    pub fn new(config: Config) -> MarketResult<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self::build(config, events)
    }

    /// Create engine with default configuration
    pub fn with_default_config() -> MarketResult<Self> {
        Self::new(Config::default())
    }

    fn build(config: Config, events: broadcast::Sender<SimulationEvent>) -> MarketResult<Self> {
        config.validate()?;

        let mut rng = match config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let market = Market::from_universe(&config.universe, config.price.history_size, &mut rng)?;
        let clock = Clock::new(
            config.simulation.months,
            config.simulation.ticks_per_month,
            config.news.min_per_month,
            config.news.max_per_month,
            &mut rng,
        );
        let news = NewsGenerator::new(config.universe.headlines.clone(), &config.news);
        let portfolio = Portfolio::new(config.simulation.starting_cash);
        let walk = PriceWalk {
            max_up: config.price.max_move_up,
            max_down: config.price.max_move_down,
        };

        let run_id = Uuid::new_v4();
        info!(
            "🚀 Run {} started: {} securities, {} months x {} ticks, ${:.2} cash",
            run_id,
            market.len(),
            config.simulation.months,
            config.simulation.ticks_per_month,
            portfolio.cash()
        );

        let starting_cash = portfolio.cash();
        Ok(Self {
            run_id,
            config,
            rng,
            clock,
            market,
            scheduler: ImpactScheduler::new(),
            news,
            portfolio,
            walk,
            phase: RunPhase::Running,
            net_worth_history: vec![NetWorthSample { tick: 0, net_worth: starting_cash }],
            news_feed: Vec::new(),
            market_log: Vec::new(),
            trade_count: 0,
            final_report: None,
            events,
        })
    }

    /// Replace the current run with a fresh one; subscribers stay attached
    pub fn start_run(&mut self, config: Config) -> MarketResult<()> {
        *self = Self::build(config, self.events.clone())?;
        Ok(())
    }

    /// Receive tick, news, trade and end-of-run notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SimulationEvent> {
        self.events.subscribe()
    }

    /// Advance simulated time by one tick
    pub fn advance_tick(&mut self) -> MarketResult<TickReport> {
        if self.phase == RunPhase::Ended {
            return Err(MarketError::RunEnded);
        }

        // 1. clock
        let clock_tick = self.clock.tick(&mut self.rng);
        let tick = clock_tick.state.tick_index;
        let month = clock_tick.state.month_index;
        self.scheduler.begin_tick(tick);

        if clock_tick.run_ended {
            let net_worth = self.record_net_worth(tick);
            self.publish(SimulationEvent::Tick { state: clock_tick.state, net_worth });
            self.finish();
            return Ok(TickReport {
                state: clock_tick.state,
                news: Vec::new(),
                impacts: Vec::new(),
                net_worth,
                month_rolled: false,
                ended: true,
            });
        }

        if clock_tick.month_rolled {
            info!("📅 {} begins ({} news events scheduled)", self.clock.month_name(), self.clock.triggers().len());
        }

        // 2. news
        let mut news = Vec::new();
        if clock_tick.news_triggered {
            news.extend(self.news.fire(
                &mut self.rng,
                tick,
                month,
                &self.market,
                &mut self.scheduler,
                NewsSource::Scheduled,
            ));
        }
        news.extend(self.news.maybe_fire(&mut self.rng, tick, month, &self.market, &mut self.scheduler));
        for event in &news {
            self.record_news(event.clone());
        }

        // 3. random walk, 4. scheduled impacts on top of it
        self.market.advance_all(tick, &self.walk, &mut self.rng);
        let impacts = self.scheduler.on_tick(tick, &mut self.market);

        if self.config.logging.enable_price_logging {
            for security in self.market.securities() {
                debug!("💰 {}: ${:.2} ({:+.2})", security.id(), security.price(), security.last_delta());
            }
        }

        // 5. net worth
        let net_worth = self.record_net_worth(tick);
        self.publish(SimulationEvent::Tick { state: clock_tick.state, net_worth });

        Ok(TickReport {
            state: clock_tick.state,
            news,
            impacts,
            net_worth,
            month_rolled: clock_tick.month_rolled,
            ended: false,
        })
    }

    /// Fast-forward to the end of the run
    pub fn run_to_end(&mut self) -> FinalReport {
        while self.phase == RunPhase::Running {
            if self.advance_tick().is_err() {
                break;
            }
        }
        self.final_report.clone().unwrap_or_else(|| self.build_report())
    }

    pub fn buy(&mut self, security_id: Option<&str>, quantity: BuyQuantity) -> MarketResult<TradeRecord> {
        let result = self.try_buy(security_id, Ok(quantity));
        self.settle(result)
    }

    pub fn sell(&mut self, security_id: Option<&str>, quantity: SellQuantity) -> MarketResult<TradeRecord> {
        let result = self.try_sell(security_id, Ok(quantity));
        self.settle(result)
    }

    /// Buy with a quantity typed by the player ("max" or a whole number).
    /// A malformed amount is rejected like any other trade, after the
    /// run-ended and selection checks.
    pub fn buy_from_input(&mut self, security_id: Option<&str>, quantity: &str) -> MarketResult<TradeRecord> {
        let result = self.try_buy(security_id, quantity.parse());
        self.settle(result)
    }

    /// Sell with a quantity typed by the player ("all" or a whole number)
    pub fn sell_from_input(&mut self, security_id: Option<&str>, quantity: &str) -> MarketResult<TradeRecord> {
        let result = self.try_sell(security_id, quantity.parse());
        self.settle(result)
    }

    fn try_buy(&mut self, security_id: Option<&str>, quantity: MarketResult<BuyQuantity>) -> MarketResult<TradeRecord> {
        if self.phase == RunPhase::Ended {
            return Err(MarketError::RunEnded);
        }
        let id = security_id.ok_or(MarketError::NoSelection)?;
        let quantity = quantity?;
        let security = self.market.require(id)?;
        self.portfolio.buy(self.clock.state().tick_index, security, quantity)
    }

    fn try_sell(&mut self, security_id: Option<&str>, quantity: MarketResult<SellQuantity>) -> MarketResult<TradeRecord> {
        if self.phase == RunPhase::Ended {
            return Err(MarketError::RunEnded);
        }
        let id = security_id.ok_or(MarketError::NoSelection)?;
        let quantity = quantity?;
        let security = self.market.require(id)?;
        self.portfolio.sell(self.clock.state().tick_index, security, quantity)
    }

    fn settle(&mut self, result: MarketResult<TradeRecord>) -> MarketResult<TradeRecord> {
        let tick = self.clock.state().tick_index;
        match &result {
            Ok(trade) => {
                self.trade_count += 1;
                let message = format!(
                    "{} {} shares of {} @ ${:.2}",
                    trade.side, trade.shares, trade.security_id, trade.price
                );
                if self.config.logging.enable_trade_logging {
                    info!("💱 {} (cash ${:.2})", message, trade.cash_after);
                }
                self.log_market(tick, message);
                self.publish(SimulationEvent::Trade(trade.clone()));
            }
            Err(e) => {
                warn!("⚠️  Trade rejected ({}): {}", e.category(), e);
                self.log_market(tick, e.to_string());
                self.publish(SimulationEvent::TradeRejected { tick, reason: e.to_string() });
            }
        }
        result
    }

    fn record_news(&mut self, event: NewsEvent) {
        if self.config.logging.enable_news_logging {
            info!("📰 {} [{:?}, tier {}]", event, event.sentiment, event.tier);
        }
        self.news_feed.push(event.clone());
        self.publish(SimulationEvent::News(event));
    }

    fn record_net_worth(&mut self, tick: u64) -> f64 {
        let net_worth = self.portfolio.net_worth(&self.market);
        self.net_worth_history.push(NetWorthSample { tick, net_worth });
        net_worth
    }

    fn finish(&mut self) {
        self.phase = RunPhase::Ended;
        let dropped = self.scheduler.len();
        self.scheduler.close();
        if dropped > 0 {
            debug!("🧹 {} pending impacts discarded at run end", dropped);
        }

        let report = self.build_report();
        let tick = self.clock.state().tick_index;
        self.log_market(tick, format!("All {} months have passed!", self.config.simulation.months));
        self.log_market(
            tick,
            format!("Final Net Worth: ${:.2} (P/L: ${:.2})", report.final_net_worth, report.profit_loss),
        );

        info!(
            "🏁 Run {} ended: net worth ${:.2}, P/L ${:+.2} ({:+.2}%)",
            self.run_id, report.final_net_worth, report.profit_loss, report.profit_loss_pct
        );

        self.final_report = Some(report.clone());
        self.publish(SimulationEvent::RunEnded(report));
    }

    fn build_report(&self) -> FinalReport {
        let starting_cash = self.portfolio.starting_cash();
        let final_net_worth = self.net_worth();
        let profit_loss = final_net_worth - starting_cash;
        let profit_loss_pct = if starting_cash > 0.0 { profit_loss / starting_cash * 100.0 } else { 0.0 };

        FinalReport {
            run_id: self.run_id,
            starting_cash,
            final_net_worth,
            profit_loss,
            profit_loss_pct,
            ticks_elapsed: self.clock.state().tick_index,
            news_events: self.news_feed.len(),
            trades: self.trade_count,
            market_change_pct: self.market.index_change(),
        }
    }

    fn log_market(&mut self, tick: u64, message: String) {
        self.market_log.push(MarketLogEntry { tick, message });
    }

    fn publish(&self, event: SimulationEvent) {
        // No receivers is fine
        let _ = self.events.send(event);
    }

    // Queries

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase == RunPhase::Ended
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn securities(&self) -> &[Security] {
        self.market.securities()
    }

    pub fn security(&self, id: &str) -> Option<&Security> {
        self.market.get(id)
    }

    pub fn quotes(&self) -> Vec<Quote> {
        self.market
            .securities()
            .iter()
            .map(|s| Quote {
                id: s.id().to_string(),
                price: s.price(),
                last_delta: s.last_delta(),
                percent_change: s.percent_change(),
                movement: s.movement(),
                shares_held: self.portfolio.shares(s.id()),
            })
            .collect()
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn net_worth(&self) -> f64 {
        self.portfolio.net_worth(&self.market)
    }

    pub fn invested_value(&self) -> f64 {
        self.portfolio.invested_value(&self.market)
    }

    pub fn net_worth_history(&self) -> &[NetWorthSample] {
        &self.net_worth_history
    }

    pub fn news_feed(&self) -> &[NewsEvent] {
        &self.news_feed
    }

    pub fn market_log(&self) -> &[MarketLogEntry] {
        &self.market_log
    }

    pub fn pending_impacts(&self) -> Vec<&PendingImpact> {
        self.scheduler.pending()
    }

    pub fn final_report(&self) -> Option<&FinalReport> {
        self.final_report.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config(seed: u64) -> Config {
        let mut config = Config::default();
        config.simulation.seed = Some(seed);
        config.simulation.months = 2;
        config.simulation.ticks_per_month = 20;
        config.logging.enable_news_logging = false;
        config.logging.enable_trade_logging = false;
        config
    }

    #[test]
    fn test_engine_creation() {
        let engine = SimulationEngine::new(quiet_config(1)).unwrap();
        assert_eq!(engine.phase(), RunPhase::Running);
        assert_eq!(engine.securities().len(), 10);
        assert_eq!(engine.net_worth_history().len(), 1);
        assert_eq!(engine.net_worth(), 10_000.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = quiet_config(1);
        config.simulation.months = 0;
        assert!(matches!(SimulationEngine::new(config), Err(MarketError::Config(_))));
    }

    #[test]
    fn test_one_sample_per_tick() {
        let mut engine = SimulationEngine::new(quiet_config(2)).unwrap();
        for _ in 0..5 {
            engine.advance_tick().unwrap();
        }
        let ticks: Vec<u64> = engine.net_worth_history().iter().map(|s| s.tick).collect();
        assert_eq!(ticks, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_missing_selection_rejected_and_logged() {
        let mut engine = SimulationEngine::new(quiet_config(3)).unwrap();
        let result = engine.buy(None, BuyQuantity::Shares(1));
        assert!(matches!(result, Err(MarketError::NoSelection)));
        assert_eq!(engine.market_log().len(), 1);
        assert_eq!(engine.portfolio().cash(), 10_000.0);
    }

    #[test]
    fn test_unknown_security_rejected() {
        let mut engine = SimulationEngine::new(quiet_config(3)).unwrap();
        let result = engine.sell(Some("Venus Spa"), SellQuantity::All);
        assert!(matches!(result, Err(MarketError::UnknownSecurity(_))));
    }

    #[test]
    fn test_subscribers_see_trades() {
        let mut engine = SimulationEngine::new(quiet_config(4)).unwrap();
        let mut events = engine.subscribe();

        engine.buy(Some("Space Tourism"), BuyQuantity::Shares(1)).unwrap();
        match events.try_recv() {
            Ok(SimulationEvent::Trade(trade)) => assert_eq!(trade.security_id, "Space Tourism"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_typed_quantity_checked_after_selection() {
        let mut engine = SimulationEngine::new(quiet_config(7)).unwrap();

        assert!(matches!(engine.buy_from_input(None, "1.5"), Err(MarketError::NoSelection)));
        assert!(matches!(
            engine.sell_from_input(Some("Space Tourism"), "abc"),
            Err(MarketError::InvalidQuantity(_))
        ));
        assert_eq!(engine.market_log().len(), 2);

        let trade = engine.buy_from_input(Some("Space Tourism"), " 3 ").unwrap();
        assert_eq!(trade.shares, 3);
        let trade = engine.sell_from_input(Some("Space Tourism"), "all").unwrap();
        assert_eq!(trade.shares, 3);
    }

    #[test]
    fn test_start_run_resets_state() {
        let mut engine = SimulationEngine::new(quiet_config(5)).unwrap();
        let first_run = engine.run_id();
        engine.buy(Some("Terraform Inc"), BuyQuantity::Shares(2)).unwrap();
        engine.advance_tick().unwrap();

        engine.start_run(quiet_config(6)).unwrap();
        assert_ne!(engine.run_id(), first_run);
        assert_eq!(engine.clock_state().tick_index, 0);
        assert_eq!(engine.portfolio().shares("Terraform Inc"), 0);
        assert!(engine.market_log().is_empty());
    }
}
