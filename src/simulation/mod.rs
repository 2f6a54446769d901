// Simulation Engine Module
// Tick orchestration, news generation and delayed price impacts

pub mod impact_scheduler;
pub mod news;
pub mod simulation_engine;

pub use impact_scheduler::{ImpactScheduler, PendingImpact, AppliedImpact};
pub use news::{NewsGenerator, NewsEvent, NewsSource, Sentiment};
pub use simulation_engine::{
    SimulationEngine, SimulationEvent, RunPhase, TickReport, FinalReport, Quote,
    NetWorthSample, MarketLogEntry,
};
