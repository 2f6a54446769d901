// Real-time play: ticks on a timer, trade commands from stdin
use market_sim::{Config, MarketError, MarketResult, SimulationEngine, SimulationEvent};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{error::TryRecvError, Receiver};
use tracing::{info, warn};

const HELP: &str = "\
Commands:
  select <name | #>   choose a security
  buy <n | max>       buy shares of the selection
  sell <n | all>      sell shares of the selection
  quotes              show prices
  portfolio           show cash and holdings
  news                show the news feed
  quit                leave the game";

/// Parsed stdin command
#[derive(Debug, PartialEq)]
enum Command {
    Select(String),
    Buy(String),
    Sell(String),
    Quotes,
    Portfolio,
    News,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "select" | "s" => Some(Command::Select(rest.to_string())),
        "buy" | "b" => Some(Command::Buy(rest.to_string())),
        "sell" => Some(Command::Sell(rest.to_string())),
        "quotes" | "q" => Some(Command::Quotes),
        "portfolio" | "p" => Some(Command::Portfolio),
        "news" | "n" => Some(Command::News),
        "help" | "h" | "?" => Some(Command::Help),
        "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Resolve a 1-based row number or a case-insensitive name
fn resolve_selection(engine: &SimulationEngine, input: &str) -> Option<String> {
    let securities = engine.securities();
    if let Ok(row) = input.parse::<usize>() {
        return securities.get(row.checked_sub(1)?).map(|s| s.id().to_string());
    }
    securities
        .iter()
        .find(|s| s.id().eq_ignore_ascii_case(input))
        .map(|s| s.id().to_string())
}

pub async fn play(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let tick_length = Duration::from_millis(config.simulation.tick_millis);
    let mut engine = SimulationEngine::new(config)?;
    let mut events = engine.subscribe();
    let mut selection: Option<String> = None;

    println!("🪐 Welcome to the Intergalactic Stock Market - Year 2100");
    println!("💵 Starting cash: ${:.2}", engine.portfolio().cash());
    println!("{}", HELP);
    print_quotes(&engine, selection.as_deref());

    let mut ticker = tokio::time::interval(tick_length);
    ticker.tick().await; // first tick completes immediately
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // Ticks and commands are handled one at a time on this task, so a trade
    // never interleaves with a price update.
    loop {
        tokio::select! {
            _ = ticker.tick(), if !engine.is_ended() => {
                let report = engine.advance_tick()?;
                if report.month_rolled {
                    println!("📅 {} begins", engine.clock().month_name());
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Some(Command::Quit) => break,
                    Some(command) => handle_command(&mut engine, &mut selection, command),
                    None if line.trim().is_empty() => {}
                    None => println!("❓ Unknown command, type 'help'"),
                }
            }
        }

        drain_events(&mut events);
    }

    match engine.final_report() {
        Some(report) => info!("🏁 Final net worth ${:.2} (P/L ${:+.2})", report.final_net_worth, report.profit_loss),
        None => info!("👋 Left with net worth ${:.2}", engine.net_worth()),
    }
    Ok(())
}

fn handle_command(engine: &mut SimulationEngine, selection: &mut Option<String>, command: Command) {
    match command {
        Command::Select(input) => match resolve_selection(engine, &input) {
            Some(id) => {
                if let Some(security) = engine.security(&id) {
                    println!("👉 {} - {}", security.id(), security.description());
                }
                *selection = Some(id);
            }
            None => println!("❓ No security matches '{}'", input),
        },
        Command::Buy(amount) => report_trade(engine.buy_from_input(selection.as_deref(), &amount)),
        Command::Sell(amount) => report_trade(engine.sell_from_input(selection.as_deref(), &amount)),
        Command::Quotes => print_quotes(engine, selection.as_deref()),
        Command::Portfolio => print_portfolio(engine),
        Command::News => {
            for event in engine.news_feed() {
                println!("{}", event);
            }
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

fn report_trade<T>(result: MarketResult<T>) {
    if let Err(e) = result {
        match e {
            MarketError::RunEnded => println!("🏁 The year is over, trading is closed"),
            rejected if rejected.is_trade_rejection() => println!("❌ {}", rejected),
            other => warn!("⚠️  Unexpected {} error: {}", other.category(), other),
        }
    }
}

fn drain_events(events: &mut Receiver<SimulationEvent>) {
    loop {
        match events.try_recv() {
            Ok(SimulationEvent::News(event)) => println!("📰 {}", event),
            Ok(SimulationEvent::Trade(trade)) => {
                println!("✅ {} {} shares of {} @ ${:.2}", trade.side, trade.shares, trade.security_id, trade.price)
            }
            Ok(SimulationEvent::RunEnded(report)) => {
                println!("🏁 All months have passed!");
                println!("💼 Final Net Worth: ${:.2} (P/L: ${:+.2})", report.final_net_worth, report.profit_loss);
            }
            Ok(_) => {}
            Err(TryRecvError::Lagged(skipped)) => {
                warn!("⚠️  Display lagged, skipped {} events", skipped);
            }
            Err(_) => break,
        }
    }
}

fn print_quotes(engine: &SimulationEngine, selection: Option<&str>) {
    let (minutes, seconds) = engine.clock().time_left();
    println!(
        "📅 {} | ⏱  {:02}:{:02} left | 💼 ${:.2}",
        engine.clock().month_name(),
        minutes,
        seconds,
        engine.net_worth()
    );
    for (row, quote) in engine.quotes().iter().enumerate() {
        let marker = if Some(quote.id.as_str()) == selection { ">" } else { " " };
        println!(
            "{} {:>2}. {:<24} ${:>9.2} {:>+8.2} {:>+8.2}%  held {}",
            marker,
            row + 1,
            quote.id,
            quote.price,
            quote.last_delta,
            quote.percent_change,
            quote.shares_held
        );
    }
}

fn print_portfolio(engine: &SimulationEngine) {
    let portfolio = engine.portfolio();
    println!("💵 Cash:      ${:.2}", portfolio.cash());
    println!("📦 Invested:  ${:.2}", engine.invested_value());
    println!("💼 Net worth: ${:.2}", engine.net_worth());
    for (id, shares) in portfolio.holdings() {
        println!("   {:<24} {:>6} shares", id, shares);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("buy 10"), Some(Command::Buy("10".to_string())));
        assert_eq!(parse_command("SELL all"), Some(Command::Sell("all".to_string())));
        assert_eq!(parse_command("select Terraform Inc"), Some(Command::Select("Terraform Inc".to_string())));
        assert_eq!(parse_command("q"), Some(Command::Quotes));
        assert_eq!(parse_command("dance"), None);
    }

    #[test]
    fn test_bad_amount_goes_through_engine() {
        let mut engine = SimulationEngine::with_default_config().unwrap();
        let mut selection = None;

        handle_command(&mut engine, &mut selection, Command::Buy("1.5".to_string()));
        handle_command(&mut engine, &mut selection, Command::Select("1".to_string()));
        handle_command(&mut engine, &mut selection, Command::Sell("abc".to_string()));

        let log: Vec<&str> = engine.market_log().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], MarketError::NoSelection.to_string());
        assert!(log[1].starts_with("Invalid share amount"));
    }

    #[test]
    fn test_resolve_selection_by_row_and_name() {
        let engine = SimulationEngine::with_default_config().unwrap();
        assert_eq!(resolve_selection(&engine, "1").as_deref(), Some("Asteroid Mining Co"));
        assert_eq!(resolve_selection(&engine, "space tourism").as_deref(), Some("Space Tourism"));
        assert_eq!(resolve_selection(&engine, "0"), None);
        assert_eq!(resolve_selection(&engine, "99"), None);
    }
}
