//! Interactive paper-trading loop over stdin.
//!
//! Commands: `buy <product> <qty>`, `sell <product> <qty>`, `next`,
//! `reset [seed]`, `status`, `history`, `help`, `quit`. A product is named by
//! its 1-based index or by its name (case-insensitive, spaces allowed).

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use snackmarket_core::{Action, Outcome, Product, SessionState};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Trade(Action),
    Next,
    Reset(Option<u64>),
    Status,
    History,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  buy <product> <qty>    buy at today's close
  sell <product> <qty>   sell at today's close
  next                   advance to the next day
  reset [seed]           regenerate prices and start over
  status                 show prices, holdings and cash
  history                show executed orders
  help                   show this message
  quit                   leave the game";

/// Parse one input line against the session's catalog.
pub fn parse_command(line: &str, products: &[Product]) -> Result<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((verb, args)) = tokens.split_first() else {
        bail!("empty command; type 'help'");
    };

    match verb.to_ascii_lowercase().as_str() {
        "buy" | "b" => {
            let (product, qty) = parse_order(args, products)?;
            Ok(Command::Trade(Action::Buy { product, qty }))
        }
        "sell" | "s" => {
            let (product, qty) = parse_order(args, products)?;
            Ok(Command::Trade(Action::Sell { product, qty }))
        }
        "next" | "n" => Ok(Command::Next),
        "reset" => match args {
            [] => Ok(Command::Reset(None)),
            [seed] => Ok(Command::Reset(Some(
                seed.parse().with_context(|| format!("invalid seed '{seed}'"))?,
            ))),
            _ => bail!("usage: reset [seed]"),
        },
        "status" | "st" => Ok(Command::Status),
        "history" | "h" => Ok(Command::History),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => bail!("unknown command '{other}'; type 'help'"),
    }
}

fn parse_order(args: &[&str], products: &[Product]) -> Result<(String, u32)> {
    let Some((qty, name)) = args.split_last().filter(|(_, name)| !name.is_empty()) else {
        bail!("usage: buy|sell <product> <qty>");
    };
    let qty: u32 = qty.parse().with_context(|| format!("invalid quantity '{qty}'"))?;
    Ok((resolve_product(&name.join(" "), products)?, qty))
}

/// Resolve a 1-based index or a case-insensitive name to a catalog name.
pub fn resolve_product(token: &str, products: &[Product]) -> Result<String> {
    if let Ok(index) = token.parse::<usize>() {
        return match index.checked_sub(1).and_then(|i| products.get(i)) {
            Some(p) => Ok(p.name.clone()),
            None => bail!("no product #{index} (1..={})", products.len()),
        };
    }
    products
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(token))
        .map(|p| p.name.clone())
        .with_context(|| format!("unknown product '{token}'"))
}

/// Drive a session from `input` until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(session: &mut SessionState, input: R, out: &mut W) -> Result<()> {
    let table = session.table();
    writeln!(out, "SnackMarket: {} days, seed {}. Type 'help'.", table.days(), table.seed())?;
    print_status(session, out)?;

    for line in input.lines() {
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line, session.simulator().products()) {
            Ok(c) => c,
            Err(e) => {
                writeln!(out, "error: {e:#}")?;
                continue;
            }
        };

        let action = match command {
            Command::Quit => break,
            Command::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            Command::Status => {
                print_status(session, out)?;
                continue;
            }
            Command::History => {
                print_history(session, out)?;
                continue;
            }
            Command::Trade(action) => action,
            Command::Next => Action::AdvanceDay,
            Command::Reset(seed) => Action::Reset { seed },
        };

        match session.apply(action) {
            Ok(Outcome::Filled(t)) => writeln!(
                out,
                "{} {} x{} @ {:.0} = {:.0}; cash {:.0}",
                t.side,
                t.product,
                t.qty,
                t.price,
                t.amount,
                session.cash()
            )?,
            Ok(Outcome::Advanced { .. }) => print_status(session, out)?,
            Ok(Outcome::Finished) => {
                writeln!(out, "Market closed. Final value: {:.0}", session.total_value())?;
                writeln!(out, "Type 'reset' to play again or 'quit'.")?;
            }
            Ok(Outcome::Reset { seed }) => {
                writeln!(out, "New market, seed {seed}.")?;
                print_status(session, out)?;
            }
            Err(e) => writeln!(out, "error: {e}")?,
        }
    }
    Ok(())
}

fn print_status<W: Write>(session: &SessionState, out: &mut W) -> Result<()> {
    let view = session.view();
    writeln!(out)?;
    writeln!(out, "Day {}/{}: {}", view.day, view.days, view.event.title)?;
    if !view.event.description.is_empty() {
        writeln!(out, "  {}", view.event.description)?;
    }
    writeln!(out, "{:>3} {:<18} {:>10} {:>8} {:>12}", "#", "Product", "Price", "Held", "Value")?;
    for (i, q) in view.quotes.iter().enumerate() {
        writeln!(
            out,
            "{:>3} {:<18} {:>10.0} {:>8} {:>12.0}",
            i + 1,
            q.product,
            q.price,
            q.holding,
            q.market_value
        )?;
    }
    writeln!(
        out,
        "Cash {:.0} | Holdings {:.0} | Total {:.0}",
        view.cash, view.portfolio_value, view.total_value
    )?;
    Ok(())
}

fn print_history<W: Write>(session: &SessionState, out: &mut W) -> Result<()> {
    if session.history().is_empty() {
        writeln!(out, "No orders yet.")?;
        return Ok(());
    }
    for t in session.history() {
        writeln!(
            out,
            "day {:>2}  {:<4} {:<18} x{:<5} @ {:>8.0} = {:>10.0}",
            t.day, t.side, t.product, t.qty, t.price, t.amount
        )?;
    }
    Ok(())
}
