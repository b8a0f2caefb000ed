//--------------------------------------------------------------------------------------------------
// BINARY OVERVIEW
//--------------------------------------------------------------------------------------------------
// A line-protocol driver for `OrderBook`. Reads one command per line from a file (or stdin) and
// emits one JSON object per line for every trade event and query result produced. This binary is
// peripheral scaffolding, not part of the matching core itself — the core exposes only the
// `OrderBook` API; this is one possible embedder of it.
//
// Commands (whitespace separated, case-insensitive verb):
//   SUBMIT_LIMIT  <id> <BID|ASK> <price> <shares>
//   SUBMIT_MARKET <BID|ASK> <shares>
//   SUBMIT_STOP   <id> <BID|ASK> <stop_price> <shares>
//   CANCEL        <id>
//   AMEND         <id> <new_shares> <new_price>
//   BEST_BID
//   BEST_ASK
//   DEPTH         <BID|ASK> <price>
//--------------------------------------------------------------------------------------------------

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use clap::Parser;
use serde::Serialize;
use serde_json;
use tracing::{error, info, warn};
use clob_engine::{OrderBook, Side};

#[derive(Parser, Debug)]
#[command(name = "clob", about = "Line-protocol driver for the in-memory order book")]
struct Args {
    /// Path to a command file. Reads from stdin when omitted.
    #[arg(long)]
    file: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "event")]
enum OutputLine<'a> {
    #[serde(rename = "trade")]
    Trade {
        maker_order_id: u64,
        taker_order_id: u64,
        price: i64,
        shares: u64,
        timestamp: u64,
    },
    #[serde(rename = "best")]
    Best { side: &'a str, price: Option<i64> },
    #[serde(rename = "depth")]
    Depth { side: &'a str, price: i64, order_count: Option<usize>, total_shares: Option<u64> },
    #[serde(rename = "ack")]
    Ack { command: &'a str },
    #[serde(rename = "error")]
    Error { command: &'a str, message: String },
}

fn parse_side(token: &str) -> Option<Side> {
    match token.to_ascii_uppercase().as_str() {
        "BID" => Some(Side::Bid),
        "ASK" => Some(Side::Ask),
        _ => None,
    }
}

fn print_line(line: &OutputLine) {
    match serde_json::to_string(line) {
        Ok(s) => println!("{s}"),
        Err(e) => error!("failed to serialize output line: {e}"),
    }
}

fn run_line(book: &mut OrderBook, line: &str) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((verb, args)) = tokens.split_first() else { return };
    let verb_upper = verb.to_ascii_uppercase();

    let result = match verb_upper.as_str() {
        "SUBMIT_LIMIT" => (|| {
            let [id, side, price, shares] = args else {
                return Err("expected: SUBMIT_LIMIT <id> <side> <price> <shares>".to_string());
            };
            let id: u64 = id.parse().map_err(|_| "invalid id".to_string())?;
            let side = parse_side(side).ok_or("invalid side")?;
            let price: i64 = price.parse().map_err(|_| "invalid price".to_string())?;
            let shares: u64 = shares.parse().map_err(|_| "invalid shares".to_string())?;
            let report = book.submit_limit(id, side, price, shares).map_err(|e| e.to_string())?;
            for trade in &report.trades {
                print_line(&OutputLine::Trade {
                    maker_order_id: trade.maker_order_id,
                    taker_order_id: trade.taker_order_id,
                    price: trade.price,
                    shares: trade.shares,
                    timestamp: trade.timestamp,
                });
            }
            Ok(())
        })(),
        "SUBMIT_MARKET" => (|| {
            let [side, shares] = args else {
                return Err("expected: SUBMIT_MARKET <side> <shares>".to_string());
            };
            let side = parse_side(side).ok_or("invalid side")?;
            let shares: u64 = shares.parse().map_err(|_| "invalid shares".to_string())?;
            let report = book.submit_market(side, shares).map_err(|e| e.to_string())?;
            for trade in &report.trades {
                print_line(&OutputLine::Trade {
                    maker_order_id: trade.maker_order_id,
                    taker_order_id: trade.taker_order_id,
                    price: trade.price,
                    shares: trade.shares,
                    timestamp: trade.timestamp,
                });
            }
            if report.remaining_shares > 0 {
                warn!(remaining = report.remaining_shares, "market order left unfilled");
            }
            Ok(())
        })(),
        "SUBMIT_STOP" => (|| {
            let [id, side, stop_price, shares] = args else {
                return Err("expected: SUBMIT_STOP <id> <side> <stop_price> <shares>".to_string());
            };
            let id: u64 = id.parse().map_err(|_| "invalid id".to_string())?;
            let side = parse_side(side).ok_or("invalid side")?;
            let stop_price: i64 = stop_price.parse().map_err(|_| "invalid stop_price".to_string())?;
            let shares: u64 = shares.parse().map_err(|_| "invalid shares".to_string())?;
            let report = book.submit_stop(id, side, stop_price, shares).map_err(|e| e.to_string())?;
            if !report.trades.is_empty() {
                info!(order_id = id, "stop order fired immediately on submit");
            }
            for trade in &report.trades {
                print_line(&OutputLine::Trade {
                    maker_order_id: trade.maker_order_id,
                    taker_order_id: trade.taker_order_id,
                    price: trade.price,
                    shares: trade.shares,
                    timestamp: trade.timestamp,
                });
            }
            Ok(())
        })(),
        "CANCEL" => (|| {
            let [id] = args else { return Err("expected: CANCEL <id>".to_string()) };
            let id: u64 = id.parse().map_err(|_| "invalid id".to_string())?;
            book.cancel(id).map_err(|e| e.to_string())
        })(),
        "AMEND" => (|| {
            let [id, new_shares, new_price] = args else {
                return Err("expected: AMEND <id> <new_shares> <new_price>".to_string());
            };
            let id: u64 = id.parse().map_err(|_| "invalid id".to_string())?;
            let new_shares: u64 = new_shares.parse().map_err(|_| "invalid new_shares".to_string())?;
            let new_price: i64 = new_price.parse().map_err(|_| "invalid new_price".to_string())?;
            let report = book.amend(id, new_shares, new_price).map_err(|e| e.to_string())?;
            for trade in &report.trades {
                print_line(&OutputLine::Trade {
                    maker_order_id: trade.maker_order_id,
                    taker_order_id: trade.taker_order_id,
                    price: trade.price,
                    shares: trade.shares,
                    timestamp: trade.timestamp,
                });
            }
            Ok(())
        })(),
        "BEST_BID" => {
            print_line(&OutputLine::Best { side: "BID", price: book.best_bid() });
            Ok(())
        }
        "BEST_ASK" => {
            print_line(&OutputLine::Best { side: "ASK", price: book.best_ask() });
            Ok(())
        }
        "DEPTH" => (|| {
            let [side, price] = args else { return Err("expected: DEPTH <side> <price>".to_string()) };
            let side_enum = parse_side(side).ok_or("invalid side")?;
            let price: i64 = price.parse().map_err(|_| "invalid price".to_string())?;
            let depth = book.depth_at(side_enum, price);
            print_line(&OutputLine::Depth {
                side,
                price,
                order_count: depth.map(|(c, _)| c),
                total_shares: depth.map(|(_, s)| s),
            });
            Ok(())
        })(),
        other => Err(format!("unknown command: {other}")),
    };

    match result {
        Ok(()) => print_line(&OutputLine::Ack { command: &verb_upper }),
        Err(message) => {
            error!(command = %verb_upper, %message, "command failed");
            print_line(&OutputLine::Error { command: &verb_upper, message });
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let reader: Box<dyn BufRead> = match &args.file {
        Some(path) => match File::open(path) {
            Ok(f) => Box::new(BufReader::new(f)),
            Err(e) => {
                error!("failed to open {path}: {e}");
                std::process::exit(1);
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut book = OrderBook::new();
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("failed to read line: {e}");
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        run_line(&mut book, trimmed);
    }
}
