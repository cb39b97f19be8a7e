use std::time::Duration;

use clap::{Parser, Subcommand};
use iptd_core::{DiffError, diff, parse, to_json_pretty};
use similar::{ChangeTag, TextDiff};

mod dump;
mod metrics;
mod server;

#[derive(Parser)]
#[command(name = "iptdelta")]
#[command(version, about = "iptables counter snapshots and deltas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current ruleset snapshot as JSON
    Show {
        /// Single-line output instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Sample the ruleset in a loop and print counter deltas
    Watch {
        /// Seconds between samples
        #[arg(long, default_value = "5")]
        interval: u64,
        /// Print a text diff of the raw dump output instead of deltas
        #[arg(long)]
        raw: bool,
    },
    /// Serve snapshots and diffs over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen_addr: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show { compact } => {
            tokio::runtime::Runtime::new()?.block_on(async { show(compact).await })?;
        }
        Commands::Watch { interval, raw } => {
            tokio::runtime::Runtime::new()?.block_on(async {
                if raw {
                    watch_raw(interval).await
                } else {
                    watch_counters(interval).await
                }
            })?;
        }
        Commands::Serve { listen_addr } => {
            tokio::runtime::Runtime::new()?.block_on(async { server::serve(&listen_addr).await })?;
        }
    }

    Ok(())
}

async fn show(compact: bool) -> anyhow::Result<()> {
    let text = dump::collect().await?;
    let snapshot = parse(&text)?;

    if compact {
        let body = iptd_core::to_json(&snapshot)?;
        println!("{}", String::from_utf8(body)?);
    } else {
        println!("{}", to_json_pretty(&snapshot)?);
    }

    Ok(())
}

/// Sample on an interval and print the JSON delta whenever counters moved.
async fn watch_counters(interval: u64) -> anyhow::Result<()> {
    let text = dump::collect().await?;
    let mut last = parse(&text)?;
    tracing::info!(interval, "watching iptables counters");

    loop {
        tokio::time::sleep(Duration::from_secs(interval)).await;

        let text = dump::collect().await?;
        let current = parse(&text)?;

        match diff(&last, &current) {
            Ok(delta) if delta.tables.is_empty() => {
                tracing::debug!("no counter movement");
            }
            Ok(delta) => println!("{}", to_json_pretty(&delta)?),
            Err(err @ DiffError::CounterRegression { .. }) => {
                // Firewall reloaded between samples; start over from the
                // fresh capture rather than reporting bogus deltas.
                tracing::warn!("{err}; rebasing on the fresh sample");
            }
        }

        last = current;
    }
}

/// Sample on an interval and print a line diff of the raw dump output.
async fn watch_raw(interval: u64) -> anyhow::Result<()> {
    let mut last = dump::collect().await?;
    tracing::info!(interval, "watching raw iptables-save output");

    loop {
        tokio::time::sleep(Duration::from_secs(interval)).await;

        let text = dump::collect().await?;
        if text != last {
            print!("{}", render_text_diff(&last, &text));
        }

        last = text;
    }
}

fn render_text_diff(older: &str, newer: &str) -> String {
    let diff = TextDiff::from_lines(older, newer);
    let mut output = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => continue,
        };
        output.push(sign);
        output.push_str(change.value());
    }

    output
}
