use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use gitevent_core::GitReader;
use gitevent_dbus::{SignalEmitter, SignalListener, ZbusTransport};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use commands::{CommandError, EventArgs, EventName};
use display::ConsoleSink;

#[derive(Parser)]
#[command(name = "gitevent")]
#[command(version, about = "Sends artifact events from git hooks", long_about = None)]
struct Cli {
    /// The type of event to send
    #[arg(short, long, value_enum)]
    event: Option<EventName>,

    /// The repository folder
    #[arg(short, long)]
    repository_folder: Option<PathBuf>,

    /// The tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Print the event instead of emitting it on the bus
    #[arg(long)]
    dry_run: bool,

    /// Print events received from the bus until interrupted
    #[arg(long, conflicts_with_all = ["event", "dry_run"])]
    listen: bool,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.listen {
        return listen().await;
    }

    let args = EventArgs {
        repository_folder: cli.repository_folder,
        tag: cli.tag,
    };
    let reader = GitReader::new();

    let outcome = if cli.dry_run {
        commands::dispatch(cli.event, &args, &reader, &ConsoleSink::new()).await
    } else {
        let emitter = SignalEmitter::new(ZbusTransport::new());
        commands::dispatch(cli.event, &args, &reader, &emitter).await
    };

    if let Err(e) = outcome {
        report(&e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn report(error: &CommandError) {
    match error {
        CommandError::Usage(message) => println!("{}", message),
        CommandError::Collaborator(e) => {
            error!("{}", e);
            eprintln!("{} {}", "error:".red().bold(), e);
        }
    }
}

async fn listen() -> Result<()> {
    let listener = SignalListener::new(ZbusTransport::new());
    let shutdown = CancellationToken::new();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    println!("{}", "Listening for gitevent signals...".bold().cyan());
    for route in listener.signal_receivers().routes() {
        println!("   {} {}", "•".dimmed(), route.interface);
    }
    println!();
    println!("{}", "Press Ctrl+C to stop".dimmed());
    println!();

    let received = listener
        .listen(Arc::new(ConsoleSink::new()), shutdown)
        .await?;
    println!("{} {}", "Events received:".bold(), received.to_string().yellow());

    Ok(())
}
