use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rxlab::{
    config::{load_config, LabConfig},
    screens::{
        task_runner::parse_numbers, EventBus, StateHolder, StreamDemos, StreamKind, TaskRunner,
    },
    subscribe::Subscriber,
    Scope,
};

#[derive(Parser)]
#[command(name = "rxlab")]
#[command(version)]
#[command(about = "Runs the reactive demo screens from the command line")]
struct Cli {
    /// TOML file overriding the default timings
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Long-running operations with a busy indicator
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Collects one of the demo streams
    Streams {
        #[arg(value_enum)]
        kind: StreamArg,
    },
    /// Drives the counter and prints every value it publishes
    Counter {
        /// Amount added once before anything else
        #[arg(long, allow_hyphen_values = true)]
        add: Option<i64>,
        /// Seconds to keep auto-increment running
        #[arg(long, value_name = "N", default_value_t = 0)]
        auto_secs: u64,
    },
    /// Emits events and shows what a late subscriber receives
    Events {
        /// Number of manual events to emit
        #[arg(long, value_name = "N", default_value_t = 0)]
        manual: u32,
        /// Seconds to keep auto-generation running
        #[arg(long, value_name = "N", default_value_t = 0)]
        auto_secs: u64,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Waits, then reports how long the operation took
    Delay {
        /// Duration in milliseconds (uses the configured value if omitted)
        #[arg(long)]
        ms: Option<u64>,
    },
    /// Adds up whitespace-separated integers on a background task
    Sum {
        #[arg(value_name = "TEXT", num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StreamArg {
    Numbers,
    Transformed,
    Errors,
}

impl From<StreamArg> for StreamKind {
    fn from(arg: StreamArg) -> Self {
        match arg {
            StreamArg::Numbers => StreamKind::Numbers,
            StreamArg::Transformed => StreamKind::Transformed,
            StreamArg::Errors => StreamKind::Errors,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Tasks { command } => run_tasks(&config, command).await,
        Commands::Streams { kind } => run_streams(&config, kind.into()).await,
        Commands::Counter { add, auto_secs } => run_counter(&config, add, auto_secs).await,
        Commands::Events { manual, auto_secs } => run_events(&config, manual, auto_secs).await,
    }
}

async fn run_tasks(config: &LabConfig, command: TaskCommands) -> Result<()> {
    let runner = TaskRunner::new(Scope::new(), config.task_runner.clone());

    match command {
        TaskCommands::Delay { ms } => {
            let duration = ms.map_or(config.task_runner.operation(), Duration::from_millis);
            runner.run_delayed_message(duration);
        }
        TaskCommands::Sum { text } => {
            let text = text.join(" ");
            // The screen only shows a generic message; surface the cause here.
            if let Err(e) = parse_numbers(&text) {
                eprintln!("warning: {}", e);
            }
            runner.run_sum(&text);
        }
    }

    println!("Running...");
    runner.wait().await;

    let state = runner.state();
    let Some(result) = state.result else {
        bail!("operation ended without a result");
    };
    println!("{}", result);
    Ok(())
}

async fn run_streams(config: &LabConfig, kind: StreamKind) -> Result<()> {
    let demos = StreamDemos::new(Scope::new(), config.streams.clone());
    println!("Collecting {} stream...", kind);

    demos.run(kind);
    demos.wait().await;

    for entry in demos.log() {
        println!("{}", entry);
    }
    if !demos.is_completed() {
        bail!("{} stream did not complete", kind);
    }
    Ok(())
}

async fn run_counter(config: &LabConfig, add: Option<i64>, auto_secs: u64) -> Result<()> {
    let holder = StateHolder::new(Scope::new(), config.state_holder.clone());
    holder.subscribe(Subscriber::on_next(|v: i64| println!("counter = {}", v)));

    if let Some(amount) = add {
        holder.add(amount);
    }
    if auto_secs > 0 {
        holder.toggle_auto_increment();
        tokio::time::sleep(Duration::from_secs(auto_secs)).await;
        holder.toggle_auto_increment();
    }

    println!("Final value: {}", holder.value());
    holder.dispose();
    Ok(())
}

async fn run_events(config: &LabConfig, manual: u32, auto_secs: u64) -> Result<()> {
    let bus = EventBus::new(Scope::new(), config.event_bus.clone())?;

    for _ in 0..manual {
        println!("{}", bus.emit_manual());
    }
    if auto_secs > 0 {
        bus.start_auto_generation();
        tokio::time::sleep(Duration::from_secs(auto_secs)).await;
        bus.stop_auto_generation();
    }

    println!("Late subscriber receives:");
    bus.subscribe(Subscriber::on_next(|event: String| println!("  {}", event)));

    let log = bus.log();
    println!("Event log ({} total):", log.total());
    for event in log.newest_first() {
        println!("  {}", event);
    }

    bus.dispose();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands_with_global_config() {
        let cli = Cli::try_parse_from(["rxlab", "events", "--manual", "5", "--config", "lab.toml"])
            .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("lab.toml")));
        assert!(matches!(
            cli.command,
            Commands::Events {
                manual: 5,
                auto_secs: 0
            }
        ));
    }

    #[test]
    fn sum_accepts_negative_numbers() {
        let cli = Cli::try_parse_from(["rxlab", "tasks", "sum", "-4", "10"]).unwrap();

        let Commands::Tasks {
            command: TaskCommands::Sum { text },
        } = cli.command
        else {
            panic!("expected tasks sum");
        };
        assert_eq!(text, vec!["-4", "10"]);
    }

    #[test]
    fn rejects_unknown_stream() {
        assert!(Cli::try_parse_from(["rxlab", "streams", "bogus"]).is_err());
    }
}
