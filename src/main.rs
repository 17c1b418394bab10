//! rollcall - posts a weekly sign-up thread to a Slack channel.
//!
//! Usage:
//!   rollcall          Run the weekly scheduled loop
//!   rollcall --now    Post one cycle immediately and exit

use clap::Parser;
use rollcall::{Config, Dispatcher, Plan, RunMode, SlackClient, SystemClock};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE: &str = "rollcall.log";

/// rollcall - weekly sign-up sheet automation
#[derive(Parser)]
#[command(name = "rollcall")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Post the message set immediately instead of waiting for the schedule
    #[arg(long)]
    now: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Log to both console and file.
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE);
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let plan = if cli.now && !config.plan_path.exists() {
        info!(
            "No plan file at {}; using the built-in test plan",
            config.plan_path.display()
        );
        Plan::builtin_test()
    } else {
        Plan::load(&config.plan_path)?
    };

    let mode = if cli.now {
        info!("Running in immediate mode - messages will be sent now");
        RunMode::Immediate
    } else {
        info!(
            "Running in scheduled mode - posting every {} to {}",
            plan.schedule, config.channel
        );
        RunMode::Scheduled
    };

    let client = SlackClient::new(config.token)?;
    let dispatcher = Dispatcher::new(
        client,
        SystemClock,
        config.channel,
        plan.schedule,
        plan.messages,
    );

    dispatcher.run(mode).await;

    Ok(())
}
