use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use role_lottery::adapters::console::Console;
use role_lottery::adapters::{AuditLog, InMemoryEventBus, InMemoryWorkspaces, ReactionBoard, StaticDirectory};
use role_lottery::application::{CoordinatorPorts, SessionCoordinator};
use role_lottery::config::{AppConfig, LoggingConfig};
use role_lottery::domain::catalog::RoleCatalog;
use role_lottery::domain::foundation::ChannelId;
use role_lottery::domain::lottery::events::EVENT_TYPES;
use role_lottery::ports::{EventSubscriber, TokioClock};

/// Text channel the console issues every command in.
const CONSOLE_CHANNEL: u64 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = config.validate() {
        eprintln!("error: invalid configuration: {err}");
        return ExitCode::FAILURE;
    }
    init_tracing(&config.logging);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "console stopped");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays the console's own output.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.use_json() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

async fn run(config: AppConfig) -> std::io::Result<()> {
    let bus = Arc::new(InMemoryEventBus::new());
    bus.subscribe_all(&EVENT_TYPES, Arc::new(AuditLog));

    let (feed, notices) = mpsc::unbounded_channel();
    let board = Arc::new(ReactionBoard::new().with_feed(feed));
    let directory = Arc::new(StaticDirectory::new());
    let workspaces = Arc::new(InMemoryWorkspaces::new());

    let coordinator = SessionCoordinator::new(
        config.lottery.settings(),
        Arc::new(RoleCatalog::standard().clone()),
        config.assignment.build_strategy(),
        CoordinatorPorts {
            presentation: board.clone(),
            workspaces: workspaces.clone(),
            publisher: bus,
            clock: Arc::new(TokioClock),
        },
    );
    tracing::info!(
        strategy = coordinator.strategy_name(),
        input_timeout_secs = config.lottery.input_timeout_secs,
        "role lottery console ready"
    );

    let console = Console::new(
        coordinator,
        directory,
        board,
        workspaces,
        ChannelId::new(CONSOLE_CHANNEL),
    );
    console.run(BufReader::new(tokio::io::stdin()), notices).await
}
