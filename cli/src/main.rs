use anyhow::{bail, Context, Result};
use clap::Parser;
use lisbeth_core::{
    AppEvent, Author, BackendFactory, Config, DisabledNavigator, Dispatcher, EntryId, EventBus,
    FileStore, Navigator, SubmitOutcome, SystemNavigator,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Terminal client for the Lisbeth security assistant
#[derive(Debug, Parser)]
#[command(name = "lisbeth", version, about)]
struct Args {
    /// Backend base URL (overrides LISBETH_BASE_URL)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Never open links in the system browser
    #[arg(long)]
    no_open: bool,

    /// Use the built-in offline backend instead of HTTP
    #[arg(long)]
    offline: bool,

    /// Log at debug level on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Run a single command, print the transcript and exit
    #[arg(long, value_name = "LINE")]
    once: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Only log to stderr so the TUI and --once output stay clean
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();
    info!("Starting Lisbeth");

    let config = load_config(&args)?;

    let backend = if args.offline {
        BackendFactory::create_mock()
    } else {
        BackendFactory::create_http(&config).context("Failed to create HTTP backend")?
    };
    let navigator: Arc<dyn Navigator> = if config.open_links {
        Arc::new(SystemNavigator)
    } else {
        Arc::new(DisabledNavigator)
    };
    let store = FileStore::new(config.storage_path());

    // Create event bus for communication
    let event_bus = EventBus::new();
    let dispatcher = Dispatcher::new(backend, Box::new(store), navigator, event_bus.sender(), &config);
    let receiver = event_bus.into_receiver();

    if let Some(line) = args.once.as_deref() {
        return run_once(dispatcher, receiver, line, &config).await;
    }

    let mut app = lisbeth_tui::App::new(dispatcher, receiver);
    app.run().await?;

    info!("Lisbeth shutting down");
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::from_env().context("Invalid environment configuration")?;
    if let Some(base_url) = args.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    if let Some(secs) = args.timeout {
        config.request_timeout = Duration::from_secs(secs.max(1));
    }
    if args.no_open {
        config.open_links = false;
    }
    Ok(config)
}

/// Submit one line, wait for it to settle and print the transcript
async fn run_once(
    mut dispatcher: Dispatcher,
    mut receiver: mpsc::UnboundedReceiver<AppEvent>,
    line: &str,
    config: &Config,
) -> Result<()> {
    let entry = match dispatcher.submit(line) {
        SubmitOutcome::Ignored => bail!("Nothing to send"),
        SubmitOutcome::UsageError(_) | SubmitOutcome::Rejected(_) => {
            println!("{}", dispatcher.transcript().to_plain_text());
            std::process::exit(2);
        }
        SubmitOutcome::Dispatched(entry) => entry,
    };

    wait_for_settle(&mut dispatcher, &mut receiver, entry).await?;

    // A rendered link is opened after the navigation delay
    if dispatcher.transcript().last_link().is_some() {
        let grace = config.navigation_delay + Duration::from_millis(500);
        if let Ok(Some(AppEvent::Navigate { entry, url })) =
            tokio::time::timeout(grace, receiver.recv()).await
        {
            dispatcher.navigate(entry, &url);
        }
    }

    println!("{}", dispatcher.transcript().to_plain_text());

    let failed = dispatcher
        .transcript()
        .get(entry)
        .is_some_and(|row| row.author == Author::Error);
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn wait_for_settle(
    dispatcher: &mut Dispatcher,
    receiver: &mut mpsc::UnboundedReceiver<AppEvent>,
    target: EntryId,
) -> Result<()> {
    while let Some(event) = receiver.recv().await {
        match event {
            AppEvent::DispatchSettled { entry, outcome } => {
                let done = entry == target;
                dispatcher.settle(entry, outcome);
                if done {
                    return Ok(());
                }
            }
            AppEvent::Navigate { entry, url } => dispatcher.navigate(entry, &url),
            AppEvent::Quit => break,
        }
    }
    warn!("Event channel closed before {} settled", target);
    bail!("Request did not complete")
}
