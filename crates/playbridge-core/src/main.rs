use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use playbridge_core::{Bridge, BridgeConfig, InMemoryBus, MessageBus, NatsBus};
use playbridge_scenario::{ScenarioStore, ScenarioSync, ScriptChangeEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playbridge=info,playbridge_core=info,playbridge_scenario=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Command::new("playbridge")
        .version(playbridge_core::VERSION)
        .about("Bridge between the video player and the UI scenario scripts")
        .subcommand_required(true)
        .subcommand(
            Command::new("run")
                .about("Run both dispatch loops until Ctrl-C")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("broker-url")
                        .long("broker-url")
                        .help("Broker URL (overrides config)"),
                )
                .arg(
                    Arg::new("scenario")
                        .long("scenario")
                        .value_parser(value_parser!(PathBuf))
                        .help("Scenario document path (overrides config)"),
                )
                .arg(
                    Arg::new("in-memory")
                        .long("in-memory")
                        .action(ArgAction::SetTrue)
                        .help("Use a process-local bus instead of connecting to a broker"),
                ),
        )
        .subcommand(
            Command::new("apply")
                .about("Apply one script change to a scenario file and exit")
                .arg(
                    Arg::new("scenario")
                        .long("scenario")
                        .default_value("scenarios.yaml")
                        .value_parser(value_parser!(PathBuf))
                        .help("Scenario document path"),
                )
                .arg(
                    Arg::new("change")
                        .long("change")
                        .required(true)
                        .help("Script change as JSON, e.g. '{\"script_id\":\"intro\"}'"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Load a scenario file and report its scripts")
                .arg(
                    Arg::new("scenario")
                        .long("scenario")
                        .default_value("scenarios.yaml")
                        .value_parser(value_parser!(PathBuf))
                        .help("Scenario document path"),
                ),
        );

    let matches = cli.get_matches();

    match matches.subcommand() {
        Some(("run", args)) => run(args).await,
        Some(("apply", args)) => apply(args).await,
        Some(("check", args)) => check(args).await,
        _ => Ok(()),
    }
}

async fn run(args: &ArgMatches) -> anyhow::Result<()> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => BridgeConfig::from_toml_file(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(url) = args.get_one::<String>("broker-url") {
        config = config.with_broker_url(url.clone());
    }
    if let Some(path) = args.get_one::<PathBuf>("scenario") {
        config = config.with_scenario_path(path.clone());
    }

    let nats = if args.get_flag("in-memory") {
        None
    } else {
        Some(NatsBus::connect(&config.broker_url).await?)
    };
    let bus: Arc<dyn MessageBus> = match &nats {
        Some(nats) => Arc::new(nats.clone()),
        None => {
            tracing::warn!("Using in-memory bus; no external messages will arrive");
            Arc::new(InMemoryBus::new())
        }
    };

    let handle = Bridge::start(&config, bus).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    tracing::info!("Shutdown requested");

    let stats = handle.shutdown().await;
    if let Some(nats) = &nats {
        if let Err(e) = nats.flush().await {
            tracing::warn!("Failed to flush pending publishes: {e}");
        }
    }
    println!(
        "playback: {} received, {} published | script changes: {} received, {} published",
        stats.playback.received,
        stats.playback.published,
        stats.script_changes.received,
        stats.script_changes.published,
    );
    Ok(())
}

async fn apply(args: &ArgMatches) -> anyhow::Result<()> {
    let path = args
        .get_one::<PathBuf>("scenario")
        .context("missing --scenario")?;
    let raw = args
        .get_one::<String>("change")
        .context("missing --change")?;

    let change: ScriptChangeEvent =
        serde_json::from_str(raw).context("--change is not a valid script change")?;

    let report = ScenarioSync::new(ScenarioStore::new(path)).apply(&change).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn check(args: &ArgMatches) -> anyhow::Result<()> {
    let path = args
        .get_one::<PathBuf>("scenario")
        .context("missing --scenario")?;

    let document = ScenarioStore::new(path).load().await?;

    println!("Scenario: {}", path.display());
    println!("  Scripts: {}", document.len());
    for script in &document.scripts {
        println!("    - {} ({} fields)", script.script_id, script.fields.len());
    }
    let duplicates = document.duplicate_ids();
    if duplicates.is_empty() {
        println!("  Duplicate ids: none");
    } else {
        println!("  Duplicate ids: {}", duplicates.join(", "));
    }
    Ok(())
}
