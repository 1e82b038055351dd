use algo_trade_arbitrage_cross::{
    CrossExchangeDetector, DetectorConfig, ExecutionCoordinator, FeeConfig, MarketMatcher,
    MatchConfig, OrderbookCache, Orchestrator, RiskLimits, RiskManager,
};
use algo_trade_core::config::{AppConfig, ArbitrageConfig};
use algo_trade_core::config_loader::ConfigLoader;
use algo_trade_core::config_watcher::ConfigWatcher;
use algo_trade_core::traits::VenueAdapter;
use algo_trade_kalshi::executor::{KalshiExecutor, KalshiExecutorConfig};
use algo_trade_kalshi::{KalshiAdapter, KalshiClient};
use algo_trade_polymarket::adapter::PolymarketAdapter;
use algo_trade_polymarket::arbitrage::{
    LiveExecutor, LiveExecutorConfig, PaperExecutor, PaperExecutorConfig, PolymarketExecutor,
};
use algo_trade_polymarket::gamma::GammaClient;
use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Normal shutdown (ctrl-c).
const EXIT_OK: i32 = 0;
/// Config file missing or malformed.
const EXIT_CONFIG_ERROR: i32 = 1;
/// A venue adapter could not authenticate (missing/invalid API key or wallet key).
const EXIT_CREDENTIAL_ERROR: i32 = 2;
/// A venue call failed in a way that can't be retried away (e.g. initial balance sync).
const EXIT_VENUE_ERROR: i32 = 3;
/// The risk manager's kill switch tripped.
const EXIT_KILL_SWITCH: i32 = 4;

#[derive(Parser)]
#[command(name = "algo-trade")]
#[command(about = "Cross-exchange arbitrage bot for Kalshi and Polymarket", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover cross-exchange opportunities and trade them until stopped.
    Start {
        /// Config file path (merged with environment variables prefixed ARB_).
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Start { config } => run_start(&config).await,
    };

    std::process::exit(exit_code);
}

async fn run_start(config_path: &str) -> i32 {
    let config = match ConfigLoader::load() {
        Ok(c) => c,
        Err(err) => {
            error!(error = %err, config_path, "failed to load configuration");
            return EXIT_CONFIG_ERROR;
        }
    };

    let arb = config.arbitrage.clone();
    info!(simulation_mode = arb.simulation_mode, "arbitrage config loaded");

    let (watcher, config_rx) = ConfigWatcher::new(config);
    let watch_path = config_path.to_string();
    tokio::spawn(async move {
        if let Err(err) = watcher.watch(&watch_path).await {
            warn!(error = %err, "config file watcher stopped");
        }
    });

    let kalshi_adapter: Arc<dyn VenueAdapter> = match build_kalshi_adapter(&arb) {
        Ok(adapter) => Arc::new(adapter),
        Err(err) => {
            error!(error = %err, "failed to initialize Kalshi adapter");
            return EXIT_CREDENTIAL_ERROR;
        }
    };

    let polymarket_adapter: Arc<dyn VenueAdapter> = match build_polymarket_adapter(&arb).await {
        Ok(adapter) => Arc::new(adapter),
        Err(err) => {
            error!(error = %err, "failed to initialize Polymarket adapter");
            return EXIT_CREDENTIAL_ERROR;
        }
    };

    let risk_limits = RiskLimits {
        max_risk_per_trade: f64_to_decimal(arb.max_risk_per_trade),
        max_daily_loss: f64_to_decimal(arb.max_daily_loss),
        max_net_exposure: f64_to_decimal(arb.max_net_exposure),
    };

    let risk = Arc::new(RiskManager::new(
        risk_limits,
        Decimal::ZERO,
        vec![Arc::clone(&kalshi_adapter), Arc::clone(&polymarket_adapter)],
    ));

    risk.sync_balance().await;
    if let Some(reason) = risk.kill_switch_reason() {
        error!(reason, "could not establish starting bankroll on one or both venues");
        return EXIT_VENUE_ERROR;
    }

    let balance_sync_handle =
        risk.spawn_balance_sync_task(Duration::from_secs(arb.balance_sync_period_s));

    let cache = Arc::new(OrderbookCache::new(Duration::from_millis(arb.orderbook_ttl_ms)));
    let matcher = MarketMatcher::with_config(MatchConfig::default());
    let detector = CrossExchangeDetector::with_config(DetectorConfig {
        min_profit: f64_to_decimal(arb.min_profit),
        fees: FeeConfig::reference_scenario(),
    });

    let coordinator = Arc::new(ExecutionCoordinator::new(
        Arc::clone(&kalshi_adapter),
        Arc::clone(&polymarket_adapter),
        Arc::clone(&cache),
        Arc::clone(&risk),
        arb.clone(),
    ));

    let orchestrator = Arc::new(Orchestrator::new(
        kalshi_adapter,
        polymarket_adapter,
        matcher,
        detector,
        cache,
        coordinator,
        arb,
    ));

    info!("arbitrage orchestrator starting");
    let exit_code = drive_orchestrator(orchestrator, risk.clone(), config_rx).await;

    balance_sync_handle.abort();
    exit_code
}

/// Starts the orchestrator's push subscriptions and drives its event loop until ctrl-c
/// or the risk manager's kill switch fires. `config_rx`'s `arbitrage.tick_interval_ms`
/// only sets the initial venue-poll cadence passed to [`Orchestrator::start`] — once
/// subscriptions are running there is no per-tick clock left to hot-reload, since the
/// whole point of the push model is that nothing re-polls on a fixed interval. The risk
/// limits baked into `risk` were fixed at startup and never hot-swapped either way.
async fn drive_orchestrator(
    orchestrator: Arc<Orchestrator>,
    risk: Arc<RiskManager>,
    config_rx: tokio::sync::watch::Receiver<AppConfig>,
) -> i32 {
    let poll_interval = Duration::from_millis(config_rx.borrow().arbitrage.tick_interval_ms);
    if let Err(err) = orchestrator.start(poll_interval).await {
        error!(error = %err, "failed to start orchestrator subscriptions");
        return EXIT_VENUE_ERROR;
    }

    let ctrlc_orchestrator = Arc::clone(&orchestrator);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            ctrlc_orchestrator.shutdown();
        }
    });

    let kill_switch_risk = Arc::clone(&risk);
    let kill_switch_orchestrator = Arc::clone(&orchestrator);
    tokio::spawn(async move {
        loop {
            if kill_switch_risk.is_kill_switched() {
                kill_switch_orchestrator.shutdown();
                return;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    });

    if let Err(err) = orchestrator.run().await {
        warn!(error = %err, "orchestrator event loop exited with error");
    }

    if risk.is_kill_switched() {
        let reason = risk.kill_switch_reason().unwrap_or_default();
        error!(reason, "kill switch fired, shutting down");
        EXIT_KILL_SWITCH
    } else {
        EXIT_OK
    }
}

fn build_kalshi_adapter(arb: &ArbitrageConfig) -> anyhow::Result<KalshiAdapter> {
    let executor_config = if arb.simulation_mode {
        KalshiExecutorConfig::demo()
    } else {
        KalshiExecutorConfig::default()
    };

    let client = KalshiClient::new(executor_config.client_config.clone())
        .context("Kalshi client authentication failed")?;
    let executor =
        KalshiExecutor::new(executor_config).context("Kalshi executor initialization failed")?;

    Ok(KalshiAdapter::new(client, executor))
}

async fn build_polymarket_adapter(arb: &ArbitrageConfig) -> anyhow::Result<PolymarketAdapter> {
    let gamma = GammaClient::new();

    let executor: Arc<dyn PolymarketExecutor> = if arb.simulation_mode {
        Arc::new(PaperExecutor::new(PaperExecutorConfig::default()))
    } else {
        let live = LiveExecutor::new(LiveExecutorConfig::default())
            .await
            .context("Polymarket wallet/CLOB authentication failed")?;
        Arc::new(live)
    };

    Ok(PolymarketAdapter::new(gamma, executor))
}

fn f64_to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}
