use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub arbitrage: ArbitrageConfig,
}

/// Declarative configuration for the cross-venue arbitrage pipeline.
///
/// Mirrors the single document described for the arbitrage engine: everything a
/// deployment needs to tune without a rebuild. `max_risk_per_trade`, `max_daily_loss`,
/// `max_net_exposure`, and `kill_switch_armed` are safety-critical and are read once at
/// startup; [`crate::config_watcher::ConfigWatcher`] still broadcasts a reloaded
/// `AppConfig` on file change, but the risk manager only ever reads these fields from the
/// config snapshot it was constructed with, never from a later broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageConfig {
    pub simulation_mode: bool,
    pub max_risk_per_trade: f64,
    pub max_daily_loss: f64,
    pub max_net_exposure: f64,
    pub fee_kalshi: f64,
    pub fee_poly: f64,
    pub min_profit: f64,
    pub orderbook_ttl_ms: u64,
    pub arb_cache_ttl_ms: u64,
    pub fill_monitor_schedule_ms: Vec<u64>,
    pub trade_cooldown_s: u64,
    pub balance_sync_period_s: u64,
    pub price_band: (f64, f64),
    pub time_to_close_min_s: u64,
    /// Initial per-venue orderbook poll cadence, read once at orchestrator startup and
    /// handed to `VenueAdapter::subscribe_orderbook`. Not hot-reloadable: once subscriptions
    /// are running there is no per-tick clock left for [`crate::config_watcher::ConfigWatcher`]
    /// to affect.
    pub tick_interval_ms: u64,
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            simulation_mode: true,
            max_risk_per_trade: 0.10,
            max_daily_loss: 0.05,
            max_net_exposure: 0.30,
            fee_kalshi: 0.001,
            fee_poly: 0.01,
            min_profit: 0.005,
            orderbook_ttl_ms: 500,
            arb_cache_ttl_ms: 100,
            fill_monitor_schedule_ms: vec![100, 200, 300, 500, 1000, 1000, 2000, 2000, 3000, 3000],
            trade_cooldown_s: 60,
            balance_sync_period_s: 30,
            price_band: (0.10, 0.90),
            time_to_close_min_s: 60,
            tick_interval_ms: 500,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { arbitrage: ArbitrageConfig::default() }
    }
}
