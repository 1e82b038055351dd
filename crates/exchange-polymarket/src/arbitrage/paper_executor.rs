//! Paper trading execution handler for arbitrage testing.
//!
//! This module provides a simulated execution environment for testing the full
//! arbitrage pipeline without risking real funds. The `PaperExecutor` implements
//! the `PolymarketExecutor` trait with configurable fill simulation.
//!
//! # Features
//!
//! - Simulated balance tracking with realistic deductions
//! - Configurable fill rate for testing failure scenarios
//! - Partial fill simulation for FAK orders
//! - Complete order history for analysis
//! - Thread-safe position tracking
//! - Metrics integration for statistical validation
//!
//! # Example
//!
//! ```
//! use algo_trade_polymarket::arbitrage::paper_executor::{PaperExecutor, PaperExecutorConfig};
//! use algo_trade_polymarket::arbitrage::PolymarketExecutor;
//! use rust_decimal_macros::dec;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Create executor with default config ($1000 balance, 85% fill rate)
//!     let executor = PaperExecutor::new(PaperExecutorConfig::default());
//!     let balance = executor.get_balance().await.unwrap();
//!     println!("Paper trading with {} balance", balance);
//! }
//! ```

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::execution::{
    ExecutionError, OrderParams, OrderResult, OrderStatus, PolymarketExecutor, Position,
};
use super::metrics::ArbitrageMetrics;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for paper trading executor.
///
/// Controls the simulation behavior including fill rates, latency, and initial conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperExecutorConfig {
    /// Initial USDC balance for paper trading.
    pub initial_balance: Decimal,

    /// Probability that an order will fill (0.0 to 1.0).
    /// Default: 0.85 (85% fill rate)
    pub fill_rate: f64,

    /// Probability of partial fills for FAK orders (0.0 to 1.0).
    /// When a fill occurs, this is the chance it will be partial.
    /// Default: 0.10 (10% partial fill rate)
    pub partial_fill_rate: f64,

    /// Simulated latency in milliseconds.
    /// When > 0, orders will sleep for this duration before returning.
    /// Default: 0 (no latency)
    pub simulate_latency_ms: u64,

    /// Minimum partial fill percentage when partial fills occur.
    /// Default: 0.25 (at least 25% fills)
    pub min_partial_fill_pct: f64,

    /// Maximum partial fill percentage when partial fills occur.
    /// Default: 0.95 (at most 95% fills)
    pub max_partial_fill_pct: f64,

    /// Optional random seed for reproducible testing.
    /// Default: None (uses system entropy)
    pub random_seed: Option<u64>,
}

impl Default for PaperExecutorConfig {
    fn default() -> Self {
        Self {
            initial_balance: dec!(1000),
            fill_rate: 0.85,
            partial_fill_rate: 0.10,
            simulate_latency_ms: 0,
            min_partial_fill_pct: 0.25,
            max_partial_fill_pct: 0.95,
            random_seed: None,
        }
    }
}

impl PaperExecutorConfig {
    /// Creates a new config with the specified initial balance.
    #[must_use]
    pub fn with_balance(initial_balance: Decimal) -> Self {
        Self {
            initial_balance,
            ..Default::default()
        }
    }

    /// Creates a config that always fills orders (for deterministic testing).
    #[must_use]
    pub fn always_fill() -> Self {
        Self {
            fill_rate: 1.0,
            partial_fill_rate: 0.0,
            ..Default::default()
        }
    }

    /// Creates a config that never fills orders (for failure testing).
    #[must_use]
    pub fn never_fill() -> Self {
        Self {
            fill_rate: 0.0,
            ..Default::default()
        }
    }

    /// Creates a config with a specific random seed for reproducible tests.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            random_seed: Some(seed),
            ..Default::default()
        }
    }

    /// Sets the fill rate.
    #[must_use]
    pub fn fill_rate(mut self, rate: f64) -> Self {
        self.fill_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the partial fill rate.
    #[must_use]
    pub fn partial_fill_rate(mut self, rate: f64) -> Self {
        self.partial_fill_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the simulated latency.
    #[must_use]
    pub fn latency_ms(mut self, ms: u64) -> Self {
        self.simulate_latency_ms = ms;
        self
    }
}

// =============================================================================
// Internal State
// =============================================================================

/// Internal state for the paper executor.
#[derive(Debug)]
struct PaperState {
    /// Current USDC balance.
    balance: Decimal,

    /// Simulated positions by token ID.
    positions: HashMap<String, Position>,

    /// Order history by order ID.
    orders: HashMap<String, OrderResult>,

    /// Order parameters by order ID (for reference).
    order_params: HashMap<String, OrderParams>,

    /// Total invested amount (for metrics).
    total_invested: Decimal,

    /// Total number of orders submitted.
    orders_submitted: u32,

    /// Total number of successful fills.
    successful_fills: u32,

    /// Total number of rejected orders.
    rejected_orders: u32,
}

impl PaperState {
    fn new(initial_balance: Decimal) -> Self {
        Self {
            balance: initial_balance,
            positions: HashMap::new(),
            orders: HashMap::new(),
            order_params: HashMap::new(),
            total_invested: Decimal::ZERO,
            orders_submitted: 0,
            successful_fills: 0,
            rejected_orders: 0,
        }
    }
}

// =============================================================================
// Paper Executor
// =============================================================================

/// Paper trading executor for testing arbitrage strategies.
///
/// Implements `PolymarketExecutor` with simulated fills based on configurable
/// probabilities. Tracks all orders, positions, and balances for analysis.
///
/// # Thread Safety
///
/// The executor is thread-safe and can be shared across multiple tasks.
/// Internal state is protected by a read-write lock.
pub struct PaperExecutor {
    /// Configuration.
    config: PaperExecutorConfig,

    /// Internal state.
    state: Arc<RwLock<PaperState>>,

    /// Random number generator (protected for thread safety).
    rng: Arc<RwLock<StdRng>>,

    /// Optional metrics reference for tracking.
    metrics: Option<Arc<RwLock<ArbitrageMetrics>>>,
}

impl std::fmt::Debug for PaperExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperExecutor")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl PaperExecutor {
    /// Creates a new paper executor with the given configuration.
    #[must_use]
    pub fn new(config: PaperExecutorConfig) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            state: Arc::new(RwLock::new(PaperState::new(config.initial_balance))),
            rng: Arc::new(RwLock::new(rng)),
            config,
            metrics: None,
        }
    }

    /// Creates a new paper executor with default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::new(PaperExecutorConfig::default())
    }

    /// Attaches a metrics tracker for recording execution statistics.
    pub fn with_metrics(mut self, metrics: Arc<RwLock<ArbitrageMetrics>>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &PaperExecutorConfig {
        &self.config
    }

    /// Returns the total number of orders submitted.
    #[must_use]
    pub fn orders_submitted(&self) -> u32 {
        self.state.read().orders_submitted
    }

    /// Returns the total number of successful fills.
    #[must_use]
    pub fn successful_fills(&self) -> u32 {
        self.state.read().successful_fills
    }

    /// Returns the total number of rejected orders.
    #[must_use]
    pub fn rejected_orders(&self) -> u32 {
        self.state.read().rejected_orders
    }

    /// Returns the actual fill rate (successful / submitted).
    #[must_use]
    pub fn actual_fill_rate(&self) -> f64 {
        let state = self.state.read();
        if state.orders_submitted == 0 {
            return 0.0;
        }
        state.successful_fills as f64 / state.orders_submitted as f64
    }

    /// Returns the total invested amount.
    #[must_use]
    pub fn total_invested(&self) -> Decimal {
        self.state.read().total_invested
    }

    /// Returns a copy of all order results.
    #[must_use]
    pub fn order_history(&self) -> Vec<OrderResult> {
        self.state.read().orders.values().cloned().collect()
    }

    /// Resets the executor to initial state.
    pub fn reset(&self) {
        let mut state = self.state.write();
        *state = PaperState::new(self.config.initial_balance);
    }

    /// Resets with a new balance.
    pub fn reset_with_balance(&self, balance: Decimal) {
        let mut state = self.state.write();
        *state = PaperState::new(balance);
    }

    /// Simulates whether an order should fill based on configured probability.
    fn should_fill(&self) -> bool {
        let mut rng = self.rng.write();
        rng.gen::<f64>() < self.config.fill_rate
    }

    /// Simulates whether a fill should be partial.
    fn should_partial_fill(&self) -> bool {
        let mut rng = self.rng.write();
        rng.gen::<f64>() < self.config.partial_fill_rate
    }

    /// Generates a partial fill percentage.
    fn partial_fill_percentage(&self) -> f64 {
        let mut rng = self.rng.write();
        rng.gen_range(self.config.min_partial_fill_pct..=self.config.max_partial_fill_pct)
    }

    /// Generates a new order ID.
    fn generate_order_id(&self) -> String {
        format!("paper-{}", Uuid::new_v4())
    }

    /// Simulates latency if configured.
    async fn simulate_latency(&self) {
        if self.config.simulate_latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.simulate_latency_ms)).await;
        }
    }

    /// Processes a single order and returns the result.
    fn process_order(&self, order: &OrderParams) -> OrderResult {
        let order_id = self.generate_order_id();
        let mut state = self.state.write();

        state.orders_submitted += 1;

        // Check balance for buy orders
        if order.side == super::execution::Side::Buy {
            let required = order.notional_value();
            if required > state.balance {
                state.rejected_orders += 1;
                let result = OrderResult::rejected(&order_id, "Insufficient balance");
                state.orders.insert(order_id.clone(), result.clone());
                state.order_params.insert(order_id, order.clone());
                return result;
            }
        }

        // Simulate fill decision
        if !self.should_fill() {
            state.rejected_orders += 1;
            let result = OrderResult {
                order_id: order_id.clone(),
                status: OrderStatus::Expired,
                filled_size: Decimal::ZERO,
                avg_fill_price: None,
                error: Some("No fill - simulated market conditions".to_string()),
                latency_ms: None,
            };
            state.orders.insert(order_id.clone(), result.clone());
            state.order_params.insert(order_id, order.clone());
            return result;
        }

        // Determine fill size
        let fill_size = match order.order_type {
            super::execution::OrderType::Fok => {
                // FOK: all or nothing
                order.size
            }
            super::execution::OrderType::Fak | super::execution::OrderType::Gtc => {
                // FAK/GTC: potentially partial
                if self.should_partial_fill() {
                    let pct = self.partial_fill_percentage();
                    let pct_decimal = Decimal::from_f64_retain(pct).unwrap_or(dec!(0.5));
                    (order.size * pct_decimal).round_dp(2)
                } else {
                    order.size
                }
            }
        };

        // Calculate cost and update state
        let fill_cost = fill_size * order.price;

        if order.side == super::execution::Side::Buy {
            state.balance -= fill_cost;
            state.total_invested += fill_cost;

            // Update position
            let position = state
                .positions
                .entry(order.token_id.clone())
                .or_insert_with(|| Position::new(&order.token_id, Decimal::ZERO, Decimal::ZERO));

            // Calculate new average price
            let old_cost = position.size * position.avg_price;
            let new_total_size = position.size + fill_size;
            let new_avg_price = if new_total_size > Decimal::ZERO {
                (old_cost + fill_cost) / new_total_size
            } else {
                order.price
            };

            position.size = new_total_size;
            position.avg_price = new_avg_price;
        } else {
            // Sell - add proceeds to balance
            state.balance += fill_cost;

            // Update position
            if let Some(position) = state.positions.get_mut(&order.token_id) {
                position.size -= fill_size;
                if position.size <= Decimal::ZERO {
                    state.positions.remove(&order.token_id);
                }
            }
        }

        state.successful_fills += 1;

        let status = if fill_size == order.size {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };

        let result = OrderResult {
            order_id: order_id.clone(),
            status,
            filled_size: fill_size,
            avg_fill_price: Some(order.price),
            error: None,
            latency_ms: None,
        };

        state.orders.insert(order_id.clone(), result.clone());
        state.order_params.insert(order_id, order.clone());

        result
    }

    /// Records execution metrics if a metrics tracker is attached.
    fn record_metrics(&self, success: bool, partial: bool) {
        if let Some(ref metrics) = self.metrics {
            let mut m = metrics.write();
            m.record_execution(success, partial);
        }
    }
}

// =============================================================================
// Trait Implementation
// =============================================================================

#[async_trait]
impl PolymarketExecutor for PaperExecutor {
    async fn submit_order(&self, order: OrderParams) -> Result<OrderResult, ExecutionError> {
        self.simulate_latency().await;

        let result = self.process_order(&order);

        // Record metrics
        let success = result.status == OrderStatus::Filled;
        let partial = result.status == OrderStatus::PartiallyFilled;
        self.record_metrics(success, partial);

        Ok(result)
    }

    async fn submit_orders_batch(
        &self,
        orders: Vec<OrderParams>,
    ) -> Result<Vec<OrderResult>, ExecutionError> {
        self.simulate_latency().await;

        let results: Vec<OrderResult> = orders
            .iter()
            .map(|order| {
                let result = self.process_order(order);

                // Record metrics for each order
                let success = result.status == OrderStatus::Filled;
                let partial = result.status == OrderStatus::PartiallyFilled;
                self.record_metrics(success, partial);

                result
            })
            .collect();

        Ok(results)
    }

    async fn cancel_all_orders(&self) -> Result<u32, ExecutionError> {
        Ok(0) // Paper executor has no resting orders
    }

    async fn cancel_order(&self, order_id: &str) -> Result<(), ExecutionError> {
        let mut state = self.state.write();

        if let Some(order) = state.orders.get_mut(order_id) {
            if order.status.is_terminal() {
                return Err(ExecutionError::rejected(format!(
                    "Cannot cancel order in terminal state: {}",
                    order.status
                )));
            }

            order.status = OrderStatus::Cancelled;
            Ok(())
        } else {
            Err(ExecutionError::Api(format!("Order not found: {order_id}")))
        }
    }

    async fn get_order_status(&self, order_id: &str) -> Result<OrderResult, ExecutionError> {
        let state = self.state.read();

        state
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| ExecutionError::Api(format!("Order not found: {order_id}")))
    }

    async fn wait_for_terminal(
        &self,
        order_id: &str,
        _timeout: Duration,
    ) -> Result<OrderResult, ExecutionError> {
        // In paper trading, orders are immediately terminal
        self.get_order_status(order_id).await
    }

    async fn get_positions(&self) -> Result<Vec<Position>, ExecutionError> {
        let state = self.state.read();
        Ok(state.positions.values().cloned().collect())
    }

    async fn get_balance(&self) -> Result<Decimal, ExecutionError> {
        let state = self.state.read();
        Ok(state.balance)
    }

    async fn credit_balance(&self, amount: Decimal) -> Result<(), ExecutionError> {
        let mut state = self.state.write();
        state.balance += amount;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
