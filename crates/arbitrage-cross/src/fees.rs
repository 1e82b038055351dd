//! Fee calculations for cross-exchange arbitrage.
//!
//! This module provides fee calculations for both Kalshi and Polymarket,
//! allowing accurate profit projections for arbitrage opportunities.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Exchange;

// =============================================================================
// Fee Constants
// =============================================================================

/// Default Kalshi fee rate (0.7% per trade).
pub const KALSHI_DEFAULT_FEE_RATE: Decimal = dec!(0.007);

/// Default Polymarket trading fee rate (0.01% per trade).
pub const POLYMARKET_TRADING_FEE_RATE: Decimal = dec!(0.0001);

/// Polymarket profit fee rate (2% on profit, only on winning side).
pub const POLYMARKET_PROFIT_FEE_RATE: Decimal = dec!(0.02);

// =============================================================================
// Fee Configuration
// =============================================================================

/// How a venue charges for a fill: a fixed amount per contract/share regardless of price,
/// or a rate applied to the trade's notional (`price * size`).
///
/// The detector's fee-adjusted evaluation (`F_A`/`F_B` in the profitability model) is
/// venue-agnostic over this choice; which mode a given venue uses is a property of that
/// venue's actual fee schedule, not of the strategy being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeeMode {
    FlatPerUnit(Decimal),
    Proportional(Decimal),
}

impl FeeMode {
    #[must_use]
    pub fn fee(&self, price: Decimal, size: Decimal) -> Decimal {
        match self {
            Self::FlatPerUnit(rate) => *rate * size,
            Self::Proportional(rate) => *rate * price * size,
        }
    }
}

/// Configuration for fee calculations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Kalshi fee rate (as decimal, e.g., 0.007 for 0.7%).
    pub kalshi_fee_rate: Decimal,

    /// Polymarket trading fee rate (as decimal).
    pub polymarket_trading_fee_rate: Decimal,

    /// Polymarket profit fee rate (as decimal).
    pub polymarket_profit_fee_rate: Decimal,

    /// Whether to include estimated gas costs for Polymarket.
    pub include_gas_estimate: bool,

    /// Estimated gas cost per Polymarket trade in USDC.
    pub estimated_gas_per_trade: Decimal,

    /// How Kalshi fees are assessed for the detector's fee-adjusted evaluation.
    pub kalshi_fee_mode: FeeMode,

    /// How Polymarket fees are assessed for the detector's fee-adjusted evaluation.
    pub poly_fee_mode: FeeMode,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            kalshi_fee_rate: KALSHI_DEFAULT_FEE_RATE,
            polymarket_trading_fee_rate: POLYMARKET_TRADING_FEE_RATE,
            polymarket_profit_fee_rate: POLYMARKET_PROFIT_FEE_RATE,
            include_gas_estimate: false,
            estimated_gas_per_trade: dec!(0.01),
            kalshi_fee_mode: FeeMode::Proportional(KALSHI_DEFAULT_FEE_RATE),
            poly_fee_mode: FeeMode::Proportional(POLYMARKET_TRADING_FEE_RATE),
        }
    }
}

impl FeeConfig {
    /// Creates a new fee configuration with custom rates.
    #[must_use]
    pub fn new(
        kalshi_fee_rate: Decimal,
        polymarket_trading_fee_rate: Decimal,
        polymarket_profit_fee_rate: Decimal,
    ) -> Self {
        Self {
            kalshi_fee_rate,
            polymarket_trading_fee_rate,
            polymarket_profit_fee_rate,
            include_gas_estimate: false,
            estimated_gas_per_trade: dec!(0.01),
            kalshi_fee_mode: FeeMode::Proportional(kalshi_fee_rate),
            poly_fee_mode: FeeMode::Proportional(polymarket_trading_fee_rate),
        }
    }

    /// The fee schedule used by the literal worked scenarios: Kalshi charges a flat
    /// $0.001 per contract, Polymarket 1% of notional.
    #[must_use]
    pub fn reference_scenario() -> Self {
        Self {
            kalshi_fee_mode: FeeMode::FlatPerUnit(dec!(0.001)),
            poly_fee_mode: FeeMode::Proportional(dec!(0.01)),
            ..Self::default()
        }
    }

    /// Enables gas cost estimation.
    #[must_use]
    pub fn with_gas_estimate(mut self, gas_per_trade: Decimal) -> Self {
        self.include_gas_estimate = true;
        self.estimated_gas_per_trade = gas_per_trade;
        self
    }

    /// Fee on a Kalshi leg of `size` contracts at `price`, per [`Self::kalshi_fee_mode`].
    #[must_use]
    pub fn kalshi_leg_fee(&self, price: Decimal, size: Decimal) -> Decimal {
        self.kalshi_fee_mode.fee(price, size)
    }

    /// Fee on a Polymarket leg of `size` shares at `price`, per [`Self::poly_fee_mode`].
    #[must_use]
    pub fn poly_leg_fee(&self, price: Decimal, size: Decimal) -> Decimal {
        self.poly_fee_mode.fee(price, size)
    }
}

// =============================================================================
// Fee Calculator
// =============================================================================

/// Calculator for cross-exchange arbitrage fees.
#[derive(Debug, Clone)]
pub struct FeeCalculator {
    config: FeeConfig,
}

impl FeeCalculator {
    /// Creates a new fee calculator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: FeeConfig::default(),
        }
    }

    /// Creates a new fee calculator with custom configuration.
    #[must_use]
    pub fn with_config(config: FeeConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &FeeConfig {
        &self.config
    }

    /// Calculates the fee for a Kalshi trade.
    ///
    /// Kalshi charges a flat percentage fee on the trade value.
    ///
    /// # Arguments
    /// * `price_cents` - Price in cents (1-99)
    /// * `contracts` - Number of contracts
    ///
    /// # Returns
    /// Fee amount in cents.
    #[must_use]
    pub fn calculate_kalshi_fee(&self, price_cents: Decimal, contracts: Decimal) -> Decimal {
        let trade_value = price_cents * contracts;
        trade_value * self.config.kalshi_fee_rate
    }

    /// Calculates the trading fee for a Polymarket trade.
    ///
    /// Polymarket charges a small percentage fee on the trade value.
    ///
    /// # Arguments
    /// * `price` - Price in dollars (0.01-0.99)
    /// * `shares` - Number of shares
    ///
    /// # Returns
    /// Fee amount in dollars.
    #[must_use]
    pub fn calculate_polymarket_trading_fee(&self, price: Decimal, shares: Decimal) -> Decimal {
        let trade_value = price * shares;
        trade_value * self.config.polymarket_trading_fee_rate
    }

    /// Calculates the profit fee for a Polymarket trade.
    ///
    /// Polymarket charges 2% on the profit of winning positions.
    /// For arbitrage, we always have one winning side.
    ///
    /// # Arguments
    /// * `price` - Price paid for the winning side (0.01-0.99)
    /// * `shares` - Number of shares
    ///
    /// # Returns
    /// Profit fee amount in dollars.
    #[must_use]
    pub fn calculate_polymarket_profit_fee(&self, price: Decimal, shares: Decimal) -> Decimal {
        // Profit per share = $1 - price
        let profit_per_share = Decimal::ONE - price;
        let total_profit = profit_per_share * shares;
        total_profit * self.config.polymarket_profit_fee_rate
    }

    /// Calculates the total fees for a Polymarket trade.
    ///
    /// Includes both trading fee and expected profit fee.
    #[must_use]
    pub fn calculate_polymarket_total_fee(&self, price: Decimal, shares: Decimal) -> Decimal {
        let trading_fee = self.calculate_polymarket_trading_fee(price, shares);
        let profit_fee = self.calculate_polymarket_profit_fee(price, shares);
        let gas_fee = if self.config.include_gas_estimate {
            self.config.estimated_gas_per_trade
        } else {
            Decimal::ZERO
        };

        trading_fee + profit_fee + gas_fee
    }

    /// Calculates all fees for a cross-exchange arbitrage trade.
    ///
    /// # Arguments
    /// * `kalshi_price_cents` - Kalshi price in cents (1-99)
    /// * `kalshi_contracts` - Number of Kalshi contracts
    /// * `polymarket_price` - Polymarket price in dollars (0.01-0.99)
    /// * `polymarket_shares` - Number of Polymarket shares
    ///
    /// # Returns
    /// Detailed fee breakdown.
    #[must_use]
    pub fn calculate_arbitrage_fees(
        &self,
        kalshi_price_cents: Decimal,
        kalshi_contracts: Decimal,
        polymarket_price: Decimal,
        polymarket_shares: Decimal,
    ) -> ArbitrageFees {
        // Kalshi fee (in cents, convert to dollars)
        let kalshi_fee_cents = self.calculate_kalshi_fee(kalshi_price_cents, kalshi_contracts);
        let kalshi_fee = kalshi_fee_cents / dec!(100);

        // Polymarket trading fee
        let polymarket_trading_fee =
            self.calculate_polymarket_trading_fee(polymarket_price, polymarket_shares);

        // Polymarket profit fee (on the winning side)
        let polymarket_profit_fee =
            self.calculate_polymarket_profit_fee(polymarket_price, polymarket_shares);

        // Gas cost if enabled
        let gas_cost = if self.config.include_gas_estimate {
            // Two trades: one Polymarket buy
            self.config.estimated_gas_per_trade
        } else {
            Decimal::ZERO
        };

        let total_fee = kalshi_fee + polymarket_trading_fee + polymarket_profit_fee + gas_cost;

        ArbitrageFees {
            kalshi_fee,
            polymarket_trading_fee,
            polymarket_profit_fee,
            gas_cost,
            total_fee,
        }
    }

    /// Calculates the minimum edge required to be profitable after fees.
    ///
    /// # Arguments
    /// * `kalshi_price_cents` - Kalshi price in cents
    /// * `polymarket_price` - Polymarket price in dollars
    ///
    /// # Returns
    /// Minimum gross edge (as decimal) required to break even.
    #[must_use]
    pub fn minimum_profitable_edge(
        &self,
        kalshi_price_cents: Decimal,
        polymarket_price: Decimal,
    ) -> Decimal {
        // Kalshi fee as percentage of $1 payout
        let kalshi_fee_pct = self.config.kalshi_fee_rate * kalshi_price_cents / dec!(100);

        // Polymarket fee as percentage of $1 payout
        let poly_trading_pct = self.config.polymarket_trading_fee_rate * polymarket_price;
        let poly_profit_pct =
            self.config.polymarket_profit_fee_rate * (Decimal::ONE - polymarket_price);

        // Gas as percentage (assuming $1 payout)
        let gas_pct = if self.config.include_gas_estimate {
            self.config.estimated_gas_per_trade
        } else {
            Decimal::ZERO
        };

        kalshi_fee_pct + poly_trading_pct + poly_profit_pct + gas_pct
    }

    /// Returns the fee rate for a specific exchange.
    #[must_use]
    pub fn fee_rate_for_exchange(&self, exchange: Exchange) -> Decimal {
        match exchange {
            Exchange::Kalshi => self.config.kalshi_fee_rate,
            Exchange::Polymarket => {
                self.config.polymarket_trading_fee_rate + self.config.polymarket_profit_fee_rate
            }
        }
    }
}

impl Default for FeeCalculator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Fee Results
// =============================================================================

/// Detailed breakdown of arbitrage fees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageFees {
    /// Kalshi trading fee in dollars.
    pub kalshi_fee: Decimal,

    /// Polymarket trading fee in dollars.
    pub polymarket_trading_fee: Decimal,

    /// Polymarket profit fee in dollars.
    pub polymarket_profit_fee: Decimal,

    /// Gas cost in dollars.
    pub gas_cost: Decimal,

    /// Total fees in dollars.
    pub total_fee: Decimal,
}

impl ArbitrageFees {
    /// Returns the total Polymarket fee (trading + profit).
    #[must_use]
    pub fn total_polymarket_fee(&self) -> Decimal {
        self.polymarket_trading_fee + self.polymarket_profit_fee
    }

    /// Returns fees as a percentage of a given trade value.
    #[must_use]
    pub fn as_percentage_of(&self, trade_value: Decimal) -> Decimal {
        if trade_value == Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.total_fee / trade_value * dec!(100)
    }
}
