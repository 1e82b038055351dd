//! Venue-agnostic market data model shared by every [`crate::traits::VenueAdapter`]
//! implementation.
//!
//! Venue-specific shapes (paired outcome tokens, series-dated tickers, price-in-cents
//! vs price-in-dollars) live behind the adapter; everything above this module sees only
//! the types below.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which venue a [`Market`] or [`OrderbookSnapshot`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Kalshi,
    Polymarket,
}

impl std::fmt::Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kalshi => write!(f, "kalshi"),
            Self::Polymarket => write!(f, "polymarket"),
        }
    }
}

/// Venue-normalized representation of a single binary-outcome instrument.
///
/// `yes_price`/`no_price` are always in `[0, 1]` regardless of the venue's native quoting
/// (Kalshi quotes cents; the adapter divides by 100 before constructing this type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub venue: Venue,
    pub instrument_id: String,
    pub title: String,
    pub resolution_time: DateTime<Utc>,
    pub resolution_source: String,
    pub yes_price: Decimal,
    pub no_price: Decimal,
    pub yes_volume: Decimal,
    pub no_volume: Decimal,
    /// Venue-private metadata (e.g. Polymarket's paired YES/NO token ids), opaque to
    /// every component except the adapter that produced it.
    pub venue_metadata: std::collections::HashMap<String, String>,
}

impl Market {
    /// `true` when both sides are within the configured price band, per the
    /// orchestrator's sticky-market filter.
    #[must_use]
    pub fn within_price_band(&self, lo: Decimal, hi: Decimal) -> bool {
        (self.yes_price >= lo && self.yes_price <= hi) && (self.no_price >= lo && self.no_price <= hi)
    }

    #[must_use]
    pub fn time_to_resolution(&self) -> chrono::Duration {
        self.resolution_time - Utc::now()
    }
}

/// A single (price, size) level in an [`OrderbookSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub price: Decimal,
    pub size: Decimal,
}

/// Top-N levels of asks and bids for one side (YES or NO) of an instrument on one venue.
///
/// `asks` are ascending by price, `bids` descending, per the data model invariant; age is
/// derived from `received_at`, not carried as a field, so a snapshot's staleness is always
/// judged relative to when the caller observes it rather than when it was constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderbookSnapshot {
    pub venue: Venue,
    pub instrument_id: String,
    pub last_update: DateTime<Utc>,
    pub asks: Vec<Level>,
    pub bids: Vec<Level>,
}

impl OrderbookSnapshot {
    #[must_use]
    pub fn best_ask(&self) -> Option<Level> {
        self.asks.first().copied()
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<Level> {
        self.bids.first().copied()
    }

    /// Total size resting at or better than `price` on the ask side, used by the
    /// execution coordinator's strict liquidity check (target price, not deeper levels).
    #[must_use]
    pub fn ask_size_at(&self, price: Decimal) -> Decimal {
        self.asks
            .iter()
            .filter(|l| l.price <= price)
            .map(|l| l.size)
            .sum()
    }

    /// Midpoint of best bid and best ask, when both sides have at least one level.
    #[must_use]
    pub fn mid_price(&self) -> Option<Decimal> {
        let ask = self.best_ask()?.price;
        let bid = self.best_bid()?.price;
        Some((ask + bid) / Decimal::TWO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketSide {
    BuyYes,
    BuyNo,
}

impl MarketSide {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::BuyYes => Self::BuyNo,
            Self::BuyNo => Self::BuyYes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Filled,
    Partial,
    Resting,
    Canceled,
    Rejected,
}

impl OrderStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Canceled | Self::Rejected)
    }
}
