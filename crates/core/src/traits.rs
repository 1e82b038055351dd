use crate::market::{Market, MarketSide, OrderStatus, OrderbookSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::sync::mpsc::Sender;

/// Normalizes one venue's REST+push feed into the common market model and exposes order
/// placement/query/cancel plus balance reporting. The adapter is the only component
/// permitted to serialize venue-specific identifiers; everything above this trait sees
/// opaque `instrument_id` strings.
///
/// Side semantics are normalized to [`MarketSide::BuyYes`]/[`MarketSide::BuyNo`]; each
/// implementation maps these onto its venue's native representation (e.g. Kalshi's
/// yes/no contract sides, Polymarket's paired outcome tokens).
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    /// Fetches the current catalog of tradeable instruments matching `series_filter`
    /// (e.g. a BTC 15-minute series prefix). Network errors are transient; callers retry
    /// with backoff at the adapter boundary per the error-handling design.
    async fn fetch_catalog(&self, series_filter: &str) -> Result<Vec<Market>>;

    /// Pulls a fresh top-of-book snapshot for `instrument_id`, bypassing any cache.
    async fn get_orderbook(&self, instrument_id: &str) -> Result<OrderbookSnapshot>;

    /// Authoritative cash balance for this venue, in venue-of-record dollars.
    async fn get_balance(&self) -> Result<Decimal>;

    /// Places an order at `price` for `size` contracts/shares of `instrument_id`,
    /// returning the venue order id. Does not wait for a fill.
    async fn place_order(
        &self,
        instrument_id: &str,
        side: MarketSide,
        size: Decimal,
        price: Decimal,
    ) -> Result<String>;

    /// Current terminal/non-terminal status and filled size for a previously placed order.
    async fn get_order(&self, order_id: &str) -> Result<(OrderStatus, Decimal)>;

    /// Requests cancellation of a resting order. Idempotent: canceling an already-terminal
    /// order is not an error.
    async fn cancel_order(&self, order_id: &str) -> Result<()>;

    /// Pushes fresh snapshots for `instrument_ids` to `tx` until the channel closes or a
    /// fetch error occurs. Runs until cancelled by the caller (typically spawned as its
    /// own task and aborted on shutdown).
    ///
    /// No venue adapter in this codebase speaks a native streaming protocol, so the
    /// default implementation polls [`Self::get_orderbook`] at `poll_interval` for each
    /// instrument in turn; an adapter with a real push feed overrides this to forward
    /// messages as they arrive instead of polling.
    async fn subscribe_orderbook(
        &self,
        instrument_ids: Vec<String>,
        tx: Sender<(String, OrderbookSnapshot)>,
        poll_interval: Duration,
    ) -> Result<()> {
        loop {
            for instrument_id in &instrument_ids {
                match self.get_orderbook(instrument_id).await {
                    Ok(snapshot) => {
                        if tx.send((instrument_id.clone(), snapshot)).await.is_err() {
                            return Ok(());
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%instrument_id, error = %err, "subscribe_orderbook poll failed");
                    }
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Venue;
    use chrono::Utc;

    struct StubAdapter;

    #[async_trait]
    impl VenueAdapter for StubAdapter {
        async fn fetch_catalog(&self, _series_filter: &str) -> Result<Vec<Market>> {
            Ok(vec![])
        }

        async fn get_orderbook(&self, instrument_id: &str) -> Result<OrderbookSnapshot> {
            Ok(OrderbookSnapshot {
                venue: Venue::Kalshi,
                instrument_id: instrument_id.to_string(),
                last_update: Utc::now(),
                asks: vec![],
                bids: vec![],
            })
        }

        async fn get_balance(&self) -> Result<Decimal> {
            Ok(Decimal::ZERO)
        }

        async fn place_order(
            &self,
            _instrument_id: &str,
            _side: MarketSide,
            _size: Decimal,
            _price: Decimal,
        ) -> Result<String> {
            Ok("order-1".to_string())
        }

        async fn get_order(&self, _order_id: &str) -> Result<(OrderStatus, Decimal)> {
            Ok((OrderStatus::Resting, Decimal::ZERO))
        }

        async fn cancel_order(&self, _order_id: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn default_subscribe_orderbook_polls_until_receiver_dropped() {
        let adapter = StubAdapter;
        let (tx, mut rx) = tokio::sync::mpsc::channel(4);

        let handle = tokio::spawn(async move {
            adapter
                .subscribe_orderbook(
                    vec!["KXBTC".to_string(), "KXETH".to_string()],
                    tx,
                    Duration::from_millis(1),
                )
                .await
        });

        let (first_id, first_snapshot) = rx.recv().await.expect("first poll result");
        assert_eq!(first_id, "KXBTC");
        assert_eq!(first_snapshot.instrument_id, "KXBTC");
        let (second_id, _) = rx.recv().await.expect("second poll result");
        assert_eq!(second_id, "KXETH");

        drop(rx);
        let result = handle.await.expect("task join");
        assert!(result.is_ok());
    }
}
