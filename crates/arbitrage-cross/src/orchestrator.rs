//! Top-level orchestration: discovers matched pairs once at startup, subscribes to each
//! leg's push feed, sticks to one pair at a time, feeds fresh books to the detector, and
//! hands anything it finds to the execution coordinator.
//!
//! Ties together every other component in this crate: [`crate::matcher::MarketMatcher`],
//! [`crate::cache::OrderbookCache`], [`crate::detector::CrossExchangeDetector`], and
//! [`crate::executor::ExecutionCoordinator`] (which itself owns the risk manager and
//! unwind planner).
//!
//! The main loop is driven by incoming orderbook pushes (see
//! [`VenueAdapter::subscribe_orderbook`]), not a fixed-interval catalog re-fetch:
//! instrument lifetimes are short enough (~15 minutes) that polling the catalog on a
//! clock would mostly waste calls on a market that hasn't changed. A full re-match only
//! happens once at startup and again, fire-and-forget, after a trade clears the active
//! pair.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, Mutex as AsyncMutex, Notify};
use tracing::{info, warn};

use algo_trade_core::config::ArbitrageConfig;
use algo_trade_core::market::{Market, OrderbookSnapshot, Venue};
use algo_trade_core::traits::VenueAdapter;

use crate::cache::{OrderbookCache, TtlCache};
use crate::detector::{CrossExchangeDetector, Opportunity, Strategy};
use crate::executor::{ExecutionCoordinator, ExecutionOutcome};
use crate::matcher::MarketMatcher;
use crate::types::MatchedMarket;

/// The single matched pair the orchestrator is currently watching. Sticky: once set,
/// the orchestrator only evaluates this pair until a trade executes or it falls out of
/// the tradeable window (too close to resolution, or price drifted out of band).
#[derive(Debug, Clone)]
pub struct ActiveMarketFocus {
    pub matched: MatchedMarket,
    pub since: Instant,
}

/// `true` when `market`'s time-to-resolution and both-sides price band still qualify it
/// for focus. Used at startup against the full catalog, where full [`Market`] rows (with
/// both `yes_price`/`no_price`) are available.
fn passes_sticky_filters(market: &Market, min_time_to_close_s: i64, band: (Decimal, Decimal)) -> bool {
    market.time_to_resolution() >= chrono::Duration::seconds(min_time_to_close_s)
        && market.within_price_band(band.0, band.1)
}

/// Re-checks the same two conditions as [`passes_sticky_filters`] from a live push
/// update instead of a catalog row: time-to-resolution comes straight off `matched`, and
/// the price band is checked against each leg's cached mid-price rather than a `Market`'s
/// `yes_price`/`no_price` (the push feed only ever delivers [`OrderbookSnapshot`]s).
fn passes_sticky_filters_live(
    matched: &MatchedMarket,
    kalshi_book: &OrderbookSnapshot,
    poly_yes_book: &OrderbookSnapshot,
    poly_no_book: &OrderbookSnapshot,
    min_time_to_close_s: i64,
    band: (Decimal, Decimal),
) -> bool {
    if matched.time_to_settlement() < chrono::Duration::seconds(min_time_to_close_s) {
        return false;
    }
    let Some(kalshi_mid) = kalshi_book.mid_price() else { return false };
    let Some(poly_yes_mid) = poly_yes_book.mid_price() else { return false };
    let Some(poly_no_mid) = poly_no_book.mid_price() else { return false };
    in_band(kalshi_mid, band) && in_band(poly_yes_mid, band) && in_band(poly_no_mid, band)
}

fn in_band(price: Decimal, band: (Decimal, Decimal)) -> bool {
    price >= band.0 && price <= band.1
}

fn price_band(config: &ArbitrageConfig) -> (Decimal, Decimal) {
    let lo = Decimal::try_from(config.price_band.0).unwrap_or(Decimal::new(10, 2));
    let hi = Decimal::try_from(config.price_band.1).unwrap_or(Decimal::new(90, 2));
    (lo, hi)
}

pub struct Orchestrator {
    kalshi: Arc<dyn VenueAdapter>,
    polymarket: Arc<dyn VenueAdapter>,
    matcher: MarketMatcher,
    detector: CrossExchangeDetector,
    cache: Arc<OrderbookCache>,
    coordinator: Arc<ExecutionCoordinator>,
    config: ArbitrageConfig,
    /// Every pair the last full catalog match produced, refreshed once at [`Self::start`]
    /// and again after each trade via [`Self::maybe_rediscover`].
    matched_markets: RwLock<Vec<MatchedMarket>>,
    subscribed_kalshi: RwLock<HashSet<String>>,
    subscribed_polymarket: RwLock<HashSet<String>>,
    poll_interval: RwLock<Duration>,
    book_tx: AsyncMutex<Option<mpsc::Sender<(String, OrderbookSnapshot)>>>,
    book_rx: AsyncMutex<Option<mpsc::Receiver<(String, OrderbookSnapshot)>>>,
    active_pair: RwLock<Option<ActiveMarketFocus>>,
    cooldown_until: RwLock<Option<Instant>>,
    /// Set by [`Self::enter_cooldown`], cleared once [`Self::maybe_rediscover`] has
    /// refreshed `matched_markets` and resubscribed any new legs.
    needs_rediscovery: AtomicBool,
    /// `(kalshi_ticker, polymarket_condition_id, strategy) -> ()`, 15s TTL: absorbs
    /// duplicate detections of the same opportunity across consecutive pushes.
    recent_opportunities: TtlCache<(String, String, Strategy), ()>,
    shutdown: AtomicBool,
    shutdown_notify: Notify,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        kalshi: Arc<dyn VenueAdapter>,
        polymarket: Arc<dyn VenueAdapter>,
        matcher: MarketMatcher,
        detector: CrossExchangeDetector,
        cache: Arc<OrderbookCache>,
        coordinator: Arc<ExecutionCoordinator>,
        config: ArbitrageConfig,
    ) -> Self {
        Self {
            kalshi,
            polymarket,
            matcher,
            detector,
            cache,
            coordinator,
            config,
            matched_markets: RwLock::new(Vec::new()),
            subscribed_kalshi: RwLock::new(HashSet::new()),
            subscribed_polymarket: RwLock::new(HashSet::new()),
            poll_interval: RwLock::new(Duration::from_secs(1)),
            book_tx: AsyncMutex::new(None),
            book_rx: AsyncMutex::new(None),
            active_pair: RwLock::new(None),
            cooldown_until: RwLock::new(None),
            needs_rediscovery: AtomicBool::new(false),
            recent_opportunities: TtlCache::new(Duration::from_secs(15)),
            shutdown: AtomicBool::new(false),
            shutdown_notify: Notify::new(),
        }
    }

    #[must_use]
    pub fn active_pair(&self) -> Option<ActiveMarketFocus> {
        self.active_pair.read().clone()
    }

    /// Signals [`Self::run`] to stop after handling its current event.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.shutdown_notify.notify_waiters();
    }

    #[must_use]
    fn cooldown_active(&self) -> bool {
        match *self.cooldown_until.read() {
            Some(until) => Instant::now() < until,
            None => false,
        }
    }

    /// One-time setup: matches the full catalog and subscribes to every matched leg's
    /// push feed. Must be called exactly once, before [`Self::run`].
    pub async fn start(&self, poll_interval: Duration) -> anyhow::Result<()> {
        *self.poll_interval.write() = poll_interval;
        self.discover_matches().await?;
        self.spawn_subscriptions_for_new_instruments().await;
        Ok(())
    }

    /// Drains orderbook pushes until [`Self::shutdown`] is called or every subscription
    /// task has exited. Each push updates the shared cache, is routed to the active
    /// focus (or considered as a new one), and is followed by an opportunistic check for
    /// pending post-trade re-discovery.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut rx = {
            let mut guard = self.book_rx.lock().await;
            guard.take()
        }
        .context("orchestrator has no subscriptions; call start() before run()")?;

        loop {
            tokio::select! {
                maybe_update = rx.recv() => {
                    match maybe_update {
                        Some((instrument_id, snapshot)) => {
                            self.cache.put(snapshot.clone());
                            if let Err(err) = self.on_book_update(&instrument_id, &snapshot).await {
                                warn!(error = %err, instrument_id, "book update handling failed");
                            }
                            self.maybe_rediscover().await;
                        }
                        None => {
                            warn!("all orderbook subscriptions ended");
                            return Ok(());
                        }
                    }
                }
                () = self.shutdown_notify.notified() => {
                    return Ok(());
                }
            }

            if self.shutdown.load(Ordering::SeqCst) {
                return Ok(());
            }
        }
    }

    /// Fetches both catalogs, matches them, and records every tradeable pair. Only ever
    /// called at startup and once per post-trade cooldown, never on an idle clock.
    async fn discover_matches(&self) -> anyhow::Result<()> {
        let kalshi_markets = self.kalshi.fetch_catalog("KXBTC").await?;
        let poly_markets = self.polymarket.fetch_catalog("BTC").await?;

        let band = price_band(&self.config);
        let min_ttc = self.config.time_to_close_min_s as i64;

        let parsed_kalshi: Vec<_> = kalshi_markets
            .iter()
            .filter(|m| passes_sticky_filters(m, min_ttc, band))
            .filter_map(|m| {
                self.matcher
                    .parse_kalshi_ticker(&m.instrument_id)
                    .map(|parsed| (parsed, m.resolution_time))
            })
            .collect();

        let parsed_poly: Vec<_> = poly_markets
            .iter()
            .filter(|m| passes_sticky_filters(m, min_ttc, band))
            .filter_map(|m| {
                let condition_id = m.venue_metadata.get("condition_id")?;
                let no_token_id = m.venue_metadata.get("no_token_id")?;
                Some(self.matcher.parse_polymarket_market(
                    condition_id,
                    &m.instrument_id,
                    no_token_id,
                    Some(&m.title),
                    Some(m.resolution_time),
                ))
            })
            .collect();

        let matches = self.matcher.find_btc_matches(&parsed_kalshi, &parsed_poly);
        let tradeable: Vec<_> = matches.into_iter().filter(MatchedMarket::is_tradeable).collect();
        info!(count = tradeable.len(), "matched pairs discovered");
        *self.matched_markets.write() = tradeable;
        Ok(())
    }

    /// Spawns one push-subscription task per venue for any leg instrument not already
    /// subscribed, sharing a single channel across the lifetime of the process.
    async fn spawn_subscriptions_for_new_instruments(&self) {
        let matched = self.matched_markets.read().clone();

        let mut new_kalshi = Vec::new();
        let mut new_poly = Vec::new();
        {
            let mut subscribed_kalshi = self.subscribed_kalshi.write();
            let mut subscribed_poly = self.subscribed_polymarket.write();
            for m in &matched {
                if subscribed_kalshi.insert(m.kalshi_ticker.clone()) {
                    new_kalshi.push(m.kalshi_ticker.clone());
                }
                if subscribed_poly.insert(m.polymarket_yes_token.clone()) {
                    new_poly.push(m.polymarket_yes_token.clone());
                }
                if subscribed_poly.insert(m.polymarket_no_token.clone()) {
                    new_poly.push(m.polymarket_no_token.clone());
                }
            }
        }

        if new_kalshi.is_empty() && new_poly.is_empty() {
            return;
        }

        let tx = {
            let mut guard = self.book_tx.lock().await;
            if guard.is_none() {
                let (tx, rx) = mpsc::channel(256);
                *guard = Some(tx);
                *self.book_rx.lock().await = Some(rx);
            }
            guard.clone().expect("book_tx just initialized above")
        };

        let poll_interval = *self.poll_interval.read();

        if !new_kalshi.is_empty() {
            let kalshi = Arc::clone(&self.kalshi);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Err(err) = kalshi.subscribe_orderbook(new_kalshi, tx, poll_interval).await {
                    warn!(error = %err, "kalshi orderbook subscription ended");
                }
            });
        }
        if !new_poly.is_empty() {
            let polymarket = Arc::clone(&self.polymarket);
            tokio::spawn(async move {
                if let Err(err) = polymarket.subscribe_orderbook(new_poly, tx, poll_interval).await {
                    warn!(error = %err, "polymarket orderbook subscription ended");
                }
            });
        }
    }

    /// Routes one push update: re-evaluates the active focus if this leg belongs to it,
    /// otherwise considers adopting a new focus now that this leg has fresh data.
    async fn on_book_update(&self, instrument_id: &str, _snapshot: &OrderbookSnapshot) -> anyhow::Result<()> {
        if self.cooldown_active() {
            return Ok(());
        }

        let focus = self.active_pair.read().clone();
        match focus {
            Some(focus) if focus.matched.involves(instrument_id) => self.evaluate_focus(&focus).await,
            Some(_) => Ok(()),
            None => self.try_adopt_focus(instrument_id).await,
        }
    }

    /// Looks for a matched pair containing `instrument_id` whose three legs are all
    /// cached and still pass the sticky filters, and sticks to the first one found.
    async fn try_adopt_focus(&self, instrument_id: &str) -> anyhow::Result<()> {
        let candidates = self.matched_markets.read().clone();
        let band = price_band(&self.config);
        let min_ttc = self.config.time_to_close_min_s as i64;

        for matched in candidates.into_iter().filter(|m| m.involves(instrument_id) && m.is_tradeable()) {
            let Some(kalshi_book) = self.cache.get(Venue::Kalshi, &matched.kalshi_ticker) else { continue };
            let Some(poly_yes_book) = self.cache.get(Venue::Polymarket, &matched.polymarket_yes_token) else {
                continue;
            };
            let Some(poly_no_book) = self.cache.get(Venue::Polymarket, &matched.polymarket_no_token) else {
                continue;
            };

            if !passes_sticky_filters_live(&matched, &kalshi_book, &poly_yes_book, &poly_no_book, min_ttc, band) {
                continue;
            }

            info!(ticker = %matched.kalshi_ticker, "sticking to new matched pair");
            let focus = ActiveMarketFocus { matched, since: Instant::now() };
            *self.active_pair.write() = Some(focus.clone());
            return self.evaluate_focus(&focus).await;
        }

        Ok(())
    }

    /// Pulls fresh books for the focused pair's three legs, runs the detector, and
    /// executes any opportunity that clears the 15s dedupe window.
    async fn evaluate_focus(&self, focus: &ActiveMarketFocus) -> anyhow::Result<()> {
        let matched = &focus.matched;

        let kalshi_book = self.fetch_or_cached(&self.kalshi, Venue::Kalshi, matched.kalshi_ticker.clone()).await?;
        let poly_yes_book = self
            .fetch_or_cached(&self.polymarket, Venue::Polymarket, matched.polymarket_yes_token.clone())
            .await?;
        let poly_no_book = self
            .fetch_or_cached(&self.polymarket, Venue::Polymarket, matched.polymarket_no_token.clone())
            .await?;

        let Some(opportunity) = self.detector.detect(matched, &kalshi_book, &poly_yes_book, &poly_no_book) else {
            return Ok(());
        };

        if self.already_seen(&opportunity) {
            return Ok(());
        }

        if opportunity.is_stale(Duration::from_millis(500)) {
            return Ok(());
        }

        let outcome = self.coordinator.execute(&opportunity).await;
        self.on_execution_outcome(outcome);

        Ok(())
    }

    async fn fetch_or_cached(
        &self,
        adapter: &Arc<dyn VenueAdapter>,
        venue: Venue,
        instrument_id: String,
    ) -> anyhow::Result<OrderbookSnapshot> {
        if let Some(snapshot) = self.cache.get(venue, &instrument_id) {
            return Ok(snapshot);
        }
        let snapshot = adapter.get_orderbook(&instrument_id).await?;
        self.cache.put(snapshot.clone());
        Ok(snapshot)
    }

    fn already_seen(&self, opportunity: &Opportunity) -> bool {
        let key = opportunity.dedupe_key();
        if self.recent_opportunities.get(&key).is_some() {
            return true;
        }
        self.recent_opportunities.insert(key, ());
        false
    }

    /// A trade (in either direction) clears the active pair and starts the post-trade
    /// cooldown; re-discovery is flagged here and actually run by [`Self::maybe_rediscover`]
    /// the next time a push update arrives, once the cooldown has elapsed.
    fn on_execution_outcome(&self, outcome: ExecutionOutcome) {
        match outcome {
            ExecutionOutcome::BothFilled(trade) => {
                info!(ticker = %trade.matched_ticker, net_profit = %trade.net_profit, "trade executed, entering cooldown");
                self.enter_cooldown();
            }
            ExecutionOutcome::Unwound { filled_venue, plan } => {
                warn!(?filled_venue, resolved = plan.is_resolved(), "position unwound after partial fill, entering cooldown");
                self.enter_cooldown();
            }
            ExecutionOutcome::NeitherFilled => {
                info!("neither leg filled, remaining on current focus");
            }
            ExecutionOutcome::RiskRejected(rejection) => {
                warn!(?rejection, "execution skipped, risk manager rejected");
            }
            ExecutionOutcome::InsufficientLiquidity => {
                info!("execution skipped, liquidity moved before placement");
            }
        }
    }

    fn enter_cooldown(&self) {
        *self.active_pair.write() = None;
        *self.cooldown_until.write() = Some(Instant::now() + Duration::from_secs(self.config.trade_cooldown_s));
        self.needs_rediscovery.store(true, Ordering::SeqCst);
    }

    /// Runs the fire-and-forget re-match that [`Self::enter_cooldown`] schedules, once the
    /// cooldown window has actually elapsed. A no-op on every call until then, and on
    /// every call once the flag has already been cleared, so it's safe to call after
    /// every push update without re-hitting the catalog on a clock.
    async fn maybe_rediscover(&self) {
        if self.cooldown_active() {
            return;
        }
        if !self.needs_rediscovery.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Err(err) = self.discover_matches().await {
            warn!(error = %err, "post-trade market re-discovery failed");
            self.needs_rediscovery.store(true, Ordering::SeqCst);
            return;
        }
        self.spawn_subscriptions_for_new_instruments().await;
    }
}
