// Orderbook snapshot
// Price levels and the aggregate helpers the orderbook analyzers are built on

use serde::{Deserialize, Serialize};

/// Orderbook entry representing a price level
///
/// Serialized as a `[price, quantity]` pair, the layout exchanges deliver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct OrderBookLevel {
    /// Price at this level
    pub price: f64,
    /// Quantity available at this price
    pub quantity: f64,
}

impl OrderBookLevel {
    pub fn new(price: f64, quantity: f64) -> Self {
        Self { price, quantity }
    }

    /// Calculate the total value (price * quantity) at this level
    pub fn value(&self) -> f64 {
        self.price * self.quantity
    }

    fn is_valid(&self) -> bool {
        self.price > 0.0 && self.quantity > 0.0 && self.value().is_finite()
    }
}

impl From<(f64, f64)> for OrderBookLevel {
    fn from((price, quantity): (f64, f64)) -> Self {
        Self::new(price, quantity)
    }
}

impl From<OrderBookLevel> for (f64, f64) {
    fn from(level: OrderBookLevel) -> Self {
        (level.price, level.quantity)
    }
}

/// Orderbook data structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    /// Symbol/market identifier
    #[serde(default)]
    pub symbol: String,
    /// Bid orders (buy orders) - sorted by price descending
    pub bids: Vec<OrderBookLevel>,
    /// Ask orders (sell orders) - sorted by price ascending
    pub asks: Vec<OrderBookLevel>,
    /// Timestamp of the orderbook snapshot (milliseconds)
    #[serde(default)]
    pub timestamp: i64,
}

impl OrderBook {
    pub fn new(
        symbol: String,
        bids: Vec<OrderBookLevel>,
        asks: Vec<OrderBookLevel>,
        timestamp: i64,
    ) -> Self {
        Self {
            symbol,
            bids,
            asks,
            timestamp,
        }
    }

    /// Create from tuple vectors (price, quantity)
    pub fn from_tuples(
        symbol: String,
        bids: Vec<(f64, f64)>,
        asks: Vec<(f64, f64)>,
        timestamp: i64,
    ) -> Self {
        Self::new(
            symbol,
            bids.into_iter().map(OrderBookLevel::from).collect(),
            asks.into_iter().map(OrderBookLevel::from).collect(),
            timestamp,
        )
    }

    /// True when either side has no levels
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() || self.asks.is_empty()
    }

    /// Get best bid price
    pub fn best_bid(&self) -> Option<f64> {
        self.bids.first().map(|l| l.price)
    }

    /// Get best ask price
    pub fn best_ask(&self) -> Option<f64> {
        self.asks.first().map(|l| l.price)
    }

    /// Calculate mid price
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / 2.0),
            _ => None,
        }
    }

    /// Calculate bid-ask spread
    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Spread as percentage of a reference price
    ///
    /// Falls back to the mid price when the reference is not positive.
    pub fn spread_percent_of(&self, reference_price: f64) -> Option<f64> {
        let spread = self.spread()?;
        let reference = if reference_price > 0.0 {
            reference_price
        } else {
            self.mid_price().filter(|mid| *mid > 0.0)?
        };
        Some(spread / reference * 100.0)
    }

    /// Total USD value of the first `levels` bid levels
    pub fn top_bid_value(&self, levels: usize) -> f64 {
        side_value(&self.bids, levels)
    }

    /// Total USD value of the first `levels` ask levels
    pub fn top_ask_value(&self, levels: usize) -> f64 {
        side_value(&self.asks, levels)
    }

    /// Total quantity of the first `levels` bid levels
    pub fn top_bid_quantity(&self, levels: usize) -> f64 {
        side_quantity(&self.bids, levels)
    }

    /// Total quantity of the first `levels` ask levels
    pub fn top_ask_quantity(&self, levels: usize) -> f64 {
        side_quantity(&self.asks, levels)
    }
}

fn side_value(side: &[OrderBookLevel], levels: usize) -> f64 {
    side.iter()
        .take(levels)
        .filter(|l| l.is_valid())
        .map(OrderBookLevel::value)
        .sum()
}

fn side_quantity(side: &[OrderBookLevel], levels: usize) -> f64 {
    side.iter()
        .take(levels)
        .filter(|l| l.is_valid())
        .map(|l| l.quantity)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_orderbook() -> OrderBook {
        OrderBook::from_tuples(
            "TEST".to_string(),
            vec![(100.0, 10.0), (99.5, 20.0), (99.0, 30.0)],
            vec![(101.0, 15.0), (101.5, 25.0), (102.0, 35.0)],
            1234567890,
        )
    }

    #[test]
    fn test_orderbook_basic() {
        let ob = create_test_orderbook();

        assert_eq!(ob.best_bid(), Some(100.0));
        assert_eq!(ob.best_ask(), Some(101.0));
        assert_eq!(ob.mid_price(), Some(100.5));
        assert_eq!(ob.spread(), Some(1.0));
        assert!(!ob.is_empty());
    }

    #[test]
    fn test_spread_percent_reference() {
        let ob = create_test_orderbook();
        assert_eq!(ob.spread_percent_of(100.0), Some(1.0));

        // Non-positive reference falls back to mid price
        let by_mid = ob.spread_percent_of(0.0).unwrap();
        assert!((by_mid - 1.0 / 100.5 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_top_levels() {
        let ob = create_test_orderbook();
        assert_eq!(ob.top_bid_quantity(2), 30.0);
        assert_eq!(ob.top_ask_quantity(10), 75.0);
        assert_eq!(ob.top_bid_value(1), 1000.0);
        assert_eq!(ob.top_ask_value(2), 101.0 * 15.0 + 101.5 * 25.0);
    }

    #[test]
    fn test_empty_orderbook() {
        let ob = OrderBook::default();
        assert!(ob.is_empty());
        assert_eq!(ob.best_bid(), None);
        assert_eq!(ob.spread_percent_of(100.0), None);
        assert_eq!(ob.top_bid_value(10), 0.0);
    }

    #[test]
    fn test_deserialize_pair_levels() {
        let json = r#"{"bids": [[100.0, 2.0]], "asks": [[101.0, 3.0]], "timestamp": 5}"#;
        let ob: OrderBook = serde_json::from_str(json).unwrap();
        assert_eq!(ob.bids[0], OrderBookLevel::new(100.0, 2.0));
        assert_eq!(ob.asks[0].quantity, 3.0);
        assert_eq!(ob.timestamp, 5);
        assert!(ob.symbol.is_empty());
    }
}
