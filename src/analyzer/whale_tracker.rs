// Whale tracker
// Finds large notional orders near the top of the book and rates how much of each side they control

use crate::config::{AnalysisConfig, ManipulationConfig};
use crate::indicator::orderbook::{OrderBook, OrderBookLevel};
use crate::model::{Bias, RiskLevel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whale side must outweigh the other by this factor to set a pressure direction
const PRESSURE_ASYMMETRY: f64 = 1.5;
/// More whale orders than this on one side, with none opposite, looks like spoofing
const SPOOFING_MIN_ORDERS: usize = 3;
const EXTREME_DOMINANCE_FACTOR: f64 = 1.5;
const MEDIUM_DOMINANCE_FACTOR: f64 = 0.7;

/// Book side of a whale order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSide {
    Bid,
    Ask,
}

/// Single order at or above the whale threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WhaleOrder {
    pub side: OrderSide,
    pub price: f64,
    pub quantity: f64,
    pub value_usd: f64,
}

/// Whale activity summary for one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleAnalysis {
    pub whale_bid_count: usize,
    pub whale_ask_count: usize,
    pub whale_bid_value: f64,
    pub whale_ask_value: f64,
    /// Whale bid USD as a percentage of the scanned bid USD
    pub bid_dominance: f64,
    /// Whale ask USD as a percentage of the scanned ask USD
    pub ask_dominance: f64,
    pub whale_pressure: Bias,
    pub manipulation_risk: RiskLevel,
    pub is_suspicious: bool,
    pub possible_spoofing: bool,
    pub whale_bids: Vec<WhaleOrder>,
    pub whale_asks: Vec<WhaleOrder>,
}

impl WhaleAnalysis {
    /// Result for a book that cannot be scanned
    pub fn empty() -> Self {
        WhaleAnalysis {
            whale_bid_count: 0,
            whale_ask_count: 0,
            whale_bid_value: 0.0,
            whale_ask_value: 0.0,
            bid_dominance: 0.0,
            ask_dominance: 0.0,
            whale_pressure: Bias::Neutral,
            manipulation_risk: RiskLevel::Unknown,
            is_suspicious: false,
            possible_spoofing: false,
            whale_bids: Vec::new(),
            whale_asks: Vec::new(),
        }
    }

    /// Larger of the two side dominances
    pub fn max_dominance(&self) -> f64 {
        self.bid_dominance.max(self.ask_dominance)
    }

    pub fn has_whales(&self) -> bool {
        self.whale_bid_count + self.whale_ask_count > 0
    }
}

/// Whale order tracker
#[derive(Debug, Clone)]
pub struct WhaleTracker {
    config: Arc<AnalysisConfig>,
}

impl Default for WhaleTracker {
    fn default() -> Self {
        Self::new(Arc::new(AnalysisConfig::default()))
    }
}

impl WhaleTracker {
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        WhaleTracker { config }
    }

    /// Scan the top of both book sides for whale orders
    ///
    /// An empty book yields [`WhaleAnalysis::empty`]. This never fails.
    pub fn track(&self, orderbook: &OrderBook) -> WhaleAnalysis {
        if orderbook.is_empty() {
            return WhaleAnalysis::empty();
        }

        let settings = &self.config.manipulation;
        let depth = settings.whale_scan_depth;
        let whale_bids = find_whale_orders(&orderbook.bids, OrderSide::Bid, depth, settings);
        let whale_asks = find_whale_orders(&orderbook.asks, OrderSide::Ask, depth, settings);

        let whale_bid_value: f64 = whale_bids.iter().map(|o| o.value_usd).sum();
        let whale_ask_value: f64 = whale_asks.iter().map(|o| o.value_usd).sum();
        let bid_dominance = dominance(whale_bid_value, orderbook.top_bid_value(depth));
        let ask_dominance = dominance(whale_ask_value, orderbook.top_ask_value(depth));

        let manipulation_risk =
            dominance_risk(bid_dominance.max(ask_dominance), settings.max_whale_dominance);
        let possible_spoofing = (whale_bids.len() > SPOOFING_MIN_ORDERS && whale_asks.is_empty())
            || (whale_asks.len() > SPOOFING_MIN_ORDERS && whale_bids.is_empty());

        WhaleAnalysis {
            whale_bid_count: whale_bids.len(),
            whale_ask_count: whale_asks.len(),
            whale_bid_value,
            whale_ask_value,
            bid_dominance,
            ask_dominance,
            whale_pressure: whale_pressure(whale_bid_value, whale_ask_value),
            is_suspicious: matches!(manipulation_risk, RiskLevel::High | RiskLevel::Extreme),
            manipulation_risk,
            possible_spoofing,
            whale_bids,
            whale_asks,
        }
    }
}

fn find_whale_orders(
    side: &[OrderBookLevel],
    order_side: OrderSide,
    depth: usize,
    settings: &ManipulationConfig,
) -> Vec<WhaleOrder> {
    side.iter()
        .take(depth)
        .filter(|level| level.value().is_finite() && level.value() >= settings.whale_order_threshold)
        .map(|level| WhaleOrder {
            side: order_side,
            price: level.price,
            quantity: level.quantity,
            value_usd: level.value(),
        })
        .collect()
}

fn dominance(whale_value: f64, side_value: f64) -> f64 {
    if side_value <= 0.0 {
        return 0.0;
    }
    (whale_value / side_value * 100.0).min(100.0)
}

/// Risk tier from the larger side dominance
///
/// Tiers are relative to `max_dominance`: above 1.5x is extreme, above 1x is high,
/// above 0.7x is medium.
pub fn dominance_risk(dominance: f64, max_dominance: f64) -> RiskLevel {
    if dominance > max_dominance * EXTREME_DOMINANCE_FACTOR {
        RiskLevel::Extreme
    } else if dominance > max_dominance {
        RiskLevel::High
    } else if dominance > max_dominance * MEDIUM_DOMINANCE_FACTOR {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn whale_pressure(bid_value: f64, ask_value: f64) -> Bias {
    if bid_value > ask_value * PRESSURE_ASYMMETRY {
        Bias::Bullish
    } else if ask_value > bid_value * PRESSURE_ASYMMETRY {
        Bias::Bearish
    } else {
        Bias::Neutral
    }
}
