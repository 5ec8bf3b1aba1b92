// Orderbook Analyzer
// Scores a single orderbook snapshot: spread, depth, imbalance, walls and whale risk

use crate::analyzer::base::{AnalysisOutput, resolve};
use crate::analyzer::whale_tracker::{WhaleAnalysis, WhaleTracker};
use crate::config::AnalysisConfig;
use crate::error::{AnalyzerError, AnalyzerResult, ensure_finite};
use crate::indicator::orderbook::{OrderBook, OrderBookLevel};
use crate::model::{Bias, RiskLevel, clamp_score};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// Levels summed for depth and imbalance
const DEPTH_LEVELS: usize = 10;
/// Levels scanned for walls
const WALL_SCAN_LEVELS: usize = 20;
/// A wall is at least this multiple of the average level value
const WALL_MULTIPLIER: f64 = 3.0;
const MAX_WALLS: usize = 3;
/// Spread percent reported for a book without both sides
const EMPTY_SPREAD_PERCENT: f64 = 100.0;
/// Bid/ask depth ratio reported when one side has no value
const MAX_DEPTH_RATIO: f64 = 100.0;
const DEPTH_IMBALANCE_THRESHOLD: f64 = 10.0;
const ORDER_IMBALANCE_THRESHOLD: f64 = 5.0;

/// Spread category by percent of price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadCategory {
    VeryTight,
    Tight,
    Normal,
    Wide,
    VeryWide,
    Unknown,
}

impl SpreadCategory {
    pub fn classify(spread_percent: f64) -> Self {
        if spread_percent < 0.1 {
            SpreadCategory::VeryTight
        } else if spread_percent < 0.3 {
            SpreadCategory::Tight
        } else if spread_percent < 0.5 {
            SpreadCategory::Normal
        } else if spread_percent < 1.0 {
            SpreadCategory::Wide
        } else {
            SpreadCategory::VeryWide
        }
    }
}

/// Wall strength relative to the average level value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallStrength {
    /// More than 10x the average
    VeryStrong,
    /// More than 6x the average
    Strong,
    Moderate,
}

/// Large resting order that stands out from its neighbours
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderWall {
    pub price: f64,
    pub quantity: f64,
    pub value_usd: f64,
    pub strength: WallStrength,
    /// Distance from the mid price (%)
    pub distance_percent: f64,
}

/// Orderbook analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookAnalysis {
    pub orderbook_score: f64,

    pub best_bid: f64,
    pub best_ask: f64,
    pub mid_price: f64,
    pub spread: f64,
    pub spread_percent: f64,
    pub spread_category: SpreadCategory,
    pub is_tight_spread: bool,

    /// USD value of the top 10 bid levels
    pub bid_depth_usd: f64,
    /// USD value of the top 10 ask levels
    pub ask_depth_usd: f64,
    pub total_depth_usd: f64,
    /// Larger side depth over smaller side depth
    pub depth_ratio: f64,
    /// (bid - ask) / (bid + ask) * 100 over USD depth
    pub depth_imbalance: f64,
    /// (bid - ask) / (bid + ask) * 100 over quantity
    pub order_imbalance: f64,
    pub imbalance_direction: Bias,

    pub liquidity_score: f64,
    pub is_liquid: bool,

    pub bid_walls: Vec<OrderWall>,
    pub ask_walls: Vec<OrderWall>,
    pub has_strong_support: bool,
    pub has_strong_resistance: bool,

    pub market_pressure: Bias,

    pub whale_analysis: WhaleAnalysis,
    pub has_whale_manipulation: bool,
}

impl AnalysisOutput for OrderBookAnalysis {
    fn empty() -> Self {
        OrderBookAnalysis {
            orderbook_score: 0.0,
            best_bid: 0.0,
            best_ask: 0.0,
            mid_price: 0.0,
            spread: 0.0,
            spread_percent: EMPTY_SPREAD_PERCENT,
            spread_category: SpreadCategory::Unknown,
            is_tight_spread: false,
            bid_depth_usd: 0.0,
            ask_depth_usd: 0.0,
            total_depth_usd: 0.0,
            depth_ratio: 1.0,
            depth_imbalance: 0.0,
            order_imbalance: 0.0,
            imbalance_direction: Bias::Neutral,
            liquidity_score: 0.0,
            is_liquid: false,
            bid_walls: Vec::new(),
            ask_walls: Vec::new(),
            has_strong_support: false,
            has_strong_resistance: false,
            market_pressure: Bias::Neutral,
            whale_analysis: WhaleAnalysis::empty(),
            has_whale_manipulation: false,
        }
    }

    fn score(&self) -> f64 {
        self.orderbook_score
    }
}

/// Single snapshot orderbook analyzer
#[derive(Debug, Clone)]
pub struct OrderBookAnalyzer {
    config: Arc<AnalysisConfig>,
    whale_tracker: WhaleTracker,
}

impl Default for OrderBookAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(AnalysisConfig::default()))
    }
}

impl OrderBookAnalyzer {
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        let whale_tracker = WhaleTracker::new(Arc::clone(&config));
        OrderBookAnalyzer {
            config,
            whale_tracker,
        }
    }

    /// Analyze an orderbook snapshot
    ///
    /// # Arguments
    /// * `symbol` - Market symbol, used for logging
    /// * `orderbook` - Bids sorted descending, asks ascending
    /// * `current_price` - Last traded price; the mid price is used when not positive
    ///
    /// # Returns
    /// * `OrderBookAnalysis` - The empty result when either side has no levels
    pub fn analyze(
        &self,
        symbol: &str,
        orderbook: &OrderBook,
        current_price: f64,
    ) -> OrderBookAnalysis {
        resolve(
            "orderbook",
            symbol,
            self.try_analyze(orderbook, current_price),
        )
    }

    fn try_analyze(
        &self,
        orderbook: &OrderBook,
        current_price: f64,
    ) -> AnalyzerResult<OrderBookAnalysis> {
        if orderbook.is_empty() {
            let levels = orderbook.bids.len().min(orderbook.asks.len());
            return Err(AnalyzerError::insufficient("orderbook", 1, levels));
        }
        validate_levels(orderbook)?;

        let settings = &self.config.manipulation;
        let best_bid = orderbook.best_bid().unwrap_or(0.0);
        let best_ask = orderbook.best_ask().unwrap_or(0.0);
        let mid_price = orderbook.mid_price().unwrap_or(0.0);
        let spread = orderbook.spread().unwrap_or(0.0);
        let spread_percent = ensure_finite(
            orderbook
                .spread_percent_of(current_price)
                .unwrap_or(EMPTY_SPREAD_PERCENT),
            "spread_percent",
        )?;

        let bid_depth_usd = orderbook.top_bid_value(DEPTH_LEVELS);
        let ask_depth_usd = orderbook.top_ask_value(DEPTH_LEVELS);
        let total_depth_usd = bid_depth_usd + ask_depth_usd;
        let depth_ratio = depth_ratio(bid_depth_usd, ask_depth_usd);
        let depth_imbalance = imbalance(bid_depth_usd, ask_depth_usd);
        let order_imbalance = imbalance(
            orderbook.top_bid_quantity(DEPTH_LEVELS),
            orderbook.top_ask_quantity(DEPTH_LEVELS),
        );
        let imbalance_direction = if depth_imbalance > DEPTH_IMBALANCE_THRESHOLD {
            Bias::Bullish
        } else if depth_imbalance < -DEPTH_IMBALANCE_THRESHOLD {
            Bias::Bearish
        } else {
            Bias::Neutral
        };

        let bid_walls = find_walls(&orderbook.bids, mid_price);
        let ask_walls = find_walls(&orderbook.asks, mid_price);
        let whale_analysis = self.whale_tracker.track(orderbook);

        let market_pressure = market_pressure(depth_imbalance, order_imbalance, &whale_analysis);
        let liquidity_score = liquidity_score(total_depth_usd, spread_percent);
        let orderbook_score = ensure_finite(
            orderbook_score(
                spread_percent,
                total_depth_usd,
                depth_ratio,
                whale_analysis.manipulation_risk,
            ),
            "orderbook_score",
        )?;

        Ok(OrderBookAnalysis {
            orderbook_score,
            best_bid,
            best_ask,
            mid_price,
            spread,
            spread_percent,
            spread_category: SpreadCategory::classify(spread_percent),
            is_tight_spread: spread_percent < settings.max_spread_percent,
            bid_depth_usd,
            ask_depth_usd,
            total_depth_usd,
            depth_ratio,
            depth_imbalance,
            order_imbalance,
            imbalance_direction,
            liquidity_score,
            is_liquid: total_depth_usd >= settings.min_order_book_depth,
            has_strong_support: bid_walls.iter().any(|w| w.strength == WallStrength::Strong),
            has_strong_resistance: ask_walls.iter().any(|w| w.strength == WallStrength::Strong),
            bid_walls,
            ask_walls,
            market_pressure,
            has_whale_manipulation: whale_analysis.is_suspicious,
            whale_analysis,
        })
    }
}

fn validate_levels(orderbook: &OrderBook) -> AnalyzerResult<()> {
    let all_finite = orderbook
        .bids
        .iter()
        .chain(orderbook.asks.iter())
        .all(|l| l.price.is_finite() && l.quantity.is_finite());
    if all_finite {
        Ok(())
    } else {
        Err(AnalyzerError::InvalidInput(
            "orderbook contains non-finite levels".to_string(),
        ))
    }
}

/// Signed imbalance in percent, 0 when both sides are empty
fn imbalance(bid: f64, ask: f64) -> f64 {
    let total = bid + ask;
    if total <= 0.0 {
        return 0.0;
    }
    (bid - ask) / total * 100.0
}

fn depth_ratio(bid: f64, ask: f64) -> f64 {
    let (larger, smaller) = if bid >= ask { (bid, ask) } else { (ask, bid) };
    if larger <= 0.0 {
        return 1.0;
    }
    if smaller <= 0.0 {
        return MAX_DEPTH_RATIO;
    }
    (larger / smaller).min(MAX_DEPTH_RATIO)
}

/// Find walls among the first 20 levels of one side
///
/// The average is taken over the full 20-level window, so a thin book makes
/// the remaining levels stand out more. At most three walls are kept, largest first.
pub fn find_walls(side: &[OrderBookLevel], mid_price: f64) -> Vec<OrderWall> {
    let levels: Vec<&OrderBookLevel> = side.iter().take(WALL_SCAN_LEVELS).collect();
    let total: f64 = levels.iter().map(|l| l.value()).sum();
    let average = total / WALL_SCAN_LEVELS as f64;
    if average <= 0.0 {
        return Vec::new();
    }

    let mut walls: Vec<OrderWall> = levels
        .iter()
        .filter(|l| l.value() > average * WALL_MULTIPLIER)
        .map(|l| {
            let multiple = l.value() / average;
            let strength = if multiple > 10.0 {
                WallStrength::VeryStrong
            } else if multiple > 6.0 {
                WallStrength::Strong
            } else {
                WallStrength::Moderate
            };
            let distance_percent = if mid_price > 0.0 {
                (l.price - mid_price).abs() / mid_price * 100.0
            } else {
                0.0
            };
            OrderWall {
                price: l.price,
                quantity: l.quantity,
                value_usd: l.value(),
                strength,
                distance_percent,
            }
        })
        .collect();

    walls.sort_by(|a, b| {
        b.value_usd
            .partial_cmp(&a.value_usd)
            .unwrap_or(Ordering::Equal)
    });
    walls.truncate(MAX_WALLS);
    walls
}

/// Liquidity score from total depth and spread
pub fn liquidity_score(total_depth_usd: f64, spread_percent: f64) -> f64 {
    let mut score = 50.0;
    if total_depth_usd >= 500_000.0 {
        score += 30.0;
    } else if total_depth_usd >= 200_000.0 {
        score += 20.0;
    } else if total_depth_usd >= 100_000.0 {
        score += 10.0;
    } else if total_depth_usd < 50_000.0 {
        score -= 30.0;
    }

    if spread_percent < 0.1 {
        score += 20.0;
    } else if spread_percent < 0.3 {
        score += 10.0;
    } else if spread_percent > 1.0 {
        score -= 20.0;
    }
    clamp_score(score)
}

/// Orderbook health score
pub fn orderbook_score(
    spread_percent: f64,
    total_depth_usd: f64,
    depth_ratio: f64,
    whale_risk: RiskLevel,
) -> f64 {
    let mut score = 50.0;

    if spread_percent < 0.2 {
        score += 20.0;
    } else if spread_percent > 0.5 {
        score -= 20.0;
    }

    if total_depth_usd >= 300_000.0 {
        score += 20.0;
    } else if total_depth_usd < 100_000.0 {
        score -= 20.0;
    }

    if depth_ratio < 2.0 {
        score += 10.0;
    } else if depth_ratio > 5.0 {
        score -= 10.0;
    }

    score -= match whale_risk {
        RiskLevel::Extreme => 30.0,
        RiskLevel::High => 20.0,
        RiskLevel::Medium => 10.0,
        _ => 0.0,
    };

    clamp_score(score)
}

/// Vote-based market pressure
///
/// Depth imbalance beyond ±10% and quantity imbalance beyond ±5% each cast one vote,
/// whale pressure casts two.
fn market_pressure(depth_imbalance: f64, order_imbalance: f64, whales: &WhaleAnalysis) -> Bias {
    let mut votes: i32 = 0;
    if depth_imbalance > DEPTH_IMBALANCE_THRESHOLD {
        votes += 1;
    } else if depth_imbalance < -DEPTH_IMBALANCE_THRESHOLD {
        votes -= 1;
    }
    if order_imbalance > ORDER_IMBALANCE_THRESHOLD {
        votes += 1;
    } else if order_imbalance < -ORDER_IMBALANCE_THRESHOLD {
        votes -= 1;
    }
    match whales.whale_pressure {
        Bias::Bullish => votes += 2,
        Bias::Bearish => votes -= 2,
        _ => {}
    }

    match votes {
        v if v >= 3 => Bias::StrongBullish,
        v if v >= 1 => Bias::Bullish,
        v if v <= -3 => Bias::StrongBearish,
        v if v <= -1 => Bias::Bearish,
        _ => Bias::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Book around 100 with a 0.15 spread and a fixed quantity per side
    fn create_test_orderbook(bid_quantity: f64, ask_quantity: f64) -> OrderBook {
        let bids = (0..20)
            .map(|i| (99.9 - i as f64 * 0.05, bid_quantity))
            .collect();
        let asks = (0..20)
            .map(|i| (100.05 + i as f64 * 0.05, ask_quantity))
            .collect();
        OrderBook::from_tuples("BTC/USDT".to_string(), bids, asks, 1000)
    }

    #[test]
    fn test_empty_orderbook() {
        let analyzer = OrderBookAnalyzer::default();
        let orderbook = OrderBook::from_tuples("BTC/USDT".into(), vec![], vec![], 0);
        let analysis = analyzer.analyze("BTC/USDT", &orderbook, 100.0);

        assert_eq!(analysis.orderbook_score, 0.0);
        assert_eq!(analysis.spread_percent, 100.0);
        assert_eq!(analysis.spread_category, SpreadCategory::Unknown);
        assert!(!analysis.is_liquid);
        assert_eq!(analysis.market_pressure, Bias::Neutral);
    }

    #[test]
    fn test_deep_balanced_book() {
        let analyzer = OrderBookAnalyzer::default();
        // ~100 * 200 * 10 = 200k per side over top 10 levels
        let analysis = analyzer.analyze("BTC/USDT", &create_test_orderbook(200.0, 200.0), 100.0);

        assert!((analysis.spread_percent - 0.15).abs() < 1e-9);
        assert_eq!(analysis.spread_category, SpreadCategory::Tight);
        assert!(analysis.is_liquid);
        assert!(analysis.is_tight_spread);
        assert!(analysis.depth_ratio < 2.0);
        assert_eq!(analysis.imbalance_direction, Bias::Neutral);
        assert_eq!(analysis.market_pressure, Bias::Neutral);
        assert!(analysis.bid_walls.is_empty());
        // 50 + 20 (spread) + 20 (depth) + 10 (balance)
        assert_eq!(analysis.orderbook_score, 100.0);
    }

    #[test]
    fn test_bid_heavy_book_is_bullish() {
        let analyzer = OrderBookAnalyzer::default();
        let analysis = analyzer.analyze("BTC/USDT", &create_test_orderbook(300.0, 100.0), 100.0);

        assert!(analysis.depth_imbalance > 10.0);
        assert!(analysis.order_imbalance > 5.0);
        assert_eq!(analysis.imbalance_direction, Bias::Bullish);
        assert_eq!(analysis.market_pressure, Bias::Bullish);
    }

    #[test]
    fn test_wall_detection() {
        let mut bids: Vec<OrderBookLevel> = (0..20)
            .map(|i| OrderBookLevel::new(99.0 - i as f64, 10.0))
            .collect();
        bids[4] = OrderBookLevel::new(95.0, 80.0);

        let walls = find_walls(&bids, 100.0);
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].price, 95.0);
        assert_eq!(walls[0].strength, WallStrength::Strong);
        assert!((walls[0].distance_percent - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_liquidity_score_bounds() {
        assert_eq!(liquidity_score(1_000_000.0, 0.05), 100.0);
        assert_eq!(liquidity_score(10_000.0, 2.0), 0.0);
    }

    #[test]
    fn test_whale_risk_penalty() {
        let clean = orderbook_score(0.3, 150_000.0, 1.5, RiskLevel::Low);
        let risky = orderbook_score(0.3, 150_000.0, 1.5, RiskLevel::Extreme);
        assert_eq!(clean - risky, 30.0);
    }
}
