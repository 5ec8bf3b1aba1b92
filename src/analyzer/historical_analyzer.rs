//! 과거 급등락 분석
//!
//! 과거 시계열에서 목표 비율 이상의 급등/급락을 찾고, 각 움직임 직전 구간의
//! 시장 상태(변동성, 거래량, 횡보, 지지/저항 테스트 등)를 수집해 공통 특성과
//! 예측 점수를 산출합니다. 예측 점수는 종합 점수에 보너스로만 반영됩니다.

use crate::analyzer::base::{AnalysisOutput, PriceSeries, percent_change, require_candles, resolve};
use crate::config::{AnalysisConfig, HistoricalConfig};
use crate::error::{AnalyzerResult, ensure_finite};
use crate::indicator::rsi::calculate_rsi;
use crate::indicator::stats::{coefficient_of_variation, max, mean, min, tail};
use crate::model::{Candle, clamp_score};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

const MOMENTUM_WINDOW: usize = 20;
const VOLUME_MOMENTUM_WINDOW: usize = 10;
const RSI_PERIOD: usize = 14;
const RSI_OVERSOLD: f64 = 35.0;
const RSI_OVERBOUGHT: f64 = 65.0;
const VOLUME_INCREASE_RATIO: f64 = 1.2;
const CONSOLIDATION_RANGE_PERCENT: f64 = 5.0;
const LEVEL_TEST_TOLERANCE: f64 = 0.02;
const VOLUME_SPIKE_MULTIPLIER: f64 = 2.0;
const TOP_PATTERNS: usize = 5;
const MIN_PATTERNS_FOR_TRAITS: usize = 2;

/// 움직임 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

/// 직전 구간 변동성 등급
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityCategory {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl VolatilityCategory {
    /// 변동계수(%) 기준 분류 (2 / 4 / 6 / 10 경계)
    pub fn classify(volatility: f64) -> Self {
        if volatility < 2.0 {
            VolatilityCategory::VeryLow
        } else if volatility < 4.0 {
            VolatilityCategory::Low
        } else if volatility < 6.0 {
            VolatilityCategory::Medium
        } else if volatility < 10.0 {
            VolatilityCategory::High
        } else {
            VolatilityCategory::VeryHigh
        }
    }
}

/// 예측 신뢰도 등급
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reliability {
    VeryHigh,
    High,
    Moderate,
    Low,
}

impl Reliability {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Reliability::VeryHigh
        } else if score >= 65.0 {
            Reliability::High
        } else if score >= 50.0 {
            Reliability::Moderate
        } else {
            Reliability::Low
        }
    }
}

/// 움직임 직전 구간의 시장 상태
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreConditions {
    /// 종가 변동계수 (%)
    pub volatility: f64,
    /// 뒤 절반 평균 거래량 / 앞 절반 평균 거래량
    pub volume_change: f64,
    pub volume_increasing: bool,
    /// (최고 종가 - 최저 종가) / 최저 종가 (%)
    pub price_range_percent: f64,
    pub is_consolidating: bool,
    pub support_tests: usize,
    pub resistance_tests: usize,
    pub volume_spikes: usize,
    pub higher_lows: usize,
    pub lower_highs: usize,
    pub momentum_buildup: f64,
    pub liquidity_accumulation: f64,
    pub rsi: f64,
    pub is_oversold: bool,
    pub is_overbought: bool,
}

/// 창 안에서 목표 비율 이상 움직인 시작점 하나
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificantMove {
    pub start_index: usize,
    pub direction: MoveDirection,
    pub move_percent: f64,
}

/// 직전 구간까지 분석된 급등락 하나
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPattern {
    /// 움직임 시작 캔들 인덱스
    pub start_index: usize,
    pub direction: MoveDirection,
    /// 시작 종가 대비 창 안 최대 변화율 (%)
    pub move_percent: f64,
    pub confidence: f64,
    pub volatility_category: VolatilityCategory,
    pub pre_conditions: PreConditions,
}

/// 급등락 통계
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveStatistics {
    pub total_moves: usize,
    pub up_moves: usize,
    pub down_moves: usize,
    pub average_move: f64,
    pub max_move: f64,
    pub average_up_move: f64,
    pub average_down_move: f64,
}

/// 직전 구간 평균
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AveragePreConditions {
    pub volatility: f64,
    pub volume_change: f64,
    pub price_range_percent: f64,
    pub support_tests: f64,
    pub resistance_tests: f64,
    pub volume_spikes: f64,
    pub momentum_buildup: f64,
    pub liquidity_accumulation: f64,
    pub rsi: f64,
    pub consolidating_percent: f64,
    pub volume_increasing_percent: f64,
    pub oversold_percent: f64,
    pub overbought_percent: f64,
}

/// 다수의 움직임에서 반복된 특성
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonTrait {
    pub name: String,
    /// 해당 특성을 보인 움직임 비율 (0-1)
    pub frequency: f64,
}

/// 과거 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalAnalysis {
    pub predictive_score: f64,
    pub has_historical_patterns: bool,
    /// 발견된 전체 움직임 수
    pub patterns_found: usize,
    /// 직전 구간이 충분해 특성까지 분석된 움직임 수
    pub analyzed_patterns: usize,
    pub reliability: Reliability,
    pub statistics: MoveStatistics,
    pub common_characteristics: Vec<CommonTrait>,
    pub top_patterns: Vec<HistoricalPattern>,
    pub average_pre_conditions: AveragePreConditions,
}

impl AnalysisOutput for HistoricalAnalysis {
    fn empty() -> Self {
        HistoricalAnalysis {
            predictive_score: 0.0,
            has_historical_patterns: false,
            patterns_found: 0,
            analyzed_patterns: 0,
            reliability: Reliability::Low,
            statistics: MoveStatistics::default(),
            common_characteristics: Vec::new(),
            top_patterns: Vec::new(),
            average_pre_conditions: AveragePreConditions::default(),
        }
    }

    fn score(&self) -> f64 {
        self.predictive_score
    }
}

/// 과거 급등락 분석기
#[derive(Debug, Clone)]
pub struct HistoricalAnalyzer {
    config: Arc<AnalysisConfig>,
}

impl Default for HistoricalAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(AnalysisConfig::default()))
    }
}

impl HistoricalAnalyzer {
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        HistoricalAnalyzer { config }
    }

    /// 과거 시계열 분석 (시간순, 최소 `min_data_points`개)
    pub fn analyze<C: Candle>(&self, symbol: &str, candles: &[C]) -> HistoricalAnalysis {
        resolve("historical", symbol, self.try_analyze(candles))
    }

    fn try_analyze<C: Candle>(&self, candles: &[C]) -> AnalyzerResult<HistoricalAnalysis> {
        let settings = &self.config.historical;
        require_candles("historical", candles, settings.min_data_points)?;
        let series = PriceSeries::from_candles(candles)?;

        let moves = find_significant_moves(&series.closes, settings);
        if moves.is_empty() {
            return Ok(HistoricalAnalysis::empty());
        }
        let patterns: Vec<HistoricalPattern> = moves
            .iter()
            .filter_map(|m| analyze_move(&series, m, settings.pre_window))
            .collect();

        let common_characteristics = common_characteristics(&patterns);
        let average_confidence = mean(&patterns.iter().map(|p| p.confidence).collect::<Vec<_>>());
        let predictive_score = ensure_finite(
            predictive_score(patterns.len(), common_characteristics.len(), average_confidence),
            "predictive_score",
        )?;

        let mut top_patterns = patterns.clone();
        top_patterns.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        top_patterns.truncate(TOP_PATTERNS);

        Ok(HistoricalAnalysis {
            predictive_score,
            has_historical_patterns: true,
            patterns_found: moves.len(),
            analyzed_patterns: patterns.len(),
            reliability: Reliability::from_score(predictive_score),
            statistics: statistics(&moves),
            common_characteristics,
            top_patterns,
            average_pre_conditions: average_pre_conditions(&patterns),
        })
    }
}

/// 목표 비율 이상 움직임 탐색
///
/// 모든 시작점에서 시작 종가를 포함한 `move_window`개 종가의 최고가/최저가까지 변화를 봅니다.
/// 겹치는 창도 각각 집계하며, 한 시작점에서 상승과 하락이 모두 나올 수 있습니다.
fn find_significant_moves(closes: &[f64], settings: &HistoricalConfig) -> Vec<SignificantMove> {
    let window = settings.move_window;
    if window == 0 || closes.len() <= window {
        return Vec::new();
    }

    let mut moves = Vec::new();
    for start_index in 0..closes.len() - window {
        let start = closes[start_index];
        let segment = &closes[start_index..start_index + window];
        let up_move = percent_change(start, max(segment).unwrap_or(start));
        let down_move = -percent_change(start, min(segment).unwrap_or(start));

        for (direction, move_percent) in [(MoveDirection::Up, up_move), (MoveDirection::Down, down_move)] {
            if move_percent >= settings.target_move_percent {
                moves.push(SignificantMove {
                    start_index,
                    direction,
                    move_percent,
                });
            }
        }
    }
    moves
}

/// 직전 `pre_window`개 캔들로 움직임 분석 (직전 구간이 모자라면 None)
fn analyze_move(series: &PriceSeries, m: &SignificantMove, pre_window: usize) -> Option<HistoricalPattern> {
    let from = m.start_index.checked_sub(pre_window)?;
    let pre_conditions = pre_conditions(series, from, m.start_index);
    Some(HistoricalPattern {
        start_index: m.start_index,
        direction: m.direction,
        move_percent: m.move_percent,
        confidence: pattern_confidence(&pre_conditions),
        volatility_category: VolatilityCategory::classify(pre_conditions.volatility),
        pre_conditions,
    })
}

/// `[from, to)` 구간 시장 상태
fn pre_conditions(series: &PriceSeries, from: usize, to: usize) -> PreConditions {
    let closes = &series.closes[from..to];
    let highs = &series.highs[from..to];
    let lows = &series.lows[from..to];
    let volumes = &series.volumes[from..to];

    let volatility = coefficient_of_variation(closes) * 100.0;

    let (first_half, second_half) = volumes.split_at(volumes.len() / 2);
    let first_volume = mean(first_half);
    let volume_change = if first_volume > 0.0 {
        mean(second_half) / first_volume
    } else {
        1.0
    };

    let price_range_percent = percent_change(
        min(closes).unwrap_or(0.0),
        max(closes).unwrap_or(0.0),
    );
    let lowest_low = min(lows).unwrap_or(0.0);
    let highest_high = max(highs).unwrap_or(0.0);
    let support_tests = lows
        .iter()
        .filter(|l| **l <= lowest_low * (1.0 + LEVEL_TEST_TOLERANCE))
        .count();
    let resistance_tests = highs
        .iter()
        .filter(|h| **h >= highest_high * (1.0 - LEVEL_TEST_TOLERANCE))
        .count();

    let average_volume = mean(volumes);
    let volume_spikes = volumes
        .iter()
        .filter(|v| **v > average_volume * VOLUME_SPIKE_MULTIPLIER)
        .count();
    let higher_lows = lows.windows(3).filter(|w| w[0] < w[1] && w[1] < w[2]).count();
    let lower_highs = highs.windows(3).filter(|w| w[0] > w[1] && w[1] > w[2]).count();

    let momentum_buildup = momentum_buildup(closes, volumes);

    let volume_growth = (volume_change - 1.0).min(1.0);
    let liquidity_accumulation =
        clamp_score((1.0 - coefficient_of_variation(volumes)) * 50.0 + volume_growth * 50.0);

    let rsi = calculate_rsi(closes, RSI_PERIOD);

    PreConditions {
        volatility,
        volume_change,
        volume_increasing: volume_change > VOLUME_INCREASE_RATIO,
        price_range_percent,
        is_consolidating: price_range_percent < CONSOLIDATION_RANGE_PERCENT,
        support_tests,
        resistance_tests,
        volume_spikes,
        higher_lows,
        lower_highs,
        momentum_buildup,
        liquidity_accumulation,
        rsi,
        is_oversold: rsi < RSI_OVERSOLD,
        is_overbought: rsi > RSI_OVERBOUGHT,
    }
}

/// 최근 20개 종가 변화율과 최근 10개 / 그 직전 10개 거래량 변화율의 평균 (0-100)
///
/// 구간이 20개보다 짧으면 0입니다.
fn momentum_buildup(closes: &[f64], volumes: &[f64]) -> f64 {
    if closes.len() < MOMENTUM_WINDOW || volumes.len() < MOMENTUM_WINDOW {
        return 0.0;
    }
    let recent_closes = tail(closes, MOMENTUM_WINDOW);
    let price_momentum = percent_change(recent_closes[0], recent_closes[MOMENTUM_WINDOW - 1]);

    let (older, recent) = tail(volumes, MOMENTUM_WINDOW).split_at(VOLUME_MOMENTUM_WINDOW);
    let older_volume = mean(older);
    let volume_momentum = if older_volume > 0.0 {
        (mean(recent) / older_volume - 1.0) * 100.0
    } else {
        0.0
    };
    clamp_score((price_momentum.abs() + volume_momentum) / 2.0)
}

fn pattern_confidence(pre: &PreConditions) -> f64 {
    let mut confidence = 50.0;
    if pre.is_consolidating && pre.volatility < 3.0 {
        confidence += 20.0;
    }
    if pre.volume_increasing {
        confidence += 15.0;
    }
    if pre.support_tests >= 3 {
        confidence += 15.0;
    }
    if pre.momentum_buildup > 50.0 {
        confidence += 10.0;
    }
    clamp_score(confidence)
}

fn frequency(patterns: &[HistoricalPattern], predicate: impl Fn(&PreConditions) -> bool) -> f64 {
    if patterns.is_empty() {
        return 0.0;
    }
    let hits = patterns.iter().filter(|p| predicate(&p.pre_conditions)).count();
    hits as f64 / patterns.len() as f64
}

/// 움직임 직전에 반복적으로 나타난 특성 (움직임 2개 이상 필요)
fn common_characteristics(patterns: &[HistoricalPattern]) -> Vec<CommonTrait> {
    if patterns.len() < MIN_PATTERNS_FOR_TRAITS {
        return Vec::new();
    }

    let candidates: [(&str, f64, f64); 5] = [
        (
            "consolidation_before_move",
            frequency(patterns, |p| p.is_consolidating),
            0.7,
        ),
        (
            "volume_increase_before_move",
            frequency(patterns, |p| p.volume_increasing),
            0.6,
        ),
        (
            "low_volatility_before_move",
            frequency(patterns, |p| p.volatility < 5.0),
            0.6,
        ),
        (
            "support_tested_before_move",
            frequency(patterns, |p| p.support_tests >= 3),
            0.5,
        ),
        (
            "momentum_buildup_before_move",
            frequency(patterns, |p| p.momentum_buildup > 60.0),
            0.5,
        ),
    ];

    candidates
        .into_iter()
        .filter(|(_, freq, threshold)| freq >= threshold)
        .map(|(name, frequency, _)| CommonTrait {
            name: name.to_string(),
            frequency,
        })
        .collect()
}

/// 예측 점수 (패턴이 없으면 0)
pub fn predictive_score(pattern_count: usize, trait_count: usize, average_confidence: f64) -> f64 {
    if pattern_count == 0 {
        return 0.0;
    }
    let mut score = 50.0;
    if pattern_count >= 10 {
        score += 20.0;
    } else if pattern_count >= 5 {
        score += 10.0;
    }
    score += trait_count as f64 * 5.0;
    score += (average_confidence - 50.0) * 0.5;
    clamp_score(score)
}

fn statistics(moves: &[SignificantMove]) -> MoveStatistics {
    let percents = |direction: Option<MoveDirection>| -> Vec<f64> {
        moves
            .iter()
            .filter(|m| direction.is_none_or(|d| m.direction == d))
            .map(|m| m.move_percent)
            .collect()
    };
    let all = percents(None);
    let up = percents(Some(MoveDirection::Up));
    let down = percents(Some(MoveDirection::Down));

    MoveStatistics {
        total_moves: moves.len(),
        up_moves: up.len(),
        down_moves: down.len(),
        average_move: mean(&all),
        max_move: max(&all).unwrap_or(0.0),
        average_up_move: mean(&up),
        average_down_move: mean(&down),
    }
}

fn average_pre_conditions(patterns: &[HistoricalPattern]) -> AveragePreConditions {
    let average = |f: fn(&PreConditions) -> f64| {
        mean(
            &patterns
                .iter()
                .map(|p| f(&p.pre_conditions))
                .collect::<Vec<_>>(),
        )
    };

    AveragePreConditions {
        volatility: average(|p| p.volatility),
        volume_change: average(|p| p.volume_change),
        price_range_percent: average(|p| p.price_range_percent),
        support_tests: average(|p| p.support_tests as f64),
        resistance_tests: average(|p| p.resistance_tests as f64),
        volume_spikes: average(|p| p.volume_spikes as f64),
        momentum_buildup: average(|p| p.momentum_buildup),
        liquidity_accumulation: average(|p| p.liquidity_accumulation),
        rsi: average(|p| p.rsi),
        consolidating_percent: frequency(patterns, |p| p.is_consolidating) * 100.0,
        volume_increasing_percent: frequency(patterns, |p| p.volume_increasing) * 100.0,
        oversold_percent: frequency(patterns, |p| p.is_oversold) * 100.0,
        overbought_percent: frequency(patterns, |p| p.is_overbought) * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OhlcvCandle;

    /// 60개 횡보 후 24개 동안 1.5%씩 상승, 이후 다시 횡보
    fn breakout_candles() -> Vec<OhlcvCandle> {
        let mut closes: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 100.0 } else { 100.5 }).collect();
        let mut price = 100.5;
        for _ in 0..24 {
            price *= 1.015;
            closes.push(price);
        }
        closes.extend(std::iter::repeat_n(price, 40));

        closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                let volume = if i < 30 { 1000.0 } else { 1500.0 };
                OhlcvCandle::new(i as i64 * 60_000, *close, close + 0.2, close - 0.2, *close, volume)
            })
            .collect()
    }

    #[test]
    fn test_insufficient_data() {
        let candles: Vec<OhlcvCandle> = breakout_candles().into_iter().take(50).collect();
        let analysis = HistoricalAnalyzer::default().analyze("BTC/USDT", &candles);
        assert_eq!(analysis, HistoricalAnalysis::empty());
    }

    #[test]
    fn test_breakout_counts_every_start_in_window() {
        let analysis = HistoricalAnalyzer::default().analyze("BTC/USDT", &breakout_candles());

        assert!(analysis.has_historical_patterns);
        // 시작점 48..=70, 그중 직전 50개가 있는 50..=70만 분석
        assert_eq!(analysis.statistics.total_moves, 23);
        assert_eq!(analysis.statistics.up_moves, 23);
        assert_eq!(analysis.statistics.down_moves, 0);
        assert_eq!(analysis.patterns_found, 23);
        assert_eq!(analysis.analyzed_patterns, 21);

        let pattern = &analysis.top_patterns[0];
        assert_eq!(pattern.direction, MoveDirection::Up);
        assert!(pattern.start_index >= 50);
        assert!(pattern.move_percent >= 20.0);
        assert!(pattern.pre_conditions.is_consolidating);
        assert!(pattern.pre_conditions.volume_increasing);
    }

    #[test]
    fn test_move_window_includes_start_close() {
        // 24개 창은 시작 종가 포함 인덱스 0..=23
        let mut closes = vec![100.0];
        closes.extend(vec![110.0; 23]);
        closes.extend(vec![130.0; 16]);
        let settings = HistoricalConfig::default();
        assert!(find_significant_moves(&closes, &settings).is_empty());

        closes[23] = 130.0;
        let moves = find_significant_moves(&closes, &settings);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].start_index, 0);
        assert_eq!(moves[0].direction, MoveDirection::Up);
        assert!((moves[0].move_percent - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_level_tests_use_lows_and_highs() {
        let mut lows = vec![99.5; 50];
        lows[10] = 95.0;
        let mut highs = vec![101.0; 50];
        highs[20] = 110.0;
        let series = PriceSeries {
            opens: vec![100.0; 50],
            highs,
            lows,
            closes: vec![100.0; 50],
            volumes: vec![1000.0; 50],
        };

        let pre = pre_conditions(&series, 0, 50);
        assert_eq!(pre.support_tests, 1);
        assert_eq!(pre.resistance_tests, 1);
        assert!(pre.is_consolidating);
    }

    #[test]
    fn test_volume_momentum_compares_previous_ten() {
        // 마지막 20개 거래량이 모두 같으면 거래량 모멘텀은 0
        let mut volumes = vec![1000.0; 30];
        volumes.extend(vec![4000.0; 20]);
        assert_eq!(momentum_buildup(&[100.0; 50], &volumes), 0.0);

        let mut volumes = vec![1000.0; 40];
        volumes.extend(vec![3000.0; 10]);
        // (0 + 200) / 2 -> 100으로 제한
        assert_eq!(momentum_buildup(&[100.0; 50], &volumes), 100.0);
        assert_eq!(momentum_buildup(&[100.0; 10], &[1000.0; 10]), 0.0);
    }

    #[test]
    fn test_zero_pre_window_does_not_panic() {
        let mut config = AnalysisConfig::default();
        config.historical.pre_window = 0;
        let analyzer = HistoricalAnalyzer::new(Arc::new(config));

        let analysis = analyzer.analyze("BTC/USDT", &breakout_candles());
        assert!(analysis.has_historical_patterns);
        assert_eq!(analysis.analyzed_patterns, analysis.patterns_found);
        assert!((0.0..=100.0).contains(&analysis.predictive_score));
    }

    #[test]
    fn test_flat_history_has_no_patterns() {
        let candles: Vec<OhlcvCandle> = (0..150)
            .map(|i| OhlcvCandle::new(i * 60_000, 100.0, 100.0, 100.0, 100.0, 1000.0))
            .collect();
        let analysis = HistoricalAnalyzer::default().analyze("BTC/USDT", &candles);
        assert!(!analysis.has_historical_patterns);
        assert_eq!(analysis.predictive_score, 0.0);
        assert_eq!(analysis.reliability, Reliability::Low);
    }

    #[test]
    fn test_predictive_score() {
        assert_eq!(predictive_score(0, 3, 90.0), 0.0);
        // 50 + 10 + 2·5 + (70 - 50)·0.5
        assert_eq!(predictive_score(6, 2, 70.0), 80.0);
        assert_eq!(predictive_score(12, 5, 100.0), 100.0);
    }

    #[test]
    fn test_reliability_tiers() {
        assert_eq!(Reliability::from_score(80.0), Reliability::VeryHigh);
        assert_eq!(Reliability::from_score(70.0), Reliability::High);
        assert_eq!(Reliability::from_score(50.0), Reliability::Moderate);
        assert_eq!(Reliability::from_score(49.0), Reliability::Low);
    }

    #[test]
    fn test_volatility_category() {
        assert_eq!(VolatilityCategory::classify(1.0), VolatilityCategory::VeryLow);
        assert_eq!(VolatilityCategory::classify(5.0), VolatilityCategory::Medium);
        assert_eq!(VolatilityCategory::classify(12.0), VolatilityCategory::VeryHigh);
    }
}
