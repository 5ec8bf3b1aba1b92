use crate::analyzer::base::{AnalysisOutput, PriceSeries, require_candles, resolve};
use crate::config::{AnalysisConfig, PatternConfidence};
use crate::error::{AnalyzerResult, ensure_finite};
use crate::indicator::extrema::{find_peaks, find_valleys};
use crate::indicator::regression::linear_slope;
use crate::indicator::stats::{mean, std_dev, tail};
use crate::model::{Bias, Candle, clamp_score};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 패턴 분석에 필요한 최소 캔들 수
pub const MIN_PATTERN_CANDLES: usize = 50;

const DOUBLE_WINDOW: usize = 30;
const HEAD_SHOULDERS_WINDOW: usize = 40;
const TRIANGLE_WINDOW: usize = 20;
const FLAG_WINDOW: usize = 30;
const WEDGE_WINDOW: usize = 20;
const CHANNEL_WINDOW: usize = 30;
const CANDLESTICK_WINDOW: usize = 10;
const PEAK_PROMINENCE: usize = 2;

const DOUBLE_SIMILARITY: f64 = 0.03;
const SHOULDER_SIMILARITY: f64 = 0.05;
const FLAT_SLOPE: f64 = 0.001;
const STEEP_SLOPE: f64 = 0.002;
const SYMMETRICAL_TRIANGLE_CONFIDENCE: f64 = 0.70;
const HORIZONTAL_CHANNEL_CONFIDENCE: f64 = 0.60;

/// 패턴 성격
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Reversal,
    Continuation,
    Trend,
    Range,
    Indecision,
}

/// 탐지된 차트/캔들 패턴
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub name: String,
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    /// Bullish, Bearish, Neutral 중 하나
    pub direction: Bias,
    /// 0-1 신뢰도
    pub confidence: f64,
    pub description: String,
}

impl Pattern {
    fn new(
        name: &str,
        pattern_type: PatternType,
        direction: Bias,
        confidence: f64,
        description: &str,
    ) -> Self {
        Pattern {
            name: name.to_string(),
            pattern_type,
            direction,
            confidence,
            description: description.to_string(),
        }
    }
}

/// 패턴 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub pattern_score: f64,
    pub patterns_found: usize,
    pub has_patterns: bool,
    pub patterns: Vec<Pattern>,
    pub strongest_pattern: Option<Pattern>,
    pub bullish_patterns: usize,
    pub bearish_patterns: usize,
}

impl AnalysisOutput for PatternAnalysis {
    fn empty() -> Self {
        PatternAnalysis {
            pattern_score: 50.0,
            patterns_found: 0,
            has_patterns: false,
            patterns: Vec::new(),
            strongest_pattern: None,
            bullish_patterns: 0,
            bearish_patterns: 0,
        }
    }

    fn score(&self) -> f64 {
        self.pattern_score
    }
}

/// 차트 패턴 분석기
///
/// 이중 천장/바닥, 헤드앤숄더, 삼각형, 깃발, 쐐기, 채널과
/// 최근 캔들 패턴을 탐지합니다.
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    config: Arc<AnalysisConfig>,
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(AnalysisConfig::default()))
    }
}

impl PatternAnalyzer {
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        PatternAnalyzer { config }
    }

    /// 캔들 시계열 패턴 분석 (시간순)
    pub fn analyze<C: Candle>(&self, symbol: &str, candles: &[C]) -> PatternAnalysis {
        resolve("pattern", symbol, self.try_analyze(candles))
    }

    fn try_analyze<C: Candle>(&self, candles: &[C]) -> AnalyzerResult<PatternAnalysis> {
        require_candles("pattern", candles, MIN_PATTERN_CANDLES)?;
        let series = PriceSeries::from_candles(candles)?;
        let confidence = &self.config.pattern_confidence;

        let chart_patterns = [
            detect_double_top(&series.highs, confidence),
            detect_double_bottom(&series.lows, confidence),
            detect_head_shoulders(&series.highs, confidence),
            detect_inverse_head_shoulders(&series.lows, confidence),
            detect_triangle(&series.highs, &series.lows, confidence),
            detect_flag(&series.closes, confidence),
            detect_wedge(&series.highs, &series.lows, confidence),
            detect_channel(&series.highs, &series.lows, confidence),
        ];
        let mut patterns: Vec<Pattern> = chart_patterns.into_iter().flatten().collect();
        patterns.extend(detect_candlestick_patterns(tail(candles, CANDLESTICK_WINDOW)));

        let strongest_pattern = strongest(&patterns).cloned();
        let pattern_score = ensure_finite(
            pattern_score(&patterns, strongest_pattern.as_ref()),
            "pattern_score",
        )?;

        Ok(PatternAnalysis {
            pattern_score,
            patterns_found: patterns.len(),
            has_patterns: !patterns.is_empty(),
            bullish_patterns: count_direction(&patterns, Bias::Bullish),
            bearish_patterns: count_direction(&patterns, Bias::Bearish),
            strongest_pattern,
            patterns,
        })
    }
}

fn count_direction(patterns: &[Pattern], direction: Bias) -> usize {
    patterns.iter().filter(|p| p.direction == direction).count()
}

/// 신뢰도가 가장 높은 패턴 (동률이면 먼저 탐지된 패턴)
fn strongest(patterns: &[Pattern]) -> Option<&Pattern> {
    patterns.iter().fold(None, |best: Option<&Pattern>, p| match best {
        Some(b) if b.confidence >= p.confidence => Some(b),
        _ => Some(p),
    })
}

/// 패턴 점수
///
/// 50에서 시작해 가장 강한 패턴 방향으로 신뢰도·30을 더하거나 빼고,
/// 강세/약세 패턴 수 차이마다 5점을 조정합니다. 패턴이 없으면 50입니다.
pub fn pattern_score(patterns: &[Pattern], strongest: Option<&Pattern>) -> f64 {
    if patterns.is_empty() {
        return 50.0;
    }

    let mut score = 50.0;
    if let Some(pattern) = strongest {
        match pattern.direction {
            Bias::Bullish => score += pattern.confidence * 30.0,
            Bias::Bearish => score -= pattern.confidence * 30.0,
            _ => {}
        }
    }

    let bullish = count_direction(patterns, Bias::Bullish) as f64;
    let bearish = count_direction(patterns, Bias::Bearish) as f64;
    score += (bullish - bearish) * 5.0;

    clamp_score(score)
}

/// 최근 30개 고가의 마지막 두 고점이 3% 이내면 이중 천장
fn detect_double_top(highs: &[f64], confidence: &PatternConfidence) -> Option<Pattern> {
    let (first, second) = last_two_extremes(highs, DOUBLE_WINDOW, find_peaks)?;
    let similarity = relative_difference(first, second)?;
    (similarity < DOUBLE_SIMILARITY).then(|| {
        Pattern::new(
            "double_top",
            PatternType::Reversal,
            Bias::Bearish,
            confidence.double_top * (1.0 - similarity),
            "Double Top - 하락 반전",
        )
    })
}

/// 최근 30개 저가의 마지막 두 저점이 3% 이내면 이중 바닥
fn detect_double_bottom(lows: &[f64], confidence: &PatternConfidence) -> Option<Pattern> {
    let (first, second) = last_two_extremes(lows, DOUBLE_WINDOW, find_valleys)?;
    let similarity = relative_difference(first, second)?;
    (similarity < DOUBLE_SIMILARITY).then(|| {
        Pattern::new(
            "double_bottom",
            PatternType::Reversal,
            Bias::Bullish,
            confidence.double_bottom * (1.0 - similarity),
            "Double Bottom - 상승 반전",
        )
    })
}

fn detect_head_shoulders(highs: &[f64], confidence: &PatternConfidence) -> Option<Pattern> {
    let (left, head, right) = last_three_extremes(highs, HEAD_SHOULDERS_WINDOW, find_peaks)?;
    if !(head > left && head > right) {
        return None;
    }
    let similarity = relative_difference(left, right)?;
    (similarity < SHOULDER_SIMILARITY).then(|| {
        Pattern::new(
            "head_shoulders",
            PatternType::Reversal,
            Bias::Bearish,
            confidence.head_shoulders * (1.0 - similarity),
            "Head and Shoulders - 하락 반전",
        )
    })
}

fn detect_inverse_head_shoulders(lows: &[f64], confidence: &PatternConfidence) -> Option<Pattern> {
    let (left, head, right) = last_three_extremes(lows, HEAD_SHOULDERS_WINDOW, find_valleys)?;
    if !(head < left && head < right) {
        return None;
    }
    let similarity = relative_difference(left, right)?;
    (similarity < SHOULDER_SIMILARITY).then(|| {
        Pattern::new(
            "inverse_head_shoulders",
            PatternType::Reversal,
            Bias::Bullish,
            confidence.inverse_head_shoulders * (1.0 - similarity),
            "Inverse Head and Shoulders - 상승 반전",
        )
    })
}

/// 최근 20개 고가/저가 기울기로 삼각형 분류
fn detect_triangle(highs: &[f64], lows: &[f64], confidence: &PatternConfidence) -> Option<Pattern> {
    let (high_slope, low_slope) = window_slopes(highs, lows, TRIANGLE_WINDOW)?;

    if high_slope.abs() < FLAT_SLOPE && low_slope > STEEP_SLOPE {
        return Some(Pattern::new(
            "ascending_triangle",
            PatternType::Continuation,
            Bias::Bullish,
            confidence.triangle,
            "Ascending Triangle - 상승 지속",
        ));
    }
    if high_slope < -STEEP_SLOPE && low_slope.abs() < FLAT_SLOPE {
        return Some(Pattern::new(
            "descending_triangle",
            PatternType::Continuation,
            Bias::Bearish,
            confidence.triangle,
            "Descending Triangle - 하락 지속",
        ));
    }
    if high_slope < -FLAT_SLOPE && low_slope > FLAT_SLOPE {
        return Some(Pattern::new(
            "symmetrical_triangle",
            PatternType::Continuation,
            Bias::Neutral,
            SYMMETRICAL_TRIANGLE_CONFIDENCE,
            "Symmetrical Triangle - 돌파 대기",
        ));
    }
    None
}

/// 최근 30개 종가 중 앞 15개는 5% 이상 움직이고 뒤 15개는 변동성 3% 미만
fn detect_flag(closes: &[f64], confidence: &PatternConfidence) -> Option<Pattern> {
    if closes.len() < FLAG_WINDOW {
        return None;
    }
    let recent = tail(closes, FLAG_WINDOW);
    let (pole, flag) = recent.split_at(FLAG_WINDOW / 2);

    let pole_start = pole[0];
    if pole_start == 0.0 {
        return None;
    }
    let pole_change = (pole[pole.len() - 1] - pole_start) / pole_start * 100.0;
    let flag_mean = mean(flag);
    if flag_mean == 0.0 {
        return None;
    }
    let flag_volatility = std_dev(flag) / flag_mean * 100.0;
    if flag_volatility >= 3.0 {
        return None;
    }

    if pole_change > 5.0 {
        Some(Pattern::new(
            "bull_flag",
            PatternType::Continuation,
            Bias::Bullish,
            confidence.flag,
            "Bull Flag - 상승 지속",
        ))
    } else if pole_change < -5.0 {
        Some(Pattern::new(
            "bear_flag",
            PatternType::Continuation,
            Bias::Bearish,
            confidence.flag,
            "Bear Flag - 하락 지속",
        ))
    } else {
        None
    }
}

/// 고가/저가 기울기가 같은 방향이고 저가 기울기가 1.2배 이상 가파르면 쐐기
fn detect_wedge(highs: &[f64], lows: &[f64], confidence: &PatternConfidence) -> Option<Pattern> {
    let (high_slope, low_slope) = window_slopes(highs, lows, WEDGE_WINDOW)?;

    if high_slope > 0.0 && low_slope > 0.0 && low_slope > high_slope * 1.2 {
        return Some(Pattern::new(
            "rising_wedge",
            PatternType::Reversal,
            Bias::Bearish,
            confidence.wedge,
            "Rising Wedge - 하락 반전",
        ));
    }
    if high_slope < 0.0 && low_slope < 0.0 && low_slope.abs() > high_slope.abs() * 1.2 {
        return Some(Pattern::new(
            "falling_wedge",
            PatternType::Reversal,
            Bias::Bullish,
            confidence.wedge,
            "Falling Wedge - 상승 반전",
        ));
    }
    None
}

/// 최근 30개 고가/저가 기울기가 평행하면 채널
fn detect_channel(highs: &[f64], lows: &[f64], confidence: &PatternConfidence) -> Option<Pattern> {
    let (high_slope, low_slope) = window_slopes(highs, lows, CHANNEL_WINDOW)?;
    if (high_slope - low_slope).abs() >= FLAT_SLOPE {
        return None;
    }

    let pattern = if high_slope > STEEP_SLOPE {
        Pattern::new(
            "ascending_channel",
            PatternType::Trend,
            Bias::Bullish,
            confidence.channel,
            "Ascending Channel - 상승 추세",
        )
    } else if high_slope < -STEEP_SLOPE {
        Pattern::new(
            "descending_channel",
            PatternType::Trend,
            Bias::Bearish,
            confidence.channel,
            "Descending Channel - 하락 추세",
        )
    } else {
        Pattern::new(
            "horizontal_channel",
            PatternType::Range,
            Bias::Neutral,
            HORIZONTAL_CHANNEL_CONFIDENCE,
            "Horizontal Channel - 박스권",
        )
    };
    Some(pattern)
}

/// 최근 캔들 패턴 (장악형, 망치형/교수형, 도지, 샛별/석별)
fn detect_candlestick_patterns<C: Candle>(candles: &[C]) -> Vec<Pattern> {
    if candles.len() < 3 {
        return Vec::new();
    }
    let n = candles.len();
    let last = &candles[n - 1];

    [
        detect_engulfing(&candles[n - 2], last),
        detect_hammer(last),
        detect_doji(last),
        detect_star(&candles[n - 3], &candles[n - 2], last),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn detect_engulfing<C: Candle>(prev: &C, curr: &C) -> Option<Pattern> {
    if prev.is_bearish()
        && curr.is_bullish()
        && curr.open_price() <= prev.close_price()
        && curr.close_price() >= prev.open_price()
    {
        return Some(Pattern::new(
            "bullish_engulfing",
            PatternType::Reversal,
            Bias::Bullish,
            0.75,
            "Bullish Engulfing - 반전 신호",
        ));
    }
    if prev.is_bullish()
        && curr.is_bearish()
        && curr.open_price() >= prev.close_price()
        && curr.close_price() <= prev.open_price()
    {
        return Some(Pattern::new(
            "bearish_engulfing",
            PatternType::Reversal,
            Bias::Bearish,
            0.75,
            "Bearish Engulfing - 반전 신호",
        ));
    }
    None
}

fn detect_hammer<C: Candle>(candle: &C) -> Option<Pattern> {
    let body = candle.body();
    if !(body > 0.0 && candle.lower_wick() > body * 2.0 && candle.upper_wick() < body * 0.5) {
        return None;
    }

    if candle.is_bullish() {
        Some(Pattern::new(
            "hammer",
            PatternType::Reversal,
            Bias::Bullish,
            0.70,
            "Hammer - 상승 반전",
        ))
    } else {
        Some(Pattern::new(
            "hanging_man",
            PatternType::Reversal,
            Bias::Bearish,
            0.65,
            "Hanging Man - 하락 반전",
        ))
    }
}

fn detect_doji<C: Candle>(candle: &C) -> Option<Pattern> {
    let range = candle.range();
    (range > 0.0 && candle.body() / range < 0.1).then(|| {
        Pattern::new(
            "doji",
            PatternType::Indecision,
            Bias::Neutral,
            0.60,
            "Doji - 방향성 부재",
        )
    })
}

fn detect_star<C: Candle>(first: &C, second: &C, third: &C) -> Option<Pattern> {
    if second.body() >= first.body() * 0.3 {
        return None;
    }
    if first.is_bearish() && third.is_bullish() {
        return Some(Pattern::new(
            "morning_star",
            PatternType::Reversal,
            Bias::Bullish,
            0.75,
            "Morning Star - 상승 반전",
        ));
    }
    if first.is_bullish() && third.is_bearish() {
        return Some(Pattern::new(
            "evening_star",
            PatternType::Reversal,
            Bias::Bearish,
            0.75,
            "Evening Star - 하락 반전",
        ));
    }
    None
}

/// |a - b| / a (a가 0이면 None)
fn relative_difference(a: f64, b: f64) -> Option<f64> {
    if a == 0.0 {
        return None;
    }
    Some((a - b).abs() / a)
}

fn last_two_extremes(
    values: &[f64],
    window: usize,
    finder: fn(&[f64], usize) -> Vec<usize>,
) -> Option<(f64, f64)> {
    if values.len() < window {
        return None;
    }
    let recent = tail(values, window);
    match finder(recent, PEAK_PROMINENCE).as_slice() {
        [.., a, b] => Some((recent[*a], recent[*b])),
        _ => None,
    }
}

fn last_three_extremes(
    values: &[f64],
    window: usize,
    finder: fn(&[f64], usize) -> Vec<usize>,
) -> Option<(f64, f64, f64)> {
    if values.len() < window {
        return None;
    }
    let recent = tail(values, window);
    match finder(recent, PEAK_PROMINENCE).as_slice() {
        [.., a, b, c] => Some((recent[*a], recent[*b], recent[*c])),
        _ => None,
    }
}

/// 최근 `window`개 고가/저가 회귀 기울기
///
/// 창 안의 가격 범위가 0이면 기울기 패턴을 만들지 않도록 None을 반환합니다.
fn window_slopes(highs: &[f64], lows: &[f64], window: usize) -> Option<(f64, f64)> {
    if highs.len() < window || lows.len() < window {
        return None;
    }
    let recent_highs = tail(highs, window);
    let recent_lows = tail(lows, window);

    let top = recent_highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bottom = recent_lows.iter().copied().fold(f64::INFINITY, f64::min);
    if top <= bottom {
        return None;
    }
    Some((linear_slope(recent_highs), linear_slope(recent_lows)))
}
