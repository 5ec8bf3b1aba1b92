use crate::analyzer::base::{AnalysisOutput, PriceSeries, require_candles, resolve};
use crate::config::{AnalysisConfig, RsiLevels};
use crate::error::{AnalyzerResult, ensure_finite};
use crate::indicator::atr::calculate_atr;
use crate::indicator::bband::{BandPosition, BollingerBands};
use crate::indicator::levels::support_resistance;
use crate::indicator::ma::calculate_ema;
use crate::indicator::macd::{Macd, MacdCrossover};
use crate::indicator::regression::{TrendState, detect_trend};
use crate::indicator::rsi::calculate_rsi;
use crate::model::{Bias, Candle, Direction, clamp_score};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 기술적 분석에 필요한 최소 캔들 수
pub const MIN_TECHNICAL_CANDLES: usize = 50;

/// 출력에 포함하는 지지/저항 레벨 수
const REPORTED_LEVELS: usize = 3;

/// RSI 구간
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiLevel {
    ExtremeOversold,
    Oversold,
    Neutral,
    Overbought,
    ExtremeOverbought,
}

impl RsiLevel {
    pub fn classify(rsi: f64, levels: &RsiLevels) -> Self {
        if rsi <= levels.extreme_oversold {
            RsiLevel::ExtremeOversold
        } else if rsi <= levels.oversold {
            RsiLevel::Oversold
        } else if rsi >= levels.extreme_overbought {
            RsiLevel::ExtremeOverbought
        } else if rsi >= levels.overbought {
            RsiLevel::Overbought
        } else {
            RsiLevel::Neutral
        }
    }

    pub fn is_oversold(&self) -> bool {
        matches!(self, RsiLevel::ExtremeOversold | RsiLevel::Oversold)
    }

    pub fn is_overbought(&self) -> bool {
        matches!(self, RsiLevel::ExtremeOverbought | RsiLevel::Overbought)
    }
}

/// 기술적 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalAnalysis {
    pub technical_score: f64,
    pub signal_direction: Direction,

    pub rsi: f64,
    pub rsi_score: f64,
    pub rsi_level: RsiLevel,

    pub macd: Macd,
    pub macd_score: f64,
    pub macd_crossover: MacdCrossover,

    pub bollinger: BollingerBands,
    pub bb_position: BandPosition,
    pub bb_score: f64,

    pub ema_fast: f64,
    pub ema_slow: f64,
    pub ema_score: f64,
    pub ema_trend: Bias,

    pub trend: TrendState,
    pub trend_strength: f64,
    pub trend_score: f64,

    /// 오름차순 앞쪽 3개
    pub support_levels: Vec<f64>,
    pub resistance_levels: Vec<f64>,
    pub sr_score: f64,

    /// 참고용 평균 진폭
    pub atr: f64,
    pub current_price: f64,
}

impl AnalysisOutput for TechnicalAnalysis {
    fn empty() -> Self {
        TechnicalAnalysis {
            technical_score: 0.0,
            signal_direction: Direction::Long,
            rsi: 50.0,
            rsi_score: 50.0,
            rsi_level: RsiLevel::Neutral,
            macd: Macd::default(),
            macd_score: 50.0,
            macd_crossover: MacdCrossover::Neutral,
            bollinger: BollingerBands::default(),
            bb_position: BandPosition::Middle,
            bb_score: 50.0,
            ema_fast: 0.0,
            ema_slow: 0.0,
            ema_score: 50.0,
            ema_trend: Bias::Neutral,
            trend: TrendState::Sideways,
            trend_strength: 0.0,
            trend_score: 50.0,
            support_levels: Vec::new(),
            resistance_levels: Vec::new(),
            sr_score: 50.0,
            atr: 0.0,
            current_price: 0.0,
        }
    }

    fn score(&self) -> f64 {
        self.technical_score
    }
}

/// 기술적 지표 분석기
///
/// RSI, MACD, 볼린저 밴드, EMA, 추세, 지지/저항을 각각 0-100 점수로 환산한 뒤
/// 카테고리 가중치로 합산하고, 지표별 투표로 방향을 결정합니다.
#[derive(Debug, Clone)]
pub struct TechnicalAnalyzer {
    config: Arc<AnalysisConfig>,
}

impl Default for TechnicalAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(AnalysisConfig::default()))
    }
}

impl TechnicalAnalyzer {
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        TechnicalAnalyzer { config }
    }

    /// 캔들 시계열 분석 (시간순)
    ///
    /// 캔들이 50개 미만이거나 계산에 실패하면 빈 결과를 반환합니다.
    pub fn analyze<C: Candle>(&self, symbol: &str, candles: &[C]) -> TechnicalAnalysis {
        resolve("technical", symbol, self.try_analyze(candles))
    }

    fn try_analyze<C: Candle>(&self, candles: &[C]) -> AnalyzerResult<TechnicalAnalysis> {
        require_candles("technical", candles, MIN_TECHNICAL_CANDLES)?;
        let series = PriceSeries::from_candles(candles)?;
        let ind = &self.config.indicators;
        let closes = &series.closes;
        let current_price = series.last_close();

        let rsi = calculate_rsi(closes, ind.rsi_period);
        let macd = Macd::calculate(closes, ind.macd_fast, ind.macd_slow, ind.macd_signal);
        let bollinger = BollingerBands::calculate(closes, ind.bb_period, ind.bb_std);
        let ema_fast = calculate_ema(closes, ind.ema_fast).last().copied();
        let ema_slow = calculate_ema(closes, ind.ema_slow).last().copied();
        let trend = detect_trend(closes, ind.trend_period);
        let levels = support_resistance(closes, ind.sr_window);
        let atr = calculate_atr(&series.highs, &series.lows, closes, ind.atr_period);

        let rsi_score = score_rsi(rsi, &self.config.rsi_levels);
        let macd_score = score_macd(&macd);
        let bb_score = score_bollinger(current_price, &bollinger);
        let ema_score = score_ema(ema_fast, ema_slow, current_price);
        let trend_score = score_trend(trend.state, trend.strength);
        let sr_score = score_support_resistance(
            current_price,
            &levels.supports,
            &levels.resistances,
        );

        let weights = &self.config.weights;
        let technical_score = clamp_score(ensure_finite(
            (rsi_score + macd_score) * weights.momentum
                + (bb_score + ema_score + trend_score) * weights.trend
                + sr_score * weights.support_resistance,
            "technical_score",
        )?);

        let (ema_fast, ema_slow) = (ema_fast.unwrap_or(0.0), ema_slow.unwrap_or(0.0));
        let signal_direction = vote_direction(
            rsi,
            &macd,
            ema_fast,
            ema_slow,
            trend.state,
            current_price,
            bollinger.middle,
        );

        Ok(TechnicalAnalysis {
            technical_score,
            signal_direction,
            rsi,
            rsi_score,
            rsi_level: RsiLevel::classify(rsi, &self.config.rsi_levels),
            macd_crossover: macd.crossover(),
            macd,
            macd_score,
            bb_position: bollinger.position(current_price),
            bollinger,
            bb_score,
            ema_fast,
            ema_slow,
            ema_score,
            ema_trend: if ema_fast > ema_slow {
                Bias::Bullish
            } else {
                Bias::Bearish
            },
            trend: trend.state,
            trend_strength: trend.strength,
            trend_score,
            support_levels: levels.supports.into_iter().take(REPORTED_LEVELS).collect(),
            resistance_levels: levels
                .resistances
                .into_iter()
                .take(REPORTED_LEVELS)
                .collect(),
            sr_score,
            atr,
            current_price,
        })
    }
}

/// RSI 점수 (과매도일수록 높음)
pub fn score_rsi(rsi: f64, levels: &RsiLevels) -> f64 {
    if rsi <= levels.extreme_oversold {
        100.0
    } else if rsi <= levels.oversold {
        80.0
    } else if rsi <= levels.neutral_low {
        60.0
    } else if rsi >= levels.extreme_overbought {
        0.0
    } else if rsi >= levels.overbought {
        20.0
    } else if rsi >= levels.neutral_high {
        40.0
    } else {
        50.0
    }
}

/// MACD 점수
///
/// 라인/시그널 교차 방향 ±30, 히스토그램 크기 최대 ±20
pub fn score_macd(macd: &Macd) -> f64 {
    let mut score = 50.0;
    if macd.macd_line > macd.signal_line && macd.histogram > 0.0 {
        score += 30.0;
    } else if macd.macd_line < macd.signal_line && macd.histogram < 0.0 {
        score -= 30.0;
    }

    let strength = (macd.histogram.abs() * 100.0).min(20.0);
    if macd.histogram > 0.0 {
        score += strength;
    } else {
        score -= strength;
    }
    clamp_score(score)
}

/// 볼린저 밴드 점수 (하단에 가까울수록 높음)
pub fn score_bollinger(price: f64, bands: &BollingerBands) -> f64 {
    let Some(position) = bands.percent_b(price) else {
        return 50.0;
    };
    if position <= 0.1 {
        90.0
    } else if position <= 0.3 {
        70.0
    } else if position >= 0.9 {
        10.0
    } else if position >= 0.7 {
        30.0
    } else {
        50.0
    }
}

/// EMA 점수
///
/// 빠른/느린 EMA 배열 ±25, 가격이 두 EMA 위/아래이면 추가 ±25
pub fn score_ema(ema_fast: Option<f64>, ema_slow: Option<f64>, price: f64) -> f64 {
    let (Some(fast), Some(slow)) = (ema_fast, ema_slow) else {
        return 50.0;
    };

    let mut score: f64 = if fast > slow { 75.0 } else { 25.0 };
    if price > fast && price > slow {
        score += 25.0;
    } else if price < fast && price < slow {
        score -= 25.0;
    }
    clamp_score(score)
}

/// 추세 점수 (기본 점수 ± 최대 10의 강도 보정)
pub fn score_trend(trend: TrendState, strength: f64) -> f64 {
    let adjustment = strength.min(10.0);
    match trend {
        TrendState::StrongUptrend => clamp_score(90.0 + adjustment),
        TrendState::Uptrend => clamp_score(70.0 + adjustment),
        TrendState::Sideways => 50.0,
        TrendState::Downtrend => clamp_score(30.0 - adjustment),
        TrendState::StrongDowntrend => clamp_score(10.0 - adjustment),
    }
}

/// 가장 가까운 레벨까지의 거리 (%)
fn nearest_distance_percent(price: f64, levels: &[f64]) -> Option<f64> {
    if price == 0.0 {
        return None;
    }
    levels
        .iter()
        .map(|level| (price - level).abs() / price * 100.0)
        .reduce(f64::min)
}

fn proximity_points(distance: Option<f64>) -> f64 {
    match distance {
        Some(d) if d < 1.0 => 30.0,
        Some(d) if d < 2.0 => 20.0,
        Some(d) if d < 3.0 => 10.0,
        _ => 0.0,
    }
}

/// 지지/저항 점수
///
/// 가까운 지지선은 가점, 가까운 저항선은 감점
pub fn score_support_resistance(price: f64, supports: &[f64], resistances: &[f64]) -> f64 {
    let score = 50.0 + proximity_points(nearest_distance_percent(price, supports))
        - proximity_points(nearest_distance_percent(price, resistances));
    clamp_score(score)
}

/// 지표별 투표로 방향 결정 (추세는 2표, 동률은 숏)
fn vote_direction(
    rsi: f64,
    macd: &Macd,
    ema_fast: f64,
    ema_slow: f64,
    trend: TrendState,
    price: f64,
    bb_middle: f64,
) -> Direction {
    let mut bullish = 0;
    let mut bearish = 0;

    if rsi < 40.0 {
        bullish += 1;
    } else if rsi > 60.0 {
        bearish += 1;
    }

    if macd.macd_line > macd.signal_line {
        bullish += 1;
    } else {
        bearish += 1;
    }

    if ema_fast > ema_slow {
        bullish += 1;
    } else {
        bearish += 1;
    }

    if trend.is_up() {
        bullish += 2;
    } else if trend.is_down() {
        bearish += 2;
    }

    if price > bb_middle {
        bullish += 1;
    } else {
        bearish += 1;
    }

    if bullish > bearish {
        Direction::Long
    } else {
        Direction::Short
    }
}
