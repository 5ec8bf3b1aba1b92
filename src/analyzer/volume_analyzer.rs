use crate::analyzer::base::{AnalysisOutput, PriceSeries, require_candles, resolve};
use crate::config::{AnalysisConfig, VolumeCategories};
use crate::error::{AnalyzerResult, ensure_finite};
use crate::indicator::ma::calculate_sma_last;
use crate::indicator::stats::{mean, pearson_correlation, std_dev, tail};
use crate::model::{Bias, Candle, clamp_score};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// 거래량 분석에 필요한 최소 캔들 수
pub const MIN_VOLUME_CANDLES: usize = 30;

const CORRELATION_WINDOW: usize = 20;
const PRESSURE_WINDOW: usize = 20;
const SPIKE_WINDOW: usize = 20;
const SPIKE_Z_SCORE: f64 = 2.5;
const TREND_WINDOW: usize = 10;
const ACCUMULATION_WINDOW: usize = 50;
const MONEY_FLOW_WINDOW: usize = 20;
const MONEY_FLOW_CAP: f64 = 10.0;
/// 유출이 전혀 없을 때의 자금 흐름 비율
const MONEY_FLOW_NO_OUTFLOW: f64 = 100.0;
const OBV_STRONG: f64 = 1_000_000.0;
const PROFILE_WINDOW: usize = 100;
const PROFILE_LEVELS: usize = 50;
const VALUE_AREA_SHARE: f64 = 0.7;

/// 평균 대비 거래량 구간
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeCategory {
    VeryHigh,
    High,
    Normal,
    Low,
    VeryLow,
    Unknown,
}

impl VolumeCategory {
    /// 거래량 비율 구간 분류 (경계값은 위 구간에 포함)
    pub fn classify(ratio: f64, categories: &VolumeCategories) -> Self {
        if ratio >= categories.very_high {
            VolumeCategory::VeryHigh
        } else if ratio >= categories.high {
            VolumeCategory::High
        } else if ratio >= categories.normal {
            VolumeCategory::Normal
        } else if ratio >= categories.low {
            VolumeCategory::Low
        } else {
            VolumeCategory::VeryLow
        }
    }
}

/// 최근 10개 대비 직전 10개 평균 거래량 추세
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTrend {
    Increasing,
    Stable,
    Decreasing,
    Neutral,
}

/// 누적/분배 구분
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulationTrend {
    Accumulation,
    Distribution,
    Neutral,
}

/// 가격대별 거래량 분포 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    pub value_area_high: f64,
    pub value_area_low: f64,
    pub point_of_control: f64,
}

/// 거래량 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeAnalysis {
    pub volume_score: f64,

    pub current_volume: f64,
    pub average_volume: f64,
    pub volume_ratio: f64,
    pub volume_category: VolumeCategory,
    pub volume_trend: VolumeTrend,

    pub is_volume_spike: bool,
    pub spike_strength: f64,

    pub buy_pressure_percent: f64,
    pub sell_pressure_percent: f64,
    pub net_pressure: f64,
    pub pressure_direction: Bias,

    pub volume_price_correlation: f64,

    pub accumulation_distribution: f64,
    pub accumulation_trend: AccumulationTrend,

    pub obv: f64,
    pub obv_trend: Bias,

    pub money_flow_ratio: f64,

    pub profile: VolumeProfile,
    pub price_above_value_area: bool,
    pub price_below_value_area: bool,
}

impl AnalysisOutput for VolumeAnalysis {
    fn empty() -> Self {
        VolumeAnalysis {
            volume_score: 0.0,
            current_volume: 0.0,
            average_volume: 0.0,
            volume_ratio: 0.0,
            volume_category: VolumeCategory::Unknown,
            volume_trend: VolumeTrend::Neutral,
            is_volume_spike: false,
            spike_strength: 0.0,
            buy_pressure_percent: 50.0,
            sell_pressure_percent: 50.0,
            net_pressure: 0.0,
            pressure_direction: Bias::Neutral,
            volume_price_correlation: 0.0,
            accumulation_distribution: 0.0,
            accumulation_trend: AccumulationTrend::Neutral,
            obv: 0.0,
            obv_trend: Bias::Neutral,
            money_flow_ratio: 1.0,
            profile: VolumeProfile::default(),
            price_above_value_area: false,
            price_below_value_area: false,
        }
    }

    fn score(&self) -> f64 {
        self.volume_score
    }
}

/// 거래량 분석기
#[derive(Debug, Clone)]
pub struct VolumeAnalyzer {
    config: Arc<AnalysisConfig>,
}

impl Default for VolumeAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(AnalysisConfig::default()))
    }
}

impl VolumeAnalyzer {
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        VolumeAnalyzer { config }
    }

    /// 캔들 시계열 거래량 분석 (시간순)
    pub fn analyze<C: Candle>(&self, symbol: &str, candles: &[C]) -> VolumeAnalysis {
        resolve("volume", symbol, self.try_analyze(candles))
    }

    fn try_analyze<C: Candle>(&self, candles: &[C]) -> AnalyzerResult<VolumeAnalysis> {
        require_candles("volume", candles, MIN_VOLUME_CANDLES)?;
        let series = PriceSeries::from_candles(candles)?;
        let volumes = &series.volumes;

        let current_volume = volumes.last().copied().unwrap_or(0.0);
        let current_price = series.last_close();
        let average_volume =
            calculate_sma_last(volumes, self.config.indicators.volume_ma_period)
                .unwrap_or_else(|| mean(volumes));
        let volume_ratio = if average_volume > 0.0 {
            current_volume / average_volume
        } else {
            1.0
        };

        let volume_trend = volume_trend(volumes);
        let volume_category =
            VolumeCategory::classify(volume_ratio, &self.config.volume_categories);
        let volume_price_correlation = pearson_correlation(
            tail(volumes, CORRELATION_WINDOW),
            tail(&series.closes, CORRELATION_WINDOW),
        );
        let (buy_pressure, sell_pressure) = buy_sell_pressure(tail(candles, PRESSURE_WINDOW));
        let spike_strength = spike_strength(volumes);
        let is_volume_spike = spike_strength.is_some();
        let spike_strength = spike_strength.unwrap_or(0.0);
        let accumulation_distribution =
            accumulation_distribution(tail(candles, ACCUMULATION_WINDOW));
        let obv = on_balance_volume(tail(candles, ACCUMULATION_WINDOW));
        let money_flow_ratio = money_flow_ratio(tail(candles, MONEY_FLOW_WINDOW));
        let profile = volume_profile(tail(candles, PROFILE_WINDOW));

        let net_pressure = buy_pressure - sell_pressure;

        let mut score = 50.0;
        if volume_ratio >= 3.0 {
            score += 30.0;
        } else if volume_ratio >= 2.0 {
            score += 20.0;
        } else if volume_ratio >= 1.5 {
            score += 10.0;
        } else if volume_ratio < 0.5 {
            score -= 20.0;
        }
        match volume_trend {
            VolumeTrend::Increasing => score += 15.0,
            VolumeTrend::Decreasing => score -= 15.0,
            _ => {}
        }
        if volume_price_correlation > 0.5 {
            score += 10.0;
        } else if volume_price_correlation < -0.5 {
            score -= 10.0;
        }
        score += net_pressure / 5.0;
        if is_volume_spike {
            score += (spike_strength / 2.0).min(20.0);
        }
        if accumulation_distribution > 0.0 {
            score += 10.0;
        } else {
            score -= 10.0;
        }
        let volume_score = clamp_score(ensure_finite(score, "volume_score")?);

        Ok(VolumeAnalysis {
            volume_score,
            current_volume,
            average_volume,
            volume_ratio,
            volume_category,
            volume_trend,
            is_volume_spike,
            spike_strength,
            buy_pressure_percent: buy_pressure,
            sell_pressure_percent: sell_pressure,
            net_pressure,
            // 동률은 약세로 취급
            pressure_direction: if buy_pressure > sell_pressure {
                Bias::Bullish
            } else {
                Bias::Bearish
            },
            volume_price_correlation,
            accumulation_distribution,
            accumulation_trend: if accumulation_distribution > 0.0 {
                AccumulationTrend::Accumulation
            } else {
                AccumulationTrend::Distribution
            },
            obv,
            obv_trend: obv_trend(obv),
            money_flow_ratio,
            price_above_value_area: current_price > profile.value_area_high,
            price_below_value_area: current_price < profile.value_area_low,
            profile,
        })
    }
}

/// 최근 10개와 직전 10개 평균 비교 (±20%)
fn volume_trend(volumes: &[f64]) -> VolumeTrend {
    if volumes.len() < TREND_WINDOW {
        return VolumeTrend::Neutral;
    }
    let recent = tail(volumes, TREND_WINDOW);
    let older = if volumes.len() >= TREND_WINDOW * 2 {
        &volumes[volumes.len() - TREND_WINDOW * 2..volumes.len() - TREND_WINDOW]
    } else {
        recent
    };

    let recent_avg = mean(recent);
    let older_avg = mean(older);
    if recent_avg > older_avg * 1.2 {
        VolumeTrend::Increasing
    } else if recent_avg < older_avg * 0.8 {
        VolumeTrend::Decreasing
    } else {
        VolumeTrend::Stable
    }
}

/// 양봉/음봉 거래량 비중 (%). 보합 캔들은 절반씩 나눕니다.
pub fn buy_sell_pressure<C: Candle>(candles: &[C]) -> (f64, f64) {
    let mut buy_volume = 0.0;
    let mut sell_volume = 0.0;
    for candle in candles {
        if candle.is_bullish() {
            buy_volume += candle.volume();
        } else if candle.is_bearish() {
            sell_volume += candle.volume();
        } else {
            buy_volume += candle.volume() / 2.0;
            sell_volume += candle.volume() / 2.0;
        }
    }

    let total = buy_volume + sell_volume;
    if total == 0.0 {
        return (50.0, 50.0);
    }
    (buy_volume / total * 100.0, sell_volume / total * 100.0)
}

/// 최근 20개 거래량 z-score 기반 급증 강도
///
/// z > 2.5이면 `Some(강도)`, 강도는 (z - 2.5)·10을 100으로 제한한 값입니다.
fn spike_strength(volumes: &[f64]) -> Option<f64> {
    if volumes.len() < SPIKE_WINDOW {
        return None;
    }
    let recent = tail(volumes, SPIKE_WINDOW);
    let std = std_dev(recent);
    if std == 0.0 {
        return None;
    }
    let z_score = (volumes[volumes.len() - 1] - mean(recent)) / std;
    if z_score > SPIKE_Z_SCORE {
        Some(((z_score - SPIKE_Z_SCORE) * 10.0).min(100.0))
    } else {
        None
    }
}

/// 누적/분배 라인 (고가 = 저가인 캔들은 제외)
pub fn accumulation_distribution<C: Candle>(candles: &[C]) -> f64 {
    candles
        .iter()
        .filter(|c| c.range() != 0.0)
        .map(|c| {
            let multiplier = ((c.close_price() - c.low_price())
                - (c.high_price() - c.close_price()))
                / c.range();
            multiplier * c.volume()
        })
        .sum()
}

/// 거래량 균형 지표(OBV)
pub fn on_balance_volume<C: Candle>(candles: &[C]) -> f64 {
    candles
        .windows(2)
        .map(|pair| {
            let (prev, curr) = (&pair[0], &pair[1]);
            match curr.close_price().partial_cmp(&prev.close_price()) {
                Some(Ordering::Greater) => curr.volume(),
                Some(Ordering::Less) => -curr.volume(),
                _ => 0.0,
            }
        })
        .sum()
}

fn obv_trend(obv: f64) -> Bias {
    if obv > OBV_STRONG {
        Bias::StrongBullish
    } else if obv > 0.0 {
        Bias::Bullish
    } else if obv < -OBV_STRONG {
        Bias::StrongBearish
    } else if obv < 0.0 {
        Bias::Bearish
    } else {
        Bias::Neutral
    }
}

/// 대표가격 기준 유입/유출 자금 비율 (최대 10, 유출이 없으면 100)
pub fn money_flow_ratio<C: Candle>(candles: &[C]) -> f64 {
    let mut positive = 0.0;
    let mut negative = 0.0;
    for pair in candles.windows(2) {
        let typical = pair[1].typical_price();
        let previous = pair[0].typical_price();
        let raw_flow = typical * pair[1].volume();
        if typical > previous {
            positive += raw_flow;
        } else if typical < previous {
            negative += raw_flow;
        }
    }

    if negative == 0.0 {
        return MONEY_FLOW_NO_OUTFLOW;
    }
    (positive / negative).min(MONEY_FLOW_CAP)
}

/// 50개 가격대 거래량 프로파일
///
/// 고가/저가/종가 범위를 50단계로 나누고, 각 단계 가격을 포함하는 캔들의 거래량을 더합니다.
/// POC는 거래량이 가장 많은 첫 단계, 밸류 에어리어는 거래량 내림차순으로 전체의 70%에
/// 도달할 때까지 포함한 단계의 최고/최저 가격입니다.
pub fn volume_profile<C: Candle>(candles: &[C]) -> VolumeProfile {
    let prices = candles
        .iter()
        .flat_map(|c| [c.high_price(), c.low_price(), c.close_price()]);
    let (min_price, max_price) = prices.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p), hi.max(p))
    });
    if !min_price.is_finite() || !max_price.is_finite() {
        return VolumeProfile::default();
    }

    let step = if max_price > min_price {
        (max_price - min_price) / PROFILE_LEVELS as f64
    } else {
        1.0
    };

    let levels: Vec<(f64, f64)> = (0..PROFILE_LEVELS)
        .map(|i| {
            let price = min_price + i as f64 * step;
            let volume = candles
                .iter()
                .filter(|c| c.low_price() <= price && price <= c.high_price())
                .map(|c| c.volume())
                .sum();
            (price, volume)
        })
        .collect();

    // 동일 거래량이면 낮은 가격대가 먼저 (안정 정렬)
    let mut ranked = levels.clone();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let point_of_control = ranked.first().map(|(price, _)| *price).unwrap_or(min_price);
    let total: f64 = levels.iter().map(|(_, v)| v).sum();
    let target = total * VALUE_AREA_SHARE;

    let mut accumulated = 0.0;
    let mut value_area_high = f64::NEG_INFINITY;
    let mut value_area_low = f64::INFINITY;
    for (price, volume) in &ranked {
        accumulated += volume;
        value_area_high = value_area_high.max(*price);
        value_area_low = value_area_low.min(*price);
        if accumulated >= target {
            break;
        }
    }

    VolumeProfile {
        value_area_high,
        value_area_low,
        point_of_control,
    }
}
