//! 시장 조작 탐지
//!
//! 펌프/덤프, 자전거래, 스푸핑, 유동성 사냥, 변동성 급증을 점검해
//! 위험 점수와 거래 안전 여부를 판정합니다. 여기서 "안전하지 않음"으로 판정되면
//! 종합 분석에서 거래 불가로 처리됩니다.

use crate::analyzer::base::{AnalysisOutput, PriceSeries, percent_change, require_candles, resolve};
use crate::analyzer::whale_tracker::WhaleAnalysis;
use crate::config::{AnalysisConfig, ManipulationConfig};
use crate::error::{AnalyzerResult, ensure_finite};
use crate::indicator::orderbook::OrderBook;
use crate::indicator::stats::{coefficient_of_variation, mean, std_dev, tail};
use crate::model::{Candle, RiskLevel, Severity};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 조작 탐지에 필요한 최소 캔들 수
pub const MIN_MANIPULATION_CANDLES: usize = 20;

const SUDDEN_MOVE_MIN_CANDLES: usize = 10;
const PUMP_WINDOW: usize = 20;
const PUMP_RECENT: usize = 5;
const PUMP_VOLUME_RATIO: f64 = 3.0;
const WASH_WINDOW: usize = 50;
const WASH_VOLUME_CV: f64 = 1.5;
const WASH_PRICE_CV: f64 = 0.02;
const WASH_VOLUME_SIMILARITY: f64 = 0.7;
const HUNT_WINDOW: usize = 10;
const VOLATILITY_RECENT: usize = 10;
const VOLATILITY_BASE: usize = 30;
const VOLATILITY_SPIKE_RATIO: f64 = 3.0;
/// 거래량 이상 배수의 1.5배를 넘으면 극단적 이상
const EXTREME_VOLUME_FACTOR: f64 = 1.5;
/// 횡보 판정 불가 시 보고하는 변동성
const NO_CONSOLIDATION_VOLATILITY: f64 = 100.0;

/// 이 점수를 넘으면 유형과 무관하게 거래 불가
const UNSAFE_RISK_POINTS: f64 = 60.0;

/// 조작 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManipulationType {
    None,
    Pump,
    Dump,
    WashTrading,
    Spoofing,
    LiquidityHunt,
}

impl ManipulationType {
    /// 발견 즉시 거래를 막는 유형인지 확인
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            ManipulationType::Pump
                | ManipulationType::Dump
                | ManipulationType::WashTrading
                | ManipulationType::Spoofing
        )
    }
}

/// 거래 거절 사유
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionReason {
    pub reason: String,
    pub severity: Severity,
    pub description: String,
}

impl RejectionReason {
    fn new(reason: &str, severity: Severity, description: String) -> Self {
        RejectionReason {
            reason: reason.to_string(),
            severity,
            description,
        }
    }
}

/// 개별 점검 결과 원본 값
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManipulationChecks {
    /// 1캔들 가격 변화율 (%)
    pub price_change_1: f64,
    /// 5캔들 가격 변화율 (%)
    pub price_change_5: f64,
    pub sudden_move: bool,

    /// 마지막 거래량 / 이전 평균 거래량
    pub volume_ratio: f64,
    pub volume_anomaly: bool,
    pub extreme_volume: bool,

    pub pump_detected: bool,
    pub pump_strength: f64,
    pub dump_detected: bool,
    pub dump_strength: f64,

    pub wash_trading: bool,

    pub is_consolidating: bool,
    /// 횡보 구간 변동계수 (%)
    pub consolidation_volatility: f64,

    pub spread_anomaly: bool,
    pub spread_percent: f64,

    pub liquidity_hunt: bool,
    pub spoofing: bool,

    pub volatility_spike: bool,
    /// 최근 10개 표준편차 / 직전 20개 표준편차
    pub volatility_ratio: f64,
}

/// 조작 탐지 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManipulationAnalysis {
    /// 100이 가장 깨끗한 시장
    pub manipulation_score: f64,
    /// 누적 위험 점수 (0-100)
    pub risk_points: f64,
    pub risk_level: RiskLevel,
    pub is_safe_to_trade: bool,
    pub manipulation_type: ManipulationType,
    pub rejection_reasons: Vec<RejectionReason>,
    pub recommendations: Vec<String>,
    /// 심각도 High 사유 수
    pub warning_flags: usize,
    pub checks: ManipulationChecks,
}

impl AnalysisOutput for ManipulationAnalysis {
    /// 판정 불가 시 보수적으로 거래 불가 처리
    fn empty() -> Self {
        ManipulationAnalysis {
            manipulation_score: 0.0,
            risk_points: 0.0,
            risk_level: RiskLevel::Unknown,
            is_safe_to_trade: false,
            manipulation_type: ManipulationType::None,
            rejection_reasons: Vec::new(),
            recommendations: Vec::new(),
            warning_flags: 0,
            checks: ManipulationChecks::default(),
        }
    }

    fn score(&self) -> f64 {
        self.manipulation_score
    }
}

/// 시장 조작 탐지기
#[derive(Debug, Clone)]
pub struct ManipulationDetector {
    config: Arc<AnalysisConfig>,
}

impl Default for ManipulationDetector {
    fn default() -> Self {
        Self::new(Arc::new(AnalysisConfig::default()))
    }
}

impl ManipulationDetector {
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        ManipulationDetector { config }
    }

    /// 조작 여부 분석
    ///
    /// # Arguments
    /// * `symbol` - 분석 대상 심볼
    /// * `candles` - 시간순 캔들 (최소 20개)
    /// * `orderbook` - 호가 스냅샷 (비어 있으면 스프레드 이상으로 간주)
    /// * `whales` - 고래 분석 결과 (없으면 스푸핑 점검 생략)
    ///
    /// # Returns
    /// * `ManipulationAnalysis` - 데이터 부족 시 거래 불가 상태의 빈 결과
    pub fn analyze<C: Candle>(
        &self,
        symbol: &str,
        candles: &[C],
        orderbook: &OrderBook,
        whales: Option<&WhaleAnalysis>,
    ) -> ManipulationAnalysis {
        resolve(
            "manipulation",
            symbol,
            self.try_analyze(candles, orderbook, whales),
        )
    }

    fn try_analyze<C: Candle>(
        &self,
        candles: &[C],
        orderbook: &OrderBook,
        whales: Option<&WhaleAnalysis>,
    ) -> AnalyzerResult<ManipulationAnalysis> {
        require_candles("manipulation", candles, MIN_MANIPULATION_CANDLES)?;
        let series = PriceSeries::from_candles(candles)?;
        let settings = &self.config.manipulation;

        let mut checks = ManipulationChecks::default();
        self.check_sudden_move(&series.closes, &mut checks);
        self.check_volume_anomaly(&series.volumes, &mut checks);
        self.check_pump_dump(&series, &mut checks);
        checks.wash_trading = detect_wash_trading(&series);
        self.check_consolidation(&series.closes, &mut checks);
        (checks.spread_anomaly, checks.spread_percent) =
            spread_anomaly(orderbook, settings.max_spread_percent);
        checks.liquidity_hunt = detect_liquidity_hunt(tail(candles, HUNT_WINDOW));
        checks.spoofing = whales
            .map(|w| w.manipulation_risk == RiskLevel::Extreme || w.possible_spoofing)
            .unwrap_or(false);
        (checks.volatility_spike, checks.volatility_ratio) = volatility_spike(&series.closes);

        let risk_points = ensure_finite(risk_points(&checks), "risk_points")?;
        let manipulation_type = classify_type(&checks);
        let is_safe_to_trade = !(manipulation_type.is_blocking()
            || risk_points > UNSAFE_RISK_POINTS
            || (!checks.is_consolidating && checks.spread_anomaly));

        let rejection_reasons = rejection_reasons(&checks, settings);
        let warning_flags = rejection_reasons
            .iter()
            .filter(|r| r.severity == Severity::High)
            .count();
        let recommendations = recommendations(&checks, is_safe_to_trade);

        Ok(ManipulationAnalysis {
            manipulation_score: 100.0 - risk_points,
            risk_points,
            risk_level: risk_level(risk_points),
            is_safe_to_trade,
            manipulation_type,
            rejection_reasons,
            recommendations,
            warning_flags,
            checks,
        })
    }

    /// 1캔들/5캔들 급변동
    fn check_sudden_move(&self, closes: &[f64], checks: &mut ManipulationChecks) {
        let n = closes.len();
        if n < SUDDEN_MOVE_MIN_CANDLES {
            return;
        }
        let settings = &self.config.manipulation;
        checks.price_change_1 = percent_change(closes[n - 2], closes[n - 1]);
        checks.price_change_5 = percent_change(closes[n - 6], closes[n - 1]);
        checks.sudden_move = checks.price_change_1.abs() > settings.max_price_change_1
            || checks.price_change_5.abs() > settings.max_price_change_5;
    }

    /// 마지막 거래량을 그 이전 전체 평균과 비교
    fn check_volume_anomaly(&self, volumes: &[f64], checks: &mut ManipulationChecks) {
        let Some((last, previous)) = volumes.split_last() else {
            return;
        };
        let average = mean(previous);
        if average <= 0.0 {
            return;
        }
        let multiplier = self.config.manipulation.pump_volume_multiplier;
        checks.volume_ratio = last / average;
        checks.volume_anomaly = checks.volume_ratio > multiplier;
        checks.extreme_volume = checks.volume_ratio > multiplier * EXTREME_VOLUME_FACTOR;
    }

    /// 최근 20개 캔들의 가격 변화와 최근 5개 최대 거래량으로 펌프/덤프 판정
    ///
    /// 마지막 캔들이 같은 방향으로 이어질 때만 인정합니다. 거래량 배수는 최근 5개 평균이
    /// 아닌 최대값을 쓰므로 단일 캔들 급증도 잡힙니다.
    fn check_pump_dump(&self, series: &PriceSeries, checks: &mut ManipulationChecks) {
        let closes = tail(&series.closes, PUMP_WINDOW);
        let volumes = tail(&series.volumes, PUMP_WINDOW);
        let n = closes.len();
        if n <= PUMP_RECENT {
            return;
        }

        let threshold = self.config.manipulation.max_price_change_1;
        let price_change = percent_change(closes[0], closes[n - 1]);
        let (older, recent) = volumes.split_at(n - PUMP_RECENT);
        let older_average = mean(older);
        if older_average <= 0.0 {
            return;
        }
        let recent_peak = recent.iter().copied().fold(0.0, f64::max);
        let volume_ratio = recent_peak / older_average;
        let strength = |change: f64| {
            ((change.abs() / threshold) * (volume_ratio / PUMP_VOLUME_RATIO) * 100.0).min(100.0)
        };

        if price_change > threshold
            && volume_ratio > PUMP_VOLUME_RATIO
            && closes[n - 1] > closes[n - 2]
        {
            checks.pump_detected = true;
            checks.pump_strength = strength(price_change);
        }
        if price_change < -threshold
            && volume_ratio > PUMP_VOLUME_RATIO
            && closes[n - 1] < closes[n - 2]
        {
            checks.dump_detected = true;
            checks.dump_strength = strength(price_change);
        }
    }

    /// 최근 120개 종가 변동계수로 횡보 판정
    fn check_consolidation(&self, closes: &[f64], checks: &mut ManipulationChecks) {
        let settings = &self.config.manipulation;
        if closes.len() < settings.min_consolidation_period {
            checks.is_consolidating = false;
            checks.consolidation_volatility = NO_CONSOLIDATION_VOLATILITY;
            return;
        }
        let volatility =
            coefficient_of_variation(tail(closes, settings.min_consolidation_period)) * 100.0;
        checks.consolidation_volatility = volatility;
        checks.is_consolidating = volatility < settings.max_consolidation_volatility;
    }
}

/// 자전거래 의심
///
/// 최근 50개 캔들에서 거래량 변동계수는 크지만 가격은 거의 움직이지 않거나,
/// 연속 캔들 거래량이 평균 70% 이상 비슷하면 의심합니다.
fn detect_wash_trading(series: &PriceSeries) -> bool {
    let volumes = tail(&series.volumes, WASH_WINDOW);
    let closes = tail(&series.closes, WASH_WINDOW);
    if volumes.len() < MIN_MANIPULATION_CANDLES {
        return false;
    }

    let volume_cv = coefficient_of_variation(volumes);
    let price_cv = coefficient_of_variation(closes);
    if volume_cv > WASH_VOLUME_CV && price_cv < WASH_PRICE_CV {
        return true;
    }

    let similarities: Vec<f64> = volumes
        .windows(2)
        .map(|pair| {
            let (low, high) = (pair[0].min(pair[1]), pair[0].max(pair[1]));
            if high > 0.0 { low / high } else { 0.0 }
        })
        .collect();
    mean(&similarities) > WASH_VOLUME_SIMILARITY
}

/// 최우선 호가 기준 스프레드 이상 여부와 스프레드 (%)
///
/// 호가가 비어 있으면 이상으로 판정합니다.
fn spread_anomaly(orderbook: &OrderBook, max_spread_percent: f64) -> (bool, f64) {
    match (orderbook.best_bid(), orderbook.best_ask()) {
        (Some(bid), Some(ask)) if bid > 0.0 => {
            let spread_percent = (ask - bid) / bid * 100.0;
            (spread_percent > max_spread_percent, spread_percent)
        }
        _ => (true, 100.0),
    }
}

/// 꼬리가 몸통의 3배, 반대쪽 꼬리의 2배를 넘는 캔들이 있는지 확인
fn detect_liquidity_hunt<C: Candle>(candles: &[C]) -> bool {
    candles.iter().any(|c| {
        let body = c.body();
        let (upper, lower) = (c.upper_wick(), c.lower_wick());
        (upper > body * 3.0 && upper > lower * 2.0) || (lower > body * 3.0 && lower > upper * 2.0)
    })
}

/// 최근 10개 종가 표준편차가 직전 20개의 3배를 넘는지 확인
///
/// 직전 구간 표준편차가 0이면 비율을 1로 둡니다.
fn volatility_spike(closes: &[f64]) -> (bool, f64) {
    let n = closes.len();
    if n < VOLATILITY_BASE {
        return (false, 1.0);
    }
    let recent = &closes[n - VOLATILITY_RECENT..];
    let base = &closes[n - VOLATILITY_BASE..n - VOLATILITY_RECENT];
    let base_std = std_dev(base);
    if base_std == 0.0 {
        return (false, 1.0);
    }
    let ratio = std_dev(recent) / base_std;
    (ratio > VOLATILITY_SPIKE_RATIO, ratio)
}

/// 점검 결과별 위험 점수 합산 (최대 100)
fn risk_points(checks: &ManipulationChecks) -> f64 {
    let mut points = 0.0;
    if checks.pump_detected {
        points += checks.pump_strength * 0.8;
    }
    if checks.dump_detected {
        points += checks.dump_strength * 0.8;
    }
    if checks.sudden_move {
        points += 30.0;
    }
    if checks.volume_anomaly {
        points += 25.0;
        if checks.extreme_volume {
            points += 15.0;
        }
    }
    if checks.wash_trading {
        points += 35.0;
    }
    if checks.spoofing {
        points += 40.0;
    }
    if checks.liquidity_hunt {
        points += 25.0;
    }
    if checks.spread_anomaly {
        points += 20.0;
    }
    if checks.volatility_spike {
        points += 15.0;
    }
    if !checks.is_consolidating {
        points += 20.0;
    }
    f64::min(points, 100.0)
}

/// 우선순위: 펌프 > 덤프 > 자전거래 > 스푸핑 > 유동성 사냥
fn classify_type(checks: &ManipulationChecks) -> ManipulationType {
    if checks.pump_detected {
        ManipulationType::Pump
    } else if checks.dump_detected {
        ManipulationType::Dump
    } else if checks.wash_trading {
        ManipulationType::WashTrading
    } else if checks.spoofing {
        ManipulationType::Spoofing
    } else if checks.liquidity_hunt {
        ManipulationType::LiquidityHunt
    } else {
        ManipulationType::None
    }
}

/// 위험 점수 등급 (70 / 50 / 30 경계)
pub fn risk_level(risk_points: f64) -> RiskLevel {
    if risk_points >= 70.0 {
        RiskLevel::Extreme
    } else if risk_points >= 50.0 {
        RiskLevel::High
    } else if risk_points >= 30.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn rejection_reasons(
    checks: &ManipulationChecks,
    settings: &ManipulationConfig,
) -> Vec<RejectionReason> {
    let mut reasons = Vec::new();
    if checks.pump_detected {
        reasons.push(RejectionReason::new(
            "pump",
            Severity::High,
            format!("펌프 의심 (강도 {:.1})", checks.pump_strength),
        ));
    }
    if checks.dump_detected {
        reasons.push(RejectionReason::new(
            "dump",
            Severity::High,
            format!("덤프 의심 (강도 {:.1})", checks.dump_strength),
        ));
    }
    if checks.sudden_move {
        reasons.push(RejectionReason::new(
            "sudden_move",
            Severity::High,
            format!(
                "급격한 가격 변동 (1캔들 {:.2}%, 5캔들 {:.2}%)",
                checks.price_change_1, checks.price_change_5
            ),
        ));
    }
    if checks.volume_anomaly {
        let severity = if checks.extreme_volume {
            Severity::High
        } else {
            Severity::Medium
        };
        reasons.push(RejectionReason::new(
            "volume_anomaly",
            severity,
            format!(
                "비정상 거래량 (평균 대비 {:.1}배, 기준 {:.1}배)",
                checks.volume_ratio, settings.pump_volume_multiplier
            ),
        ));
    }
    if checks.wash_trading {
        reasons.push(RejectionReason::new(
            "wash_trading",
            Severity::High,
            "자전거래 패턴 감지".to_string(),
        ));
    }
    if checks.spoofing {
        reasons.push(RejectionReason::new(
            "spoofing",
            Severity::High,
            "고래 호가 스푸핑 의심".to_string(),
        ));
    }
    if checks.liquidity_hunt {
        reasons.push(RejectionReason::new(
            "liquidity_hunt",
            Severity::Medium,
            "긴 꼬리 캔들로 유동성 사냥 의심".to_string(),
        ));
    }
    if checks.spread_anomaly {
        reasons.push(RejectionReason::new(
            "spread_anomaly",
            Severity::Medium,
            format!(
                "스프레드 과다 ({:.3}%, 기준 {:.2}%)",
                checks.spread_percent, settings.max_spread_percent
            ),
        ));
    }
    if checks.volatility_spike {
        reasons.push(RejectionReason::new(
            "volatility_spike",
            Severity::Medium,
            format!("변동성 급증 ({:.1}배)", checks.volatility_ratio),
        ));
    }
    if !checks.is_consolidating {
        reasons.push(RejectionReason::new(
            "no_consolidation",
            Severity::Medium,
            format!(
                "횡보 구간 없음 (변동성 {:.2}%, 기준 {:.1}%)",
                checks.consolidation_volatility, settings.max_consolidation_volatility
            ),
        ));
    }
    reasons
}

fn recommendations(checks: &ManipulationChecks, is_safe_to_trade: bool) -> Vec<String> {
    let mut items = Vec::new();
    if checks.pump_detected || checks.dump_detected {
        items.push("급등락 이후 진입 금지, 가격 안정 확인 후 재분석".to_string());
    }
    if checks.wash_trading {
        items.push("거래량 신뢰 불가, 거래량 기반 신호 무시".to_string());
    }
    if checks.spoofing {
        items.push("대형 호가 변화 모니터링 필요".to_string());
    }
    if checks.liquidity_hunt {
        items.push("손절 폭을 넓히거나 진입 보류".to_string());
    }
    if checks.spread_anomaly {
        items.push("지정가 주문만 사용".to_string());
    }
    if !checks.is_consolidating {
        items.push("횡보 구간 형성 후 재진입 검토".to_string());
    }
    if items.is_empty() && is_safe_to_trade {
        items.push("특이사항 없음".to_string());
    }
    items
}
