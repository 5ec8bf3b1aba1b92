//! 분석 설정
//!
//! 모든 분석기는 `AnalysisConfig`를 주입받아 동작합니다. 전역 설정은 없습니다.
//! 각 섹션의 `Default` 값은 운영 환경 상수와 같습니다.

use crate::config_loader::{ConfigError, ConfigResult, ConfigValidation};
use serde::{Deserialize, Serialize};

/// 지표 기간 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_std: f64,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub volume_ma_period: usize,
    /// 회귀 추세 판정 기간
    pub trend_period: usize,
    /// 지지/저항 탐색 창 크기 (한쪽)
    pub sr_window: usize,
    /// ATR 기간
    pub atr_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        IndicatorConfig {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_std: 2.0,
            ema_fast: 9,
            ema_slow: 21,
            volume_ma_period: 20,
            trend_period: 20,
            sr_window: 20,
            atr_period: 14,
        }
    }
}

/// RSI 구간 경계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiLevels {
    pub extreme_oversold: f64,
    pub oversold: f64,
    pub neutral_low: f64,
    pub neutral_high: f64,
    pub overbought: f64,
    pub extreme_overbought: f64,
}

impl Default for RsiLevels {
    fn default() -> Self {
        RsiLevels {
            extreme_oversold: 20.0,
            oversold: 30.0,
            neutral_low: 40.0,
            neutral_high: 60.0,
            overbought: 70.0,
            extreme_overbought: 80.0,
        }
    }
}

impl RsiLevels {
    fn as_array(&self) -> [f64; 6] {
        [
            self.extreme_oversold,
            self.oversold,
            self.neutral_low,
            self.neutral_high,
            self.overbought,
            self.extreme_overbought,
        ]
    }
}

/// 카테고리별 가중치
///
/// 기술적 분석기 내부 합산과 종합 점수 합산 양쪽에서 사용됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub trend: f64,
    pub momentum: f64,
    pub volume: f64,
    pub support_resistance: f64,
    pub pattern: f64,
    pub orderbook: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        CategoryWeights {
            trend: 0.25,
            momentum: 0.20,
            volume: 0.20,
            support_resistance: 0.15,
            pattern: 0.10,
            orderbook: 0.10,
        }
    }
}

impl CategoryWeights {
    pub fn total(&self) -> f64 {
        self.trend
            + self.momentum
            + self.volume
            + self.support_resistance
            + self.pattern
            + self.orderbook
    }

    fn as_array(&self) -> [(&'static str, f64); 6] {
        [
            ("trend", self.trend),
            ("momentum", self.momentum),
            ("volume", self.volume),
            ("support_resistance", self.support_resistance),
            ("pattern", self.pattern),
            ("orderbook", self.orderbook),
        ]
    }
}

/// 거래량 비율 구간 (현재 거래량 / 평균 거래량)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeCategories {
    pub very_high: f64,
    pub high: f64,
    pub normal: f64,
    pub low: f64,
}

impl Default for VolumeCategories {
    fn default() -> Self {
        VolumeCategories {
            very_high: 3.0,
            high: 2.0,
            normal: 1.0,
            low: 0.5,
        }
    }
}

/// 차트 패턴 기본 신뢰도
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfidence {
    pub double_top: f64,
    pub double_bottom: f64,
    pub head_shoulders: f64,
    pub inverse_head_shoulders: f64,
    pub triangle: f64,
    pub flag: f64,
    pub wedge: f64,
    pub channel: f64,
}

impl Default for PatternConfidence {
    fn default() -> Self {
        PatternConfidence {
            double_top: 0.85,
            double_bottom: 0.85,
            head_shoulders: 0.80,
            inverse_head_shoulders: 0.80,
            triangle: 0.75,
            flag: 0.70,
            wedge: 0.70,
            channel: 0.65,
        }
    }
}

/// 조작 탐지 기준
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManipulationConfig {
    /// 1캔들 최대 가격 변화율 (%)
    pub max_price_change_1: f64,
    /// 5캔들 최대 가격 변화율 (%)
    pub max_price_change_5: f64,
    /// 거래량 이상 배수
    pub pump_volume_multiplier: f64,
    /// 횡보 판정에 사용하는 캔들 수
    pub min_consolidation_period: usize,
    /// 횡보로 인정하는 최대 변동성 (%)
    pub max_consolidation_volatility: f64,
    /// 유동성 판정 최소 호가 깊이 (USD)
    pub min_order_book_depth: f64,
    /// 최대 허용 스프레드 (%)
    pub max_spread_percent: f64,
    /// 고래 주문 기준 금액 (USD)
    pub whale_order_threshold: f64,
    /// 최대 허용 고래 점유율 (%)
    pub max_whale_dominance: f64,
    /// 고래 탐색 호가 단계 수
    pub whale_scan_depth: usize,
}

impl Default for ManipulationConfig {
    fn default() -> Self {
        ManipulationConfig {
            max_price_change_1: 15.0,
            max_price_change_5: 25.0,
            pump_volume_multiplier: 5.0,
            min_consolidation_period: 120,
            max_consolidation_volatility: 3.0,
            min_order_book_depth: 50_000.0,
            max_spread_percent: 0.5,
            whale_order_threshold: 100_000.0,
            max_whale_dominance: 30.0,
            whale_scan_depth: 20,
        }
    }
}

/// 과거 급등락 분석 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalConfig {
    pub min_data_points: usize,
    /// 유의미한 움직임 기준 (%)
    pub target_move_percent: f64,
    /// 움직임 탐색 창 (캔들 수)
    pub move_window: usize,
    /// 움직임 직전 조사 구간 (캔들 수)
    pub pre_window: usize,
}

impl Default for HistoricalConfig {
    fn default() -> Self {
        HistoricalConfig {
            min_data_points: 100,
            target_move_percent: 20.0,
            move_window: 24,
            pre_window: 50,
        }
    }
}

/// 전체 분석 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 거래 가능 판정 최소 종합 점수
    pub min_signal_score: f64,
    pub indicators: IndicatorConfig,
    pub rsi_levels: RsiLevels,
    pub weights: CategoryWeights,
    pub volume_categories: VolumeCategories,
    pub pattern_confidence: PatternConfidence,
    pub manipulation: ManipulationConfig,
    pub historical: HistoricalConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            min_signal_score: 70.0,
            indicators: IndicatorConfig::default(),
            rsi_levels: RsiLevels::default(),
            weights: CategoryWeights::default(),
            volume_categories: VolumeCategories::default(),
            pattern_confidence: PatternConfidence::default(),
            manipulation: ManipulationConfig::default(),
            historical: HistoricalConfig::default(),
        }
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

impl ConfigValidation for AnalysisConfig {
    fn validate(&self) -> ConfigResult<()> {
        let ind = &self.indicators;
        let periods = [
            ("rsi_period", ind.rsi_period),
            ("macd_fast", ind.macd_fast),
            ("macd_slow", ind.macd_slow),
            ("macd_signal", ind.macd_signal),
            ("bb_period", ind.bb_period),
            ("ema_fast", ind.ema_fast),
            ("ema_slow", ind.ema_slow),
            ("volume_ma_period", ind.volume_ma_period),
            ("trend_period", ind.trend_period),
            ("sr_window", ind.sr_window),
            ("atr_period", ind.atr_period),
            ("min_consolidation_period", self.manipulation.min_consolidation_period),
            ("whale_scan_depth", self.manipulation.whale_scan_depth),
            ("min_data_points", self.historical.min_data_points),
            ("move_window", self.historical.move_window),
            ("pre_window", self.historical.pre_window),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, period)| *period == 0) {
            return Err(invalid(format!("{name}은(는) 0보다 커야 합니다")));
        }

        if ind.macd_fast >= ind.macd_slow {
            return Err(invalid("MACD 빠른 기간은 느린 기간보다 작아야 합니다"));
        }
        if ind.ema_fast >= ind.ema_slow {
            return Err(invalid("EMA 빠른 기간은 느린 기간보다 작아야 합니다"));
        }
        if ind.bb_std <= 0.0 {
            return Err(invalid("볼린저 밴드 표준편차 배수는 0보다 커야 합니다"));
        }

        if !self.rsi_levels.as_array().windows(2).all(|w| w[0] < w[1]) {
            return Err(invalid("RSI 구간 경계는 오름차순이어야 합니다"));
        }
        let levels = self.rsi_levels.as_array();
        if levels[0] < 0.0 || levels[5] > 100.0 {
            return Err(invalid("RSI 구간 경계는 0-100 범위여야 합니다"));
        }

        for (name, weight) in self.weights.as_array() {
            if !(0.0..=1.0).contains(&weight) {
                return Err(invalid(format!("가중치 {name}은(는) 0-1 범위여야 합니다")));
            }
        }
        if self.weights.total() > 1.0 + 1e-9 {
            return Err(invalid(format!(
                "가중치 합계가 1을 초과합니다: {:.3}",
                self.weights.total()
            )));
        }

        let vc = &self.volume_categories;
        if !(vc.low > 0.0 && vc.low < vc.normal && vc.normal < vc.high && vc.high < vc.very_high) {
            return Err(invalid("거래량 구간은 양수이며 오름차순이어야 합니다"));
        }

        let pc = &self.pattern_confidence;
        let confidences = [
            pc.double_top,
            pc.double_bottom,
            pc.head_shoulders,
            pc.inverse_head_shoulders,
            pc.triangle,
            pc.flag,
            pc.wedge,
            pc.channel,
        ];
        if confidences.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(invalid("패턴 신뢰도는 0-1 범위여야 합니다"));
        }

        let m = &self.manipulation;
        let thresholds = [
            m.max_price_change_1,
            m.max_price_change_5,
            m.pump_volume_multiplier,
            m.max_consolidation_volatility,
            m.min_order_book_depth,
            m.max_spread_percent,
            m.whale_order_threshold,
            m.max_whale_dominance,
            self.historical.target_move_percent,
        ];
        if thresholds.iter().any(|t| !(*t > 0.0 && t.is_finite())) {
            return Err(invalid("조작 탐지 및 과거 분석 기준값은 양수여야 합니다"));
        }

        if !(0.0..=100.0).contains(&self.min_signal_score) {
            return Err(invalid("최소 신호 점수는 0-100 범위여야 합니다"));
        }

        Ok(())
    }
}
