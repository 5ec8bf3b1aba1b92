//! 종합 시장 분석
//!
//! 개별 분석기를 병렬로 실행하고 결과를 가중 합산해 하나의 매매 판단으로 묶습니다.
//! 조작 탐지기가 안전하지 않다고 판정하면 점수와 무관하게 거래 불가입니다.

use crate::analyzer::base::AnalysisOutput;
use crate::analyzer::historical_analyzer::{HistoricalAnalysis, HistoricalAnalyzer};
use crate::analyzer::manipulation_detector::{
    ManipulationAnalysis, ManipulationDetector, ManipulationType,
};
use crate::analyzer::orderbook_analyzer::{OrderBookAnalysis, OrderBookAnalyzer};
use crate::analyzer::pattern_analyzer::{PatternAnalysis, PatternAnalyzer};
use crate::analyzer::technical_analyzer::{TechnicalAnalysis, TechnicalAnalyzer};
use crate::analyzer::volume_analyzer::{VolumeAnalysis, VolumeAnalyzer, VolumeCategory};
use crate::config::{AnalysisConfig, CategoryWeights};
use crate::error::{AnalyzerResult, ensure_finite};
use crate::indicator::macd::MacdCrossover;
use crate::indicator::orderbook::OrderBook;
use crate::model::{Candle, Direction, RiskLevel, Severity, SignalQuality, Ticker, clamp_score};
use crate::predictor::{Prediction, PredictionFeatures, Predictor};
use chrono::{DateTime, Utc};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 안전하지 않은 시장의 점수 감쇠 비율
const UNSAFE_PENALTY: f64 = 0.5;
/// 가장 강한 패턴 신뢰도(0-1)에 곱하는 보너스 (최대 +10)
const PATTERN_BONUS: f64 = 10.0;
/// 과거 예측 점수 보너스 비율 (최대 +15)
const HISTORICAL_BONUS: f64 = 0.15;
const WIDE_SPREAD_PERCENT: f64 = 1.0;
const NEUTRAL_SUMMARY: &str = "중립적인 시장 상황";

/// 신호 신뢰도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    VeryHigh,
    High,
    Medium,
    Low,
}

/// 거래 위험 요인
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    pub severity: RiskLevel,
    pub description: String,
}

/// 분석기별 점수
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub technical: f64,
    pub volume: f64,
    pub orderbook: f64,
    pub pattern: f64,
    pub manipulation: f64,
    pub historical: f64,
}

/// 종합 분석 결과
///
/// 심볼과 시점마다 새로 생성되며 생성 후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveAnalysis {
    pub symbol: String,
    /// 마지막 캔들 시각
    pub timestamp: Option<DateTime<Utc>>,
    pub current_price: f64,

    pub overall_score: f64,
    pub signal_direction: Direction,
    pub confidence_level: ConfidenceLevel,
    pub signal_quality: SignalQuality,
    pub is_tradeable: bool,
    pub risk_factors: Vec<RiskFactor>,
    pub analysis_summary: Vec<String>,

    pub scores: ScoreBreakdown,
    pub technical: TechnicalAnalysis,
    pub volume: VolumeAnalysis,
    pub orderbook: OrderBookAnalysis,
    pub pattern: PatternAnalysis,
    pub manipulation: ManipulationAnalysis,
    pub historical: Option<HistoricalAnalysis>,

    /// 참고용 예측 (점수에 반영되지 않음)
    pub prediction: Option<Prediction>,
    /// 종합 단계 실패 여부
    pub error: bool,
}

impl ComprehensiveAnalysis {
    /// 종합 실패 시 반환하는 거래 불가 결과
    pub fn empty(symbol: &str) -> Self {
        ComprehensiveAnalysis {
            symbol: symbol.to_string(),
            timestamp: None,
            current_price: 0.0,
            overall_score: 0.0,
            signal_direction: Direction::Long,
            confidence_level: ConfidenceLevel::Low,
            signal_quality: SignalQuality::Low,
            is_tradeable: false,
            risk_factors: Vec::new(),
            analysis_summary: Vec::new(),
            scores: ScoreBreakdown::default(),
            technical: TechnicalAnalysis::empty(),
            volume: VolumeAnalysis::empty(),
            orderbook: OrderBookAnalysis::empty(),
            pattern: PatternAnalysis::empty(),
            manipulation: ManipulationAnalysis::empty(),
            historical: None,
            prediction: None,
            error: true,
        }
    }
}

/// 분석기 출력 묶음
struct AnalyzerOutputs {
    technical: TechnicalAnalysis,
    volume: VolumeAnalysis,
    pattern: PatternAnalysis,
    orderbook: OrderBookAnalysis,
    manipulation: ManipulationAnalysis,
    historical: Option<HistoricalAnalysis>,
}

/// 종합 시장 분석기
pub struct MarketAnalyzer {
    config: Arc<AnalysisConfig>,
    technical: TechnicalAnalyzer,
    volume: VolumeAnalyzer,
    pattern: PatternAnalyzer,
    orderbook: OrderBookAnalyzer,
    manipulation: ManipulationDetector,
    historical: HistoricalAnalyzer,
    predictor: Option<Box<dyn Predictor>>,
}

impl Default for MarketAnalyzer {
    fn default() -> Self {
        Self::new(Arc::new(AnalysisConfig::default()))
    }
}

impl MarketAnalyzer {
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        MarketAnalyzer {
            technical: TechnicalAnalyzer::new(Arc::clone(&config)),
            volume: VolumeAnalyzer::new(Arc::clone(&config)),
            pattern: PatternAnalyzer::new(Arc::clone(&config)),
            orderbook: OrderBookAnalyzer::new(Arc::clone(&config)),
            manipulation: ManipulationDetector::new(Arc::clone(&config)),
            historical: HistoricalAnalyzer::new(Arc::clone(&config)),
            predictor: None,
            config,
        }
    }

    /// 참고용 예측기 설정
    pub fn with_predictor(mut self, predictor: Box<dyn Predictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// 종합 분석
    ///
    /// 기술적/거래량/패턴 분석, 호가→조작 탐지, 과거 분석을 병렬로 실행한 뒤 합산합니다.
    /// 어떤 실패도 호출자에게 전파되지 않습니다.
    ///
    /// # Arguments
    /// * `symbol` - 분석 대상 심볼
    /// * `candles` - 시간순 캔들
    /// * `orderbook` - 호가 스냅샷
    /// * `ticker` - 티커 (`last`만 사용, 0 이하이면 마지막 종가 사용)
    /// * `historical` - 과거 분석용 긴 시계열 (없으면 `candles` 사용)
    ///
    /// # Returns
    /// * `ComprehensiveAnalysis` - 종합 단계 실패 시 `error = true`인 빈 결과
    pub fn analyze_comprehensive<C: Candle>(
        &self,
        symbol: &str,
        candles: &[C],
        orderbook: &OrderBook,
        ticker: &Ticker,
        historical: Option<&[C]>,
    ) -> ComprehensiveAnalysis {
        info!("[{}] 종합 분석 시작 (캔들 {}개)", symbol, candles.len());

        let current_price = if ticker.last > 0.0 {
            ticker.last
        } else {
            candles.last().map(|c| c.close_price()).unwrap_or(0.0)
        };
        let history = historical.unwrap_or(candles);
        let min_history = self.config.historical.min_data_points;

        let ((technical, (volume, pattern)), ((orderbook, manipulation), historical)) =
            rayon::join(
                || {
                    rayon::join(
                        || self.technical.analyze(symbol, candles),
                        || {
                            rayon::join(
                                || self.volume.analyze(symbol, candles),
                                || self.pattern.analyze(symbol, candles),
                            )
                        },
                    )
                },
                || {
                    rayon::join(
                        || {
                            let book = self.orderbook.analyze(symbol, orderbook, current_price);
                            let manipulation = self.manipulation.analyze(
                                symbol,
                                candles,
                                orderbook,
                                Some(&book.whale_analysis),
                            );
                            (book, manipulation)
                        },
                        || {
                            (history.len() >= min_history)
                                .then(|| self.historical.analyze(symbol, history))
                        },
                    )
                },
            );

        let outputs = AnalyzerOutputs {
            technical,
            volume,
            pattern,
            orderbook,
            manipulation,
            historical,
        };
        let timestamp = candles.last().map(|c| c.datetime());

        match self.combine(symbol, timestamp, current_price, outputs) {
            Ok(analysis) => {
                info!(
                    "[{}] 종합 분석 완료: 점수 {:.2}, 방향 {}, 거래 가능 {}",
                    symbol, analysis.overall_score, analysis.signal_direction, analysis.is_tradeable
                );
                analysis
            }
            Err(e) => {
                error!("[{}] 종합 분석 실패: {}", symbol, e);
                ComprehensiveAnalysis::empty(symbol)
            }
        }
    }

    fn combine(
        &self,
        symbol: &str,
        timestamp: Option<DateTime<Utc>>,
        current_price: f64,
        outputs: AnalyzerOutputs,
    ) -> AnalyzerResult<ComprehensiveAnalysis> {
        let AnalyzerOutputs {
            technical,
            volume,
            pattern,
            orderbook,
            manipulation,
            historical,
        } = outputs;

        let scores = ScoreBreakdown {
            technical: technical.score(),
            volume: volume.score(),
            orderbook: orderbook.score(),
            pattern: pattern.score(),
            manipulation: manipulation.score(),
            historical: historical.as_ref().map(|h| h.score()).unwrap_or(0.0),
        };

        let is_safe = manipulation.is_safe_to_trade;
        let mut overall = weighted_score(&scores, &self.config.weights);
        if !is_safe {
            overall *= UNSAFE_PENALTY;
        }
        if let Some(strongest) = &pattern.strongest_pattern {
            overall += strongest.confidence * PATTERN_BONUS;
        }
        if let Some(history) = historical.as_ref().filter(|h| h.has_historical_patterns) {
            overall += history.predictive_score * HISTORICAL_BONUS;
        }
        let overall_score = clamp_score(ensure_finite(overall, "overall_score")?);

        let signal_direction = vote_direction(&technical, &volume, &orderbook, &pattern);
        let confidence_level = confidence_level(overall_score, pattern.has_patterns, is_safe);
        let is_tradeable =
            overall_score >= self.config.min_signal_score && is_safe && orderbook.is_liquid;

        let prediction = self
            .predictor
            .as_ref()
            .map(|p| p.predict(&PredictionFeatures::from_analyses(&technical, &volume)));

        Ok(ComprehensiveAnalysis {
            symbol: symbol.to_string(),
            timestamp,
            current_price,
            overall_score,
            signal_direction,
            confidence_level,
            signal_quality: SignalQuality::from_score(overall_score),
            is_tradeable,
            risk_factors: risk_factors(&manipulation, &orderbook, &volume),
            analysis_summary: summary(
                &technical,
                &volume,
                &orderbook,
                &pattern,
                &manipulation,
                historical.as_ref(),
            ),
            scores,
            technical,
            volume,
            orderbook,
            pattern,
            manipulation,
            historical,
            prediction,
            error: false,
        })
    }
}

/// 가중 합산 점수 (감쇠/보너스 적용 전)
///
/// 기술적 점수는 내부에서 이미 추세/모멘텀 가중치로 합산된 값인데, 여기서
/// 추세+모멘텀 가중치로 한 번 더 곱해집니다. 조작 점수에는 지지/저항 가중치를 씁니다.
pub fn weighted_score(scores: &ScoreBreakdown, weights: &CategoryWeights) -> f64 {
    scores.technical * (weights.trend + weights.momentum)
        + scores.volume * weights.volume
        + scores.orderbook * weights.orderbook
        + scores.pattern * weights.pattern
        + scores.manipulation * weights.support_resistance
}

/// 방향 투표 (기술적 2표, 거래량/호가/패턴 각 1표, 동률은 롱)
fn vote_direction(
    technical: &TechnicalAnalysis,
    volume: &VolumeAnalysis,
    orderbook: &OrderBookAnalysis,
    pattern: &PatternAnalysis,
) -> Direction {
    let mut long_votes = 0;
    let mut short_votes = 0;

    match technical.signal_direction {
        Direction::Long => long_votes += 2,
        Direction::Short => short_votes += 2,
    }

    if volume.pressure_direction.is_bullish() {
        long_votes += 1;
    } else if volume.pressure_direction.is_bearish() {
        short_votes += 1;
    }

    if orderbook.market_pressure.is_bullish() {
        long_votes += 1;
    } else if orderbook.market_pressure.is_bearish() {
        short_votes += 1;
    }

    if pattern.bullish_patterns > pattern.bearish_patterns {
        long_votes += 1;
    } else if pattern.bearish_patterns > pattern.bullish_patterns {
        short_votes += 1;
    }

    if long_votes >= short_votes {
        Direction::Long
    } else {
        Direction::Short
    }
}

fn confidence_level(score: f64, has_patterns: bool, is_safe: bool) -> ConfidenceLevel {
    if !is_safe {
        return ConfidenceLevel::Low;
    }
    if score >= 85.0 && has_patterns {
        ConfidenceLevel::VeryHigh
    } else if score >= 75.0 {
        ConfidenceLevel::High
    } else if score >= 60.0 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

fn risk_factors(
    manipulation: &ManipulationAnalysis,
    orderbook: &OrderBookAnalysis,
    volume: &VolumeAnalysis,
) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    if manipulation.manipulation_type != ManipulationType::None {
        factors.push(RiskFactor {
            factor: "manipulation".to_string(),
            severity: manipulation.risk_level,
            description: format!(
                "조작 탐지 ({:?}, 위험 점수 {:.1})",
                manipulation.manipulation_type, manipulation.risk_points
            ),
        });
    }
    if !orderbook.is_liquid {
        factors.push(RiskFactor {
            factor: "liquidity".to_string(),
            severity: RiskLevel::High,
            description: format!("유동성 부족 (호가 깊이 ${:.0})", orderbook.total_depth_usd),
        });
    }
    if orderbook.spread_percent > WIDE_SPREAD_PERCENT {
        factors.push(RiskFactor {
            factor: "spread".to_string(),
            severity: RiskLevel::Medium,
            description: format!("넓은 스프레드 ({:.2}%)", orderbook.spread_percent),
        });
    }
    if volume.volume_category == VolumeCategory::VeryLow {
        factors.push(RiskFactor {
            factor: "volume".to_string(),
            severity: RiskLevel::Medium,
            description: format!("매우 낮은 거래량 (평균 대비 {:.2}배)", volume.volume_ratio),
        });
    }
    factors
}

/// 분석 요약 문장
///
/// 안전하지 않은 시장이면 심각도 High인 거절 사유를 하나씩 덧붙입니다.
fn summary(
    technical: &TechnicalAnalysis,
    volume: &VolumeAnalysis,
    orderbook: &OrderBookAnalysis,
    pattern: &PatternAnalysis,
    manipulation: &ManipulationAnalysis,
    historical: Option<&HistoricalAnalysis>,
) -> Vec<String> {
    let mut lines = Vec::new();

    if technical.rsi_level.is_oversold() {
        lines.push(format!("• RSI 과매도 ({:.1}), 매수 기회", technical.rsi));
    } else if technical.rsi_level.is_overbought() {
        lines.push(format!("• RSI 과매수 ({:.1}), 주의", technical.rsi));
    }
    if technical.macd_crossover == MacdCrossover::Bullish {
        lines.push("• MACD 상승 교차".to_string());
    }
    if technical.trend.is_up() {
        lines.push(format!("• 상승 추세 (강도 {:.2})", technical.trend_strength));
    } else if technical.trend.is_down() {
        lines.push(format!("• 하락 추세 (강도 {:.2})", technical.trend_strength));
    }

    match volume.volume_category {
        VolumeCategory::VeryHigh => lines.push("• 매우 높은 거래량".to_string()),
        VolumeCategory::High => lines.push("• 높은 거래량".to_string()),
        _ => {}
    }
    if volume.is_volume_spike {
        lines.push(format!("• 거래량 급증 (평균 대비 {:.1}배)", volume.volume_ratio));
    }

    if orderbook.has_strong_support {
        lines.push("• 강한 매수벽 지지".to_string());
    }
    if orderbook.has_strong_resistance {
        lines.push("• 강한 매도벽 저항".to_string());
    }

    if let Some(strongest) = &pattern.strongest_pattern {
        lines.push(format!(
            "• 패턴: {} (신뢰도 {:.0}%)",
            strongest.description,
            strongest.confidence * 100.0
        ));
    }

    if !manipulation.is_safe_to_trade {
        lines.extend(
            manipulation
                .rejection_reasons
                .iter()
                .filter(|r| r.severity == Severity::High)
                .map(|r| format!("• 조작 위험: {}", r.description)),
        );
    }

    if let Some(history) = historical.filter(|h| h.has_historical_patterns) {
        lines.push(format!(
            "• 과거 급등락 {}회 (예측 점수 {:.1})",
            history.patterns_found, history.predictive_score
        ));
    }

    if lines.is_empty() {
        lines.push(format!("• {NEUTRAL_SUMMARY}"));
    }
    lines
}
