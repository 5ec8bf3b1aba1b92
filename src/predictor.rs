//! 방향 예측
//!
//! 예측은 참고용입니다. 종합 점수와 거래 가능 판정에는 반영되지 않습니다.

use crate::analyzer::technical_analyzer::TechnicalAnalysis;
use crate::analyzer::volume_analyzer::VolumeAnalysis;
use crate::model::Direction;
use serde::{Deserialize, Serialize};

const MAX_EXPECTED_MOVE: f64 = 15.0;
const MAX_CONFIDENCE: f64 = 85.0;

/// 예측 입력값
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionFeatures {
    pub rsi: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub volume_ratio: f64,
    /// 상승 추세면 양수, 하락 추세면 음수, 횡보면 0
    pub trend_strength: f64,
}

impl PredictionFeatures {
    /// 기술적/거래량 분석 결과에서 입력값 추출
    pub fn from_analyses(technical: &TechnicalAnalysis, volume: &VolumeAnalysis) -> Self {
        let trend_strength = if technical.trend.is_up() {
            technical.trend_strength
        } else if technical.trend.is_down() {
            -technical.trend_strength
        } else {
            0.0
        };

        PredictionFeatures {
            rsi: technical.rsi,
            macd_line: technical.macd.macd_line,
            macd_signal: technical.macd.signal_line,
            volume_ratio: volume.volume_ratio,
            trend_strength,
        }
    }
}

/// 예측 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub direction: Direction,
    /// 예상 변동폭 (%)
    pub expected_move_percent: f64,
    /// 0-1 신뢰도
    pub confidence: f64,
}

/// 방향 예측기
///
/// 학습 모델을 붙일 때도 이 트레이트만 구현하면 됩니다.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &PredictionFeatures) -> Prediction;
}

/// 지표 투표 기반 휴리스틱 예측기
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPredictor;

impl HeuristicPredictor {
    fn votes(features: &PredictionFeatures) -> i32 {
        let mut votes = 0;

        if features.rsi < 40.0 {
            votes += 2;
        } else if features.rsi > 60.0 {
            votes -= 2;
        }

        if features.macd_line > features.macd_signal {
            votes += 2;
        } else {
            votes -= 2;
        }

        if features.volume_ratio > 1.5 {
            votes += 1;
        }

        if features.trend_strength > 0.0 {
            votes += 1;
        } else if features.trend_strength < 0.0 {
            votes -= 1;
        }

        votes
    }
}

impl Predictor for HeuristicPredictor {
    fn predict(&self, features: &PredictionFeatures) -> Prediction {
        let votes = Self::votes(features);
        let magnitude = votes.unsigned_abs() as f64;

        Prediction {
            direction: if votes > 0 {
                Direction::Long
            } else {
                Direction::Short
            },
            expected_move_percent: (magnitude * 2.0).min(MAX_EXPECTED_MOVE),
            confidence: (magnitude * 15.0).min(MAX_CONFIDENCE) / 100.0,
        }
    }
}
