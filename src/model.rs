use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// OHLCV 캔들 공통 인터페이스
///
/// 분석기는 모두 이 트레이트에 대해 제네릭으로 동작합니다.
/// 거래소 어댑터는 자체 캔들 타입에 이 트레이트를 구현해서 넘기면 됩니다.
pub trait Candle: Clone + Debug + Send + Sync {
    /// 캔들 시작 시각
    fn datetime(&self) -> DateTime<Utc>;
    /// 시가
    fn open_price(&self) -> f64;
    /// 고가
    fn high_price(&self) -> f64;
    /// 저가
    fn low_price(&self) -> f64;
    /// 종가
    fn close_price(&self) -> f64;
    /// 거래량
    fn volume(&self) -> f64;

    /// 몸통 크기 (|종가 - 시가|)
    fn body(&self) -> f64 {
        (self.close_price() - self.open_price()).abs()
    }

    /// 고가와 저가 사이 전체 범위
    fn range(&self) -> f64 {
        self.high_price() - self.low_price()
    }

    /// 윗꼬리 길이
    fn upper_wick(&self) -> f64 {
        self.high_price() - self.open_price().max(self.close_price())
    }

    /// 아랫꼬리 길이
    fn lower_wick(&self) -> f64 {
        self.open_price().min(self.close_price()) - self.low_price()
    }

    /// 대표가격 (고가 + 저가 + 종가) / 3
    fn typical_price(&self) -> f64 {
        (self.high_price() + self.low_price() + self.close_price()) / 3.0
    }

    /// 양봉 여부
    fn is_bullish(&self) -> bool {
        self.close_price() > self.open_price()
    }

    /// 음봉 여부
    fn is_bearish(&self) -> bool {
        self.close_price() < self.open_price()
    }

    /// 모든 가격/거래량 값이 유한한지 확인
    fn is_finite(&self) -> bool {
        self.open_price().is_finite()
            && self.high_price().is_finite()
            && self.low_price().is_finite()
            && self.close_price().is_finite()
            && self.volume().is_finite()
    }
}

/// 거래소에서 받은 기본 OHLCV 캔들
///
/// `timestamp`는 밀리초 단위 유닉스 시간입니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvCandle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvCandle {
    /// 새 캔들 생성
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        OhlcvCandle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// `[ts, open, high, low, close, volume]` 행에서 캔들 생성
    pub fn from_row(row: [f64; 6]) -> Self {
        OhlcvCandle::new(row[0] as i64, row[1], row[2], row[3], row[4], row[5])
    }
}

impl Display for OhlcvCandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Candle(t={}, o={}, h={}, l={}, c={}, v={})",
            self.timestamp, self.open, self.high, self.low, self.close, self.volume
        )
    }
}

impl Candle for OhlcvCandle {
    fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }
    fn open_price(&self) -> f64 {
        self.open
    }
    fn high_price(&self) -> f64 {
        self.high
    }
    fn low_price(&self) -> f64 {
        self.low
    }
    fn close_price(&self) -> f64 {
        self.close
    }
    fn volume(&self) -> f64 {
        self.volume
    }
}

/// 티커 스냅샷
///
/// 분석 코어는 `last`(현재가)만 사용합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ticker {
    pub last: f64,
    pub bid: f64,
    pub ask: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub quote_volume: f64,
}

impl Ticker {
    /// 현재가만 가진 티커 생성
    pub fn with_last(last: f64) -> Self {
        Ticker {
            last,
            ..Default::default()
        }
    }
}

/// 신호 방향
///
/// 최종 결과에는 중립이 없습니다. 동률은 Long으로 처리됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// 롱 (매수)
    Long,
    /// 숏 (매도)
    Short,
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// 압력/패턴 방향성
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    StrongBearish,
}

impl Bias {
    /// 강세 계열인지 확인
    pub fn is_bullish(&self) -> bool {
        matches!(self, Bias::StrongBullish | Bias::Bullish)
    }

    /// 약세 계열인지 확인
    pub fn is_bearish(&self) -> bool {
        matches!(self, Bias::StrongBearish | Bias::Bearish)
    }
}

/// 위험 등급
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Extreme,
    /// 분석 불가
    Unknown,
}

/// 거절 사유 심각도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
}

/// 신호 품질 등급
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalQuality {
    Excellent,
    High,
    Medium,
    Low,
}

impl SignalQuality {
    /// 종합 점수로부터 품질 등급 결정 (90 / 75 / 60 경계)
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            SignalQuality::Excellent
        } else if score >= 75.0 {
            SignalQuality::High
        } else if score >= 60.0 {
            SignalQuality::Medium
        } else {
            SignalQuality::Low
        }
    }
}

/// 점수를 [0, 100] 범위로 제한합니다. NaN은 0으로 취급합니다.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candle_anatomy() {
        let candle = OhlcvCandle::new(0, 100.0, 110.0, 90.0, 105.0, 1000.0);
        assert_eq!(candle.body(), 5.0);
        assert_eq!(candle.range(), 20.0);
        assert_eq!(candle.upper_wick(), 5.0);
        assert_eq!(candle.lower_wick(), 10.0);
        assert!(candle.is_bullish());
        assert!(!candle.is_bearish());
        assert!((candle.typical_price() - 101.666_666).abs() < 1e-4);
    }

    #[test]
    fn test_from_row_uses_millisecond_timestamp() {
        let candle = OhlcvCandle::from_row([1_700_000_000_000.0, 1.0, 2.0, 0.5, 1.5, 10.0]);
        assert_eq!(candle.timestamp, 1_700_000_000_000);
        assert_eq!(candle.datetime().timestamp(), 1_700_000_000);
        assert_eq!(candle.close_price(), 1.5);
    }

    #[test]
    fn test_non_finite_candle() {
        let candle = OhlcvCandle::new(0, 1.0, f64::NAN, 1.0, 1.0, 1.0);
        assert!(!candle.is_finite());
    }

    #[test]
    fn test_signal_quality_tiers() {
        assert_eq!(SignalQuality::from_score(95.0), SignalQuality::Excellent);
        assert_eq!(SignalQuality::from_score(90.0), SignalQuality::Excellent);
        assert_eq!(SignalQuality::from_score(80.0), SignalQuality::High);
        assert_eq!(SignalQuality::from_score(60.0), SignalQuality::Medium);
        assert_eq!(SignalQuality::from_score(59.9), SignalQuality::Low);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(130.0), 100.0);
        assert_eq!(clamp_score(-5.0), 0.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(42.0), 42.0);
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::Long).unwrap(), "\"LONG\"");
        assert_eq!(
            serde_json::to_string(&RiskLevel::Extreme).unwrap(),
            "\"EXTREME\""
        );
        assert_eq!(
            serde_json::to_string(&Bias::StrongBullish).unwrap(),
            "\"strong_bullish\""
        );
    }
}
