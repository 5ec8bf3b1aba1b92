use crate::indicator::ma::calculate_ema;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// MACD 라인과 시그널 라인의 상대 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdCrossover {
    /// MACD 라인이 시그널 라인 위
    Bullish,
    /// MACD 라인이 시그널 라인 아래이거나 같음
    Bearish,
    /// 계산 불가
    Neutral,
}

/// MACD(Moving Average Convergence Divergence) 기술적 지표
///
/// MACD는 추세 추종 모멘텀 지표로, 추세의 방향과 강도를 나타냅니다.
/// 데이터가 부족하면 세 값이 모두 0이며, 호출자는 이를 "계산 불가"로 취급합니다.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    /// MACD 라인 (빠른 EMA - 느린 EMA)
    pub macd_line: f64,
    /// 시그널 라인 (MACD의 EMA)
    pub signal_line: f64,
    /// 히스토그램 (MACD - 시그널)
    pub histogram: f64,
}

impl Display for Macd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({:.4}, {:.4}, {:.4})",
            self.macd_line, self.signal_line, self.histogram
        )
    }
}

/// MACD 라인 시계열 계산
///
/// 빠른 EMA와 느린 EMA를 같은 캔들 기준으로 정렬해서 차이를 구합니다.
/// 결과 길이는 `values.len() - slow_period + 1` 입니다.
///
/// # Returns
/// * `Vec<f64>` - MACD 라인 시계열 (데이터가 부족하면 빈 벡터)
pub fn calculate_macd_line(values: &[f64], fast_period: usize, slow_period: usize) -> Vec<f64> {
    if fast_period == 0 || fast_period >= slow_period || values.len() < slow_period {
        return Vec::new();
    }

    let fast = calculate_ema(values, fast_period);
    let slow = calculate_ema(values, slow_period);
    let offset = slow_period - fast_period;

    slow.iter()
        .enumerate()
        .map(|(i, slow_ema)| fast[i + offset] - slow_ema)
        .collect()
}

impl Macd {
    /// 종가 배열에서 MACD 계산
    ///
    /// # Arguments
    /// * `values` - 종가 배열 (시간순)
    /// * `fast_period` - 빠른 EMA 기간 (일반적으로 12)
    /// * `slow_period` - 느린 EMA 기간 (일반적으로 26)
    /// * `signal_period` - 시그널 라인 기간 (일반적으로 9)
    ///
    /// # Returns
    /// * `Macd` - 계산된 MACD. `values.len() < slow_period`이면 모두 0.
    ///   MACD 라인 시계열이 `signal_period`보다 짧으면 시그널은 0
    pub fn calculate(
        values: &[f64],
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Self {
        let line = calculate_macd_line(values, fast_period, slow_period);
        let Some(&macd_line) = line.last() else {
            return Macd::default();
        };

        let signal_line = calculate_ema(&line, signal_period)
            .last()
            .copied()
            .unwrap_or(0.0);

        Macd {
            macd_line,
            signal_line,
            histogram: macd_line - signal_line,
        }
    }

    /// 계산 가능 여부 (세 값이 모두 0이면 불가)
    pub fn is_available(&self) -> bool {
        self.macd_line != 0.0 || self.signal_line != 0.0 || self.histogram != 0.0
    }

    /// MACD 라인과 시그널 라인의 상대 위치
    pub fn crossover(&self) -> MacdCrossover {
        if !self.is_available() {
            MacdCrossover::Neutral
        } else if self.macd_line > self.signal_line {
            MacdCrossover::Bullish
        } else {
            MacdCrossover::Bearish
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macd_insufficient_data() {
        let values: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let macd = Macd::calculate(&values, 12, 26, 9);
        assert_eq!(macd, Macd::default());
        assert!(!macd.is_available());
        assert_eq!(macd.crossover(), MacdCrossover::Neutral);
    }

    #[test]
    fn test_macd_line_alignment() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let line = calculate_macd_line(&values, 12, 26);
        assert_eq!(line.len(), 40 - 26 + 1);

        let fast = calculate_ema(&values, 12);
        let slow = calculate_ema(&values, 26);
        let last = fast.last().copied().unwrap_or_default() - slow.last().copied().unwrap_or_default();
        assert!((line.last().copied().unwrap_or_default() - last).abs() < 1e-12);
    }

    #[test]
    fn test_macd_uptrend_is_positive() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let macd = Macd::calculate(&values, 12, 26, 9);
        assert!(macd.is_available());
        assert!(macd.macd_line > 0.0);
        assert_eq!(macd.crossover(), MacdCrossover::Bullish);
        assert!((macd.histogram - (macd.macd_line - macd.signal_line)).abs() < 1e-12);
    }

    #[test]
    fn test_macd_signal_zero_when_line_too_short() {
        // 라인 길이 5 < 시그널 기간 9
        let values: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64).sin()).collect();
        let macd = Macd::calculate(&values, 12, 26, 9);
        assert_eq!(macd.signal_line, 0.0);
        assert_eq!(macd.histogram, macd.macd_line);
    }

    #[test]
    fn test_macd_flat_series_unavailable() {
        let values = vec![100.0; 60];
        let macd = Macd::calculate(&values, 12, 26, 9);
        assert!(!macd.is_available());
    }
}
