use serde::{Deserialize, Serialize};

/// 최소제곱 선형회귀 기울기
///
/// x축은 0, 1, 2, ... 인덱스입니다.
///
/// # Returns
/// * `f64` - 기울기 (데이터가 2개 미만이면 0)
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n_f;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        numerator += dx * (y - mean_y);
        denominator += dx * dx;
    }

    if denominator == 0.0 {
        return 0.0;
    }
    let slope = numerator / denominator;
    if slope.is_finite() { slope } else { 0.0 }
}

/// 추세 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendState {
    StrongUptrend,
    Uptrend,
    Sideways,
    Downtrend,
    StrongDowntrend,
}

impl TrendState {
    pub fn is_up(&self) -> bool {
        matches!(self, TrendState::StrongUptrend | TrendState::Uptrend)
    }

    pub fn is_down(&self) -> bool {
        matches!(self, TrendState::StrongDowntrend | TrendState::Downtrend)
    }
}

/// 추세 판정 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub state: TrendState,
    /// |기울기| / 평균가격 · 100 · 기간
    pub strength: f64,
}

impl Trend {
    /// 횡보, 강도 0
    pub fn sideways() -> Self {
        Trend {
            state: TrendState::Sideways,
            strength: 0.0,
        }
    }
}

/// 마지막 `period`개 가격의 회귀 기울기로 추세 판정
///
/// 강도가 5 초과면 강한 추세, 2 초과면 추세, 그 외는 횡보입니다.
/// 데이터가 부족하거나 평균 가격이 0이면 횡보(강도 0)를 반환합니다.
pub fn detect_trend(values: &[f64], period: usize) -> Trend {
    if period < 2 || values.len() < period {
        return Trend::sideways();
    }

    let window = &values[values.len() - period..];
    let slope = linear_slope(window);
    let avg = window.iter().sum::<f64>() / period as f64;
    if avg == 0.0 {
        return Trend::sideways();
    }

    let strength = slope.abs() / avg * 100.0 * period as f64;
    if !strength.is_finite() {
        return Trend::sideways();
    }

    let state = match (slope > 0.0, strength) {
        (true, s) if s > 5.0 => TrendState::StrongUptrend,
        (true, s) if s > 2.0 => TrendState::Uptrend,
        (false, s) if s > 5.0 => TrendState::StrongDowntrend,
        (false, s) if s > 2.0 => TrendState::Downtrend,
        _ => TrendState::Sideways,
    };

    Trend { state, strength }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_slope() {
        assert_eq!(linear_slope(&[1.0, 3.0, 5.0, 7.0]), 2.0);
        assert_eq!(linear_slope(&[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(linear_slope(&[1.0]), 0.0);
        assert_eq!(linear_slope(&[]), 0.0);
    }

    #[test]
    fn test_detect_strong_uptrend() {
        let values: Vec<f64> = (0..96).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let trend = detect_trend(&values, 20);
        assert_eq!(trend.state, TrendState::StrongUptrend);
        assert!(trend.strength > 5.0);
    }

    #[test]
    fn test_detect_downtrend() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 - i as f64 * 0.15).collect();
        let trend = detect_trend(&values, 20);
        assert!(trend.state.is_down());
    }

    #[test]
    fn test_detect_sideways() {
        let values = vec![100.0; 30];
        assert_eq!(detect_trend(&values, 20), Trend::sideways());
        assert_eq!(detect_trend(&values[..5], 20), Trend::sideways());
    }
}
