use crate::indicator::stats::{mean, std_dev, tail};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 볼린저 밴드 내 가격 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandPosition {
    AboveUpper,
    /// 밴드 폭이 0이거나 계산 불가
    Middle,
    UpperHalf,
    LowerHalf,
    BelowLower,
}

/// 볼린저 밴드 기술적 지표
///
/// 최근 `period`개 종가의 SMA ± k·표준편차(모표준편차)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    /// 상단 밴드
    pub upper: f64,
    /// 중간 밴드 (SMA)
    pub middle: f64,
    /// 하단 밴드
    pub lower: f64,
}

impl Display for BollingerBands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BBand({:.2}, {:.2}, {:.2})",
            self.upper, self.middle, self.lower
        )
    }
}

impl BollingerBands {
    /// 볼린저 밴드 계산
    ///
    /// # Arguments
    /// * `values` - 종가 배열 (시간순)
    /// * `period` - 이동평균 기간 (일반적으로 20)
    /// * `multiplier` - 표준편차 배수 (일반적으로 2.0)
    ///
    /// # Returns
    /// * `BollingerBands` - 데이터가 부족하면 마지막 가격(없으면 0)으로 세 밴드가 같음
    pub fn calculate(values: &[f64], period: usize, multiplier: f64) -> Self {
        if period == 0 || values.len() < period {
            let price = values.last().copied().unwrap_or(0.0);
            return BollingerBands {
                upper: price,
                middle: price,
                lower: price,
            };
        }

        let window = tail(values, period);
        let middle = mean(window);
        let deviation = std_dev(window) * multiplier;

        BollingerBands {
            upper: middle + deviation,
            middle,
            lower: middle - deviation,
        }
    }

    /// 밴드 폭 (상단 - 하단)
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// 밴드 내 상대 위치 (0 = 하단, 1 = 상단)
    ///
    /// 밴드 폭이 0이면 None
    pub fn percent_b(&self, price: f64) -> Option<f64> {
        let width = self.width();
        if width <= 0.0 {
            return None;
        }
        Some((price - self.lower) / width)
    }

    /// 가격의 밴드 위치 분류
    ///
    /// 경계값은 아래쪽 구간에 속합니다 (중간선과 같으면 하단 절반).
    pub fn position(&self, price: f64) -> BandPosition {
        if self.width() <= 0.0 {
            BandPosition::Middle
        } else if price > self.upper {
            BandPosition::AboveUpper
        } else if price > self.middle {
            BandPosition::UpperHalf
        } else if price > self.lower {
            BandPosition::LowerHalf
        } else {
            BandPosition::BelowLower
        }
    }
}
