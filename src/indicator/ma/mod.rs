//! 이동평균 계산
//!
//! 계산은 ta-lib에 맡기고, 데이터가 부족하면 빈 시계열을 반환합니다.

pub mod ema;
pub mod sma;

pub use ema::calculate_ema;
pub use sma::{calculate_sma, calculate_sma_last};

/// ta-lib 출력을 `len - period + 1` 길이로 맞춤
///
/// 앞쪽 lookback 구간이 채워져 오는 경우 그 부분을 잘라 마지막 원소가 최신 값이 되게 합니다.
fn aligned_output(mut result: Vec<f64>, len: usize, period: usize) -> Vec<f64> {
    let expected = len + 1 - period;
    let skip = result.len().saturating_sub(expected);
    result.split_off(skip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_output_drops_lookback_padding() {
        let padded = vec![0.0, 0.0, 2.0, 3.0, 4.0];
        assert_eq!(aligned_output(padded, 5, 3), vec![2.0, 3.0, 4.0]);
        assert_eq!(aligned_output(vec![2.0, 3.0, 4.0], 5, 3), vec![2.0, 3.0, 4.0]);
    }
}
