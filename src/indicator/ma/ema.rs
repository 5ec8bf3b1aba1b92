use super::aligned_output;
use ta_lib::exponential_moving_average;

/// 지수이동평균(EMA) 시계열 계산
///
/// 첫 값은 처음 `period`개 데이터의 SMA로 시작하고, 이후 데이터마다 한 스텝씩 갱신합니다.
/// 결과 길이는 `values.len() - period + 1`이며 마지막 원소가 최신 EMA입니다.
///
/// # Returns
/// * `Vec<f64>` - EMA 시계열 (데이터가 부족하면 빈 벡터)
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    if period == 1 {
        return values.to_vec();
    }

    // ta-lib으로 EMA 계산
    match exponential_moving_average(values, Some(period)) {
        Ok((result, _)) => aligned_output(result, values.len(), period),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_seeded_from_sma() {
        let values = [2.0, 4.0, 6.0, 8.0];
        let ema = calculate_ema(&values, 3);
        assert_eq!(ema.len(), 2);
        assert!((ema[0] - 4.0).abs() < 1e-9);
        // alpha = 0.5 -> 0.5 * 8 + 0.5 * 4
        assert!((ema[1] - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_ema_insufficient_data() {
        assert!(calculate_ema(&[1.0, 2.0], 3).is_empty());
        assert!(calculate_ema(&[], 1).is_empty());
    }

    #[test]
    fn test_ema_constant_series() {
        let values = vec![10.0; 30];
        let ema = calculate_ema(&values, 9);
        assert_eq!(ema.len(), 22);
        assert!(ema.iter().all(|v| (*v - 10.0).abs() < 1e-9));
    }
}
