use super::aligned_output;
use ta_lib::simple_moving_average;

/// 단순이동평균(SMA) 시계열 계산
///
/// 인덱스 `period - 1`부터 마지막까지 롤링 평균을 반환합니다.
///
/// # Arguments
/// * `values` - 가격 데이터 배열 (시간순)
/// * `period` - 계산 기간
///
/// # Returns
/// * `Vec<f64>` - SMA 시계열 (데이터가 `period`보다 적거나 `period`가 0이면 빈 벡터)
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    if period == 1 {
        return values.to_vec();
    }

    // ta-lib으로 SMA 계산
    match simple_moving_average(values, Some(period)) {
        Ok((result, _)) => aligned_output(result, values.len(), period),
        Err(_) => Vec::new(),
    }
}

/// 마지막 SMA 값
///
/// # Returns
/// * `Option<f64>` - 데이터가 부족하면 None
pub fn calculate_sma_last(values: &[f64], period: usize) -> Option<f64> {
    calculate_sma(values, period).last().copied()
}
