/// RSI 계산 함수
///
/// 마지막 `period`개 가격 변화량의 단순 평균 상승폭/하락폭으로 계산합니다.
///
/// # Arguments
/// * `values` - 종가 배열 (시간순)
/// * `period` - RSI 기간
///
/// # Returns
/// * `f64` - RSI 값 (0-100). 데이터가 `period + 1`개 미만이거나 가격 변화가 전혀 없으면 50
pub fn calculate_rsi(values: &[f64], period: usize) -> f64 {
    if period == 0 || values.len() < period + 1 {
        return 50.0;
    }

    let start = values.len() - period - 1;
    let mut gains = 0.0;
    let mut losses = 0.0;

    // 가격 변화량 계산
    for pair in values[start..].windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        // 하락이 없으면 100이지만, 상승도 없는 평탄 구간은 100이 아닌 중립 50
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - (100.0 / (1.0 + rs));
    if rsi.is_finite() { rsi } else { 50.0 }
}
