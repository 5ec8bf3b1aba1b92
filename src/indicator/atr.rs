/// 진폭(True Range) 계산
///
/// 고가-저가, |고가-직전 종가|, |저가-직전 종가| 중 최댓값
fn true_range(high: f64, low: f64, previous_close: f64) -> f64 {
    (high - low)
        .max((high - previous_close).abs())
        .max((low - previous_close).abs())
}

/// 평균 진폭(ATR) 계산
///
/// 마지막 `period`개 True Range의 단순 평균입니다.
///
/// # Arguments
/// * `highs` - 고가 배열
/// * `lows` - 저가 배열
/// * `closes` - 종가 배열
/// * `period` - ATR 기간
///
/// # Returns
/// * `f64` - ATR 값 (데이터가 `period + 1`개 미만이면 0)
pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    let n = highs.len().min(lows.len()).min(closes.len());
    if period == 0 || n < period + 1 {
        return 0.0;
    }

    let total: f64 = (n - period..n)
        .map(|i| true_range(highs[i], lows[i], closes[i - 1]))
        .sum();
    total / period as f64
}
