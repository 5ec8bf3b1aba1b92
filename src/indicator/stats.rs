//! 기술 통계 유틸리티
//!
//! 빈 입력이나 분모가 0인 경우 NaN 대신 0을 반환합니다.

/// 산술 평균
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 모표준편차 (n으로 나눔)
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values
        .iter()
        .map(|&x| {
            let diff = x - avg;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// 변동계수 (표준편차 / 평균)
///
/// 평균이 0이면 0을 반환합니다.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let avg = mean(values);
    if avg == 0.0 {
        return 0.0;
    }
    std_dev(values) / avg
}

/// 피어슨 상관계수
///
/// # Arguments
/// * `xs` - 첫 번째 시계열
/// * `ys` - 두 번째 시계열 (길이가 다르면 짧은 쪽에 맞춤)
///
/// # Returns
/// * `f64` - 상관계수 [-1, 1], 분산이 0이거나 데이터가 2개 미만이면 0
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let xs = &xs[..n];
    let ys = &ys[..n];
    let mean_x = mean(xs);
    let mean_y = mean(ys);

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let r = covariance / denominator;
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

/// 마지막 `count`개 원소 슬라이스 (데이터가 적으면 전체)
pub fn tail<T>(values: &[T], count: usize) -> &[T] {
    &values[values.len().saturating_sub(count)..]
}

/// 최댓값 (빈 입력이면 None)
pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// 최솟값 (빈 입력이면 None)
pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}
