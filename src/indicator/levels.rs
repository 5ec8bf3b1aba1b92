//! 지지/저항 레벨 계산

use std::cmp::Ordering;

/// 인접 레벨 병합 기준 (2%)
pub const LEVEL_MERGE_THRESHOLD: f64 = 0.02;

/// 지지/저항 레벨
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupportResistance {
    /// 지지 레벨 (오름차순)
    pub supports: Vec<f64>,
    /// 저항 레벨 (오름차순)
    pub resistances: Vec<f64>,
}

/// 지지/저항 레벨 계산
///
/// 인덱스 `i`의 가격이 중심 `2·window+1` 구간의 최솟값이면 지지,
/// 최댓값이면 저항 후보가 되고, 2% 이내 레벨은 평균으로 병합됩니다.
///
/// # Arguments
/// * `prices` - 가격 배열 (시간순)
/// * `window` - 한쪽 이웃 크기
///
/// # Returns
/// * `SupportResistance` - 데이터가 `window`보다 적으면 빈 결과
pub fn support_resistance(prices: &[f64], window: usize) -> SupportResistance {
    if prices.len() < window || prices.len() <= 2 * window {
        return SupportResistance::default();
    }

    let mut supports = Vec::new();
    let mut resistances = Vec::new();

    for i in window..prices.len() - window {
        let neighborhood = &prices[i - window..=i + window];
        let price = prices[i];
        if neighborhood.iter().all(|&p| price <= p) {
            supports.push(price);
        }
        if neighborhood.iter().all(|&p| price >= p) {
            resistances.push(price);
        }
    }

    SupportResistance {
        supports: merge_similar_levels(supports, LEVEL_MERGE_THRESHOLD),
        resistances: merge_similar_levels(resistances, LEVEL_MERGE_THRESHOLD),
    }
}

/// 서로 가까운 레벨을 병합
///
/// 정렬 후 직전 병합 레벨과의 상대 거리가 `threshold` 이하이면 두 값의 평균으로 대체합니다.
pub fn merge_similar_levels(mut levels: Vec<f64>, threshold: f64) -> Vec<f64> {
    levels.retain(|level| level.is_finite());
    levels.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mut merged: Vec<f64> = Vec::with_capacity(levels.len());
    for level in levels {
        match merged.last_mut() {
            Some(last) if is_similar(*last, level, threshold) => *last = (*last + level) / 2.0,
            _ => merged.push(level),
        }
    }
    merged
}

fn is_similar(reference: f64, level: f64, threshold: f64) -> bool {
    if reference == 0.0 {
        return level == 0.0;
    }
    ((level - reference) / reference).abs() <= threshold
}
