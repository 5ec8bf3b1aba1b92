//! 고점/저점 탐지

/// 국소 고점 인덱스 탐지
///
/// 양쪽 `prominence`개 이웃 모두보다 엄격하게 큰 지점만 고점으로 인정합니다.
///
/// # Arguments
/// * `values` - 가격 배열
/// * `prominence` - 비교할 이웃 수 (한쪽 기준)
///
/// # Returns
/// * `Vec<usize>` - 오름차순 인덱스
pub fn find_peaks(values: &[f64], prominence: usize) -> Vec<usize> {
    find_extrema(values, prominence, |center, neighbor| center > neighbor)
}

/// 국소 저점 인덱스 탐지
///
/// 양쪽 `prominence`개 이웃 모두보다 엄격하게 작은 지점만 저점으로 인정합니다.
pub fn find_valleys(values: &[f64], prominence: usize) -> Vec<usize> {
    find_extrema(values, prominence, |center, neighbor| center < neighbor)
}

fn find_extrema(values: &[f64], prominence: usize, beats: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    if prominence == 0 || values.len() < 2 * prominence + 1 {
        return Vec::new();
    }

    (prominence..values.len() - prominence)
        .filter(|&i| {
            (1..=prominence)
                .all(|j| beats(values[i], values[i - j]) && beats(values[i], values[i + j]))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_peaks() {
        let values = [1.0, 3.0, 2.0, 1.0, 2.0, 5.0, 2.0, 1.0];
        assert_eq!(find_peaks(&values, 1), vec![1, 5]);
        assert_eq!(find_peaks(&values, 2), vec![5]);
    }

    #[test]
    fn test_find_valleys() {
        let values = [5.0, 3.0, 4.0, 5.0, 4.0, 1.0, 4.0, 5.0];
        assert_eq!(find_valleys(&values, 1), vec![1, 5]);
        assert_eq!(find_valleys(&values, 2), vec![5]);
    }

    #[test]
    fn test_plateau_is_not_a_peak() {
        let values = [1.0, 2.0, 2.0, 1.0];
        assert!(find_peaks(&values, 1).is_empty());
    }

    #[test]
    fn test_short_series() {
        assert!(find_peaks(&[1.0, 2.0], 1).is_empty());
        assert!(find_valleys(&[], 2).is_empty());
    }
}
