use common_test_utils::*;

use market_analysis::analyzer::base::AnalysisOutput;
use market_analysis::analyzer::historical_analyzer::{
    HistoricalAnalysis, HistoricalAnalyzer, MoveDirection, Reliability,
};

#[test]
fn test_insufficient_history() {
    let analyzer = HistoricalAnalyzer::default();
    let candles = create_geometric_uptrend(99, 100.0, 0.01);
    assert_eq!(analyzer.analyze("BTC/USDT", &candles), HistoricalAnalysis::empty());
}

#[test]
fn test_flat_history_has_no_moves() {
    let analyzer = HistoricalAnalyzer::default();
    let candles = create_flat_candles(150, 100.0, 1000.0);

    let result = analyzer.analyze("BTC/USDT", &candles);

    assert!(!result.has_historical_patterns);
    assert_eq!(result.patterns_found, 0);
    assert_eq!(result.predictive_score, 0.0);
    assert_eq!(result.reliability, Reliability::Low);
}

#[test]
fn test_steady_rally_counts_every_window() {
    let analyzer = HistoricalAnalyzer::default();
    // 시작 종가 포함 24개 창마다 약 25.7% 상승
    let candles = create_geometric_uptrend(150, 100.0, 0.01);

    let result = analyzer.analyze("BTC/USDT", &candles);

    assert!(result.has_historical_patterns);
    // 시작점 0..126 전부, 직전 50개가 있는 50..126만 분석
    assert_eq!(result.patterns_found, 126);
    assert_eq!(result.analyzed_patterns, 76);
    assert_eq!(result.statistics.total_moves, 126);
    assert_eq!(result.statistics.up_moves, 126);
    assert_eq!(result.statistics.down_moves, 0);
    assert!(result.statistics.average_move >= 20.0);
    assert_eq!(result.top_patterns.len(), 5);
    assert!(
        result
            .top_patterns
            .iter()
            .all(|p| p.direction == MoveDirection::Up && p.start_index >= 50)
    );
    assert!((0.0..=100.0).contains(&result.predictive_score));
    assert_eq!(result.reliability, Reliability::from_score(result.predictive_score));
}

#[test]
fn test_moves_without_prior_history_are_counted_but_not_analyzed() {
    let analyzer = HistoricalAnalyzer::default();
    // 처음 10개 이후 곧바로 급등, 이후 횡보
    let mut closes = vec![100.0; 10];
    closes.extend((1..=20).map(|i| 100.0 * 1.02_f64.powi(i)));
    closes.extend(vec![100.0 * 1.02_f64.powi(20); 90]);
    let candles = candles_from_closes(&closes, &[1000.0, 1200.0], 0.1);

    let result = analyzer.analyze("BTC/USDT", &candles);

    assert!(result.has_historical_patterns);
    assert!(result.patterns_found > 0);
    assert_eq!(result.analyzed_patterns, 0);
    assert!(result.top_patterns.is_empty());
    assert_eq!(result.predictive_score, 0.0);
    assert_eq!(result.reliability, Reliability::Low);
}

#[test]
fn test_crash_is_down_move() {
    let analyzer = HistoricalAnalyzer::default();
    let mut closes = vec![100.0; 80];
    closes.extend((1..=30).map(|i| 100.0 * 0.99_f64.powi(i)));
    closes.extend(vec![100.0 * 0.99_f64.powi(30); 20]);
    let candles = candles_from_closes(&closes, &[1000.0, 1500.0], 0.1);

    let result = analyzer.analyze("BTC/USDT", &candles);

    assert!(result.has_historical_patterns);
    assert!(result.statistics.down_moves >= 1);
    assert_eq!(result.statistics.up_moves, 0);
}
