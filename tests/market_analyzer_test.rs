use common_test_utils::*;

use market_analysis::analyzer::manipulation_detector::ManipulationType;
use market_analysis::analyzer::market_analyzer::{
    ComprehensiveAnalysis, ConfidenceLevel, MarketAnalyzer, ScoreBreakdown, weighted_score,
};
use market_analysis::config::AnalysisConfig;
use market_analysis::config_loader::{ConfigFormat, ConfigLoader};
use market_analysis::indicator::orderbook::OrderBook;
use market_analysis::model::{Candle, Direction, Ticker};
use market_analysis::predictor::HeuristicPredictor;
use proptest::prelude::*;
use std::sync::Arc;

fn analyze(analyzer: &MarketAnalyzer, candles: &[TestCandle], book: &OrderBook) -> ComprehensiveAnalysis {
    let ticker = Ticker::with_last(candles.last().map(|c| c.close).unwrap_or(0.0));
    analyzer.analyze_comprehensive("BTC/USDT", candles, book, &ticker, None)
}

fn assert_bounded(analysis: &ComprehensiveAnalysis) {
    let scores = &analysis.scores;
    for score in [
        analysis.overall_score,
        scores.technical,
        scores.volume,
        scores.orderbook,
        scores.pattern,
        scores.manipulation,
        scores.historical,
    ] {
        assert!(score.is_finite());
        assert!((0.0..=100.0).contains(&score), "범위를 벗어난 점수: {}", score);
    }
}

#[test]
fn test_manipulation_veto_blocks_trading() {
    let analyzer = MarketAnalyzer::default();
    let candles = create_spike_candles(150, 100.0, 0.2, 6.0);
    let book = create_orderbook(20, 500.0, 0.01);

    let result = analyze(&analyzer, &candles, &book);

    assert!(!result.error);
    assert_eq!(result.manipulation.manipulation_type, ManipulationType::Pump);
    assert!(!result.manipulation.is_safe_to_trade);
    assert!(!result.is_tradeable);
    assert_eq!(result.confidence_level, ConfidenceLevel::Low);
    assert!(result.risk_factors.iter().any(|f| f.factor == "manipulation"));
    assert!(result.analysis_summary.iter().any(|line| line.contains("조작 위험")));
}

#[test]
fn test_veto_holds_even_with_permissive_threshold() {
    let config = AnalysisConfig {
        min_signal_score: 0.0,
        ..AnalysisConfig::default()
    };
    let analyzer = MarketAnalyzer::new(Arc::new(config));
    let candles = create_spike_candles(150, 100.0, 0.2, 6.0);
    let book = create_orderbook(20, 500.0, 0.01);

    let result = analyze(&analyzer, &candles, &book);

    assert!(result.orderbook.is_liquid);
    assert!(!result.is_tradeable);
}

#[test]
fn test_illiquid_book_is_not_tradeable() {
    let config = AnalysisConfig {
        min_signal_score: 0.0,
        ..AnalysisConfig::default()
    };
    let analyzer = MarketAnalyzer::new(Arc::new(config));
    let candles = create_alternating_volume_candles(150, 100.0);
    let book = create_orderbook(5, 1.0, 0.01);

    let result = analyze(&analyzer, &candles, &book);

    assert!(!result.orderbook.is_liquid);
    assert!(!result.is_tradeable);
    assert!(result.risk_factors.iter().any(|f| f.factor == "liquidity"));
}

#[test]
fn test_analysis_is_deterministic() {
    let analyzer = MarketAnalyzer::default().with_predictor(Box::new(HeuristicPredictor));
    let candles = create_geometric_uptrend(150, 100.0, 0.01);
    let book = create_orderbook(20, 500.0, 0.01);

    let first = analyze(&analyzer, &candles, &book);
    let second = analyze(&analyzer, &candles, &book);

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert!(first.prediction.is_some());
}

#[test]
fn test_prediction_does_not_change_score() {
    let candles = create_geometric_uptrend(150, 100.0, 0.01);
    let book = create_orderbook(20, 500.0, 0.01);

    let plain = analyze(&MarketAnalyzer::default(), &candles, &book);
    let predicted = analyze(
        &MarketAnalyzer::default().with_predictor(Box::new(HeuristicPredictor)),
        &candles,
        &book,
    );

    assert!(plain.prediction.is_none());
    assert_eq!(plain.overall_score, predicted.overall_score);
    assert_eq!(plain.signal_direction, predicted.signal_direction);
    assert_eq!(plain.is_tradeable, predicted.is_tradeable);
}

#[test]
fn test_uptrend_report() {
    let analyzer = MarketAnalyzer::default();
    let candles = create_geometric_uptrend(150, 100.0, 0.01);
    let book = create_orderbook(20, 500.0, 0.01);

    let result = analyze(&analyzer, &candles, &book);

    assert_bounded(&result);
    assert_eq!(result.symbol, "BTC/USDT");
    assert_eq!(result.timestamp, Some(candles[149].datetime()));
    assert_eq!(result.technical.signal_direction, Direction::Long);
    assert!(result.historical.as_ref().is_some_and(|h| h.has_historical_patterns));
    assert!(result.analysis_summary.iter().any(|line| line.contains("상승 추세")));
}

#[test]
fn test_short_series_skips_history_and_degrades() {
    let analyzer = MarketAnalyzer::default();
    let candles = create_uptrend_candles(10, 100.0, 1.0);
    let book = create_orderbook(20, 500.0, 0.01);

    let result = analyze(&analyzer, &candles, &book);

    assert!(!result.error);
    assert!(result.historical.is_none());
    assert_eq!(result.scores.technical, 0.0);
    assert!(!result.is_tradeable);
    assert_bounded(&result);
}

#[test]
fn test_separate_history_series_is_used() {
    let analyzer = MarketAnalyzer::default();
    let candles = create_alternating_volume_candles(60, 100.0);
    let history = create_geometric_uptrend(150, 100.0, 0.01);
    let book = create_orderbook(20, 500.0, 0.01);
    let ticker = Ticker::with_last(100.0);

    let result = analyzer.analyze_comprehensive(
        "BTC/USDT",
        &candles,
        &book,
        &ticker,
        Some(history.as_slice()),
    );

    let historical = result.historical.expect("history analyzed");
    assert_eq!(historical.patterns_found, 126);
    assert_eq!(historical.analyzed_patterns, 76);
}

#[test]
fn test_technical_score_weighted_twice() {
    let weights = AnalysisConfig::default().weights;
    let only_technical = ScoreBreakdown {
        technical: 80.0,
        ..Default::default()
    };
    let only_volume = ScoreBreakdown {
        volume: 80.0,
        ..Default::default()
    };
    // 기술적 점수는 내부 가중 합산 결과에 추세+모멘텀 가중치가 다시 곱해짐
    assert!((weighted_score(&only_technical, &weights) - 36.0).abs() < 1e-9);
    assert!((weighted_score(&only_volume, &weights) - 16.0).abs() < 1e-9);
}

#[test]
fn test_unsafe_market_without_manipulation_type_has_no_manipulation_factor() {
    let analyzer = MarketAnalyzer::default();
    let candles = create_alternating_volume_candles(60, 100.0);
    let book = OrderBook::default();

    let result = analyze(&analyzer, &candles, &book);

    assert!(!result.manipulation.is_safe_to_trade);
    assert_eq!(result.manipulation.manipulation_type, ManipulationType::None);
    assert!(result.risk_factors.iter().all(|f| f.factor != "manipulation"));
    assert!(result.risk_factors.iter().any(|f| f.factor == "liquidity"));
    assert!(!result.is_tradeable);
}

#[test]
fn test_summary_reports_high_severity_reasons_only() {
    let analyzer = MarketAnalyzer::default();
    let candles = create_spike_candles(150, 100.0, 0.2, 6.0);
    let book = create_orderbook(20, 500.0, 0.01);

    let result = analyze(&analyzer, &candles, &book);

    let reason_lines: Vec<&String> = result
        .analysis_summary
        .iter()
        .filter(|line| line.starts_with("• 조작 위험: "))
        .collect();
    assert_eq!(reason_lines.len(), result.manipulation.warning_flags);
    assert!(reason_lines.iter().any(|line| line.contains("펌프 의심")));
    assert!(result.analysis_summary.iter().all(|line| !line.contains("횡보 구간 없음")));
    assert!(result.analysis_summary.contains(&"• 매우 높은 거래량".to_string()));
}

#[test]
fn test_uptrend_summary_has_macd_crossover() {
    let analyzer = MarketAnalyzer::default();
    let candles = create_geometric_uptrend(150, 100.0, 0.01);
    let book = create_orderbook(20, 500.0, 0.01);

    let result = analyze(&analyzer, &candles, &book);

    assert!(result.analysis_summary.contains(&"• MACD 상승 교차".to_string()));
    assert!(result.analysis_summary.iter().any(|line| line.starts_with("• 상승 추세")));
}

#[test]
fn test_config_file_drives_analyzer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.toml");
    let mut config = AnalysisConfig::default();
    config.historical.min_data_points = 200;
    ConfigLoader::save_to_file(&config, &path, ConfigFormat::Auto).unwrap();

    let loaded: AnalysisConfig = ConfigLoader::load_from_file(&path, ConfigFormat::Auto).unwrap();
    assert_eq!(loaded, config);

    let analyzer = MarketAnalyzer::new(Arc::new(loaded));
    let candles = create_geometric_uptrend(150, 100.0, 0.01);
    let book = create_orderbook(20, 500.0, 0.01);
    let result = analyze(&analyzer, &candles, &book);
    assert!(result.historical.is_none());
}

fn candle_series() -> impl Strategy<Value = Vec<TestCandle>> {
    prop::collection::vec((-0.08f64..0.08, 0.0f64..0.02, 1.0f64..50_000.0), 0..160).prop_map(
        |steps| {
            let mut price = 100.0;
            steps
                .into_iter()
                .enumerate()
                .map(|(i, (change, wick, volume))| {
                    let open = price;
                    price *= 1.0 + change;
                    TestCandle::new(
                        i as i64 * 60,
                        open,
                        open.max(price) * (1.0 + wick),
                        open.min(price) * (1.0 - wick),
                        price,
                        volume,
                    )
                })
                .collect()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_scores_stay_in_bounds(candles in candle_series(), levels in 0usize..25, quantity in 0.1f64..2_000.0) {
        let analyzer = MarketAnalyzer::default();
        let book = create_orderbook(levels, quantity, 0.05);
        let result = analyze(&analyzer, &candles, &book);
        assert_bounded(&result);
        if !result.manipulation.is_safe_to_trade {
            prop_assert!(!result.is_tradeable);
            prop_assert_eq!(result.confidence_level, ConfidenceLevel::Low);
        }
    }

    #[test]
    fn prop_same_input_same_output(candles in candle_series()) {
        let analyzer = MarketAnalyzer::default();
        let book = create_orderbook(20, 100.0, 0.05);
        let first = analyze(&analyzer, &candles, &book);
        let second = analyze(&analyzer, &candles, &book);
        prop_assert_eq!(first.overall_score, second.overall_score);
        prop_assert_eq!(first.signal_direction, second.signal_direction);
        prop_assert_eq!(first.is_tradeable, second.is_tradeable);
    }
}
