use common_test_utils::*;

use market_analysis::analyzer::base::AnalysisOutput;
use market_analysis::analyzer::technical_analyzer::{
    RsiLevel, TechnicalAnalysis, TechnicalAnalyzer, score_rsi,
};
use market_analysis::config::RsiLevels;
use market_analysis::indicator::regression::TrendState;
use market_analysis::model::Direction;

#[test]
fn test_insufficient_data_returns_empty_shape() {
    let analyzer = TechnicalAnalyzer::default();
    let candles = create_uptrend_candles(10, 100.0, 1.0);

    let result = analyzer.analyze("BTC/USDT", &candles);

    assert_eq!(result, TechnicalAnalysis::empty());
    assert_eq!(result.technical_score, 0.0);
    assert_eq!(result.signal_direction, Direction::Long);
}

#[test]
fn test_flat_series_is_neutral() {
    let analyzer = TechnicalAnalyzer::default();
    let candles = create_flat_candles(60, 100.0, 1000.0);

    let result = analyzer.analyze("BTC/USDT", &candles);

    assert_eq!(result.rsi, 50.0);
    assert_eq!(result.rsi_level, RsiLevel::Neutral);
    assert_eq!(result.trend, TrendState::Sideways);
    assert_eq!(result.trend_strength, 0.0);
    assert_eq!(result.current_price, 100.0);
    assert_eq!(result.atr, 0.0);
    assert!(result.technical_score.is_finite());
}

#[test]
fn test_geometric_uptrend_is_strong_uptrend() {
    let analyzer = TechnicalAnalyzer::default();
    let candles = create_geometric_uptrend(96, 100.0, 0.01);

    let result = analyzer.analyze("BTC/USDT", &candles);

    assert_eq!(result.trend, TrendState::StrongUptrend);
    assert!(result.trend_strength > 5.0);
    assert!(result.ema_fast > result.ema_slow);
    assert!(result.rsi_level.is_overbought());
    assert_eq!(result.signal_direction, Direction::Long);
}

#[test]
fn test_downtrend_votes_short() {
    let analyzer = TechnicalAnalyzer::default();
    let candles = create_downtrend_candles(80, 200.0, 1.0);

    let result = analyzer.analyze("BTC/USDT", &candles);

    assert!(result.trend.is_down());
    assert!(result.ema_fast < result.ema_slow);
    assert_eq!(result.signal_direction, Direction::Short);
}

#[test]
fn test_rsi_score_degrades_monotonically() {
    let levels = RsiLevels::default();
    let mut previous = f64::INFINITY;
    for rsi in (0..=100).step_by(5) {
        let score = score_rsi(rsi as f64, &levels);
        assert!(score <= previous, "RSI {} 점수 {}가 증가함", rsi, score);
        previous = score;
    }
    assert!(score_rsi(20.0, &levels) >= score_rsi(70.0, &levels));
}

#[test]
fn test_sub_scores_within_bounds() {
    let analyzer = TechnicalAnalyzer::default();
    for candles in [
        create_uptrend_candles(70, 100.0, 0.5),
        create_downtrend_candles(70, 100.0, 0.5),
        create_sideways_candles(70, 100.0, 4.0),
    ] {
        let result = analyzer.analyze("ETH/USDT", &candles);
        for score in [
            result.technical_score,
            result.rsi_score,
            result.macd_score,
            result.bb_score,
            result.ema_score,
            result.trend_score,
            result.sr_score,
        ] {
            assert!((0.0..=100.0).contains(&score));
        }
        assert!(result.support_levels.len() <= 3);
        assert!(result.resistance_levels.len() <= 3);
    }
}
