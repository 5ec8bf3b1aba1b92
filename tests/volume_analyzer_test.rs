use common_test_utils::*;

use market_analysis::analyzer::base::AnalysisOutput;
use market_analysis::analyzer::volume_analyzer::{
    VolumeAnalysis, VolumeAnalyzer, VolumeCategory, VolumeTrend, buy_sell_pressure, volume_profile,
};
use market_analysis::model::Bias;

#[test]
fn test_insufficient_data() {
    let analyzer = VolumeAnalyzer::default();
    let candles = create_flat_candles(20, 100.0, 1000.0);
    assert_eq!(analyzer.analyze("BTC/USDT", &candles), VolumeAnalysis::empty());
}

#[test]
fn test_flat_series_is_normal_volume() {
    let analyzer = VolumeAnalyzer::default();
    let candles = create_flat_candles(60, 100.0, 1000.0);

    let result = analyzer.analyze("BTC/USDT", &candles);

    assert_eq!(result.volume_ratio, 1.0);
    assert_eq!(result.volume_category, VolumeCategory::Normal);
    assert_eq!(result.volume_trend, VolumeTrend::Stable);
    assert!(!result.is_volume_spike);
    // 보합 캔들은 매수/매도 절반씩
    assert_eq!(result.buy_pressure_percent, 50.0);
    assert_eq!(result.sell_pressure_percent, 50.0);
    assert_eq!(result.pressure_direction, Bias::Bearish);
    assert_eq!(result.obv, 0.0);
    assert!((0.0..=100.0).contains(&result.volume_score));
}

#[test]
fn test_volume_spike_detected() {
    let analyzer = VolumeAnalyzer::default();
    let candles = create_spike_candles(60, 100.0, 0.2, 6.0);

    let result = analyzer.analyze("BTC/USDT", &candles);

    assert!(result.is_volume_spike);
    assert!(result.spike_strength > 0.0 && result.spike_strength <= 100.0);
    assert!(result.volume_ratio > 3.0);
    assert_eq!(result.volume_category, VolumeCategory::VeryHigh);
}

#[test]
fn test_profile_ordering() {
    for candles in [
        create_uptrend_candles(120, 100.0, 0.7),
        create_sideways_candles(120, 50.0, 6.0),
        create_alternating_volume_candles(120, 250.0),
    ] {
        let profile = volume_profile(&candles);
        assert!(profile.value_area_low <= profile.point_of_control);
        assert!(profile.point_of_control <= profile.value_area_high);
    }
}

#[test]
fn test_pressure_split() {
    let candles = vec![
        TestCandle::new(0, 100.0, 102.0, 99.0, 101.0, 3000.0),
        TestCandle::new(60, 101.0, 101.5, 99.5, 100.0, 1000.0),
    ];
    let (buy, sell) = buy_sell_pressure(&candles);
    assert_eq!(buy, 75.0);
    assert_eq!(sell, 25.0);
}
