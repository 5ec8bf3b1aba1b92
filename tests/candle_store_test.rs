use common_test_utils::*;

use market_analysis::candle_store::CandleStore;
use market_analysis::model::Candle;

#[test]
fn test_new_empty_store() {
    let store = CandleStore::<TestCandle>::new(Vec::new(), 100, false);
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert_eq!(store.max_size, 100);
    assert!(store.latest().is_none());
}

#[test]
fn test_new_with_items_sorted_descending() {
    let candles = vec![
        TestCandle::new(1, 100.0, 105.0, 95.0, 102.0, 1000.0),
        TestCandle::new(3, 110.0, 115.0, 105.0, 112.0, 1000.0),
        TestCandle::new(2, 105.0, 110.0, 100.0, 107.0, 1000.0),
    ];

    let store = CandleStore::<TestCandle>::new(candles, 100, false);

    assert_eq!(store.len(), 3);
    assert_eq!(store.latest().unwrap().datetime().timestamp(), 3);
    assert_eq!(store.get(1).unwrap().datetime().timestamp(), 2);
    assert_eq!(store.get(2).unwrap().datetime().timestamp(), 1);
}

#[test]
fn test_new_max_size_limit() {
    let candles: Vec<TestCandle> = (0..10)
        .map(|i| TestCandle::new(i, 100.0, 105.0, 95.0, 102.0, 1000.0))
        .collect();

    let store = CandleStore::new(candles, 5, false);

    assert_eq!(store.len(), 5);
    assert_eq!(store.latest().unwrap().datetime().timestamp(), 9);
    assert_eq!(store.get(4).unwrap().datetime().timestamp(), 5);
}

#[test]
fn test_add_maintains_descending_order() {
    let mut store = CandleStore::<TestCandle>::new(Vec::new(), 100, false);

    store.add(TestCandle::new(1, 100.0, 105.0, 95.0, 102.0, 1000.0));
    store.add(TestCandle::new(3, 110.0, 115.0, 105.0, 112.0, 1000.0));
    store.add(TestCandle::new(2, 105.0, 110.0, 100.0, 107.0, 1000.0));

    assert_eq!(store.len(), 3);
    assert_eq!(store.get(0).unwrap().datetime().timestamp(), 3);
    assert_eq!(store.get(1).unwrap().datetime().timestamp(), 2);
    assert_eq!(store.get(2).unwrap().datetime().timestamp(), 1);
}

#[test]
fn test_add_same_time_replaces_in_progress_candle() {
    let mut store = CandleStore::new(Vec::new(), 100, true);

    store.add(TestCandle::new(1, 100.0, 105.0, 95.0, 102.0, 1000.0));
    store.add(TestCandle::new(1, 100.0, 108.0, 95.0, 107.0, 1500.0));

    assert_eq!(store.len(), 1);
    let latest = store.latest().unwrap();
    assert_eq!(latest.close, 107.0);
    assert_eq!(latest.volume, 1500.0);
}

#[test]
fn test_add_same_time_kept_without_replacement() {
    let mut store = CandleStore::new(Vec::new(), 100, false);

    store.add(TestCandle::new(1, 100.0, 105.0, 95.0, 102.0, 1000.0));
    store.add(TestCandle::new(1, 100.0, 108.0, 95.0, 107.0, 1500.0));

    assert_eq!(store.len(), 2);
}

#[test]
fn test_add_oldest_evicted_when_full() {
    let mut store = CandleStore::new(Vec::new(), 3, false);

    for i in 0..3 {
        store.add(TestCandle::new(i + 10, 100.0, 105.0, 95.0, 102.0, 1000.0));
    }
    store.add(TestCandle::new(20, 100.0, 105.0, 95.0, 102.0, 1000.0));

    assert_eq!(store.len(), 3);
    assert_eq!(store.latest().unwrap().datetime().timestamp(), 20);
    assert_eq!(store.get(2).unwrap().datetime().timestamp(), 11);

    // 가장 오래된 캔들보다 더 오래된 캔들은 바로 잘림
    store.add(TestCandle::new(1, 100.0, 105.0, 95.0, 102.0, 1000.0));
    assert_eq!(store.len(), 3);
    assert_eq!(store.get(2).unwrap().datetime().timestamp(), 11);
}

#[test]
fn test_time_ordered_views() {
    let candles: Vec<TestCandle> = (0..6)
        .rev()
        .map(|i| TestCandle::new(i, 100.0, 105.0, 95.0, 100.0 + i as f64, 1000.0))
        .collect();
    let store = CandleStore::new(candles, 100, false);

    let ordered = store.get_time_ordered_items();
    let timestamps: Vec<i64> = ordered.iter().map(|c| c.datetime().timestamp()).collect();
    assert_eq!(timestamps, vec![0, 1, 2, 3, 4, 5]);

    let recent = store.recent(2);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].timestamp, 4);
    assert_eq!(recent[1].timestamp, 5);

    assert_eq!(store.recent(100).len(), 6);
    assert_eq!(
        store.closes(),
        vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0]
    );
}

#[test]
fn test_extend_with_builder_series() {
    let mut store = CandleStore::new(Vec::new(), 50, false);
    store.extend(create_uptrend_candles(80, 100.0, 1.0));

    assert_eq!(store.len(), 50);
    let ordered = store.get_time_ordered_items();
    assert!(
        ordered
            .windows(2)
            .all(|pair| pair[0].datetime() < pair[1].datetime())
    );
    assert_eq!(store.latest().unwrap().timestamp, 79 * 60);
}
