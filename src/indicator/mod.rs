// 기술적 지표 모듈
// 분석기에서 사용하는 상태 없는 지표 계산 함수를 제공합니다.

pub mod atr;
pub mod bband;
pub mod extrema;
pub mod levels;
pub mod ma;
pub mod macd;
pub mod orderbook;
pub mod regression;
pub mod rsi;
pub mod stats;
