// 시장 분석기 모듈
// 개별 분석기는 각각 0-100 점수와 방향성을 산출하고, MarketAnalyzer가 이를 종합합니다.

pub mod base;
pub mod historical_analyzer;
pub mod manipulation_detector;
pub mod market_analyzer;
pub mod orderbook_analyzer;
pub mod pattern_analyzer;
pub mod technical_analyzer;
pub mod volume_analyzer;
pub mod whale_tracker;

pub use base::AnalysisOutput;
pub use historical_analyzer::{HistoricalAnalysis, HistoricalAnalyzer};
pub use manipulation_detector::{ManipulationAnalysis, ManipulationDetector, ManipulationType};
pub use market_analyzer::{ComprehensiveAnalysis, ConfidenceLevel, MarketAnalyzer};
pub use orderbook_analyzer::{OrderBookAnalysis, OrderBookAnalyzer};
pub use pattern_analyzer::{PatternAnalysis, PatternAnalyzer};
pub use technical_analyzer::{TechnicalAnalysis, TechnicalAnalyzer};
pub use volume_analyzer::{VolumeAnalysis, VolumeAnalyzer};
pub use whale_tracker::{WhaleAnalysis, WhaleTracker};
