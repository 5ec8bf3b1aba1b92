use crate::error::{AnalyzerError, AnalyzerResult};
use crate::model::Candle;
use log::{debug, error, warn};

/// 분석 결과 공통 인터페이스
///
/// 모든 분석기 출력은 분석 불가 시 반환할 중립 결과와 0-100 점수를 가집니다.
pub trait AnalysisOutput: Sized {
    /// 분석 불가 시 반환하는 빈 결과
    fn empty() -> Self;

    /// 0-100 범위 점수
    fn score(&self) -> f64;
}

/// 분석기 경계 처리
///
/// `try_analyze` 결과를 받아 실패하면 로그를 남기고 빈 결과로 변환합니다.
/// 데이터 부족은 경고, 그 외 오류는 에러 수준으로 기록합니다.
///
/// # Arguments
/// * `analyzer` - 분석기 이름 (로그용)
/// * `symbol` - 분석 대상 심볼
/// * `result` - 내부 분석 결과
pub fn resolve<T: AnalysisOutput>(analyzer: &str, symbol: &str, result: AnalyzerResult<T>) -> T {
    match result {
        Ok(analysis) => {
            debug!("[{}] {} 점수: {:.2}", symbol, analyzer, analysis.score());
            analysis
        }
        Err(e) if e.is_insufficient_data() => {
            warn!("[{}] {} 분석 건너뜀: {}", symbol, analyzer, e);
            T::empty()
        }
        Err(e) => {
            error!("[{}] {} 분석 실패: {}", symbol, analyzer, e);
            T::empty()
        }
    }
}

/// 최소 캔들 수 확인
pub fn require_candles<C: Candle>(
    analyzer: &'static str,
    candles: &[C],
    required: usize,
) -> AnalyzerResult<()> {
    if candles.len() < required {
        return Err(AnalyzerError::insufficient(analyzer, required, candles.len()));
    }
    Ok(())
}

/// 캔들 시계열을 열 단위 가격 배열로 분리한 구조체
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    pub opens: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl PriceSeries {
    /// 캔들 시계열에서 가격 배열 생성
    ///
    /// NaN/무한대 값을 가진 캔들이 있으면 `InvalidInput` 오류를 반환합니다.
    pub fn from_candles<C: Candle>(candles: &[C]) -> AnalyzerResult<Self> {
        if let Some(position) = candles.iter().position(|c| !c.is_finite()) {
            return Err(AnalyzerError::InvalidInput(format!(
                "{}번째 캔들에 유한하지 않은 값이 있습니다",
                position
            )));
        }

        let mut series = PriceSeries {
            opens: Vec::with_capacity(candles.len()),
            highs: Vec::with_capacity(candles.len()),
            lows: Vec::with_capacity(candles.len()),
            closes: Vec::with_capacity(candles.len()),
            volumes: Vec::with_capacity(candles.len()),
        };
        for candle in candles {
            series.opens.push(candle.open_price());
            series.highs.push(candle.high_price());
            series.lows.push(candle.low_price());
            series.closes.push(candle.close_price());
            series.volumes.push(candle.volume());
        }
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// 마지막 종가 (없으면 0)
    pub fn last_close(&self) -> f64 {
        self.closes.last().copied().unwrap_or(0.0)
    }
}

/// 기준값 대비 변화율 (%)
///
/// 기준값이 0이면 0을 반환합니다.
pub fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    (to - from) / from * 100.0
}
