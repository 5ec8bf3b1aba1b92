//! 분석기 오류 유형
//!
//! 분석기 내부에서만 사용됩니다. 공개 `analyze` 메서드는 이 오류를
//! 로그로 남기고 빈 분석 결과로 변환하므로 호출자에게 전파되지 않습니다.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyzerError {
    /// 분석에 필요한 최소 데이터 수 미달
    #[error("{analyzer}: 데이터 부족 (필요 {required}, 실제 {actual})")]
    InsufficientData {
        analyzer: &'static str,
        required: usize,
        actual: usize,
    },

    /// NaN/무한대 등 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 계산 결과가 유한하지 않음
    #[error("계산 불가: {0}")]
    Degenerate(String),
}

impl AnalyzerError {
    /// 데이터 부족 오류 생성
    pub fn insufficient(analyzer: &'static str, required: usize, actual: usize) -> Self {
        AnalyzerError::InsufficientData {
            analyzer,
            required,
            actual,
        }
    }

    /// 데이터 부족 오류인지 확인 (경고 수준 로그 대상)
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, AnalyzerError::InsufficientData { .. })
    }
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// 계산 결과가 유한한지 확인하고 아니면 `Degenerate` 오류를 반환합니다.
pub fn ensure_finite(value: f64, what: &str) -> AnalyzerResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalyzerError::Degenerate(format!("{what} = {value}")))
    }
}
