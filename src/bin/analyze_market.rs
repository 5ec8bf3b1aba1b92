use log::{debug, error, info, warn};
use market_analysis::analyzer::MarketAnalyzer;
use market_analysis::candle_store::CandleStore;
use market_analysis::config::AnalysisConfig;
use market_analysis::config_loader::{ConfigFormat, ConfigLoader};
use market_analysis::indicator::orderbook::OrderBook;
use market_analysis::model::{OhlcvCandle, Ticker};
use market_analysis::predictor::HeuristicPredictor;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// 저장소에 보관할 최대 캔들 수
const MAX_CANDLES: usize = 5000;

fn read_candles(path: &Path) -> Result<CandleStore<OhlcvCandle>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("캔들 파일 읽기 실패 {}: {}", path.display(), e))?;
    let rows: Vec<[f64; 6]> =
        serde_json::from_str(&content).map_err(|e| format!("캔들 JSON 파싱 실패: {}", e))?;
    debug!("캔들 {}개 읽음", rows.len());

    let mut store = CandleStore::new(vec![], MAX_CANDLES, true);
    store.extend(rows.into_iter().map(OhlcvCandle::from_row));
    Ok(store)
}

fn read_orderbook(path: &Path) -> Result<OrderBook, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("호가 파일 읽기 실패 {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("호가 JSON 파싱 실패: {}", e))
}

fn main() -> ExitCode {
    // 로그 초기화
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    debug!("커맨드 라인 인수: {:?}", args);

    if args.len() < 2 {
        error!("인수가 충분하지 않습니다. 캔들 파일이 필요합니다.");
        println!(
            "사용법: {} <candles.json> [orderbook.json] [config.(json|toml)]",
            args[0]
        );
        return ExitCode::FAILURE;
    }

    let candle_path = PathBuf::from(&args[1]);
    let store = match read_candles(&candle_path) {
        Ok(store) => store,
        Err(e) => {
            error!("{}", e);
            println!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let orderbook = match args.get(2) {
        Some(path) => match read_orderbook(Path::new(path)) {
            Ok(orderbook) => orderbook,
            Err(e) => {
                error!("{}", e);
                println!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            warn!("호가 파일이 없습니다. 빈 호가로 분석하므로 거래 불가로 판정됩니다.");
            OrderBook::default()
        }
    };

    let config = match args.get(3) {
        Some(path) => match ConfigLoader::load_from_file::<AnalysisConfig>(
            Path::new(path),
            ConfigFormat::Auto,
        ) {
            Ok(config) => config,
            Err(e) => {
                error!("설정 로드 실패: {}", e);
                println!("설정 로드 실패: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            debug!("기본 설정 사용");
            AnalysisConfig::default()
        }
    };

    let symbol = if orderbook.symbol.is_empty() {
        candle_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "UNKNOWN".to_string())
    } else {
        orderbook.symbol.clone()
    };

    let candles = store.get_time_ordered_items();
    let ticker = Ticker::with_last(store.latest().map(|c| c.close).unwrap_or(0.0));
    info!("[{}] 분석 시작: 캔들 {}개", symbol, candles.len());

    let analyzer =
        MarketAnalyzer::new(Arc::new(config)).with_predictor(Box::new(HeuristicPredictor));
    let analysis = analyzer.analyze_comprehensive(&symbol, &candles, &orderbook, &ticker, None);

    match serde_json::to_string_pretty(&analysis) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("결과 직렬화 실패: {}", e);
            ExitCode::FAILURE
        }
    }
}
