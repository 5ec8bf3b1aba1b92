use crate::model::Candle;
use log::trace;

/// 제한된 크기의 캔들 저장소
///
/// 지정된 최대 크기를 유지하며 캔들을 저장하는 구조체입니다.
/// 최대 크기를 초과하면 가장 오래된 캔들이 자동으로 제거됩니다.
/// 캔들은 datetime 기준으로 내림차순 정렬되어 저장됩니다 (최신 캔들이 먼저 옴).
#[derive(Debug, Clone)]
pub struct CandleStore<T: Candle> {
    items: Vec<T>,
    pub max_size: usize,
    /// 같은 시각의 캔들이 들어오면 기존 캔들을 교체 (진행 중인 캔들 갱신)
    pub replace_same_time: bool,
}

impl<T> CandleStore<T>
where
    T: Candle,
{
    /// 새로운 CandleStore 인스턴스를 생성합니다.
    ///
    /// # Arguments
    /// * `items` - 초기 캔들 목록 (순서 무관)
    /// * `max_size` - 저장소의 최대 크기
    /// * `replace_same_time` - 같은 시각 캔들 교체 여부
    pub fn new(items: Vec<T>, max_size: usize, replace_same_time: bool) -> CandleStore<T> {
        let mut store = CandleStore {
            items: Vec::with_capacity(items.len().min(max_size)),
            max_size,
            replace_same_time,
        };
        store.extend(items);
        store
    }

    /// 캔들을 datetime 기준 내림차순 위치에 삽입합니다.
    ///
    /// 이미 저장소가 최대 크기에 도달했다면, 가장 오래된 캔들이 제거됩니다.
    pub fn add(&mut self, candle: T) {
        let datetime = candle.datetime();
        match self
            .items
            .binary_search_by(|item| datetime.cmp(&item.datetime()))
        {
            Ok(idx) if self.replace_same_time => {
                trace!("같은 시각 캔들 교체: {}", datetime);
                self.items[idx] = candle;
            }
            Ok(idx) | Err(idx) => self.items.insert(idx, candle),
        }

        if self.items.len() > self.max_size {
            self.items.truncate(self.max_size);
        }
    }

    /// 여러 캔들을 삽입합니다.
    pub fn extend(&mut self, candles: impl IntoIterator<Item = T>) {
        for candle in candles {
            self.add(candle);
        }
    }

    /// 저장소에 있는 캔들 수
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 저장소가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 가장 최근 캔들
    pub fn latest(&self) -> Option<&T> {
        self.items.first()
    }

    /// 최신순 인덱스의 캔들 (0 = 최신)
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// 최신순으로 정렬된 캔들 슬라이스
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// 저장된 캔들을 시간 순서대로 정렬하여 반환합니다.
    ///
    /// 분석기는 모두 이 순서(오래된 것 먼저)의 시계열을 입력으로 받습니다.
    pub fn get_time_ordered_items(&self) -> Vec<T> {
        self.items.iter().rev().cloned().collect()
    }

    /// 최근 `count`개 캔들을 시간 순서대로 반환합니다.
    pub fn recent(&self, count: usize) -> Vec<T> {
        self.items.iter().take(count).rev().cloned().collect()
    }

    /// 시간 순서의 종가 배열
    pub fn closes(&self) -> Vec<f64> {
        self.items.iter().rev().map(|c| c.close_price()).collect()
    }
}
