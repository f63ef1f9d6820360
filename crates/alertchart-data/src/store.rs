//! Ordered, de-duplicated candles for one chart session.

use alertchart_core::Candle;

use crate::validation::validate_candle;
use crate::DataError;

/// Candles held for the active session.
///
/// Times are unique and strictly increasing at all times. A candle applied
/// later replaces an earlier one with the same time.
#[derive(Debug, Clone, Default)]
pub struct CandleStore {
    candles: Vec<Candle>,
}

impl CandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a fetched batch into the store and return the combined series.
    ///
    /// Malformed candles are dropped and logged. A batch that is empty, or
    /// that contains no valid candle at all, clears the store and yields
    /// [`DataError::Unavailable`].
    pub fn merge(&mut self, batch: Vec<Candle>) -> Result<&[Candle], DataError> {
        let total = batch.len();
        let valid: Vec<Candle> = batch
            .into_iter()
            .filter(|c| {
                let ok = validate_candle(c);
                if !ok {
                    log::warn!("Dropping malformed candle at {}", c.time);
                }
                ok
            })
            .collect();

        if valid.is_empty() {
            self.candles.clear();
            return Err(DataError::Unavailable(if total == 0 {
                "empty batch".to_string()
            } else {
                format!("all {total} candles in batch were malformed")
            }));
        }

        self.candles.extend(valid);
        normalize(&mut self.candles);
        Ok(&self.candles)
    }

    /// Apply a live candle update.
    ///
    /// Overwrites the candle with the same time or inserts it in order.
    /// Updates at or after the newest stored time never trigger a re-sort.
    pub fn apply_tick(&mut self, candle: Candle) -> Result<&[Candle], DataError> {
        if !validate_candle(&candle) {
            log::warn!("Dropping malformed tick at {}", candle.time);
            return Err(DataError::Malformed { time: candle.time });
        }

        match self.candles.last_mut() {
            Some(last) if last.time == candle.time => *last = candle,
            Some(last) if last.time > candle.time => {
                match self.candles.binary_search_by_key(&candle.time, |c| c.time) {
                    Ok(i) => self.candles[i] = candle,
                    Err(i) => self.candles.insert(i, candle),
                }
            }
            _ => self.candles.push(candle),
        }

        Ok(&self.candles)
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    /// The most recent `n` candles (fewer if the store is shorter).
    pub fn window(&self, n: usize) -> &[Candle] {
        let start = self.candles.len().saturating_sub(n);
        &self.candles[start..]
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }
}

/// Stable sort by time, then collapse equal times keeping the last one.
fn normalize(candles: &mut Vec<Candle>) {
    candles.sort_by_key(|c| c.time);
    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());
    for candle in candles.drain(..) {
        match out.last_mut() {
            Some(last) if last.time == candle.time => *last = candle,
            _ => out.push(candle),
        }
    }
    *candles = out;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn c(time: i64, close: f64) -> Candle {
        Candle::new(time, close, close * 1.01, close * 0.99, close, 1.0)
    }

    fn times(candles: &[Candle]) -> Vec<i64> {
        candles.iter().map(|c| c.time).collect()
    }

    fn assert_strictly_increasing(candles: &[Candle]) {
        assert!(candles.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_merge_dedupes_later_wins() {
        let mut store = CandleStore::new();
        store.merge(vec![c(120, 1.0), c(60, 2.0), c(180, 3.0)]).unwrap();
        let merged = store.merge(vec![c(120, 9.0), c(240, 4.0)]).unwrap();

        assert_eq!(times(merged), vec![60, 120, 180, 240]);
        assert_eq!(merged[1].close, 9.0);
    }

    #[test]
    fn test_merge_duplicates_within_batch() {
        let mut store = CandleStore::new();
        let merged = store.merge(vec![c(60, 1.0), c(60, 2.0), c(60, 3.0)]).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].close, 3.0);
    }

    #[test]
    fn test_empty_batch_clears_and_errors() {
        let mut store = CandleStore::new();
        store.merge(vec![c(60, 1.0)]).unwrap();

        assert!(matches!(store.merge(Vec::new()), Err(DataError::Unavailable(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_all_malformed_batch_is_unavailable() {
        let mut store = CandleStore::new();
        let bad = Candle::new(60, f64::NAN, 1.0, 1.0, 1.0, 0.0);
        assert!(matches!(store.merge(vec![bad]), Err(DataError::Unavailable(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_candle_dropped_from_batch() {
        let mut store = CandleStore::new();
        let bad = Candle::new(120, 1.0, 0.5, 2.0, 1.0, 0.0);
        let merged = store.merge(vec![c(60, 1.0), bad, c(180, 3.0)]).unwrap();
        assert_eq!(times(merged), vec![60, 180]);
    }

    #[test]
    fn test_apply_tick_overwrites_and_appends() {
        let mut store = CandleStore::new();
        store.merge(vec![c(60, 1.0), c(120, 2.0)]).unwrap();

        store.apply_tick(c(120, 2.5)).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.last_close(), Some(2.5));

        store.apply_tick(c(180, 3.0)).unwrap();
        assert_eq!(times(store.candles()), vec![60, 120, 180]);
    }

    #[test]
    fn test_apply_out_of_order_tick() {
        let mut store = CandleStore::new();
        store.merge(vec![c(60, 1.0), c(180, 3.0)]).unwrap();

        store.apply_tick(c(120, 2.0)).unwrap();
        store.apply_tick(c(60, 1.5)).unwrap();

        assert_eq!(times(store.candles()), vec![60, 120, 180]);
        assert_eq!(store.candles()[0].close, 1.5);
        assert_eq!(store.last_close(), Some(3.0));
    }

    #[test]
    fn test_apply_tick_to_empty_store() {
        let mut store = CandleStore::new();
        store.apply_tick(c(60, 1.0)).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_malformed_tick_leaves_store_untouched() {
        let mut store = CandleStore::new();
        store.merge(vec![c(60, 1.0)]).unwrap();
        let bad = Candle::new(120, 1.0, 1.0, 1.0, -1.0, 0.0);

        assert!(matches!(store.apply_tick(bad), Err(DataError::Malformed { time: 120 })));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_window() {
        let mut store = CandleStore::new();
        store
            .merge((1..=10).map(|i| c(i * 60, i as f64)).collect())
            .unwrap();

        assert_eq!(times(store.window(3)), vec![480, 540, 600]);
        assert_eq!(store.window(50).len(), 10);
        assert!(store.window(0).is_empty());
    }

    #[test]
    fn test_helper_candles_are_valid() {
        assert!(validate_candle(&c(60, 1.0)));
    }

    #[test]
    fn test_dedup_invariant_under_mixed_operations() {
        let mut store = CandleStore::new();
        let mut expected: BTreeMap<i64, f64> = BTreeMap::new();
        let mut seed: u64 = 0x2545F4914F6CDD1D;
        for round in 0..200 {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let time = (seed % 40) as i64 * 60;
            let close = 1.0 + (seed % 1000) as f64;
            if round % 7 == 0 {
                store.merge(vec![c(time, close), c(time + 60, close)]).unwrap();
                expected.insert(time + 60, close);
            } else {
                store.apply_tick(c(time, close)).unwrap();
            }
            expected.insert(time, close);
            assert_strictly_increasing(store.candles());
        }

        let stored: Vec<(i64, f64)> = store.candles().iter().map(|c| (c.time, c.close)).collect();
        let wanted: Vec<(i64, f64)> = expected.into_iter().collect();
        assert_eq!(stored, wanted);
    }
}
