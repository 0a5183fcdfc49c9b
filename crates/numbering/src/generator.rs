//! Counter-backed number generator.

use std::sync::Arc;

use brickerp_core::{Clock, SystemClock};
use brickerp_store::LocalStorage;
use tokio::sync::Mutex;

use crate::error::NumberingError;
use crate::kind::DocumentKind;
use crate::number::DocumentNumber;

/// Issues document numbers from per-kind counters in the local store.
///
/// Every read-increment-write runs under a single async mutex, so callers
/// sharing one generator never receive the same number. Separate processes
/// writing the same store are not coordinated.
pub struct NumberGenerator {
    storage: LocalStorage,
    clock: Arc<dyn Clock>,
    writer: Mutex<()>,
}

impl NumberGenerator {
    pub fn new(storage: LocalStorage) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            writer: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Store key of the counter for `kind` (inside the storage namespace).
    pub fn counter_key(kind: DocumentKind) -> String {
        format!("counter.{}", kind.as_str())
    }

    /// Issue the next number for `kind`.
    ///
    /// The counter is persisted before the number is returned. A missing
    /// counter starts at 0; a corrupted one is an error and is left as is.
    pub async fn next_number(&self, kind: DocumentKind) -> Result<DocumentNumber, NumberingError> {
        let _guard = self.writer.lock().await;

        let last = self.read_counter(kind).await?;
        let next = last
            .checked_add(1)
            .ok_or(NumberingError::CounterExhausted { kind })?;

        self.storage
            .set_raw(&Self::counter_key(kind), &next.to_string())
            .await?;

        let number = DocumentNumber::new(kind, self.clock.today(), next);
        tracing::debug!(kind = %kind, number = %number, "issued document number");
        Ok(number)
    }

    /// Last value issued for `kind` (0 if none yet).
    pub async fn current(&self, kind: DocumentKind) -> Result<u64, NumberingError> {
        let _guard = self.writer.lock().await;
        self.read_counter(kind).await
    }

    async fn read_counter(&self, kind: DocumentKind) -> Result<u64, NumberingError> {
        let raw = self.storage.get_raw(&Self::counter_key(kind)).await?;

        match raw {
            None => Ok(0),
            Some(stored) => stored.parse::<u64>().map_err(|_| {
                tracing::error!(kind = %kind, stored = %stored, "document counter is corrupted");
                NumberingError::CounterCorrupted { kind, stored }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use brickerp_core::FixedClock;
    use brickerp_store::{InMemoryStore, KeyValueStore, StorageError};
    use proptest::prelude::*;

    fn july_2025() -> Arc<dyn Clock> {
        Arc::new(FixedClock::on(2025, 7, 14).unwrap())
    }

    fn generator() -> (LocalStorage, NumberGenerator) {
        let storage = LocalStorage::new(Arc::new(InMemoryStore::new()));
        let generator = NumberGenerator::new(storage.clone()).with_clock(july_2025());
        (storage, generator)
    }

    /// Store that yields to the scheduler between every call.
    #[derive(Default)]
    struct YieldingStore {
        inner: InMemoryStore,
    }

    #[async_trait]
    impl KeyValueStore for YieldingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            tokio::task::yield_now().await;
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            tokio::task::yield_now().await;
            self.inner.set(key, value).await
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::unavailable("disk gone"))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::unavailable("disk gone"))
        }
    }

    #[tokio::test]
    async fn first_production_order_is_0001() {
        let (_, generator) = generator();
        let n = generator.next_number(DocumentKind::ProductionOrder).await.unwrap();
        assert_eq!(n.to_string(), "OP25070001");
    }

    #[tokio::test]
    async fn continues_from_stored_counter() {
        let (storage, generator) = generator();
        storage.set_raw("counter.sale", "42").await.unwrap();

        let n = generator.next_number(DocumentKind::Sale).await.unwrap();

        assert_eq!(n.to_string(), "VT25070043");
        assert_eq!(storage.get_raw("counter.sale").await.unwrap().as_deref(), Some("43"));
    }

    #[tokio::test]
    async fn kinds_have_independent_sequences() {
        let (_, generator) = generator();
        generator.next_number(DocumentKind::Quote).await.unwrap();
        generator.next_number(DocumentKind::Quote).await.unwrap();

        let invoice = generator.next_number(DocumentKind::Invoice).await.unwrap();
        assert_eq!(invoice.sequence, 1);
        assert_eq!(generator.current(DocumentKind::Quote).await.unwrap(), 2);
        assert_eq!(generator.current(DocumentKind::Delivery).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn number_uses_date_of_issue() {
        let storage = LocalStorage::new(Arc::new(InMemoryStore::new()));
        NumberGenerator::new(storage.clone())
            .with_clock(july_2025())
            .next_number(DocumentKind::Delivery)
            .await
            .unwrap();

        let january = NumberGenerator::new(storage)
            .with_clock(Arc::new(FixedClock::on(2026, 1, 2).unwrap()));
        let n = january.next_number(DocumentKind::Delivery).await.unwrap();
        assert_eq!(n.to_string(), "LV26010002");
    }

    #[tokio::test]
    async fn corrupted_counter_fails_closed() {
        let (storage, generator) = generator();
        storage.set_raw("counter.invoice", "NaN").await.unwrap();

        let err = generator.next_number(DocumentKind::Invoice).await.unwrap_err();

        assert_eq!(
            err,
            NumberingError::CounterCorrupted {
                kind: DocumentKind::Invoice,
                stored: "NaN".to_string(),
            }
        );
        assert_eq!(storage.get_raw("counter.invoice").await.unwrap().as_deref(), Some("NaN"));
    }

    #[tokio::test]
    async fn negative_counter_is_corrupted() {
        let (storage, generator) = generator();
        storage.set_raw("counter.sale", "-3").await.unwrap();

        let err = generator.current(DocumentKind::Sale).await.unwrap_err();
        assert!(matches!(err, NumberingError::CounterCorrupted { .. }));
    }

    #[tokio::test]
    async fn exhausted_counter_is_an_error() {
        let (storage, generator) = generator();
        storage
            .set_raw("counter.quote", &u64::MAX.to_string())
            .await
            .unwrap();

        let err = generator.next_number(DocumentKind::Quote).await.unwrap_err();
        assert_eq!(err, NumberingError::CounterExhausted { kind: DocumentKind::Quote });
    }

    #[tokio::test]
    async fn unavailable_storage_surfaces_an_error() {
        let generator = NumberGenerator::new(LocalStorage::new(Arc::new(BrokenStore)));
        let err = generator.next_number(DocumentKind::Sale).await.unwrap_err();
        assert!(matches!(err, NumberingError::StorageUnavailable(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_never_share_a_number() {
        let storage = LocalStorage::new(Arc::new(YieldingStore::default()));
        let generator = Arc::new(NumberGenerator::new(storage).with_clock(july_2025()));

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let generator = generator.clone();
                tokio::spawn(async move { generator.next_number(DocumentKind::Sale).await })
            })
            .collect();

        let mut sequences = Vec::new();
        for handle in handles {
            sequences.push(handle.await.unwrap().unwrap().sequence);
        }
        sequences.sort_unstable();

        assert_eq!(sequences, (1..=50).collect::<Vec<u64>>());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: sequential calls yield suffixes that each exceed the
        /// previous one by exactly one, starting after the stored value.
        #[test]
        fn sequential_calls_increase_by_one(
            kind_idx in 0usize..5,
            start in 0u64..100_000,
            calls in 1usize..40,
        ) {
            let kind = DocumentKind::ALL[kind_idx];
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();

            let numbers = rt.block_on(async {
                let (storage, generator) = generator();
                storage
                    .set_raw(&NumberGenerator::counter_key(kind), &start.to_string())
                    .await
                    .unwrap();

                let mut out = Vec::with_capacity(calls);
                for _ in 0..calls {
                    out.push(generator.next_number(kind).await.unwrap());
                }
                out
            });

            for (i, n) in numbers.iter().enumerate() {
                prop_assert_eq!(n.kind, kind);
                prop_assert_eq!((n.year, n.month), (25, 7));
                prop_assert_eq!(n.sequence, start + 1 + i as u64);
            }
        }
    }
}
