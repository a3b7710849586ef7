//! In-memory `RatingStore` for tests: counts calls and can be told to fail.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::rating::{RatingRow, TopicRating};
use crate::skills::store::{RatingStore, StoreError};

#[derive(Default)]
pub struct MemoryRatingStore {
    rows: Mutex<BTreeMap<(Uuid, String), (i16, Option<f64>)>>,
    batches: Mutex<Vec<Vec<RatingRow>>>,
    upsert_calls: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryRatingStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.failing.store(true, Ordering::SeqCst);
        store
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn last_batch(&self) -> Option<Vec<RatingRow>> {
        self.batches.lock().unwrap().last().cloned()
    }

    pub fn snapshot(&self) -> Vec<RatingRow> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .map(|((user_id, topic), (rating, confidence))| RatingRow {
                user_id: *user_id,
                topic: topic.clone(),
                rating: *rating,
                confidence: *confidence,
            })
            .collect()
    }
}

#[async_trait]
impl RatingStore for MemoryRatingStore {
    async fn upsert_ratings(&self, rows: &[RatingRow]) -> Result<usize, StoreError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        self.batches.lock().unwrap().push(rows.to_vec());
        let mut stored = self.rows.lock().unwrap();
        for row in rows {
            stored.insert(
                (row.user_id, row.topic.clone()),
                (row.rating, row.confidence),
            );
        }
        Ok(rows.len())
    }

    async fn list_ratings(&self, user_id: Uuid) -> Result<Vec<TopicRating>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .map(|((_, topic), (rating, confidence))| TopicRating {
                topic: topic.clone(),
                rating: *rating,
                confidence: *confidence,
            })
            .collect())
    }
}
