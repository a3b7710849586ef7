//! Skill engine: interprets one mentor action per conversation turn.
//!
//! `update_ratings` is the only action that mutates state. Its entries are
//! canonicalized, clamped, deduplicated and handed to the store as a single
//! batch. Everything else is a read-only echo with canonical topics.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::rating::{RatingRow, TopicRating};
use crate::skills::action::{ActionResult, ExecutedAction, MentorAction, RatingProposal};
use crate::skills::canonical::TopicCanonicalizer;
use crate::skills::normalize::{clamp_confidence, clamp_rating};
use crate::skills::store::{RatingStore, StoreError};

pub struct SkillEngine {
    canonicalizer: TopicCanonicalizer,
    store: Arc<dyn RatingStore>,
}

impl SkillEngine {
    pub fn new(store: Arc<dyn RatingStore>, canonicalizer: TopicCanonicalizer) -> Self {
        Self {
            canonicalizer,
            store,
        }
    }

    /// Executes `action` for `user_id`.
    ///
    /// Malformed input never fails here; it is normalized or collapsed to
    /// `none`. The only error is a storage failure during `update_ratings`,
    /// which is returned as-is. No retries.
    pub async fn execute_action(
        &self,
        user_id: Uuid,
        action: MentorAction,
    ) -> Result<ExecutedAction, StoreError> {
        debug!("Executing mentor action '{}' for user {user_id}", action.kind());

        match action {
            MentorAction::UpdateRatings { ref ratings, .. } => {
                let updated_count = self.upsert_ratings(user_id, ratings).await?;
                Ok(ExecutedAction {
                    result: Some(ActionResult::Updated { updated_count }),
                    action,
                })
            }
            MentorAction::AssessSkills { ref topics, .. } => Ok(ExecutedAction {
                result: Some(ActionResult::Requested {
                    requested: self.canonicalizer.canonicalize_all(topics),
                }),
                action,
            }),
            MentorAction::RecommendSkills { ref topics, .. } => Ok(ExecutedAction {
                result: Some(ActionResult::Recommended {
                    recommended: self.canonicalizer.canonicalize_all(topics),
                }),
                action,
            }),
            MentorAction::None { note } | MentorAction::Unknown { note } => Ok(ExecutedAction {
                action: MentorAction::None { note },
                result: None,
            }),
        }
    }

    pub async fn ratings_for(&self, user_id: Uuid) -> Result<Vec<TopicRating>, StoreError> {
        self.store.list_ratings(user_id).await
    }

    /// Turns raw proposals into storable rows.
    ///
    /// Entries without a finite rating are dropped. When two entries resolve
    /// to the same canonical topic the later one wins, keeping the position
    /// of the first.
    pub fn normalize_ratings(&self, user_id: Uuid, proposals: &[RatingProposal]) -> Vec<RatingRow> {
        let mut rows: Vec<RatingRow> = Vec::with_capacity(proposals.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for proposal in proposals {
            let topic = self.canonicalizer.canonicalize(&proposal.topic);
            let Some(rating) = proposal.rating.and_then(clamp_rating) else {
                warn!(
                    "Dropping rating for topic '{topic}' (user {user_id}): rating {:?} is not a finite number",
                    proposal.rating
                );
                continue;
            };
            let row = RatingRow {
                user_id,
                topic,
                rating,
                confidence: clamp_confidence(proposal.confidence),
            };
            match positions.get(&row.topic).copied() {
                Some(idx) => rows[idx] = row,
                None => {
                    positions.insert(row.topic.clone(), rows.len());
                    rows.push(row);
                }
            }
        }

        rows
    }

    async fn upsert_ratings(
        &self,
        user_id: Uuid,
        proposals: &[RatingProposal],
    ) -> Result<usize, StoreError> {
        let rows = self.normalize_ratings(user_id, proposals);
        if rows.is_empty() {
            return Ok(0);
        }
        self.store.upsert_ratings(&rows).await
    }
}
