// Skill rating engine: turns mentor actions into normalized per-user topic ratings.
// Canonicalization and clamping happen here; persistence goes through `RatingStore`.

pub mod action;
pub mod canonical;
pub mod engine;
pub mod handlers;
pub mod normalize;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use action::{ExecutedAction, MentorAction};
pub use canonical::TopicCanonicalizer;
pub use engine::SkillEngine;
pub use store::{PgRatingStore, RatingStore, StoreError};
