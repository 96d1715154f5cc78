//! Vigil Core - Entity Types
//!
//! Pure data structures shared by every other crate in the workspace:
//! intentions, challenges, the counter tags that select which count to
//! bump, and the error taxonomy. No storage or HTTP concerns live here.

pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;

pub use entities::{
    checked_increment, Challenge, ChallengeUpdate, Intention, NewChallenge, NewIntention, CHALLENGE_TITLE_MAX_CHARS,
    INTENTION_CONTENT_MAX_CHARS, INTENTION_NAME_MAX_CHARS,
};
pub use enums::{Counter, EntityType, PrayerKind};
pub use error::{StorageError, ValidationError, VigilError, VigilResult};
pub use identity::{now, RecordId, Timestamp};
