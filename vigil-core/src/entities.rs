//! Intention and Challenge records plus their write payloads

use serde::{Deserialize, Serialize};

use crate::{Counter, PrayerKind, RecordId, Timestamp, ValidationError};

/// Maximum length of an intention's `content`, in characters.
pub const INTENTION_CONTENT_MAX_CHARS: usize = 2000;
/// Maximum length of an intention's submitter `name`, in characters.
pub const INTENTION_NAME_MAX_CHARS: usize = 100;
/// Maximum length of a challenge `title`, in characters.
pub const CHALLENGE_TITLE_MAX_CHARS: usize = 200;

// ============================================================================
// INTENTION
// ============================================================================

/// A submitted prayer request with per-kind prayer counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Intention {
    pub id: RecordId,
    pub content: String,
    pub name: Option<String>,
    pub prayer_type: Option<String>,
    pub hail_mary_count: i32,
    pub our_father_count: i32,
    pub rosary_count: i32,
    pub is_printed: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl Intention {
    /// Build a freshly inserted intention with zeroed counters.
    pub fn from_new(id: RecordId, new: &NewIntention, created_at: Timestamp) -> Self {
        Self {
            id,
            content: new.content.clone(),
            name: new.name.clone(),
            prayer_type: new.prayer_type.clone(),
            hail_mary_count: 0,
            our_father_count: 0,
            rosary_count: 0,
            is_printed: false,
            created_at,
        }
    }

    /// Current value of one prayer counter.
    pub fn count(&self, kind: PrayerKind) -> i32 {
        match kind {
            PrayerKind::HailMary => self.hail_mary_count,
            PrayerKind::OurFather => self.our_father_count,
            PrayerKind::Rosary => self.rosary_count,
        }
    }

    /// Mutable slot for one prayer counter.
    pub fn count_mut(&mut self, kind: PrayerKind) -> &mut i32 {
        match kind {
            PrayerKind::HailMary => &mut self.hail_mary_count,
            PrayerKind::OurFather => &mut self.our_father_count,
            PrayerKind::Rosary => &mut self.rosary_count,
        }
    }
}

/// Payload for submitting a new intention.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewIntention {
    pub content: String,
    pub name: Option<String>,
    pub prayer_type: Option<String>,
}

impl NewIntention {
    /// Validate and normalize a submission.
    ///
    /// Content is trimmed and required; blank optional fields become `None`.
    pub fn new(
        content: impl Into<String>,
        name: Option<String>,
        prayer_type: Option<String>,
    ) -> Result<Self, ValidationError> {
        let content = required_text("content", content.into(), INTENTION_CONTENT_MAX_CHARS)?;
        let name = optional_text("name", name, INTENTION_NAME_MAX_CHARS)?;
        let prayer_type = optional_text("prayerType", prayer_type, CHALLENGE_TITLE_MAX_CHARS)?;
        Ok(Self {
            content,
            name,
            prayer_type,
        })
    }
}

// ============================================================================
// CHALLENGE
// ============================================================================

/// A communal prayer goal with a target and a running count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: RecordId,
    pub title: String,
    pub prayer_type: String,
    pub total_target: i32,
    pub current_count: i32,
    pub is_active: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl Challenge {
    /// Build a freshly inserted challenge.
    pub fn from_new(id: RecordId, new: &NewChallenge, created_at: Timestamp) -> Self {
        Self {
            id,
            title: new.title.clone(),
            prayer_type: new.prayer_type.clone(),
            total_target: new.total_target,
            current_count: 0,
            is_active: new.activates(),
            created_at,
        }
    }

    /// Apply the present fields of an update.
    pub fn apply(&mut self, update: &ChallengeUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(prayer_type) = &update.prayer_type {
            self.prayer_type = prayer_type.clone();
        }
        if let Some(total_target) = update.total_target {
            self.total_target = total_target;
        }
        if let Some(current_count) = update.current_count {
            self.current_count = current_count;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
    }

    /// Progress toward the target as a whole percentage, capped at 100.
    pub fn percent_complete(&self) -> i32 {
        if self.total_target <= 0 {
            return 0;
        }
        let pct = i64::from(self.current_count.max(0)) * 100 / i64::from(self.total_target);
        pct.min(100) as i32
    }

    pub fn is_complete(&self) -> bool {
        self.current_count >= self.total_target
    }
}

/// Payload for creating a challenge.
///
/// `is_active` left unset means active: a new challenge goes live and
/// displaces whichever challenge was active before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChallenge {
    pub title: String,
    pub prayer_type: String,
    pub total_target: i32,
    pub is_active: Option<bool>,
}

impl NewChallenge {
    pub fn new(
        title: impl Into<String>,
        prayer_type: impl Into<String>,
        total_target: i32,
        is_active: Option<bool>,
    ) -> Result<Self, ValidationError> {
        let title = required_text("title", title.into(), CHALLENGE_TITLE_MAX_CHARS)?;
        let prayer_type = required_text("prayerType", prayer_type.into(), CHALLENGE_TITLE_MAX_CHARS)?;
        positive("totalTarget", total_target)?;
        Ok(Self {
            title,
            prayer_type,
            total_target,
            is_active,
        })
    }

    /// Whether the created challenge will be the active one.
    pub fn activates(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}

/// Partial update for a challenge. Absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChallengeUpdate {
    pub title: Option<String>,
    pub prayer_type: Option<String>,
    pub total_target: Option<i32>,
    pub current_count: Option<i32>,
    pub is_active: Option<bool>,
}

impl ChallengeUpdate {
    /// Update that only toggles the active flag.
    pub fn activation(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }

    /// Validate and normalize the present fields.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let title = self
            .title
            .map(|t| required_text("title", t, CHALLENGE_TITLE_MAX_CHARS))
            .transpose()?;
        let prayer_type = self
            .prayer_type
            .map(|p| required_text("prayerType", p, CHALLENGE_TITLE_MAX_CHARS))
            .transpose()?;
        if let Some(total_target) = self.total_target {
            positive("totalTarget", total_target)?;
        }
        if let Some(current_count) = self.current_count {
            if current_count < 0 {
                return Err(ValidationError::out_of_range(
                    "currentCount",
                    "must be greater than or equal to 0",
                ));
            }
        }
        Ok(Self {
            title,
            prayer_type,
            total_target: self.total_target,
            current_count: self.current_count,
            is_active: self.is_active,
        })
    }

    /// Whether applying this update makes the challenge the active one.
    pub fn activates(&self) -> bool {
        self.is_active == Some(true)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.prayer_type.is_none()
            && self.total_target.is_none()
            && self.current_count.is_none()
            && self.is_active.is_none()
    }
}

// ============================================================================
// FIELD RULES
// ============================================================================

fn required_text(field: &str, value: String, max_chars: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing(field));
    }
    check_length(field, trimmed, max_chars)?;
    Ok(trimmed.to_string())
}

fn optional_text(
    field: &str,
    value: Option<String>,
    max_chars: usize,
) -> Result<Option<String>, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => {
            let trimmed = v.trim();
            check_length(field, trimmed, max_chars)?;
            Ok(Some(trimmed.to_string()))
        }
        _ => Ok(None),
    }
}

fn check_length(field: &str, value: &str, max_chars: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::out_of_range(
            field,
            format!("must be at most {} characters", max_chars),
        ));
    }
    Ok(())
}

fn positive(field: &str, value: i32) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::out_of_range(field, "must be greater than 0"));
    }
    Ok(())
}

/// Add `delta` to a counter slot, refusing to overflow.
///
/// Used by in-process stores to apply an increment under their write guard.
pub fn checked_increment(slot: &mut i32, counter: Counter, delta: i32) -> Result<i32, ValidationError> {
    let next = slot.checked_add(delta).ok_or_else(|| {
        ValidationError::out_of_range(counter.field_name(), "increment would overflow the counter")
    })?;
    *slot = next;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_new_intention_trims_and_drops_blank_optionals() -> Result<(), ValidationError> {
        let new = NewIntention::new("  For my family  ", Some("   ".to_string()), None)?;
        assert_eq!(new.content, "For my family");
        assert_eq!(new.name, None);
        assert_eq!(new.prayer_type, None);
        Ok(())
    }

    #[test]
    fn test_new_intention_requires_content() {
        let err = NewIntention::new("   ", None, None).unwrap_err();
        assert_eq!(err, ValidationError::missing("content"));
    }

    #[test]
    fn test_new_intention_content_limit() {
        let long = "x".repeat(INTENTION_CONTENT_MAX_CHARS + 1);
        let err = NewIntention::new(long, None, None).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_intention_wire_format_is_camel_case() -> Result<(), Box<dyn std::error::Error>> {
        let new = NewIntention::new("Test", Some("Anon".to_string()), None)?;
        let intention = Intention::from_new(7, &new, Utc::now());
        let json = serde_json::to_value(&intention)?;
        assert_eq!(json["hailMaryCount"], 0);
        assert_eq!(json["ourFatherCount"], 0);
        assert_eq!(json["rosaryCount"], 0);
        assert_eq!(json["isPrinted"], false);
        assert_eq!(json["name"], "Anon");
        assert!(json.get("createdAt").is_some());
        Ok(())
    }

    #[test]
    fn test_new_challenge_defaults_to_active() -> Result<(), ValidationError> {
        let new = NewChallenge::new("Lent", "rosary", 500, None)?;
        assert!(new.activates());
        let new = NewChallenge::new("Lent", "rosary", 500, Some(false))?;
        assert!(!new.activates());
        Ok(())
    }

    #[test]
    fn test_new_challenge_rejects_non_positive_target() {
        assert!(NewChallenge::new("Lent", "rosary", 0, None).is_err());
        assert!(NewChallenge::new("Lent", "rosary", -3, None).is_err());
        assert!(NewChallenge::new("", "rosary", 10, None).is_err());
    }

    #[test]
    fn test_challenge_update_validation() {
        assert!(ChallengeUpdate {
            current_count: Some(-1),
            ..ChallengeUpdate::default()
        }
        .validated()
        .is_err());
        assert!(ChallengeUpdate {
            title: Some("  ".to_string()),
            ..ChallengeUpdate::default()
        }
        .validated()
        .is_err());
        assert!(ChallengeUpdate::default().is_empty());
        assert!(ChallengeUpdate::activation(true).activates());
        assert!(!ChallengeUpdate::activation(false).activates());
    }

    #[test]
    fn test_challenge_progress() -> Result<(), ValidationError> {
        let new = NewChallenge::new("Advent", "hailMary", 200, None)?;
        let mut challenge = Challenge::from_new(1, &new, Utc::now());
        assert_eq!(challenge.percent_complete(), 0);
        challenge.current_count = 50;
        assert_eq!(challenge.percent_complete(), 25);
        assert!(!challenge.is_complete());
        challenge.current_count = 450;
        assert_eq!(challenge.percent_complete(), 100);
        assert!(challenge.is_complete());
        Ok(())
    }

    #[test]
    fn test_checked_increment_overflow() {
        let mut slot = i32::MAX - 1;
        assert_eq!(checked_increment(&mut slot, Counter::HailMary, 1), Ok(i32::MAX));
        assert!(checked_increment(&mut slot, Counter::HailMary, 1).is_err());
        assert_eq!(slot, i32::MAX);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn challenge(current_count: i32, total_target: i32) -> Challenge {
        Challenge {
            id: 1,
            title: "Goal".to_string(),
            prayer_type: "rosary".to_string(),
            total_target,
            current_count,
            is_active: true,
            created_at: crate::now(),
        }
    }

    proptest! {
        #[test]
        fn prop_percent_complete_is_bounded(current in any::<i32>(), target in any::<i32>()) {
            let c = challenge(current, target);
            let pct = c.percent_complete();
            prop_assert!((0..=100).contains(&pct));
            if c.is_complete() && target > 0 {
                prop_assert_eq!(pct, 100);
            }
        }

        #[test]
        fn prop_checked_increment_matches_checked_add(start in any::<i32>(), delta in 1..=i32::MAX) {
            let mut slot = start;
            match checked_increment(&mut slot, Counter::ChallengeProgress, delta) {
                Ok(next) => {
                    prop_assert_eq!(Some(next), start.checked_add(delta));
                    prop_assert_eq!(slot, next);
                }
                Err(err) => {
                    prop_assert!(start.checked_add(delta).is_none());
                    prop_assert_eq!(err.field(), "currentCount");
                    prop_assert_eq!(slot, start);
                }
            }
        }

        #[test]
        fn prop_submission_text_is_trimmed(
            content in "[ ]{0,3}[A-Za-z][A-Za-z ]{0,40}[ ]{0,3}",
            name in proptest::option::of("[ ]{0,3}[A-Za-z ]{0,20}"),
        ) {
            let new = NewIntention::new(content.clone(), name.clone(), None)
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert_eq!(new.content.as_str(), content.trim());
            let expected_name = name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty());
            prop_assert_eq!(new.name.as_deref(), expected_name);
        }

        #[test]
        fn prop_new_challenge_rejects_non_positive_target(target in i32::MIN..=0) {
            let err = NewChallenge::new("Goal", "rosary", target, None)
                .err()
                .ok_or_else(|| TestCaseError::fail("target accepted"))?;
            prop_assert_eq!(err.field(), "totalTarget");
        }
    }
}
