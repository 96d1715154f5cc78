//! Enumerated tags for entity kinds and counters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Entity type discriminator used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntityType {
    Intention,
    Challenge,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Intention => "intention",
            EntityType::Challenge => "challenge",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of prayer offered for an intention.
///
/// Wire values are `hailMary`, `ourFather` and `rosary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum PrayerKind {
    HailMary,
    OurFather,
    Rosary,
}

impl PrayerKind {
    pub const ALL: [PrayerKind; 3] = [PrayerKind::HailMary, PrayerKind::OurFather, PrayerKind::Rosary];

    /// Wire tag for this prayer kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerKind::HailMary => "hailMary",
            PrayerKind::OurFather => "ourFather",
            PrayerKind::Rosary => "rosary",
        }
    }
}

impl fmt::Display for PrayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrayerKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hailMary" => Ok(PrayerKind::HailMary),
            "ourFather" => Ok(PrayerKind::OurFather),
            "rosary" => Ok(PrayerKind::Rosary),
            other => Err(ValidationError::InvalidValue {
                field: "type".to_string(),
                reason: format!(
                    "unknown prayer type '{}', expected one of hailMary, ourFather, rosary",
                    other
                ),
            }),
        }
    }
}

/// A counter that the atomic updater may increment.
///
/// Each variant maps to exactly one stored integer field. Intention
/// counters and the challenge progress counter never share a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// `Intention.hailMaryCount`
    HailMary,
    /// `Intention.ourFatherCount`
    OurFather,
    /// `Intention.rosaryCount`
    Rosary,
    /// `Challenge.currentCount`
    ChallengeProgress,
}

impl Counter {
    /// The entity kind that owns this counter.
    pub fn entity_type(&self) -> EntityType {
        match self {
            Counter::HailMary | Counter::OurFather | Counter::Rosary => EntityType::Intention,
            Counter::ChallengeProgress => EntityType::Challenge,
        }
    }

    /// Field name as it appears on the wire.
    pub fn field_name(&self) -> &'static str {
        match self {
            Counter::HailMary => "hailMaryCount",
            Counter::OurFather => "ourFatherCount",
            Counter::Rosary => "rosaryCount",
            Counter::ChallengeProgress => "currentCount",
        }
    }

    /// The prayer kind behind an intention counter.
    pub fn prayer_kind(&self) -> Option<PrayerKind> {
        match self {
            Counter::HailMary => Some(PrayerKind::HailMary),
            Counter::OurFather => Some(PrayerKind::OurFather),
            Counter::Rosary => Some(PrayerKind::Rosary),
            Counter::ChallengeProgress => None,
        }
    }
}

impl From<PrayerKind> for Counter {
    fn from(kind: PrayerKind) -> Self {
        match kind {
            PrayerKind::HailMary => Counter::HailMary,
            PrayerKind::OurFather => Counter::OurFather,
            PrayerKind::Rosary => Counter::Rosary,
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prayer_kind_wire_format() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&PrayerKind::HailMary)?, "\"hailMary\"");
        assert_eq!(serde_json::to_string(&PrayerKind::OurFather)?, "\"ourFather\"");
        let kind: PrayerKind = serde_json::from_str("\"rosary\"")?;
        assert_eq!(kind, PrayerKind::Rosary);
        Ok(())
    }

    #[test]
    fn test_prayer_kind_from_str_matches_as_str() {
        for kind in PrayerKind::ALL {
            assert_eq!(kind.as_str().parse::<PrayerKind>().ok(), Some(kind));
        }
    }

    #[test]
    fn test_prayer_kind_rejects_unknown_tag() {
        let err = "glory".parse::<PrayerKind>().unwrap_err();
        assert!(err.to_string().contains("glory"));
        assert!("HailMary".parse::<PrayerKind>().is_err());
    }

    #[test]
    fn test_counter_ownership() {
        for kind in PrayerKind::ALL {
            let counter = Counter::from(kind);
            assert_eq!(counter.entity_type(), EntityType::Intention);
            assert_eq!(counter.prayer_kind(), Some(kind));
        }
        assert_eq!(Counter::ChallengeProgress.entity_type(), EntityType::Challenge);
        assert_eq!(Counter::ChallengeProgress.prayer_kind(), None);
        assert_eq!(Counter::Rosary.field_name(), "rosaryCount");
    }
}
