//! Request and Response Types for the Vigil API
//!
//! Request bodies keep every field optional so that a missing field reaches
//! core validation and comes back as a typed `MISSING_FIELD` error rather
//! than a deserializer message. All bodies use camelCase field names.

use serde::{Deserialize, Serialize};
use vigil_core::{
    Challenge, ChallengeUpdate, NewChallenge, NewIntention, PrayerKind, ValidationError,
};

// ============================================================================
// INTENTION REQUESTS
// ============================================================================

/// Request to submit a new intention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentionRequest {
    /// The intention text (required)
    pub content: Option<String>,
    /// Optional submitter name
    pub name: Option<String>,
    /// Optional preferred prayer for this intention
    pub prayer_type: Option<String>,
}

impl TryFrom<CreateIntentionRequest> for NewIntention {
    type Error = ValidationError;

    fn try_from(req: CreateIntentionRequest) -> Result<Self, Self::Error> {
        let content = req.content.ok_or_else(|| ValidationError::missing("content"))?;
        NewIntention::new(content, req.name, req.prayer_type)
    }
}

/// Request to count one prayer against an intention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
pub struct PrayRequest {
    /// One of `hailMary`, `ourFather`, `rosary`
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl PrayRequest {
    pub fn prayer_kind(&self) -> Result<PrayerKind, ValidationError> {
        match self.kind.as_deref() {
            Some(kind) => kind.parse(),
            None => Err(ValidationError::missing("type")),
        }
    }
}

// ============================================================================
// CHALLENGE REQUESTS
// ============================================================================

/// Request to add progress to a challenge. The body may be omitted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
#[serde(default)]
pub struct IncrementChallengeRequest {
    /// Amount to add (≥ 1, default 1)
    pub amount: i32,
}

impl Default for IncrementChallengeRequest {
    fn default() -> Self {
        Self { amount: 1 }
    }
}

/// Request to create a challenge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChallengeRequest {
    pub title: Option<String>,
    pub prayer_type: Option<String>,
    pub total_target: Option<i32>,
    /// Defaults to true, which deactivates the current active challenge
    pub is_active: Option<bool>,
}

impl TryFrom<CreateChallengeRequest> for NewChallenge {
    type Error = ValidationError;

    fn try_from(req: CreateChallengeRequest) -> Result<Self, Self::Error> {
        let title = req.title.ok_or_else(|| ValidationError::missing("title"))?;
        let prayer_type = req
            .prayer_type
            .ok_or_else(|| ValidationError::missing("prayerType"))?;
        let total_target = req
            .total_target
            .ok_or_else(|| ValidationError::missing("totalTarget"))?;
        NewChallenge::new(title, prayer_type, total_target, req.is_active)
    }
}

/// Partial challenge update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChallengeRequest {
    pub title: Option<String>,
    pub prayer_type: Option<String>,
    pub total_target: Option<i32>,
    pub current_count: Option<i32>,
    pub is_active: Option<bool>,
}

impl From<UpdateChallengeRequest> for ChallengeUpdate {
    fn from(req: UpdateChallengeRequest) -> Self {
        ChallengeUpdate {
            title: req.title,
            prayer_type: req.prayer_type,
            total_target: req.total_target,
            current_count: req.current_count,
            is_active: req.is_active,
        }
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

/// A challenge with its derived progress fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[derive(utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    #[serde(flatten)]
    pub challenge: Challenge,
    /// Whole percentage of the target reached, capped at 100
    pub percent_complete: i32,
    pub is_complete: bool,
}

impl From<Challenge> for ChallengeResponse {
    fn from(challenge: Challenge) -> Self {
        Self {
            percent_complete: challenge.percent_complete(),
            is_complete: challenge.is_complete(),
            challenge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn challenge(current_count: i32, total_target: i32) -> Challenge {
        Challenge {
            id: 3,
            title: "Lent rosaries".to_string(),
            prayer_type: "rosary".to_string(),
            total_target,
            current_count,
            is_active: true,
            created_at: vigil_core::now(),
        }
    }

    #[test]
    fn test_create_intention_requires_content() {
        let req = CreateIntentionRequest {
            name: Some("Anon".to_string()),
            ..Default::default()
        };
        let err = NewIntention::try_from(req).unwrap_err();
        assert_eq!(err.field(), "content");
    }

    #[test]
    fn test_pray_request_reads_type_field() {
        let req: PrayRequest = serde_json::from_value(json!({"type": "ourFather"})).unwrap();
        assert_eq!(req.prayer_kind().unwrap(), PrayerKind::OurFather);
    }

    #[test]
    fn test_pray_request_unknown_and_missing_type() {
        let unknown: PrayRequest = serde_json::from_value(json!({"type": "novena"})).unwrap();
        assert!(matches!(
            unknown.prayer_kind(),
            Err(ValidationError::InvalidValue { .. })
        ));

        let missing: PrayRequest = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            missing.prayer_kind(),
            Err(ValidationError::RequiredFieldMissing { .. })
        ));
    }

    #[test]
    fn test_increment_amount_defaults_to_one() {
        let req: IncrementChallengeRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.amount, 1);
        let req: IncrementChallengeRequest = serde_json::from_value(json!({"amount": 25})).unwrap();
        assert_eq!(req.amount, 25);
    }

    #[test]
    fn test_create_challenge_missing_target() {
        let req: CreateChallengeRequest =
            serde_json::from_value(json!({"title": "Week 1", "prayerType": "rosary"})).unwrap();
        let err = NewChallenge::try_from(req).unwrap_err();
        assert_eq!(err.field(), "totalTarget");
    }

    #[test]
    fn test_create_challenge_leaves_activation_unset() {
        let req: CreateChallengeRequest = serde_json::from_value(
            json!({"title": "Week 1", "prayerType": "rosary", "totalTarget": 100}),
        )
        .unwrap();
        let new = NewChallenge::try_from(req).unwrap();
        assert_eq!(new.is_active, None);
        assert!(new.activates());
    }

    #[test]
    fn test_update_request_maps_camel_case_fields() {
        let req: UpdateChallengeRequest =
            serde_json::from_value(json!({"isActive": true, "currentCount": 4})).unwrap();
        let update = ChallengeUpdate::from(req);
        assert_eq!(update.is_active, Some(true));
        assert_eq!(update.current_count, Some(4));
        assert_eq!(update.title, None);
    }

    #[test]
    fn test_challenge_response_flattens_fields() {
        let value = serde_json::to_value(ChallengeResponse::from(challenge(50, 200))).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["totalTarget"], 200);
        assert_eq!(value["isActive"], true);
        assert_eq!(value["percentComplete"], 25);
        assert_eq!(value["isComplete"], false);
        assert!(value.get("challenge").is_none());
    }

    #[test]
    fn test_challenge_response_caps_percent() {
        let response = ChallengeResponse::from(challenge(350, 100));
        assert_eq!(response.percent_complete, 100);
        assert!(response.is_complete);
    }
}
