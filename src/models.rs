//! Rows of the hosted backend's relational tables.
//!
//! Field names match the JSON the backend returns, so every type here
//! (de)serializes straight from a table row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! surrogate_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

surrogate_id!(
    /// Identity of an organization
    OrganizationId
);
surrogate_id!(
    /// Identity of the authenticated user, shared by their profile row
    UserId
);
surrogate_id!(DataRoomId);
surrogate_id!(InvitationId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for inserting an organization; the backend assigns identity and timestamps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrganization {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRoom {
    pub id: DataRoomId,
    pub organization_id: OrganizationId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInvitation {
    pub id: InvitationId,
    pub organization_id: OrganizationId,
    pub email: String,
    pub invited_by: UserId,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub organization_id: Option<OrganizationId>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_onboarded: bool,
}

impl UserProfile {
    /// A profile counts as onboarded only once it is flagged and linked to an organization
    pub fn has_completed_onboarding(&self) -> bool {
        self.is_onboarded && self.organization_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_organization_row_without_logo() {
        let row = json!({
            "id": "6f1c1f9e-0c1d-4a55-9a39-4bb0f4f0a001",
            "name": "Acme Inc",
            "logo_url": null,
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-01T10:00:00Z"
        });

        let org: Organization = serde_json::from_value(row).unwrap();
        assert_eq!(org.name, "Acme Inc");
        assert!(org.logo_url.is_none());
        assert_eq!(org.id.to_string(), "6f1c1f9e-0c1d-4a55-9a39-4bb0f4f0a001");
    }

    #[test]
    fn test_invitation_status_wire_format() {
        assert_eq!(
            serde_json::to_value(InvitationStatus::Pending).unwrap(),
            json!("pending")
        );
        let status: InvitationStatus = serde_json::from_value(json!("declined")).unwrap();
        assert_eq!(status, InvitationStatus::Declined);
        assert_eq!(InvitationStatus::Accepted.to_string(), "accepted");
    }

    #[test]
    fn test_profile_onboarding_requires_flag_and_organization() {
        let mut profile = UserProfile {
            id: UserId::new(),
            organization_id: None,
            full_name: Some("Ada".to_string()),
            is_onboarded: true,
        };
        assert!(!profile.has_completed_onboarding());

        profile.organization_id = Some(OrganizationId::new());
        assert!(profile.has_completed_onboarding());

        profile.is_onboarded = false;
        assert!(!profile.has_completed_onboarding());
    }

    #[test]
    fn test_ids_parse_from_strings() {
        let id: OrganizationId = "6f1c1f9e-0c1d-4a55-9a39-4bb0f4f0a001".parse().unwrap();
        assert_eq!(id.as_uuid().to_string(), "6f1c1f9e-0c1d-4a55-9a39-4bb0f4f0a001");
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }
}
