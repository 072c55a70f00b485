//! Ports onto the hosted backend.
//!
//! The onboarding flow and the dashboard only ever talk to these traits, so
//! they can run against the REST client, the in-memory backend, or mocks.

use async_trait::async_trait;
use serde::Serialize;

use super::errors::BackendError;
use crate::models::{
    DataRoom, NewOrganization, Organization, OrganizationId, TeamInvitation, UserId, UserProfile,
};

/// Record operations on the organizations table
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Insert an organization. `Ok(None)` means the backend accepted the
    /// request but did not hand the row back.
    async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<Option<Organization>, BackendError>;

    async fn get_organization(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, BackendError>;

    async fn set_logo_url(&self, id: &OrganizationId, logo_url: &str) -> Result<(), BackendError>;

    async fn delete_organization(&self, id: &OrganizationId) -> Result<(), BackendError>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DataRoomStore: Send + Sync {
    async fn list_data_rooms(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<DataRoom>, BackendError>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait InvitationStore: Send + Sync {
    async fn list_invitations(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<TeamInvitation>, BackendError>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, BackendError>;
}

/// A binary object headed for the object store
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectUpload {
    pub bucket: String,
    pub path: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// Overwrite an existing object at the same path
    pub upsert: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
}

/// Binary object store with public URLs
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, object: ObjectUpload) -> Result<StoredObject, BackendError>;

    /// Public URL of a stored object. Pure string construction, no request is made.
    fn public_url(&self, object: &StoredObject) -> String;
}

/// Arguments of the atomic data-room + invitations procedure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnboardingTransaction {
    pub user_id: UserId,
    pub organization_id: OrganizationId,
    pub data_room_name: String,
    pub data_room_description: Option<String>,
    pub invitee_emails: Vec<String>,
}

/// The one backend-side transaction of the onboarding flow: it creates the
/// data room, one pending invitation per email and flags the user profile
/// as onboarded, all or nothing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait OnboardingProcedure: Send + Sync {
    async fn complete_onboarding(
        &self,
        transaction: &OnboardingTransaction,
    ) -> Result<(), BackendError>;
}
