//! Read side of the dashboard shell: who the user is, whether they still
//! have to go through onboarding, and what their organization holds.

use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::backend::{
    BackendError, DataRoomStore, InvitationStore, OrganizationStore, ProfileStore,
};
use crate::models::{
    DataRoom, InvitationStatus, Organization, OrganizationId, TeamInvitation, UserId, UserProfile,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationOverview {
    pub organization: Organization,
    pub data_rooms: Vec<DataRoom>,
    pub pending_invitations: Vec<TeamInvitation>,
    pub accepted_invitations: Vec<TeamInvitation>,
    pub declined_invitations: Vec<TeamInvitation>,
}

impl OrganizationOverview {
    pub fn invitation_count(&self) -> usize {
        self.pending_invitations.len()
            + self.accepted_invitations.len()
            + self.declined_invitations.len()
    }
}

pub struct DashboardService {
    profiles: Arc<dyn ProfileStore>,
    organizations: Arc<dyn OrganizationStore>,
    data_rooms: Arc<dyn DataRoomStore>,
    invitations: Arc<dyn InvitationStore>,
}

impl DashboardService {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        organizations: Arc<dyn OrganizationStore>,
        data_rooms: Arc<dyn DataRoomStore>,
        invitations: Arc<dyn InvitationStore>,
    ) -> Self {
        Self {
            profiles,
            organizations,
            data_rooms,
            invitations,
        }
    }

    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ProfileStore + OrganizationStore + DataRoomStore + InvitationStore + 'static,
    {
        Self::new(backend.clone(), backend.clone(), backend.clone(), backend)
    }

    pub async fn profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        self.profiles.get_profile(user_id).await
    }

    /// Users without a profile, or with a profile not yet linked to an
    /// organization, are sent to the onboarding wizard.
    pub async fn needs_onboarding(&self, user_id: &UserId) -> Result<bool, BackendError> {
        let needs = match self.profile(user_id).await? {
            Some(profile) => !profile.has_completed_onboarding(),
            None => true,
        };
        debug!(user_id = %user_id, needs_onboarding = needs, "Checked onboarding gate");
        Ok(needs)
    }

    pub async fn organization_overview(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<OrganizationOverview, BackendError> {
        let organization = self
            .organizations
            .get_organization(organization_id)
            .await?
            .ok_or_else(|| BackendError::NotFound {
                entity: "organization",
                id: organization_id.to_string(),
            })?;

        let data_rooms = self.data_rooms.list_data_rooms(organization_id).await?;

        let mut pending_invitations = Vec::new();
        let mut accepted_invitations = Vec::new();
        let mut declined_invitations = Vec::new();
        for invitation in self.invitations.list_invitations(organization_id).await? {
            match invitation.status {
                InvitationStatus::Pending => pending_invitations.push(invitation),
                InvitationStatus::Accepted => accepted_invitations.push(invitation),
                InvitationStatus::Declined => declined_invitations.push(invitation),
            }
        }

        Ok(OrganizationOverview {
            organization,
            data_rooms,
            pending_invitations,
            accepted_invitations,
            declined_invitations,
        })
    }
}
