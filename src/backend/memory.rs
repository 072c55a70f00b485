//! In-process backend used for dry runs and tests.
//!
//! Every port call is recorded in order, and any operation can be told to
//! fail, which makes partial-failure paths of the onboarding flow easy to
//! reproduce without a network.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::errors::BackendError;
use super::traits::{
    DataRoomStore, InvitationStore, ObjectStorage, ObjectUpload, OnboardingProcedure,
    OnboardingTransaction, OrganizationStore, ProfileStore, StoredObject,
};
use crate::models::{
    DataRoom, DataRoomId, InvitationId, InvitationStatus, NewOrganization, Organization,
    OrganizationId, TeamInvitation, UserId, UserProfile,
};

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    CreateOrganization,
    GetOrganization,
    SetLogoUrl,
    DeleteOrganization,
    ListDataRooms,
    ListInvitations,
    GetProfile,
    Upload,
    CompleteOnboarding,
}

/// A recorded port call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateOrganization { name: String },
    GetOrganization { id: OrganizationId },
    SetLogoUrl { id: OrganizationId, logo_url: String },
    DeleteOrganization { id: OrganizationId },
    ListDataRooms { organization_id: OrganizationId },
    ListInvitations { organization_id: OrganizationId },
    GetProfile { user_id: UserId },
    Upload { bucket: String, path: String, size: usize, upsert: bool },
    CompleteOnboarding(OnboardingTransaction),
}

impl BackendCall {
    pub fn operation(&self) -> BackendOperation {
        match self {
            BackendCall::CreateOrganization { .. } => BackendOperation::CreateOrganization,
            BackendCall::GetOrganization { .. } => BackendOperation::GetOrganization,
            BackendCall::SetLogoUrl { .. } => BackendOperation::SetLogoUrl,
            BackendCall::DeleteOrganization { .. } => BackendOperation::DeleteOrganization,
            BackendCall::ListDataRooms { .. } => BackendOperation::ListDataRooms,
            BackendCall::ListInvitations { .. } => BackendOperation::ListInvitations,
            BackendCall::GetProfile { .. } => BackendOperation::GetProfile,
            BackendCall::Upload { .. } => BackendOperation::Upload,
            BackendCall::CompleteOnboarding(_) => BackendOperation::CompleteOnboarding,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    organizations: HashMap<OrganizationId, Organization>,
    data_rooms: Vec<DataRoom>,
    invitations: Vec<TeamInvitation>,
    profiles: HashMap<UserId, UserProfile>,
    objects: HashMap<(String, String), Vec<u8>>,
    calls: Vec<BackendCall>,
    failing: HashSet<BackendOperation>,
    withhold_created_rows: bool,
}

#[derive(Debug)]
pub struct InMemoryBackend {
    public_base_url: String,
    state: Mutex<MemoryState>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            public_base_url: "memory://storage".to_string(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call, then fail it if the operation was marked as failing
    fn enter(&self, call: BackendCall) -> Result<MutexGuard<'_, MemoryState>, BackendError> {
        let operation = call.operation();
        let mut state = self.state();
        state.calls.push(call);
        if state.failing.contains(&operation) {
            return Err(BackendError::Injected {
                operation: format!("{operation:?}"),
            });
        }
        Ok(state)
    }

    /// Make every future call of `operation` fail
    pub fn fail_on(&self, operation: BackendOperation) {
        self.state().failing.insert(operation);
    }

    pub fn recover(&self, operation: BackendOperation) {
        self.state().failing.remove(&operation);
    }

    /// Accept organization inserts without returning the created row
    pub fn withhold_created_rows(&self, withhold: bool) {
        self.state().withhold_created_rows = withhold;
    }

    pub fn insert_profile(&self, profile: UserProfile) {
        self.state().profiles.insert(profile.id, profile);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.clone()
    }

    pub fn calls_to(&self, operation: BackendOperation) -> Vec<BackendCall> {
        self.state()
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .cloned()
            .collect()
    }

    pub fn organizations(&self) -> Vec<Organization> {
        self.state().organizations.values().cloned().collect()
    }

    pub fn invitations(&self) -> Vec<TeamInvitation> {
        self.state().invitations.clone()
    }

    pub fn data_rooms(&self) -> Vec<DataRoom> {
        self.state().data_rooms.clone()
    }

    pub fn profile(&self, user_id: &UserId) -> Option<UserProfile> {
        self.state().profiles.get(user_id).cloned()
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.state()
            .objects
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }
}

#[async_trait]
impl OrganizationStore for InMemoryBackend {
    async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<Option<Organization>, BackendError> {
        let mut state = self.enter(BackendCall::CreateOrganization {
            name: organization.name.clone(),
        })?;

        let now = Utc::now();
        let created = Organization {
            id: OrganizationId::new(),
            name: organization.name.clone(),
            logo_url: None,
            created_at: now,
            updated_at: now,
        };
        state.organizations.insert(created.id, created.clone());

        Ok(if state.withhold_created_rows {
            None
        } else {
            Some(created)
        })
    }

    async fn get_organization(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, BackendError> {
        let state = self.enter(BackendCall::GetOrganization { id: *id })?;
        Ok(state.organizations.get(id).cloned())
    }

    async fn set_logo_url(&self, id: &OrganizationId, logo_url: &str) -> Result<(), BackendError> {
        let mut state = self.enter(BackendCall::SetLogoUrl {
            id: *id,
            logo_url: logo_url.to_string(),
        })?;

        let organization = state
            .organizations
            .get_mut(id)
            .ok_or_else(|| BackendError::NotFound {
                entity: "organization",
                id: id.to_string(),
            })?;
        organization.logo_url = Some(logo_url.to_string());
        organization.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_organization(&self, id: &OrganizationId) -> Result<(), BackendError> {
        let mut state = self.enter(BackendCall::DeleteOrganization { id: *id })?;

        state.organizations.remove(id);
        state.data_rooms.retain(|room| room.organization_id != *id);
        state.invitations.retain(|invite| invite.organization_id != *id);
        Ok(())
    }
}

#[async_trait]
impl DataRoomStore for InMemoryBackend {
    async fn list_data_rooms(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<DataRoom>, BackendError> {
        let state = self.enter(BackendCall::ListDataRooms {
            organization_id: *organization_id,
        })?;
        Ok(state
            .data_rooms
            .iter()
            .filter(|room| room.organization_id == *organization_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InvitationStore for InMemoryBackend {
    async fn list_invitations(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<TeamInvitation>, BackendError> {
        let state = self.enter(BackendCall::ListInvitations {
            organization_id: *organization_id,
        })?;
        Ok(state
            .invitations
            .iter()
            .filter(|invite| invite.organization_id == *organization_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProfileStore for InMemoryBackend {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        let state = self.enter(BackendCall::GetProfile { user_id: *user_id })?;
        Ok(state.profiles.get(user_id).cloned())
    }
}

#[async_trait]
impl ObjectStorage for InMemoryBackend {
    async fn upload(&self, object: ObjectUpload) -> Result<StoredObject, BackendError> {
        let mut state = self.enter(BackendCall::Upload {
            bucket: object.bucket.clone(),
            path: object.path.clone(),
            size: object.bytes.len(),
            upsert: object.upsert,
        })?;

        let key = (object.bucket.clone(), object.path.clone());
        if !object.upsert && state.objects.contains_key(&key) {
            return Err(BackendError::Storage {
                path: object.path,
                message: "The resource already exists".to_string(),
            });
        }
        state.objects.insert(key, object.bytes);

        Ok(StoredObject {
            bucket: object.bucket,
            path: object.path,
        })
    }

    fn public_url(&self, object: &StoredObject) -> String {
        format!("{}/{}/{}", self.public_base_url, object.bucket, object.path)
    }
}

#[async_trait]
impl OnboardingProcedure for InMemoryBackend {
    async fn complete_onboarding(
        &self,
        transaction: &OnboardingTransaction,
    ) -> Result<(), BackendError> {
        let mut state = self.enter(BackendCall::CompleteOnboarding(transaction.clone()))?;

        if !state.organizations.contains_key(&transaction.organization_id) {
            return Err(BackendError::Procedure {
                procedure: "complete_onboarding".to_string(),
                code: Some("23503".to_string()),
                message: format!("organization {} does not exist", transaction.organization_id),
            });
        }

        let now = Utc::now();
        state.data_rooms.push(DataRoom {
            id: DataRoomId::new(),
            organization_id: transaction.organization_id,
            name: transaction.data_room_name.clone(),
            description: transaction.data_room_description.clone(),
            created_by: transaction.user_id,
            created_at: now,
            updated_at: now,
        });

        for email in &transaction.invitee_emails {
            state.invitations.push(TeamInvitation {
                id: InvitationId::new(),
                organization_id: transaction.organization_id,
                email: email.clone(),
                invited_by: transaction.user_id,
                status: InvitationStatus::Pending,
                created_at: now,
            });
        }

        let profile = state
            .profiles
            .entry(transaction.user_id)
            .or_insert_with(|| UserProfile {
                id: transaction.user_id,
                organization_id: None,
                full_name: None,
                is_onboarded: false,
            });
        profile.organization_id = Some(transaction.organization_id);
        profile.is_onboarded = true;

        Ok(())
    }
}
