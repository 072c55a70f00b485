use serde::Serialize;
use thiserror::Error;

use super::request::RequestError;
use crate::backend::BackendError;
use crate::models::OrganizationId;

/// Client-visible progress of one onboarding run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStage {
    #[default]
    NotStarted,
    OrganizationCreated,
    LogoAttached,
    LogoSkipped,
    Completed,
    RolledBack,
    /// Stopped before any record was created
    Failed,
}

impl OnboardingStage {
    /// True once an organization may exist on the backend because of this run
    pub fn created_organization(&self) -> bool {
        !matches!(self, OnboardingStage::NotStarted | OnboardingStage::Failed)
    }
}

/// What happened to the optional logo. Never fails the run on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoOutcome {
    NotProvided,
    Attached { url: String },
    Failed { reason: String },
}

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("Invalid onboarding request: {0}")]
    InvalidRequest(#[from] RequestError),
    #[error("Failed to create organization: {source}")]
    OrganizationCreation { source: BackendError },
    #[error("Organization creation returned no record")]
    OrganizationNotReturned,
    #[error("Failed to create data room and invitations: {source}")]
    Transaction {
        organization_id: OrganizationId,
        source: BackendError,
    },
    #[error(
        "Failed to create data room and invitations: {source} \
         (removing organization {organization_id} also failed: {cleanup})"
    )]
    RollbackFailed {
        organization_id: OrganizationId,
        source: BackendError,
        cleanup: BackendError,
    },
    #[error("Unexpected onboarding failure: {message}")]
    Unexpected { message: String },
}

impl OnboardingError {
    /// The backend failure that ended the run, if there was one
    pub fn backend_cause(&self) -> Option<&BackendError> {
        match self {
            OnboardingError::OrganizationCreation { source }
            | OnboardingError::Transaction { source, .. }
            | OnboardingError::RollbackFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Organization that may have been left behind on the backend
    pub fn orphaned_organization(&self) -> Option<&OrganizationId> {
        match self {
            OnboardingError::RollbackFailed {
                organization_id, ..
            } => Some(organization_id),
            _ => None,
        }
    }
}

/// Result of `complete_onboarding`
#[derive(Debug)]
pub enum OnboardingOutcome {
    Completed {
        organization_id: OrganizationId,
        logo: LogoOutcome,
    },
    Failed {
        error: OnboardingError,
        stage: OnboardingStage,
    },
}

impl OnboardingOutcome {
    pub fn success(&self) -> bool {
        matches!(self, OnboardingOutcome::Completed { .. })
    }

    /// Present on success, absent on failure
    pub fn organization_id(&self) -> Option<&OrganizationId> {
        match self {
            OnboardingOutcome::Completed {
                organization_id, ..
            } => Some(organization_id),
            OnboardingOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&OnboardingError> {
        match self {
            OnboardingOutcome::Failed { error, .. } => Some(error),
            OnboardingOutcome::Completed { .. } => None,
        }
    }

    pub fn logo(&self) -> Option<&LogoOutcome> {
        match self {
            OnboardingOutcome::Completed { logo, .. } => Some(logo),
            OnboardingOutcome::Failed { .. } => None,
        }
    }

    pub fn stage(&self) -> OnboardingStage {
        match self {
            OnboardingOutcome::Completed { .. } => OnboardingStage::Completed,
            OnboardingOutcome::Failed { stage, .. } => *stage,
        }
    }

    pub fn into_result(self) -> Result<OrganizationId, OnboardingError> {
        match self {
            OnboardingOutcome::Completed {
                organization_id, ..
            } => Ok(organization_id),
            OnboardingOutcome::Failed { error, .. } => Err(error),
        }
    }
}
