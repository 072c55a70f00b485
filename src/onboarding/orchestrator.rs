use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn, Instrument};

use super::outcome::{LogoOutcome, OnboardingError, OnboardingOutcome};
use super::progress::{ProgressEvent, ProgressTracker};
use super::request::{LogoFile, OnboardingData};
use super::saga::{with_compensation, CleanupOutcome, Compensated};
use crate::backend::{
    BackendError, ObjectStorage, ObjectUpload, OnboardingProcedure, OnboardingTransaction,
    OrganizationStore,
};
use crate::config::BackendConfig;
use crate::models::{NewOrganization, Organization, OrganizationId, UserId};
use crate::telemetry::{create_onboarding_span, generate_correlation_id};

/// Where logos are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingSettings {
    pub logo_bucket: String,
    pub logo_object_name: String,
}

impl Default for OnboardingSettings {
    fn default() -> Self {
        Self::from(&BackendConfig::default())
    }
}

impl From<&BackendConfig> for OnboardingSettings {
    fn from(config: &BackendConfig) -> Self {
        Self {
            logo_bucket: config.logo_bucket.clone(),
            logo_object_name: config.logo_object_name.clone(),
        }
    }
}

/// Sequences organization creation, the optional logo and the data-room
/// transaction, deleting the organization again if the transaction fails.
///
/// Calls are issued one at a time. Nothing guards against two runs for the
/// same user at once.
pub struct OnboardingOrchestrator {
    organizations: Arc<dyn OrganizationStore>,
    storage: Arc<dyn ObjectStorage>,
    procedure: Arc<dyn OnboardingProcedure>,
    settings: OnboardingSettings,
}

impl OnboardingOrchestrator {
    pub fn new(
        organizations: Arc<dyn OrganizationStore>,
        storage: Arc<dyn ObjectStorage>,
        procedure: Arc<dyn OnboardingProcedure>,
        settings: OnboardingSettings,
    ) -> Self {
        Self {
            organizations,
            storage,
            procedure,
            settings,
        }
    }

    /// Build an orchestrator over one backend implementing every port
    pub fn from_backend<B>(backend: Arc<B>, settings: OnboardingSettings) -> Self
    where
        B: OrganizationStore + ObjectStorage + OnboardingProcedure + 'static,
    {
        Self::new(backend.clone(), backend.clone(), backend, settings)
    }

    /// Run the whole onboarding sequence for `user_id`.
    ///
    /// Failures are returned inside the outcome, never raised; a panic in a
    /// backend call is caught here and reported as
    /// [`OnboardingError::Unexpected`] without any cleanup.
    pub async fn complete_onboarding(
        &self,
        user_id: UserId,
        data: OnboardingData,
    ) -> OnboardingOutcome {
        let correlation_id = generate_correlation_id();
        let span = create_onboarding_span(&user_id.to_string(), &correlation_id);

        async move {
            let mut progress = ProgressTracker::new();
            let run = AssertUnwindSafe(self.run_steps(user_id, &data, &mut progress))
                .catch_unwind()
                .await;

            match run {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let message = panic_message(&*panic);
                    error!(
                        stage = ?progress.stage(),
                        organization_id = ?progress.organization_id(),
                        %message,
                        "Onboarding aborted unexpectedly"
                    );
                    OnboardingOutcome::Failed {
                        error: OnboardingError::Unexpected { message },
                        stage: progress.stage(),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_steps(
        &self,
        user_id: UserId,
        data: &OnboardingData,
        progress: &mut ProgressTracker,
    ) -> OnboardingOutcome {
        if let Err(invalid) = data.validate() {
            warn!(error = %invalid, "Rejected onboarding request");
            progress.record(ProgressEvent::Aborted);
            return OnboardingOutcome::Failed {
                error: invalid.into(),
                stage: progress.stage(),
            };
        }

        // Step 1: nothing exists yet, so a failure here needs no cleanup
        let organization = match self.create_organization(&data.organization_name).await {
            Ok(organization) => organization,
            Err(error) => {
                error!(error = %error, "Organization creation failed");
                progress.record(ProgressEvent::Aborted);
                return OnboardingOutcome::Failed {
                    error,
                    stage: progress.stage(),
                };
            }
        };
        let organization_id = organization.id;
        tracing::Span::current()
            .record("organization.id", tracing::field::display(organization_id));
        info!(organization_id = %organization_id, "Organization created");
        progress.record(ProgressEvent::OrganizationCreated { organization_id });

        // Step 2: best effort
        let logo = match &data.logo {
            Some(file) => self.attach_logo(&organization_id, file).await,
            None => LogoOutcome::NotProvided,
        };
        match &logo {
            LogoOutcome::Attached { url } => {
                progress.record(ProgressEvent::LogoAttached { url: url.clone() })
            }
            LogoOutcome::NotProvided | LogoOutcome::Failed { .. } => {
                progress.record(ProgressEvent::LogoSkipped)
            }
        }

        // Step 3 with its compensation
        let transaction = OnboardingTransaction {
            user_id,
            organization_id,
            data_room_name: data.data_room_name.clone(),
            data_room_description: data.data_room_description.clone(),
            invitee_emails: data.team_invites.clone(),
        };
        let committed = with_compensation(
            self.procedure.complete_onboarding(&transaction),
            || self.rollback_organization(&organization),
        )
        .await;

        match committed {
            Ok(()) => {
                progress.record(ProgressEvent::Committed);
                info!(
                    organization_id = %organization_id,
                    invitations = transaction.invitee_emails.len(),
                    logo_url = progress.logo_url(),
                    "Onboarding completed"
                );
                OnboardingOutcome::Completed {
                    organization_id,
                    logo,
                }
            }
            Err(Compensated { cause, cleanup }) => {
                progress.record(ProgressEvent::RolledBack);
                let error = match cleanup {
                    CleanupOutcome::Succeeded => OnboardingError::Transaction {
                        organization_id,
                        source: cause,
                    },
                    CleanupOutcome::Failed(cleanup) => {
                        error!(
                            organization_id = %organization_id,
                            error = %cleanup,
                            "Organization left behind after failed onboarding"
                        );
                        OnboardingError::RollbackFailed {
                            organization_id,
                            source: cause,
                            cleanup,
                        }
                    }
                };
                OnboardingOutcome::Failed {
                    error,
                    stage: progress.stage(),
                }
            }
        }
    }

    async fn create_organization(&self, name: &str) -> Result<Organization, OnboardingError> {
        let request = NewOrganization {
            name: name.to_string(),
        };
        match self.organizations.create_organization(&request).await {
            Ok(Some(organization)) => Ok(organization),
            Ok(None) => Err(OnboardingError::OrganizationNotReturned),
            Err(source) => Err(OnboardingError::OrganizationCreation { source }),
        }
    }

    async fn attach_logo(&self, organization_id: &OrganizationId, file: &LogoFile) -> LogoOutcome {
        match self.upload_logo(organization_id, file).await {
            Ok(url) => {
                info!(organization_id = %organization_id, %url, "Logo attached");
                LogoOutcome::Attached { url }
            }
            Err(err) => {
                warn!(
                    organization_id = %organization_id,
                    error = %err,
                    "Logo upload failed, continuing without a logo"
                );
                LogoOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn upload_logo(
        &self,
        organization_id: &OrganizationId,
        file: &LogoFile,
    ) -> Result<String, BackendError> {
        let stored = self
            .storage
            .upload(ObjectUpload {
                bucket: self.settings.logo_bucket.clone(),
                path: format!("{}/{}", organization_id, self.settings.logo_object_name),
                content_type: file.content_type.clone(),
                bytes: file.bytes.clone(),
                upsert: true,
            })
            .await?;

        let url = self.storage.public_url(&stored);
        self.organizations.set_logo_url(organization_id, &url).await?;
        Ok(url)
    }

    async fn rollback_organization(&self, organization: &Organization) -> Result<(), BackendError> {
        warn!(
            organization_id = %organization.id,
            "Data room transaction failed, removing organization"
        );
        self.organizations.delete_organization(&organization.id).await
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "backend call panicked".to_string()
    }
}
