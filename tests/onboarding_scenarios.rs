//! End-to-end onboarding runs against the in-memory backend
//!
//! Each scenario drives the orchestrator through the public API and then
//! inspects the recorded backend calls and the resulting rows.

use std::sync::Arc;

use dataroom::backend::{BackendCall, BackendOperation, InMemoryBackend};
use dataroom::onboarding::{LogoFile, LogoOutcome, OnboardingError, OnboardingStage};
use dataroom::{
    DashboardService, InvitationStatus, OnboardingData, OnboardingOrchestrator, OnboardingOutcome,
    OnboardingSettings, UserId,
};

fn orchestrator(backend: &Arc<InMemoryBackend>) -> OnboardingOrchestrator {
    OnboardingOrchestrator::from_backend(backend.clone(), OnboardingSettings::default())
}

fn acme_request() -> OnboardingData {
    OnboardingData::new("Acme Inc", "Due Diligence").with_invites(["a@x.com", "b@y.com"])
}

fn png_logo() -> LogoFile {
    LogoFile {
        file_name: "acme.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

#[tokio::test]
async fn test_successful_onboarding_without_logo() {
    let backend = Arc::new(InMemoryBackend::new());
    let user_id = UserId::new();

    let outcome = orchestrator(&backend)
        .complete_onboarding(user_id, acme_request())
        .await;

    assert!(outcome.success());
    assert_eq!(outcome.stage(), OnboardingStage::Completed);
    assert_eq!(outcome.logo(), Some(&LogoOutcome::NotProvided));
    let organization_id = *outcome.organization_id().unwrap();

    let operations: Vec<_> = backend.calls().iter().map(|c| c.operation()).collect();
    assert_eq!(
        operations,
        vec![
            BackendOperation::CreateOrganization,
            BackendOperation::CompleteOnboarding,
        ]
    );

    let organizations = backend.organizations();
    assert_eq!(organizations.len(), 1);
    assert_eq!(organizations[0].name, "Acme Inc");
    assert_eq!(organizations[0].id, organization_id);
    assert!(organizations[0].logo_url.is_none());

    let rooms = backend.data_rooms();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].name, "Due Diligence");
    assert_eq!(rooms[0].created_by, user_id);

    let invitations = backend.invitations();
    let emails: Vec<_> = invitations.iter().map(|i| i.email.as_str()).collect();
    assert_eq!(emails, vec!["a@x.com", "b@y.com"]);
    assert!(invitations
        .iter()
        .all(|i| i.status == InvitationStatus::Pending && i.invited_by == user_id));

    let profile = backend.profile(&user_id).unwrap();
    assert!(profile.has_completed_onboarding());
    assert_eq!(profile.organization_id, Some(organization_id));
}

#[tokio::test]
async fn test_failed_organization_creation_touches_nothing_else() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.fail_on(BackendOperation::CreateOrganization);

    let outcome = orchestrator(&backend)
        .complete_onboarding(UserId::new(), acme_request().with_logo(png_logo()))
        .await;

    assert!(!outcome.success());
    assert_eq!(outcome.stage(), OnboardingStage::Failed);
    assert!(matches!(
        outcome.error(),
        Some(OnboardingError::OrganizationCreation { .. })
    ));

    assert_eq!(backend.calls().len(), 1);
    assert!(backend.calls_to(BackendOperation::Upload).is_empty());
    assert!(backend.calls_to(BackendOperation::CompleteOnboarding).is_empty());
    assert!(backend.calls_to(BackendOperation::DeleteOrganization).is_empty());
    assert!(backend.organizations().is_empty());
}

#[tokio::test]
async fn test_failed_transaction_removes_organization() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.fail_on(BackendOperation::CompleteOnboarding);
    let user_id = UserId::new();

    let outcome = orchestrator(&backend)
        .complete_onboarding(user_id, acme_request())
        .await;

    assert!(!outcome.success());
    assert_eq!(outcome.stage(), OnboardingStage::RolledBack);
    let Some(OnboardingError::Transaction {
        organization_id, ..
    }) = outcome.error()
    else {
        panic!("expected a transaction error, got {:?}", outcome);
    };

    let deletes = backend.calls_to(BackendOperation::DeleteOrganization);
    assert_eq!(
        deletes,
        vec![BackendCall::DeleteOrganization {
            id: *organization_id
        }]
    );
    assert!(backend.organizations().is_empty());
    assert!(backend.data_rooms().is_empty());
    assert!(backend.invitations().is_empty());
    assert!(backend.profile(&user_id).is_none());
}

#[tokio::test]
async fn test_failed_cleanup_reports_orphaned_organization() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.fail_on(BackendOperation::CompleteOnboarding);
    backend.fail_on(BackendOperation::DeleteOrganization);

    let outcome = orchestrator(&backend)
        .complete_onboarding(UserId::new(), acme_request())
        .await;

    let error = outcome.error().unwrap();
    assert!(matches!(error, OnboardingError::RollbackFailed { .. }));
    let orphan = *error.orphaned_organization().unwrap();
    assert_eq!(backend.organizations()[0].id, orphan);
    assert_eq!(backend.calls_to(BackendOperation::DeleteOrganization).len(), 1);
}

#[tokio::test]
async fn test_logo_is_uploaded_under_organization_folder() {
    let backend = Arc::new(InMemoryBackend::new());

    let outcome = orchestrator(&backend)
        .complete_onboarding(UserId::new(), acme_request().with_logo(png_logo()))
        .await;

    assert!(outcome.success());
    let organization_id = *outcome.organization_id().unwrap();
    let path = format!("{}/logo", organization_id);
    let expected_url = format!("memory://storage/organization-logos/{}", path);

    assert_eq!(
        outcome.logo(),
        Some(&LogoOutcome::Attached {
            url: expected_url.clone()
        })
    );
    assert_eq!(
        backend.object("organization-logos", &path),
        Some(png_logo().bytes)
    );
    assert_eq!(
        backend.organizations()[0].logo_url.as_deref(),
        Some(expected_url.as_str())
    );

    let operations: Vec<_> = backend.calls().iter().map(|c| c.operation()).collect();
    assert_eq!(
        operations,
        vec![
            BackendOperation::CreateOrganization,
            BackendOperation::Upload,
            BackendOperation::SetLogoUrl,
            BackendOperation::CompleteOnboarding,
        ]
    );
}

#[tokio::test]
async fn test_logo_failure_does_not_fail_onboarding() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.fail_on(BackendOperation::Upload);

    let outcome = orchestrator(&backend)
        .complete_onboarding(UserId::new(), acme_request().with_logo(png_logo()))
        .await;

    assert!(outcome.success());
    assert!(matches!(outcome.logo(), Some(LogoOutcome::Failed { .. })));
    assert!(backend.calls_to(BackendOperation::SetLogoUrl).is_empty());
    assert_eq!(backend.calls_to(BackendOperation::CompleteOnboarding).len(), 1);
    assert!(backend.organizations()[0].logo_url.is_none());
}

#[tokio::test]
async fn test_logo_url_update_failure_is_also_non_fatal() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.fail_on(BackendOperation::SetLogoUrl);

    let outcome = orchestrator(&backend)
        .complete_onboarding(UserId::new(), acme_request().with_logo(png_logo()))
        .await;

    assert!(outcome.success());
    assert!(matches!(outcome.logo(), Some(LogoOutcome::Failed { .. })));
    assert_eq!(backend.data_rooms().len(), 1);
}

#[tokio::test]
async fn test_withheld_organization_row_stops_the_run() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.withhold_created_rows(true);

    let outcome = orchestrator(&backend)
        .complete_onboarding(UserId::new(), acme_request())
        .await;

    assert!(matches!(
        outcome.error(),
        Some(OnboardingError::OrganizationNotReturned)
    ));
    assert_eq!(outcome.stage(), OnboardingStage::Failed);
    assert!(backend.calls_to(BackendOperation::CompleteOnboarding).is_empty());
}

#[tokio::test]
async fn test_invitations_preserve_order_for_many_invitees() {
    let backend = Arc::new(InMemoryBackend::new());
    let emails: Vec<String> = (0..25).map(|n| format!("member{n}@acme.io")).collect();

    let outcome = orchestrator(&backend)
        .complete_onboarding(
            UserId::new(),
            OnboardingData::new("Acme Inc", "Board").with_invites(emails.clone()),
        )
        .await;
    assert!(outcome.success());

    let Some(BackendCall::CompleteOnboarding(transaction)) = backend
        .calls_to(BackendOperation::CompleteOnboarding)
        .into_iter()
        .next()
    else {
        panic!("procedure was not called");
    };
    assert_eq!(transaction.invitee_emails, emails);

    let stored: Vec<String> = backend.invitations().into_iter().map(|i| i.email).collect();
    assert_eq!(stored, emails);
}

#[tokio::test]
async fn test_onboarding_without_invites_still_creates_room() {
    let backend = Arc::new(InMemoryBackend::new());

    let outcome = orchestrator(&backend)
        .complete_onboarding(
            UserId::new(),
            OnboardingData::new("Solo LLC", "Vault").with_description("Founder documents"),
        )
        .await;

    assert!(outcome.success());
    assert!(backend.invitations().is_empty());
    let rooms = backend.data_rooms();
    assert_eq!(rooms[0].description.as_deref(), Some("Founder documents"));
}

#[tokio::test]
async fn test_invalid_request_makes_no_backend_calls() {
    let backend = Arc::new(InMemoryBackend::new());

    let outcome = orchestrator(&backend)
        .complete_onboarding(
            UserId::new(),
            OnboardingData::new("  ", "Room").with_invites(["a@x.com"]),
        )
        .await;

    assert!(matches!(outcome.error(), Some(OnboardingError::InvalidRequest(_))));
    assert_eq!(outcome.stage(), OnboardingStage::Failed);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_unusual_invitees_reach_procedure_verbatim() {
    let backend = Arc::new(InMemoryBackend::new());
    let invitees = vec![
        "ops@localhost".to_string(),
        "bob".to_string(),
        " Carol@Example.COM ".to_string(),
        "ops@localhost".to_string(),
    ];

    let outcome = orchestrator(&backend)
        .complete_onboarding(
            UserId::new(),
            OnboardingData::new("Acme Inc", "Due Diligence").with_invites(invitees.clone()),
        )
        .await;

    assert!(outcome.success(), "onboarding failed: {:?}", outcome);
    let Some(BackendCall::CompleteOnboarding(transaction)) = backend
        .calls_to(BackendOperation::CompleteOnboarding)
        .into_iter()
        .next()
    else {
        panic!("procedure was not called");
    };
    assert_eq!(transaction.invitee_emails, invitees);

    let stored: Vec<String> = backend.invitations().into_iter().map(|i| i.email).collect();
    assert_eq!(stored, invitees);
}

#[tokio::test]
async fn test_dashboard_sees_completed_onboarding() {
    let backend = Arc::new(InMemoryBackend::new());
    let user_id = UserId::new();
    let dashboard = DashboardService::from_backend(backend.clone());

    assert!(dashboard.needs_onboarding(&user_id).await.unwrap());

    let outcome = orchestrator(&backend)
        .complete_onboarding(user_id, acme_request())
        .await;
    let organization_id = match outcome {
        OnboardingOutcome::Completed {
            organization_id, ..
        } => organization_id,
        OnboardingOutcome::Failed { error, .. } => panic!("onboarding failed: {error}"),
    };

    assert!(!dashboard.needs_onboarding(&user_id).await.unwrap());
    let overview = dashboard
        .organization_overview(&organization_id)
        .await
        .unwrap();
    assert_eq!(overview.organization.name, "Acme Inc");
    assert_eq!(overview.data_rooms.len(), 1);
    assert_eq!(overview.pending_invitations.len(), 2);
    assert_eq!(overview.invitation_count(), 2);
}
