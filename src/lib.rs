// Data room client library - onboarding orchestration and dashboard queries
// against the hosted backend

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod onboarding;
pub mod telemetry;

// Re-export key types for easy access
pub use backend::{BackendError, InMemoryBackend, RestBackend};
pub use config::DataRoomConfig;
pub use dashboard::{DashboardService, OrganizationOverview};
pub use models::{
    DataRoom, InvitationStatus, Organization, OrganizationId, TeamInvitation, UserId, UserProfile,
};
pub use onboarding::{
    LogoFile, LogoOutcome, OnboardingData, OnboardingError, OnboardingOrchestrator,
    OnboardingOutcome, OnboardingSettings, OnboardingStage,
};
pub use telemetry::{create_onboarding_span, generate_correlation_id, init_telemetry};
