//! Account setup: organization, optional logo, first data room and team
//! invitations, with the organization removed again if the data-room
//! transaction fails.

pub mod orchestrator;
pub mod outcome;
pub mod progress;
pub mod request;
pub mod saga;

pub use orchestrator::{OnboardingOrchestrator, OnboardingSettings};
pub use outcome::{LogoOutcome, OnboardingError, OnboardingOutcome, OnboardingStage};
pub use progress::{OnboardingProgress, ProgressEvent, ProgressTracker};
pub use request::{LogoFile, OnboardingData, RequestError};
pub use saga::{with_compensation, CleanupOutcome, Compensated};
