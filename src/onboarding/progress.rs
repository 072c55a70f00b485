use statig::prelude::*;

use super::outcome::OnboardingStage;
use crate::models::OrganizationId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    OrganizationCreated { organization_id: OrganizationId },
    LogoAttached { url: String },
    LogoSkipped,
    Committed,
    RolledBack,
    Aborted,
}

/// Onboarding lifecycle:
/// `NotStarted → OrganizationCreated → (LogoAttached | LogoSkipped)`
/// `→ (Completed | RolledBack)`,
/// with `Failed` reachable only before an organization exists.
#[derive(Debug, Default)]
pub struct OnboardingProgress {
    stage: OnboardingStage,
    organization_id: Option<OrganizationId>,
    logo_url: Option<String>,
}

impl OnboardingProgress {
    fn enter(&mut self, stage: OnboardingStage) {
        tracing::debug!(from = ?self.stage, to = ?stage, "Onboarding stage changed");
        self.stage = stage;
    }

    fn ignore(&self, event: &ProgressEvent) {
        tracing::warn!(
            stage = ?self.stage,
            event = ?event,
            "Ignoring out of order onboarding event"
        );
    }
}

#[state_machine(initial = "State::not_started()")]
impl OnboardingProgress {
    #[state]
    fn not_started(&mut self, event: &ProgressEvent) -> Outcome<State> {
        match event {
            ProgressEvent::OrganizationCreated { organization_id } => {
                self.organization_id = Some(*organization_id);
                self.enter(OnboardingStage::OrganizationCreated);
                Transition(State::organization_created())
            }
            ProgressEvent::Aborted => {
                self.enter(OnboardingStage::Failed);
                Transition(State::failed())
            }
            _ => {
                self.ignore(event);
                Handled
            }
        }
    }

    #[state]
    fn organization_created(&mut self, event: &ProgressEvent) -> Outcome<State> {
        match event {
            ProgressEvent::LogoAttached { url } => {
                self.logo_url = Some(url.clone());
                self.enter(OnboardingStage::LogoAttached);
                Transition(State::logo_attached())
            }
            ProgressEvent::LogoSkipped => {
                self.enter(OnboardingStage::LogoSkipped);
                Transition(State::logo_skipped())
            }
            _ => {
                self.ignore(event);
                Handled
            }
        }
    }

    #[state]
    fn logo_attached(&mut self, event: &ProgressEvent) -> Outcome<State> {
        self.finish(event)
    }

    #[state]
    fn logo_skipped(&mut self, event: &ProgressEvent) -> Outcome<State> {
        self.finish(event)
    }

    #[state]
    fn completed(&mut self, event: &ProgressEvent) -> Outcome<State> {
        self.ignore(event);
        Handled
    }

    #[state]
    fn rolled_back(&mut self, event: &ProgressEvent) -> Outcome<State> {
        self.ignore(event);
        Handled
    }

    #[state]
    fn failed(&mut self, event: &ProgressEvent) -> Outcome<State> {
        self.ignore(event);
        Handled
    }
}

impl OnboardingProgress {
    fn finish(&mut self, event: &ProgressEvent) -> Outcome<State> {
        match event {
            ProgressEvent::Committed => {
                self.enter(OnboardingStage::Completed);
                Transition(State::completed())
            }
            ProgressEvent::RolledBack => {
                self.enter(OnboardingStage::RolledBack);
                Transition(State::rolled_back())
            }
            _ => {
                self.ignore(event);
                Handled
            }
        }
    }

    pub fn stage(&self) -> OnboardingStage {
        self.stage
    }

    pub fn organization_id(&self) -> Option<&OrganizationId> {
        self.organization_id.as_ref()
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }
}

/// Drives the lifecycle state machine for one onboarding run
pub struct ProgressTracker {
    machine: StateMachine<OnboardingProgress>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            machine: OnboardingProgress::default().state_machine(),
        }
    }

    pub fn record(&mut self, event: ProgressEvent) {
        self.machine.handle(&event);
    }

    pub fn stage(&self) -> OnboardingStage {
        self.machine.inner().stage()
    }

    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.machine.inner().organization_id().copied()
    }

    /// Public URL of the attached logo, once one was recorded
    pub fn logo_url(&self) -> Option<&str> {
        self.machine.inner().logo_url()
    }
}
