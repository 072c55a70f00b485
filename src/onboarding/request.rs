//! Input of the onboarding wizard and its validation.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Image picked in the organization step
#[derive(Debug, Clone, PartialEq)]
pub struct LogoFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl LogoFile {
    /// Read a logo from disk, guessing its content type from the extension
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "logo".to_string());

        Ok(Self {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            bytes,
        })
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Everything the wizard collected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnboardingData {
    pub organization_name: String,
    pub logo: Option<LogoFile>,
    pub data_room_name: String,
    pub data_room_description: Option<String>,
    /// Invitee addresses, passed to the backend exactly as given
    pub team_invites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Organization name is required")]
    MissingOrganizationName,
    #[error("Data room name is required")]
    MissingDataRoomName,
    #[error("Invalid invitee email: {email}")]
    InvalidEmail { email: String },
}

fn email_pattern() -> Option<&'static Regex> {
    static EMAIL_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_some_and(|pattern| pattern.is_match(email))
}

impl OnboardingData {
    pub fn new(organization_name: impl Into<String>, data_room_name: impl Into<String>) -> Self {
        Self {
            organization_name: organization_name.into(),
            data_room_name: data_room_name.into(),
            ..Self::default()
        }
    }

    pub fn with_logo(mut self, logo: LogoFile) -> Self {
        self.logo = Some(logo);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.data_room_description = Some(description.into());
        self
    }

    pub fn with_invites<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.team_invites.extend(emails.into_iter().map(Into::into));
        self
    }

    /// Checks run before any remote call. Invitees are not inspected here;
    /// they reach the backend exactly as given.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.organization_name.trim().is_empty() {
            return Err(RequestError::MissingOrganizationName);
        }
        if self.data_room_name.trim().is_empty() {
            return Err(RequestError::MissingDataRoomName);
        }
        Ok(())
    }

    /// Form-side address check for callers that want early feedback
    pub fn check_invites(&self) -> Result<(), RequestError> {
        match self.team_invites.iter().find(|email| !is_valid_email(email)) {
            Some(email) => Err(RequestError::InvalidEmail {
                email: email.clone(),
            }),
            None => Ok(()),
        }
    }
}
