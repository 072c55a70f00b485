use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use dataroom::backend::InMemoryBackend;
use dataroom::onboarding::{
    LogoFile, LogoOutcome, OnboardingData, OnboardingError, OnboardingOutcome,
};
use dataroom::{
    init_telemetry, DashboardService, DataRoomConfig, OnboardingOrchestrator, OnboardingSettings,
    OrganizationId, RestBackend, UserId,
};

#[derive(Parser)]
#[command(name = "dataroom")]
#[command(about = "Data room account setup and dashboard queries")]
#[command(long_about = "Drives the data room onboarding flow against the hosted backend: \
                       creates the organization, uploads its logo, and sets up the first data room \
                       with its team invitations in one transaction.")]
struct Cli {
    /// Configuration file to read instead of dataroom.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an organization, its first data room and team invitations
    Onboard {
        /// Authenticated user the data room is created for
        #[arg(long)]
        user_id: UserId,
        /// Organization name
        #[arg(long = "organization")]
        organization_name: String,
        /// Name of the first data room
        #[arg(long = "data-room")]
        data_room_name: String,
        /// Optional data room description
        #[arg(long)]
        description: Option<String>,
        /// Team member to invite (repeatable)
        #[arg(long = "invite")]
        invites: Vec<String>,
        /// Logo image to upload for the organization
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Run against an in-memory backend instead of the hosted one
        #[arg(long)]
        dry_run: bool,
    },
    /// Show a user's profile and whether they still need onboarding
    Status {
        #[arg(long)]
        user_id: UserId,
    },
    /// Print an organization with its data rooms and invitations as JSON
    Overview {
        #[arg(long)]
        organization_id: OrganizationId,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _ = DataRoomConfig::load_env_file();
    let config = match &cli.config {
        Some(path) => DataRoomConfig::load_from(path)?,
        None => DataRoomConfig::load()?,
    };
    init_telemetry(&config.observability)?;

    match cli.command {
        Commands::Onboard {
            user_id,
            organization_name,
            data_room_name,
            description,
            invites,
            logo,
            dry_run,
        } => {
            let mut data =
                OnboardingData::new(organization_name, data_room_name).with_invites(invites);
            data.data_room_description = description;
            // The backend takes invitees verbatim, so catch typos before it sees them
            data.check_invites()?;
            tokio::runtime::Runtime::new()?
                .block_on(onboard_command(&config, user_id, data, logo, dry_run))
        }
        Commands::Status { user_id } => {
            tokio::runtime::Runtime::new()?.block_on(status_command(&config, user_id))
        }
        Commands::Overview { organization_id } => {
            tokio::runtime::Runtime::new()?.block_on(overview_command(&config, organization_id))
        }
        Commands::Config => config_command(&config),
    }
}

async fn onboard_command(
    config: &DataRoomConfig,
    user_id: UserId,
    mut data: OnboardingData,
    logo: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    if let Some(path) = logo {
        data = data.with_logo(LogoFile::from_path(&path).await?);
    }

    println!("🏢 Setting up \"{}\" for user {}", data.organization_name, user_id);
    println!("   📁 Data room: {}", data.data_room_name);
    println!("   ✉️  Invitations: {}", data.team_invites.len());
    if dry_run {
        println!("   🧪 Dry run: using an in-memory backend");
    }
    println!();

    let settings = OnboardingSettings::from(&config.backend);
    let outcome = if dry_run {
        let backend = Arc::new(InMemoryBackend::new());
        let outcome = OnboardingOrchestrator::from_backend(backend.clone(), settings)
            .complete_onboarding(user_id, data)
            .await;
        println!("   🔁 Backend calls made: {}", backend.calls().len());
        outcome
    } else {
        let backend = Arc::new(RestBackend::new(&config.backend)?);
        OnboardingOrchestrator::from_backend(backend, settings)
            .complete_onboarding(user_id, data)
            .await
    };

    report_outcome(&outcome);
    if !outcome.success() {
        bail!("onboarding did not complete");
    }
    Ok(())
}

fn report_outcome(outcome: &OnboardingOutcome) {
    match outcome {
        OnboardingOutcome::Completed {
            organization_id,
            logo,
        } => {
            println!("✅ Onboarding complete");
            println!("   🆔 Organization: {}", organization_id);
            match logo {
                LogoOutcome::Attached { url } => println!("   🖼️  Logo: {}", url),
                LogoOutcome::NotProvided => println!("   🖼️  Logo: none"),
                LogoOutcome::Failed { reason } => {
                    println!("   ⚠️  Logo skipped: {}", reason);
                    println!("   💡 Upload it again later from the organization settings");
                }
            }
        }
        OnboardingOutcome::Failed { error, stage } => {
            println!("❌ Onboarding failed ({:?})", stage);
            println!("   {}", error);
            if let Some(organization_id) = error.orphaned_organization() {
                println!();
                println!("⚠️  Organization {} could not be removed", organization_id);
                println!("   💡 Delete it manually before retrying");
            } else if matches!(error, OnboardingError::Unexpected { .. })
                && stage.created_organization()
            {
                println!();
                println!("⚠️  An organization may have been created before the failure");
                println!("   💡 Check the organizations table before retrying");
            } else {
                println!("   💡 Nothing was left behind; it is safe to retry");
            }
        }
    }
}

async fn status_command(config: &DataRoomConfig, user_id: UserId) -> Result<()> {
    let service = DashboardService::from_backend(Arc::new(RestBackend::new(&config.backend)?));

    match service.profile(&user_id).await? {
        Some(profile) => {
            println!("👤 User {}", profile.id);
            if let Some(name) = &profile.full_name {
                println!("   📛 Name: {}", name);
            }
            match &profile.organization_id {
                Some(organization_id) => println!("   🏢 Organization: {}", organization_id),
                None => println!("   🏢 Organization: none"),
            }
            if profile.has_completed_onboarding() {
                println!("   ✅ Onboarded");
            } else {
                println!("   🚧 Onboarding pending");
                println!("   → Run: dataroom onboard --user-id {} ...", profile.id);
            }
        }
        None => {
            println!("👤 No profile found for {}", user_id);
            println!("   → Run: dataroom onboard --user-id {} ...", user_id);
        }
    }
    Ok(())
}

async fn overview_command(config: &DataRoomConfig, organization_id: OrganizationId) -> Result<()> {
    let service = DashboardService::from_backend(Arc::new(RestBackend::new(&config.backend)?));
    let overview = service.organization_overview(&organization_id).await?;
    println!("{}", serde_json::to_string_pretty(&overview)?);
    Ok(())
}

fn config_command(config: &DataRoomConfig) -> Result<()> {
    let mut shown = config.clone();
    if shown.backend.api_key.is_some() {
        shown.backend.api_key = Some("<redacted>".to_string());
    }
    if shown.backend.access_token.is_some() {
        shown.backend.access_token = Some("<redacted>".to_string());
    }
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}
