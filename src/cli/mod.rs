//! # Command Line Interface
//!
//! `provision` issues a robot client certificate into the output directory,
//! `issue` runs the certificate request handler on a JSON event and
//! `acl-bootstrap` bootstraps the scheduler's ACL system.

pub mod acl;
pub mod issue;
pub mod provision;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::config::{load_dotenv, IssuanceSettings};
use crate::observability::{init_logging, LoggingConfig};

#[derive(Parser, Debug)]
#[command(name = "pki-bootstrap")]
#[command(about = "Private CA certificate issuance and scheduler ACL bootstrap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "PKI_BOOTSTRAP_LOG_JSON")]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Issue a robot client certificate and write it to the output directory
    Provision {
        /// Identity label, used as common name and file stem
        label: String,

        /// Named AWS credential profile
        profile: String,

        /// ARN of the private certificate authority
        authority: String,

        /// AWS region of the authority
        region: String,

        /// Certificate validity in years
        #[arg(long)]
        validity_years: Option<u32>,

        #[command(flatten)]
        issuance: IssuanceArgs,
    },

    /// Issue a certificate for a JSON request event and print the result
    Issue {
        /// Event file, or `-` for stdin
        #[arg(long, default_value = "-")]
        event: String,

        /// Also store the material in the secret store
        #[arg(long)]
        persist: bool,

        #[command(flatten)]
        aws: AwsArgs,

        #[command(flatten)]
        issuance: IssuanceArgs,
    },

    /// Bootstrap scheduler ACLs and register the OIDC login flow
    AclBootstrap {
        #[command(flatten)]
        aws: AwsArgs,
    },
}

/// Overrides for `PKI_BOOTSTRAP_*` issuance settings.
#[derive(Args, Debug, Default, Clone)]
pub struct IssuanceArgs {
    /// Directory for generated key and certificate files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Seconds between certificate status checks
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Maximum number of certificate status checks
    #[arg(long)]
    pub max_poll_attempts: Option<u32>,

    /// Give up polling after this many seconds
    #[arg(long)]
    pub poll_deadline: Option<u64>,

    /// Add localhost and 127.0.0.1 to the subject alternative names
    #[arg(long)]
    pub loopback_sans: bool,
}

impl IssuanceArgs {
    /// Environment settings with these flags applied on top.
    pub fn settings(&self) -> crate::Result<IssuanceSettings> {
        let mut settings = IssuanceSettings::from_env()?;
        self.apply(&mut settings);
        settings.validate()?;
        Ok(settings)
    }

    fn apply(&self, settings: &mut IssuanceSettings) {
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(interval) = self.poll_interval {
            settings.poll_interval_seconds = interval;
        }
        if let Some(attempts) = self.max_poll_attempts {
            settings.max_poll_attempts = attempts;
        }
        if self.poll_deadline.is_some() {
            settings.poll_deadline_seconds = self.poll_deadline;
        }
        if self.loopback_sans {
            settings.loopback_sans = true;
        }
    }
}

/// AWS session selection for commands that talk to AWS services.
#[derive(Args, Debug, Default, Clone)]
pub struct AwsArgs {
    /// Named AWS credential profile
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    init_logging(LoggingConfig { verbose: cli.verbose, json: cli.log_json });

    let cancel = cancel_on_ctrl_c();

    match cli.command {
        Commands::Provision { label, profile, authority, region, validity_years, issuance } => {
            let mut settings = issuance.settings()?;
            if let Some(years) = validity_years {
                settings.robot_validity_years = years;
                settings.validate()?;
            }
            provision::handle_provision(&label, &profile, &authority, &region, &settings, &cancel)
                .await?
        }
        Commands::Issue { event, persist, aws, issuance } => {
            let settings = issuance.settings()?;
            issue::handle_issue(&event, persist, &aws, &settings, &cancel).await?
        }
        Commands::AclBootstrap { aws } => acl::handle_acl_bootstrap(&aws).await?,
    }

    Ok(())
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            token.cancel();
        }
    });
    cancel
}
