use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::export::{ExportError, Exporter};
use crate::fonts::FontSet;
use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};
use crate::share::{Channel, ConfiguredShare, StudioContact};
use crate::storage::{JsonFileRepository, STORE_FILE_NAME};
use crate::types::{StatusFilter, SubmissionStatus};

pub const DEFAULT_STUDIO_EMAIL: &str = "studio@example.com";
pub const DEFAULT_STUDIO_PHONE: &str = "15550100200";

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    /// Defaults to the questionnaire when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fill in the brand questionnaire
    Wizard,
    /// Review stored questionnaires
    Dashboard(DashboardArgs),
    /// Show the resolved configuration
    Config,
    /// Print version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct DashboardArgs {
    /// Run one action and exit instead of opening the interactive dashboard
    #[command(subcommand)]
    pub action: Option<DashboardAction>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DashboardAction {
    /// List questionnaires in stored order
    List {
        /// all, new, in-progress or completed
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Print one questionnaire
    Show { id: String },
    /// Change the review status of a questionnaire
    Status { id: String, status: SubmissionStatus },
    /// Delete a questionnaire
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Save a questionnaire as PDF
    Export {
        id: String,
        /// Target directory, defaults to the download directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Share a questionnaire PDF
    Share {
        id: String,
        #[arg(long, default_value = "whatsapp")]
        channel: Channel,
    },
}

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Submission store file
    #[arg(long, env = "INTAKE_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Where downloaded and fallback PDFs are written
    #[arg(long, env = "INTAKE_DOWNLOAD_DIR", global = true)]
    pub download_dir: Option<PathBuf>,

    /// Studio address used for email links
    #[arg(long, env = "INTAKE_STUDIO_EMAIL", default_value = DEFAULT_STUDIO_EMAIL, global = true)]
    pub studio_email: String,

    /// Studio WhatsApp number in international format
    #[arg(long, env = "INTAKE_STUDIO_PHONE", default_value = DEFAULT_STUDIO_PHONE, global = true)]
    pub studio_phone: String,

    /// External program that receives the PDF path for direct sharing
    #[arg(long, env = "INTAKE_SHARE_COMMAND", global = true)]
    pub share_command: Option<String>,

    /// Show the dashboard list and detail one at a time
    #[arg(long, env = "INTAKE_COMPACT", default_value_t = false, global = true)]
    pub compact: bool,

    /// TrueType font embedded in exported PDFs (defaults to a system font)
    #[arg(long, env = "INTAKE_PDF_FONT", global = true)]
    pub pdf_font: Option<PathBuf>,

    /// Bold companion of --pdf-font
    #[arg(long, env = "INTAKE_PDF_BOLD_FONT", requires = "pdf_font", global = true)]
    pub pdf_bold_font: Option<PathBuf>,

    /// Read the store but keep every change in memory
    #[arg(long, env = "INTAKE_DRY_RUN", default_value_t = false, global = true)]
    pub dry_run: bool,
}

impl Settings {
    #[cfg(test)]
    pub fn default_settings() -> Self {
        Self {
            store: None,
            download_dir: None,
            studio_email: DEFAULT_STUDIO_EMAIL.to_string(),
            studio_phone: DEFAULT_STUDIO_PHONE.to_string(),
            share_command: None,
            compact: false,
            pdf_font: None,
            pdf_bold_font: None,
            dry_run: false,
        }
    }

    /// Validate CLI/environment-derived settings.
    pub fn validate(&self) -> Result<(), String> {
        let email = self.studio_email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(format!("Invalid INTAKE_STUDIO_EMAIL '{}'", self.studio_email));
        }

        let phone = self.phone_digits();
        if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!(
                "Invalid INTAKE_STUDIO_PHONE '{}': expected digits in international format",
                self.studio_phone
            ));
        }

        if let Some(command) = &self.share_command {
            if command.trim().is_empty() {
                return Err("INTAKE_SHARE_COMMAND cannot be empty when set".to_string());
            }
        }
        Ok(())
    }

    fn phone_digits(&self) -> &str {
        let phone = self.studio_phone.trim();
        phone.strip_prefix('+').unwrap_or(phone)
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .clone()
            .or_else(JsonFileRepository::default_path)
            .unwrap_or_else(|| PathBuf::from(STORE_FILE_NAME))
    }

    pub fn download_path(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn contact(&self) -> StudioContact {
        StudioContact {
            phone: self.phone_digits().to_string(),
            email: self.studio_email.trim().to_string(),
        }
    }

    /// PDF exporter using the configured font, a discovered system font, or
    /// the standard faces when neither exists.
    pub fn exporter(&self) -> Result<Exporter, ExportError> {
        let fonts = match &self.pdf_font {
            Some(regular) => Some(FontSet::load(regular, self.pdf_bold_font.as_deref())?),
            None => FontSet::discover(),
        };
        if fonts.is_none() {
            tracing::warn!("no TrueType font found; PDF text outside Windows-1252 is replaced with '?'");
        }
        Ok(Exporter::pdf_with_fonts(fonts))
    }

    pub fn share_target(&self) -> ConfiguredShare {
        let staging = std::env::temp_dir().join(crate::metadata::DATA_DIR_NAME);
        ConfiguredShare::from_setting(self.share_command.as_deref(), staging)
    }
}
