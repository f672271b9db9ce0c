//! Handing a generated brief to the studio.
//!
//! A native share target is tried first. When there is none, or the user backs
//! out, the caller gets a deep link for the chosen channel and a copy of the
//! file saved to disk so it can be attached by hand.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::export::ExportedFile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Unavailable,
    Cancelled,
}

/// Something that can take a file off our hands (a share sheet, a mail
/// client). Implementations report what happened instead of failing.
#[allow(async_fn_in_trait)]
pub trait ShareTarget {
    /// Capability check: whether this target accepts a file of this kind.
    fn can_share(&self, file: &ExportedFile) -> bool;

    async fn share(&self, file: &ExportedFile, title: &str, text: &str) -> ShareOutcome;

    async fn try_share(&self, file: &ExportedFile, title: &str, text: &str) -> ShareOutcome {
        if !self.can_share(file) {
            return ShareOutcome::Unavailable;
        }
        self.share(file, title, text).await
    }
}

/// No share capability at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoShare;

impl ShareTarget for NoShare {
    fn can_share(&self, _file: &ExportedFile) -> bool {
        false
    }

    async fn share(&self, _file: &ExportedFile, _title: &str, _text: &str) -> ShareOutcome {
        ShareOutcome::Unavailable
    }
}

/// Shares by running an external program with the PDF path as its last
/// argument. `INTAKE_SHARE_TITLE` and `INTAKE_SHARE_TEXT` are set in its
/// environment.
#[derive(Clone, Debug)]
pub struct CommandShare {
    program: String,
    args: Vec<String>,
    staging_dir: PathBuf,
}

impl CommandShare {
    /// Parse a whitespace separated command line such as `xdg-open` or
    /// `kdeconnect-cli --share`.
    pub fn parse(command_line: &str, staging_dir: PathBuf) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            staging_dir,
        })
    }
}

impl ShareTarget for CommandShare {
    fn can_share(&self, file: &ExportedFile) -> bool {
        file.file_name.to_ascii_lowercase().ends_with(".pdf")
    }

    async fn share(&self, file: &ExportedFile, title: &str, text: &str) -> ShareOutcome {
        let path = match stage_file(file, &self.staging_dir) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(error = %err, "could not stage file for sharing");
                return ShareOutcome::Unavailable;
            }
        };

        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(&path)
            .env("INTAKE_SHARE_TITLE", title)
            .env("INTAKE_SHARE_TEXT", text)
            .status()
            .await;

        match status {
            Ok(status) if status.success() => ShareOutcome::Shared,
            Ok(status) => {
                tracing::info!(program = %self.program, %status, "share dismissed");
                ShareOutcome::Cancelled
            }
            Err(err) => {
                tracing::warn!(program = %self.program, error = %err, "share command unavailable");
                ShareOutcome::Unavailable
            }
        }
    }
}

/// The share target picked from configuration.
#[derive(Clone, Debug)]
pub enum ConfiguredShare {
    Command(CommandShare),
    Disabled(NoShare),
}

impl ConfiguredShare {
    pub fn from_setting(command_line: Option<&str>, staging_dir: PathBuf) -> Self {
        command_line
            .and_then(|line| CommandShare::parse(line, staging_dir))
            .map(ConfiguredShare::Command)
            .unwrap_or(ConfiguredShare::Disabled(NoShare))
    }
}

impl ShareTarget for ConfiguredShare {
    fn can_share(&self, file: &ExportedFile) -> bool {
        match self {
            ConfiguredShare::Command(target) => target.can_share(file),
            ConfiguredShare::Disabled(target) => target.can_share(file),
        }
    }

    async fn share(&self, file: &ExportedFile, title: &str, text: &str) -> ShareOutcome {
        match self {
            ConfiguredShare::Command(target) => target.share(file, title, text).await,
            ConfiguredShare::Disabled(target) => target.share(file, title, text).await,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Channel {
    #[default]
    WhatsApp,
    Email,
}

impl Channel {
    pub fn label(&self) -> &'static str {
        match self {
            Channel::WhatsApp => "WhatsApp",
            Channel::Email => "Email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "whatsapp" | "wa" => Ok(Channel::WhatsApp),
            "email" | "mail" => Ok(Channel::Email),
            _ => Err(format!("Unknown share channel: {s}")),
        }
    }
}

/// Studio contact details used to build outbound links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudioContact {
    /// International number, digits only.
    pub phone: String,
    pub email: String,
}

pub fn whatsapp_link(phone: &str, text: &str) -> String {
    format!("https://wa.me/{phone}?text={}", urlencoding::encode(text))
}

pub fn mailto_link(address: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{address}?subject={}&body={}",
        urlencoding::encode(subject),
        urlencoding::encode(body)
    )
}

/// Message texts for one share attempt.
#[derive(Clone, Debug)]
pub struct ShareMessage {
    pub title: String,
    pub caption: String,
    pub email_subject: String,
    pub email_body: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareReport {
    Shared,
    ManualAttachment {
        link: String,
        saved_to: Option<PathBuf>,
        notice: String,
    },
}

/// Write `file` into `dir` under a name not already taken there, adding
/// ` (1)`, ` (2)` ... before the extension as needed.
pub fn save_file(file: &ExportedFile, dir: &Path) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let name = Path::new(&file.file_name);
    let stem = name.file_stem().and_then(|s| s.to_str()).unwrap_or("brief");
    let extension = name.extension().and_then(|s| s.to_str());

    let mut counter = 0usize;
    loop {
        let candidate = match (counter, extension) {
            (0, _) => file.file_name.clone(),
            (n, Some(ext)) => format!("{stem} ({n}).{ext}"),
            (n, None) => format!("{stem} ({n})"),
        };
        let path = dir.join(candidate);
        match std::fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut out) => {
                io::Write::write_all(&mut out, &file.bytes)?;
                return Ok(path);
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => counter += 1,
            Err(err) => return Err(err),
        }
    }
}

/// Scratch copy handed to a share program; replaced on every share.
fn stage_file(file: &ExportedFile, dir: &Path) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&file.file_name);
    std::fs::write(&path, &file.bytes)?;
    Ok(path)
}

/// Download-only action.
pub fn download(file: &ExportedFile, dir: &Path) -> io::Result<PathBuf> {
    let path = save_file(file, dir)?;
    tracing::debug!(path = %path.display(), "saved brief");
    Ok(path)
}

/// Try the share target; on anything but success fall back to a deep link for
/// `channel` plus a saved copy of the file.
pub async fn share_or_fallback<T: ShareTarget>(
    target: &T,
    file: &ExportedFile,
    message: &ShareMessage,
    channel: Channel,
    contact: &StudioContact,
    download_dir: &Path,
) -> ShareReport {
    let outcome = target.try_share(file, &message.title, &message.caption).await;
    if outcome == ShareOutcome::Shared {
        return ShareReport::Shared;
    }
    tracing::debug!(?outcome, %channel, "falling back to manual attachment");

    let (link, body_note) = match channel {
        Channel::WhatsApp => (
            whatsapp_link(
                &contact.phone,
                &format!(
                    "{}\n\nThe PDF was saved on this device; please attach it to this chat.",
                    message.caption
                ),
            ),
            "chat",
        ),
        Channel::Email => (
            mailto_link(
                &contact.email,
                &message.email_subject,
                &format!(
                    "{}\n(The PDF summary was saved on this device; please attach it.)\n",
                    message.email_body
                ),
            ),
            "email",
        ),
    };

    let saved_to = match download(file, download_dir) {
        Ok(path) => Some(path),
        Err(err) => {
            tracing::error!(error = %err, dir = %download_dir.display(), "could not save brief");
            None
        }
    };

    let notice = match &saved_to {
        Some(path) => format!(
            "Direct file sharing is not available. The PDF was saved to {}; attach it manually to the {body_note} that opens.",
            path.display()
        ),
        None => format!(
            "Direct file sharing is not available and the PDF could not be saved; use the download action and attach it to the {body_note} manually."
        ),
    };

    ShareReport::ManualAttachment {
        link,
        saved_to,
        notice,
    }
}
