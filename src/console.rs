//! Interactive terminal front end built on `dialoguer` prompts.

use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::cli::{DashboardAction, Settings};
use crate::dashboard::{Dashboard, detail_document};
use crate::error::{ServiceError, ServiceResult};
use crate::export::Exporter;
use crate::forms::{Field, FieldValue, InputKind};
use crate::share::{Channel, ShareReport, ShareTarget, download, share_or_fallback};
use crate::steps::{Step, StepKey};
use crate::storage::{StorageError, SubmissionRepository};
use crate::summary;
use crate::types::{LogoFlag, StatusFilter, Submission, SubmissionStatus, Vibe};
use crate::wizard::{Navigation, Responder, SummaryAction};

pub fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
}

pub struct TerminalResponder {
    theme: ColorfulTheme,
}

impl TerminalResponder {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> ServiceResult<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()?)
    }
}

impl Default for TerminalResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl Responder for TerminalResponder {
    fn show(&mut self, text: &str) {
        println!("{text}\n");
    }

    fn answer(&mut self, field: Field, current: &FieldValue) -> ServiceResult<FieldValue> {
        if let Some(hint) = field.hint() {
            println!("{}", hint.dimmed());
        }
        let value = match (field.kind(), current) {
            (InputKind::VibeSlider, FieldValue::Vibe(vibe)) => {
                let labels: Vec<String> = Vibe::ALL
                    .iter()
                    .map(|v| format!("[{}] {}", v.position(), v.label()))
                    .collect();
                let position = self.select(field.label(), &labels, vibe.position() as usize)?;
                FieldValue::Vibe(Vibe::from_position(position as u8).unwrap_or_default())
            }
            (InputKind::YesNo, FieldValue::Logo(flag)) => {
                let yes = Confirm::with_theme(&self.theme)
                    .with_prompt(field.label())
                    .default(flag.is_yes())
                    .interact()?;
                FieldValue::Logo(LogoFlag::from(yes))
            }
            (_, FieldValue::Text(text)) => {
                let answer: String = Input::with_theme(&self.theme)
                    .with_prompt(field.label())
                    .with_initial_text(text.clone())
                    .allow_empty(true)
                    .interact_text()?;
                FieldValue::Text(answer)
            }
            (_, other) => other.clone(),
        };
        Ok(value)
    }

    fn navigate(&mut self, step: &Step, can_go_back: bool) -> ServiceResult<Navigation> {
        let mut options = vec![(
            if step.key == StepKey::Welcome { "Start the questionnaire" } else { "Next" },
            Navigation::Next,
        )];
        if can_go_back {
            options.push(("Back", Navigation::Back));
        }
        options.push(("Quit", Navigation::Quit));

        let labels: Vec<String> = options.iter().map(|(label, _)| label.to_string()).collect();
        let choice = self.select("Continue", &labels, 0)?;
        Ok(options[choice].1)
    }

    fn summary_action(&mut self, saved: bool) -> ServiceResult<SummaryAction> {
        let mut options = vec![
            ("Send to the studio on WhatsApp", SummaryAction::Share(Channel::WhatsApp)),
            ("Send to the studio by email", SummaryAction::Share(Channel::Email)),
            ("Download as PDF", SummaryAction::Download),
        ];
        if !saved {
            options.push(("Save to the studio inbox", SummaryAction::SaveToInbox));
        }
        options.extend([("Back", SummaryAction::Back), ("Finish", SummaryAction::Finish)]);

        let labels: Vec<String> = options.iter().map(|(label, _)| label.to_string()).collect();
        let choice = self.select("What next?", &labels, 0)?;
        Ok(options[choice].1)
    }
}

/// Status glyph, name and date, with the one-line description underneath.
fn list_entry(submission: &Submission, selected: bool) -> String {
    let line = format!(
        "{} {:<32} {}",
        submission.status.glyph(),
        submission.display_name(),
        submission.submitted_on()
    );
    let line = if selected { line.cyan().bold().to_string() } else { line };
    match submission.record.one_line_description.trim() {
        "" => line,
        description => format!("{line}\n    {}", description.dimmed()),
    }
}

pub fn print_list<R: SubmissionRepository>(dashboard: &Dashboard<'_, R>) {
    let visible = dashboard.visible();
    println!(
        "{}  {}",
        format!("Filter: {}", dashboard.filter().label()).bold(),
        format!("{} of {} questionnaires", visible.len(), dashboard.submissions().len()).dimmed()
    );
    if visible.is_empty() {
        println!("{}", "No questionnaires with this status.".dimmed());
    }
    let selected_id = dashboard.selected().map(|s| s.id.as_str());
    for submission in visible {
        println!("{}", list_entry(submission, selected_id == Some(submission.id.as_str())));
    }
    println!();
}

pub fn print_detail(submission: &Submission) {
    println!("{}", format!("id: {}", submission.id).dimmed());
    println!("{}", detail_document(submission).terminal_text());
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuAction {
    Open(usize),
    Filter,
    ChangeStatus,
    Export,
    Share(Channel),
    Delete,
    BackToList,
    Exit,
}

/// Interactive review loop. Returns when the user chooses to exit.
pub async fn run_dashboard<R: SubmissionRepository, S: ShareTarget>(
    repository: &R,
    share_target: &S,
    exporter: &Exporter,
    settings: &Settings,
) -> ServiceResult<()> {
    let theme = ColorfulTheme::default();
    let mut dashboard = Dashboard::load(repository, settings.compact)?;

    loop {
        clear_screen();
        println!("{}\n", "Studio dashboard".bold().cyan());
        if dashboard.shows_list() {
            print_list(&dashboard);
        }
        if dashboard.shows_detail() {
            if let Some(selected) = dashboard.selected() {
                print_detail(selected);
            }
        }

        let mut actions: Vec<(String, MenuAction)> = Vec::new();
        if dashboard.shows_list() {
            for (idx, submission) in dashboard.visible().iter().enumerate() {
                actions.push((format!("Open: {}", submission.display_name()), MenuAction::Open(idx)));
            }
            actions.push((String::from("Change filter"), MenuAction::Filter));
        }
        if dashboard.selected().is_some() {
            actions.extend([
                (String::from("Change status"), MenuAction::ChangeStatus),
                (String::from("Download as PDF"), MenuAction::Export),
                (String::from("Share on WhatsApp"), MenuAction::Share(Channel::WhatsApp)),
                (String::from("Share by email"), MenuAction::Share(Channel::Email)),
                (String::from("Delete questionnaire"), MenuAction::Delete),
                (String::from("Back to list"), MenuAction::BackToList),
            ]);
        }
        actions.push((String::from("Exit to questionnaire"), MenuAction::Exit));

        let labels: Vec<&str> = actions.iter().map(|(label, _)| label.as_str()).collect();
        let choice = Select::with_theme(&theme)
            .with_prompt("Action")
            .items(&labels)
            .default(0)
            .interact()?;

        match actions[choice].1 {
            MenuAction::Open(idx) => {
                if let Some(id) = dashboard.visible().get(idx).map(|s| s.id.clone()) {
                    dashboard.select(&id);
                }
            }
            MenuAction::Filter => {
                let labels: Vec<&str> = StatusFilter::ALL.iter().map(|f| f.label()).collect();
                let current = StatusFilter::ALL
                    .iter()
                    .position(|f| *f == dashboard.filter())
                    .unwrap_or(0);
                let picked = Select::with_theme(&theme)
                    .with_prompt("Show")
                    .items(&labels)
                    .default(current)
                    .interact()?;
                dashboard.set_filter(StatusFilter::ALL[picked]);
            }
            MenuAction::ChangeStatus => {
                let Some(selected) = dashboard.selected() else { continue };
                let id = selected.id.clone();
                let current = SubmissionStatus::ALL
                    .iter()
                    .position(|s| *s == selected.status)
                    .unwrap_or(0);
                let labels: Vec<&str> = SubmissionStatus::ALL.iter().map(|s| s.label()).collect();
                let picked = Select::with_theme(&theme)
                    .with_prompt("Status")
                    .items(&labels)
                    .default(current)
                    .interact()?;
                dashboard.update_status(&id, SubmissionStatus::ALL[picked])?;
            }
            MenuAction::Export => {
                match dashboard.export_selected(exporter).await {
                    Some(file) => match download(&file, &settings.download_path()) {
                        Ok(path) => println!("Saved {}", path.display()),
                        Err(err) => tracing::error!(error = %err, "download failed"),
                    },
                    None => println!("The PDF could not be generated."),
                }
                pause(&theme)?;
            }
            MenuAction::Share(channel) => {
                let Some(selected) = dashboard.selected() else { continue };
                match dashboard.export_selected(exporter).await {
                    Some(file) => {
                        let report = share_or_fallback(
                            share_target,
                            &file,
                            &summary::share_message(&selected.record),
                            channel,
                            &settings.contact(),
                            &settings.download_path(),
                        )
                        .await;
                        print_report(&report);
                    }
                    None => println!("The PDF could not be generated."),
                }
                pause(&theme)?;
            }
            MenuAction::Delete => {
                let Some(id) = dashboard.selected().map(|s| s.id.clone()) else { continue };
                dashboard.delete(&id, |submission| {
                    Confirm::with_theme(&theme)
                        .with_prompt(format!(
                            "Delete the questionnaire of {}? This cannot be undone.",
                            submission.display_name()
                        ))
                        .default(false)
                        .interact()
                        .unwrap_or(false)
                })?;
            }
            MenuAction::BackToList => dashboard.back_to_list(),
            MenuAction::Exit => return Ok(()),
        }
    }
}

/// One dashboard action without the interactive menu.
pub async fn run_dashboard_action<R: SubmissionRepository, S: ShareTarget>(
    action: DashboardAction,
    repository: &R,
    share_target: &S,
    exporter: &Exporter,
    settings: &Settings,
) -> ServiceResult<()> {
    let mut dashboard = Dashboard::load(repository, settings.compact)?;

    match action {
        DashboardAction::List { status } => {
            dashboard.set_filter(status);
            print_list(&dashboard);
        }
        DashboardAction::Show { id } => {
            let selected = select_or_missing(&mut dashboard, &id)?;
            print_detail(selected);
        }
        DashboardAction::Status { id, status } => {
            dashboard.update_status(&id, status)?;
            println!("{} is now {}", id, status.label());
        }
        DashboardAction::Delete { id, yes } => {
            let deleted = dashboard.delete(&id, |submission| {
                yes || Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!(
                        "Delete the questionnaire of {}? This cannot be undone.",
                        submission.display_name()
                    ))
                    .default(false)
                    .interact()
                    .unwrap_or(false)
            })?;
            if deleted {
                println!("Deleted {id}");
            } else {
                println!("Nothing deleted.");
            }
        }
        DashboardAction::Export { id, out } => {
            select_or_missing(&mut dashboard, &id)?;
            let file = dashboard
                .export_selected(exporter)
                .await
                .ok_or_else(|| ServiceError::Other("The PDF could not be generated.".into()))?;
            let dir = out.unwrap_or_else(|| settings.download_path());
            let path = download(&file, &dir)?;
            println!("Saved {}", path.display());
        }
        DashboardAction::Share { id, channel } => {
            let message = summary::share_message(&select_or_missing(&mut dashboard, &id)?.record);
            let file = dashboard
                .export_selected(exporter)
                .await
                .ok_or_else(|| ServiceError::Other("The PDF could not be generated.".into()))?;
            let report = share_or_fallback(
                share_target,
                &file,
                &message,
                channel,
                &settings.contact(),
                &settings.download_path(),
            )
            .await;
            print_report(&report);
        }
    }
    Ok(())
}

fn select_or_missing<'d, R: SubmissionRepository>(
    dashboard: &'d mut Dashboard<'_, R>,
    id: &str,
) -> ServiceResult<&'d Submission> {
    if !dashboard.select(id) {
        return Err(StorageError::SubmissionNotFound(id.to_string()).into());
    }
    dashboard
        .selected()
        .ok_or_else(|| StorageError::SubmissionNotFound(id.to_string()).into())
}

pub fn print_report(report: &ShareReport) {
    match report {
        ShareReport::Shared => println!("{}", "Shared.".green()),
        ShareReport::ManualAttachment { link, notice, .. } => {
            println!("{}", notice.yellow());
            println!("{link}");
        }
    }
}

fn pause(theme: &ColorfulTheme) -> ServiceResult<()> {
    Input::<String>::with_theme(theme)
        .with_prompt("Press enter to continue")
        .allow_empty(true)
        .interact_text()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuestionnaireRecord;

    fn entry(description: &str) -> Submission {
        Submission::new(QuestionnaireRecord {
            business_name: "Acme".into(),
            one_line_description: description.into(),
            ..Default::default()
        })
    }

    #[test]
    fn list_entry_shows_description_under_name() {
        colored::control::set_override(false);
        let text = list_entry(&entry("Hand-made widgets"), false);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Acme"));
        assert_eq!(lines[1].trim(), "Hand-made widgets");

        assert_eq!(list_entry(&entry("  "), true).lines().count(), 1);
    }
}
