//! The intake flow: steps, forms, and the summary actions.
//!
//! The wizard owns the in-progress record and the step cursor. All user
//! interaction goes through a [`Responder`], so the same flow runs against the
//! terminal prompts and against scripted answers.

use std::path::PathBuf;

use crate::error::ServiceResult;
use crate::export::Exporter;
use crate::forms::{Field, FieldValue, form_for};
use crate::share::{Channel, ShareReport, ShareTarget, StudioContact, download, share_or_fallback};
use crate::steps::{Step, StepKey, StepSequencer};
use crate::storage::SubmissionRepository;
use crate::summary::{self, SummaryDocument};
use crate::types::{QuestionnaireRecord, Submission, apply};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Back,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummaryAction {
    Share(Channel),
    Download,
    SaveToInbox,
    Back,
    Finish,
}

/// Source of answers and sink for output.
pub trait Responder {
    fn show(&mut self, text: &str);

    /// Ask for one field, pre-filled with its current value.
    fn answer(&mut self, field: Field, current: &FieldValue) -> ServiceResult<FieldValue>;

    fn navigate(&mut self, step: &Step, can_go_back: bool) -> ServiceResult<Navigation>;

    fn summary_action(&mut self, saved: bool) -> ServiceResult<SummaryAction>;
}

pub const WELCOME_TEXT: &str = "Let's build your winning brand.\n\n\
A logo is more than a pretty mark: it tells the world who you are, what you offer and to whom.\n\
To design one that fits you, your values and your clients, we first need to understand the basics together.\n\
No answer is required; skip anything you are unsure about.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WizardOutcome {
    pub record: QuestionnaireRecord,
    pub submission_id: Option<String>,
    pub saved_files: Vec<PathBuf>,
    pub shared: bool,
    pub completed: bool,
}

pub struct Wizard<'a, R, S> {
    record: QuestionnaireRecord,
    sequencer: StepSequencer,
    exporter: Exporter,
    repository: &'a R,
    share_target: &'a S,
    contact: StudioContact,
    download_dir: PathBuf,
}

impl<'a, R: SubmissionRepository, S: ShareTarget> Wizard<'a, R, S> {
    pub fn new(
        repository: &'a R,
        share_target: &'a S,
        contact: StudioContact,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            record: QuestionnaireRecord::default(),
            sequencer: StepSequencer::default(),
            exporter: Exporter::pdf(),
            repository,
            share_target,
            contact,
            download_dir,
        }
    }

    pub fn with_sequencer(mut self, sequencer: StepSequencer) -> Self {
        self.sequencer = sequencer;
        self
    }

    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    pub async fn run(mut self, responder: &mut impl Responder) -> ServiceResult<WizardOutcome> {
        let mut outcome = WizardOutcome::default();

        loop {
            let step = *self.sequencer.active();
            responder.show(&self.header());

            let navigation = match step.key {
                StepKey::Welcome => {
                    responder.show(WELCOME_TEXT);
                    responder.navigate(&step, false)?
                }
                StepKey::Summary => match self.summary_step(responder, &mut outcome).await? {
                    SummaryAction::Back => Navigation::Back,
                    _ => {
                        outcome.completed = true;
                        Navigation::Quit
                    }
                },
                key => {
                    self.fill_form(key, responder)?;
                    responder.navigate(&step, !self.sequencer.is_first())?
                }
            };

            match navigation {
                Navigation::Next => {
                    self.sequencer.advance();
                }
                Navigation::Back => {
                    self.sequencer.retreat();
                }
                Navigation::Quit => break,
            }
        }

        tracing::info!(
            completed = outcome.completed,
            saved = outcome.submission_id.is_some(),
            "intake session ended"
        );
        outcome.record = self.record;
        Ok(outcome)
    }

    fn header(&self) -> String {
        format!(
            "{}\nStep {} of {} [{:>3.0}%]",
            self.sequencer.progress_line(),
            self.sequencer.index() + 1,
            self.sequencer.len(),
            self.sequencer.completion_ratio() * 100.0
        )
    }

    fn fill_form(&mut self, key: StepKey, responder: &mut impl Responder) -> ServiceResult<()> {
        let Some(form) = form_for(key, &self.record) else {
            return Ok(());
        };
        responder.show(&format!("{}\n{}", form.title, form.subtitle));

        // The field list is re-derived after every answer so that toggling the
        // logo flag reveals or hides the details input right away.
        let mut position = 0;
        while let Some(field) = form_for(key, &self.record).and_then(|f| f.fields.get(position).copied()) {
            let current = field.read(&self.record);
            let value = responder.answer(field, &current)?;
            match field.patch(value) {
                Some(patch) => self.record = apply(std::mem::take(&mut self.record), patch),
                None => tracing::warn!(?field, "answer kind does not fit field, ignored"),
            }
            position += 1;
        }
        Ok(())
    }

    async fn summary_step(
        &mut self,
        responder: &mut impl Responder,
        outcome: &mut WizardOutcome,
    ) -> ServiceResult<SummaryAction> {
        let document = SummaryDocument::from_record(&self.record);
        responder.show("All done! Here is your brand profile, the first step to a winning brand.");
        responder.show(&document.terminal_text());

        loop {
            let action = responder.summary_action(outcome.submission_id.is_some())?;
            match action {
                SummaryAction::Back | SummaryAction::Finish => return Ok(action),
                SummaryAction::Share(channel) => self.share(channel, &document, responder, outcome).await,
                SummaryAction::Download => {
                    let Some(file) = self
                        .exporter
                        .export(&document, summary::export_file_name(&self.record))
                        .await
                    else {
                        responder.show("The PDF could not be generated.");
                        continue;
                    };
                    match download(&file, &self.download_dir) {
                        Ok(path) => {
                            responder.show(&format!("Saved {}", path.display()));
                            outcome.saved_files.push(path);
                        }
                        Err(err) => {
                            tracing::error!(error = %err, "download failed");
                            responder.show("The PDF could not be saved.");
                        }
                    }
                }
                SummaryAction::SaveToInbox => {
                    if let Some(id) = &outcome.submission_id {
                        responder.show(&format!("Already saved to the studio inbox ({id})."));
                        continue;
                    }
                    let submission = Submission::new(self.record.clone());
                    let id = submission.id.clone();
                    self.repository.insert(submission)?;
                    tracing::info!(%id, "submission stored");
                    responder.show(&format!("Saved to the studio inbox ({id})."));
                    outcome.submission_id = Some(id);
                }
            }
        }
    }

    async fn share(
        &self,
        channel: Channel,
        document: &SummaryDocument,
        responder: &mut impl Responder,
        outcome: &mut WizardOutcome,
    ) {
        let Some(file) = self
            .exporter
            .export(document, summary::export_file_name(&self.record))
            .await
        else {
            responder.show("The PDF could not be generated.");
            return;
        };

        let message = summary::share_message(&self.record);
        let report = share_or_fallback(
            self.share_target,
            &file,
            &message,
            channel,
            &self.contact,
            &self.download_dir,
        )
        .await;

        match report {
            ShareReport::Shared => {
                outcome.shared = true;
                responder.show("Sent. Thank you!");
            }
            ShareReport::ManualAttachment {
                link,
                saved_to,
                notice,
            } => {
                responder.show(&notice);
                responder.show(&format!("Open this link to continue: {link}"));
                outcome.saved_files.extend(saved_to);
            }
        }
    }
}
