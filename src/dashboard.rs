//! Studio review dashboard state.
//!
//! Holds the loaded submissions, the active filter and selection. Every
//! mutation updates the in-memory collection first and then writes the whole
//! collection back through the repository.

use crate::error::ServiceResult;
use crate::export::{ExportedFile, Exporter};
use crate::storage::{StorageError, SubmissionRepository};
use crate::summary::{SummaryDocument, export_file_name};
use crate::types::{StatusFilter, Submission, SubmissionStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    List,
    Detail,
}

/// The printable detail panel for a submission.
pub fn detail_document(submission: &Submission) -> SummaryDocument {
    SummaryDocument::from_record(&submission.record).with_subtitle(format!(
        "Submitted {} | Status: {}",
        submission.submitted_on(),
        submission.status.label()
    ))
}

pub struct Dashboard<'a, R> {
    repository: &'a R,
    submissions: Vec<Submission>,
    filter: StatusFilter,
    selected: Option<Submission>,
    view: View,
    compact: bool,
}

impl<'a, R: SubmissionRepository> Dashboard<'a, R> {
    pub fn load(repository: &'a R, compact: bool) -> ServiceResult<Self> {
        let submissions = repository.load()?;
        tracing::debug!(count = submissions.len(), "loaded submissions");
        Ok(Self {
            repository,
            submissions,
            filter: StatusFilter::All,
            selected: None,
            view: View::List,
            compact,
        })
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    /// Submissions passing the filter, in stored order.
    pub fn visible(&self) -> Vec<&Submission> {
        self.submissions
            .iter()
            .filter(|s| self.filter.matches(s.status))
            .collect()
    }

    pub fn selected(&self) -> Option<&Submission> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, id: &str) -> bool {
        match self.submissions.iter().find(|s| s.id == id) {
            Some(found) => {
                self.selected = Some(found.clone());
                self.view = View::Detail;
                true
            }
            None => false,
        }
    }

    pub fn back_to_list(&mut self) {
        self.selected = None;
        self.view = View::List;
    }

    /// On a compact terminal the list and the detail panel replace each other;
    /// otherwise the list is always shown.
    pub fn shows_list(&self) -> bool {
        !self.compact || self.view == View::List
    }

    pub fn shows_detail(&self) -> bool {
        self.selected.is_some() && (!self.compact || self.view == View::Detail)
    }

    /// Persist a new status. The in-memory list is replaced by what the
    /// repository wrote, so a failed write leaves it untouched.
    pub fn update_status(&mut self, id: &str, status: SubmissionStatus) -> ServiceResult<()> {
        self.submissions = self.repository.upsert_status(id, status)?;

        if let Some(selected) = self.selected.as_mut().filter(|s| s.id == id) {
            selected.status = status;
        }
        tracing::info!(%id, %status, "status updated");
        Ok(())
    }

    /// Remove a submission after `confirm` agrees. Returns whether anything
    /// was deleted.
    pub fn delete(&mut self, id: &str, confirm: impl FnOnce(&Submission) -> bool) -> ServiceResult<bool> {
        let Some(target) = self.submissions.iter().find(|s| s.id == id) else {
            return Err(StorageError::SubmissionNotFound(id.to_string()).into());
        };
        if !confirm(target) {
            return Ok(false);
        }

        self.submissions = self.repository.delete(id)?;
        if self.selected.as_ref().is_some_and(|s| s.id == id) {
            self.back_to_list();
        }
        tracing::info!(%id, "submission deleted");
        Ok(true)
    }

    pub async fn export_selected(&self, exporter: &Exporter) -> Option<ExportedFile> {
        let selected = self.selected.as_ref()?;
        exporter
            .export(
                &detail_document(selected),
                export_file_name(&selected.record),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRepository;
    use crate::types::QuestionnaireRecord;

    fn sample(statuses: &[SubmissionStatus]) -> Vec<Submission> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Submission {
                id: format!("sub-{i}"),
                submitted_at: "2024-05-01T09:30:00Z".into(),
                status: *status,
                record: QuestionnaireRecord {
                    business_name: format!("Business {i}"),
                    ..Default::default()
                },
            })
            .collect()
    }

    fn five() -> Vec<Submission> {
        use SubmissionStatus::*;
        sample(&[New, Completed, InProgress, Completed, New])
    }

    #[test]
    fn completed_filter_keeps_order() {
        let repo = MemoryRepository::with_submissions(five());
        let mut dashboard = Dashboard::load(&repo, false).unwrap();
        assert_eq!(dashboard.visible().len(), 5);

        dashboard.set_filter(StatusFilter::Only(SubmissionStatus::Completed));
        let ids: Vec<_> = dashboard.visible().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["sub-1", "sub-3"]);
    }

    #[test]
    fn empty_store_gives_empty_dashboard() {
        let repo = MemoryRepository::default();
        let dashboard = Dashboard::load(&repo, false).unwrap();
        assert!(dashboard.visible().is_empty());
        assert!(dashboard.selected().is_none());
    }

    #[test]
    fn status_change_is_persisted_and_reflected() {
        let repo = MemoryRepository::with_submissions(five());
        let mut dashboard = Dashboard::load(&repo, false).unwrap();
        assert!(dashboard.select("sub-0"));

        dashboard.update_status("sub-0", SubmissionStatus::InProgress).unwrap();
        assert_eq!(dashboard.selected().unwrap().status, SubmissionStatus::InProgress);
        assert_eq!(repo.load().unwrap()[0].status, SubmissionStatus::InProgress);

        dashboard.update_status("sub-4", SubmissionStatus::Completed).unwrap();
        assert_eq!(dashboard.selected().unwrap().id, "sub-0");
        assert_eq!(dashboard.selected().unwrap().status, SubmissionStatus::InProgress);
        assert_eq!(repo.load().unwrap()[4].status, SubmissionStatus::Completed);

        assert!(dashboard.update_status("nope", SubmissionStatus::New).is_err());
    }

    #[test]
    fn deleting_selected_clears_detail() {
        let repo = MemoryRepository::with_submissions(five());
        let mut dashboard = Dashboard::load(&repo, true).unwrap();
        dashboard.select("sub-2");

        assert!(dashboard.delete("sub-2", |_| true).unwrap());
        assert!(dashboard.selected().is_none());
        assert!(dashboard.shows_list());
        let stored = repo.load().unwrap();
        assert_eq!(stored.len(), 4);
        assert!(stored.iter().all(|s| s.id != "sub-2"));
    }

    #[test]
    fn deleting_other_entry_keeps_detail() {
        let repo = MemoryRepository::with_submissions(five());
        let mut dashboard = Dashboard::load(&repo, false).unwrap();
        dashboard.select("sub-1");

        assert!(dashboard.delete("sub-4", |_| true).unwrap());
        assert_eq!(dashboard.selected().unwrap().id, "sub-1");
        assert_eq!(dashboard.submissions().len(), 4);
    }

    #[test]
    fn declined_confirmation_changes_nothing() {
        let repo = MemoryRepository::with_submissions(five());
        let mut dashboard = Dashboard::load(&repo, false).unwrap();
        let mut asked_about = None;

        let deleted = dashboard
            .delete("sub-3", |s| {
                asked_about = Some(s.record.business_name.clone());
                false
            })
            .unwrap();

        assert!(!deleted);
        assert_eq!(asked_about.as_deref(), Some("Business 3"));
        assert_eq!(repo.load().unwrap().len(), 5);
        assert!(dashboard.delete("missing", |_| true).is_err());
    }

    #[test]
    fn compact_view_switches_between_list_and_detail() {
        let repo = MemoryRepository::with_submissions(five());
        let mut compact = Dashboard::load(&repo, true).unwrap();
        assert!(compact.shows_list() && !compact.shows_detail());
        compact.select("sub-0");
        assert!(!compact.shows_list() && compact.shows_detail());
        compact.back_to_list();
        assert!(compact.shows_list() && !compact.shows_detail());

        let mut wide = Dashboard::load(&repo, false).unwrap();
        wide.select("sub-0");
        assert!(wide.shows_list() && wide.shows_detail());
        assert!(!wide.select("missing"));
    }

    /// Reads like a normal store but refuses every write.
    struct ReadOnly(MemoryRepository);

    impl SubmissionRepository for ReadOnly {
        fn load(&self) -> Result<Vec<Submission>, StorageError> {
            self.0.load()
        }

        fn save(&self, _submissions: &[Submission]) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn failed_write_keeps_memory_and_store_in_step() {
        let repo = ReadOnly(MemoryRepository::with_submissions(five()));
        let mut dashboard = Dashboard::load(&repo, false).unwrap();
        dashboard.select("sub-0");

        assert!(dashboard.update_status("sub-0", SubmissionStatus::Completed).is_err());
        assert_eq!(dashboard.submissions()[0].status, SubmissionStatus::New);
        assert_eq!(dashboard.selected().unwrap().status, SubmissionStatus::New);

        assert!(dashboard.delete("sub-0", |_| true).is_err());
        assert_eq!(dashboard.submissions().len(), 5);
        assert_eq!(dashboard.selected().unwrap().id, "sub-0");
        assert_eq!(dashboard.submissions(), repo.load().unwrap().as_slice());
    }

    #[test]
    fn mutations_mirror_the_store() {
        let repo = MemoryRepository::with_submissions(five());
        let mut dashboard = Dashboard::load(&repo, false).unwrap();
        dashboard.update_status("sub-2", SubmissionStatus::Completed).unwrap();
        dashboard.delete("sub-1", |_| true).unwrap();
        assert_eq!(dashboard.submissions(), repo.load().unwrap().as_slice());
    }

    #[tokio::test]
    async fn export_uses_selected_business_name() {
        let repo = MemoryRepository::with_submissions(five());
        let mut dashboard = Dashboard::load(&repo, false).unwrap();
        let exporter = Exporter::pdf();
        assert!(dashboard.export_selected(&exporter).await.is_none());

        dashboard.select("sub-3");
        let file = dashboard.export_selected(&exporter).await.unwrap();
        assert_eq!(file.file_name, "brand-brief-Business 3.pdf");
        assert!(String::from_utf8_lossy(&file.bytes).contains("Status: Completed"));
    }
}
