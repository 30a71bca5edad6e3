//! Export orchestration: encode, persist and hand off one export job.
//!
//! The job status is published on a `watch` channel. Every run that enters
//! `Running` leaves it exactly once, whatever the outcome.

use chrono::{NaiveDate, Utc};
use tokio::sync::watch;

use crate::domain::{
    ContactRecord, ExportFormat, ExportJob, ExportOutcome, FileSink, JobStatus, Location, Result,
    ShareSink,
};

use super::busy::BusyFlag;
use super::encoder::encode;

/// File name for an export produced on `date`: `contacts_YYYY-MM-DD.<ext>`.
#[must_use]
pub fn export_filename(format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "contacts_{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Runs export jobs against a file sink and an optional share target.
pub struct Exporter<F, S> {
    files: F,
    share: S,
    downloading: BusyFlag,
    status: watch::Sender<JobStatus>,
    today: fn() -> NaiveDate,
}

impl<F: FileSink, S: ShareSink> Exporter<F, S> {
    #[must_use]
    pub fn new(files: F, share: S) -> Self {
        let (status, _) = watch::channel(JobStatus::Idle);
        Self {
            files,
            share,
            downloading: BusyFlag::new(),
            status,
            today: utc_today,
        }
    }

    /// Overrides the date used in generated file names.
    #[cfg(test)]
    #[must_use]
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Observes job status changes.
    #[cfg(test)]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.status.subscribe()
    }

    /// Current job status.
    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status.borrow().clone()
    }

    /// Flag held while an export is in flight.
    #[cfg(test)]
    #[must_use]
    pub const fn downloading(&self) -> &BusyFlag {
        &self.downloading
    }

    /// Encodes `contacts`, writes the file and offers it to the share target.
    ///
    /// Never returns an error: failures become `ExportOutcome::Failed`. A
    /// run started while another is in flight is rejected with
    /// `ExportOutcome::Busy`.
    pub async fn run_export(
        &self,
        format: ExportFormat,
        contacts: &[ContactRecord],
    ) -> ExportOutcome {
        let Some(_guard) = self.downloading.try_acquire() else {
            tracing::warn!("Export already running, request rejected");
            return ExportOutcome::Busy;
        };

        if contacts.is_empty() {
            return ExportOutcome::NoContacts;
        }

        let mut running = RunningJob::start(
            ExportJob::new(format, contacts.to_vec()),
            &self.status,
        );

        let filename = export_filename(format, (self.today)());
        running.job.produced_filename = Some(filename.clone());

        match self.persist(&running.job, &filename).await {
            Ok((location, shared)) => {
                let contact_count = running.job.source_contacts.len();
                tracing::info!(
                    file = %filename,
                    contacts = contact_count,
                    shared,
                    "Export completed"
                );
                running.publish(JobStatus::Succeeded {
                    filename: filename.clone(),
                    contact_count,
                });
                ExportOutcome::Exported {
                    filename,
                    location,
                    contact_count,
                    shared,
                }
            }
            Err(e) => {
                tracing::error!("Error exporting contacts: {}", e);
                let message = format!("Failed to export contacts to {}: {e}", format.label());
                running.publish(JobStatus::Failed {
                    message: message.clone(),
                });
                ExportOutcome::Failed { message }
            }
        }
    }

    /// Writes the encoded job and shares it when a target is available.
    ///
    /// A share failure after a successful write falls back to reporting
    /// the on-disk location.
    async fn persist(&self, job: &ExportJob, filename: &str) -> Result<(Location, bool)> {
        let content = encode(job.format, &job.source_contacts);
        let mime_type = job.format.mime_type();

        let location = self.files.write(filename, &content, mime_type).await?;
        tracing::debug!(location = %location, bytes = content.len(), "Export written");

        if !self.share.is_available().await {
            tracing::info!("Sharing unavailable, reporting file location only");
            return Ok((location, false));
        }

        match self
            .share
            .share(&location, mime_type, job.format.dialog_title())
            .await
        {
            Ok(()) => Ok((location, true)),
            Err(e) => {
                tracing::warn!("Share failed, file kept at {}: {}", location, e);
                Ok((location, false))
            }
        }
    }
}

/// A job that has entered `Running`.
///
/// Dropping it before a terminal status was published (a panicking
/// collaborator, a cancelled future) publishes `Failed`.
struct RunningJob<'a> {
    job: ExportJob,
    status: &'a watch::Sender<JobStatus>,
}

impl<'a> RunningJob<'a> {
    fn start(job: ExportJob, status: &'a watch::Sender<JobStatus>) -> Self {
        let mut running = Self { job, status };
        running.publish(JobStatus::Running);
        running
    }

    fn publish(&mut self, status: JobStatus) {
        self.job.status = status.clone();
        self.status.send_replace(status);
    }
}

impl Drop for RunningJob<'_> {
    fn drop(&mut self) {
        if self.job.status.is_terminal() {
            return;
        }

        let message = match self.job.produced_filename {
            Some(ref name) => format!("Export of {name} was interrupted"),
            None => format!("Export to {} was interrupted", self.job.format.label()),
        };
        tracing::error!("{}", message);
        self.publish(JobStatus::Failed { message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::encoder::{encode_csv, encode_vcf};
    use crate::application::fakes::{contact, FakeShare, MemorySink, SinkFailure};

    fn fixed_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn exporter(files: MemorySink, share: FakeShare) -> Exporter<MemorySink, FakeShare> {
        Exporter::new(files, share).with_clock(fixed_day)
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename(ExportFormat::Csv, fixed_day()),
            "contacts_2024-03-09.csv"
        );
        assert_eq!(
            export_filename(ExportFormat::Vcf, fixed_day()),
            "contacts_2024-03-09.vcf"
        );
    }

    #[tokio::test]
    async fn test_csv_export_shares_file() {
        let files = MemorySink::default();
        let share = FakeShare::available();
        let exporter = exporter(files.clone(), share.clone());
        let contacts = vec![contact("Ada", "Lovelace"), contact("Bob", "Builder")];

        let outcome = exporter.run_export(ExportFormat::Csv, &contacts).await;

        assert_eq!(
            outcome,
            ExportOutcome::Exported {
                filename: "contacts_2024-03-09.csv".into(),
                location: Location("/exports/contacts_2024-03-09.csv".into()),
                contact_count: 2,
                shared: true,
            }
        );
        let written = files.written();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].1, encode_csv(&contacts));
        assert_eq!(written[0].2, "text/csv");

        let shares = share.shares();
        assert_eq!(shares[0].1, "text/csv");
        assert_eq!(shares[0].2, "Save Contacts CSV");

        assert_eq!(
            exporter.status(),
            JobStatus::Succeeded {
                filename: "contacts_2024-03-09.csv".into(),
                contact_count: 2,
            }
        );
        assert!(!exporter.downloading().is_busy());
    }

    #[tokio::test]
    async fn test_vcf_export_without_share_target() {
        let files = MemorySink::default();
        let exporter = exporter(files.clone(), FakeShare::unavailable());
        let contacts = vec![contact("Ada", "Lovelace")];

        let outcome = exporter.run_export(ExportFormat::Vcf, &contacts).await;

        assert!(matches!(
            outcome,
            ExportOutcome::Exported { shared: false, ref filename, .. }
                if filename == "contacts_2024-03-09.vcf"
        ));
        assert_eq!(files.written()[0].1, encode_vcf(&contacts));
        assert_eq!(files.written()[0].2, "text/x-vcard");
    }

    #[tokio::test]
    async fn test_share_failure_falls_back_to_location() {
        let mut share = FakeShare::available();
        share.fail = true;
        let exporter = exporter(MemorySink::default(), share);

        let outcome = exporter
            .run_export(ExportFormat::Csv, &[contact("Ada", "Lovelace")])
            .await;

        assert!(matches!(
            outcome,
            ExportOutcome::Exported { shared: false, .. }
        ));
        assert!(matches!(exporter.status(), JobStatus::Succeeded { .. }));
    }

    #[tokio::test]
    async fn test_write_failure_marks_job_failed() {
        let exporter = exporter(
            MemorySink::failing(SinkFailure::Write),
            FakeShare::available(),
        );

        let outcome = exporter
            .run_export(ExportFormat::Csv, &[contact("Ada", "Lovelace")])
            .await;

        let ExportOutcome::Failed { message } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(message.starts_with("Failed to export contacts to CSV"));
        assert!(matches!(exporter.status(), JobStatus::Failed { .. }));
        assert!(!exporter.downloading().is_busy());
    }

    #[tokio::test]
    async fn test_directory_refusal_is_failure() {
        let share = FakeShare::available();
        let exporter = exporter(MemorySink::failing(SinkFailure::Directory), share.clone());

        let outcome = exporter
            .run_export(ExportFormat::Vcf, &[contact("Ada", "Lovelace")])
            .await;

        assert!(outcome.is_failure());
        assert!(share.shares().is_empty());
    }

    #[tokio::test]
    async fn test_empty_contacts_is_no_data() {
        let files = MemorySink::default();
        let exporter = exporter(files.clone(), FakeShare::available());

        let outcome = exporter.run_export(ExportFormat::Csv, &[]).await;

        assert_eq!(outcome, ExportOutcome::NoContacts);
        assert!(files.written().is_empty());
        assert_eq!(exporter.status(), JobStatus::Idle);
    }

    #[tokio::test]
    async fn test_concurrent_export_is_rejected() {
        let files = MemorySink::default();
        let exporter = exporter(files.clone(), FakeShare::available());

        let _held = exporter.downloading().try_acquire().unwrap();
        let outcome = exporter
            .run_export(ExportFormat::Csv, &[contact("Ada", "Lovelace")])
            .await;

        assert_eq!(outcome, ExportOutcome::Busy);
        assert!(files.written().is_empty());
    }

    /// File sink whose write panics or never completes.
    struct BrokenSink {
        hang: bool,
    }

    #[async_trait::async_trait]
    impl FileSink for BrokenSink {
        async fn write(&self, _filename: &str, _content: &str, _mime: &str) -> Result<Location> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            panic!("storage driver crashed");
        }
    }

    #[tokio::test]
    async fn test_panicking_sink_leaves_job_failed() {
        let exporter = std::sync::Arc::new(
            Exporter::new(BrokenSink { hang: false }, FakeShare::available())
                .with_clock(fixed_day),
        );

        let task = {
            let exporter = std::sync::Arc::clone(&exporter);
            tokio::spawn(async move {
                exporter
                    .run_export(ExportFormat::Csv, &[contact("Ada", "Lovelace")])
                    .await
            })
        };

        let err = task.await.unwrap_err();
        assert!(err.is_panic());
        assert_eq!(
            exporter.status(),
            JobStatus::Failed {
                message: "Export of contacts_2024-03-09.csv was interrupted".into(),
            }
        );
        assert!(!exporter.downloading().is_busy());
    }

    #[tokio::test]
    async fn test_dropped_run_leaves_job_failed() {
        let exporter = Exporter::new(BrokenSink { hang: true }, FakeShare::available())
            .with_clock(fixed_day);
        let contacts = vec![contact("Ada", "Lovelace")];

        tokio::select! {
            biased;
            _ = exporter.run_export(ExportFormat::Vcf, &contacts) => panic!("write never completes"),
            () = std::future::ready(()) => {}
        }

        assert!(matches!(exporter.status(), JobStatus::Failed { .. }));
        assert!(!exporter.downloading().is_busy());
    }

    #[tokio::test]
    async fn test_status_passes_through_running() {
        let exporter = exporter(MemorySink::default(), FakeShare::unavailable());
        let mut rx = exporter.subscribe();
        assert_eq!(*rx.borrow_and_update(), JobStatus::Idle);

        exporter
            .run_export(ExportFormat::Csv, &[contact("Ada", "Lovelace")])
            .await;

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_terminal());
    }
}
