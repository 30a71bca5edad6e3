//! In-memory collaborators for pipeline tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{
    AppError, ContactFields, ContactRecord, ContactStore, FileSink, Location, PermissionProvider,
    PermissionState, Result, ShareSink,
};

/// Provider that remembers a definite prompt answer, like a platform would.
#[derive(Clone)]
pub struct FakeProvider {
    /// `None` makes the probe fail.
    pub status: Arc<Mutex<Option<PermissionState>>>,
    /// `None` makes the prompt fail.
    pub answer: Option<PermissionState>,
    pub prompts: Arc<AtomicUsize>,
}

impl FakeProvider {
    pub fn new(status: PermissionState, answer: PermissionState) -> Self {
        Self {
            status: Arc::new(Mutex::new(Some(status))),
            answer: Some(answer),
            prompts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn granted() -> Self {
        Self::new(PermissionState::Granted, PermissionState::Granted)
    }

    pub fn fail_probe(&self) {
        *self.status.lock().unwrap() = None;
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionProvider for FakeProvider {
    async fn get_status(&self) -> Result<PermissionState> {
        let status = *self.status.lock().unwrap();
        status.ok_or_else(|| AppError::Probe {
            message: "probe unavailable".into(),
        })
    }

    async fn request_status(&self) -> Result<PermissionState> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        let answer = self.answer.ok_or_else(|| AppError::Request {
            message: "prompt unavailable".into(),
        })?;
        if answer != PermissionState::Undetermined {
            *self.status.lock().unwrap() = Some(answer);
        }
        Ok(answer)
    }
}

/// Contact store backed by a vector.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub contacts: Arc<Mutex<Vec<ContactRecord>>>,
    pub fail: bool,
    pub fetches: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn with(contacts: Vec<ContactRecord>) -> Self {
        Self {
            contacts: Arc::new(Mutex::new(contacts)),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// Replaces the stored contacts, visible to every clone.
    pub fn set_contacts(&self, contacts: Vec<ContactRecord>) {
        *self.contacts.lock().unwrap() = contacts;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn fetch_all(&self, fields: ContactFields) -> Result<Vec<ContactRecord>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::acquisition(std::io::Error::other(
                "address book offline",
            )));
        }

        let contacts = self.contacts.lock().unwrap().clone();
        Ok(contacts
            .into_iter()
            .map(|mut c| {
                if !fields.company {
                    c.company.clear();
                }
                c
            })
            .collect())
    }
}

/// How a [`MemorySink`] write should fail.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum SinkFailure {
    Write,
    Directory,
}

/// File sink recording every write.
#[derive(Clone, Default)]
pub struct MemorySink {
    pub failure: Option<SinkFailure>,
    pub writes: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl MemorySink {
    pub fn failing(failure: SinkFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Default::default()
        }
    }

    pub fn written(&self) -> Vec<(String, String, String)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileSink for MemorySink {
    async fn write(&self, filename: &str, content: &str, mime_type: &str) -> Result<Location> {
        let path = PathBuf::from("/exports").join(filename);
        match self.failure {
            Some(SinkFailure::Write) => {
                return Err(AppError::write(path, std::io::Error::other("disk full")))
            }
            Some(SinkFailure::Directory) => {
                return Err(AppError::DirectoryPermission {
                    path: PathBuf::from("/exports"),
                })
            }
            None => {}
        }

        self.writes.lock().unwrap().push((
            filename.to_string(),
            content.to_string(),
            mime_type.to_string(),
        ));
        Ok(Location(path))
    }
}

/// Share target with switchable availability.
#[derive(Clone, Default)]
pub struct FakeShare {
    pub available: bool,
    pub fail: bool,
    pub shared: Arc<Mutex<Vec<(Location, String, String)>>>,
}

impl FakeShare {
    pub fn available() -> Self {
        Self {
            available: true,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn shares(&self) -> Vec<(Location, String, String)> {
        self.shared.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShareSink for FakeShare {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn share(&self, location: &Location, mime_type: &str, dialog_title: &str) -> Result<()> {
        if self.fail {
            return Err(AppError::Config {
                message: "share target crashed".into(),
            });
        }
        self.shared.lock().unwrap().push((
            location.clone(),
            mime_type.to_string(),
            dialog_title.to_string(),
        ));
        Ok(())
    }
}

pub fn contact(first: &str, last: &str) -> ContactRecord {
    ContactRecord {
        display_name: format!("{first} {last}").trim().to_string(),
        first_name: first.into(),
        last_name: last.into(),
        phone_numbers: vec!["555-0100".into()],
        emails: vec![format!("{}@example.com", first.to_lowercase())],
        company: "Acme".into(),
    }
}
