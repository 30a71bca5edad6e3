//! `SQLite` address-book reader.
//!
//! Reads contacts, phone numbers and emails from a contacts database
//! opened read-only.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};

use crate::domain::{AppError, ContactFields, ContactRecord, ContactStore, Result};

/// Contact rows ordered by first name, storage order breaking ties.
const CONTACTS_QUERY: &str = "SELECT id, display_name, first_name, last_name, company
     FROM contacts
     ORDER BY first_name, id";

const PHONES_QUERY: &str = "SELECT contact_id, number FROM phone_numbers ORDER BY position, rowid";

const EMAILS_QUERY: &str = "SELECT contact_id, address FROM emails ORDER BY position, rowid";

/// Schema of the address-book database.
#[cfg(test)]
pub const SCHEMA: &str = r"
    CREATE TABLE contacts (
        id INTEGER PRIMARY KEY,
        display_name TEXT,
        first_name TEXT,
        last_name TEXT,
        company TEXT
    );
    CREATE TABLE phone_numbers (
        contact_id INTEGER NOT NULL REFERENCES contacts(id),
        number TEXT,
        position INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE emails (
        contact_id INTEGER NOT NULL REFERENCES contacts(id),
        address TEXT,
        position INTEGER NOT NULL DEFAULT 0
    );
";

/// Contact store backed by an address-book database file.
#[derive(Debug, Clone)]
pub struct SqliteContactStore {
    path: PathBuf,
}

impl SqliteContactStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn fetch_all(&self, fields: ContactFields) -> Result<Vec<ContactRecord>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || AddressBookReader::open(&path)?.read_all(fields))
            .await
            .map_err(AppError::acquisition)?
    }
}

/// Synchronous reader over one open connection.
struct AddressBookReader {
    conn: Connection,
}

impl AddressBookReader {
    fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::Acquisition {
                message: format!("Address book not found at: {}", path.display()),
                source: None,
            });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(AppError::acquisition)?;

        conn.execute_batch("PRAGMA query_only = ON;")
            .map_err(AppError::acquisition)?;

        tracing::debug!("Opened address book: {}", path.display());

        Ok(Self { conn })
    }

    fn read_all(&self, fields: ContactFields) -> Result<Vec<ContactRecord>> {
        let mut phones = self.fetch_values(PHONES_QUERY)?;
        let mut emails = self.fetch_values(EMAILS_QUERY)?;

        let mut stmt = self
            .conn
            .prepare(CONTACTS_QUERY)
            .map_err(AppError::acquisition)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                ))
            })
            .map_err(AppError::acquisition)?;

        let mut contacts = Vec::new();
        for row in rows {
            let (id, display_name, first_name, last_name, company) =
                row.map_err(AppError::acquisition)?;

            contacts.push(ContactRecord {
                display_name,
                first_name,
                last_name,
                phone_numbers: phones.remove(&id).unwrap_or_default(),
                emails: emails.remove(&id).unwrap_or_default(),
                company: if fields.company { company } else { String::new() },
            });
        }

        tracing::debug!("Read {} contacts", contacts.len());

        Ok(contacts)
    }

    /// Groups a `(contact_id, value)` query by contact, keeping query order.
    fn fetch_values(&self, query: &str) -> Result<HashMap<i64, Vec<String>>> {
        let mut stmt = self.conn.prepare(query).map_err(AppError::acquisition)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
            })
            .map_err(AppError::acquisition)?;

        let mut grouped: HashMap<i64, Vec<String>> = HashMap::new();
        for row in rows {
            if let (id, Some(value)) = row.map_err(AppError::acquisition)? {
                grouped.entry(id).or_default().push(value);
            }
        }

        Ok(grouped)
    }
}
