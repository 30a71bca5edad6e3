//! Contact acquisition from the address book.

use crate::domain::{AppError, ContactFields, ContactRecord, ContactStore, PermissionState, Result};

/// Reads every contact once access is granted.
///
/// Records keep the store's order (ascending first name). An empty address
/// book is returned as an empty vector, not an error.
///
/// # Errors
/// Returns `AppError::PermissionRequired` without touching the store when
/// `permission` is not `Granted`, or `AppError::Acquisition` if the read
/// fails.
pub async fn acquire<S>(
    permission: PermissionState,
    store: &S,
    fields: ContactFields,
) -> Result<Vec<ContactRecord>>
where
    S: ContactStore + ?Sized,
{
    if !permission.is_granted() {
        tracing::warn!(status = %permission, "Contact access attempted without a grant");
        return Err(AppError::PermissionRequired);
    }

    let contacts = store.fetch_all(fields).await?;

    if contacts.is_empty() {
        tracing::info!("No contacts found on device");
    } else {
        tracing::info!(count = contacts.len(), "Loaded contacts");
    }

    Ok(contacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::{contact, MemoryStore};

    #[tokio::test]
    async fn test_requires_grant_before_fetch() {
        let store = MemoryStore::with(vec![contact("Ada", "Lovelace")]);

        for status in [PermissionState::Undetermined, PermissionState::Denied] {
            let err = acquire(status, &store, ContactFields::default())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::PermissionRequired));
        }
        assert_eq!(store.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_returns_store_order() {
        let store = MemoryStore::with(vec![contact("Ada", "Lovelace"), contact("Bob", "Builder")]);

        let contacts = acquire(PermissionState::Granted, &store, ContactFields::default())
            .await
            .unwrap();
        let names: Vec<&str> = contacts.iter().map(|c| c.first_name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Bob"]);
    }

    #[tokio::test]
    async fn test_empty_store_is_not_an_error() {
        let store = MemoryStore::default();
        let contacts = acquire(PermissionState::Granted, &store, ContactFields::default())
            .await
            .unwrap();
        assert!(contacts.is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_is_acquisition_error() {
        let store = MemoryStore::failing();
        let err = acquire(PermissionState::Granted, &store, ContactFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Acquisition { .. }));
    }

    #[tokio::test]
    async fn test_company_can_be_skipped() {
        let store = MemoryStore::with(vec![contact("Ada", "Lovelace")]);
        let contacts = acquire(
            PermissionState::Granted,
            &store,
            ContactFields { company: false },
        )
        .await
        .unwrap();
        assert!(contacts[0].company.is_empty());
    }
}
