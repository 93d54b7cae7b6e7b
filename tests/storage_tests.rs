use clubs_portal::{
    StoreError,
    storage::{CredentialKey, CredentialStore, FileCredentialStore, MemoryCredentialStore},
};
use tempfile::tempdir;

#[cfg(test)]
mod file_store_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));

        assert_eq!(store.get(CredentialKey::AccessToken).await.unwrap(), None);
        assert_eq!(store.get(CredentialKey::Role).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileCredentialStore::new(&path);
        store
            .set_many(&[
                (CredentialKey::AccessToken, "tok1".to_string()),
                (CredentialKey::Role, "admin".to_string()),
            ])
            .await
            .unwrap();
        drop(store);

        // A fresh instance over the same file, as after an app restart.
        let reopened = FileCredentialStore::new(&path);
        assert_eq!(
            reopened.get(CredentialKey::AccessToken).await.unwrap().as_deref(),
            Some("tok1")
        );
        assert_eq!(
            reopened.get(CredentialKey::Role).await.unwrap().as_deref(),
            Some("admin")
        );
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_on_disk_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileCredentialStore::new(&path);
        store.set(CredentialKey::RefreshToken, "ref1").await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["refreshToken"], "ref1");
    }

    #[tokio::test]
    async fn test_clear_removes_only_named_keys() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        store.set(CredentialKey::AccessToken, "tok1").await.unwrap();
        store.set(CredentialKey::Role, "user").await.unwrap();

        store.clear(&[CredentialKey::AccessToken]).await.unwrap();

        assert_eq!(store.get(CredentialKey::AccessToken).await.unwrap(), None);
        assert_eq!(
            store.get(CredentialKey::Role).await.unwrap().as_deref(),
            Some("user")
        );
    }

    #[tokio::test]
    async fn test_replace_sets_and_removes_together() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileCredentialStore::new(&path);
        store.set(CredentialKey::RefreshToken, "ref-old").await.unwrap();

        store
            .replace(
                &[
                    (CredentialKey::AccessToken, "tok2".to_string()),
                    (CredentialKey::Role, "user".to_string()),
                ],
                &[CredentialKey::RefreshToken],
            )
            .await
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["accessToken"], "tok2");
        assert_eq!(raw["role"], "user");
        assert!(raw.get("refreshToken").is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported_then_replaced_by_clear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = FileCredentialStore::new(&path);

        let result = store.get(CredentialKey::AccessToken).await;
        assert!(matches!(result, Err(StoreError::Corrupt(_))));

        store.clear(&CredentialKey::ALL).await.unwrap();
        assert_eq!(store.get(CredentialKey::AccessToken).await.unwrap(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileCredentialStore::new(&path);
        store.set(CredentialKey::AccessToken, "tok1").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_leftover_temp_file_does_not_leak_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let tmp = path.with_extension("tmp");
        // Left behind by an interrupted write, world-readable.
        std::fs::write(&tmp, b"{}").unwrap();
        std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileCredentialStore::new(&path);
        store.set(CredentialKey::AccessToken, "tok1").await.unwrap();
        store.set(CredentialKey::Role, "user").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!tmp.exists());
    }
}

#[cfg(test)]
mod mock_tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_success() {
        let store = MemoryCredentialStore::new();
        store.set(CredentialKey::Role, "user").await.unwrap();

        assert_eq!(
            store.get(CredentialKey::Role).await.unwrap().as_deref(),
            Some("user")
        );
        assert_eq!(store.snapshot().await.len(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let store = MemoryCredentialStore::new_failing();

        assert!(store.get(CredentialKey::AccessToken).await.is_err());
        assert!(store.set(CredentialKey::AccessToken, "tok1").await.is_err());
        assert!(store.clear(&CredentialKey::ALL).await.is_err());
    }
}
