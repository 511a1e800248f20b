use camino::Utf8PathBuf;
use rigit_config::ConfigDir;
use rigit_infra::{CredentialStore, FileCredentialStore};

fn temp_dir() -> (tempfile::TempDir, ConfigDir) {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
    (dir, ConfigDir::at(root))
}

#[test]
fn token_survives_a_new_store_instance() {
    let (_guard, dir) = temp_dir();
    let store = FileCredentialStore::new(dir.clone());
    assert!(store.load().is_none());

    store.store("abc123").unwrap();
    let content = std::fs::read_to_string(dir.credentials_path()).unwrap();
    assert!(content.contains("\"auth_token\""));

    let reopened = FileCredentialStore::new(dir);
    assert_eq!(reopened.load().as_deref(), Some("abc123"));
}

#[test]
fn clear_removes_the_token_on_disk() {
    let (_guard, dir) = temp_dir();
    let store = FileCredentialStore::new(dir.clone());
    store.store("abc123").unwrap();
    store.clear().unwrap();

    assert!(store.load().is_none());
    assert!(FileCredentialStore::new(dir).load().is_none());
}

#[test]
fn corrupt_file_reads_as_logged_out() {
    let (_guard, dir) = temp_dir();
    std::fs::write(dir.credentials_path(), "{not json").unwrap();
    assert!(FileCredentialStore::new(dir).load().is_none());
}

#[cfg(unix)]
#[test]
fn credential_file_is_private_to_the_owner() {
    use std::os::unix::fs::PermissionsExt;

    let (_guard, dir) = temp_dir();
    // A stale world-readable temp file must not leak its mode.
    std::fs::write(format!("{}.tmp", dir.credentials_path()), "").unwrap();
    std::fs::set_permissions(
        format!("{}.tmp", dir.credentials_path()),
        std::fs::Permissions::from_mode(0o644),
    )
    .unwrap();

    let store = FileCredentialStore::new(dir.clone());
    store.store("abc123").unwrap();
    let mode = std::fs::metadata(dir.credentials_path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);

    store.clear().unwrap();
    let mode = std::fs::metadata(dir.credentials_path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
