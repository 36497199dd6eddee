// tests/core/key_file.rs
use std::error::Error as _;
use std::fs;

use chrono::{Duration, Utc};
use tempfile::tempdir;

use keyfile_vault::config::Config;
use keyfile_vault::error::CoreError;
use keyfile_vault::{
    generate_key_file, read_key_file, KeyFileManager, KeyFileOptions, KeyRecord,
};

use crate::common::{setup, write_sealed};

#[test]
fn test_generate_then_read_session_key_file() {
    setup();
    let dir = tempdir().unwrap();

    let path = generate_key_file("session", dir.path(), None).unwrap();
    assert_eq!(path, dir.path().join("session.key"));
    assert!(path.exists());
    assert!(fs::metadata(&path).unwrap().permissions().readonly());

    let cipher = read_key_file(&path).unwrap();
    let ciphertext = cipher.encrypt("hello world").unwrap();
    assert_eq!(cipher.decrypt(&ciphertext).unwrap(), "hello world");
}

#[test]
fn test_generated_key_survives_the_envelope() {
    let dir = tempdir().unwrap();
    let manager = KeyFileManager::default();

    let path = manager.generate_key_file("random", dir.path(), None).unwrap();
    let record = manager.read_record(&path).unwrap();
    let cipher = manager.read_key_file(&path).unwrap();

    assert_eq!(record.value.expose_secret().len(), 32);
    assert_eq!(cipher.key().as_slice(), record.value.expose_secret().as_slice());
    assert_eq!(record.version, "1.0");
    assert!(record.owner.is_none());
    assert!(record.valid_until.is_none());
}

#[test]
fn test_supplied_key_is_recovered_verbatim() {
    let dir = tempdir().unwrap();
    let key = "A".repeat(32);

    let path = generate_key_file("supplied", dir.path(), Some(&key)).unwrap();
    let cipher = read_key_file(&path).unwrap();

    assert_eq!(cipher.key().as_slice(), key.as_bytes());
}

#[test]
fn test_blank_supplied_key_generates_random_key() {
    let dir = tempdir().unwrap();
    let manager = KeyFileManager::default();

    let path = manager
        .generate_key_file("blank", dir.path(), Some("   "))
        .unwrap();
    let record = manager.read_record(&path).unwrap();

    assert_eq!(record.value.expose_secret().len(), 32);
    assert_ne!(record.value.expose_secret(), &b"   ".to_vec());
}

#[test]
fn test_key_file_does_not_contain_plaintext_record() {
    let dir = tempdir().unwrap();
    let key = "B".repeat(32);
    let path = generate_key_file("opaque", dir.path(), Some(&key)).unwrap();

    let raw = fs::read(&path).unwrap();
    assert_eq!(raw.len() % 16, 0);
    let lossy = String::from_utf8_lossy(&raw);
    assert!(!lossy.contains("Value"));
    assert!(!lossy.contains("Creation"));
}

#[test]
fn test_missing_arguments() {
    let dir = tempdir().unwrap();
    let manager = KeyFileManager::default();

    assert!(matches!(
        manager.generate_key_file("", dir.path(), None),
        Err(CoreError::MissingArgument("file_name"))
    ));
    assert!(matches!(
        manager.generate_key_file("  ", dir.path(), None),
        Err(CoreError::MissingArgument("file_name"))
    ));
    assert!(matches!(
        manager.generate_key_file("name", "", None),
        Err(CoreError::MissingArgument("file_path"))
    ));
    assert!(matches!(
        manager.generate_key_file("name", " ", None),
        Err(CoreError::MissingArgument("file_path"))
    ));
    assert!(matches!(
        manager.read_key_file(""),
        Err(CoreError::MissingArgument("file_path"))
    ));
}

#[test]
fn test_supplied_key_with_wrong_length_is_rejected_before_writing() {
    let dir = tempdir().unwrap();

    let result = generate_key_file("short", dir.path(), Some("too short"));
    assert!(matches!(
        result,
        Err(CoreError::InvalidKeyLength { expected: 32, actual: 9 })
    ));
    assert!(!dir.path().join("short.key").exists());
}

#[test]
fn test_expired_key_is_rejected_after_successful_decrypt() {
    let dir = tempdir().unwrap();
    let manager = KeyFileManager::default();
    let expired_at = Utc::now() - Duration::hours(1);
    let options = KeyFileOptions::default().with_valid_until(expired_at);

    let path = manager
        .generate_key_file_with("expired", dir.path(), None, &options)
        .unwrap();

    // decrypt + deserialize still work
    let record = manager.read_record(&path).unwrap();
    assert!(record.is_expired());

    match manager.read_key_file(&path) {
        Err(CoreError::ExpiredKey { valid_until }) => assert_eq!(valid_until, expired_at),
        other => panic!("expected ExpiredKey, got {other:?}"),
    }
}

#[test]
fn test_future_expiry_and_owner_are_stored() {
    let dir = tempdir().unwrap();
    let manager = KeyFileManager::default();
    let valid_until = Utc::now() + Duration::days(30);
    let options = KeyFileOptions::default()
        .with_owner("transfer-service")
        .with_valid_until(valid_until);

    let path = manager
        .generate_key_file_with("owned", dir.path(), None, &options)
        .unwrap();

    let record = manager.read_record(&path).unwrap();
    assert_eq!(record.owner.as_deref(), Some("transfer-service"));
    assert_eq!(record.valid_until, Some(valid_until));
    assert!(manager.read_key_file(&path).is_ok());
}

#[test]
fn test_missing_file_is_read_failed_with_io_source() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.key");

    let err = read_key_file(&missing).unwrap_err();
    match &err {
        CoreError::ReadFailed { path, source } => {
            assert_eq!(path, &missing);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected ReadFailed, got {other:?}"),
    }
    assert!(err.source().is_some());
}

#[test]
fn test_corrupted_file_is_decryption_failed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.key");
    fs::write(&path, [0xABu8; 17]).unwrap();

    let err = read_key_file(&path).unwrap_err();
    match &err {
        CoreError::DecryptionFailed(inner) => {
            assert!(matches!(**inner, CoreError::Cipher(_)));
        }
        other => panic!("expected DecryptionFailed, got {other:?}"),
    }
    assert!(err.source().is_some());
}

#[test]
fn test_empty_file_is_decryption_failed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.key");
    fs::write(&path, b"").unwrap();

    match read_key_file(&path) {
        Err(CoreError::DecryptionFailed(inner)) => {
            assert!(matches!(*inner, CoreError::EmptyInput(_)));
        }
        other => panic!("expected DecryptionFailed, got {other:?}"),
    }
}

#[test]
fn test_non_json_payload_is_deserialization_failed() {
    let dir = tempdir().unwrap();
    let path = write_sealed(dir.path(), "garbage.key", "definitely not json");

    let err = read_key_file(&path).unwrap_err();
    assert!(matches!(err, CoreError::DeserializationFailed(_)));
    assert!(err.source().is_some());
}

#[test]
fn test_record_with_short_key_is_key_recovery_failed() {
    let dir = tempdir().unwrap();
    let record = KeyRecord::new(vec![7u8; 16], "1.0");
    let path = write_sealed(
        dir.path(),
        "short.key",
        record.to_json().unwrap().expose_secret(),
    );

    match read_key_file(&path) {
        Err(CoreError::KeyRecoveryFailed(inner)) => {
            assert!(matches!(
                *inner,
                CoreError::InvalidKeyLength { expected: 32, actual: 16 }
            ));
        }
        other => panic!("expected KeyRecoveryFailed, got {other:?}"),
    }
}

#[test]
fn test_existing_key_file_is_not_replaced() {
    let dir = tempdir().unwrap();
    let manager = KeyFileManager::default();
    let first_key = "C".repeat(32);

    let path = manager
        .generate_key_file("twice", dir.path(), Some(&first_key))
        .unwrap();

    let err = manager
        .generate_key_file("twice", dir.path(), None)
        .unwrap_err();
    assert!(matches!(err, CoreError::PersistFailed { .. }));

    let cipher = manager.read_key_file(&path).unwrap();
    assert_eq!(cipher.key().as_slice(), first_key.as_bytes());
}

#[test]
fn test_missing_directory_is_persist_failed() {
    let dir = tempdir().unwrap();
    let nowhere = dir.path().join("does").join("not").join("exist");

    match generate_key_file("lost", &nowhere, None) {
        Err(CoreError::PersistFailed { path, .. }) => {
            assert_eq!(path, nowhere.join("lost.key"));
        }
        other => panic!("expected PersistFailed, got {other:?}"),
    }
    assert!(!nowhere.exists());
}

#[test]
fn test_failed_persist_leaves_no_stray_files() {
    let dir = tempdir().unwrap();
    let manager = KeyFileManager::default();
    manager.generate_key_file("only", dir.path(), None).unwrap();
    let _ = manager.generate_key_file("only", dir.path(), None);

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_key_files_are_bound_to_master_passphrase() {
    let dir = tempdir().unwrap();
    let mut config = Config::default();
    config.envelope.master_passphrase = "Z".repeat(32);
    let custom = KeyFileManager::new(config).unwrap();

    let path = custom.generate_key_file("custom", dir.path(), None).unwrap();
    assert!(custom.read_key_file(&path).is_ok());

    let err = KeyFileManager::default().read_key_file(&path).unwrap_err();
    assert!(matches!(err, CoreError::DecryptionFailed(_)), "{err:?}");
}

#[test]
fn test_custom_extension_from_config() {
    let dir = tempdir().unwrap();
    let config = Config::from_toml_str(
        r#"
        [files]
        extension = "secret"
        "#,
    )
    .unwrap();
    let manager = KeyFileManager::new(config).unwrap();

    let path = manager.generate_key_file("ext", dir.path(), None).unwrap();
    assert_eq!(path, dir.path().join("ext.secret"));
    assert!(manager.read_key_file(&path).is_ok());
}
