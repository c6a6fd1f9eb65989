use kdbx_key::diagnostics::{Level, MemoryDiagnostics};
use kdbx_key::directory::{EntryDirectory, DEFAULT_FIELD};
use kdbx_key::errors::LoadError;
use kdbx_key::prompt::SecretPrompt;
use kdbx_key::source::{FetchError, ObjectLocation, Origin, StdinInput};
use kdbx_key::{open_database, Config, Error};
use kdbx_rs::database::{Entry, Field, Group};
use kdbx_rs::{CompositeKey, Kdbx};
use std::io::{self, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zeroize::Zeroizing;

const GROUP_NAME: &str = "FooGroup";
const ENTRY_NAME: &str = "Bar";
const ENTRY_USERNAME: &str = "someone@example.com";
const ENTRY_PASSWORD: &str = "kdbxrs";
const DATABASE_PASSWORD: &str = "blahblahblah";
const DATABASE_KEY_FILE: [u8; 3] = [0x20, 0x40, 0x60];

struct NoPrompt;

impl SecretPrompt for NoPrompt {
    fn prompt_for_password(&mut self) -> io::Result<Zeroizing<String>> {
        panic!("password prompt shown although a password was configured")
    }
}

fn no_remote(_: &ObjectLocation) -> Result<Box<dyn Read + Send>, FetchError> {
    panic!("object store contacted for a local database")
}

fn empty_stdin() -> StdinInput {
    StdinInput::from_reader(0, io::empty())
}

fn write_database(dir: &Path) -> (NamedTempFile, NamedTempFile) {
    let mut keyfile = NamedTempFile::new_in(dir).unwrap();
    keyfile.write_all(&DATABASE_KEY_FILE).unwrap();

    let mut db = kdbx_rs::Database::default();
    db.set_name("BarName".to_string());
    let mut group = Group::default();
    group.set_name(GROUP_NAME);
    let mut entry = Entry::default();
    entry.add_field(Field::new("Title", ENTRY_NAME));
    entry.add_field(Field::new("UserName", ENTRY_USERNAME));
    entry.set_password(ENTRY_PASSWORD);
    group.add_entry(entry);
    db.replace_root(group);

    let mut kdbx = Kdbx::from_database(db);
    kdbx.set_key(CompositeKey::new(
        Some(DATABASE_PASSWORD.into()),
        Some(DATABASE_KEY_FILE.to_vec()),
    ))
    .unwrap();
    let mut database = NamedTempFile::new_in(dir).unwrap();
    kdbx.write(database.as_file_mut()).unwrap();
    database.flush().unwrap();
    (database, keyfile)
}

fn config(database: &Path, keyfile: &Path, password: &str) -> Config {
    let database = format!("file://{}", database.display());
    let keyfile = keyfile.display().to_string();
    let password = password.to_string();
    Config::from_lookup(|name| match name {
        "KEEPASSDB" => Some(database.clone()),
        "KEEPASSDB_KEYFILE" => Some(keyfile.clone()),
        "KEEPASSDB_PASSWORD" => Some(password.clone()),
        _ => None,
    })
}

#[test]
fn round_trip_password_and_key_file() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let (database, keyfile) = write_database(dir.path());
    let config = config(database.path(), keyfile.path(), DATABASE_PASSWORD);
    let diagnostics = MemoryDiagnostics::new();

    let tree = open_database(&config, empty_stdin(), no_remote, NoPrompt, &diagnostics)?;
    let directory = EntryDirectory::new(&tree);

    let groups: Vec<_> = directory.list_groups().collect();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, GROUP_NAME);
    assert_eq!(groups[0].titles, vec![ENTRY_NAME]);

    let entry = directory.find_entry_by_title(ENTRY_NAME)?;
    assert_eq!(directory.get_secret_field(entry, DEFAULT_FIELD)?, ENTRY_PASSWORD);
    assert_eq!(directory.get_secret_field(entry, "UserName")?, ENTRY_USERNAME);
    assert!(diagnostics.contains(Level::Debug, "unlocked database"));
    assert!(!diagnostics.records().iter().any(|(_, message)| {
        message.contains(DATABASE_PASSWORD) || message.contains(ENTRY_PASSWORD)
    }));
    Ok(())
}

#[test]
fn wrong_password_fails_to_decode() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let (database, keyfile) = write_database(dir.path());
    let config = config(database.path(), keyfile.path(), "not the password");
    let diagnostics = MemoryDiagnostics::new();

    let result = open_database(&config, empty_stdin(), no_remote, NoPrompt, &diagnostics);
    match result {
        Err(Error::Load(LoadError::DecodeFailed { origin, .. })) => {
            assert_eq!(origin, Origin::LocalFile(database.path().to_path_buf()));
        }
        other => panic!("expected a decode failure, got {:?}", other),
    }
    Ok(())
}

#[test]
fn unreadable_key_file_fails_to_decode() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let (database, _keyfile) = write_database(dir.path());
    let missing = dir.path().join("missing.key");
    let config = config(database.path(), &missing, DATABASE_PASSWORD);
    let diagnostics = MemoryDiagnostics::new();

    let result = open_database(&config, empty_stdin(), no_remote, NoPrompt, &diagnostics);
    assert!(matches!(
        result,
        Err(Error::Load(LoadError::DecodeFailed { .. }))
    ));
    Ok(())
}

#[test]
fn piped_garbage_fails_to_decode() -> Result<(), Error> {
    let garbage = b"definitely not a keepass database".to_vec();
    let stdin = StdinInput::from_reader(garbage.len() as u64, io::Cursor::new(garbage));
    let config = Config::from_lookup(|name| match name {
        "KEEPASSDB_PASSWORD" => Some("anything".to_string()),
        _ => None,
    });
    let diagnostics = MemoryDiagnostics::new();

    let result = open_database(&config, stdin, no_remote, NoPrompt, &diagnostics);
    match result {
        Err(Error::Load(LoadError::DecodeFailed { origin, .. })) => {
            assert_eq!(origin, Origin::Stdin)
        }
        other => panic!("expected a decode failure, got {:?}", other),
    }
    Ok(())
}
