use kdbx_key::credentials::CredentialBuilder;
use kdbx_key::diagnostics::MemoryDiagnostics;
use kdbx_key::errors::CredentialError;
use kdbx_key::prompt::SecretPrompt;
use kdbx_key::source::{FetchError, ObjectLocation, StdinInput};
use kdbx_key::{open_database, Config, Error};
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use zeroize::Zeroizing;

struct ScriptedPrompt {
    answer: &'static str,
    shown: bool,
}

impl ScriptedPrompt {
    fn answering(answer: &'static str) -> ScriptedPrompt {
        ScriptedPrompt {
            answer,
            shown: false,
        }
    }
}

impl SecretPrompt for ScriptedPrompt {
    fn prompt_for_password(&mut self) -> io::Result<Zeroizing<String>> {
        self.shown = true;
        Ok(Zeroizing::new(self.answer.to_string()))
    }
}

struct UnreadSource(Arc<AtomicBool>);

impl Read for UnreadSource {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        self.0.store(true, Ordering::SeqCst);
        Ok(0)
    }
}

fn no_remote(_: &ObjectLocation) -> Result<Box<dyn Read + Send>, FetchError> {
    panic!("object store contacted unexpectedly")
}

fn piped_database() -> (StdinInput, Arc<AtomicBool>) {
    let read = Arc::new(AtomicBool::new(false));
    (StdinInput::from_reader(1024, UnreadSource(read.clone())), read)
}

#[test]
fn empty_prompt_aborts_before_decoding() -> Result<(), Error> {
    let (stdin, read) = piped_database();
    let config = Config::from_lookup(|name| match name {
        "KEEPASSDB_PASSWORD" => Some(String::new()),
        _ => None,
    });
    let mut prompt = ScriptedPrompt::answering("");
    let diagnostics = MemoryDiagnostics::new();

    let result = open_database(&config, stdin, no_remote, &mut prompt, &diagnostics);
    assert!(matches!(
        result,
        Err(Error::Credential(CredentialError::Missing))
    ));
    assert!(prompt.shown, "an empty variable counts as unset");
    assert!(!read.load(Ordering::SeqCst));
    Ok(())
}

#[test]
fn empty_explicit_password_is_missing() -> Result<(), Error> {
    let diagnostics = MemoryDiagnostics::new();
    let mut prompt = ScriptedPrompt::answering("never used");

    let result = CredentialBuilder::new(&mut prompt, &diagnostics).build(Some(""), None);
    assert!(matches!(result, Err(CredentialError::Missing)));
    assert!(!prompt.shown);
    Ok(())
}

#[test]
fn configured_password_skips_prompt() -> Result<(), Error> {
    let (stdin, read) = piped_database();
    let config = Config::from_lookup(|name| match name {
        "KEEPASSDB_PASSWORD" => Some("configured".to_string()),
        _ => None,
    });
    let mut prompt = ScriptedPrompt::answering("typed");
    let diagnostics = MemoryDiagnostics::new();

    // The piped bytes are empty, so decoding fails after the credentials are built
    let result = open_database(&config, stdin, no_remote, &mut prompt, &diagnostics);
    assert!(matches!(result, Err(Error::Load(_))));
    assert!(!prompt.shown);
    assert!(read.load(Ordering::SeqCst));
    Ok(())
}

#[test]
fn prompt_error_is_reported() -> Result<(), Error> {
    struct BrokenPrompt;

    impl SecretPrompt for BrokenPrompt {
        fn prompt_for_password(&mut self) -> io::Result<Zeroizing<String>> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal went away"))
        }
    }

    let diagnostics = MemoryDiagnostics::new();
    let result = CredentialBuilder::new(BrokenPrompt, &diagnostics).build(None, None);
    assert!(matches!(result, Err(CredentialError::Prompt(_))));
    Ok(())
}
