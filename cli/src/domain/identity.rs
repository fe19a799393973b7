//! Remote login identity and the structured ssh invocation built from it.
//!
//! Arguments are kept as an argv list all the way to the process spawn.
//! The only string that crosses a shell is the remote command, and every
//! argument in it is quoted.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::domain::error::FetchError;
use crate::domain::extract::{ADMIN_CONF_PATH, MARKER};

static USERNAME_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,63}$"));

// ── Identity ──────────────────────────────────────────────────────────────────

/// Who to log in as, where, and with which key. Lives for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLoginIdentity {
    pub username: String,
    pub address: String,
    pub key_file: PathBuf,
}

/// Connection options applied to every ssh invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SshOptions {
    /// Passed to ssh as `ConnectTimeout`.
    pub connect_timeout: Duration,
}

impl RemoteLoginIdentity {
    /// Rejects values that ssh could read as options or that carry
    /// whitespace or control characters.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidIdentity`] describing the first bad field.
    pub fn validate(&self) -> Result<(), FetchError> {
        let username_ok = USERNAME_RE
            .as_ref()
            .is_ok_and(|re| re.is_match(&self.username));
        if !username_ok {
            return Err(FetchError::InvalidIdentity(format!(
                "username {:?} is not a valid login name",
                self.username
            )));
        }
        if self.address.is_empty()
            || self.address.starts_with('-')
            || self
                .address
                .chars()
                .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(FetchError::InvalidIdentity(format!(
                "address {:?} is not usable as an ssh destination",
                self.address
            )));
        }
        if self.key_file.to_str().is_none() {
            return Err(FetchError::InvalidIdentity(format!(
                "key file path {} is not valid UTF-8",
                self.key_file.display()
            )));
        }
        Ok(())
    }

    /// `user@address`, for display only.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.address)
    }

    /// Builds the full ssh argument list (program name excluded).
    ///
    /// Host-key checking is off and batch mode is on, so ssh fails instead
    /// of prompting. `--` ends option parsing before the address.
    #[must_use]
    pub fn ssh_args(&self, opts: &SshOptions, command: &RemoteCommand) -> Vec<String> {
        vec![
            "-i".to_string(),
            self.key_file.to_string_lossy().into_owned(),
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            "UserKnownHostsFile=/dev/null".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", opts.connect_timeout.as_secs().max(1)),
            "-l".to_string(),
            self.username.clone(),
            "--".to_string(),
            self.address.clone(),
            command.render(),
        ]
    }
}

// ── Remote command ────────────────────────────────────────────────────────────

/// An ordered list of argv steps run in one remote shell invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteCommand {
    steps: Vec<Vec<String>>,
}

impl RemoteCommand {
    /// Appends one step.
    #[must_use]
    pub fn then<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps.push(argv.into_iter().map(Into::into).collect());
        self
    }

    /// Prints the marker, then reads the admin kubeconfig with non-interactive sudo.
    #[must_use]
    pub fn fetch_admin_conf() -> Self {
        Self::default()
            .then(["echo", MARKER])
            .then(["sudo", "-n", "cat", ADMIN_CONF_PATH])
    }

    /// Renders the steps as a single shell string, `; `-separated.
    #[must_use]
    pub fn render(&self) -> String {
        self.steps
            .iter()
            .map(|argv| {
                argv.iter()
                    .map(|a| shell_quote(a))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Quotes `arg` for a POSIX shell. Plain words are returned unchanged.
#[must_use]
pub fn shell_quote(arg: &str) -> Cow<'_, str> {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c));
    if plain {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    }
}
