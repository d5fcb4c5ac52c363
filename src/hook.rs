//! Git pre-push hook protocol handling.
//!
//! Git runs the hook with the remote name and location as arguments and
//! writes `<local ref> <local sha1> <remote ref> <remote sha1>` to stdin.
//! This module turns that input into a [`PushRequest`] and prints the
//! rejection message when a push is blocked.

use colored::Colorize;
use std::fmt;
use std::io::{self, IsTerminal, Read, Write};

use crate::guard::PushRequest;

/// Number of whitespace-separated tokens expected on stdin.
pub const STDIN_TOKENS: usize = 4;

/// Default cap on stdin size.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024;

/// Error type for reading and parsing hook input.
#[derive(Debug)]
pub enum HookInputError {
    /// Failed to read from stdin.
    Io(io::Error),
    /// Input exceeded the configured size limit.
    InputTooLarge { len: usize, max: usize },
    /// Stdin did not contain exactly four tokens.
    TokenCount { found: usize },
}

impl fmt::Display for HookInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read push info from stdin: {e}"),
            Self::InputTooLarge { len, max } => {
                write!(f, "stdin input ({len} bytes) exceeds limit ({max} bytes)")
            }
            Self::TokenCount { found } => write!(
                f,
                "expected {STDIN_TOKENS} tokens on stdin \
                 (<local ref> <local sha1> <remote ref> <remote sha1>), found {found}"
            ),
        }
    }
}

impl std::error::Error for HookInputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for HookInputError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Read the whole of `reader`, refusing anything larger than `max_bytes`.
///
/// # Errors
///
/// Returns [`HookInputError::Io`] on read failure (including invalid UTF-8)
/// and [`HookInputError::InputTooLarge`] when the limit is exceeded.
pub fn read_input<R: Read>(reader: R, max_bytes: usize) -> Result<String, HookInputError> {
    let mut input = String::with_capacity(256);
    // Read up to limit + 1 to detect overflow
    reader
        .take(max_bytes as u64 + 1)
        .read_to_string(&mut input)?;

    if input.len() > max_bytes {
        return Err(HookInputError::InputTooLarge {
            len: input.len(),
            max: max_bytes,
        });
    }
    Ok(input)
}

/// Build a [`PushRequest`] from the hook arguments and stdin text.
///
/// # Errors
///
/// Returns [`HookInputError::TokenCount`] unless `input` holds exactly four
/// whitespace-separated tokens.
pub fn parse_push_request(
    remote_name: &str,
    remote_location: &str,
    input: &str,
) -> Result<PushRequest, HookInputError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let [local_ref, local_sha1, remote_ref, remote_sha1] = tokens[..] else {
        return Err(HookInputError::TokenCount {
            found: tokens.len(),
        });
    };

    Ok(PushRequest {
        remote_name: remote_name.to_string(),
        remote_location: remote_location.to_string(),
        local_ref: local_ref.to_string(),
        local_sha1: local_sha1.to_string(),
        remote_ref: remote_ref.to_string(),
        remote_sha1: remote_sha1.to_string(),
    })
}

/// Read stdin and parse it into a [`PushRequest`].
///
/// # Errors
///
/// See [`read_input`] and [`parse_push_request`].
pub fn read_push_request<R: Read>(
    reader: R,
    remote_name: &str,
    remote_location: &str,
    max_bytes: usize,
) -> Result<PushRequest, HookInputError> {
    let input = read_input(reader, max_bytes)?;
    parse_push_request(remote_name, remote_location, &input)
}

/// Apply the configured color mode ("auto", "always", "never").
///
/// In auto mode colors are disabled when stderr is not a terminal (git
/// usually captures hook output).
pub fn configure_colors(mode: &str) {
    match mode {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => {
            if !io::stderr().is_terminal() {
                colored::control::set_override(false);
            }
        }
    }
}

/// Write the rejection line to stderr.
#[cold]
pub fn output_block(reason: &str) {
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    let _ = writeln!(handle, "{}", reason.red().bold());
}
