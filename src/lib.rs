#![forbid(unsafe_code)]
//! push-guard library.
//!
//! A git pre-push hook that keeps pushes to one protected repository on its
//! protected branch. Everything else passes through untouched.
//!
//! # Architecture
//!
//! ```text
//!   argv (remote name, location) ─┐
//!                                 ├─► hook: PushRequest ─► guard: Decision ─► exit code
//!   stdin (4 tokens) ─────────────┘                             │
//!                                                               └─► logging: decision log
//! ```
//!
//! The decision itself ([`guard::PushGuard::evaluate`]) is pure; reading
//! input, printing and exiting happen only in the binary.
//!
//! # Usage
//!
//! ```
//! use push_guard::guard::PushGuard;
//! use push_guard::hook::parse_push_request;
//!
//! let request = parse_push_request(
//!     "origin",
//!     "git@github.com:yugabyte/yugabyte-db.git",
//!     "refs/heads/x 1111 refs/heads/master 2222",
//! )
//! .unwrap();
//! assert!(!PushGuard::default().evaluate(&request).is_blocked());
//! ```

pub mod cli;
pub mod config;
pub mod guard;
pub mod hook;
pub mod logging;

pub use cli::Cli;
pub use config::Config;
pub use guard::{Decision, PushGuard, PushRequest};
pub use hook::HookInputError;
