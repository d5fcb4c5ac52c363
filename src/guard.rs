//! The push guard decision.
//!
//! A push is blocked only when it targets the protected remote and the
//! destination ref is anything other than the protected branch. Every other
//! push is allowed.
//!
//! # Example
//!
//! ```
//! use push_guard::guard::{PushGuard, PushRequest};
//!
//! let guard = PushGuard::default();
//! let request = PushRequest {
//!     remote_name: "origin".to_string(),
//!     remote_location: "git@github.com:yugabyte/yugabyte-db.git".to_string(),
//!     local_ref: "refs/heads/feature".to_string(),
//!     local_sha1: "1111111".to_string(),
//!     remote_ref: "refs/heads/feature".to_string(),
//!     remote_sha1: "2222222".to_string(),
//! };
//!
//! assert!(guard.evaluate(&request).is_blocked());
//! ```

use crate::config::ProtectedConfig;

/// Remote location that branch restrictions apply to.
pub const DEFAULT_PROTECTED_REMOTE: &str = "git@github.com:yugabyte/yugabyte-db.git";

/// The only ref that may be pushed to on the protected remote.
pub const DEFAULT_PROTECTED_BRANCH: &str = "refs/heads/master";

/// Repository name used in the block message.
pub const DEFAULT_PROTECTED_NAME: &str = "yugabyte";

/// Exit code when the push is allowed.
pub const EXIT_ALLOW: i32 = 0;

/// Exit code when the push is blocked.
pub const EXIT_BLOCK: i32 = 1;

/// One pushed ref together with the remote it is headed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRequest {
    /// Symbolic name of the remote (e.g. `origin`).
    pub remote_name: String,
    /// URL or path of the remote repository.
    pub remote_location: String,
    pub local_ref: String,
    pub local_sha1: String,
    /// Destination ref on the remote.
    pub remote_ref: String,
    pub remote_sha1: String,
}

/// Outcome of evaluating a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Push may proceed.
    Allow,
    /// Push is rejected.
    Block {
        /// Human-readable explanation shown to the user.
        reason: String,
    },
}

impl Decision {
    #[inline]
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Block { .. })
    }

    /// The block reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Block { reason } => Some(reason),
        }
    }

    /// Process exit code git expects from a pre-push hook.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Allow => EXIT_ALLOW,
            Self::Block { .. } => EXIT_BLOCK,
        }
    }

    /// Short lowercase label, used in decision logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Block { .. } => "block",
        }
    }
}

/// Decides whether a push is allowed.
///
/// The protected remote is stored lowercased so that comparison against the
/// lowercased request location is case-insensitive on both sides. The branch
/// comparison is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushGuard {
    protected_remote: String,
    protected_branch: String,
    protected_name: String,
}

impl Default for PushGuard {
    fn default() -> Self {
        Self::new(
            DEFAULT_PROTECTED_REMOTE,
            DEFAULT_PROTECTED_BRANCH,
            DEFAULT_PROTECTED_NAME,
        )
    }
}

impl PushGuard {
    #[must_use]
    pub fn new(remote: &str, branch: &str, name: &str) -> Self {
        Self {
            protected_remote: remote.to_lowercase(),
            protected_branch: branch.to_string(),
            protected_name: name.to_string(),
        }
    }

    /// Build a guard from the `[protected]` config section.
    #[must_use]
    pub fn from_config(config: &ProtectedConfig) -> Self {
        Self::new(config.remote(), config.branch(), config.name())
    }

    #[must_use]
    pub fn protected_remote(&self) -> &str {
        &self.protected_remote
    }

    #[must_use]
    pub fn protected_branch(&self) -> &str {
        &self.protected_branch
    }

    /// Whether `location` names the protected remote.
    #[inline]
    #[must_use]
    pub fn is_protected_remote(&self, location: &str) -> bool {
        location.to_lowercase() == self.protected_remote
    }

    /// Evaluate a push. Pure: no I/O, no process exit.
    #[must_use]
    pub fn evaluate(&self, request: &PushRequest) -> Decision {
        if !self.is_protected_remote(&request.remote_location) {
            return Decision::Allow;
        }
        if request.remote_ref == self.protected_branch {
            return Decision::Allow;
        }
        Decision::Block {
            reason: format!("Cannot push to {} repo", self.protected_name),
        }
    }
}
