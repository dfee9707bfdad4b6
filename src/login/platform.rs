//! Usage: Native platform auth probe (operations that must go through the platform instead).

use crate::shared::error::{OperationError, OperationResult};
use std::sync::atomic::{AtomicBool, Ordering};

pub trait NativePlatformAuth: Send + Sync {
    /// Display name used in error descriptions (e.g. "Steam").
    fn name(&self) -> &str;

    fn is_active(&self) -> bool;
}

/// Host-controlled switch; the host flips it when its platform subsystem comes up.
#[derive(Debug)]
pub struct PlatformAuthFlag {
    name: String,
    active: AtomicBool,
}

impl PlatformAuthFlag {
    pub fn new(name: impl Into<String>, active: bool) -> Self {
        Self {
            name: name.into(),
            active: AtomicBool::new(active),
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }
}

impl NativePlatformAuth for PlatformAuthFlag {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GuardedFlow {
    Registration,
    Authentication,
    PasswordReset,
}

impl GuardedFlow {
    fn failure_code(self) -> &'static str {
        match self {
            Self::Registration => "Registration failed",
            Self::Authentication => "Authentication failed",
            Self::PasswordReset => "Password reset failed",
        }
    }

    fn subject(self) -> &'static str {
        match self {
            Self::Registration => "User registration",
            Self::Authentication => "User authentication",
            Self::PasswordReset => "User password reset",
        }
    }
}

pub(crate) fn ensure_not_redirected(
    platform: Option<&dyn NativePlatformAuth>,
    flow: GuardedFlow,
) -> OperationResult<()> {
    let Some(platform) = platform.filter(|platform| platform.is_active()) else {
        return Ok(());
    };
    let description = format!("{} should be handled via {}", flow.subject(), platform.name());
    tracing::error!(flow = ?flow, "{}", description);
    Err(OperationError::platform_redirect(flow.failure_code(), description))
}
