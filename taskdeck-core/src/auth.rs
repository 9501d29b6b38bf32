//! Login gate: a two-state machine in front of the app.
//!
//! The persisted flag is a convenience latch, not a security boundary. The
//! credential check is pluggable; the passcode implementation compares
//! against a configured string.

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

/// Key the authenticated flag is stored under.
pub const AUTH_KEY: &str = "todoapp_auth_token";
/// Value stored under [`AUTH_KEY`] once logged in.
pub const AUTH_VALUE: &str = "authenticated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

pub trait CredentialCheck {
    fn verify(&self, attempt: &str) -> bool;
}

#[derive(Debug, Clone)]
pub struct PasscodeCheck {
    passcode: String,
}

impl PasscodeCheck {
    pub fn new(passcode: impl Into<String>) -> Self {
        Self {
            passcode: passcode.into(),
        }
    }
}

impl CredentialCheck for PasscodeCheck {
    fn verify(&self, attempt: &str) -> bool {
        !self.passcode.is_empty() && attempt == self.passcode
    }
}

/// Where the authenticated flag lives between runs.
pub trait AuthFlagStore {
    type Error: std::fmt::Display;

    fn load(&self) -> Result<Option<String>, Self::Error>;
    fn save(&self, value: &str) -> Result<(), Self::Error>;
    fn clear(&self) -> Result<(), Self::Error>;
}

/// Flag store that forgets everything on drop.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    value: Mutex<Option<String>>,
}

impl AuthFlagStore for MemoryFlagStore {
    type Error = std::convert::Infallible;

    fn load(&self) -> Result<Option<String>, Self::Error> {
        Ok(self.value.lock().clone())
    }

    fn save(&self, value: &str) -> Result<(), Self::Error> {
        *self.value.lock() = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), Self::Error> {
        *self.value.lock() = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("incorrect passcode")]
    WrongCredential,
}

pub struct AuthGate<C, F> {
    check: C,
    flags: F,
    state: AuthState,
}

impl<C: CredentialCheck, F: AuthFlagStore> AuthGate<C, F> {
    /// Reads the persisted flag once. An unreadable flag counts as logged out.
    pub fn new(check: C, flags: F) -> Self {
        let state = match flags.load() {
            Ok(Some(v)) if v == AUTH_VALUE => AuthState::Authenticated,
            Ok(_) => AuthState::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "could not read auth flag");
                AuthState::Unauthenticated
            }
        };
        Self {
            check,
            flags,
            state,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    /// Verifies `attempt`; on success latches the persisted flag.
    /// A flag that fails to persist still authenticates this run.
    pub fn login(&mut self, attempt: &str) -> Result<AuthState, LoginError> {
        if !self.check.verify(attempt) {
            warn!("login rejected");
            return Err(LoginError::WrongCredential);
        }
        if let Err(e) = self.flags.save(AUTH_VALUE) {
            warn!(error = %e, "could not persist auth flag");
        }
        self.state = AuthState::Authenticated;
        info!("logged in");
        Ok(self.state)
    }

    pub fn logout(&mut self) -> Result<(), F::Error> {
        self.flags.clear()?;
        self.state = AuthState::Unauthenticated;
        info!("logged out");
        Ok(())
    }
}
