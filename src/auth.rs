// Password gate for casual access control. This is not authentication: the
// secret is a shared configured value and nothing is persisted.
use secrecy::{ExposeSecret, Secret};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Pending,
    Rejected,
    Authorized,
}

#[derive(Debug)]
pub struct SessionGate {
    secret: Secret<String>,
    state: GateState,
}

impl SessionGate {
    pub fn new(secret: Secret<String>) -> Self {
        Self {
            secret,
            state: GateState::Pending,
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.state == GateState::Authorized
    }

    /// True after a wrong credential, until a correct one is submitted.
    pub fn was_rejected(&self) -> bool {
        self.state == GateState::Rejected
    }

    /// Line to show under the password prompt.
    pub fn notice(&self) -> Option<&'static str> {
        self.was_rejected().then_some("Password incorrect")
    }

    /// Check `value` against the configured secret. Once authorized the gate
    /// stays open for the session.
    pub fn submit_credential(&mut self, value: &str) {
        if self.is_authorized() {
            return;
        }
        if value == self.secret.expose_secret().as_str() {
            info!("session authorized");
            self.state = GateState::Authorized;
        } else {
            warn!("rejected dashboard password");
            self.state = GateState::Rejected;
        }
    }
}
