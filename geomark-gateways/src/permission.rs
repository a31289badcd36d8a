use std::cell::Cell;

use geomark_core::gateways::permission::{DecisionCallback, PermissionGateway, PermissionStatus};

/// Permission gateway with a fixed decision, taken from the
/// configuration of a headless deployment.
#[derive(Debug, Clone)]
pub struct StaticPermission {
    status: Cell<PermissionStatus>,
    decision: PermissionStatus,
}

impl StaticPermission {
    pub fn granted() -> Self {
        Self {
            status: Cell::new(PermissionStatus::Authorized),
            decision: PermissionStatus::Authorized,
        }
    }

    pub fn denied() -> Self {
        Self {
            status: Cell::new(PermissionStatus::Denied),
            decision: PermissionStatus::Denied,
        }
    }

    /// Starts out undetermined and answers the first request with the
    /// given decision, which then becomes the status.
    pub fn undetermined(decision: PermissionStatus) -> Self {
        Self {
            status: Cell::new(PermissionStatus::Undetermined),
            decision,
        }
    }
}

impl PermissionGateway for StaticPermission {
    fn status(&self) -> PermissionStatus {
        self.status.get()
    }

    fn request(&self, on_decision: DecisionCallback) {
        self.status.set(self.decision);
        on_decision(self.decision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn undetermined_becomes_the_decision_after_a_request() {
        let gateway = StaticPermission::undetermined(PermissionStatus::Authorized);
        assert_eq!(PermissionStatus::Undetermined, gateway.status());

        let decision = Arc::new(Mutex::new(None));
        let target = Arc::clone(&decision);
        gateway.request(Box::new(move |status| {
            *target.lock().unwrap() = Some(status);
        }));
        assert_eq!(Some(PermissionStatus::Authorized), *decision.lock().unwrap());
        assert_eq!(PermissionStatus::Authorized, gateway.status());
    }
}
