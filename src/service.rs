//! The services taking part in a rolling deployment.
//!
//! Stop order runs from the public entry point inwards so external traffic
//! stops first; start order is its exact reverse so dependencies are up
//! before traffic resumes.

use std::fmt;

/// A dino service controlled through systemd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Web front end, the external traffic entry point.
    Web,
    /// REST API.
    Rest,
    /// Core application server.
    App,
}

/// Order in which services are stopped.
pub const STOP_ORDER: [Service; 3] = [Service::Web, Service::Rest, Service::App];

/// Order in which services are started.
pub const START_ORDER: [Service; 3] = [Service::App, Service::Rest, Service::Web];

impl Service {
    /// Returns the short service name used in unit names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Rest => "rest",
            Self::App => "app",
        }
    }

    /// Returns the systemd unit name for this service in an environment.
    #[must_use]
    pub fn unit_name(self, environment: &str) -> String {
        format!("dino-{}-{environment}", self.as_str())
    }

    /// Returns the unit file name for this service in an environment.
    #[must_use]
    pub fn unit_file_name(self, environment: &str) -> String {
        format!("{}.service", self.unit_name(environment))
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_order_reverses_stop_order() {
        let mut reversed = STOP_ORDER;
        reversed.reverse();
        assert_eq!(reversed, START_ORDER);
    }

    #[test]
    fn test_stop_order_begins_at_entry_point() {
        assert_eq!(STOP_ORDER[0], Service::Web);
        assert_eq!(START_ORDER[0], Service::App);
    }

    #[test]
    fn test_unit_names() {
        assert_eq!(Service::Web.unit_name("prod"), "dino-web-prod");
        assert_eq!(Service::App.unit_file_name("staging"), "dino-app-staging.service");
    }
}
