//! Alert templates.

use crate::location::Location;

const POLICE_PREFIX: &str = "ALERT to all active units: Active shooting attempt at ";
const POLICE_SUFFIX: &str = ".";
const PUBLIC_PREFIX: &str = "The following is a message from your local police station. \
Please be advised: there is an attempted active shooting attempt reported at ";
const PUBLIC_SUFFIX: &str = ". Please locate the nearest shelter. Thank you.";

/// Who an alert is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    LawEnforcement,
    Public,
}

/// A rendered alert for one audience.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub audience: Audience,
    pub text: String,
}

impl AlertMessage {
    pub fn for_audience(audience: Audience, location: &Location) -> Self {
        let (prefix, suffix) = match audience {
            Audience::LawEnforcement => (POLICE_PREFIX, POLICE_SUFFIX),
            Audience::Public => (PUBLIC_PREFIX, PUBLIC_SUFFIX),
        };
        let location = location.as_str();
        let mut text = String::with_capacity(prefix.len() + location.len() + suffix.len());
        text.push_str(prefix);
        text.push_str(location);
        text.push_str(suffix);
        Self { audience, text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Both messages produced for one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessages {
    /// Spoken on the voice call.
    pub law_enforcement: AlertMessage,
    /// Sent by SMS.
    pub public: AlertMessage,
}

/// Substitutes the location into both templates.
pub fn compose(location: &Location) -> AlertMessages {
    AlertMessages {
        law_enforcement: AlertMessage::for_audience(Audience::LawEnforcement, location),
        public: AlertMessage::for_audience(Audience::Public, location),
    }
}
