//! Alert content configuration.
//!
//! Where the location is read from and how the voice-response document is
//! produced and published.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Location source parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct LocationConfig {
    /// Plain-text file holding the current location.
    #[serde(default = "default_location_path")]
    pub path: PathBuf,

    /// Strip trailing line terminators left by the writer of the location file.
    /// Off by default: the whole file is the location.
    #[serde(default)]
    pub trim_newline: bool,
}

fn default_location_path() -> PathBuf {
    PathBuf::from("gpslogs/log.txt")
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            path: default_location_path(),
            trim_newline: false,
        }
    }
}

/// Voice-response document parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct VoiceConfig {
    /// Local path the document is written to.
    #[serde(default = "default_document_path")]
    pub document_path: PathBuf,

    /// Public URL the provider fetches the document from.
    #[validate(url(message = "must be an absolute URL serving the voice document"))]
    #[serde(default)]
    pub callback_url: String,

    /// Synthetic voice used by the `Say` verb.
    #[validate(length(min = 1, max = 64))]
    #[serde(default = "default_voice")]
    pub voice: String,
}

fn default_document_path() -> PathBuf {
    PathBuf::from("twilio.xml")
}

fn default_voice() -> String {
    "alice".into()
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            document_path: default_document_path(),
            callback_url: String::new(),
            voice: default_voice(),
        }
    }
}
