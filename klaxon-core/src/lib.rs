//! # klaxon-core
//!
//! Alert content: everything the pipeline derives from the location file
//! before talking to the provider.
//!
//! ### Key Submodules:
//! - `location`: scoped read of the location file
//! - `message`: law-enforcement and public alert templates
//! - `voice`: `<Response><Say>` voice-response document
//! - `request`: SMS and call request values handed to a dispatcher
//! - `nmea`: GGA fix parsing for GPS-fed location files

pub mod error;
pub mod location;
pub mod message;
pub mod nmea;
pub mod request;
pub mod voice;

pub mod prelude {
    pub use crate::error::*;
    pub use crate::location::*;
    pub use crate::message::*;
    pub use crate::request::*;
    pub use crate::voice::*;
}

pub use error::AlertError;
