use std::path::PathBuf;

use thiserror::Error;

use crate::request::Channel;

/// Fatal failures of the alert pipeline, in stage order.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("location file {} is not readable", path.display())]
    FileNotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize voice document: {0}")]
    DocumentRender(#[from] quick_xml::Error),

    #[error("failed to write voice document to {}", path.display())]
    DocumentWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{channel} dispatch failed")]
    DispatchFailed {
        channel: Channel,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
