//! Location file reader.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::AlertError;

/// Current location as read from disk. Not validated beyond UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location(String);

impl Location {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads the whole location file.
///
/// The handle lives only inside this call and is closed on every path,
/// including a failed read. With `trim_newline`, trailing `\r`/`\n` bytes
/// are dropped; everything else is kept verbatim.
pub fn read_location(path: &Path, trim_newline: bool) -> Result<Location, AlertError> {
    let not_readable = |source| AlertError::FileNotReadable {
        path: path.to_path_buf(),
        source,
    };

    let contents = {
        let mut file = File::open(path).map_err(not_readable)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(not_readable)?;
        contents
    };
    debug!(path = %path.display(), bytes = contents.len(), "location file read");

    let text = if trim_newline {
        contents.trim_end_matches(['\r', '\n']).to_string()
    } else {
        contents
    };
    if text.trim().is_empty() {
        warn!(path = %path.display(), "location file is empty");
    }
    Ok(Location(text))
}
