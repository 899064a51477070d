//! Voice-response document.
//!
//! The provider fetches this document from the callback URL when the call
//! connects and speaks the `Say` text. Output is a fixed layout:
//!
//! ```text
//! <?xml version="1.0"?>
//! <Response><Say voice="alice">...</Say></Response>
//! ```

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;

use crate::error::AlertError;
use crate::message::AlertMessage;

const ROOT: &str = "Response";
const SAY: &str = "Say";

/// `Response` root with a single `Say` child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceDocument {
    voice: String,
    text: String,
}

impl VoiceDocument {
    pub fn new(message: &AlertMessage, voice: impl Into<String>) -> Self {
        Self {
            voice: voice.into(),
            text: message.text.clone(),
        }
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Serializes the document. Equal documents render to identical bytes.
    pub fn render(&self) -> Result<String, AlertError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
        writer.get_mut().push(b'\n');

        writer.write_event(Event::Start(BytesStart::new(ROOT)))?;
        let mut say = BytesStart::new(SAY);
        say.push_attribute(("voice", self.voice.as_str()));
        writer.write_event(Event::Start(say))?;
        writer.write_event(Event::Text(BytesText::new(&self.text)))?;
        writer.write_event(Event::End(BytesEnd::new(SAY)))?;
        writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
        writer.get_mut().push(b'\n');

        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }

    /// Renders and writes the document, replacing any previous file.
    ///
    /// Returns only after the bytes have been written; the call request
    /// must not be issued before this succeeds.
    pub fn write_to(&self, path: &Path) -> Result<(), AlertError> {
        let rendered = self.render()?;
        fs::write(path, rendered.as_bytes()).map_err(|source| AlertError::DocumentWriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), bytes = rendered.len(), "voice document written");
        Ok(())
    }
}
