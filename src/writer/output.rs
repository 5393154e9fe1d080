//! Delivering a finished document.
//!
//! [`Document::output`] finalizes the document and hands the bytes to a
//! [`Destination`]: an HTTP-style response (shown inline or downloaded), a
//! file, or the caller.

use super::document::Document;
use crate::error::{Error, Result};
use std::io::Write;
use std::path::Path;

/// File name used when a response destination is given an empty one.
pub const DEFAULT_FILE_NAME: &str = "doc.pdf";

/// Where [`Document::output`] sends the file.
pub enum Destination<'a> {
    /// Response shown in the browser (`Content-Disposition: inline`)
    Inline {
        /// Suggested file name
        name: &'a str,
        /// Response to write to
        channel: &'a mut dyn ResponseChannel,
    },
    /// Response saved by the browser (`Content-Disposition: attachment`)
    Download {
        /// Suggested file name
        name: &'a str,
        /// Response to write to
        channel: &'a mut dyn ResponseChannel,
    },
    /// A file on disk, created or truncated
    File(&'a Path),
    /// Returned to the caller
    Bytes,
}

/// A response that takes headers and then a body.
pub trait ResponseChannel {
    /// Whether any body bytes have been written already.
    fn headers_sent(&self) -> bool;

    /// Add a header.
    fn send_header(&mut self, name: &str, value: &str) -> Result<()>;

    /// Write body bytes.
    fn write_body(&mut self, body: &[u8]) -> Result<()>;
}

/// A response kept in memory, for servers that build their reply later.
#[derive(Debug, Clone, Default)]
pub struct MemoryResponse {
    /// Headers in the order they were sent
    pub headers: Vec<(String, String)>,
    /// Body bytes
    pub body: Vec<u8>,
}

impl MemoryResponse {
    /// Create an empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl ResponseChannel for MemoryResponse {
    fn headers_sent(&self) -> bool {
        !self.body.is_empty()
    }

    fn send_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.headers.push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn write_body(&mut self, body: &[u8]) -> Result<()> {
        self.body.extend_from_slice(body);
        Ok(())
    }
}

/// A CGI-style response written to any [`Write`]r: `Name: value` lines, a
/// blank line, then the body.
#[derive(Debug)]
pub struct WriterResponse<W: Write> {
    inner: W,
    body_started: bool,
}

impl<W: Write> WriterResponse<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            body_started: false,
        }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ResponseChannel for WriterResponse<W> {
    fn headers_sent(&self) -> bool {
        self.body_started
    }

    fn send_header(&mut self, name: &str, value: &str) -> Result<()> {
        if self.body_started {
            return Err(Error::OutputAlreadyStarted(format!(
                "cannot send header '{}' after the body",
                name
            )));
        }
        write!(self.inner, "{}: {}\r\n", name, value)?;
        Ok(())
    }

    fn write_body(&mut self, body: &[u8]) -> Result<()> {
        if !self.body_started {
            self.inner.write_all(b"\r\n")?;
            self.body_started = true;
        }
        self.inner.write_all(body)?;
        self.inner.flush()?;
        Ok(())
    }
}

impl Document {
    /// Finalize the document and deliver it.
    ///
    /// Returns the bytes for [`Destination::Bytes`] and `None` otherwise.
    /// A response that has already started its body is rejected before
    /// anything is finalized, so the document can still be sent elsewhere.
    pub fn output(&mut self, dest: Destination<'_>) -> Result<Option<Vec<u8>>> {
        if self.is_closed() {
            return Err(Error::DocumentClosed);
        }
        match dest {
            Destination::Inline { name, channel } => {
                self.respond(name, "inline", channel)?;
                Ok(None)
            },
            Destination::Download { name, channel } => {
                self.respond(name, "attachment", channel)?;
                Ok(None)
            },
            Destination::File(path) => {
                let bytes = self.finalize()?;
                std::fs::write(path, &bytes)?;
                log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
                Ok(None)
            },
            Destination::Bytes => self.finalize().map(Some),
        }
    }

    /// Finalize the document and return its bytes.
    pub fn output_bytes(&mut self) -> Result<Vec<u8>> {
        self.finalize()
    }

    fn respond(
        &mut self,
        name: &str,
        disposition: &str,
        channel: &mut dyn ResponseChannel,
    ) -> Result<()> {
        if channel.headers_sent() {
            return Err(Error::OutputAlreadyStarted(
                "some data has already been output, can't send PDF file".to_string(),
            ));
        }
        let bytes = self.finalize()?;
        let name = if name.is_empty() { DEFAULT_FILE_NAME } else { name };

        channel.send_header("Content-Type", "application/pdf")?;
        channel.send_header("Content-Disposition", &content_disposition(disposition, name))?;
        channel.send_header("Cache-Control", "private, max-age=0, must-revalidate")?;
        channel.send_header("Pragma", "public")?;
        channel.write_body(&bytes)?;
        log::debug!("Sent {} bytes as {} '{}'", bytes.len(), disposition, name);
        Ok(())
    }
}

/// `Content-Disposition` value; non-ASCII names also get an RFC 5987
/// `filename*` parameter next to an ASCII fallback.
pub fn content_disposition(disposition: &str, name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '?',
        })
        .collect();
    if name.is_ascii() {
        format!("{}; filename=\"{}\"", disposition, fallback)
    } else {
        format!(
            "{}; filename=\"{}\"; filename*=UTF-8''{}",
            disposition,
            fallback,
            percent_encode(name)
        )
    }
}

/// Percent-encode everything outside the RFC 5987 `attr-char` set.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
