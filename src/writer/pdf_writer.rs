//! PDF object writer.
//!
//! Assembles the file body object by object while recording the byte offset
//! of each `"<id> 0 obj"` token, then writes the cross-reference table and
//! trailer from those offsets.

use super::object_serializer::ObjectSerializer;
use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef};
use std::io::Write;

/// PDF version written in the header.
pub const PDF_VERSION: &str = "1.3";

/// Incremental writer for the indirect objects of one file.
///
/// Ids are handed out monotonically. A fixed number of low ids can be
/// reserved up front so that objects written early may reference objects
/// that are only written at the end (the page tree root, the shared
/// resources).
#[derive(Debug)]
pub struct ObjectWriter {
    serializer: ObjectSerializer,
    output: Vec<u8>,
    /// Offsets indexed by object id; index 0 is the free-list head
    offsets: Vec<Option<usize>>,
    /// Last allocated object id
    last_id: u32,
}

impl ObjectWriter {
    /// Start a file: writes the header and reserves ids `1..=reserved`.
    pub fn new(reserved: u32) -> Self {
        let mut output = Vec::new();
        output.extend_from_slice(format!("%PDF-{}\n", PDF_VERSION).as_bytes());
        // Binary marker (recommended for binary content)
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        Self {
            serializer: ObjectSerializer::new(),
            output,
            offsets: vec![None; reserved as usize + 1],
            last_id: reserved,
        }
    }

    /// Id the next [`write_new`](Self::write_new) call will use.
    pub fn peek_next_id(&self) -> u32 {
        self.last_id + 1
    }

    /// Current length of the output, i.e. where the next byte will go.
    pub fn position(&self) -> usize {
        self.output.len()
    }

    /// Allocate the next id, record its offset and write the object.
    pub fn write_new(&mut self, obj: &Object) -> ObjectRef {
        self.last_id += 1;
        let id = self.last_id;
        self.offsets.push(None);
        self.emit(id, obj);
        ObjectRef::new(id, 0)
    }

    /// Write an object under a reserved id.
    pub fn write_reserved(&mut self, id: u32, obj: &Object) -> Result<ObjectRef> {
        match self.offsets.get(id as usize) {
            Some(None) if id > 0 => {},
            Some(Some(_)) => {
                return Err(Error::InternalConsistency(format!("object {} written twice", id)))
            },
            _ => {
                return Err(Error::InternalConsistency(format!("object {} was never reserved", id)))
            },
        }
        self.emit(id, obj);
        Ok(ObjectRef::new(id, 0))
    }

    fn emit(&mut self, id: u32, obj: &Object) {
        self.offsets[id as usize] = Some(self.output.len());
        log::trace!("Object {} at offset {}", id, self.output.len());
        let bytes = self.serializer.serialize_indirect(id, 0, obj);
        self.output.extend_from_slice(&bytes);
    }

    /// Offset recorded for `id`, if it has been written.
    pub fn offset_of(&self, id: u32) -> Option<usize> {
        self.offsets.get(id as usize).copied().flatten()
    }

    /// Check every recorded offset against the bytes actually written.
    fn verify(&self) -> Result<Vec<usize>> {
        let mut verified = Vec::with_capacity(self.offsets.len().saturating_sub(1));
        for id in 1..=self.last_id {
            let offset = self.offset_of(id).ok_or_else(|| {
                Error::InternalConsistency(format!("object {} has no recorded offset", id))
            })?;
            let token = format!("{} 0 obj", id);
            if !self.output[offset..].starts_with(token.as_bytes()) {
                return Err(Error::InternalConsistency(format!(
                    "offset {} of object {} does not point at its definition",
                    offset, id
                )));
            }
            verified.push(offset);
        }
        Ok(verified)
    }

    /// Write the xref table and trailer and return the complete file.
    pub fn finish(mut self, root: ObjectRef, info: ObjectRef) -> Result<Vec<u8>> {
        let offsets = self.verify()?;
        let size = self.last_id + 1;

        let xref_start = self.output.len();
        let output = &mut self.output;
        writeln!(output, "xref")?;
        writeln!(output, "0 {}", size)?;
        // Object 0 is always free
        writeln!(output, "0000000000 65535 f ")?;
        for offset in &offsets {
            writeln!(output, "{:010} 00000 n ", offset)?;
        }

        let trailer = ObjectSerializer::dict(vec![
            ("Size", ObjectSerializer::integer(i64::from(size))),
            ("Root", Object::Reference(root)),
            ("Info", Object::Reference(info)),
        ]);

        writeln!(output, "trailer")?;
        output.extend_from_slice(&self.serializer.serialize(&trailer));
        writeln!(output)?;
        writeln!(output, "startxref")?;
        writeln!(output, "{}", xref_start)?;
        write!(output, "%%EOF")?;

        log::debug!("Wrote {} objects, xref at {}, {} bytes", size - 1, xref_start, output.len());
        Ok(self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn test_header() {
        let writer = ObjectWriter::new(0);
        assert_eq!(writer.position(), 15);
        assert_eq!(writer.peek_next_id(), 1);
    }

    #[test]
    fn test_offsets_match_definitions() {
        let mut writer = ObjectWriter::new(1);
        let a = writer.write_new(&Object::Integer(1));
        let catalog = ObjectSerializer::dict(vec![("Type", ObjectSerializer::name("Catalog"))]);
        let b = writer.write_new(&catalog);
        writer.write_reserved(1, &Object::Null).unwrap();
        assert_eq!((a.id, b.id), (2, 3));

        let bytes = writer.finish(b, a).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.3\n"));
        assert!(bytes.ends_with(b"%%EOF"));

        let xref_pos = find(&bytes, b"\nxref\n").unwrap() + 1;
        let tail = String::from_utf8(bytes[xref_pos..].to_vec()).unwrap();
        let lines: Vec<&str> = tail.lines().collect();
        assert_eq!(lines[1], "0 4");
        assert_eq!(lines[2], "0000000000 65535 f ");
        for id in 1..=3usize {
            let offset: usize = lines[2 + id][..10].parse().unwrap();
            assert!(bytes[offset..].starts_with(format!("{} 0 obj", id).as_bytes()));
        }
        assert!(tail.contains("trailer\n<</Size 4 /Root 3 0 R /Info 2 0 R>>"));
        assert!(tail.ends_with(&format!("startxref\n{}\n%%EOF", xref_pos)));
    }

    #[test]
    fn test_missing_reserved_object_is_inconsistent() {
        let mut writer = ObjectWriter::new(2);
        let catalog = writer.write_new(&Object::Null);
        writer.write_reserved(1, &Object::Null).unwrap();
        let result = writer.finish(catalog, catalog);
        assert!(matches!(result, Err(Error::InternalConsistency(_))));
    }

    #[test]
    fn test_reserved_ids_written_once() {
        let mut writer = ObjectWriter::new(1);
        writer.write_reserved(1, &Object::Null).unwrap();
        assert!(writer.write_reserved(1, &Object::Null).is_err());
        assert!(writer.write_reserved(5, &Object::Null).is_err());
        assert!(writer.write_reserved(0, &Object::Null).is_err());
    }
}
