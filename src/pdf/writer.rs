//! Indirect object table, xref, and trailer assembly (spec §4.I), grounded
//! on the teacher's `pdf::mod`/`pdf::convert` reserve-then-fill protocol for
//! forward references (a page can reference its own not-yet-built
//! `/Resources` dictionary, etc.).

use crate::errors::ExportError;
use crate::pdf::object::{Dictionary, Object, ObjectId};
use std::io::Write;

#[derive(Default)]
pub struct PdfWriter {
    objects: Vec<Option<Object>>,
}

impl PdfWriter {
    pub fn new() -> Self {
        PdfWriter::default()
    }

    /// Reserves the next id without a value yet, for objects that need to
    /// reference each other before either is fully built.
    pub fn reserve(&mut self) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32 + 1);
        self.objects.push(None);
        id
    }

    pub fn fill(&mut self, id: ObjectId, object: Object) {
        let index = (id.0 - 1) as usize;
        self.objects[index] = Some(object);
    }

    /// Reserves and immediately fills in one step — the common case.
    pub fn add(&mut self, object: Object) -> ObjectId {
        let id = self.reserve();
        self.fill(id, object);
        id
    }

    /// Assembles the complete PDF byte stream: header, objects, xref table,
    /// trailer (spec §4.I). Fails with `InvalidObjectReference` if any
    /// reserved id was never filled.
    pub fn generate(&self, root: ObjectId, info: Option<ObjectId>) -> Result<Vec<u8>, ExportError> {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");

        let mut offsets = vec![0u64; self.objects.len() + 1];
        for (i, object) in self.objects.iter().enumerate() {
            let id = (i + 1) as u32;
            let object = object.as_ref().ok_or(ExportError::InvalidObjectReference(id))?;
            offsets[i + 1] = out.len() as u64;
            write!(out, "{id} 0 obj\n").unwrap();
            object.write(&mut out).map_err(|e| ExportError::Layout(e.to_string()))?;
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len() as u64;
        out.extend_from_slice(b"xref\n");
        write!(out, "0 {}\n", self.objects.len() + 1).unwrap();
        out.extend_from_slice(b"0000000000 65535 f \n");
        for &offset in &offsets[1..] {
            write!(out, "{offset:010} 00000 n \n").unwrap();
        }

        out.extend_from_slice(b"trailer\n");
        let mut trailer: Dictionary = vec![
            ("Size".to_string(), Object::Int(self.objects.len() as i64 + 1)),
            ("Root".to_string(), Object::Reference(root)),
        ];
        if let Some(info) = info {
            trailer.push(("Info".to_string(), Object::Reference(info)));
        }
        Object::Dictionary(trailer).write(&mut out).map_err(|e| ExportError::Layout(e.to_string()))?;
        write!(out, "\nstartxref\n{xref_offset}\n%%EOF").unwrap();

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_well_formed_header_and_footer() {
        let mut writer = PdfWriter::new();
        let catalog = writer.add(Object::Dictionary(vec![("Type".to_string(), Object::Name("Catalog".to_string()))]));
        let bytes = writer.generate(catalog, None).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("1 0 obj"));
        assert!(text.contains("xref"));
    }

    #[test]
    fn unfilled_reservation_is_invalid_object_reference() {
        let mut writer = PdfWriter::new();
        let reserved = writer.reserve();
        let err = writer.generate(reserved, None).unwrap_err();
        assert!(matches!(err, ExportError::InvalidObjectReference(1)));
    }
}
