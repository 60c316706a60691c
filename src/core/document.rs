use super::byte_reader::ByteReader;
use super::error::PDFResult;
use super::object::{ChangeNotifier, PDFDict, PDFObject, parse_indirect_at};
use super::object_index::{ObjectIndex, ObjectResolver};
use super::resources::ResourceDict;
use log::warn;

/// Owner of one parsed document: the byte buffer, the object index and the
/// edit-notification channel every materialized dict is attached to.
///
/// The annotation tooling above this layer consumes objects; this facade
/// only opens the file, resolves lookups and reports the revision counter so
/// dependent caches know when to rebuild.
pub struct DocumentData {
    index: ObjectIndex,
    notifier: ChangeNotifier,
}

impl DocumentData {
    /// Opens a document from its complete byte content.
    pub fn open(data: Vec<u8>) -> PDFResult<Self> {
        let reader = ByteReader::new(data)?;
        let index = ObjectIndex::parse(reader)?;
        Ok(DocumentData {
            index,
            notifier: ChangeNotifier::new(),
        })
    }

    pub fn index(&self) -> &ObjectIndex {
        &self.index
    }

    /// The channel edits bubble through. Clone it to attach further dicts.
    pub fn notifier(&self) -> ChangeNotifier {
        self.notifier.clone()
    }

    /// Bumps with every tracked edit anywhere in the tree.
    pub fn revision(&self) -> u64 {
        self.notifier.revision()
    }

    pub fn trailer(&self) -> Option<&PDFDict> {
        self.index.trailer()
    }

    /// Materializes the indirect object `id`. Dict-shaped results come back
    /// attached to this document's notification channel.
    pub fn object(&self, id: u32) -> Option<PDFObject> {
        let offset = self.index.offset_of(id)?;
        let (object_id, mut parsed) =
            parse_indirect_at(self.index.parser(), offset, Some(&self.index))?;
        if object_id.id != id {
            warn!(
                "object {} found at offset {} instead of {}",
                object_id.id, offset, id
            );
        }
        match &mut parsed.value {
            PDFObject::Dict(d) => d.attach(self.notifier.clone(), None),
            PDFObject::Stream(s) => s.dict.attach(self.notifier.clone(), None),
            _ => {}
        }
        Some(parsed.value)
    }

    /// The document catalog behind the trailer's `/Root`.
    pub fn catalog(&self) -> Option<PDFDict> {
        let root = self.trailer()?.get_ref("/Root")?;
        match self.object(root.id)? {
            PDFObject::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Typed view of a page dict's `/Resources`, inline or indirect, with
    /// the resolved maps filled through this document's index.
    pub fn resources(&self, page: &PDFDict) -> Option<ResourceDict> {
        let mut resources = match page.get("/Resources")? {
            PDFObject::Dict(d) => ResourceDict::from_dict(d, Some(&self.index))?,
            PDFObject::Ref(id) => {
                let info = self.index.resolve(id.id)?;
                let (cs, ce) = info.bounds.content()?;
                let mut dict =
                    PDFDict::parse_content(&info.parser, cs, ce, Some(&self.index))?;
                dict.set_object_id(Some(info.id));
                ResourceDict::from_dict(&dict, Some(&self.index))?
            }
            _ => return None,
        };
        resources.fill_maps(&self.index);
        resources.attach(self.notifier.clone());
        Some(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::object::{ObjectId, PDFObject};

    /// A two-page-less document: catalog, page, resources and one graphics
    /// state, indexed by a traditional xref table.
    fn sample_pdf() -> Vec<u8> {
        let mut out = b"%PDF-1.7\n".to_vec();
        let mut offsets = Vec::new();
        for body in [
            "<< /Type /Catalog /Pages 2 0 R >>",
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>",
            "<< /Type /Page /Parent 2 0 R /Resources 4 0 R >>",
            "<< /ExtGState << /GS1 5 0 R >> /ProcSet [/PDF] >>",
            "<< /Type /ExtGState /CA 0.5 /BM /Multiply >>",
        ] {
            offsets.push(out.len());
            out.extend_from_slice(
                format!("{} 0 obj\n{}\nendobj\n", offsets.len(), body).as_bytes(),
            );
        }
        let startxref = out.len();
        let mut table = String::from("xref\n0 6\n0000000000 65535 f \n");
        for offset in &offsets {
            table.push_str(&format!("{:010} 00000 n \n", offset));
        }
        table.push_str(&format!(
            "trailer\n<< /Size 6 /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            startxref
        ));
        out.extend_from_slice(table.as_bytes());
        out
    }

    #[test]
    fn test_open_and_catalog() {
        let doc = DocumentData::open(sample_pdf()).unwrap();
        assert_eq!(doc.trailer().unwrap().get_number("/Size"), Some(6.0));

        let catalog = doc.catalog().unwrap();
        assert_eq!(catalog.get_name("/Type"), Some("/Catalog"));
        assert_eq!(catalog.object_id(), Some(ObjectId::new(1, 0)));
    }

    #[test]
    fn test_object_lookup() {
        let doc = DocumentData::open(sample_pdf()).unwrap();
        let pages = doc.object(2).unwrap();
        let dict = pages.as_dict().unwrap();
        assert_eq!(dict.get_number("/Count"), Some(1.0));
        assert!(doc.object(77).is_none());
    }

    #[test]
    fn test_resources_resolved_through_index() {
        let doc = DocumentData::open(sample_pdf()).unwrap();
        let page = match doc.object(3).unwrap() {
            PDFObject::Dict(d) => d,
            other => panic!("expected page dict, got {:?}", other),
        };

        let resources = doc.resources(&page).unwrap();
        let gs = resources.get_graphics_state("/GS1").unwrap();
        assert_eq!(gs.stroke_alpha, Some(0.5));
        assert_eq!(gs.blend_mode.as_deref(), Some("/Multiply"));
        assert_eq!(gs.object_id(), Some(ObjectId::new(5, 0)));
        assert_eq!(resources.proc_set.as_deref(), Some(&["/PDF".to_string()][..]));
    }

    #[test]
    fn test_edits_bump_document_revision() {
        let doc = DocumentData::open(sample_pdf()).unwrap();
        assert_eq!(doc.revision(), 0);

        let mut catalog = doc.catalog().unwrap();
        catalog.set("/Lang", PDFObject::StringLit(b"en".to_vec()));
        assert_eq!(doc.revision(), 1);
        assert!(catalog.edited());
    }
}
