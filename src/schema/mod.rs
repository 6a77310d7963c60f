//! Domain schema derivation
//!
//! Each crawled page may yield a [`SchemaFragment`]; the crawl folds them into
//! one [`CompositeSchema`] with a [`SchemaMerger`]. Extraction is keyword and
//! regex driven and best-effort: absent matches leave fields empty and never
//! produce errors.

mod lists;
mod merge;
mod pharma;
mod reference;
mod trial;
mod types;

pub use lists::extract_list_items;
pub use merge::{merge_fragments, SchemaMerger};
pub use reference::{ProductReference, ReferenceDataset};
pub use types::{ClinicalTrial, CompositeSchema, PharmaProduct, SchemaFragment, SchemaType};

use crate::output::{ContentSection, Link, PageMetadata};
use std::sync::Arc;

/// Derives schema fragments from extracted pages
#[derive(Debug, Clone)]
pub struct SchemaExtractor {
    schema_type: SchemaType,
    reference: Arc<ReferenceDataset>,
}

impl SchemaExtractor {
    pub fn new(schema_type: SchemaType, reference: Arc<ReferenceDataset>) -> Self {
        Self {
            schema_type,
            reference,
        }
    }

    pub fn schema_type(&self) -> SchemaType {
        self.schema_type
    }

    /// Builds the fragment for one page; None when no schema is configured
    pub fn extract_fragment(
        &self,
        metadata: &PageMetadata,
        sections: &[ContentSection],
        links: &[Link],
    ) -> Option<SchemaFragment> {
        match self.schema_type {
            SchemaType::None => None,
            SchemaType::PharmaProduct => Some(SchemaFragment::PharmaProduct(
                pharma::extract_pharma(metadata, sections, links, &self.reference),
            )),
            SchemaType::ClinicalTrial => Some(SchemaFragment::ClinicalTrial(
                trial::extract_trial(metadata, sections),
            )),
        }
    }
}
