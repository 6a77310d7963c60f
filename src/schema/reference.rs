//! Read-only reference table of known products
//!
//! Reference values seed the identity fields of a pharma fragment before any
//! page heuristics run.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Identity of a known product
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductReference {
    #[serde(rename = "brand-name")]
    pub brand_name: String,
    #[serde(rename = "generic-name")]
    pub generic_name: String,
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct ProductEntry {
    name: String,
    #[serde(flatten)]
    reference: ProductReference,
}

#[derive(Debug, Deserialize)]
struct ReferenceFile {
    #[serde(default)]
    product: Vec<ProductEntry>,
}

/// Product reference data keyed by lowercase canonical name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceDataset {
    products: BTreeMap<String, ProductReference>,
}

impl ReferenceDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the TOML reference format (repeated `[[product]]` tables)
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: ReferenceFile = toml::from_str(content)?;
        let mut dataset = Self::new();
        for entry in file.product {
            dataset.insert(&entry.name, entry.reference);
        }
        Ok(dataset)
    }

    /// Adds or replaces a product under its canonical name
    pub fn insert(&mut self, name: &str, reference: ProductReference) {
        self.products
            .insert(name.trim().to_lowercase(), reference);
    }

    /// Looks up a product by canonical name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&ProductReference> {
        self.products.get(&name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Finds the product a page is about
    ///
    /// A product matches when its canonical, brand or generic name appears in
    /// the lowercased URL or title. The longest matching name wins; ties go to
    /// the alphabetically first canonical name.
    pub fn lookup(&self, url: &str, title: &str) -> Option<&ProductReference> {
        let haystacks = [url.to_lowercase(), title.to_lowercase()];

        let mut best: Option<(usize, &ProductReference)> = None;
        for (key, reference) in &self.products {
            let names = [
                key.clone(),
                reference.brand_name.to_lowercase(),
                reference.generic_name.to_lowercase(),
            ];

            for name in names.iter().filter(|n| !n.is_empty()) {
                if haystacks.iter().any(|h| h.contains(name.as_str()))
                    && best.map_or(true, |(len, _)| name.len() > len)
                {
                    best = Some((name.len(), reference));
                }
            }
        }

        best.map(|(_, reference)| reference)
    }
}
