//! Pharmaceutical product fragments
//!
//! Section titles are matched against a keyword table; a section body goes to
//! every field whose row matches its title. Identity fields come from the
//! reference table when it knows the product, otherwise from a `Brand (generic)`
//! title.

use super::lists::extract_list_items;
use super::reference::ReferenceDataset;
use super::types::PharmaProduct;
use crate::output::{ContentSection, Link, PageMetadata, UNKNOWN_TITLE};
use regex::Regex;
use std::sync::LazyLock;

static BRAND_GENERIC_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<brand>[A-Z][A-Za-z0-9-]+)\s*[®™]?\s*\((?P<generic>[a-z][a-z0-9 -]*[a-z0-9])\)")
        .expect("valid brand/generic title regex")
});

// "available as", "supplied in", "comes as" up to the end of the sentence
static AVAILABILITY_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:available|supplied|comes|provided)\s+(?:as|in)\b(?P<clause>(?:\d\.\d|[^.;!?])*)")
        .expect("valid availability clause regex")
});

static DOSAGE_FORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:(?P<modifier>oral|chewable|extended-release|delayed-release|film-coated|orally disintegrating|prefilled|single-dose|subcutaneous|intravenous|topical)\s+)?(?P<form>tablet|capsule|injection|infusion|solution|suspension|syrup|cream|ointment|gel|patch|inhaler|spray|powder|pen|vial)s?\b",
    )
    .expect("valid dosage form regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PharmaField {
    Contraindications,
    SideEffects,
    Interactions,
    Warnings,
    Administration,
    Mechanism,
    ClinicalTrials,
    PatientResources,
    Storage,
    Indications,
}

/// Section-title keywords per field
///
/// "contraindication" contains "indication", so a title matching the
/// contraindications row never also feeds indications.
const FIELD_KEYWORDS: &[(PharmaField, &[&str])] = &[
    (PharmaField::Contraindications, &["contraindication"]),
    (PharmaField::SideEffects, &["side effect", "adverse", "safety"]),
    (PharmaField::Interactions, &["interaction"]),
    (PharmaField::Warnings, &["warning", "precaution"]),
    (PharmaField::Administration, &["dosage", "dose", "dosing", "administration"]),
    (PharmaField::Mechanism, &["mechanism", "how it works"]),
    (PharmaField::ClinicalTrials, &["clinical", "trial", "study", "studies"]),
    (PharmaField::PatientResources, &["patient", "resource", "support"]),
    (PharmaField::Storage, &["storage", "how to store"]),
    (PharmaField::Indications, &["indication", "use", "treat"]),
];

const PACKAGE_INSERT_MARKERS: &[&str] = &[
    "prescribing information",
    "prescribing-information",
    "prescribing_information",
    "package insert",
    "package-insert",
    "medication guide",
];

fn classify_section(title: &str) -> Vec<PharmaField> {
    let title = title.to_lowercase();
    let fields: Vec<PharmaField> = FIELD_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| title.contains(k)))
        .map(|(field, _)| *field)
        .collect();

    if fields.contains(&PharmaField::Contraindications) {
        fields
            .into_iter()
            .filter(|field| *field != PharmaField::Indications)
            .collect()
    } else {
        fields
    }
}

/// Builds the pharma fragment for one page
pub(crate) fn extract_pharma(
    metadata: &PageMetadata,
    sections: &[ContentSection],
    links: &[Link],
    reference: &ReferenceDataset,
) -> PharmaProduct {
    let mut product = PharmaProduct {
        source_urls: vec![metadata.source_url.clone()],
        ..Default::default()
    };

    seed_identity(&mut product, metadata, reference);

    for section in sections {
        let body = section.body.trim();
        if body.is_empty() {
            continue;
        }

        for field in classify_section(&section.title) {
            match field {
                PharmaField::Administration => {
                    set_richer(&mut product.administration, body);
                    for form in dosage_forms(body) {
                        push_unique(&mut product.dosage_forms, form);
                    }
                }
                PharmaField::Mechanism => set_richer(&mut product.mechanism_of_action, body),
                PharmaField::Storage => set_richer(&mut product.storage, body),
                PharmaField::Contraindications => {
                    extend_unique(&mut product.contraindications, body)
                }
                PharmaField::SideEffects => extend_unique(&mut product.side_effects, body),
                PharmaField::Interactions => extend_unique(&mut product.interactions, body),
                PharmaField::Warnings => extend_unique(&mut product.warnings, body),
                PharmaField::ClinicalTrials => extend_unique(&mut product.clinical_trials, body),
                PharmaField::PatientResources => {
                    extend_unique(&mut product.patient_resources, body)
                }
                PharmaField::Indications => extend_unique(&mut product.indications, body),
            }
        }
    }

    product.package_insert_url = links
        .iter()
        .find(|link| {
            let haystack = format!("{} {}", link.text, link.url).to_lowercase();
            PACKAGE_INSERT_MARKERS.iter().any(|m| haystack.contains(m))
        })
        .map(|link| link.url.clone());

    product
}

/// Reference values first; a `Brand (generic)` title only when the table had nothing
fn seed_identity(product: &mut PharmaProduct, metadata: &PageMetadata, reference: &ReferenceDataset) {
    let title = if metadata.title == UNKNOWN_TITLE {
        ""
    } else {
        metadata.title.as_str()
    };

    if let Some(found) = reference.lookup(&metadata.source_url, title) {
        tracing::debug!(
            "Reference match for {}: {} ({})",
            metadata.source_url,
            found.brand_name,
            found.generic_name
        );
        product.brand_name = Some(found.brand_name.clone());
        product.generic_name = Some(found.generic_name.clone());
        product.drug_class = Some(found.category.clone());
        return;
    }

    if let Some(caps) = BRAND_GENERIC_TITLE.captures(title) {
        product.brand_name = Some(caps["brand"].to_string());
        product.generic_name = Some(caps["generic"].trim().to_string());
    }
}

/// Dosage forms named in availability clauses, lowercased and singular
fn dosage_forms(body: &str) -> Vec<String> {
    let mut forms = Vec::new();
    for clause in AVAILABILITY_CLAUSE.captures_iter(body) {
        for caps in DOSAGE_FORM.captures_iter(&clause["clause"]) {
            let form = caps["form"].to_lowercase();
            let form = match caps.name("modifier") {
                Some(modifier) => format!("{} {}", modifier.as_str().to_lowercase(), form),
                None => form,
            };
            push_unique(&mut forms, form);
        }
    }
    forms
}

fn set_richer(slot: &mut Option<String>, value: &str) {
    let longer = slot
        .as_deref()
        .map_or(true, |current| value.chars().count() > current.chars().count());
    if longer {
        *slot = Some(value.to_string());
    }
}

fn extend_unique(list: &mut Vec<String>, body: &str) {
    for item in extract_list_items(body) {
        push_unique(list, item);
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}
