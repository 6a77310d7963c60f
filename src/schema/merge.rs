//! Folding per-page fragments into one composite record
//!
//! Three kinds of field:
//! - lists: exact-string union, first-seen order
//! - identity and identifier scalars: first non-empty value wins
//! - descriptive scalars: a strictly longer non-empty value replaces the current one
//!
//! URL scalars are first-wins. Folding the same fragment twice is a no-op.

use super::types::{ClinicalTrial, CompositeSchema, PharmaProduct, SchemaFragment};

/// Incremental merger, fed in arrival order
#[derive(Debug, Default)]
pub struct SchemaMerger {
    accumulator: Option<SchemaFragment>,
    fragment_count: usize,
}

impl SchemaMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one fragment into the accumulator
    ///
    /// Returns false when the fragment was ignored because its schema type
    /// differs from the fragments already folded.
    pub fn fold(&mut self, fragment: SchemaFragment) -> bool {
        let accumulator = self.accumulator.get_or_insert_with(|| match &fragment {
            SchemaFragment::PharmaProduct(_) => SchemaFragment::PharmaProduct(PharmaProduct::default()),
            SchemaFragment::ClinicalTrial(_) => SchemaFragment::ClinicalTrial(ClinicalTrial::default()),
        });

        match (accumulator, fragment) {
            (SchemaFragment::PharmaProduct(current), SchemaFragment::PharmaProduct(incoming)) => {
                merge_pharma(current, incoming)
            }
            (SchemaFragment::ClinicalTrial(current), SchemaFragment::ClinicalTrial(incoming)) => {
                merge_trial(current, incoming)
            }
            (current, incoming) => {
                tracing::warn!(
                    "Ignoring {} fragment while merging {} fragments",
                    incoming.schema_type(),
                    current.schema_type()
                );
                return false;
            }
        }

        self.fragment_count += 1;
        true
    }

    pub fn fragment_count(&self) -> usize {
        self.fragment_count
    }

    /// Freezes the accumulator; None when nothing was folded
    pub fn finish(self) -> Option<CompositeSchema> {
        self.accumulator.map(|record| CompositeSchema {
            fragment_count: self.fragment_count,
            record,
        })
    }
}

/// Merges fragments in iteration order
pub fn merge_fragments<I>(fragments: I) -> Option<CompositeSchema>
where
    I: IntoIterator<Item = SchemaFragment>,
{
    let mut merger = SchemaMerger::new();
    for fragment in fragments {
        merger.fold(fragment);
    }
    merger.finish()
}

fn merge_pharma(current: &mut PharmaProduct, incoming: PharmaProduct) {
    first_wins(&mut current.brand_name, incoming.brand_name);
    first_wins(&mut current.generic_name, incoming.generic_name);
    first_wins(&mut current.drug_class, incoming.drug_class);
    richer_wins(&mut current.administration, incoming.administration);
    richer_wins(&mut current.mechanism_of_action, incoming.mechanism_of_action);
    richer_wins(&mut current.storage, incoming.storage);
    first_wins(&mut current.package_insert_url, incoming.package_insert_url);

    union(&mut current.indications, incoming.indications);
    union(&mut current.side_effects, incoming.side_effects);
    union(&mut current.dosage_forms, incoming.dosage_forms);
    union(&mut current.clinical_trials, incoming.clinical_trials);
    union(&mut current.patient_resources, incoming.patient_resources);
    union(&mut current.contraindications, incoming.contraindications);
    union(&mut current.warnings, incoming.warnings);
    union(&mut current.interactions, incoming.interactions);
    union(&mut current.source_urls, incoming.source_urls);
}

fn merge_trial(current: &mut ClinicalTrial, incoming: ClinicalTrial) {
    first_wins(&mut current.nct_id, incoming.nct_id);
    first_wins(&mut current.phase, incoming.phase);
    first_wins(&mut current.status, incoming.status);
    first_wins(&mut current.start_date, incoming.start_date);
    first_wins(&mut current.completion_date, incoming.completion_date);
    first_wins(&mut current.enrollment, incoming.enrollment);
    first_wins(&mut current.sponsor, incoming.sponsor);
    richer_wins(&mut current.title, incoming.title);
    richer_wins(&mut current.brief_summary, incoming.brief_summary);

    union(&mut current.conditions, incoming.conditions);
    union(&mut current.interventions, incoming.interventions);
    union(&mut current.eligibility_criteria, incoming.eligibility_criteria);
    union(&mut current.source_urls, incoming.source_urls);
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn first_wins(slot: &mut Option<String>, incoming: Option<String>) {
    if is_blank(slot) && !is_blank(&incoming) {
        *slot = incoming;
    }
}

fn richer_wins(slot: &mut Option<String>, incoming: Option<String>) {
    let Some(value) = incoming.filter(|v| !v.trim().is_empty()) else {
        return;
    };
    let current_len = slot.as_deref().map_or(0, |v| v.chars().count());
    if value.chars().count() > current_len {
        *slot = Some(value);
    }
}

fn union(list: &mut Vec<String>, incoming: Vec<String>) {
    for item in incoming {
        if !list.contains(&item) {
            list.push(item);
        }
    }
}
