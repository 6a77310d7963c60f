//! Clinical-trial fragments
//!
//! Scalars come from regexes over the page text. List fields come from section
//! titles and the shared list heuristic.

use super::lists::extract_list_items;
use super::types::ClinicalTrial;
use crate::output::{ContentSection, PageMetadata, UNKNOWN_TITLE};
use regex::Regex;
use std::sync::LazyLock;

static NCT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bNCT\d{8}\b").expect("valid NCT id regex"));

static PHASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bphase\s+(?P<first>IV|III|II|I|[1-4][ab]?)(?:\s*/\s*(?P<second>IV|III|II|I|[1-4][ab]?))?\b",
    )
    .expect("valid phase regex")
});

/// Longest phrases first so "Not yet recruiting" is not read as "Recruiting"
const STATUS_VOCABULARY: &[&str] = &[
    "Active, not recruiting",
    "Enrolling by invitation",
    "Not yet recruiting",
    "Recruiting",
    "Completed",
    "Terminated",
    "Suspended",
    "Withdrawn",
];

static STATUS: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = STATUS_VOCABULARY
        .iter()
        .map(|status| regex::escape(status))
        .collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
        .expect("valid status regex")
});

static LABELED_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^\s*(?:-\s+)?(?P<label>study start(?: date)?|start date|primary completion date|study completion(?: date)?|completion date|actual enrollment|estimated enrollment|enrollment|lead sponsor|sponsor)\s*:\s*(?P<value>.+?)\s*$",
    )
    .expect("valid labeled value regex")
});

static ENROLLMENT_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*").expect("valid enrollment regex"));

const SUMMARY_KEYWORDS: &[&str] = &["summary", "purpose", "overview", "description"];
const CONDITION_KEYWORDS: &[&str] = &["condition", "disease"];
const INTERVENTION_KEYWORDS: &[&str] = &["intervention", "treatment", "study arm"];
const ELIGIBILITY_KEYWORDS: &[&str] = &["eligibility", "inclusion", "exclusion", "criteria"];

/// Builds the clinical-trial fragment for one page
pub(crate) fn extract_trial(metadata: &PageMetadata, sections: &[ContentSection]) -> ClinicalTrial {
    let mut trial = ClinicalTrial {
        source_urls: vec![metadata.source_url.clone()],
        ..Default::default()
    };

    if metadata.title != UNKNOWN_TITLE && !metadata.title.trim().is_empty() {
        trial.title = Some(metadata.title.clone());
    }

    let text = page_text(metadata, sections);

    trial.nct_id = NCT_ID.find(&text).map(|m| m.as_str().to_string());
    trial.phase = PHASE.captures(&text).map(|caps| {
        let first = normalize_phase(&caps["first"]);
        match caps.name("second") {
            Some(second) => format!("Phase {}/{}", first, normalize_phase(second.as_str())),
            None => format!("Phase {}", first),
        }
    });
    trial.status = STATUS.find(&text).and_then(|m| canonical_status(m.as_str()));

    for caps in LABELED_VALUE.captures_iter(&text) {
        let label = caps["label"].to_lowercase();
        let value = caps["value"].trim().to_string();

        let slot = if label.contains("start") {
            &mut trial.start_date
        } else if label.contains("completion") {
            &mut trial.completion_date
        } else if label.contains("enrollment") {
            &mut trial.enrollment
        } else {
            &mut trial.sponsor
        };

        if slot.is_some() {
            continue;
        }

        *slot = if label.contains("enrollment") {
            ENROLLMENT_COUNT
                .find(&value)
                .map(|m| m.as_str().replace(',', ""))
        } else {
            Some(value)
        };
    }

    for section in sections {
        let title = section.title.to_lowercase();
        let matches = |keywords: &[&str]| keywords.iter().any(|k| title.contains(k));

        if matches(SUMMARY_KEYWORDS) {
            let body = section.body.trim();
            let longer = trial
                .brief_summary
                .as_deref()
                .map_or(true, |current| body.chars().count() > current.chars().count());
            if !body.is_empty() && longer {
                trial.brief_summary = Some(body.to_string());
            }
        } else if matches(ELIGIBILITY_KEYWORDS) {
            extend_unique(&mut trial.eligibility_criteria, &section.body);
        } else if matches(CONDITION_KEYWORDS) {
            extend_unique(&mut trial.conditions, &section.body);
        } else if matches(INTERVENTION_KEYWORDS) {
            extend_unique(&mut trial.interventions, &section.body);
        }
    }

    if trial.brief_summary.is_none() {
        trial.brief_summary = metadata
            .description
            .as_ref()
            .filter(|d| !d.trim().is_empty())
            .cloned();
    }

    trial
}

fn page_text(metadata: &PageMetadata, sections: &[ContentSection]) -> String {
    let mut text = String::new();
    text.push_str(&metadata.title);
    text.push('\n');
    if let Some(description) = &metadata.description {
        text.push_str(description);
        text.push('\n');
    }
    for section in sections {
        text.push_str(&section.title);
        text.push('\n');
        text.push_str(&section.body);
        text.push('\n');
    }
    text
}

/// Roman numerals to digits; suffix letters lowercased
fn normalize_phase(raw: &str) -> String {
    match raw.to_ascii_uppercase().as_str() {
        "I" => "1".to_string(),
        "II" => "2".to_string(),
        "III" => "3".to_string(),
        "IV" => "4".to_string(),
        _ => raw.to_ascii_lowercase(),
    }
}

fn canonical_status(found: &str) -> Option<String> {
    STATUS_VOCABULARY
        .iter()
        .find(|status| status.eq_ignore_ascii_case(found))
        .map(|status| status.to_string())
}

fn extend_unique(list: &mut Vec<String>, body: &str) {
    for item in extract_list_items(body) {
        if !list.contains(&item) {
            list.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn metadata(title: &str) -> PageMetadata {
        PageMetadata {
            title: title.to_string(),
            description: Some("A study of a new therapy.".to_string()),
            author: None,
            published_date: None,
            source_url: "https://trials.example.com/study".to_string(),
            crawled_at: Utc::now(),
        }
    }

    fn section(title: &str, body: &str) -> ContentSection {
        ContentSection {
            title: title.to_string(),
            level: 2,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_nct_and_phase() {
        let sections = vec![section(
            "Overview",
            "Trial NCT12345678 is a Phase 3 randomized study.",
        )];
        let trial = extract_trial(&metadata("Study"), &sections);
        assert_eq!(trial.nct_id.as_deref(), Some("NCT12345678"));
        assert_eq!(trial.phase.as_deref(), Some("Phase 3"));
    }

    #[test]
    fn test_nct_requires_eight_digits() {
        let sections = vec![section("Info", "Ids NCT1234567 and NCT123456789 are invalid.")];
        let trial = extract_trial(&metadata("Study"), &sections);
        assert!(trial.nct_id.is_none());
    }

    #[test]
    fn test_phase_variants() {
        let cases = [
            ("a phase II trial", "Phase 2"),
            ("Phase IV follow-up", "Phase 4"),
            ("Phase 1b dose escalation", "Phase 1b"),
            ("Phase 2/3 seamless design", "Phase 2/3"),
            ("phase III", "Phase 3"),
        ];
        for (text, expected) in cases {
            let trial = extract_trial(&metadata("Study"), &[section("Design", text)]);
            assert_eq!(trial.phase.as_deref(), Some(expected), "input: {}", text);
        }
    }

    #[test]
    fn test_phase_not_matched_in_words() {
        let trial = extract_trial(
            &metadata("Study"),
            &[section("Design", "The first phase involves screening.")],
        );
        assert!(trial.phase.is_none());
    }

    #[test]
    fn test_status_vocabulary() {
        let trial = extract_trial(
            &metadata("Study"),
            &[section("Status", "This study is not yet recruiting participants.")],
        );
        assert_eq!(trial.status.as_deref(), Some("Not yet recruiting"));

        let trial = extract_trial(&metadata("Study"), &[section("Status", "COMPLETED")]);
        assert_eq!(trial.status.as_deref(), Some("Completed"));
    }

    #[test]
    fn test_labeled_fields() {
        let body = "Start Date: January 2021\n\
                    Primary Completion Date: June 2024\n\
                    Enrollment: 1,200 participants\n\
                    Sponsor: Example Pharma Inc.";
        let trial = extract_trial(&metadata("Study"), &[section("Details", body)]);
        assert_eq!(trial.start_date.as_deref(), Some("January 2021"));
        assert_eq!(trial.completion_date.as_deref(), Some("June 2024"));
        assert_eq!(trial.enrollment.as_deref(), Some("1200"));
        assert_eq!(trial.sponsor.as_deref(), Some("Example Pharma Inc."));
    }

    #[test]
    fn test_labeled_fields_in_list_items() {
        let body = "- Lead Sponsor: Acme Bio\n- Start Date: 2022-03-01";
        let trial = extract_trial(&metadata("Study"), &[section("Details", body)]);
        assert_eq!(trial.sponsor.as_deref(), Some("Acme Bio"));
        assert_eq!(trial.start_date.as_deref(), Some("2022-03-01"));
    }

    #[test]
    fn test_list_fields_and_summary() {
        let sections = vec![
            section("Brief Summary", "Tests whether drug X improves outcomes."),
            section("Conditions", "- Type 2 Diabetes\n- Obesity"),
            section("Interventions", "- Drug: X\n- Drug: Placebo"),
            section("Eligibility Criteria", "- Age 18 or older\n- BMI over 30"),
        ];
        let trial = extract_trial(&metadata("Study of X"), &sections);
        assert_eq!(trial.title.as_deref(), Some("Study of X"));
        assert_eq!(
            trial.brief_summary.as_deref(),
            Some("Tests whether drug X improves outcomes.")
        );
        assert_eq!(trial.conditions, vec!["Type 2 Diabetes", "Obesity"]);
        assert_eq!(trial.interventions, vec!["Drug: X", "Drug: Placebo"]);
        assert_eq!(trial.eligibility_criteria, vec!["Age 18 or older", "BMI over 30"]);
    }

    #[test]
    fn test_summary_falls_back_to_description() {
        let trial = extract_trial(&metadata("Study"), &[]);
        assert_eq!(trial.brief_summary.as_deref(), Some("A study of a new therapy."));
        assert_eq!(trial.source_urls, vec!["https://trials.example.com/study"]);
    }

    #[test]
    fn test_unknown_title_not_used() {
        let trial = extract_trial(&metadata(UNKNOWN_TITLE), &[]);
        assert!(trial.title.is_none());
    }
}
