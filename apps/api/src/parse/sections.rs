//! Section Segmenter — splits resume text at well-known headings.
//!
//! Detection is purely lexical: a line that *starts* with one of the heading
//! keywords (any case) opens a new section running up to the next heading or
//! the end of the text.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

/// Label of the end-of-text boundary. It closes the last section and never
/// appears as a key.
pub const END_OF_RESUME: &str = "END_OF_RESUME";

const HEADING_PATTERNS: &[&str] = &[
    "Education",
    "Experience",
    "Skills",
    "Projects?",
    "Certifications?",
    "Summary|Profile",
    "Contact",
    "Objective",
];

fn heading_regex() -> &'static Regex {
    static HEADINGS: OnceLock<Regex> = OnceLock::new();
    HEADINGS.get_or_init(|| {
        let alternatives: Vec<String> = HEADING_PATTERNS
            .iter()
            .map(|p| format!("^(?:{p})"))
            .collect();
        Regex::new(&format!("(?im){}", alternatives.join("|")))
            .expect("heading pattern is valid")
    })
}

/// Heading → section text, in order of each heading's first appearance.
///
/// A heading seen twice keeps its original position but takes the later
/// section's text; earlier content under the same heading is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionMap {
    sections: IndexMap<String, String>,
}

impl SectionMap {
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, heading: &str) -> Option<&str> {
        self.sections.get(heading).map(String::as_str)
    }

    #[cfg(test)]
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections
            .iter()
            .map(|(heading, content)| (heading.as_str(), content.as_str()))
    }

    fn insert(&mut self, heading: &str, content: &str) {
        self.sections
            .insert(heading.to_string(), content.to_string());
    }
}

/// Partitions `text` into heading-labeled sections.
///
/// Text before the first heading belongs to no section. With no headings at
/// all the map is empty.
pub fn segment(text: &str) -> SectionMap {
    let mut boundaries: Vec<(&str, usize)> = heading_regex()
        .find_iter(text)
        .map(|m| (m.as_str().trim(), m.start()))
        .collect();
    boundaries.push((END_OF_RESUME, text.len()));

    let mut sections = SectionMap::default();
    for pair in boundaries.windows(2) {
        let (heading, start) = pair[0];
        let (_, end) = pair[1];
        sections.insert(heading, text[start..end].trim());
    }
    sections
}
