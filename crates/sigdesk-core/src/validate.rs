//! Plausibility filters for extracted entity names.
//!
//! LLM extraction routinely hallucinates usernames, role words, and generic
//! corporate labels as if they were real entities. These filters are kept as
//! data-driven pattern tables so the reject rules can be extended and tested
//! without touching control flow.

use regex::Regex;

/// Reject patterns for extracted person names. A name matching ANY of these
/// is discarded.
const PERSON_REJECT_PATTERNS: &[&str] = &[
    r"(?i)^[a-z_]+$",                                  // all lowercase / underscores (usernames)
    r"\d",                                             // contains a digit
    r"[_@#$%^&*()]",                                   // special characters
    r"(?i)^(user|developer|founder|maker|admin|test)$", // bare generic roles
    r"(?i)^(john|jane)\s+(doe|smith)$",                // common placeholder names
    r"(?i)^[a-z]+[0-9]+$",                             // username patterns like user123
    r"^@",                                             // handles
    r"(?i)^(redacted|unknown|anonymous)$",             // placeholder identities
];

/// Reject patterns for extracted company names. Generic corporate labels the
/// model invents when no real company is present.
const COMPANY_REJECT_PATTERNS: &[&str] = &[
    r"(?i)company$",
    r"(?i)corporation$",
    r"(?i)inc\.?$",
    r"(?i)ltd\.?$",
    r"(?i)llc$",
    r"(?i)^the .+ company$",
    r"(?i)^.+ compiler$",
    r"(?i)^.+ trust$",
    r"(?i)^generic",
    r"(?i)^example",
    r"(?i)^sample",
    r"(?i)^test",
    r"(?i)^fake",
    r"(?i)^placeholder",
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
}

/// Returns `true` when `name` looks like a real person name.
///
/// A name is valid iff it is 3..=50 characters, contains a space splitting it
/// into at least two parts, matches none of the reject patterns, and every
/// part is two or more letters starting with an uppercase letter.
#[must_use]
pub fn is_valid_person_name(name: &str) -> bool {
    let trimmed = name.trim();

    let len = trimmed.chars().count();
    if !(3..=50).contains(&len) {
        return false;
    }
    if !trimmed.contains(' ') {
        return false;
    }
    if compile(PERSON_REJECT_PATTERNS)
        .iter()
        .any(|re| re.is_match(trimmed))
    {
        return false;
    }

    let parts: Vec<&str> = trimmed.split(' ').filter(|p| !p.is_empty()).collect();
    if parts.len() < 2 {
        return false;
    }

    parts.iter().all(|part| {
        part.chars().count() >= 2
            && part.chars().all(char::is_alphabetic)
            && part.chars().next().is_some_and(char::is_uppercase)
    })
}

/// Returns `true` when an extracted company name should be treated as fake
/// or generic and dropped.
///
/// `candidate_title` is the title of the item the company was extracted from;
/// a "company" that is just the product's own name is rejected too.
#[must_use]
pub fn is_fake_company_name(name: &str, candidate_title: &str) -> bool {
    let trimmed = name.trim();

    if trimmed.chars().count() < 2 {
        return true;
    }
    if trimmed.eq_ignore_ascii_case(candidate_title.trim()) {
        return true;
    }
    compile(COMPANY_REJECT_PATTERNS)
        .iter()
        .any(|re| re.is_match(trimmed))
}
