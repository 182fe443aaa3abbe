//! Field-level merge rules for enriching existing profiles.
//!
//! The resolver applies these when a candidate matches a stored row: the
//! merge never discards information, it only upgrades fields where the new
//! data is meaningfully better.

use std::collections::BTreeMap;

use sigdesk_core::{CompanyCandidate, PersonCandidate};
use sigdesk_db::{CompanyRow, PersonRow};

/// Keeps the existing text unless the new text is substantially longer.
/// "Substantially" means more than 1.2x the existing length, so churn from
/// near-equivalent rewordings is avoided.
#[must_use]
pub fn choose_better_text(existing: &str, new: &str) -> String {
    if existing.is_empty() {
        return new.to_owned();
    }
    if new.is_empty() {
        return existing.to_owned();
    }
    // Length is counted in characters, not bytes, so multi-byte text is
    // judged by what a reader sees.
    #[allow(clippy::cast_precision_loss)]
    if new.chars().count() as f64 > existing.chars().count() as f64 * 1.2 {
        new.to_owned()
    } else {
        existing.to_owned()
    }
}

/// New value wins when present, otherwise the existing one is kept.
#[must_use]
pub fn prefer_new_if_present(existing: &str, new: &str) -> String {
    if new.is_empty() {
        existing.to_owned()
    } else {
        new.to_owned()
    }
}

/// Case-insensitive union preserving the existing order, new tags appended.
#[must_use]
pub fn merge_tags(existing: &[String], new: &[String]) -> Vec<String> {
    let mut combined: Vec<String> = existing.to_vec();
    for tag in new {
        let already = combined.iter().any(|t| t.eq_ignore_ascii_case(tag));
        if !already {
            combined.push(tag.clone());
        }
    }
    combined
}

/// Shallow union of link maps, new entries overwriting existing keys.
#[must_use]
pub fn merge_social_links(
    existing: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = existing.clone();
    for (key, value) in new {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Produces the merged company profile written back over an existing row.
/// The stored name is kept; everything else upgrades field by field.
#[must_use]
pub fn merge_company(existing: &CompanyRow, new: &CompanyCandidate) -> CompanyCandidate {
    CompanyCandidate {
        name: existing.name.clone(),
        description: choose_better_text(&existing.description, &new.description),
        website: prefer_new_if_present(&existing.website, &new.website),
        industry: prefer_new_if_present(&existing.industry, &new.industry),
        location: prefer_new_if_present(&existing.location, &new.location),
        employee_count: prefer_new_if_present(&existing.employee_count, &new.employee_count),
        logo_url: prefer_new_if_present(&existing.logo_url, &new.logo_url),
        founded_year: new.founded_year.or(existing.founded_year),
        tags: merge_tags(&existing.tags, &new.tags),
        social_links: merge_social_links(&existing.social_links, &new.social_links),
    }
}

/// Produces the merged person profile written back over an existing row.
#[must_use]
pub fn merge_person(existing: &PersonRow, new: &PersonCandidate) -> PersonCandidate {
    PersonCandidate {
        name: existing.name.clone(),
        title: choose_better_text(&existing.title, &new.title),
        bio: choose_better_text(&existing.bio, &new.bio),
        email: prefer_new_if_present(&existing.email, &new.email),
        avatar_url: prefer_new_if_present(&existing.avatar_url, &new.avatar_url),
        company_id: new.company_id.or(existing.company_id),
        company_name: prefer_new_if_present(&existing.company_name, &new.company_name),
        tags: merge_tags(&existing.tags, &new.tags),
        social_links: merge_social_links(&existing.social_links, &new.social_links),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn better_text_requires_a_real_length_jump() {
        assert_eq!(choose_better_text("", "fresh"), "fresh");
        assert_eq!(choose_better_text("kept", ""), "kept");
        // 20% longer is not enough, it must be strictly more.
        assert_eq!(choose_better_text("aaaaaaaaaa", "bbbbbbbbbbbb"), "aaaaaaaaaa");
        assert_eq!(
            choose_better_text("short", "a much longer description"),
            "a much longer description"
        );
    }

    #[test]
    fn better_text_counts_characters_not_bytes() {
        // Ten chars of multi-byte text against twelve ascii chars: a 20%
        // jump in characters, which is not enough to replace.
        assert_eq!(choose_better_text("éééééééééé", "aaaaaaaaaaaa"), "éééééééééé");
        // Thirteen multi-byte chars over ten ascii chars clears the bar.
        assert_eq!(choose_better_text("aaaaaaaaaa", "ééééééééééééé"), "ééééééééééééé");
    }

    #[test]
    fn tags_union_is_case_insensitive_and_keeps_order() {
        let merged = merge_tags(
            &["AI".to_owned(), "devtools".to_owned()],
            &["ai".to_owned(), "rust".to_owned()],
        );
        assert_eq!(merged, vec!["AI", "devtools", "rust"]);
    }

    #[test]
    fn social_links_prefer_the_new_value_per_key() {
        let existing = BTreeMap::from([
            ("twitter".to_owned(), "old".to_owned()),
            ("github".to_owned(), "kept".to_owned()),
        ]);
        let new = BTreeMap::from([("twitter".to_owned(), "new".to_owned())]);
        let merged = merge_social_links(&existing, &new);
        assert_eq!(merged["twitter"], "new");
        assert_eq!(merged["github"], "kept");
    }

    #[test]
    fn merge_is_monotone_nothing_present_is_lost() {
        let existing = CompanyRow {
            id: uuid::Uuid::new_v4(),
            name: "Acme".to_owned(),
            description: "A long and detailed description of Acme".to_owned(),
            website: "https://acme.com".to_owned(),
            industry: "Tooling".to_owned(),
            location: String::new(),
            employee_count: String::new(),
            founded_year: Some(2019),
            logo_url: String::new(),
            tags: vec!["devtools".to_owned()],
            social_links: sqlx::types::Json(BTreeMap::from([(
                "github".to_owned(),
                "acme".to_owned(),
            )])),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let new = CompanyCandidate {
            name: "ACME".to_owned(),
            description: "Short".to_owned(),
            location: "Berlin".to_owned(),
            tags: vec!["rust".to_owned()],
            ..CompanyCandidate::default()
        };

        let merged = merge_company(&existing, &new);

        assert_eq!(merged.name, "Acme");
        assert_eq!(merged.description, "A long and detailed description of Acme");
        assert_eq!(merged.website, "https://acme.com");
        assert_eq!(merged.location, "Berlin");
        assert_eq!(merged.founded_year, Some(2019));
        assert_eq!(merged.tags, vec!["devtools", "rust"]);
        assert_eq!(merged.social_links["github"], "acme");
    }
}
