//! Prompt construction for the extraction gate and search digest.

use sigdesk_core::Candidate;

pub const EXTRACTION_SYSTEM: &str = "You are an analyst turning raw tech-industry items into \
     concise intelligence signals. Only extract companies and people that are \
     explicitly named in the item. Never invent names. Reply with a single \
     JSON object and nothing else.";

pub const DIGEST_SYSTEM: &str = "You are an analyst summarising a set of intelligence signals \
     that matched a search query. Reply with a single JSON object and \
     nothing else.";

/// Builds the user prompt asking the model to refine one candidate item and
/// extract any named entities.
#[must_use]
pub fn extraction_prompt(candidate: &Candidate) -> String {
    let mut prompt = String::new();

    prompt.push_str("Analyse this item and produce an intelligence signal.\n\n");
    prompt.push_str(&format!("Title: {}\n", candidate.title));
    if !candidate.description.is_empty() {
        prompt.push_str(&format!("Description: {}\n", candidate.description));
    }
    if !candidate.url.is_empty() {
        prompt.push_str(&format!("URL: {}\n", candidate.url));
    }
    prompt.push_str(&format!(
        "Engagement: {} primary, {} comments\n",
        candidate.engagement.primary, candidate.engagement.secondary
    ));
    if !candidate.topics.is_empty() {
        prompt.push_str(&format!("Topics: {}\n", candidate.topics.join(", ")));
    }
    for author in &candidate.authors {
        match &author.handle {
            Some(handle) => {
                prompt.push_str(&format!("Author: {} ({handle})\n", author.name));
            }
            None => prompt.push_str(&format!("Author: {}\n", author.name)),
        }
    }

    prompt.push_str(
        "\nRespond with JSON of this exact shape:\n\
         {\n\
         \x20 \"signal\": {\n\
         \x20   \"headline\": \"punchy one-line headline\",\n\
         \x20   \"summary\": \"2-3 sentence summary\",\n\
         \x20   \"why_it_matters\": \"1-2 sentences on significance\",\n\
         \x20   \"recommended_action\": \"one concrete next step\",\n\
         \x20   \"tags\": [\"lowercase\", \"tags\"]\n\
         \x20 },\n\
         \x20 \"company\": {\"name\": \"...\", \"description\": \"...\", \"website\": \"...\", \
         \"industry\": \"...\", \"location\": \"...\", \"tags\": []} or null,\n\
         \x20 \"people\": [{\"name\": \"Full Name\", \"title\": \"...\", \"bio\": \"...\", \
         \"company_name\": \"...\"}]\n\
         }\n\n\
         Set \"company\" to null when no real company is named. Only include \
         people whose real full names appear in the item; usernames and \
         handles are not names.",
    );

    prompt
}

/// Builds the digest prompt over the keyword scorer's hit list. Each entry
/// is one `id | headline | summary` line.
#[must_use]
pub fn digest_prompt(query: &str, corpus_lines: &[String]) -> String {
    format!(
        "Search query: {query}\n\nMatching signals (id | headline | summary):\n{}\n\n\
         Respond with JSON of this exact shape:\n\
         {{\n\
         \x20 \"summary\": \"what the matches collectively show\",\n\
         \x20 \"key_findings\": [\"finding\"],\n\
         \x20 \"relevant_ids\": [\"only ids from the list above\"],\n\
         \x20 \"suggestions\": [\"follow-up query\"]\n\
         }}",
        corpus_lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigdesk_core::{Candidate, CandidateAuthor};

    #[test]
    fn extraction_prompt_includes_candidate_fields() {
        let mut candidate = Candidate::from_title("Acme launches anvils");
        candidate.description = "Next-gen anvil platform".to_string();
        candidate.topics = vec!["hardware".to_string()];
        candidate.authors = vec![CandidateAuthor {
            name: "Grace Hopper".to_string(),
            handle: Some("ghopper".to_string()),
        }];

        let prompt = extraction_prompt(&candidate);

        assert!(prompt.contains("Acme launches anvils"));
        assert!(prompt.contains("Next-gen anvil platform"));
        assert!(prompt.contains("hardware"));
        assert!(prompt.contains("Grace Hopper (ghopper)"));
    }

    #[test]
    fn extraction_prompt_omits_empty_sections() {
        let prompt = extraction_prompt(&Candidate::from_title("Bare item"));

        assert!(!prompt.contains("Description:"));
        assert!(!prompt.contains("Topics:"));
        assert!(!prompt.contains("Author:"));
    }
}
