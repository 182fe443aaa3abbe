//! Y Combinator directory source.
//!
//! There is no public bulk API for the YC directory, so this module builds
//! a deterministic, seeded dataset in the directory's shape: weighted
//! verticals, recent batches, founders, team sizes, hiring flags. The
//! filter/categorize/score/template layer on top is the real signal logic
//! and works the same against any future real fetcher.

use rand::{rngs::StdRng, Rng, SeedableRng};
use sigdesk_core::{clamp_score_f64, Candidate, CandidateAuthor, EngagementMetrics};

const DIRECTORY_SIZE: usize = 150;

#[derive(Debug, Clone)]
pub struct YcFounder {
    pub name: String,
    pub title: String,
    pub linkedin: String,
    pub twitter: String,
}

#[derive(Debug, Clone)]
pub struct YcCompany {
    pub id: String,
    pub name: String,
    pub url: String,
    pub description: String,
    pub batch: String,
    pub tags: Vec<String>,
    pub founders: Vec<YcFounder>,
    pub website: String,
    pub location: String,
    pub team_size: i64,
    pub is_hiring: bool,
    pub funding_stage: String,
    pub vertical: String,
}

const VERTICALS: &[(&str, f64)] = &[
    ("AI", 0.25),
    ("Fintech", 0.15),
    ("Developer Tools", 0.15),
    ("Healthcare", 0.12),
    ("Climate", 0.08),
    ("Crypto", 0.08),
    ("Marketplace", 0.10),
    ("SaaS", 0.07),
];

const NAME_PREFIXES: &[&str] = &[
    "Nexus", "Quantum", "Apex", "Vertex", "Zenith", "Prism", "Flux", "Nova", "Orbit", "Pulse",
];
const NAME_SUFFIXES: &[&str] = &[
    "Labs", "Tech", "AI", "Works", "Systems", "Solutions", "Platform", "Engine", "Hub", "Core",
];
const NAME_TECH_WORDS: &[&str] = &[
    "Data", "Cloud", "Smart", "Auto", "Rapid", "Secure", "Scale", "Flow", "Link", "Sync",
];

const FOUNDER_FIRST_NAMES: &[&str] = &[
    "Alex", "Jordan", "Casey", "Morgan", "Taylor", "Riley", "Avery", "Quinn", "Sage", "River",
    "Rowan", "Phoenix",
];
const FOUNDER_LAST_NAMES: &[&str] = &[
    "Chen", "Patel", "Johnson", "Williams", "Brown", "Davis", "Miller", "Wilson", "Moore",
    "Taylor", "Anderson", "Thomas",
];

const LOCATIONS: &[&str] = &[
    "San Francisco, CA",
    "New York, NY",
    "Los Angeles, CA",
    "Seattle, WA",
    "Austin, TX",
    "Boston, MA",
    "Denver, CO",
    "London, UK",
    "Berlin, Germany",
    "Toronto, Canada",
    "Singapore",
    "Remote",
];

fn descriptions_for(vertical: &str) -> &'static [&'static str] {
    match vertical {
        "AI" => &[
            "AI-powered customer service automation",
            "Machine learning platform for financial forecasting",
            "Computer vision for manufacturing quality control",
            "Natural language processing for legal documents",
            "Automated code review and bug detection",
        ],
        "Fintech" => &[
            "Digital banking for small businesses",
            "AI-powered fraud detection for payments",
            "Cross-border payment solutions",
            "Credit scoring using alternative data",
            "Expense management for remote teams",
        ],
        "Developer Tools" => &[
            "API testing and monitoring platform",
            "Cloud infrastructure automation",
            "Code deployment and CI/CD pipeline",
            "Application performance monitoring",
            "Development environment as a service",
        ],
        "Healthcare" => &[
            "Telemedicine platform for specialists",
            "Digital therapeutics for mental health",
            "Remote patient monitoring devices",
            "Medical imaging AI analysis",
            "Clinical trial management software",
        ],
        "Climate" => &[
            "Carbon footprint tracking for businesses",
            "Electric vehicle charging network",
            "Renewable energy trading platform",
            "Smart grid optimization software",
            "Energy storage system management",
        ],
        "Crypto" => &[
            "DeFi lending and borrowing protocol",
            "Blockchain-based identity verification",
            "Cryptocurrency payment processor",
            "Smart contract auditing service",
            "Blockchain supply chain tracking",
        ],
        "Marketplace" => &[
            "Freelancer marketplace for specialized skills",
            "B2B equipment rental platform",
            "Local services booking platform",
            "Professional services marketplace",
            "Home improvement contractor platform",
        ],
        _ => &[
            "Customer relationship management platform",
            "Project management and collaboration tools",
            "Marketing automation platform",
            "Business intelligence and analytics",
            "Customer support ticketing system",
        ],
    }
}

fn tags_for(vertical: &str) -> &'static [&'static str] {
    match vertical {
        "AI" => &["machine-learning", "artificial-intelligence", "automation", "nlp"],
        "Fintech" => &["payments", "banking", "finance", "lending"],
        "Developer Tools" => &["developer-tools", "infrastructure", "api", "devops"],
        "Healthcare" => &["healthcare", "medical", "telemedicine", "biotech"],
        "Climate" => &["climate-tech", "sustainability", "clean-energy", "carbon"],
        "Crypto" => &["blockchain", "cryptocurrency", "defi", "web3"],
        "Marketplace" => &["marketplace", "platform", "two-sided", "network-effects"],
        _ => &["saas", "b2b", "software", "productivity"],
    }
}

fn pick<'a>(rng: &mut StdRng, options: &'a [&'a str]) -> &'a str {
    options[rng.random_range(0..options.len())]
}

fn pick_vertical(rng: &mut StdRng) -> &'static str {
    let roll: f64 = rng.random();
    let mut cumulative = 0.0;
    for (name, weight) in VERTICALS {
        cumulative += weight;
        if roll <= cumulative {
            return name;
        }
    }
    VERTICALS[0].0
}

fn company_name(rng: &mut StdRng) -> String {
    match rng.random_range(0..3) {
        0 => format!("{}{}", pick(rng, NAME_PREFIXES), pick(rng, NAME_SUFFIXES)),
        1 => format!("{}{}", pick(rng, NAME_TECH_WORDS), pick(rng, NAME_SUFFIXES)),
        _ => format!("{}{}", pick(rng, NAME_PREFIXES), pick(rng, NAME_TECH_WORDS)),
    }
}

fn founders(rng: &mut StdRng) -> Vec<YcFounder> {
    let count = if rng.random_bool(0.4) { 2 } else { 1 };
    (0..count)
        .map(|i| {
            let first = pick(rng, FOUNDER_FIRST_NAMES);
            let last = pick(rng, FOUNDER_LAST_NAMES);
            YcFounder {
                name: format!("{first} {last}"),
                title: if i == 0 { "CEO" } else { "CTO" }.to_owned(),
                linkedin: format!(
                    "https://linkedin.com/in/{}-{}",
                    first.to_lowercase(),
                    last.to_lowercase()
                ),
                twitter: format!(
                    "https://twitter.com/{}{}",
                    first.to_lowercase(),
                    last.to_lowercase()
                ),
            }
        })
        .collect()
}

fn funding_stage(batch_year: i32, current_year: i32, team_size: i64) -> String {
    let years_old = current_year - batch_year;
    if years_old <= 1 {
        if team_size > 20 { "Seed" } else { "Pre-seed" }
    } else if years_old <= 3 {
        if team_size > 50 { "Series A" } else { "Seed" }
    } else if team_size > 100 {
        "Series B"
    } else {
        "Series A"
    }
    .to_owned()
}

/// Builds the seeded directory dataset. The same seed and year always
/// produce the same companies, so syncs are reproducible and dedup works
/// across runs.
#[must_use]
pub fn directory(seed: u64, current_year: i32) -> Vec<YcCompany> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut companies = Vec::with_capacity(DIRECTORY_SIZE);

    for _ in 0..DIRECTORY_SIZE {
        let vertical = pick_vertical(&mut rng);
        let batch_year = current_year - rng.random_range(0..4);
        let season = if rng.random_bool(0.5) { "W" } else { "S" };
        let batch = format!("{season}{batch_year}");
        let description = pick(&mut rng, descriptions_for(vertical)).to_owned();
        let name = company_name(&mut rng);
        let slug = name.to_lowercase().replace(' ', "-");

        let is_recent = current_year - batch_year <= 1;
        let team_size = rng.random_range(5..if is_recent { 105 } else { 505 });
        let is_hiring = rng.random_bool(0.7);

        let mut tags: Vec<String> = vec![vertical.to_lowercase().replace(' ', "-")];
        tags.extend(tags_for(vertical).iter().map(|t| (*t).to_owned()));

        companies.push(YcCompany {
            id: slug.clone(),
            name: name.clone(),
            url: format!("https://www.ycombinator.com/companies/{slug}"),
            description,
            batch,
            tags,
            founders: founders(&mut rng),
            website: format!("https://{}.com", name.to_lowercase().replace(' ', "")),
            location: pick(&mut rng, LOCATIONS).to_owned(),
            team_size,
            is_hiring,
            funding_stage: funding_stage(batch_year, current_year, team_size),
            vertical: vertical.to_owned(),
        });
    }

    companies
}

// ---------------------------------------------------------------------------
// Filtering, categorizing, scoring
// ---------------------------------------------------------------------------

const HOT_VERTICAL_KEYWORDS: &[&str] = &[
    "ai", "artificial intelligence", "machine learning", "ml", "crypto", "blockchain", "web3",
    "defi", "fintech", "healthtech", "edtech", "climate", "developer tools", "infrastructure",
    "saas", "marketplace", "e-commerce", "social",
];

fn company_text(company: &YcCompany) -> String {
    format!(
        "{} {} {}",
        company.description,
        company.vertical,
        company.tags.join(" ")
    )
    .to_lowercase()
}

fn is_recent_batch(batch: &str, current_year: i32) -> bool {
    [
        format!("W{current_year}"),
        format!("S{current_year}"),
        format!("W{}", current_year - 1),
        format!("S{}", current_year - 1),
    ]
    .iter()
    .any(|b| b == batch)
}

/// A company is worth a signal when it is from a recent batch, hiring, in a
/// hot vertical, or scaling past 50 people.
#[must_use]
pub fn is_signal_worthy(company: &YcCompany, current_year: i32) -> bool {
    if is_recent_batch(&company.batch, current_year) || company.is_hiring {
        return true;
    }
    let text = company_text(company);
    if HOT_VERTICAL_KEYWORDS.iter().any(|k| text.contains(k)) {
        return true;
    }
    company.team_size > 50
}

/// Buckets a company into a `*_startup` signal type by vertical keywords.
#[must_use]
pub fn categorize(company: &YcCompany) -> &'static str {
    let text = company_text(company);
    let any = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    if any(&["ai", "artificial intelligence", "machine learning", "ml", "llm", "neural"]) {
        "ai_startup"
    } else if any(&["crypto", "blockchain", "web3", "defi", "nft", "dao"]) {
        "crypto_startup"
    } else if any(&["developer", "dev tools", "api", "sdk", "infrastructure", "platform", "saas"]) {
        "dev_tools_startup"
    } else if any(&["fintech", "finance", "banking", "payments", "lending", "insurance"]) {
        "fintech_startup"
    } else if any(&["health", "medical", "biotech", "pharma", "wellness"]) {
        "healthtech_startup"
    } else if any(&["climate", "sustainability", "green", "renewable", "carbon"]) {
        "climate_startup"
    } else if any(&["marketplace", "e-commerce", "ecommerce", "retail", "shopping"]) {
        "marketplace_startup"
    } else {
        "yc_startup"
    }
}

/// Source-level score 0..=10 from batch recency, hiring, team size,
/// vertical heat, and funding stage.
#[must_use]
pub fn score(company: &YcCompany, current_year: i32) -> i32 {
    let mut total = 5.0;

    if company.batch == format!("W{current_year}") || company.batch == format!("S{current_year}") {
        total += 3.0;
    } else if company.batch == format!("W{}", current_year - 1)
        || company.batch == format!("S{}", current_year - 1)
    {
        total += 2.0;
    }

    if company.is_hiring {
        total += 2.0;
    }

    if company.team_size > 100 {
        total += 2.0;
    } else if company.team_size > 50 {
        total += 1.0;
    }

    let text = company_text(company);
    if ["ai", "crypto", "fintech", "climate", "developer"]
        .iter()
        .any(|k| text.contains(k))
    {
        total += 1.0;
    }

    let stage = company.funding_stage.to_lowercase();
    if stage.contains("series a") || stage.contains("series b") {
        total += 1.0;
    }

    clamp_score_f64(total)
}

// ---------------------------------------------------------------------------
// Template narrative (used when AI is unavailable)
// ---------------------------------------------------------------------------

#[must_use]
pub fn headline(company: &YcCompany, current_year: i32) -> String {
    let vertical = if company.vertical.is_empty() {
        "startup"
    } else {
        &company.vertical
    };
    if company.is_hiring {
        format!(
            "{} (YC {}) is hiring, {vertical} opportunity",
            company.name, company.batch
        )
    } else if company.batch.contains(&current_year.to_string()) {
        format!("New YC {} company: {} ({vertical})", company.batch, company.name)
    } else {
        format!("YC {} company {} shows {vertical} momentum", company.batch, company.name)
    }
}

#[must_use]
pub fn why_it_matters(company: &YcCompany, current_year: i32) -> String {
    let mut reasons = Vec::new();
    if company.batch.contains(&current_year.to_string()) {
        reasons.push("Recent YC batch indicates validated market opportunity".to_owned());
    }
    if company.is_hiring {
        reasons.push("Active hiring suggests growth and traction".to_owned());
    }
    if company.team_size > 20 {
        reasons.push(format!(
            "Team of {}+ shows scaling momentum",
            company.team_size
        ));
    }
    let vertical = if company.vertical.is_empty() {
        "their vertical"
    } else {
        &company.vertical
    };
    reasons.push(format!("Early signal in {vertical} before mainstream coverage"));
    reasons.join(". ") + "."
}

#[must_use]
pub fn recommended_action(company: &YcCompany) -> String {
    let mut actions = Vec::new();
    if company.is_hiring {
        actions.push("Monitor hiring patterns for market validation".to_owned());
    }
    if !company.website.is_empty() {
        actions.push(format!("Research product at {}", company.website));
    }
    if !company.founders.is_empty() {
        let names: Vec<&str> = company.founders.iter().map(|f| f.name.as_str()).collect();
        actions.push(format!("Connect with founders: {}", names.join(", ")));
    }
    actions.push(format!(
        "Track {} for early partnership opportunities",
        company.name
    ));
    actions.join(". ") + "."
}

#[must_use]
pub fn tags(company: &YcCompany) -> Vec<String> {
    let mut tags = company.tags.clone();
    tags.push(format!("yc-{}", company.batch.to_lowercase()));
    if company.is_hiring {
        tags.push("hiring".to_owned());
    }
    tags.dedup();
    tags
}

/// Normalizes a company into the common candidate shape.
#[must_use]
pub fn candidate(company: &YcCompany) -> Candidate {
    Candidate {
        title: company.name.clone(),
        description: company.description.clone(),
        url: company.website.clone(),
        discussion_url: company.url.clone(),
        engagement: EngagementMetrics {
            primary: company.team_size,
            secondary: 0,
        },
        timestamp: chrono::Utc::now(),
        topics: company.tags.clone(),
        authors: company
            .founders
            .iter()
            .map(|f| CandidateAuthor {
                name: f.name.clone(),
                handle: None,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_is_deterministic_for_a_seed() {
        let a = directory(42, 2026);
        let b = directory(42, 2026);
        assert_eq!(a.len(), DIRECTORY_SIZE);
        assert_eq!(a[0].name, b[0].name);
        assert_eq!(a[77].batch, b[77].batch);
    }

    #[test]
    fn different_seeds_differ() {
        let a = directory(1, 2026);
        let b = directory(2, 2026);
        assert!(a.iter().zip(&b).any(|(x, y)| x.name != y.name));
    }

    fn sample(vertical: &str, batch: &str) -> YcCompany {
        YcCompany {
            id: "acme".to_owned(),
            name: "Acme".to_owned(),
            url: "https://www.ycombinator.com/companies/acme".to_owned(),
            description: "Anvils and heavy presses".to_owned(),
            batch: batch.to_owned(),
            tags: vec![],
            founders: vec![],
            website: "https://acme.com".to_owned(),
            location: "Remote".to_owned(),
            team_size: 10,
            is_hiring: false,
            funding_stage: "Pre-seed".to_owned(),
            vertical: vertical.to_owned(),
        }
    }

    #[test]
    fn current_batch_scores_highest_recency_bonus() {
        let current = sample("Hardware", "W2026");
        let old = sample("Hardware", "W2022");
        assert!(score(&current, 2026) > score(&old, 2026));
    }

    #[test]
    fn stale_non_hiring_niche_company_is_filtered() {
        let c = sample("Hardware", "W2022");
        assert!(!is_signal_worthy(&c, 2026));
    }

    #[test]
    fn hiring_alone_is_signal_worthy() {
        let mut c = sample("Hardware", "W2022");
        c.is_hiring = true;
        assert!(is_signal_worthy(&c, 2026));
    }

    #[test]
    fn categorize_maps_verticals_to_startup_types() {
        assert_eq!(categorize(&sample("Fintech", "W2026")), "fintech_startup");
        assert_eq!(categorize(&sample("Crypto", "W2026")), "crypto_startup");
        assert_eq!(categorize(&sample("Hardware", "W2026")), "yc_startup");
    }

    #[test]
    fn hiring_headline_mentions_the_batch() {
        let mut c = sample("Fintech", "W2025");
        c.is_hiring = true;
        let h = headline(&c, 2026);
        assert!(h.contains("YC W2025"));
        assert!(h.contains("hiring"));
    }

    #[test]
    fn why_it_matters_always_ends_with_the_vertical_reason() {
        let c = sample("Fintech", "W2022");
        let text = why_it_matters(&c, 2026);
        assert!(text.contains("Early signal in Fintech"));
    }
}
