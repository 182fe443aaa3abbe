//! Job-board source.
//!
//! The upstream boards have no stable public APIs, so postings come from a
//! deterministic seeded generator over real startup rosters. Postings are
//! grouped per company into hiring signals, one signal per company rather
//! than one per job.

use rand::{rngs::StdRng, Rng, SeedableRng};
use sigdesk_core::{clamp_score, Candidate, EngagementMetrics};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Mid => "mid",
            Self::Senior => "senior",
            Self::Lead => "lead",
            Self::Executive => "executive",
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub remote: bool,
    pub salary_min: i64,
    pub salary_max: i64,
    pub department: &'static str,
    pub experience_level: ExperienceLevel,
    pub source_url: String,
    pub funding_stage: String,
    pub team_size: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiringSignalType {
    HiringSpike,
    ExecutiveHire,
    RapidExpansion,
}

impl HiringSignalType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HiringSpike => "hiring_spike",
            Self::ExecutiveHire => "executive_hire",
            Self::RapidExpansion => "rapid_expansion",
        }
    }
}

/// One company's job postings rolled up into a single hiring signal.
#[derive(Debug, Clone)]
pub struct HiringSignal {
    pub company_name: String,
    pub signal_type: HiringSignalType,
    pub job_count: usize,
    pub departments: Vec<&'static str>,
    pub seniority_levels: Vec<&'static str>,
    pub top_salary_max: i64,
    pub source_url: String,
    pub funding_stage: String,
    pub team_size: String,
    pub growth_indicator: &'static str,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

struct BoardCompany {
    name: &'static str,
    stage: &'static str,
    size: &'static str,
    jobs_url_prefix: &'static str,
}

const BOARD_COMPANIES: &[BoardCompany] = &[
    BoardCompany { name: "Brex", stage: "Series C", size: "200-500", jobs_url_prefix: "https://www.ycombinator.com/companies" },
    BoardCompany { name: "Ramp", stage: "Series C", size: "200-500", jobs_url_prefix: "https://www.ycombinator.com/companies" },
    BoardCompany { name: "Mercury", stage: "Series B", size: "100-200", jobs_url_prefix: "https://www.ycombinator.com/companies" },
    BoardCompany { name: "Linear", stage: "Series B", size: "50-100", jobs_url_prefix: "https://www.ycombinator.com/companies" },
    BoardCompany { name: "Vercel", stage: "Series C", size: "100-200", jobs_url_prefix: "https://www.ycombinator.com/companies" },
    BoardCompany { name: "Notion", stage: "Series C", size: "200-500", jobs_url_prefix: "https://wellfound.com/company" },
    BoardCompany { name: "Retool", stage: "Series B", size: "100-200", jobs_url_prefix: "https://wellfound.com/company" },
    BoardCompany { name: "Webflow", stage: "Series B", size: "200-500", jobs_url_prefix: "https://wellfound.com/company" },
    BoardCompany { name: "Superhuman", stage: "Series B", size: "50-100", jobs_url_prefix: "https://wellfound.com/company" },
    BoardCompany { name: "Loom", stage: "Series C", size: "100-200", jobs_url_prefix: "https://wellfound.com/company" },
];

const JOB_TITLES: &[&str] = &[
    "Senior Software Engineer",
    "Product Manager",
    "Senior Designer",
    "Engineering Manager",
    "Data Scientist",
    "DevOps Engineer",
    "Frontend Engineer",
    "Backend Engineer",
    "Full Stack Engineer",
    "Head of Engineering",
    "VP of Product",
    "Sales Engineer",
    "Customer Success Manager",
    "Marketing Manager",
    "Growth Lead",
];

const JOB_LOCATIONS: &[&str] = &["San Francisco, CA", "New York, NY", "Remote", "Austin, TX"];

/// Classifies a title into a department by keyword.
#[must_use]
pub fn determine_department(title: &str) -> &'static str {
    let text = title.to_lowercase();
    if ["engineer", "developer", "frontend", "backend", "devops"]
        .iter()
        .any(|k| text.contains(k))
    {
        "Engineering"
    } else if text.contains("product") || text.contains("pm") {
        "Product"
    } else if text.contains("design") || text.contains("ux") || text.contains("ui") {
        "Design"
    } else if text.contains("marketing") || text.contains("growth") {
        "Marketing"
    } else if text.contains("sales") || text.contains("business development") {
        "Sales"
    } else if text.contains("data") || text.contains("analytics") {
        "Data"
    } else {
        "Other"
    }
}

/// Classifies a title into an experience level by keyword.
#[must_use]
pub fn determine_experience_level(title: &str) -> ExperienceLevel {
    let text = title.to_lowercase();
    if text.contains("director") || text.contains("vp") || text.contains("head of") {
        ExperienceLevel::Executive
    } else if text.contains("manager") || text.contains("lead") {
        ExperienceLevel::Lead
    } else if text.contains("senior") || text.contains("principal") {
        ExperienceLevel::Senior
    } else if text.contains("junior") || text.contains("entry") || text.contains("graduate") {
        ExperienceLevel::Entry
    } else {
        ExperienceLevel::Mid
    }
}

/// Generates a seeded board of postings spread across the company roster.
/// The same seed always yields the same postings.
#[must_use]
pub fn postings(seed: u64, count: usize) -> Vec<JobPosting> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let company = &BOARD_COMPANIES[i % BOARD_COMPANIES.len()];
            let title = JOB_TITLES[rng.random_range(0..JOB_TITLES.len())];
            let salary_min = 100_000 + rng.random_range(0..100_000);
            JobPosting {
                title: title.to_owned(),
                company: company.name.to_owned(),
                location: JOB_LOCATIONS[rng.random_range(0..JOB_LOCATIONS.len())].to_owned(),
                remote: rng.random_bool(0.7),
                salary_min,
                salary_max: salary_min + 50_000 + rng.random_range(0..100_000),
                department: determine_department(title),
                experience_level: determine_experience_level(title),
                source_url: format!(
                    "{}/{}/jobs",
                    company.jobs_url_prefix,
                    company.name.to_lowercase()
                ),
                funding_stage: company.stage.to_owned(),
                team_size: company.size.to_owned(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Grouping and scoring
// ---------------------------------------------------------------------------

const HIRING_SPIKE_THRESHOLD: usize = 5;
const RAPID_EXPANSION_DEPARTMENTS: usize = 3;

/// Rolls postings up into one hiring signal per company. Signal type
/// priority: executive hire, then rapid expansion across departments, then
/// hiring spike.
#[must_use]
pub fn group_hiring_signals(postings: &[JobPosting]) -> Vec<HiringSignal> {
    let mut by_company: BTreeMap<&str, Vec<&JobPosting>> = BTreeMap::new();
    for posting in postings {
        by_company.entry(&posting.company).or_default().push(posting);
    }

    by_company
        .into_iter()
        .map(|(name, jobs)| {
            let mut departments: Vec<&'static str> =
                jobs.iter().map(|j| j.department).collect();
            departments.sort_unstable();
            departments.dedup();

            let mut seniority_levels: Vec<&'static str> =
                jobs.iter().map(|j| j.experience_level.as_str()).collect();
            seniority_levels.sort_unstable();
            seniority_levels.dedup();

            let has_executive = jobs
                .iter()
                .any(|j| j.experience_level == ExperienceLevel::Executive);
            let signal_type = if has_executive {
                HiringSignalType::ExecutiveHire
            } else if departments.len() >= RAPID_EXPANSION_DEPARTMENTS {
                HiringSignalType::RapidExpansion
            } else {
                HiringSignalType::HiringSpike
            };

            let top_salary_max = jobs.iter().map(|j| j.salary_max).max().unwrap_or(0);
            let first = jobs[0];
            let signal = HiringSignal {
                company_name: name.to_owned(),
                signal_type,
                job_count: jobs.len(),
                departments,
                seniority_levels,
                top_salary_max,
                source_url: first.source_url.clone(),
                funding_stage: first.funding_stage.clone(),
                team_size: first.team_size.clone(),
                growth_indicator: "",
            };
            let s = score(&signal);
            HiringSignal {
                growth_indicator: growth_indicator(s),
                ..signal
            }
        })
        .collect()
}

fn growth_indicator(score: i32) -> &'static str {
    if score >= 8 {
        "high"
    } else if score >= 6 {
        "medium"
    } else {
        "low"
    }
}

/// Source-level score 1..=10 from posting volume, seniority mix, salary
/// ceiling, and breadth of departments.
#[must_use]
pub fn score(signal: &HiringSignal) -> i32 {
    let mut total: i64 = 5;

    if signal.job_count >= HIRING_SPIKE_THRESHOLD {
        total += 2;
    } else if signal.job_count >= 3 {
        total += 1;
    }
    if signal.signal_type == HiringSignalType::ExecutiveHire {
        total += 2;
    }
    if signal.departments.len() >= RAPID_EXPANSION_DEPARTMENTS {
        total += 1;
    }
    if signal.top_salary_max > 200_000 {
        total += 1;
    }

    clamp_score(total)
}

// ---------------------------------------------------------------------------
// Template narrative
// ---------------------------------------------------------------------------

#[must_use]
pub fn headline(signal: &HiringSignal) -> String {
    match signal.signal_type {
        HiringSignalType::ExecutiveHire => format!(
            "{} is making executive hires across {}",
            signal.company_name,
            signal.departments.join(", ")
        ),
        HiringSignalType::RapidExpansion => format!(
            "{} is expanding across {} departments with {} open roles",
            signal.company_name,
            signal.departments.len(),
            signal.job_count
        ),
        HiringSignalType::HiringSpike => format!(
            "{} has {} open roles in {}",
            signal.company_name,
            signal.job_count,
            signal.departments.join(", ")
        ),
    }
}

#[must_use]
pub fn summary(signal: &HiringSignal) -> String {
    format!(
        "{} ({}, team {}) is hiring {} roles across {}. Seniority mix: {}.",
        signal.company_name,
        signal.funding_stage,
        signal.team_size,
        signal.job_count,
        signal.departments.join(", "),
        signal.seniority_levels.join(", ")
    )
}

#[must_use]
pub fn why_it_matters(signal: &HiringSignal) -> String {
    let base = match signal.signal_type {
        HiringSignalType::ExecutiveHire => {
            "Executive hiring signals a new phase: leadership gaps get filled right before a push into new markets or a funding round."
        }
        HiringSignalType::RapidExpansion => {
            "Hiring across several departments at once indicates company-wide scaling, not backfill."
        }
        HiringSignalType::HiringSpike => {
            "A burst of open roles is an early, public indicator of traction and budget."
        }
    };
    format!(
        "{base} {} is at the {} stage with a team of {}.",
        signal.company_name, signal.funding_stage, signal.team_size
    )
}

#[must_use]
pub fn recommended_action(signal: &HiringSignal) -> String {
    format!(
        "Track {}'s hiring velocity over the next quarter. Review the open roles at {} for product direction hints.",
        signal.company_name, signal.source_url
    )
}

#[must_use]
pub fn tags(signal: &HiringSignal) -> Vec<String> {
    let mut tags = vec![
        "jobs".to_owned(),
        "hiring".to_owned(),
        signal.signal_type.as_str().to_owned(),
        signal.funding_stage.to_lowercase().replace(' ', "_"),
    ];
    tags.extend(signal.departments.iter().map(|d| d.to_lowercase()));
    tags
}

/// Normalizes a hiring signal into the common candidate shape. The dedup
/// reference is the company jobs URL, so re-runs update rather than
/// duplicate.
#[must_use]
pub fn candidate(signal: &HiringSignal) -> Candidate {
    #[allow(clippy::cast_possible_wrap)]
    let job_count = signal.job_count as i64;
    Candidate {
        title: headline(signal),
        description: summary(signal),
        url: signal.source_url.clone(),
        discussion_url: signal.source_url.clone(),
        engagement: EngagementMetrics {
            primary: job_count,
            secondary: signal.top_salary_max,
        },
        timestamp: chrono::Utc::now(),
        topics: signal.departments.iter().map(|d| (*d).to_owned()).collect(),
        authors: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postings_are_deterministic_for_a_seed() {
        let a = postings(7, 60);
        let b = postings(7, 60);
        assert_eq!(a.len(), 60);
        assert_eq!(a[0].title, b[0].title);
        assert_eq!(a[41].salary_max, b[41].salary_max);
    }

    #[test]
    fn department_and_level_classification() {
        assert_eq!(determine_department("Backend Engineer"), "Engineering");
        assert_eq!(determine_department("Growth Lead"), "Marketing");
        assert_eq!(determine_department("Technical Writer"), "Other");
        assert_eq!(
            determine_experience_level("VP of Product"),
            ExperienceLevel::Executive
        );
        assert_eq!(
            determine_experience_level("Senior Designer"),
            ExperienceLevel::Senior
        );
        assert_eq!(
            determine_experience_level("Engineering Manager"),
            ExperienceLevel::Lead
        );
        assert_eq!(
            determine_experience_level("Data Scientist"),
            ExperienceLevel::Mid
        );
    }

    fn posting(company: &str, title: &str, salary_max: i64) -> JobPosting {
        JobPosting {
            title: title.to_owned(),
            company: company.to_owned(),
            location: "Remote".to_owned(),
            remote: true,
            salary_min: 120_000,
            salary_max,
            department: determine_department(title),
            experience_level: determine_experience_level(title),
            source_url: format!(
                "https://wellfound.com/company/{}/jobs",
                company.to_lowercase()
            ),
            funding_stage: "Series B".to_owned(),
            team_size: "50-100".to_owned(),
        }
    }

    #[test]
    fn executive_hire_wins_over_other_signal_types() {
        let jobs = vec![
            posting("Acme", "VP of Product", 250_000),
            posting("Acme", "Backend Engineer", 180_000),
            posting("Acme", "Senior Designer", 170_000),
        ];
        let signals = group_hiring_signals(&jobs);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_type, HiringSignalType::ExecutiveHire);
        assert_eq!(signals[0].job_count, 3);
    }

    #[test]
    fn broad_department_spread_is_rapid_expansion() {
        let jobs = vec![
            posting("Acme", "Backend Engineer", 180_000),
            posting("Acme", "Senior Designer", 170_000),
            posting("Acme", "Marketing Manager", 150_000),
        ];
        let signals = group_hiring_signals(&jobs);
        assert_eq!(signals[0].signal_type, HiringSignalType::RapidExpansion);
    }

    #[test]
    fn small_single_department_batch_is_a_hiring_spike() {
        let jobs = vec![
            posting("Acme", "Backend Engineer", 180_000),
            posting("Acme", "Frontend Engineer", 175_000),
        ];
        let signals = group_hiring_signals(&jobs);
        assert_eq!(signals[0].signal_type, HiringSignalType::HiringSpike);
    }

    #[test]
    fn score_rewards_volume_exec_hires_and_salary() {
        let jobs: Vec<JobPosting> = vec![
            posting("Acme", "VP of Product", 250_000),
            posting("Acme", "Backend Engineer", 180_000),
            posting("Acme", "Senior Designer", 170_000),
            posting("Acme", "Marketing Manager", 150_000),
            posting("Acme", "Data Scientist", 160_000),
        ];
        let signal = &group_hiring_signals(&jobs)[0];
        // 5 base + 2 volume + 2 exec + 1 breadth + 1 salary, clamped to 10.
        assert_eq!(score(signal), 10);
        assert_eq!(signal.growth_indicator, "high");
    }

    #[test]
    fn companies_group_independently() {
        let jobs = vec![
            posting("Acme", "Backend Engineer", 180_000),
            posting("Globex", "Marketing Manager", 150_000),
        ];
        let signals = group_hiring_signals(&jobs);
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].company_name, "Acme");
        assert_eq!(signals[1].company_name, "Globex");
    }
}
