//! Pipeline tests against a live Postgres database.

use sigdesk_core::{
    app_config::Environment, AppConfig, CompanyCandidate, PersonCandidate,
};
use sigdesk_db::{find_company_by_name_ci, find_person_by_name_ci, list_signals};
use sigdesk_pipeline::{
    resolve_company, resolve_person, sync_jobs, sync_yc, PipelineError,
};
use sqlx::PgPool;

fn test_config() -> AppConfig {
    AppConfig {
        database_url: String::new(),
        env: Environment::Test,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "info".to_owned(),
        anthropic_api_key: None,
        producthunt_api_token: None,
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 5,
        fetch_timeout_secs: 5,
        fetch_user_agent: "sigdesk-test/0.1".to_owned(),
        analysis_timeout_secs: 5,
        analysis_batch_size: 3,
        analysis_batch_delay_ms: 0,
        fetch_max_retries: 0,
        fetch_retry_backoff_base_secs: 0,
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn resolving_the_same_company_twice_reuses_and_enriches(pool: PgPool) {
    let first = CompanyCandidate {
        name: "Anvil Labs".to_owned(),
        description: "Tooling".to_owned(),
        tags: vec!["devtools".to_owned()],
        ..CompanyCandidate::default()
    };
    let second = CompanyCandidate {
        name: "anvil labs".to_owned(),
        description: "A much longer description of what Anvil Labs builds".to_owned(),
        website: "https://anvil.dev".to_owned(),
        tags: vec!["rust".to_owned(), "Devtools".to_owned()],
        ..CompanyCandidate::default()
    };

    let a = resolve_company(&pool, &first).await.expect("first resolve");
    let b = resolve_company(&pool, &second).await.expect("second resolve");

    assert_eq!(a.id, b.id);
    // Each resolve surfaces the spelling it was called with, so the signal
    // being assembled reads the way its own source wrote the name.
    assert_eq!(a.name, "Anvil Labs");
    assert_eq!(b.name, "anvil labs");

    let row = find_company_by_name_ci(&pool, "ANVIL LABS")
        .await
        .expect("lookup")
        .expect("row");
    assert_eq!(
        row.description,
        "A much longer description of what Anvil Labs builds"
    );
    assert_eq!(row.website, "https://anvil.dev");
    assert_eq!(row.tags, vec!["devtools", "rust"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn implausible_person_names_never_create_rows(pool: PgPool) {
    for name in ["founder_guy", "dev42", "Madonna", "@handle", "John Doe"] {
        let candidate = PersonCandidate::named(name);
        assert!(
            resolve_person(&pool, &candidate).await.is_none(),
            "{name} should be rejected"
        );
    }

    let candidate = PersonCandidate {
        name: "Ada Park".to_owned(),
        title: "CTO".to_owned(),
        ..PersonCandidate::default()
    };
    let id = resolve_person(&pool, &candidate).await.expect("valid name");

    let row = find_person_by_name_ci(&pool, "ada park")
        .await
        .expect("lookup")
        .expect("row");
    assert_eq!(row.id, id);
    assert_eq!(row.title, "CTO");
}

#[sqlx::test(migrations = "../../migrations")]
async fn person_enrichment_attaches_the_company_link(pool: PgPool) {
    let company = resolve_company(&pool, &CompanyCandidate::named("Anvil Labs"))
        .await
        .expect("company");

    // First seen without a company, later enriched with one.
    let without = PersonCandidate {
        name: "Ada Park".to_owned(),
        ..PersonCandidate::default()
    };
    resolve_person(&pool, &without).await.expect("insert");

    let with = PersonCandidate {
        name: "Ada Park".to_owned(),
        company_id: Some(company.id),
        company_name: "Anvil Labs".to_owned(),
        ..PersonCandidate::default()
    };
    resolve_person(&pool, &with).await.expect("merge");

    let row = find_person_by_name_ci(&pool, "Ada Park")
        .await
        .expect("lookup")
        .expect("row");
    assert_eq!(row.company_id, Some(company.id));
    assert_eq!(row.company_name, "Anvil Labs");
}

// ---------------------------------------------------------------------------
// Sync orchestration (template sources run without network or AI)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn jobs_sync_groups_per_company_and_is_idempotent(pool: PgPool) {
    let config = test_config();

    let first = sync_jobs(&pool, &config).await.expect("first run");
    assert_eq!(first.total, 60);
    assert_eq!(first.filtered, 10);
    assert_eq!(first.imported, 10);
    assert_eq!(first.skipped, 0);
    assert!(!first.ai_enabled);
    assert!(first.errors.is_empty());

    let signals = list_signals(&pool, Some("published")).await.expect("list");
    assert_eq!(signals.len(), 10);
    // The detected hiring pattern is the signal type itself.
    assert!(signals.iter().all(|s| {
        matches!(
            s.signal_type.as_str(),
            "hiring_spike" | "executive_hire" | "rapid_expansion"
        )
    }));
    // Hiring signals link to their companies.
    assert!(signals.iter().all(|s| s.company_id.is_some()));

    let second = sync_jobs(&pool, &config).await.expect("second run");
    assert_eq!(second.imported, 0);
    assert_eq!(second.skipped, 10);
    assert!(second.errors.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn yc_sync_degrades_to_templates_without_ai(pool: PgPool) {
    let config = test_config();

    let first = sync_yc(&pool, &config).await.expect("first run");
    assert!(!first.ai_enabled);
    assert_eq!(first.total, 150);
    assert!(first.filtered > 0);
    assert_eq!(first.imported + first.errors.len(), first.processed);
    assert!(first.errors.is_empty());

    let signals = list_signals(&pool, Some("published")).await.expect("list");
    assert_eq!(signals.len(), first.imported);
    assert!(signals.iter().all(|s| s.signal_type.ends_with("_startup")));
    // Template path grants no AI bonus, so scores stay within the source
    // formula's range.
    assert!(signals.iter().all(|s| (0..=10).contains(&s.score)));

    let second = sync_yc(&pool, &config).await.expect("second run");
    assert_eq!(second.imported, 0);
    assert_eq!(second.skipped, first.imported);
}

#[sqlx::test(migrations = "../../migrations")]
async fn ai_required_sources_refuse_to_run_without_a_key(pool: PgPool) {
    let config = test_config();

    let err = sigdesk_pipeline::sync_hackernews(&pool, &config)
        .await
        .expect_err("must refuse");
    assert!(matches!(err, PipelineError::Config(_)));
}
