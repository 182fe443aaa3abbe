//! Live integration tests for sigdesk-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/sigdesk-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use sigdesk_core::{CompanyCandidate, PersonCandidate, UserAction};
use sigdesk_db::{
    append_action, current_action, delete_signal, find_company_by_name_ci,
    find_person_by_name_ci, find_similar_companies, get_signal, insert_company, insert_person,
    insert_signal, list_actions, list_signals, patch_signal, signal_exists,
    update_company_merged, NewSignal, SignalPatch,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_signal(headline: &str, source: &str, source_ref: &str, score: i32) -> NewSignal {
    NewSignal {
        headline: headline.to_string(),
        summary: format!("{headline} summary"),
        source_link: "https://example.com/item".to_string(),
        why_it_matters: "Notable activity worth a look.".to_string(),
        recommended_action: "Review the linked discussion.".to_string(),
        score,
        credibility: "medium".to_string(),
        signal_type: "product_launch".to_string(),
        tags: vec!["launch".to_string()],
        company_id: None,
        company_name: String::new(),
        company_ids: vec![],
        person_ids: vec![],
        status: "published".to_string(),
        source: source.to_string(),
        source_ref: source_ref.to_string(),
        source_meta: serde_json::json!({}),
    }
}

// ---------------------------------------------------------------------------
// Section 1: Company and person resolution lookups
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn company_name_lookup_is_case_insensitive_and_exact(pool: sqlx::PgPool) {
    let inserted = insert_company(&pool, &CompanyCandidate::named("Acme Corp"))
        .await
        .expect("insert_company failed");

    let found = find_company_by_name_ci(&pool, "ACME corp")
        .await
        .expect("find_company_by_name_ci failed");
    assert_eq!(found.map(|c| c.id), Some(inserted.id));

    // Exact match only: a shorter name must not resolve to the longer one.
    let missed = find_company_by_name_ci(&pool, "Acme")
        .await
        .expect("find_company_by_name_ci failed");
    assert!(missed.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn similar_company_search_matches_fragments(pool: sqlx::PgPool) {
    insert_company(&pool, &CompanyCandidate::named("Acme Corp"))
        .await
        .expect("insert failed");
    insert_company(&pool, &CompanyCandidate::named("Acme Labs"))
        .await
        .expect("insert failed");
    insert_company(&pool, &CompanyCandidate::named("Globex"))
        .await
        .expect("insert failed");

    let similar = find_similar_companies(&pool, "acme")
        .await
        .expect("find_similar_companies failed");

    assert_eq!(similar.len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn merged_update_overwrites_profile_and_bumps_updated_at(pool: sqlx::PgPool) {
    let inserted = insert_company(&pool, &CompanyCandidate::named("Acme Corp"))
        .await
        .expect("insert_company failed");

    let mut merged = CompanyCandidate::named("Acme Corp");
    merged.description = "Industrial anvil maker.".to_string();
    merged.website = "https://acme.example".to_string();
    merged.tags = vec!["manufacturing".to_string()];

    let updated = update_company_merged(&pool, inserted.id, &merged)
        .await
        .expect("update_company_merged failed");

    assert_eq!(updated.description, "Industrial anvil maker.");
    assert_eq!(updated.website, "https://acme.example");
    assert_eq!(updated.tags, vec!["manufacturing".to_string()]);
    assert!(updated.updated_at >= inserted.updated_at);
}

#[sqlx::test(migrations = "../../migrations")]
async fn person_name_lookup_is_case_insensitive(pool: sqlx::PgPool) {
    let inserted = insert_person(&pool, &PersonCandidate::named("Grace Hopper"))
        .await
        .expect("insert_person failed");

    let found = find_person_by_name_ci(&pool, "grace hopper")
        .await
        .expect("find_person_by_name_ci failed");

    assert_eq!(found.map(|p| p.id), Some(inserted.id));
}

// ---------------------------------------------------------------------------
// Section 2: Signal dedup and lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn signal_exists_matches_source_and_ref_pair(pool: sqlx::PgPool) {
    insert_signal(&pool, &make_signal("Acme launches", "hackernews", "12345", 7))
        .await
        .expect("insert_signal failed");

    assert!(signal_exists(&pool, "hackernews", "12345")
        .await
        .expect("signal_exists failed"));
    // Same ref under a different source is a different item.
    assert!(!signal_exists(&pool, "github", "12345")
        .await
        .expect("signal_exists failed"));
    // Empty refs never dedup.
    assert!(!signal_exists(&pool, "hackernews", "")
        .await
        .expect("signal_exists failed"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_source_ref_insert_is_rejected(pool: sqlx::PgPool) {
    insert_signal(&pool, &make_signal("First", "github", "owner/repo", 6))
        .await
        .expect("insert_signal failed");

    let dup = insert_signal(&pool, &make_signal("Second", "github", "owner/repo", 6)).await;

    assert!(dup.is_err(), "unique index on (source, source_ref) should fire");
}

#[sqlx::test(migrations = "../../migrations")]
async fn manual_signals_with_empty_ref_never_collide(pool: sqlx::PgPool) {
    insert_signal(&pool, &make_signal("First manual", "manual", "", 5))
        .await
        .expect("insert_signal failed");
    insert_signal(&pool, &make_signal("Second manual", "manual", "", 5))
        .await
        .expect("second manual insert should succeed");

    let all = list_signals(&pool, None).await.expect("list_signals failed");
    assert_eq!(all.len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn publishing_stamps_published_at_exactly_once(pool: sqlx::PgPool) {
    let mut draft = make_signal("Draft item", "manual", "", 4);
    draft.status = "draft".to_string();
    let inserted = insert_signal(&pool, &draft).await.expect("insert failed");
    assert!(inserted.published_at.is_none());

    let published = patch_signal(
        &pool,
        inserted.id,
        &SignalPatch {
            status: Some("published".to_string()),
            ..SignalPatch::default()
        },
    )
    .await
    .expect("patch_signal failed");
    let first_stamp = published.published_at.expect("published_at should be set");

    // Archive and re-publish; the original stamp survives.
    patch_signal(
        &pool,
        inserted.id,
        &SignalPatch {
            status: Some("archived".to_string()),
            ..SignalPatch::default()
        },
    )
    .await
    .expect("patch_signal failed");
    let republished = patch_signal(
        &pool,
        inserted.id,
        &SignalPatch {
            status: Some("published".to_string()),
            ..SignalPatch::default()
        },
    )
    .await
    .expect("patch_signal failed");

    assert_eq!(republished.published_at, Some(first_stamp));
}

#[sqlx::test(migrations = "../../migrations")]
async fn signals_list_orders_by_score_then_recency(pool: sqlx::PgPool) {
    insert_signal(&pool, &make_signal("Low", "manual", "", 3))
        .await
        .expect("insert failed");
    insert_signal(&pool, &make_signal("High", "manual", "", 9))
        .await
        .expect("insert failed");
    insert_signal(&pool, &make_signal("Mid", "manual", "", 6))
        .await
        .expect("insert failed");

    let rows = list_signals(&pool, Some("published"))
        .await
        .expect("list_signals failed");

    let scores: Vec<i32> = rows.iter().map(|s| s.score).collect();
    assert_eq!(scores, vec![9, 6, 3]);
}

// ---------------------------------------------------------------------------
// Section 3: Action history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn latest_action_wins_and_history_is_kept(pool: sqlx::PgPool) {
    let signal = insert_signal(&pool, &make_signal("Triaged", "manual", "", 7))
        .await
        .expect("insert failed");

    append_action(&pool, signal.id, "default-user", UserAction::Ignore, "")
        .await
        .expect("append_action failed");
    append_action(&pool, signal.id, "default-user", UserAction::Acted, "reached out")
        .await
        .expect("append_action failed");

    let current = current_action(&pool, signal.id)
        .await
        .expect("current_action failed")
        .expect("signal should have an action");
    assert_eq!(current.action, "acted");
    assert_eq!(current.notes, "reached out");

    let history = list_actions(&pool, signal.id)
        .await
        .expect("list_actions failed");
    assert_eq!(history.len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleting_a_signal_cascades_to_its_actions(pool: sqlx::PgPool) {
    let signal = insert_signal(&pool, &make_signal("Doomed", "manual", "", 5))
        .await
        .expect("insert failed");
    append_action(&pool, signal.id, "default-user", UserAction::Useful, "")
        .await
        .expect("append_action failed");

    assert!(delete_signal(&pool, signal.id).await.expect("delete failed"));

    assert!(get_signal(&pool, signal.id)
        .await
        .expect("get_signal failed")
        .is_none());
    let orphaned = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM signal_actions")
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(orphaned, 0);
}
