//! Entity resolution: find-or-create with enrichment merging.
//!
//! Resolution is deliberately forgiving. A failure to persist a company or
//! person is logged and swallowed, the signal still gets assembled without
//! the link. Bad entity data must never cost us a signal.

use sqlx::PgPool;
use uuid::Uuid;

use sigdesk_core::{validate::is_valid_person_name, CompanyCandidate, PersonCandidate};
use sigdesk_db::{
    find_company_by_name_ci, find_person_by_name_ci, insert_company, insert_person,
    update_company_merged, update_person_merged,
};

use crate::merge::{merge_company, merge_person};

/// The stored identity a signal links to after company resolution.
#[derive(Debug, Clone)]
pub struct ResolvedCompany {
    pub id: Uuid,
    pub name: String,
}

/// Finds an existing company by case-insensitive name and enriches it, or
/// creates a new row. Returns `None` for unusable candidates and on
/// persistence failure.
pub async fn resolve_company(
    pool: &PgPool,
    candidate: &CompanyCandidate,
) -> Option<ResolvedCompany> {
    if candidate.name.trim().is_empty() {
        return None;
    }

    match find_company_by_name_ci(pool, &candidate.name).await {
        Ok(Some(existing)) => {
            let merged = merge_company(&existing, candidate);
            // The candidate's spelling is the display name for this signal,
            // whatever casing the stored row carries.
            match update_company_merged(pool, existing.id, &merged).await {
                Ok(row) => Some(ResolvedCompany {
                    id: row.id,
                    name: candidate.name.clone(),
                }),
                Err(err) => {
                    tracing::warn!(company = %candidate.name, error = %err, "company merge failed");
                    // The match itself is still good.
                    Some(ResolvedCompany {
                        id: existing.id,
                        name: candidate.name.clone(),
                    })
                }
            }
        }
        Ok(None) => match insert_company(pool, candidate).await {
            Ok(row) => Some(ResolvedCompany {
                id: row.id,
                name: row.name,
            }),
            Err(err) => {
                tracing::warn!(company = %candidate.name, error = %err, "company insert failed");
                None
            }
        },
        Err(err) => {
            tracing::warn!(company = %candidate.name, error = %err, "company lookup failed");
            None
        }
    }
}

/// Finds an existing person by case-insensitive name and enriches them, or
/// creates a new row. Candidates failing the name plausibility check are
/// rejected here again, whatever upstream produced them.
pub async fn resolve_person(pool: &PgPool, candidate: &PersonCandidate) -> Option<Uuid> {
    if !is_valid_person_name(&candidate.name) {
        tracing::debug!(name = %candidate.name, "rejected implausible person name");
        return None;
    }

    match find_person_by_name_ci(pool, &candidate.name).await {
        Ok(Some(existing)) => {
            let merged = merge_person(&existing, candidate);
            match update_person_merged(pool, existing.id, &merged).await {
                Ok(row) => Some(row.id),
                Err(err) => {
                    tracing::warn!(person = %candidate.name, error = %err, "person merge failed");
                    Some(existing.id)
                }
            }
        }
        Ok(None) => match insert_person(pool, candidate).await {
            Ok(row) => Some(row.id),
            Err(err) => {
                tracing::warn!(person = %candidate.name, error = %err, "person insert failed");
                None
            }
        },
        Err(err) => {
            tracing::warn!(person = %candidate.name, error = %err, "person lookup failed");
            None
        }
    }
}
