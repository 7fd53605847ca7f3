//! The crawl pipeline over the portal's academic hierarchy.
//!
//! Three sequential stages (institutes → departments → programs) share
//! one shape: fetch the parent page, extract and classify links, diff
//! against the stored children, and upsert what is new or changed. The
//! subject stage is parallel and lives in [`subjects`].
//!
//! The department and program stages resume from the last parent a
//! previous run touched (boundary re-included), so an interrupted crawl
//! picks up where it stopped without refetching the whole tree.

pub mod subjects;

use anyhow::{Result, bail};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{info, warn};
use url::Url;

use crate::data::{departments, institutes, programs};
use crate::portal::links::{
    DEPARTMENT_LINK, INSTITUTE_LINK, PROGRAM_LINK, extract_links, filter_links,
};
use crate::portal::PortalClient;

/// Entries that are new or whose URL changed since the last crawl.
/// Unchanged entries are left alone so their ids stay stable.
fn new_or_changed(
    found: &HashMap<String, String>,
    existing: &HashMap<String, String>,
) -> Vec<(String, String)> {
    found
        .iter()
        .filter(|(name, url)| existing.get(*name) != Some(url))
        .map(|(name, url)| (name.clone(), url.clone()))
        .collect()
}

/// Crawls the portal's main page for institute links.
///
/// An empty institute set is a hard error: nothing downstream can work,
/// and it usually means the link classifier no longer fits the portal.
pub async fn crawl_institutes(
    client: &mut PortalClient,
    pool: &SqlitePool,
    main_url: &Url,
) -> Result<u64> {
    let Some(page) = client.fetch(main_url.as_str()).await? else {
        bail!("main portal page could not be fetched");
    };
    let found = filter_links(&extract_links(&page, main_url), &INSTITUTE_LINK);
    if found.is_empty() {
        bail!("no institute links found on the main page");
    }

    let existing = institutes::url_by_name(pool).await?;
    let fresh = new_or_changed(&found, &existing);
    if fresh.is_empty() {
        info!("no new or updated institutes");
        return Ok(0);
    }
    institutes::upsert_many(pool, &fresh).await?;
    info!(count = fresh.len(), "institutes saved");
    Ok(fresh.len() as u64)
}

/// Crawls each institute page for department links, resuming from the
/// last institute a previous run reached.
pub async fn crawl_departments(
    client: &mut PortalClient,
    pool: &SqlitePool,
    base_url: &Url,
) -> Result<u64> {
    let resume_from = departments::last_institute_id(pool).await?;
    let parents = institutes::from_id(pool, resume_from).await?;
    info!(resume_from, institutes = parents.len(), "department stage starting");

    let mut saved = 0u64;
    for (institute_id, institute_url) in parents {
        let Some(page) = client.fetch(&institute_url).await? else {
            continue;
        };
        let found = filter_links(&extract_links(&page, base_url), &DEPARTMENT_LINK);
        if found.is_empty() {
            warn!(institute_id, "no departments found");
            continue;
        }

        let existing = departments::url_by_name(pool, institute_id).await?;
        let fresh = new_or_changed(&found, &existing);
        if fresh.is_empty() {
            info!(institute_id, "no new or updated departments");
            continue;
        }
        departments::upsert_many(pool, institute_id, &fresh).await?;
        info!(institute_id, count = fresh.len(), "departments saved");
        saved += fresh.len() as u64;
    }
    Ok(saved)
}

/// Crawls each department page for program links, resuming from the
/// last department a previous run reached.
pub async fn crawl_programs(
    client: &mut PortalClient,
    pool: &SqlitePool,
    base_url: &Url,
) -> Result<u64> {
    let resume_from = programs::last_department_id(pool).await?;
    let parents = departments::from_id(pool, resume_from).await?;
    info!(resume_from, departments = parents.len(), "program stage starting");

    let mut saved = 0u64;
    for (department_id, department_url) in parents {
        let Some(page) = client.fetch(&department_url).await? else {
            continue;
        };
        let found = filter_links(&extract_links(&page, base_url), &PROGRAM_LINK);
        if found.is_empty() {
            warn!(department_id, "no programs found");
            continue;
        }

        let existing = programs::url_by_name(pool, department_id).await?;
        let fresh = new_or_changed(&found, &existing);
        if fresh.is_empty() {
            info!(department_id, "no new or updated programs");
            continue;
        }
        programs::upsert_many(pool, department_id, &fresh).await?;
        info!(department_id, count = fresh.len(), "programs saved");
        saved += fresh.len() as u64;
    }
    Ok(saved)
}
