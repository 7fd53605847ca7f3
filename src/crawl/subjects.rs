//! Parallel resolution of subjects across programs.
//!
//! The subject stage is the only parallel section of the crawl. Programs
//! past the resume boundary are split into contiguous slices, one worker
//! task per slice; every worker owns its own [`PortalClient`] (sessions
//! are never shared) and only reads from the database. All writes happen
//! in the coordinator after the workers return their batches, so there
//! is never more than one writer.
//!
//! Cancellation is cooperative: workers poll a token at the top of each
//! program and each subject iteration and return partial results.

use anyhow::Result;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::data::subjects::{self, NewSubject};
use crate::data::programs;
use crate::portal::{PortalClient, table, xml};

/// Runs the subject stage. Returns the number of subjects inserted.
pub async fn crawl_subjects(
    pool: &SqlitePool,
    config: &Config,
    cancel: CancellationToken,
) -> Result<u64> {
    let resume_from = subjects::last_program_id(pool).await?;
    let batch = programs::from_id(pool, resume_from).await?;
    if batch.is_empty() {
        info!("no programs to resolve subjects for");
        return Ok(0);
    }
    info!(
        resume_from,
        programs = batch.len(),
        workers = config.subject_workers,
        "subject stage starting"
    );

    let workers = config.subject_workers.max(1);
    let slice_len = batch.len().div_ceil(workers);
    let mut handles = Vec::new();
    for (worker_id, slice) in batch.chunks(slice_len).enumerate() {
        let worker = Worker {
            id: worker_id,
            programs: slice.to_vec(),
            pool: pool.clone(),
            config: config.clone(),
            cancel: cancel.clone(),
        };
        handles.push(tokio::spawn(worker.run()));
    }

    let mut inserted = 0u64;
    for joined in futures::future::join_all(handles).await {
        let batches = match joined {
            Ok(Ok(batches)) => batches,
            Ok(Err(e)) => {
                warn!(error = ?e, "worker failed");
                continue;
            }
            Err(e) => {
                warn!(error = ?e, "worker panicked");
                continue;
            }
        };
        for program_batch in batches {
            if program_batch.is_empty() {
                continue;
            }
            subjects::insert_batch(pool, &program_batch).await?;
            info!(
                program_id = program_batch[0].program_id,
                count = program_batch.len(),
                "new subjects saved"
            );
            inserted += program_batch.len() as u64;
        }
    }
    Ok(inserted)
}

struct Worker {
    id: usize,
    programs: Vec<(i64, String)>,
    pool: SqlitePool,
    config: Config,
    cancel: CancellationToken,
}

impl Worker {
    /// Resolves the worker's program slice, returning one batch of new
    /// subjects per program. Per-subject failures degrade to sentinel
    /// values; per-program failures skip the program.
    async fn run(self) -> Result<Vec<Vec<NewSubject>>> {
        let mut client = PortalClient::new(
            self.config.worker_credentials(self.id),
            self.config.ssl_certificate.as_deref(),
            self.config.pause_range(),
        )?;

        let mut batches = Vec::new();
        for (program_id, program_url) in &self.programs {
            if self.cancel.is_cancelled() {
                info!(worker_id = self.id, "worker stopping on cancellation");
                break;
            }
            match self
                .resolve_program(&mut client, *program_id, program_url)
                .await
            {
                Ok(Some(batch)) => batches.push(batch),
                Ok(None) => {}
                Err(e) => {
                    warn!(worker_id = self.id, program_id, error = ?e, "program skipped");
                }
            }
        }
        Ok(batches)
    }

    async fn resolve_program(
        &self,
        client: &mut PortalClient,
        program_id: i64,
        program_url: &str,
    ) -> Result<Option<Vec<NewSubject>>> {
        let Some(page) = client.fetch(program_url).await? else {
            return Ok(None);
        };
        let Some(export_link) = xml::find_export_link(&page) else {
            warn!(worker_id = self.id, program_id, "no XML export link on program page");
            return Ok(None);
        };
        let Some(export) = client.fetch(&export_link).await? else {
            return Ok(None);
        };
        let pairs = xml::subject_pairs(&xml::row_values(&export, xml::SUBJECT_FIELD));
        let existing = subjects::existing_pairs(&self.pool, program_id).await?;

        let mut batch = Vec::new();
        for (name, url) in dedup_by_name(pairs) {
            if self.cancel.is_cancelled() {
                info!(worker_id = self.id, "worker stopping on cancellation");
                break;
            }
            let (semester, eval_method) = resolve_subject(client, &name, &url).await;
            if existing.contains(&(name.clone(), semester)) {
                continue;
            }
            debug!(
                worker_id = self.id,
                subject = %name,
                semester,
                eval_method = %eval_method,
                program_id,
                "subject resolved"
            );
            batch.push(NewSubject {
                name,
                semester,
                eval_method,
                url,
                program_id,
            });
        }

        if batch.is_empty() {
            info!(worker_id = self.id, program_id, "no new subjects");
            return Ok(None);
        }
        Ok(Some(batch))
    }
}

/// Collapses duplicate subject names, keeping the position of the first
/// occurrence and the URL of the last (the export occasionally repeats a
/// subject with a corrected link).
fn dedup_by_name(pairs: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut order: Vec<(String, String)> = Vec::new();
    for (name, url) in pairs {
        match order.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = url,
            None => order.push((name, url)),
        }
    }
    order
}

/// Scrapes one subject page for its semester and evaluation method.
///
/// Every failure mode (fetch denied, transport error, no tables, bad
/// number) degrades to the sentinels (0, "") so a single bad page never
/// aborts the batch.
async fn resolve_subject(client: &mut PortalClient, name: &str, url: &str) -> (i64, String) {
    let body = match client.fetch(url).await {
        Ok(Some(body)) => body,
        Ok(None) => return (0, String::new()),
        Err(e) => {
            warn!(subject = %name, url, error = ?e, "subject page fetch failed");
            return (0, String::new());
        }
    };
    let rows = table::normalize_page(&body);

    let semester = rows
        .iter()
        .find_map(|row| row.semester.as_deref())
        .map(|raw| {
            raw.parse().unwrap_or_else(|_| {
                warn!(subject = %name, raw, "invalid semester value");
                0
            })
        })
        .unwrap_or(0);

    let eval_method = rows
        .iter()
        .find_map(|row| row.eval_method.clone())
        .unwrap_or_default();

    (semester, eval_method)
}
