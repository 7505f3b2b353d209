//! Background scan pipeline.
//!
//! A fixed pool of workers drains a shared queue of uploaded scans. For each
//! job: mark the task processing, OCR the saved image (degrading to the
//! placeholder text if the sidecar is down), run the LLM analysis, insert
//! the history row, then complete the task with the response payload the
//! client polls for.
//!
//! An analysis that carries an `error` field still completes its task; the
//! error travels inside the payload. Only storage or filesystem failures
//! mark a task failed. There are no retries.

use ecoscan_core::{chat_context, ProductAnalysis, UserPreferences, OCR_FAILURE_PLACEHOLDER};
use ecoscan_llm::AnalysisProvider;
use ecoscan_ocr::OcrClient;
use ecoscan_store::{NewScanRecord, StoreError, StoreResult, Stores};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// One queued scan
#[derive(Debug, Clone)]
pub struct ScanJob {
    pub task_id: String,
    pub user_id: i64,
    /// Saved filename under the upload directory
    pub image_filename: String,
}

/// Everything a worker needs to process jobs
#[derive(Clone)]
pub struct ScanContext {
    pub stores: Stores,
    pub ocr: OcrClient,
    pub llm: Arc<dyn AnalysisProvider>,
    pub upload_dir: PathBuf,
}

/// Spawn `n` workers draining the scan queue. Workers exit when the last
/// sender is dropped.
pub fn spawn_workers(
    n: usize,
    queue: flume::Receiver<ScanJob>,
    ctx: ScanContext,
) -> Vec<JoinHandle<()>> {
    (0..n)
        .map(|worker_id| {
            let queue = queue.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move {
                info!(worker_id, "Scan worker started");
                while let Ok(job) = queue.recv_async().await {
                    let task_id = job.task_id.clone();
                    if let Err(e) = process_job(&ctx, job).await {
                        error!(worker_id, task_id, "Scan task failed: {}", e);
                        if let Err(e) = ctx.stores.tasks.fail(&task_id, &e.to_string()) {
                            error!(task_id, "Could not record task failure: {}", e);
                        }
                    }
                }
                info!(worker_id, "Scan worker stopped");
            })
        })
        .collect()
}

async fn process_job(ctx: &ScanContext, job: ScanJob) -> StoreResult<()> {
    ctx.stores.tasks.mark_processing(&job.task_id)?;

    let user = ctx
        .stores
        .users
        .get_by_id(job.user_id)?
        .ok_or_else(|| StoreError::NotFound(format!("user {}", job.user_id)))?;
    let prefs = user.preferences.lowercased();

    let ocr_text = match tokio::fs::read(ctx.upload_dir.join(&job.image_filename)).await {
        Ok(image) => {
            ctx.ocr
                .recognize_or_placeholder(&job.image_filename, image)
                .await
        }
        Err(e) => {
            warn!(filename = %job.image_filename, "Could not read upload: {}", e);
            OCR_FAILURE_PLACEHOLDER.to_string()
        }
    };

    let analysis = ctx.llm.analyze(&ocr_text, &prefs).await;
    if let Some(error) = &analysis.error {
        warn!(task_id = %job.task_id, "Analysis degraded: {}", error);
    }

    ctx.stores.history.insert(NewScanRecord {
        user_id: job.user_id,
        product_name: analysis.product_name.clone(),
        health_score: analysis.health_score,
        eco_score: analysis.eco_score,
        image_filename: Some(job.image_filename.clone()),
        full_analysis: serde_json::to_value(&analysis)
            .map_err(|e| StoreError::Serialization(e.to_string()))?,
    })?;

    let payload = scan_payload(&analysis, &prefs, &job.image_filename);
    ctx.stores.tasks.complete(&job.task_id, &payload)?;
    info!(task_id = %job.task_id, product = %analysis.product_name, "Scan completed");
    Ok(())
}

/// The payload stored on the task and returned to the polling client
fn scan_payload(
    analysis: &ProductAnalysis,
    prefs: &UserPreferences,
    image_filename: &str,
) -> serde_json::Value {
    json!({
        "structureData": analysis,
        "healthScore": analysis.health_score,
        "ecoScore": analysis.eco_score,
        "ecoScoreReasoning": analysis.eco_score_reasoning,
        "benefits": analysis.nutritional_benefits,
        "notes": analysis.personalized_notes,
        "context": chat_context(analysis, prefs),
        "userPreferences": prefs,
        "detectedAllergens": analysis.detected_allergens,
        "productImage": format!("/uploads/{}", image_filename),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoscan_config::OcrConfig;
    use ecoscan_core::{TaskStatus, Verdict};
    use ecoscan_llm::MockProvider;
    use ecoscan_store::SqlitePool;

    fn analysis() -> ProductAnalysis {
        ProductAnalysis {
            product_name: "Oat Bar".into(),
            health_score: 82,
            eco_score: 64,
            eco_score_reasoning: "Recyclable wrapper".into(),
            verdict: Verdict::Safe,
            nutritional_benefits: vec!["High fiber".into()],
            detected_allergens: vec!["oats".into()],
            ..ProductAnalysis::default()
        }
    }

    fn context(dir: &tempfile::TempDir, provider: MockProvider) -> (ScanContext, i64) {
        let stores = Stores::new(SqlitePool::memory().unwrap());
        let user = stores
            .users
            .create("alice", "alice@example.com", "hash")
            .unwrap();
        let ctx = ScanContext {
            stores,
            // nothing listens here; OCR degrades to the placeholder
            ocr: OcrClient::new(&OcrConfig {
                service_url: "http://127.0.0.1:9/ocr".into(),
                timeout_secs: 1,
                ..OcrConfig::default()
            }),
            llm: Arc::new(provider),
            upload_dir: dir.path().to_path_buf(),
        };
        (ctx, user.id)
    }

    #[tokio::test]
    async fn job_completes_and_result_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("scan.jpg"), b"img").unwrap();
        let (ctx, user_id) = context(&dir, MockProvider::new(analysis()));
        ctx.stores.tasks.create("t1", user_id).unwrap();

        process_job(
            &ctx,
            ScanJob {
                task_id: "t1".into(),
                user_id,
                image_filename: "scan.jpg".into(),
            },
        )
        .await
        .unwrap();

        let task = ctx.stores.tasks.get_for_user("t1", user_id).unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);

        let result = task.result.unwrap();
        assert_eq!(result["healthScore"], 82);
        assert_eq!(result["productImage"], "/uploads/scan.jpg");
        assert_eq!(result["structureData"]["product_name"], "Oat Bar");
        // the analysis stored in history matches what the task returned
        let history = ctx.stores.history.list_for_user(user_id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].product_name, "Oat Bar");
        assert_eq!(history[0].full_analysis, result["structureData"]);
    }

    #[tokio::test]
    async fn degraded_analysis_still_completes_the_task() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("scan.jpg"), b"img").unwrap();
        let degraded = ProductAnalysis::degraded("", "OCR failed");
        let (ctx, user_id) = context(&dir, MockProvider::new(degraded));
        ctx.stores.tasks.create("t1", user_id).unwrap();

        process_job(
            &ctx,
            ScanJob {
                task_id: "t1".into(),
                user_id,
                image_filename: "scan.jpg".into(),
            },
        )
        .await
        .unwrap();

        let task = ctx.stores.tasks.get_for_user("t1", user_id).unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        let result = task.result.unwrap();
        assert_eq!(result["structureData"]["error"], "OCR failed");
        // degraded scans fall back to neutral scores and a placeholder name
        assert_eq!(result["structureData"]["product_name"], "Unknown Product");
        assert_eq!(result["healthScore"], 50);
    }

    #[tokio::test]
    async fn missing_upload_degrades_to_placeholder_text() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::new(analysis());
        let (ctx, user_id) = context(&dir, provider.clone());
        ctx.stores.tasks.create("t1", user_id).unwrap();

        process_job(
            &ctx,
            ScanJob {
                task_id: "t1".into(),
                user_id,
                image_filename: "missing.jpg".into(),
            },
        )
        .await
        .unwrap();

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(
            &calls[0],
            ecoscan_llm::mock::MockCall::Analyze { ocr_text } if ocr_text == OCR_FAILURE_PLACEHOLDER
        ));
    }

    #[tokio::test]
    async fn workers_drain_the_queue() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("scan.jpg"), b"img").unwrap();
        let (ctx, user_id) = context(&dir, MockProvider::new(analysis()));
        ctx.stores.tasks.create("t1", user_id).unwrap();
        ctx.stores.tasks.create("t2", user_id).unwrap();

        let (tx, rx) = flume::bounded(8);
        let handles = spawn_workers(2, rx, ctx.clone());

        for id in ["t1", "t2"] {
            tx.send_async(ScanJob {
                task_id: id.into(),
                user_id,
                image_filename: "scan.jpg".into(),
            })
            .await
            .unwrap();
        }
        drop(tx);
        for handle in handles {
            handle.await.unwrap();
        }

        for id in ["t1", "t2"] {
            let task = ctx.stores.tasks.get_for_user(id, user_id).unwrap().unwrap();
            assert_eq!(task.status, TaskStatus::Completed);
        }
    }
}
