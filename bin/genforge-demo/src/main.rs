//! genforge-demo – a scripted walk through one session.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON optional).
//! 3. Load the durable viewer-hint flag.
//! 4. Create the session handle and spawn the progress driver.
//! 5. Run the walkthrough: sign in, submit, tick to completion, upgrade,
//!    top up, sign out.

use std::time::Duration;

use tracing::{info, warn};

use genforge_core::{
    Config, GenerationRequest, HintStore, ProgressDriver, SessionHandle, SubmitError, Tier,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();
    let log_level = env_or("GENFORGE_LOG", "info");
    let log_json = std::env::var("GENFORGE_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: GENFORGE_LOG='{log_level}' is not a valid tracing filter ({e}); \
                     falling back to 'info'"
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    if log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "genforge-demo starting");

    // ── 3. Durable hint flag ───────────────────────────────────────────────────
    match HintStore::open_default() {
        Ok(hints) => {
            if hints.has_seen_viewer_hint() {
                info!("viewer hint already seen on this machine");
            } else if let Err(e) = hints.mark_viewer_hint_seen() {
                warn!(error = %e, "failed to persist viewer hint flag");
            } else {
                info!("viewer hint marked as seen");
            }
        }
        Err(e) => warn!(error = %e, "hint store unavailable"),
    }

    // ── 4. Session + progress driver ───────────────────────────────────────────
    let tick_interval = cfg.tick_interval;
    let session = SessionHandle::new(cfg);
    let driver = ProgressDriver::spawn(session.clone(), tick_interval);

    // ── 5. Walkthrough ─────────────────────────────────────────────────────────

    // A submit before sign-in is rejected without touching any state.
    match session.submit(GenerationRequest::model("capture.png")).await {
        Err(SubmitError::NotSignedIn) => info!("submit before sign-in correctly rejected"),
        other => warn!(?other, "unexpected pre-sign-in submit outcome"),
    }

    session.sign_in().await;
    info!(credits = session.credits().await, tier = %session.tier().await, "signed in");

    // Image-to-3D without a source image: the create screen's empty state.
    if let Err(e) = session
        .submit(GenerationRequest::model_without_reference())
        .await
    {
        info!(error = %e, "submission rejected");
    }

    // A real image-to-3D request.
    let model_id = session
        .submit(GenerationRequest::model("capture.png"))
        .await
        .map_err(|e| anyhow::anyhow!("model submit failed: {e}"))?;
    info!(task_id = %model_id, credits = session.credits().await, "model task queued");

    // The free tier caps concurrent work at one task.
    match session.submit(GenerationRequest::model("again.png")).await {
        Err(SubmitError::QueueFull { tier, max_processing }) => {
            info!(%tier, max_processing, "second submit denied; upgrade required")
        }
        other => warn!(?other, "unexpected concurrent submit outcome"),
    }

    wait_until_completed(&session, &model_id).await?;
    if let Some(target) = session.open_task(&model_id).await {
        info!(?target, "completed task opens the viewer");
    }

    // Paywall collaborator: upgrade, then generate an image with the
    // headroom the new tier provides.
    session.upgrade(Tier::Pro).await;
    info!(credits = session.credits().await, tier = %session.tier().await, "upgraded");

    let image_id = session
        .submit(GenerationRequest::image("ancient panda sculpture in a mossy forest"))
        .await
        .map_err(|e| anyhow::anyhow!("image submit failed: {e}"))?;
    wait_until_completed(&session, &image_id).await?;

    session.top_up(600).await;

    let tasks = session.tasks().await;
    info!(
        total = tasks.len(),
        credits = session.credits().await,
        "session summary"
    );
    for task in &tasks {
        info!(
            task_id = %task.id,
            kind = %task.kind,
            status = %task.status,
            progress = task.progress,
            title = %task.title,
            created_at = %task.created_at,
            "task"
        );
    }

    session.sign_out().await;
    info!(
        credits = session.credits().await,
        tier = %session.tier().await,
        tasks = session.tasks().await.len(),
        "signed out; session state reset"
    );

    driver.stop().await;
    info!("genforge-demo finished");
    Ok(())
}

/// Poll the queue until `id` completes (the driver ticks in the background).
async fn wait_until_completed(session: &SessionHandle, id: &str) -> anyhow::Result<()> {
    let deadline = Duration::from_secs(60);
    tokio::time::timeout(deadline, async {
        loop {
            if let Some(task) = session.find_task(id).await {
                if task.is_completed() {
                    info!(task_id = %id, title = %task.title, "task completed");
                    return;
                }
                info!(task_id = %id, progress = task.progress, "processing");
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("task {id} did not complete within {deadline:?}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
