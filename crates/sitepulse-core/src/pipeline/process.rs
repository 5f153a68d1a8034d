//! Run execution
//!
//! One run publishes, in order: the in-progress status, throttled progress,
//! one category event per category, the summary and the completed status.
//! Any failure is reported as an error event followed by `errors_found`.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use chrono::Utc;
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error, info, trace, warn};

use super::config::{
    category_progress, SITE_SNAPSHOT_TASK, SUMMARY_TASK, WORDPRESS_CATEGORY,
    WORDPRESS_SNAPSHOT_TASK,
};
use super::core::AnalysisPipeline;
use super::parsing::{category_issues, default_category_map, parse_category_map, platform_findings};
use super::platform::detect_platform;
use super::request::{fallback_summary, AnalysisRequest};
use super::throttle::ProgressThrottle;
use crate::error::{Error, Result};
use crate::event_bus::{EventBus, Platform, RunState, SiteEvent};
use crate::run_store::RunOutcome;

/// Progress reported right after the run starts
const INITIAL_PROGRESS: u8 = 5;
/// Progress carried by the summary event
const SUMMARY_PROGRESS: u8 = 99;

/// Publishes a run's events with consecutive revisions.
struct RunEmitter<'a> {
    bus: &'a EventBus,
    channel: &'a str,
    revision: u64,
    throttle: ProgressThrottle,
}

impl<'a> RunEmitter<'a> {
    fn new(bus: &'a EventBus, channel: &'a str, throttle: ProgressThrottle) -> Self {
        Self {
            bus,
            channel,
            revision: 1,
            throttle,
        }
    }

    fn emit(&mut self, event: SiteEvent) {
        self.revision = self.bus.publish_with_meta(self.channel, event, self.revision);
    }

    /// Suppressed progress consumes no revision.
    fn progress(&mut self, progress: u8) {
        if self.throttle.allow() {
            self.emit(SiteEvent::progress(progress));
        } else {
            trace!(channel = %self.channel, progress, "Progress throttled");
        }
    }

    fn fail(&mut self, message: String) {
        self.emit(SiteEvent::error(message));
        self.emit(SiteEvent::status(RunState::ErrorsFound));
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "run panicked".to_string()
    }
}

impl AnalysisPipeline {
    /// Execute one run on channel `run_id`.
    ///
    /// Never fails: a rejected or failed run ends with an error event and an
    /// `errors_found` status on the channel. The session slot is released on
    /// every exit.
    pub async fn run(&self, run_id: &str, request: AnalysisRequest) {
        let session_key = request.session_key();
        let throttle = ProgressThrottle::new(self.config.min_progress_interval());
        let mut emitter = RunEmitter::new(&self.bus, run_id, throttle);

        let Some(_permit) = self.limiter.acquire_permit(&session_key) else {
            warn!(
                run_id = %run_id,
                session_key = %session_key,
                "Run rejected, session at capacity"
            );
            let err = Error::ConcurrencyRejected { session_key };
            emitter.fail(err.public_message());
            self.record_failure(run_id, None, &err);
            return;
        };

        let platform = detect_platform(&self.config.platform, &request.url, request.platform);
        info!(
            run_id = %run_id,
            session_key = %session_key,
            url = %request.url,
            platform = %platform,
            "Analysis run started"
        );

        let result = AssertUnwindSafe(self.execute(&mut emitter, run_id, &request, platform))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(Error::Internal(panic_message(payload))));

        match result {
            Ok(()) => {
                info!(run_id = %run_id, "Analysis run completed");
            }
            Err(err) => {
                error!(run_id = %run_id, error = %err, "Analysis run failed");
                emitter.fail(err.public_message());
                self.record_failure(run_id, Some(platform), &err);
            }
        }
    }

    async fn execute(
        &self,
        emitter: &mut RunEmitter<'_>,
        run_id: &str,
        request: &AnalysisRequest,
        platform: Platform,
    ) -> Result<()> {
        emitter.emit(SiteEvent::Status {
            state: RunState::InProgress,
            progress: None,
            platform: Some(platform),
            message: None,
        });
        emitter.progress(INITIAL_PROGRESS);

        let snapshot = self.engine.run_task(SITE_SNAPSHOT_TASK, &request.url).await?;
        let mut categories = parse_category_map(&snapshot.result).unwrap_or_else(|| {
            debug!(run_id = %run_id, "Snapshot is not a JSON object, using default categories");
            default_category_map()
        });

        let max_issues = self.config.max_issues_per_category;
        if platform == Platform::WordPress {
            let wordpress = self
                .engine
                .run_task(WORDPRESS_SNAPSHOT_TASK, &request.url)
                .await?;
            let findings = platform_findings(&wordpress.result, max_issues);
            categories.insert(WORDPRESS_CATEGORY.to_string(), Value::Array(findings));
        }

        for (index, category) in self.config.category_order(platform).into_iter().enumerate() {
            let progress = category_progress(index);
            let issues = categories
                .get(&category)
                .map(|value| category_issues(value, max_issues))
                .unwrap_or_default();
            debug!(
                run_id = %run_id,
                category = %category,
                issues = issues.len(),
                "Category analysed"
            );
            emitter.emit(SiteEvent::category(category, issues, progress));
            emitter.progress(progress);
        }

        let summary = self.engine.run_task(SUMMARY_TASK, &request.url).await?;
        let message = match summary.result.trim() {
            "" => fallback_summary(request.name.as_deref(), &request.language, platform),
            text => text.to_string(),
        };

        emitter.emit(SiteEvent::Summary {
            state: RunState::InProgress,
            message: message.clone(),
            progress: SUMMARY_PROGRESS,
            platform: Some(platform),
        });

        self.results.insert(RunOutcome {
            run_id: run_id.to_string(),
            state: RunState::Completed,
            platform: Some(platform),
            summary: Some(message),
            error: None,
            finished_at: Utc::now(),
        });

        emitter.emit(SiteEvent::Status {
            state: RunState::Completed,
            progress: Some(100),
            platform: Some(platform),
            message: None,
        });

        Ok(())
    }

    fn record_failure(&self, run_id: &str, platform: Option<Platform>, err: &Error) {
        self.results.insert(RunOutcome {
            run_id: run_id.to_string(),
            state: RunState::ErrorsFound,
            platform,
            summary: None,
            error: Some(err.public_message()),
            finished_at: Utc::now(),
        });
    }
}
