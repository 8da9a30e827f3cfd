use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use log::{debug, error, info, warn};

use crate::app_config::Config;
use crate::artifacts::{ArtifactStore, FileArtifactStore};
use crate::changelog::diff::extract_new_entries;
use crate::changelog::fingerprint::has_changed;
use crate::changelog::merge::{DocumentMerger, HeaderInfo, MergeKind};
use crate::changelog::policy::{FullReason, Strategy, decide_with_override};
use crate::changelog::versions::{count_versions, limit_versions};
use crate::errors::AppError;
use crate::fetch::{ChangelogSource, HttpChangelogSource};
use crate::notify::{DisabledNotifier, DiscordNotifier, Notification, Notifier};
use crate::providers::Provider;
use crate::state::{FileStateStore, StateStore};
use crate::translation::{TranslationClient, TranslationMode, UsageRecord};

// @module: Application controller for changelog translation runs

/// Step of a run, used in logs and failure notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Fetching,
    Comparing,
    Deciding,
    Extracting,
    Translating,
    Merging,
    Persisting,
    Notifying,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetching => "fetching",
            Self::Comparing => "comparing",
            Self::Deciding => "deciding",
            Self::Extracting => "extracting",
            Self::Translating => "translating",
            Self::Merging => "merging",
            Self::Persisting => "persisting",
            Self::Notifying => "notifying",
        };
        f.write_str(name)
    }
}

/// Per-run switches from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Translate in full even when an incremental run would do
    pub force_full: bool,
    /// Stop after deciding, without translating or writing
    pub dry_run: bool,
}

/// Policy tunables
#[derive(Debug, Clone, Copy)]
pub struct PolicySettings {
    pub full_translation_interval: u32,
    pub max_versions_to_translate: Option<usize>,
}

/// What a run would translate
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub strategy: Strategy,
    /// Counter persisted on success
    pub counter: u32,
    /// Lines of the extracted fragment, for incremental runs
    pub extracted_lines: Option<usize>,
    /// Characters submitted for translation
    pub unit_chars: usize,
    /// Version sections submitted for translation
    pub versions_translated: usize,
    /// Version sections in the fetched document
    pub versions_total: usize,
}

/// Summary of a translated run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub strategy: Strategy,
    pub counter: u32,
    pub extracted_lines: Option<usize>,
    pub usage: UsageRecord,
    /// Attempts the translation call needed
    pub attempts: u32,
    /// Set for incremental merges
    pub merge: Option<MergeKind>,
    pub artifact_locations: Vec<String>,
    pub elapsed: Duration,
    pub finished_at: DateTime<Local>,
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Source identical to the last handled document; nothing written
    Unchanged,
    /// Dry run; nothing translated or written
    Planned(RunPlan),
    /// Translation saved, state committed
    Translated(RunReport),
}

impl RunOutcome {
    /// Estimated cost of the run in USD
    pub fn cost_estimate_usd(&self) -> f64 {
        match self {
            Self::Translated(report) => report.usage.cost_estimate_usd,
            _ => 0.0,
        }
    }
}

struct RunFailure {
    phase: RunPhase,
    error: AppError,
}

impl RunFailure {
    fn at<E: Into<AppError>>(phase: RunPhase, error: E) -> Self {
        Self {
            phase,
            error: error.into(),
        }
    }
}

fn enter(phase: RunPhase) {
    debug!("Phase: {}", phase);
}

struct Prepared {
    plan: RunPlan,
    unit: String,
}

/// Main application controller for changelog translation
pub struct Controller {
    source: Arc<dyn ChangelogSource>,
    state: Arc<dyn StateStore>,
    artifacts: Arc<dyn ArtifactStore>,
    translator: TranslationClient,
    notifier: Arc<dyn Notifier>,
    merger: DocumentMerger,
    policy: PolicySettings,
}

impl Controller {
    pub fn new(
        source: Arc<dyn ChangelogSource>,
        state: Arc<dyn StateStore>,
        artifacts: Arc<dyn ArtifactStore>,
        translator: TranslationClient,
        notifier: Arc<dyn Notifier>,
        merger: DocumentMerger,
        policy: PolicySettings,
    ) -> Self {
        Self {
            source,
            state,
            artifacts,
            translator,
            notifier,
            merger,
            policy,
        }
    }

    // @method: Wire file-backed stores, the HTTP source and the configured notifier around `provider`
    pub fn with_config(config: &Config, provider: Arc<dyn Provider>) -> Self {
        let translator = TranslationClient::new(
            provider,
            config.generation_settings(),
            config.translation.prompts.clone(),
            config.retry_policy(),
            config.pricing(),
        )
        .with_client_error_stop(config.translation.stop_on_client_errors);

        let notifier: Arc<dyn Notifier> = match &config.notification.webhook_url {
            Some(url) => Arc::new(DiscordNotifier::new(
                url.clone(),
                config.notification.username.clone(),
                config.notification.jpy_per_usd,
            )),
            None => Arc::new(DisabledNotifier),
        };

        Self::new(
            Arc::new(HttpChangelogSource::new(config.source_url.clone(), config.fetch_timeout())),
            Arc::new(FileStateStore::new(config.state_dir())),
            Arc::new(FileArtifactStore::new(config.document_path(), config.body_path())),
            translator,
            notifier,
            DocumentMerger::new(config.title.clone(), config.source_url.clone()),
            PolicySettings {
                full_translation_interval: config.policy.full_translation_interval,
                max_versions_to_translate: config.policy.max_versions_to_translate,
            },
        )
    }

    /// Run once: fetch, compare, translate what changed, merge, commit, notify.
    ///
    /// Fatal errors are reported through the notifier before being returned.
    pub async fn run(&self, options: RunOptions) -> Result<RunOutcome, AppError> {
        match self.execute(options).await {
            Ok(outcome) => Ok(outcome),
            Err(RunFailure { phase, error }) => {
                error!("Run failed while {}: {}", phase, error);
                self.deliver(&Notification::Failure {
                    message: format!("Failed while {}: {}", phase, error),
                })
                .await;
                Err(error)
            }
        }
    }

    /// Forget the persisted state so the next run starts over
    pub fn reset(&self) -> Result<(), AppError> {
        self.state.clear()?;
        info!("Persisted state cleared");
        Ok(())
    }

    async fn execute(&self, options: RunOptions) -> Result<RunOutcome, RunFailure> {
        let start_time = Instant::now();

        enter(RunPhase::Fetching);
        info!("Fetching {}", self.source.location());
        let document = self.source.fetch().await.map_err(|e| RunFailure::at(RunPhase::Fetching, e))?;
        debug!("Fetched {} lines", document.lines().count());

        enter(RunPhase::Comparing);
        let state = self.state.load().map_err(|e| RunFailure::at(RunPhase::Comparing, e))?;
        if !has_changed(&document, state.last_fingerprint.as_ref()) {
            info!("No changes since the last run");
            return Ok(RunOutcome::Unchanged);
        }

        // An empty stored document counts as no previous run
        let previous = state.last_raw_document.as_deref().filter(|d| !d.is_empty());

        enter(RunPhase::Deciding);
        let decision = decide_with_override(
            previous.is_some(),
            state.translation_cycle_count,
            self.policy.full_translation_interval,
            options.force_full,
        );
        info!(
            "Change detected, strategy: {} (cycle {}/{})",
            decision.strategy, decision.counter, self.policy.full_translation_interval
        );

        enter(RunPhase::Extracting);
        let Prepared { plan, unit } = self.prepare(&document, previous, decision.strategy, decision.counter);

        if options.dry_run {
            info!(
                "Dry run: would translate {} characters ({})",
                plan.unit_chars, plan.strategy
            );
            return Ok(RunOutcome::Planned(plan));
        }

        let mode = if plan.strategy.is_full() {
            TranslationMode::Full
        } else {
            TranslationMode::Incremental
        };
        enter(RunPhase::Translating);
        let translation = self
            .translator
            .translate(&unit, mode)
            .await
            .map_err(|e| RunFailure::at(RunPhase::Translating, e))?;

        enter(RunPhase::Merging);
        let header = HeaderInfo::now(plan.versions_total);
        let merge = if plan.strategy.is_full() {
            self.merger
                .save(self.artifacts.as_ref(), &translation.text, &header)
                .map_err(|e| RunFailure::at(RunPhase::Merging, e))?;
            None
        } else {
            let (_, kind) = self
                .merger
                .append(self.artifacts.as_ref(), &translation.text, &header)
                .map_err(|e| RunFailure::at(RunPhase::Merging, e))?;
            Some(kind)
        };

        enter(RunPhase::Persisting);
        self.state
            .commit(&document, plan.counter)
            .map_err(|e| RunFailure::at(RunPhase::Persisting, e))?;

        let report = RunReport {
            strategy: plan.strategy,
            counter: plan.counter,
            extracted_lines: plan.extracted_lines,
            usage: translation.usage,
            attempts: translation.attempts,
            merge,
            artifact_locations: self.artifacts.locations(),
            elapsed: start_time.elapsed(),
            finished_at: Local::now(),
        };
        info!(
            "Translation saved in {:.1}s ({}), estimated cost ${:.3}",
            report.elapsed.as_secs_f64(),
            report.strategy,
            report.usage.cost_estimate_usd
        );

        enter(RunPhase::Notifying);
        self.deliver(&Notification::Success(report.clone())).await;
        Ok(RunOutcome::Translated(report))
    }

    /// Pick the translation unit for the decided strategy.
    ///
    /// An incremental run whose extraction comes back empty is translated in
    /// full instead; the decided counter is kept.
    fn prepare(&self, document: &str, previous: Option<&str>, strategy: Strategy, counter: u32) -> Prepared {
        if strategy == Strategy::Incremental {
            let fragment = previous
                .and_then(|previous| extract_new_entries(previous, document))
                .filter(|fragment| !fragment.trim().is_empty());
            match fragment {
                Some(fragment) => {
                    let extracted_lines = fragment.lines().count();
                    info!("Extracted {} lines of new entries", extracted_lines);
                    return Prepared {
                        plan: RunPlan {
                            strategy,
                            counter,
                            extracted_lines: Some(extracted_lines),
                            unit_chars: fragment.chars().count(),
                            versions_translated: count_versions(&fragment),
                            versions_total: count_versions(document),
                        },
                        unit: fragment,
                    };
                }
                None => {
                    warn!("No new entries could be extracted, falling back to a full translation");
                    return self.prepare_full(document, Strategy::Full(FullReason::ExtractionFallback), counter);
                }
            }
        }
        self.prepare_full(document, strategy, counter)
    }

    fn prepare_full(&self, document: &str, strategy: Strategy, counter: u32) -> Prepared {
        let limited = limit_versions(document, self.policy.max_versions_to_translate);
        if limited.is_truncated() {
            info!(
                "Translating the {} most recent of {} versions",
                limited.versions_included, limited.versions_total
            );
        }

        Prepared {
            plan: RunPlan {
                strategy,
                counter,
                extracted_lines: None,
                unit_chars: limited.text.chars().count(),
                versions_translated: limited.versions_included,
                versions_total: limited.versions_total,
            },
            unit: limited.text,
        }
    }

    async fn deliver(&self, notification: &Notification) {
        if let Err(e) = self.notifier.notify(notification).await {
            warn!("Notification failed: {}", e);
        }
    }
}
