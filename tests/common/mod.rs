/*!
 * Common test utilities for the changelog-translator test suite
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tempfile::TempDir;

use changelog_translator::app_controller::{Controller, PolicySettings};
use changelog_translator::artifacts::MemoryArtifactStore;
use changelog_translator::changelog::DocumentMerger;
use changelog_translator::fetch::StaticChangelogSource;
use changelog_translator::notify::RecordingNotifier;
use changelog_translator::providers::mock::MockProvider;
use changelog_translator::state::MemoryStateStore;
use changelog_translator::translation::retry::RecordingSleeper;
use changelog_translator::translation::{GenerationSettings, Pricing, PromptTemplates, RetryPolicy, TranslationClient};

/// Route `log` output through the test harness; later calls are no-ops
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// One version section, `## <version>` followed by three bullet lines
pub fn version_section(version: &str) -> String {
    format!(
        "## {v}\n\n- Added feature for {v}\n- Fixed a bug in {v}\n- Improved performance in {v}\n",
        v = version
    )
}

/// A changelog with versions `1.0.<first>` .. `1.0.<last>`, newest first
pub fn changelog(first: u32, last: u32) -> String {
    let mut document = String::from("# Changelog\n\n");
    for patch in (first..=last).rev() {
        document.push_str(&version_section(&format!("1.0.{}", patch)));
        document.push('\n');
    }
    document
}

/// Retry policy with the production shape
pub fn retry_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_secs(10))
}

/// Controller wired to in-memory collaborators that stay inspectable
pub struct Harness {
    pub source: Arc<StaticChangelogSource>,
    pub state: Arc<MemoryStateStore>,
    pub artifacts: Arc<MemoryArtifactStore>,
    pub provider: MockProvider,
    pub sleeper: Arc<RecordingSleeper>,
    pub notifier: Arc<RecordingNotifier>,
    pub policy: PolicySettings,
}

impl Harness {
    pub fn new(document: &str, state: MemoryStateStore, provider: MockProvider) -> Self {
        init_logging();
        Self {
            source: Arc::new(StaticChangelogSource::new(document)),
            state: Arc::new(state),
            artifacts: Arc::new(MemoryArtifactStore::new()),
            provider,
            sleeper: Arc::new(RecordingSleeper::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            policy: PolicySettings {
                full_translation_interval: 30,
                max_versions_to_translate: None,
            },
        }
    }

    pub fn with_source(mut self, source: StaticChangelogSource) -> Self {
        self.source = Arc::new(source);
        self
    }

    pub fn with_artifacts(mut self, artifacts: MemoryArtifactStore) -> Self {
        self.artifacts = Arc::new(artifacts);
        self
    }

    pub fn with_notifier(mut self, notifier: RecordingNotifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn with_policy(mut self, full_translation_interval: u32, max_versions_to_translate: Option<usize>) -> Self {
        self.policy = PolicySettings {
            full_translation_interval,
            max_versions_to_translate,
        };
        self
    }

    pub fn controller(&self) -> Controller {
        let translator = TranslationClient::new(
            Arc::new(self.provider.clone()),
            GenerationSettings {
                target_language: "Japanese".to_string(),
                product: "Claude Code".to_string(),
                temperature: 0.3,
                max_tokens: 64000,
            },
            PromptTemplates::default(),
            retry_policy(),
            Pricing {
                input_per_mtok: 3.0,
                output_per_mtok: 15.0,
            },
        )
        .with_sleeper(self.sleeper.clone());

        Controller::new(
            self.source.clone(),
            self.state.clone(),
            self.artifacts.clone(),
            translator,
            self.notifier.clone(),
            DocumentMerger::new("Changelog (Japanese)", "https://example.com/CHANGELOG.md"),
            self.policy,
        )
    }
}
