/*!
 * Integration tests for runs against file-backed stores
 */

use std::fs;
use std::path::Path;
use std::sync::Arc;

use changelog_translator::app_config::Config;
use changelog_translator::app_controller::{Controller, PolicySettings, RunOptions, RunOutcome};
use changelog_translator::artifacts::FileArtifactStore;
use changelog_translator::changelog::{DocumentMerger, Fingerprint};
use changelog_translator::fetch::StaticChangelogSource;
use changelog_translator::notify::RecordingNotifier;
use changelog_translator::providers::mock::MockProvider;
use changelog_translator::state::{COUNTER_FILE, FINGERPRINT_FILE, FileStateStore, RAW_DOCUMENT_FILE, StateStore};
use changelog_translator::translation::retry::RecordingSleeper;
use changelog_translator::translation::{GenerationSettings, Pricing, PromptTemplates, TranslationClient};

use crate::common;

fn file_controller(root: &Path, source: Arc<StaticChangelogSource>, provider: MockProvider) -> Controller {
    common::init_logging();
    let translator = TranslationClient::new(
        Arc::new(provider),
        GenerationSettings {
            target_language: "Japanese".to_string(),
            product: "Claude Code".to_string(),
            temperature: 0.3,
            max_tokens: 64000,
        },
        PromptTemplates::default(),
        common::retry_policy(),
        Pricing {
            input_per_mtok: 3.0,
            output_per_mtok: 15.0,
        },
    )
    .with_sleeper(Arc::new(RecordingSleeper::new()));

    Controller::new(
        source,
        Arc::new(FileStateStore::new(root.join("state"))),
        Arc::new(FileArtifactStore::new(
            root.join("translated/changelog_ja.md"),
            root.join("translated/note_ready.md"),
        )),
        translator,
        Arc::new(RecordingNotifier::new()),
        DocumentMerger::new("Changelog (Japanese)", "https://example.com/CHANGELOG.md"),
        PolicySettings {
            full_translation_interval: 30,
            max_versions_to_translate: None,
        },
    )
}

#[tokio::test]
async fn test_fileStores_freshThenIncremental_shouldWriteArtifactsAndState() {
    let dir = common::create_temp_dir().unwrap();
    let source = Arc::new(StaticChangelogSource::new(common::changelog(1, 4)));
    let controller = file_controller(dir.path(), source.clone(), MockProvider::working());

    controller.run(RunOptions::default()).await.unwrap();
    source.set_document(common::changelog(1, 5));
    let outcome = controller.run(RunOptions::default()).await.unwrap();

    let report = match outcome {
        RunOutcome::Translated(report) => report,
        other => panic!("expected a translated run, got {:?}", other),
    };
    assert_eq!(report.artifact_locations.len(), 2);
    assert!(report.artifact_locations[0].ends_with("changelog_ja.md"));

    let state_dir = dir.path().join("state");
    let current = common::changelog(1, 5);
    assert_eq!(fs::read_to_string(state_dir.join(RAW_DOCUMENT_FILE)).unwrap(), current);
    assert_eq!(
        fs::read_to_string(state_dir.join(FINGERPRINT_FILE)).unwrap(),
        Fingerprint::of(&current).as_str()
    );
    assert_eq!(fs::read_to_string(state_dir.join(COUNTER_FILE)).unwrap(), "2");

    let body = fs::read_to_string(dir.path().join("translated/note_ready.md")).unwrap();
    let headered = fs::read_to_string(dir.path().join("translated/changelog_ja.md")).unwrap();
    assert!(body.starts_with("[TRANSLATED] \n## 1.0.5"));
    assert!(body.ends_with(&MockProvider::translated(&common::changelog(1, 4))));
    assert!(headered.starts_with("# Changelog (Japanese)\n"));
    assert!(headered.ends_with(&body));
}

#[tokio::test]
async fn test_fileStores_interruptedCommit_shouldTreatSourceAsChanged() {
    let dir = common::create_temp_dir().unwrap();
    let document = common::changelog(1, 4);
    let source = Arc::new(StaticChangelogSource::new(document.clone()));
    let controller = file_controller(dir.path(), source, MockProvider::working());

    controller.run(RunOptions::default()).await.unwrap();

    // Raw document replaced but fingerprint not yet written
    let state_dir = dir.path().join("state");
    fs::write(state_dir.join(RAW_DOCUMENT_FILE), common::changelog(1, 3)).unwrap();

    let state = FileStateStore::new(&state_dir).load().unwrap();
    assert_eq!(state.last_fingerprint, None);

    let outcome = controller.run(RunOptions::default()).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Translated(_)));
}

#[tokio::test]
async fn test_withConfig_reset_shouldClearStateFiles() {
    let dir = common::create_temp_dir().unwrap();
    let mut config = Config::default();
    config.output.state_dir = dir.path().join("state");
    config.output.translated_dir = dir.path().join("translated");

    let store = FileStateStore::new(config.state_dir());
    store.commit("# Changelog\n", 3).unwrap();
    assert_eq!(store.load().unwrap().translation_cycle_count, 3);

    let controller = Controller::with_config(&config, Arc::new(MockProvider::working()));
    controller.reset().unwrap();

    assert_eq!(store.load().unwrap(), Default::default());
    assert!(!config.state_dir().join(COUNTER_FILE).exists());
}
