/*!
 * # changelog-translator
 *
 * Keeps a translated copy of a remote Markdown changelog up to date using an
 * LLM, re-translating only what changed.
 *
 * ## Features
 *
 * - Change detection by SHA-256 fingerprint of the fetched document
 * - Incremental translation of newly prepended entries, with a periodic full
 *   re-translation to correct drift
 * - Optional cap on the number of version sections in a full translation
 * - Streaming Anthropic Messages API client with retry and linear backoff
 * - Headered and header-stripped translated artifacts
 * - Discord webhook notifications with a cost estimate
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `changelog`: The decision engine:
 *   - `changelog::fingerprint`: Change detection
 *   - `changelog::diff`: Extraction of new entries
 *   - `changelog::versions`: Version cap for full translations
 *   - `changelog::policy`: Full vs. incremental strategy
 *   - `changelog::merge`: Header/body merging
 * - `translation`: Prompts, retries and usage accounting
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Scripted provider for tests
 * - `state`: Persisted run state
 * - `artifacts`: Translated artifact storage
 * - `fetch`: Source changelog retrieval
 * - `notify`: Run notifications
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::too_many_arguments)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod artifacts;
pub mod changelog;
pub mod errors;
pub mod fetch;
pub mod file_utils;
pub mod notify;
pub mod providers;
pub mod state;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunOptions, RunOutcome, RunReport};
pub use changelog::{DocumentMerger, Fingerprint, Strategy, extract_new_entries, has_changed};
pub use errors::{AppError, FetchError, NotificationError, ProviderError, StoreError, TranslationError};
pub use translation::{TranslationClient, TranslationMode};
