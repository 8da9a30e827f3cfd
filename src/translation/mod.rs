/*!
 * Translation service for changelog text.
 *
 * - `client`: provider calls with retries and usage accounting
 * - `prompts`: instruction templates for full and incremental translation
 * - `retry`: retry policy, backoff executor and sleepers
 */

pub use self::client::{GenerationSettings, Pricing, Translation, TranslationClient, UsageRecord};
pub use self::prompts::{PromptTemplates, TranslationMode};
pub use self::retry::{RetryPolicy, Sleeper};

pub mod client;
pub mod prompts;
pub mod retry;
