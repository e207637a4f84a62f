/*!
 * Dual-model translation of transcript segments.
 *
 * This module is split into several submodules:
 *
 * - `segment`: Input segment and context types
 * - `prompts`: Prompt templates shared by both providers and the arbiter
 * - `adapter`: Uniform translation call over one provider
 * - `duration`: Spoken-duration estimates
 * - `similarity`: Agreement scoring between candidates
 * - `arbiter`: A/B verification for moderate agreement
 * - `merge`: Regime selection and the final merged translation
 * - `orchestrator`: Batch driver
 */

// Re-export main types for easier usage
pub use self::adapter::{ProviderTranslationResult, TranslationMetadata, TranslationProviderAdapter};
pub use self::arbiter::{Verdict, VerificationArbiter};
pub use self::merge::{MergePolicy, MergeResolver, MergeStrategy, MergedTranslation, ProviderResults};
pub use self::orchestrator::{BatchTranslationResult, TranslationOrchestrator, UsageTotals};
pub use self::segment::{TranslationContext, TranslationSegment};

// Submodules
pub mod adapter;
pub mod arbiter;
pub mod duration;
pub mod merge;
pub mod orchestrator;
pub mod prompts;
pub mod segment;
pub mod similarity;
