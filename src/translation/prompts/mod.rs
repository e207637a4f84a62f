/*!
 * Prompt construction for translation and verification calls.
 *
 * This module provides:
 * - The system prompt template shared by both providers of a batch
 * - The per-segment instruction carrying pacing information
 * - The A/B verification prompt used by the arbiter
 */

pub mod templates;

// Re-export main types
pub use templates::{build_arbiter_prompt, build_segment_instruction, build_system_prompt, PromptTemplate};
