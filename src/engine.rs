//! Analysis engine.
//!
//! This module is the entry point for the matching stages. Each stage lives
//! in its own file under `src/engine/` and the public paths are re-exported
//! here (for example `crate::engine::Grammar`).
//!
//! ## How the parts work together
//!
//! ```text
//! resource files ──┐
//!                  │  Grammar::parse_partitioned / parse_counter   (compiled_rules.rs)
//!                  └──────────────┬───────────────
//!                                 │
//! message ── find_start_term ─────┼─ longest lexicon term          (trigger.rs)
//!            isolate_sentence     │
//!                                 v
//!                       Analyzer::run (analyzer.rs)
//!                         - counter rules        (counter.rs)
//!                         - magic bullet         (magic_bullet.rs)
//!                         - general grammar      (general.rs)
//!                                 │
//!                                 v
//!                   phrase selection (resolve.rs)
//!                                 │
//!                                 v
//!                              Analysis
//!
//! name + description ── classify (user.rs) ──▶ UserAnalysis
//! ```
//!
//! ## Responsibilities by module
//!
//! - `compiled_rules.rs`: turns parsed templates into matchable expressions
//!   and finds the longest match of a grammar.
//! - `trigger.rs`: start-term lookup through the word index, sentence
//!   isolation.
//! - `counter.rs`: suppression by counter rules.
//! - `magic_bullet.rs`: padded-message matching for noun-phrase templates.
//! - `general.rs`: problem/solution templates.
//! - `resolve.rs`: choosing the answer phrase from chunker output.
//! - `analyzer.rs`: the stage order and the trace.
//! - `metrics.rs`: per-stage timings.
//! - `user.rs`: name and description classification.
//!
//! ## Debugging
//!
//! Every stage emits `tracing` events: `debug` for per-message summaries and
//! resource loads, `trace` for each decision. The binary reads its filter
//! from `CURALEX_LOG` (e.g. `CURALEX_LOG=curalex=trace`).

#[path = "engine/analyzer.rs"]
mod analyzer;
#[path = "engine/compiled_rules.rs"]
mod compiled_rules;
#[path = "engine/counter.rs"]
mod counter;
#[path = "engine/general.rs"]
mod general;
#[path = "engine/magic_bullet.rs"]
mod magic_bullet;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/trigger.rs"]
mod trigger;
#[path = "engine/user.rs"]
mod user;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

pub use analyzer::{AnalysisTrace, Analyzer, AnalyzerRun, Stage};
pub use compiled_rules::{CompiledTemplate, Grammar, WINDOW_TOKENS};
pub use counter::is_suppressed;
pub use general::match_general;
pub use magic_bullet::match_magic_bullet;
pub use metrics::StageMetrics;
pub use trigger::{StartTermMatch, find_start_term, isolate_sentence};
pub(crate) use user::classify;
