//! Message analysis pipeline.
//!
//! The stages run in a fixed order and the first definitive outcome ends the
//! run. The order encodes rule priority: specific magic-bullet frames beat the
//! general grammar, and counter rules beat both.
//!
//! ```text
//! START
//!   │ find_start_term          ── none ──────────▶ NoStartWord
//!   │ isolate_sentence
//!   │ counter rules (sentence) ── match ─────────▶ Suppressed
//!   │ magic bullet (message)   ── match ─────────▶ Found | Unresolved
//!   │ general grammar (sentence)
//!   ▼
//! Found | Unresolved | NoPatternFound
//! ```
//!
//! A magic-bullet template that matched without a resolvable phrase still
//! ends the run: its template is reported and the general grammar never runs.
//!
//! ## Key concepts
//!
//! - **Start term**: the longest lexicon term in the message (`trigger.rs`).
//! - **Sentence**: the segment holding the start term; counter and general
//!   templates only see it, magic-bullet templates see the whole message.
//! - **Trace**: every run records what each stage saw and returned; the
//!   plain entry point just drops it.

use super::counter;
use super::general::match_general;
use super::magic_bullet::match_magic_bullet;
use super::metrics::StageMetrics;
use super::trigger::{StartTermMatch, find_start_term, isolate_sentence};
use crate::chunker::Chunker;
use crate::rules::MessageResources;
use crate::{Analysis, MatchedRule, Range};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Last stage that ran for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    StartTerm,
    Counter,
    MagicBullet,
    General,
}

/// What each stage saw and decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisTrace {
    pub start_term: Option<StartTermMatch>,
    /// Byte span of the isolated sentence in the message.
    pub sentence: Option<Range>,
    pub sentence_text: Option<String>,
    /// Counter template that suppressed the message.
    pub counter: Option<MatchedRule>,
    pub magic_bullet: Option<Analysis>,
    pub general: Option<Analysis>,
    pub stage: Stage,
}

impl Default for AnalysisTrace {
    fn default() -> Self {
        AnalysisTrace {
            start_term: None,
            sentence: None,
            sentence_text: None,
            counter: None,
            magic_bullet: None,
            general: None,
            stage: Stage::StartTerm,
        }
    }
}

/// Output of [`Analyzer::run_with_trace`].
#[derive(Debug, Clone)]
pub struct AnalyzerRun {
    pub analysis: Analysis,
    pub trace: AnalysisTrace,
    pub metrics: StageMetrics,
}

/// Runs the pipeline over one resource set and chunker.
///
/// Holds only shared references, so one analyzer (or many) can serve any
/// number of threads.
#[derive(Clone, Copy)]
pub struct Analyzer<'a> {
    resources: &'a MessageResources,
    chunker: &'a dyn Chunker,
}

impl<'a> Analyzer<'a> {
    pub fn new(resources: &'a MessageResources, chunker: &'a dyn Chunker) -> Self {
        Analyzer { resources, chunker }
    }

    /// Convenience wrapper that discards the trace and timings.
    pub fn run(&self, message: &str) -> Analysis {
        self.run_with_trace(message).analysis
    }

    pub fn run_with_trace(&self, message: &str) -> AnalyzerRun {
        let total_start = Instant::now();
        let mut trace = AnalysisTrace::default();
        let mut metrics = StageMetrics::default();

        let analysis = self.pipeline(message, &mut trace, &mut metrics);

        metrics.total = total_start.elapsed();
        debug!(stage = ?trace.stage, outcome = ?analysis, elapsed = ?metrics.total, "message analyzed");
        AnalyzerRun { analysis, trace, metrics }
    }

    fn pipeline(&self, message: &str, trace: &mut AnalysisTrace, metrics: &mut StageMetrics) -> Analysis {
        let res = self.resources;

        // (1) start term + sentence
        let stage_start = Instant::now();
        let found = find_start_term(message, &res.start_terms);
        let Some(start_term) = found else {
            metrics.start_term = stage_start.elapsed();
            return Analysis::NoStartWord;
        };
        let range = isolate_sentence(message, &start_term);
        let sentence = &message[range.start..range.end];
        let term = start_term.term.clone();
        trace.start_term = Some(start_term);
        trace.sentence = Some(range);
        trace.sentence_text = Some(sentence.to_string());
        metrics.start_term = stage_start.elapsed();

        // (2) counter rules
        trace.stage = Stage::Counter;
        let stage_start = Instant::now();
        let suppressed = counter::suppressing_rule(sentence, &term, &res.counter);
        metrics.counter = stage_start.elapsed();
        if let Some(rule) = suppressed {
            trace.counter = Some(rule.clone());
            return Analysis::Suppressed { problem: term, rule };
        }

        // (3) magic bullet, on the whole message
        trace.stage = Stage::MagicBullet;
        let stage_start = Instant::now();
        let magic = match_magic_bullet(message, &term, &res.magic_bullet, &res.stopwords, self.chunker);
        metrics.magic_bullet = stage_start.elapsed();
        trace.magic_bullet = Some(magic.clone());
        if !matches!(magic, Analysis::NoPatternFound { .. }) {
            return magic;
        }

        // (4) general grammar, on the sentence
        trace.stage = Stage::General;
        let stage_start = Instant::now();
        let general = match_general(sentence, &term, &res.general, &res.stopwords, self.chunker);
        metrics.general = stage_start.elapsed();
        trace.general = Some(general.clone());
        general
    }
}
