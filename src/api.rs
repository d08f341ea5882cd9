use crate::chunker::Chunker;
use crate::engine::{self, AnalysisTrace, Analyzer, StageMetrics};
use crate::rules::MessageResources;
use crate::rules::user::UserResources;
use crate::{Analysis, UserAnalysis};
use serde::Serialize;

/// Result from [`analyze_message_verbose`].
///
/// Meant for debugging rules: it shows which stage decided and what every
/// earlier stage saw, without dumping compiled templates.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// The analyzed message.
    pub message: String,
    pub analysis: Analysis,
    pub trace: AnalysisTrace,
    /// Timing measurements for the run.
    pub metrics: StageMetrics,
}

/// Extract a `(solution, problem, rule)` relation from one message.
///
/// Never fails: "nothing found" outcomes are [`Analysis`] variants.
///
/// # Example
/// ```
/// use curalex::{HeuristicChunker, ResourceSources, Resources, analyze_message};
///
/// let resources = Resources::from_sources(&ResourceSources {
///     grammar: "[solution] for [problem]".into(),
///     start_terms: "hyperthyroidism".into(),
///     ..ResourceSources::default()
/// })
/// .unwrap();
///
/// let out = analyze_message("This is a new medicine for hyperthyroidism", &resources.message, &HeuristicChunker::new());
/// assert_eq!(out.solution(), Some("a new medicine"));
/// assert_eq!(out.problem(), Some("hyperthyroidism"));
/// ```
pub fn analyze_message(message: &str, resources: &MessageResources, chunker: &dyn Chunker) -> Analysis {
    Analyzer::new(resources, chunker).run(message)
}

/// Like [`analyze_message`], plus the per-stage trace and timings.
pub fn analyze_message_verbose(message: &str, resources: &MessageResources, chunker: &dyn Chunker) -> AnalysisReport {
    let run = Analyzer::new(resources, chunker).run_with_trace(message);
    AnalysisReport { message: message.to_string(), analysis: run.analysis, trace: run.trace, metrics: run.metrics }
}

/// Classify a user by display name, falling back to the profile description.
///
/// # Example
/// ```
/// use curalex::{ResourceSources, Resources, classify_user};
///
/// let resources = Resources::from_sources(&ResourceSources {
///     user_name_patterns: ", ?MD$\tDoctor".into(),
///     ..ResourceSources::default()
/// })
/// .unwrap();
///
/// let user = classify_user("John Paul, MD", "", &resources.user);
/// assert_eq!(user.tag(), Some("Doctor"));
/// ```
pub fn classify_user(name: &str, description: &str, resources: &UserResources) -> UserAnalysis {
    engine::classify(name, description, resources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::HeuristicChunker;
    use crate::engine::Stage;
    use crate::rules::{ResourceSources, Resources};

    fn resources() -> Resources {
        Resources::from_sources(&ResourceSources {
            grammar: "[solution] for [problem]\n[npl]protects you against".into(),
            counter_grammar: "risk for [problem]".into(),
            start_terms: "obesity\nhyperthyroidism".into(),
            stopwords: "^(you|it|this|that)$\ndummy".into(),
            ..ResourceSources::default()
        })
        .unwrap()
    }

    #[test]
    fn analyze_message_returns_the_plain_outcome() {
        let res = resources();
        let out = analyze_message("This is a new medicine for hyperthyroidism", &res.message, &HeuristicChunker::new());
        assert_eq!(out.to_triple(), (
            "a new medicine".to_string(),
            "hyperthyroidism".to_string(),
            "[solution] for [problem]".to_string()
        ));
    }

    #[test]
    fn verbose_report_includes_trace_and_metrics() {
        let res = resources();
        let report =
            analyze_message_verbose("This medicine protects you against obesity", &res.message, &HeuristicChunker::new());

        assert_eq!(report.analysis.solution(), Some("This medicine"));
        assert_eq!(report.trace.stage, Stage::MagicBullet);
        assert_eq!(report.trace.start_term.as_ref().map(|t| t.term.as_str()), Some("obesity"));
        assert!(report.trace.general.is_none());
        assert!(report.metrics.stages() <= report.metrics.total);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["analysis"]["outcome"], "found");
        assert_eq!(json["trace"]["stage"], "magic_bullet");
    }

    #[test]
    fn verbose_report_records_suppression() {
        let res = resources();
        let report = analyze_message_verbose("risk for obesity", &res.message, &HeuristicChunker::new());
        assert!(matches!(report.analysis, Analysis::Suppressed { .. }));
        assert_eq!(report.trace.stage, Stage::Counter);
        assert_eq!(report.trace.counter.as_ref().map(|r| r.template.as_str()), Some("risk for [problem]"));
        assert!(report.trace.magic_bullet.is_none());
    }
}
