use super::*;
use crate::chunker::{HeuristicChunker, PhraseListChunker};
use crate::rules::{ResourceSources, Resources};
use crate::{Analysis, GrammarKind, Range};

const GRAMMAR: &str = "\
[solution] for [problem]
[solution] (is|are) good for [problem]
[problem] (can be )?treated with [solution]
[np = surgery]
[npl]protect\\w*( \\w+){0,5} against
";

const COUNTER: &str = "risk for [problem]\n[problem] risk factors?";
const START_TERMS: &str = "anorexia\nanorexia nervosa\nobesity\nhyperthyroidism\nasthma";
const STOPWORDS: &str = "^(you|it|this|that)$\n^@\\w+$";

fn resources_with(grammar: &str, counter: &str) -> Resources {
    Resources::from_sources(&ResourceSources {
        grammar: grammar.into(),
        counter_grammar: counter.into(),
        start_terms: START_TERMS.into(),
        stopwords: STOPWORDS.into(),
        ..ResourceSources::default()
    })
    .unwrap()
}

fn resources() -> Resources {
    resources_with(GRAMMAR, COUNTER)
}

fn run(message: &str) -> Analysis {
    let res = resources();
    let chunker = HeuristicChunker::new();
    Analyzer::new(&res.message, &chunker).run(message)
}

#[test]
fn pipeline_examples_matching() {
    // (message, expected solution, expected problem, expected grammar)
    let cases: Vec<(&str, &str, &str, GrammarKind)> = vec![
        ("Mindfulness for anorexia nervosa", "Mindfulness", "anorexia nervosa", GrammarKind::General),
        ("This is a new medicine for hyperthyroidism", "a new medicine", "hyperthyroidism", GrammarKind::General),
        ("Green tea is good for asthma", "Green tea", "asthma", GrammarKind::General),
        ("This medicine protects you against obesity", "This medicine", "obesity", GrammarKind::MagicBullet),
        ("Big surgery in obesity", "Big surgery", "obesity", GrammarKind::MagicBullet),
    ];

    for (message, solution, problem, grammar) in cases {
        match run(message) {
            Analysis::Found { solution: got, problem: got_problem, rule } => {
                assert_eq!(got, solution, "message: {message}");
                assert_eq!(got_problem, problem, "message: {message}");
                assert_eq!(rule.grammar, grammar, "message: {message}");
            }
            other => panic!("message: {message}: unexpected {other:?}"),
        }
    }
}

#[test]
fn counter_rule_suppresses_the_message() {
    let got = run("risk for obesity");
    match &got {
        Analysis::Suppressed { problem, rule } => {
            assert_eq!(problem, "obesity");
            assert_eq!(rule.grammar, GrammarKind::Counter);
            assert_eq!(rule.template, "risk for [problem]");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(got.solution(), None);
    assert_eq!(got.to_triple().0, crate::NOTHING_FOUND);
}

#[test]
fn suppression_beats_a_magic_bullet_match() {
    // "[np = surgery]" would resolve "Big surgery" without the counter rule.
    let got = run("Big surgery is a risk for obesity");
    assert!(matches!(got, Analysis::Suppressed { .. }), "{got:?}");
}

#[test]
fn counter_rules_only_see_the_term_sentence() {
    let got = run("Yoga for obesity; no risk for obesity");
    assert_eq!(got.solution(), Some("Yoga"));
}

#[test]
fn magic_bullet_beats_the_general_grammar() {
    // The general grammar alone would answer "a diet".
    let got = run("Big surgery or a diet for obesity");
    match got {
        Analysis::Found { solution, rule, .. } => {
            assert_eq!(solution, "Big surgery");
            assert_eq!(rule.grammar, GrammarKind::MagicBullet);
            assert_eq!(rule.template, "[np = surgery]");
        }
        other => panic!("unexpected {other:?}"),
    }

    let general_only = resources_with("[solution] for [problem]", "");
    let chunker = HeuristicChunker::new();
    let got = Analyzer::new(&general_only.message, &chunker).run("Big surgery or a diet for obesity");
    assert_eq!(got.solution(), Some("a diet"));
}

#[test]
fn unresolved_magic_bullet_ends_the_run() {
    // The general template alone would answer "yoga".
    let res = resources_with("[npl]fight\n[solution] helps .*[problem]", "");

    // (chunker phrases)
    let cases: Vec<Vec<&str>> = vec![vec!["yoga", "you"], vec!["you"]];
    for phrases in cases {
        let chunker = PhraseListChunker::new(phrases.clone());
        let run = Analyzer::new(&res.message, &chunker).run_with_trace("yoga helps all of you fight obesity");

        match &run.analysis {
            Analysis::Unresolved { problem, rule } => {
                assert_eq!(problem, "obesity");
                assert_eq!(rule.grammar, GrammarKind::MagicBullet, "phrases: {phrases:?}");
                assert_eq!(rule.template, "[npl]fight");
            }
            other => panic!("phrases: {phrases:?}: unexpected {other:?}"),
        }
        assert_eq!(run.trace.stage, Stage::MagicBullet);
        assert!(run.trace.general.is_none());
        assert_eq!(run.metrics.general, std::time::Duration::ZERO);
    }
}

#[test]
fn longest_template_wins_and_ties_go_to_the_first() {
    match run("Green tea is good for asthma") {
        Analysis::Found { rule, .. } => assert_eq!(rule.index, 1),
        other => panic!("unexpected {other:?}"),
    }

    // Both templates match "for asthma" with the same length.
    let cases: Vec<(&str, &str)> = vec![
        ("[solution] for [problem]\n[solution] f\\w+ [problem]", "[solution] for [problem]"),
        ("[solution] f\\w+ [problem]\n[solution] for [problem]", "[solution] f\\w+ [problem]"),
    ];
    let chunker = HeuristicChunker::new();
    for (grammar, expected) in cases {
        let res = resources_with(grammar, "");
        let got = Analyzer::new(&res.message, &chunker).run("Yoga for asthma");
        assert_eq!(got.rule().map(|r| r.template.as_str()), Some(expected), "grammar: {grammar}");
    }
}

#[test]
fn self_reference_is_unresolved() {
    let res = resources();
    let chunker = PhraseListChunker::new(["asthma", "asthma drugs"]);
    let got = Analyzer::new(&res.message, &chunker).run("asthma drugs for asthma");
    assert!(matches!(got, Analysis::Unresolved { ref problem, .. } if problem == "asthma"), "{got:?}");
}

#[test]
fn solution_sharing_letters_with_the_term_is_kept() {
    let res = Resources::from_sources(&ResourceSources {
        grammar: "[solution] for [problem]".into(),
        start_terms: "cardiac arrest".into(),
        ..ResourceSources::default()
    })
    .unwrap();
    let chunker = PhraseListChunker::new(["rest", "cardiac arrest"]);
    let got = Analyzer::new(&res.message, &chunker).run("Rest for cardiac arrest");
    assert_eq!(got.solution(), Some("Rest"));
}

#[test]
fn no_start_word_and_no_pattern() {
    assert_eq!(run("Nothing medical here"), Analysis::NoStartWord);
    assert_eq!(run("asthma is rare"), Analysis::NoPatternFound { problem: "asthma".into() });
}

#[test]
fn trace_records_each_stage() {
    let res = resources();
    let chunker = HeuristicChunker::new();
    let analyzer = Analyzer::new(&res.message, &chunker);

    let message = "Stay strong. Yoga for asthma, every day";
    let run = analyzer.run_with_trace(message);
    let trace = &run.trace;

    assert_eq!(trace.start_term.as_ref().map(|t| t.range), Some(Range::new(22, 28)));
    assert_eq!(trace.sentence_text.as_deref(), Some("Yoga for asthma"));
    let sentence = trace.sentence.unwrap();
    assert_eq!(&message[sentence.start..sentence.end], "Yoga for asthma");
    assert!(trace.counter.is_none());
    assert_eq!(trace.magic_bullet, Some(Analysis::NoPatternFound { problem: "asthma".into() }));
    assert_eq!(trace.general.as_ref().and_then(|a| a.solution()), Some("Yoga"));
    assert_eq!(trace.stage, Stage::General);
    assert!(run.metrics.stages() <= run.metrics.total);

    let run = analyzer.run_with_trace("Nothing medical here");
    assert_eq!(run.trace, AnalysisTrace::default());
}

#[test]
fn analysis_is_idempotent() {
    let res = resources();
    let chunker = HeuristicChunker::new();
    let analyzer = Analyzer::new(&res.message, &chunker);
    for message in ["This is a new medicine for hyperthyroidism", "risk for obesity", "asthma is rare"] {
        let first = analyzer.run_with_trace(message);
        let second = analyzer.run_with_trace(message);
        assert_eq!(first.analysis, second.analysis, "message: {message}");
        assert_eq!(first.trace, second.trace, "message: {message}");
    }
}

#[test]
fn one_analyzer_serves_many_threads() {
    let res = resources();
    let chunker = HeuristicChunker::new();
    let analyzer = Analyzer::new(&res.message, &chunker);
    let messages = ["Green tea is good for asthma", "Big surgery in obesity", "risk for obesity"];

    let results: Vec<Analysis> = std::thread::scope(|s| {
        let handles: Vec<_> = messages.iter().map(|m| s.spawn(move || analyzer.run(m))).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (message, got) in messages.iter().zip(results) {
        assert_eq!(got, analyzer.run(message), "message: {message}");
    }
}
