use curalex::{Analysis, AnalysisReport, Stage, UserAnalysis};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_user(user: &UserAnalysis, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.paint("━━━ User ━━━", ansi::GRAY));
    let (pattern, tag, provenance) = user.to_triple();
    let tag = if user.is_relevant() { palette.bold(palette.paint(tag, ansi::GREEN)) } else { palette.dim(tag) };
    println!("  {} {}  {} {}", palette.dim("tag:"), tag, palette.dim("│"), palette.paint(provenance, ansi::BLUE));
    println!("  {} {}", palette.dim("pattern:"), palette.paint(pattern, ansi::CYAN));
}

pub fn print_run(report: &AnalysisReport, color: bool) {
    let palette = ansi::Palette::new(color);
    let trace = &report.trace;
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Analyzing: \"{}\"", report.message), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Start term ━━━", ansi::GRAY));
    match &trace.start_term {
        Some(term) => {
            println!(
                "  {} {} {}",
                palette.bold(palette.paint(&term.term, ansi::GREEN)),
                palette.dim("│"),
                palette.paint(format!("span {}..{}", term.range.start, term.range.end), ansi::YELLOW),
            );
            if let Some(sentence) = &trace.sentence_text {
                println!("  {} {}", palette.dim("sentence:"), sentence);
            }
        }
        None => println!("{}", palette.dim("  No lexicon term in the message")),
    }

    if trace.start_term.is_some() {
        println!("\n{}", palette.paint("━━━ Stages ━━━", ansi::GRAY));
        let counter = match &trace.counter {
            Some(rule) => palette.paint(format!("✓ suppressed by {}", rule.template), ansi::YELLOW),
            None => palette.dim("✗ no counter rule"),
        };
        println!("  {} {}", palette.paint("counter:", ansi::BLUE), counter);
        print_stage("magic bullet:", trace.magic_bullet.as_ref(), &palette);
        print_stage("general:", trace.general.as_ref(), &palette);
        println!("  {} {}", palette.dim("decided at:"), palette.paint(stage_name(trace.stage), ansi::CYAN));
    }

    println!("\n{}", palette.paint("━━━ Result ━━━", ansi::GRAY));
    let (solution, problem, rule) = report.analysis.to_triple();
    let solution =
        if report.analysis.is_found() { palette.bold(palette.paint(solution, ansi::GREEN)) } else { palette.dim(solution) };
    println!("  {} {} {}", solution, palette.dim("│ problem:"), palette.paint(problem, ansi::YELLOW));
    println!("  {} {}", palette.dim("rule:"), palette.paint(rule, ansi::CYAN));

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    let m = &report.metrics;
    println!(
        "  Total: {}  │  Start term: {}  │  Counter: {}  │  Magic bullet: {}  │  General: {}",
        palette.paint(format!("{:?}", m.total), ansi::GREEN),
        palette.dim(format!("{:?}", m.start_term)),
        palette.dim(format!("{:?}", m.counter)),
        palette.dim(format!("{:?}", m.magic_bullet)),
        palette.dim(format!("{:?}", m.general)),
    );
    println!();
}

fn print_stage(label: &str, outcome: Option<&Analysis>, palette: &ansi::Palette) {
    let text = match outcome {
        None => palette.dim("– not run"),
        Some(Analysis::Found { solution, rule, .. }) => {
            palette.paint(format!("✓ \"{solution}\" via {}", rule.template), ansi::GREEN)
        }
        Some(Analysis::Unresolved { rule, .. }) => {
            palette.paint(format!("~ {} matched, no phrase", rule.template), ansi::YELLOW)
        }
        Some(_) => palette.dim("✗ no template matched"),
    };
    println!("  {} {}", palette.paint(label, ansi::BLUE), text);
}

fn stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::StartTerm => "start term",
        Stage::Counter => "counter",
        Stage::MagicBullet => "magic bullet",
        Stage::General => "general",
    }
}
