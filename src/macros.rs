/// Compile a literal pattern once and hand out a `&'static Regex`.
///
/// Only for patterns written in the source. Patterns that come from resource
/// files go through the template compiler and report errors instead.
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).expect("built-in pattern"));
        &*RE
    }};
}
