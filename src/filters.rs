//! Rejection rules applied to candidate package names.
//!
//! A [`Filter`] is a named pure predicate returning a human-readable reason when it rejects a
//! name. Pipelines run every filter in order without short-circuiting so callers receive the
//! complete list of complaints. The length rule is special: its boundary is derived once from
//! the lengths of an accepted corpus and frozen inside the closure.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

type Check = dyn Fn(&str) -> Option<String> + Send + Sync;

/// A named rejection rule.
#[derive(Clone)]
pub struct Filter {
    name: &'static str,
    check: Arc<Check>,
}

impl Filter {
    /// Wrap a predicate under a stable rule name.
    pub fn new<F>(name: &'static str, check: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            name,
            check: Arc::new(check),
        }
    }

    /// Rule name used in logs and diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Return the rejection reason for `candidate`, or `None` when it passes.
    pub fn check(&self, candidate: &str) -> Option<String> {
        (self.check)(candidate)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("name", &self.name).finish()
    }
}

/// Run every filter against `candidate` and collect all reasons in pipeline order.
pub fn run_filters(filters: &[Filter], candidate: &str) -> Vec<String> {
    filters
        .iter()
        .filter_map(|filter| filter.check(candidate))
        .collect()
}

/// The language the joke rules refuse to see mentioned, plus its colloquial long form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRule {
    /// Short language name, matched case-insensitively.
    pub name: String,
    /// Longer colloquial alias, matched case-insensitively.
    pub alias: String,
}

impl Default for LanguageRule {
    fn default() -> Self {
        Self {
            name: "rust".into(),
            alias: "rustlang".into(),
        }
    }
}

/// Build the standard pipeline (everything except the length rule), in evaluation order.
pub fn standard_filters(language: &LanguageRule) -> Vec<Filter> {
    vec![
        no_hyphens(),
        no_underscores(),
        not_capitalized(),
        no_language_name(&language.name),
        no_language_alias(&language.name, &language.alias),
        valid_identifier(),
    ]
}

/// Reject names containing `-`.
pub fn no_hyphens() -> Filter {
    Filter::new("no_hyphens", |name| {
        name.contains('-')
            .then(|| "Don't put hyphens, that's ugly.".to_string())
    })
}

/// Reject names containing `_`.
pub fn no_underscores() -> Filter {
    Filter::new("no_underscores", |name| {
        name.contains('_')
            .then(|| "Don't put underscores, that's ugly.".to_string())
    })
}

/// Reject names with any upper-case code point.
pub fn not_capitalized() -> Filter {
    Filter::new("not_capitalized", |name| {
        name.chars()
            .any(char::is_uppercase)
            .then(|| "Don't put uppercase characters, it's too enterprisey.".to_string())
    })
}

/// Reject names mentioning the language itself.
pub fn no_language_name(language: &str) -> Filter {
    let needle = language.to_lowercase();
    let display = capitalize(language);
    Filter::new("no_language_name", move |name| {
        name.to_lowercase().contains(&needle).then(|| {
            format!(
                "Don't mention '{needle}' in your package name. {display} is implicit in any \
                 package. {display} is absolute and infinitesimal. Other languages should rename \
                 their packages; for instance 'rails-ruby' and 'python-django' would remove any \
                 ambiguity."
            )
        })
    })
}

/// Reject names mentioning the colloquial alias of the language.
pub fn no_language_alias(language: &str, alias: &str) -> Filter {
    let needle = alias.to_lowercase();
    let display = capitalize(language);
    let alias_display = capitalize(alias);
    Filter::new("no_language_alias", move |name| {
        name.to_lowercase().contains(&needle).then(|| {
            format!(
                "The name of {display} is {display}, not {alias_display}. You don't say \
                 Javalang, or Rubylang, or Pythonlang, do you?"
            )
        })
    })
}

/// Reject names outside the identifier grammar.
///
/// A valid name is non-empty, starts with an alphabetic code point, and contains only
/// alphabetic or numeric code points, `-`, `_` and `.`.
pub fn valid_identifier() -> Filter {
    Filter::new("valid_identifier", |name| {
        identifier_violation(name).map(|detail| {
            format!("That's not even a valid package name: {detail}!")
        })
    })
}

fn identifier_violation(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Some("the name can't be blank");
    };
    if !first.is_alphabetic() {
        return Some("the first character must be a letter");
    }
    let allowed = |c: char| c.is_alphabetic() || c.is_numeric() || matches!(c, '-' | '_' | '.');
    if !chars.all(allowed) {
        return Some("all the characters (but the first) must be either letters or digits");
    }
    None
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Errors raised while deriving length statistics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    /// No names were supplied, so there is no distribution to measure.
    #[error("cannot compute length statistics over an empty corpus")]
    EmptyInput,
}

/// Mean and population standard deviation of name lengths, in code points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthStatistics {
    /// Arithmetic mean length.
    pub mean: f64,
    /// Population standard deviation of the lengths.
    pub stdev: f64,
}

impl LengthStatistics {
    /// Longest acceptable length for the given threshold, `floor(mean + stdev * max_dist)`.
    pub fn max_length(&self, max_dist: f64) -> usize {
        (self.mean + self.stdev * max_dist).floor().max(0.0) as usize
    }

    /// Distance of `length` from the mean in standard deviations.
    pub fn distance(&self, length: usize) -> f64 {
        (length as f64 - self.mean) / self.stdev
    }
}

/// Measure the code-point lengths of `names`.
pub fn compute_length_statistics<S: AsRef<str>>(
    names: &[S],
) -> Result<LengthStatistics, StatsError> {
    if names.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    let count = names.len() as f64;
    let lengths: Vec<f64> = names
        .iter()
        .map(|name| name.as_ref().chars().count() as f64)
        .collect();
    let mean = lengths.iter().sum::<f64>() / count;
    let variance = lengths
        .iter()
        .map(|length| (length - mean).powi(2))
        .sum::<f64>()
        / count;
    Ok(LengthStatistics {
        mean,
        stdev: variance.sqrt(),
    })
}

/// Build the length-outlier rule over frozen statistics.
///
/// Only names longer than `mean + stdev * max_dist` are rejected.
pub fn length_filter(stats: LengthStatistics, max_dist: f64) -> Filter {
    let max_length = stats.max_length(max_dist);
    Filter::new("close_to_mean", move |name| {
        let length = name.chars().count();
        let dist = stats.distance(length);
        tracing::trace!(
            length,
            dist,
            mean = stats.mean,
            stdev = stats.stdev,
            "Length filter evaluated"
        );
        (dist > max_dist).then(|| {
            format!(
                "This package name is {dist:.1} std.dev. longer than normal. It should be at most \
                 {max_length} characters long."
            )
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons(name: &str) -> Vec<String> {
        run_filters(&standard_filters(&LanguageRule::default()), name)
    }

    #[test]
    fn plain_lowercase_name_passes_everything() {
        assert!(reasons("mux").is_empty());
        assert!(reasons("httpgzip").is_empty());
        assert!(reasons("v2.config").is_empty());
    }

    #[test]
    fn hyphen_is_reported_alongside_other_reasons() {
        let found = reasons("Foo-bar");
        assert_eq!(found.len(), 2);
        assert!(found[0].contains("hyphens"));
        assert!(found[1].contains("uppercase"));
    }

    #[test]
    fn uppercase_only_rejection() {
        let found = reasons("Foo");
        assert_eq!(found, vec![
            "Don't put uppercase characters, it's too enterprisey.".to_string()
        ]);
    }

    #[test]
    fn underscore_is_rejected() {
        let found = reasons("foo_bar");
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("underscores"));
    }

    #[test]
    fn language_rules_match_case_insensitively() {
        let rule = LanguageRule {
            name: "go".into(),
            alias: "golang".into(),
        };
        let filters = standard_filters(&rule);

        let found = run_filters(&filters, "cargo");
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("Don't mention 'go' in your package name. Go is implicit"));
        assert!(found[0].contains("Go is absolute and infinitesimal."));

        let found = run_filters(&filters, "golangtools");
        assert_eq!(found.len(), 2);
        assert!(found[1].starts_with("The name of Go is Go, not Golang."));

        let found = run_filters(&filters, "GOLANG");
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn identifier_grammar() {
        assert_eq!(
            identifier_violation(""),
            Some("the name can't be blank")
        );
        assert_eq!(
            identifier_violation("9lives"),
            Some("the first character must be a letter")
        );
        assert_eq!(
            identifier_violation("a b"),
            Some("all the characters (but the first) must be either letters or digits")
        );
        assert_eq!(identifier_violation("été.2"), None);
        assert_eq!(identifier_violation("a-b_c.d"), None);
    }

    #[test]
    fn statistics_use_population_deviation() {
        let stats = compute_length_statistics(&["ab", "abc", "abcdefghij"]).expect("stats");
        assert!((stats.mean - 5.0).abs() < 1e-9);
        assert!((stats.stdev - (38.0_f64 / 3.0).sqrt()).abs() < 1e-9);
        assert!((stats.stdev - 3.5590).abs() < 1e-3);
        assert_eq!(stats.max_length(2.0), 12);
    }

    #[test]
    fn statistics_count_code_points() {
        let stats = compute_length_statistics(&["été", "ça"]).expect("stats");
        assert!((stats.mean - 2.5).abs() < 1e-9);
    }

    #[test]
    fn statistics_reject_empty_input() {
        let empty: [&str; 0] = [];
        assert_eq!(
            compute_length_statistics(&empty),
            Err(StatsError::EmptyInput)
        );
    }

    #[test]
    fn length_filter_reports_distance_and_bound() {
        let stats = compute_length_statistics(&["ab", "abc", "abcdefghij"]).expect("stats");
        let filter = length_filter(stats, 2.0);

        let reason = filter.check("abcdefghijklmno").expect("rejected");
        assert_eq!(
            reason,
            "This package name is 2.8 std.dev. longer than normal. It should be at most 12 \
             characters long."
        );
        assert!(filter.check("abcdefghijkl").is_none());
        assert!(filter.check("a").is_none());
    }

    #[test]
    fn length_filter_with_zero_deviation_rejects_only_longer_names() {
        let stats = compute_length_statistics(&["abc", "def"]).expect("stats");
        let filter = length_filter(stats, 2.0);
        assert!(filter.check("xyz").is_none());
        assert!(filter.check("xy").is_none());
        assert!(filter.check("wxyz").is_some());
    }
}
