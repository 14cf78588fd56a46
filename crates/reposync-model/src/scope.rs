//! Scope names and the threshold negation table
//!
//! A threshold names the scopes a consumer wants; [`negate`] turns it into
//! the set of scopes a selector has to exclude.

use std::collections::BTreeSet;

pub const COMPILE: &str = "compile";
pub const PROVIDED: &str = "provided";
pub const RUNTIME: &str = "runtime";
pub const SYSTEM: &str = "system";
pub const TEST: &str = "test";
pub const IMPORT: &str = "import";

/// Threshold used when none is configured
pub const DEFAULT_SCOPE_THRESHOLD: &str = "compile+runtime";

/// Scopes that never propagate past the first level of a graph
pub const NON_TRANSITIVE: [&str; 2] = [TEST, PROVIDED];

const ALL_SCOPES: [&str; 5] = [SYSTEM, COMPILE, PROVIDED, RUNTIME, TEST];

/// Excluded scopes for a comma-joined threshold list such as `"compile,runtime"`.
pub fn negate(threshold: &str) -> BTreeSet<String> {
    negate_all(
        threshold
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty()),
    )
}

/// Excluded scopes for a list of thresholds, applied in order.
///
/// Unknown thresholds leave the set untouched.
pub fn negate_all<'a, I>(thresholds: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut excluded: BTreeSet<String> = ALL_SCOPES.iter().map(|s| s.to_string()).collect();
    for threshold in thresholds {
        let retained: &[&str] = match threshold {
            "compile" => &[COMPILE, SYSTEM, PROVIDED],
            "runtime" => &[COMPILE, RUNTIME],
            "compile+runtime" => &[COMPILE, SYSTEM, PROVIDED, RUNTIME],
            "runtime+system" => &[COMPILE, SYSTEM, RUNTIME],
            "test" => {
                excluded.clear();
                continue;
            }
            _ => &[],
        };
        for scope in retained {
            excluded.remove(*scope);
        }
    }
    excluded
}
