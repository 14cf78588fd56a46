//! Maven-style version ordering
//!
//! Versions split into numeric and qualifier items at `.`, `-` and at every
//! switch between digits and letters. Numbers compare numerically, known
//! qualifiers by maturity, and a number always outranks a qualifier:
//!
//! `1.0-alpha < 1.0-beta < 1.0-milestone < 1.0-rc < 1.0-SNAPSHOT < 1.0 < 1.0-sp < 1.0.1`

use std::cmp::Ordering;

const QUALIFIERS: [&str; 7] = ["alpha", "beta", "milestone", "rc", "snapshot", "", "sp"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    /// Digits without leading zeros; zero is empty
    Number(String),
    Qualifier(String),
}

fn items(version: &str) -> Vec<Item> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut digits = false;

    let mut flush = |current: &mut String, digits: bool| {
        if current.is_empty() {
            return;
        }
        let token = std::mem::take(current);
        items.push(if digits {
            Item::Number(token.trim_start_matches('0').to_string())
        } else {
            Item::Qualifier(normalize(&token))
        });
    };

    for c in version.chars() {
        if c == '.' || c == '-' {
            flush(&mut current, digits);
            digits = false;
            continue;
        }
        let is_digit = c.is_ascii_digit();
        if !current.is_empty() && is_digit != digits {
            flush(&mut current, digits);
        }
        digits = is_digit;
        current.push(c.to_ascii_lowercase());
    }
    flush(&mut current, digits);

    // `1.0.0`, `1-ga` and `1` are the same version
    while items
        .last()
        .is_some_and(|item| matches!(item, Item::Number(n) | Item::Qualifier(n) if n.is_empty()))
    {
        items.pop();
    }
    items
}

fn normalize(qualifier: &str) -> String {
    match qualifier {
        "a" => "alpha",
        "b" => "beta",
        "m" => "milestone",
        "cr" => "rc",
        "ga" | "final" | "release" => "",
        other => other,
    }
    .to_string()
}

fn rank(qualifier: &str) -> (usize, &str) {
    match QUALIFIERS.iter().position(|q| *q == qualifier) {
        Some(index) => (index, ""),
        None => (QUALIFIERS.len(), qualifier),
    }
}

fn compare_items(a: Option<&Item>, b: Option<&Item>) -> Ordering {
    match (a, b) {
        (Some(Item::Number(x)), Some(Item::Number(y))) => {
            x.len().cmp(&y.len()).then_with(|| x.cmp(y))
        }
        (Some(Item::Number(x)), None) => {
            if x.is_empty() {
                Ordering::Equal
            } else {
                Ordering::Greater
            }
        }
        (None, Some(Item::Number(_))) => compare_items(b, a).reverse(),
        (Some(Item::Number(_)), Some(Item::Qualifier(_))) => Ordering::Greater,
        (Some(Item::Qualifier(_)), Some(Item::Number(_))) => Ordering::Less,
        (Some(Item::Qualifier(x)), Some(Item::Qualifier(y))) => rank(x).cmp(&rank(y)),
        (Some(Item::Qualifier(x)), None) => rank(x).cmp(&rank("")),
        (None, Some(Item::Qualifier(y))) => rank("").cmp(&rank(y)),
        (None, None) => Ordering::Equal,
    }
}

/// Compare two version strings the way Maven orders them.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (left, right) = (items(a), items(b));
    (0..left.len().max(right.len()))
        .map(|i| compare_items(left.get(i), right.get(i)))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}
