/// Count labels shared by the rendered view and the in-place updater
///
/// Every label that carries a number is produced here, and the updater parses
/// those same labels back, so the text written after a close always matches what
/// a fresh render would produce.
use std::sync::LazyLock;

use regex::Regex;

/// Qualifier carried by duplicate-section headers
pub const DUPLICATE_QUALIFIER: &str = " in more than 1 tab";

/// Nouns that appear after a count in group headers
const COUNTED_NOUNS: [&str; 3] = ["address", "host", "tab"];

static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\s+(.*)$").unwrap());

/// Pluralize a noun for a count
pub fn plural(n: usize, noun: &str) -> String {
    if n == 1 || noun.ends_with("sh") {
        noun.to_string()
    } else if noun.ends_with('s') || noun.ends_with("ch") || noun.ends_with('x') {
        format!("{}es", noun)
    } else {
        format!("{}s", noun)
    }
}

pub fn has_have(n: usize) -> &'static str {
    if n == 1 { "has" } else { "have" }
}

/// "1 tab", "2 tabs"
pub fn count_noun(n: usize, noun: &str) -> String {
    format!("{} {}", n, plural(n, noun))
}

/// Page header: total tabs across all windows
pub fn tab_count_label(n: usize) -> String {
    count_noun(n, "tab")
}

/// First statistics line
pub fn loaded_label(n: usize) -> String {
    format!("{} {} been loaded", count_noun(n, "tab"), has_have(n))
}

pub fn windows_label(n: usize) -> String {
    format!("in {}", count_noun(n, "window"))
}

pub fn blank_label(n: usize) -> String {
    format!("{} blank {}", n, plural(n, "tab"))
}

pub fn scheme_label(count: usize, scheme: &str) -> String {
    format!("{} {}", count, scheme)
}

/// "3 addresses in more than 1 tab", "1 host in more than 1 tab"
pub fn duplicates_label(n: usize, noun: &str) -> String {
    format!("{}{}", count_noun(n, noun), DUPLICATE_QUALIFIER)
}

/// "4 unique addresses", "1 unique host"
pub fn unique_label(n: usize, noun: &str) -> String {
    format!("{} unique {}", n, plural(n, noun))
}

/// Split a label into its leading count and the rest of the text
pub fn parse_count(text: &str) -> Option<(usize, &str)> {
    let caps = COUNT_RE.captures(text.trim())?;
    let count = caps.get(1)?.as_str().parse().ok()?;
    let rest = caps.get(2)?.as_str();
    Some((count, rest))
}

/// Rewrite a group header for a new member count
///
/// The trailing counted noun is re-inflected for the new count and a duplicate
/// qualifier is carried over verbatim. Text with an unknown trailing word keeps
/// its wording.
pub fn relabel(rest: &str, count: usize) -> String {
    let (phrase, qualifier) = match rest.strip_suffix(DUPLICATE_QUALIFIER) {
        Some(phrase) => (phrase, DUPLICATE_QUALIFIER),
        None => (rest, ""),
    };

    let phrase = COUNTED_NOUNS
        .iter()
        .find_map(|noun| {
            let plural_form = plural(2, noun);
            phrase
                .strip_suffix(plural_form.as_str())
                .or_else(|| phrase.strip_suffix(noun))
                .filter(|head| head.is_empty() || head.ends_with(' '))
                .map(|head| format!("{}{}", head, plural(count, noun)))
        })
        .unwrap_or_else(|| phrase.to_string());

    format!("{} {}{}", count, phrase, qualifier)
}
