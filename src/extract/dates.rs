use regex::Regex;
use std::sync::LazyLock;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(\d{4}-\d{1,2}-\d{1,2})(?:\D|$)").expect("hardcoded regex pattern is valid"));
static MONTH_DAY_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(\d{1,2}/\d{1,2}\s+\d{1,2}:\d{2})(?:\D|$)").expect("hardcoded regex pattern is valid"));
static RELATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\s*(?:天|小时|分钟|秒)前)").expect("hardcoded regex pattern is valid"));

/// Best-effort update marker in `text`. Patterns are tried in priority order
/// (`YYYY-MM-DD`, `MM/DD HH:MM`, `N天前`-style relative time); the first
/// pattern with any match wins, regardless of where in the text it sits.
/// Absolute dates must not be embedded in a longer run of digits.
pub fn find_date(text: &str) -> Option<String> {
    [&*ISO_DATE, &*MONTH_DAY_TIME, &*RELATIVE]
        .into_iter()
        .find_map(|re| re.captures(text).and_then(|c| c.get(1)))
        .map(|m| m.as_str().to_string())
}
