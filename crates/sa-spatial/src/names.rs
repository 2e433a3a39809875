//! Abbreviation-tolerant street-name matching.
//!
//! Users type `"N Main St."`; map data says `"North Main Street"`.  Both
//! normalise to `"n main st"`.  Every token is lower-cased, stripped of
//! punctuation, and mapped to its short form.

/// Long form → short form.  Several long forms may share a short form
/// (`street` and `saint` both become `st`), which only makes matching more
/// tolerant.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("street", "st"),
    ("saint", "st"),
    ("avenue", "ave"),
    ("av", "ave"),
    ("road", "rd"),
    ("boulevard", "blvd"),
    ("drive", "dr"),
    ("lane", "ln"),
    ("highway", "hwy"),
    ("court", "ct"),
    ("place", "pl"),
    ("parkway", "pkwy"),
    ("terrace", "ter"),
    ("circle", "cir"),
    ("square", "sq"),
    ("mount", "mt"),
    ("north", "n"),
    ("south", "s"),
    ("east", "e"),
    ("west", "w"),
    ("northeast", "ne"),
    ("northwest", "nw"),
    ("southeast", "se"),
    ("southwest", "sw"),
];

fn short_form(token: &str) -> &str {
    ABBREVIATIONS
        .iter()
        .find(|(long, _)| *long == token)
        .map_or(token, |&(_, short)| short)
}

/// Canonical comparison form of a street name.
pub fn normalize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter_map(|c| match c {
            '.' | ',' | '\'' | '’' => None,
            '-' | '/' => Some(' '),
            c => Some(c.to_ascii_lowercase()),
        })
        .collect();

    cleaned
        .split_whitespace()
        .map(short_form)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `true` if two names refer to the same street modulo abbreviations.
pub fn matches(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// A case-insensitive regular expression (Overpass QL dialect) matching any
/// spelling of `name` that [`matches`] would accept.
pub fn overpass_pattern(name: &str) -> String {
    let tokens: Vec<String> = normalize(name)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(|token| {
            let mut forms: Vec<&str> = vec![token];
            forms.extend(
                ABBREVIATIONS
                    .iter()
                    .filter(|(_, short)| *short == token)
                    .map(|(long, _)| *long),
            );
            if forms.len() == 1 {
                escape_regex(token)
            } else {
                format!("({})\\.?", forms.join("|"))
            }
        })
        .collect();
    format!("^{}$", tokens.join("[ -]+"))
}

fn escape_regex(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for c in token.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
