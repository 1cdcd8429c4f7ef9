use once_cell::sync::Lazy;
use regex::Regex;

// Full URLs, `www.` hosts, then bare `domain.tld` tokens.
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:https?|ftp)://[-A-Z0-9+&@#/%?=~_|!:,.;]*[-A-Z0-9+&@#/%=~_|]",
        r"|\bwww\.[-A-Z0-9+&@#/%?=~_|!:,.;]*[-A-Z0-9+&@#/%=~_|]",
        r"|\b[-A-Z0-9+&@#/%?=~_|!:,.;]+\.[A-Z]{2,}\b",
    ))
    .expect("URL pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Link { text: &'a str, href: String },
}

/// Splits `content` into plain and link segments in a single pass.
pub fn linkify(content: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in URL_PATTERN.find_iter(content) {
        if m.start() > last {
            segments.push(Segment::Text(&content[last..m.start()]));
        }
        segments.push(Segment::Link {
            text: m.as_str(),
            href: href_for(m.as_str()),
        });
        last = m.end();
    }

    if last < content.len() {
        segments.push(Segment::Text(&content[last..]));
    }

    segments
}

fn href_for(matched: &str) -> String {
    let lower = matched.to_ascii_lowercase();
    if ["http://", "https://", "ftp://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        matched.to_string()
    } else {
        format!("http://{}", matched)
    }
}

pub fn to_markdown(segments: &[Segment<'_>]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => text.to_string(),
            Segment::Link { text, href } => format!("[{}]({})", text, href),
        })
        .collect()
}
