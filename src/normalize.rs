//! Text normalization — turns raw chat text into publishable text.
//!
//! Applied in order:
//! 1. Remove every occurrence of the trigger token.
//! 2. Convert `:name:` emoji shorthand to Unicode where a mapping exists;
//!    unmapped shorthand stays literal (surfaced to the user in the
//!    confirmation prompt).
//! 3. Unwrap `<url>` / `<url|caption>` bracketed links to the bare URL,
//!    left to right, until none remain. The capture starts after the
//!    scheme, so `<https://example.com/a|caption>` becomes `example.com/a`.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static EMOJI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-z0-9_+\-]+):").expect("emoji shorthand regex"));

static BRACKET_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<https?://([^|>]+)(?:\|[^>]*)?>").expect("bracket link regex"));

static EMOJI_MAP: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("smile", "😄"),
        ("grin", "😁"),
        ("joy", "😂"),
        ("heart", "❤️"),
        ("fire", "🔥"),
        ("tada", "🎉"),
        ("rocket", "🚀"),
        ("eyes", "👀"),
        ("thumbsup", "👍"),
        ("+1", "👍"),
        ("thumbsdown", "👎"),
        ("-1", "👎"),
        ("wave", "👋"),
        ("clap", "👏"),
        ("sparkles", "✨"),
        ("star", "⭐"),
        ("100", "💯"),
        ("thinking_face", "🤔"),
        ("sunglasses", "😎"),
        ("sob", "😭"),
    ])
});

/// Bound on bracket-unwrap passes, in case a pathological input keeps
/// producing matches.
const MAX_UNWRAP_PASSES: usize = 64;

/// Normalizes raw chat text into publishable text.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    trigger_token: String,
}

impl TextNormalizer {
    pub fn new(trigger_token: impl Into<String>) -> Self {
        Self {
            trigger_token: trigger_token.into(),
        }
    }

    /// Normalize raw text. Returns `None` when the event carried no text
    /// (e.g. a non-text message); that case is logged, not surfaced to
    /// the user. No trimming is applied.
    pub fn normalize(&self, raw: Option<&str>) -> Option<String> {
        let Some(raw) = raw else {
            debug!("event carried no text, nothing to normalize");
            return None;
        };

        let mut text = raw.replace(&self.trigger_token, "");

        text = EMOJI_RE
            .replace_all(&text, |caps: &regex::Captures| {
                match EMOJI_MAP.get(&caps[1]) {
                    Some(glyph) => (*glyph).to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned();

        // One bracketed link per pass, left to right. Each pass strictly
        // shortens the string; the bound guards against regressions.
        for _ in 0..MAX_UNWRAP_PASSES {
            let unwrapped = BRACKET_LINK_RE.replace(&text, "${1}").into_owned();
            if unwrapped == text {
                break;
            }
            text = unwrapped;
        }

        Some(text)
    }
}

/// Whether the text still contains `:name:` shorthand after normalization
/// (i.e. codes with no Unicode mapping, which will be posted as written).
pub fn contains_emoji_shorthand(text: &str) -> bool {
    EMOJI_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(":twitter:")
    }

    #[test]
    fn golden_string() {
        let out = normalizer().normalize(Some("<https://example.com/a|caption> hello :twitter:"));
        assert_eq!(out.as_deref(), Some("example.com/a hello "));
    }

    #[test]
    fn removes_every_trigger_occurrence() {
        let out = normalizer().normalize(Some(":twitter: one :twitter: two"));
        assert_eq!(out.as_deref(), Some(" one  two"));
    }

    #[test]
    fn maps_known_emoji_shorthand() {
        let out = normalizer().normalize(Some("ship it :rocket::fire:"));
        assert_eq!(out.as_deref(), Some("ship it 🚀🔥"));
    }

    #[test]
    fn leaves_unmapped_shorthand_literal() {
        let out = normalizer().normalize(Some("hello :blobwave:"));
        assert_eq!(out.as_deref(), Some("hello :blobwave:"));
        assert!(contains_emoji_shorthand("hello :blobwave:"));
    }

    #[test]
    fn unwraps_plain_bracket_link() {
        let out = normalizer().normalize(Some("see <https://example.com/page>"));
        assert_eq!(out.as_deref(), Some("see example.com/page"));
    }

    #[test]
    fn unwraps_multiple_links_left_to_right() {
        let out = normalizer().normalize(Some("<http://a.io/x|one> and <https://b.io/y>"));
        assert_eq!(out.as_deref(), Some("a.io/x and b.io/y"));
    }

    #[test]
    fn unterminated_bracket_is_left_alone() {
        let out = normalizer().normalize(Some("broken <https://example.com/a"));
        assert_eq!(out.as_deref(), Some("broken <https://example.com/a"));
    }

    #[test]
    fn absent_text_yields_none() {
        assert_eq!(normalizer().normalize(None), None);
    }

    #[test]
    fn no_trimming_applied() {
        let out = normalizer().normalize(Some("  padded  "));
        assert_eq!(out.as_deref(), Some("  padded  "));
    }
}
