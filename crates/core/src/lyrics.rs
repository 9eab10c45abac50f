//! Title derivation from provider lyrics payloads.
//!
//! The provider does not always return an explicit title at the text stage.
//! Fallback order: explicit title, a `[title: ...]` marker embedded in the
//! lyrics, then the first lyric line that is not a section header.

use std::sync::OnceLock;

use regex::Regex;

fn title_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"(?i)\[\s*title\s*:\s*([^\]]+)\]").expect("title marker regex is valid")
    })
}

/// Derive a human title for a generation job.
///
/// Returns `None` when neither an explicit title nor any usable lyric line
/// is available; the job's title is then left unset.
pub fn derive_title(explicit: Option<&str>, lyrics: Option<&str>) -> Option<String> {
    if let Some(title) = explicit {
        let trimmed = title.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }

    let lyrics = lyrics?;

    if let Some(caps) = title_marker().captures(lyrics) {
        let marked = caps[1].trim();
        if !marked.is_empty() {
            return Some(marked.to_string());
        }
    }

    first_lyric_line(lyrics)
}

/// First non-empty line of `lyrics` that is not a section header.
///
/// Section headers are bracketed lines like `[Verse 1]` or `[Chorus]`.
fn first_lyric_line(lyrics: &str) -> Option<String> {
    lyrics
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('['))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_title_wins() {
        let title = derive_title(Some("Neon Nights"), Some("[title: Other]\nfirst line"));
        assert_eq!(title.as_deref(), Some("Neon Nights"));
    }

    #[test]
    fn blank_explicit_title_is_ignored() {
        let title = derive_title(Some("   "), Some("[title: Midnight]\n..."));
        assert_eq!(title.as_deref(), Some("Midnight"));
    }

    #[test]
    fn marker_is_case_insensitive_and_trimmed() {
        let title = derive_title(None, Some("[ TITLE :  Paper Moon ]\n[Verse]\nla la"));
        assert_eq!(title.as_deref(), Some("Paper Moon"));
    }

    #[test]
    fn falls_back_to_first_non_header_line() {
        let lyrics = "[Verse 1]\n\nWalking down the wire\n[Chorus]";
        assert_eq!(
            derive_title(None, Some(lyrics)).as_deref(),
            Some("Walking down the wire")
        );
    }

    #[test]
    fn all_headers_yields_none() {
        assert_eq!(derive_title(None, Some("[Verse]\n[Chorus]\n")), None);
    }

    #[test]
    fn no_inputs_yields_none() {
        assert_eq!(derive_title(None, None), None);
    }
}
