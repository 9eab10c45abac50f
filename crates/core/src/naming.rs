//! Durable object key derivation for relocated media.
//!
//! Provider-hosted URLs are ephemeral; when audio or cover bytes are copied
//! into durable storage they get deterministic keys derived from the job,
//! the (sanitized) title, and the variant index, so redeliveries overwrite
//! the same object instead of accumulating orphans.

/// Variant side letter: index 0 is "A", index 1 is "B".
///
/// The provider conventionally returns two variants; further indices keep
/// counting up the alphabet so a surprising third variant still gets a
/// distinct, stable side.
pub fn side_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// Reduce a title to a lowercase ascii slug usable inside an object key.
///
/// Non-alphanumeric runs collapse to single underscores; an empty result
/// falls back to `"untitled"`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_sep = true;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Object key for a variant's final audio.
pub fn audio_object_key(task_id: &str, title: Option<&str>, index: usize) -> String {
    let slug = slugify(title.unwrap_or("untitled"));
    format!("audio/{task_id}/{slug}_{index}.mp3")
}

/// Object key for a generated cover image.
pub fn cover_object_key(cover_task_id: &str, index: usize) -> String {
    format!("covers/{cover_task_id}/cover_{index}.png")
}

/// File name recorded on a cover image row.
pub fn cover_file_name(cover_task_id: &str, index: usize) -> String {
    format!("{cover_task_id}_cover_{index}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_letters_follow_the_alphabet() {
        assert_eq!(side_letter(0), 'A');
        assert_eq!(side_letter(1), 'B');
        assert_eq!(side_letter(2), 'C');
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Midnight  Drive!"), "midnight_drive");
        assert_eq!(slugify("  A -- B  "), "a_b");
    }

    #[test]
    fn slugify_empty_falls_back() {
        assert_eq!(slugify("!!!"), "untitled");
        assert_eq!(slugify(""), "untitled");
    }

    #[test]
    fn audio_key_includes_task_slug_and_index() {
        assert_eq!(
            audio_object_key("T1", Some("Paper Moon"), 1),
            "audio/T1/paper_moon_1.mp3"
        );
        assert_eq!(audio_object_key("T1", None, 0), "audio/T1/untitled_0.mp3");
    }

    #[test]
    fn cover_names_are_deterministic() {
        assert_eq!(cover_object_key("C9", 0), "covers/C9/cover_0.png");
        assert_eq!(cover_file_name("C9", 1), "C9_cover_1.png");
    }
}
