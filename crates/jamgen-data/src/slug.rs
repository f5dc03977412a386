//! URL-safe slugs derived from human-readable names.

/// Slugify a name: lowercase ASCII letters and digits joined by single
/// hyphens, common Latin diacritics transliterated. Whitespace, hyphens,
/// and underscores separate words; any other punctuation is dropped
/// without splitting, so "what's up" becomes "whats-up".
///
/// Deterministic: the same name always yields the same slug. A name made
/// entirely of punctuation yields the empty string.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            if !slug.is_empty() {
                pending_separator = true;
            }
            continue;
        }

        let mapped = transliterate(ch);
        if mapped.is_empty() {
            continue;
        }

        if pending_separator {
            slug.push('-');
            pending_separator = false;
        }
        slug.push_str(mapped);
    }

    slug
}

/// Map a character to its slug form. Empty string means "separator".
fn transliterate(ch: char) -> &'static str {
    match ch {
        'a'..='z' | '0'..='9' => ascii_str(ch),
        'A'..='Z' => ascii_str(ch.to_ascii_lowercase()),
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => "a",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        'ñ' | 'Ñ' => "n",
        'ç' | 'Ç' => "c",
        'ß' => "ss",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        _ => "",
    }
}

/// Static single-char strings for ASCII lowercase letters and digits.
fn ascii_str(ch: char) -> &'static str {
    const TABLE: &[&str] = &[
        "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "a", "b", "c", "d", "e", "f", "g", "h",
        "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z",
    ];
    match ch {
        '0'..='9' => TABLE[ch as usize - '0' as usize],
        'a'..='z' => TABLE[10 + ch as usize - 'a' as usize],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Space Lizards"), "space-lizards");
        assert_eq!(slugify("The  Great   Escape"), "the-great-escape");
    }

    #[test]
    fn drops_punctuation() {
        assert_eq!(slugify("Rock & Roll!"), "rock-roll");
        assert_eq!(slugify("C++ Crusade"), "c-crusade");
    }

    #[test]
    fn embedded_punctuation_does_not_split_words() {
        assert_eq!(slugify("what's up?"), "whats-up");
        assert_eq!(slugify("Dr. No's Lab"), "dr-nos-lab");
        assert_eq!(slugify("snake_case name"), "snake-case-name");
    }

    #[test]
    fn transliterates_diacritics() {
        assert_eq!(slugify("Über Größe"), "uber-grosse");
        assert_eq!(slugify("Café Déjà Vu"), "cafe-deja-vu");
    }

    #[test]
    fn punctuation_only_names_yield_empty_slug() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn no_leading_or_trailing_hyphens() {
        assert_eq!(slugify("  spaced out  "), "spaced-out");
        assert_eq!(slugify("(parens)"), "parens");
    }

    #[test]
    fn is_deterministic() {
        let name = "Jäger: Die Rückkehr (2024)!";
        assert_eq!(slugify(name), slugify(name));
        assert_eq!(slugify(name), "jager-die-ruckkehr-2024");
    }
}
