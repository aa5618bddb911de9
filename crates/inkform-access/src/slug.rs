//! URL slug derivation for studio and template names.

/// Derive a URL slug from a display name.
///
/// Deterministic and idempotent: common Latin diacritics fold to ASCII,
/// everything else outside `[a-z0-9_ -]` is dropped, and runs of
/// whitespace, underscores and hyphens collapse to a single hyphen.
/// Returns an empty string when nothing survives; callers treat that as a
/// validation error.
pub fn generate_slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());

    for c in name.to_lowercase().chars() {
        match c {
            'à' | 'á' | 'â' | 'ä' | 'æ' | 'ã' | 'å' | 'ā' => out.push('a'),
            'ç' | 'ć' | 'č' => out.push('c'),
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' => out.push('e'),
            'î' | 'ï' | 'í' | 'ī' | 'į' | 'ì' => out.push('i'),
            'ñ' | 'ń' => out.push('n'),
            'ô' | 'ö' | 'ò' | 'ó' | 'œ' | 'ø' | 'ō' | 'õ' => out.push('o'),
            'û' | 'ü' | 'ù' | 'ú' | 'ū' => out.push('u'),
            'ý' | 'ÿ' => out.push('y'),
            'đ' => out.push('d'),
            'ł' => out.push('l'),
            'ż' | 'ź' | 'ž' => out.push('z'),
            'ś' | 'š' | 'ș' => out.push('s'),
            'ț' | 'ţ' => out.push('t'),
            'ß' => out.push_str("ss"),
            'a'..='z' | '0'..='9' => out.push(c),
            ' ' | '\t' | '\n' | '\r' | '_' | '-' => out.push(' '),
            _ => {}
        }
    }

    let mut slug = String::with_capacity(out.len());
    for word in out.split_whitespace() {
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(word);
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_diacritics() {
        assert_eq!(generate_slug("Tätòwierstube Außén"), "tatowierstube-aussen");
        assert_eq!(generate_slug("Çà é Là"), "ca-e-la");
    }

    #[test]
    fn collapses_separators_and_trims() {
        assert_eq!(generate_slug("  Black -- Lotus_Tattoo  "), "black-lotus-tattoo");
        assert_eq!(generate_slug("-edge-"), "edge");
    }

    #[test]
    fn drops_punctuation() {
        assert_eq!(generate_slug("Mario's Ink & Art!"), "marios-ink-art");
    }

    #[test]
    fn is_idempotent() {
        for name in ["Studio Üno", "a b c", "Ink & Needle", "---"] {
            let once = generate_slug(name);
            assert_eq!(generate_slug(&once), once);
        }
    }

    #[test]
    fn empty_when_nothing_survives() {
        assert_eq!(generate_slug("!!!"), "");
        assert_eq!(generate_slug("   "), "");
    }
}
