//! Canonical text form used for fingerprinting and fuzzy comparison.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize free text.
///
/// Lower-cases, decomposes (NFKD) and drops combining marks, keeps only
/// `[a-z0-9]` and whitespace, then collapses whitespace runs and trims.
/// The result is stable under repeated application.
pub fn normalize(text: &str) -> String {
    let filtered: String = text
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    filtered.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_punctuation() {
        assert_eq!(normalize("  ¡Hóla!  Mundo. "), "hola mundo");
    }

    #[test]
    fn is_idempotent() {
        let inputs = [
            "  ¡Hóla!  Mundo. ",
            "Ñandú\tcon  PIÑA",
            "Artículo 689-3 del E.T.",
            "",
            "ﬁ ligature ①",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(normalize("Ley 1819 de 2016"), "ley 1819 de 2016");
    }

    #[test]
    fn collapses_unicode_whitespace() {
        assert_eq!(normalize("a\u{00A0}\u{2003}b\n\nc"), "a b c");
    }

    #[test]
    fn drops_non_latin_letters() {
        assert_eq!(normalize("impuesto Δ valor"), "impuesto valor");
    }

    #[test]
    fn empty_and_symbol_only_inputs_normalize_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("¿?!... --"), "");
    }
}
