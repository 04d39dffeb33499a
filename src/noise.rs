/// Where a noise word shows up on the hunt summary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseRole {
    /// Window chrome and buttons around the table.
    Chrome,
    /// Column titles. A line containing one starts the table.
    Header,
    /// Totals and pagination. A line containing one ends the table.
    Footer,
}

#[derive(Debug, Clone, Copy)]
pub struct NoiseWord {
    pub text: &'static str,
    pub role: NoiseRole,
}

const fn chrome(text: &'static str) -> NoiseWord {
    NoiseWord {
        text,
        role: NoiseRole::Chrome,
    }
}

const fn header(text: &'static str) -> NoiseWord {
    NoiseWord {
        text,
        role: NoiseRole::Header,
    }
}

const fn footer(text: &'static str) -> NoiseWord {
    NoiseWord {
        text,
        role: NoiseRole::Footer,
    }
}

/// UI words the OCR engine picks up around and inside the hunt table.
///
/// Order matters: the name sanitizer strips them one by one in this order,
/// so "novo grupo" has to come before "grupo" and "ganho total" before "total".
/// The OCR engine runs with an English model over Portuguese text, so a few
/// common misreads are listed next to the real word.
pub const NOISE_WORDS: &[NoiseWord] = &[
    chrome("detalhes"),
    chrome("detahes"),
    chrome("detaihes"),
    chrome("recargas"),
    chrome("novo grupo"),
    chrome("grupo"),
    chrome("saque"),
    header("item"),
    header("contagem"),
    header("valor"),
    footer("ganho total"),
    chrome("total"),
    footer("página"),
    footer("pagina"),
    footer("redefinir"),
    chrome("pokémon party"),
    chrome("party"),
];

/// "total" next to this currency suffix is the grand total row.
pub const TOTAL_WORD: &str = "total";
pub const CURRENCY_MARKER: &str = "dl";

/// Stray letters the OCR engine reads out of icons and table borders.
pub const ARTIFACT_LETTERS: &[&str] = &["i", "ey"];

/// Artifact that is only noise when nothing else is left.
pub const LONE_ARTIFACT: &str = "s";

pub fn words_with_role(role: NoiseRole) -> impl Iterator<Item = &'static str> {
    NOISE_WORDS
        .iter()
        .filter(move |w| w.role == role)
        .map(|w| w.text)
}

/// Exact (case-insensitive) match against the noise vocabulary.
pub fn is_noise_word(token: &str) -> bool {
    let lower = token.to_lowercase();
    NOISE_WORDS.iter().any(|w| w.text == lower)
}

/// Does this (already lower-cased) line contain a word of the given role?
pub fn line_has_role(lower_line: &str, role: NoiseRole) -> bool {
    words_with_role(role).any(|w| lower_line.contains(w))
}
