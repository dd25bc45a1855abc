use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Cyrillic letters in Ukrainian alphabetical order, with the Russian-only
/// letters at their root collation positions.
const CYRILLIC_ORDER: &str = "абвгґдеєжзиіїйклмнопрстуфхцчшщъыьэюя";

static CYRILLIC_RANK: Lazy<FxHashMap<char, u32>> = Lazy::new(|| {
    CYRILLIC_ORDER
        .chars()
        .enumerate()
        .map(|(i, c)| (c, i as u32))
        .collect()
});

static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    primary: Vec<(u8, u32)>,
    secondary: Vec<u32>,
    tertiary: Vec<u8>,
}

fn collation_key(s: &str) -> CollationKey {
    let mut key = CollationKey {
        primary: Vec::with_capacity(s.len()),
        secondary: Vec::with_capacity(s.len()),
        tertiary: Vec::with_capacity(s.len()),
    };

    for c in s.chars() {
        let case = u8::from(c.is_uppercase());

        for lower in c.to_lowercase() {
            let (primary, accent) = weigh(lower);
            key.primary.push(primary);
            key.secondary.push(accent);
            key.tertiary.push(case);
        }
    }

    key
}

/// Primary weight groups: whitespace, punctuation and symbols, digits,
/// Latin, Cyrillic, everything else.
fn weigh(c: char) -> ((u8, u32), u32) {
    if c == 'ё' {
        return ((4, CYRILLIC_RANK[&'е']), 1);
    }
    if let Some(&rank) = CYRILLIC_RANK.get(&c) {
        return ((4, rank), 0);
    }
    if c.is_whitespace() {
        return ((0, 0), 0);
    }
    if let Some(digit) = c.to_digit(10) {
        return ((2, digit), 0);
    }

    let mut decomposed = std::iter::once(c).nfd();
    let base = decomposed.next().unwrap_or(c);
    let accent = decomposed
        .filter(|m| is_combining_mark(*m))
        .map(|m| m as u32)
        .sum();

    if base.is_ascii_alphabetic() {
        ((3, base.to_ascii_lowercase() as u32), accent)
    } else if base.is_ascii_punctuation() || !base.is_alphanumeric() {
        ((1, base as u32), accent)
    } else {
        ((5, base as u32), accent)
    }
}

/// Sorts in Ukrainian locale order: case and accents only break ties,
/// Latin sorts before Cyrillic, and ґ/є/і/ї take their Ukrainian places.
pub fn sort_uk(items: &mut [String]) {
    items.sort_by_cached_key(|s| (collation_key(s), s.clone()));
}

fn transliterate_char(c: char, word_start: bool, prev: Option<char>) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' if prev == Some('з') => "gh",
        'г' => "h",
        'ґ' => "g",
        'д' => "d",
        'е' | 'э' => "e",
        'є' if word_start => "ye",
        'є' => "ie",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' | 'ы' => "y",
        'і' => "i",
        'ї' if word_start => "yi",
        'ї' => "i",
        'й' if word_start => "y",
        'й' => "i",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ю' if word_start => "yu",
        'ю' => "iu",
        'я' if word_start => "ya",
        'я' => "ia",
        'ь' | 'ъ' | '\'' | '’' | 'ʼ' => "",
        _ => return None,
    };

    Some(latin)
}

/// URL segment for a team name, e.g. "Шлях до слави" -> "shliakh-do-slavy".
pub fn team_slug(team: &str) -> String {
    let mut latin = String::with_capacity(team.len());
    let mut prev: Option<char> = None;

    for c in team.nfc().flat_map(char::to_lowercase) {
        let word_start = prev.map_or(true, |p| !p.is_alphabetic() && p != '\'' && p != '’');

        match transliterate_char(c, word_start, prev) {
            Some(mapped) => latin.push_str(mapped),
            None => latin.extend(std::iter::once(c).nfd().filter(|m| !is_combining_mark(*m))),
        }

        prev = Some(c);
    }

    NON_SLUG
        .replace_all(&latin, "-")
        .trim_matches('-')
        .to_string()
}
