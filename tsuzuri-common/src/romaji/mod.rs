//! Kana to Hepburn romaji transliteration
//!
//! Conversion runs in three passes:
//! 1. Base conversion of hiragana/katakana through the Hepburn [`table`]
//! 2. Full-width punctuation to ASCII (`、`/`，` → `,`, `。`/`．` → `.`)
//! 3. Moraic nasal correction: every `n` not followed by a vowel becomes `nn`
//!
//! Kanji are not converted; they pass through unchanged.
//! All functions are pure and never fail.

mod table;

pub use table::{table, HepburnTable};

use serde_json::Value;

const SOKUON: char = 'っ';
const CHOON: char = 'ー';

/// Transliterate a kana string to romaji. `None` yields an empty string.
pub fn transliterate(phonetic: Option<&str>) -> String {
    match phonetic {
        Some(text) => {
            let base = to_romaji(text);
            let punctuated = normalize_punctuation(&base);
            fix_moraic_nasal(&punctuated)
        }
        None => String::new(),
    }
}

/// Transliterate an arbitrary JSON value; anything but a string yields `""`.
pub fn transliterate_value(value: &Value) -> String {
    transliterate(value.as_str())
}

/// Base conversion through the Hepburn table
pub fn to_romaji(text: &str) -> String {
    let table = table();
    let chars: Vec<char> = text.chars().map(fold_char).collect();
    let mut out = String::with_capacity(text.len());
    let mut sokuon = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == SOKUON {
            sokuon = true;
            i += 1;
            continue;
        }

        if ch == CHOON {
            if let Some(vowel) = out.chars().last().filter(|c| is_vowel(*c)) {
                out.push(vowel);
            }
            sokuon = false;
            i += 1;
            continue;
        }

        let (romaji, consumed) = match chars.get(i + 1) {
            Some(next) => {
                let pair: String = [ch, *next].iter().collect();
                match table.get(&pair) {
                    Some(r) => (Some(r), 2),
                    None => (table.get(ch.encode_utf8(&mut [0; 4])), 1),
                }
            }
            None => (table.get(ch.encode_utf8(&mut [0; 4])), 1),
        };

        match romaji {
            Some(r) => {
                if sokuon {
                    if let Some(first) = r.chars().next().filter(|c| !is_vowel(*c)) {
                        out.push(first);
                    }
                }
                out.push_str(r);
            }
            None => out.push(ch),
        }

        sokuon = false;
        i += consumed;
    }

    out
}

/// Replace full-width comma/period forms with ASCII
pub fn normalize_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '、' | '，' => ',',
            '。' | '．' => '.',
            other => other,
        })
        .collect()
}

/// Double every `n` that is not immediately followed by `a`, `i`, `u`, `e` or `o`.
///
/// Single left-to-right pass over the input characters; inserted characters
/// are not re-examined. Each `n` is judged on its own, so `nn` becomes `nnnn`.
pub fn fix_moraic_nasal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if c == 'n' && !chars.peek().is_some_and(|next| is_vowel(*next)) {
            out.push('n');
        }
    }

    out
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'i' | 'u' | 'e' | 'o')
}

/// Fold katakana onto hiragana and full-width ASCII onto ASCII.
fn fold_char(c: char) -> char {
    match c {
        // ァ..ヶ share layout with ぁ..ゖ, 0x60 apart
        '\u{30A1}'..='\u{30F6}' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        '\u{3000}' => ' ',
        _ => c,
    }
}
