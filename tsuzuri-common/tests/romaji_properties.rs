//! Property tests for the transliteration engine

use proptest::prelude::*;
use tsuzuri_common::romaji::transliterate;

/// Kana, punctuation, kanji and ASCII mixed together
fn kana_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            'あ', 'か', 'き', 'ゃ', 'し', 'ょ', 'っ', 'ん', 'ン', 'ー', 'な', 'に', 'ぬ',
            'ア', 'キ', 'ャ', 'ッ', 'チ', '、', '。', '，', '．', '猫', 'n', 'a', ' ', 'ヴ',
            'ぁ', 'ふ', 'て', 'ぃ',
        ]),
        0..24,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn transliteration_is_deterministic(text in kana_text()) {
        prop_assert_eq!(transliterate(Some(&text)), transliterate(Some(&text)));
    }

    #[test]
    fn output_has_no_full_width_punctuation(text in kana_text()) {
        let out = transliterate(Some(&text));
        for c in ['、', '。', '，', '．'] {
            prop_assert!(!out.contains(c), "{:?} -> {:?}", text, out);
        }
    }

    /// A run of `n` that is not followed by a vowel has even length:
    /// every bare `n` there was doubled.
    #[test]
    fn no_bare_n_before_non_vowel(text in kana_text()) {
        let out: Vec<char> = transliterate(Some(&text)).chars().collect();
        let mut i = 0;
        while i < out.len() {
            if out[i] != 'n' {
                i += 1;
                continue;
            }
            let start = i;
            while i < out.len() && out[i] == 'n' {
                i += 1;
            }
            let run = i - start;
            let next_is_vowel = out.get(i).is_some_and(|c| "aiueo".contains(*c));
            prop_assert!(
                next_is_vowel || run % 2 == 0,
                "bare n in {:?} (from {:?})",
                out.iter().collect::<String>(),
                text
            );
        }
    }
}

#[test]
fn greeting_has_no_trailing_bare_n() {
    let out = transliterate(Some("こんにちは"));
    assert!(!out.is_empty());
    assert!(!out.ends_with('n'));
}
