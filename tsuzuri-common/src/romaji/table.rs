//! Hepburn romanization table
//!
//! Keys are hiragana; katakana is folded onto hiragana before lookup, so one
//! table serves both syllabaries. The few katakana-only letters (ヷ..ヺ) are
//! keyed directly.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

/// Two-kana combinations (yōon and loan-word digraphs). Looked up before singles.
const DIGRAPHS: &[(&str, &str)] = &[
    ("きゃ", "kya"), ("きゅ", "kyu"), ("きぇ", "kye"), ("きょ", "kyo"),
    ("ぎゃ", "gya"), ("ぎゅ", "gyu"), ("ぎぇ", "gye"), ("ぎょ", "gyo"),
    ("しゃ", "sha"), ("しゅ", "shu"), ("しぇ", "she"), ("しょ", "sho"),
    ("じゃ", "ja"), ("じゅ", "ju"), ("じぇ", "je"), ("じょ", "jo"),
    ("ちゃ", "cha"), ("ちゅ", "chu"), ("ちぇ", "che"), ("ちょ", "cho"),
    ("ぢゃ", "ja"), ("ぢゅ", "ju"), ("ぢぇ", "je"), ("ぢょ", "jo"),
    ("にゃ", "nya"), ("にゅ", "nyu"), ("にぇ", "nye"), ("にょ", "nyo"),
    ("ひゃ", "hya"), ("ひゅ", "hyu"), ("ひぇ", "hye"), ("ひょ", "hyo"),
    ("びゃ", "bya"), ("びゅ", "byu"), ("びぇ", "bye"), ("びょ", "byo"),
    ("ぴゃ", "pya"), ("ぴゅ", "pyu"), ("ぴぇ", "pye"), ("ぴょ", "pyo"),
    ("みゃ", "mya"), ("みゅ", "myu"), ("みぇ", "mye"), ("みょ", "myo"),
    ("りゃ", "rya"), ("りゅ", "ryu"), ("りぇ", "rye"), ("りょ", "ryo"),
    ("ふぁ", "fa"), ("ふぃ", "fi"), ("ふぇ", "fe"), ("ふぉ", "fo"), ("ふゅ", "fyu"),
    ("てぃ", "ti"), ("てゅ", "tyu"), ("でぃ", "di"), ("でゅ", "dyu"),
    ("とぅ", "tu"), ("どぅ", "du"),
    ("つぁ", "tsa"), ("つぃ", "tsi"), ("つぇ", "tse"), ("つぉ", "tso"),
    ("うぃ", "wi"), ("うぇ", "we"), ("うぉ", "wo"),
    ("ゔぁ", "va"), ("ゔぃ", "vi"), ("ゔぇ", "ve"), ("ゔぉ", "vo"), ("ゔゅ", "vyu"),
    ("いぇ", "ye"),
    ("くぁ", "kwa"), ("くぃ", "kwi"), ("くぇ", "kwe"), ("くぉ", "kwo"),
    ("ぐぁ", "gwa"),
    ("すぃ", "si"), ("ずぃ", "zi"),
];

/// Single kana, including small vowels used on their own.
const SINGLES: &[(&str, &str)] = &[
    ("あ", "a"), ("い", "i"), ("う", "u"), ("え", "e"), ("お", "o"),
    ("か", "ka"), ("き", "ki"), ("く", "ku"), ("け", "ke"), ("こ", "ko"),
    ("が", "ga"), ("ぎ", "gi"), ("ぐ", "gu"), ("げ", "ge"), ("ご", "go"),
    ("さ", "sa"), ("し", "shi"), ("す", "su"), ("せ", "se"), ("そ", "so"),
    ("ざ", "za"), ("じ", "ji"), ("ず", "zu"), ("ぜ", "ze"), ("ぞ", "zo"),
    ("た", "ta"), ("ち", "chi"), ("つ", "tsu"), ("て", "te"), ("と", "to"),
    ("だ", "da"), ("ぢ", "ji"), ("づ", "zu"), ("で", "de"), ("ど", "do"),
    ("な", "na"), ("に", "ni"), ("ぬ", "nu"), ("ね", "ne"), ("の", "no"),
    ("は", "ha"), ("ひ", "hi"), ("ふ", "fu"), ("へ", "he"), ("ほ", "ho"),
    ("ば", "ba"), ("び", "bi"), ("ぶ", "bu"), ("べ", "be"), ("ぼ", "bo"),
    ("ぱ", "pa"), ("ぴ", "pi"), ("ぷ", "pu"), ("ぺ", "pe"), ("ぽ", "po"),
    ("ま", "ma"), ("み", "mi"), ("む", "mu"), ("め", "me"), ("も", "mo"),
    ("や", "ya"), ("ゆ", "yu"), ("よ", "yo"),
    ("ら", "ra"), ("り", "ri"), ("る", "ru"), ("れ", "re"), ("ろ", "ro"),
    ("わ", "wa"), ("ゐ", "i"), ("ゑ", "e"), ("を", "o"),
    ("ん", "n"),
    ("ゔ", "vu"),
    ("ぁ", "a"), ("ぃ", "i"), ("ぅ", "u"), ("ぇ", "e"), ("ぉ", "o"),
    ("ゃ", "ya"), ("ゅ", "yu"), ("ょ", "yo"), ("ゎ", "wa"),
    ("ゕ", "ka"), ("ゖ", "ke"),
    ("ヷ", "va"), ("ヸ", "vi"), ("ヹ", "ve"), ("ヺ", "vo"),
];

/// Read-only kana → romaji lookup.
#[derive(Debug)]
pub struct HepburnTable {
    map: HashMap<&'static str, &'static str>,
}

impl HepburnTable {
    fn build() -> Self {
        let map: HashMap<_, _> = DIGRAPHS.iter().chain(SINGLES.iter()).copied().collect();
        debug!(entries = map.len(), "Hepburn table built");
        Self { map }
    }

    /// Romaji for one kana or a two-kana digraph
    pub fn get(&self, kana: &str) -> Option<&'static str> {
        self.map.get(kana).copied()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.map.len()
    }
}

static TABLE: Lazy<HepburnTable> = Lazy::new(HepburnTable::build);

/// Process-wide table, built on first use and never mutated afterwards.
pub fn table() -> &'static HepburnTable {
    &TABLE
}
