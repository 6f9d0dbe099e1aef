//! Mandarin variant generation: per-character homophone combination.
//!
//! Whole-key mutation fits alphabetic languages badly here — Mandarin
//! errors happen per character. So each character expands into its fuzzy
//! Pinyin readings, each reading back-projects through a bundled homophone
//! pool, and the cartesian combinations (fewest changed positions first)
//! become candidate surfaces. The search space is bounded by
//! `min(300, 100 × word_len)` combinations, deduplicated by running Pinyin
//! key during expansion rather than after.
//!
//! Hardcoded rules add what phoneme edits cannot express: slurred-phrase
//! contractions from the sticky-phrase table, and abbreviation-style
//! contractions for multi-character names (台北車站 → 北車).

use super::{finalize_variants, score_keys, FuzzyGenerator, Variant, VariantSource};
use crate::backend::mandarin::MandarinBackend;
use crate::backend::{PhoneticBackend, PhoneticKey};
use crate::config::PhoneticOverrides;
use crate::error::Result;
use crate::phonetic::mandarin::{MandarinRules, STICKY_PHRASES};
use crate::tokenizer::is_hanzi;
use std::sync::Arc;

/// Pinyin → representative traditional hanzi, for back-projecting fuzzy
/// readings to surfaces. Syllables missing from the pool simply do not
/// back-project; the canonical surface stays in the search set regardless.
const HOMOPHONE_POOL: &[(&str, &[&str])] = &[
    ("tai", &["台", "太", "抬"]),
    ("dai", &["帶", "代"]),
    ("bei", &["北", "被", "貝"]),
    ("pei", &["配", "陪"]),
    ("che", &["車", "徹"]),
    ("ce", &["側", "測"]),
    ("zhan", &["站", "佔", "戰"]),
    ("zan", &["贊", "暫"]),
    ("niu", &["牛", "紐"]),
    ("liu", &["流", "留", "六"]),
    ("nai", &["奶", "耐"]),
    ("lai", &["來", "賴"]),
    ("ran", &["然", "燃"]),
    ("lan", &["蘭", "藍", "懶"]),
    ("yan", &["嚴", "言", "演"]),
    ("hou", &["後", "候", "厚"]),
    ("yong", &["永", "勇", "用"]),
    ("dou", &["豆", "鬥", "都"]),
    ("he", &["和", "河", "喝"]),
    ("jiang", &["漿", "江", "講"]),
    ("jian", &["見", "間", "建"]),
    ("zhe", &["者", "這"]),
    ("e", &["惡", "餓"]),
    ("long", &["龍", "隆"]),
    ("fa", &["發", "法"]),
    ("hua", &["花", "華", "話"]),
    ("hui", &["揮", "會", "輝"]),
    ("fei", &["飛", "非", "費"]),
    ("wei", &["微", "為", "位"]),
    ("fan", &["飯", "反", "範"]),
    ("wan", &["彎", "完", "晚"]),
    ("feng", &["風", "封"]),
    ("hong", &["紅", "洪"]),
    ("fu", &["服", "福", "復"]),
    ("hu", &["湖", "呼", "胡"]),
    ("xue", &["學", "雪"]),
    ("xie", &["些", "寫", "謝"]),
    ("jue", &["覺", "決"]),
    ("jie", &["接", "街", "節"]),
    ("que", &["確", "缺"]),
    ("qie", &["切", "且"]),
    ("zhong", &["中", "重", "鐘"]),
    ("zong", &["宗", "總"]),
    ("shi", &["是", "市", "事"]),
    ("si", &["四", "死", "思"]),
    ("chang", &["常", "長", "場"]),
    ("cang", &["倉", "藏"]),
    ("sheng", &["生", "聲", "勝"]),
    ("seng", &["僧"]),
    ("shan", &["山", "善"]),
    ("san", &["三", "散"]),
    ("nan", &["南", "難", "男"]),
    ("mai", &["買", "賣", "麥"]),
    ("man", &["慢", "滿"]),
    ("ming", &["明", "名", "命"]),
    ("min", &["民", "敏"]),
    ("ping", &["平", "瓶", "評"]),
    ("pin", &["品", "拼"]),
    ("ting", &["聽", "停", "廳"]),
    ("tin", &[]),
    ("xing", &["行", "型", "星"]),
    ("xin", &["新", "心", "信"]),
    ("ying", &["應", "影", "英"]),
    ("yin", &["音", "因", "銀"]),
    ("ling", &["靈", "零", "領"]),
    ("lin", &["林", "臨", "淋"]),
    ("ning", &["寧"]),
    ("nin", &["您"]),
    ("jing", &["經", "京", "靜"]),
    ("jin", &["金", "進", "近"]),
    ("qing", &["請", "清", "情"]),
    ("qin", &["親", "琴"]),
    ("zheng", &["正", "整", "證"]),
    ("zhen", &["真", "針", "珍"]),
    ("zen", &["怎"]),
    ("zeng", &["增", "贈"]),
    ("cheng", &["成", "城", "程"]),
    ("chen", &["陳", "沉"]),
    ("cen", &[]),
    ("ceng", &["層", "曾"]),
    ("shen", &["深", "身", "神"]),
    ("sen", &["森"]),
    ("sheng", &["生", "聲"]),
    ("ban", &["班", "半", "辦"]),
    ("bang", &["幫", "棒"]),
    ("dan", &["但", "單", "蛋"]),
    ("dang", &["當", "黨"]),
    ("guan", &["關", "管", "官"]),
    ("guang", &["光", "廣"]),
    ("wang", &["王", "網", "望"]),
    ("an", &["安", "暗"]),
    ("ang", &["昂"]),
    ("gan", &["感", "乾", "趕"]),
    ("gang", &["剛", "港", "鋼"]),
    ("kan", &["看", "砍"]),
    ("kang", &["康", "抗"]),
    ("han", &["漢", "含"]),
    ("hang", &["航", "行"]),
    ("yu", &["魚", "雨", "語"]),
    ("wu", &["五", "無", "物"]),
    ("li", &["里", "理", "力"]),
    ("ni", &["你", "妮", "泥"]),
    ("lei", &["類", "雷", "累"]),
    ("nei", &["內"]),
    ("le", &["了", "樂"]),
    ("ne", &["呢"]),
    ("luo", &["落", "羅"]),
    ("nuo", &["諾"]),
    ("lu", &["路", "錄", "露"]),
    ("nu", &["努", "怒"]),
    ("rou", &["肉", "柔"]),
    ("lou", &["樓", "漏"]),
    ("re", &["熱"]),
    ("ri", &["日"]),
    ("zi", &["子", "字", "自"]),
    ("zhi", &["之", "知", "指"]),
    ("ci", &["次", "詞", "此"]),
    ("chi", &["吃", "持", "遲"]),
    ("su", &["速", "素", "蘇"]),
    ("shu", &["書", "數", "樹"]),
    ("sang", &["桑"]),
    ("shang", &["上", "商", "傷"]),
    ("song", &["送", "松"]),
    ("chong", &["充", "重", "衝"]),
    ("cong", &["從", "聰"]),
];

const MAX_COMBO_ABS: usize = 300;
const MAX_COMBO_PER_CHAR: usize = 100;
const MAX_PER_PINYIN: usize = 2;

#[derive(Clone)]
struct CharOption {
    syllable: String,
    surface: char,
}

/// Per-character homophone-combination generator for Mandarin.
pub struct MandarinFuzzyGenerator {
    backend: Arc<MandarinBackend>,
    rules: Arc<MandarinRules>,
    overrides: PhoneticOverrides,
}

impl MandarinFuzzyGenerator {
    /// Creates a generator sharing the engine's backend and rule tables.
    pub fn new(
        backend: Arc<MandarinBackend>,
        rules: Arc<MandarinRules>,
        overrides: PhoneticOverrides,
    ) -> Self {
        Self {
            backend,
            rules,
            overrides,
        }
    }

    fn pool_chars(syllable: &str) -> &'static [&'static str] {
        HOMOPHONE_POOL
            .iter()
            .find(|(p, _)| *p == syllable)
            .map(|(_, chars)| *chars)
            .unwrap_or(&[])
    }

    /// Fuzzy readings of one character, the original always first.
    fn char_variations(&self, ch: char) -> Vec<CharOption> {
        if !is_hanzi(ch) {
            return vec![CharOption {
                syllable: ch.to_lowercase().to_string(),
                surface: ch,
            }];
        }

        let base = self
            .backend
            .to_phonetic(&ch.to_string())
            .map(|k| k.compact())
            .unwrap_or_default();

        let mut options = vec![CharOption {
            syllable: base.clone(),
            surface: ch,
        }];

        for syllable in self.rules.syllable_variants(&base) {
            for candidate in Self::pool_chars(&syllable) {
                let candidate_char = candidate.chars().next().unwrap_or(ch);
                let exists = options
                    .iter()
                    .any(|o| o.syllable == syllable && o.surface == candidate_char);
                if !exists {
                    options.push(CharOption {
                        syllable: syllable.clone(),
                        surface: candidate_char,
                    });
                }
            }
        }

        options
    }

    /// Cartesian combinations ordered by number of changed positions,
    /// deduplicated by running Pinyin key during expansion.
    fn char_combinations(&self, options: &[Vec<CharOption>]) -> Vec<String> {
        let n = options.len();
        let cap = MAX_COMBO_ABS.min(MAX_COMBO_PER_CHAR * n.max(1));

        let mut seen_pinyin: Vec<(String, usize)> = Vec::new();
        let mut combos: Vec<String> = Vec::new();

        'outer: for diff_count in 0..=n {
            for positions in combinations(n, diff_count) {
                if combos.len() >= cap {
                    break 'outer;
                }
                // Every changed position needs an alternative to offer.
                if positions.iter().any(|&p| options[p].len() <= 1) {
                    continue;
                }

                let radios: Vec<usize> = (0..n)
                    .map(|i| {
                        if positions.contains(&i) {
                            options[i].len() - 1
                        } else {
                            1
                        }
                    })
                    .collect();

                let mut counter = vec![0usize; n];
                loop {
                    if combos.len() >= cap {
                        break 'outer;
                    }

                    let mut word = String::new();
                    let mut pinyin = String::new();
                    for i in 0..n {
                        let opt = if positions.contains(&i) {
                            &options[i][counter[i] + 1]
                        } else {
                            &options[i][0]
                        };
                        word.push(opt.surface);
                        pinyin.push_str(&opt.syllable);
                    }

                    let slot = seen_pinyin.iter_mut().find(|(p, _)| *p == pinyin);
                    let admit = match slot {
                        Some((_, count)) => {
                            if *count < MAX_PER_PINYIN {
                                *count += 1;
                                true
                            } else {
                                false
                            }
                        }
                        None => {
                            seen_pinyin.push((pinyin.clone(), 1));
                            true
                        }
                    };
                    if admit {
                        combos.push(word);
                    }

                    // Mixed-radix increment over the changed positions.
                    let mut i = 0;
                    loop {
                        if i == n {
                            break;
                        }
                        counter[i] += 1;
                        if counter[i] < radios[i] {
                            break;
                        }
                        counter[i] = 0;
                        i += 1;
                    }
                    if i == n {
                        break;
                    }
                }
            }
        }

        combos
    }

    fn contraction_variants(term: &str) -> Vec<String> {
        let chars: Vec<char> = term.chars().collect();
        let n = chars.len();
        if n < 3 || !chars.iter().all(|c| is_hanzi(*c)) {
            return Vec::new();
        }

        let mut out = Vec::new();
        for skip in 0..n {
            let contracted: String = chars
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, c)| c)
                .collect();
            out.push(contracted);
        }
        if n == 4 {
            out.push(chars[1..3].iter().collect());
        }
        out
    }

    /// Collapses homophones in a term list: keeps at most two surfaces per
    /// compact Pinyin key (the original plus one variant), filters the
    /// rest. Returns `(kept, filtered)`.
    pub fn filter_homophones(&self, terms: &[String]) -> (Vec<String>, Vec<String>) {
        let mut kept = Vec::new();
        let mut filtered = Vec::new();
        let mut seen: Vec<(String, usize)> = Vec::new();

        for term in terms {
            let key = self
                .backend
                .to_phonetic(term)
                .map(|k| k.compact())
                .unwrap_or_else(|_| term.to_lowercase());
            match seen.iter_mut().find(|(k, _)| *k == key) {
                Some((_, count)) if *count >= MAX_PER_PINYIN => filtered.push(term.clone()),
                Some((_, count)) => {
                    *count += 1;
                    kept.push(term.clone());
                }
                None => {
                    seen.push((key, 1));
                    kept.push(term.clone());
                }
            }
        }

        (kept, filtered)
    }
}

fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(k);
    fn recurse(n: usize, k: usize, start: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        for i in start..n {
            if n - i < k - current.len() {
                break;
            }
            current.push(i);
            recurse(n, k, i + 1, current, out);
            current.pop();
        }
    }
    recurse(n, k, 0, &mut current, &mut out);
    out
}

impl FuzzyGenerator for MandarinFuzzyGenerator {
    fn phonetic_transform(&self, term: &str) -> Result<PhoneticKey> {
        self.backend.to_phonetic(term)
    }

    fn phonetic_variants(&self, key: &PhoneticKey) -> Vec<PhoneticKey> {
        // Single-syllable substitutions over the space-separated key.
        let syllables: Vec<String> = key
            .as_str()
            .split(' ')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let mut out = Vec::new();
        for (idx, syllable) in syllables.iter().enumerate() {
            for variant in self.rules.syllable_variants(syllable) {
                if variant == *syllable {
                    continue;
                }
                let mut parts = syllables.clone();
                parts[idx] = variant;
                out.push(PhoneticKey::new(parts.join(" ")));
            }
        }
        out
    }

    fn phonetic_to_text(&self, key: &PhoneticKey) -> Option<String> {
        let mut text = String::new();
        for syllable in key.as_str().split(' ').filter(|s| !s.is_empty()) {
            let pool = Self::pool_chars(syllable);
            text.push_str(pool.first()?);
        }
        Some(text)
    }

    fn hardcoded_variants(&self, term: &str) -> Vec<(String, VariantSource)> {
        let mut out: Vec<(String, VariantSource)> = Vec::new();

        if let Some((_, phrases)) = STICKY_PHRASES.iter().find(|(c, _)| *c == term) {
            out.extend(
                phrases
                    .iter()
                    .map(|p| (p.to_string(), VariantSource::PhraseRule)),
            );
        }

        out.extend(
            Self::contraction_variants(term)
                .into_iter()
                .map(|c| (c, VariantSource::Hardcoded)),
        );

        if let Some(extra) = self.overrides.hardcoded_for(term) {
            out.extend(
                extra
                    .iter()
                    .map(|v| (v.clone(), VariantSource::Hardcoded)),
            );
        }

        out
    }

    fn generate_variants(&self, term: &str, max_variants: usize) -> Vec<Variant> {
        let Ok(base_key) = self.phonetic_transform(term) else {
            return finalize_variants(term, Vec::new(), max_variants);
        };

        let options: Vec<Vec<CharOption>> =
            term.chars().map(|ch| self.char_variations(ch)).collect();

        let mut variants = Vec::new();
        for word in self.char_combinations(&options) {
            if word == term {
                continue;
            }
            let Ok(key) = self.backend.to_phonetic(&word) else {
                continue;
            };
            let score = score_keys(&base_key, &key);
            variants.push(Variant {
                text: word,
                key,
                score,
                source: VariantSource::PhoneticFuzzy,
            });
        }

        for (text, source) in self.hardcoded_variants(term) {
            let Ok(key) = self.backend.to_phonetic(&text) else {
                continue;
            };
            variants.push(Variant {
                text,
                key,
                score: 0.85,
                source,
            });
        }

        finalize_variants(term, variants, max_variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mandarin;

    fn generator() -> MandarinFuzzyGenerator {
        MandarinFuzzyGenerator::new(
            mandarin::global(),
            Arc::new(MandarinRules::new(&PhoneticOverrides::new())),
            PhoneticOverrides::new(),
        )
    }

    #[test]
    fn test_contraction_variants() {
        let contractions = MandarinFuzzyGenerator::contraction_variants("台北車站");
        assert!(contractions.contains(&"北車".to_string()));
        assert!(contractions.contains(&"台北站".to_string()));
        assert!(contractions.contains(&"北車站".to_string()));
        assert!(MandarinFuzzyGenerator::contraction_variants("牛奶").is_empty());
    }

    #[test]
    fn test_variants_exclude_canonical() {
        let variants = generator().generate_variants("牛奶", 30);
        assert!(variants.iter().all(|v| v.text != "牛奶"));
        assert!(!variants.is_empty());
    }

    #[test]
    fn test_variants_contain_n_l_homophone() {
        let variants = generator().generate_variants("牛奶", 50);
        assert!(
            variants.iter().any(|v| v.text == "流奶"),
            "expected 流奶 among {:?}",
            variants.iter().map(|v| &v.text).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_contraction_reachable_through_pipeline() {
        let variants = generator().generate_variants("台北車站", 60);
        assert!(variants.iter().any(|v| v.text == "北車"));
    }

    #[test]
    fn test_sticky_phrase_variants() {
        let variants = generator().generate_variants("然後", 30);
        assert!(variants.iter().any(|v| v.text == "那後"));
    }

    #[test]
    fn test_dedup_by_key() {
        let variants = generator().generate_variants("台北車站", 100);
        let mut keys: Vec<&str> = variants.iter().map(|v| v.key.as_str()).collect();
        let before = keys.len();
        keys.dedup();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(before, keys.len());
    }

    #[test]
    fn test_truncation_is_deterministic() {
        let a = generator().generate_variants("台北車站", 10);
        let b = generator().generate_variants("台北車站", 10);
        let ta: Vec<&String> = a.iter().map(|v| &v.text).collect();
        let tb: Vec<&String> = b.iter().map(|v| &v.text).collect();
        assert_eq!(ta, tb);
        assert!(a.len() <= 10);
    }

    #[test]
    fn test_filter_homophones_keeps_two_per_key() {
        let gen = generator();
        let (kept, filtered) = gen.filter_homophones(&[
            "台北車站".to_string(),
            "臺北車站".to_string(),
            "抬北車站".to_string(),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(filtered, vec!["抬北車站".to_string()]);
    }

    #[test]
    fn test_non_hanzi_term_yields_no_phonetic_combos() {
        let variants = generator().generate_variants("EKG", 30);
        assert!(variants.iter().all(|v| v.source != VariantSource::PhoneticFuzzy));
    }
}
