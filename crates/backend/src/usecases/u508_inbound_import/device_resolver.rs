use contracts::domain::a025_device::DeviceCatalogEntry;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::shared::config::ScoringTable;

static LETTERS_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+)([0-9]+)$").expect("valid letters-digits regex"));

/// Верхний регистр, только буквы и цифры
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Правила сопоставления в порядке приоритета
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Текст совпадает с ключом
    Exact,
    /// Текст начинается с ключа; длинный ключ лучше короткого
    Prefix,
    /// `<буквы><цифры>` с цифрами, дополненными нулями до 3/4 или усечёнными до 3
    NumericSuffix,
    /// Ключ начинается с текста
    ReversePrefix,
}

impl MatchRule {
    pub const PRIORITY: [MatchRule; 4] = [
        MatchRule::Exact,
        MatchRule::Prefix,
        MatchRule::NumericSuffix,
        MatchRule::ReversePrefix,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MatchRule::Exact => "exact",
            MatchRule::Prefix => "prefix",
            MatchRule::NumericSuffix => "numeric_suffix",
            MatchRule::ReversePrefix => "reverse_prefix",
        }
    }

    fn score(&self, raw: &RawDevice, key: &str, table: &ScoringTable) -> Option<i64> {
        match self {
            MatchRule::Exact => (raw.text == key).then_some(table.exact),
            MatchRule::Prefix => raw.text.starts_with(key).then(|| {
                let scaled = table.prefix_base + key.chars().count() as i64;
                scaled.min(table.exact - 1)
            }),
            MatchRule::NumericSuffix => raw
                .suffix_variants
                .iter()
                .any(|variant| variant == key)
                .then_some(table.numeric_suffix),
            MatchRule::ReversePrefix => key.starts_with(&raw.text).then_some(table.reverse_prefix),
        }
    }
}

/// Нормализованный текст устройства и его варианты с числовым суффиксом
struct RawDevice {
    text: String,
    suffix_variants: Vec<String>,
}

impl RawDevice {
    fn new(raw: &str) -> Self {
        let text = normalize(raw);
        let mut suffix_variants = Vec::new();
        if let Some(caps) = LETTERS_DIGITS.captures(&text) {
            let (letters, digits) = (&caps[1], &caps[2]);
            let truncated: String = digits.chars().take(3).collect();
            for variant in [
                format!("{}{:0>3}", letters, digits),
                format!("{}{:0>4}", letters, digits),
                format!("{}{}", letters, truncated),
            ] {
                if !suffix_variants.contains(&variant) {
                    suffix_variants.push(variant);
                }
            }
        }
        Self {
            text,
            suffix_variants,
        }
    }
}

/// Результат сопоставления
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub entry: &'a DeviceCatalogEntry,
    pub rule: MatchRule,
    pub score: i64,
}

/// Сопоставление произвольного текста с активными записями справочника
pub struct DeviceResolver<'a> {
    entries: Vec<(String, &'a DeviceCatalogEntry)>,
    scoring: &'a ScoringTable,
}

impl<'a> DeviceResolver<'a> {
    /// Порядок `catalog` сохраняется и решает ничьи
    pub fn new(catalog: &'a [DeviceCatalogEntry], scoring: &'a ScoringTable) -> Self {
        let entries = catalog
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| (normalize(&entry.canonical_key), entry))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self { entries, scoring }
    }

    pub fn resolve(&self, raw: &str) -> Option<Resolution<'a>> {
        let raw = RawDevice::new(raw);
        if raw.text.is_empty() {
            return None;
        }

        let mut best: Option<Resolution<'a>> = None;
        for &(ref key, entry) in &self.entries {
            let Some((rule, score)) = MatchRule::PRIORITY
                .iter()
                .find_map(|rule| rule.score(&raw, key, self.scoring).map(|s| (*rule, s)))
            else {
                continue;
            };
            if score <= 0 {
                continue;
            }
            if best.map_or(true, |b| score > b.score) {
                best = Some(Resolution {
                    entry,
                    rule,
                    score,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(keys: &[&str]) -> Vec<DeviceCatalogEntry> {
        keys.iter()
            .map(|k| DeviceCatalogEntry::new(*k, format!("{} display", k)))
            .collect()
    }

    #[test]
    fn test_normalize_strips_symbols_and_uppercases() {
        assert_eq!(normalize(" fmb-140 (bt) "), "FMB140BT");
        assert_eq!(normalize("--"), "");
    }

    #[test]
    fn test_exact_outranks_prefix() {
        let entries = catalog(&["FMB1", "FMB140", "FMB140BT"]);
        let scoring = ScoringTable::default();
        let resolver = DeviceResolver::new(&entries, &scoring);

        let hit = resolver.resolve("FMB-140").unwrap();
        assert_eq!(hit.entry.canonical_key, "FMB140");
        assert_eq!(hit.rule, MatchRule::Exact);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let entries = catalog(&["FMB1", "FMB140", "FMC"]);
        let scoring = ScoringTable::default();
        let resolver = DeviceResolver::new(&entries, &scoring);

        let hit = resolver.resolve("FMB140BTZ9FD").unwrap();
        assert_eq!(hit.entry.canonical_key, "FMB140");
        assert_eq!(hit.rule, MatchRule::Prefix);
        assert_eq!(hit.score, scoring.prefix_base + 6);
    }

    #[test]
    fn test_numeric_suffix_variants() {
        let entries = catalog(&["TAT0140", "GH5"]);
        let scoring = ScoringTable::default();
        let resolver = DeviceResolver::new(&entries, &scoring);

        let padded = resolver.resolve("tat140").unwrap();
        assert_eq!(padded.entry.canonical_key, "TAT0140");
        assert_eq!(padded.rule, MatchRule::NumericSuffix);

        let entries = catalog(&["FMB920"]);
        let resolver = DeviceResolver::new(&entries, &scoring);
        let truncated = resolver.resolve("FMB9200").unwrap();
        // raw starts with the key, so prefix scores before the numeric suffix rule
        assert_eq!(truncated.rule, MatchRule::Prefix);

        let entries = catalog(&["FMB092"]);
        let resolver = DeviceResolver::new(&entries, &scoring);
        let hit = resolver.resolve("FMB92").unwrap();
        assert_eq!(hit.rule, MatchRule::NumericSuffix);
    }

    #[test]
    fn test_reverse_prefix_is_lowest_rule() {
        let entries = catalog(&["FMC130", "FMC13"]);
        let scoring = ScoringTable::default();
        let resolver = DeviceResolver::new(&entries, &scoring);

        let hit = resolver.resolve("FMC").unwrap();
        assert_eq!(hit.rule, MatchRule::ReversePrefix);
        // tie: first entry in catalog order wins
        assert_eq!(hit.entry.canonical_key, "FMC130");
    }

    #[test]
    fn test_unknown_and_inactive_devices_are_not_resolved() {
        let mut entries = catalog(&["FMB140", "GH5200"]);
        entries[1].active = false;
        let scoring = ScoringTable::default();
        let resolver = DeviceResolver::new(&entries, &scoring);

        assert!(resolver.resolve("GH5200").is_none());
        assert!(resolver.resolve("Teltonika").is_none());
        assert!(resolver.resolve("  ").is_none());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let entries = catalog(&["FMB140", "FMB1", "FMC130"]);
        let scoring = ScoringTable::default();
        let resolver = DeviceResolver::new(&entries, &scoring);

        for raw in ["FMB140 BT", "fmb1", "FMC", "nothing"] {
            let first = resolver.resolve(raw).map(|r| (r.entry.id, r.rule, r.score));
            let second = resolver.resolve(raw).map(|r| (r.entry.id, r.rule, r.score));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_scoring_table_is_configuration() {
        let entries = catalog(&["FMB140"]);
        let scoring = ScoringTable {
            exact: 10,
            prefix_base: 8,
            numeric_suffix: 5,
            reverse_prefix: 1,
        };
        let resolver = DeviceResolver::new(&entries, &scoring);
        // capped below exact
        assert_eq!(resolver.resolve("FMB140XYZ").unwrap().score, 9);
        assert_eq!(resolver.resolve("FMB").unwrap().score, 1);
    }

    #[test]
    fn test_rule_names_follow_priority() {
        let names: Vec<_> = MatchRule::PRIORITY.iter().map(MatchRule::name).collect();
        assert_eq!(names, vec!["exact", "prefix", "numeric_suffix", "reverse_prefix"]);
    }
}
