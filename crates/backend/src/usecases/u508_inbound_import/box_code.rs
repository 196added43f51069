use once_cell::sync::Lazy;
use regex::Regex;

/// `<2-4 цифры><разделитель><2-4 цифры>` в конце строки, не внутри более длинного числа
static TRAILING_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)(\d{2,4})\s*[-_/. ]\s*(\d{2,4})$").expect("valid trailing pair regex")
});

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit run regex"));

static BARE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2,6}$").expect("valid bare number regex"));

static HYPHEN_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2,4}-\d{2,4}$").expect("valid hyphen pair regex"));

static BOX_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^box\s*(?:no\.?|#)?\s*(\d+)$").expect("valid box word regex"));

static BOX_WORD_ANYWHERE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bbox\s*(?:no\.?|#)?\s*\d+").expect("valid box word regex"));

/// Номер коробки из составного текста мастер-коробки
///
/// `"FMB140BTZ9FD-076-004"` -> `"076-004"`. Если в конце строки нет пары чисел,
/// берутся две последние группы из 2-4 цифр. `None`, если таких групп меньше двух.
pub fn extract_box_code(master: &str) -> Option<String> {
    let master = master.trim();
    if let Some(caps) = TRAILING_PAIR.captures(master) {
        return Some(format!("{}-{}", &caps[1], &caps[2]));
    }

    let runs: Vec<&str> = DIGIT_RUN
        .find_iter(master)
        .map(|m| m.as_str())
        .filter(|run| (2..=4).contains(&run.len()))
        .collect();
    match runs.as_slice() {
        [.., first, second] => Some(format!("{}-{}", first, second)),
        _ => None,
    }
}

/// Похоже ли значение на номер коробки (для выбора колонки в плоской таблице)
///
/// Засчитываются и составные коды мастер-коробки, из которых извлекается номер.
pub fn looks_like_box_code(text: &str) -> bool {
    let text = text.trim();
    BARE_NUMBER.is_match(text)
        || HYPHEN_PAIR.is_match(text)
        || BOX_WORD_ANYWHERE.is_match(text)
        || extract_box_code(text).is_some()
}

/// Номер коробки из ячейки плоской таблицы: сначала по форме, затем общим извлечением
pub fn normalize_flat_box(text: &str) -> Option<String> {
    let text = text.trim();
    if BARE_NUMBER.is_match(text) || HYPHEN_PAIR.is_match(text) {
        return Some(text.to_string());
    }
    if let Some(caps) = BOX_WORD.captures(text) {
        return Some(caps[1].to_string());
    }
    extract_box_code(text)
}
