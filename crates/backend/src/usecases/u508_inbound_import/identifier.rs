use std::collections::HashMap;

pub const IDENTIFIER_LEN: usize = 15;

/// Оставить только цифры
pub fn clean(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Очищенный IMEI, если после очистки ровно 15 цифр
pub fn validate(raw: &str) -> Option<String> {
    let cleaned = clean(raw);
    (cleaned.len() == IDENTIFIER_LEN).then_some(cleaned)
}

/// Значение ячейки - ровно 15 цифр без посторонних символов
pub fn is_strict_identifier(text: &str) -> bool {
    let text = text.trim();
    text.len() == IDENTIFIER_LEN && text.chars().all(|c| c.is_ascii_digit())
}

/// Дедупликация IMEI в пределах одного файла
#[derive(Debug, Default)]
pub struct BatchDeduplicator {
    first_seen: HashMap<String, usize>,
}

impl BatchDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Err(row)` с номером строки первого вхождения, если IMEI уже встречался
    pub fn admit(&mut self, identifier: &str, row: usize) -> Result<(), usize> {
        match self.first_seen.get(identifier) {
            Some(&first_row) => Err(first_row),
            None => {
                self.first_seen.insert(identifier.to_string(), row);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.first_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_fifteen_digits_after_cleaning() {
        assert_eq!(validate("35-630704-244101-3").as_deref(), Some("356307042441013"));
        assert_eq!(validate("IMEI: 356307042441013 ").as_deref(), Some("356307042441013"));
        assert_eq!(validate("35630704244101"), None);
        assert_eq!(validate("3563070424410131"), None);
        assert_eq!(validate(""), None);
    }

    #[test]
    fn test_clean_is_idempotent() {
        for raw in ["35-630704-244101-3", "abc", "356307042441013", " 1 2 3 "] {
            let once = clean(raw);
            assert_eq!(clean(&once), once);
        }
    }

    #[test]
    fn test_strict_identifier_rejects_decorated_values() {
        assert!(is_strict_identifier(" 356307042441013 "));
        assert!(!is_strict_identifier("35-630704-244101-3"));
        assert!(!is_strict_identifier("35630704244101"));
    }

    #[test]
    fn test_deduplicator_reports_first_row() {
        let mut dedup = BatchDeduplicator::new();
        assert_eq!(dedup.admit("356307042441013", 3), Ok(()));
        assert_eq!(dedup.admit("356307042441021", 4), Ok(()));
        assert_eq!(dedup.admit("356307042441013", 9), Err(3));
        assert_eq!(dedup.len(), 2);
    }
}
