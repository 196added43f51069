use serde::{Deserialize, Serialize};

/// Склады, на которые принимается товар
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLocation {
    MainWarehouse,
    ServiceCenter,
    Showroom,
    Transit,
}

impl StockLocation {
    /// Получить код склада
    pub fn code(&self) -> &'static str {
        match self {
            StockLocation::MainWarehouse => "main_warehouse",
            StockLocation::ServiceCenter => "service_center",
            StockLocation::Showroom => "showroom",
            StockLocation::Transit => "transit",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            StockLocation::MainWarehouse => "Main warehouse",
            StockLocation::ServiceCenter => "Service center",
            StockLocation::Showroom => "Showroom",
            StockLocation::Transit => "In transit",
        }
    }

    /// Получить все склады
    pub fn all() -> Vec<StockLocation> {
        vec![
            StockLocation::MainWarehouse,
            StockLocation::ServiceCenter,
            StockLocation::Showroom,
            StockLocation::Transit,
        ]
    }

    /// Парсинг из строки (регистр и пробелы по краям не важны)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "main_warehouse" => Some(StockLocation::MainWarehouse),
            "service_center" => Some(StockLocation::ServiceCenter),
            "showroom" => Some(StockLocation::Showroom),
            "transit" => Some(StockLocation::Transit),
            _ => None,
        }
    }
}

impl std::fmt::Display for StockLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_from_code() {
        for location in StockLocation::all() {
            assert_eq!(StockLocation::from_code(location.code()), Some(location));
        }
        assert_eq!(
            StockLocation::from_code("  Showroom "),
            Some(StockLocation::Showroom)
        );
        assert_eq!(StockLocation::from_code("basement"), None);
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&StockLocation::ServiceCenter).unwrap();
        assert_eq!(json, "\"service_center\"");
    }
}
