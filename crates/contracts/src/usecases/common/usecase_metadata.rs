/// Метаданные UseCase для идентификации в логах и журнале
pub trait UseCaseMetadata {
    /// Индекс UseCase (например, "u508")
    fn usecase_index() -> &'static str;

    /// Техническое имя (например, "inbound_import")
    fn usecase_name() -> &'static str;

    /// Отображаемое имя для UI
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// Полное имя вида "u508_inbound_import"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
