use axum::http::StatusCode;
use contracts::usecases::u508_inbound_import::{ImportFailureReason, InboundImportFailure, RowIssue};
use sea_orm::DbErr;
use thiserror::Error;

const STORE_MESSAGE_MAX_CHARS: usize = 300;

/// Фатальные ошибки приёмки; проблемы отдельных строк сюда не попадают
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unreadable file: {0}")]
    Unreadable(String),

    #[error("The first sheet has no data")]
    EmptySheet,

    #[error(
        "Header row not found in the first {scanned} rows: expected a row containing both an identifier column ({identifier_synonyms}) and a box column ({box_synonyms})"
    )]
    HeaderNotFound {
        scanned: usize,
        identifier_synonyms: String,
        box_synonyms: String,
    },

    #[error("No column groups detected in header row {header_row}")]
    NoColumnGroups { header_row: usize },

    #[error("No valid rows to import ({} row issue(s))", .issues.len())]
    NoValidRows { issues: Vec<RowIssue> },

    #[error("{total} identifier(s) already exist in the store")]
    Conflict { preview: Vec<String>, total: usize },

    #[error("Unknown location '{0}'")]
    InvalidLocation(String),

    #[error("Missing multipart field '{0}'")]
    MissingField(String),

    #[error("Store failure: {0}")]
    Store(String),
}

impl From<DbErr> for ImportError {
    fn from(e: DbErr) -> Self {
        ImportError::Store(sanitize_store_message(&e.to_string()))
    }
}

/// Первая строка сообщения, обрезанная до разумной длины
fn sanitize_store_message(raw: &str) -> String {
    let first_line = raw.lines().next().unwrap_or("").trim();
    if first_line.chars().count() <= STORE_MESSAGE_MAX_CHARS {
        return first_line.to_string();
    }
    let mut cut: String = first_line.chars().take(STORE_MESSAGE_MAX_CHARS).collect();
    cut.push_str("...");
    cut
}

impl ImportError {
    pub fn reason(&self) -> ImportFailureReason {
        match self {
            ImportError::Unreadable(_) => ImportFailureReason::UnreadableFile,
            ImportError::EmptySheet => ImportFailureReason::EmptySheet,
            ImportError::HeaderNotFound { .. } => ImportFailureReason::HeaderNotFound,
            ImportError::NoColumnGroups { .. } => ImportFailureReason::NoColumnGroups,
            ImportError::NoValidRows { .. } => ImportFailureReason::NoValidRows,
            ImportError::Conflict { .. } => ImportFailureReason::IdentifierConflict,
            ImportError::InvalidLocation(_) => ImportFailureReason::InvalidLocation,
            ImportError::MissingField(_) => ImportFailureReason::MissingField,
            ImportError::Store(_) => ImportFailureReason::StoreFailure,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ImportError::Unreadable(_)
            | ImportError::InvalidLocation(_)
            | ImportError::MissingField(_) => StatusCode::BAD_REQUEST,
            ImportError::Conflict { .. } => StatusCode::CONFLICT,
            ImportError::EmptySheet
            | ImportError::HeaderNotFound { .. }
            | ImportError::NoColumnGroups { .. }
            | ImportError::NoValidRows { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ImportError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Тело ответа об отказе; списки ограничены `issue_limit`
    pub fn to_failure(&self, issue_limit: usize) -> InboundImportFailure {
        let (offending, issues) = match self {
            ImportError::Conflict { preview, .. } => (preview.clone(), Vec::new()),
            ImportError::NoValidRows { issues } => {
                let offending = issues
                    .iter()
                    .take(issue_limit)
                    .map(|issue| issue.value.clone())
                    .collect();
                (offending, issues.iter().take(issue_limit).cloned().collect())
            }
            _ => (Vec::new(), Vec::new()),
        };
        InboundImportFailure {
            status: "error".to_string(),
            reason: self.reason(),
            message: self.to_string(),
            offending,
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::usecases::u508_inbound_import::RowIssueKind;

    #[test]
    fn test_store_errors_are_single_line_and_capped() {
        let long = format!("UNIQUE constraint failed\n{}", "x".repeat(1000));
        let err: ImportError = DbErr::Custom(long).into();
        let ImportError::Store(message) = &err else {
            panic!("expected store error");
        };
        assert!(!message.contains('\n'));
        assert!(message.chars().count() <= STORE_MESSAGE_MAX_CHARS + 3);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let very_long: ImportError = DbErr::Custom("y".repeat(1000)).into();
        let ImportError::Store(message) = very_long else {
            panic!("expected store error");
        };
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_conflict_failure_lists_offending_identifiers() {
        let err = ImportError::Conflict {
            preview: vec!["356307042441039".to_string()],
            total: 1,
        };
        let failure = err.to_failure(200);
        assert_eq!(failure.reason, ImportFailureReason::IdentifierConflict);
        assert_eq!(failure.offending, vec!["356307042441039"]);
        assert_eq!(failure.status, "error");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_no_valid_rows_failure_is_bounded() {
        let issues: Vec<RowIssue> = (1..=10)
            .map(|row| RowIssue::new(row, RowIssueKind::InvalidIdentifier, "12345"))
            .collect();
        let failure = ImportError::NoValidRows { issues }.to_failure(3);
        assert_eq!(failure.issues.len(), 3);
        assert_eq!(failure.offending.len(), 3);
        assert_eq!(failure.reason, ImportFailureReason::NoValidRows);
    }
}
