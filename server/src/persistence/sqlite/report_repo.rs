//! SQLite-backed report log.

use squash::ordering::sort_reports;
use squash::{NewReport, Report};

use super::SqliteStore;
use crate::persistence::codec::{decode_rows, insert_error, ReportRow};
use crate::persistence::traits::ReportRepository;
use crate::persistence::PersistenceError;

impl ReportRepository for SqliteStore {
    async fn create_report(&self, report: NewReport) -> Result<Report, PersistenceError> {
        let report = report.into_report();

        sqlx::query(
            r#"
            INSERT INTO reports (id, user_id, kind, title, description, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&report.id)
        .bind(&report.user_id)
        .bind(report.kind.as_str())
        .bind(&report.title)
        .bind(&report.description)
        .bind(report.status.as_str())
        .bind(report.created_at)
        .execute(self.pool())
        .await
        .map_err(|e| insert_error(e, "report", &report.id))?;

        Ok(report)
    }

    async fn list_reports(&self) -> Result<Vec<Report>, PersistenceError> {
        let rows: Vec<ReportRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, kind, title, description, status, created_at
            FROM reports
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        let mut reports = decode_rows(rows, ReportRow::into_report)?;
        sort_reports(&mut reports);
        Ok(reports)
    }
}
