use squash::{NewReport, Report, ReportKind, User};

use super::{LeagueService, ServiceError};
use crate::persistence::Store;

impl<S: Store> LeagueService<S> {
    pub async fn file_report(
        &self,
        actor: &User,
        kind: ReportKind,
        title: &str,
        description: &str,
    ) -> Result<Report, ServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ServiceError::Validation("report title is required".into()));
        }
        let report = self
            .store
            .create_report(NewReport {
                id: None,
                user_id: actor.id.clone(),
                kind,
                title: title.to_string(),
                description: description.trim().to_string(),
                status: None,
                created_at: None,
            })
            .await?;
        tracing::info!(report_id = %report.id, %kind, user_id = %actor.id, "Report filed");
        Ok(report)
    }

    /// Newest first. Super-admins only.
    pub async fn list_reports(&self, actor: &User) -> Result<Vec<Report>, ServiceError> {
        if !actor.is_super_admin() {
            return Err(ServiceError::Forbidden(
                "only super-admins can read reports".into(),
            ));
        }
        Ok(self.store.list_reports().await?)
    }
}
