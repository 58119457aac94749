//! Assessment repository: transactional save, public lookup and listing.

use fit_core::entities::{
    Assessment, AssessmentData, AssessmentResult, SavedAssessment, SharedAssessment,
};
use fit_core::ids::{PREFIX_ASSESSMENT, PREFIX_COMPANY, PREFIX_RESULT};
use fit_core::jobs::LogoJob;
use fit_core::migration;

use crate::FitDb;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_json, parse_optional_json, to_json};
use crate::repos::company;
use crate::service::FitService;

const SELECT_COLS: &str = "a.id, a.public_id, a.company_id, a.data, a.created_at, a.updated_at";

fn row_to_assessment(row: &libsql::Row) -> Result<Assessment, DatabaseError> {
    Ok(Assessment {
        id: row.get::<String>(0)?,
        public_id: row.get::<String>(1)?,
        company_id: get_opt_string(row, 2)?,
        data: parse_json(&row.get::<String>(3)?)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

/// Result columns follow the six assessment columns in the share query.
fn row_to_result(
    row: &libsql::Row,
    assessment_id: &str,
) -> Result<AssessmentResult, DatabaseError> {
    Ok(AssessmentResult {
        id: row.get::<String>(6)?,
        assessment_id: assessment_id.to_string(),
        scorecard: parse_json(&row.get::<String>(7)?)?,
        visualization: parse_optional_json(get_opt_string(row, 8)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

impl FitService {
    /// Persist a completed wizard run.
    ///
    /// Legacy sensor categories are migrated first. The company lookup or
    /// creation, the assessment row and its result row are written in one
    /// transaction; on any failure nothing is stored. A logo job is dispatched
    /// after commit only when a new company was created.
    pub async fn save_assessment(
        &self,
        data: &AssessmentData,
        company_name: Option<&str>,
    ) -> Result<SavedAssessment, DatabaseError> {
        let data = migration::migrate_if_needed(data);
        let now = self.now();
        let ts = now.to_rfc3339();

        let assessment_id = self.db().generate_id(PREFIX_ASSESSMENT).await?;
        let result_id = self.db().generate_id(PREFIX_RESULT).await?;
        let public_id = FitDb::generate_public_id()?;
        let payload = to_json(&data)?;
        let scorecard = to_json(&data.scorecard)?;

        let tx = self.db().conn().transaction().await?;

        let mut created_company = None;
        let company_id = match company_name.filter(|n| !n.is_empty()) {
            Some(name) => match company::find_by_name(&tx, name).await? {
                Some(existing) => Some(existing.id),
                None => {
                    let id = self.db().generate_id(PREFIX_COMPANY).await?;
                    let created = company::insert(
                        &tx,
                        &id,
                        name,
                        &data.company.industry,
                        data.company.size,
                        now,
                    )
                    .await?;
                    created_company = Some(created);
                    Some(id)
                }
            },
            None => None,
        };

        tx.execute(
            "INSERT INTO assessments (id, public_id, company_id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            libsql::params![
                assessment_id.as_str(),
                public_id.as_str(),
                company_id.as_deref(),
                payload,
                ts.as_str(),
                ts.as_str()
            ],
        )
        .await?;

        tx.execute(
            "INSERT INTO assessment_results (id, assessment_id, scorecard, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            libsql::params![result_id.as_str(), assessment_id.as_str(), scorecard, ts.as_str()],
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            assessment_id = %assessment_id,
            company_id = company_id.as_deref().unwrap_or("-"),
            "saved assessment"
        );

        if let Some(created) = created_company {
            self.dispatch_logo(LogoJob {
                company_id: created.id,
                company_name: created.name,
            });
        }

        Ok(SavedAssessment {
            assessment_id,
            public_id,
            company_id,
        })
    }

    /// Look up a shared assessment and its result by public identifier.
    ///
    /// Absent when either the assessment or its result row is missing.
    pub async fn get_assessment_by_public_id(
        &self,
        public_id: &str,
    ) -> Result<Option<SharedAssessment>, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLS}, r.id, r.scorecard, r.visualization, r.created_at
             FROM assessments a
             JOIN assessment_results r ON r.assessment_id = a.id
             WHERE a.public_id = ?1"
        );
        let mut rows = self.db().query_with(&sql, || [public_id]).await?;
        let Some(row) = rows.next().await? else {
            tracing::debug!(public_id, "no shared assessment");
            return Ok(None);
        };
        let assessment = row_to_assessment(&row)?;
        let result = row_to_result(&row, &assessment.id)?;
        Ok(Some(SharedAssessment { assessment, result }))
    }

    pub async fn list_assessments(&self, limit: u32) -> Result<Vec<Assessment>, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLS} FROM assessments a
             ORDER BY a.created_at DESC, a.rowid DESC LIMIT {limit}"
        );
        let mut rows = self.db().query_with(&sql, || ()).await?;

        let mut assessments = Vec::new();
        while let Some(row) = rows.next().await? {
            assessments.push(row_to_assessment(&row)?);
        }
        Ok(assessments)
    }

    /// Attach a rendered visualization to an assessment's result row.
    pub async fn set_result_visualization(
        &self,
        assessment_id: &str,
        visualization: &serde_json::Value,
    ) -> Result<(), DatabaseError> {
        let json = to_json(visualization)?;
        let updated = self
            .db()
            .execute_with(
                "UPDATE assessment_results SET visualization = ?2 WHERE assessment_id = ?1",
                || libsql::params![assessment_id, json.as_str()],
            )
            .await?;
        if updated == 0 {
            return Err(DatabaseError::not_found("assessment result", assessment_id));
        }
        Ok(())
    }
}
