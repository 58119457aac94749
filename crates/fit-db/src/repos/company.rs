//! Company repository: exact-name lookup, creation and logo write-back.

use chrono::{DateTime, Utc};

use fit_core::entities::Company;
use fit_core::enums::CompanySize;
use fit_core::ids::PREFIX_COMPANY;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_datetime};
use crate::service::FitService;

pub(crate) const SELECT_COLS: &str =
    "id, name, logo_url, logo_fetched_at, industry, size, created_at";

pub(crate) fn row_to_company(row: &libsql::Row) -> Result<Company, DatabaseError> {
    Ok(Company {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        logo_url: get_opt_string(row, 2)?,
        logo_fetched_at: parse_optional_datetime(get_opt_string(row, 3)?.as_deref())?,
        industry: row.get::<String>(4)?,
        size: parse_enum(&row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

/// Exact, case-sensitive name lookup on any connection (including a transaction).
pub(crate) async fn find_by_name(
    conn: &libsql::Connection,
    name: &str,
) -> Result<Option<Company>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM companies WHERE name = ?1"),
            [name],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_company(&row)?)),
        None => Ok(None),
    }
}

pub(crate) async fn insert(
    conn: &libsql::Connection,
    id: &str,
    name: &str,
    industry: &str,
    size: CompanySize,
    now: DateTime<Utc>,
) -> Result<Company, DatabaseError> {
    conn.execute(
        "INSERT INTO companies (id, name, industry, size, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        libsql::params![id, name, industry, size.as_str(), now.to_rfc3339()],
    )
    .await?;
    Ok(Company {
        id: id.to_string(),
        name: name.to_string(),
        logo_url: None,
        logo_fetched_at: None,
        industry: industry.to_string(),
        size,
        created_at: now,
    })
}

impl FitService {
    pub async fn find_company_by_name(&self, name: &str) -> Result<Option<Company>, DatabaseError> {
        find_by_name(self.db().conn(), name).await
    }

    pub async fn get_company(&self, id: &str) -> Result<Option<Company>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                &format!("SELECT {SELECT_COLS} FROM companies WHERE id = ?1"),
                || [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_company(&row)?)),
            None => Ok(None),
        }
    }

    /// Create a company outside of an assessment save.
    ///
    /// Fails with a constraint error if the name is already taken; callers
    /// wanting get-or-create go through [`Self::save_assessment`].
    pub async fn create_company(
        &self,
        name: &str,
        industry: &str,
        size: CompanySize,
    ) -> Result<Company, DatabaseError> {
        let id = self.db().generate_id(PREFIX_COMPANY).await?;
        let company = insert(self.db().conn(), &id, name, industry, size, self.now()).await?;
        tracing::info!(company_id = %company.id, name, "created company");
        Ok(company)
    }

    pub async fn list_companies(&self, limit: u32) -> Result<Vec<Company>, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLS} FROM companies ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );
        let mut rows = self.db().query_with(&sql, || ()).await?;

        let mut companies = Vec::new();
        while let Some(row) = rows.next().await? {
            companies.push(row_to_company(&row)?);
        }
        Ok(companies)
    }

    /// Record the outcome of a logo lookup. `None` means the service had no logo.
    ///
    /// The fetch timestamp is stamped either way so the lookup is not repeated.
    pub async fn set_company_logo(
        &self,
        id: &str,
        logo_url: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let now = self.now().to_rfc3339();
        let updated = self
            .db()
            .execute_with(
                "UPDATE companies SET logo_url = ?2, logo_fetched_at = ?3 WHERE id = ?1",
                || libsql::params![id, logo_url, now.as_str()],
            )
            .await?;
        if updated == 0 {
            return Err(DatabaseError::not_found("company", id));
        }
        tracing::debug!(company_id = id, has_logo = logo_url.is_some(), "stored company logo");
        Ok(())
    }
}
