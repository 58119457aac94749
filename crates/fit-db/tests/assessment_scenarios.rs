//! End-to-end persistence scenarios against an in-memory database.

use std::sync::Arc;

use fit_core::clock::SystemClock;
use fit_core::entities::{AssessmentData, CompanyInfo, IntegrationDetails, Scorecard, SystemEntry};
use fit_core::enums::{CompanySize, ComplexityTier};
use fit_db::FitDb;
use fit_db::logo_jobs::logo_channel;
use fit_db::service::FitService;
use pretty_assertions::assert_eq;

async fn service() -> FitService {
    let db = FitDb::open_local(":memory:").await.unwrap();
    FitService::from_db(db, Arc::new(SystemClock))
}

fn small_food_company() -> AssessmentData {
    AssessmentData {
        company: CompanyInfo {
            size: CompanySize::Small,
            industry: "food".to_string(),
        },
        goals: vec!["reduce_downtime".to_string()],
        integrations: IntegrationDetails {
            sensors: vec![SystemEntry {
                brand: "Bosch".to_string(),
                category: "temperature_humidity".to_string(),
            }],
            ..IntegrationDetails::default()
        },
        patterns: vec![],
        scorecard: Scorecard {
            compatibility_pct: 100,
            integration_count: 1,
            goals_matched: 1,
            complexity: ComplexityTier::Low,
        },
    }
}

async fn count(db: &FitDb, table: &str) -> i64 {
    let mut rows = db
        .query(&format!("SELECT COUNT(*) FROM {table}"), ())
        .await
        .unwrap();
    rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
}

#[tokio::test]
async fn scenario_a_first_save_creates_company_assessment_and_result() {
    let mut svc = service().await;
    let (dispatcher, mut jobs) = logo_channel();
    svc.attach_logo_dispatcher(dispatcher);

    let saved = svc
        .save_assessment(&small_food_company(), Some("Acme"))
        .await
        .unwrap();

    assert!(!saved.public_id.is_empty());
    assert_ne!(saved.public_id, saved.assessment_id);
    assert_eq!(count(svc.db(), "companies").await, 1);
    assert_eq!(count(svc.db(), "assessments").await, 1);
    assert_eq!(count(svc.db(), "assessment_results").await, 1);

    let company = svc.find_company_by_name("Acme").await.unwrap().unwrap();
    assert_eq!(Some(company.id.clone()), saved.company_id);
    assert_eq!(company.size, CompanySize::Small);
    assert_eq!(company.industry, "food");

    let job = jobs.recv().await.unwrap();
    assert_eq!(job.company_id, company.id);
}

#[tokio::test]
async fn scenario_b_second_save_reuses_company() {
    let svc = service().await;
    let first = svc
        .save_assessment(&small_food_company(), Some("Acme"))
        .await
        .unwrap();
    let second = svc
        .save_assessment(&small_food_company(), Some("Acme"))
        .await
        .unwrap();

    assert_eq!(first.company_id, second.company_id);
    assert_ne!(first.public_id, second.public_id);
    assert_eq!(count(svc.db(), "companies").await, 1);
    assert_eq!(count(svc.db(), "assessments").await, 2);
}

#[tokio::test]
async fn scenario_c_missing_result_row_is_absent() {
    let svc = service().await;
    let saved = svc
        .save_assessment(&small_food_company(), None)
        .await
        .unwrap();
    svc.db()
        .execute(
            "DELETE FROM assessment_results WHERE assessment_id = ?1",
            [saved.assessment_id.as_str()],
        )
        .await
        .unwrap();

    let found = svc
        .get_assessment_by_public_id(&saved.public_id)
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn failed_save_leaves_no_orphan_company() {
    let svc = service().await;
    // Result inserts fail, so the whole save must roll back.
    svc.db()
        .execute("DROP TABLE assessment_results", ())
        .await
        .unwrap();

    let err = svc
        .save_assessment(&small_food_company(), Some("Orphan Co"))
        .await;
    assert!(err.is_err());
    assert!(svc.find_company_by_name("Orphan Co").await.unwrap().is_none());
    assert_eq!(count(svc.db(), "assessments").await, 0);
}

#[tokio::test]
async fn file_backed_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stackfit.db");
    let path = path.to_str().unwrap();

    let public_id = {
        let svc = FitService::new_local(path).await.unwrap();
        svc.save_assessment(&small_food_company(), Some("Acme"))
            .await
            .unwrap()
            .public_id
    };

    let svc = FitService::new_local(path).await.unwrap();
    let shared = svc
        .get_assessment_by_public_id(&public_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(shared.assessment.data.integrations.sensors[0].category, "environmental");
}
