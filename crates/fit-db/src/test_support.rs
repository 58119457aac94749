//! Shared test utilities for fit-db unit tests.

pub(crate) mod helpers {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use fit_core::clock::ManualClock;
    use fit_core::entities::{
        AssessmentData, CompanyInfo, IntegrationDetails, IntegrationPattern, Scorecard,
        SystemEntry,
    };
    use fit_core::enums::{CompanySize, ComplexityTier};

    use crate::FitDb;
    use crate::service::FitService;

    /// Create an in-memory `FitService` on a frozen clock.
    pub async fn test_service() -> FitService {
        test_service_with_clock(Arc::new(test_clock())).await
    }

    pub async fn test_service_with_clock(clock: Arc<ManualClock>) -> FitService {
        let db = FitDb::open_local(":memory:").await.unwrap();
        FitService::from_db(db, clock)
    }

    pub fn test_clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap())
    }

    fn entry(brand: &str, category: &str) -> SystemEntry {
        SystemEntry {
            brand: brand.to_string(),
            category: category.to_string(),
        }
    }

    /// A filled-in wizard result with one legacy sensor category.
    pub fn sample_assessment() -> AssessmentData {
        AssessmentData {
            company: CompanyInfo {
                size: CompanySize::Medium,
                industry: "food_processing".to_string(),
            },
            goals: vec!["reduce_downtime".to_string(), "energy_savings".to_string()],
            integrations: IntegrationDetails {
                erp: vec![entry("SAP", "erp")],
                sensors: vec![
                    entry("Bosch", "vibration"),
                    entry("Siemens", "condition_monitoring"),
                ],
                automation: vec![entry("Rockwell", "plc")],
                other_systems: vec![],
                data_analytics: vec![entry("Grafana", "dashboards")],
            },
            patterns: vec![IntegrationPattern {
                from: "sensors".to_string(),
                to: "erp".to_string(),
                protocol: "mqtt".to_string(),
                realtime: true,
            }],
            scorecard: Scorecard {
                compatibility_pct: 80,
                integration_count: 5,
                goals_matched: 2,
                complexity: ComplexityTier::Medium,
            },
        }
    }
}
