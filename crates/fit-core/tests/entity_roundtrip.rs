//! Serde roundtrip and JsonSchema validation tests for entity types.

use std::collections::BTreeMap;

use chrono::Utc;
use fit_core::entities::*;
use fit_core::enums::*;
use schemars::schema_for;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn sample_data() -> AssessmentData {
    AssessmentData {
        company: CompanyInfo {
            size: CompanySize::Large,
            industry: "automotive".into(),
        },
        goals: vec!["quality_control".into()],
        integrations: IntegrationDetails {
            erp: vec![SystemEntry {
                brand: "SAP S/4HANA".into(),
                category: "cloud_erp".into(),
            }],
            automation: vec![SystemEntry {
                brand: "Siemens S7".into(),
                category: "plc".into(),
            }],
            ..IntegrationDetails::default()
        },
        patterns: vec![IntegrationPattern {
            from: "automation".into(),
            to: "erp".into(),
            protocol: "opc_ua".into(),
            realtime: false,
        }],
        scorecard: Scorecard {
            compatibility_pct: 100,
            integration_count: 2,
            goals_matched: 1,
            complexity: ComplexityTier::Low,
        },
    }
}

roundtrip_and_validate!(assessment_data_roundtrip, AssessmentData, sample_data());

roundtrip_and_validate!(
    assessment_roundtrip,
    Assessment,
    Assessment {
        id: "asm-a3f8b2c1".into(),
        public_id: "0123456789abcdef0123456789abcdef".into(),
        company_id: Some("cmp-00ff00ff".into()),
        data: sample_data(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    assessment_result_roundtrip,
    AssessmentResult,
    AssessmentResult {
        id: "rsl-a3f8b2c1".into(),
        assessment_id: "asm-a3f8b2c1".into(),
        scorecard: sample_data().scorecard,
        visualization: Some(serde_json::json!({"radar": [1, 2, 3]})),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    company_roundtrip,
    Company,
    Company {
        id: "cmp-00ff00ff".into(),
        name: "Acme".into(),
        logo_url: Some("https://logos.example.com/acme.png".into()),
        logo_fetched_at: Some(Utc::now()),
        industry: "food".into(),
        size: CompanySize::Small,
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    config_version_roundtrip,
    ConfigVersion,
    ConfigVersion {
        id: "cfv-1234abcd".into(),
        created_at: Utc::now(),
        description: Some("Add MES section".into()),
        config: ConfigSnapshot {
            schema_version: CONFIG_SCHEMA_VERSION,
            status: PublishStatus::Published,
            sections: vec![ConfigSection {
                id: "mes".into(),
                title: "MES".into(),
                options: vec![ConfigOption {
                    id: "mes_cloud".into(),
                    label: "Cloud MES".into(),
                    brands: vec!["Tulip".into()],
                }],
            }],
            synonyms: BTreeMap::from([("tulip interfaces".into(), "Tulip".into())]),
        },
    }
);

roundtrip_and_validate!(
    feature_flag_roundtrip,
    FeatureFlag,
    FeatureFlag {
        name: "pdf_export".into(),
        enabled: true,
        description: None,
        updated_at: Utc::now(),
        updated_by: Some("admin@example.com".into()),
    }
);

#[test]
fn partial_wizard_output_fills_defaults() {
    let json = serde_json::json!({
        "company": {"size": "small", "industry": "food"},
        "scorecard": {
            "compatibility_pct": 0,
            "integration_count": 0,
            "goals_matched": 0,
            "complexity": "low"
        }
    });
    let data: AssessmentData = serde_json::from_value(json).unwrap();
    assert!(data.goals.is_empty());
    assert!(data.integrations.is_empty());
    assert!(data.patterns.is_empty());
}
