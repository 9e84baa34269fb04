use super::*;
use sl_core::CoreError;

fn ctx(vars: &[(&str, &str)]) -> DeployContext {
    DeployContext::from_lookup(|key| {
        vars.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
}

#[test]
fn test_manual_run_needs_only_a_url() {
    let decision = decide(false, &ctx(&[("DATABASE_URL", "postgres://u:p@localhost/app")])).unwrap();
    assert_eq!(
        decision,
        GateDecision::Run {
            database_url: "postgres://u:p@localhost/app".to_string()
        }
    );
}

#[test]
fn test_manual_run_without_url_is_an_error() {
    let err = decide(false, &ctx(&[])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::MissingDatabaseUrl)
    ));
}

#[test]
fn test_deploy_skips_outside_production() {
    let decision = decide(
        true,
        &ctx(&[("DATABASE_URL", "postgres://u:p@localhost/app")]),
    )
    .unwrap();
    assert!(matches!(decision, GateDecision::Skip { .. }));
}

#[test]
fn test_deploy_skips_without_url() {
    let decision = decide(true, &ctx(&[("NODE_ENV", "production")])).unwrap();
    assert_eq!(
        decision,
        GateDecision::Skip {
            reason: "DATABASE_URL is not set".to_string()
        }
    );
}

#[test]
fn test_deploy_on_hosted_platform_moves_pooler_to_transaction_port() {
    let decision = decide(
        true,
        &ctx(&[
            ("VERCEL", "1"),
            (
                "DATABASE_URL",
                "postgresql://postgres.ref:pw@aws-0-eu-west-1.pooler.supabase.com:5432/postgres",
            ),
        ]),
    )
    .unwrap();
    assert_eq!(
        decision,
        GateDecision::Run {
            database_url:
                "postgresql://postgres.ref:pw@aws-0-eu-west-1.pooler.supabase.com:6543/postgres"
                    .to_string()
        }
    );
}

#[test]
fn test_deploy_on_hosted_platform_rejects_direct_host() {
    let err = decide(
        true,
        &ctx(&[
            ("VERCEL", "1"),
            ("DATABASE_URL", "postgresql://postgres:pw@db.abcd.supabase.co:5432/postgres"),
        ]),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::ConfigInvalid { .. })
    ));
}
