//! Tests for talking to the node over HTTPS.
//!
//! The stub serves a self-signed certificate, as a freshly started node does.

use crate::support::{mnemonic_reply, test_config, tls_cert_path, AdminStub, PASSWORD};
use tempfile::tempdir;
use walletinit::{init_wallet, InitConfig, InitOutcome, InitPath, Reporter};
use walletinit_core::Password;

async fn run(config: &InitConfig) -> (InitOutcome, String) {
    let password = Password::new(PASSWORD.to_string());
    let mut reporter = Reporter::new(Vec::new());
    let outcome = init_wallet::run(config, &password, &mut reporter)
        .await
        .unwrap();
    let output = String::from_utf8(reporter.into_inner()).unwrap();
    (outcome, output)
}

/// Tests that an untrusted certificate is rejected by default.
#[tokio::test]
async fn test_self_signed_certificate_rejected_by_default() {
    let dir = tempdir().unwrap();
    let stub = AdminStub::spawn_tls(200, &mnemonic_reply(24));
    let config = test_config(dir.path(), &stub.endpoint, "walletinit-missing-lncli");
    assert!(config.endpoint.starts_with("https://127.0.0.1:"));

    let (outcome, output) = run(&config).await;

    match outcome {
        InitOutcome::ManualOnly { reason } => {
            assert!(reason.starts_with("Transport error: "), "reason: {}", reason)
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(stub.hits(), 0);
    assert!(!output.contains("Trying alternative method"));
    assert!(!config.backup_path().exists());
}

/// Tests that verification can be switched off for a loopback node.
#[tokio::test]
async fn test_accept_invalid_certs_on_loopback() {
    let dir = tempdir().unwrap();
    let stub = AdminStub::spawn_tls(200, &mnemonic_reply(24));
    let mut config = test_config(dir.path(), &stub.endpoint, "walletinit-missing-lncli");
    config.accept_invalid_certs = true;

    let (outcome, _) = run(&config).await;

    assert!(matches!(
        outcome,
        InitOutcome::Done {
            via: InitPath::Api,
            ..
        }
    ));
    assert_eq!(stub.hits(), 1);
    assert!(config.backup_path().exists());
}

/// Tests that trusting the node's certificate is enough to connect.
#[tokio::test]
async fn test_trusted_node_certificate() {
    let dir = tempdir().unwrap();
    let stub = AdminStub::spawn_tls(200, &mnemonic_reply(24));
    let mut config = test_config(dir.path(), &stub.endpoint, "walletinit-missing-lncli");
    config.tls_cert = Some(tls_cert_path());

    let (outcome, output) = run(&config).await;

    match outcome {
        InitOutcome::Done { via, backup } => {
            assert_eq!(via, InitPath::Api);
            assert_eq!(backup, config.backup_path());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(stub.hits(), 1);
    assert!(output.contains("24. seedword24"));
}
