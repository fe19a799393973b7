//! Unit tests for `CredentialFetcher`.
//!
//! These drive the fetch sequence end to end with mocked process execution,
//! environment, and provider spec parsing.

#![allow(clippy::expect_used)]

use std::time::Duration;

use nodeboot_cli::application::services::CredentialFetcher;
use nodeboot_cli::application::{CancelToken, cancel_pair};
use nodeboot_cli::domain::{
    CredentialPayload, FetchError, FetcherConfig, OutputPolicy, RunError,
};
use nodeboot_cli::infra::OpenstackSpecParser;
use nodeboot_common::{Annotations, ProviderSpec};
use proptest::prelude::*;

use crate::helpers::{KUBECONFIG, err_output, node_at, ok_output, openstack_spec};
use crate::mocks::{BrokenSpec, FixedUser, MapEnv, MockCommandRunner};

fn fetcher<P: nodeboot_cli::application::ProviderSpecParser>(
    runner: &MockCommandRunner,
    env: MapEnv,
    parser: P,
    policy: OutputPolicy,
) -> CredentialFetcher<MockCommandRunner, MapEnv, P> {
    CredentialFetcher::new(
        runner.clone(),
        env,
        parser,
        FetcherConfig {
            output_policy: policy,
            ..FetcherConfig::default()
        },
    )
}

fn home() -> MapEnv {
    MapEnv::with("HOME", "/home/operator")
}

async fn fetch<P: nodeboot_cli::application::ProviderSpecParser>(
    f: &CredentialFetcher<MockCommandRunner, MapEnv, P>,
    annotations: Option<&Annotations>,
) -> Result<CredentialPayload, FetchError> {
    f.fetch_credential(annotations, &openstack_spec("centos"), &CancelToken::never())
        .await
}

// ── Local failures never reach the remote side ───────────────────────────────

#[test]
fn test_resolve_address_reads_annotation_without_connecting() {
    let runner = MockCommandRunner::forbidden();
    let f = fetcher(&runner, MapEnv::default(), FixedUser("centos"), OutputPolicy::Strict);
    assert_eq!(f.resolve_address(Some(&node_at("192.0.2.7"))).expect("address"), "192.0.2.7");
    assert!(matches!(f.resolve_address(None), Err(FetchError::NotFound)));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_empty_metadata_is_not_found_without_connecting() {
    let runner = MockCommandRunner::forbidden();
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, Some(&Annotations::new())).await.expect_err("should fail");
    assert!(matches!(err, FetchError::NotFound));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_absent_metadata_is_not_found_without_connecting() {
    let runner = MockCommandRunner::forbidden();
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, None).await.expect_err("should fail");
    assert!(matches!(err, FetchError::NotFound));
}

#[tokio::test]
async fn test_unset_home_is_config_error_without_connecting() {
    let runner = MockCommandRunner::forbidden();
    let f = fetcher(&runner, MapEnv::default(), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(&err, FetchError::Config(msg) if msg.contains("HOME")));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_empty_home_is_config_error() {
    let runner = MockCommandRunner::forbidden();
    let f = fetcher(&runner, MapEnv::with("HOME", ""), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(err, FetchError::Config(_)));
}

#[tokio::test]
async fn test_address_is_checked_before_environment() {
    let runner = MockCommandRunner::forbidden();
    let f = fetcher(&runner, MapEnv::default(), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, None).await.expect_err("should fail");
    assert!(matches!(err, FetchError::NotFound));
}

#[tokio::test]
async fn test_environment_is_checked_before_provider_spec() {
    let runner = MockCommandRunner::forbidden();
    let f = fetcher(&runner, MapEnv::default(), BrokenSpec, OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(err, FetchError::Config(_)));
}

#[tokio::test]
async fn test_malformed_provider_spec_is_parse_error() {
    let runner = MockCommandRunner::forbidden();
    let f = fetcher(&runner, home(), BrokenSpec, OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(&err, FetchError::Parse(e) if e.to_string().contains("invalid type")));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_real_parser_rejects_missing_provider_spec() {
    let runner = MockCommandRunner::forbidden();
    let f = fetcher(&runner, home(), OpenstackSpecParser, OutputPolicy::Strict);
    let err = f
        .fetch_credential(Some(&node_at("10.0.0.4")), &ProviderSpec::default(), &CancelToken::never())
        .await
        .expect_err("should fail");
    assert!(matches!(err, FetchError::Parse(_)));
}

#[tokio::test]
async fn test_option_like_address_is_rejected_before_connecting() {
    let runner = MockCommandRunner::forbidden();
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("-oProxyCommand=touch /tmp/pwned")))
        .await
        .expect_err("should fail");
    assert!(matches!(err, FetchError::InvalidIdentity(_)));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_shell_metacharacters_in_username_are_rejected() {
    let runner = MockCommandRunner::forbidden();
    let f = fetcher(&runner, home(), FixedUser("centos;reboot"), OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(err, FetchError::InvalidIdentity(_)));
}

// ── Remote invocation ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_single_ssh_invocation_with_structured_arguments() {
    let runner = MockCommandRunner::stdout("Last login: Mon\nSTARTFILE\napiVersion: v1\n");
    let f = fetcher(&runner, home(), OpenstackSpecParser, OutputPolicy::Strict);
    fetch(&f, Some(&node_at("10.0.0.4"))).await.expect("fetch");

    let calls = runner.calls();
    assert_eq!(calls.len(), 1, "exactly one remote invocation");
    let call = &calls[0];
    assert_eq!(call.program, "ssh");
    assert_eq!(call.timeout, Duration::from_secs(60));
    assert_eq!(
        call.args,
        vec![
            "-i",
            "/home/operator/.ssh/openstack_tmp",
            "-o",
            "StrictHostKeyChecking=no",
            "-o",
            "UserKnownHostsFile=/dev/null",
            "-o",
            "BatchMode=yes",
            "-o",
            "ConnectTimeout=10",
            "-l",
            "centos",
            "--",
            "10.0.0.4",
            "echo STARTFILE; sudo -n cat /etc/kubernetes/admin.conf",
        ]
    );
}

#[tokio::test]
async fn test_configured_program_and_timeout_are_used() {
    let runner = MockCommandRunner::stdout("STARTFILE\nx\n");
    let f = CredentialFetcher::new(
        runner.clone(),
        home(),
        FixedUser("core"),
        FetcherConfig {
            ssh_program: "/opt/bin/ssh".to_string(),
            exec_timeout_secs: 7,
            ..FetcherConfig::default()
        },
    );
    fetch(&f, Some(&node_at("node-1"))).await.expect("fetch");
    let call = &runner.calls()[0];
    assert_eq!(call.program, "/opt/bin/ssh");
    assert_eq!(call.timeout, Duration::from_secs(7));
}

#[tokio::test]
async fn test_payload_after_marker_is_returned_trimmed() {
    let runner = MockCommandRunner::stdout(
        "Welcome to CentOS\nSTARTFILE\napiVersion: v1\nkind: Config\nclusters:\n- name: kubernetes\n  cluster:\n    server: https://10.0.0.4:6443\n\n",
    );
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let got = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect("fetch");
    assert_eq!(got, CredentialPayload::Found(KUBECONFIG.to_string()));
}

#[tokio::test]
async fn test_missing_marker_is_ambiguous_in_strict_mode() {
    let runner = MockCommandRunner::stdout("Permission denied\n");
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(err, FetchError::AmbiguousOutput { occurrences: 0 }));
}

#[tokio::test]
async fn test_repeated_marker_is_ambiguous_in_strict_mode() {
    let runner = MockCommandRunner::stdout("STARTFILE\nkind: Config # STARTFILE\n");
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(err, FetchError::AmbiguousOutput { occurrences: 2 }));
}

#[tokio::test]
async fn test_ambiguous_output_is_silent_empty_in_compatible_mode() {
    let runner = MockCommandRunner::stdout("STARTFILE twice STARTFILE payload");
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Compatible);
    let got = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect("no error");
    assert_eq!(got, CredentialPayload::Empty);
}

#[tokio::test]
async fn test_marker_on_stderr_is_ignored() {
    let runner = MockCommandRunner::new(|_| {
        let mut out = ok_output(b"");
        out.stderr = b"STARTFILE\nsecret".to_vec();
        Ok(out)
    });
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(err, FetchError::AmbiguousOutput { occurrences: 0 }));
}

// ── Remote failures ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ssh_failure_is_remote_exec_error() {
    let runner = MockCommandRunner::new(|_| {
        Ok(err_output(255, b"Permission denied (publickey).\r\n"))
    });
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Compatible);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(&err, FetchError::RemoteExec(msg) if msg.contains("Permission denied")));
    assert!(err.is_remote());
}

#[tokio::test]
async fn test_spawn_failure_is_remote_exec_error() {
    let runner = MockCommandRunner::new(|_| {
        Err(RunError::Spawn {
            program: "ssh".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    });
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(err, FetchError::RemoteExec(_)));
}

#[tokio::test]
async fn test_runner_timeout_is_surfaced() {
    let runner = MockCommandRunner::new(|_| {
        Err(RunError::TimedOut {
            program: "ssh".to_string(),
            timeout: Duration::from_secs(60),
        })
    });
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(err, FetchError::TimedOut(d) if d == Duration::from_secs(60)));
}

#[tokio::test]
async fn test_runner_cancellation_is_surfaced() {
    let runner = MockCommandRunner::new(|_| {
        Err(RunError::Cancelled {
            program: "ssh".to_string(),
        })
    });
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(err, FetchError::Cancelled));
}

#[tokio::test]
async fn test_invalid_utf8_on_stdout_is_rejected() {
    let runner = MockCommandRunner::new(|_| {
        Ok(ok_output(b"STARTFILE\napiVersion: v1\nuser: \xff\xfeadmin\n"))
    });
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Compatible);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(&err, FetchError::RemoteExec(msg) if msg.contains("invalid UTF-8")));
}

#[tokio::test]
async fn test_short_read_is_remote_exec_error() {
    let runner = MockCommandRunner::new(|_| {
        Err(RunError::Read {
            program: "ssh".to_string(),
            stream: "stdout",
            source: std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
        })
    });
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(&err, FetchError::RemoteExec(msg) if msg.contains("reading stdout")));
}

#[tokio::test]
async fn test_zero_exec_timeout_is_config_error_without_connecting() {
    let runner = MockCommandRunner::forbidden();
    let f = CredentialFetcher::new(
        runner.clone(),
        home(),
        FixedUser("centos"),
        FetcherConfig {
            exec_timeout_secs: 0,
            ..FetcherConfig::default()
        },
    );
    let err = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect_err("should fail");
    assert!(matches!(&err, FetchError::Config(msg) if msg.contains("exec_timeout_secs")));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn test_blank_file_after_marker_is_found() {
    let runner = MockCommandRunner::stdout("STARTFILE\n");
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let got = fetch(&f, Some(&node_at("10.0.0.4"))).await.expect("fetch");
    assert_eq!(got, CredentialPayload::Found(String::new()));
    assert!(got.is_found());
}

#[tokio::test]
async fn test_cancelled_token_prevents_spawn() {
    let runner = MockCommandRunner::forbidden();
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let (handle, token) = cancel_pair();
    handle.cancel();
    let err = f
        .fetch_credential(Some(&node_at("10.0.0.4")), &openstack_spec("centos"), &token)
        .await
        .expect_err("should fail");
    assert!(matches!(err, FetchError::Cancelled));
}

// ── Concurrency ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_fetches_for_different_nodes() {
    let runner = MockCommandRunner::new(|args| {
        let address = &args[args.len() - 2];
        Ok(ok_output(format!("banner\nSTARTFILE\nserver: https://{address}:6443\n").as_bytes()))
    });
    let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
    let (a, b) = (node_at("10.0.0.4"), node_at("10.0.0.5"));
    let (ra, rb) = tokio::join!(fetch(&f, Some(&a)), fetch(&f, Some(&b)));
    assert_eq!(
        ra.expect("first"),
        CredentialPayload::Found("server: https://10.0.0.4:6443".to_string())
    );
    assert_eq!(
        rb.expect("second"),
        CredentialPayload::Found("server: https://10.0.0.5:6443".to_string())
    );
    assert_eq!(runner.calls().len(), 2);
}

// ── Properties ───────────────────────────────────────────────────────────────

proptest! {
    /// Whatever follows a single marker comes back trimmed.
    #[test]
    fn prop_fetch_returns_trimmed_text_after_single_marker(
        banner in "[a-z \n]{0,40}",
        body in "[a-z:\n ]{0,80}",
    ) {
        let stdout = format!("{banner}STARTFILE{body}");
        let runner = MockCommandRunner::new(move |_| Ok(ok_output(stdout.as_bytes())));
        let f = fetcher(&runner, home(), FixedUser("centos"), OutputPolicy::Strict);
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let got = rt.block_on(fetch(&f, Some(&node_at("10.0.0.4")))).expect("fetch");
        prop_assert_eq!(got, CredentialPayload::Found(body.trim().to_string()));
    }
}
