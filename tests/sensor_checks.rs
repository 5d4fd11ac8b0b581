// tests/sensor_checks.rs
use host_sensors::checks::{build_check, Check, CheckContext, MemoryCheck, OnlineCheck};
use host_sensors::config::{self, OnlineCheckConfig, SensorKind, DEFAULT_USER_AGENT};
use host_sensors::SensorError;
use std::path::PathBuf;
use std::time::Duration;

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("host-sensors-{}-{}", std::process::id(), name));
    std::fs::write(&path, contents).unwrap();
    path
}

fn http_check(target: &str) -> OnlineCheck {
    OnlineCheck::new(OnlineCheckConfig::new("http", target)).unwrap()
}

#[tokio::test]
async fn test_http_reachable_reports_status_line() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .match_header("user-agent", DEFAULT_USER_AGENT)
        .with_status(200)
        .with_body("OK")
        .create_async()
        .await;

    let payload = http_check(&format!("{}/health", server.url()))
        .run(&CheckContext::background())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(payload.state.as_bool(), Some(true));
    assert_eq!(payload.attribute("status"), Some("200 OK"));
    assert_eq!(payload.attribute("err"), None);
}

#[tokio::test]
async fn test_http_server_error_still_counts_as_online() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .with_status(503)
        .create_async()
        .await;

    let payload = http_check(&format!("{}/", server.url()))
        .run(&CheckContext::background())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(payload.state.as_bool(), Some(true));
    assert_eq!(payload.attribute("status"), Some("503 Service Unavailable"));
}

#[tokio::test]
async fn test_http_connection_refused_is_offline_not_error() {
    // Grab a free port, then close it so nothing listens there.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let payload = http_check(&format!("http://{}/", addr))
        .run(&CheckContext::with_timeout(Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(payload.state.as_bool(), Some(false));
    assert!(!payload.attribute("err").unwrap().is_empty());
}

#[tokio::test]
async fn test_http_deadline_aborts_hanging_request() {
    // Accepts connections at the kernel level but never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let ctx = CheckContext::with_timeout(Duration::from_millis(200));
    let started = std::time::Instant::now();
    let payload = http_check(&format!("http://{}/", addr)).run(&ctx).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(payload.state.as_bool(), Some(false));
    assert_eq!(payload.attribute("err"), Some("context deadline exceeded"));
    drop(listener);
}

#[tokio::test]
async fn test_http_client_timeout_is_offline() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let check = OnlineCheck::new(OnlineCheckConfig {
        timeout_secs: 1,
        ..OnlineCheckConfig::new("http", format!("http://{}/", addr))
    })
    .unwrap();

    let payload = check.run(&CheckContext::background()).await.unwrap();

    assert_eq!(payload.state.as_bool(), Some(false));
    assert!(!payload.attribute("err").unwrap().is_empty());
    drop(listener);
}

#[tokio::test]
async fn test_online_usage_errors_skip_the_probe() {
    let missing = OnlineCheck::new(OnlineCheckConfig::default()).unwrap();
    let err = missing.run(&CheckContext::background()).await.unwrap_err();
    assert!(err.is_config_error());
    assert_eq!(err.to_string(), "online check requires target to be specified");

    let bogus = OnlineCheck::new(OnlineCheckConfig::new("bogus", "example.org")).unwrap();
    let err = bogus.run(&CheckContext::background()).await.unwrap_err();
    assert!(matches!(err, SensorError::UnknownMode(_)));
}

#[tokio::test]
async fn test_memory_check_from_yaml_config() {
    let meminfo = temp_file(
        "meminfo",
        "MemTotal:       16384000 kB\nMemFree:        2048000 kB\nSwapFree: 0 kB\n",
    );
    let config_path = temp_file(
        "sensors.yaml",
        &format!(
            "check_timeout_secs: 3\nsensors:\n  - name: ram\n    type: memory\n    path: {}\n",
            meminfo.display()
        ),
    );

    let config = config::load_config(&config_path).await.unwrap();
    assert!(matches!(config.sensors[0].kind, SensorKind::Memory(_)));

    let check = build_check(&config.sensors[0]).unwrap();
    let ctx = CheckContext::background().child_with_timeout(config.check_timeout());
    let payload = check.run(&ctx).await.unwrap();

    std::fs::remove_file(&meminfo).unwrap();
    std::fs::remove_file(&config_path).unwrap();

    assert_eq!(payload.state.as_str(), Some("2048000"));
    assert_eq!(payload.attribute("mem_total"), Some("16384000"));
    assert_eq!(payload.attribute("swap_free"), Some("0"));
}

#[test]
fn test_memory_check_rejects_unexpected_format() {
    let check = MemoryCheck::default();
    let err = check.process("SomeOtherField: 5\n").unwrap_err();

    assert!(err.to_string().contains("SomeOtherField: 5"));
    assert!(!err.is_config_error());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_memory_check_reads_proc_meminfo() {
    let payload = MemoryCheck::default()
        .run(&CheckContext::with_timeout(Duration::from_secs(5)))
        .await
        .unwrap();

    let free = payload.state.as_str().unwrap();
    assert!(!free.is_empty());
    assert!(free.bytes().all(|b| b.is_ascii_digit()));
    assert!(payload.attribute("mem_total").is_some());
}
