// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = parse_config(&contents, path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let is_yaml = matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    );

    let config = if is_yaml {
        serde_yaml::from_str(contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(contents).context("Failed to parse JSON config")?
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
sensors:
  - name: memory
    type: memory
  - name: gateway
    type: online
    target: 192.168.1.1
  - name: homepage
    type: online
    mode: http
    target: https://example.org
    timeout_secs: 3
"#;

    #[test]
    fn test_parse_yaml_with_defaults() {
        let config = parse_config(YAML, Path::new("sensors.yaml")).unwrap();
        config.validate().unwrap();

        assert_eq!(config.check_timeout_secs, 10);
        assert_eq!(config.sensors.len(), 3);

        match &config.sensors[0].kind {
            SensorKind::Memory(memory) => {
                assert_eq!(memory.path, Path::new(DEFAULT_MEMINFO_PATH));
            }
            other => panic!("expected memory sensor, got {:?}", other),
        }

        match &config.sensors[1].kind {
            SensorKind::Online(online) => {
                assert_eq!(online.mode, None);
                assert_eq!(online.target.as_deref(), Some("192.168.1.1"));
                assert_eq!(online.timeout_secs, 5);
                assert_eq!(online.user_agent, DEFAULT_USER_AGENT);
                assert_eq!(online.ping_command, "ping");
            }
            other => panic!("expected online sensor, got {:?}", other),
        }

        match &config.sensors[2].kind {
            SensorKind::Online(online) => {
                assert_eq!(online.mode.as_deref(), Some("http"));
                assert_eq!(online.timeout_secs, 3);
            }
            other => panic!("expected online sensor, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "check_timeout_secs": 2,
            "sensors": [{"name": "mem", "type": "memory", "path": "/tmp/meminfo"}]
        }"#;
        let config = parse_config(json, Path::new("sensors.json")).unwrap();

        assert_eq!(config.check_timeout_secs, 2);
        assert_eq!(config.sensors[0].kind.type_name(), "memory");
    }

    #[test]
    fn test_unknown_mode_is_accepted_at_load_time() {
        let yaml = "sensors:\n  - name: odd\n    type: online\n    mode: bogus\n    target: host\n";
        let config = parse_config(yaml, Path::new("c.yml")).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let yaml = "sensors:\n  - name: a\n    type: memory\n  - name: a\n    type: memory\n";
        let config = parse_config(yaml, Path::new("c.yaml")).unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate sensor name: a"));
    }

    #[test]
    fn test_validate_rejects_empty_and_zero_timeouts() {
        let empty = parse_config("sensors: []\n", Path::new("c.yaml")).unwrap();
        assert!(empty.validate().is_err());

        let zero = "sensors:\n  - name: web\n    type: online\n    target: h\n    timeout_secs: 0\n";
        let config = parse_config(zero, Path::new("c.yaml")).unwrap();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/host-sensors.yaml").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
