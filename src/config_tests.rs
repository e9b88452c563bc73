#[cfg(test)]
mod tests {
    use crate::config::*;
    use crate::error::{KmodError, Result};
    use serial_test::serial;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.module_name, "kvdo");
        assert_eq!(config.target_type, "dedupe");
        assert_eq!(config.wait_attempts, 20);
        assert_eq!(config.retry_delay_ms, 1000);
        assert_eq!(config.command_timeout_secs, 30);
        assert_eq!(config.tools.modprobe, "modprobe");
        assert_eq!(config.tools.lsmod, "lsmod");
        assert_eq!(config.tools.dmsetup, "dmsetup");
        assert_eq!(config.tools.modinfo, "modinfo");
        assert!(config.messages_path.is_none());
        assert!(config.log_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config {
            module_name: "dm_vdo".to_string(),
            target_type: "vdo".to_string(),
            wait_attempts: 5,
            ..Config::default()
        };
        config.tools.modprobe = "/usr/sbin/modprobe".to_string();

        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("dm_vdo"));
        assert!(yaml.contains("/usr/sbin/modprobe"));

        let deserialized: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("module_name: dm_vdo\ntools:\n  lsmod: /bin/lsmod\n").unwrap();
        assert_eq!(config.module_name, "dm_vdo");
        assert_eq!(config.target_type, "dedupe");
        assert_eq!(config.tools.lsmod, "/bin/lsmod");
        assert_eq!(config.tools.dmsetup, "dmsetup");
    }

    #[test]
    fn test_validation_failures() {
        let bad = [
            Config { module_name: String::new(), ..Config::default() },
            Config { module_name: "kvdo extra".to_string(), ..Config::default() },
            Config { target_type: "  ".to_string(), ..Config::default() },
            Config { wait_attempts: 0, ..Config::default() },
            Config { command_timeout_secs: 0, ..Config::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(KmodError::Config(_))), "{:?}", config);
        }
    }

    #[test]
    #[serial]
    fn test_config_default_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let previous = std::env::var_os("XDG_CONFIG_HOME");
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());

        let path = Config::default_path().unwrap();

        match previous {
            Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }

        assert!(path.starts_with(temp_dir.path()));
        assert!(path.ends_with("kmodctl/config.yaml"));
    }

    #[test]
    fn test_config_load_missing() -> Result<()> {
        // Test loading non-existent config (should return defaults)
        let config = Config::load(Some("/nonexistent/config.yaml".into()))?;
        assert_eq!(config, Config::default());

        Ok(())
    }

    #[test]
    fn test_config_load_rejects_invalid() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "module_name: \"\"\n").unwrap();

        assert!(Config::load(Some(config_path)).is_err());
    }

    #[test]
    fn test_config_load_rejects_malformed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "wait_attempts: many\n").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_config_save_load() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let config_path = temp_dir.path().join("nested").join("config.yaml");

        let original_config = Config {
            module_name: "kvdo_test".to_string(),
            retry_delay_ms: 250,
            ..Config::default()
        };

        original_config.save(config_path.clone())?;
        let loaded_config = Config::load(Some(config_path))?;

        assert_eq!(loaded_config, original_config);
        assert_eq!(loaded_config.command_timeout(), std::time::Duration::from_secs(30));

        Ok(())
    }
}
