// src/infra/paths.rs — Config and state path management
//
// All paths respect the PULSEWATCH_HOME environment variable for isolation.
// When PULSEWATCH_HOME is set, config and state live under that directory.
// When unset, everything lives under ~/.pulsewatch/.

use std::path::PathBuf;

/// Returns the PULSEWATCH_HOME override, if set.
fn pulsewatch_home() -> Option<PathBuf> {
    std::env::var_os("PULSEWATCH_HOME").map(PathBuf::from)
}

/// Home directory, or the working directory when no home can be determined.
pub fn dirs_home() -> PathBuf {
    directories::BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $PULSEWATCH_HOME/ or ~/.pulsewatch/
pub fn config_dir() -> PathBuf {
    if let Some(home) = pulsewatch_home() {
        return home;
    }
    dirs_home().join(".pulsewatch")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// State directory (event log lives here)
pub fn state_dir() -> PathBuf {
    config_dir().join("state")
}

/// Default JSON-lines event log
pub fn event_log_path() -> PathBuf {
    state_dir().join("events.jsonl")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_nest_under_config_dir() {
        let cfg = config_dir();
        assert!(config_file_path().starts_with(&cfg));
        assert!(event_log_path().starts_with(state_dir()));
        assert_eq!(
            event_log_path().file_name().and_then(|n| n.to_str()),
            Some("events.jsonl")
        );
    }
}
