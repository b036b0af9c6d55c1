//! INI file configuration adapter.

use configparser::ini::Ini;
use std::path::Path;

use crate::ports::config_port::ConfigPort;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn from_string_parses_sections() {
        let content = r#"
[trading]
underlying_instrument = NIFTY 50
max_trades_per_day = 3

[trailing]
type = percentage
percentage = 12.5
use_indicator_exit = yes
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("trading", "underlying_instrument"),
            Some("NIFTY 50".to_string())
        );
        assert_eq!(adapter.get_int("trading", "max_trades_per_day", 0), 3);
        assert_eq!(adapter.get_double("trailing", "percentage", 0.0), 12.5);
        assert!(adapter.get_bool("trailing", "use_indicator_exit", false));
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let adapter = FileConfigAdapter::from_string("[trading]\n").unwrap();
        assert_eq!(adapter.get_string("trading", "missing"), None);
        assert_eq!(adapter.get_int("trading", "missing", 42), 42);
        assert_eq!(adapter.get_double("trading", "missing", 9.5), 9.5);
        assert!(adapter.get_bool("trading", "missing", true));
    }

    #[test]
    fn non_numeric_values_fall_back_to_defaults() {
        let adapter =
            FileConfigAdapter::from_string("[trading]\nmax_trades_per_day = lots\n").unwrap();
        assert_eq!(adapter.get_int("trading", "max_trades_per_day", 2), 2);
        assert_eq!(adapter.get_double("trading", "max_trades_per_day", 1.5), 1.5);
    }

    #[test]
    fn bool_synonyms() {
        let adapter =
            FileConfigAdapter::from_string("[a]\nx = yes\ny = 0\nz = maybe\n").unwrap();
        assert!(adapter.get_bool("a", "x", false));
        assert!(!adapter.get_bool("a", "y", true));
        assert!(adapter.get_bool("a", "z", true));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[session]\npoll_interval_secs = 10\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_int("session", "poll_interval_secs", 0), 10);
    }

    #[test]
    fn from_file_missing_path_errors() {
        assert!(FileConfigAdapter::from_file("/nonexistent/daytrader.ini").is_err());
    }
}
