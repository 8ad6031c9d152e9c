//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

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
[api]
base_url = https://api.gdax.com
max_points_per_page = 300

[fetch]
product = BTC-USD
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("api", "base_url"),
            Some("https://api.gdax.com".to_string())
        );
        assert_eq!(
            adapter.get_string("api", "max_points_per_page"),
            Some("300".to_string())
        );
        assert_eq!(
            adapter.get_string("fetch", "product"),
            Some("BTC-USD".to_string())
        );
    }

    #[test]
    fn missing_values_fall_back() {
        let adapter = FileConfigAdapter::from_string("[api]\ntimeout_secs = soon\n").unwrap();
        assert_eq!(adapter.get_string("api", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(
            adapter.get_string("api", "timeout_secs"),
            Some("soon".to_string())
        );
        assert!(adapter.get_bool("fetch", "strict", true));
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[fetch]\na = true\nb = yes\nc = 0\nd = maybe\n")
                .unwrap();
        assert!(adapter.get_bool("fetch", "a", false));
        assert!(adapter.get_bool("fetch", "b", false));
        assert!(!adapter.get_bool("fetch", "c", true));
        assert!(adapter.get_bool("fetch", "d", true));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[log]\npath = /var/lib/rates/btc.csv\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("log", "path"),
            Some("/var/lib/rates/btc.csv".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        assert!(FileConfigAdapter::from_file("/nonexistent/path/gdaxrates.ini").is_err());
    }
}
