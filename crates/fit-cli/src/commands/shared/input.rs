use std::io::Read;

use anyhow::Context;
use serde::de::DeserializeOwned;

/// Read and parse a JSON document from a file path, or stdin for `-`.
pub fn read_json<T: DeserializeOwned>(path: &str, what: &str) -> anyhow::Result<T> {
    let text = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?
    };
    serde_json::from_str(&text).with_context(|| format!("{path} is not a valid {what}"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use fit_core::entities::ConfigSnapshot;

    use super::read_json;

    #[test]
    fn reads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"schema_version":2,"status":"draft"}}"#).unwrap();
        let snapshot: ConfigSnapshot =
            read_json(file.path().to_str().unwrap(), "configuration").unwrap();
        assert_eq!(snapshot, ConfigSnapshot::empty());
    }

    #[test]
    fn reports_what_failed_to_parse() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = read_json::<ConfigSnapshot>(file.path().to_str().unwrap(), "configuration")
            .unwrap_err();
        assert!(format!("{err:#}").contains("not a valid configuration"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = read_json::<ConfigSnapshot>("/nonexistent/stackfit.json", "configuration");
        assert!(result.is_err());
    }
}
