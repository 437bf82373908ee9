use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_SPREADSHEET_ID: &str = "11lz-JRqZm7nRt1Ya4ARFPFv4MoMEn72G2ChoaBsewaI";
pub const DEFAULT_DECEASED_RANGE: &str = "KORBAN MENINGGAL!A6:E";
pub const DEFAULT_HELIPAD_RANGE: &str = "TITIK HELIPAD!A5:F";
pub const DEFAULT_POSKO_RANGE: &str = "POSKO!A6:C";
pub const DEFAULT_POSKO_TOTAL_RANGE: &str = "POSKO!B4:C4";
pub const DEFAULT_LAST_UPDATE_RANGE: &str = "UPDATE!A1:B1";

/// One evacuee sheet: a name column and the shelter it belongs to.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EvacueeSource {
    pub range: String,
    pub location: String,
}

pub fn default_evacuee_sources() -> Vec<EvacueeSource> {
    [
        ("PENGUNSI-TUKKA!B7:B", "Kecamatan Tukka"),
        ("PENGUNSI-GOR PANDAN!B6:B", "Gedung Serba Guna Pandan"),
        (
            "PENGUNGSI-HOTEL HASIAN DAN CC!B8:B",
            "Hotel Hasian / Pastoran Santo Yosef",
        ),
    ]
    .into_iter()
    .map(|(range, location)| EvacueeSource {
        range: range.to_string(),
        location: location.to_string(),
    })
    .collect()
}

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub spreadsheet_id: Option<String>,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub fixture: Option<String>,
    pub timeout: Option<u64>,
    #[serde(alias = "revalidate")]
    pub revalidate_seconds: Option<u64>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
    pub evacuee_sources: Option<Vec<EvacueeSource>>,
    pub deceased_range: Option<String>,
    pub helipad_range: Option<String>,
    pub posko_range: Option<String>,
    pub posko_total_range: Option<String>,
    pub last_update_range: Option<String>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".bpbd-board").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# bpbd-board config
#
# Location (default):
#   ~/.bpbd-board/config.yml

# Spreadsheet
spreadsheet_id: 11lz-JRqZm7nRt1Ya4ARFPFv4MoMEn72G2ChoaBsewaI
# api_key: <google api key with Sheets read access>
# api_base: https://sheets.googleapis.com

# Read a local JSON snapshot instead of the live sheet (optional)
# fixture: ./fixtures/sheet.json

# HTTP
timeout: 10

# Seconds a fetched range is reused before it is read again
revalidate_seconds: 300

# Output (optional)
# output: ./pengungsi.html
# output_format: html
no_color: false

# Sheet ranges
evacuee_sources:
  - range: "PENGUNSI-TUKKA!B7:B"
    location: "Kecamatan Tukka"
  - range: "PENGUNSI-GOR PANDAN!B6:B"
    location: "Gedung Serba Guna Pandan"
  - range: "PENGUNGSI-HOTEL HASIAN DAN CC!B8:B"
    location: "Hotel Hasian / Pastoran Santo Yosef"
deceased_range: "KORBAN MENINGGAL!A6:E"
helipad_range: "TITIK HELIPAD!A5:F"
posko_range: "POSKO!A6:C"
posko_total_range: "POSKO!B4:C4"
last_update_range: "UPDATE!A1:B1"
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_yaml_parses_and_matches_builtin_sources() {
        let cfg: ConfigFile = serde_yaml::from_str(&default_config_yaml()).unwrap();
        assert_eq!(cfg.spreadsheet_id.as_deref(), Some(DEFAULT_SPREADSHEET_ID));
        assert_eq!(cfg.evacuee_sources, Some(default_evacuee_sources()));
        assert_eq!(cfg.posko_range.as_deref(), Some(DEFAULT_POSKO_RANGE));
        assert_eq!(cfg.revalidate_seconds, Some(300));
    }

    #[test]
    fn revalidate_alias_is_accepted() {
        let cfg: ConfigFile = serde_yaml::from_str("revalidate: 60\n").unwrap();
        assert_eq!(cfg.revalidate_seconds, Some(60));
    }

    #[test]
    fn missing_file_is_allowed_only_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yml");
        assert!(load_config(&path, true).is_ok());
        assert!(load_config(&path, false)
            .unwrap_err()
            .contains("config file not found"));
    }

    #[test]
    fn ensure_default_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        assert!(ensure_default_config_file(&path).unwrap());
        assert!(!ensure_default_config_file(&path).unwrap());
        let cfg = load_config(&path, false).unwrap();
        assert_eq!(cfg.timeout, Some(10));
    }

    #[test]
    fn malformed_yaml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        std::fs::write(&path, "timeout: [not a number").unwrap();
        let err = load_config(&path, false).unwrap_err();
        assert!(err.contains("failed to parse config"));
        assert!(err.contains("bad.yml"));
    }
}
