use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default upload size limit for the web service, in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: u32 = 100;

/// Default listen address for the web service.
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub store: Option<StoreConfig>,
    pub server: Option<ServerConfig>,
    pub parsing: Option<ParsingConfigFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the SQLite document store.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub max_upload_mb: Option<u32>,
}

/// Pattern and range overrides for the extraction pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingConfigFile {
    /// Student header regex; must define `seq`, `reg` and `name` groups.
    pub header_pattern: Option<String>,
    /// Subject/percentage regex; must define `code` and `pct` groups.
    pub subject_pattern: Option<String>,
    pub min_percentage: Option<f64>,
    pub max_percentage: Option<f64>,
}

impl ConfigFile {
    pub fn store_path(&self) -> Option<PathBuf> {
        self.store
            .as_ref()
            .and_then(|s| s.path.as_ref())
            .map(PathBuf::from)
    }

    pub fn bind(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    pub fn max_upload_mb(&self) -> u32 {
        self.server
            .as_ref()
            .and_then(|s| s.max_upload_mb)
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB)
    }
}

/// Platform config directory path: `<config_dir>/attendex/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("attendex").join("config.toml"))
}

/// Load config by cascading CWD `.attendex.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".attendex.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let store = |c: &ConfigFile| c.store.clone().unwrap_or_default();
    let server = |c: &ConfigFile| c.server.clone().unwrap_or_default();
    let parsing = |c: &ConfigFile| c.parsing.clone().unwrap_or_default();

    let (bs, os) = (store(&base), store(&overlay));
    let (bv, ov) = (server(&base), server(&overlay));
    let (bp, op) = (parsing(&base), parsing(&overlay));

    ConfigFile {
        store: Some(StoreConfig {
            path: os.path.or(bs.path),
        }),
        server: Some(ServerConfig {
            bind: ov.bind.or(bv.bind),
            max_upload_mb: ov.max_upload_mb.or(bv.max_upload_mb),
        }),
        parsing: Some(ParsingConfigFile {
            header_pattern: op.header_pattern.or(bp.header_pattern),
            subject_pattern: op.subject_pattern.or(bp.subject_pattern),
            min_percentage: op.min_percentage.or(bp.min_percentage),
            max_percentage: op.max_percentage.or(bp.max_percentage),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_config() {
        let cfg: ConfigFile = toml::from_str(
            r#"
            [store]
            path = "attendance.db"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.store_path(), Some(PathBuf::from("attendance.db")));
        assert_eq!(cfg.bind(), DEFAULT_BIND);
        assert_eq!(cfg.max_upload_mb(), DEFAULT_MAX_UPLOAD_MB);
        assert!(cfg.parsing.is_none());
    }

    #[test]
    fn overlay_wins_field_by_field() {
        let base: ConfigFile = toml::from_str(
            r#"
            [store]
            path = "base.db"
            [server]
            bind = "127.0.0.1:8080"
            max_upload_mb = 10
            "#,
        )
        .unwrap();
        let overlay: ConfigFile = toml::from_str(
            r#"
            [server]
            max_upload_mb = 50
            [parsing]
            max_percentage = 120.0
            "#,
        )
        .unwrap();

        let merged = merge(base, overlay);
        assert_eq!(merged.store_path(), Some(PathBuf::from("base.db")));
        assert_eq!(merged.bind(), "127.0.0.1:8080");
        assert_eq!(merged.max_upload_mb(), 50);
        assert_eq!(merged.parsing.unwrap().max_percentage, Some(120.0));
    }

    #[test]
    fn missing_or_invalid_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[store\npath = ").unwrap();
        assert!(load_from_path(&bad).is_none());

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[server]\nbind = \"127.0.0.1:1\"\n").unwrap();
        assert_eq!(load_from_path(&good).unwrap().bind(), "127.0.0.1:1");
    }
}
