use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "LINEAGE_CONFIG";

/// Config file looked up in the working directory when `LINEAGE_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "lineage.toml";

/// 1×1 transparent PNG used whenever an avatar cannot be resolved
pub const PLACEHOLDER_IMAGE: &str = "data:image/png;base64,\
iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR4nGNgYAAAAAMAASsJTYQAAAAASUVORK5CYII=";

/// Initialise logging before configuration is read.
///
/// `RUST_LOG` wins when set. Otherwise logging starts at `info` and
/// [`Config::apply_log_level`] switches to the configured level once the
/// config has loaded.
pub fn init_logger() {
    let from_env = std::env::var("RUST_LOG").is_ok();
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "trace")).init();
    if !from_env {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub style: StyleConfig,
    pub spirit: SpiritConfig,
    pub render: RenderConfig,
    pub server: ServerConfig,
}

/// Where source tables, avatars and exports live.
///
/// Directories are relative to `root`; the two table files are relative to
/// `data_dir` and the export file to `export_dir`. Absolute values are used
/// as-is.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub avatar_dir: PathBuf,
    pub export_dir: PathBuf,
    pub persons_file: PathBuf,
    pub relations_file: PathBuf,
    pub export_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            data_dir: PathBuf::from("data"),
            avatar_dir: PathBuf::from("static/avatars"),
            export_dir: PathBuf::from("exports"),
            persons_file: PathBuf::from("persons.csv"),
            relations_file: PathBuf::from("relations.csv"),
            export_file: PathBuf::from("genealogy_export.html"),
        }
    }
}

/// Colors passed into the rendering template
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub accent_color: String,
    pub edge_color: String,
    /// Page background color, used when no background image resolves
    pub background: String,
    /// Optional background image reference, resolved like an avatar
    pub background_image: Option<String>,
    pub highlight_border: String,
    pub highlight_background: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            accent_color: "#FFD60A".to_string(),
            edge_color: "#8b4513".to_string(),
            background: "#8B0000".to_string(),
            background_image: None,
            highlight_border: "#FFD60A".to_string(),
            highlight_background: "#fff".to_string(),
        }
    }
}

/// A spirit keyword and its short explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiritKeyword {
    pub term: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpiritConfig {
    pub keywords: Vec<SpiritKeyword>,
}

impl Default for SpiritConfig {
    fn default() -> Self {
        let keyword = |term: &str, description: &str| SpiritKeyword {
            term: term.to_string(),
            description: description.to_string(),
        };
        Self {
            keywords: vec![
                keyword("忠诚", "对党和人民事业无限忠诚，矢志不渝"),
                keyword("关爱", "关心下一代成长，无私奉献爱心"),
                keyword("创新", "勇于探索，推动工作创新发展"),
                keyword("奉献", "无私奉献，不计个人得失"),
                keyword("务实", "脚踏实地，注重实际成效"),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Encoded avatars kept in memory between renders; 0 disables caching
    pub image_cache_capacity: usize,
    pub placeholder: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_cache_capacity: 256,
            placeholder: PLACEHOLDER_IMAGE.to_string(),
        }
    }
}

/// Live preview server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8501,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in LINEAGE_CONFIG environment variable (must exist)
    /// 2. ./lineage.toml in current directory
    /// 3. Built-in defaults rooted at the current directory
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    log::info!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Read a TOML config file. A relative `paths.root` is taken relative to
    /// the directory holding the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if config.paths.root.is_relative() {
            let base = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            config.paths.root = base.join(&config.paths.root);
        }

        Ok(config)
    }

    /// Parse configuration from TOML text without touching the filesystem
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("Invalid lineage configuration")?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.spirit.keywords.is_empty() {
            anyhow::bail!("spirit.keywords must list at least one keyword");
        }

        let mut seen = HashSet::new();
        for keyword in &self.spirit.keywords {
            let term = keyword.term.trim();
            if term.is_empty() {
                anyhow::bail!("spirit.keywords contains a blank term");
            }
            if !seen.insert(term) {
                anyhow::bail!("spirit.keywords contains duplicate term: {}", term);
            }
        }

        for (field, value) in [
            ("style.accent_color", &self.style.accent_color),
            ("style.edge_color", &self.style.edge_color),
            ("style.background", &self.style.background),
            ("style.highlight_border", &self.style.highlight_border),
            ("style.highlight_background", &self.style.highlight_background),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{} must not be empty", field);
            }
        }

        if self.server.port == 0 {
            anyhow::bail!("server.port must be greater than 0");
        }

        self.log_level()?;

        Ok(())
    }

    /// Parsed `server.log_level` (`off`, `error`, `warn`, `info`, `debug`, `trace`)
    pub fn log_level(&self) -> Result<log::LevelFilter> {
        self.server
            .log_level
            .trim()
            .parse::<log::LevelFilter>()
            .map_err(|_| anyhow::anyhow!("server.log_level is not a log level: {}", self.server.log_level))
    }

    /// Apply `server.log_level` unless `RUST_LOG` is set
    pub fn apply_log_level(&self) {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        if let Ok(level) = self.log_level() {
            log::set_max_level(level);
        }
    }

    fn under(base: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    pub fn data_dir(&self) -> PathBuf {
        Self::under(self.root(), &self.paths.data_dir)
    }

    pub fn avatar_dir(&self) -> PathBuf {
        Self::under(self.root(), &self.paths.avatar_dir)
    }

    pub fn export_dir(&self) -> PathBuf {
        Self::under(self.root(), &self.paths.export_dir)
    }

    pub fn persons_path(&self) -> PathBuf {
        Self::under(&self.data_dir(), &self.paths.persons_file)
    }

    pub fn relations_path(&self) -> PathBuf {
        Self::under(&self.data_dir(), &self.paths.relations_file)
    }

    pub fn export_path(&self) -> PathBuf {
        Self::under(&self.export_dir(), &self.paths.export_file)
    }

    /// Spirit keyword terms in configured order
    pub fn keyword_terms(&self) -> Vec<String> {
        self.spirit
            .keywords
            .iter()
            .map(|k| k.term.trim().to_string())
            .collect()
    }
}
