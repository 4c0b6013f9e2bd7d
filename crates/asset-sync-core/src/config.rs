use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT: &str = "storage/products";
pub const DEFAULT_CATALOG_DB: &str = "storefront.db";
pub const DEFAULT_URL_PREFIX: &str = "/storage/uploads/products";
pub const DEFAULT_UPLOAD_BASE: &str = "storage/uploads";

/// Everything a tool needs to know about the image store. Passed explicitly to
/// each component; nothing is derived from the working directory after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub root: PathBuf,
    pub catalog_db: String,
    pub canonical_extension: String,
    pub legacy_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub url_prefix: String,
    pub upload_base: PathBuf,
    pub converter_program: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            catalog_db: DEFAULT_CATALOG_DB.to_string(),
            canonical_extension: "png".to_string(),
            legacy_extensions: to_strings(&["jpg", "jpeg", "heic"]),
            image_extensions: to_strings(&["jpg", "jpeg", "png", "gif", "heic", "webp"]),
            ignore_patterns: Vec::new(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
            upload_base: PathBuf::from(DEFAULT_UPLOAD_BASE),
            converter_program: "magick".to_string(),
        }
    }
}

impl AppConfig {
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.root = root.as_ref().to_path_buf();
        self
    }

    /// Canonical extension, lower-cased and without a leading dot.
    pub fn canonical_extension(&self) -> String {
        clean_extension(&self.canonical_extension)
    }

    pub fn is_legacy(&self, extension: &str) -> bool {
        let extension = clean_extension(extension);
        extension != self.canonical_extension()
            && self
                .legacy_extensions
                .iter()
                .any(|e| clean_extension(e) == extension)
    }

    pub fn is_image(&self, extension: &str) -> bool {
        let extension = clean_extension(extension);
        extension == self.canonical_extension()
            || self
                .image_extensions
                .iter()
                .chain(self.legacy_extensions.iter())
                .any(|e| clean_extension(e) == extension)
    }
}

/// Layered load: built-in defaults, then `AssetSync.{toml,yaml,json}` if
/// present, then `ASSET_SYNC_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let builder = Config::builder()
        .set_default("root", DEFAULT_ROOT)?
        .set_default("catalog_db", defaults.catalog_db)?
        .set_default("canonical_extension", defaults.canonical_extension)?
        .set_default("legacy_extensions", defaults.legacy_extensions)?
        .set_default("image_extensions", defaults.image_extensions)?
        .set_default("ignore_patterns", Vec::<String>::new())?
        .set_default("url_prefix", defaults.url_prefix)?
        .set_default("upload_base", DEFAULT_UPLOAD_BASE)?
        .set_default("converter_program", defaults.converter_program)?
        .add_source(ConfigFile::with_name("AssetSync").required(false))
        .add_source(
            Environment::with_prefix("ASSET_SYNC")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("legacy_extensions")
                .with_list_parse_key("image_extensions")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

fn clean_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extension_sets() {
        let config = AppConfig::default();
        assert!(config.is_legacy("jpg"));
        assert!(config.is_legacy(".JPEG"));
        assert!(config.is_legacy("HEIC"));
        assert!(!config.is_legacy("png"));
        assert!(!config.is_legacy("webp"));
    }

    #[test]
    fn test_canonical_extension_is_never_legacy() {
        let config = AppConfig {
            canonical_extension: ".PNG".to_string(),
            legacy_extensions: to_strings(&["png", "jpg"]),
            ..AppConfig::default()
        };
        assert_eq!(config.canonical_extension(), "png");
        assert!(!config.is_legacy("png"));
        assert!(config.is_legacy("jpg"));
    }

    #[test]
    fn test_is_image_covers_legacy_and_canonical() {
        let config = AppConfig {
            image_extensions: Vec::new(),
            ..AppConfig::default()
        };
        assert!(config.is_image("heic"));
        assert!(config.is_image("png"));
        assert!(!config.is_image("txt"));
    }

    #[test]
    fn test_load_configuration_defaults() {
        let config = load_configuration().unwrap();
        assert_eq!(config.root, PathBuf::from(DEFAULT_ROOT));
        assert_eq!(config.canonical_extension(), "png");
        assert_eq!(config.url_prefix, DEFAULT_URL_PREFIX);
    }
}
