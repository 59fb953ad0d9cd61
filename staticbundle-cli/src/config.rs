use std::{fs, path::Path, str::FromStr};

use staticbundle::{BundleConfig, Error, SourceSetConfig};

/// Encodings a bundle config file may use, picked by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl FromStr for ConfigFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toml" => Ok(ConfigFormat::Toml),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            other => Err(format!(
                "Unknown config format: '{}'. Supported formats: toml, yaml, json",
                other
            )),
        }
    }
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| format!("Cannot infer config format of '{}'", path.display()))?;
        extension.parse()
    }
}

/// Parses a bundle config: a table of source-set name → source-set settings.
///
/// ```toml
/// [main]
/// message_source_class_name = "i18n::Messages"
///
/// [[main.locales]]
/// plural_forms = 2
/// plural_function = "n == 1 ? 0 : 1"
///
/// [[main.locales]]
/// locale = "fr"
/// plural_forms = 2
/// plural_function = "n > 1 ? 1 : 0"
/// ```
pub fn parse_bundle_config(content: &str, format: ConfigFormat) -> Result<BundleConfig, Error> {
    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| Error::config_error(e.to_string())),
        ConfigFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| Error::config_error(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| Error::config_error(e.to_string()))
        }
    }
}

pub fn load_bundle_config(path: &Path, format: Option<ConfigFormat>) -> Result<BundleConfig, Error> {
    let format = match format {
        Some(format) => format,
        None => ConfigFormat::from_path(path).map_err(Error::config_error)?,
    };
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config_error(format!("Cannot read config file '{}': {}", path.display(), e))
    })?;
    parse_bundle_config(&content, format).map_err(|e| match e {
        Error::Config(message) => Error::config_error(format!(
            "Invalid config file '{}': {}",
            path.display(),
            message
        )),
        other => other,
    })
}

/// Restricts `config` to the `selected` source sets; all of them when empty.
pub fn select_source_sets(
    mut config: BundleConfig,
    selected: &[String],
) -> Result<Vec<(String, SourceSetConfig)>, Error> {
    if config.is_empty() {
        return Err(Error::config_error("Config file declares no source sets"));
    }
    if selected.is_empty() {
        return Ok(config.into_iter().collect());
    }

    let mut out = Vec::with_capacity(selected.len());
    for name in selected {
        let source_set = config.remove(name).ok_or_else(|| {
            Error::config_error(format!(
                "Unknown source set '{}'. Declared source sets: {}",
                name,
                config.keys().cloned().collect::<Vec<_>>().join(", ")
            ))
        })?;
        out.push((name.clone(), source_set));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use staticbundle::Naming;
    use std::path::PathBuf;

    const TOML: &str = r#"
        [main]
        message_source_class_name = "i18n::Messages"
        naming = "snake_case"

        [[main.locales]]
        plural_forms = 2
        plural_function = "n == 1 ? 0 : 1"

        [[main.locales]]
        locale = "fr"
        plural_forms = 2
        plural_function = "n > 1 ? 1 : 0"

        [admin]
        messageSourceClassName = "admin::Texts"
        resourceFilenameFormat = "texts{locale}.properties"
        fallback = { allow_missing_keys = false }

        [[admin.locales]]
        pluralForms = 1
        pluralFunction = "0"
    "#;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(&PathBuf::from("a.toml")), Ok(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_path(&PathBuf::from("a.YML")), Ok(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path(&PathBuf::from("a.json")), Ok(ConfigFormat::Json));
        assert!(ConfigFormat::from_path(&PathBuf::from("a.ini")).is_err());
        assert!(ConfigFormat::from_path(&PathBuf::from("bundle")).is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config = parse_bundle_config(TOML, ConfigFormat::Toml).unwrap();
        let names: Vec<&str> = config.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["admin", "main"]);

        let main = &config["main"];
        assert_eq!(main.naming, Naming::SnakeCase);
        assert_eq!(main.locales.len(), 2);
        assert!(main.locales[0].is_root());

        let admin = &config["admin"];
        assert_eq!(admin.resource_filename_format, "texts{locale}.properties");
        assert!(!admin.fallback.allow_missing_keys);
        assert!(admin.fallback.allow_missing_files);
    }

    #[test]
    fn test_parse_yaml_and_json() {
        let yaml = r#"
main:
  message_source_class_name: Messages
  content_transformer: collapse-whitespace
  locales:
    - plural_forms: 2
      plural_function: "n != 1"
"#;
        let config = parse_bundle_config(yaml, ConfigFormat::Yaml).unwrap();
        assert!(config["main"].content_transformer.is_some());

        let json = r#"{ "main": { "message_source_class_name": "Messages", "locales": [] } }"#;
        let config = parse_bundle_config(json, ConfigFormat::Json).unwrap();
        assert!(config["main"].locales.is_empty());
    }

    #[test]
    fn test_select_source_sets() {
        let config = parse_bundle_config(TOML, ConfigFormat::Toml).unwrap();
        let all = select_source_sets(config.clone(), &[]).unwrap();
        assert_eq!(all.len(), 2);

        let one = select_source_sets(config.clone(), &["main".to_string()]).unwrap();
        assert_eq!(one[0].0, "main");

        let err = select_source_sets(config, &["nope".to_string()]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Unknown source set 'nope'"));
        assert!(err.to_string().contains("admin, main"));

        let empty = select_source_sets(BundleConfig::new(), &[]).unwrap_err();
        assert_eq!(
            empty.to_string(),
            "invalid configuration: Config file declares no source sets"
        );
    }

    #[test]
    fn test_load_reports_config_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bundle.toml");
        fs::write(&path, "[main]\nlocales = 3\n").unwrap();

        let err = load_bundle_config(&path, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let message = err.to_string();
        assert!(message.starts_with("invalid configuration: Invalid config file"), "{}", message);
        assert!(message.contains("bundle.toml"));

        let missing = load_bundle_config(&dir.path().join("absent.json"), None).unwrap_err();
        assert!(missing.to_string().contains("Cannot read config file"));
    }
}
