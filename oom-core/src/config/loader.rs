use std::collections::HashMap;
use std::path::Path;

use super::value::ConfigValue;
use super::ConfigError;

/// Load a YAML file into `values`. A missing file contributes nothing.
pub(crate) fn load_yaml_file(
    path: &Path,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    if !path.exists() {
        tracing::trace!(path = %path.display(), "Config file absent");
        return Ok(());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
    load_yaml_str(&content, values)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))
}

/// Export a `.env` file into the process environment. Variables already set win.
pub(crate) fn load_dotenv(path: &Path) -> Result<(), ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::trace!(path = %path.display(), "Dotenv file absent");
            Ok(())
        }
        Err(e) => Err(ConfigError::Load(format!("{}: {e}", path.display()))),
    }
}

pub(crate) fn load_yaml_str(
    content: &str,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    flatten("", &yaml, values);
    Ok(())
}

/// Flatten a YAML tree into dot-separated keys.
///
/// Sequences are stored whole under their key; scalars inside them are also
/// stored as `key.0`, `key.1`, ... so a single element can be overridden.
fn flatten(prefix: &str, value: &serde_yaml::Value, out: &mut HashMap<String, ConfigValue>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let segment = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => format!("{other:?}"),
                };
                let key = if prefix.is_empty() {
                    segment
                } else {
                    format!("{prefix}.{segment}")
                };
                flatten(&key, v, out);
            }
        }
        serde_yaml::Value::Sequence(items) if !prefix.is_empty() => {
            out.insert(
                prefix.to_string(),
                ConfigValue::List(items.iter().map(ConfigValue::from_yaml).collect()),
            );
            for (i, item) in items.iter().enumerate() {
                flatten(&format!("{prefix}.{i}"), item, out);
            }
        }
        leaf if !prefix.is_empty() => {
            out.insert(prefix.to_string(), ConfigValue::from_yaml(leaf));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_nested_backends() {
        let yaml = "oom:\n  backends: [mysql, sqlite]\n  sqlite:\n    url: \"sqlite::memory:\"\n";
        let mut values = HashMap::new();
        load_yaml_str(yaml, &mut values).unwrap();
        assert!(matches!(values.get("oom.backends"), Some(ConfigValue::List(l)) if l.len() == 2));
        assert!(matches!(values.get("oom.backends.1"), Some(ConfigValue::String(s)) if s == "sqlite"));
        assert!(matches!(values.get("oom.sqlite.url"), Some(ConfigValue::String(s)) if s == "sqlite::memory:"));
    }

    #[test]
    fn test_invalid_yaml_is_a_load_error() {
        let mut values = HashMap::new();
        assert!(matches!(
            load_yaml_str("oom: [unclosed", &mut values),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let mut values = HashMap::new();
        load_yaml_file(Path::new("does-not-exist.yaml"), &mut values).unwrap();
        assert!(values.is_empty());
    }
}
