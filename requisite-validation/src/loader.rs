// Rule set collection file loaders

use crate::{RequirementsError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Suffix shared by every collection file name (`route.req.json`)
pub const COLLECTION_SUFFIX: &str = "req";

/// Supported collection file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    /// Formats tried, in order, when looking a collection up
    pub const ALL: [FileFormat; 2] = [FileFormat::Json, FileFormat::Toml];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Json => "json",
            FileFormat::Toml => "toml",
        }
    }
}

/// Collection file loader
pub struct RuleLoader {
    format: FileFormat,
}

impl RuleLoader {
    pub fn new(format: FileFormat) -> Self {
        Self { format }
    }

    /// Auto-detect format from file extension
    pub fn auto(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or_default();
        let format = FileFormat::from_extension(ext).ok_or_else(|| RequirementsError::Load {
            path: path.to_path_buf(),
            reason: format!("unsupported format: {ext:?}"),
        })?;

        Ok(Self::new(format))
    }

    /// Load a collection from file. The root must be an object.
    pub fn load_file(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path).map_err(|e| RequirementsError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let value = self.parse(&content).map_err(|reason| RequirementsError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;

        if value.is_object() {
            Ok(value)
        } else {
            Err(RequirementsError::Parse {
                path: path.to_path_buf(),
                reason: "collection root must be an object".to_string(),
            })
        }
    }

    /// Parse collection text; key order is kept
    pub fn parse(&self, content: &str) -> std::result::Result<Value, String> {
        match self.format {
            FileFormat::Json => {
                serde_json::from_str(content).map_err(|e| format!("JSON parse error: {}", e))
            }
            FileFormat::Toml => {
                let toml_value: toml::Value =
                    toml::from_str(content).map_err(|e| format!("TOML parse error: {}", e))?;
                serde_json::to_value(toml_value)
                    .map_err(|e| format!("TOML to JSON conversion error: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_keeps_order() {
        let loader = RuleLoader::new(FileFormat::Json);
        let value = loader
            .parse(r#"{"get": {"zeta": {"isInt": true}, "alpha": {"isAlpha": true}}}"#)
            .unwrap();

        let keys: Vec<_> = value["get"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn test_parse_toml_keeps_order() {
        let loader = RuleLoader::new(FileFormat::Toml);
        let value = loader
            .parse(
                r#"
                [list.zeta]
                isInt = { errorMessage = "%@_must_be_integer", errorCode = 422 }

                [list.alpha]
                required = true
                "#,
            )
            .unwrap();

        let keys: Vec<_> = value["list"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
        assert_eq!(value["list"]["zeta"]["isInt"]["errorCode"], 422);
    }

    #[test]
    fn test_parse_errors() {
        assert!(RuleLoader::new(FileFormat::Json).parse("{oops").is_err());
        assert!(RuleLoader::new(FileFormat::Toml).parse("= nope").is_err());
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("TOML"), Some(FileFormat::Toml));
        assert_eq!(FileFormat::from_extension("js"), None);
        assert!(RuleLoader::auto(Path::new("routes/route.req.toml")).is_ok());
        assert!(RuleLoader::auto(Path::new("routes/route.req")).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = RuleLoader::new(FileFormat::Json).load_file(Path::new("/nonexistent/route.req.json"));
        assert!(matches!(result, Err(RequirementsError::Load { .. })));
    }
}
