use serde::{Deserialize, Serialize};

use crate::error::DedupError;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Per-source deduplication settings.
///
/// `identity_field` names the column whose value groups rows believed to
/// describe the same entity. It differs per source schema (a national
/// identifier in one, a full-name column in another).
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub identity_field: String,
    #[serde(default)]
    pub absent_keys: AbsentKeyPolicy,
    /// Raw text cells that mean "no value". An empty string is only
    /// treated as absent when listed here explicitly.
    #[serde(default = "default_absent_markers")]
    pub absent_markers: Vec<String>,
}

fn default_name() -> String {
    "default".into()
}

fn default_absent_markers() -> Vec<String> {
    vec!["None".into()]
}

/// How rows whose identity value is absent are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentKeyPolicy {
    /// Each absent-key row is a group of its own.
    #[default]
    Isolate,
    /// All absent-key rows share one group and may be merged together.
    Group,
}

impl std::fmt::Display for AbsentKeyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Isolate => write!(f, "isolate"),
            Self::Group => write!(f, "group"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ProfileConfig {
    pub fn new(identity_field: impl Into<String>) -> Self {
        Self {
            name: default_name(),
            identity_field: identity_field.into(),
            absent_keys: AbsentKeyPolicy::default(),
            absent_markers: default_absent_markers(),
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, DedupError> {
        let config: ProfileConfig =
            toml::from_str(input).map_err(|e| DedupError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DedupError> {
        if self.identity_field.trim().is_empty() {
            return Err(DedupError::ConfigValidation(format!(
                "profile '{}': identity_field must not be empty",
                self.name
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_profile() {
        let config = ProfileConfig::from_toml(r#"identity_field = "NATIONAL_ID""#).unwrap();
        assert_eq!(config.name, "default");
        assert_eq!(config.identity_field, "NATIONAL_ID");
        assert_eq!(config.absent_keys, AbsentKeyPolicy::Isolate);
        assert_eq!(config.absent_markers, vec!["None"]);
    }

    #[test]
    fn parse_full_profile() {
        let input = r#"
name = "branch-north"
identity_field = "FULL_NAME"
absent_keys = "group"
absent_markers = ["None", "NULL", ""]
"#;
        let config = ProfileConfig::from_toml(input).unwrap();
        assert_eq!(config.name, "branch-north");
        assert_eq!(config.absent_keys, AbsentKeyPolicy::Group);
        assert_eq!(config.absent_markers.len(), 3);
    }

    #[test]
    fn reject_blank_identity_field() {
        let err = ProfileConfig::from_toml(r#"identity_field = "  ""#).unwrap_err();
        assert!(err.to_string().contains("identity_field must not be empty"));
    }

    #[test]
    fn reject_missing_identity_field() {
        let err = ProfileConfig::from_toml(r#"name = "x""#).unwrap_err();
        assert!(matches!(err, DedupError::ConfigParse(_)));
    }

    #[test]
    fn reject_unknown_policy() {
        let input = r#"
identity_field = "id"
absent_keys = "merge"
"#;
        assert!(ProfileConfig::from_toml(input).is_err());
    }
}
