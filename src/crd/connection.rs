//! # Connection Detail Declarations
//!
//! Template-level declarations describing which connection details a composed
//! resource contributes to its composite.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a connection detail value is sourced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, schemars::JsonSchema)]
pub enum ConnectionDetailType {
    /// Copied from a key of the composed resource's connection secret
    FromConnectionSecretKey,
    /// Read from a field path of the composed resource
    FromFieldPath,
    /// A literal value from the template
    FromValue,
    /// None or several sources are set, or an unrecognised type was declared
    #[serde(other)]
    Unknown,
}

impl ConnectionDetailType {
    /// Get the API string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionDetailType::FromConnectionSecretKey => "FromConnectionSecretKey",
            ConnectionDetailType::FromFieldPath => "FromFieldPath",
            ConnectionDetailType::FromValue => "FromValue",
            ConnectionDetailType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConnectionDetailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single connection detail declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetail {
    /// Key the value is published under. Defaults to the source key for
    /// `FromConnectionSecretKey` declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Explicit source type; inferred from the populated source field when unset
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub detail_type: Option<ConnectionDetailType>,
    /// Key in the composed resource's connection secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_connection_secret_key: Option<String>,
    /// Field path of the composed resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_field_path: Option<String>,
    /// Literal value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ConnectionDetail {
    /// Declaration copying `key` from the connection secret, optionally renamed
    #[must_use]
    pub fn from_secret_key(key: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            name: name.map(ToString::to_string),
            detail_type: Some(ConnectionDetailType::FromConnectionSecretKey),
            from_connection_secret_key: Some(key.into()),
            ..Self::default()
        }
    }

    /// The type this declaration is treated as.
    ///
    /// An explicit `type` always wins. Otherwise the type is inferred from the
    /// single populated source field; zero or several populated fields yield
    /// [`ConnectionDetailType::Unknown`].
    #[must_use]
    pub fn effective_type(&self) -> ConnectionDetailType {
        if let Some(t) = self.detail_type {
            return t;
        }

        let sources = [
            (self.value.is_some(), ConnectionDetailType::FromValue),
            (
                self.from_connection_secret_key.is_some(),
                ConnectionDetailType::FromConnectionSecretKey,
            ),
            (self.from_field_path.is_some(), ConnectionDetailType::FromFieldPath),
        ];

        let mut set = sources.iter().filter(|(present, _)| *present);
        match (set.next(), set.next()) {
            (Some((_, t)), None) => *t,
            _ => ConnectionDetailType::Unknown,
        }
    }
}

/// Describes how one composed resource is created and which connection
/// details it contributes
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComposedTemplate {
    /// Optional template name, unique within a composition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Base object the composed resource is rendered from
    #[serde(default)]
    pub base: serde_json::Value,
    /// Connection details this composed resource exposes
    #[serde(default)]
    pub connection_details: Vec<ConnectionDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_type_wins() {
        let detail = ConnectionDetail {
            detail_type: Some(ConnectionDetailType::FromValue),
            from_connection_secret_key: Some("user".to_string()),
            ..ConnectionDetail::default()
        };
        assert_eq!(detail.effective_type(), ConnectionDetailType::FromValue);
    }

    #[test]
    fn test_type_inferred_from_single_source() {
        let detail = ConnectionDetail {
            from_field_path: Some("status.endpoint".to_string()),
            ..ConnectionDetail::default()
        };
        assert_eq!(detail.effective_type(), ConnectionDetailType::FromFieldPath);

        let detail = ConnectionDetail {
            from_connection_secret_key: Some("password".to_string()),
            ..ConnectionDetail::default()
        };
        assert_eq!(
            detail.effective_type(),
            ConnectionDetailType::FromConnectionSecretKey
        );
    }

    #[test]
    fn test_ambiguous_or_empty_is_unknown() {
        assert_eq!(
            ConnectionDetail::default().effective_type(),
            ConnectionDetailType::Unknown
        );

        let detail = ConnectionDetail {
            value: Some("5432".to_string()),
            from_field_path: Some("spec.port".to_string()),
            ..ConnectionDetail::default()
        };
        assert_eq!(detail.effective_type(), ConnectionDetailType::Unknown);
    }

    #[test]
    fn test_deserialize_template() {
        let template: ComposedTemplate = serde_json::from_value(serde_json::json!({
            "name": "db",
            "base": {"apiVersion": "database.example.org/v1", "kind": "Instance"},
            "connectionDetails": [
                {"type": "FromConnectionSecretKey", "fromConnectionSecretKey": "user", "name": "username"},
                {"type": "SomethingNew"},
                {"value": "5432", "name": "port"}
            ]
        }))
        .expect("template should deserialize");

        assert_eq!(template.connection_details.len(), 3);
        assert_eq!(
            template.connection_details[0],
            ConnectionDetail::from_secret_key("user", Some("username"))
        );
        assert_eq!(
            template.connection_details[1].effective_type(),
            ConnectionDetailType::Unknown
        );
        assert_eq!(
            template.connection_details[2].effective_type(),
            ConnectionDetailType::FromValue
        );
    }
}
