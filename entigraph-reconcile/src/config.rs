//! Configuration for graph operations.

use entigraph_types::EntityId;
use serde::{Deserialize, Serialize};

/// Tunables shared by reconcile, attach and duplicate.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Value-map key carrying the identity token.
    #[serde(default = "default_id_key")]
    pub id_key: String,
    /// Value-map key carrying the version token.
    #[serde(default = "default_version_key")]
    pub version_key: String,
    /// Appended to unique text properties of a duplicate. `{id}` expands to
    /// the source entity's identity.
    #[serde(default = "default_copy_suffix")]
    pub copy_suffix: String,
    /// Point duplicated one-to-many elements at the new owner rather than
    /// at the entity they were copied from.
    #[serde(default = "default_bind_duplicated_children")]
    pub bind_duplicated_children: bool,
}

fn default_id_key() -> String {
    "id".to_string()
}

fn default_version_key() -> String {
    "version".to_string()
}

fn default_copy_suffix() -> String {
    " Copy ({id})".to_string()
}

fn default_bind_duplicated_children() -> bool {
    true
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            id_key: default_id_key(),
            version_key: default_version_key(),
            copy_suffix: default_copy_suffix(),
            bind_duplicated_children: default_bind_duplicated_children(),
        }
    }
}

impl GraphConfig {
    /// Parses a config from TOML, filling unset fields with defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Renders the disambiguated value of a unique text property.
    ///
    /// Without a source identity the `({id})` group is dropped.
    pub fn copy_label(&self, original: &str, source_id: Option<EntityId>) -> String {
        let suffix = match source_id {
            Some(id) => self.copy_suffix.replace("{id}", &id.to_string()),
            None => self
                .copy_suffix
                .replace("({id})", "")
                .replace("{id}", "")
                .trim_end()
                .to_string(),
        };
        format!("{original}{suffix}")
    }
}
