use std::collections::BTreeMap;
use thiserror::Error;

pub type RelationsResult<T> = Result<T, RelationsError>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RelationsError {
    /// A wire node matched none of the known relation node shapes.
    #[error("unknown filter relations node: {node}")]
    UnknownRelationsNode { node: String },
    #[error("broken filter relations model: {0}")]
    BrokenFilterRelationsModel(String),
    #[error("unknown filter {filter_guid} in filter relations")]
    UnknownFilterInFilterRelations { filter_guid: String },
    #[error("cascading filter not found for levels [{}]", .level_guids.join(", "))]
    CascadingFilterNotFound { level_guids: Vec<String> },
}

impl RelationsError {
    pub(crate) fn unknown_node(node: &serde_json::Value) -> Self {
        RelationsError::UnknownRelationsNode {
            node: describe_node(node),
        }
    }

    pub(crate) fn broken_model(node: &serde_json::Value) -> Self {
        RelationsError::BrokenFilterRelationsModel(format!(
            "unable to convert node {}",
            describe_node(node)
        ))
    }

    /// Machine-readable key for errors that can surface to users (stale or mismatched server
    /// data). Structural corruption has no key.
    pub fn translation_key(&self) -> Option<&'static str> {
        match self {
            RelationsError::UnknownFilterInFilterRelations { .. } => {
                Some("errors.unknownFilterInFilterRelations")
            }
            RelationsError::CascadingFilterNotFound { .. } => {
                Some("errors.cascadingFilterNotFound")
            }
            RelationsError::UnknownRelationsNode { .. }
            | RelationsError::BrokenFilterRelationsModel(_) => None,
        }
    }

    /// Interpolation data accompanying [`Self::translation_key`].
    pub fn interpolation(&self) -> BTreeMap<&'static str, String> {
        let mut out = BTreeMap::new();
        match self {
            RelationsError::UnknownFilterInFilterRelations { filter_guid } => {
                out.insert("filterGuid", filter_guid.clone());
            }
            RelationsError::CascadingFilterNotFound { level_guids } => {
                out.insert("levelGuids", level_guids.join(", "));
            }
            RelationsError::UnknownRelationsNode { .. }
            | RelationsError::BrokenFilterRelationsModel(_) => {}
        }
        out
    }

    pub fn is_translatable(&self) -> bool {
        self.translation_key().is_some()
    }
}

fn describe_node(node: &serde_json::Value) -> String {
    const MAX_LEN: usize = 120;
    let mut out = node.to_string();
    if out.len() > MAX_LEN {
        let mut end = MAX_LEN;
        while !out.is_char_boundary(end) {
            end -= 1;
        }
        out.truncate(end);
        out.push('…');
    }
    out
}
