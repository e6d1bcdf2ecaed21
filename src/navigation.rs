// Navigation manifest and the visibility filter. The filter is a UX
// convenience only; route guards remain the access boundary, so an item
// that somehow renders while excluded still cannot reach protected content.

use serde::{Deserialize, Serialize};

use crate::session::{Role, Session};

/// One entry of the static navigation manifest. Built at compile/boot
/// time, immutable at runtime, rendered in manifest order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationItem {
    pub label: String,
    pub path: String,
    /// `None` means visible to any session state, authenticated or not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_role: Option<Role>,
}

impl NavigationItem {
    pub fn public(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            required_role: None,
        }
    }

    pub fn for_role(label: impl Into<String>, path: impl Into<String>, role: Role) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            required_role: Some(role),
        }
    }
}

/// Derive the visible subset of the manifest for a session. Excluded items
/// are omitted entirely, never rendered disabled. Output preserves
/// manifest order.
pub fn visible_items<'a>(manifest: &'a [NavigationItem], session: &Session) -> Vec<&'a NavigationItem> {
    manifest
        .iter()
        .filter(|item| match item.required_role {
            None => true,
            Some(required) => session.is_authenticated && session.role == Some(required),
        })
        .collect()
}
