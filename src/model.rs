//! Plain data types exchanged with the store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display name used when a header row carries no name attribute.
pub const DEFAULT_LIST_NAME: &str = "רשימה";

/// Length of generated list id tokens.
const LIST_ID_LEN: usize = 8;

/// Generate a short random list id token (8 lowercase hex characters).
///
/// Matches the id shape found in existing stored data. Collisions are
/// guarded against by the conditional create, not by the generator.
#[must_use]
pub fn new_list_id() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(LIST_ID_LEN);
    token
}

/// A list as returned by enumeration: id and display name only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
    /// Opaque list identifier.
    pub list_id: String,
    /// Display name.
    pub name: String,
}

/// One entry of a list.
///
/// Item identity is positional within its list; there is no stable
/// per-item id beyond text and checked state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Entry text.
    pub text: String,
    /// Whether the entry is ticked off.
    pub is_checked: bool,
}

impl ListItem {
    /// Create an item.
    #[must_use]
    pub fn new(text: impl Into<String>, is_checked: bool) -> Self {
        Self {
            text: text.into(),
            is_checked,
        }
    }

    /// Whether the item would be dropped on save (empty or
    /// whitespace-only text).
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Full content of one list: ownership, display name and ordered items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListContent {
    /// Owning user.
    pub user_id: String,
    /// Opaque list identifier.
    pub list_id: String,
    /// Display name.
    pub name: String,
    /// Items in list order.
    pub items: Vec<ListItem>,
}

impl ListContent {
    /// Create an empty list with the default display name.
    #[must_use]
    pub fn new(user_id: impl Into<String>, list_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            list_id: list_id.into(),
            name: DEFAULT_LIST_NAME.to_string(),
            items: Vec::new(),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Append an entry, trimming surrounding whitespace.
    ///
    /// Blank text is ignored.
    pub fn push_item(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.items.push(ListItem::new(text, false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_list_id_shape() {
        let id = new_list_id();
        assert_eq!(id.len(), LIST_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_list_id(), id);
    }

    #[test]
    fn test_push_item_trims_and_skips_blank() {
        let mut list = ListContent::new("u1", "l1");
        list.push_item("  Milk ");
        list.push_item("");
        list.push_item("   ");
        assert_eq!(list.items, vec![ListItem::new("Milk", false)]);
    }

    #[test]
    fn test_default_name() {
        let list = ListContent::new("u1", "l1");
        assert_eq!(list.name, DEFAULT_LIST_NAME);
        let named = list.with_name("שבת");
        assert_eq!(named.name, "שבת");
    }

    #[test]
    fn test_is_blank() {
        assert!(ListItem::new("", false).is_blank());
        assert!(ListItem::new(" \t", true).is_blank());
        assert!(!ListItem::new("Eggs", false).is_blank());
    }
}
