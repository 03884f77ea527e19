use crate::Id;
use serde::{Deserialize, Serialize};

/// Whether an item still needs to be bought.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Open,
    Checked,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "OPEN",
            Status::Checked => "CHECKED",
        }
    }
}

/// A shopping list item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Assigned by the store, `0` on create requests.
    #[serde(default)]
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub status: Status,
    /// Position in the list, lower comes first.
    #[serde(default)]
    pub orderno: i64,
}

impl Model {
    /// Returns the reasons this item can not be stored, if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("Title is missing".to_string());
        }
        if self.id < 0 {
            errors.push(format!("Id {} is negative", self.id));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
