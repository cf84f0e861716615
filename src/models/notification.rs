use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Default,
    Destructive,
}

/// A dismissible toast shown by the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub variant: Variant,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn info(title: &str, description: &str) -> Self {
        Notification {
            variant: Variant::Default,
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    pub fn failure(description: &str) -> Self {
        Notification {
            variant: Variant::Destructive,
            title: "Failed".to_string(),
            description: description.to_string(),
        }
    }
}
