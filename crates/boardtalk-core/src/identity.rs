use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub handle: String,
    pub display_name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Identity {
    /// Case-insensitive substring match over handle, display name and full
    /// name. An empty query matches every identity.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        if self.handle.to_lowercase().contains(&q) {
            return true;
        }
        if self.display_name.to_lowercase().contains(&q) {
            return true;
        }
        self.full_name
            .as_deref()
            .is_some_and(|f| f.to_lowercase().contains(&q))
    }
}
