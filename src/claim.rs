use serde::{Deserialize, Serialize};

/// Ownership of one grid pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub username: String,
    pub content: String,
    pub id: f64,
}

impl Claim {
    pub fn new<U: Into<String>, C: Into<String>>(username: U, content: C, id: f64) -> Self {
        Self {
            username: username.into(),
            content: content.into(),
            id,
        }
    }

    /// The zero tuple decodes as an empty slot.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.content.is_empty() && self.username.is_empty() && self.id == 0.0
    }
}
