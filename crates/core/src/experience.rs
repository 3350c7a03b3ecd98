use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One of the nine essentials, as presented in a given language.
///
/// The `id` space (1..=9) is shared across languages; only the text differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principle {
    pub id: u32,
    pub title: String,
    pub description: String,
    /// Detailed definition used to ground the generation prompt.
    pub context_text: String,
}

/// A short guided micro-experience produced for a principle.
///
/// The derived JSON schema doubles as the response schema sent to the
/// text-generation endpoint, so the three fields are all required strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedExperience {
    /// Experience title.
    pub title: String,
    /// Step by step instructions for the experience.
    pub content: String,
    /// Estimated duration.
    pub duration: String,
}
