//! Model identifier value object

use serde::{Deserialize, Serialize};

/// Capability suffix the gateway understands for web-search-enabled
/// queries. Appending it routes the request through the gateway's
/// search-augmented variant of the same model.
pub const WEB_SEARCH_SUFFIX: &str = ":online";

/// Identifier for one LLM on the gateway (Value Object)
///
/// An opaque string in the gateway's `provider/model-name` form, optionally
/// carrying a capability suffix. Equality is exact string match; the id is
/// usable both as a map key and as a value.
///
/// # Example
///
/// ```
/// use council_domain::ModelId;
///
/// let model = ModelId::new("anthropic/claude-opus-4.5");
/// assert_eq!(model.provider(), Some("anthropic"));
/// assert_eq!(model.with_web_search().as_str(), "anthropic/claude-opus-4.5:online");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Create a new model identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string form of this identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the provider prefix (the part before the first `/`), if any
    pub fn provider(&self) -> Option<&str> {
        self.0.split_once('/').map(|(provider, _)| provider)
    }

    /// Whether this identifier already carries the web-search suffix
    pub fn has_web_search(&self) -> bool {
        self.0.ends_with(WEB_SEARCH_SUFFIX)
    }

    /// Return this identifier with the web-search suffix applied.
    ///
    /// Idempotent: applying it to an already-suffixed identifier returns
    /// the identifier unchanged, never a double suffix.
    pub fn with_web_search(&self) -> ModelId {
        if self.has_web_search() {
            self.clone()
        } else {
            ModelId(format!("{}{}", self.0, WEB_SEARCH_SUFFIX))
        }
    }

    /// Return this identifier with the web-search suffix removed, if
    /// present. The catalog lists base ids only.
    pub fn strip_web_search(&self) -> ModelId {
        match self.0.strip_suffix(WEB_SEARCH_SUFFIX) {
            Some(base) => ModelId::new(base),
            None => self.clone(),
        }
    }

    /// Consume and return the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ModelId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ModelId::new(s))
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        ModelId::new(s)
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        ModelId::new(s)
    }
}
