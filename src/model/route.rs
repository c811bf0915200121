use serde::{Deserialize, Serialize};

/// One API endpoint's worth of desired behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// Human-facing route name, e.g. `"Create User"`.
    pub name: String,
    /// HTTP path, e.g. `"/users"`.
    #[serde(default)]
    pub path: String,
    /// Name of the endpoint handler the compiled function backs.
    #[serde(default)]
    pub endpoint_name: String,
    #[serde(default)]
    pub description: String,
}

impl RouteSpec {
    pub fn new(name: impl Into<String>, endpoint_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint_name: endpoint_name.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The name of the synthesized function backing this route.
    ///
    /// Spaces and hyphens become underscores, slashes are dropped, and the result is
    /// lowercased and suffixed with `_request`.
    pub fn function_name(&self) -> String {
        let base = self
            .name
            .replace([' ', '-'], "_")
            .replace('/', "")
            .trim()
            .to_lowercase();
        format!("{}_request", base)
    }
}
