//! Newtype wrappers for asset references.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A reference to a raster asset embedded in a ticket (background image or
/// QR code): either a provider path such as `images/bg.jpg` or a `data:` URI.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(Arc<str>);

impl AssetRef {
    pub fn new(reference: impl Into<Arc<str>>) -> Self {
        Self(reference.into())
    }

    /// Builds a reference from optional form input, treating blank text as absent.
    pub fn from_input(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        (!trimmed.is_empty()).then(|| Self::new(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// A short form for log lines; data URIs can be megabytes long.
    pub fn display_name(&self) -> String {
        if self.is_data_uri() {
            let header = self.0.split(',').next().unwrap_or("data:");
            format!("{},<{} bytes>", header, self.0.len())
        } else {
            self.0.to_string()
        }
    }
}

impl From<String> for AssetRef {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for AssetRef {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for AssetRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_absent() {
        assert!(AssetRef::from_input("   ").is_none());
        assert_eq!(
            AssetRef::from_input(" bg.png ").unwrap().as_str(),
            "bg.png"
        );
    }

    #[test]
    fn data_uri_display_is_truncated() {
        let asset = AssetRef::new("data:image/png;base64,AAAAAAAAAAAA");
        assert!(asset.is_data_uri());
        assert_eq!(asset.display_name(), "data:image/png;base64,<34 bytes>");
    }

    #[test]
    fn hash_map_usage() {
        use std::collections::HashMap;

        let mut assets = HashMap::new();
        assets.insert(AssetRef::new("qr.png"), 1);
        assert_eq!(assets.get(&AssetRef::from("qr.png")), Some(&1));
    }
}
