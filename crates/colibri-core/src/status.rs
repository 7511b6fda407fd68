use serde::{Deserialize, Serialize};

/// Lifecycle status of a catalog entry.
///
/// `Draft` doubles as the soft-removal state: entries that disappear from
/// the upstream feed are drafted, never deleted, so history and identifiers
/// survive a later reappearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Published,
    Draft,
}

impl ProductStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Published => "published",
            ProductStatus::Draft => "draft",
        }
    }

    /// Parse a stored status string. Unknown values map to `Draft` — an
    /// entry whose status we cannot interpret must not be sellable.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "published" => ProductStatus::Published,
            _ => ProductStatus::Draft,
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural kind of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Simple,
    Variable,
}

impl ProductKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductKind::Simple => "simple",
            ProductKind::Variable => "variable",
        }
    }

    /// Parse a stored kind string. Unknown values map to `Simple`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "variable" => ProductKind::Variable,
            _ => ProductKind::Simple,
        }
    }
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
