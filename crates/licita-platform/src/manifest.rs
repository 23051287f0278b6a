//! Extension manifest.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Storage,
    Downloads,
    Tabs,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Downloads => "downloads",
            Self::Tabs => "tabs",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "storage" => Some(Self::Storage),
            "downloads" => Some(Self::Downloads),
            "tabs" => Some(Self::Tabs),
            _ => None,
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name, version and granted permissions.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    permissions: HashSet<Permission>,
}

impl Manifest {
    /// Unknown permission names are skipped.
    pub fn new<I, S>(name: impl Into<String>, version: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            version: version.into(),
            permissions: permissions
                .into_iter()
                .filter_map(|p| Permission::parse(p.as_ref()))
                .collect(),
        }
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new(
            "Naval Auction Assistant",
            "1.0.0",
            ["storage", "downloads", "tabs"],
        )
    }
}
