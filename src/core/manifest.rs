//! Package manifest (`package.json`) metadata

use anyhow::{Context, Result};
use semver::Version;
use serde::Deserialize;
use std::path::Path;

/// Package metadata shared by the bundle banner, docs rewrite and release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: String,
    pub version: Version,
    pub description: String,
    pub homepage: String,
    pub license: String,
    pub author: String,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    name: String,
    version: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    homepage: String,
    #[serde(default)]
    license: String,
    #[serde(default)]
    author: Option<RawAuthor>,
}

/// npm allows both `"Name <mail>"` and `{ "name": ..., "email": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAuthor {
    Text(String),
    Person { name: String },
}

impl PackageManifest {
    /// Load the manifest from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid manifest {}", path.display()))
    }

    /// Parse the manifest from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawManifest = serde_json::from_str(json)?;
        let version = Version::parse(&raw.version)
            .with_context(|| format!("Invalid version '{}'", raw.version))?;

        let author = match raw.author {
            Some(RawAuthor::Text(text)) => text,
            Some(RawAuthor::Person { name }) => name,
            None => String::new(),
        };

        Ok(Self {
            name: raw.name,
            version,
            description: raw.description,
            homepage: raw.homepage,
            license: raw.license,
            author,
        })
    }

    /// Package name without its npm scope (`@scope/ajax` -> `ajax`)
    pub fn unscoped_name(&self) -> &str {
        match self.name.strip_prefix('@') {
            Some(scoped) => scoped.split_once('/').map_or(scoped, |(_, name)| name),
            None => &self.name,
        }
    }

    /// Git tag for the current version (`v1.2.3`)
    pub fn tag(&self) -> String {
        format!("v{}", self.version)
    }
}
