use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Program,
    Year,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Program => "program",
            Self::Year => "year",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

/// One member site of the ring, as read from the sites file.
#[derive(Clone, Debug, Deserialize)]
pub struct SiteRecord {
    pub name: String,
    pub url: String,
    pub program: String,
    pub year: u32,
}

pub fn load_sites(path: &Path) -> Result<Vec<SiteRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading sites file {}", path.display()))?;
    let sites: Vec<SiteRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing sites file {}", path.display()))?;

    log::info!("loaded {} sites from {}", sites.len(), path.display());
    Ok(sites)
}

/// Order the records by the chosen key. String keys compare case-insensitively;
/// ties fall back to name so the ordering is total.
pub fn sort_sites(sites: &mut [SiteRecord], key: SortKey, direction: SortDirection) {
    sites.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Program => a
                .program
                .to_lowercase()
                .cmp(&b.program.to_lowercase())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
            SortKey::Year => a
                .year
                .cmp(&b.year)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        };

        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}
