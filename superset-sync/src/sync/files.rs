//! Export file naming and discovery

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::EntityKind;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// `{entity}_{id}.json`
pub fn export_file_name(entity: EntityKind, id: &str) -> String {
    format!("{}_{}.json", entity, id)
}

/// Entity type prefix of an export file name (text before the first `_`)
pub fn entity_prefix(file_name: &str) -> &str {
    file_name.split('_').next().unwrap_or(file_name)
}

/// One piece of a natural sort key
///
/// Digit runs compare by numeric value, so `Number("01")` equals `Number("1")`.
#[derive(Debug, Clone)]
pub enum KeyPart {
    Text(String),
    Number(String),
}

impl KeyPart {
    fn cmp_numbers(a: &str, b: &str) -> Ordering {
        let a = a.trim_start_matches('0');
        let b = b.trim_start_matches('0');
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    }
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (KeyPart::Number(a), KeyPart::Number(b)) => Self::cmp_numbers(a, b),
            (KeyPart::Text(a), KeyPart::Text(b)) => a.cmp(b),
            (KeyPart::Number(_), KeyPart::Text(_)) => Ordering::Less,
            (KeyPart::Text(_), KeyPart::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyPart {}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Split a name into alternating text and digit runs
///
/// The key always starts with a (possibly empty) text part, so digit runs
/// of two names line up positionally and compare by numeric value.
pub fn natural_key(name: &str) -> Vec<KeyPart> {
    let mut parts = Vec::new();
    let mut last = 0;
    for m in DIGITS.find_iter(name) {
        parts.push(KeyPart::Text(name[last..m.start()].to_string()));
        parts.push(KeyPart::Number(m.as_str().to_string()));
        last = m.end();
    }
    parts.push(KeyPart::Text(name[last..].to_string()));
    parts
}

/// Sort file names in natural (numeric-aware) order
pub fn sort_naturally(names: &mut [String]) {
    names.sort_by_cached_key(|name| natural_key(name));
}

/// All `*.json` files directly inside `dir`, in natural order of their names
pub fn discover_export_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read export directory: {}", dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let lossy = file_name.to_string_lossy();
        if lossy.starts_with('.') || !lossy.ends_with(".json") {
            continue;
        }
        let Some(name) = file_name.to_str() else {
            bail!("Export file name is not valid UTF-8: {}", path.display());
        };
        names.push(name.to_string());
    }

    sort_naturally(&mut names);
    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}
