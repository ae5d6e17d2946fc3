use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "clip-sets")]
    clip_sets: HashMap<String, String>,
    #[serde(rename = "format-cases")]
    format_cases: HashMap<String, String>,
}

/// One expected rendering of a time value.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatCase {
    pub time: f64,
    pub expected: String,
}

/// A table of format cases sharing one output format (`"MM_SS_MS"` or `"SS_MS"`).
#[derive(Debug, Clone, Deserialize)]
pub struct FormatTable {
    pub format: String,
    pub cases: Vec<FormatCase>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a>(map: &'a HashMap<String, String>, kind: &str, name: &str) -> Result<&'a str> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod clip_sets {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.clip_sets.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.clip_sets, "clip set", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.clip_sets, "clip set", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.clip_sets, "clip set", name)?;
        Ok(resolve_path(rel))
    }
}

pub mod format_cases {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.format_cases.keys().cloned().collect()
    }

    pub fn load(name: &str) -> Result<FormatTable> {
        let rel = lookup(&MANIFEST.format_cases, "format case", name)?;
        super::load_json(rel)
    }
}
