// Capability directory scraping
// Layout: <pd>/{source,sink}-capabilities/<index>:<leaf>/<attribute files>

use crate::codec::{
    decode_pdo_with, encode, AttributeMap, AvsConvention, DecodedField, PdoContext, PdoVariant,
};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CapsError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid capability entry name: {0}")]
    InvalidEntryName(String),
}

pub type Result<T> = std::result::Result<T, CapsError>;

pub const SOURCE_CAPS_DIR: &str = "source-capabilities";
pub const SINK_CAPS_DIR: &str = "sink-capabilities";

lazy_static::lazy_static! {
    static ref ENTRY_NAME: Regex = Regex::new(r"^(\d+):([a-z_]+)$").unwrap();
}

/// One PDO of a capability list, as scraped
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityEntry {
    /// Object position, starting at 1
    pub index: u16,
    pub variant: PdoVariant,
    pub is_source: bool,
    /// Directory name, e.g. `1:fixed_supply`
    pub name: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub attrs: AttributeMap,
    /// Encoded word; 0 when the attributes could not be read
    pub raw: u32,
}

impl CapabilityEntry {
    pub fn context(&self, avs: AvsConvention) -> PdoContext {
        PdoContext {
            object_index_is_one: self.index == 1,
            is_source: self.is_source,
            avs,
        }
    }

    /// Decode the encoded word back into fields
    pub fn decode(&self, avs: AvsConvention) -> Vec<DecodedField> {
        decode_pdo_with(self.raw, &self.context(avs))
    }
}

/// Source and sink capability lists of one PD object
#[derive(Debug, Clone, Default, Serialize)]
pub struct PdCapabilities {
    pub source: Vec<CapabilityEntry>,
    pub sink: Vec<CapabilityEntry>,
}

/// Split `<index>:<leaf>` into its parts
pub fn parse_entry_name(name: &str) -> Result<(u16, &str)> {
    let caps = ENTRY_NAME
        .captures(name)
        .ok_or_else(|| CapsError::InvalidEntryName(name.to_string()))?;
    let index = caps[1]
        .parse::<u16>()
        .map_err(|_| CapsError::InvalidEntryName(name.to_string()))?;
    let leaf = caps.get(2).map_or("", |m| m.as_str());
    Ok((index, leaf))
}

/// Map every regular file in `dir` to its contents, trailing whitespace
/// trimmed. Subdirectories and unreadable files are skipped.
pub fn read_attribute_dir(dir: impl AsRef<Path>) -> Result<AttributeMap> {
    let dir = dir.as_ref();
    let io_err = |source| CapsError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut attrs = AttributeMap::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match fs::read_to_string(&path) {
            Ok(contents) => attrs.insert(name, contents.trim_end()),
            Err(e) => tracing::trace!("Skipping unreadable {}: {}", path.display(), e),
        }
    }
    Ok(attrs)
}

/// Enumerate one capability list directory, sorted by object position.
///
/// An entry whose attributes cannot be read keeps raw word 0.
pub fn scan_capabilities(
    dir: impl AsRef<Path>,
    is_source: bool,
    avs: AvsConvention,
) -> Result<Vec<CapabilityEntry>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(CapsError::NotADirectory(dir.to_path_buf()));
    }
    let io_err = |source| CapsError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for dirent in fs::read_dir(dir).map_err(io_err)? {
        let dirent = dirent.map_err(io_err)?;
        let name = dirent.file_name().to_string_lossy().into_owned();
        let (index, leaf) = match parse_entry_name(&name) {
            Ok(parts) => parts,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", name, e);
                continue;
            }
        };
        let variant = PdoVariant::from_leaf_name(leaf, avs);
        let path = dirent.path();

        let attrs = match read_attribute_dir(&path) {
            Ok(attrs) => attrs,
            Err(e) => {
                tracing::warn!("Failed to read capability {}: {}", name, e);
                AttributeMap::new()
            }
        };
        let raw = if attrs.is_empty() {
            0
        } else {
            encode(variant, is_source, index, &attrs)
        };

        entries.push(CapabilityEntry {
            index,
            variant,
            is_source,
            name,
            path,
            attrs,
            raw,
        });
    }
    entries.sort_by_key(|e| e.index);
    Ok(entries)
}

/// Scan whichever of the source and sink capability lists exist under a PD object
pub fn scan_pd_object(pd_dir: impl AsRef<Path>, avs: AvsConvention) -> Result<PdCapabilities> {
    let pd_dir = pd_dir.as_ref();
    if !pd_dir.is_dir() {
        return Err(CapsError::NotADirectory(pd_dir.to_path_buf()));
    }

    let mut caps = PdCapabilities::default();
    let src = pd_dir.join(SOURCE_CAPS_DIR);
    if src.is_dir() {
        caps.source = scan_capabilities(&src, true, avs)?;
    }
    let snk = pd_dir.join(SINK_CAPS_DIR);
    if snk.is_dir() {
        caps.sink = scan_capabilities(&snk, false, avs)?;
    }
    tracing::debug!(
        "Number of source PDOs: {}, number of sink PDOs: {}",
        caps.source.len(),
        caps.sink.len()
    );
    Ok(caps)
}
