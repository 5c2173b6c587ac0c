//! Pick modes, filters and the state of one in-flight pick.

use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::str::FromStr;

/// Kind of dialog the helper shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PickMode {
    OpenFile,
    SaveFile,
    OpenFolder,
    BrowseFiles,
    OpenMultipleFiles,
}

impl PickMode {
    /// Dialog window title.
    pub fn title(self) -> &'static str {
        match self {
            Self::OpenFile => "Select a file",
            Self::SaveFile => "Save...",
            Self::OpenFolder => "Select a folder",
            Self::BrowseFiles => "Browse",
            Self::OpenMultipleFiles => "Select files",
        }
    }

    /// Mode keyword understood by the picker helper.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::OpenFile => "single",
            Self::SaveFile => "save",
            Self::OpenFolder => "dir",
            Self::BrowseFiles => "browse",
            Self::OpenMultipleFiles => "multi",
        }
    }
}

/// A named group of extension patterns, e.g. `Images` / `*.png *.jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub description: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn new<I, S>(description: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            description: description.into(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn all_files() -> Self {
        Self::new("All Files", ["*.*"])
    }

    /// Helper argument form: `<description>|<ext1> <ext2> ...`.
    pub fn encode(&self) -> String {
        let extensions: Vec<&str> = self
            .extensions
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .collect();
        format!("{}|{}", self.description.trim(), extensions.join(" "))
            .trim()
            .to_string()
    }
}

impl FromStr for FileFilter {
    type Err = anyhow::Error;

    /// Parses the same `<description>|<ext1> <ext2>` form the helper receives.
    fn from_str(s: &str) -> Result<Self> {
        let Some((description, extensions)) = s.split_once('|') else {
            bail!("Invalid filter '{s}': expected 'Description|*.ext1 *.ext2'");
        };
        if description.trim().is_empty() {
            bail!("Invalid filter '{s}': description is empty");
        }
        Ok(Self::new(
            description.trim(),
            extensions.split_whitespace().map(str::to_string),
        ))
    }
}

/// Encode caller filters for the helper, always ending with "All Files".
pub fn encode_filters(filters: &[FileFilter]) -> Vec<String> {
    let all_files = FileFilter::all_files();
    filters
        .iter()
        .chain(std::iter::once(&all_files))
        .map(FileFilter::encode)
        .collect()
}

pub type SingleContinuation = Box<dyn FnOnce(PathBuf) + Send + 'static>;
pub type MultiContinuation = Box<dyn FnOnce(Vec<PathBuf>) + Send + 'static>;
pub type CancelContinuation = Box<dyn FnOnce() + Send + 'static>;

/// Where a successful answer goes. Exactly one kind per request.
pub enum Continuation {
    Single(SingleContinuation),
    Multi(MultiContinuation),
}

/// A pick as submitted to the coordinator.
pub struct PickRequest {
    pub start: Option<PathBuf>,
    pub mode: PickMode,
    pub filters: Vec<FileFilter>,
    pub on_picked: Continuation,
    pub on_cancel: Option<CancelContinuation>,
}

/// The in-flight state kept until the answer arrives.
pub(crate) struct PendingPick {
    pub(crate) on_picked: Continuation,
    pub(crate) on_cancel: Option<CancelContinuation>,
}
