//! Local definition discovery and loading
//!
//! A definition is a structured document describing one item of a
//! category (a role, an environment, a data bag item) stored under a
//! category folder as `<name>.<ext>`.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;

use serde_json::Value;

use crate::{Error, NormalizedPath, Result};

/// Default lookup order for definition files.
pub const DEFAULT_EXTENSIONS: &[&str] = &["json", "js", "yaml", "yml", "toml"];

/// Extension of Ruby DSL definitions, which are discovered but never parsed.
pub const RUBY_EXTENSION: &str = "rb";

/// Parser selected from a definition file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Json,
    Yaml,
    Toml,
}

impl DefinitionFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "json" | "js" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        }
    }

    /// Parse content into a JSON value.
    pub fn parse(self, content: &str) -> std::result::Result<Value, String> {
        match self {
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Finds and parses local definitions.
///
/// Lookups try each configured extension in order and use the first
/// file that exists. Read and parse failures are downgraded to absence
/// by [`DefinitionLoader::load`]; use [`DefinitionLoader::parse_file`]
/// for the strict variant.
#[derive(Debug, Clone)]
pub struct DefinitionLoader {
    extensions: Vec<String>,
}

impl Default for DefinitionLoader {
    fn default() -> Self {
        Self::with_extensions(DEFAULT_EXTENSIONS.iter().copied())
    }
}

impl DefinitionLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with a custom lookup order.
    ///
    /// Extensions without a known parser are dropped.
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| DefinitionFormat::from_extension(ext).is_some())
            .collect();
        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Locate the definition file for `name`, honouring the lookup order.
    pub fn find(&self, folder: &NormalizedPath, name: &str) -> Option<NormalizedPath> {
        self.extensions
            .iter()
            .map(|ext| folder.join(&format!("{name}.{ext}")))
            .find(|candidate| candidate.is_file())
    }

    /// Load the definition for `name`, or `None` when no file exists or
    /// the file cannot be read or parsed.
    pub fn load(&self, folder: &NormalizedPath, name: &str) -> Option<Value> {
        let path = self.find(folder, name)?;
        match self.parse_file(&path) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%path, error = %e, "Treating unreadable definition as absent");
                None
            }
        }
    }

    /// Read and parse a single definition file.
    pub fn parse_file(&self, path: &NormalizedPath) -> Result<Value> {
        let extension = path.extension().unwrap_or("");
        let format = DefinitionFormat::from_extension(extension).ok_or_else(|| {
            Error::UnsupportedFormat {
                extension: extension.to_string(),
            }
        })?;

        let native = path.to_native();
        let content = fs::read_to_string(&native).map_err(|e| Error::io(&native, e))?;
        format.parse(&content).map_err(|message| Error::DefinitionParse {
            path: native,
            format: format.label().into(),
            message,
        })
    }

    /// Names of all definitions in `folder` with a supported extension.
    ///
    /// A missing folder has no definitions.
    pub fn names(&self, folder: &NormalizedPath) -> Result<BTreeSet<String>> {
        stems_matching(folder, |ext| {
            self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
        })
    }

    /// Names of the Ruby DSL definitions (`<name>.rb`) in `folder`.
    pub fn ruby_names(&self, folder: &NormalizedPath) -> Result<BTreeSet<String>> {
        stems_matching(folder, |ext| ext.eq_ignore_ascii_case(RUBY_EXTENSION))
    }

    /// The Ruby DSL definition for `name`, if one exists.
    pub fn find_ruby(&self, folder: &NormalizedPath, name: &str) -> Option<NormalizedPath> {
        let candidate = folder.join(&format!("{name}.{RUBY_EXTENSION}"));
        candidate.is_file().then_some(candidate)
    }
}

fn stems_matching(
    folder: &NormalizedPath,
    accept: impl Fn(&str) -> bool,
) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for entry in read_dir_entries(folder)? {
        if !entry.is_file() {
            continue;
        }
        if let (true, Some(stem)) = (entry.extension().is_some_and(&accept), entry.file_stem()) {
            names.insert(stem.to_string());
        }
    }
    Ok(names)
}

/// Names of the immediate subdirectories of `folder`.
pub fn subdirectories(folder: &NormalizedPath) -> Result<BTreeSet<String>> {
    Ok(read_dir_entries(folder)?
        .into_iter()
        .filter(|entry| entry.is_dir())
        .filter_map(|entry| entry.file_name().map(str::to_string))
        .collect())
}

fn read_dir_entries(folder: &NormalizedPath) -> Result<Vec<NormalizedPath>> {
    let native = folder.to_native();
    let reader = match fs::read_dir(&native) {
        Ok(reader) => reader,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(&native, e)),
    };

    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry.map_err(|e| Error::io(&native, e))?;
        entries.push(NormalizedPath::new(entry.path()));
    }
    Ok(entries)
}
