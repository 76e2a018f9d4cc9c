use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::de::from_sections;
use crate::error::{Error, Result};
use crate::parser::parse_lines;
use crate::reader::LineReader;
use crate::section::{Section, Sections};

/// Configuration reader builder.
///
/// ```no_run
/// # fn main() -> iniconf::Result<()> {
/// let config = iniconf::Builder::new()
///     .comment("#")
///     .comment(";")
///     .load("app.ini")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    comments: Vec<String>,
}

impl Builder {
    /// Create a new builder. No comment prefixes are set.
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Add a comment prefix. Lines that start with it (after trimming)
    /// are skipped. An empty prefix would match every line, so it is ignored.
    pub fn comment(mut self, prefix: impl Into<String>) -> Builder {
        let prefix = prefix.into();
        if prefix.is_empty() {
            warn!("ignoring empty comment prefix");
        } else {
            self.comments.push(prefix);
        }
        self
    }

    /// Add several comment prefixes.
    pub fn comments<I, S>(self, prefixes: I) -> Builder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        prefixes.into_iter().fold(self, |b, p| b.comment(p))
    }

    /// Check that `path` exists and return a handle to it.
    ///
    /// The file is not read here; every query on the returned
    /// [`Config`] opens and reads it again.
    pub fn load(self, path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if let Err(e) = fs::metadata(path) {
            if e.kind() == io::ErrorKind::NotFound {
                warn!("{}: file does not exist", path.display());
                return Err(Error::from(e).with_file(path.display().to_string()));
            }
        }
        Ok(Config {
            file_name: path.to_path_buf(),
            comments: self.comments,
        })
    }

    /// Parse configuration text held in memory.
    pub fn parse_str(&self, text: &str) -> Result<Sections> {
        let lines = LineReader::new(text.as_bytes(), &self.comments).read_lines()?;
        Ok(parse_lines(lines))
    }
}

/// Handle to a configuration file.
///
/// Holds only the path and the comment prefixes; no file handle is kept
/// open between calls.
#[derive(Debug, Clone)]
pub struct Config {
    file_name: PathBuf,
    comments: Vec<String>,
}

impl Config {
    /// Shorthand for `Builder::new().comments(comments).load(path)`.
    pub fn load<P, S>(path: P, comments: &[S]) -> Result<Config>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        Builder::new()
            .comments(comments.iter().map(|c| c.as_ref()))
            .load(path)
    }

    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    fn name(&self) -> String {
        self.file_name.display().to_string()
    }

    /// Read the logical lines of the file: trimmed, without blank
    /// lines and comments.
    pub fn read_lines(&self) -> Result<Vec<String>> {
        let reader = LineReader::open(&self.file_name, &self.comments)
            .map_err(|e| Error::from(e).with_file(self.name()))?;
        reader.read_lines().map_err(|e| e.with_file(self.name()))
    }

    /// Read and parse the whole file.
    pub fn sections(&self) -> Result<Sections> {
        let lines = self.read_lines()?;
        Ok(parse_lines(lines))
    }

    /// Read the file and return one section.
    ///
    /// A section that is not in the file is returned empty; only a
    /// failure to read the file is an error.
    pub fn section(&self, name: &str) -> Result<Section> {
        let mut sections = self.sections()?;
        Ok(sections.remove(name).unwrap_or_default())
    }

    /// Read the file and deserialize it into `T`.
    pub fn deserialize<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let sections = self.sections()?;
        from_sections(&sections).map_err(|e| e.with_file(self.name()))
    }
}

/// Parse configuration text into sections.
pub fn parse_str<S: AsRef<str>>(text: &str, comments: &[S]) -> Result<Sections> {
    Builder::new()
        .comments(comments.iter().map(|c| c.as_ref()))
        .parse_str(text)
}

/// Read configuration from a string.
pub fn from_str<T, S>(text: &str, comments: &[S]) -> Result<T>
where
    T: DeserializeOwned,
    S: AsRef<str>,
{
    let sections = parse_str(text, comments)?;
    from_sections(&sections)
}

/// Read configuration from a file.
pub fn from_file<T, S>(path: impl AsRef<Path>, comments: &[S]) -> Result<T>
where
    T: DeserializeOwned,
    S: AsRef<str>,
{
    Config::load(path, comments)?.deserialize()
}

impl From<&Config> for Builder {
    fn from(config: &Config) -> Builder {
        Builder {
            comments: config.comments.clone(),
        }
    }
}
