//! Minimal INI-style configuration file reader.
//!
//! A configuration file consists of `[section]` headers followed by
//! `key = value` lines. Blank lines and lines starting with one of the
//! caller-supplied comment prefixes are skipped.
//!
//! ```no_run
//! # fn main() -> iniconf::Result<()> {
//! let config = iniconf::Config::load("server.ini", &["#", ";"])?;
//! let server = config.section("server")?;
//! let port = server.get_int("port")?;
//! let verbose = server.get_bool("verbose").unwrap_or_default();
//! # Ok(())
//! # }
//! ```
//!
//! Every query re-reads the file; nothing is cached.
#[macro_use]
extern crate log;

mod config;
mod de;
mod error;
mod parser;
mod reader;
mod section;

pub use config::{from_file, from_str, parse_str, Builder, Config};
pub use error::{Error, ErrorKind, Result};
pub use reader::BUFFER_SIZE;
pub use section::{parse_bool, Section, Sections};
