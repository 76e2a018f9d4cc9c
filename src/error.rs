use serde::de;
use std::fmt;
use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What went wrong.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The configuration file does not exist.
    FileNotFound,
    /// The file could not be opened or read.
    Io,
    /// A typed accessor was asked for a key the section does not have.
    NotFound,
    /// A typed accessor found the key, but its value did not parse.
    InvalidValue,
    /// Deserializing into a user type failed.
    Deserialize,
}

#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    file_name: Option<String>,
    line: u32,
}

impl Error {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Error {
        Error {
            kind,
            msg: msg.into(),
            file_name: None,
            line: 0,
        }
    }

    pub(crate) fn not_found(key: &str) -> Error {
        Error::new(ErrorKind::NotFound, format!("{}: key not found", key))
    }

    pub(crate) fn invalid_value(key: &str, what: &str, value: &str) -> Error {
        Error::new(
            ErrorKind::InvalidValue,
            format!("{}: expected {} value, got {:?}", key, what, value),
        )
    }

    pub(crate) fn with_file(mut self, name: impl Into<String>) -> Error {
        self.file_name = Some(name.into());
        self
    }

    pub(crate) fn with_line(mut self, line: u32) -> Error {
        self.line = line;
        self
    }

    pub(crate) fn in_section(mut self, name: &str) -> Error {
        self.msg = format!("[{}] {}", name, self.msg);
        self
    }

    pub(crate) fn for_key(mut self, key: &str) -> Error {
        self.msg = format!("{}: {}", key, self.msg);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// True if a typed accessor failed because the key was absent.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// 1-based line number, or 0 if the error is not tied to a line.
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        let kind = match e.kind() {
            io::ErrorKind::NotFound => ErrorKind::FileNotFound,
            _ => ErrorKind::Io,
        };
        Error::new(kind, e.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::new(ErrorKind::Deserialize, msg.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file_name {
            Some(ref name) if self.line > 0 => write!(f, "{}:{}: {}", name, self.line, self.msg),
            Some(ref name) => write!(f, "{}: {}", name, self.msg),
            None => write!(f, "{}", self.msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_position() {
        let err = Error::new(ErrorKind::Io, "utf-8 error")
            .with_file("app.ini")
            .with_line(7);
        assert_eq!(err.to_string(), "app.ini:7: utf-8 error");
    }

    #[test]
    fn display_without_line() {
        let err = Error::new(ErrorKind::FileNotFound, "no such file").with_file("app.ini");
        assert_eq!(err.to_string(), "app.ini: no such file");
    }

    #[test]
    fn display_accessor_error() {
        let err = Error::not_found("timeout");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "timeout: key not found");

        let err = Error::invalid_value("timeout", "integer", "soon");
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        assert_eq!(err.to_string(), "timeout: expected integer value, got \"soon\"");
    }

    #[test]
    fn io_not_found_maps_to_file_not_found() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(Error::from(io_err).kind(), ErrorKind::FileNotFound);

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Error::from(io_err).kind(), ErrorKind::Io);
    }
}
