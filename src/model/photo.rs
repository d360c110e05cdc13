use std::fmt;
use std::fmt::Formatter;
use std::path::PathBuf;

/// Local photo file queued for upload; `name` doubles as the object key.
pub struct Photo {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
}

impl fmt::Display for Photo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "(name={}, path={})", self.name, self.path.display())
    }
}

/// File name endings that mark a key or file as a photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSuffixes(Vec<String>);

impl PhotoSuffixes {
    pub(crate) fn new(suffixes: Vec<String>) -> Self {
        PhotoSuffixes(suffixes)
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        self.0.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }
}

impl fmt::Display for PhotoSuffixes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}
