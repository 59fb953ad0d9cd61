//! Traits for reading text-based resource formats.

use std::{fs::File, io::Read, path::Path};

/// A trait for parsing one resource file.
///
/// # Example
///
/// ```rust,no_run
/// use staticbundle::{properties::Properties, traits::Parser};
/// let bundle = Properties::read_from("res/messages.properties")?;
/// assert!(bundle.get("greeting").is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser: Sized {
    /// Error produced by the format; I/O failures must convert into it.
    type Err: From<std::io::Error>;

    /// Parse from already decoded text.
    fn from_str(s: &str) -> Result<Self, Self::Err>;

    /// Parse from file path.
    ///
    /// A UTF-8 or UTF-16 byte order mark is honoured; input without a BOM is
    /// read as UTF-8.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Self::Err> {
        let file = File::open(path)?;
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(file);

        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded)?;

        Self::from_str(&decoded)
    }
}
