//! Loading candidate names from flat files.
//!
//! A source holds one candidate per line. Files ending in `.gz` are gunzipped on the fly.
//! Lines are trimmed but otherwise kept verbatim, blank ones included, so the store sees
//! exactly what the file contains.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading a name source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source file could not be opened.
    #[error("opening {path:?}: {source}")]
    Open {
        /// Path we attempted to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The source could not be read or decompressed.
    #[error("scanning {path:?}: {source}")]
    Read {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Load every source in order and concatenate their names.
pub fn load_names<P: AsRef<Path>>(sources: &[P]) -> Result<Vec<String>, SourceError> {
    let mut names = Vec::new();
    for source in sources {
        let loaded = load_source(source.as_ref())?;
        tracing::info!(source = %source.as_ref().display(), names = loaded.len(), "Loaded name source");
        names.extend(loaded);
    }
    Ok(names)
}

/// Load the names held in a single file.
pub fn load_source(path: &Path) -> Result<Vec<String>, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    read_lines(reader).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn read_lines<R: Read>(reader: R) -> std::io::Result<Vec<String>> {
    BufReader::new(reader)
        .lines()
        .map(|line| line.map(|value| value.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::{Compression, write::GzEncoder};
    use std::io::Write;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pkgname-sources-{}-{name}", std::process::id()))
    }

    #[test]
    fn reads_plain_file_trimming_lines() {
        let path = temp_path("plain.flatfile");
        std::fs::write(&path, "mux\n  gorilla \n\nnegroni\r\n").expect("write source");

        let names = load_source(&path).expect("load");
        assert_eq!(names, vec!["mux", "gorilla", "", "negroni"]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn reads_gzip_file() {
        let path = temp_path("names.flatfile.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"alpha\nbeta\n").expect("compress");
        std::fs::write(&path, encoder.finish().expect("finish")).expect("write source");

        let names = load_source(&path).expect("load");
        assert_eq!(names, vec!["alpha", "beta"]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn concatenates_sources_in_order() {
        let first = temp_path("first.flatfile");
        let second = temp_path("second.flatfile");
        std::fs::write(&first, "one\ntwo\n").expect("write first");
        std::fs::write(&second, "three\n").expect("write second");

        let names = load_names(&[&first, &second]).expect("load");
        assert_eq!(names, vec!["one", "two", "three"]);

        let _ = std::fs::remove_file(&first);
        let _ = std::fs::remove_file(&second);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = load_source(&temp_path("missing.flatfile")).expect_err("missing");
        assert!(matches!(err, SourceError::Open { .. }));
    }

    #[test]
    fn corrupt_gzip_is_a_read_error() {
        let path = temp_path("corrupt.gz");
        std::fs::write(&path, b"definitely not gzip").expect("write source");

        let err = load_source(&path).expect_err("corrupt");
        assert!(matches!(err, SourceError::Read { .. }));

        let _ = std::fs::remove_file(&path);
    }
}
