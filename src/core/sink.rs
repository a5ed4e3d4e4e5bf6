//! Output sinks
//!
//! One [`OutputSink`] is opened per collection pass. It writes one JSON
//! document per line to standard output or to a file, compressing the file
//! when its name ends in `.gz`/`.gzip` (gzip) or `.zst` (zstd).

use crate::domain::context::ResultExt;
use crate::domain::{CollectionName, Hit, Result, SampleError};
use flate2::write::GzEncoder;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};

/// Output name meaning standard output
pub const STDOUT_TOKEN: &str = "-";

/// Suffix of per-collection default file names
pub const DEFAULT_EXTENSION: &str = "jsonl";

const ZSTD_LEVEL: i32 = 3;

/// Something that accepts exported documents
pub trait DocumentWriter: Send {
    /// Write one document
    fn write_document(&mut self, hit: &Hit) -> Result<()>;
}

impl DocumentWriter for Vec<Hit> {
    fn write_document(&mut self, hit: &Hit) -> Result<()> {
        self.push(hit.clone());
        Ok(())
    }
}

/// Stream compression, picked from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl Compression {
    /// Compression implied by the suffix of `path`
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("gz") | Some("gzip") => Compression::Gzip,
            Some("zst") => Compression::Zstd,
            _ => Compression::None,
        }
    }
}

/// Where one collection pass writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File {
        path: PathBuf,
        append: bool,
        compression: Compression,
    },
}

impl Destination {
    /// Resolve the destination of a collection pass
    ///
    /// An explicit `output` wins over `<collection>.jsonl`. Secondary passes
    /// append to an explicit output so all collections land in one file;
    /// everything else truncates.
    pub fn resolve(output: Option<&str>, collection: &CollectionName, secondary: bool) -> Self {
        match output {
            Some(STDOUT_TOKEN) => Destination::Stdout,
            Some(path) => Self::file(PathBuf::from(path), secondary),
            None => Self::file(
                PathBuf::from(format!("{collection}.{DEFAULT_EXTENSION}")),
                false,
            ),
        }
    }

    fn file(path: PathBuf, append: bool) -> Self {
        let compression = Compression::from_path(&path);
        Destination::File {
            path,
            append,
            compression,
        }
    }

    /// Whether output goes to a file
    pub fn is_file(&self) -> bool {
        matches!(self, Destination::File { .. })
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => write!(f, "{STDOUT_TOKEN}"),
            Destination::File { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

enum Stream {
    Stdout(BufWriter<Stdout>),
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
    Zstd(zstd::Encoder<'static, BufWriter<File>>),
}

impl Stream {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Stream::Stdout(w) => w,
            Stream::Plain(w) => w,
            Stream::Gzip(w) => w,
            Stream::Zstd(w) => w,
        }
    }

    fn finish(self) -> io::Result<()> {
        match self {
            Stream::Stdout(mut w) => w.flush(),
            Stream::Plain(mut w) => w.flush(),
            Stream::Gzip(w) => w.finish()?.flush(),
            Stream::Zstd(w) => w.finish()?.flush(),
        }
    }
}

/// Line-oriented JSON writer for one collection pass
pub struct OutputSink {
    destination: Destination,
    stream: Option<Stream>,
    pretty: bool,
    written: u64,
}

impl OutputSink {
    /// Open `destination`, creating or truncating the file as needed
    pub fn open(destination: Destination, pretty: bool) -> Result<Self> {
        let stream = match &destination {
            Destination::Stdout => Stream::Stdout(BufWriter::new(io::stdout())),
            Destination::File {
                path,
                append,
                compression,
            } => {
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .append(*append)
                    .truncate(!*append)
                    .open(path)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                let file = BufWriter::new(file);

                match compression {
                    Compression::None => Stream::Plain(file),
                    Compression::Gzip => {
                        Stream::Gzip(GzEncoder::new(file, flate2::Compression::default()))
                    }
                    Compression::Zstd => Stream::Zstd(
                        zstd::Encoder::new(file, ZSTD_LEVEL)
                            .with_context(|| format!("Failed to start zstd stream for {}", path.display()))?,
                    ),
                }
            }
        };

        tracing::debug!(destination = %destination, "Opened output sink");

        Ok(Self {
            destination,
            stream: Some(stream),
            pretty,
            written: 0,
        })
    }

    /// Destination of this sink
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Number of lines written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush and finish the stream, returning the number of lines written
    pub fn finish(mut self) -> Result<u64> {
        if let Some(stream) = self.stream.take() {
            stream
                .finish()
                .with_context(|| format!("Failed to finish {}", self.destination))?;
        }
        Ok(self.written)
    }
}

impl DocumentWriter for OutputSink {
    fn write_document(&mut self, hit: &Hit) -> Result<()> {
        let Some(line) = hit.render(self.pretty)? else {
            return Ok(());
        };

        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| SampleError::Output(format!("{} is already closed", self.destination)))?;

        let writer = stream.writer();
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .with_context(|| format!("Failed to write to {}", self.destination))?;

        self.written += 1;
        Ok(())
    }
}

impl Drop for OutputSink {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.finish() {
                tracing::warn!(destination = %self.destination, error = %e, "Failed to finish output on drop");
            }
        }
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputSink")
            .field("destination", &self.destination)
            .field("pretty", &self.pretty)
            .field("written", &self.written)
            .finish()
    }
}
