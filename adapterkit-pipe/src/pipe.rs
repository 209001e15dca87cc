//! Blocking single-message reads and writes over named pipes.

use crate::error::{PipeError, PipeResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads one JSON document from `path`.
///
/// Blocks until a writer attaches, then reads until the writer closes.
pub fn read_from_pipe<T: DeserializeOwned>(path: impl AsRef<Path>) -> PipeResult<T> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening input pipe");
    let mut file = File::open(path).map_err(|e| PipeError::io(path, e))?;

    let mut buf = Vec::new();
    file.read_to_end(&mut buf)
        .map_err(|e| PipeError::io(path, e))?;
    debug!(path = %path.display(), bytes = buf.len(), "read input message");

    serde_json::from_slice(&buf).map_err(|source| PipeError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `value` as one JSON document to `path`, then closes it.
///
/// Blocks until a reader attaches. The value is serialized before the pipe
/// is opened, so a serialization failure never leaves the reader with a
/// partial document.
pub fn write_to_pipe<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> PipeResult<()> {
    let path = path.as_ref();
    let body = serde_json::to_vec(value)?;

    debug!(path = %path.display(), "opening output pipe");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| PipeError::io(path, e))?;
    file.write_all(&body).map_err(|e| PipeError::io(path, e))?;
    file.flush().map_err(|e| PipeError::io(path, e))?;
    debug!(path = %path.display(), bytes = body.len(), "wrote output message");
    Ok(())
}

/// The inbound and outbound pipes handed to one adapter invocation.
///
/// A pair is used once: one [`read_input`](Self::read_input) and one
/// [`send`](Self::send).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipePair {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl PipePair {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    /// Reads the host's message from the input pipe.
    pub fn read_input<T: DeserializeOwned>(&self) -> PipeResult<T> {
        read_from_pipe(&self.input)
    }

    /// Writes a result to the output pipe.
    pub fn send<T: Serialize + ?Sized>(&self, value: &T) -> PipeResult<()> {
        write_to_pipe(&self.output, value)
    }
}
