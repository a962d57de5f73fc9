use crate::error::{Result, RoutineError};
use crate::metadata::{FieldInput, FieldValue, Record, SinkKind, StreamSpec, StreamTarget, TextEncoding};
use crate::protocol::SqlValue;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

pub const DEFAULT_COPY_BUFFER: usize = 8192;

static SINK_SEQ: AtomicU64 = AtomicU64::new(0);

/// Sink handed to a host field whose declared target is an open stream.
#[derive(Debug)]
pub enum SinkStream {
    File(File),
    BufferedFile(BufReader<File>),
    Memory(Cursor<Vec<u8>>),
    /// File sink that was closed after the copy; only the path is left
    ClosedFile { path: PathBuf },
}

impl SinkStream {
    pub fn is_open(&self) -> bool {
        !matches!(self, SinkStream::ClosedFile { .. })
    }

    pub fn closed_path(&self) -> Option<&Path> {
        match self {
            SinkStream::ClosedFile { path } => Some(path),
            _ => None,
        }
    }

    /// Reads whatever is left in the stream.
    pub fn read_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.read_to_end(&mut out)?;
        Ok(out)
    }
}

impl Read for SinkStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            SinkStream::File(f) => f.read(buf),
            SinkStream::BufferedFile(r) => r.read(buf),
            SinkStream::Memory(c) => c.read(buf),
            SinkStream::ClosedFile { path } => Err(io::Error::other(format!(
                "sink {} is closed",
                path.display()
            ))),
        }
    }
}

impl Seek for SinkStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            SinkStream::File(f) => f.seek(pos),
            SinkStream::BufferedFile(r) => r.seek(pos),
            SinkStream::Memory(c) => c.seek(pos),
            SinkStream::ClosedFile { path } => Err(io::Error::other(format!(
                "sink {} is closed",
                path.display()
            ))),
        }
    }
}

/// Engine-level settings the sink needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkOptions {
    pub buffer_size: usize,
    pub default_encoding: TextEncoding,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_COPY_BUFFER,
            default_encoding: TextEncoding::default(),
        }
    }
}

/// Copies one streamed column into the declared sink and converts the sink
/// into the value the host field receives.
///
/// `copy` writes the column's bytes into the sink and returns the count.
pub fn deliver(
    spec: &StreamSpec,
    instance: &dyn Record,
    options: &SinkOptions,
    copy: impl FnOnce(&mut dyn Write) -> Result<u64>,
) -> Result<FieldInput> {
    match &spec.sink {
        SinkKind::Memory => deliver_memory(spec, options, copy),
        SinkKind::File {
            location,
            filename_field,
        } => {
            let path = sink_path(location, *filename_field, instance)?;
            deliver_file(spec, &path, options, copy)
        }
    }
}

fn deliver_memory(
    spec: &StreamSpec,
    options: &SinkOptions,
    copy: impl FnOnce(&mut dyn Write) -> Result<u64>,
) -> Result<FieldInput> {
    let mut data = Vec::new();
    let copied = if spec.buffered {
        let mut writer = BufWriter::with_capacity(options.buffer_size.max(1), &mut data);
        let n = copy(&mut writer)?;
        writer.flush()?;
        n
    } else {
        copy(&mut data)?
    };
    log::trace!("streamed {} bytes into memory sink", copied);

    match spec.target {
        StreamTarget::Bytes => Ok(FieldInput::Value(SqlValue::Binary(data))),
        StreamTarget::Text(encoding) => {
            let text = encoding.unwrap_or(options.default_encoding).decode(&data)?;
            Ok(FieldInput::Value(SqlValue::String(text)))
        }
        StreamTarget::OpenStream { .. } => Ok(FieldInput::Stream(SinkStream::Memory(
            Cursor::new(data),
        ))),
    }
}

fn deliver_file(
    spec: &StreamSpec,
    path: &Path,
    options: &SinkOptions,
    copy: impl FnOnce(&mut dyn Write) -> Result<u64>,
) -> Result<FieldInput> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    let delivered = fill_and_deliver(spec, path, file, options, copy);
    if delivered.is_err() {
        if let Err(err) = std::fs::remove_file(path) {
            log::warn!("could not remove partial sink file {}: {}", path.display(), err);
        }
    }
    delivered
}

fn fill_and_deliver(
    spec: &StreamSpec,
    path: &Path,
    mut file: File,
    options: &SinkOptions,
    copy: impl FnOnce(&mut dyn Write) -> Result<u64>,
) -> Result<FieldInput> {
    let copied = if spec.buffered {
        let mut writer = BufWriter::with_capacity(options.buffer_size.max(1), &mut file);
        let n = copy(&mut writer)?;
        writer.flush()?;
        n
    } else {
        let n = copy(&mut file)?;
        file.flush()?;
        n
    };
    file.seek(SeekFrom::Start(0))?;
    log::debug!("streamed {} bytes into {}", copied, path.display());

    match spec.target {
        StreamTarget::Bytes => {
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            Ok(FieldInput::Value(SqlValue::Binary(data)))
        }
        StreamTarget::Text(encoding) => {
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            let text = encoding.unwrap_or(options.default_encoding).decode(&data)?;
            Ok(FieldInput::Value(SqlValue::String(text)))
        }
        StreamTarget::OpenStream { leave_open: true } => {
            if spec.buffered {
                Ok(FieldInput::Stream(SinkStream::BufferedFile(
                    BufReader::with_capacity(options.buffer_size.max(1), file),
                )))
            } else {
                Ok(FieldInput::Stream(SinkStream::File(file)))
            }
        }
        StreamTarget::OpenStream { leave_open: false } => {
            drop(file);
            Ok(FieldInput::Stream(SinkStream::ClosedFile {
                path: path.to_path_buf(),
            }))
        }
    }
}

fn sink_path(
    location: &Path,
    filename_field: Option<&'static str>,
    instance: &dyn Record,
) -> Result<PathBuf> {
    let Some(field) = filename_field else {
        return Ok(location.join(generated_name()));
    };
    match instance.read_field(field)? {
        FieldValue::Scalar(SqlValue::String(name)) if !name.trim().is_empty() => {
            Ok(location.join(name))
        }
        FieldValue::Scalar(SqlValue::Null) | FieldValue::Scalar(SqlValue::String(_)) => {
            log::debug!(
                "filename field {} is empty, using a generated sink name",
                field
            );
            Ok(location.join(generated_name()))
        }
        other => Err(RoutineError::type_mismatch(
            field,
            format!("filename field must hold text, got {}", other.kind()),
        )),
    }
}

fn generated_name() -> String {
    format!(
        "routine_stream_{}_{}.bin",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis(),
        SINK_SEQ.fetch_add(1, Ordering::Relaxed)
    )
}
