use crate::error::{Result, RoutineError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Character encoding used when a streamed column is delivered as text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    Latin1,
    Ascii,
}

impl TextEncoding {
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Utf8 => {
                let body = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
                String::from_utf8(body.to_vec())
                    .map_err(|e| RoutineError::Mapping(format!("invalid UTF-8 text: {}", e)))
            }
            TextEncoding::Utf16Le => decode_utf16(bytes, [0xFF, 0xFE], u16::from_le_bytes),
            TextEncoding::Utf16Be => decode_utf16(bytes, [0xFE, 0xFF], u16::from_be_bytes),
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Ascii => {
                if let Some(pos) = bytes.iter().position(|b| !b.is_ascii()) {
                    return Err(RoutineError::Mapping(format!(
                        "non-ASCII byte at offset {}",
                        pos
                    )));
                }
                Ok(bytes.iter().map(|&b| char::from(b)).collect())
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], bom: [u8; 2], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    let body = bytes.strip_prefix(&bom).unwrap_or(bytes);
    if body.len() % 2 != 0 {
        return Err(RoutineError::Mapping(
            "UTF-16 text has an odd number of bytes".to_string(),
        ));
    }
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|e| RoutineError::Mapping(format!("invalid UTF-16 text: {}", e)))
}

/// Where streamed column bytes are collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkKind {
    File {
        location: PathBuf,
        /// Field on the target instance whose value names the file
        filename_field: Option<&'static str>,
    },
    Memory,
}

/// Shape the streamed column is handed to the host field in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamTarget {
    Bytes,
    /// `None` falls back to the engine's configured encoding
    Text(Option<TextEncoding>),
    OpenStream { leave_open: bool },
}

/// Declared redirection of a large column into a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSpec {
    pub sink: SinkKind,
    pub buffered: bool,
    pub target: StreamTarget,
}

impl StreamSpec {
    pub fn to_file(location: impl Into<PathBuf>) -> Self {
        Self {
            sink: SinkKind::File {
                location: location.into(),
                filename_field: None,
            },
            buffered: false,
            target: StreamTarget::OpenStream { leave_open: false },
        }
    }

    pub fn to_memory() -> Self {
        Self {
            sink: SinkKind::Memory,
            buffered: false,
            target: StreamTarget::OpenStream { leave_open: true },
        }
    }

    /// Only meaningful for file sinks.
    pub fn filename_field(mut self, field: &'static str) -> Self {
        if let SinkKind::File {
            ref mut filename_field,
            ..
        } = self.sink
        {
            *filename_field = Some(field);
        }
        self
    }

    pub fn buffered(mut self, buffered: bool) -> Self {
        self.buffered = buffered;
        self
    }

    pub fn target(mut self, target: StreamTarget) -> Self {
        self.target = target;
        self
    }

    pub fn is_file(&self) -> bool {
        matches!(self.sink, SinkKind::File { .. })
    }
}
