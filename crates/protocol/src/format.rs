//! Frame formatting (the sender side of the wire format).

use std::fmt;

use crate::frame::{
    CANCEL_PREFIX, CHUNK_PREFIX, ChunkFrame, END_PREFIX, Frame, START_HEADER, StartFrame,
};

/// Formats a start frame. The `sha256` line is emitted only when present.
pub fn format_start(start: &StartFrame) -> String {
    let mut lines = vec![START_HEADER.to_string(), format!("id={}", start.id)];
    if let Some(path) = &start.path {
        lines.push(format!("path={path}"));
    }
    lines.push(format!("total_parts={}", start.total_parts));
    lines.push(format!("encoding={}", start.encoding));
    lines.push(format!("compression={}", start.compression));
    if let Some(digest) = &start.sha256 {
        lines.push(format!("sha256={digest}"));
    }
    lines.join("\n")
}

pub fn format_chunk(chunk: &ChunkFrame) -> String {
    format!(
        "{CHUNK_PREFIX} {}/{} id={}]\n{}",
        chunk.index, chunk.total, chunk.id, chunk.payload
    )
}

pub fn format_end(id: &str) -> String {
    format!("{END_PREFIX} id={id}]")
}

pub fn format_cancel(id: &str) -> String {
    format!("{CANCEL_PREFIX} id={id}]")
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Frame::Start(start) => format_start(start),
            Frame::Chunk(chunk) => format_chunk(chunk),
            Frame::End { id } => format_end(id),
            Frame::Cancel { id } => format_cancel(id),
        };
        f.write_str(&text)
    }
}
