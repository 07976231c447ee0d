//! Frame parser.
//!
//! Each frame kind is recognized by its literal prefix and then checked by a
//! small cursor-based matcher. Prefix precedence is start, chunk, end, cancel.

use std::collections::HashMap;

use crate::frame::{
    CANCEL_PREFIX, CHUNK_PREFIX, ChunkFrame, END_PREFIX, Frame, FrameError, START_HEADER,
    StartFrame,
};
use crate::text::{normalize_newlines, strip_code_fences};

/// Parses one raw message into a frame.
///
/// Returns `Ok(None)` when the text does not start with any frame prefix, so
/// ordinary conversation interleaved with frames is ignored rather than
/// reported.
pub fn parse_frame(raw: &str) -> Result<Option<Frame>, FrameError> {
    let normalized = normalize_newlines(raw);
    let text = strip_code_fences(&normalized).trim();

    if let Some(body) = text.strip_prefix(START_HEADER) {
        return parse_start(body).map(|s| Some(Frame::Start(s)));
    }
    if text.starts_with(CHUNK_PREFIX) {
        return parse_chunk(text).map(|c| Some(Frame::Chunk(c)));
    }
    if text.starts_with(END_PREFIX) {
        let id = parse_id_only(text, END_PREFIX).ok_or(FrameError::InvalidEndHeader)?;
        return Ok(Some(Frame::End { id }));
    }
    if text.starts_with(CANCEL_PREFIX) {
        let id = parse_id_only(text, CANCEL_PREFIX).ok_or(FrameError::InvalidCancelHeader)?;
        return Ok(Some(Frame::Cancel { id }));
    }
    Ok(None)
}

fn parse_start(body: &str) -> Result<StartFrame, FrameError> {
    let meta = parse_key_values(body);
    let field = |key: &str| meta.get(key).copied().filter(|v| !v.is_empty());

    let id = field("id").ok_or(FrameError::MissingId)?;
    let total_parts = field("total_parts")
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|&n| n > 0)
        .ok_or(FrameError::InvalidTotalParts)?;

    Ok(StartFrame {
        id: id.to_string(),
        path: field("path").map(str::to_string),
        total_parts,
        encoding: field("encoding").unwrap_or("base64").to_ascii_lowercase(),
        compression: field("compression").unwrap_or("none").to_ascii_lowercase(),
        sha256: field("sha256").map(str::to_string),
    })
}

/// `key=value` lines; later duplicates win, lines without `=` are skipped.
fn parse_key_values(body: &str) -> HashMap<&str, &str> {
    body.lines()
        .map(str::trim)
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
        .collect()
}

/// `[FILE CHUNK <index>/<total> id=<id>]` followed by the payload lines.
fn parse_chunk(text: &str) -> Result<ChunkFrame, FrameError> {
    let (header, body) = text.split_once('\n').unwrap_or((text, ""));
    let (index, total, id) = parse_chunk_header(header).ok_or(FrameError::InvalidChunkHeader)?;

    Ok(ChunkFrame {
        id: id.to_string(),
        index,
        total,
        payload: body.trim().to_string(),
    })
}

fn parse_chunk_header(header: &str) -> Option<(u32, u32, &str)> {
    let mut cur = Cursor::new(header);
    cur.expect(CHUNK_PREFIX)?;
    cur.require_ws()?;
    let index = cur.number()?;
    cur.skip_ws();
    cur.expect("/")?;
    cur.skip_ws();
    let total = cur.number()?;
    cur.require_ws()?;
    let id = cur.id_field()?;
    cur.at_end().then_some((index, total, id))
}

/// `<prefix> id=<id>]` with nothing after the closing bracket.
fn parse_id_only(text: &str, prefix: &str) -> Option<String> {
    let mut cur = Cursor::new(text);
    cur.expect(prefix)?;
    cur.require_ws()?;
    let id = cur.id_field()?;
    cur.at_end().then(|| id.to_string())
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn eat(&mut self, literal: &str) -> bool {
        match self.rest.strip_prefix(literal) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn expect(&mut self, literal: &str) -> Option<()> {
        self.eat(literal).then_some(())
    }

    fn skip_ws(&mut self) -> usize {
        let trimmed = self.rest.trim_start();
        let skipped = self.rest.len() - trimmed.len();
        self.rest = trimmed;
        skipped
    }

    fn require_ws(&mut self) -> Option<()> {
        (self.skip_ws() > 0).then_some(())
    }

    fn number(&mut self) -> Option<u32> {
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let (digits, rest) = self.rest.split_at(end);
        self.rest = rest;
        digits.parse().ok()
    }

    /// `id=<token>]`; the token is trimmed and must be non-empty.
    fn id_field(&mut self) -> Option<&'a str> {
        self.expect("id=")?;
        let close = self.rest.find(']')?;
        let id = self.rest[..close].trim();
        self.rest = &self.rest[close + 1..];
        (!id.is_empty()).then_some(id)
    }

    fn at_end(&self) -> bool {
        self.rest.trim().is_empty()
    }
}
