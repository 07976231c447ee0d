use std::path::PathBuf;

use serde::Serialize;

use crate::TransferError;
use crate::assembler::AssembleError;

/// Acknowledgment for an accepted frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "camelCase")]
pub enum Ack {
    Start {
        id: String,
        total: u32,
    },
    #[serde(rename_all = "camelCase")]
    Chunk {
        id: String,
        index: u32,
        /// Distinct parts held so far.
        received_count: usize,
        total: u32,
    },
    /// The file was verified and written to `path`.
    End {
        id: String,
        path: PathBuf,
        bytes: usize,
    },
    Cancel {
        id: String,
        existed: bool,
    },
}

/// JSON-friendly outcome of one message: `{"ok": true, "stage": ...}` or
/// `{"ok": false, "error": ..., ...details}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub ok: bool,
    #[serde(flatten)]
    pub ack: Option<Ack>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl Reply {
    /// Renders the reply as a single-line JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<Ack> for Reply {
    fn from(ack: Ack) -> Self {
        Self {
            ok: true,
            ack: Some(ack),
            error: None,
            message: None,
            missing: None,
            expected: None,
            actual: None,
        }
    }
}

impl From<&AssembleError> for Reply {
    fn from(err: &AssembleError) -> Self {
        let mut reply = Self {
            ok: false,
            ack: None,
            error: Some(err.reason()),
            message: Some(err.to_string()),
            missing: None,
            expected: None,
            actual: None,
        };
        match err {
            AssembleError::MissingChunks { missing } => reply.missing = Some(missing.clone()),
            AssembleError::Transfer(TransferError::ChecksumMismatch { expected, actual }) => {
                reply.expected = Some(expected.clone());
                reply.actual = Some(actual.clone());
            }
            _ => {}
        }
        reply
    }
}

impl From<Result<Ack, AssembleError>> for Reply {
    fn from(result: Result<Ack, AssembleError>) -> Self {
        match result {
            Ok(ack) => ack.into(),
            Err(err) => (&err).into(),
        }
    }
}
