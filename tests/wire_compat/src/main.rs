fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chunkwire_protocol::{Frame, parse_frame, split_messages};
    use chunkwire_transfer::{
        Ack, AssembleError, Assembler, AssemblerConfig, EncodeOptions, Reply, TransferError,
        checksum_bytes, encode_transfer,
    };
    use serde::Deserialize;
    use tempfile::TempDir;

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn load_fixture(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    fn load_bytes(name: &str) -> Vec<u8> {
        let path = fixtures_dir().join(name);
        fs::read(&path).unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    fn assembler(root: &TempDir) -> Assembler {
        Assembler::new(AssemblerConfig::new(root.path())).unwrap()
    }

    /// Feeds every block of a transcript fixture, returning one outcome per
    /// recognized frame.
    fn replay(assembler: &Assembler, name: &str) -> Vec<Result<Ack, AssembleError>> {
        split_messages(&load_fixture(name))
            .iter()
            .filter_map(|block| assembler.on_message(block, "wire").transpose())
            .collect()
    }

    // --- Transcripts produced by an independent encoder ---

    #[test]
    fn gzip_transcript_out_of_order() {
        let root = TempDir::new().unwrap();
        let assembler = assembler(&root);
        let outcomes = replay(&assembler, "gzip_out_of_order.txt");

        // Leading chatter is ignored; start + 8 chunks + end remain.
        assert_eq!(outcomes.len(), 10);
        assert!(outcomes.iter().all(Result::is_ok));
        assert!(matches!(
            outcomes[0],
            Ok(Ack::Start { ref id, total: 8 }) if id == "notes-1"
        ));

        let written = root.path().join("docs/release_notes.md");
        assert_eq!(fs::read(&written).unwrap(), load_bytes("release_notes.md"));
        assert_eq!(assembler.active_sessions(), 0);
    }

    #[test]
    fn crlf_transcript_uncompressed_binary() {
        let root = TempDir::new().unwrap();
        let assembler = assembler(&root);
        let outcomes = replay(&assembler, "plain_crlf.txt");

        let Some(Ok(Ack::End { path, bytes, .. })) = outcomes.last() else {
            panic!("expected end ack, got {outcomes:?}");
        };
        assert_eq!(*bytes, 768);
        assert_eq!(fs::read(path).unwrap(), load_bytes("binary.bin"));
    }

    #[test]
    fn checksum_mismatch_is_reported() {
        let root = TempDir::new().unwrap();
        let outcomes = replay(&assembler(&root), "checksum_mismatch.txt");

        let Some(Err(err)) = outcomes.last() else {
            panic!("expected failure, got {outcomes:?}");
        };
        assert!(matches!(
            err,
            AssembleError::Transfer(TransferError::ChecksumMismatch { .. })
        ));
        let reply: serde_json::Value =
            serde_json::from_str(&Reply::from(err).to_json().unwrap()).unwrap();
        assert_eq!(reply["error"], "sha256 mismatch");
        assert_eq!(reply["expected"], "0".repeat(64));
        assert_eq!(reply["actual"], checksum_bytes(b"hello world\n"));
        assert!(!root.path().join("bad.txt").exists());
    }

    #[test]
    fn traversal_path_is_refused() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("inbox");
        let assembler = Assembler::new(AssemblerConfig::new(&root)).unwrap();

        let outcomes: Vec<_> = split_messages(&load_fixture("path_traversal.txt"))
            .iter()
            .filter_map(|block| assembler.on_message(block, "wire").transpose())
            .collect();

        let Some(Err(err)) = outcomes.last() else {
            panic!("expected failure, got {outcomes:?}");
        };
        assert_eq!(err.reason(), "invalid path");
        assert!(!outer.path().join("escape.txt").exists());
    }

    #[test]
    fn cancel_drops_the_session() {
        let root = TempDir::new().unwrap();
        let outcomes = replay(&assembler(&root), "cancelled.txt");

        assert_eq!(outcomes.len(), 5);
        assert!(matches!(
            outcomes[2],
            Ok(Ack::Cancel { existed: true, .. })
        ));
        assert!(matches!(
            outcomes[3],
            Err(AssembleError::NoActiveSession(ref id)) if id == "gone"
        ));
        assert!(matches!(outcomes[4], Err(AssembleError::NoActiveSession(_))));
        assert!(!root.path().join("gone.txt").exists());
    }

    #[derive(Deserialize)]
    struct FencedFixture {
        path: String,
        content: String,
        messages: Vec<String>,
    }

    #[test]
    fn fenced_messages_one_per_frame() {
        let fixture: FencedFixture =
            serde_json::from_str(&load_fixture("fenced_messages.json")).unwrap();
        let root = TempDir::new().unwrap();
        let assembler = assembler(&root);

        let mut last = None;
        for message in &fixture.messages {
            last = assembler.on_message(message, "wire").unwrap();
        }
        assert!(matches!(last, Some(Ack::End { .. })));
        assert_eq!(
            fs::read_to_string(root.path().join(&fixture.path)).unwrap(),
            fixture.content
        );
    }

    // --- Frames produced by this encoder ---

    #[test]
    fn encoder_output_matches_fixture_layout() {
        let notes = load_bytes("release_notes.md");
        let mut options = EncodeOptions::new("docs/release_notes.md");
        options.chunk_size = 40;
        options.id = Some("notes-1".into());
        let encoded = encode_transfer(&notes, &options).unwrap();

        let fixture = load_fixture("gzip_out_of_order.txt");
        let fixture_start = split_messages(&fixture)
            .into_iter()
            .find_map(|b| match parse_frame(&b) {
                Ok(Some(Frame::Start(start))) => Some(start),
                _ => None,
            })
            .unwrap();
        let Ok(Some(Frame::Start(ours))) = parse_frame(&encoded.frames[0]) else {
            panic!("first frame is not a start frame");
        };

        // Compressed bytes may differ between gzip implementations, so only
        // the header fields and the content digest are compared.
        assert_eq!(ours.id, fixture_start.id);
        assert_eq!(ours.path, fixture_start.path);
        assert_eq!(ours.encoding, fixture_start.encoding);
        assert_eq!(ours.compression, fixture_start.compression);
        assert_eq!(ours.sha256, fixture_start.sha256);
    }

    #[test]
    fn encoder_transcript_assembles() {
        let data = load_bytes("binary.bin");
        let mut options = EncodeOptions::new("round/trip.bin");
        options.chunk_size = 64;
        let encoded = encode_transfer(&data, &options).unwrap();

        let root = TempDir::new().unwrap();
        let assembler = assembler(&root);
        let mut acks = Vec::new();
        for block in split_messages(&encoded.to_transcript()) {
            acks.extend(assembler.on_message(&block, "wire").unwrap());
        }
        assert_eq!(acks.len(), encoded.total_parts as usize + 2);
        assert_eq!(fs::read(root.path().join("round/trip.bin")).unwrap(), data);
    }
}
