mod common;

use std::fs;
use std::path::Path;

use aes::Aes128;
use cipher::{BlockDecryptMut, KeyIvInit};
use rand::SeedableRng;
use rand::rngs::StdRng;

use common::*;
use hls_segmenter::core::run_with_keys;
use hls_segmenter::crypto::iv_for_sequence;
use hls_segmenter::hls::{CutterKind, InputSource, Options, PlaylistMode, run};
use hls_segmenter::keys::RandomKeys;
use hls_segmenter::Termination;

fn options(dir: &Path, input: &[u8], kind: CutterKind) -> Options {
    let src = dir.join("input.bin");
    fs::write(&src, input).unwrap();
    Options {
        input: InputSource::File(src),
        kind,
        output_pattern: dir.join("seg-???.ts").to_string_lossy().into_owned(),
        key_pattern: dir.join("key-??.key").to_string_lossy().into_owned(),
        index: dir.join("index.m3u8"),
        ..Options::default()
    }
}

fn extinf(index: &Path) -> Vec<u64> {
    fs::read_to_string(index)
        .unwrap()
        .lines()
        .filter_map(|l| l.strip_prefix("#EXTINF:"))
        .map(|l| l.trim_end_matches(',').parse().unwrap())
        .collect()
}

fn decrypt(data: &[u8], key: &[u8], iv: &[u8; 16]) -> Vec<u8> {
    let mut dec = cbc::Decryptor::<Aes128>::new(key.into(), iv.into());
    let mut out = data.to_vec();
    for block in out.chunks_exact_mut(16) {
        dec.decrypt_block_mut(aes::Block::from_mut_slice(block));
    }
    let pad = *out.last().unwrap() as usize;
    out.truncate(out.len() - pad);
    out
}

#[test]
fn adts_session_writes_segments_and_index() {
    let dir = tempfile::tempdir().unwrap();
    let input = adts_stream(2000);
    let opts = options(dir.path(), &input, CutterKind::Adts);

    let summary = run(&opts).unwrap();
    assert_eq!(summary.segments, 5);
    assert_eq!(summary.total_secs, 42);
    assert_eq!(summary.bytes, input.len() as u64);
    assert_eq!(summary.termination, Termination::EndOfStream);

    // the last entry gets one extra second
    assert_eq!(extinf(&opts.index), [10, 10, 10, 10, 3]);
    let text = fs::read_to_string(&opts.index).unwrap();
    assert!(text.starts_with("#EXTM3U\n#EXT-X-TARGETDURATION:10\n#EXT-X-MEDIA-SEQUENCE:1\n"));
    assert!(text.ends_with("#EXT-X-ENDLIST\n"));

    let mut joined = Vec::new();
    for seq in 1..=5 {
        joined.extend(fs::read(dir.path().join(format!("seg-{seq:03x}.ts"))).unwrap());
    }
    assert_eq!(joined, input);
}

#[test]
fn encrypted_session_rotates_keys() {
    let dir = tempfile::tempdir().unwrap();
    let input: Vec<u8> = (0..1000u32).map(|i| (i * 7) as u8).collect();
    let opts = Options {
        length: 3,
        extra: "100".into(),
        crypto_every: Some(2),
        key_prefix: "https://keys/".into(),
        ..options(dir.path(), &input, CutterKind::Fixed)
    };

    let summary = run_with_keys(&opts, &mut RandomKeys::from_rng(StdRng::seed_from_u64(3))).unwrap();
    assert_eq!(summary.segments, 4);

    let key = |seq: u64| fs::read(dir.path().join(format!("key-{seq:02x}.key"))).unwrap();
    assert!(!dir.path().join("key-02.key").exists());
    assert!(!dir.path().join("key-04.key").exists());
    assert_ne!(key(1), key(3));

    for (seq, key_seq, range) in [(1u64, 1u64, 0..300), (2, 1, 300..600), (3, 3, 600..900), (4, 3, 900..1000)] {
        let seg = fs::read(dir.path().join(format!("seg-{seq:03x}.ts"))).unwrap();
        assert_eq!(seg.len() % 16, 0);
        assert_eq!(decrypt(&seg, &key(key_seq), &iv_for_sequence(seq)), &input[range]);
    }

    let key_lines: Vec<String> = fs::read_to_string(&opts.index)
        .unwrap()
        .lines()
        .filter(|l| l.starts_with("#EXT-X-KEY"))
        .map(str::to_string)
        .collect();
    assert_eq!(key_lines.len(), 2);
    assert!(key_lines[0].starts_with("#EXT-X-KEY:METHOD=AES-128,URI=\"https://keys/"));
    assert!(key_lines[1].ends_with("key-03.key\""));
}

#[test]
fn live_session_keeps_a_window() {
    let dir = tempfile::tempdir().unwrap();
    let stream = TsStream::default();
    let opts = Options {
        length: 4,
        playlist: PlaylistMode::Live { window: 2 },
        ..options(dir.path(), &stream.bytes(), CutterKind::Mpegts)
    };

    let summary = run(&opts).unwrap();
    assert_eq!(summary.segments, 8);

    let text = fs::read_to_string(&opts.index).unwrap();
    assert!(text.contains("#EXT-X-MEDIA-SEQUENCE:7\n"));
    assert!(text.ends_with("#EXT-X-ENDLIST\n"));
    assert_eq!(extinf(&opts.index), [4, 2]);

    for seq in 1..=6 {
        assert!(!dir.path().join(format!("seg-{seq:03x}.ts")).exists());
    }
    assert!(dir.path().join("seg-007.ts").exists());
    assert!(dir.path().join("seg-008.ts").exists());
}

#[test]
fn bad_configuration_fails_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let opts = Options {
        output_pattern: dir.path().join("plain.ts").to_string_lossy().into_owned(),
        ..options(dir.path(), &adts_stream(10), CutterKind::Adts)
    };
    assert!(run(&opts).is_err());
    assert!(!opts.index.exists());

    let opts = Options { extra: "everything".into(), ..options(dir.path(), &[], CutterKind::Mpegts) };
    assert!(run(&opts).is_err());
    assert!(!opts.index.exists());
}
