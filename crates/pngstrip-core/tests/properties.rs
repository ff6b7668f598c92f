//! End-to-end behavior of the walker on hand-built PNGs.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use pngstrip_core::{
    split_and_decode, ChunkType, DecodedReport, Error, StripSet, Stripper, StripperConfig,
    PNG_SIGNATURE,
};
use pretty_assertions::assert_eq;
use std::io::Write;

fn chunk(chunk_type: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(payload);
    // Arbitrary CRC; the walker must carry it through untouched
    out.extend_from_slice(&[0x12, 0x34, 0x56, 0x78]);
    out
}

fn png(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    for c in chunks {
        data.extend_from_slice(c);
    }
    data
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::best());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

fn ihdr() -> Vec<u8> {
    let mut payload = 1u32.to_be_bytes().to_vec();
    payload.extend_from_slice(&1u32.to_be_bytes());
    payload.extend_from_slice(&[8, 0, 0, 0, 0]);
    chunk(b"IHDR", &payload)
}

fn iend() -> Vec<u8> {
    chunk(b"IEND", &[])
}

/// A PNG with one of every metadata chunk interleaved with image chunks
fn metadata_rich_png() -> Vec<u8> {
    let mut ztxt = b"Comment\0\0".to_vec();
    ztxt.extend(zlib(b"compressed comment"));

    let mut itxt = b"Title\0\x01\0en\0Title\0".to_vec();
    itxt.extend(zlib("Ünïcödé".as_bytes()));

    let mut phys = 2835u32.to_be_bytes().to_vec();
    phys.extend_from_slice(&2835u32.to_be_bytes());
    phys.push(1);

    // Big-endian TIFF, one entry: Orientation (SHORT) = 1
    let mut exif = b"MM\0*\0\0\0\x08".to_vec();
    exif.extend_from_slice(&[0x00, 0x01]);
    exif.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    exif.extend_from_slice(&[0x00, 0x01, 0x00, 0x00]);
    exif.extend_from_slice(&[0, 0, 0, 0]);

    png(&[
        ihdr(),
        chunk(b"iCCP", b"Display P3\0\0\x78\x9c"),
        chunk(b"pHYs", &phys),
        chunk(b"tEXt", b"Author\0Jane"),
        chunk(b"gAMA", &[0, 0, 0xB1, 0x8F]),
        chunk(b"zTXt", &ztxt),
        chunk(b"eXIf", &exif),
        chunk(b"IDAT", &[0x78, 0x9C, 0x63, 0x00, 0x00]),
        chunk(b"iTXt", &itxt),
        chunk(b"tIME", &[0x07, 0xE9, 12, 31, 23, 59, 58]),
        iend(),
    ])
}

#[test]
fn author_scenario() {
    let kept_chunk = chunk(b"abCD", &[1, 2, 3, 4]);
    let input = png(&[kept_chunk.clone(), chunk(b"tEXt", b"Author\0Jane"), iend()]);

    let output = split_and_decode(&input, &StripSet::default()).unwrap();

    assert_eq!(
        output.reports,
        vec![(ChunkType::TEXT, DecodedReport::text("Author: Jane"))]
    );
    assert_eq!(output.kept, png(&[kept_chunk, iend()]));
    assert_eq!(output.kept.len(), 8 + (12 + 4) + 12);
}

#[test]
fn round_trip_without_metadata() {
    let input = png(&[
        ihdr(),
        chunk(b"gAMA", &[0, 0, 0xB1, 0x8F]),
        chunk(b"IDAT", &[0x78, 0x9C, 0x63, 0x00, 0x00]),
        iend(),
    ]);
    let output = split_and_decode(&input, &StripSet::default()).unwrap();
    assert!(output.reports.is_empty());
    assert_eq!(output.kept, input);
}

#[test]
fn empty_strip_set_is_identity() {
    let input = metadata_rich_png();
    let output = split_and_decode(&input, &StripSet::empty()).unwrap();
    assert!(output.is_clean());
    assert_eq!(output.kept, input);
}

#[test]
fn every_metadata_chunk_is_reported_in_order() {
    let output = split_and_decode(&metadata_rich_png(), &StripSet::default()).unwrap();

    assert_eq!(
        output.reports,
        vec![
            (
                ChunkType::ICCP,
                DecodedReport::text("profile name: Display P3")
            ),
            (
                ChunkType::PHYS,
                DecodedReport::KeyValueTable(vec![
                    ("X".into(), "2835".into()),
                    ("Y".into(), "2835".into()),
                    ("unit".into(), "meter".into()),
                ])
            ),
            (ChunkType::TEXT, DecodedReport::text("Author: Jane")),
            (
                ChunkType::ZTXT,
                DecodedReport::text("Comment: compressed comment")
            ),
            (
                ChunkType::EXIF,
                DecodedReport::List(vec!["Orientation: 1".into()])
            ),
            (ChunkType::ITXT, DecodedReport::text("Title: Ünïcödé")),
            (ChunkType::TIME, DecodedReport::text("2025/12/31 23:59:58")),
        ]
    );
}

#[test]
fn kept_chunks_preserve_order() {
    let input = metadata_rich_png();
    let output = split_and_decode(&input, &StripSet::default()).unwrap();

    let expected = png(&[
        ihdr(),
        chunk(b"gAMA", &[0, 0, 0xB1, 0x8F]),
        chunk(b"IDAT", &[0x78, 0x9C, 0x63, 0x00, 0x00]),
        iend(),
    ]);
    assert_eq!(output.kept, expected);
}

#[test]
fn walking_output_again_finds_nothing() {
    let first = split_and_decode(&metadata_rich_png(), &StripSet::default()).unwrap();
    let second = split_and_decode(&first.kept, &StripSet::default()).unwrap();
    assert!(second.reports.is_empty());
    assert_eq!(second.kept, first.kept);
}

#[test]
fn keep_overrides_default_strip_set() {
    let set = StripSet::default().keep(ChunkType::TIME);
    let output = split_and_decode(&metadata_rich_png(), &set).unwrap();
    assert!(output.reports.iter().all(|(t, _)| *t != ChunkType::TIME));

    let time = chunk(b"tIME", &[0x07, 0xE9, 12, 31, 23, 59, 58]);
    assert!(output.kept.windows(time.len()).any(|w| w == time.as_slice()));
}

#[test]
fn zlib_fallback_and_failure_marker() {
    let mut damaged = zlib(b"recovered");
    damaged[0] = 0xFF;
    damaged[1] = 0xFF;
    let mut fallback = b"Comment\0\0".to_vec();
    fallback.extend(damaged);

    let mut broken = b"Comment\0\0".to_vec();
    broken.extend_from_slice(&[0xFF; 8]);

    let input = png(&[
        ihdr(),
        chunk(b"zTXt", &fallback),
        chunk(b"zTXt", &broken),
        iend(),
    ]);
    let output = split_and_decode(&input, &StripSet::default()).unwrap();

    assert_eq!(
        output.reports,
        vec![
            (ChunkType::ZTXT, DecodedReport::text("Comment: recovered")),
            (
                ChunkType::ZTXT,
                DecodedReport::text("Comment: (decompression failed)")
            ),
        ]
    );
    assert_eq!(output.kept, png(&[ihdr(), iend()]));
}

#[test]
fn inflate_limit_turns_into_marker() {
    let mut ztxt = b"Big\0\0".to_vec();
    ztxt.extend(zlib(&[b'x'; 10_000]));
    let input = png(&[chunk(b"zTXt", &ztxt)]);

    let stripper = Stripper::with_config(StripperConfig::new().max_inflated_size(1_000));
    let output = stripper.strip(&input).unwrap();
    assert_eq!(
        output.reports,
        vec![(ChunkType::ZTXT, DecodedReport::text("Big: (decompression failed)"))]
    );
}

#[test]
fn truncated_segment_is_fatal() {
    let mut input = png(&[ihdr()]);
    // Declares 100 bytes of payload but provides 3
    input.extend_from_slice(&100u32.to_be_bytes());
    input.extend_from_slice(b"tEXt");
    input.extend_from_slice(b"abc");

    match split_and_decode(&input, &StripSet::default()) {
        Err(Error::TruncatedSegment {
            offset,
            needed,
            available,
        }) => {
            assert_eq!(offset, 33);
            assert_eq!(needed, 112);
            assert_eq!(available, 11);
        }
        other => panic!("expected TruncatedSegment, got {:?}", other),
    }
}

#[test]
fn overshooting_final_chunk_is_fatal() {
    let mut input = png(&[ihdr(), iend()]);
    input.pop();
    assert!(matches!(
        split_and_decode(&input, &StripSet::default()),
        Err(Error::TruncatedSegment { .. })
    ));
}

#[test]
fn signature_mismatch_is_fatal() {
    let mut input = metadata_rich_png();
    input[1] = b'p';
    assert!(matches!(
        split_and_decode(&input, &StripSet::default()),
        Err(Error::InvalidSignature)
    ));
    assert!(matches!(
        split_and_decode(&[], &StripSet::default()),
        Err(Error::InvalidSignature)
    ));
}
