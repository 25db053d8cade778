use std::fs;

use nicpath_core::{
    CaptureOptions, CapturedFrame, FrameOutcome, PacketSource, PcapFileSource, SourceError, pack,
    unpack_capture, write_pcapng,
};
use pcap_parser::Linktype;

fn frame(payload: &[u8]) -> Vec<u8> {
    pack(
        "02:00:00:00:00:0a",
        "02:00:00:00:00:0b",
        "172.16.0.1",
        "172.16.0.2",
        6000,
        6001,
        payload,
    )
    .unwrap()
}

#[test]
fn pcap_source_reads_frames_written_by_sink() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frames.pcapng");
    let frames = vec![
        CapturedFrame {
            ts_us: 1_000_000,
            data: frame(b"a"),
        },
        CapturedFrame {
            ts_us: 1_000_250,
            data: frame(b"bcd"),
        },
    ];
    write_pcapng(&path, &frames).unwrap();

    let mut source = PcapFileSource::open(&path).unwrap();
    let mut seen = Vec::new();
    while let Some(event) = source.next_packet().unwrap() {
        assert_eq!(event.linktype, Linktype::ETHERNET);
        seen.push(CapturedFrame {
            ts_us: event.ts_us.unwrap(),
            data: event.data,
        });
    }
    assert_eq!(seen, frames);
}

#[test]
fn pcap_source_strips_block_padding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.pcapng");
    let hello = pack(
        "00:00:00:00:00:01",
        "00:00:00:00:00:02",
        "192.168.1.2",
        "192.168.1.3",
        8000,
        8001,
        b"Hello World!",
    )
    .unwrap();
    assert_eq!(hello.len() % 4, 2);
    write_pcapng(
        &path,
        &[CapturedFrame {
            ts_us: 0,
            data: hello.clone(),
        }],
    )
    .unwrap();

    let mut source = PcapFileSource::open(&path).unwrap();
    let event = source.next_packet().unwrap().unwrap();
    assert_eq!(event.data, hello);
    assert!(source.next_packet().unwrap().is_none());

    let report = unpack_capture(&path, &CaptureOptions { fcs_present: true }).unwrap();
    assert_eq!(report.summary.unpacked, 1);
    assert_eq!(report.frames[0].len, 58);
    match &report.frames[0].outcome {
        FrameOutcome::Unpacked { packet, .. } => assert_eq!(packet.payload, b"Hello World!"),
        other => panic!("expected unpacked frame, got {other:?}"),
    }
}

#[test]
fn unpack_capture_reports_every_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.pcapng");
    let mut corrupted = frame(b"oops");
    let last = corrupted.len() - 1;
    corrupted[last] ^= 0xff;
    let frames = vec![
        CapturedFrame {
            ts_us: 10,
            data: frame(b"fine"),
        },
        CapturedFrame {
            ts_us: 20,
            data: corrupted,
        },
        CapturedFrame {
            ts_us: 30,
            data: vec![0xff; 60],
        },
    ];
    write_pcapng(&path, &frames).unwrap();

    let options = CaptureOptions { fcs_present: true };
    let report = unpack_capture(&path, &options).unwrap();
    assert_eq!(report.input.bytes, fs::metadata(&path).unwrap().len());
    assert_eq!(report.summary.frames_total, 3);
    assert_eq!(report.summary.unpacked, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(
        report.summary.time_start.as_deref(),
        Some("1970-01-01T00:00:00.00001Z")
    );
    assert!(matches!(
        report.frames[0].outcome,
        FrameOutcome::Unpacked {
            header_checksum_valid: true,
            ..
        }
    ));
}

#[test]
fn pcap_source_rejects_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.pcapng");
    fs::write(&path, [0x0a, 0x0d, 0x0d]).unwrap();

    let err = match PcapFileSource::open(&path) {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Io(_)));
}

#[test]
fn missing_capture_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = unpack_capture(&dir.path().join("absent.pcap"), &CaptureOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("I/O error"), "{err}");
}
