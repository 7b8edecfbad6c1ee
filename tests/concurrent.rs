//! Two-thread integrity tests. Run under ThreadSanitizer for the data-race
//! check:
//!
//! `RUSTFLAGS="-Zsanitizer=thread" cargo +nightly test -Zbuild-std --target x86_64-unknown-linux-gnu --test concurrent`

#![cfg(not(feature = "loom"))]

use std::io::{self, Read, Write};
use std::num::NonZero;
use std::thread;

use bytering::{ReadError, RingBuffer, WriteError};
use proptest::prelude::RngCore;
use proptest::test_runner::TestRunner;
use tracing_subscriber::EnvFilter;

const PAYLOAD_LEN: usize = 100_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn random_payload(len: usize) -> Vec<u8> {
    let mut payload = vec![0u8; len];
    TestRunner::deterministic().rng().fill_bytes(&mut payload);
    payload
}

#[test]
fn test_single_byte_writes_and_reads() {
    init_tracing();

    let payload = random_payload(PAYLOAD_LEN);
    let (mut writer, mut reader) = RingBuffer::new(NonZero::new(15).unwrap()).split();

    let source = payload.clone();
    let writer_handle = thread::spawn(move || {
        for byte in source.chunks(1) {
            loop {
                match writer.write(byte) {
                    Ok(1) => break,
                    Err(WriteError::NoSpace { written: 0, .. }) => continue,
                    other => panic!("unexpected write result: {other:?}"),
                }
            }
        }
    });

    let mut received = vec![0u8; PAYLOAD_LEN];
    for slot in received.chunks_mut(1) {
        loop {
            match reader.read(slot) {
                Ok(1) => break,
                Err(ReadError::EndOfData) => continue,
                other => panic!("unexpected read result: {other:?}"),
            }
        }
    }

    writer_handle.join().unwrap();
    assert!(received == payload, "read bytes differ from written bytes");
    assert!(reader.is_empty());
}

#[test]
fn test_chunked_writes_and_reads() {
    init_tracing();

    let payload = random_payload(PAYLOAD_LEN);
    let (mut writer, mut reader) = RingBuffer::new(NonZero::new(15).unwrap()).split();

    let source = payload.clone();
    let writer_handle = thread::spawn(move || {
        // Uneven chunk sizes so the wrap point keeps moving
        for chunk in source.chunks(7) {
            let mut rest = chunk;
            while !rest.is_empty() {
                match writer.write(rest) {
                    Ok(n) => rest = &rest[n..],
                    Err(err) => {
                        rest = &rest[err.written()..];
                        thread::yield_now();
                    }
                }
            }
        }
        writer
    });

    let mut received = Vec::with_capacity(PAYLOAD_LEN);
    let mut chunk = [0u8; 11];
    while received.len() < PAYLOAD_LEN {
        match reader.read(&mut chunk) {
            Ok(n) => received.extend_from_slice(&chunk[..n]),
            Err(ReadError::EndOfData) => thread::yield_now(),
        }
    }

    let writer = writer_handle.join().unwrap();
    assert!(received == payload, "read bytes differ from written bytes");

    let buf = RingBuffer::reunite(writer, reader).unwrap();
    assert!(buf.is_empty());
}

#[test]
fn test_io_traits_across_threads() {
    init_tracing();

    let payload = random_payload(PAYLOAD_LEN / 10);
    let (mut writer, mut reader) = RingBuffer::new(NonZero::new(64).unwrap()).split();

    let source = payload.clone();
    let writer_handle = thread::spawn(move || {
        let mut rest = &source[..];
        while !rest.is_empty() {
            match Write::write(&mut writer, rest) {
                Ok(n) => rest = &rest[n..],
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::yield_now(),
                Err(e) => panic!("write failed: {e}"),
            }
        }
        writer.flush().unwrap();
    });

    let mut received = Vec::with_capacity(payload.len());
    let mut chunk = [0u8; 100];
    while received.len() < payload.len() {
        match Read::read(&mut reader, &mut chunk) {
            Ok(n) => received.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::yield_now(),
            Err(e) => panic!("read failed: {e}"),
        }
    }

    writer_handle.join().unwrap();
    assert!(received == payload, "read bytes differ from written bytes");
}

#[test]
fn test_len_stays_in_bounds_while_racing() {
    let (mut writer, mut reader) = RingBuffer::new(NonZero::new(15).unwrap()).split();

    let writer_handle = thread::spawn(move || {
        let data = [0x5Au8; 9];
        for _ in 0..20_000 {
            let _ = writer.write(&data);
            assert!(writer.len() <= writer.capacity());
            assert!(writer.space() <= writer.capacity());
        }
    });

    let mut chunk = [0u8; 4];
    for _ in 0..20_000 {
        let _ = reader.read(&mut chunk);
        assert!(reader.len() <= reader.capacity());
    }

    writer_handle.join().unwrap();
}
