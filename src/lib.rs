//! # Lock-Free SPSC Byte Ring Buffer
//!
//! 无锁 SPSC 环形字节缓冲区
//!
//! `bytering` is a fixed-capacity circular byte buffer for exactly one writer
//! and one reader running in parallel without locks. It is an undifferentiated
//! byte stream, not a message queue.
//!
//! `bytering` 是一个固定容量的环形字节缓冲区，供恰好一个写端和一个读端无锁并行使用。
//! 它是无边界的字节流，而不是消息队列。
//!
//! ## Design
//!
//! 设计
//!
//! - **Monotonic counters** - `head` counts every byte ever written, `tail`
//!   every byte ever read. Unread length is `head - tail`, so full and empty
//!   are never confused and no slot is reserved
//! - **Modulo at access** - physical offsets are `counter % capacity`, any
//!   capacity works (no power-of-two rounding)
//! - **Release/Acquire publication** - each side publishes its counter with a
//!   release store after its copy completes; the other side acquires it
//! - **Ownership tokens** - `split()` hands out one `Writer` and one `Reader`,
//!   neither cloneable; `reset()` needs the reunited `RingBuffer`
//! - **No allocation after construction** - storage is reused in place
//!
//! - **单调计数器** - `head` 统计累计写入字节数，`tail` 统计累计读取字节数。未读长度为 `head - tail`，
//!   满与空不会混淆，也无需预留槽位
//! - **访问时取模** - 物理偏移为 `counter % capacity`，支持任意容量（不向上取整到 2 的幂次）
//! - **Release/Acquire 发布** - 每一端在拷贝完成后以 release 存储发布自己的计数器，对端以 acquire 读取
//! - **所有权令牌** - `split()` 产生一个 `Writer` 和一个 `Reader`，均不可克隆；`reset()` 需要合并后的 `RingBuffer`
//! - **构造后不再分配** - 存储原地复用
//!
//! ## Quick Start
//!
//! 快速开始
//!
//! ```rust
//! use bytering::{ReadError, RingBuffer, WriteError};
//! use std::num::NonZero;
//!
//! let mut buf = RingBuffer::new(NonZero::new(10).unwrap());
//!
//! assert_eq!(buf.write(b"abcdefghij"), Ok(10));
//! assert_eq!(buf.space(), 0);
//! assert_eq!(
//!     buf.write(b"k"),
//!     Err(WriteError::NoSpace { written: 0, requested: 1 })
//! );
//!
//! let mut out = [0u8; 4];
//! assert_eq!(buf.read(&mut out), Ok(4));
//! assert_eq!(&out, b"abcd");
//!
//! buf.reset();
//! assert_eq!(buf.read(&mut out), Err(ReadError::EndOfData));
//! ```
//!
//! ## Multi-threaded Usage
//!
//! 多线程使用
//!
//! ```rust
//! use bytering::RingBuffer;
//! use std::io::{Read, Write, ErrorKind};
//! use std::num::NonZero;
//! use std::thread;
//!
//! let (mut writer, mut reader) = RingBuffer::new(NonZero::new(8).unwrap()).split();
//! let payload: Vec<u8> = (0..=255).collect();
//! let expected = payload.clone();
//!
//! // Writer thread, driven through `std::io::Write`
//! // 写线程，通过 `std::io::Write` 驱动
//! let writer_handle = thread::spawn(move || {
//!     let mut rest = &payload[..];
//!     while !rest.is_empty() {
//!         match Write::write(&mut writer, rest) {
//!             Ok(n) => rest = &rest[n..],
//!             Err(e) if e.kind() == ErrorKind::WouldBlock => thread::yield_now(),
//!             Err(e) => panic!("{e}"),
//!         }
//!     }
//! });
//!
//! // Reader thread
//! // 读线程
//! let reader_handle = thread::spawn(move || {
//!     let mut received = Vec::new();
//!     let mut chunk = [0u8; 5];
//!     while received.len() < 256 {
//!         match Read::read(&mut reader, &mut chunk) {
//!             Ok(n) => received.extend_from_slice(&chunk[..n]),
//!             Err(e) if e.kind() == ErrorKind::WouldBlock => thread::yield_now(),
//!             Err(e) => panic!("{e}"),
//!         }
//!     }
//!     received
//! });
//!
//! writer_handle.join().unwrap();
//! assert_eq!(reader_handle.join().unwrap(), expected);
//! ```
//!
//! ## Notes
//!
//! 注意事项
//!
//! - Reads and writes never block; poll or layer your own notification on top
//! - Any capacity ≥ 1 is accepted as-is
//! - Storage bytes are not wiped by `reset()`
//!
//! - 读写从不阻塞；请轮询或自行在上层叠加通知机制
//! - 接受任意 ≥ 1 的容量，不做调整
//! - `reset()` 不会擦除存储中的字节

mod buffer;
mod core;
mod error;
mod shim;
mod spsc;
mod storage;


pub use buffer::RingBuffer;
pub use error::{ReadError, ReuniteError, StorageError, WriteError};
pub use spsc::{Reader, Writer};
