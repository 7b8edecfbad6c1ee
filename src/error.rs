//! Error types for ring buffer operations
//!
//! 环形缓冲区操作的错误类型
//!
//! Both `WriteError` and `ReadError` describe expected, recoverable states of a
//! non-blocking byte stream. Callers retry later.
//!
//! `WriteError` 与 `ReadError` 都是非阻塞字节流中预期内、可恢复的状态，调用者稍后重试即可。

use std::io;

use thiserror::Error;

use crate::spsc::{Reader, Writer};

/// Error for write operations
///
/// 写操作错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The input did not fully fit. `written` bytes were accepted, the rest
    /// was left with the caller.
    ///
    /// 输入未能完全写入。已接受 `written` 字节，剩余部分仍由调用者持有。
    #[error("no space in buffer: wrote {written} of {requested} bytes")]
    NoSpace { written: usize, requested: usize },
}

impl WriteError {
    /// Number of bytes accepted before space ran out
    ///
    /// 空间耗尽前已写入的字节数
    #[inline]
    pub fn written(&self) -> usize {
        match self {
            Self::NoSpace { written, .. } => *written,
        }
    }
}

/// Error for read operations
///
/// 读操作错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The buffer holds no unread bytes
    ///
    /// 缓冲区中没有未读字节
    #[error("end of data: buffer is empty")]
    EndOfData,
}

/// Error for constructing a buffer from caller storage
///
/// 使用调用者提供的存储构造缓冲区时的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("ring buffer storage must not be empty")]
    Empty,
}

/// Returned by [`RingBuffer::reunite`](crate::RingBuffer::reunite) when the
/// handles were split from different buffers. Both handles are given back.
///
/// 当两个句柄来自不同缓冲区时由 `reunite` 返回，两个句柄原样归还。
#[derive(Debug, Error)]
#[error("writer and reader belong to different ring buffers")]
pub struct ReuniteError {
    pub writer: Writer,
    pub reader: Reader,
}

impl From<WriteError> for io::Error {
    fn from(err: WriteError) -> Self {
        io::Error::new(io::ErrorKind::WouldBlock, err)
    }
}

impl From<ReadError> for io::Error {
    fn from(err: ReadError) -> Self {
        io::Error::new(io::ErrorKind::WouldBlock, err)
    }
}
