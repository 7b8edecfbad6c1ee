/// Writer and reader handles for concurrent use
///
/// 用于并发场景的写句柄与读句柄
///
/// A [`RingBuffer`](crate::RingBuffer) split with `split()` yields exactly one
/// [`Writer`] and one [`Reader`]. Neither is `Clone`, so a second concurrent
/// writer or reader cannot be expressed. Each handle only ever advances its own
/// counter and caches the last value it saw of the other side's.
///
/// 通过 `split()` 拆分 `RingBuffer` 恰好得到一个 `Writer` 和一个 `Reader`。二者都不可克隆，
/// 因此无法构造第二个并发写端或读端。每个句柄只推进自己的计数器，并缓存上次观察到的对端计数器。
use std::fmt;
use std::io;

use tracing::trace;

use crate::core::RingCore;
use crate::error::{ReadError, WriteError};
use crate::shim::sync::Arc;

/// Writer half of the ring buffer
///
/// 环形缓冲区的写端
pub struct Writer {
    /// Shared core
    ///
    /// 共享核心
    core: Arc<RingCore>,

    /// Cached tail for performance (avoid reading the reader's counter repeatedly)
    ///
    /// 缓存的 tail 以提升性能（避免重复读取读端的计数器）
    cached_tail: u64,
}

/// Reader half of the ring buffer
///
/// 环形缓冲区的读端
pub struct Reader {
    /// Shared core
    ///
    /// 共享核心
    core: Arc<RingCore>,

    /// Cached head for performance (avoid reading the writer's counter repeatedly)
    ///
    /// 缓存的 head 以提升性能（避免重复读取写端的计数器）
    cached_head: u64,
}

impl Writer {
    pub(crate) fn new(core: Arc<RingCore>, cached_tail: u64) -> Self {
        Self { core, cached_tail }
    }

    #[inline]
    pub(crate) fn core(&self) -> &Arc<RingCore> {
        &self.core
    }

    pub(crate) fn into_core(self) -> Arc<RingCore> {
        self.core
    }

    /// Get the capacity of the buffer
    ///
    /// 获取缓冲区容量
    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Get the number of unread bytes
    ///
    /// 获取未读字节数
    ///
    /// The value may be stale as soon as it is returned if the reader is active.
    ///
    /// 若读端处于活动状态，返回值可能立即过期。
    #[inline]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Get the number of bytes that can currently be written
    ///
    /// 获取当前可写入的字节数
    #[inline]
    pub fn space(&self) -> usize {
        self.capacity() - self.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Write as much of `data` as fits
    ///
    /// 尽可能多地写入 `data`
    ///
    /// Never blocks. Bytes that did not fit stay with the caller.
    ///
    /// 从不阻塞。未能写入的字节仍由调用者持有。
    ///
    /// # Errors
    /// Returns `WriteError::NoSpace` with the accepted count if `data` did not
    /// fully fit, including when nothing fit.
    ///
    /// # 错误
    /// `data` 未能完全写入时（包括一个字节都未写入）返回携带已写入字节数的 `WriteError::NoSpace`。
    #[inline]
    pub fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        // SAFETY: this is the only `Writer` for the core and `cached_tail`
        // only ever holds values previously loaded from `tail`.
        unsafe { self.core.write(data, &mut self.cached_tail) }
    }
}

impl Reader {
    pub(crate) fn new(core: Arc<RingCore>, cached_head: u64) -> Self {
        Self { core, cached_head }
    }

    #[inline]
    pub(crate) fn core(&self) -> &Arc<RingCore> {
        &self.core
    }

    /// Get the capacity of the buffer
    ///
    /// 获取缓冲区容量
    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Get the number of unread bytes
    ///
    /// 获取未读字节数
    #[inline]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Get the number of bytes that can currently be written
    ///
    /// 获取当前可写入的字节数
    #[inline]
    pub fn space(&self) -> usize {
        self.capacity() - self.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Read up to `dst.len()` unread bytes
    ///
    /// 读取最多 `dst.len()` 个未读字节
    ///
    /// Asking for more than is available is a partial read, not an error.
    ///
    /// 请求量超过可用量时为部分读取，而非错误。
    ///
    /// # Errors
    /// Returns `ReadError::EndOfData` when nothing is unread and `dst` is not
    /// empty.
    ///
    /// # 错误
    /// 没有未读数据且 `dst` 非空时返回 `ReadError::EndOfData`。
    #[inline]
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize, ReadError> {
        // SAFETY: this is the only `Reader` for the core and `cached_head`
        // only ever holds values previously loaded from `head`.
        unsafe { self.core.read(dst, &mut self.cached_head) }
    }

    /// Copy unread bytes into `dst` without consuming them
    ///
    /// 将未读字节拷贝到 `dst`，但不消费
    ///
    /// # Returns
    /// Number of bytes copied, `0` if the buffer is empty
    ///
    /// # 返回值
    /// 拷贝的字节数，缓冲区为空时为 `0`
    pub fn peek(&mut self, dst: &mut [u8]) -> usize {
        // SAFETY: see `read`.
        unsafe { self.core.peek(dst, &mut self.cached_head) }
    }

    /// Discard every byte that is unread at the time of the call
    ///
    /// 丢弃调用时刻所有未读字节
    ///
    /// Bytes the writer publishes concurrently may or may not be discarded.
    ///
    /// 与写端并发发布的字节可能被丢弃，也可能不会。
    ///
    /// # Returns
    /// Number of bytes discarded
    ///
    /// # 返回值
    /// 被丢弃的字节数
    pub fn clear(&mut self) -> usize {
        // SAFETY: see `read`.
        let discarded = unsafe { self.core.discard(&mut self.cached_head) };
        trace!(discarded, "cleared ring buffer");
        discarded
    }
}

/// Partial writes report the accepted count; a full buffer reports `WouldBlock`.
impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match Writer::write(self, buf) {
            Ok(n) => Ok(n),
            Err(WriteError::NoSpace { written: 0, .. }) => Err(io::ErrorKind::WouldBlock.into()),
            Err(err) => Ok(err.written()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An empty buffer reports `WouldBlock` rather than `Ok(0)`, which `std::io`
/// reserves for a stream that has ended for good.
impl io::Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(Reader::read(self, buf)?)
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
