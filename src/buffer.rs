//! Owned ring buffer with exclusive access
//!
//! 独占访问的环形缓冲区
//!
//! `RingBuffer` is the form the buffer takes whenever no writer/reader pair is
//! outstanding. Holding it means holding the only reference to the counters, so
//! every `&mut self` method here (including [`RingBuffer::reset`]) is free of
//! races by construction. [`RingBuffer::split`] turns it into a [`Writer`] and a
//! [`Reader`] for use on two threads; [`RingBuffer::reunite`] turns them back.
//!
//! 当没有读写句柄存在时，缓冲区以 `RingBuffer` 的形式存在。持有它即持有计数器的唯一引用，
//! 因此这里所有 `&mut self` 方法（包括 `reset`）天然无竞争。`split` 将其拆分为跨线程使用的
//! `Writer` 与 `Reader`，`reunite` 再将它们合并回来。

use std::fmt;
use std::num::NonZero;

use tracing::debug;

use crate::core::RingCore;
use crate::error::{ReadError, ReuniteError, StorageError, WriteError};
use crate::shim::atomic::Ordering;
use crate::shim::sync::{self, Arc};
use crate::spsc::{Reader, Writer};
use crate::storage::Storage;

/// Fixed-capacity circular byte buffer
///
/// 固定容量的环形字节缓冲区
///
/// # Examples
///
/// ```
/// use bytering::{RingBuffer, WriteError};
/// use std::num::NonZero;
///
/// let mut buf = RingBuffer::new(NonZero::new(4).unwrap());
///
/// // Only the first 4 bytes fit
/// // 只有前 4 个字节能写入
/// assert_eq!(
///     buf.write(b"hello"),
///     Err(WriteError::NoSpace { written: 4, requested: 5 })
/// );
///
/// let mut out = [0u8; 8];
/// assert_eq!(buf.read(&mut out), Ok(4));
/// assert_eq!(&out[..4], b"hell");
/// ```
pub struct RingBuffer {
    /// Always the only strong reference while a `RingBuffer` exists
    ///
    /// `RingBuffer` 存在期间始终是唯一的强引用
    core: Arc<RingCore>,
}

impl RingBuffer {
    /// Create a buffer backed by freshly allocated, zeroed storage
    ///
    /// 创建由新分配的全零存储支撑的缓冲区
    pub fn new(capacity: NonZero<usize>) -> Self {
        debug!(capacity = capacity.get(), "allocating ring buffer");
        Self::with_storage(Storage::zeroed(capacity))
    }

    /// Create a buffer over caller-supplied bytes
    ///
    /// 使用调用者提供的字节创建缓冲区
    ///
    /// The bytes are adopted as-is; their previous contents are treated as
    /// stale. A `Vec<u8>` whose length equals its capacity converts without
    /// reallocating.
    ///
    /// 字节按原样接管，原内容视为过期数据。长度等于容量的 `Vec<u8>` 转换时不会重新分配。
    ///
    /// # Errors
    /// Returns `StorageError::Empty` if `storage` has zero length.
    ///
    /// # 错误
    /// `storage` 长度为 0 时返回 `StorageError::Empty`。
    pub fn from_storage(storage: impl Into<Box<[u8]>>) -> Result<Self, StorageError> {
        let storage = Storage::from_boxed(storage.into())?;
        debug!(capacity = storage.len(), "adopting caller storage");
        Ok(Self::with_storage(storage))
    }

    fn with_storage(storage: Storage) -> Self {
        Self {
            core: Arc::new(RingCore::new(storage)),
        }
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

    /// Get the number of bytes that can be written before the buffer is full
    ///
    /// 获取缓冲区写满前还能写入的字节数
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
    /// # Errors
    /// Returns `WriteError::NoSpace` carrying the accepted count when not all
    /// of `data` fit. An empty `data` always succeeds with `Ok(0)`.
    ///
    /// # 错误
    /// 未能全部写入时返回携带已写入字节数的 `WriteError::NoSpace`。空的 `data` 总是返回 `Ok(0)`。
    pub fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        let mut tail = self.core.tail().load(Ordering::Relaxed);
        // SAFETY: `&mut self` on the sole reference excludes any other writer.
        unsafe { self.core.write(data, &mut tail) }
    }

    /// Read up to `dst.len()` unread bytes
    ///
    /// 读取最多 `dst.len()` 个未读字节
    ///
    /// # Errors
    /// Returns `ReadError::EndOfData` when the buffer is empty and `dst` is
    /// not. An empty `dst` always succeeds with `Ok(0)`.
    ///
    /// # 错误
    /// 缓冲区为空且 `dst` 非空时返回 `ReadError::EndOfData`。空的 `dst` 总是返回 `Ok(0)`。
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize, ReadError> {
        let mut head = self.core.head().load(Ordering::Relaxed);
        // SAFETY: `&mut self` on the sole reference excludes any other reader.
        unsafe { self.core.read(dst, &mut head) }
    }

    /// Logically clear the buffer by zeroing both counters
    ///
    /// 将两个计数器清零，逻辑上清空缓冲区
    ///
    /// Storage bytes are not wiped.
    ///
    /// 不会擦除存储中的字节。
    pub fn reset(&mut self) {
        debug!(capacity = self.capacity(), discarded = self.len(), "resetting ring buffer");
        self.core.reset();
    }

    /// Split into a writer handle and a reader handle
    ///
    /// 拆分为写句柄与读句柄
    ///
    /// Neither handle can be cloned, so at most one thread writes and at most
    /// one thread reads.
    ///
    /// 两个句柄都不可克隆，因此最多只有一个线程写、一个线程读。
    ///
    /// # Examples
    ///
    /// ```
    /// use bytering::RingBuffer;
    /// use std::num::NonZero;
    /// use std::thread;
    ///
    /// let (mut writer, mut reader) = RingBuffer::new(NonZero::new(16).unwrap()).split();
    ///
    /// let producer = thread::spawn(move || {
    ///     let mut data: &[u8] = b"lock-free bytes";
    ///     while !data.is_empty() {
    ///         match writer.write(data) {
    ///             Ok(n) => data = &data[n..],
    ///             Err(err) => {
    ///                 data = &data[err.written()..];
    ///                 thread::yield_now();
    ///             }
    ///         }
    ///     }
    ///     writer
    /// });
    ///
    /// let mut out = Vec::new();
    /// let mut chunk = [0u8; 4];
    /// while out.len() < 15 {
    ///     match reader.read(&mut chunk) {
    ///         Ok(n) => out.extend_from_slice(&chunk[..n]),
    ///         Err(_) => thread::yield_now(),
    ///     }
    /// }
    /// assert_eq!(out, b"lock-free bytes");
    ///
    /// let writer = producer.join().unwrap();
    /// let buf = bytering::RingBuffer::reunite(writer, reader).unwrap();
    /// assert!(buf.is_empty());
    /// ```
    pub fn split(self) -> (Writer, Reader) {
        debug!(capacity = self.capacity(), "splitting ring buffer into writer and reader");
        let head = self.core.head().load(Ordering::Relaxed);
        let tail = self.core.tail().load(Ordering::Relaxed);
        let writer = Writer::new(self.core.clone(), tail);
        let reader = Reader::new(self.core, head);
        (writer, reader)
    }

    /// Rejoin a writer and a reader split from the same buffer
    ///
    /// 合并来自同一缓冲区的写句柄与读句柄
    ///
    /// Unread bytes are kept.
    ///
    /// 未读字节会被保留。
    ///
    /// # Errors
    /// Returns both handles inside `ReuniteError` if they belong to different
    /// buffers.
    ///
    /// # 错误
    /// 若两个句柄属于不同缓冲区，则在 `ReuniteError` 中原样返回。
    pub fn reunite(writer: Writer, reader: Reader) -> Result<Self, ReuniteError> {
        if !Arc::ptr_eq(writer.core(), reader.core()) {
            return Err(ReuniteError { writer, reader });
        }
        drop(reader);
        let core = writer.into_core();
        debug!(capacity = core.capacity(), unread = core.len(), "reunited ring buffer");
        Ok(Self { core })
    }

    /// Give the backing storage back to the caller
    ///
    /// 将底层存储归还给调用者
    pub fn into_storage(self) -> Box<[u8]> {
        debug!(capacity = self.capacity(), "releasing ring buffer storage");
        match sync::into_inner(self.core) {
            Some(core) => core.into_storage().into_boxed(),
            None => unreachable!("RingBuffer holds the only reference to its core"),
        }
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let buf = RingBuffer::new(NonZero::new(10).unwrap());
        assert_eq!(buf.capacity(), 10);
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.space(), 10);
        assert!(buf.is_empty());
        assert!(!buf.is_full());
    }

    #[test]
    fn test_from_storage_reuses_allocation() {
        let bytes = vec![0xAAu8; 32];
        let addr = bytes.as_ptr();

        let mut buf = RingBuffer::from_storage(bytes).unwrap();
        assert_eq!(buf.capacity(), 32);
        // Previous contents are stale, not unread data
        assert!(buf.is_empty());
        assert_eq!(buf.read(&mut [0u8; 4]), Err(ReadError::EndOfData));

        buf.write(b"abc").unwrap();
        let storage = buf.into_storage();
        assert_eq!(storage.as_ptr(), addr);
        assert_eq!(&storage[..4], b"abc\xAA");
    }

    #[test]
    fn test_from_storage_empty() {
        assert_eq!(
            RingBuffer::from_storage(Vec::<u8>::new()).unwrap_err(),
            StorageError::Empty
        );
    }

    #[test]
    fn test_reset_does_not_wipe_storage() {
        let mut buf = RingBuffer::new(NonZero::new(4).unwrap());
        buf.write(b"wxyz").unwrap();
        buf.reset();

        assert!(buf.is_empty());
        assert_eq!(&*buf.into_storage(), b"wxyz");
    }

    #[test]
    fn test_split_keeps_unread_bytes() {
        let mut buf = RingBuffer::new(NonZero::new(8).unwrap());
        buf.write(b"abc").unwrap();

        let (writer, mut reader) = buf.split();
        assert_eq!(writer.len(), 3);

        let mut out = [0u8; 8];
        assert_eq!(reader.read(&mut out), Ok(3));
        assert_eq!(&out[..3], b"abc");
    }

    #[test]
    fn test_reunite_roundtrip() {
        let buf = RingBuffer::new(NonZero::new(8).unwrap());
        let (mut writer, reader) = buf.split();
        writer.write(b"left").unwrap();

        let mut buf = RingBuffer::reunite(writer, reader).unwrap();
        assert_eq!(buf.len(), 4);

        buf.reset();
        assert_eq!(buf.space(), 8);
    }

    #[test]
    fn test_reunite_mismatched() {
        let (w1, r1) = RingBuffer::new(NonZero::new(4).unwrap()).split();
        let (w2, r2) = RingBuffer::new(NonZero::new(8).unwrap()).split();

        let err = RingBuffer::reunite(w1, r2).unwrap_err();
        assert_eq!(err.writer.capacity(), 4);
        assert_eq!(err.reader.capacity(), 8);

        assert!(RingBuffer::reunite(err.writer, r1).is_ok());
        assert!(RingBuffer::reunite(w2, err.reader).is_ok());
    }
}
