//! Core ring buffer implementation - Shared logic for the owned buffer and the split handles
//!
//! 核心环形缓冲区实现 - 独占缓冲区与拆分句柄的共享逻辑
//!
//! This module holds the parts both access modes need:
//! - The fixed byte storage
//! - The two monotonically increasing counters (`head` = bytes ever written,
//!   `tail` = bytes ever read)
//! - The write/read algorithms, with wrap-around split into at most two copies
//!
//! 此模块包含两种访问模式共用的部分：
//! - 固定字节存储
//! - 两个单调递增计数器（`head` = 累计写入字节数，`tail` = 累计读取字节数）
//! - 读写算法，环绕时最多拆分为两次拷贝
//!
//! The counters are never wrapped back to zero except by an explicit reset.
//! Physical offsets are derived with `counter % capacity` only when storage is
//! touched, so "full" (`head - tail == capacity`) and "empty" (`head == tail`)
//! are never ambiguous and no slot has to be reserved.
//!
//! 计数器除显式 reset 外从不回绕。只有在访问存储时才用 `counter % capacity` 计算物理偏移，
//! 因此“满”（`head - tail == capacity`）与“空”（`head == tail`）不会混淆，也无需预留槽位。

use crossbeam_utils::CachePadded;
use tracing::trace;

use crate::error::{ReadError, WriteError};
use crate::shim::atomic::{AtomicU64, Ordering};
use crate::storage::Storage;

/// Core ring buffer state
///
/// 核心环形缓冲区状态
pub struct RingCore {
    /// Backing bytes, length = capacity
    ///
    /// 底层字节，长度即容量
    storage: Storage,

    /// Total bytes ever written. Only the writer advances it.
    ///
    /// 累计写入字节数，仅由写端推进
    head: CachePadded<AtomicU64>,

    /// Total bytes ever read. Only the reader advances it.
    ///
    /// 累计读取字节数，仅由读端推进
    tail: CachePadded<AtomicU64>,
}

impl RingCore {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            head: CachePadded::new(AtomicU64::new(0)),
            tail: CachePadded::new(AtomicU64::new(0)),
        }
    }

    /// Get the capacity of the buffer
    ///
    /// 获取缓冲区容量
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn head(&self) -> &AtomicU64 {
        &self.head
    }

    #[inline]
    pub fn tail(&self) -> &AtomicU64 {
        &self.tail
    }

    /// Number of unread bytes, as a point-in-time snapshot
    ///
    /// 未读字节数（瞬时快照）
    ///
    /// `tail` is loaded before `head`, so the difference can never go negative.
    /// It can overshoot when both sides move between the two loads, hence the
    /// clamp to capacity.
    ///
    /// 先加载 `tail` 再加载 `head`，差值不会为负；两次加载之间双方都推进时可能偏大，因此截断到容量。
    #[inline]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        (head - tail).min(self.capacity() as u64) as usize
    }

    /// Physical offset of a logical counter value
    #[inline]
    fn offset(&self, counter: u64) -> usize {
        (counter % self.capacity() as u64) as usize
    }

    /// Write side of the buffer
    ///
    /// 缓冲区写端
    ///
    /// `cached_tail` is the last `tail` this writer observed. It is refreshed
    /// only when the free space it implies cannot take all of `src`, so the
    /// accepted count is always exactly `min(src.len(), free space)`.
    ///
    /// `cached_tail` 是写端上次观察到的 `tail`，仅当其推算出的空闲空间不足以容纳全部 `src` 时才刷新，
    /// 因此接受的字节数始终恰为 `min(src.len(), 空闲空间)`。
    ///
    /// # Errors
    /// `WriteError::NoSpace` when fewer than `src.len()` bytes were accepted.
    ///
    /// # Safety
    /// At most one thread may call `write` at a time, and `cached_tail` must not
    /// be ahead of the real `tail`.
    ///
    /// # 安全性
    /// 同一时刻最多只能有一个线程调用 `write`，且 `cached_tail` 不得超前于真实的 `tail`。
    pub unsafe fn write(&self, src: &[u8], cached_tail: &mut u64) -> Result<usize, WriteError> {
        if src.is_empty() {
            return Ok(0);
        }

        let capacity = self.capacity() as u64;
        let head = self.head.load(Ordering::Relaxed);
        let mut space = capacity - (head - *cached_tail);

        if space < src.len() as u64 {
            // Update cached tail from reader
            // 从读端更新缓存的 tail
            *cached_tail = self.tail.load(Ordering::Acquire);
            space = capacity - (head - *cached_tail);
        }

        // space <= capacity, which fits in usize
        let n = src.len().min(space as usize);
        unsafe {
            self.copy_in(head, &src[..n]);
        }

        // Publish the bytes before the new length
        // 先发布数据，再发布新长度
        self.head.store(head + n as u64, Ordering::Release);

        if n < src.len() {
            trace!(written = n, requested = src.len(), "partial write, buffer full");
            return Err(WriteError::NoSpace {
                written: n,
                requested: src.len(),
            });
        }
        Ok(n)
    }

    /// Read side of the buffer
    ///
    /// 缓冲区读端
    ///
    /// `cached_head` is the last `head` this reader observed; refreshed only
    /// when it cannot satisfy all of `dst`.
    ///
    /// `cached_head` 是读端上次观察到的 `head`，仅当无法满足整个 `dst` 时刷新。
    ///
    /// # Errors
    /// `ReadError::EndOfData` when no unread bytes exist and `dst` is not empty.
    ///
    /// # Safety
    /// At most one thread may call `read` (or `peek`/`discard`) at a time, and
    /// `cached_head` must not be ahead of the real `head`.
    ///
    /// # 安全性
    /// 同一时刻最多只能有一个线程调用 `read`（或 `peek`/`discard`），且 `cached_head` 不得超前于真实的 `head`。
    pub unsafe fn read(&self, dst: &mut [u8], cached_head: &mut u64) -> Result<usize, ReadError> {
        if dst.is_empty() {
            return Ok(0);
        }

        let tail = self.tail.load(Ordering::Relaxed);
        let n = self.readable(tail, dst.len(), cached_head);
        if n == 0 {
            return Err(ReadError::EndOfData);
        }

        unsafe {
            self.copy_out(tail, &mut dst[..n]);
        }

        // Release the region back to the writer only after the copy is done
        // 拷贝完成后才将区域归还给写端
        self.tail.store(tail + n as u64, Ordering::Release);
        Ok(n)
    }

    /// Copy unread bytes into `dst` without consuming them
    ///
    /// 将未读字节拷贝到 `dst`，但不消费
    ///
    /// # Safety
    /// Same contract as [`RingCore::read`].
    pub unsafe fn peek(&self, dst: &mut [u8], cached_head: &mut u64) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let n = self.readable(tail, dst.len(), cached_head);
        unsafe {
            self.copy_out(tail, &mut dst[..n]);
        }
        n
    }

    /// Drop every byte that is unread right now
    ///
    /// 丢弃当前所有未读字节
    ///
    /// # Safety
    /// Same contract as [`RingCore::read`].
    pub unsafe fn discard(&self, cached_head: &mut u64) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        *cached_head = self.head.load(Ordering::Acquire);
        let n = *cached_head - tail;
        self.tail.store(*cached_head, Ordering::Release);
        n as usize
    }

    /// Zero both counters
    ///
    /// 将两个计数器清零
    ///
    /// Requires exclusive access; callers hold `&mut` on the owning buffer.
    pub fn reset(&self) {
        self.head.store(0, Ordering::Release);
        self.tail.store(0, Ordering::Release);
    }

    /// How many bytes a reader at `tail` can take for a request of `wanted`
    #[inline]
    fn readable(&self, tail: u64, wanted: usize, cached_head: &mut u64) -> usize {
        let mut available = *cached_head - tail;
        if available < wanted as u64 {
            // Update cached head from writer
            // 从写端更新缓存的 head
            *cached_head = self.head.load(Ordering::Acquire);
            available = *cached_head - tail;
        }
        // available <= capacity, which fits in usize
        wanted.min(available as usize)
    }

    /// Copy `src` into storage at logical position `head`
    ///
    /// 在逻辑位置 `head` 处将 `src` 拷贝进存储
    ///
    /// Handles wrap-around by splitting into two copies if necessary.
    ///
    /// 必要时拆分为两次拷贝以处理环绕。
    ///
    /// # Safety
    /// `src.len()` must not exceed the free space at `head`.
    unsafe fn copy_in(&self, head: u64, src: &[u8]) {
        if src.is_empty() {
            return;
        }

        let start = self.offset(head);
        let first = src.len().min(self.capacity() - start);

        unsafe {
            // From the write position to the end of storage
            // 从写位置到存储末尾
            self.storage.write_at(start, &src[..first]);
            // Remainder from the start of storage (no-op if nothing wrapped)
            // 剩余部分从存储开头写入（未环绕时为空操作）
            self.storage.write_at(0, &src[first..]);
        }
    }

    /// Copy unread bytes at logical position `tail` into `dst`
    ///
    /// 将逻辑位置 `tail` 处的未读字节拷贝到 `dst`
    ///
    /// # Safety
    /// `dst.len()` must not exceed the unread length at `tail`.
    unsafe fn copy_out(&self, tail: u64, dst: &mut [u8]) {
        if dst.is_empty() {
            return;
        }

        let start = self.offset(tail);
        let first = dst.len().min(self.capacity() - start);
        let (front, back) = dst.split_at_mut(first);

        unsafe {
            self.storage.read_at(start, front);
            self.storage.read_at(0, back);
        }
    }

    /// Recover the storage
    pub fn into_storage(self) -> Storage {
        self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZero;

    fn core(capacity: usize) -> RingCore {
        RingCore::new(Storage::zeroed(NonZero::new(capacity).unwrap()))
    }

    #[test]
    fn test_core_basic() {
        let core = core(10);
        assert_eq!(core.capacity(), 10);
        assert_eq!(core.len(), 0);
        assert_eq!(core.head().load(Ordering::Relaxed), 0);
        assert_eq!(core.tail().load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_core_write_read_no_wrap() {
        let core = core(8);
        let (mut cached_tail, mut cached_head) = (0, 0);

        unsafe {
            assert_eq!(core.write(b"abcd", &mut cached_tail), Ok(4));
            let mut out = [0u8; 4];
            assert_eq!(core.read(&mut out, &mut cached_head), Ok(4));
            assert_eq!(&out, b"abcd");
        }
        assert_eq!(core.head().load(Ordering::Relaxed), 4);
        assert_eq!(core.tail().load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_core_copy_with_wrap() {
        let core = core(4);
        let (mut cached_tail, mut cached_head) = (0, 0);
        let mut out = [0u8; 4];

        unsafe {
            core.write(b"xyz", &mut cached_tail).unwrap();
            core.read(&mut out[..3], &mut cached_head).unwrap();

            // Starts at offset 3 and wraps to 0..2
            assert_eq!(core.write(b"123", &mut cached_tail), Ok(3));
            assert_eq!(core.read(&mut out, &mut cached_head), Ok(3));
        }
        assert_eq!(&out[..3], b"123");
        assert_eq!(&*core.into_storage().into_boxed(), b"23z1");
    }

    #[test]
    fn test_core_stale_cache_is_refreshed() {
        let core = core(4);
        let (mut cached_tail, mut cached_head) = (0, 0);
        let mut out = [0u8; 4];

        unsafe {
            core.write(b"abcd", &mut cached_tail).unwrap();
            core.read(&mut out, &mut cached_head).unwrap();
            // cached_tail still says the buffer is full
            assert_eq!(cached_tail, 0);
            assert_eq!(core.write(b"efgh", &mut cached_tail), Ok(4));
        }
        assert_eq!(cached_tail, 4);
    }

    #[test]
    fn test_core_peek_and_discard() {
        let core = core(8);
        let (mut cached_tail, mut cached_head) = (0, 0);
        let mut out = [0u8; 8];

        unsafe {
            core.write(b"hello", &mut cached_tail).unwrap();
            assert_eq!(core.peek(&mut out, &mut cached_head), 5);
            assert_eq!(&out[..5], b"hello");
            assert_eq!(core.len(), 5);

            assert_eq!(core.discard(&mut cached_head), 5);
            assert_eq!(core.len(), 0);
            assert_eq!(core.read(&mut out, &mut cached_head), Err(ReadError::EndOfData));
        }
    }

    #[test]
    fn test_core_reset() {
        let core = core(4);
        let mut cached_tail = 0;
        unsafe {
            core.write(b"ab", &mut cached_tail).unwrap();
        }
        core.reset();
        assert_eq!(core.len(), 0);
        assert_eq!(core.head().load(Ordering::Relaxed), 0);
    }
}
