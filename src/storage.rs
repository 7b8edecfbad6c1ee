/// Fixed-length byte storage shared by the writer and the reader
///
/// 写端与读端共享的固定长度字节存储
///
/// The bytes are owned through a raw pointer taken from a boxed slice, so both
/// sides can copy into and out of disjoint regions through `&self` without ever
/// forming overlapping `&mut` references. The allocation is never resized or
/// moved until the storage is dropped or handed back with `into_boxed`.
///
/// 字节通过从 boxed slice 取得的裸指针持有，双方可以通过 `&self` 拷入/拷出互不重叠的区域，
/// 而不会产生重叠的 `&mut` 引用。分配在 drop 或 `into_boxed` 之前不会调整大小或移动。

use std::fmt;
use std::mem::ManuallyDrop;
use std::num::NonZero;
use std::ptr::{self, NonNull};

use crate::error::StorageError;

pub struct Storage {
    /// Leaked boxed slice, reclaimed in `Drop` or `into_boxed`
    ///
    /// 被 leak 的 boxed slice，在 `Drop` 或 `into_boxed` 中回收
    bytes: NonNull<[u8]>,
}

impl Storage {
    /// Allocate zeroed storage of the given length
    ///
    /// 分配指定长度的全零存储
    pub fn zeroed(len: NonZero<usize>) -> Self {
        Self::adopt(vec![0u8; len.get()].into_boxed_slice())
    }

    /// Take ownership of caller-supplied bytes without copying them
    ///
    /// 接管调用者提供的字节，不做拷贝
    ///
    /// # Errors
    /// Returns `StorageError::Empty` for a zero-length slice.
    ///
    /// # 错误
    /// 长度为 0 时返回 `StorageError::Empty`。
    pub fn from_boxed(bytes: Box<[u8]>) -> Result<Self, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        Ok(Self::adopt(bytes))
    }

    #[inline]
    fn adopt(bytes: Box<[u8]>) -> Self {
        Self {
            bytes: NonNull::from(Box::leak(bytes)),
        }
    }

    /// Length of the storage in bytes
    ///
    /// 存储长度（字节）
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Hand the allocation back to the caller
    ///
    /// 将分配归还给调用者
    pub fn into_boxed(self) -> Box<[u8]> {
        let this = ManuallyDrop::new(self);
        // SAFETY: `bytes` came from `Box::leak` and `Drop` will not run.
        unsafe { Box::from_raw(this.bytes.as_ptr()) }
    }

    /// Copy `src` into the storage starting at `offset`
    ///
    /// 从 `offset` 开始将 `src` 拷贝进存储
    ///
    /// # Safety
    /// Caller must ensure:
    /// - `offset + src.len() <= self.len()`
    /// - No concurrent access to the affected region
    ///
    /// # 安全性
    /// 调用者必须确保：
    /// - `offset + src.len() <= self.len()`
    /// - 对受影响区域没有并发访问
    #[inline]
    pub unsafe fn write_at(&self, offset: usize, src: &[u8]) {
        debug_assert!(offset + src.len() <= self.len());
        unsafe {
            let dst = self.bytes.cast::<u8>().as_ptr().add(offset);
            ptr::copy_nonoverlapping(src.as_ptr(), dst, src.len());
        }
    }

    /// Copy bytes starting at `offset` into `dst`
    ///
    /// 从 `offset` 开始将字节拷贝到 `dst`
    ///
    /// # Safety
    /// Caller must ensure:
    /// - `offset + dst.len() <= self.len()`
    /// - No concurrent writes to the affected region
    ///
    /// # 安全性
    /// 调用者必须确保：
    /// - `offset + dst.len() <= self.len()`
    /// - 对受影响区域没有并发写入
    #[inline]
    pub unsafe fn read_at(&self, offset: usize, dst: &mut [u8]) {
        debug_assert!(offset + dst.len() <= self.len());
        unsafe {
            let src = self.bytes.cast::<u8>().as_ptr().add(offset);
            ptr::copy_nonoverlapping(src, dst.as_mut_ptr(), dst.len());
        }
    }
}

impl Drop for Storage {
    fn drop(&mut self) {
        // SAFETY: `bytes` came from `Box::leak` and is dropped exactly once.
        unsafe { drop(Box::from_raw(self.bytes.as_ptr())) }
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage").field("len", &self.len()).finish()
    }
}

// The storage is only touched through `write_at`/`read_at`, whose callers
// guarantee region exclusion.
unsafe impl Send for Storage {}
unsafe impl Sync for Storage {}
