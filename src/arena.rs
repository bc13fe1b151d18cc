//! Growable backing storage for a [`Heap`](crate::Heap).
//!
//! ```text
//!   0                                   high          limit
//!   ├───────────────────────────────────┼───────────────┤
//!   │      bytes handed to the heap     │   reserve     │
//!   └───────────────────────────────────┴───────────────┘
//!                                       ▲
//!                                       └── grow(n) returns this offset
//!                                           and moves it n bytes right
//! ```
//!
//! An arena only ever grows at its high end, so every offset it has handed
//! out stays valid for its whole lifetime.

use tracing::debug;

use crate::error::{AllocError, Result};

/// Default maximum arena size (20 MiB).
pub const DEFAULT_LIMIT: usize = 20 * (1 << 20);

/// The grow service behind a heap.
pub trait Arena {
  /// Extends the arena by `extra` bytes and returns the previous high end.
  ///
  /// Fails with [`AllocError::OutOfMemory`] and leaves the arena untouched
  /// if the bytes cannot be provided.
  fn grow(
    &mut self,
    extra: usize,
  ) -> Result<usize>;

  /// Current high end, i.e. the number of usable bytes.
  fn high(&self) -> usize;

  fn bytes(&self) -> &[u8];

  fn bytes_mut(&mut self) -> &mut [u8];
}

/// Arena backed by a `Vec<u8>` with a fixed upper limit.
#[derive(Debug)]
pub struct VecArena {
  bytes: Vec<u8>,
  limit: usize,
}

impl VecArena {
  pub fn new() -> Self {
    Self::with_limit(DEFAULT_LIMIT)
  }

  pub fn with_limit(limit: usize) -> Self {
    Self {
      bytes: Vec::new(),
      limit,
    }
  }

  pub fn limit(&self) -> usize {
    self.limit
  }
}

impl Default for VecArena {
  fn default() -> Self {
    Self::new()
  }
}

impl Arena for VecArena {
  fn grow(
    &mut self,
    extra: usize,
  ) -> Result<usize> {
    let old_high = self.bytes.len();
    let new_high = old_high
      .checked_add(extra)
      .filter(|&high| high <= self.limit)
      .ok_or(AllocError::OutOfMemory { requested: extra })?;

    self.bytes.resize(new_high, 0);
    debug!(old_high, new_high, "vec arena grown");

    Ok(old_high)
  }

  fn high(&self) -> usize {
    self.bytes.len()
  }

  fn bytes(&self) -> &[u8] {
    &self.bytes
  }

  fn bytes_mut(&mut self) -> &mut [u8] {
    &mut self.bytes
  }
}

/// Arena carved out of one anonymous `mmap` reservation.
///
/// The whole range is mapped up front and handed out by moving a break
/// offset, like `sbrk` does for the data segment, without touching the
/// process break the system allocator relies on.
#[cfg(unix)]
#[derive(Debug)]
pub struct MmapArena {
  base: *mut u8,
  brk: usize,
  capacity: usize,
}

#[cfg(unix)]
impl MmapArena {
  pub fn new(capacity: usize) -> Result<Self> {
    let page = match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
      size if size > 0 => size as usize,
      _ => 4096,
    };
    let capacity = capacity
      .checked_add(page - 1)
      .map(|value| value & !(page - 1))
      .ok_or(AllocError::OutOfMemory { requested: capacity })?;

    let address = unsafe {
      libc::mmap(
        std::ptr::null_mut(),
        capacity,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if address == libc::MAP_FAILED {
      return Err(AllocError::OutOfMemory { requested: capacity });
    }

    debug!(?address, capacity, "mmap arena reserved");

    Ok(Self {
      base: address as *mut u8,
      brk: 0,
      capacity,
    })
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }
}

#[cfg(unix)]
impl Arena for MmapArena {
  fn grow(
    &mut self,
    extra: usize,
  ) -> Result<usize> {
    let old_brk = self.brk;
    let new_brk = old_brk
      .checked_add(extra)
      .filter(|&brk| brk <= self.capacity)
      .ok_or(AllocError::OutOfMemory { requested: extra })?;

    self.brk = new_brk;
    debug!(old_brk, new_brk, "mmap arena grown");

    Ok(old_brk)
  }

  fn high(&self) -> usize {
    self.brk
  }

  fn bytes(&self) -> &[u8] {
    // SAFETY: [base, base + brk) lies inside the live read/write mapping.
    unsafe { std::slice::from_raw_parts(self.base, self.brk) }
  }

  fn bytes_mut(&mut self) -> &mut [u8] {
    // SAFETY: as above, and `&mut self` makes the borrow exclusive.
    unsafe { std::slice::from_raw_parts_mut(self.base, self.brk) }
  }
}

#[cfg(unix)]
impl Drop for MmapArena {
  fn drop(&mut self) {
    unsafe {
      libc::munmap(self.base as *mut libc::c_void, self.capacity);
    }
  }
}
