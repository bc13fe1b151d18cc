//! # Allocator Error Types

use thiserror::Error;

/// Errors reported by the heap and its arenas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
  /// The arena refused to grow far enough to satisfy a request.
  #[error("out of memory: could not obtain {requested} more bytes")]
  OutOfMemory {
    /// Bytes asked of the arena (or the unencodable block size).
    requested: usize,
  },

  /// The address is not a payload offset inside the heap body.
  #[error("invalid address: {0:#x}")]
  InvalidAddress(usize),

  /// The address was already freed (validation layer only).
  #[error("double free of address {0:#x}")]
  DoubleFree(usize),

  /// The address was never issued by this heap (validation layer only).
  #[error("address {0:#x} was not allocated by this heap")]
  NotAllocated(usize),

  /// The heap walk found broken metadata.
  #[error("heap corrupted at {offset:#x}: {reason}")]
  Corrupted {
    /// Offset of the offending tag.
    offset: usize,
    /// What the checker found.
    reason: &'static str,
  },
}

pub type Result<T> = std::result::Result<T, AllocError>;
