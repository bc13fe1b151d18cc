//! # rallocator - A Boundary-Tag Heap Allocator
//!
//! This crate provides a general purpose **heap allocator** that manages a
//! single growable arena with `allocate`, `free` and `resize`, the way
//! `malloc`, `free` and `realloc` manage the data segment.
//!
//! ## Overview
//!
//! The arena is tiled by blocks. Every block carries the same tag at both
//! ends, so the heap can be walked forwards and backwards:
//!
//! ```text
//!   Heap Layout:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                            ARENA                                     │
//!   │                                                                      │
//!   │   ┌───┬──────────┬───────────┬────────────┬───────────┬───┐          │
//!   │   │pad│ prologue │  A (used) │  B (free)  │  C (used) │ E │          │
//!   │   └───┴──────────┴───────────┴────────────┴───────────┴───┘          │
//!   │         8 bytes        ▲                                ▲            │
//!   │        always used     │                                │            │
//!   │                    search cursor                    epilogue         │
//!   │                    (next-fit)                       size 0, used     │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rallocator
//!   ├── align      - Alignment macros (align!, align_to!)
//!   ├── arena      - Grow service: VecArena, MmapArena
//!   ├── block      - Boundary tag codec (internal)
//!   ├── config     - Search mode, spacer policy, resize slack
//!   ├── heap       - Heap: placement, coalescing, resizing, checking
//!   └── checked    - CheckedHeap: double/foreign free detection
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rallocator::Heap;
//!
//! let mut heap = Heap::in_memory().unwrap();
//!
//! let address = heap.allocate(8).unwrap();
//! heap.payload_mut(address).unwrap()[..8].copy_from_slice(&42u64.to_le_bytes());
//!
//! // The last block of the heap grows in place.
//! let resized = heap.resize(address, 1000).unwrap();
//! assert_eq!(resized, address);
//! assert_eq!(heap.payload(resized).unwrap()[0], 42);
//!
//! heap.free(resized).unwrap();
//! heap.check().unwrap();
//! ```
//!
//! ## How It Works
//!
//! ```text
//!   allocate(n):   scan from the cursor ──► fit? ──► split if oversized
//!                                            │
//!                                            no
//!                                            ▼
//!                               grow the arena, append a block,
//!                               reset the cursor to the heap start
//!
//!   free(p):       flip the tags, then merge with free neighbours
//!
//!                  ┌────────┬────────┬────────┐       ┌────────────────────┐
//!                  │  free  │   p    │  free  │  ──►  │        free        │
//!                  └────────┴────────┴────────┘       └────────────────────┘
//!
//!   resize(p, n):  big enough ──► keep p
//!                  last block ──► grow the arena under p, no copy
//!                  otherwise  ──► allocate n + slack, copy, free p
//! ```
//!
//! Addresses are offsets into the arena rather than raw pointers; callers
//! reach their bytes through [`Heap::payload`] and [`Heap::payload_mut`].
//!
//! ## Limitations
//!
//! - **Single-threaded only**: one caller drives a heap through `&mut self`
//! - **No shrinking**: the arena never returns memory and `resize` never
//!   splits a block
//! - **Misuse**: the plain heap only rejects addresses whose tags are not a
//!   live block; wrap it in [`CheckedHeap`] for exact double-free detection

pub mod align;
mod arena;
mod block;
mod checked;
mod config;
mod error;
mod heap;

#[cfg(unix)]
pub use arena::MmapArena;
pub use arena::{Arena, DEFAULT_LIMIT, VecArena};
pub use block::{Block, MIN_BLOCK_SIZE, TAG_OVERHEAD, TAG_WIDTH};
pub use checked::CheckedHeap;
pub use config::{DEFAULT_RESIZE_SLACK, HeapConfig, SearchMode, SpacerPolicy};
pub use error::{AllocError, Result};
pub use heap::{Blocks, Heap, HeapStats};
