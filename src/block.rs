//! Boundary tag codec.
//!
//! ```text
//!   start                                              start + size
//!   │                                                        │
//!   ▼                                                        ▼
//!   ┌──────────┬───────────────────────────────┬──────────┐
//!   │  header  │           payload             │  footer  │
//!   │ size | a │     size - TAG_OVERHEAD       │ size | a │
//!   └──────────┴───────────────────────────────┴──────────┘
//!    TAG_WIDTH  ▲                               TAG_WIDTH
//!               └── address handed to the caller
//! ```
//!
//! Sizes are multiples of [`ALIGNMENT`], which leaves the low bits of a tag
//! word free for the allocated flag.

use crate::align::ALIGNMENT;

pub const TAG_WIDTH: usize = 4;
pub const TAG_OVERHEAD: usize = 2 * TAG_WIDTH;
pub const MIN_BLOCK_SIZE: usize = TAG_OVERHEAD;
/// Largest size a 4-byte tag word can carry.
pub const MAX_BLOCK_SIZE: usize = (u32::MAX as usize) & !(ALIGNMENT - 1);

const ALLOCATED_BIT: u32 = 1;
const SIZE_MASK: u32 = !(ALIGNMENT as u32 - 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
  pub size: usize,
  pub allocated: bool,
}

impl Tag {
  /// Zero-sized allocated tag terminating every heap walk.
  pub const EPILOGUE: Tag = Tag {
    size: 0,
    allocated: true,
  };

  pub const fn new(
    size: usize,
    allocated: bool,
  ) -> Self {
    Self { size, allocated }
  }

  pub const fn used(size: usize) -> Self {
    Self::new(size, true)
  }

  pub const fn free(size: usize) -> Self {
    Self::new(size, false)
  }

  pub const fn is_epilogue(&self) -> bool {
    self.size == 0
  }

  fn encode(self) -> u32 {
    debug_assert!(self.size % ALIGNMENT == 0 && self.size <= MAX_BLOCK_SIZE);
    self.size as u32 | if self.allocated { ALLOCATED_BIT } else { 0 }
  }

  fn decode(word: u32) -> Self {
    Self::new((word & SIZE_MASK) as usize, word & ALLOCATED_BIT != 0)
  }
}

/// A block as seen by a heap walk: its start offset and header tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
  pub start: usize,
  pub size: usize,
  pub allocated: bool,
}

impl Block {
  pub fn new(
    start: usize,
    tag: Tag,
  ) -> Self {
    Self {
      start,
      size: tag.size,
      allocated: tag.allocated,
    }
  }

  /// Offset of the first payload byte, the address callers see.
  pub fn payload(&self) -> usize {
    self.start + TAG_WIDTH
  }

  pub fn payload_len(&self) -> usize {
    self.size - TAG_OVERHEAD
  }

  /// One past the footer: the start of the right neighbour.
  pub fn end(&self) -> usize {
    self.start + self.size
  }

  pub fn tag(&self) -> Tag {
    Tag::new(self.size, self.allocated)
  }
}

/// Maps a payload address back to its block start.
pub const fn header_of(address: usize) -> usize {
  address - TAG_WIDTH
}

pub const fn footer_of(
  start: usize,
  size: usize,
) -> usize {
  start + size - TAG_WIDTH
}

pub fn read_tag(
  bytes: &[u8],
  offset: usize,
) -> Tag {
  let mut word = [0u8; TAG_WIDTH];
  word.copy_from_slice(&bytes[offset..offset + TAG_WIDTH]);
  Tag::decode(u32::from_le_bytes(word))
}

pub fn write_tag(
  bytes: &mut [u8],
  offset: usize,
  tag: Tag,
) {
  bytes[offset..offset + TAG_WIDTH].copy_from_slice(&tag.encode().to_le_bytes());
}

/// Writes header and footer of the block at `start` in one step.
pub fn write_block(
  bytes: &mut [u8],
  start: usize,
  tag: Tag,
) {
  write_tag(bytes, start, tag);
  write_tag(bytes, footer_of(start, tag.size), tag);
}

pub fn write_epilogue(
  bytes: &mut [u8],
  offset: usize,
) {
  write_tag(bytes, offset, Tag::EPILOGUE);
}
