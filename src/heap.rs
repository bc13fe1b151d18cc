use tracing::{debug, trace, warn};

use crate::{
  align::{ALIGNMENT, checked_align, is_aligned},
  arena::{Arena, VecArena},
  block::{
    Block, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, TAG_OVERHEAD, TAG_WIDTH, Tag, footer_of, header_of, read_tag,
    write_block, write_epilogue,
  },
  config::{HeapConfig, SearchMode},
  error::{AllocError, Result},
};

const PROLOGUE_SIZE: usize = MIN_BLOCK_SIZE;

/// Snapshot of a heap walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeapStats {
  /// Bytes held by allocated blocks, tags included.
  pub occupied: usize,
  /// Bytes obtained from the arena, sentinels and padding included.
  pub arena_size: usize,
  pub allocated_blocks: usize,
  pub free_blocks: usize,
  pub free_bytes: usize,
  pub largest_free: usize,
}

impl HeapStats {
  /// Share of the arena held by live allocations.
  pub fn utilization(&self) -> f64 {
    if self.arena_size == 0 {
      return 0.0;
    }
    self.occupied as f64 / self.arena_size as f64
  }
}

/// Boundary-tag heap over a growable [`Arena`].
///
/// Addresses are payload offsets into the arena. All of them are multiples
/// of [`ALIGNMENT`] and stay valid until freed, because the arena only ever
/// grows at its high end.
#[derive(Debug)]
pub struct Heap<A: Arena = VecArena> {
  arena: A,
  config: HeapConfig,
  prologue: usize,
  cursor: usize,
  occupied: usize,
}

impl Heap<VecArena> {
  /// A heap over a default [`VecArena`] using the default policy.
  pub fn in_memory() -> Result<Self> {
    Self::new(VecArena::new())
  }
}

impl<A: Arena> Heap<A> {
  pub fn new(arena: A) -> Result<Self> {
    Self::init(arena, HeapConfig::default())
  }

  /// Lays down the padding, the prologue block and the first epilogue at
  /// the current high end of `arena`.
  pub fn init(
    mut arena: A,
    config: HeapConfig,
  ) -> Result<Self> {
    let high = arena.high();
    let padding = (TAG_WIDTH + ALIGNMENT - high % ALIGNMENT) % ALIGNMENT;

    arena.grow(padding + PROLOGUE_SIZE + TAG_WIDTH)?;

    let prologue = high + padding;
    let bytes = arena.bytes_mut();
    write_block(bytes, prologue, Tag::used(PROLOGUE_SIZE));
    write_epilogue(bytes, prologue + PROLOGUE_SIZE);

    debug!(prologue, ?config, "heap initialised");

    Ok(Self {
      arena,
      config,
      prologue,
      cursor: prologue,
      occupied: 0,
    })
  }

  pub fn config(&self) -> &HeapConfig {
    &self.config
  }

  pub fn arena(&self) -> &A {
    &self.arena
  }

  pub fn into_arena(self) -> A {
    self.arena
  }

  /// Bytes currently held by allocated blocks, tags included.
  pub fn occupied(&self) -> usize {
    self.occupied
  }

  /// Block start where the next next-fit search begins.
  pub fn cursor(&self) -> usize {
    self.cursor
  }

  fn epilogue(&self) -> usize {
    self.arena.high() - TAG_WIDTH
  }

  fn first_block(&self) -> usize {
    self.prologue + PROLOGUE_SIZE
  }

  /// Block size needed to hold `size` payload bytes.
  fn block_size(size: usize) -> Result<usize> {
    size
      .checked_add(TAG_OVERHEAD)
      .and_then(checked_align)
      .filter(|&needed| needed <= MAX_BLOCK_SIZE)
      .ok_or(AllocError::OutOfMemory { requested: size })
  }

  /// Resolves a caller supplied address to the allocated block it belongs to.
  fn live_block(
    &self,
    address: usize,
  ) -> Result<Block> {
    let epilogue = self.epilogue();

    if !is_aligned(address) || address < self.first_block() + TAG_WIDTH || address >= epilogue {
      warn!(address, "address outside the heap body");
      return Err(AllocError::InvalidAddress(address));
    }

    let bytes = self.arena.bytes();
    let start = header_of(address);
    let tag = read_tag(bytes, start);

    let in_bounds = tag.size >= MIN_BLOCK_SIZE
      && tag.size % ALIGNMENT == 0
      && start.checked_add(tag.size).is_some_and(|end| end <= epilogue);

    if !tag.allocated || !in_bounds || read_tag(bytes, footer_of(start, tag.size)) != tag {
      warn!(address, ?tag, "address is not a live block");
      return Err(AllocError::InvalidAddress(address));
    }

    Ok(Block::new(start, tag))
  }

  /// Allocates a block with room for `size` payload bytes.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<usize> {
    let needed = Self::block_size(size)?;

    let block = match self.find_fit(needed) {
      Some(block) => self.place(block, needed),
      None => self.extend(needed)?,
    };

    self.occupied += block.size;
    debug!(size, needed, address = block.payload(), cursor = self.cursor, "allocated");

    Ok(block.payload())
  }

  fn find_fit(
    &self,
    needed: usize,
  ) -> Option<Block> {
    let bytes = self.arena.bytes();
    let mut current = match self.config.search {
      SearchMode::FirstFit => self.prologue,
      SearchMode::NextFit => self.cursor,
    };

    loop {
      let tag = read_tag(bytes, current);

      if tag.is_epilogue() {
        return None;
      }
      if !tag.allocated && tag.size >= needed {
        return Some(Block::new(current, tag));
      }

      current += tag.size;
    }
  }

  /// Marks the free `block` allocated, splitting off the tail when it is
  /// larger than a minimum block.
  fn place(
    &mut self,
    block: Block,
    needed: usize,
  ) -> Block {
    let bytes = self.arena.bytes_mut();
    let remainder = block.size - needed;

    let size = if remainder > MIN_BLOCK_SIZE {
      write_block(bytes, block.start, Tag::used(needed));
      write_block(bytes, block.start + needed, Tag::free(remainder));
      needed
    } else {
      write_block(bytes, block.start, Tag::used(block.size));
      block.size
    };

    self.cursor = block.start + size;

    Block::new(block.start, Tag::used(size))
  }

  /// Appends an allocated block of `needed` bytes at the end of the heap.
  fn extend(
    &mut self,
    needed: usize,
  ) -> Result<Block> {
    let mut start = self.epilogue();

    if let Some(spacer) = self.spacer_for(start, needed) {
      self.arena.grow(spacer)?;

      let bytes = self.arena.bytes_mut();
      write_block(bytes, start, Tag::free(spacer));
      write_epilogue(bytes, start + spacer);

      debug!(start, spacer, "left spacer block for small requests");
      start += spacer;
    }

    self.arena.grow(needed)?;

    let bytes = self.arena.bytes_mut();
    write_block(bytes, start, Tag::used(needed));
    write_epilogue(bytes, start + needed);

    self.cursor = self.prologue;
    debug!(start, needed, high = self.arena.high(), "heap extended");

    Ok(Block::new(start, Tag::used(needed)))
  }

  fn spacer_for(
    &self,
    epilogue: usize,
    needed: usize,
  ) -> Option<usize> {
    let policy = self.config.spacer?;
    let last = read_tag(self.arena.bytes(), epilogue - TAG_WIDTH);

    if !last.allocated || epilogue - last.size == self.prologue {
      return None;
    }

    policy.spacer_for(last.size, needed)
  }

  /// Releases the block at `address` and merges it with free neighbours.
  pub fn free(
    &mut self,
    address: usize,
  ) -> Result<()> {
    let block = self.live_block(address)?;

    write_block(self.arena.bytes_mut(), block.start, Tag::free(block.size));

    let merged = self.coalesce(block.start);
    self.cursor = merged.start;
    self.occupied -= block.size;

    debug!(address, merged = ?merged, "freed");

    Ok(())
  }

  fn coalesce(
    &mut self,
    start: usize,
  ) -> Block {
    let bytes = self.arena.bytes_mut();
    let size = read_tag(bytes, start).size;
    let prev = read_tag(bytes, start - TAG_WIDTH);
    let next = read_tag(bytes, start + size);

    let (start, size) = match (prev.allocated, next.allocated) {
      (true, true) => return Block::new(start, Tag::free(size)),
      (false, true) => (start - prev.size, prev.size + size),
      (true, false) => (start, size + next.size),
      (false, false) => (start - prev.size, prev.size + size + next.size),
    };

    write_block(bytes, start, Tag::free(size));
    trace!(start, size, "coalesced");

    Block::new(start, Tag::free(size))
  }

  /// Grows the block at `address` to hold `size` payload bytes.
  ///
  /// Never shrinks. The last block of the heap is extended in place;
  /// anything else is moved to a new block. Either way the block is given
  /// `resize_slack` extra bytes so repeated growth does not copy every time.
  pub fn resize(
    &mut self,
    address: usize,
    size: usize,
  ) -> Result<usize> {
    let block = self.live_block(address)?;
    let needed = Self::block_size(size)?;

    if block.size >= needed {
      return Ok(address);
    }

    let slack = self.config.resize_slack;

    if block.end() == self.epilogue() {
      let target = needed
        .checked_add(slack)
        .and_then(checked_align)
        .filter(|&target| target <= MAX_BLOCK_SIZE)
        .ok_or(AllocError::OutOfMemory { requested: size })?;

      self.arena.grow(target - block.size)?;

      let bytes = self.arena.bytes_mut();
      write_block(bytes, block.start, Tag::used(target));
      write_epilogue(bytes, block.start + target);

      if self.cursor == block.end() {
        self.cursor = block.start + target;
      }
      self.occupied += target - block.size;

      debug!(address, from = block.size, to = target, "resized in place");

      return Ok(address);
    }

    let request = size
      .checked_add(slack)
      .ok_or(AllocError::OutOfMemory { requested: size })?;
    let moved = self.allocate(request)?;
    let keep = size.min(block.payload_len());

    self.arena.bytes_mut().copy_within(address..address + keep, moved);
    self.free(address)?;

    debug!(from = address, to = moved, keep, "resized by moving");

    Ok(moved)
  }

  /// Payload of the live block at `address`.
  pub fn payload(
    &self,
    address: usize,
  ) -> Result<&[u8]> {
    let block = self.live_block(address)?;

    Ok(&self.arena.bytes()[address..address + block.payload_len()])
  }

  pub fn payload_mut(
    &mut self,
    address: usize,
  ) -> Result<&mut [u8]> {
    let block = self.live_block(address)?;

    Ok(&mut self.arena.bytes_mut()[address..address + block.payload_len()])
  }

  /// Walks the ordinary blocks between prologue and epilogue.
  pub fn blocks(&self) -> Blocks<'_> {
    Blocks {
      bytes: self.arena.bytes(),
      current: self.first_block(),
    }
  }

  pub fn stats(&self) -> HeapStats {
    let mut stats = HeapStats {
      occupied: self.occupied,
      arena_size: self.arena.high(),
      ..HeapStats::default()
    };

    for block in self.blocks() {
      if block.allocated {
        stats.allocated_blocks += 1;
      } else {
        stats.free_blocks += 1;
        stats.free_bytes += block.size;
        stats.largest_free = stats.largest_free.max(block.size);
      }
    }

    stats
  }

  /// Emits every block as a `trace` event.
  pub fn dump(&self) {
    for block in self.blocks() {
      trace!(
        start = block.start,
        size = block.size,
        allocated = block.allocated,
        "block"
      );
    }
    trace!(epilogue = self.epilogue(), cursor = self.cursor, occupied = self.occupied, "end of heap");
  }

  /// Walks the whole heap and verifies its metadata.
  ///
  /// Checks that the prologue and epilogue are intact, that every block has
  /// matching header and footer, that the blocks tile the body exactly, that
  /// no two neighbours are both free, that the cursor sits on a block
  /// boundary and that the occupancy counter matches the allocated blocks.
  pub fn check(&self) -> Result<()> {
    let bytes = self.arena.bytes();
    let epilogue = self.epilogue();
    let corrupted = |offset, reason| Err(AllocError::Corrupted { offset, reason });

    if read_tag(bytes, self.prologue) != Tag::used(PROLOGUE_SIZE)
      || read_tag(bytes, footer_of(self.prologue, PROLOGUE_SIZE)) != Tag::used(PROLOGUE_SIZE)
    {
      return corrupted(self.prologue, "prologue overwritten");
    }

    let mut current = self.first_block();
    let mut occupied = 0;
    let mut prev_free = false;
    let mut cursor_seen = self.cursor == self.prologue;

    while current < epilogue {
      let tag = read_tag(bytes, current);

      if tag.size < MIN_BLOCK_SIZE || tag.size % ALIGNMENT != 0 {
        return corrupted(current, "bad block size");
      }
      if current + tag.size > epilogue {
        return corrupted(current, "block runs past the epilogue");
      }
      if read_tag(bytes, footer_of(current, tag.size)) != tag {
        return corrupted(current, "header and footer differ");
      }
      if !is_aligned(current + TAG_WIDTH) {
        return corrupted(current, "misaligned payload");
      }
      if !tag.allocated && prev_free {
        return corrupted(current, "adjacent free blocks");
      }

      if tag.allocated {
        occupied += tag.size;
      }
      cursor_seen |= self.cursor == current;
      prev_free = !tag.allocated;
      current += tag.size;
    }

    if current != epilogue || read_tag(bytes, epilogue) != Tag::EPILOGUE {
      return corrupted(epilogue, "epilogue missing");
    }
    if !(cursor_seen || self.cursor == epilogue) {
      return corrupted(self.cursor, "cursor off a block boundary");
    }
    if occupied != self.occupied {
      return corrupted(epilogue, "occupancy counter out of sync");
    }

    Ok(())
  }
}

/// Iterator returned by [`Heap::blocks`].
pub struct Blocks<'a> {
  bytes: &'a [u8],
  current: usize,
}

impl Iterator for Blocks<'_> {
  type Item = Block;

  fn next(&mut self) -> Option<Block> {
    let tag = read_tag(self.bytes, self.current);

    if tag.is_epilogue() {
      return None;
    }

    let block = Block::new(self.current, tag);
    self.current += tag.size;

    Some(block)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::SpacerPolicy;

  fn heap() -> Heap {
    Heap::in_memory().unwrap()
  }

  fn heap_with(config: HeapConfig) -> Heap {
    Heap::init(VecArena::new(), config).unwrap()
  }

  fn layout(heap: &Heap) -> Vec<(usize, usize, bool)> {
    heap
      .blocks()
      .map(|block| (block.start, block.size, block.allocated))
      .collect()
  }

  #[test]
  fn test_init_layout() {
    let heap = heap();

    assert_eq!(heap.arena().high(), 16);
    assert_eq!(heap.cursor(), 4);
    assert_eq!(heap.occupied(), 0);
    assert!(layout(&heap).is_empty());
    heap.check().unwrap();
  }

  #[test]
  fn test_init_on_used_arena() {
    let mut arena = VecArena::new();
    arena.grow(3).unwrap();

    let mut heap = Heap::new(arena).unwrap();
    let address = heap.allocate(10).unwrap();

    assert_eq!(address % ALIGNMENT, 0);
    heap.check().unwrap();
  }

  #[test]
  fn test_reuse_freed_block() {
    let mut heap = heap();

    let a = heap.allocate(4).unwrap();
    let b = heap.allocate(4).unwrap();
    heap.free(a).unwrap();
    let c = heap.allocate(4).unwrap();

    assert_eq!((a, b), (16, 32));
    assert_eq!(c, a);
    heap.check().unwrap();
  }

  #[test]
  fn test_free_coalesces_neighbours() {
    let mut heap = heap();

    let a = heap.allocate(100).unwrap();
    let b = heap.allocate(100).unwrap();
    heap.free(a).unwrap();
    heap.free(b).unwrap();

    assert_eq!(layout(&heap), vec![(12, 224, false)]);
    assert_eq!(heap.cursor(), 12);
    assert_eq!(heap.occupied(), 0);
    heap.check().unwrap();
  }

  #[test]
  fn test_free_merges_both_sides() {
    let mut heap = heap();

    let a = heap.allocate(16).unwrap();
    let b = heap.allocate(16).unwrap();
    let c = heap.allocate(16).unwrap();
    let d = heap.allocate(16).unwrap();

    heap.free(a).unwrap();
    heap.free(c).unwrap();
    assert_eq!(
      layout(&heap),
      vec![(12, 24, false), (36, 24, true), (60, 24, false), (84, 24, true)]
    );

    heap.free(b).unwrap();
    assert_eq!(layout(&heap), vec![(12, 72, false), (84, 24, true)]);
    assert_eq!(heap.cursor(), 12);

    heap.free(d).unwrap();
    assert_eq!(layout(&heap), vec![(12, 96, false)]);
    heap.check().unwrap();
  }

  #[test]
  fn test_split_oversized_block() {
    let mut heap = heap();

    let a = heap.allocate(100).unwrap();
    heap.allocate(4).unwrap();
    heap.free(a).unwrap();

    let c = heap.allocate(4).unwrap();

    assert_eq!(c, a);
    assert_eq!(&layout(&heap)[..2], &[(12, 16, true), (28, 96, false)]);
    assert_eq!(heap.cursor(), 28);
    heap.check().unwrap();
  }

  #[test]
  fn test_small_remainder_is_not_split() {
    let mut heap = heap();

    let a = heap.allocate(16).unwrap();
    heap.allocate(4).unwrap();
    heap.free(a).unwrap();

    let c = heap.allocate(8).unwrap();

    assert_eq!(c, a);
    assert_eq!(heap.payload(c).unwrap().len(), 16);
    assert_eq!(heap.occupied(), 24 + 16);
    heap.check().unwrap();
  }

  #[test]
  fn test_allocate_zero() {
    let mut heap = heap();

    let a = heap.allocate(0).unwrap();
    let b = heap.allocate(0).unwrap();

    assert_ne!(a, b);
    assert!(heap.payload(a).unwrap().is_empty());
    assert_eq!(layout(&heap), vec![(12, 8, true), (20, 8, true)]);
    heap.check().unwrap();
  }

  #[test]
  fn test_next_fit_and_first_fit() {
    for (search, expected) in [(SearchMode::NextFit, 48), (SearchMode::FirstFit, 16)] {
      let mut heap = heap_with(HeapConfig::default().search(search));

      let a = heap.allocate(4).unwrap();
      heap.allocate(4).unwrap();
      let c = heap.allocate(4).unwrap();
      heap.allocate(4).unwrap();

      heap.free(a).unwrap();
      heap.free(c).unwrap();

      assert_eq!(heap.allocate(4).unwrap(), expected, "{search:?}");
      heap.check().unwrap();
    }
  }

  #[test]
  fn test_spacer_keeps_small_blocks_together() {
    let mut heap = heap();

    heap.allocate(8).unwrap();
    let big = heap.allocate(100).unwrap();

    assert_eq!(big, 96);
    assert_eq!(layout(&heap), vec![(12, 16, true), (28, 64, false), (92, 112, true)]);

    let small = heap.allocate(8).unwrap();
    assert_eq!(small, 32);
    heap.check().unwrap();
  }

  #[test]
  fn test_zero_ratio_spacer_leaves_tags_intact() {
    let policy = SpacerPolicy {
      min_block: 8,
      max_block: 100,
      ratio: 0,
    };
    let mut heap = heap_with(HeapConfig::default().spacer(Some(policy)));

    let a = heap.allocate(8).unwrap();
    let big = heap.allocate(100).unwrap();

    assert_eq!(big, 32);
    heap.check().unwrap();
    heap.free(a).unwrap();
    heap.check().unwrap();
  }

  #[test]
  fn test_spacer_kept_when_block_does_not_fit() {
    let mut heap = Heap::new(VecArena::with_limit(128)).unwrap();

    heap.allocate(8).unwrap();

    assert_eq!(heap.allocate(100), Err(AllocError::OutOfMemory { requested: 112 }));
    assert_eq!(heap.arena().high(), 96);
    assert_eq!(layout(&heap), vec![(12, 16, true), (28, 64, false)]);
    heap.check().unwrap();

    let small = heap.allocate(8).unwrap();

    assert_eq!(small, 32);
    assert_eq!(heap.arena().high(), 96);
    heap.check().unwrap();
  }

  #[test]
  fn test_spacer_disabled() {
    let mut heap = heap_with(HeapConfig::default().spacer(None));

    heap.allocate(8).unwrap();

    assert_eq!(heap.allocate(100).unwrap(), 32);
    heap.check().unwrap();
  }

  #[test]
  fn test_custom_spacer_policy() {
    let policy = SpacerPolicy {
      min_block: 8,
      max_block: 64,
      ratio: 2,
    };
    let mut heap = heap_with(HeapConfig::default().spacer(Some(policy)));

    heap.allocate(8).unwrap();

    assert_eq!(heap.allocate(100).unwrap(), 64);
    assert_eq!(layout(&heap)[1], (28, 32, false));
  }

  #[test]
  fn test_resize_tail_in_place() {
    let mut heap = heap();

    let a = heap.allocate(8).unwrap();
    heap.payload_mut(a).unwrap()[..8].copy_from_slice(b"rallocat");

    let resized = heap.resize(a, 1000).unwrap();

    assert_eq!(resized, a);
    assert_eq!(&heap.payload(a).unwrap()[..8], b"rallocat");
    assert_eq!(layout(&heap), vec![(12, 2032, true)]);
    assert_eq!(heap.occupied(), 2032);
    heap.check().unwrap();
  }

  #[test]
  fn test_resize_tail_moves_cursor_past_block() {
    let mut heap = heap();

    let a = heap.allocate(100).unwrap();
    heap.free(a).unwrap();
    let a = heap.allocate(100).unwrap();
    assert_eq!(heap.cursor(), 124);

    heap.resize(a, 1000).unwrap();

    assert_eq!(heap.cursor(), 12 + 2032);
    heap.check().unwrap();
    heap.allocate(4).unwrap();
    heap.check().unwrap();
  }

  #[test]
  fn test_resize_moves_block() {
    let mut heap = heap();

    let a = heap.allocate(8).unwrap();
    let b = heap.allocate(8).unwrap();
    heap.payload_mut(a).unwrap()[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

    let moved = heap.resize(a, 100).unwrap();

    assert_ne!(moved, a);
    assert_eq!(&heap.payload(moved).unwrap()[..8], &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert!(heap.payload(moved).unwrap().len() >= 100 + 1024);
    assert_eq!(heap.payload(a), Err(AllocError::InvalidAddress(a)));
    assert!(heap.payload(b).is_ok());
    heap.check().unwrap();
  }

  #[test]
  fn test_resize_never_shrinks() {
    let mut heap = heap();

    let a = heap.allocate(100).unwrap();

    assert_eq!(heap.resize(a, 10).unwrap(), a);
    assert_eq!(heap.payload(a).unwrap().len(), 104);
    heap.check().unwrap();
  }

  #[test]
  fn test_out_of_memory() {
    let mut heap = Heap::new(VecArena::with_limit(64)).unwrap();

    assert_eq!(heap.allocate(100), Err(AllocError::OutOfMemory { requested: 112 }));
    heap.check().unwrap();

    let a = heap.allocate(8).unwrap();
    assert_eq!(
      heap.resize(a, 100),
      Err(AllocError::OutOfMemory { requested: 1120 })
    );
    assert_eq!(
      heap.allocate(usize::MAX),
      Err(AllocError::OutOfMemory {
        requested: usize::MAX
      })
    );
    heap.check().unwrap();
  }

  #[test]
  fn test_invalid_addresses() {
    let mut heap = heap();

    let a = heap.allocate(40).unwrap();

    for address in [0, 3, 8, a + 4, a + 8, 4096] {
      assert_eq!(heap.free(address), Err(AllocError::InvalidAddress(address)));
    }

    heap.free(a).unwrap();
    assert_eq!(heap.free(a), Err(AllocError::InvalidAddress(a)));
    assert_eq!(heap.resize(a, 8), Err(AllocError::InvalidAddress(a)));
    heap.check().unwrap();
  }

  #[test]
  fn test_stats() {
    let mut heap = heap();

    let a = heap.allocate(100).unwrap();
    heap.allocate(100).unwrap();
    heap.free(a).unwrap();

    let stats = heap.stats();

    assert_eq!(stats.occupied, 112);
    assert_eq!(stats.arena_size, 240);
    assert_eq!(stats.allocated_blocks, 1);
    assert_eq!(stats.free_blocks, 1);
    assert_eq!(stats.largest_free, 112);
    assert!((stats.utilization() - 112.0 / 240.0).abs() < f64::EPSILON);
  }

  #[test]
  fn test_check_detects_corruption() {
    let mut heap = heap();

    let a = heap.allocate(16).unwrap();
    heap.allocate(16).unwrap();

    let footer = footer_of(header_of(a), 24);
    crate::block::write_tag(heap.arena.bytes_mut(), footer, Tag::free(24));

    assert_eq!(
      heap.check(),
      Err(AllocError::Corrupted {
        offset: 12,
        reason: "header and footer differ"
      })
    );
  }
}
