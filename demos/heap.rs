use rallocator::{Arena, Heap, HeapConfig, VecArena};
use tracing_subscriber::EnvFilter;

/// Prints the arena's high end and the heap's bookkeeping after each step.
/// Run with `RUST_LOG=rallocator=trace` to also see every block.
fn print_heap(
  label: &str,
  heap: &Heap,
) {
  let stats = heap.stats();
  println!(
    "[{}] arena high = {:#x}, occupied = {} bytes, free blocks = {}, utilization = {:.1}%",
    label,
    heap.arena().high(),
    stats.occupied,
    stats.free_blocks,
    stats.utilization() * 100.0,
  );
  heap.dump();
}

fn main() -> rallocator::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  // Policy knobs can be overridden through RALLOC_SEARCH,
  // RALLOC_RESIZE_SLACK and RALLOC_SPACER.
  let mut heap = Heap::init(VecArena::new(), HeapConfig::from_env())?;
  print_heap("start", &heap);

  // --------------------------------------------------------------------
  // 1) Allocate 4 bytes. The block is 16 bytes: two 4-byte tags plus the
  //    payload rounded up to the 8-byte alignment unit.
  // --------------------------------------------------------------------
  let first = heap.allocate(4)?;
  heap.payload_mut(first)?[..4].copy_from_slice(&0xDEADBEEFu32.to_le_bytes());
  println!("\n[1] allocate(4) -> {first:#x}");
  print_heap("1", &heap);

  // --------------------------------------------------------------------
  // 2) Allocate 12 bytes to show an odd-sized request.
  // --------------------------------------------------------------------
  let second = heap.allocate(12)?;
  heap.payload_mut(second)?.fill(0xAB);
  println!("\n[2] allocate(12) -> {second:#x}");
  print_heap("2", &heap);

  // --------------------------------------------------------------------
  // 3) Free the first block, then ask for 2 bytes. The cursor was left on
  //    the freed block, so it is reused.
  // --------------------------------------------------------------------
  heap.free(first)?;
  let third = heap.allocate(2)?;
  println!(
    "\n[3] free({first:#x}); allocate(2) -> {third:#x} (reused: {})",
    third == first
  );
  print_heap("3", &heap);

  // --------------------------------------------------------------------
  // 4) A large request right after small ones leaves a free spacer behind
  //    the last small block.
  // --------------------------------------------------------------------
  let large = heap.allocate(200)?;
  println!("\n[4] allocate(200) -> {large:#x}");
  print_heap("4", &heap);

  // --------------------------------------------------------------------
  // 5) Grow the last block of the heap. No data moves.
  // --------------------------------------------------------------------
  let resized = heap.resize(large, 4000)?;
  println!("\n[5] resize({large:#x}, 4000) -> {resized:#x} (in place: {})", resized == large);
  print_heap("5", &heap);

  // --------------------------------------------------------------------
  // 6) Grow an inner block. It moves, and its bytes come along.
  // --------------------------------------------------------------------
  let moved = heap.resize(second, 64)?;
  println!(
    "\n[6] resize({second:#x}, 64) -> {moved:#x}, first byte = {:#X}",
    heap.payload(moved)?[0]
  );
  print_heap("6", &heap);

  // --------------------------------------------------------------------
  // 7) Free everything. Neighbouring free blocks coalesce.
  // --------------------------------------------------------------------
  for address in [third, resized, moved] {
    heap.free(address)?;
  }
  print_heap("7", &heap);
  heap.check()?;

  println!("\n[8] End of example. {} block(s) left in the heap.", heap.blocks().count());

  Ok(())
}
