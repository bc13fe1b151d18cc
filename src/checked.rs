//! Misuse detection on top of [`Heap`].
//!
//! The plain heap only rejects addresses whose tags do not describe a live
//! block. [`CheckedHeap`] remembers every address it handed out, so a second
//! free of the same address or a free of an address it never issued is
//! reported precisely instead of being left to the tags.

use std::collections::HashSet;

use tracing::warn;

use crate::{
  arena::{Arena, VecArena},
  error::{AllocError, Result},
  heap::Heap,
};

#[derive(Debug)]
pub struct CheckedHeap<A: Arena = VecArena> {
  heap: Heap<A>,
  live: HashSet<usize>,
  released: HashSet<usize>,
}

impl<A: Arena> CheckedHeap<A> {
  pub fn new(heap: Heap<A>) -> Self {
    Self {
      heap,
      live: HashSet::new(),
      released: HashSet::new(),
    }
  }

  pub fn heap(&self) -> &Heap<A> {
    &self.heap
  }

  pub fn into_inner(self) -> Heap<A> {
    self.heap
  }

  /// Number of addresses currently allocated.
  pub fn live(&self) -> usize {
    self.live.len()
  }

  fn ensure_live(
    &self,
    address: usize,
  ) -> Result<()> {
    if self.live.contains(&address) {
      return Ok(());
    }

    let error = if self.released.contains(&address) {
      AllocError::DoubleFree(address)
    } else {
      AllocError::NotAllocated(address)
    };
    warn!(address, %error, "rejected heap access");

    Err(error)
  }

  fn issue(
    &mut self,
    address: usize,
  ) {
    self.released.remove(&address);
    self.live.insert(address);
  }

  fn release(
    &mut self,
    address: usize,
  ) {
    self.live.remove(&address);
    self.released.insert(address);
  }

  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<usize> {
    let address = self.heap.allocate(size)?;
    self.issue(address);

    Ok(address)
  }

  pub fn free(
    &mut self,
    address: usize,
  ) -> Result<()> {
    self.ensure_live(address)?;
    self.heap.free(address)?;
    self.release(address);

    Ok(())
  }

  pub fn resize(
    &mut self,
    address: usize,
    size: usize,
  ) -> Result<usize> {
    self.ensure_live(address)?;

    let moved = self.heap.resize(address, size)?;
    if moved != address {
      self.release(address);
      self.issue(moved);
    }

    Ok(moved)
  }

  pub fn payload(
    &self,
    address: usize,
  ) -> Result<&[u8]> {
    self.ensure_live(address)?;
    self.heap.payload(address)
  }

  pub fn payload_mut(
    &mut self,
    address: usize,
  ) -> Result<&mut [u8]> {
    self.ensure_live(address)?;
    self.heap.payload_mut(address)
  }
}
