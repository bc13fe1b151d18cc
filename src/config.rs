//! Placement policy knobs.
//!
//! Defaults reproduce the tuned values the allocator ships with. Every knob
//! can be overridden from the environment through [`HeapConfig::from_env`]:
//!
//! | variable              | values                                   |
//! |-----------------------|------------------------------------------|
//! | `RALLOC_SEARCH`       | `next-fit` / `first-fit`                 |
//! | `RALLOC_RESIZE_SLACK` | bytes, e.g. `1024`                       |
//! | `RALLOC_SPACER`       | `off` or `min,max,ratio`, e.g. `8,100,4` |

use std::env;

use tracing::warn;

use crate::{
  align::{ALIGNMENT, checked_align},
  block::{MIN_BLOCK_SIZE, TAG_OVERHEAD},
};

pub const DEFAULT_RESIZE_SLACK: usize = 0x400;

/// Where the free block search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
  /// Always from the start of the heap.
  FirstFit,
  /// From wherever the previous allocation or free left the cursor.
  #[default]
  NextFit,
}

/// Thresholds of the fragmentation-avoidance spacer.
///
/// When no free block fits and the heap's last block is a small allocated
/// one (`min_block < size < max_block`) while the request is more than
/// `ratio` times larger, a free block of `ratio * size` bytes is left
/// behind it before the new block is appended. Small requests of the same
/// shape then land in that gap instead of being interleaved with large
/// blocks further up the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpacerPolicy {
  pub min_block: usize,
  pub max_block: usize,
  pub ratio: usize,
}

impl SpacerPolicy {
  /// Spacer size for a last block of `last_size` bytes, if one is due.
  ///
  /// A spacer smaller than a minimum block cannot carry its own tags, so
  /// none is due then.
  pub fn spacer_for(
    &self,
    last_size: usize,
    needed: usize,
  ) -> Option<usize> {
    let spacer = last_size.checked_mul(self.ratio)?;

    (last_size > self.min_block
      && last_size < self.max_block
      && spacer >= MIN_BLOCK_SIZE
      && spacer < needed)
      .then_some(spacer)
  }
}

impl Default for SpacerPolicy {
  fn default() -> Self {
    Self {
      min_block: TAG_OVERHEAD,
      max_block: 100,
      ratio: 4,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
  pub search: SearchMode,
  /// Extra bytes reserved whenever a resize has to grow a block.
  pub resize_slack: usize,
  pub spacer: Option<SpacerPolicy>,
}

impl Default for HeapConfig {
  fn default() -> Self {
    Self {
      search: SearchMode::default(),
      resize_slack: DEFAULT_RESIZE_SLACK,
      spacer: Some(SpacerPolicy::default()),
    }
  }
}

impl HeapConfig {
  pub fn search(
    mut self,
    search: SearchMode,
  ) -> Self {
    self.search = search;
    self
  }

  /// Sets the resize slack, rounded up to [`ALIGNMENT`]. Values too large
  /// to round up saturate at the largest aligned `usize`.
  pub fn resize_slack(
    mut self,
    slack: usize,
  ) -> Self {
    self.resize_slack = checked_align(slack).unwrap_or(usize::MAX & !(ALIGNMENT - 1));
    self
  }

  pub fn spacer(
    mut self,
    spacer: Option<SpacerPolicy>,
  ) -> Self {
    self.spacer = spacer;
    self
  }

  /// Defaults overridden by any `RALLOC_*` variables that are set.
  ///
  /// Unparseable values are logged and ignored.
  pub fn from_env() -> Self {
    Self::from_lookup(|key| env::var(key).ok())
  }

  fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let mut config = Self::default();

    if let Some(value) = lookup("RALLOC_SEARCH") {
      match value.trim() {
        "next-fit" | "next" => config.search = SearchMode::NextFit,
        "first-fit" | "first" => config.search = SearchMode::FirstFit,
        other => warn!(value = other, "ignoring RALLOC_SEARCH"),
      }
    }

    if let Some(value) = lookup("RALLOC_RESIZE_SLACK") {
      match value.trim().parse::<usize>() {
        Ok(slack) => config = config.resize_slack(slack),
        _ => warn!(value = %value, "ignoring RALLOC_RESIZE_SLACK"),
      }
    }

    if let Some(value) = lookup("RALLOC_SPACER") {
      match parse_spacer(value.trim()) {
        Some(spacer) => config.spacer = spacer,
        None => warn!(value = %value, "ignoring RALLOC_SPACER"),
      }
    }

    config
  }
}

fn parse_spacer(value: &str) -> Option<Option<SpacerPolicy>> {
  if value == "off" {
    return Some(None);
  }

  let mut fields = value.split(',').map(|field| field.trim().parse::<usize>());
  let policy = SpacerPolicy {
    min_block: fields.next()?.ok()?,
    max_block: fields.next()?.ok()?,
    ratio: fields.next()?.ok()?,
  };

  match fields.next() {
    None if policy.ratio > 0 => Some(Some(policy)),
    _ => None,
  }
}
