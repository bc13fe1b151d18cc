/// Alignment unit of every block size and every payload offset.
pub const ALIGNMENT: usize = 8;

/// Rounds `value` up to the next multiple of [`ALIGNMENT`].
///
/// # Examples
///
/// ```rust
/// use rallocator::align;
///
/// assert_eq!(align!(0), 0);
/// assert_eq!(align!(13), 16);
/// assert_eq!(align!(16), 16);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align_to!($value, $crate::align::ALIGNMENT)
  };
}

/// Rounds `value` up to the next multiple of `align`, which must be a power
/// of two.
///
/// ```rust
/// use rallocator::align_to;
///
/// assert_eq!(align_to!(5, 4), 8);
/// assert_eq!(align_to!(4096, 4096), 4096);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $align:expr) => {
    ($value + $align - 1) & !($align - 1)
  };
}

/// Overflow-aware version of [`align!`] used on caller supplied sizes.
#[inline]
pub const fn checked_align(value: usize) -> Option<usize> {
  match value.checked_add(ALIGNMENT - 1) {
    Some(v) => Some(v & !(ALIGNMENT - 1)),
    None => None,
  }
}

#[inline]
pub const fn is_aligned(value: usize) -> bool {
  value & (ALIGNMENT - 1) == 0
}
