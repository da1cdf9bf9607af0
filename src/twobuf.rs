use std::fmt;

/// A read buffer that carries the unconsumed tail of one `execute` call
/// into the next without reallocating.
///
/// The backing storage is split in two halves of `size` bytes. New reads
/// land in the right half; the tail left over from the previous call is
/// copied to the end of the left half, directly in front of the new bytes,
/// so the next window is one contiguous slice.
///
/// ```text
///  0            left       mid                 mid + filled      2 * size
///  |   unused    |  carried  |   freshly read    |     unused       |
///                \___________ window(filled) ____/
/// ```
#[derive(Debug, Clone)]
pub struct TwoBuf {
    buf: Vec<u8>,
    mid: usize,
    left: usize,
}

/// The tail to carry is longer than the left half of a [`TwoBuf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarryOverflow {
    /// Bytes that needed to be carried.
    pub len: usize,
    /// Capacity of the left half.
    pub capacity: usize,
}

impl fmt::Display for CarryOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unconsumed tail of {} bytes does not fit the {} byte carry area",
            self.len, self.capacity
        )
    }
}

impl std::error::Error for CarryOverflow {}

impl TwoBuf {
    /// Allocate a buffer whose halves are `size` bytes each.
    ///
    /// # Panics
    ///
    /// Panics if `2 * size` overflows `usize`.
    pub fn new(size: usize) -> Self {
        let Some(len) = size.checked_mul(2) else {
            panic!("two halves of {size} bytes overflow usize");
        };
        Self {
            buf: vec![0; len],
            mid: size,
            left: size,
        }
    }

    /// Size of one half: the most a single read may fill and the longest
    /// tail that can be carried.
    pub fn half(&self) -> usize {
        self.mid
    }

    /// Number of carried bytes currently in front of the right half.
    pub fn carried(&self) -> usize {
        self.mid - self.left
    }

    /// The right half, to read new bytes into.
    pub fn right_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.mid..]
    }

    /// Carried tail followed by the first `filled` bytes of the right half.
    pub fn window(&self, filled: usize) -> &[u8] {
        &self.buf[self.left..self.mid + filled]
    }

    /// Keep whatever follows the first `consumed` bytes of
    /// [`window(filled)`](Self::window) for the next window.
    ///
    /// # Errors
    ///
    /// Returns [`CarryOverflow`] when the tail is longer than one half. The
    /// buffer is left unchanged in that case.
    pub fn retain(&mut self, filled: usize, consumed: usize) -> Result<(), CarryOverflow> {
        let start = self.left + consumed;
        let end = self.mid + filled;
        let len = end - start;
        if len > self.mid {
            return Err(CarryOverflow {
                len,
                capacity: self.mid,
            });
        }
        let left = self.mid - len;
        self.buf.copy_within(start..end, left);
        self.left = left;
        Ok(())
    }

    /// Drop any carried bytes.
    pub fn reset(&mut self) {
        self.left = self.mid;
    }
}
