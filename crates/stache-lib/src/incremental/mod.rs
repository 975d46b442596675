//! Incremental reparsing.
//!
//! Edits are described as [`TextChange`]s in old-text coordinates. A new
//! parse replays the old one wherever it can prove the outcome is the same:
//! lexed leaves are reused when their lexing context matches and no change
//! touches the bytes they examined, and whole subtrees are reused when they
//! would be rebuilt from the same parser state over unchanged input. The
//! result is always the tree a full parse of the new text would produce.

mod reuse;

#[cfg(test)]
mod incremental_tests;

use std::ops::Range;

use crate::Error;

pub(crate) use reuse::{LexEvent, NodeEntry, ReuseMap};

/// Replacement of `old[start..old_end]` with `new_len` bytes.
///
/// ```
/// use stache_lib::TextChange;
///
/// let insert = TextChange::insert(10, 5);
/// assert_eq!(insert.delta(), 5);
///
/// let delete = TextChange::delete(5, 3);
/// assert_eq!(delete.delta(), -3);
///
/// let replace = TextChange::replace(0, 3, 5);
/// assert_eq!(replace.delta(), 2);
/// assert_eq!(replace.new_end(), 5);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TextChange {
    /// Start byte offset in old text.
    pub start: usize,
    /// End byte offset in old text (exclusive).
    pub old_end: usize,
    /// Length of replacement text in bytes.
    pub new_len: usize,
}

impl TextChange {
    #[inline]
    pub const fn new(start: usize, old_end: usize, new_len: usize) -> Self {
        TextChange {
            start,
            old_end,
            new_len,
        }
    }

    #[inline]
    pub const fn insert(at: usize, len: usize) -> Self {
        TextChange::new(at, at, len)
    }

    #[inline]
    pub const fn delete(start: usize, len: usize) -> Self {
        TextChange::new(start, start + len, 0)
    }

    #[inline]
    pub const fn replace(start: usize, old_len: usize, new_len: usize) -> Self {
        TextChange::new(start, start + old_len, new_len)
    }

    /// Net change in document length.
    #[inline]
    pub fn delta(&self) -> isize {
        self.new_len as isize - self.old_len() as isize
    }

    #[inline]
    pub const fn old_len(&self) -> usize {
        self.old_end - self.start
    }

    /// End of the replacement text, assuming no earlier change shifted it.
    #[inline]
    pub const fn new_end(&self) -> usize {
        self.start + self.new_len
    }

    /// Whether the replaced region shares a byte with `range` (old text).
    #[inline]
    pub fn intersects(&self, range: Range<usize>) -> bool {
        self.start < range.end && range.start < self.old_end
    }

    /// Whether text examined over `start..=end` could observe this change.
    /// Insertions at either boundary count.
    #[inline]
    pub(crate) fn touches(&self, start: usize, end: usize) -> bool {
        self.start <= end && self.old_end >= start
    }
}

/// Check that `changes` are ordered, non-overlapping, in bounds, and turn a
/// text of `old_len` bytes into one of `new_len` bytes.
pub fn validate_changes(changes: &[TextChange], old_len: usize, new_len: usize) -> Result<(), Error> {
    let mut previous_end = 0;
    let mut expected = old_len as isize;
    for (i, change) in changes.iter().enumerate() {
        if change.start > change.old_end {
            return Err(Error::InvalidEdit(format!(
                "change {i} starts after it ends ({}..{})",
                change.start, change.old_end
            )));
        }
        if change.old_end > old_len {
            return Err(Error::InvalidEdit(format!(
                "change {i} ends at {} past the old text ({old_len} bytes)",
                change.old_end
            )));
        }
        if change.start < previous_end {
            return Err(Error::InvalidEdit(format!(
                "change {i} at {} overlaps or precedes the previous change",
                change.start
            )));
        }
        previous_end = change.old_end;
        expected += change.delta();
    }
    if expected != new_len as isize {
        return Err(Error::InvalidEdit(format!(
            "changes produce {expected} bytes but the new text has {new_len}"
        )));
    }
    Ok(())
}

/// Validated changes, with position mapping from new text back to old.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChangeSet<'c> {
    changes: &'c [TextChange],
}

impl<'c> ChangeSet<'c> {
    pub fn new(changes: &'c [TextChange]) -> Self {
        Self { changes }
    }

    /// Old-text position of `pos`, unless it lies in or at the edge of replacement text.
    pub fn to_old(&self, pos: usize) -> Option<usize> {
        let mut delta = 0isize;
        for change in self.changes {
            let new_start = change.start.checked_add_signed(delta)?;
            if pos < new_start {
                break;
            }
            if pos <= new_start + change.new_len {
                return None;
            }
            delta += change.delta();
        }
        pos.checked_add_signed(-delta)
    }

    pub fn touches(&self, start: usize, end: usize) -> bool {
        self.changes.iter().any(|change| change.touches(start, end))
    }
}

/// How much of the previous tree a reparse reused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IncrementalStats {
    /// Subtrees pushed whole.
    pub reused_nodes: usize,
    /// Lexer results replayed from the previous parse.
    pub reused_leaves: usize,
    /// Bytes covered by reused leaves and subtrees.
    pub reused_bytes: usize,
    /// Leaves lexed from scratch.
    pub lexed_leaves: usize,
    /// Bytes covered by leaves lexed from scratch.
    pub lexed_bytes: usize,
}

impl IncrementalStats {
    /// Fraction of the consumed text that was reused, in `0.0..=1.0`.
    pub fn reuse_rate(&self) -> f64 {
        let total = self.reused_bytes + self.lexed_bytes;
        if total == 0 {
            return 0.0;
        }
        self.reused_bytes as f64 / total as f64
    }
}
