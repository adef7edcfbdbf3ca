//! Version-checked random-access cursors.
//!
//! A cursor is a position handed out by [`RingVec::begin`] and friends. It
//! remembers which container it came from and that container's [`Versions`]
//! at the time, but holds no borrow, so the container stays free to change.
//! Every operation takes the container back and re-validates first:
//!
//! 1. no owner, another owner, or an index outside `[0, len]` is
//!    [`Severity::Severe`];
//! 2. a replaced buffer is [`Severity::Moderate`];
//! 3. a changed element count is [`Severity::Mild`].
//!
//! The first match is the one reported. A failing operation never moves the
//! cursor.
//!
//! ```
//! use ring_vec::{RingVec, Severity};
//!
//! let mut v = RingVec::from([10, 20, 30]);
//! let mut it = v.begin();
//! it.next(&v).unwrap();
//! assert_eq!(it.get(&v), Ok(&20));
//!
//! v.pop_back().unwrap();
//! assert_eq!(it.get(&v).unwrap_err().severity(), Some(Severity::Mild));
//! ```

use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;

use crate::error::{CursorError, InvalidIterator};
use crate::version::{RingId, Versions};
use crate::RingVec;

mod sealed {
    pub trait Sealed {}
}

/// Capability of a [`Cursor`]: [`ReadOnly`] or [`ReadWrite`].
pub trait Access: sealed::Sealed {}

/// Marker for cursors that can only read elements.
#[derive(Debug)]
pub enum ReadOnly {}

/// Marker for cursors that can also hand out mutable element references.
#[derive(Debug)]
pub enum ReadWrite {}

impl sealed::Sealed for ReadOnly {}
impl sealed::Sealed for ReadWrite {}
impl Access for ReadOnly {}
impl Access for ReadWrite {}

/// A read-write cursor. Converts into a read-only [`Cursor`], never back.
pub type CursorMut<T> = Cursor<T, ReadWrite>;

/// A position inside a [`RingVec`] plus the version snapshot it was taken at.
pub struct Cursor<T, K: Access = ReadOnly> {
    owner: Option<RingId>,
    index: usize,
    snapshot: Versions,
    _marker: PhantomData<(fn() -> T, K)>,
}

impl<T, K: Access> Cursor<T, K> {
    pub(crate) fn at(ring: &RingVec<T>, index: usize) -> Self {
        Self {
            owner: Some(ring.id),
            index,
            snapshot: ring.versions,
            _marker: PhantomData,
        }
    }

    /// A cursor with no owner. Every operation on it fails as severe.
    pub const fn detached() -> Self {
        Self {
            owner: None,
            index: 0,
            snapshot: Versions::BASELINE,
            _marker: PhantomData,
        }
    }

    /// Drops the back-reference to the owning container.
    pub fn detach(&mut self) {
        self.owner = None;
    }

    pub const fn is_detached(&self) -> bool {
        self.owner.is_none()
    }

    /// The logical index, unchecked.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The versions this cursor was stamped with.
    pub const fn snapshot(&self) -> Versions {
        self.snapshot
    }

    /// Validates the cursor against `ring`, reporting the most severe problem.
    pub fn check(&self, ring: &RingVec<T>) -> Result<(), InvalidIterator> {
        if self.owner != Some(ring.id) || self.index > ring.len() {
            return Err(InvalidIterator::severe());
        }

        if self.snapshot.moderate() != ring.versions.moderate() {
            return Err(InvalidIterator::moderate());
        }

        if self.snapshot.mild() != ring.versions.mild() {
            return Err(InvalidIterator::mild());
        }

        Ok(())
    }

    /// Dereferences the cursor.
    ///
    /// A valid cursor at the end position fails with
    /// [`Error::OutOfRange`](crate::Error::OutOfRange).
    pub fn get<'r>(&self, ring: &'r RingVec<T>) -> Result<&'r T, CursorError> {
        self.check(ring)?;
        Ok(ring.at(self.index)?)
    }

    /// Pre-increment. Stepping past the end is a mild failure.
    pub fn next(&mut self, ring: &RingVec<T>) -> Result<(), InvalidIterator> {
        self.check(ring)?;
        if self.index >= ring.len() {
            return Err(InvalidIterator::mild());
        }

        self.index += 1;
        Ok(())
    }

    /// Post-increment: moves forward and returns the previous position.
    pub fn post_next(&mut self, ring: &RingVec<T>) -> Result<Self, InvalidIterator> {
        let previous = *self;
        self.next(ring)?;
        Ok(previous)
    }

    /// Pre-decrement. Stepping before the first position is a severe failure.
    pub fn prev(&mut self, ring: &RingVec<T>) -> Result<(), InvalidIterator> {
        self.check(ring)?;
        self.index = self
            .index
            .checked_sub(1)
            .ok_or(InvalidIterator::severe())?;
        Ok(())
    }

    /// Post-decrement: moves backward and returns the previous position.
    pub fn post_prev(&mut self, ring: &RingVec<T>) -> Result<Self, InvalidIterator> {
        let previous = *self;
        self.prev(ring)?;
        Ok(previous)
    }

    /// `it + n` (or `it - n` for negative `n`).
    ///
    /// The result keeps this cursor's snapshot. Landing past the end is not
    /// reported here; the returned cursor fails as severe on its next use.
    /// Landing before the first position is reported immediately.
    pub fn offset(&self, n: isize, ring: &RingVec<T>) -> Result<Self, InvalidIterator> {
        self.check(ring)?;
        let index = self
            .index
            .checked_add_signed(n)
            .ok_or(InvalidIterator::severe())?;

        Ok(Self { index, ..*self })
    }

    /// `it += n` (or `it -= n` for negative `n`), see [`Cursor::offset`].
    pub fn advance(&mut self, n: isize, ring: &RingVec<T>) -> Result<(), InvalidIterator> {
        *self = self.offset(n, ring)?;
        Ok(())
    }

    /// `self - other`, in elements.
    pub fn distance<L: Access>(
        &self,
        other: &Cursor<T, L>,
        ring: &RingVec<T>,
    ) -> Result<isize, InvalidIterator> {
        self.check(ring)?;
        other.check(ring)?;

        // Zero-sized elements let `len` exceed `isize::MAX`.
        let signed = |index: usize| isize::try_from(index).map_err(|_| InvalidIterator::severe());
        Ok(signed(self.index)? - signed(other.index)?)
    }

    /// Orders two cursors into the same container by position.
    pub fn compare<L: Access>(
        &self,
        other: &Cursor<T, L>,
        ring: &RingVec<T>,
    ) -> Result<Ordering, InvalidIterator> {
        self.check(ring)?;
        other.check(ring)?;
        Ok(self.index.cmp(&other.index))
    }

    /// Whether two cursors point at the same position.
    pub fn same_position<L: Access>(
        &self,
        other: &Cursor<T, L>,
        ring: &RingVec<T>,
    ) -> Result<bool, InvalidIterator> {
        self.compare(other, ring).map(Ordering::is_eq)
    }
}

impl<T> Cursor<T, ReadWrite> {
    /// Dereferences the cursor mutably, see [`Cursor::get`].
    pub fn get_mut<'r>(&self, ring: &'r mut RingVec<T>) -> Result<&'r mut T, CursorError> {
        self.check(ring)?;
        Ok(ring.at_mut(self.index)?)
    }
}

impl<T> From<Cursor<T, ReadWrite>> for Cursor<T, ReadOnly> {
    fn from(cursor: Cursor<T, ReadWrite>) -> Self {
        Self {
            owner: cursor.owner,
            index: cursor.index,
            snapshot: cursor.snapshot,
            _marker: PhantomData,
        }
    }
}

impl<T, K: Access> Clone for Cursor<T, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, K: Access> Copy for Cursor<T, K> {}

impl<T, K: Access> Default for Cursor<T, K> {
    fn default() -> Self {
        Self::detached()
    }
}

impl<T, K: Access> fmt::Debug for Cursor<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("owner", &self.owner)
            .field("index", &self.index)
            .field("snapshot", &self.snapshot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use core::cmp::Ordering;

    use super::{Cursor, CursorMut};
    use crate::error::{CursorError, Error, Severity};
    use crate::RingVec;

    fn ring_of(values: &[i32]) -> RingVec<i32> {
        let mut ring = RingVec::new();
        for value in values {
            ring.push_back(*value);
        }
        ring
    }

    fn severity<T, E>(result: Result<T, E>) -> Option<Severity>
    where
        E: Into<CursorError>,
    {
        result.err().and_then(|err| err.into().severity())
    }

    #[test]
    fn test_walk_forward() {
        let ring = ring_of(&[10, 20, 30]);
        let mut sut = ring.begin();
        let end = ring.end();

        let mut seen = alloc::vec::Vec::new();
        while !sut.same_position(&end, &ring).unwrap() {
            seen.push(*sut.get(&ring).unwrap());
            sut.next(&ring).unwrap();
        }

        assert_eq!(seen, [10, 20, 30], "Cursor must visit elements in order");
        assert_eq!(sut.index(), 3);
    }

    #[test]
    fn test_walk_backward() {
        let ring = ring_of(&[1, 2, 3]);
        let mut sut = ring.end();

        sut.prev(&ring).unwrap();
        assert_eq!(sut.get(&ring), Ok(&3));
        sut.prev(&ring).unwrap();
        sut.prev(&ring).unwrap();
        assert_eq!(sut.get(&ring), Ok(&1));

        assert_eq!(
            severity(sut.prev(&ring)),
            Some(Severity::Severe),
            "Stepping before the first element is severe"
        );
        assert_eq!(sut.index(), 0, "A failed step must not move the cursor");
    }

    #[test]
    fn test_post_increment_and_decrement() {
        let ring = ring_of(&[5, 6]);
        let mut sut = ring.begin();

        let previous = sut.post_next(&ring).unwrap();
        assert_eq!(previous.get(&ring), Ok(&5));
        assert_eq!(sut.get(&ring), Ok(&6));

        let previous = sut.post_prev(&ring).unwrap();
        assert_eq!(previous.get(&ring), Ok(&6));
        assert_eq!(sut.get(&ring), Ok(&5));
    }

    #[test]
    fn test_increment_past_end() {
        let ring = ring_of(&[10, 20, 30]);
        let mut sut = ring.end();

        assert_eq!(
            severity(sut.next(&ring)),
            Some(Severity::Mild),
            "Incrementing the end cursor is a mild range failure"
        );
        assert_eq!(sut.index(), 3, "A failed step must not move the cursor");
        assert_eq!(sut.check(&ring), Ok(()), "The end cursor stays usable");
    }

    #[test]
    fn test_dereference_end() {
        let ring = RingVec::from([10, 20, 30]);
        assert_eq!(
            ring.end().get(&ring),
            Err(CursorError::Range(Error::OutOfRange { index: 3, len: 3 })),
            "Dereferencing end is a range error, not an invalidation"
        );

        let mut empty = RingVec::<i32>::new();
        assert_eq!(
            empty.begin_mut().get_mut(&mut empty),
            Err(CursorError::Range(Error::OutOfRange { index: 0, len: 0 }))
        );
    }

    #[test]
    fn test_arithmetic() {
        let ring = ring_of(&[0, 1, 2, 3, 4]);
        let begin = ring.begin();
        let end = ring.end();

        let third = begin.offset(2, &ring).unwrap();
        assert_eq!(third.get(&ring), Ok(&2));
        assert_eq!(third.offset(-2, &ring).unwrap().get(&ring), Ok(&0));

        assert_eq!(end.distance(&begin, &ring), Ok(5));
        assert_eq!(begin.distance(&third, &ring), Ok(-2));

        let mut sut = begin;
        sut.advance(4, &ring).unwrap();
        assert_eq!(sut.get(&ring), Ok(&4));
        sut.advance(-1, &ring).unwrap();
        assert_eq!(sut.get(&ring), Ok(&3));

        assert_eq!(severity(begin.offset(-1, &ring)), Some(Severity::Severe));
    }

    #[test]
    fn test_offset_past_end_fails_on_next_use() {
        let ring = ring_of(&[1, 2]);
        let sut = ring.begin().offset(3, &ring).unwrap();

        assert_eq!(sut.index(), 3);
        assert_eq!(severity(sut.get(&ring)), Some(Severity::Severe));
        assert_eq!(severity(sut.check(&ring)), Some(Severity::Severe));
    }

    #[test]
    fn test_ordering() {
        let ring = ring_of(&[1, 2, 3]);
        let begin = ring.begin();
        let middle = begin.offset(1, &ring).unwrap();

        assert_eq!(begin.compare(&middle, &ring), Ok(Ordering::Less));
        assert_eq!(middle.compare(&begin, &ring), Ok(Ordering::Greater));
        assert_eq!(middle.compare(&middle, &ring), Ok(Ordering::Equal));
        assert_eq!(begin.same_position(&middle, &ring), Ok(false));
    }

    #[test]
    fn test_comparison_validates_both_sides() {
        let mut ring = ring_of(&[1, 2, 3]);
        let stale = ring.begin();
        ring.push_back(4);
        let fresh = ring.begin();

        assert_eq!(
            severity(fresh.compare(&stale, &ring)),
            Some(Severity::Mild),
            "A stale right-hand side must be reported too"
        );
    }

    #[test]
    fn test_mutable_cursor() {
        let mut ring = ring_of(&[1, 2, 3]);
        let sut = ring.begin_mut().offset(1, &ring).unwrap();

        *sut.get_mut(&mut ring).unwrap() = 20;
        assert_eq!(ring.at(1), Ok(&20));

        let read_only: Cursor<i32> = sut.into();
        assert_eq!(read_only.index(), sut.index());
        assert_eq!(read_only.snapshot(), sut.snapshot());
        assert_eq!(read_only.get(&ring), Ok(&20));
    }

    #[test]
    fn test_mixed_access_comparison() {
        let mut ring = ring_of(&[1, 2]);
        let write: CursorMut<i32> = ring.end_mut();
        let read = ring.begin();

        assert_eq!(write.distance(&read, &ring), Ok(2));
        assert_eq!(read.compare(&write, &ring), Ok(Ordering::Less));
    }

    #[test]
    fn test_detached() {
        let ring = ring_of(&[1]);
        let sut = Cursor::<i32>::default();

        assert!(sut.is_detached());
        assert_eq!(severity(sut.get(&ring)), Some(Severity::Severe));

        let mut sut = ring.begin();
        assert!(!sut.is_detached());
        sut.detach();
        assert!(sut.is_detached());
        assert_eq!(severity(sut.check(&ring)), Some(Severity::Severe));
    }

    #[test]
    fn test_foreign_container() {
        let a = ring_of(&[1, 2, 3]);
        let b = ring_of(&[1, 2, 3]);

        assert_eq!(
            severity(a.begin().get(&b)),
            Some(Severity::Severe),
            "A cursor must not be usable on another container"
        );
    }

    #[test]
    fn test_distance_on_zero_sized_elements() {
        let mut ring = RingVec::new();
        for _ in 0..20 {
            ring.push_back(());
        }
        let begin = ring.begin();
        let end = ring.end();

        assert_eq!(end.distance(&begin, &ring), Ok(20));
        assert_eq!(begin.distance(&end, &ring), Ok(-20));
        assert_eq!(
            severity(begin.offset(21, &ring).unwrap().distance(&begin, &ring)),
            Some(Severity::Severe)
        );

        // Zero-sized elements need no storage, so only the count is faked.
        ring.len = usize::MAX;
        let end = ring.end();
        let begin = ring.begin();
        assert_eq!(end.check(&ring), Ok(()));
        assert_eq!(
            severity(end.distance(&begin, &ring)),
            Some(Severity::Severe),
            "An index past isize::MAX has no signed distance"
        );
        assert_eq!(begin.distance(&begin, &ring), Ok(0));
        ring.len = 0;
    }
}
