#![no_std]

//! A **heap-allocated**, **growable** ring buffer with **version-checked cursors**, `no_std` compatible.
//!
//! `RingVec<T>` stores its elements in a circular block of uninitialized
//! slots. Logical index `0` can sit at any physical slot, so inserting or
//! removing at either end never shifts the other elements.
//! When the block is full it is replaced by one twice as large.
//!
//! This type is ideal for cases where:
//! - You need amortized O(1) `push`/`pop` at **both** ends.
//! - You want to hold on to positions across mutations and be told, rather
//!   than surprised, when they went stale (see [`Cursor`]).
//! - You're working in `no_std` environments with an allocator.
//!
//! ```rust
//! use ring_vec::RingVec;
//!
//! let mut v = RingVec::new();
//! assert!(v.is_empty());
//!
//! v.push_back(20);
//! v.push_back(30);
//! v.push_front(10);
//! assert_eq!(v.len(), 3);
//!
//! assert_eq!(v.front(), Some(&10));
//! assert_eq!(v.at(1), Ok(&20));
//! assert_eq!(v.back(), Some(&30));
//!
//! assert_eq!(v, [10, 20, 30]);
//! assert_eq!(v.pop_front(), Ok(10));
//! assert_eq!(v.pop_back(), Ok(30));
//! assert_eq!(v.pop_back(), Ok(20));
//! assert!(v.pop_back().is_err());
//! ```

extern crate alloc;

mod cursor;
mod error;
mod iter;
mod raw;
mod version;

use alloc::alloc::handle_alloc_error;
use core::hash::Hash;
use core::mem;
use core::ops::{Index, IndexMut, Range};

pub use cursor::{Access, Cursor, CursorMut, ReadOnly, ReadWrite};
pub use error::{CursorError, Error, InvalidIterator, Severity};
pub use iter::{IntoIter, Iter, IterMut};
pub use version::Versions;

use raw::RawBuf;
use version::RingId;

/// A heap-allocated, growable, double-ended ring buffer.
///
/// `RingVec` is similar to [`VecDeque`](alloc::collections::VecDeque), except:
/// - The **capacity** is never zero and grows by exact doubling.
/// - The buffer is allocated **lazily**, on the first insertion.
/// - Every structural change is recorded in [`Versions`], which lets
///   [`Cursor`]s detect that they went stale.
pub struct RingVec<T> {
    id: RingId,
    len: usize,
    front: usize,
    capacity: usize,
    buf: Option<RawBuf<T>>,
    versions: Versions,
}

impl<T> RingVec<T> {
    /// Capacity used whenever none, or zero, is requested.
    pub const DEFAULT_CAPACITY: usize = 8;

    /// Creates a new, empty `RingVec` with [`RingVec::DEFAULT_CAPACITY`].
    /// The buffer is not allocated until an element is inserted.
    ///
    /// ```
    /// use ring_vec::RingVec;
    ///
    /// let v = RingVec::<i32>::new();
    /// assert_eq!(v.capacity(), 8);
    /// assert_eq!(v.len(), 0);
    /// assert!(v.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a new, empty `RingVec` that holds `capacity` elements before
    /// its first reallocation. A zero request yields the default capacity.
    ///
    /// ```
    /// use ring_vec::RingVec;
    ///
    /// assert_eq!(RingVec::<u8>::with_capacity(3).capacity(), 3);
    /// assert_eq!(RingVec::<u8>::with_capacity(0).capacity(), 8);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: RingId::next(),
            len: 0,
            front: 0,
            capacity: if capacity == 0 {
                Self::DEFAULT_CAPACITY
            } else {
                capacity
            },
            buf: None,
            versions: Versions::BASELINE,
        }
    }

    /// Creates a `RingVec` holding `len` default-constructed elements, with
    /// exactly that capacity (or the default one when `len` is zero).
    ///
    /// ```
    /// use ring_vec::RingVec;
    ///
    /// let v = RingVec::<u32>::with_len(3);
    /// assert_eq!(v, [0, 0, 0]);
    /// assert_eq!(v.capacity(), 3);
    /// ```
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut ring = Self::with_capacity(len);
        ring.extend(core::iter::repeat_with(T::default).take(len));
        ring.settle()
    }

    /// Returns the number of live elements.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the ring holds no elements.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots in the current (or pending) buffer.
    /// Always at least `len()` and never zero.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the change counters cursors are validated against.
    pub const fn versions(&self) -> Versions {
        self.versions
    }

    /// Bounds-checked access to the element at logical index `index`.
    ///
    /// ```
    /// use ring_vec::{Error, RingVec};
    ///
    /// let mut v = RingVec::new();
    /// v.push_back(10);
    /// v.push_back(20);
    /// assert_eq!(v.at(1), Ok(&20));
    /// assert_eq!(v.at(2), Err(Error::OutOfRange { index: 2, len: 2 }));
    /// ```
    pub fn at(&self, index: usize) -> Result<&T, Error> {
        let len = self.len;
        self.get(index).ok_or(Error::OutOfRange { index, len })
    }

    /// Mutable counterpart of [`RingVec::at`].
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        let len = self.len;
        self.get_mut(index).ok_or(Error::OutOfRange { index, len })
    }

    /// Returns the element at logical index `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let slot = self.slot(index);
        Some(unsafe { self.raw().get(slot) })
    }

    /// Mutable counterpart of [`RingVec::get`].
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }

        let slot = self.slot(index);
        Some(unsafe { self.raw_mut().get_mut(slot) })
    }

    /// The first element, or `None` if the ring is empty.
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// The last element, or `None` if the ring is empty.
    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|index| self.get(index))
    }

    /// Appends an element after the last one, doubling the capacity first if
    /// the ring is full.
    ///
    /// # Panics
    ///
    /// Panics if the doubled capacity overflows. Allocation failure is reported
    /// through [`handle_alloc_error`].
    ///
    /// ```
    /// use ring_vec::RingVec;
    ///
    /// let mut v = RingVec::with_capacity(2);
    /// v.push_back(1);
    /// v.push_back(2);
    /// v.push_back(3);
    /// assert_eq!(v, [1, 2, 3]);
    /// assert_eq!(v.capacity(), 4);
    /// ```
    pub fn push_back(&mut self, element: T) {
        self.push_back_with(|| element);
    }

    /// Prepends an element before the first one, doubling the capacity first
    /// if the ring is full.
    ///
    /// # Panics
    ///
    /// Same as [`RingVec::push_back`].
    ///
    /// ```
    /// use ring_vec::RingVec;
    ///
    /// let mut v = RingVec::new();
    /// v.push_front(2);
    /// v.push_front(1);
    /// assert_eq!(v, [1, 2]);
    /// ```
    pub fn push_front(&mut self, element: T) {
        self.push_front_with(|| element);
    }

    /// Appends the element returned by `make`, constructing it directly in
    /// its slot once room has been made.
    pub fn push_back_with<F>(&mut self, make: F)
    where
        F: FnOnce() -> T,
    {
        if let Err(err) = self.try_reserve_one() {
            handle_reserve_error(err);
        }

        self.place_back(make());
    }

    /// Prepends the element returned by `make`, constructing it directly in
    /// its slot once room has been made.
    pub fn push_front_with<F>(&mut self, make: F)
    where
        F: FnOnce() -> T,
    {
        if let Err(err) = self.try_reserve_one() {
            handle_reserve_error(err);
        }

        self.place_front(make());
    }

    /// Appends an element after the last one.
    /// Returns `Err(element)`, leaving the ring untouched, if growing failed.
    ///
    /// ```
    /// use ring_vec::RingVec;
    ///
    /// let mut v = RingVec::new();
    /// assert_eq!(v.try_push_back(1), Ok(()));
    /// assert_eq!(v, [1]);
    /// ```
    pub fn try_push_back(&mut self, element: T) -> Result<(), T> {
        if self.try_reserve_one().is_err() {
            return Err(element);
        }

        self.place_back(element);
        Ok(())
    }

    /// Prepends an element before the first one.
    /// Returns `Err(element)`, leaving the ring untouched, if growing failed.
    pub fn try_push_front(&mut self, element: T) -> Result<(), T> {
        if self.try_reserve_one().is_err() {
            return Err(element);
        }

        self.place_front(element);
        Ok(())
    }

    /// Removes the last element and returns it.
    ///
    /// ```
    /// use ring_vec::{Error, RingVec};
    ///
    /// let mut v = RingVec::from([1, 2]);
    /// assert_eq!(v.pop_back(), Ok(2));
    /// assert_eq!(v.pop_back(), Ok(1));
    /// assert_eq!(v.pop_back(), Err(Error::Empty));
    /// ```
    pub fn pop_back(&mut self) -> Result<T, Error> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        let slot = self.slot(self.len - 1);
        let element = unsafe { self.raw_mut().take(slot) };

        self.len -= 1;
        self.versions.bump_mild();
        Ok(element)
    }

    /// Removes the first element and returns it.
    ///
    /// ```
    /// use ring_vec::{Error, RingVec};
    ///
    /// let mut v = RingVec::from([1, 2]);
    /// assert_eq!(v.pop_front(), Ok(1));
    /// assert_eq!(v.pop_front(), Ok(2));
    /// assert_eq!(v.pop_front(), Err(Error::Empty));
    /// ```
    pub fn pop_front(&mut self) -> Result<T, Error> {
        if self.is_empty() {
            return Err(Error::Empty);
        }

        let slot = self.front;
        let element = unsafe { self.raw_mut().take(slot) };

        self.front = self.slot(1);
        self.len -= 1;
        self.versions.bump_mild();
        Ok(element)
    }

    /// Makes sure `additional` more elements fit without reallocating.
    ///
    /// The capacity keeps doubling until it is large enough, so it stays a
    /// power-of-two multiple of the initial one. On error the ring is
    /// unchanged.
    ///
    /// ```
    /// use ring_vec::RingVec;
    ///
    /// let mut v = RingVec::<u8>::new();
    /// v.try_reserve(20).unwrap();
    /// assert_eq!(v.capacity(), 32);
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), Error> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow)?;

        let mut capacity = self.capacity;
        while capacity < required {
            capacity = capacity.checked_mul(2).ok_or(Error::CapacityOverflow)?;
        }

        if self.buf.is_none() || capacity > self.capacity {
            self.try_resize(capacity)?;
        }

        Ok(())
    }

    /// Drops all elements and resets the ring to an empty state.
    /// The buffer remains allocated.
    ///
    /// ```
    /// use ring_vec::RingVec;
    ///
    /// let mut v = RingVec::from([1, 2, 3]);
    /// v.clear();
    /// assert!(v.is_empty());
    /// assert_eq!(v.capacity(), 3);
    /// ```
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }

        let len = mem::take(&mut self.len);
        if let Some(buf) = self.buf.as_mut() {
            for index in 0..len {
                let slot = wrap(self.front, self.capacity, index);
                unsafe { buf.destroy(slot) };
            }
        }

        self.front = 0;
        self.versions.bump_mild();
    }

    /// Moves the contents out into a new `RingVec`, leaving this one empty,
    /// unallocated and ready for reuse.
    ///
    /// The returned ring has a fresh identity and baseline [`Versions`]; this
    /// one keeps its identity and records that its buffer went away, so every
    /// cursor taken before the call is rejected by both.
    /// Move-assignment is `*dst = src.take()`.
    ///
    /// ```
    /// use ring_vec::RingVec;
    ///
    /// let mut src = RingVec::from([1, 2]);
    /// let dst = src.take();
    /// assert_eq!(dst, [1, 2]);
    /// assert!(src.is_empty());
    ///
    /// src.push_back(3);
    /// assert_eq!(src, [3]);
    /// ```
    pub fn take(&mut self) -> Self {
        let mut versions = self.versions;
        versions.bump_all();

        let taken = Self {
            id: RingId::next(),
            len: mem::take(&mut self.len),
            front: mem::take(&mut self.front),
            capacity: mem::replace(&mut self.capacity, Self::DEFAULT_CAPACITY),
            buf: self.buf.take(),
            versions: Versions::BASELINE,
        };

        self.versions = versions;
        taken
    }

    /// Returns the contents as two slices: the run starting at the front and
    /// the part that wrapped around. The second one is empty when the ring is
    /// contiguous.
    ///
    /// ```
    /// use ring_vec::RingVec;
    ///
    /// let mut v = RingVec::with_capacity(4);
    /// v.push_back(2);
    /// v.push_back(3);
    /// v.push_front(1);
    /// assert_eq!(v.as_slices(), (&[1][..], &[2, 3][..]));
    /// ```
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let (head, tail_len) = self.runs();
        match self.buf.as_ref() {
            Some(buf) => unsafe { buf.slices(head, tail_len) },
            None => (&[], &[]),
        }
    }

    /// Mutable counterpart of [`RingVec::as_slices`].
    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let (head, tail_len) = self.runs();
        match self.buf.as_mut() {
            Some(buf) => unsafe { buf.slices_mut(head, tail_len) },
            None => (&mut [], &mut []),
        }
    }

    /// Returns an iterator over immutable references to the elements.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.as_slices())
    }

    /// Returns an iterator over mutable references to the elements.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.as_mut_slices())
    }

    /// Returns a read-only cursor at the first position.
    pub fn begin(&self) -> Cursor<T> {
        Cursor::at(self, 0)
    }

    /// Returns a read-only cursor one past the last position.
    pub fn end(&self) -> Cursor<T> {
        Cursor::at(self, self.len)
    }

    /// Returns a read-write cursor at the first position.
    pub fn begin_mut(&mut self) -> CursorMut<T> {
        Cursor::at(self, 0)
    }

    /// Returns a read-write cursor one past the last position.
    pub fn end_mut(&mut self) -> CursorMut<T> {
        Cursor::at(self, self.len)
    }

    // ---

    /// Maps a logical index onto its physical slot.
    fn slot(&self, index: usize) -> usize {
        wrap(self.front, self.capacity, index)
    }

    /// The live run `front..` and the length of its wrapped-around remainder.
    fn runs(&self) -> (Range<usize>, usize) {
        debug_assert!(self.buf.as_ref().map_or(true, |buf| buf.capacity() == self.capacity));

        let head_len = self.len.min(self.capacity - self.front);
        (self.front..self.front + head_len, self.len - head_len)
    }

    /// # Safety
    /// The buffer must be allocated, which any live element guarantees.
    unsafe fn raw(&self) -> &RawBuf<T> {
        debug_assert!(self.buf.is_some());
        unsafe { self.buf.as_ref().unwrap_unchecked() }
    }

    /// # Safety
    /// The buffer must be allocated, which any live element guarantees.
    unsafe fn raw_mut(&mut self) -> &mut RawBuf<T> {
        debug_assert!(self.buf.is_some());
        unsafe { self.buf.as_mut().unwrap_unchecked() }
    }

    /// Makes room for one more element: allocates the pending buffer or
    /// doubles a full one.
    fn try_reserve_one(&mut self) -> Result<(), Error> {
        if self.buf.is_none() {
            return self.try_resize(self.capacity);
        }

        if self.len == self.capacity {
            let doubled = self
                .capacity
                .checked_mul(2)
                .ok_or(Error::CapacityOverflow)?;
            return self.try_resize(doubled);
        }

        Ok(())
    }

    /// Moves every live element into a fresh buffer of `capacity` slots,
    /// re-linearized so that the front lands on slot zero.
    ///
    /// The new block is allocated before anything is touched, so a failure
    /// leaves the ring exactly as it was.
    fn try_resize(&mut self, capacity: usize) -> Result<(), Error> {
        debug_assert!(capacity >= self.len && capacity > 0);

        let mut fresh = RawBuf::try_allocate(capacity).inspect_err(|err| {
            tracing::warn!(
                len = self.len,
                from = self.capacity,
                to = capacity,
                %err,
                "ring buffer growth failed"
            );
        })?;

        match self.buf.take() {
            None => {
                tracing::debug!(capacity, "allocated ring buffer");
            }
            Some(mut old) => {
                debug_assert_eq!(old.capacity(), self.capacity);
                for index in 0..self.len {
                    let slot = self.slot(index);
                    fresh.construct(index, unsafe { old.take(slot) });
                }

                tracing::trace!(
                    len = self.len,
                    from = self.capacity,
                    to = capacity,
                    "relocated ring buffer"
                );
                self.versions.bump_moderate();
            }
        }

        self.buf = Some(fresh);
        self.front = 0;
        self.capacity = capacity;
        Ok(())
    }

    /// Constructs `element` past the last live slot. Room must be reserved.
    fn place_back(&mut self, element: T) {
        debug_assert!(self.len < self.capacity);

        let slot = self.slot(self.len);
        unsafe { self.raw_mut() }.construct(slot, element);

        self.len += 1;
        self.versions.bump_mild();
    }

    /// Constructs `element` just before the front slot. Room must be reserved.
    fn place_front(&mut self, element: T) {
        debug_assert!(self.len < self.capacity);

        let slot = self.front.checked_sub(1).unwrap_or(self.capacity - 1);
        unsafe { self.raw_mut() }.construct(slot, element);

        self.front = slot;
        self.len += 1;
        self.versions.bump_mild();
    }

    /// Forgets the mutation history accumulated while building a new ring.
    fn settle(mut self) -> Self {
        self.versions = Versions::BASELINE;
        self
    }
}

/// Physical slot of logical `index` in a ring of `capacity` slots starting at
/// `front`. `front < capacity` and `index <= capacity` must hold.
fn wrap(front: usize, capacity: usize, index: usize) -> usize {
    if index < capacity - front {
        front + index
    } else {
        index - (capacity - front)
    }
}

#[cold]
fn handle_reserve_error(err: Error) -> ! {
    match err {
        Error::Alloc { layout } => handle_alloc_error(layout),
        err => panic!("{err}"),
    }
}

impl<T> Default for RingVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> From<[T; N]> for RingVec<T> {
    fn from(value: [T; N]) -> Self {
        let mut ring = Self::with_capacity(N);
        ring.extend(value);
        ring.settle()
    }
}

impl<T> FromIterator<T> for RingVec<T> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut ring = Self::new();
        ring.extend(iter);
        ring.settle()
    }
}

impl<T> Extend<T> for RingVec<T> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        iter.into_iter().for_each(|element| self.push_back(element));
    }
}

impl<T> Clone for RingVec<T>
where
    T: Clone,
{
    /// Deep copy into a buffer of the same capacity, front re-based to slot
    /// zero. The copy starts its own version history.
    fn clone(&self) -> Self {
        let mut ring = Self::with_capacity(self.capacity);
        self.iter()
            .for_each(|element| ring.push_back(element.clone()));
        ring.settle()
    }

    /// Copy-assignment: replaces the contents and invalidates every cursor
    /// into `self` as if its buffer had been reallocated.
    fn clone_from(&mut self, source: &Self) {
        let mut copy = source.clone();
        copy.id = self.id;
        copy.versions = self.versions;
        copy.versions.bump_all();
        *self = copy;
    }
}

impl<T> Index<usize> for RingVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.at(index) {
            Ok(element) => element,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T> IndexMut<usize> for RingVec<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let len = self.len;
        match self.get_mut(index) {
            Some(element) => element,
            None => panic!("{}", Error::OutOfRange { index, len }),
        }
    }
}

impl<T> IntoIterator for RingVec<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a RingVec<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut RingVec<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> PartialEq for RingVec<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other)
    }
}

impl<T> PartialEq<[T]> for RingVec<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &[T]) -> bool {
        self.len == other.len() && self.iter().eq(other)
    }
}

impl<T> PartialEq<&[T]> for RingVec<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &&[T]) -> bool {
        *self == **other
    }
}

impl<T, const N: usize> PartialEq<[T; N]> for RingVec<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &[T; N]) -> bool {
        *self == other[..]
    }
}

impl<T, const N: usize> PartialEq<&[T; N]> for RingVec<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &&[T; N]) -> bool {
        *self == other[..]
    }
}

impl<T> Eq for RingVec<T> where T: Eq {}

impl<T> PartialOrd for RingVec<T>
where
    T: PartialOrd,
{
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        self.iter().partial_cmp(other)
    }
}

impl<T> Ord for RingVec<T>
where
    T: Ord,
{
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.iter().cmp(other)
    }
}

impl<T> Hash for RingVec<T>
where
    T: Hash,
{
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        self.iter().for_each(|element| element.hash(state));
    }
}

impl<T> core::fmt::Debug for RingVec<T>
where
    T: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Drop for RingVec<T> {
    fn drop(&mut self) {
        self.clear();
    }
}
