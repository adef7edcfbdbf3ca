//! Uninitialized slot storage.
//!
//! [`RawBuf`] owns a block of `capacity` slots and never constructs or drops
//! elements on its own. The owner decides which slots are live and must pair
//! every [`RawBuf::construct`] with exactly one [`RawBuf::take`] or
//! [`RawBuf::destroy`].

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::mem::MaybeUninit;
use core::ops::Range;

use crate::error::Error;

pub(crate) struct RawBuf<T> {
    slots: Box<[MaybeUninit<T>]>,
}

impl<T> RawBuf<T> {
    /// Allocates `capacity` uninitialized slots.
    ///
    /// Fails without side effects when the layout overflows or the allocator
    /// refuses the request.
    pub(crate) fn try_allocate(capacity: usize) -> Result<Self, Error> {
        let layout = Layout::array::<T>(capacity).map_err(|_| Error::CapacityOverflow)?;

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| Error::Alloc { layout })?;
        slots.resize_with(capacity, MaybeUninit::uninit);

        Ok(Self {
            slots: slots.into_boxed_slice(),
        })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Constructs `element` in `slot`.
    ///
    /// The slot must not hold a live element, otherwise that element is leaked.
    pub(crate) fn construct(&mut self, slot: usize, element: T) -> &mut T {
        self.slots[slot].write(element)
    }

    /// Moves the element out of `slot`, leaving it uninitialized.
    ///
    /// # Safety
    /// `slot` must hold a live element.
    pub(crate) unsafe fn take(&mut self, slot: usize) -> T {
        unsafe { self.slots[slot].assume_init_read() }
    }

    /// Drops the element in `slot` in place, leaving it uninitialized.
    ///
    /// # Safety
    /// `slot` must hold a live element.
    pub(crate) unsafe fn destroy(&mut self, slot: usize) {
        unsafe { self.slots[slot].assume_init_drop() }
    }

    /// # Safety
    /// `slot` must hold a live element.
    pub(crate) unsafe fn get(&self, slot: usize) -> &T {
        unsafe { self.slots[slot].assume_init_ref() }
    }

    /// # Safety
    /// `slot` must hold a live element.
    pub(crate) unsafe fn get_mut(&mut self, slot: usize) -> &mut T {
        unsafe { self.slots[slot].assume_init_mut() }
    }

    /// Views the live run `head` and the wrapped-around run `0..tail_len`.
    ///
    /// # Safety
    /// Every slot in both runs must hold a live element and `tail_len` must not
    /// exceed `head.start`.
    pub(crate) unsafe fn slices(&self, head: Range<usize>, tail_len: usize) -> (&[T], &[T]) {
        let head = &self.slots[head];
        let tail = &self.slots[..tail_len];
        unsafe { (assume_init_slice(head), assume_init_slice(tail)) }
    }

    /// Mutable counterpart of [`RawBuf::slices`].
    ///
    /// # Safety
    /// Same contract as [`RawBuf::slices`].
    pub(crate) unsafe fn slices_mut(
        &mut self,
        head: Range<usize>,
        tail_len: usize,
    ) -> (&mut [T], &mut [T]) {
        let (lower, upper) = self.slots.split_at_mut(head.start);
        let head = &mut upper[..head.len()];
        let tail = &mut lower[..tail_len];
        unsafe { (assume_init_slice_mut(head), assume_init_slice_mut(tail)) }
    }
}

unsafe fn assume_init_slice<T>(slots: &[MaybeUninit<T>]) -> &[T] {
    unsafe { core::slice::from_raw_parts(slots.as_ptr().cast::<T>(), slots.len()) }
}

unsafe fn assume_init_slice_mut<T>(slots: &mut [MaybeUninit<T>]) -> &mut [T] {
    unsafe { core::slice::from_raw_parts_mut(slots.as_mut_ptr().cast::<T>(), slots.len()) }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use super::RawBuf;
    use crate::error::Error;

    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_allocate() {
        let sut = RawBuf::<u64>::try_allocate(8).unwrap();
        assert_eq!(sut.capacity(), 8, "Slot count must match the request");

        let sut = RawBuf::<()>::try_allocate(3).unwrap();
        assert_eq!(sut.capacity(), 3, "ZST buffers still report their slots");
    }

    #[test]
    fn test_allocate_overflow() {
        let result = RawBuf::<u64>::try_allocate(usize::MAX);
        assert!(
            matches!(result, Err(Error::CapacityOverflow)),
            "Oversized layouts must be rejected before allocating"
        );
    }

    #[test]
    fn test_construct_take_destroy() {
        let drops = Rc::new(Cell::new(0));
        let mut sut = RawBuf::try_allocate(4).unwrap();

        sut.construct(1, DropCounter(drops.clone()));
        sut.construct(3, DropCounter(drops.clone()));

        let taken = unsafe { sut.take(1) };
        assert_eq!(drops.get(), 0, "Taking an element must not drop it");
        drop(taken);
        assert_eq!(drops.get(), 1);

        unsafe { sut.destroy(3) };
        assert_eq!(drops.get(), 2, "Destroy must drop in place");

        drop(sut);
        assert_eq!(drops.get(), 2, "Releasing the block never drops elements");
    }

    #[test]
    fn test_slices() {
        let mut sut = RawBuf::try_allocate(5).unwrap();
        for (slot, value) in [(3, 'a'), (4, 'b'), (0, 'c')] {
            sut.construct(slot, value);
        }

        let (head, tail) = unsafe { sut.slices(3..5, 1) };
        assert_eq!(head, &['a', 'b']);
        assert_eq!(tail, &['c']);

        let (head, tail) = unsafe { sut.slices_mut(3..5, 1) };
        head[0] = 'x';
        tail[0] = 'z';
        assert_eq!(unsafe { *sut.get(3) }, 'x');
        assert_eq!(unsafe { *sut.get_mut(0) }, 'z');
    }
}
