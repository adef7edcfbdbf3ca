use core::sync::atomic::{AtomicUsize, Ordering};

/// Change counters stamped on a [`RingVec`](crate::RingVec) and copied into
/// every cursor it hands out.
///
/// `mild` moves on every size-changing operation, `moderate` only when the
/// backing buffer is replaced. Both only ever grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Versions {
    mild: u64,
    moderate: u64,
}

impl Versions {
    /// Counters of a container with no mutation history.
    pub const BASELINE: Self = Self {
        mild: 0,
        moderate: 0,
    };

    /// Number of size-changing operations so far.
    pub const fn mild(&self) -> u64 {
        self.mild
    }

    /// Number of times the backing buffer was replaced.
    pub const fn moderate(&self) -> u64 {
        self.moderate
    }

    pub(crate) fn bump_mild(&mut self) {
        self.mild = self.mild.wrapping_add(1);
    }

    pub(crate) fn bump_moderate(&mut self) {
        self.moderate = self.moderate.wrapping_add(1);
    }

    /// Marks the buffer as replaced and the contents as changed.
    pub(crate) fn bump_all(&mut self) {
        self.bump_mild();
        self.bump_moderate();
    }
}

impl Default for Versions {
    fn default() -> Self {
        Self::BASELINE
    }
}

/// Process-unique identity of a container, used by cursors as their
/// non-owning back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct RingId(usize);

static NEXT: AtomicUsize = AtomicUsize::new(1);

impl RingId {
    #[cfg(target_has_atomic = "ptr")]
    pub(crate) fn next() -> Self {
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    // No atomic read-modify-write here (e.g. `thumbv6m`); such targets are
    // single-core.
    #[cfg(not(target_has_atomic = "ptr"))]
    pub(crate) fn next() -> Self {
        let id = NEXT.load(Ordering::Relaxed);
        NEXT.store(id.wrapping_add(1), Ordering::Relaxed);
        Self(id)
    }
}
