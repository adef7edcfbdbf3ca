use core::alloc::Layout;
use core::fmt;

use thiserror::Error;

/// Operational failures of a [`RingVec`](crate::RingVec).
///
/// None of these leave the container in a modified state: the call that
/// returned the error made no structural change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("index {index} out of range for ring vector of length {len}")]
    OutOfRange { index: usize, len: usize },
    #[error("ring vector has no more elements")]
    Empty,
    #[error("capacity overflow")]
    CapacityOverflow,
    #[error("memory allocation of {} bytes failed", .layout.size())]
    Alloc { layout: Layout },
}

/// How serious a cursor invalidation is.
///
/// Variants are ordered by severity, `Mild < Moderate < Severe`. Only the most
/// serious applicable level is ever reported for a single access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The element count changed since the cursor was taken, or the cursor was
    /// stepped past the end.
    Mild,
    /// The backing buffer was replaced since the cursor was taken.
    Moderate,
    /// The cursor has no owner, belongs to another container, or points
    /// outside `[0, len]`.
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        })
    }
}

/// A cursor was used after its container changed in a way it cannot survive.
///
/// Whatever the severity, the cursor must be discarded and a new one obtained
/// from the container.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("{severity} iterator invalidation")]
pub struct InvalidIterator {
    pub severity: Severity,
}

/// Failure of a cursor dereference.
///
/// A stale or dangling cursor is [`CursorError::Invalid`]. A valid cursor that
/// sits on the end position has nothing to read and is
/// [`CursorError::Range`], the same error indexed access reports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error(transparent)]
    Invalid(#[from] InvalidIterator),
    #[error(transparent)]
    Range(#[from] Error),
}

impl CursorError {
    /// The invalidation level, or `None` for a range error.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            CursorError::Invalid(err) => Some(err.severity),
            CursorError::Range(_) => None,
        }
    }
}

impl InvalidIterator {
    pub(crate) const fn new(severity: Severity) -> Self {
        Self { severity }
    }

    pub(crate) const fn mild() -> Self {
        Self::new(Severity::Mild)
    }

    pub(crate) const fn moderate() -> Self {
        Self::new(Severity::Moderate)
    }

    pub(crate) const fn severe() -> Self {
        Self::new(Severity::Severe)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::{CursorError, Error, InvalidIterator, Severity};

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Mild < Severity::Moderate);
        assert!(Severity::Moderate < Severity::Severe);
        assert_eq!(
            [Severity::Moderate, Severity::Severe, Severity::Mild]
                .into_iter()
                .max(),
            Some(Severity::Severe),
            "Severe must dominate every other level"
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::OutOfRange { index: 2, len: 2 }.to_string(),
            "index 2 out of range for ring vector of length 2"
        );
        assert_eq!(Error::Empty.to_string(), "ring vector has no more elements");
        assert_eq!(
            InvalidIterator::moderate().to_string(),
            "moderate iterator invalidation"
        );
    }

    #[test]
    fn test_cursor_error_kinds() {
        let invalid = CursorError::from(InvalidIterator::severe());
        assert_eq!(invalid.severity(), Some(Severity::Severe));
        assert_eq!(invalid.to_string(), "severe iterator invalidation");

        let range = CursorError::from(Error::OutOfRange { index: 3, len: 3 });
        assert_eq!(range.severity(), None, "Range errors carry no severity");
        assert_eq!(
            range.to_string(),
            "index 3 out of range for ring vector of length 3"
        );
    }
}
