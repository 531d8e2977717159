//! Projection mappings.
//!
//! A [`ProjectionMapping`] ties a range of the disk (primary) buffer to a range of equal length
//! in a language (secondary) buffer. Language services hand complete mapping sets to the engine
//! after every reparse; the engine never mutates a mapping in place.

use crate::error::{MappingViolation, ProjectionError};
use std::any::Any;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Whether an insertion exactly at the end of a mapping belongs to the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingInclusion {
    /// The end offset is outside the mapping; text typed there stays in the disk buffer.
    #[default]
    Exclusive,
    /// The end offset is inside the mapping; text typed there grows the mapping.
    Inclusive,
}

/// Owner-defined payload carried by a mapping.
///
/// The engine never looks inside. Two values are equal only if they share the same allocation.
#[derive(Clone)]
pub struct ExtraData(Arc<dyn Any + Send + Sync>);

impl ExtraData {
    /// Wrap a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the payload as `T`, if that is its type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for ExtraData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExtraData(..)")
    }
}

impl PartialEq for ExtraData {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ExtraData {}

/// One contiguous correspondence between the disk buffer and a language buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionMapping {
    /// Start offset in the disk buffer.
    pub primary_start: usize,
    /// Start offset in the language buffer.
    pub secondary_start: usize,
    /// Shared length of both ranges (may be zero).
    pub length: usize,
    /// Whether insertions at the end of the range grow the mapping.
    pub trailing_inclusion: TrailingInclusion,
    /// Opaque owner-defined payload.
    pub extra_data: Option<ExtraData>,
}

impl ProjectionMapping {
    /// Create an exclusive mapping without extra data.
    pub fn new(primary_start: usize, secondary_start: usize, length: usize) -> Self {
        Self {
            primary_start,
            secondary_start,
            length,
            trailing_inclusion: TrailingInclusion::Exclusive,
            extra_data: None,
        }
    }

    /// Set the trailing inclusion.
    pub fn with_trailing_inclusion(mut self, trailing_inclusion: TrailingInclusion) -> Self {
        self.trailing_inclusion = trailing_inclusion;
        self
    }

    /// Attach extra data.
    pub fn with_extra_data(mut self, extra_data: ExtraData) -> Self {
        self.extra_data = Some(extra_data);
        self
    }

    /// Exclusive end offset in the disk buffer.
    pub fn primary_end(&self) -> usize {
        self.primary_start.saturating_add(self.length)
    }

    /// Exclusive end offset in the language buffer.
    pub fn secondary_end(&self) -> usize {
        self.secondary_start.saturating_add(self.length)
    }

    /// Range in the disk buffer.
    pub fn primary_range(&self) -> Range<usize> {
        self.primary_start..self.primary_end()
    }

    /// Range in the language buffer.
    pub fn secondary_range(&self) -> Range<usize> {
        self.secondary_start..self.secondary_end()
    }

    /// Check if the disk `position` lies inside this mapping.
    ///
    /// The end offset only counts for [`TrailingInclusion::Inclusive`] mappings.
    pub fn contains_primary(&self, position: usize) -> bool {
        let end = self.primary_end();
        match self.trailing_inclusion {
            TrailingInclusion::Exclusive => self.primary_start <= position && position < end,
            TrailingInclusion::Inclusive => self.primary_start <= position && position <= end,
        }
    }
}

/// Check a mapping set against the disk buffer length.
///
/// Secondary ranges must be ordered and non-overlapping. Mappings may run past the end of the
/// secondary text: live content is always taken from the disk buffer.
pub(crate) fn validate_mappings(
    mappings: &[ProjectionMapping],
    disk_len: usize,
) -> Result<(), ProjectionError> {
    let mut previous_end = 0;
    for (index, mapping) in mappings.iter().enumerate() {
        if mapping.primary_end() > disk_len {
            return Err(ProjectionError::InvalidMapping {
                index,
                violation: MappingViolation::PrimaryOutOfBounds {
                    end: mapping.primary_end(),
                    len: disk_len,
                },
            });
        }
        if mapping.secondary_start < previous_end {
            return Err(ProjectionError::InvalidMapping {
                index,
                violation: MappingViolation::SecondaryOutOfOrder {
                    start: mapping.secondary_start,
                    previous_end,
                },
            });
        }
        previous_end = mapping.secondary_end();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_contains() {
        let mapping = ProjectionMapping::new(7, 0, 13);
        assert!(!mapping.contains_primary(6));
        assert!(mapping.contains_primary(7));
        assert!(mapping.contains_primary(19));
        assert!(!mapping.contains_primary(20));
        assert_eq!(mapping.secondary_range(), 0..13);
    }

    #[test]
    fn test_inclusive_contains_end() {
        let mapping =
            ProjectionMapping::new(7, 0, 13).with_trailing_inclusion(TrailingInclusion::Inclusive);
        assert!(mapping.contains_primary(20));
        assert!(!mapping.contains_primary(21));
    }

    #[test]
    fn test_empty_mapping() {
        let exclusive = ProjectionMapping::new(4, 2, 0);
        assert!(!exclusive.contains_primary(4));
        let inclusive = exclusive.with_trailing_inclusion(TrailingInclusion::Inclusive);
        assert!(inclusive.contains_primary(4));
    }

    #[test]
    fn test_extra_data_identity() {
        let data = ExtraData::new("chunk-1".to_string());
        let a = ProjectionMapping::new(0, 0, 1).with_extra_data(data.clone());
        let b = ProjectionMapping::new(0, 0, 1).with_extra_data(data);
        let c =
            ProjectionMapping::new(0, 0, 1).with_extra_data(ExtraData::new("chunk-1".to_string()));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(
            a.extra_data
                .as_ref()
                .and_then(|d| d.downcast_ref::<String>()),
            Some(&"chunk-1".to_string())
        );
    }

    #[test]
    fn test_validate_mappings() {
        let ok = [
            ProjectionMapping::new(5, 0, 3),
            ProjectionMapping::new(1, 3, 2),
        ];
        assert!(validate_mappings(&ok, 10).is_ok());

        let out_of_bounds = [ProjectionMapping::new(8, 0, 3)];
        assert_eq!(
            validate_mappings(&out_of_bounds, 10),
            Err(ProjectionError::InvalidMapping {
                index: 0,
                violation: MappingViolation::PrimaryOutOfBounds { end: 11, len: 10 },
            })
        );

        let overlapping = [
            ProjectionMapping::new(0, 0, 3),
            ProjectionMapping::new(5, 2, 1),
        ];
        assert_eq!(
            validate_mappings(&overlapping, 10),
            Err(ProjectionError::InvalidMapping {
                index: 1,
                violation: MappingViolation::SecondaryOutOfOrder {
                    start: 2,
                    previous_end: 3
                },
            })
        );
    }
}
