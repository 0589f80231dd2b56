//! Depth bounds for materialization and extraction
//!
//! A bound is either absolute (counted from the root thesis) or relative
//! (counted from a reference brick: the entry brick when materializing, the
//! base brick when extracting). Both resolve to an absolute maximum level.

/// Maximum depth to visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthBound {
    #[default]
    Unbounded,
    /// Deepest absolute level to include (0 = root thesis only)
    Absolute(u32),
    /// Deepest level to include, counted from the reference brick
    Relative(u32),
}

impl DepthBound {
    /// Combine optional absolute and relative limits; relative wins when both are given
    pub fn from_parts(max_absolute: Option<u32>, max_relative: Option<u32>) -> Self {
        match (max_absolute, max_relative) {
            (_, Some(relative)) => DepthBound::Relative(relative),
            (Some(absolute), None) => DepthBound::Absolute(absolute),
            (None, None) => DepthBound::Unbounded,
        }
    }

    /// Resolve to an absolute level limit; `None` means unbounded
    pub fn max_absolute_level(self, reference_level: u32) -> Option<u32> {
        match self {
            DepthBound::Unbounded => None,
            DepthBound::Absolute(level) => Some(level),
            DepthBound::Relative(level) => Some(reference_level.saturating_add(level)),
        }
    }
}

/// Whether `level` lies within a resolved limit
pub(crate) fn within(level: u32, max_level: Option<u32>) -> bool {
    max_level.map_or(true, |max| level <= max)
}
