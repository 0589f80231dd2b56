//! Title tags
//!
//! A title tag encodes the position of a brick in its tree, e.g.
//! `Thesis#7✓2⚡1?3`: thesis 7, its second pro, that pro's first contra,
//! and that contra's third question. It is built from the tag path, one
//! segment per ancestor plus the brick itself.

use crate::models::{BrickId, BrickType};
use serde::Serialize;

/// Symbol of the root segment; its ordinal is the thesis id
pub const THESIS_TAG_PREFIX: &str = "Thesis#";

/// One step of a tag path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSegment {
    pub symbol: &'static str,
    /// Brick id for the root, typed index for every other brick
    pub ordinal: i64,
    pub brick_id: BrickId,
}

pub fn root_segment(thesis_id: BrickId) -> TagSegment {
    TagSegment {
        symbol: THESIS_TAG_PREFIX,
        ordinal: thesis_id,
        brick_id: thesis_id,
    }
}

/// Tag path of a child: the parent's path plus the child's own segment
pub fn child_path(
    parent_path: &[TagSegment],
    brick_type: BrickType,
    typed_idx: u32,
    brick_id: BrickId,
) -> Vec<TagSegment> {
    let mut path = Vec::with_capacity(parent_path.len() + 1);
    path.extend_from_slice(parent_path);
    path.push(TagSegment {
        symbol: brick_type.symbol(),
        ordinal: i64::from(typed_idx),
        brick_id,
    });
    path
}

pub fn render_title_tag(path: &[TagSegment]) -> String {
    path.iter()
        .map(|segment| format!("{}{}", segment.symbol, segment.ordinal))
        .collect()
}
