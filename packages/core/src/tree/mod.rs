//! Discussion Tree Engine
//!
//! - [`TreeMaterializer`] - walks a tree from its root thesis and annotates every brick
//! - [`BrickTree`] - the per-pass arena of [`MaterializedBrick`]s, keyed by id
//! - [`BrickTree::subtree`] - render-ready depth-first views, built from the arena only
//! - [`DepthBound`] - absolute or relative depth limits
//!
//! A tree is rebuilt for every request and never shared between requests.

mod depth;
mod materializer;
mod subtree;
mod title_tag;

pub use depth::DepthBound;
pub use materializer::{
    BrickTree, ChildEntry, ChildTypeHistogram, MaterializedBrick, TreeMaterializer,
    DEFAULT_MAX_ANCESTOR_HOPS,
};
pub use subtree::{BrickView, IncludedIds};
pub use title_tag::{child_path, render_title_tag, root_segment, TagSegment, THESIS_TAG_PREFIX};
