//! The tree engine: graph construction, prioritization, visible-row
//! derivation, and refresh deltas. Pure and synchronous; everything here is
//! constructible with zero ambient state and drives the TUI from the main
//! loop only.

pub mod forest;
pub mod reconcile;
pub mod sort;
pub mod view;

pub use forest::{BuildStats, Forest, Node, NodeId};
pub use reconcile::RefreshDelta;
pub use sort::{sort_detail_list, sort_forest, status_rank};
pub use view::{matches, visible_rows, MatchFlags, TreeState, VisibleRow};
