//! Icons used throughout the UI.

// Status - fractional circles
pub const STATUS_OPEN: &str = "○"; // Empty circle
pub const STATUS_IN_PROGRESS: &str = "◑"; // 1/2 filled
pub const STATUS_BLOCKED: &str = "⊘"; // Slashed circle
pub const STATUS_DEFERRED: &str = "◔"; // 1/4 filled
pub const STATUS_CLOSED: &str = "●"; // Full circle
pub const STATUS_UNKNOWN: &str = "◌"; // Dotted circle

// Tree shape
pub const EXPANDED: &str = "▼";
pub const COLLAPSED: &str = "▶";
pub const LEAF: &str = "·";

// Row annotations
pub const FLAG_BLOCKED: &str = "⊘"; // Blocked by an unresolved issue
pub const FLAG_ACTIVE: &str = "◆"; // In-progress work somewhere below
pub const FLAG_READY: &str = "▹"; // Unblocked open work somewhere below

// Detail modal sections
pub const ICON_LABELS: &str = "#";
pub const ICON_BLOCKERS: &str = "←";
pub const ICON_DEPENDENTS: &str = "→";
