//! Row status codes shared by every table with a `status` column.

pub const INACTIVE: i64 = 0;
pub const ACTIVE: i64 = 1;
pub const DISABLED: i64 = 2;
pub const DELETED: i64 = 3;

/// Column the `get_all_*` status reads filter on.
pub const STATUS_COLUMN: &str = "status";
