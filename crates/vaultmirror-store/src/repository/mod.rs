//! `INodeStore` implementations
//!
//! Both backends share one protocol:
//!
//! | Operation       | Statement                                                        |
//! |-----------------|------------------------------------------------------------------|
//! | `ensure_schema` | `CREATE TABLE`/`INDEX IF NOT EXISTS`, then insert the root if missing |
//! | `insert`        | `INSERT .. ON CONFLICT (parent_id, data) DO NOTHING RETURNING id` |
//! | `update`        | `UPDATE .. SET data, parent_id .. RETURNING id`                   |
//! | `delete`        | `DELETE`, subtree removed by `ON DELETE CASCADE`                  |
//!
//! An insert that loses the unique-key race returns no row; the winner's id
//! is then read back with `find`. The partial index `node_single_root` keeps
//! the root unique even when several processes run `ensure_schema` at once.

mod postgres;
mod sqlite;

pub use postgres::PgNodeStore;
pub use sqlite::SqliteNodeStore;

/// `data` of the root row
pub(crate) const ROOT_DATA: &str = "root";

/// Attempts made by `insert` when the conflicting row vanishes before it can be read
pub(crate) const INSERT_ATTEMPTS: usize = 3;
