/*!
 * Re-timing of subtitle sequences.
 *
 * - `time_sync`: piecewise-linear warp of a sequence given anchor points
 * - `expr`: the `--sync` expression language that produces anchor points
 */

pub use self::expr::parse_sync_expr;
pub use self::time_sync::{SyncPoint, SyncReport, TimeSync};

pub mod expr;
pub mod time_sync;
