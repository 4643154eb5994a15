mod accessor;
mod cursor;
mod result_set;
mod row;

pub use accessor::{ColumnAccess, ColumnIndex, FromColumn};
pub use cursor::ResultCursor;
pub use result_set::ResultSet;
pub use row::{CursorRow, DbRow};
