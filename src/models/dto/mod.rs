pub mod page;
pub mod row;

pub use page::{Page, SortDirection, SortKey, TableQuery};
pub use row::{AssetRow, RequestRow};
