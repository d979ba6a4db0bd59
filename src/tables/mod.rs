pub mod registry;
pub mod table;

pub use registry::TableRegistry;
pub use table::{Table, TableError};
