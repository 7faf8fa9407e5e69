pub mod categories;
pub mod common;
pub mod diff;
pub mod reset;
pub mod status;
pub mod sync;

pub use categories::Categories;
pub use diff::Diff;
pub use reset::Reset;
pub use status::Status;
pub use sync::Sync;
