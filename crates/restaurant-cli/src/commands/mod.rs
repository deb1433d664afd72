pub mod common;
pub mod completions;
pub mod favorite;
pub mod list;
pub mod review;
pub mod show;
pub mod sync;
