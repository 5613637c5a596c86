pub mod root;
pub mod store;
pub mod sync;
