pub mod replay;
pub mod sync;
