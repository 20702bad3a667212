pub mod post;
pub mod storage;
