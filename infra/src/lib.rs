pub mod documents;
pub mod storage;
