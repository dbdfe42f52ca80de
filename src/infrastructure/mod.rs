pub mod backends;
pub mod dictation;
pub mod speech;
pub mod storage;
