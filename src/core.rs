pub mod history;
pub mod session;
pub mod storage;
pub mod translator;
