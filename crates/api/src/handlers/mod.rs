pub mod governance;
pub mod worker;
