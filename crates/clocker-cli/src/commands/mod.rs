pub mod add;
pub mod archive;
pub mod csv;
pub mod data;
pub mod edit;
pub mod get;
pub mod insert;
pub mod list;
pub mod report;
pub mod restart;
pub mod rm;
pub mod set;
pub mod start;
pub mod status;
pub mod stop;
pub mod util;
