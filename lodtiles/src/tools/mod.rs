pub mod explain;
pub mod serve;
