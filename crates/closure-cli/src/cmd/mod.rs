pub mod config;
pub mod jql;
pub mod labels;
pub mod serve;
