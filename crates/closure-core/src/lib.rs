pub mod bug;
pub mod classify;
pub mod compose;
pub mod config;
pub mod error;
pub mod jira;
pub mod jql;
pub mod labels;
pub mod mailer;
pub mod tested_area;
pub mod types;

pub use error::{ClosureError, Result};
