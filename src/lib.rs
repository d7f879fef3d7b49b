pub mod catalog;
pub mod config;
pub mod egress;
pub mod identity;
pub mod output;
pub mod prompt;
pub mod questionnaire;
pub mod results;
pub mod scoring;
pub mod store;
