//! CodeSense client: submit code to a review service, keep the last result,
//! and present its scores, findings, and corrections.

pub mod api;
pub mod config;
pub mod health;
pub mod input;
pub mod review;
pub mod score;
pub mod store;
pub mod submit;
pub mod view;
