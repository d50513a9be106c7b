pub mod client;
pub mod error;
pub mod urls;

pub use client::{SurveyApi, SurveyClient};
pub use error::ApiError;
