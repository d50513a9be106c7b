pub mod draft;
pub mod model;
pub mod validation;

pub use draft::{DraftEdit, SurveyDraft, SurveyField};
pub use model::{
    format_liked_most, InterestSource, LikedMost, RecommendationLikelihood, SurveyId,
    SurveyPayload, SurveyRecord,
};
pub use validation::{validate, FieldErrors};
