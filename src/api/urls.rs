use crate::survey::SurveyId;

/// 问卷集合路径
pub const PATH_SURVEYS: &str = "/surveys/";

pub fn url_surveys(base_url: &str) -> String {
    format!("{}{}", base_url, PATH_SURVEYS)
}

pub fn url_surveys_id(base_url: &str, id: &SurveyId) -> String {
    format!("{}{}{}", base_url, PATH_SURVEYS, id)
}
