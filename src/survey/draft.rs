use super::model::{
    InterestSource, LikedMost, RecommendationLikelihood, SurveyPayload, SurveyRecord,
};

/// 表单字段（名称与后端 JSON 字段一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurveyField {
    FirstName,
    LastName,
    StreetAddress,
    City,
    State,
    ZipCode,
    Phone,
    Email,
    DateOfSurvey,
    LikedMost,
    AdditionalComments,
}

impl SurveyField {
    /// 必填字段
    pub const REQUIRED: [SurveyField; 9] = [
        SurveyField::FirstName,
        SurveyField::LastName,
        SurveyField::StreetAddress,
        SurveyField::City,
        SurveyField::State,
        SurveyField::ZipCode,
        SurveyField::Phone,
        SurveyField::Email,
        SurveyField::DateOfSurvey,
    ];

    /// 可直接输入文本的字段（表单顺序）
    pub const TEXT: [SurveyField; 10] = [
        SurveyField::FirstName,
        SurveyField::LastName,
        SurveyField::StreetAddress,
        SurveyField::City,
        SurveyField::State,
        SurveyField::ZipCode,
        SurveyField::Phone,
        SurveyField::Email,
        SurveyField::DateOfSurvey,
        SurveyField::AdditionalComments,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SurveyField::FirstName => "first_name",
            SurveyField::LastName => "last_name",
            SurveyField::StreetAddress => "street_address",
            SurveyField::City => "city",
            SurveyField::State => "state",
            SurveyField::ZipCode => "zip_code",
            SurveyField::Phone => "phone",
            SurveyField::Email => "email",
            SurveyField::DateOfSurvey => "date_of_survey",
            SurveyField::LikedMost => "liked_most",
            SurveyField::AdditionalComments => "additional_comments",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SurveyField::FirstName => "First Name",
            SurveyField::LastName => "Last Name",
            SurveyField::StreetAddress => "Street Address",
            SurveyField::City => "City",
            SurveyField::State => "State",
            SurveyField::ZipCode => "Zip",
            SurveyField::Phone => "Telephone",
            SurveyField::Email => "Email",
            SurveyField::DateOfSurvey => "Date of Survey",
            SurveyField::LikedMost => "Liked Most",
            SurveyField::AdditionalComments => "Additional Comments",
        }
    }

    pub fn is_required(&self) -> bool {
        SurveyField::REQUIRED.contains(self)
    }
}

impl std::fmt::Display for SurveyField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 单次字段编辑事件
#[derive(Debug, Clone, PartialEq)]
pub enum DraftEdit {
    Text { field: SurveyField, value: String },
    LikedMost { option: LikedMost, checked: bool },
    InterestSource(InterestSource),
    Recommendation(RecommendationLikelihood),
}

/// 正在编辑、尚未校验的问卷草稿
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyDraft {
    pub first_name: String,
    pub last_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub email: String,
    pub date_of_survey: String,
    pub liked_most: Vec<LikedMost>,
    pub interest_source: InterestSource,
    pub recommendation_likelihood: RecommendationLikelihood,
    pub additional_comments: String,
}

impl Default for SurveyDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            street_address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            phone: String::new(),
            email: String::new(),
            date_of_survey: String::new(),
            liked_most: Vec::new(),
            interest_source: InterestSource::default(),
            recommendation_likelihood: RecommendationLikelihood::default(),
            additional_comments: String::new(),
        }
    }
}

impl SurveyDraft {
    /// 从已有记录生成草稿（编辑模式）
    ///
    /// 日期若带时间部分，只保留前 10 个字符（YYYY-MM-DD）。
    pub fn from_record(record: &SurveyRecord) -> Self {
        let mut liked_most: Vec<LikedMost> = Vec::with_capacity(record.liked_most.len());
        for option in &record.liked_most {
            if !liked_most.contains(option) {
                liked_most.push(option.clone());
            }
        }

        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            street_address: record.street_address.clone(),
            city: record.city.clone(),
            state: record.state.clone(),
            zip_code: record.zip_code.clone(),
            phone: record.phone.clone(),
            email: record.email.clone(),
            date_of_survey: record.date_of_survey.chars().take(10).collect(),
            liked_most,
            interest_source: record.interest_source.clone(),
            recommendation_likelihood: record.recommendation_likelihood.clone(),
            additional_comments: record.additional_comments.clone().unwrap_or_default(),
        }
    }

    pub fn text(&self, field: SurveyField) -> Option<&str> {
        let value = match field {
            SurveyField::FirstName => &self.first_name,
            SurveyField::LastName => &self.last_name,
            SurveyField::StreetAddress => &self.street_address,
            SurveyField::City => &self.city,
            SurveyField::State => &self.state,
            SurveyField::ZipCode => &self.zip_code,
            SurveyField::Phone => &self.phone,
            SurveyField::Email => &self.email,
            SurveyField::DateOfSurvey => &self.date_of_survey,
            SurveyField::AdditionalComments => &self.additional_comments,
            SurveyField::LikedMost => return None,
        };
        Some(value.as_str())
    }

    fn text_mut(&mut self, field: SurveyField) -> Option<&mut String> {
        let value = match field {
            SurveyField::FirstName => &mut self.first_name,
            SurveyField::LastName => &mut self.last_name,
            SurveyField::StreetAddress => &mut self.street_address,
            SurveyField::City => &mut self.city,
            SurveyField::State => &mut self.state,
            SurveyField::ZipCode => &mut self.zip_code,
            SurveyField::Phone => &mut self.phone,
            SurveyField::Email => &mut self.email,
            SurveyField::DateOfSurvey => &mut self.date_of_survey,
            SurveyField::AdditionalComments => &mut self.additional_comments,
            SurveyField::LikedMost => return None,
        };
        Some(value)
    }

    /// 应用一次编辑；对非文本字段做文本编辑时返回 false
    pub fn apply(&mut self, edit: DraftEdit) -> bool {
        match edit {
            DraftEdit::Text { field, value } => match self.text_mut(field) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            DraftEdit::LikedMost { option, checked } => {
                self.set_liked_most(option, checked);
                true
            }
            DraftEdit::InterestSource(source) => {
                self.interest_source = source;
                true
            }
            DraftEdit::Recommendation(value) => {
                self.recommendation_likelihood = value;
                true
            }
        }
    }

    /// 勾选/取消勾选；保持插入顺序且不重复
    pub fn set_liked_most(&mut self, option: LikedMost, checked: bool) {
        if checked {
            if !self.liked_most.contains(&option) {
                self.liked_most.push(option);
            }
        } else {
            self.liked_most.retain(|o| o != &option);
        }
    }

    pub fn has_liked_most(&self, option: &LikedMost) -> bool {
        self.liked_most.contains(option)
    }

    /// 规整为提交载荷：去首尾空白、州名大写、空备注置为 null
    pub fn to_payload(&self) -> SurveyPayload {
        let comments = self.additional_comments.trim();
        SurveyPayload {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            street_address: self.street_address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_uppercase(),
            zip_code: self.zip_code.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            date_of_survey: self.date_of_survey.trim().to_string(),
            liked_most: self.liked_most.clone(),
            interest_source: self.interest_source.clone(),
            recommendation_likelihood: self.recommendation_likelihood.clone(),
            additional_comments: if comments.is_empty() {
                None
            } else {
                Some(comments.to_string())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::model::SurveyId;
    use serde_json::json;

    fn record() -> SurveyRecord {
        SurveyRecord {
            id: SurveyId::Number(3),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            street_address: "1 Main St".to_string(),
            city: "Fairfax".to_string(),
            state: "va".to_string(),
            zip_code: "22030".to_string(),
            phone: "(703) 555-0100".to_string(),
            email: "jane@gmu.edu".to_string(),
            date_of_survey: "2024-09-01T00:00:00".to_string(),
            liked_most: vec![LikedMost::Sports, LikedMost::Sports, LikedMost::Campus],
            interest_source: InterestSource::Television,
            recommendation_likelihood: RecommendationLikelihood::Unlikely,
            additional_comments: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_default_draft_is_blank_with_option_defaults() {
        let draft = SurveyDraft::default();
        assert_eq!(draft.first_name, "");
        assert!(draft.liked_most.is_empty());
        assert_eq!(draft.interest_source, InterestSource::Friends);
        assert_eq!(
            draft.recommendation_likelihood,
            RecommendationLikelihood::VeryLikely
        );
    }

    #[test]
    fn test_from_record_keeps_date_portion_only() {
        let draft = SurveyDraft::from_record(&record());
        assert_eq!(draft.date_of_survey, "2024-09-01");
        assert_eq!(draft.liked_most, vec![LikedMost::Sports, LikedMost::Campus]);
        assert_eq!(draft.additional_comments, "");
    }

    #[test]
    fn test_apply_text_edit() {
        let mut draft = SurveyDraft::default();
        assert!(draft.apply(DraftEdit::Text {
            field: SurveyField::City,
            value: "Arlington".to_string(),
        }));
        assert_eq!(draft.text(SurveyField::City), Some("Arlington"));
        assert!(!draft.apply(DraftEdit::Text {
            field: SurveyField::LikedMost,
            value: "campus".to_string(),
        }));
    }

    #[test]
    fn test_liked_most_toggle_has_no_duplicates() {
        let mut draft = SurveyDraft::default();
        draft.set_liked_most(LikedMost::Campus, true);
        draft.set_liked_most(LikedMost::Sports, true);
        draft.set_liked_most(LikedMost::Campus, true);
        assert_eq!(draft.liked_most, vec![LikedMost::Campus, LikedMost::Sports]);

        draft.apply(DraftEdit::LikedMost {
            option: LikedMost::Campus,
            checked: false,
        });
        assert_eq!(draft.liked_most, vec![LikedMost::Sports]);
        assert!(!draft.has_liked_most(&LikedMost::Campus));
    }

    #[test]
    fn test_payload_normalization() {
        let mut draft = SurveyDraft::from_record(&record());
        draft.first_name = "  Jane ".to_string();
        draft.additional_comments = "   ".to_string();

        let payload = draft.to_payload();
        assert_eq!(payload.first_name, "Jane");
        assert_eq!(payload.state, "VA");
        assert_eq!(payload.additional_comments, None);

        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["additional_comments"], json!(null));
        assert_eq!(body["liked_most"], json!(["sports", "campus"]));
        assert_eq!(body["interest_source"], json!("television"));
        assert!(body.get("id").is_none());
    }

    #[test]
    fn test_payload_keeps_trimmed_comment() {
        let mut draft = SurveyDraft::default();
        draft.additional_comments = "  great tour  ".to_string();
        assert_eq!(
            draft.to_payload().additional_comments.as_deref(),
            Some("great tour")
        );
    }
}
