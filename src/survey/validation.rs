use super::draft::{SurveyDraft, SurveyField};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    /// local@domain.tld，各段不含空白和 @
    pub static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// 5 位或 ZIP+4
    pub static ref ZIP_REGEX: Regex = Regex::new(r"^\d{5}(-\d{4})?$").unwrap();

    /// 7-20 个数字、括号、加号、连字符或空白
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^[0-9()+\-\s]{7,20}$").unwrap();
}

pub const MSG_REQUIRED: &str = "Required";
pub const MSG_EMAIL: &str = "Enter a valid email address";
pub const MSG_ZIP: &str = "Use 5 digits or ZIP+4 format";
pub const MSG_PHONE: &str = "Enter a valid phone number";
pub const MSG_DATE: &str = "Use YYYY-MM-DD format";

/// 字段 -> 错误信息；为空表示校验通过
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<SurveyField, &'static str>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: SurveyField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn contains(&self, field: SurveyField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn fields(&self) -> Vec<SurveyField> {
        self.0.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SurveyField, &'static str)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    fn insert(&mut self, field: SurveyField, message: &'static str) {
        self.0.insert(field, message);
    }

    /// 一行摘要，用于日志区显示
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(field, msg)| format!("{}: {}", field.label(), msg))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// 校验草稿（纯函数）
///
/// 选项类字段不做枚举合法性检查，未知值原样提交。
pub fn validate(draft: &SurveyDraft) -> FieldErrors {
    let mut errors = FieldErrors::default();

    for field in SurveyField::REQUIRED {
        let blank = draft
            .text(field)
            .map(|v| v.trim().is_empty())
            .unwrap_or(true);
        if blank {
            errors.insert(field, MSG_REQUIRED);
        }
    }

    let email = draft.email.trim();
    if !email.is_empty() && !EMAIL_REGEX.is_match(email) {
        errors.insert(SurveyField::Email, MSG_EMAIL);
    }

    let zip = draft.zip_code.trim();
    if !zip.is_empty() && !ZIP_REGEX.is_match(zip) {
        errors.insert(SurveyField::ZipCode, MSG_ZIP);
    }

    let phone = draft.phone.trim();
    if !phone.is_empty() && !PHONE_REGEX.is_match(phone) {
        errors.insert(SurveyField::Phone, MSG_PHONE);
    }

    let date = draft.date_of_survey.trim();
    if !date.is_empty() && !is_iso_date(date) {
        errors.insert(SurveyField::DateOfSurvey, MSG_DATE);
    }

    errors
}

fn is_iso_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> SurveyDraft {
        SurveyDraft {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            street_address: "4400 University Dr".to_string(),
            city: "Fairfax".to_string(),
            state: "va".to_string(),
            zip_code: "22030".to_string(),
            phone: "(703) 993-1000".to_string(),
            email: "john@gmu.edu".to_string(),
            date_of_survey: "2024-10-01".to_string(),
            ..SurveyDraft::default()
        }
    }

    fn with_text(field: SurveyField, value: &str) -> SurveyDraft {
        let mut draft = valid_draft();
        draft.apply(crate::survey::draft::DraftEdit::Text {
            field,
            value: value.to_string(),
        });
        draft
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(validate(&valid_draft()).is_empty());
    }

    #[test]
    fn test_each_missing_required_field_is_reported_alone() {
        for field in SurveyField::REQUIRED {
            let errors = validate(&with_text(field, "   "));
            assert_eq!(errors.fields(), vec![field], "field {}", field);
            assert_eq!(errors.get(field), Some(MSG_REQUIRED));
        }
    }

    #[test]
    fn test_blank_first_name_only() {
        let errors = validate(&with_text(SurveyField::FirstName, ""));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(SurveyField::FirstName), Some("Required"));
    }

    #[test]
    fn test_email_rule() {
        let errors = validate(&with_text(SurveyField::Email, "not-an-email"));
        assert_eq!(errors.get(SurveyField::Email), Some(MSG_EMAIL));

        let errors = validate(&with_text(SurveyField::Email, "a@b.co"));
        assert!(!errors.contains(SurveyField::Email));
    }

    #[test]
    fn test_zip_rule() {
        assert!(validate(&with_text(SurveyField::ZipCode, "22030")).is_empty());
        assert!(validate(&with_text(SurveyField::ZipCode, "22030-1234")).is_empty());

        let errors = validate(&with_text(SurveyField::ZipCode, "2203"));
        assert_eq!(errors.get(SurveyField::ZipCode), Some(MSG_ZIP));
    }

    #[test]
    fn test_phone_rule() {
        assert!(validate(&with_text(SurveyField::Phone, "+1 703-555-0100")).is_empty());

        let errors = validate(&with_text(SurveyField::Phone, "555-01"));
        assert_eq!(errors.get(SurveyField::Phone), Some(MSG_PHONE));

        let errors = validate(&with_text(SurveyField::Phone, "call me maybe"));
        assert_eq!(errors.get(SurveyField::Phone), Some(MSG_PHONE));
    }

    #[test]
    fn test_padded_values_checked_as_submitted() {
        // 提交时会 trim，所以格式按 trim 后的值判断
        let draft = with_text(SurveyField::Email, " a@b.co");
        assert!(validate(&draft).is_empty());
        assert_eq!(draft.to_payload().email, "a@b.co");

        let draft = with_text(SurveyField::ZipCode, "22030 ");
        assert!(validate(&draft).is_empty());
        assert_eq!(draft.to_payload().zip_code, "22030");

        let errors = validate(&with_text(SurveyField::Email, "   "));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(SurveyField::Email), Some(MSG_REQUIRED));
    }

    #[test]
    fn test_date_rule() {
        let errors = validate(&with_text(SurveyField::DateOfSurvey, "2024-13-40"));
        assert_eq!(errors.get(SurveyField::DateOfSurvey), Some(MSG_DATE));

        let errors = validate(&with_text(SurveyField::DateOfSurvey, "10/01/2024"));
        assert_eq!(errors.get(SurveyField::DateOfSurvey), Some(MSG_DATE));
    }

    #[test]
    fn test_unknown_options_are_not_rejected() {
        let mut draft = valid_draft();
        draft.interest_source = "radio".into();
        draft.liked_most = vec!["food".into()];
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_summary_lists_labels() {
        let mut draft = valid_draft();
        draft.first_name.clear();
        draft.zip_code = "1".to_string();
        assert_eq!(
            validate(&draft).summary(),
            "First Name: Required; Zip: Use 5 digits or ZIP+4 format"
        );
    }
}
