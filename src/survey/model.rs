use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 问卷选项枚举
///
/// 已知取值映射到具体变体，后端或用户给出的未知字符串保存在 `Unrecognized` 中原样转发。
macro_rules! survey_option {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($value:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Unrecognized(String),
        }

        impl $name {
            /// 表单中可选的全部取值（按展示顺序）
            pub fn options() -> Vec<$name> {
                vec![$($name::$variant),+]
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $value,)+
                    $name::Unrecognized(raw) => raw.as_str(),
                }
            }

            pub fn label(&self) -> &str {
                match self {
                    $($name::$variant => $label,)+
                    $name::Unrecognized(raw) => raw.as_str(),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Unrecognized(_))
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($value => $name::$variant,)+
                    _ => $name::Unrecognized(raw),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                $name::from(raw.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                match value {
                    $name::Unrecognized(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

survey_option! {
    /// 最喜欢的校园方面（多选）
    LikedMost {
        Students => ("students", "Students"),
        Location => ("location", "Location"),
        Campus => ("campus", "Campus"),
        Atmosphere => ("atmosphere", "Atmosphere"),
        DormRooms => ("dorm_rooms", "Dorm Rooms"),
        Sports => ("sports", "Sports"),
    }
}

survey_option! {
    /// 了解到学校的渠道
    InterestSource {
        Friends => ("friends", "Friends"),
        Television => ("television", "Television"),
        Internet => ("internet", "Internet"),
        Other => ("other", "Other"),
    }
}

survey_option! {
    /// 推荐意愿
    RecommendationLikelihood {
        VeryLikely => ("very_likely", "Very Likely"),
        Likely => ("likely", "Likely"),
        Unlikely => ("unlikely", "Unlikely"),
    }
}

impl Default for InterestSource {
    fn default() -> Self {
        InterestSource::Friends
    }
}

impl Default for RecommendationLikelihood {
    fn default() -> Self {
        RecommendationLikelihood::VeryLikely
    }
}

/// 后端分配的记录 ID（数字或字符串均可）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SurveyId {
    Number(i64),
    Text(String),
}

impl FromStr for SurveyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.is_empty() {
            return Err("empty survey id".to_string());
        }
        match t.parse::<i64>() {
            Ok(n) => Ok(SurveyId::Number(n)),
            Err(_) => Ok(SurveyId::Text(t.to_string())),
        }
    }
}

impl std::fmt::Display for SurveyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyId::Number(n) => write!(f, "{}", n),
            SurveyId::Text(s) => f.write_str(s),
        }
    }
}

/// 已持久化的问卷记录（后端返回的结构）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub id: SurveyId,
    pub first_name: String,
    pub last_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub email: String,
    pub date_of_survey: String,
    #[serde(default)]
    pub liked_most: Vec<LikedMost>,
    #[serde(default)]
    pub interest_source: InterestSource,
    #[serde(default)]
    pub recommendation_likelihood: RecommendationLikelihood,
    #[serde(default)]
    pub additional_comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl SurveyRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// 列表展示用：标签以逗号拼接，空则显示 "—"
    pub fn liked_most_labels(&self) -> String {
        format_liked_most(&self.liked_most)
    }
}

pub fn format_liked_most(values: &[LikedMost]) -> String {
    if values.is_empty() {
        return "—".to_string();
    }
    values
        .iter()
        .map(|v| v.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 提交给后端的请求体（create / update 共用，不含 id）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyPayload {
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
    pub additional_comments: Option<String>,
}
