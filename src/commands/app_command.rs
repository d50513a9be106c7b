use crate::controller::Mutation;
use crate::survey::{SurveyId, SurveyPayload};
use std::str::FromStr;

/// 命令：前半部分由后台 actor 执行网络请求，后半部分只改界面状态
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Load,
    Create {
        payload: SurveyPayload,
    },
    Update {
        id: SurveyId,
        payload: SurveyPayload,
    },
    Delete {
        id: SurveyId,
    },
    Help,
    Quit,
    // 以下为界面本地命令
    New,
    Edit {
        id: SurveyId,
    },
    /// 弹出删除确认
    AskDelete {
        id: SurveyId,
    },
    Cancel,
    Unknown(String),
}

impl AppCommand {
    /// 是否需要交给后台 actor
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AppCommand::Load
                | AppCommand::Create { .. }
                | AppCommand::Update { .. }
                | AppCommand::Delete { .. }
                | AppCommand::Help
                | AppCommand::Quit
                | AppCommand::Unknown(_)
        )
    }
}

impl From<Mutation> for AppCommand {
    fn from(m: Mutation) -> Self {
        match m {
            Mutation::Create(payload) => AppCommand::Create { payload },
            Mutation::Update { id, payload } => AppCommand::Update { id, payload },
            Mutation::Delete(id) => AppCommand::Delete { id },
        }
    }
}

pub const HELP_TEXT: &str =
    "可用命令: reload | new | edit <id> | delete <id> | cancel | help | quit";

impl FromStr for AppCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(AppCommand::Unknown("".to_string()));
        }

        match parts[0] {
            "reload" | "load" | "refresh" | "r" => Ok(AppCommand::Load),
            "new" | "n" => Ok(AppCommand::New),
            "edit" | "e" => match parts.get(1).map(|s| s.parse::<SurveyId>()) {
                Some(Ok(id)) => Ok(AppCommand::Edit { id }),
                _ => Ok(AppCommand::Unknown("用法: edit <id>".to_string())),
            },
            "delete" | "del" | "rm" => match parts.get(1).map(|s| s.parse::<SurveyId>()) {
                Some(Ok(id)) => Ok(AppCommand::AskDelete { id }),
                _ => Ok(AppCommand::Unknown("用法: delete <id>".to_string())),
            },
            "cancel" => Ok(AppCommand::Cancel),
            "help" | "h" => Ok(AppCommand::Help),
            "quit" | "q" | "exit" => Ok(AppCommand::Quit),
            _ => Ok(AppCommand::Unknown(format!("未知命令: {}", parts[0]))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> AppCommand {
        AppCommand::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("reload"), AppCommand::Load);
        assert_eq!(parse("  new "), AppCommand::New);
        assert_eq!(
            parse("edit 12"),
            AppCommand::Edit {
                id: SurveyId::Number(12)
            }
        );
        assert_eq!(
            parse("delete abc"),
            AppCommand::AskDelete {
                id: SurveyId::Text("abc".to_string())
            }
        );
        assert_eq!(parse("q"), AppCommand::Quit);
        assert_eq!(parse("help"), AppCommand::Help);
    }

    #[test]
    fn test_parse_usage_errors() {
        assert_eq!(parse("edit"), AppCommand::Unknown("用法: edit <id>".to_string()));
        assert_eq!(
            parse("frobnicate"),
            AppCommand::Unknown("未知命令: frobnicate".to_string())
        );
        assert!(!parse("delete 3").is_remote());
        assert!(parse("reload").is_remote());
    }
}
