use crate::api::SurveyApi;
use crate::app_state::AppEvent;
use crate::commands::app_command::HELP_TEXT;
use crate::commands::AppCommand;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

/// 执行单条命令，返回需要回传给界面的事件
///
/// 界面本地命令（new / edit / cancel 等）不在这里处理，返回 None。
pub async fn execute(api: &dyn SurveyApi, cmd: AppCommand) -> Option<AppEvent> {
    match cmd {
        AppCommand::Load => Some(match api.list().await {
            Ok(list) => AppEvent::Surveys(list),
            Err(e) => AppEvent::LoadFailed(e.to_string()),
        }),
        AppCommand::Create { payload } => Some(match api.create(&payload).await {
            Ok(record) => AppEvent::Created(record),
            Err(e) => AppEvent::MutationFailed(e.to_string()),
        }),
        AppCommand::Update { id, payload } => Some(match api.update(&id, &payload).await {
            Ok(record) => AppEvent::Updated(record),
            Err(e) => AppEvent::MutationFailed(e.to_string()),
        }),
        AppCommand::Delete { id } => Some(match api.delete(&id).await {
            Ok(()) => AppEvent::Deleted(id),
            Err(e) => AppEvent::MutationFailed(e.to_string()),
        }),
        AppCommand::Help => Some(AppEvent::Message(HELP_TEXT.to_string())),
        AppCommand::Quit => Some(AppEvent::Message("收到退出命令".to_string())),
        AppCommand::Unknown(msg) => Some(AppEvent::Error(msg)),
        AppCommand::New
        | AppCommand::Edit { .. }
        | AppCommand::AskDelete { .. }
        | AppCommand::Cancel => None,
    }
}

/// 后台 actor：逐条接收命令，每个请求单独起任务，完成后通过事件通道回传
pub async fn run(
    api: Arc<dyn SurveyApi>,
    mut cmd_rx: mpsc::UnboundedReceiver<AppCommand>,
    evt_tx: mpsc::UnboundedSender<AppEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        if cmd == AppCommand::Quit {
            let _ = evt_tx.send(AppEvent::Message("收到退出命令".to_string()));
            break;
        }
        if !cmd.is_remote() {
            warn!("ignoring local command in actor: {:?}", cmd);
            continue;
        }

        let api = api.clone();
        let tx = evt_tx.clone();
        tokio::spawn(async move {
            if let Some(evt) = execute(api.as_ref(), cmd).await {
                let _ = tx.send(evt);
            }
        });
    }
    info!("command loop stopped");
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::survey::{SurveyId, SurveyPayload, SurveyRecord};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 内存版后端，`fail_with` 设置后所有请求都返回该错误
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub rows: Mutex<Vec<SurveyRecord>>,
        pub next_id: Mutex<i64>,
        pub fail_with: Mutex<Option<ApiError>>,
    }

    impl FakeApi {
        fn check(&self) -> Result<(), ApiError> {
            match self.fail_with.lock().unwrap().clone() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn to_record(id: SurveyId, p: &SurveyPayload) -> SurveyRecord {
            SurveyRecord {
                id,
                first_name: p.first_name.clone(),
                last_name: p.last_name.clone(),
                street_address: p.street_address.clone(),
                city: p.city.clone(),
                state: p.state.clone(),
                zip_code: p.zip_code.clone(),
                phone: p.phone.clone(),
                email: p.email.clone(),
                date_of_survey: p.date_of_survey.clone(),
                liked_most: p.liked_most.clone(),
                interest_source: p.interest_source.clone(),
                recommendation_likelihood: p.recommendation_likelihood.clone(),
                additional_comments: p.additional_comments.clone(),
                created_at: None,
                updated_at: None,
            }
        }
    }

    #[async_trait]
    impl SurveyApi for FakeApi {
        async fn list(&self) -> Result<Vec<SurveyRecord>, ApiError> {
            self.check()?;
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn create(&self, payload: &SurveyPayload) -> Result<SurveyRecord, ApiError> {
            self.check()?;
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let record = Self::to_record(SurveyId::Number(*next), payload);
            self.rows.lock().unwrap().insert(0, record.clone());
            Ok(record)
        }

        async fn update(
            &self,
            id: &SurveyId,
            payload: &SurveyPayload,
        ) -> Result<SurveyRecord, ApiError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let slot = rows
                .iter_mut()
                .find(|r| &r.id == id)
                .ok_or_else(|| ApiError::Status {
                    status: 404,
                    message: "Survey not found".to_string(),
                })?;
            *slot = Self::to_record(id.clone(), payload);
            Ok(slot.clone())
        }

        async fn delete(&self, id: &SurveyId) -> Result<(), ApiError> {
            self.check()?;
            self.rows.lock().unwrap().retain(|r| &r.id != id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_execute_maps_results_to_events() {
        let api = FakeApi::default();
        match execute(&api, AppCommand::Load).await {
            Some(AppEvent::Surveys(list)) => assert!(list.is_empty()),
            other => panic!("unexpected {:?}", other),
        }

        *api.fail_with.lock().unwrap() = Some(ApiError::Timeout(15_000));
        match execute(&api, AppCommand::Load).await {
            Some(AppEvent::LoadFailed(msg)) => {
                assert_eq!(msg, "Request timed out after 15000 ms")
            }
            other => panic!("unexpected {:?}", other),
        }
        match execute(
            &api,
            AppCommand::Delete {
                id: SurveyId::Number(1),
            },
        )
        .await
        {
            Some(AppEvent::MutationFailed(msg)) => assert!(msg.contains("timed out")),
            other => panic!("unexpected {:?}", other),
        }

        assert!(execute(&api, AppCommand::New).await.is_none());
    }

    #[tokio::test]
    async fn test_actor_replies_and_stops_on_quit() {
        let api: Arc<dyn SurveyApi> = Arc::new(FakeApi::default());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (evt_tx, mut evt_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(api, cmd_rx, evt_tx));

        cmd_tx.send(AppCommand::Load).unwrap();
        match evt_rx.recv().await {
            Some(AppEvent::Surveys(list)) => assert!(list.is_empty()),
            other => panic!("unexpected {:?}", other),
        }

        cmd_tx.send(AppCommand::Quit).unwrap();
        handle.await.unwrap();
        match evt_rx.recv().await {
            Some(AppEvent::Message(msg)) => assert_eq!(msg, "收到退出命令"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
