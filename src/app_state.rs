use crate::commands::AppCommand;
use crate::controller::{Rejected, SurveyController, MSG_CREATED, MSG_DELETED, MSG_UPDATED};
use crate::survey::{
    DraftEdit, InterestSource, LikedMost, RecommendationLikelihood, SurveyField, SurveyId,
    SurveyRecord,
};
use crossterm::event::KeyCode;
use log::info;
use ratatui::widgets::ListState;
use std::str::FromStr;
use tokio::sync::mpsc;

#[derive(PartialEq, Debug, Clone)]
pub enum ViewMode {
    SurveyList,
    Form,
    Detail,
}

#[derive(PartialEq, Debug, Clone)]
pub enum InputMode {
    Normal,
    Command,
    /// 正在输入表单文本字段
    Editing,
    /// 等待删除确认 (y/n)
    Confirm,
}

#[derive(PartialEq, Debug, Clone)]
pub enum FocusArea {
    Menu,     // 焦点在左侧菜单
    MainView, // 焦点在主视图
}

/// 表单中的一行
#[derive(PartialEq, Debug, Clone)]
pub enum FormRow {
    Text(SurveyField),
    LikedMost(LikedMost),
    InterestSource,
    Recommendation,
    Submit,
    Cancel,
}

pub fn form_rows() -> Vec<FormRow> {
    let (required, optional): (Vec<SurveyField>, Vec<SurveyField>) =
        SurveyField::TEXT.iter().copied().partition(|f| f.is_required());
    let mut rows: Vec<FormRow> = required.into_iter().map(FormRow::Text).collect();
    rows.extend(LikedMost::options().into_iter().map(FormRow::LikedMost));
    rows.push(FormRow::InterestSource);
    rows.push(FormRow::Recommendation);
    rows.extend(optional.into_iter().map(FormRow::Text));
    rows.push(FormRow::Submit);
    rows.push(FormRow::Cancel);
    rows
}

pub const MENU_ITEMS: [&str; 3] = ["问卷列表", "填写问卷", "详细信息"];

#[derive(Debug)]
pub enum AppEvent {
    Message(String),
    Error(String),
    Surveys(Vec<SurveyRecord>),
    LoadFailed(String),
    Created(SurveyRecord),
    Updated(SurveyRecord),
    Deleted(SurveyId),
    MutationFailed(String),
}

pub struct App {
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub focus_area: FocusArea,
    pub menu_selected_index: usize,
    pub controller: SurveyController,
    pub selected_index: usize,
    pub survey_list_state: ListState,
    pub form_rows: Vec<FormRow>,
    pub form_index: usize,
    pub detail_scroll: u16,
    pub pending_delete: Option<SurveyRecord>,
    pub command_input: String,
    pub command_cursor: usize,
    pub command_history: Vec<String>,
    pub command_history_index: Option<usize>,
    pub log_messages: Vec<String>,
    pub cmd_tx: mpsc::UnboundedSender<AppCommand>,
    pub evt_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl App {
    pub fn new(
        startup_info: Vec<String>,
        cmd_tx: mpsc::UnboundedSender<AppCommand>,
        evt_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> App {
        let mut log_messages = vec!["应用已启动".to_string()];
        log_messages.extend(startup_info);

        App {
            view_mode: ViewMode::SurveyList,
            input_mode: InputMode::Normal,
            focus_area: FocusArea::MainView,
            menu_selected_index: 0,
            controller: SurveyController::new(),
            selected_index: 0,
            survey_list_state: {
                let mut s = ListState::default();
                s.select(Some(0));
                s
            },
            form_rows: form_rows(),
            form_index: 0,
            detail_scroll: 0,
            pending_delete: None,
            command_input: String::new(),
            command_cursor: 0,
            command_history: Vec::new(),
            command_history_index: None,
            log_messages,
            cmd_tx,
            evt_rx: Some(evt_rx),
        }
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
    }

    fn send(&mut self, cmd: AppCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            self.add_log("✗ 后台任务已停止".to_string());
        }
    }

    /// 当前列表中高亮的记录
    pub fn highlighted_record(&self) -> Option<&SurveyRecord> {
        self.controller.records().get(self.selected_index)
    }

    pub fn current_row(&self) -> Option<&FormRow> {
        self.form_rows.get(self.form_index)
    }

    pub fn clamp_selection(&mut self) {
        let len = self.controller.records().len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
        self.survey_list_state.select(Some(self.selected_index));
    }

    /// 获取命令补全建议
    pub fn get_completion_hint(&self) -> Option<String> {
        let commands = ["reload", "new", "edit", "delete", "cancel", "help", "quit"];
        let input = self.command_input.trim();
        if input.is_empty() {
            return None;
        }
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.len() != 1 {
            return None;
        }
        commands
            .iter()
            .find(|cmd| cmd.starts_with(parts[0]) && **cmd != parts[0])
            .map(|cmd| cmd[parts[0].len()..].to_string())
    }

    // ---- 动作 ----

    pub fn request_load(&mut self) {
        self.controller.begin_load();
        self.add_log("正在加载问卷列表...".to_string());
        self.send(AppCommand::Load);
    }

    pub fn open_new_form(&mut self) {
        self.controller.cancel();
        self.form_index = 0;
        self.view_mode = ViewMode::Form;
        self.menu_selected_index = 1;
        self.focus_area = FocusArea::MainView;
    }

    pub fn open_edit(&mut self, id: &SurveyId) {
        if self.controller.edit_by_id(id) {
            self.form_index = 0;
            self.view_mode = ViewMode::Form;
            self.menu_selected_index = 1;
            self.focus_area = FocusArea::MainView;
        } else {
            self.add_log(format!("✗ 未找到问卷 [ID: {}]", id));
        }
    }

    pub fn cancel_form(&mut self) {
        self.controller.cancel();
        self.input_mode = InputMode::Normal;
        self.view_mode = ViewMode::SurveyList;
        self.menu_selected_index = 0;
    }

    pub fn ask_delete(&mut self, id: &SurveyId) {
        match self.controller.find(id).cloned() {
            Some(record) => {
                self.pending_delete = Some(record);
                self.input_mode = InputMode::Confirm;
            }
            None => self.add_log(format!("✗ 未找到问卷 [ID: {}]", id)),
        }
    }

    /// 处理删除确认结果
    pub fn resolve_delete(&mut self, confirmed: bool) {
        self.input_mode = InputMode::Normal;
        let Some(record) = self.pending_delete.take() else {
            return;
        };
        if !confirmed {
            return;
        }
        match self.controller.begin_delete(&record.id) {
            Ok(mutation) => {
                self.add_log(format!("正在删除问卷 [ID: {}]...", record.id));
                self.send(mutation.into());
            }
            Err(_) => self.add_log("⚠ 已有请求进行中，请稍候".to_string()),
        }
    }

    pub fn submit_form(&mut self) {
        match self.controller.submit() {
            Ok(mutation) => {
                self.add_log("正在提交问卷...".to_string());
                self.send(mutation.into());
            }
            Err(Rejected::Busy) => self.add_log("⚠ 已有请求进行中，请稍候".to_string()),
            Err(Rejected::Invalid(errors)) => {
                // 跳到第一个出错的字段
                if let Some(first) = errors.fields().first() {
                    if let Some(idx) = self
                        .form_rows
                        .iter()
                        .position(|r| r == &FormRow::Text(*first))
                    {
                        self.form_index = idx;
                    }
                }
                self.add_log(format!("✗ 表单校验失败: {}", errors.summary()));
            }
        }
    }

    /// 激活当前表单行（勾选、切换选项、进入输入、提交、取消）
    pub fn activate_form_row(&mut self) {
        let Some(row) = self.current_row().cloned() else {
            return;
        };
        match row {
            FormRow::Text(_) => self.input_mode = InputMode::Editing,
            FormRow::LikedMost(option) => {
                let checked = !self.controller.draft().has_liked_most(&option);
                self.controller
                    .apply_edit(DraftEdit::LikedMost { option, checked });
            }
            FormRow::InterestSource => {
                let next = next_option(
                    &InterestSource::options(),
                    &self.controller.draft().interest_source,
                );
                self.controller.apply_edit(DraftEdit::InterestSource(next));
            }
            FormRow::Recommendation => {
                let next = next_option(
                    &RecommendationLikelihood::options(),
                    &self.controller.draft().recommendation_likelihood,
                );
                self.controller.apply_edit(DraftEdit::Recommendation(next));
            }
            FormRow::Submit => self.submit_form(),
            FormRow::Cancel => self.cancel_form(),
        }
    }

    fn edit_current_text<F>(&mut self, change: F)
    where
        F: FnOnce(&mut String),
    {
        if let Some(FormRow::Text(field)) = self.current_row().cloned() {
            let mut value = self
                .controller
                .draft()
                .text(field)
                .unwrap_or_default()
                .to_string();
            change(&mut value);
            self.controller.apply_edit(DraftEdit::Text { field, value });
        }
    }

    /// 执行命令；返回 true 表示退出应用
    pub fn run_command(&mut self, cmd: AppCommand) -> bool {
        match cmd {
            AppCommand::Quit => {
                self.send(AppCommand::Quit);
                true
            }
            AppCommand::Load => {
                self.request_load();
                false
            }
            AppCommand::New => {
                self.open_new_form();
                false
            }
            AppCommand::Edit { id } => {
                self.open_edit(&id);
                false
            }
            AppCommand::AskDelete { id } => {
                self.ask_delete(&id);
                false
            }
            AppCommand::Cancel => {
                self.cancel_form();
                false
            }
            other => {
                self.send(other);
                false
            }
        }
    }

    /// 处理后台回传的事件
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Message(msg) => self.add_log(msg),
            AppEvent::Error(msg) => self.add_log(format!("✗ {}", msg)),
            AppEvent::Surveys(list) => {
                let count = list.len();
                self.controller.apply_loaded(list);
                self.clamp_selection();
                self.add_log(format!("✓ 已加载 {} 条问卷", count));
            }
            AppEvent::LoadFailed(msg) => {
                self.controller.apply_load_failed(msg.clone());
                self.add_log(format!("✗ 加载失败: {}", msg));
            }
            AppEvent::Created(record) => {
                info!("survey created: {}", record.id);
                self.controller.apply_created(record);
                self.selected_index = 0;
                self.clamp_selection();
                self.form_index = 0;
                self.add_log(format!("✓ {}", MSG_CREATED));
            }
            AppEvent::Updated(record) => {
                info!("survey updated: {}", record.id);
                self.controller.apply_updated(record);
                if self.view_mode == ViewMode::Form {
                    self.view_mode = ViewMode::SurveyList;
                    self.menu_selected_index = 0;
                }
                self.add_log(format!("✓ {}", MSG_UPDATED));
            }
            AppEvent::Deleted(id) => {
                info!("survey deleted: {}", id);
                self.controller.apply_deleted(&id);
                self.clamp_selection();
                if self.view_mode == ViewMode::Detail && self.controller.records().is_empty() {
                    self.view_mode = ViewMode::SurveyList;
                    self.menu_selected_index = 0;
                }
                self.add_log(format!("✓ {}", MSG_DELETED));
            }
            AppEvent::MutationFailed(msg) => {
                self.controller.apply_failed(msg.clone());
                self.add_log(format!("✗ {}", msg));
            }
        }
    }

    pub fn handle_key_event(&mut self, key: KeyCode) -> bool {
        match self.input_mode {
            InputMode::Command => return self.handle_command_key(key),
            InputMode::Editing => {
                self.handle_editing_key(key);
                return false;
            }
            InputMode::Confirm => {
                match key {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                        self.resolve_delete(true)
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        self.resolve_delete(false)
                    }
                    _ => {}
                }
                return false;
            }
            InputMode::Normal => {}
        }

        // 正常模式下的按键处理
        match key {
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Command;
                self.command_input.clear();
                self.command_cursor = 0;
                false
            }
            KeyCode::Char('q') => self.run_command(AppCommand::Quit),
            KeyCode::Left => {
                self.focus_area = FocusArea::Menu;
                false
            }
            KeyCode::Right => {
                self.focus_area = FocusArea::MainView;
                false
            }
            KeyCode::Up => {
                if self.focus_area == FocusArea::Menu {
                    self.menu_selected_index = self.menu_selected_index.saturating_sub(1);
                } else {
                    match self.view_mode {
                        ViewMode::SurveyList => {
                            self.selected_index = self.selected_index.saturating_sub(1);
                        }
                        ViewMode::Form => self.form_index = self.form_index.saturating_sub(1),
                        ViewMode::Detail => {
                            self.detail_scroll = self.detail_scroll.saturating_sub(1)
                        }
                    }
                }
                false
            }
            KeyCode::Down => {
                if self.focus_area == FocusArea::Menu {
                    if self.menu_selected_index < MENU_ITEMS.len() - 1 {
                        self.menu_selected_index += 1;
                    }
                } else {
                    match self.view_mode {
                        ViewMode::SurveyList => {
                            let len = self.controller.records().len();
                            if self.selected_index < len.saturating_sub(1) {
                                self.selected_index += 1;
                            }
                        }
                        ViewMode::Form => {
                            if self.form_index < self.form_rows.len() - 1 {
                                self.form_index += 1;
                            }
                        }
                        ViewMode::Detail => {
                            self.detail_scroll = self.detail_scroll.saturating_add(1)
                        }
                    }
                }
                false
            }
            KeyCode::Enter | KeyCode::Char('c') => {
                if self.focus_area == FocusArea::Menu {
                    match self.menu_selected_index {
                        0 => self.view_mode = ViewMode::SurveyList,
                        1 => self.view_mode = ViewMode::Form,
                        2 => {
                            self.view_mode = ViewMode::Detail;
                            self.detail_scroll = 0;
                        }
                        _ => {}
                    }
                    self.focus_area = FocusArea::MainView;
                } else {
                    match self.view_mode {
                        ViewMode::SurveyList => {
                            if self.highlighted_record().is_some() {
                                self.view_mode = ViewMode::Detail;
                                self.menu_selected_index = 2;
                                self.detail_scroll = 0;
                            }
                        }
                        ViewMode::Form => self.activate_form_row(),
                        ViewMode::Detail => {}
                    }
                }
                false
            }
            KeyCode::Char(' ') => {
                if self.focus_area == FocusArea::MainView && self.view_mode == ViewMode::Form {
                    self.activate_form_row();
                }
                false
            }
            KeyCode::Char('x') | KeyCode::Esc => {
                if self.view_mode == ViewMode::Detail {
                    self.view_mode = ViewMode::SurveyList;
                    self.menu_selected_index = 0;
                } else if self.view_mode == ViewMode::Form {
                    self.cancel_form();
                }
                false
            }
            KeyCode::Char('r') => {
                self.request_load();
                false
            }
            KeyCode::Char('n') => {
                if self.view_mode != ViewMode::Form {
                    self.open_new_form();
                }
                false
            }
            KeyCode::Char('e') => {
                if self.view_mode != ViewMode::Form {
                    if let Some(id) = self.highlighted_record().map(|r| r.id.clone()) {
                        self.open_edit(&id);
                    }
                }
                false
            }
            KeyCode::Char('d') => {
                if self.view_mode != ViewMode::Form {
                    if let Some(id) = self.highlighted_record().map(|r| r.id.clone()) {
                        self.ask_delete(&id);
                    }
                }
                false
            }
            KeyCode::Char('s') => {
                if self.view_mode == ViewMode::Form {
                    self.submit_form();
                }
                false
            }
            _ => false,
        }
    }

    fn handle_editing_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char(c) => self.edit_current_text(|v| v.push(c)),
            KeyCode::Backspace => self.edit_current_text(|v| {
                v.pop();
            }),
            KeyCode::Enter | KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Tab | KeyCode::Down => {
                self.input_mode = InputMode::Normal;
                if self.form_index < self.form_rows.len() - 1 {
                    self.form_index += 1;
                }
                if matches!(self.current_row(), Some(FormRow::Text(_))) {
                    self.input_mode = InputMode::Editing;
                }
            }
            KeyCode::Up => {
                self.input_mode = InputMode::Normal;
                self.form_index = self.form_index.saturating_sub(1);
                if matches!(self.current_row(), Some(FormRow::Text(_))) {
                    self.input_mode = InputMode::Editing;
                }
            }
            _ => {}
        }
    }

    fn handle_command_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Enter => {
                let cmd_owned = self.command_input.trim().to_string();
                self.command_input.clear();
                self.command_cursor = 0;
                self.input_mode = InputMode::Normal;
                if cmd_owned.is_empty() {
                    return false;
                }

                let app_cmd = AppCommand::from_str(&cmd_owned)
                    .unwrap_or_else(|_| AppCommand::Unknown(cmd_owned.clone()));
                self.command_history.push(cmd_owned);
                self.command_history_index = None;
                self.run_command(app_cmd)
            }
            KeyCode::Esc => {
                self.command_input.clear();
                self.command_cursor = 0;
                self.input_mode = InputMode::Normal;
                false
            }
            KeyCode::Tab => {
                if let Some(hint) = self.get_completion_hint() {
                    let insert = format!("{} ", hint);
                    self.command_input.insert_str(self.command_cursor, &insert);
                    self.command_cursor += insert.len();
                }
                false
            }
            KeyCode::Up => {
                if self.command_history.is_empty() {
                    return false;
                }
                let next = match self.command_history_index {
                    None => self.command_history.len().saturating_sub(1),
                    Some(i) => i.saturating_sub(1),
                };
                self.command_history_index = Some(next);
                if let Some(cmd) = self.command_history.get(next) {
                    self.command_input = cmd.clone();
                    self.command_cursor = self.command_input.len();
                }
                false
            }
            KeyCode::Down => {
                let Some(i) = self.command_history_index else {
                    return false;
                };
                let n = i + 1;
                if n >= self.command_history.len() {
                    self.command_history_index = None;
                    self.command_input.clear();
                    self.command_cursor = 0;
                    return false;
                }
                self.command_history_index = Some(n);
                self.command_input = self.command_history[n].clone();
                self.command_cursor = self.command_input.len();
                false
            }
            KeyCode::Backspace => {
                if self.command_cursor > 0 {
                    let prev = prev_char_boundary(&self.command_input, self.command_cursor);
                    self.command_input.remove(prev);
                    self.command_cursor = prev;
                }
                false
            }
            KeyCode::Left => {
                self.command_cursor = prev_char_boundary(&self.command_input, self.command_cursor);
                false
            }
            KeyCode::Right => {
                if let Some(c) = self.command_input[self.command_cursor..].chars().next() {
                    self.command_cursor += c.len_utf8();
                }
                false
            }
            KeyCode::Home => {
                self.command_cursor = 0;
                false
            }
            KeyCode::End => {
                self.command_cursor = self.command_input.len();
                false
            }
            KeyCode::Char(c) => {
                self.command_input.insert(self.command_cursor, c);
                self.command_cursor += c.len_utf8();
                false
            }
            _ => false,
        }
    }
}

fn prev_char_boundary(s: &str, idx: usize) -> usize {
    s[..idx]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// 循环到下一个选项；未知值回到第一个
fn next_option<T: Clone + PartialEq>(options: &[T], current: &T) -> T {
    match options.iter().position(|o| o == current) {
        Some(i) => options[(i + 1) % options.len()].clone(),
        None => options[0].clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_service::{execute, tests::FakeApi};
    use crate::controller::Notice;

    fn app() -> (App, mpsc::UnboundedReceiver<AppCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (_evt_tx, evt_rx) = mpsc::unbounded_channel();
        (App::new(Vec::new(), cmd_tx, evt_rx), cmd_rx)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key_event(KeyCode::Char(c));
        }
    }

    fn fill_form(app: &mut App) {
        let values = [
            "John",
            "Doe",
            "4400 University Dr",
            "Fairfax",
            "va",
            "22030",
            "703-993-1000",
            "john@gmu.edu",
            "2024-10-01",
        ];
        app.form_index = 0;
        app.handle_key_event(KeyCode::Enter);
        for v in values {
            type_text(app, v);
            app.handle_key_event(KeyCode::Tab);
        }
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_form_rows_layout() {
        let rows = form_rows();
        assert_eq!(rows.len(), 9 + 6 + 2 + 1 + 2);
        assert_eq!(rows[0], FormRow::Text(SurveyField::FirstName));
        assert_eq!(rows[8], FormRow::Text(SurveyField::DateOfSurvey));
        assert_eq!(rows[9], FormRow::LikedMost(LikedMost::Students));
        assert_eq!(rows[17], FormRow::Text(SurveyField::AdditionalComments));
        assert_eq!(rows.last(), Some(&FormRow::Cancel));
    }

    #[test]
    fn test_typing_into_form_updates_draft() {
        let (mut app, _rx) = app();
        app.open_new_form();
        app.handle_key_event(KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Editing);
        type_text(&mut app, "Jo");
        app.handle_key_event(KeyCode::Backspace);
        type_text(&mut app, "ane");
        app.handle_key_event(KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.controller.draft().first_name, "Jane");
    }

    #[test]
    fn test_toggle_and_cycle_options() {
        let (mut app, _rx) = app();
        app.open_new_form();
        app.form_index = app
            .form_rows
            .iter()
            .position(|r| r == &FormRow::LikedMost(LikedMost::Sports))
            .unwrap();
        app.handle_key_event(KeyCode::Char(' '));
        assert_eq!(app.controller.draft().liked_most, vec![LikedMost::Sports]);
        app.handle_key_event(KeyCode::Char(' '));
        assert!(app.controller.draft().liked_most.is_empty());

        app.form_index = app
            .form_rows
            .iter()
            .position(|r| r == &FormRow::InterestSource)
            .unwrap();
        app.handle_key_event(KeyCode::Enter);
        assert_eq!(
            app.controller.draft().interest_source,
            InterestSource::Television
        );
    }

    #[test]
    fn test_invalid_submit_sends_nothing() {
        let (mut app, mut rx) = app();
        app.open_new_form();
        app.handle_key_event(KeyCode::Char('s'));
        assert!(rx.try_recv().is_err());
        assert!(app.log_messages.last().unwrap().starts_with("✗ 表单校验失败"));
        assert_eq!(app.form_index, 0);
    }

    #[tokio::test]
    async fn test_create_update_delete_flow() {
        let api = FakeApi::default();
        let (mut app, mut rx) = app();

        app.open_new_form();
        fill_form(&mut app);
        app.handle_key_event(KeyCode::Char('s'));
        let cmd = rx.try_recv().unwrap();
        assert!(matches!(cmd, AppCommand::Create { .. }));
        assert!(app.controller.is_pending());

        // 单飞：请求未返回前再次提交被拦下
        app.handle_key_event(KeyCode::Char('s'));
        assert!(rx.try_recv().is_err());

        let evt = execute(&api, cmd).await.unwrap();
        app.apply_event(evt);
        assert_eq!(app.controller.records().len(), 1);
        assert_eq!(app.controller.records()[0].id, SurveyId::Number(1));
        assert_eq!(app.controller.records()[0].state, "VA");

        app.handle_key_event(KeyCode::Esc);
        assert_eq!(app.view_mode, ViewMode::SurveyList);
        app.handle_key_event(KeyCode::Char('e'));
        assert_eq!(app.view_mode, ViewMode::Form);
        assert_eq!(app.controller.title(), "Update Student Survey");
        app.form_index = 3;
        app.handle_key_event(KeyCode::Enter);
        for _ in 0.."Fairfax".len() {
            app.handle_key_event(KeyCode::Backspace);
        }
        type_text(&mut app, "Arlington");
        app.handle_key_event(KeyCode::Enter);
        app.handle_key_event(KeyCode::Char('s'));
        let cmd = rx.try_recv().unwrap();
        assert!(matches!(cmd, AppCommand::Update { .. }));
        app.apply_event(execute(&api, cmd).await.unwrap());
        assert_eq!(app.controller.records()[0].city, "Arlington");
        assert!(app.controller.selected().is_none());
        assert_eq!(app.view_mode, ViewMode::SurveyList);

        app.handle_key_event(KeyCode::Char('d'));
        assert_eq!(app.input_mode, InputMode::Confirm);
        app.handle_key_event(KeyCode::Char('y'));
        let cmd = rx.try_recv().unwrap();
        assert_eq!(
            cmd,
            AppCommand::Delete {
                id: SurveyId::Number(1)
            }
        );
        app.apply_event(execute(&api, cmd).await.unwrap());
        assert!(app.controller.records().is_empty());
        assert_eq!(
            app.controller.notice(),
            Some(&Notice::Success(MSG_DELETED.to_string()))
        );
    }

    #[test]
    fn test_delete_without_record_sends_nothing() {
        let (mut app, mut rx) = app();
        app.apply_event(AppEvent::Surveys(Vec::new()));
        app.handle_key_event(KeyCode::Char('d'));
        assert_eq!(app.input_mode, InputMode::Normal);

        app.run_command(AppCommand::AskDelete {
            id: SurveyId::Number(5),
        });
        assert!(app.log_messages.last().unwrap().contains("未找到问卷"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_load_failure_is_logged() {
        let (mut app, mut rx) = app();
        app.handle_key_event(KeyCode::Char('r'));
        assert_eq!(rx.try_recv().unwrap(), AppCommand::Load);
        assert!(app.controller.is_loading());

        app.apply_event(AppEvent::LoadFailed("Unable to reach API: refused".to_string()));
        assert!(!app.controller.is_loading());
        assert_eq!(
            app.log_messages.last().unwrap(),
            "✗ 加载失败: Unable to reach API: refused"
        );
    }

    #[test]
    fn test_command_mode_parses_and_completes() {
        let (mut app, mut rx) = app();
        app.handle_key_event(KeyCode::Char('/'));
        type_text(&mut app, "rel");
        assert_eq!(app.get_completion_hint(), Some("oad".to_string()));
        app.handle_key_event(KeyCode::Tab);
        assert_eq!(app.command_input, "reload ");
        let quit = app.handle_key_event(KeyCode::Enter);
        assert!(!quit);
        assert_eq!(rx.try_recv().unwrap(), AppCommand::Load);

        app.handle_key_event(KeyCode::Char('/'));
        type_text(&mut app, "quit");
        assert!(app.handle_key_event(KeyCode::Enter));
        assert_eq!(rx.try_recv().unwrap(), AppCommand::Quit);
    }

    #[test]
    fn test_next_option_wraps_and_recovers_unknown() {
        let options = RecommendationLikelihood::options();
        assert_eq!(
            next_option(&options, &RecommendationLikelihood::Unlikely),
            RecommendationLikelihood::VeryLikely
        );
        assert_eq!(
            next_option(&options, &RecommendationLikelihood::from("maybe")),
            RecommendationLikelihood::VeryLikely
        );
    }
}
