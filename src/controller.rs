use crate::survey::{
    validate, DraftEdit, FieldErrors, SurveyDraft, SurveyId, SurveyPayload, SurveyRecord,
};

pub const MSG_CREATED: &str = "Survey submitted successfully.";
pub const MSG_UPDATED: &str = "Survey updated successfully.";
pub const MSG_DELETED: &str = "Survey deleted.";

/// 表单模式：新建或编辑已有记录
#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit(SurveyId),
}

/// 校验通过后交给客户端执行的变更
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create(SurveyPayload),
    Update { id: SurveyId, payload: SurveyPayload },
    Delete(SurveyId),
}

/// 提交被拦下的原因（不会触达网络层）
#[derive(Debug, Clone, PartialEq)]
pub enum Rejected {
    /// 已有变更请求在进行中
    Busy,
    Invalid(FieldErrors),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// 问卷表单控制器
///
/// 持有记录列表、当前编辑的记录、草稿与校验结果，以及单飞（single-flight）标记。
/// 只在请求确认成功后才修改列表。
#[derive(Debug, Default)]
pub struct SurveyController {
    records: Vec<SurveyRecord>,
    selected: Option<SurveyRecord>,
    pending: bool,
    loading: bool,
    draft: SurveyDraft,
    errors: FieldErrors,
    notice: Option<Notice>,
}

impl SurveyController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[SurveyRecord] {
        &self.records
    }

    pub fn selected(&self) -> Option<&SurveyRecord> {
        self.selected.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn draft(&self) -> &SurveyDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn find(&self, id: &SurveyId) -> Option<&SurveyRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn mode(&self) -> FormMode {
        match &self.selected {
            Some(record) => FormMode::Edit(record.id.clone()),
            None => FormMode::Create,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode() {
            FormMode::Create => "New Student Survey",
            FormMode::Edit(_) => "Update Student Survey",
        }
    }

    // ---- 加载 ----

    pub fn begin_load(&mut self) {
        self.loading = true;
        self.notice = None;
    }

    pub fn apply_loaded(&mut self, records: Vec<SurveyRecord>) {
        self.loading = false;
        self.records = records;
    }

    /// 加载失败：保留原列表
    pub fn apply_load_failed(&mut self, message: String) {
        self.loading = false;
        self.notice = Some(Notice::Error(message));
    }

    // ---- 表单 ----

    /// 选中记录进入编辑；不修改列表
    pub fn edit(&mut self, record: &SurveyRecord) {
        self.selected = Some(record.clone());
        self.draft = SurveyDraft::from_record(record);
        self.errors = FieldErrors::default();
        self.notice = None;
    }

    pub fn edit_by_id(&mut self, id: &SurveyId) -> bool {
        match self.find(id).cloned() {
            Some(record) => {
                self.edit(&record);
                true
            }
            None => false,
        }
    }

    /// 取消编辑：清空选中、草稿和错误
    pub fn cancel(&mut self) {
        self.selected = None;
        self.reset_form();
    }

    fn reset_form(&mut self) {
        self.draft = SurveyDraft::default();
        self.errors = FieldErrors::default();
    }

    pub fn apply_edit(&mut self, edit: DraftEdit) -> bool {
        self.draft.apply(edit)
    }

    /// 校验并生成 create / update 请求；成功后进入 pending
    pub fn submit(&mut self) -> Result<Mutation, Rejected> {
        if self.pending {
            return Err(Rejected::Busy);
        }
        let errors = validate(&self.draft);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return Err(Rejected::Invalid(errors));
        }

        self.errors = FieldErrors::default();
        self.notice = None;
        self.pending = true;
        let payload = self.draft.to_payload();
        Ok(match &self.selected {
            Some(record) => Mutation::Update {
                id: record.id.clone(),
                payload,
            },
            None => Mutation::Create(payload),
        })
    }

    // ---- 删除 ----

    pub fn confirm_prompt(record: &SurveyRecord) -> String {
        format!("Delete survey for {}?", record.full_name())
    }

    /// 用户确认删除后调用
    pub fn begin_delete(&mut self, id: &SurveyId) -> Result<Mutation, Rejected> {
        if self.pending {
            return Err(Rejected::Busy);
        }
        self.pending = true;
        self.notice = None;
        Ok(Mutation::Delete(id.clone()))
    }

    // ---- 请求完成 ----

    pub fn apply_created(&mut self, record: SurveyRecord) {
        self.pending = false;
        self.records.insert(0, record);
        // 请求期间已切到编辑其他记录时保留该草稿
        if self.selected.is_none() {
            self.reset_form();
        }
        self.notice = Some(Notice::Success(MSG_CREATED.to_string()));
    }

    /// 原位替换同 id 的记录并清空选中
    pub fn apply_updated(&mut self, record: SurveyRecord) {
        self.pending = false;
        if let Some(slot) = self.records.iter_mut().find(|r| r.id == record.id) {
            *slot = record;
        }
        self.selected = None;
        self.reset_form();
        self.notice = Some(Notice::Success(MSG_UPDATED.to_string()));
    }

    pub fn apply_deleted(&mut self, id: &SurveyId) {
        self.pending = false;
        self.records.retain(|r| &r.id != id);
        if self.selected.as_ref().map(|r| &r.id == id).unwrap_or(false) {
            self.selected = None;
            self.reset_form();
        }
        self.notice = Some(Notice::Success(MSG_DELETED.to_string()));
    }

    /// 变更失败：列表、选中和草稿保持不变，用户可重试
    pub fn apply_failed(&mut self, message: String) {
        self.pending = false;
        self.notice = Some(Notice::Error(message));
    }
}
