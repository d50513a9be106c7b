use crate::app_state::{App, FocusArea, FormRow, InputMode, ViewMode, MENU_ITEMS};
use crate::controller::{Notice, SurveyController};
use crate::survey::{format_liked_most, SurveyField, SurveyRecord};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    // 创建布局
    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 顶部标题栏
            Constraint::Min(0),    // 中间内容区域
            Constraint::Min(8),    // 底部命令/日志区域
        ])
        .split(f.size());

    render_top_bar(f, chunks[0], app);

    // 中间内容区域（左侧菜单 + 主视图）
    let middle_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(0)])
        .split(chunks[1]);

    render_left_menu(f, middle_chunks[0], app);
    render_main_view(f, middle_chunks[1], app);
    render_bottom_bar(f, chunks[2], app);

    if app.input_mode == InputMode::Confirm {
        render_confirm(f, app);
    }
}

fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let title = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan));

    let mut spans = vec![
        Span::styled(
            " 学生问卷管理 ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" - Terminal TUI"),
    ];
    if app.controller.is_loading() {
        spans.push(Span::styled(
            "  加载中...",
            Style::default().fg(Color::Yellow),
        ));
    } else if app.controller.is_pending() {
        spans.push(Span::styled(
            "  请求处理中...",
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(title)
        .alignment(ratatui::layout::Alignment::Center);

    f.render_widget(paragraph, area);
}

fn render_left_menu(f: &mut Frame, area: Rect, app: &App) {
    let menu_items: Vec<ListItem> = MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let is_selected = i == app.menu_selected_index;
            let is_active = matches!(
                (i, &app.view_mode),
                (0, ViewMode::SurveyList) | (1, ViewMode::Form) | (2, ViewMode::Detail)
            );

            let style = if is_selected {
                if app.focus_area == FocusArea::Menu {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Magenta)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD)
                }
            } else if is_active {
                // 当前激活的视图
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };

            let prefix = if is_active { "● " } else { "○ " };
            ListItem::new(format!("{}{}", prefix, text)).style(style)
        })
        .collect();

    let title = if app.focus_area == FocusArea::Menu {
        "菜单 (Enter/c 确认)"
    } else {
        "菜单 (← 切换)"
    };

    let menu = List::new(menu_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(focus_style(app)),
    );

    f.render_widget(menu, area);
}

fn focus_style(app: &App) -> Style {
    if app.focus_area == FocusArea::MainView {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_main_view(f: &mut Frame, area: Rect, app: &mut App) {
    match app.view_mode {
        ViewMode::SurveyList => render_list(f, area, app),
        ViewMode::Form => render_form(f, area, app),
        ViewMode::Detail => render_detail(f, area, app),
    }
}

fn render_list(f: &mut Frame, area: Rect, app: &mut App) {
    let items: Vec<ListItem> = app
        .controller
        .records()
        .iter()
        .map(|r| {
            let content = Line::from(vec![
                Span::styled(format!("#{:<5}", r.id), Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("{:<24}", r.full_name()),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<12}", r.date_of_survey),
                    Style::default().fg(Color::Magenta),
                ),
                Span::raw(r.liked_most_labels()),
            ]);
            ListItem::new(content)
        })
        .collect();

    let title = if app.controller.records().is_empty() && !app.controller.is_loading() {
        "问卷列表 (暂无数据, r 刷新, n 新建)".to_string()
    } else if app.focus_area == FocusArea::MainView {
        format!(
            "问卷列表 [{}] (Enter/c 详情, e 编辑, d 删除, n 新建, r 刷新)",
            app.controller.records().len()
        )
    } else {
        format!("问卷列表 [{}]", app.controller.records().len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(focus_style(app)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    app.survey_list_state.select(Some(app.selected_index));
    f.render_stateful_widget(list, area, &mut app.survey_list_state);
}

fn notice_line(ctl: &SurveyController) -> Option<Line<'static>> {
    match ctl.notice()? {
        Notice::Success(msg) => Some(Line::from(Span::styled(
            msg.clone(),
            Style::default().fg(Color::Green),
        ))),
        Notice::Error(msg) => Some(Line::from(Span::styled(
            msg.clone(),
            Style::default().fg(Color::Red),
        ))),
    }
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let ctl = &app.controller;
    let draft = ctl.draft();
    let mut lines = Vec::new();
    if let Some(line) = notice_line(ctl) {
        lines.push(line);
        lines.push(Line::from(""));
    }

    for (i, row) in app.form_rows.iter().enumerate() {
        let is_current = i == app.form_index && app.focus_area == FocusArea::MainView;
        let marker = if is_current { ">> " } else { "   " };
        let row_style = if is_current {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let mut spans = vec![Span::raw(marker)];
        match row {
            FormRow::Text(field) => {
                let value = draft.text(*field).unwrap_or_default();
                let editing = is_current && app.input_mode == InputMode::Editing;
                spans.push(Span::styled(format!("{:<20}", field.label()), row_style));
                spans.push(Span::raw(value.to_string()));
                if editing {
                    spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
                }
                if let Some(msg) = ctl.errors().get(*field) {
                    spans.push(Span::styled(
                        format!("  {}", msg),
                        Style::default().fg(Color::Red),
                    ));
                }
            }
            FormRow::LikedMost(option) => {
                let mark = if draft.has_liked_most(option) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let heading = if i == first_liked_row(app) {
                    SurveyField::LikedMost.label()
                } else {
                    ""
                };
                spans.push(Span::styled(format!("{:<20}", heading), row_style));
                spans.push(Span::raw(format!("{} {}", mark, option.label())));
            }
            FormRow::InterestSource => {
                spans.push(Span::styled(format!("{:<20}", "Interest Source"), row_style));
                spans.push(Span::raw(format!("< {} >", draft.interest_source.label())));
            }
            FormRow::Recommendation => {
                spans.push(Span::styled(format!("{:<20}", "Recommendation"), row_style));
                spans.push(Span::raw(format!(
                    "< {} >",
                    draft.recommendation_likelihood.label()
                )));
            }
            FormRow::Submit => {
                let label = if ctl.is_pending() {
                    "[ 提交中... ]"
                } else {
                    "[ 提交 ]"
                };
                spans.push(Span::styled(label, row_style.fg(Color::Green)));
            }
            FormRow::Cancel => spans.push(Span::styled("[ 取消 ]", row_style)),
        }
        lines.push(Line::from(spans));
    }

    let title = if app.focus_area == FocusArea::MainView {
        format!(
            "{} (Enter 编辑/切换, Space 勾选, s 提交, x 取消)",
            ctl.title()
        )
    } else {
        ctl.title().to_string()
    };

    // 当前行保持在可视区域内
    let visible = area.height.saturating_sub(2) as usize;
    let offset = (app.form_index + 3).saturating_sub(visible) as u16;

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(focus_style(app)),
        )
        .scroll((offset, 0));
    f.render_widget(paragraph, area);
}

fn first_liked_row(app: &App) -> usize {
    app.form_rows
        .iter()
        .position(|r| matches!(r, FormRow::LikedMost(_)))
        .unwrap_or(0)
}

fn detail_lines(r: &SurveyRecord) -> Vec<Line<'static>> {
    let heading = |text: &'static str| {
        Line::from(vec![Span::styled(
            text,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )])
    };
    let kv = |k: &str, v: String| Line::from(format!("{:<18}{}", k, v));

    let mut lines = vec![
        heading("--- 基本信息 ---"),
        kv("ID:", r.id.to_string()),
        kv("Name:", r.full_name()),
        kv("Street Address:", r.street_address.clone()),
        kv("City:", r.city.clone()),
        kv("State:", r.state.clone()),
        kv("Zip:", r.zip_code.clone()),
        kv("Telephone:", r.phone.clone()),
        kv("Email:", r.email.clone()),
        kv("Date of Survey:", r.date_of_survey.clone()),
        Line::from(""),
        heading("--- 问卷内容 ---"),
        kv("Liked Most:", format_liked_most(&r.liked_most)),
        kv("Interest Source:", r.interest_source.label().to_string()),
        kv(
            "Recommendation:",
            r.recommendation_likelihood.label().to_string(),
        ),
        kv(
            "Comments:",
            r.additional_comments
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "—".to_string()),
        ),
    ];
    if r.created_at.is_some() || r.updated_at.is_some() {
        lines.push(Line::from(""));
        lines.push(heading("--- 时间 ---"));
        if let Some(ts) = &r.created_at {
            lines.push(kv("Created:", ts.clone()));
        }
        if let Some(ts) = &r.updated_at {
            lines.push(kv("Updated:", ts.clone()));
        }
    }
    lines
}

fn render_detail(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.highlighted_record() {
        Some(record) => detail_lines(record),
        None => vec![Line::from("未选择问卷")],
    };

    let title = if app.focus_area == FocusArea::MainView {
        "详细信息 (↑↓ 滚动, e 编辑, d 删除, x 返回)"
    } else {
        "详细信息"
    };

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(focus_style(app)),
        )
        .scroll((app.detail_scroll, 0));
    f.render_widget(paragraph, area);
}

fn render_confirm(f: &mut Frame, app: &App) {
    let Some(record) = &app.pending_delete else {
        return;
    };
    let area = centered_rect(50, 7, f.size());
    let text = vec![
        Line::from(""),
        Line::from(SurveyController::confirm_prompt(record)),
        Line::from(""),
        Line::from(Span::styled(
            "y/Enter 确认   n/Esc 取消",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let popup = Paragraph::new(text)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("确认删除")
                .style(Style::default().fg(Color::Red)),
        );
    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = (r.width as u32 * percent_x as u32 / 100) as u16;
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let bottom_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    // 命令输入区域
    let command_prompt = if app.input_mode == InputMode::Command {
        let mut spans = vec![Span::styled(
            "命令: ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )];
        let cur = app.command_cursor.min(app.command_input.len());
        let (left, right) = app.command_input.split_at(cur);
        spans.push(Span::raw(left));
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(right));

        // 补全建议显示为浅灰色
        if let Some(hint) = app.get_completion_hint() {
            spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
        }

        vec![Line::from(spans)]
    } else {
        vec![Line::from(vec![
            Span::styled("命令: ", Style::default().fg(Color::Yellow)),
            Span::raw(match app.input_mode {
                InputMode::Editing => "(输入中: Enter/Esc 完成, Tab 下一项)",
                _ => "(/ 命令 ←→切换 ↑↓导航 Enter/c确认 x返回 q退出)",
            }),
        ])]
    };
    let command_paragraph = Paragraph::new(command_prompt).block(
        Block::default()
            .borders(Borders::ALL)
            .title(if app.input_mode == InputMode::Command {
                "命令输入模式 (Enter执行 Esc取消 Tab补全 ↑↓历史)"
            } else {
                "命令输入"
            })
            .style(if app.input_mode == InputMode::Command {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            }),
    );
    f.render_widget(command_paragraph, bottom_chunks[0]);

    // 日志区域，最新的在顶部
    let log_items: Vec<ListItem> = app
        .log_messages
        .iter()
        .rev()
        .take(20)
        .map(|msg| {
            let style = if msg.starts_with('✓') {
                Style::default().fg(Color::Green)
            } else if msg.starts_with('✗') {
                Style::default().fg(Color::Red)
            } else if msg.starts_with('⚠') {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(msg.as_str()).style(style)
        })
        .collect();

    let log = List::new(log_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("日志 (共 {} 条)", app.log_messages.len()))
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(log, bottom_chunks[1]);
}
