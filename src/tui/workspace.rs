use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::clipboard::copy_to_clipboard;
use crate::error::{GenerationError, SubmitError};
use crate::preset_store::JsonFilePresetStore;
use crate::translation_service::{TranslationJob, TranslationResponse, TranslationService};
use crate::tui::{AppState, State};
use crate::workflow::{Notification, Severity, WorkflowController};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Prompt,
    Context,
    Presets,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Prompt => Focus::Context,
            Focus::Context => Focus::Presets,
            Focus::Presets => Focus::Prompt,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Prompt => Focus::Presets,
            Focus::Context => Focus::Prompt,
            Focus::Presets => Focus::Context,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Editing,
    SavingPreset,
}

pub struct WorkspaceState {
    pub controller: WorkflowController<JsonFilePresetStore>,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub preset_name_input: String,
    pub selected_preset: usize,
    pending_job: Option<TranslationJob>,
}

impl WorkspaceState {
    pub fn new(controller: WorkflowController<JsonFilePresetStore>) -> Self {
        Self {
            controller,
            focus: Focus::Prompt,
            input_mode: InputMode::Editing,
            preset_name_input: String::new(),
            selected_preset: 0,
            pending_job: None,
        }
    }

    fn selected_preset_name(&self) -> Option<String> {
        self.controller
            .presets()
            .get(self.selected_preset)
            .map(|preset| preset.name.clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.controller.presets().len();
        if self.selected_preset >= len {
            self.selected_preset = len.saturating_sub(1);
        }
    }

    fn submit(&mut self) {
        match self.controller.submit() {
            Ok(job) => self.pending_job = Some(job),
            // The submit affordance is hidden while a request is in flight
            Err(SubmitError::Busy) => {}
            Err(SubmitError::Invalid(e)) => tracing::debug!("Submission rejected: {}", e),
        }
    }

    fn copy_translation(&mut self, index: usize) {
        let Some(text) = self.controller.translations().get(index).cloned() else {
            return;
        };

        match copy_to_clipboard(&text) {
            Ok(()) => self.controller.notify(Notification::info(
                "Copied!",
                "Translation copied to clipboard.",
            )),
            Err(e) => {
                tracing::warn!("Failed to copy to clipboard: {:#}", e);
                self.controller
                    .notify(Notification::error("Error", "Could not copy to clipboard."));
            }
        }
    }

    fn handle_save_dialog_input(&mut self, key: KeyCode) -> Result<Option<AppState>> {
        match key {
            KeyCode::Esc => {
                self.input_mode = InputMode::Editing;
            }
            KeyCode::Char(c) => self.preset_name_input.push(c),
            KeyCode::Backspace => {
                self.preset_name_input.pop();
            }
            KeyCode::Enter => {
                // Validation and storage failures keep the dialog open
                if let Ok(true) = self.controller.save_preset(&self.preset_name_input) {
                    self.preset_name_input.clear();
                    self.input_mode = InputMode::Editing;
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn handle_presets_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_preset = self.selected_preset.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_preset + 1 < self.controller.presets().len() {
                    self.selected_preset += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(name) = self.selected_preset_name() {
                    self.controller.select_preset(&name);
                    self.focus = Focus::Context;
                }
            }
            KeyCode::Delete | KeyCode::Char('d') => {
                if let Some(name) = self.selected_preset_name() {
                    self.controller.delete_preset(&name);
                    self.clamp_selection();
                }
            }
            _ => {}
        }
    }

    fn focused_field(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Prompt => Some(&mut self.controller.prompt),
            Focus::Context => Some(&mut self.controller.context),
            Focus::Presets => None,
        }
    }
}

impl State for WorkspaceState {
    fn handle_key_event(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<Option<AppState>> {
        if let (KeyCode::Char('q'), KeyModifiers::CONTROL) = (key, modifiers) {
            return Ok(Some(AppState::Quit));
        }
        if self.input_mode == InputMode::SavingPreset {
            return self.handle_save_dialog_input(key);
        }

        match (key, modifiers) {
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
                self.preset_name_input.clear();
                self.input_mode = InputMode::SavingPreset;
            }
            (KeyCode::Esc, _) => {
                self.controller.dismiss_notification();
            }
            (KeyCode::Tab, _) => self.focus = self.focus.next(),
            (KeyCode::BackTab, _) => self.focus = self.focus.previous(),
            (KeyCode::F(n @ 1..=4), _) => self.copy_translation(usize::from(n) - 1),
            _ if self.focus == Focus::Presets => self.handle_presets_input(key),
            (KeyCode::Enter, _) => self.submit(),
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                if let Some(field) = self.focused_field() {
                    field.push(c);
                }
            }
            (KeyCode::Backspace, _) => {
                if let Some(field) = self.focused_field() {
                    field.pop();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(f.area());

        let title = Paragraph::new("Quadslator")
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, chunks[0]);

        render_prompt(f, self, chunks[1]);
        render_context(f, self, chunks[2]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(chunks[3]);
        render_presets(f, self, body[0]);
        render_results(f, self, body[1]);

        render_notification(f, self, chunks[4]);

        let help_text = match self.input_mode {
            InputMode::Editing => {
                "Tab: Focus, Enter: Translate/Load, d: Delete context, Ctrl+S: Save context, F1-F4: Copy, Esc: Dismiss, Ctrl+Q: Quit"
            }
            InputMode::SavingPreset => "Type a name, Enter: Save, Esc: Cancel",
        };
        let help = Paragraph::new(help_text)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(help, chunks[5]);

        if self.input_mode == InputMode::SavingPreset {
            render_save_dialog(f, self);
        }
    }

    fn update(&mut self, translation_service: &mut TranslationService) {
        loop {
            match translation_service.try_recv_translation() {
                Ok(Some(response)) => {
                    self.controller.complete(response);
                }
                Ok(None) => break,
                Err(e) => {
                    // Nothing will answer the request in flight, so fail it here
                    if let Some(seq) = self.controller.in_flight() {
                        tracing::error!("Translation {} lost: {}", seq, e);
                        self.controller.complete(TranslationResponse {
                            seq,
                            outcome: Err(e),
                        });
                    }
                    break;
                }
            }
        }

        if let Some(job) = self.pending_job.take() {
            let seq = job.seq;
            if let Err(e) = translation_service.request_translation(job) {
                tracing::warn!("Failed to request translation: {}", e);
                self.controller.complete(TranslationResponse {
                    seq,
                    outcome: Err(GenerationError::Unavailable(e.to_string())),
                });
            }
        }
    }
}

fn field_block(title: Line<'static>, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

fn render_prompt(f: &mut Frame, state: &WorkspaceState, area: Rect) {
    let mut title = vec![Span::raw("Your Text")];
    if let Some(error) = state.controller.prompt_error() {
        title.push(Span::styled(
            format!(" - {error}"),
            Style::default().fg(Color::Red),
        ));
    }

    let prompt = if state.controller.prompt.is_empty() {
        Paragraph::new("Enter the text you want to translate...")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(state.controller.prompt.as_str())
    };

    f.render_widget(
        prompt
            .wrap(Wrap { trim: false })
            .block(field_block(Line::from(title), state.focus == Focus::Prompt)),
        area,
    );
}

fn render_context(f: &mut Frame, state: &WorkspaceState, area: Rect) {
    let context = if state.controller.context.is_empty() {
        Paragraph::new("Provide some context (e.g. 'formal email', 'casual chat').")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(state.controller.context.as_str())
    };

    f.render_widget(
        context
            .wrap(Wrap { trim: false })
            .block(field_block(
                Line::from("Context"),
                state.focus == Focus::Context,
            )),
        area,
    );
}

fn render_presets(f: &mut Frame, state: &WorkspaceState, area: Rect) {
    let selected_style = Style::default().fg(Color::Yellow).bg(Color::Blue);
    let normal_style = Style::default().fg(Color::White);
    let focused = state.focus == Focus::Presets;

    let items: Vec<ListItem> = state
        .controller
        .presets()
        .iter()
        .enumerate()
        .map(|(i, preset)| {
            let style = if focused && i == state.selected_preset {
                selected_style
            } else {
                normal_style
            };
            ListItem::new(Line::from(Span::styled(preset.name.clone(), style)))
        })
        .collect();

    let list = List::new(items).block(field_block(Line::from("Saved Contexts"), focused));
    f.render_widget(list, area);
}

fn render_results(f: &mut Frame, state: &WorkspaceState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Translation Results");

    if state.controller.is_submitting() {
        let waiting = Paragraph::new("Generating translations...")
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(waiting, area);
        return;
    }

    let translations = state.controller.translations();
    if translations.is_empty() {
        f.render_widget(block, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);
    let cells: Vec<Rect> = rows
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row)
                .to_vec()
        })
        .collect();

    for (i, (translation, cell)) in translations.iter().zip(cells).enumerate() {
        let card = Paragraph::new(translation.as_str())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Translation #{} (F{})", i + 1, i + 1)),
            );
        f.render_widget(card, cell);
    }
}

fn render_notification(f: &mut Frame, state: &WorkspaceState, area: Rect) {
    let paragraph = match state.controller.current_notification() {
        Some(notification) => {
            let color = match notification.severity {
                Severity::Info => Color::Green,
                Severity::Error => Color::Red,
            };
            Paragraph::new(notification.description.as_str())
                .style(Style::default().fg(color))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(notification.title.as_str()),
                )
        }
        None => Paragraph::new("").block(Block::default().borders(Borders::ALL).title("Status")),
    };
    f.render_widget(paragraph, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn render_save_dialog(f: &mut Frame, state: &WorkspaceState) {
    let area = centered(f.area(), 60, 12);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Save Context")
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    let name = Paragraph::new(state.preset_name_input.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Name"));
    f.render_widget(name, chunks[0]);

    let context = if state.controller.context.is_empty() {
        "No context provided."
    } else {
        state.controller.context.as_str()
    };
    let preview = Paragraph::new(context)
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Context"));
    f.render_widget(preview, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SavedContext;
    use crate::preset_store::PresetStore;
    use crate::translation::TranslationResult;
    use crate::workflow::Phase;
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};

    fn workspace() -> Result<(TempDir, WorkspaceState)> {
        let dir = tempdir()?;
        let controller = WorkflowController::new(JsonFilePresetStore::in_dir(dir.path()));
        Ok((dir, WorkspaceState::new(controller)))
    }

    fn type_text(state: &mut WorkspaceState, text: &str) -> Result<()> {
        for c in text.chars() {
            state.handle_key_event(KeyCode::Char(c), KeyModifiers::NONE)?;
        }
        Ok(())
    }

    fn press(state: &mut WorkspaceState, key: KeyCode) -> Result<Option<AppState>> {
        state.handle_key_event(key, KeyModifiers::NONE)
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_enter_with_empty_prompt_queues_nothing() -> Result<()> {
        let (_dir, mut state) = workspace()?;

        press(&mut state, KeyCode::Enter)?;

        assert!(state.pending_job.is_none());
        assert!(state.controller.prompt_error().is_some());
        assert_eq!(state.controller.phase(), Phase::Idle);
        Ok(())
    }

    #[test]
    fn test_typed_prompt_and_context_are_submitted() -> Result<()> {
        let (_dir, mut state) = workspace()?;

        type_text(&mut state, "Hi there")?;
        press(&mut state, KeyCode::Tab)?;
        type_text(&mut state, "casual")?;
        press(&mut state, KeyCode::Backspace)?;
        press(&mut state, KeyCode::Enter)?;

        let job = state.pending_job.clone().unwrap();
        assert_eq!(job.request.prompt, "Hi there");
        assert_eq!(job.request.context, "casua");
        assert!(state.controller.is_submitting());

        state.controller.complete(TranslationResponse {
            seq: job.seq,
            outcome: TranslationResult::try_from(vec![
                "1".to_string(),
                "2".to_string(),
                "3".to_string(),
                "4".to_string(),
            ]),
        });
        assert_eq!(state.controller.phase(), Phase::Succeeded);
        Ok(())
    }

    #[test]
    fn test_save_dialog_flow() -> Result<()> {
        let (dir, mut state) = workspace()?;
        state.controller.context = "Business email tone".to_string();

        state.handle_key_event(KeyCode::Char('s'), KeyModifiers::CONTROL)?;
        assert_eq!(state.input_mode, InputMode::SavingPreset);

        // Empty name keeps the dialog open
        press(&mut state, KeyCode::Enter)?;
        assert_eq!(state.input_mode, InputMode::SavingPreset);

        type_text(&mut state, "Formal")?;
        press(&mut state, KeyCode::Enter)?;

        assert_eq!(state.input_mode, InputMode::Editing);
        assert!(state.preset_name_input.is_empty());
        assert_eq!(
            JsonFilePresetStore::in_dir(dir.path()).load()?,
            vec![SavedContext::new("Formal", "Business email tone")]
        );
        Ok(())
    }

    #[test]
    fn test_preset_list_select_and_delete() -> Result<()> {
        let dir = tempdir()?;
        let store = JsonFilePresetStore::in_dir(dir.path());
        store.save_all(&[
            SavedContext::new("Formal", "Business email tone"),
            SavedContext::new("Chat", "casual chat"),
        ])?;
        let mut state = WorkspaceState::new(WorkflowController::new(store));

        press(&mut state, KeyCode::BackTab)?;
        assert_eq!(state.focus, Focus::Presets);

        press(&mut state, KeyCode::Down)?;
        press(&mut state, KeyCode::Enter)?;
        assert_eq!(state.controller.context, "casual chat");
        assert_eq!(state.focus, Focus::Context);

        press(&mut state, KeyCode::Tab)?;
        press(&mut state, KeyCode::Char('d'))?;
        assert_eq!(state.selected_preset, 0);
        assert_eq!(
            JsonFilePresetStore::in_dir(dir.path()).load()?,
            vec![SavedContext::new("Formal", "Business email tone")]
        );
        Ok(())
    }

    #[test]
    fn test_escape_dismisses_and_ctrl_q_quits() -> Result<()> {
        let (_dir, mut state) = workspace()?;
        state
            .controller
            .notify(Notification::info("Success", "saved"));

        press(&mut state, KeyCode::Esc)?;
        assert!(state.controller.notifications().is_empty());

        let next = state.handle_key_event(KeyCode::Char('q'), KeyModifiers::CONTROL)?;
        assert!(matches!(next, Some(AppState::Quit)));
        Ok(())
    }

    #[test]
    fn test_render_shows_results_and_dialog() -> Result<()> {
        let (_dir, mut state) = workspace()?;
        state.controller.prompt = "hello".to_string();
        let job = state.controller.submit()?;
        state.controller.complete(TranslationResponse {
            seq: job.seq,
            outcome: TranslationResult::try_from(vec![
                "bonjour".to_string(),
                "salut".to_string(),
                "hola".to_string(),
                "ciao".to_string(),
            ]),
        });

        let mut terminal = Terminal::new(TestBackend::new(120, 40))?;
        terminal.draw(|f| state.render(f))?;
        let results = screen(&terminal);
        assert!(results.contains("Quadslator"));
        assert!(results.contains("Translation #4"));
        assert!(results.contains("bonjour"));

        state.input_mode = InputMode::SavingPreset;
        terminal.draw(|f| state.render(f))?;
        let dialog = screen(&terminal);
        assert!(dialog.contains("Save Context"));
        assert!(dialog.contains("No context provided."));
        Ok(())
    }

    #[test]
    fn test_render_shows_latest_notification() -> Result<()> {
        let (_dir, mut state) = workspace()?;
        state
            .controller
            .notify(Notification::info("Copied!", "Translation copied to clipboard."));
        state.controller.prompt = "hello".to_string();
        let job = state.controller.submit()?;
        state.controller.complete(TranslationResponse {
            seq: job.seq,
            outcome: Err(GenerationError::Disabled),
        });

        let mut terminal = Terminal::new(TestBackend::new(120, 40))?;
        terminal.draw(|f| state.render(f))?;
        let failed = screen(&terminal);
        assert!(failed.contains("Translation Error"));
        assert!(!failed.contains("Copied!"));

        // Dismissing uncovers the older one
        press(&mut state, KeyCode::Esc)?;
        terminal.draw(|f| state.render(f))?;
        assert!(screen(&terminal).contains("Copied!"));
        Ok(())
    }

    #[tokio::test]
    async fn test_stopped_worker_fails_request_in_flight() -> Result<()> {
        let (_dir, mut state) = workspace()?;
        // Takes one job, then stops without answering
        let mut service = TranslationService::spawn_worker(|mut rx, tx| async move {
            let _ = rx.recv().await;
            drop(tx);
        });

        type_text(&mut state, "hello")?;
        press(&mut state, KeyCode::Enter)?;
        assert!(state.controller.is_submitting());

        tokio::time::timeout(Duration::from_secs(5), async {
            while state.controller.phase() != Phase::Failed {
                state.update(&mut service);
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await?;

        assert!(!state.controller.is_submitting());
        assert!(matches!(
            state.controller.last_error(),
            Some(GenerationError::Unavailable(_))
        ));

        // The form accepts the next submission instead of reporting busy
        press(&mut state, KeyCode::Enter)?;
        assert!(state.controller.is_submitting());
        state.update(&mut service);
        assert_eq!(state.controller.phase(), Phase::Failed);
        Ok(())
    }
}
