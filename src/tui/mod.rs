use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{Frame, Terminal, backend::Backend};
use std::time::Duration;

use crate::translation_service::TranslationService;

pub mod workspace;

use workspace::WorkspaceState;

pub enum AppState {
    Workspace(WorkspaceState),
    Quit,
}

pub trait State {
    fn handle_key_event(
        &mut self,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<Option<AppState>>;
    fn render(&self, f: &mut Frame);
    fn update(&mut self, translation_service: &mut TranslationService);
}

pub struct TuiApp {
    pub state: AppState,
    pub translation_service: TranslationService,
}

impl TuiApp {
    pub fn new(workspace: WorkspaceState, translation_service: TranslationService) -> Self {
        Self {
            state: AppState::Workspace(workspace),
            translation_service,
        }
    }

    pub fn handle_key_event(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        let new_state = match &mut self.state {
            AppState::Workspace(workspace) => workspace.handle_key_event(key, modifiers)?,
            AppState::Quit => None,
        };

        if let Some(new_state) = new_state {
            self.state = new_state;
        }

        Ok(())
    }

    pub fn render(&self, f: &mut Frame) {
        match &self.state {
            AppState::Workspace(workspace) => workspace.render(f),
            AppState::Quit => {}
        }
    }

    pub fn update(&mut self) {
        if let AppState::Workspace(workspace) = &mut self.state {
            workspace.update(&mut self.translation_service);
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            // Apply finished translations and dispatch queued submissions
            self.update();

            terminal.draw(|f| self.render(f))?;

            if matches!(self.state, AppState::Quit) {
                break;
            }

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key.code, key.modifiers)?;
                    }
                }
            }
        }
        Ok(())
    }
}
