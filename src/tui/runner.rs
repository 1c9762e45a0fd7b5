use std::io::Stdout;
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::prelude::*;
use tokio::runtime::Handle;
use tracing::debug;

use super::dashboard::render_dashboard;
use crate::controller::DashboardController;
use crate::redirect::UiEvent;
use crate::state::SharedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    RedirectedToLogin,
}

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &SharedState,
    controller: &Arc<DashboardController>,
    handle: &Handle,
    events: &std_mpsc::Receiver<UiEvent>,
) -> Result<ExitReason> {
    let mut show_help = false;
    let mut tick: usize = 0;

    loop {
        if let Ok(UiEvent::RedirectToLogin) = events.try_recv() {
            return Ok(ExitReason::RedirectedToLogin);
        }

        {
            let snapshot = state.blocking_read();
            terminal.draw(|f| render_dashboard(f, &snapshot, show_help, tick / 5))?;
        }
        tick = tick.wrapping_add(1);

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if state.blocking_read().has_alert() {
                    if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                        state.blocking_write().dismiss_alert();
                    }
                    continue;
                }

                if show_help {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?')) {
                        show_help = false;
                    }
                    continue;
                }

                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(ExitReason::Quit),
                    KeyCode::Char('?') => show_help = true,
                    KeyCode::Char('r') => {
                        if !state.blocking_read().loading {
                            debug!("manual refresh");
                            let controller = controller.clone();
                            handle.spawn(async move {
                                controller.refresh().await;
                            });
                        }
                    }
                    KeyCode::Char('L') => {
                        let controller = controller.clone();
                        handle.spawn(async move {
                            controller.logout().await;
                        });
                    }
                    _ => {}
                }
            }
        }
    }
}
