use crate::ui::conversation::{ControllerAction, ConversationController};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::info;

/// Redraw cadence; also how often a finished request is noticed.
const TICK: Duration = Duration::from_millis(100);

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Take over the terminal and run the chat until the user quits
pub async fn run(mut controller: ConversationController) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!(persona = controller.session().persona().name, "chat started");
    let result = event_loop(&mut terminal, &mut controller).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor()?;
    info!("chat ended");

    result
}

async fn event_loop(terminal: &mut Tui, controller: &mut ConversationController) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            let area = frame.size();
            controller.render(area, frame.buffer_mut());
        })?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if is_interrupt(&key) => break,
                Event::Key(key) => {
                    if controller.handle_key(key) == ControllerAction::Exit {
                        break;
                    }
                }
                Event::Paste(text) => controller.handle_paste(&text),
                _ => {}
            }
        }

        controller.poll_completion();
        tokio::task::yield_now().await;
    }

    Ok(())
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_interrupts() {
        assert!(is_interrupt(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_interrupt(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
