//! Terminal user interface for the spectrum meter.
//!
//! Owns the alternate screen, reads keys without blocking and draws the bar
//! widget above a one-line status footer.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use std::io::{stdout, Stdout};
use std::time::Duration;

use super::widget::SpectrumWidget;
use crate::analysis::SpectrumSnapshot;
use crate::config::VisualizationSettings;

/// User input command while the meter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterCommand {
    /// No key, or a key without a binding
    Continue,
    /// Leave the meter (Escape, 'q' or Ctrl+C)
    Quit,
    /// Show or hide peak caps ('p')
    TogglePeaks,
}

/// Static facts shown in the footer.
#[derive(Debug, Clone, Default)]
pub struct MeterInfo {
    pub device_name: String,
    pub sample_rate: u32,
    pub fft_size: usize,
    pub bands: usize,
    pub frame_rate: u32,
}

impl MeterInfo {
    fn status_line(&self, show_peaks: bool) -> Line<'static> {
        let peaks = if show_peaks { "on" } else { "off" };
        Line::from(vec![
            Span::styled("● ", Style::default().fg(Color::Green)),
            Span::raw(format!(
                "{} / {}Hz / fft {} / {} bands / {}fps",
                self.device_name, self.sample_rate, self.fft_size, self.bands, self.frame_rate
            )),
            Span::styled(
                format!("   peaks {peaks} (p)  quit (q)"),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }
}

/// Maps a key press to a meter command.
pub fn command_for_key(code: KeyCode, modifiers: KeyModifiers) -> MeterCommand {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => MeterCommand::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => MeterCommand::Quit,
        KeyCode::Char('p') => MeterCommand::TogglePeaks,
        _ => MeterCommand::Continue,
    }
}

/// Terminal UI for the spectrum meter.
pub struct MeterTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    style: VisualizationSettings,
    info: MeterInfo,
}

impl MeterTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new(style: VisualizationSettings, info: MeterInfo) -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        Ok(MeterTui {
            terminal,
            style,
            info,
        })
    }

    /// Returns the command for a pending key press, without waiting for one.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> anyhow::Result<MeterCommand> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let command = command_for_key(key.code, key.modifiers);
                if command != MeterCommand::Continue {
                    tracing::debug!("Key {:?}: {:?}", key.code, command);
                    return Ok(command);
                }
            }
        }
        Ok(MeterCommand::Continue)
    }

    /// Draws one frame.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn draw(&mut self, snapshot: &SpectrumSnapshot, show_peaks: bool) -> anyhow::Result<()> {
        let style = &self.style;
        let status = self.info.status_line(show_peaks);

        self.terminal.draw(|frame| {
            let area = frame.area();
            let footer_height = 1;

            let bars_area = Rect {
                height: area.height.saturating_sub(footer_height),
                ..area
            };
            frame.render_widget(
                SpectrumWidget {
                    bands: &snapshot.bands,
                    peaks: &snapshot.peaks,
                    show_peaks,
                    style,
                },
                bars_area,
            );

            let footer_area = Rect {
                y: area.y + area.height.saturating_sub(footer_height),
                height: footer_height.min(area.height),
                ..area
            };
            let footer = Paragraph::new(status).style(
                Style::default()
                    .fg(Color::Rgb(185, 207, 212))
                    .bg(Color::Rgb(0, 0, 0)),
            );
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
