// SPDX-License-Identifier: GPL-3.0-only

//! Terminal scanner UI
//!
//! Renders the camera preview with Unicode half-block characters, a
//! status bar with the session state and decoded result, transient
//! notification toasts, and a blocking acknowledgment overlay for the
//! submit action.

use crate::camera::{self, FrameSource, ScanFrame};
use crate::config::Config;
use crate::constants::{TICK_INTERVAL, TOAST_DURATION};
use crate::notify::{ChannelNotifier, Notification, Notifier, Severity};
use crate::scanner::{RqrrDecoder, run_tick};
use crate::session::{ScanSession, SubmitOutcome, submit};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    style::Style, widgets::Widget,
};
use std::io::{self, stdout};
use std::sync::{Mutex, mpsc};
use std::time::Instant;
use tracing::info;

/// Run the terminal scanner
pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Mutex::new(ScanSession::new());
    let (toast_tx, toast_rx) = mpsc::channel();
    let notifier = ChannelNotifier::new(toast_tx);
    let decoder = RqrrDecoder::with_max_dimension(config.max_decode_dimension);

    // Acquire the camera once; failure is terminal for the session but
    // the UI stays up to show the state
    let mut stream = match camera::acquire(config) {
        Ok(stream) => {
            info!(device = %stream.device().name, "camera ready");
            session.lock().unwrap().begin_scanning();
            Some(stream)
        }
        Err(e) => {
            session.lock().unwrap().fail_no_camera(&e.to_string());
            notifier.notify(Notification::new(
                Severity::Error,
                "Camera unavailable",
                e.to_string(),
            ));
            None
        }
    };

    let mut frame_widget = FrameWidget::new(config.mirror_preview);
    let mut latest_frame: Option<ScanFrame> = None;
    let mut toast: Option<(Notification, Instant)> = None;
    let mut acknowledgment: Option<String> = None;
    let mut show_help = false;

    loop {
        // Pull the newest frame for both preview and decode
        if let Some(stream) = stream.as_mut()
            && let Some(frame) = stream.latest_frame()
        {
            frame_widget.update_frame(frame.clone());
            latest_frame = Some(frame);
        }

        // One cooperative scan tick per iteration. The acknowledgment
        // overlay blocks everything, like a modal alert
        if acknowledgment.is_none() && session.lock().unwrap().is_scanning() {
            run_tick(&session, latest_frame.as_ref(), &decoder, &notifier);
        }

        // Latest notification wins the toast slot
        while let Ok(notification) = toast_rx.try_recv() {
            toast = Some((notification, Instant::now()));
        }
        if let Some((_, shown_at)) = &toast
            && shown_at.elapsed() > TOAST_DURATION
        {
            toast = None;
        }

        // Draw
        terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status, one above for toasts
            let preview_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(2),
            };
            f.render_widget(&frame_widget, preview_area);

            if let Some((notification, _)) = &toast {
                let toast_area = Rect {
                    x: area.x,
                    y: area.height.saturating_sub(2),
                    width: area.width,
                    height: 1,
                };
                f.render_widget(ToastLine { notification }, toast_area);
            }

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            let session = session.lock().unwrap();
            f.render_widget(
                StatusBar {
                    session: &session,
                    show_help,
                },
                status_area,
            );

            if let Some(payload) = &acknowledgment {
                f.render_widget(AckOverlay { payload: payload.as_str() }, area);
            }
        })?;

        // Handle input with a timeout that doubles as the tick cadence
        if event::poll(TICK_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // The acknowledgment holds until any key is pressed
            if acknowledgment.is_some() {
                acknowledgment = None;
                continue;
            }

            // Ctrl+C to quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }

            match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Enter | KeyCode::Char('s') => {
                    let outcome = {
                        let session = session.lock().unwrap();
                        submit(&session, &notifier)
                    };
                    if let SubmitOutcome::Submitted(payload) = outcome {
                        acknowledgment = Some(payload);
                    }
                }
                KeyCode::Char('h') => show_help = !show_help,
                _ => {}
            }
        }
    }

    Ok(())
}

/// Widget that renders a camera frame using half-block characters
struct FrameWidget {
    frame: Option<ScanFrame>,
    mirror: bool,
}

impl FrameWidget {
    fn new(mirror: bool) -> Self {
        Self { frame: None, mirror }
    }

    fn update_frame(&mut self, frame: ScanFrame) {
        self.frame = Some(frame);
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            // No frame yet - show placeholder
            let msg = "Waiting for camera...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default());
            }
            return;
        };

        if area.width == 0 || area.height == 0 || frame.width == 0 || frame.height == 0 {
            return;
        }

        // Calculate display dimensions maintaining aspect ratio.
        // Each terminal cell shows 2 vertical pixels via half-blocks
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };

        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height * 2) as f64;

        // Upper half (▀) colored with fg, lower half with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let sample_tx = if self.mirror {
                    display_width - 1 - tx
                } else {
                    tx
                };
                let src_x = (sample_tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let (tr, tg, tb) = frame.pixel(src_x, src_y_top);
                let (br, bg_, bb) = frame.pixel(src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(Color::Rgb(tr, tg, tb));
                    cell.set_bg(Color::Rgb(br, bg_, bb));
                }
            }
        }
    }
}

/// Bottom status line: session state on the left, result or key hints
/// on the right
struct StatusBar<'a> {
    session: &'a ScanSession,
    show_help: bool,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let left = format!(
            " {} | {}",
            self.session.status().label(),
            self.session.status_message()
        );
        let right = if self.show_help {
            String::from("Enter/s: Submit | h: Toggle help | q/Ctrl+C: Quit ")
        } else if self.session.decoded_result().is_empty() {
            String::from("'s' submit | 'h' help | 'q' quit ")
        } else {
            format!("Result: {} ", self.session.decoded_result())
        };

        let style = Style::default().fg(Color::White).bg(Color::DarkGray);
        buf.set_string(area.x, area.y, truncate(&left, area.width as usize), style);

        let right = truncate(&right, area.width as usize);
        let right_x = area.x + area.width.saturating_sub(right.chars().count() as u16);
        if right_x > area.x + left.chars().count() as u16 {
            buf.set_string(right_x, area.y, right, style);
        }
    }
}

/// One-line transient notification
struct ToastLine<'a> {
    notification: &'a Notification,
}

impl Widget for ToastLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let color = match self.notification.severity {
            Severity::Info => Color::Blue,
            Severity::Success => Color::Green,
            Severity::Warning => Color::Yellow,
            Severity::Error => Color::Red,
        };

        let text = format!(
            " {}: {}",
            self.notification.title, self.notification.description
        );
        buf.set_string(
            area.x,
            area.y,
            truncate(&text, area.width as usize),
            Style::default().fg(color),
        );
    }
}

/// Centered blocking acknowledgment box shown after a submit
struct AckOverlay<'a> {
    payload: &'a str,
}

impl Widget for AckOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (self.payload.chars().count() as u16 + 6)
            .max(30)
            .min(area.width);
        let height = 5u16.min(area.height);
        if width < 4 || height < 4 {
            return;
        }

        let x = area.x + (area.width - width) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let boxed = Rect {
            x,
            y,
            width,
            height,
        };

        for by in boxed.y..boxed.y + boxed.height {
            for bx in boxed.x..boxed.x + boxed.width {
                if let Some(cell) = buf.cell_mut((bx, by)) {
                    cell.set_char(' ');
                    cell.set_bg(Color::Black);
                    cell.set_fg(Color::White);
                }
            }
        }

        let style = Style::default().fg(Color::White).bg(Color::Black);
        let inner_width = (boxed.width - 2) as usize;
        buf.set_string(
            boxed.x + 1,
            boxed.y + 1,
            truncate("Scan submitted", inner_width),
            style.fg(Color::Green),
        );
        buf.set_string(
            boxed.x + 1,
            boxed.y + 2,
            truncate(self.payload, inner_width),
            style,
        );
        buf.set_string(
            boxed.x + 1,
            boxed.y + 3,
            truncate("Press any key to continue", inner_width),
            style.fg(Color::DarkGray),
        );
    }
}

/// Clip a string to a display width, character-wise
fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
