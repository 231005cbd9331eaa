use crate::application::{App, Focus, Level};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SPINNER: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
const MAX_TOASTS: usize = 3;

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, chunks[0]);
    render_account_line(f, app, chunks[1]);
    render_form(f, app, chunks[2]);
    render_status_bar(f, app, chunks[3]);
    render_toasts(f, app);

    if app.show_help {
        render_help_popup(f);
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new("lpool - Manage Liquidity Pool | F1: help | Ctrl+Q: quit")
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_account_line(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.public_key() {
        Some(pk) => format!("Account: {}", pk),
        None => "Account: (no keypair)".to_string(),
    };
    f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Yellow)), area);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            Focus::ORDER
                .iter()
                .map(|_| Constraint::Length(3))
                .chain(std::iter::once(Constraint::Min(0)))
                .collect::<Vec<_>>(),
        )
        .split(area);

    for (focus, row) in Focus::ORDER.iter().zip(rows.iter()) {
        match focus.action() {
            Some(_) => render_button(f, app, *focus, *row),
            None => render_field(f, app, *focus, *row),
        }
    }
}

fn render_button(f: &mut Frame, app: &App, focus: Focus, area: Rect) {
    let busy = focus.action().is_some_and(|a| app.loading.get(a));
    let label = if busy {
        format!("{} Working...", SPINNER[app.tick % SPINNER.len()])
    } else {
        focus.label().to_string()
    };

    let style = if busy {
        Style::default().fg(Color::DarkGray)
    } else if app.focus == focus {
        Style::default()
            .bg(Color::White)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let button = Paragraph::new(Line::from(label).centered())
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(button, area);
}

fn render_field(f: &mut Frame, app: &App, focus: Focus, area: Rect) {
    let value = app.field_value(focus).unwrap_or_default();
    let focused = app.focus == focus;

    let mut spans = vec![Span::raw(value.to_string())];
    if focused {
        spans.push(Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)));
    }

    let border_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    let field = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(focus.label()),
    );
    f.render_widget(field, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let text = if app.log.is_empty() {
        "Tab/Shift+Tab: move | Enter: press button | F2-F5: actions | Ctrl+K: copy key | Ctrl+L: copy link".to_string()
    } else {
        app.log.clone()
    };
    let style = match app.notifications.last().map(|n| n.level) {
        Some(Level::Error) if !app.log.is_empty() => Style::default().fg(Color::Red),
        Some(Level::Success) if !app.log.is_empty() => Style::default().fg(Color::Green),
        _ => Style::default(),
    };
    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);
}

fn render_toasts(f: &mut Frame, app: &App) {
    let area = f.area();
    let width = (area.width / 2).clamp(20, 64).min(area.width);
    let mut y = area.y + 1;

    for toast in app.notifications.visible(MAX_TOASTS) {
        let mut lines = vec![Line::from(toast.message.clone())];
        if let Some(link) = &toast.link {
            lines.push(Line::from(Span::styled(
                format!("View Transaction: {}", link),
                Style::default().add_modifier(Modifier::UNDERLINED),
            )));
        }
        // borders plus a rough estimate of wrapped lines
        let inner = width.saturating_sub(2).max(1) as usize;
        let text_rows: usize = lines.iter().map(|l| l.width().div_ceil(inner).max(1)).sum();
        let height = (text_rows as u16 + 2).min(area.height.saturating_sub(y));
        if height < 3 {
            break;
        }

        let toast_area = Rect {
            x: area.x + area.width - width,
            y,
            width,
            height,
        };
        let color = match toast.level {
            Level::Info => Color::Cyan,
            Level::Success => Color::Green,
            Level::Error => Color::Red,
        };
        f.render_widget(Clear, toast_area);
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)))
                .style(Style::default().fg(color)),
            toast_area,
        );
        y += height;
    }
}

fn render_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);
    let help_widget = Paragraph::new(get_help_text())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("lpool Help")
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));
    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> &'static str {
    r#"LIQUIDITY POOL MANAGER

=== WORKFLOW ===
1. Generate Keypair      creates a fresh testnet account key
2. Fund Account          asks Friendbot to fund the account
3. Create Liquidity Pool issues the asset named in "Asset Name" from your
                         account and deposits Token A (XLM) and Token B into
                         the XLM/asset pool (fee 30 bps, price bound 1:1)
4. Withdraw from Pool    redeems "Withdraw Amount" pool shares from the pool
                         in "Liquidity Pool ID" (filled in after step 3)

=== KEYS ===
Tab / Down       Next field or button
Shift+Tab / Up   Previous field or button
Enter            Press the focused button
F2 .. F5         Press Generate / Fund / Create / Withdraw directly
Ctrl+K           Copy the public key to the clipboard
Ctrl+L           Copy the last transaction link to the clipboard
F1 / Esc         Close this help
Ctrl+Q           Quit

Keys and pool ids live only for this session."#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Action;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_renders_form() {
        let app = App::default();
        let text = screen(&app);
        assert!(text.contains("Manage Liquidity Pool"));
        assert!(text.contains("Generate Keypair"));
        assert!(text.contains("Asset Name"));
        assert!(text.contains("(no keypair)"));
    }

    #[test]
    fn test_busy_button_shows_spinner() {
        let mut app = App::default();
        app.loading.set(Action::FundAccount, true);
        let text = screen(&app);
        assert!(text.contains("Working..."));
        assert!(!text.contains("Fund Account"));
    }

    #[test]
    fn test_toast_and_status_shown() {
        let mut app = App::default();
        app.notify(Level::Error, "Please generate a keypair first.", None);
        let text = screen(&app);
        assert!(text.matches("Please generate a keypair first.").count() >= 2);
    }

    #[test]
    fn test_help_popup() {
        let mut app = App::default();
        app.show_help = true;
        assert!(screen(&app).contains("lpool Help"));
    }
}
