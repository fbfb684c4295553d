//! Read-only projection of the session onto the terminal.

use crate::app::App;
use crate::theme::{icons, pulse_theme, PulseTheme};
use kairos_core::display::{
    activity_label, countdown_label, explorer_url, format_profit, log_tone, profit_tone,
    trade_status_tone, EXPLORER_PLACEHOLDER,
};
use kairos_core::{AgentAction, Notification, Trade};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const NOTIFICATION_WIDTH: u16 = 44;
const NOTIFICATION_HEIGHT: u16 = 3;
const TRADE_LINES: u16 = 2;
const NETWORKS: [(&str, &str); 3] = [
    ("Polygon Amoy", "Connected"),
    ("Hedera Testnet", "Connected"),
    ("1inch API", "Active"),
];

pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.size();
    let theme = pulse_theme();
    frame.render_widget(Block::default().style(Style::new().bg(theme.bg)), size);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(size);

    frame.render_widget(render_header(app, theme), layout[0]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(layout[1]);
    frame.render_widget(render_control(app, theme), top[0]);
    frame.render_widget(render_balances(app, theme), top[1]);
    frame.render_widget(render_networks(theme), top[2]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[2]);
    render_trades(frame, app, theme, bottom[0]);
    render_logs(frame, app, theme, bottom[1]);

    frame.render_widget(render_status_bar(app, theme), layout[3]);

    render_notifications(frame, app.notifications.visible(), theme, size);
    if app.help_open {
        render_help_overlay(frame, theme);
    }
}

fn panel(title: &str, theme: PulseTheme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border())
        .title(Span::styled(format!(" {title} "), theme.panel_title()))
        .style(Style::new().bg(theme.surface).fg(theme.text))
}

fn render_header(app: &App, theme: PulseTheme) -> Paragraph<'static> {
    let running = app.agent().running;
    let activity_color = if running { theme.ok } else { theme.critical };
    let line = Line::from(vec![
        Span::styled(
            "Kairos Agent",
            Style::new().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} {}", icons::DOT, activity_label(running)),
            Style::new().fg(activity_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(app.api_url.clone(), Style::new().fg(theme.muted)),
    ]);
    Paragraph::new(line).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(theme.panel_border())
            .style(Style::new().bg(theme.bg).fg(theme.text)),
    )
}

fn render_control(app: &App, theme: PulseTheme) -> Paragraph<'static> {
    let agent = app.agent();
    let action = AgentAction::toggle_for(agent.running);
    let (label, color) = match action {
        AgentAction::Start => ("Start Agent", theme.ok),
        AgentAction::Stop => ("Stop Agent", theme.critical),
    };
    let pending = if app.controller.is_pending(action) {
        " (sending...)"
    } else {
        ""
    };
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("[Enter] {label}"),
            Style::new().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(pending, Style::new().fg(theme.muted)),
    ])];
    if let Some(countdown) = countdown_label(agent.running, agent.time_until_next) {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Next execution in: ", Style::new().fg(theme.muted)),
            Span::styled(
                countdown,
                Style::new().fg(theme.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {}", icons::CLOCK), Style::new().fg(theme.muted)),
        ]));
        if !agent.next_run.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("scheduled at {}", agent.next_run),
                Style::new().fg(theme.muted),
            )));
        }
    }
    Paragraph::new(lines).block(panel("Agent Control", theme))
}

fn render_balances(app: &App, theme: PulseTheme) -> Paragraph<'static> {
    let agent = app.agent();
    let lines = vec![
        balance_line("Polygon (WETH)", agent.polygon_balance.clone(), theme),
        balance_line("Hedera (HBAR)", agent.hedera_balance.clone(), theme),
        Line::from(""),
        Line::from(vec![
            Span::styled("Total Profit    ", Style::new().fg(theme.muted)),
            Span::styled(
                format!("{} ETH", format_profit(agent.total_profit)),
                Style::new()
                    .fg(theme.tone(profit_tone(agent.total_profit)))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    Paragraph::new(lines).block(panel("Account Balances", theme))
}

fn balance_line(label: &str, value: String, theme: PulseTheme) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<16}"), Style::new().fg(theme.muted)),
        Span::styled(value, Style::new().add_modifier(Modifier::BOLD)),
    ])
}

fn render_networks(theme: PulseTheme) -> Paragraph<'static> {
    let dots = [
        theme.network(&kairos_core::Network::Polygon),
        theme.info,
        theme.warn,
    ];
    let lines: Vec<Line<'static>> = NETWORKS
        .iter()
        .zip(dots)
        .map(|((name, state), dot)| {
            Line::from(vec![
                Span::styled(format!("{} ", icons::DOT), Style::new().fg(dot)),
                Span::raw(format!("{name:<16}")),
                Span::styled(*state, Style::new().fg(theme.ok)),
            ])
        })
        .collect();
    Paragraph::new(lines).block(panel("Network Status", theme))
}

fn render_trades(frame: &mut Frame, app: &App, theme: PulseTheme, area: Rect) {
    let block = panel("Recent Trades", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let trades = &app.agent().recent_trades;
    if trades.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No recent trades",
            Style::new().fg(theme.muted),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    let mut lines = Vec::with_capacity(trades.len() * TRADE_LINES as usize);
    for (index, trade) in trades.iter().enumerate() {
        lines.extend(trade_lines(trade, index == app.selected_trade, theme));
    }
    let selected_bottom = u16::try_from(app.selected_trade)
        .unwrap_or(u16::MAX)
        .saturating_add(1)
        .saturating_mul(TRADE_LINES);
    let offset = selected_bottom.saturating_sub(inner.height);
    frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), inner);
}

fn trade_lines(trade: &Trade, selected: bool, theme: PulseTheme) -> [Line<'static>; 2] {
    let marker = if selected { icons::SELECTED } else { " " };
    let status_color = theme.tone(trade_status_tone(&trade.status));
    let label_modifier = if selected {
        Modifier::BOLD | Modifier::REVERSED
    } else {
        Modifier::BOLD
    };
    let mut header = vec![
        Span::styled(format!("{marker} "), Style::new().fg(theme.accent)),
        Span::styled(
            format!("{} ", icons::DOT),
            Style::new().fg(theme.network(&trade.network)),
        ),
        Span::styled(trade.network.label(), Style::new().add_modifier(label_modifier)),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", trade.status.as_str()),
            Style::new().fg(status_color),
        ),
        Span::raw(" "),
        Span::styled(
            format_profit(trade.profit),
            Style::new()
                .fg(theme.tone(profit_tone(trade.profit)))
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(kind) = &trade.kind {
        header.push(Span::styled(format!("  {kind}"), Style::new().fg(theme.muted)));
    }

    let link = match explorer_url(&trade.network, &trade.tx_hash) {
        Some(url) => Span::styled(
            format!("{} {url}", icons::LINK),
            Style::new().fg(theme.accent),
        ),
        None => Span::styled(
            format!("{} {EXPLORER_PLACEHOLDER}", icons::LINK),
            Style::new()
                .fg(theme.muted)
                .add_modifier(Modifier::DIM | Modifier::CROSSED_OUT),
        ),
    };
    let detail = Line::from(vec![
        Span::raw("    "),
        Span::styled(trade.amount.clone(), Style::new().fg(theme.muted)),
        Span::raw("  "),
        link,
    ]);
    [Line::from(header), detail]
}

fn render_logs(frame: &mut Frame, app: &App, theme: PulseTheme, area: Rect) {
    let block = panel("Live Logs", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let logs = &app.agent().logs;
    if logs.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No logs available",
            Style::new().fg(theme.muted),
        )));
        frame.render_widget(empty, inner);
        return;
    }

    // Newest entries stay in view.
    let skip = logs.len().saturating_sub(inner.height as usize);
    let lines: Vec<Line<'static>> = logs
        .iter()
        .skip(skip)
        .map(|entry| {
            Line::from(vec![
                Span::styled(entry.timestamp.clone(), Style::new().fg(theme.muted)),
                Span::raw(" "),
                Span::styled(
                    format!("[{}]", entry.level.tag()),
                    Style::new().fg(theme.tone(log_tone(&entry.level))),
                ),
                Span::raw(" "),
                Span::raw(entry.message.clone()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_status_bar(app: &App, theme: PulseTheme) -> Paragraph<'static> {
    let poll_color = if app.poll_health.last_error.is_some() {
        theme.warn
    } else {
        theme.muted
    };
    let mut spans = vec![Span::styled(app.poll_summary(), Style::new().fg(poll_color))];
    if let Some(note) = &app.status_note {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(note.clone(), Style::new().fg(theme.text)));
    }
    spans.push(Span::styled(
        "  s start  x stop  1-3 dismiss  j/k/g select  r refresh  ? help  q quit",
        Style::new().fg(theme.muted),
    ));
    Paragraph::new(Line::from(spans)).style(Style::new().bg(theme.bg))
}

fn render_notifications(
    frame: &mut Frame,
    visible: &[Notification],
    theme: PulseTheme,
    area: Rect,
) {
    let width = NOTIFICATION_WIDTH.min(area.width);
    let x = area.x + area.width.saturating_sub(width + 1);
    for (position, note) in visible.iter().enumerate() {
        let y = area.y + 1 + position as u16 * NOTIFICATION_HEIGHT;
        if y + NOTIFICATION_HEIGHT > area.y + area.height {
            break;
        }
        let rect = Rect::new(x, y, width, NOTIFICATION_HEIGHT);
        let style = theme.notification(note.kind);
        let body = Paragraph::new(Line::from(note.message.clone())).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" [{}] x ", position + 1))
                .title_alignment(Alignment::Right)
                .style(style),
        );
        frame.render_widget(Clear, rect);
        frame.render_widget(body, rect);
    }
}

fn render_help_overlay(frame: &mut Frame, theme: PulseTheme) {
    let area = centered_rect(60, 60, frame.size());
    let key = |keys: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(format!("{keys:<12}"), Style::new().fg(theme.accent)),
            Span::raw(text),
        ])
    };
    let lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::new().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        key("Enter/Space", "Start or stop the agent"),
        key("s / x", "Start / stop the agent"),
        key("1 2 3", "Dismiss notification by position"),
        key("d", "Dismiss newest notification"),
        key("j / k", "Select trade"),
        key("g", "Jump to first trade"),
        key("o", "Open selected trade in explorer"),
        key("r", "Refresh status now"),
        key("? / F1", "Toggle help"),
        key("q / Esc", "Quit"),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel("Help", theme)),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use kairos_core::{AgentState, LogEntry, LogLevel, Network, NotificationKind, TradeStatus};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use std::time::Instant;

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(140, 40);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| render(frame, app)).expect("draw");
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    fn app_with(state: AgentState) -> App {
        let mut app = App::new("http://localhost:8000/api");
        app.apply_status(1, Ok(state), Local::now());
        app
    }

    fn trade(id: &str, network: Network, profit: f64) -> Trade {
        Trade {
            id: id.to_string(),
            network,
            status: TradeStatus::Pending,
            amount: "1 WETH".to_string(),
            profit,
            tx_hash: format!("0x{id}"),
            kind: Some("arbitrage".to_string()),
            timestamp: None,
        }
    }

    #[test]
    fn countdown_only_rendered_while_running() {
        let running = draw(&app_with(AgentState {
            running: true,
            time_until_next: 125,
            ..AgentState::default()
        }));
        assert!(running.contains("ACTIVE"));
        assert!(running.contains("Next execution in: 2:05"));
        assert!(running.contains("Stop Agent"));

        let stopped = draw(&app_with(AgentState {
            running: false,
            time_until_next: 125,
            ..AgentState::default()
        }));
        assert!(stopped.contains("INACTIVE"));
        assert!(!stopped.contains("Next execution in"));
        assert!(stopped.contains("Start Agent"));
    }

    #[test]
    fn trades_render_signed_profit_and_links() {
        let text = draw(&app_with(AgentState {
            total_profit: -0.5,
            recent_trades: vec![
                trade("aa", Network::Polygon, -0.5),
                trade("bb", Network::Hedera, 0.0),
                trade("cc", Network::Unknown("solana".to_string()), 0.05),
            ],
            ..AgentState::default()
        }));
        assert!(text.contains("-0.5000"));
        assert!(text.contains("+0.0000"));
        assert!(text.contains("-0.5000 ETH"));
        assert!(text.contains("https://amoy.polygonscan.com/tx/0xaa"));
        assert!(text.contains("https://hashscan.io/testnet/transaction/0xbb"));
        assert!(text.contains("Solana"));
        assert!(text.contains(&format!("{} {EXPLORER_PLACEHOLDER}", icons::LINK)));
    }

    #[test]
    fn unknown_log_level_renders_without_panicking() {
        let text = draw(&app_with(AgentState {
            logs: vec![
                LogEntry {
                    timestamp: "10:00:00".to_string(),
                    level: LogLevel::parse("verbose"),
                    message: "odd level".to_string(),
                },
                LogEntry {
                    timestamp: "10:00:01".to_string(),
                    level: LogLevel::Error,
                    message: "Failed to fetch quote".to_string(),
                },
            ],
            ..AgentState::default()
        }));
        assert!(text.contains("[VERBOSE] odd level"));
        assert!(text.contains("[ERROR] Failed to fetch quote"));
    }

    #[test]
    fn empty_panels_show_placeholders() {
        let text = draw(&App::new("http://localhost:8000/api"));
        assert!(text.contains("No recent trades"));
        assert!(text.contains("No logs available"));
        assert!(text.contains("connecting..."));
    }

    #[test]
    fn at_most_three_notifications_rendered() {
        let mut app = App::new("http://localhost:8000/api");
        let now = Instant::now();
        for i in 0..5 {
            app.notifications.enqueue(format!("notice-{i}"), NotificationKind::Success, now);
        }
        let text = draw(&app);
        assert!(!text.contains("notice-0"));
        assert!(!text.contains("notice-1"));
        for i in 2..5 {
            assert!(text.contains(&format!("notice-{i}")));
        }
        assert!(text.contains("[3] x"));
        assert!(!text.contains("[4] x"));
    }

    #[test]
    fn huge_trade_selection_does_not_overflow_scroll() {
        let mut app = app_with(AgentState {
            recent_trades: vec![trade("aa", Network::Polygon, 1.0)],
            ..AgentState::default()
        });
        app.selected_trade = usize::from(u16::MAX) + 5;
        let text = draw(&app);
        assert!(text.contains("Recent Trades"));
    }

    #[test]
    fn help_overlay_lists_jump_to_first_trade() {
        let mut app = App::new("http://localhost:8000/api");
        app.help_open = true;
        let text = draw(&app);
        assert!(text.contains("Jump to first trade"));
        assert!(text.contains("j/k/g select"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut app = app_with(AgentState {
            running: true,
            recent_trades: vec![trade("aa", Network::Polygon, 1.0)],
            ..AgentState::default()
        });
        app.help_open = true;
        app.notifications.enqueue("hello", NotificationKind::Failure, Instant::now());
        let backend = TestBackend::new(20, 6);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| render(frame, &app)).expect("draw");
    }
}
