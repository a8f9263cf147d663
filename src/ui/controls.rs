use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use super::theme::Theme;

/// Which set of key hints applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintContext {
    Grid,
    Searching,
    Detail { player_open: bool },
}

fn build_hint_spans(context: HintContext, audio_enabled: bool, theme: &Theme) -> Vec<Span<'static>> {
    let key_style = Style::default().fg(Color::Black).bg(theme.secondary);
    let key = |k: &'static str| Span::styled(format!(" {k} "), key_style);
    let label = |l: &'static str| Span::raw(format!(" {l}  "));

    let mut spans = Vec::new();
    match context {
        HintContext::Grid => spans.extend([
            key("←↑↓→"),
            label("Move"),
            key("Enter"),
            label("Open"),
            key("/"),
            label("Search"),
        ]),
        HintContext::Searching => spans.extend([
            key("type"),
            label("Query"),
            key("Ctrl-U"),
            label("Clear"),
            key("Enter"),
            label("Open"),
            key("Esc"),
            label("Close search"),
        ]),
        HintContext::Detail { player_open } => {
            spans.extend([key("↑/↓"), label("Choose"), key("Enter"), label("Listen")]);
            spans.extend([key("n"), label("Narration")]);
            if player_open {
                spans.extend([
                    key("Space"),
                    label("Play/Pause"),
                    key("←/→"),
                    label("Seek ±5s"),
                    key("r"),
                    label("Restart"),
                    key("x"),
                    label("Close player"),
                ]);
            }
            spans.extend([key("Esc"), label("Back")]);
        }
    }
    if context != HintContext::Searching {
        spans.extend([
            key("m"),
            label(if audio_enabled { "Sound On" } else { "Sound Off" }),
            key("g"),
            label("Language"),
            key("t"),
            label("Theme"),
            key("h"),
            label("Home"),
            key("q"),
            label("Quit"),
        ]);
    }
    spans
}

/// Wrap spans into lines, breaking at group boundaries (every 2 spans = key + label).
fn wrap_lines(spans: Vec<Span<'static>>, inner_w: usize) -> Vec<Line<'static>> {
    if inner_w == 0 {
        return vec![Line::from(spans)];
    }
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_w: usize = 0;
    for chunk in spans.chunks(2) {
        let group_w: usize = Line::from(chunk.to_vec()).width();
        if current_w + group_w > inner_w && current_w > 0 {
            lines.push(Line::from(std::mem::take(&mut current)));
            current_w = 0;
        }
        current.extend(chunk.iter().cloned());
        current_w += group_w;
    }
    if !current.is_empty() {
        lines.push(Line::from(current));
    }
    lines
}

pub fn controls_height(width: u16, context: HintContext, audio_enabled: bool, theme: &Theme) -> u16 {
    let spans = build_hint_spans(context, audio_enabled, theme);
    let lines = wrap_lines(spans, width.saturating_sub(2) as usize);
    lines.len() as u16 + 2 // +2 for borders
}

pub fn draw_controls(
    frame: &mut Frame,
    area: Rect,
    context: HintContext,
    audio_enabled: bool,
    theme: &Theme,
) {
    let spans = build_hint_spans(context, audio_enabled, theme);
    let lines = wrap_lines(spans, area.width.saturating_sub(2) as usize);
    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.dimmed)),
    );
    frame.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::{HintContext, build_hint_spans, controls_height, wrap_lines};
    use crate::ui::theme::THEMES;

    #[test]
    fn wrapping_never_splits_key_from_label() {
        let spans = build_hint_spans(HintContext::Grid, true, &THEMES[0]);
        for line in wrap_lines(spans, 20) {
            assert_eq!(line.spans.len() % 2, 0);
        }
    }

    #[test]
    fn narrow_terminal_needs_more_rows() {
        let theme = &THEMES[0];
        let ctx = HintContext::Detail { player_open: true };
        assert!(controls_height(40, ctx, true, theme) > controls_height(400, ctx, true, theme));
        assert_eq!(controls_height(400, ctx, true, theme), 3);
    }

    #[test]
    fn player_keys_only_when_player_open() {
        let theme = &THEMES[0];
        let text = |open| {
            build_hint_spans(HintContext::Detail { player_open: open }, true, theme)
                .iter()
                .map(|s| s.content.to_string())
                .collect::<String>()
        };
        assert!(text(true).contains("Restart"));
        assert!(!text(false).contains("Restart"));
    }
}
