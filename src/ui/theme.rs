use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

pub struct Theme {
    pub name: &'static str,
    pub accent: Color,
    pub secondary: Color,
    pub positive: Color,
    pub negative: Color,
    pub text: Color,
    pub dimmed: Color,
}

pub const THEMES: &[Theme] = &[
    Theme {
        name: "Rainbow",
        accent: Color::Rgb(192, 132, 252),
        secondary: Color::Rgb(244, 114, 182),
        positive: Color::Rgb(96, 165, 250),
        negative: Color::Rgb(239, 68, 68),
        text: Color::White,
        dimmed: Color::DarkGray,
    },
    Theme {
        name: "Default",
        accent: Color::Cyan,
        secondary: Color::Yellow,
        positive: Color::Green,
        negative: Color::Red,
        text: Color::White,
        dimmed: Color::DarkGray,
    },
    Theme {
        name: "Sunny",
        accent: Color::Rgb(250, 204, 21),
        secondary: Color::Rgb(251, 146, 60),
        positive: Color::Rgb(163, 230, 53),
        negative: Color::Rgb(220, 38, 38),
        text: Color::White,
        dimmed: Color::DarkGray,
    },
    Theme {
        name: "Ocean",
        accent: Color::Rgb(56, 189, 248),
        secondary: Color::Rgb(45, 212, 191),
        positive: Color::Rgb(134, 239, 172),
        negative: Color::Rgb(251, 113, 133),
        text: Color::White,
        dimmed: Color::DarkGray,
    },
    Theme {
        name: "Catppuccin",
        accent: Color::Rgb(203, 166, 247),
        secondary: Color::Rgb(249, 226, 175),
        positive: Color::Rgb(166, 227, 161),
        negative: Color::Rgb(243, 139, 168),
        text: Color::White,
        dimmed: Color::DarkGray,
    },
    Theme {
        name: "Gruvbox",
        accent: Color::Rgb(214, 153, 62),
        secondary: Color::Rgb(250, 189, 47),
        positive: Color::Rgb(152, 151, 26),
        negative: Color::Rgb(204, 36, 29),
        text: Color::White,
        dimmed: Color::DarkGray,
    },
];

/// Palette at `index`, or the first one if the stored index is out of range.
pub fn theme(index: usize) -> &'static Theme {
    THEMES.get(index).unwrap_or(&THEMES[0])
}

pub fn draw_theme_selector(frame: &mut Frame, selected: usize) {
    let area = frame.area();
    let popup_w = 36u16.min(area.width);
    let popup_h = (THEMES.len() as u16 + 2).min(area.height);
    let popup_area = Rect::new(
        area.width.saturating_sub(popup_w) / 2,
        area.height.saturating_sub(popup_h) / 2,
        popup_w,
        popup_h,
    );

    frame.render_widget(Clear, popup_area);

    let current = theme(selected);
    let lines: Vec<Line> = THEMES
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let is_sel = i == selected;
            let name_style = if is_sel {
                Style::default()
                    .fg(Color::Black)
                    .bg(t.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(t.text)
            };
            Line::from(vec![
                Span::styled(if is_sel { " ▶ " } else { "   " }, Style::default().fg(t.accent)),
                Span::styled(format!("{:<12}", t.name), name_style),
                Span::raw(" "),
                Span::styled("██", Style::default().fg(t.accent)),
                Span::styled("██", Style::default().fg(t.secondary)),
                Span::styled("██", Style::default().fg(t.positive)),
            ])
        })
        .collect();

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(current.accent))
            .title(" Theme ")
            .title_bottom(" ↑/↓ Enter Esc "),
    );
    frame.render_widget(popup, popup_area);
}

#[cfg(test)]
mod tests {
    use super::{THEMES, theme};

    #[test]
    fn out_of_range_index_falls_back_to_first_theme() {
        assert_eq!(theme(THEMES.len() + 5).name, THEMES[0].name);
        assert_eq!(theme(1).name, THEMES[1].name);
    }
}
