use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::{Block, Widget},
};

/// Width of the sweeping segment drawn while a clip is still loading.
const SWEEP_WIDTH: usize = 6;

/// One-line progress bar with rounded ends.
///
/// In loading mode the ratio is ignored and a short segment sweeps across
/// the bar, advanced by the caller's tick counter.
pub struct RoundedGauge<'a> {
    ratio: f64,
    filled_color: Color,
    dimmed_color: Color,
    loading_tick: Option<usize>,
    block: Option<Block<'a>>,
}

impl<'a> RoundedGauge<'a> {
    pub fn new(ratio: f64, filled_color: Color) -> Self {
        RoundedGauge {
            ratio: if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) },
            filled_color,
            dimmed_color: Color::DarkGray,
            loading_tick: None,
            block: None,
        }
    }

    pub fn dimmed_color(mut self, color: Color) -> Self {
        self.dimmed_color = color;
        self
    }

    pub fn loading(mut self, tick: usize) -> Self {
        self.loading_tick = Some(tick);
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

/// Glyph for column `col` of a `width`-wide bar whose cells `[lo, hi)` are lit.
fn cell(col: usize, width: usize, lo: usize, hi: usize) -> (char, bool) {
    let lit = col >= lo && col < hi;
    let ch = match (lit, col) {
        (true, c) if c == lo && c == 0 => '╺',
        (true, c) if c + 1 == hi && hi < width => '╸',
        (true, _) => '━',
        (false, 0) => '╶',
        (false, c) if c + 1 == width => '╴',
        (false, _) => '─',
    };
    (ch, lit)
}

impl Widget for RoundedGauge<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner.width < 2 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let (lo, hi) = match self.loading_tick {
            Some(tick) => {
                let span = width + SWEEP_WIDTH;
                let head = tick % span;
                (head.saturating_sub(SWEEP_WIDTH), head.min(width))
            }
            None => (0, (self.ratio * width as f64).round() as usize),
        };

        for col in 0..width {
            let (ch, lit) = cell(col, width, lo, hi);
            let fg = if lit { self.filled_color } else { self.dimmed_color };
            buf[(inner.x + col as u16, inner.y)]
                .set_char(ch)
                .set_fg(fg)
                .set_bg(Color::Reset);
        }
    }
}
