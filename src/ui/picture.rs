//! Instrument pictures rendered as half-block pixel art.

use std::{
    collections::HashMap,
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
};

use {
    ratatui::{
        Frame,
        buffer::Buffer,
        layout::{Alignment, Rect},
        style::{Color, Style},
        widgets::{Paragraph, Widget},
    },
    tracing::warn,
};

use crate::assets::{AssetResolver, fetch_bytes};

pub const PICTURE_ROWS: u16 = 12;
pub const PICTURE_COLS: u16 = PICTURE_ROWS * 2; // 2 cols per row for square aspect

/// Rows of (R, G, B); two pixel rows per terminal row.
pub type Pixels = Vec<Vec<(u8, u8, u8)>>;

fn decode_picture(bytes: &[u8], cols: u16, rows: u16) -> Option<Pixels> {
    let img = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!("Undecodable picture: {e}");
            return None;
        }
    };
    let px_w = cols as u32;
    let px_h = (rows as u32) * 2;
    let rgb = img
        .resize_exact(px_w, px_h, image::imageops::FilterType::Lanczos3)
        .to_rgb8();
    Some(
        (0..px_h)
            .map(|y| {
                (0..px_w)
                    .map(|x| {
                        let p = rgb.get_pixel(x, y);
                        (p[0], p[1], p[2])
                    })
                    .collect()
            })
            .collect(),
    )
}

enum Slot {
    Pending(Receiver<Option<Pixels>>),
    Ready(Pixels),
    Failed,
}

/// Pictures keyed by image reference, fetched on worker threads.
#[derive(Default)]
pub struct PictureCache {
    slots: HashMap<String, Slot>,
}

pub enum Picture<'a> {
    Loading,
    Ready(&'a Pixels),
    Missing,
}

impl PictureCache {
    /// Starts fetching `image_ref` unless it is already known.
    pub fn request(&mut self, image_ref: &str, resolver: &AssetResolver) {
        if self.slots.contains_key(image_ref) {
            return;
        }
        let slot = match resolver.resolve(image_ref) {
            Ok(locator) => {
                let (tx, rx) = mpsc::channel();
                thread::spawn(move || {
                    let pixels = match fetch_bytes(&locator) {
                        Ok(bytes) => decode_picture(&bytes, PICTURE_COLS, PICTURE_ROWS),
                        Err(e) => {
                            warn!("Picture {locator} unavailable: {e}");
                            None
                        }
                    };
                    let _ = tx.send(pixels);
                });
                Slot::Pending(rx)
            }
            Err(e) => {
                warn!("{e}");
                Slot::Failed
            }
        };
        self.slots.insert(image_ref.to_string(), slot);
    }

    /// Collects finished fetches.
    pub fn poll(&mut self) {
        for slot in self.slots.values_mut() {
            let settled = match slot {
                Slot::Pending(rx) => match rx.try_recv() {
                    Ok(Some(pixels)) => Slot::Ready(pixels),
                    Ok(None) | Err(TryRecvError::Disconnected) => Slot::Failed,
                    Err(TryRecvError::Empty) => continue,
                },
                _ => continue,
            };
            *slot = settled;
        }
    }

    pub fn get(&self, image_ref: &str) -> Picture<'_> {
        match self.slots.get(image_ref) {
            Some(Slot::Ready(pixels)) => Picture::Ready(pixels),
            Some(Slot::Failed) => Picture::Missing,
            Some(Slot::Pending(_)) | None => Picture::Loading,
        }
    }
}

struct PixelArt<'a> {
    pixels: &'a [Vec<(u8, u8, u8)>],
}

impl Widget for PixelArt<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let art_rows = self.pixels.len() / 2;
        let art_cols = self.pixels.first().map_or(0, Vec::len);
        let rows = (area.height as usize).min(art_rows);
        let cols = (area.width as usize).min(art_cols);
        for cy in 0..rows {
            for cx in 0..cols {
                let top = self.pixels[cy * 2][cx];
                let bot = self.pixels.get(cy * 2 + 1).map_or(top, |r| r[cx]);
                buf[(area.x + cx as u16, area.y + cy as u16)]
                    .set_char('▀')
                    .set_fg(Color::Rgb(top.0, top.1, top.2))
                    .set_bg(Color::Rgb(bot.0, bot.1, bot.2));
            }
        }
    }
}

/// Draws the picture centred in `area`, or a placeholder glyph.
pub fn draw_picture(frame: &mut Frame, area: Rect, picture: Picture<'_>, dimmed: Color) {
    let w = PICTURE_COLS.min(area.width);
    let h = PICTURE_ROWS.min(area.height);
    let rect = Rect::new(area.x + (area.width - w) / 2, area.y, w, h);
    let glyph = match picture {
        Picture::Ready(pixels) => {
            frame.render_widget(PixelArt { pixels }, rect);
            return;
        }
        Picture::Loading => "…",
        Picture::Missing => "♪",
    };
    let mid = Rect::new(rect.x, rect.y + h / 2, rect.width, 1.min(h));
    frame.render_widget(
        Paragraph::new(glyph)
            .alignment(Alignment::Center)
            .style(Style::default().fg(dimmed)),
        mid,
    );
}
