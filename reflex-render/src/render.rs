use crate::digits::{self, draw_number, number_width};
use crate::palette::{self, Rgba};
use crate::text::{self, TextCache};
use ab_glyph::FontArc;
use anyhow::{Result, anyhow, bail};
use reflex_core::{Millis, ScoreRecord, TrialState};
use std::time::{Duration, Instant};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Transform};

/// Rows shown in the summary view.
pub const SUMMARY_ROWS: usize = 10;

/// Prompt text height as a fraction of the canvas height.
const PROMPT_SIZE: f32 = 0.05;
const PROMPT_LEADING: f32 = 1.4;
const PROMPT_TOP: f32 = 0.74;
const SUMMARY_PROMPT_TOP: f32 = 0.9;

/// What the presentation layer is asked to show
#[derive(Debug, Clone, Copy)]
pub enum View<'a> {
    Trial {
        state: TrialState,
        score: Option<Millis>,
        best: Option<Millis>,
    },
    Summary {
        last: Option<Millis>,
        top: &'a [ScoreRecord],
    },
}

pub struct FrameStats {
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
}

pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),
    canvas: Pixmap,
    /// Prompts are skipped without a font.
    text: Option<TextCache>,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let canvas = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("cannot create {width}x{height} canvas"))?;
        Ok(Self {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            canvas,
            text: None,
        })
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.set_font(font);
        self
    }

    pub fn set_font(&mut self, font: FontArc) {
        let [r, g, b, a] = palette::INK;
        self.text = Some(TextCache::new(font, Color::from_rgba8(r, g, b, a)));
    }

    pub fn has_font(&self) -> bool {
        self.text.is_some()
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let mut text = self.text.take();
        *self = Self::new(width, height)?;
        if let Some(cache) = text.as_mut() {
            cache.clear();
        }
        self.text = text;
        Ok(())
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    /// Draws `view` and copies the canvas into an RGBA frame of the same size.
    pub fn render_frame(&mut self, view: &View, frame_buffer: &mut [u8]) -> Result<FrameStats> {
        if frame_buffer.len() != self.canvas.data().len() {
            bail!(
                "frame buffer is {} bytes, canvas {}x{} needs {}",
                frame_buffer.len(),
                self.width,
                self.height,
                self.canvas.data().len()
            );
        }
        let start = Instant::now();
        self.draw(view);
        let draw = start.elapsed();

        let t = Instant::now();
        frame_buffer.copy_from_slice(self.canvas.data());
        let copy = t.elapsed();

        Ok(FrameStats {
            draw,
            copy,
            total: start.elapsed(),
        })
    }

    pub fn draw(&mut self, view: &View) {
        match *view {
            View::Trial { state, score, best } => {
                self.clear(palette::background(state));
                match state {
                    TrialState::Idle => self.draw_play_arrow(),
                    TrialState::Armed => self.draw_fixation(),
                    TrialState::Reacting => self.draw_cue(),
                    TrialState::Success => {
                        if let Some(ms) = score {
                            self.draw_centered_number(ms, self.center.1, self.height as f32 * 0.2);
                        }
                    }
                    TrialState::Penalty => self.draw_cross(),
                }
                if let Some(ms) = best {
                    let y = self.height as f32 - self.height as f32 * 0.1;
                    self.draw_centered_number_with(ms, y, self.height as f32 * 0.05, palette::BEST);
                }
                self.draw_prompt(text::trial_prompt(state), PROMPT_TOP);
            }
            View::Summary { last, top } => {
                self.clear(palette::SUMMARY);
                self.draw_summary(last, top);
                self.draw_prompt(&[text::SUMMARY_PROMPT], SUMMARY_PROMPT_TOP);
            }
        }
    }

    fn clear(&mut self, rgba: Rgba) {
        self.canvas
            .fill(Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
    }

    fn paint(rgba: Rgba) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.anti_alias = false;
        paint.set_color(Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
        paint
    }

    fn unit(&self) -> f32 {
        self.width.min(self.height) as f32
    }

    fn draw_play_arrow(&mut self) {
        let size = self.unit() * 0.08;
        let (cx, cy) = self.center;
        let mut pb = PathBuilder::new();
        pb.move_to(cx + size, cy);
        pb.line_to(cx - size * 0.6, cy - size);
        pb.line_to(cx - size * 0.6, cy + size);
        pb.close();
        if let Some(path) = pb.finish() {
            self.canvas.fill_path(
                &path,
                &Self::paint(palette::INK),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_fixation(&mut self) {
        let size = self.unit() * 0.06;
        let bar = (size * 0.08).max(2.0);
        let (cx, cy) = self.center;
        let paint = Self::paint(palette::INK);
        for r in [
            Rect::from_xywh(cx - size * 0.5, cy - bar * 0.5, size, bar),
            Rect::from_xywh(cx - bar * 0.5, cy - size * 0.5, bar, size),
        ]
        .into_iter()
        .flatten()
        {
            self.canvas.fill_rect(r, &paint, Transform::identity(), None);
        }
    }

    fn draw_cue(&mut self) {
        let radius = self.unit() * 0.18;
        let mut pb = PathBuilder::new();
        pb.push_circle(self.center.0, self.center.1, radius);
        if let Some(path) = pb.finish() {
            self.canvas.fill_path(
                &path,
                &Self::paint(palette::INK),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_cross(&mut self) {
        let size = self.unit() * 0.1;
        let bar = size * 0.25;
        let (cx, cy) = self.center;
        let paint = Self::paint(palette::INK);
        let Some(r) = Rect::from_xywh(-size, -bar * 0.5, size * 2.0, bar) else {
            return;
        };
        for angle in [45.0, -45.0] {
            let ts = Transform::from_rotate(angle).post_translate(cx, cy);
            self.canvas.fill_rect(r, &paint, ts, None);
        }
    }

    /// Centred prompt lines starting at `top` (fraction of the height).
    fn draw_prompt(&mut self, lines: &[&'static str], top: f32) {
        let Some(cache) = self.text.as_mut() else {
            return;
        };
        let h = self.height as f32;
        let size = (h * PROMPT_SIZE).round().max(8.0) as u32;
        for (i, line) in lines.iter().enumerate() {
            let Some(pm) = cache.get_or_render(line, size) else {
                continue;
            };
            let x = self.center.0 - pm.width() as f32 * 0.5;
            let y = h * top + i as f32 * size as f32 * PROMPT_LEADING;
            self.canvas.draw_pixmap(
                x.round() as i32,
                y.round() as i32,
                Pixmap::as_ref(&pm),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }

    fn draw_centered_number(&mut self, value: u64, center_y: f32, height: f32) {
        self.draw_centered_number_with(value, center_y, height, palette::INK);
    }

    fn draw_centered_number_with(&mut self, value: u64, center_y: f32, height: f32, rgba: Rgba) {
        let x = self.center.0 - number_width(value, height) * 0.5;
        draw_number(&mut self.canvas, value, x, center_y - height * 0.5, height, rgba);
    }

    fn draw_summary(&mut self, last: Option<Millis>, top: &[ScoreRecord]) {
        let h = self.height as f32;
        let w = self.width as f32;
        if let Some(ms) = last {
            self.draw_centered_number(ms, h * 0.12, h * 0.1);
        }

        let rows = top.iter().take(SUMMARY_ROWS).collect::<Vec<_>>();
        let Some(worst) = rows.iter().map(|r| r.score_ms).max() else {
            return;
        };
        let row_h = h * 0.6 / SUMMARY_ROWS as f32;
        let digit_h = row_h * 0.6;
        let left = w * 0.1;
        let bar_left = left + number_width(9999, digit_h) + digits::gap(digit_h) * 2.0;
        let bar_max = (w * 0.9 - bar_left).max(1.0);

        for (i, rec) in rows.iter().enumerate() {
            let y = h * 0.28 + i as f32 * row_h;
            let color = palette::rank(i);
            draw_number(&mut self.canvas, rec.score_ms, left, y, digit_h, color);
            let frac = rec.score_ms.max(1) as f32 / worst.max(1) as f32;
            if let Some(r) = Rect::from_xywh(bar_left, y, bar_max * frac, digit_h) {
                self.canvas
                    .fill_rect(r, &Self::paint(color), Transform::identity(), None);
            }
        }
    }
}
