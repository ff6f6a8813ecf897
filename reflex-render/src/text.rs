use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result, anyhow};
use reflex_core::TrialState;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};

/// Fonts tried when no font file is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Prompt lines shown under each trial state.
pub fn trial_prompt(state: TrialState) -> &'static [&'static str] {
    match state {
        TrialState::Idle => &["Click to Start"],
        TrialState::Armed => &["Wait..."],
        TrialState::Reacting => &["Click!"],
        TrialState::Success => &["Click to continue"],
        TrialState::Penalty => &["Too Early!", "Click to try again"],
    }
}

pub const SUMMARY_PROMPT: &str = "Click to play again";

/// Loads `explicit` if given, otherwise the first readable system font.
pub fn load_font(explicit: Option<&Path>) -> Result<FontArc> {
    if let Some(path) = explicit {
        return load_font_file(path);
    }
    SYSTEM_FONTS
        .iter()
        .map(PathBuf::from)
        .filter(|p| p.is_file())
        .find_map(|p| load_font_file(&p).ok())
        .ok_or_else(|| anyhow!("no usable system font among {} candidates", SYSTEM_FONTS.len()))
}

pub fn load_font_file(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path).with_context(|| format!("reading font {path:?}"))?;
    FontArc::try_from_vec(bytes).map_err(|e| anyhow!("parsing font {path:?}: {e}"))
}

/// Rasterises `text` onto a tight transparent pixmap, baseline at the ascent.
///
/// `None` when nothing in `text` has an outline.
pub fn render_text_pixmap(text: &str, size_px: f32, font: &FontArc, color: Color) -> Option<Pixmap> {
    let scale = PxScale::from(size_px);
    let sf = font.as_scaled(scale);

    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    let outlines: Vec<_> = glyphs
        .into_iter()
        .filter_map(|g| font.outline_glyph(g))
        .collect();
    let (min_x, min_y, max_x, max_y) = outlines.iter().map(|o| o.px_bounds()).fold(
        (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        |(x0, y0, x1, y1), b| (x0.min(b.min.x), y0.min(b.min.y), x1.max(b.max.x), y1.max(b.max.y)),
    );
    if outlines.is_empty() {
        return None;
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h)?;
    let stride = w as usize;
    let dst = pm.pixels_mut();

    let cu = color.to_color_u8();
    for out in &outlines {
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = (x as f32 + b.min.x - min_x).floor() as i32;
            let iy = (y as f32 + b.min.y - min_y).floor() as i32;
            if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                return;
            }
            let i = iy as usize * stride + ix as usize;
            let Some(bg) = dst.get(i).copied() else {
                return;
            };

            // premultiplied source over destination
            let a = (cov * cu.alpha() as f32 / 255.0).clamp(0.0, 1.0);
            let inv = 1.0 - a;
            let over = |s: u8, d: u8| ((s as f32 * a) + d as f32 * inv).round().min(255.0) as u8;
            let alpha = ((a * 255.0) + bg.alpha() as f32 * inv).round().min(255.0) as u8;
            let px = PremultipliedColorU8::from_rgba(
                over(cu.red(), bg.red()).min(alpha),
                over(cu.green(), bg.green()).min(alpha),
                over(cu.blue(), bg.blue()).min(alpha),
                alpha,
            );
            if let Some(px) = px {
                dst[i] = px;
            }
        });
    }
    Some(pm)
}

/// Rendered prompt pixmaps keyed by text and pixel size.
pub struct TextCache {
    font: FontArc,
    color: Color,
    map: HashMap<(&'static str, u32), Option<Arc<Pixmap>>>,
}

impl TextCache {
    pub fn new(font: FontArc, color: Color) -> Self {
        Self {
            font,
            color,
            map: HashMap::new(),
        }
    }

    pub fn get_or_render(&mut self, text: &'static str, size_px: u32) -> Option<Arc<Pixmap>> {
        let (font, color) = (&self.font, self.color);
        self.map
            .entry((text, size_px))
            .or_insert_with(|| render_text_pixmap(text, size_px as f32, font, color).map(Arc::new))
            .clone()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_state_has_a_prompt() {
        assert_eq!(trial_prompt(TrialState::Idle), &["Click to Start"]);
        assert_eq!(trial_prompt(TrialState::Armed), &["Wait..."]);
        assert_eq!(
            trial_prompt(TrialState::Penalty),
            &["Too Early!", "Click to try again"]
        );
    }

    #[test]
    fn missing_font_file_is_an_error() {
        let err = load_font(Some(Path::new("/nonexistent/reflex/font.ttf"))).unwrap_err();
        assert!(format!("{err:#}").contains("reading font"), "{err:#}");
    }

    #[test]
    fn garbage_font_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("reflex-bad-font-{}.ttf", std::process::id()));
        std::fs::write(&path, b"not a font").unwrap();
        let err = load_font_file(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(format!("{err:#}").contains("parsing font"), "{err:#}");
    }

    // Runs only where one of the system fonts is installed.
    #[test]
    fn system_font_renders_and_caches() {
        let Ok(font) = load_font(None) else {
            return;
        };
        let mut cache = TextCache::new(font, Color::WHITE);
        let pm = cache.get_or_render("Too Early!", 32).unwrap();
        assert!(pm.width() > pm.height());
        assert!(pm.pixels().iter().any(|p| p.alpha() > 200));

        let again = cache.get_or_render("Too Early!", 32).unwrap();
        assert!(Arc::ptr_eq(&pm, &again));
        assert!(cache.get_or_render(" ", 32).is_none());
        assert_eq!(cache.len(), 2);
    }
}
