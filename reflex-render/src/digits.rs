use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};

//  aaa
// f   b
//  ggg
// e   c
//  ddd
const SEGMENTS: [u8; 10] = [
    0b0111111, // 0: abcdef
    0b0000110, // 1: bc
    0b1011011, // 2: abdeg
    0b1001111, // 3: abcdg
    0b1100110, // 4: bcfg
    0b1101101, // 5: acdfg
    0b1111101, // 6: acdefg
    0b0000111, // 7: abc
    0b1111111, // 8
    0b1101111, // 9: abcdfg
];

pub fn digit_width(height: f32) -> f32 {
    height * 0.5
}

pub fn gap(height: f32) -> f32 {
    height * 0.18
}

/// Width of `value` drawn at `height`.
pub fn number_width(value: u64, height: f32) -> f32 {
    let n = value.to_string().len() as f32;
    n * digit_width(height) + (n - 1.0) * gap(height)
}

/// Draws `value` with its top-left corner at (x, y); returns the covered rect.
pub fn draw_number(
    pixmap: &mut Pixmap,
    value: u64,
    x: f32,
    y: f32,
    height: f32,
    color: [u8; 4],
) -> Option<Rect> {
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(Color::from_rgba8(color[0], color[1], color[2], color[3]));

    let mut pen = x;
    for ch in value.to_string().bytes() {
        draw_digit(pixmap, (ch - b'0') as usize, pen, y, height, &paint);
        pen += digit_width(height) + gap(height);
    }
    Rect::from_xywh(x, y, number_width(value, height), height)
}

fn draw_digit(pixmap: &mut Pixmap, digit: usize, x: f32, y: f32, h: f32, paint: &Paint) {
    let w = digit_width(h);
    let t = (h * 0.12).max(1.0);
    let half = h * 0.5;
    let bars = [
        (x, y, w, t),                           // a
        (x + w - t, y, t, half),                // b
        (x + w - t, y + half, t, half),         // c
        (x, y + h - t, w, t),                   // d
        (x, y + half, t, half),                 // e
        (x, y, t, half),                        // f
        (x, y + half - t * 0.5, w, t),          // g
    ];
    let mask = SEGMENTS[digit % 10];
    for (i, (bx, by, bw, bh)) in bars.iter().enumerate() {
        if mask & (1 << i) == 0 {
            continue;
        }
        if let Some(r) = Rect::from_xywh(*bx, *by, *bw, *bh) {
            pixmap.fill_rect(r, paint, Transform::identity(), None);
        }
    }
}
