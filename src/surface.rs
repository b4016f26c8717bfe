//! Logical-pixel drawing surface.
//!
//! Games paint into a `Surface` measured in logical pixels (800x600 by
//! default). The surface only records shapes; turning them into terminal
//! cells happens in the `Widget` impl, which rasterises onto a half-block
//! grid (two vertical sub-pixels per cell) fitted into the target area.

use ratatui::prelude::*;

/// Fixed background painted at the start of every frame.
pub const BACKGROUND: Color = Color::Rgb(8, 8, 24);

pub const NEON_BLUE: Color = Color::Rgb(0, 255, 255);
pub const NEON_PINK: Color = Color::Rgb(255, 0, 255);
pub const NEON_GREEN: Color = Color::Rgb(0, 255, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width.max(1), height: height.max(1) }
    }

    pub fn w(&self) -> f32 {
        self.width as f32
    }

    pub fn h(&self) -> f32 {
        self.height as f32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Rect { x: f32, y: f32, w: f32, h: f32 },
    Outline { x: f32, y: f32, w: f32, h: f32 },
    Circle { cx: f32, cy: f32, r: f32 },
    Triangle { pts: [(f32, f32); 3] },
    DashedVLine { x: f32, dash: f32, gap: f32 },
    /// Text centred horizontally on `x`.
    Text { x: f32, y: f32, text: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    pub shape: Shape,
    pub color: Color,
}

pub struct Surface {
    size: Size,
    background: Color,
    list: Vec<Paint>,
}

impl Surface {
    pub fn new(size: Size) -> Self {
        Self { size, background: BACKGROUND, list: Vec::new() }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn clear(&mut self, color: Color) {
        self.background = color;
        self.list.clear();
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn shapes(&self) -> &[Paint] {
        &self.list
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.push(Shape::Rect { x, y, w, h }, color);
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.push(Shape::Outline { x, y, w, h }, color);
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Color) {
        self.push(Shape::Circle { cx, cy, r }, color);
    }

    pub fn fill_triangle(&mut self, pts: [(f32, f32); 3], color: Color) {
        self.push(Shape::Triangle { pts }, color);
    }

    pub fn dashed_vline(&mut self, x: f32, dash: f32, gap: f32, color: Color) {
        self.push(Shape::DashedVLine { x, dash, gap }, color);
    }

    pub fn text(&mut self, x: f32, y: f32, text: impl Into<String>, color: Color) {
        self.push(Shape::Text { x, y, text: text.into() }, color);
    }

    fn push(&mut self, shape: Shape, color: Color) {
        self.list.push(Paint { shape, color });
    }
}

/// Largest rect inside `area` that keeps the surface aspect ratio, measured
/// in half-block sub-pixels (a cell is one sub-pixel wide, two tall).
pub fn fit_area(area: Rect, size: Size) -> Rect {
    if area.width == 0 || area.height == 0 {
        return area;
    }
    let aspect = size.w() / size.h();
    let sub_h = area.height as f32 * 2.0;
    let mut w = area.width as f32;
    let mut h = w / aspect;
    if h > sub_h {
        h = sub_h;
        w = h * aspect;
    }
    let cols = (w.floor() as u16).clamp(1, area.width);
    let rows = ((h / 2.0).floor() as u16).clamp(1, area.height);
    Rect::new(
        area.x + (area.width - cols) / 2,
        area.y + (area.height - rows) / 2,
        cols,
        rows,
    )
}

/// Map a terminal cell to the logical pixel at its centre, if it lies on
/// the surface drawn into `area` (as returned by `fit_area`).
pub fn cell_to_logical(area: Rect, size: Size, col: u16, row: u16) -> Option<(f32, f32)> {
    if col < area.x || row < area.y || col >= area.x + area.width || row >= area.y + area.height {
        return None;
    }
    let x = (col - area.x) as f32 + 0.5;
    let y = (row - area.y) as f32 + 0.5;
    Some((
        x / area.width as f32 * size.w(),
        y / area.height as f32 * size.h(),
    ))
}

struct Raster {
    cols: usize,
    rows: usize,
    sx: f32,
    sy: f32,
    px: Vec<Color>,
}

impl Raster {
    fn new(cols: usize, rows: usize, size: Size, bg: Color) -> Self {
        Self {
            cols,
            rows,
            sx: cols as f32 / size.w(),
            sy: rows as f32 / size.h(),
            px: vec![bg; cols * rows],
        }
    }

    fn set(&mut self, c: i64, r: i64, color: Color) {
        if c >= 0 && r >= 0 && (c as usize) < self.cols && (r as usize) < self.rows {
            self.px[r as usize * self.cols + c as usize] = color;
        }
    }

    /// Paint every sub-pixel whose centre passes `inside`; if none does,
    /// paint the one under `fallback` so tiny shapes never vanish.
    fn fill_where<F>(&mut self, bounds: (f32, f32, f32, f32), fallback: (f32, f32), color: Color, inside: F)
    where
        F: Fn(f32, f32) -> bool,
    {
        let (x0, y0, x1, y1) = bounds;
        let c0 = (x0 * self.sx).floor().max(0.0) as i64;
        let c1 = ((x1 * self.sx).ceil() as i64).min(self.cols as i64);
        let r0 = (y0 * self.sy).floor().max(0.0) as i64;
        let r1 = ((y1 * self.sy).ceil() as i64).min(self.rows as i64);
        let mut painted = false;
        for r in r0..r1 {
            for c in c0..c1 {
                let lx = (c as f32 + 0.5) / self.sx;
                let ly = (r as f32 + 0.5) / self.sy;
                if inside(lx, ly) {
                    self.set(c, r, color);
                    painted = true;
                }
            }
        }
        if !painted {
            let c = (fallback.0 * self.sx).floor() as i64;
            let r = (fallback.1 * self.sy).floor() as i64;
            self.set(c, r, color);
        }
    }

    fn paint(&mut self, paint: &Paint) {
        let color = paint.color;
        match paint.shape {
            Shape::Rect { x, y, w, h } => {
                self.fill_where((x, y, x + w, y + h), (x + w / 2.0, y + h / 2.0), color, |px, py| {
                    px >= x && px < x + w && py >= y && py < y + h
                });
            }
            Shape::Outline { x, y, w, h } => {
                let c0 = (x * self.sx).floor() as i64;
                let c1 = (((x + w) * self.sx).ceil() as i64 - 1).max(c0);
                let r0 = (y * self.sy).floor() as i64;
                let r1 = (((y + h) * self.sy).ceil() as i64 - 1).max(r0);
                for c in c0..=c1 {
                    self.set(c, r0, color);
                    self.set(c, r1, color);
                }
                for r in r0..=r1 {
                    self.set(c0, r, color);
                    self.set(c1, r, color);
                }
            }
            Shape::Circle { cx, cy, r } => {
                self.fill_where((cx - r, cy - r, cx + r, cy + r), (cx, cy), color, |px, py| {
                    (px - cx).powi(2) + (py - cy).powi(2) <= r * r
                });
            }
            Shape::Triangle { pts } => {
                let xs = pts.map(|p| p.0);
                let ys = pts.map(|p| p.1);
                let bounds = (
                    xs.iter().cloned().fold(f32::MAX, f32::min),
                    ys.iter().cloned().fold(f32::MAX, f32::min),
                    xs.iter().cloned().fold(f32::MIN, f32::max),
                    ys.iter().cloned().fold(f32::MIN, f32::max),
                );
                let centre = ((xs[0] + xs[1] + xs[2]) / 3.0, (ys[0] + ys[1] + ys[2]) / 3.0);
                self.fill_where(bounds, centre, color, |px, py| in_triangle(pts, px, py));
            }
            Shape::DashedVLine { x, dash, gap } => {
                let c = (x * self.sx).floor() as i64;
                for r in 0..self.rows as i64 {
                    let ly = (r as f32 + 0.5) / self.sy;
                    if ly % (dash + gap) < dash {
                        self.set(c, r, color);
                    }
                }
            }
            Shape::Text { .. } => {}
        }
    }
}

fn in_triangle(pts: [(f32, f32); 3], px: f32, py: f32) -> bool {
    let sign = |a: (f32, f32), b: (f32, f32)| (px - b.0) * (a.1 - b.1) - (a.0 - b.0) * (py - b.1);
    let d1 = sign(pts[0], pts[1]);
    let d2 = sign(pts[1], pts[2]);
    let d3 = sign(pts[2], pts[0]);
    let neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(neg && pos)
}

impl Widget for &Surface {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = fit_area(area, self.size);
        if area.width == 0 || area.height == 0 {
            return;
        }
        let mut raster = Raster::new(area.width as usize, area.height as usize * 2, self.size, self.background());
        for paint in self.shapes() {
            raster.paint(paint);
        }

        for row in 0..area.height as usize {
            for col in 0..area.width as usize {
                let top = raster.px[(row * 2) * raster.cols + col];
                let bottom = raster.px[(row * 2 + 1) * raster.cols + col];
                if let Some(cell) = buf.cell_mut((area.x + col as u16, area.y + row as u16)) {
                    cell.set_char('▀').set_fg(top).set_bg(bottom);
                }
            }
        }

        // Text goes on top of the pixels, one glyph per cell.
        for paint in self.shapes() {
            let Shape::Text { x, y, ref text } = paint.shape else { continue };
            let len = text.chars().count() as i64;
            let row = (y * raster.sy / 2.0).floor() as i64;
            let start = (x * raster.sx).floor() as i64 - len / 2;
            if row < 0 || row >= area.height as i64 {
                continue;
            }
            for (i, ch) in text.chars().enumerate() {
                let col = start + i as i64;
                if col < 0 || col >= area.width as i64 {
                    continue;
                }
                let under = raster.px[(row as usize * 2) * raster.cols + col as usize];
                if let Some(cell) = buf.cell_mut((area.x + col as u16, area.y + row as u16)) {
                    cell.set_char(ch)
                        .set_fg(paint.color)
                        .set_bg(under)
                        .set_style(Style::default().add_modifier(Modifier::BOLD));
                }
            }
        }
    }
}
