use mathrush::analytics::DerivedSeries;
use mathrush::chart::{ChartProjector, Ink, Padding, PixelExtents, PixelPoint, Surface};
use ratatui::{
    layout::{Position, Rect},
    style::{Color, Style},
    text::Span,
    widgets::canvas::{Circle, Context, Line as CanvasLine},
};

/// Braille cells hold 2x4 dots
pub const DOTS_PER_COL: f64 = 2.0;
pub const DOTS_PER_ROW: f64 = 4.0;

/// Room for axis labels, in dots: left labels like `12.3s` are five cells wide
pub const CHART_PADDING: Padding = Padding {
    top: 4.0,
    right: 10.0,
    bottom: 4.0,
    left: 14.0,
};

pub fn extents_for(area: Rect) -> PixelExtents {
    PixelExtents::new(
        area.width as f64 * DOTS_PER_COL,
        area.height as f64 * DOTS_PER_ROW,
    )
    .with_padding(CHART_PADDING)
}

/// Center of the terminal cell in chart pixels, None outside the chart
pub fn cell_to_pixel(area: Rect, column: u16, row: u16) -> Option<PixelPoint> {
    if !area.contains(Position::new(column, row)) {
        return None;
    }
    Some(PixelPoint::new(
        (column - area.x) as f64 * DOTS_PER_COL + DOTS_PER_COL / 2.0,
        (row - area.y) as f64 * DOTS_PER_ROW + DOTS_PER_ROW / 2.0,
    ))
}

/// Question under the mouse for a chart drawn in `area`
pub fn hovered_question(
    area: Rect,
    series: &DerivedSeries,
    column: u16,
    row: u16,
) -> Option<usize> {
    let cursor = cell_to_pixel(area, column, row)?;
    ChartProjector::new(series, extents_for(area)).hit_test(cursor)
}

pub fn ink_color(ink: Ink) -> Color {
    match ink {
        Ink::Grid => Color::DarkGray,
        Ink::Label => Color::Gray,
        Ink::TimeBar => Color::Blue,
        Ink::TimeBarHovered => Color::LightBlue,
        Ink::ErrorMark => Color::Red,
        Ink::Average => Color::Yellow,
        Ink::Cumulative => Color::Magenta,
        Ink::Burst => Color::Cyan,
    }
}

/// Chart surface over a ratatui canvas. The canvas y axis points up, so
/// every coordinate is flipped against the surface height.
pub struct CanvasSurface<'a, 'b> {
    ctx: &'b mut Context<'a>,
    width: f64,
    height: f64,
}

impl<'a, 'b> CanvasSurface<'a, 'b> {
    pub fn new(ctx: &'b mut Context<'a>, width: f64, height: f64) -> Self {
        Self { ctx, width, height }
    }

    fn flip(&self, y: f64) -> f64 {
        self.height - y
    }
}

impl Surface for CanvasSurface<'_, '_> {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn line(&mut self, from: PixelPoint, to: PixelPoint, ink: Ink) {
        let line = CanvasLine::new(
            from.x,
            self.flip(from.y),
            to.x,
            self.flip(to.y),
            ink_color(ink),
        );
        self.ctx.draw(&line);
    }

    // Filled, one dot column at a time
    fn rect(&mut self, origin: PixelPoint, width: f64, height: f64, ink: Ink) {
        let (top, bottom) = (self.flip(origin.y), self.flip(origin.y + height));
        let mut x = origin.x;
        while x <= origin.x + width {
            self.ctx
                .draw(&CanvasLine::new(x, bottom, x, top, ink_color(ink)));
            x += 1.0;
        }
    }

    fn arc(&mut self, center: PixelPoint, radius: f64, ink: Ink) {
        let circle = Circle {
            x: center.x,
            y: self.flip(center.y),
            radius,
            color: ink_color(ink),
        };
        self.ctx.draw(&circle);
    }

    fn text(&mut self, at: PixelPoint, text: &str, ink: Ink) {
        let y = self.flip(at.y);
        self.ctx.print(
            at.x,
            y,
            Span::styled(text.to_string(), Style::default().fg(ink_color(ink))),
        );
    }
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
