//! Results chart geometry.
//!
//! Everything here is pure: series go in, pixel coordinates come out. Actual
//! drawing happens through [`Surface`], which the front end implements on top
//! of whatever it renders with.
//!
//! Pixel space has its origin at the top-left corner with y growing downward.
//! Questions occupy equal horizontal slots and are plotted at slot centers.
//! Score lines (cumulative, burst) share one vertical scale; time bars use a
//! second one with some headroom above the slowest question.

use crate::analytics::DerivedSeries;
use crate::classifier::ProblemRecord;
use crate::util::ratio_or_zero;

/// Lowest top-of-scale for score lines, keeps flat low scores from filling the chart
pub const SCORE_FLOOR: f64 = 60.0;
/// Maximum cursor distance for a point to count as hovered
pub const HIT_RADIUS: f64 = 20.0;
pub const GRID_LINES: usize = 5;

const TIME_HEADROOM: f64 = 1.2;
const MAX_BAR_WIDTH: f64 = 30.0;
const BAR_FILL: f64 = 0.6;
const ERROR_MARK_HEIGHT: f64 = 3.0;
const DASH: f64 = 5.0;
const POINT_RADIUS: f64 = 3.0;
const HOVERED_POINT_RADIUS: f64 = 5.0;
/// At most this many question numbers along the x axis
const X_LABELS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: PixelPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub const fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 40.0,
            right: 60.0,
            bottom: 50.0,
            left: 60.0,
        }
    }
}

/// Size of the drawing area and the margins kept free for axis labels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelExtents {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
}

impl PixelExtents {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            padding: Padding::default(),
        }
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn plot_width(&self) -> f64 {
        (self.width - self.padding.left - self.padding.right).max(0.0)
    }

    pub fn plot_height(&self) -> f64 {
        (self.height - self.padding.top - self.padding.bottom).max(0.0)
    }

    pub fn plot_bottom(&self) -> f64 {
        self.padding.top + self.plot_height()
    }

    pub fn plot_right(&self) -> f64 {
        self.padding.left + self.plot_width()
    }

    fn slot_width(&self, count: usize) -> f64 {
        ratio_or_zero(self.plot_width(), count as f64)
    }

    fn slot_center_x(&self, index: usize, count: usize) -> f64 {
        let slot = self.slot_width(count);
        self.padding.left + slot * index as f64 + slot / 2.0
    }

    fn y_for(&self, value: f64, scale: f64) -> f64 {
        self.plot_bottom() - ratio_or_zero(value, scale) * self.plot_height()
    }
}

/// Map `values` onto the plot area, scaled so `max(values, floor)` hits the top
pub fn project_to_pixels(values: &[f64], extents: &PixelExtents, floor: f64) -> Vec<PixelPoint> {
    let scale = values.iter().copied().fold(floor, f64::max);
    project_with_scale(values, extents, scale)
}

fn project_with_scale(values: &[f64], extents: &PixelExtents, scale: f64) -> Vec<PixelPoint> {
    let n = values.len();
    values
        .iter()
        .enumerate()
        .map(|(i, v)| PixelPoint::new(extents.slot_center_x(i, n), extents.y_for(*v, scale)))
        .collect()
}

/// Index of the point nearest to `cursor` strictly within `radius`.
/// Equal distances resolve to the lower index.
pub fn hit_test(points: &[PixelPoint], cursor: PixelPoint, radius: f64) -> Option<usize> {
    points
        .iter()
        .map(|p| p.distance(cursor))
        .enumerate()
        .filter(|(_, d)| *d < radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// A time-per-question bar, `origin` is its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub origin: PixelPoint,
    pub width: f64,
    pub height: f64,
    pub error: bool,
}

/// Projected geometry of the whole results chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartProjector {
    pub extents: PixelExtents,
    pub score_scale: f64,
    pub time_scale: f64,
    pub cumulative: Vec<PixelPoint>,
    pub burst: Vec<PixelPoint>,
    pub bars: Vec<Bar>,
    pub average_y: f64,
}

impl ChartProjector {
    pub fn new(series: &DerivedSeries, extents: PixelExtents) -> Self {
        let score_scale = series.peak_score().max(SCORE_FLOOR);
        let time_scale = series
            .per_question_secs
            .iter()
            .copied()
            .fold(series.average_secs, f64::max)
            * TIME_HEADROOM;

        let n = series.len();
        let slot = extents.slot_width(n);
        let bar_width = (slot * BAR_FILL).min(MAX_BAR_WIDTH);
        let bars = series
            .per_question_secs
            .iter()
            .zip(&series.errors)
            .enumerate()
            .map(|(i, (secs, error))| {
                let height = ratio_or_zero(*secs, time_scale) * extents.plot_height();
                Bar {
                    origin: PixelPoint::new(
                        extents.padding.left + slot * i as f64 + (slot - bar_width) / 2.0,
                        extents.plot_bottom() - height,
                    ),
                    width: bar_width,
                    height,
                    error: *error,
                }
            })
            .collect();

        Self {
            cumulative: project_with_scale(&series.cumulative, &extents, score_scale),
            burst: project_with_scale(&series.burst, &extents, score_scale),
            average_y: extents.y_for(series.average_secs, time_scale),
            bars,
            score_scale,
            time_scale,
            extents,
        }
    }

    /// Size the chart to fill `surface`
    pub fn fit<S: Surface + ?Sized>(surface: &S, series: &DerivedSeries, padding: Padding) -> Self {
        let (width, height) = surface.size();
        Self::new(series, PixelExtents::new(width, height).with_padding(padding))
    }

    /// Question under the cursor, judged against the cumulative line
    pub fn hit_test(&self, cursor: PixelPoint) -> Option<usize> {
        hit_test(&self.cumulative, cursor, HIT_RADIUS)
    }
}

/// Colour roles; the surface decides what they look like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ink {
    Grid,
    Label,
    TimeBar,
    TimeBarHovered,
    ErrorMark,
    Average,
    Cumulative,
    Burst,
}

/// Where the chart gets drawn
pub trait Surface {
    /// Width and height in pixels
    fn size(&self) -> (f64, f64);
    fn line(&mut self, from: PixelPoint, to: PixelPoint, ink: Ink);
    fn rect(&mut self, origin: PixelPoint, width: f64, height: f64, ink: Ink);
    fn arc(&mut self, center: PixelPoint, radius: f64, ink: Ink);
    fn text(&mut self, at: PixelPoint, text: &str, ink: Ink);
}

/// Draw the results chart: grid with every axis labelled, time bars with error
/// marks, dashed average line, cumulative and burst lines with their points.
pub fn paint_chart<S: Surface + ?Sized>(
    surface: &mut S,
    chart: &ChartProjector,
    hovered: Option<usize>,
) {
    let ext = &chart.extents;

    for i in 0..=GRID_LINES {
        let frac = i as f64 / GRID_LINES as f64;
        let y = ext.padding.top + ext.plot_height() * frac;
        surface.line(
            PixelPoint::new(ext.padding.left, y),
            PixelPoint::new(ext.plot_right(), y),
            Ink::Grid,
        );
        let time_label = chart.time_scale * (1.0 - frac);
        let score_label = chart.score_scale * (1.0 - frac);
        surface.text(
            PixelPoint::new(0.0, y),
            &format!("{time_label:.1}s"),
            Ink::Label,
        );
        surface.text(
            PixelPoint::new(ext.plot_right() + 2.0, y),
            &format!("{}", score_label.round()),
            Ink::Label,
        );
    }

    for (i, bar) in chart.bars.iter().enumerate() {
        let ink = if hovered == Some(i) {
            Ink::TimeBarHovered
        } else {
            Ink::TimeBar
        };
        surface.rect(bar.origin, bar.width, bar.height, ink);
        if bar.error {
            surface.rect(bar.origin, bar.width, ERROR_MARK_HEIGHT, Ink::ErrorMark);
        }
    }

    let n = chart.bars.len();
    let label_y = ext.plot_bottom() + ext.padding.bottom / 2.0;
    for i in (0..n).step_by((n / X_LABELS).max(1)) {
        let at = PixelPoint::new(ext.slot_center_x(i, n), label_y);
        surface.text(at, &(i + 1).to_string(), Ink::Label);
    }

    if !chart.bars.is_empty() {
        let mut x = ext.padding.left;
        while x < ext.plot_right() {
            let end = (x + DASH).min(ext.plot_right());
            surface.line(
                PixelPoint::new(x, chart.average_y),
                PixelPoint::new(end, chart.average_y),
                Ink::Average,
            );
            x += DASH * 2.0;
        }
    }

    for (points, ink) in [
        (&chart.cumulative, Ink::Cumulative),
        (&chart.burst, Ink::Burst),
    ] {
        for pair in points.windows(2) {
            surface.line(pair[0], pair[1], ink);
        }
        for (i, p) in points.iter().enumerate() {
            let radius = if hovered == Some(i) {
                HOVERED_POINT_RADIUS
            } else {
                POINT_RADIUS
            };
            surface.arc(*p, radius, ink);
        }
    }
}

/// What the chart shows for a hovered question
#[derive(Debug, Clone, PartialEq)]
pub struct PointDetails {
    /// 1-based question number
    pub question: usize,
    pub display: String,
    pub secs: f64,
    pub cumulative: f64,
    pub burst: f64,
    pub attempts: u32,
}

impl PointDetails {
    pub fn for_index(
        series: &DerivedSeries,
        history: &[ProblemRecord],
        index: usize,
    ) -> Option<Self> {
        let record = history.get(index)?;
        Some(Self {
            question: index + 1,
            display: record.display.clone(),
            secs: *series.per_question_secs.get(index)?,
            cumulative: *series.cumulative.get(index)?,
            burst: *series.burst.get(index)?,
            attempts: record.attempts,
        })
    }
}
