//! Built-in SVG chart engine
//!
//! A small engine that understands the common subset of the configuration dialect used by
//! chart fences: an optional `title.text`, category labels from `xAxis.data`, and `bar`, `line`
//! or `pie` series whose data points are numbers or `{ "value": n, "name": "..." }` objects.
//! Anything else still mounts and draws as an empty titled frame. Only configurations that are
//! not JSON objects are rejected.

use super::{ChartEngine, ChartRendering, RasterImage, RenderingHandle};
use crate::dom::{append, create_element, create_text, serialize_nodes};
use crate::error::RenderError;
use markup5ever_rcdom::Handle;
use serde_json::{Map, Value};
use std::f64::consts::PI;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const AXIS_COLOR: &str = "#6e7079";

const PALETTE: [&str; 9] = [
    "#5470c6", "#91cc75", "#fac858", "#ee6666", "#73c0de", "#3ba272", "#fc8452", "#9a60b4",
    "#ea7ccc",
];

#[derive(Debug, Clone, Copy)]
pub struct SvgChartEngine {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgChartEngine {
    fn default() -> Self {
        SvgChartEngine {
            width: 600,
            height: 300,
        }
    }
}

impl ChartEngine for SvgChartEngine {
    fn mount(&self, config: &Value) -> Result<RenderingHandle, RenderError> {
        let object = config.as_object().ok_or_else(|| {
            RenderError::InvalidOption(format!("expected an object, got {}", kind_of(config)))
        })?;
        let spec = ChartSpec::from_config(object);
        let svg = draw(&spec, self.width as f64, self.height as f64);
        Ok(RenderingHandle::new(SvgRendering { svg }))
    }
}

#[derive(Debug)]
struct SvgRendering {
    svg: String,
}

impl ChartRendering for SvgRendering {
    fn snapshot(&self) -> Option<RasterImage> {
        Some(RasterImage::new("image/svg+xml", self.svg.as_bytes()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeriesKind {
    Bar,
    Line,
    Pie,
}

#[derive(Debug)]
struct Series {
    kind: SeriesKind,
    points: Vec<(Option<String>, f64)>,
}

#[derive(Debug)]
struct ChartSpec {
    title: Option<String>,
    background: String,
    colors: Vec<String>,
    categories: Vec<String>,
    series: Vec<Series>,
}

impl ChartSpec {
    fn from_config(config: &Map<String, Value>) -> Self {
        let title = config
            .get("title")
            .and_then(|t| t.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let background = config
            .get("backgroundColor")
            .and_then(Value::as_str)
            .unwrap_or("#ffffff")
            .to_string();
        let mut colors: Vec<String> = config
            .get("color")
            .and_then(Value::as_array)
            .map(|c| c.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        if colors.is_empty() {
            colors = PALETTE.iter().map(|c| c.to_string()).collect();
        }
        let categories = config
            .get("xAxis")
            .and_then(|axis| axis.get("data"))
            .and_then(Value::as_array)
            .map(|data| data.iter().map(label_of).collect())
            .unwrap_or_default();
        let series = match config.get("series") {
            Some(Value::Array(items)) => items.iter().filter_map(parse_series).collect(),
            Some(single @ Value::Object(_)) => parse_series(single).into_iter().collect(),
            _ => Vec::new(),
        };
        ChartSpec {
            title,
            background,
            colors,
            categories,
            series,
        }
    }

    fn color(&self, index: usize) -> &str {
        &self.colors[index % self.colors.len()]
    }
}

fn parse_series(value: &Value) -> Option<Series> {
    let kind = match value.get("type").and_then(Value::as_str)? {
        "bar" => SeriesKind::Bar,
        "line" => SeriesKind::Line,
        "pie" => SeriesKind::Pie,
        _ => return None,
    };
    let points = value
        .get("data")
        .and_then(Value::as_array)
        .map(|data| data.iter().map(point_of).collect())
        .unwrap_or_default();
    Some(Series { kind, points })
}

fn point_of(value: &Value) -> (Option<String>, f64) {
    match value {
        Value::Object(obj) => (
            obj.get("name").map(label_of),
            obj.get("value").map(number_of).unwrap_or(0.0),
        ),
        other => (None, number_of(other)),
    }
}

fn number_of(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        Value::Array(items) => items.last().map(number_of).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn label_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

/// An element with owned attribute values
fn element(tag: &str, attrs: &[(&str, String)]) -> Handle {
    create_element(
        tag,
        attrs.iter().map(|(name, value)| (*name, value.as_str())).collect(),
    )
}

fn text_element(tag: &str, attrs: &[(&str, String)], text: &str) -> Handle {
    let node = element(tag, attrs);
    append(&node, create_text(text));
    node
}

fn draw(spec: &ChartSpec, width: f64, height: f64) -> String {
    let svg = element(
        "svg",
        &[
            ("xmlns", SVG_NS.to_string()),
            ("width", width.to_string()),
            ("height", height.to_string()),
            ("viewBox", format!("0 0 {} {}", width, height)),
        ],
    );
    append(
        &svg,
        element(
            "rect",
            &[
                ("width", width.to_string()),
                ("height", height.to_string()),
                ("fill", spec.background.clone()),
            ],
        ),
    );

    let mut top = 16.0;
    if let Some(title) = &spec.title {
        append(
            &svg,
            text_element(
                "text",
                &[
                    ("x", (width / 2.0).to_string()),
                    ("y", "24".to_string()),
                    ("text-anchor", "middle".to_string()),
                    ("font-size", "16".to_string()),
                    ("font-family", "sans-serif".to_string()),
                ],
                title,
            ),
        );
        top = 40.0;
    }
    let frame = Frame {
        left: 48.0,
        top,
        width: (width - 64.0).max(1.0),
        height: (height - top - 32.0).max(1.0),
    };

    if let Some(pie) = spec.series.iter().find(|s| s.kind == SeriesKind::Pie) {
        draw_pie(&svg, spec, pie, &frame);
    } else if !spec.series.is_empty() {
        draw_cartesian(&svg, spec, &frame);
    }

    serialize_nodes(&[svg], "")
}

fn draw_cartesian(svg: &Handle, spec: &ChartSpec, frame: &Frame) {
    let count = spec
        .series
        .iter()
        .map(|s| s.points.len())
        .max()
        .unwrap_or(0)
        .max(spec.categories.len());
    if count == 0 {
        return;
    }
    let max = spec
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|(_, v)| *v))
        .fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { frame.height / max } else { 0.0 };
    let baseline = frame.top + frame.height;
    let band = frame.width / count as f64;

    append(
        svg,
        element(
            "path",
            &[
                (
                    "d",
                    format!(
                        "M{} {}V{}H{}",
                        frame.left,
                        frame.top,
                        baseline,
                        frame.left + frame.width
                    ),
                ),
                ("stroke", AXIS_COLOR.to_string()),
                ("fill", "none".to_string()),
            ],
        ),
    );
    for (i, label) in spec.categories.iter().enumerate() {
        append(
            svg,
            text_element(
                "text",
                &[
                    ("x", format!("{:.1}", frame.left + band * (i as f64 + 0.5))),
                    ("y", format!("{:.1}", baseline + 16.0)),
                    ("text-anchor", "middle".to_string()),
                    ("font-size", "11".to_string()),
                    ("font-family", "sans-serif".to_string()),
                    ("fill", AXIS_COLOR.to_string()),
                ],
                label,
            ),
        );
    }

    let bars: Vec<_> = spec
        .series
        .iter()
        .enumerate()
        .filter(|(_, s)| s.kind == SeriesKind::Bar)
        .collect();
    let bar_width = band * 0.7 / bars.len().max(1) as f64;
    for (slot, (index, series)) in bars.iter().enumerate() {
        for (i, (_, value)) in series.points.iter().enumerate() {
            let h = (value * scale).max(0.0);
            let x = frame.left + band * i as f64 + band * 0.15 + bar_width * slot as f64;
            append(
                svg,
                element(
                    "rect",
                    &[
                        ("x", format!("{:.1}", x)),
                        ("y", format!("{:.1}", baseline - h)),
                        ("width", format!("{:.1}", bar_width)),
                        ("height", format!("{:.1}", h)),
                        ("fill", spec.color(*index).to_string()),
                    ],
                ),
            );
        }
    }

    for (index, series) in spec.series.iter().enumerate() {
        if series.kind != SeriesKind::Line || series.points.is_empty() {
            continue;
        }
        let points: Vec<String> = series
            .points
            .iter()
            .enumerate()
            .map(|(i, (_, value))| {
                format!(
                    "{:.1},{:.1}",
                    frame.left + band * (i as f64 + 0.5),
                    baseline - (value * scale).max(0.0)
                )
            })
            .collect();
        append(
            svg,
            element(
                "polyline",
                &[
                    ("points", points.join(" ")),
                    ("fill", "none".to_string()),
                    ("stroke", spec.color(index).to_string()),
                    ("stroke-width", "2".to_string()),
                ],
            ),
        );
    }
}

fn draw_pie(svg: &Handle, spec: &ChartSpec, pie: &Series, frame: &Frame) {
    let total: f64 = pie.points.iter().map(|(_, v)| v.max(0.0)).sum();
    if total <= 0.0 {
        return;
    }
    let cx = frame.left + frame.width / 2.0;
    let cy = frame.top + frame.height / 2.0;
    let r = frame.width.min(frame.height) / 2.0;

    let mut angle = -PI / 2.0;
    for (i, (name, value)) in pie.points.iter().enumerate() {
        let share = value.max(0.0) / total;
        if share <= 0.0 {
            continue;
        }
        let fill = ("fill", spec.color(i).to_string());
        let slice = if share >= 1.0 {
            element(
                "circle",
                &[
                    ("cx", format!("{:.1}", cx)),
                    ("cy", format!("{:.1}", cy)),
                    ("r", format!("{:.1}", r)),
                    fill,
                ],
            )
        } else {
            let end = angle + share * 2.0 * PI;
            let large = if share > 0.5 { 1 } else { 0 };
            let d = format!(
                "M{:.1} {:.1}L{:.1} {:.1}A{:.1} {:.1} 0 {} 1 {:.1} {:.1}Z",
                cx,
                cy,
                cx + r * angle.cos(),
                cy + r * angle.sin(),
                r,
                r,
                large,
                cx + r * end.cos(),
                cy + r * end.sin()
            );
            angle = end;
            element("path", &[("d", d), fill])
        };
        // Tooltip for the slice
        if let Some(name) = name {
            append(&slice, text_element("title", &[], name));
        }
        append(svg, slice);
    }
}
