use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<LineSeries>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
        }
    }

    pub fn with_labels(mut self, x: &str, y: &str) -> Self {
        self.x.label = Some(x.into());
        self.y.label = Some(y.into());
        self
    }

    pub fn add_series(&mut self, series: LineSeries) {
        self.series.push(series);
    }

    /// `(x_min, x_max, y_min, y_max)` across all series, `None` when empty.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut points = self.series.iter().flat_map(|s| s.points.iter());
        let first = points.next()?;
        let init = (first[0], first[0], first[1], first[1]);
        Some(points.fold(init, |(x0, x1, y0, y1), p| {
            (x0.min(p[0]), x1.max(p[0]), y0.min(p[1]), y1.max(p[1]))
        }))
    }
}

/// Keep at most `max_points` evenly strided points.
pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points {
        return points.to_vec();
    }
    if max_points == 0 {
        return Vec::new();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    (0..max_points)
        .map(|i| (i as f64 * bucket_size).floor() as usize)
        .take_while(|&start| start < points.len())
        .map(|start| points[start])
        .collect()
}

fn line(name: &str, points: Vec<[f64; 2]>, color: u32, max_points: usize) -> LineSeries {
    LineSeries {
        name: name.into(),
        points: decimate_points(&points, max_points),
        style: Style {
            width: 2.0,
            color: Color(color),
        },
    }
}

/// Flow (y) against exhaled volume (x) from the onset sample onward.
pub fn figure_from_flow_volume(
    flow: &[f64],
    volume: &[f64],
    onset: usize,
    max_points: usize,
) -> Figure {
    let points: Vec<[f64; 2]> = volume
        .iter()
        .zip(flow)
        .skip(onset)
        .map(|(&v, &f)| [v, f])
        .collect();
    let mut fig = Figure::new(Some("Flow-volume loop".into())).with_labels("Volume (L)", "Flow (L/s)");
    fig.add_series(line("flow-volume", points, 0x1F77B4, max_points));
    fig
}

/// Flow (y) against sample time (x).
pub fn figure_from_flow_time(flow: &[f64], time: &[f64], max_points: usize) -> Figure {
    let points: Vec<[f64; 2]> = time.iter().zip(flow).map(|(&t, &f)| [t, f]).collect();
    let mut fig = Figure::new(Some("Flow".into())).with_labels("Time (s)", "Flow (L/s)");
    fig.add_series(line("flow", points, 0xFF0077, max_points));
    fig
}
