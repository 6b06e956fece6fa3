use anyhow::{anyhow, Result};
use plotters::prelude::*;
use spiro_lib::plot::Figure;
use std::path::Path;

pub fn draw_figure(path: &Path, fig: &Figure) -> Result<()> {
    let (x_min, x_max, y_min, y_max) = fig
        .bounds()
        .ok_or_else(|| anyhow!("nothing to plot"))?;
    let (x_max, y_max) = (widen(x_min, x_max), widen(y_min, y_max));

    let backend = BitMapBackend::new(path, (800, 480));
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(
            fig.title.clone().unwrap_or_else(|| "Plot".into()),
            ("sans-serif", 24),
        )
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    let mut mesh = chart.configure_mesh();
    if let Some(label) = &fig.x.label {
        mesh.x_desc(label.as_str());
    }
    if let Some(label) = &fig.y.label {
        mesh.y_desc(label.as_str());
    }
    mesh.draw()?;
    for line in &fig.series {
        let (r, g, b) = line.style.color.rgb();
        chart.draw_series(LineSeries::new(
            line.points.iter().map(|p| (p[0], p[1])),
            RGBColor(r, g, b).stroke_width(line.style.width.round().max(1.0) as u32),
        ))?;
    }
    root.present()?;
    Ok(())
}

/// plotters rejects empty ranges; give flat data a unit span.
fn widen(lo: f64, hi: f64) -> f64 {
    if hi > lo {
        hi
    } else {
        lo + 1.0
    }
}
