//! Dashboard chart export to PNG (plotters bitmap backend).

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::pipeline::ValueCount;
use crate::views::{AreaBar, Share, Views};

pub const CROP_COUNTS_FILE: &str = "crop_counts.png";
pub const VILLAGE_COUNTS_FILE: &str = "village_counts.png";
pub const GENDER_SHARE_FILE: &str = "gender_share.png";
pub const AREA_BY_FARMER_FILE: &str = "area_by_farmer.png";

/// One labelled bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarPoint {
    pub label: String,
    pub value: f64,
}

impl From<&ValueCount> for BarPoint {
    fn from(c: &ValueCount) -> Self {
        Self {
            label: c.value.clone(),
            value: c.count as f64,
        }
    }
}

impl From<&AreaBar> for BarPoint {
    fn from(a: &AreaBar) -> Self {
        Self {
            label: a.farmer.clone(),
            value: a.area,
        }
    }
}

/// Format an axis value without trailing zeros.
fn format_axis_label(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format!("{:.0}", v)
    } else {
        let s = format!("{:.2}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Write a categorical bar chart. Bars are drawn in the given order.
pub fn write_bar_chart_png(
    path: &Path,
    title: &str,
    (x_desc, y_desc): (&str, &str),
    bars: &[BarPoint],
    (width, height): (u32, u32),
) -> Result<()> {
    use plotters::prelude::*;

    if bars.is_empty() {
        return Err(eyre!("No data to export"));
    }

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = bars.len() as f64 - 0.5;
    let y_max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut binding = ChartBuilder::on(&root);
    let mut chart = binding
        .margin(30)
        .caption(title, ("sans-serif", 20))
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..x_max, 0.0..y_max)?;

    let labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_label_formatter(&move |v: &f64| {
            let idx = v.round();
            if idx >= 0.0 && (v - idx).abs() < 0.25 {
                labels.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .y_label_formatter(&|v: &f64| format_axis_label(*v))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, b)| {
        let x = i as f64;
        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, b.value)], CYAN.filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Write a pie chart with percentage labels on the slices.
pub fn write_pie_chart_png(
    path: &Path,
    title: &str,
    shares: &[Share],
    (width, height): (u32, u32),
) -> Result<()> {
    use plotters::prelude::*;

    if shares.iter().all(|s| s.count == 0) {
        return Err(eyre!("No data to export"));
    }

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(title, ("sans-serif", 20))?;

    let (w, h) = root.dim_in_pixel();
    let center = ((w / 2) as i32, (h / 2) as i32);
    let radius = (w.min(h) as f64) * 0.35;
    let sizes: Vec<f64> = shares.iter().map(|s| s.count as f64).collect();
    let palette = [CYAN, MAGENTA, GREEN, YELLOW, BLUE, RED];
    let colors: Vec<RGBColor> = (0..shares.len())
        .map(|i| palette[i % palette.len()])
        .collect();
    let labels: Vec<&str> = shares.iter().map(|s| s.value.as_str()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(90.0);
    pie.label_style(("sans-serif", 18).into_font().color(&BLACK));
    pie.percentages(("sans-serif", radius * 0.08).into_font().color(&BLACK));
    root.draw(&pie)?;

    root.present()?;
    Ok(())
}

/// Write the four dashboard charts into `dir`, skipping charts with nothing to draw.
/// Returns the paths written.
pub fn export_dashboard_charts(dir: &Path, views: &Views, size: (u32, u32)) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let village = views.selection.village.as_deref().unwrap_or("-");
    let mut written = Vec::new();

    let crops: Vec<BarPoint> = views.crop_counts.iter().map(BarPoint::from).collect();
    if !crops.is_empty() {
        let path = dir.join(CROP_COUNTS_FILE);
        write_bar_chart_png(
            &path,
            &format!("Crops in {}", village),
            ("Crop", "Farmers"),
            &crops,
            size,
        )?;
        written.push(path);
    }

    let villages: Vec<BarPoint> = views.village_counts.iter().map(BarPoint::from).collect();
    if !villages.is_empty() {
        let path = dir.join(VILLAGE_COUNTS_FILE);
        write_bar_chart_png(
            &path,
            "Farmers per village",
            ("Village", "Farmers"),
            &villages,
            size,
        )?;
        written.push(path);
    }

    if !views.gender_shares.is_empty() {
        let path = dir.join(GENDER_SHARE_FILE);
        write_pie_chart_png(
            &path,
            &format!("Gender share in {}", village),
            &views.gender_shares,
            size,
        )?;
        written.push(path);
    }

    let areas: Vec<BarPoint> = views.area_by_farmer.iter().map(BarPoint::from).collect();
    if !areas.is_empty() {
        let path = dir.join(AREA_BY_FARMER_FILE);
        write_bar_chart_png(
            &path,
            &format!("Total area holding in {}", village),
            ("Farmer", "Area (Ha)"),
            &areas,
            size,
        )?;
        written.push(path);
    }

    info!(dir = %dir.display(), charts = written.len(), "exported charts");
    Ok(written)
}
