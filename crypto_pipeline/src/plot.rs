use aggregator::{Dataset, TrendSummary};
use chrono::Duration;
use log::info;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("nothing to plot: {0}")]
    NoData(String),

    #[error("render error: {0}")]
    Render(String),
}

fn render_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Render(e.to_string())
}

/// (min, max) padded so a flat series still gets a visible band.
fn padded_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    let pad = if hi > lo { (hi - lo) * 0.1 } else { lo.abs().max(1.0) * 0.05 };
    Some((lo - pad, hi + pad))
}

/// One line per asset across the percent-change horizons.
pub fn render_trend_chart<P: AsRef<Path>>(trends: &TrendSummary, path: P) -> Result<(), PlotError> {
    let labels: Vec<&str> = trends.fields.iter().map(|f| f.label()).collect();
    let series: Vec<(&str, Vec<(i32, f64)>)> = trends
        .rows
        .iter()
        .map(|r| {
            let points = r
                .means
                .iter()
                .enumerate()
                .filter_map(|(i, m)| m.map(|v| (i as i32, v)))
                .collect();
            (r.name.as_str(), points)
        })
        .collect();
    let (y_lo, y_hi) = padded_range(series.iter().flat_map(|(_, pts)| pts.iter().map(|p| p.1)))
        .ok_or_else(|| PlotError::NoData("trend summary has no values".to_string()))?;

    let root = SVGBackend::new(path.as_ref(), (1200, 800)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Cryptocurrency Price Change Trends Over Time", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-1i32..labels.len() as i32, y_lo..y_hi)
        .map_err(render_err)?;

    let label_of = |x: &i32| usize::try_from(*x).ok().and_then(|i| labels.get(i)).map(|l| l.to_string()).unwrap_or_default();
    chart
        .configure_mesh()
        .x_labels(labels.len() + 2)
        .x_label_formatter(&label_of)
        .x_desc("Time Period")
        .y_desc("Average Percent Change (%)")
        .draw()
        .map_err(render_err)?;

    for (idx, (name, points)) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(render_err)?
            .label(*name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart
            .draw_series(points.iter().map(|p| Circle::new(*p, 4, color.filled())))
            .map_err(render_err)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(render_err)?;
    root.present().map_err(render_err)?;
    info!("trend chart written to {}", path.as_ref().display());
    Ok(())
}

/// Price of one asset over collection time.
pub fn render_price_chart<P: AsRef<Path>>(dataset: &Dataset, asset: &str, currency: &str, path: P) -> Result<(), PlotError> {
    let rows: Vec<_> = dataset
        .records_for(asset)
        .filter_map(|r| r.price(currency).map(|p| (r.timestamp, p)))
        .collect();
    let start = rows
        .iter()
        .map(|(ts, _)| *ts)
        .min()
        .ok_or_else(|| PlotError::NoData(format!("no {} price data", asset)))?;
    let points: Vec<(f64, f64)> = rows
        .iter()
        .map(|(ts, p)| ((*ts - start).num_milliseconds() as f64 / 1000.0, *p))
        .collect();
    let span = points.iter().map(|p| p.0).fold(0.0, f64::max).max(1.0);
    let (y_lo, y_hi) = padded_range(points.iter().map(|p| p.1))
        .ok_or_else(|| PlotError::NoData(format!("no {} price data", asset)))?;

    let root = SVGBackend::new(path.as_ref(), (1200, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} Price Over Time", asset), ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..span, y_lo..y_hi)
        .map_err(render_err)?;

    let time_of = |secs: &f64| (start + Duration::milliseconds((*secs * 1000.0) as i64)).format("%H:%M:%S").to_string();
    chart
        .configure_mesh()
        .x_label_formatter(&time_of)
        .x_desc("Timestamp")
        .y_desc(format!("Price ({})", currency))
        .draw()
        .map_err(render_err)?;

    let orange = RGBColor(255, 165, 0);
    chart
        .draw_series(LineSeries::new(points.iter().copied(), orange.stroke_width(2)))
        .map_err(render_err)?;
    chart
        .draw_series(points.iter().map(|p| Circle::new(*p, 3, orange.filled())))
        .map_err(render_err)?;
    root.present().map_err(render_err)?;
    info!("{} price chart written to {}", asset, path.as_ref().display());
    Ok(())
}
