//! # 能带图
//!
//! 每条能带画成折线，自旋向下用第二种颜色；高对称点处画竖线并标注，
//! 费米能级处画虚线。路径断点（相邻 k 点距离相同）处断开折线。
//!
//! ## 依赖关系
//! - 被 `plot/mod.rs` 调用
//! - 使用 `plotters` 渲染

use super::{dash_segments, plot_error, PlotConfig};
use crate::error::{Result, ScreenError};
use crate::models::{BandRecord, BandTick};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// 单条折线 `(distance, energy)`
pub type Segment = Vec<(f64, f64)>;

/// 窗口内的绘图数据
#[derive(Debug, Clone, PartialEq)]
pub struct BandLines {
    pub title: String,
    pub spin_up: Vec<Segment>,
    pub spin_down: Vec<Segment>,
    pub ticks: Vec<BandTick>,
    pub fermi: f64,
    pub x_max: f64,
    pub y_range: (f64, f64),
}

/// 按路径断点把一条能带拆成若干折线
pub fn split_at_breaks(distances: &[f64], energies: &[f64]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current: Segment = Vec::new();
    for (i, (&d, &e)) in distances.iter().zip(energies).enumerate() {
        if i > 0 && (d - distances[i - 1]).abs() < 1e-12 && !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
        current.push((d, e));
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// 整条能带都落在窗口之外则不画
fn band_segments(
    bands: &[Vec<f64>],
    record: &BandRecord,
    config: &PlotConfig,
) -> Vec<Segment> {
    bands
        .iter()
        .filter_map(|band| {
            let shifted: Vec<f64> = band
                .iter()
                .map(|e| config.energy(*e, record.efermi))
                .collect();
            let lo = shifted.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = shifted.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (hi >= config.emin && lo <= config.emax).then_some(shifted)
        })
        .flat_map(|shifted| split_at_breaks(&record.distances, &shifted))
        .collect()
}

/// 截取能量窗口
pub fn prepare(record: &BandRecord, config: &PlotConfig) -> Result<BandLines> {
    let spin_up = band_segments(&record.spin_up, record, config);
    let spin_down = record
        .spin_down
        .as_ref()
        .map(|d| band_segments(d, record, config))
        .unwrap_or_default();

    if spin_up.is_empty() && spin_down.is_empty() {
        return Err(ScreenError::PlotError(format!(
            "{}: no bands inside [{}, {}] eV",
            record.material_id, config.emin, config.emax
        )));
    }

    let x_max = record.distances.last().copied().unwrap_or(0.0).max(1e-6);

    Ok(BandLines {
        title: format!("{} band structure", record.material_id),
        spin_up,
        spin_down,
        ticks: record.ticks.clone(),
        fermi: config.fermi_position(record.efermi),
        x_max,
        y_range: (config.emin, config.emax),
    })
}

/// 绘制能带图
pub fn draw_band_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    lines: &BandLines,
    config: &PlotConfig,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_error)?;

    let (y_min, y_max) = lines.y_range;
    let mut chart = ChartBuilder::on(root)
        .caption(&lines.title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..lines.x_max, y_min..y_max)
        .map_err(plot_error)?;

    let y_desc = if config.shift_fermi {
        "E - E_F (eV)"
    } else {
        "E (eV)"
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .y_desc(y_desc)
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_error)?;

    // 高对称点
    let tick_style = BLACK.mix(0.5).stroke_width(1);
    for tick in &lines.ticks {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(tick.distance, y_min), (tick.distance, y_max)],
                tick_style,
            )))
            .map_err(plot_error)?;

        let text_style = ("sans-serif", 16)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        chart
            .draw_series(std::iter::once(Text::new(
                tick.label.clone(),
                (tick.distance, y_min),
                text_style,
            )))
            .map_err(plot_error)?;
    }

    let up_color = RGBColor(0, 102, 204);
    let down_color = RGBColor(204, 51, 0);

    for segment in &lines.spin_up {
        chart
            .draw_series(LineSeries::new(
                segment.iter().copied(),
                up_color.stroke_width(2),
            ))
            .map_err(plot_error)?;
    }
    for segment in &lines.spin_down {
        chart
            .draw_series(LineSeries::new(
                segment.iter().copied(),
                down_color.stroke_width(1),
            ))
            .map_err(plot_error)?;
    }

    // E_F
    let fermi_style = BLACK.mix(0.6).stroke_width(1);
    chart
        .draw_series(
            dash_segments((0.0, lines.fermi), (lines.x_max, lines.fermi), 40)
                .into_iter()
                .map(|seg| PathElement::new(seg.to_vec(), fermi_style)),
        )
        .map_err(plot_error)?;

    Ok(())
}
