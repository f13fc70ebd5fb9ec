//! # 态密度图
//!
//! 总 DOS、自旋向上、自旋向下（取负）三条曲线，费米能级处画虚线。
//!
//! ## 依赖关系
//! - 被 `plot/mod.rs` 调用
//! - 使用 `plotters` 渲染

use super::{dash_segments, plot_error, PlotConfig};
use crate::error::{Result, ScreenError};
use crate::models::DosRecord;

use plotters::prelude::*;

/// 窗口内的绘图数据
#[derive(Debug, Clone, PartialEq)]
pub struct DosCurves {
    pub title: String,
    /// `(energy, density)`
    pub total: Vec<(f64, f64)>,
    pub spin_up: Vec<(f64, f64)>,
    /// 已取负
    pub spin_down: Option<Vec<(f64, f64)>>,
    pub fermi: f64,
    pub y_range: (f64, f64),
}

/// 截取能量窗口并计算纵轴范围
pub fn prepare(record: &DosRecord, config: &PlotConfig) -> Result<DosCurves> {
    let in_window: Vec<usize> = record
        .energies
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            let e = config.energy(**e, record.efermi);
            e >= config.emin && e <= config.emax
        })
        .map(|(i, _)| i)
        .collect();

    if in_window.is_empty() {
        return Err(ScreenError::PlotError(format!(
            "{}: no DOS points inside [{}, {}] eV",
            record.material_id, config.emin, config.emax
        )));
    }

    let series = |values: &[f64], sign: f64| -> Vec<(f64, f64)> {
        in_window
            .iter()
            .filter_map(|&i| {
                values
                    .get(i)
                    .map(|v| (config.energy(record.energies[i], record.efermi), sign * v))
            })
            .collect()
    };

    let total = series(&record.total, 1.0);
    let spin_up = series(&record.spin_up, 1.0);
    let spin_down = record.spin_down.as_ref().map(|d| series(d, -1.0));

    let mut y_max = total
        .iter()
        .chain(spin_up.iter())
        .map(|(_, y)| *y)
        .fold(0.0_f64, f64::max);
    let mut y_min = spin_down
        .iter()
        .flatten()
        .map(|(_, y)| *y)
        .fold(0.0_f64, f64::min);
    if y_max <= 0.0 && y_min >= 0.0 {
        y_max = 1.0;
    }
    let pad = 0.05 * (y_max - y_min);
    y_max += pad;
    if y_min < 0.0 {
        y_min -= pad;
    }

    Ok(DosCurves {
        title: format!("{} DOS", record.material_id),
        total,
        spin_up,
        spin_down,
        fermi: config.fermi_position(record.efermi),
        y_range: (y_min, y_max),
    })
}

/// 绘制 DOS 图
pub fn draw_dos_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    curves: &DosCurves,
    config: &PlotConfig,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_error)?;

    let x_range = if config.shift_fermi {
        config.emin..config.emax
    } else {
        let lo = curves.total.first().map(|(x, _)| *x).unwrap_or(config.emin);
        let hi = curves.total.last().map(|(x, _)| *x).unwrap_or(config.emax);
        lo..hi.max(lo + 1e-6)
    };
    let (y_min, y_max) = curves.y_range;

    let mut chart = ChartBuilder::on(root)
        .caption(&curves.title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_min..y_max)
        .map_err(plot_error)?;

    let x_desc = if config.shift_fermi {
        "E - E_F (eV)"
    } else {
        "E (eV)"
    };
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("DOS (states/eV)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_error)?;

    let total_color = RGBColor(40, 40, 40);
    let up_color = RGBColor(0, 102, 204);
    let down_color = RGBColor(204, 51, 0);

    chart
        .draw_series(LineSeries::new(
            curves.total.iter().copied(),
            total_color.stroke_width(2),
        ))
        .map_err(plot_error)?
        .label("Total")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], total_color));

    chart
        .draw_series(LineSeries::new(
            curves.spin_up.iter().copied(),
            up_color.stroke_width(2),
        ))
        .map_err(plot_error)?
        .label("Spin up")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], up_color));

    if let Some(ref down) = curves.spin_down {
        chart
            .draw_series(LineSeries::new(down.iter().copied(), down_color.stroke_width(2)))
            .map_err(plot_error)?
            .label("Spin down")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], down_color));
    }

    // E_F
    let fermi_style = BLACK.mix(0.6).stroke_width(1);
    chart
        .draw_series(
            dash_segments((curves.fermi, y_min), (curves.fermi, y_max), 30)
                .into_iter()
                .map(|seg| PathElement::new(seg.to_vec(), fermi_style)),
        )
        .map_err(plot_error)?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 14))
        .draw()
        .map_err(plot_error)?;

    Ok(())
}
