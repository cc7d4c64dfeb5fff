use anyhow::{Context, Result};
use clap::ValueEnum;
use lead_flow::{
    AssistantConfig,
    chart::{BarChart, Horizon, LineChart, PieChart, headline_roi},
};

/// Width of the longest bar in terminal columns
const BAR_COLUMNS: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
}

pub fn run(
    config: &AssistantConfig,
    years: u32,
    kind: ChartKind,
    progress: f64,
    svg: bool,
) -> Result<()> {
    let horizon = Horizon::from_years(years)
        .with_context(|| format!("unsupported horizon {years}, expected 5, 10 or 15"))?;
    let rows = config.charts.rows(horizon);
    let roi = headline_roi(rows).context("no projection rows for this horizon")?;

    match kind {
        ChartKind::Line => {
            let chart = LineChart::compute(rows, progress);
            if svg {
                println!("{}", chart.to_svg());
                return Ok(());
            }
            println!("Simulação de Rentabilidade ({horizon}), ROI final {roi:.0}%");
            println!("{:<8} {:>14} {:>14}", "período", "lucro (x,y)", "roi (x,y)");
            for ((label, profit), roi) in chart.labels.iter().zip(&chart.profit).zip(&chart.roi) {
                println!(
                    "{label:<8} {:>14} {:>14}",
                    format!("{:.0},{:.1}", profit.x, profit.y),
                    format!("{:.0},{:.1}", roi.x, roi.y)
                );
            }
        }
        ChartKind::Bar => {
            if svg {
                anyhow::bail!("SVG output is only available for line and pie charts");
            }
            let chart = BarChart::compute(rows, progress);
            let tallest = chart.bars.iter().map(|b| b.height).fold(0.0, f64::max);
            println!("Receita anual ({horizon})");
            for bar in &chart.bars {
                let width = if tallest > 0.0 {
                    (bar.height / tallest * BAR_COLUMNS * progress.clamp(0.0, 1.0)).round()
                        as usize
                } else {
                    0
                };
                println!("{:<8} {:<40} {}", bar.period, "#".repeat(width), bar.label);
            }
        }
        ChartKind::Pie => {
            let chart = PieChart::compute(rows, progress);
            if svg {
                println!("{}", chart.to_svg(&format!("{roi:.0}%")));
                return Ok(());
            }
            println!("Composição do retorno ({horizon}), ROI total {roi:.0}%");
            for slice in &chart.slices {
                println!(
                    "{:<22} R$ {:>10.0}  {:>7.1}° -> {:>7.1}°",
                    slice.label, slice.value, slice.start_angle, slice.end_angle
                );
            }
        }
    }
    Ok(())
}
