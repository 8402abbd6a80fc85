use crate::error::{PlotError, Result};
use crate::strip::{neg_log10, StripPlot};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::RGBColor;
use std::path::Path;

/// Output encodings, chosen by the output file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Svg,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => Ok(ImageFormat::Png),
            Some("jpg") | Some("jpeg") => Ok(ImageFormat::Jpeg),
            Some("bmp") => Ok(ImageFormat::Bmp),
            Some("svg") => Ok(ImageFormat::Svg),
            Some(other) => Err(PlotError::io(
                path,
                format!("unsupported image format '.{}' (use png, jpg, bmp or svg)", other),
            )),
            None => Err(PlotError::io(
                path,
                "cannot infer image format without a file extension",
            )),
        }
    }

    /// Suffix for the staged file; the bitmap encoder picks its format from it.
    fn suffix(self) -> &'static str {
        match self {
            ImageFormat::Png => ".png",
            ImageFormat::Jpeg => ".jpg",
            ImageFormat::Bmp => ".bmp",
            ImageFormat::Svg => ".svg",
        }
    }
}

/// Figure settings. Defaults reproduce a 15x10 in figure at 100 dpi.
#[derive(Debug, Clone)]
pub struct StripStyle {
    pub width: u32,
    pub height: u32,
    pub point_color: RGBColor,
    pub point_radius: u32,
    /// Axis title size in px (28 pt)
    pub axis_desc_size: f64,
    /// Tick label size in px (18 pt)
    pub tick_label_size: f64,
    /// Optional reference p-value drawn as a horizontal line, e.g. 5e-8
    pub genome_wide_line: Option<f64>,
    pub line_color: RGBColor,
}

impl Default for StripStyle {
    fn default() -> Self {
        StripStyle {
            width: 1500,
            height: 1000,
            point_color: RGBColor(0x00, 0x95, 0xff),
            point_radius: 4,
            axis_desc_size: 39.0,
            tick_label_size: 25.0,
            genome_wide_line: None,
            line_color: RGBColor(0xff, 0xbf, 0x00),
        }
    }
}

/// y-axis span: always includes 0, at least up to 1, with 5% headroom.
fn y_bounds(plot: &StripPlot, style: &StripStyle) -> (f64, f64) {
    let (lo, hi) = plot.y_range().unwrap_or((0.0, 0.0));
    let hi = match style.genome_wide_line.and_then(neg_log10) {
        Some(line) => hi.max(line),
        None => hi,
    };
    ((lo * 1.05).min(0.0), (hi * 1.05).max(1.0))
}

/// Tick text on the category axis: the chromosome label at the centre, nothing elsewhere.
fn category_tick(label: &str, x: f64) -> String {
    if x.abs() < 1e-9 {
        label.to_string()
    } else {
        String::new()
    }
}

fn draw_strip<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    plot: &StripPlot,
    style: &StripStyle,
) -> anyhow::Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (y_min, y_max) = y_bounds(plot, style);

    // One category centred on x = 0.
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(110)
        .build_cartesian_2d(-0.5f64..0.5f64, y_min..y_max)?;

    let label = plot.label.as_str();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("Chromosome")
        .y_desc("-log10(P)")
        .x_labels(3)
        .x_label_formatter(&|x: &f64| category_tick(label, *x))
        .label_style(("sans-serif", style.tick_label_size))
        .axis_desc_style(("sans-serif", style.axis_desc_size))
        .draw()?;

    if let Some(y) = style.genome_wide_line.and_then(neg_log10) {
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(-0.5, y), (0.5, y)],
            style.line_color.stroke_width(2),
        )))?;
    }

    let color = style.point_color;
    let radius = style.point_radius;
    chart.draw_series(
        plot.points
            .iter()
            .map(|p| Circle::new((p.offset, p.y), radius, color.filled())),
    )?;

    root.present()?;
    Ok(())
}

/// Render `plot` to `output`. The image is drawn into a hidden file next to
/// `output` and only moved into place once complete.
pub fn write_strip_plot(plot: &StripPlot, output: &Path, style: &StripStyle) -> Result<()> {
    let format = ImageFormat::from_path(output)?;
    let dir = match output.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let staged = tempfile::Builder::new()
        .prefix(".chromstrip-")
        .suffix(format.suffix())
        .tempfile_in(dir)
        .map_err(|e| PlotError::io(output, e))?;

    let size = (style.width, style.height);
    let drawn = match format {
        ImageFormat::Svg => {
            draw_strip(SVGBackend::new(staged.path(), size).into_drawing_area(), plot, style)
        }
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp => {
            draw_strip(BitMapBackend::new(staged.path(), size).into_drawing_area(), plot, style)
        }
    };
    drawn.map_err(|e| PlotError::io(output, format!("{e:#}")))?;

    // tempfile creates 0600; give the image ordinary permissions
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| PlotError::io(output, e))?;
    }

    staged
        .persist(output)
        .map_err(|e| PlotError::io(output, e.error))?;
    Ok(())
}
