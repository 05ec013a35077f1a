//! A CLI tool that loads a folder of DICOM slices and writes
//! the axial, sagittal and coronal planes as PNG files.
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dicom_orthoview::{
    Orientation, RenderOptions, ResizeFilter, ViewBounds, ViewState, VolumeBuilder, Window,
    render::DEFAULT_OUTPUT_SIZE,
    window::{DEFAULT_WINDOW_LEVEL, DEFAULT_WINDOW_WIDTH},
};
use tracing::{Level, error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Filter {
    Nearest,
    Bilinear,
    Lanczos3,
}

impl From<Filter> for ResizeFilter {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Nearest => ResizeFilter::Nearest,
            Filter::Bilinear => ResizeFilter::Bilinear,
            Filter::Lanczos3 => ResizeFilter::Lanczos3,
        }
    }
}

/// Render orthogonal slices of a DICOM series
#[derive(Debug, Parser)]
struct App {
    /// Folder containing the .dcm files of one series
    dir: PathBuf,

    /// Folder to write axial.png, sagittal.png and coronal.png to
    #[arg(short = 'o', long = "out", default_value = ".")]
    output: PathBuf,

    /// Axial slice index (default is the centre)
    #[arg(long)]
    axial: Option<usize>,

    /// Sagittal slice index (default is the centre)
    #[arg(long)]
    sagittal: Option<usize>,

    /// Coronal slice index (default is the centre)
    #[arg(long)]
    coronal: Option<usize>,

    /// Window width
    #[arg(long = "width", default_value_t = DEFAULT_WINDOW_WIDTH)]
    window_width: i32,

    /// Window level
    #[arg(long = "level", default_value_t = DEFAULT_WINDOW_LEVEL, allow_negative_numbers = true)]
    window_level: i32,

    /// Side length of the output images in pixels
    #[arg(long, default_value_t = DEFAULT_OUTPUT_SIZE)]
    size: u32,

    /// Resampling filter for all planes
    #[arg(long, value_enum, default_value = "lanczos3")]
    filter: Filter,

    /// Print more information about the loading process
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    let App {
        dir,
        output,
        axial,
        sagittal,
        coronal,
        window_width,
        window_level,
        size,
        filter,
        verbose,
    } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )
    .unwrap_or_else(|e| {
        eprintln!("[ERROR] Could not set up global logging subscriber: {e}");
    });

    let volume = VolumeBuilder::load_from_directory(&dir).unwrap_or_else(|e| {
        error!("Could not load {}: {e}", dir.display());
        std::process::exit(-1);
    });
    println!("{}", volume.header());

    let mut view = ViewState::centered(&volume, Window::new(window_width, window_level));
    for (orientation, index) in [
        (Orientation::Axial, axial),
        (Orientation::Sagittal, sagittal),
        (Orientation::Coronal, coronal),
    ] {
        if let Some(index) = index {
            view = view.with_index(orientation, index);
        }
    }
    let view = ViewBounds::default().clamp(view, &volume);

    let options = RenderOptions {
        output_size: size,
        filter: filter.into(),
    };
    let views = options.render(&volume, &view).unwrap_or_else(|e| {
        error!("{e}");
        std::process::exit(-2);
    });

    // images are written unannotated, the slice index goes to the log
    for plane in views.planes() {
        let path = output.join(format!("{}.png", plane.orientation.name()));
        plane.image.save(&path).unwrap_or_else(|e| {
            error!("Could not save {}: {e}", path.display());
            std::process::exit(-3);
        });
        info!(
            "{} slice {} saved to {}",
            plane.orientation.name(),
            plane.index,
            path.display()
        );
    }
}
