use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use log::{info, warn};

mod assoc;
mod error;
mod render;
mod strip;

use render::{ImageFormat, StripStyle};
use strip::StripPlot;

fn main() {
    init_logger();
    if let Err(e) = real_main() {
        eprintln!("[ERROR] {e:#}");
        std::process::exit(1);
    }
}

/// `[LEVEL] message` lines on stdout.
fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();
}

fn cli() -> Command {
    Command::new("chromstrip")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Strip plot of -log10(P) for one chromosome from an association results file")
        .arg(
            Arg::new("chromnum")
                .help("Chromosome number (used as the plot's category label)")
                .short('c')
                .long("chromnum")
                .required(true)
                .value_name("CHR"),
        )
        .arg(
            Arg::new("infile")
                .help("Association file with a header containing BP and P columns")
                .short('i')
                .long("infile")
                .required(true)
                .value_name("FILE"),
        )
        .arg(
            Arg::new("outfile")
                .help("Output image; format from extension (png, jpg, bmp, svg)")
                .short('o')
                .long("outfile")
                .required(true)
                .value_name("IMAGE"),
        )
}

fn real_main() -> Result<()> {
    let matches = cli().get_matches();
    run(&matches)
}

fn run(matches: &ArgMatches) -> Result<()> {
    let chromnum = matches
        .get_one::<String>("chromnum")
        .expect("required by clap");
    let infile = PathBuf::from(matches.get_one::<String>("infile").expect("required by clap"));
    let outfile = PathBuf::from(matches.get_one::<String>("outfile").expect("required by clap"));

    info!("Chrom : {}", chromnum);
    info!("Input : {}", infile.display());
    info!("Output: {}", outfile.display());

    // Fail on an unusable output name before reading anything.
    let format = ImageFormat::from_path(&outfile)?;
    info!("Format: {:?}", format);

    let table = assoc::read_assoc(&infile)?;
    info!(
        "Loaded {} complete rows ({} delimiter), dropped {} with missing fields",
        table.len(),
        table.delimiter.name(),
        table.dropped
    );
    if let Some((lo, hi)) = table.bp_span() {
        info!("BP span: {} .. {}", lo, hi);
    }
    if table.is_empty() {
        warn!("No complete rows in {}; the strip will be empty", infile.display());
    }

    let plot = StripPlot::build(chromnum, &table)?;
    if let Some((lo, hi)) = plot.y_range() {
        info!("-log10(P) range: {:.3} .. {:.3}", lo, hi);
    }

    render::write_strip_plot(&plot, &outfile, &StripStyle::default())?;
    info!("Plot complete. Total {} points drawn.", plot.len());
    info!("Wrote {}", outfile.display());
    Ok(())
}
