//! Headless inspectet: load an alignment into an in-memory scene, print
//! its table and run commands against it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use inspectet::alignment::{AlignmentFormat, VolumeDimension};
use inspectet::command::InspectCommand;
use inspectet::io::{LoadRequest, Location};
use inspectet::options::Options;
use inspectet::playback::{PlayArgs, PlaybackOutcome};
use inspectet::scene::MemoryScene;
use inspectet::session::Session;
use inspectet::InspectError;

#[derive(Parser)]
#[command(name = "inspectet")]
#[command(
    about = "Load a tilt-series alignment and inspect its scene placement"
)]
#[command(version)]
struct Cli {
    /// Alignment file, IMOD basename, or s3://bucket/key.
    alignment: String,

    /// Alignment format: portal, imod or aretomo3 (default from options).
    #[arg(long, short)]
    format: Option<String>,

    /// Volume size along X, Y, Z.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
    volume_size: Option<Vec<f64>>,

    /// Use the volume size from the options file when none is given.
    #[arg(long)]
    default_size: bool,

    /// Reconstructed volume (.mrc).
    #[arg(long)]
    volume: Option<String>,

    /// Raw tilt series (.mrc).
    #[arg(long)]
    tilt_series: Option<String>,

    /// Options file (TOML).
    #[arg(long)]
    options: Option<PathBuf>,

    /// Select the section with this z-index after loading.
    #[arg(long)]
    z: Option<usize>,

    /// Command to run after loading, e.g. "inspectet play loopNumber 2".
    /// May be repeated.
    #[arg(long = "run")]
    commands: Vec<String>,

    /// Print the alignment table.
    #[arg(long)]
    table: bool,
}

fn request(cli: &Cli, options: &Options) -> Result<LoadRequest, InspectError> {
    let format = match &cli.format {
        Some(name) => name.parse::<AlignmentFormat>()?,
        None => options.input.format,
    };
    let location = Location::parse(&cli.alignment)?;
    let mut request = LoadRequest::new(format, location);
    if let Some(size) = &cli.volume_size {
        if let [x, y, z] = size[..] {
            request = request.with_volume_size(VolumeDimension::new(x, y, z)?);
        }
    } else if cli.default_size {
        request = request.with_volume_size(options.default_volume_size()?);
    }
    if let Some(volume) = &cli.volume {
        request = request.with_volume_file(Location::parse(volume)?);
    }
    if let Some(ts) = &cli.tilt_series {
        request = request.with_tilt_series(Location::parse(ts)?);
    }
    Ok(request)
}

#[allow(clippy::print_stdout)]
fn print_table(session: &Session<MemoryScene>) {
    if let Some(table) = session.table() {
        print!("{}", table.render());
    }
}

fn run(cli: &Cli) -> Result<(), InspectError> {
    let options = match &cli.options {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    let request = request(cli, &options)?;
    let defaults = PlayArgs::from(&options.playback);

    let mut session = Session::new(MemoryScene::headless(), options);
    session.load(&request)?;

    if let Some(z) = cli.z {
        if session.select_z(z)?.is_none() {
            log::warn!("no section with z-index {z}");
        }
    }
    if cli.table {
        print_table(&session);
    }
    for line in &cli.commands {
        let command = InspectCommand::parse_with(line, defaults)?;
        match session.execute(&command)? {
            PlaybackOutcome::Completed { views, frames } => {
                log::info!("played {views} views over {frames} frames");
            }
            PlaybackOutcome::Skipped(reason) => {
                log::info!("playback skipped: {reason:?}");
            }
        }
    }

    let host = session.close();
    log::debug!("closed session, {} objects left", host.len());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
