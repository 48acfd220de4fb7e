//! # ASCOT5IO
//!
//! Command-line access to ASCOT5 HDF5 inputs: list what a file holds,
//! write options and analytic fields, and evaluate field quantities.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, info};

use ascot5io::bfield::{self, b_2d, b_gs, BfieldType};
use ascot5io::hdf5io::{self, markers, options};
use ascot5io::*;

/// ASCOT5 HDF5 input tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// HDF5 file (overrides the configuration)
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the inputs stored in the file
    Ls,

    /// Simulation options
    Options {
        #[command(subcommand)]
        action: OptionsAction,
    },

    /// Magnetic field inputs
    Bfield {
        #[command(subcommand)]
        action: BfieldAction,
    },

    /// Marker input
    Markers {
        #[command(subcommand)]
        action: MarkersAction,
    },

    /// Evaluate a quantity on the configured Rz grid and print its range
    Eval {
        /// Quantity name, e.g. psi or bphi
        quantity: String,
    },
}

#[derive(Subcommand)]
enum OptionsAction {
    /// Write options from a TOML table as a new instance
    Write {
        input: PathBuf,
        /// Instance description
        #[arg(short, long)]
        desc: Option<String>,
    },
    /// Print an options instance
    Read {
        /// 10-digit qid; defaults to the active instance
        qid: Option<String>,
    },
}

#[derive(Subcommand)]
enum BfieldAction {
    /// Write an analytic B_GS field from TOML
    WriteGs { input: PathBuf },
    /// Tabulate an analytic field from TOML into B_2D
    Write2d { input: PathBuf },
    /// Print the active field
    Show,
}

#[derive(Subcommand)]
enum MarkersAction {
    /// Print the stored markers
    Show,
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(file) = cli.file {
        config.file = file;
    }
    debug!(file = %config.file.display(), "using file");

    match cli.command {
        Commands::Ls => list(&config)?,
        Commands::Options { action } => match action {
            OptionsAction::Write { input, desc } => {
                let opts = options::options_from_toml(&std::fs::read_to_string(input)?)?;
                let desc = desc.unwrap_or_else(|| config.description.clone());
                let qid = options::write_hdf5(&config.file, &opts, &desc)?;
                println!("{}", qid);
            }
            OptionsAction::Read { qid } => {
                let qid = match qid {
                    Some(q) => Qid::parse(&q)?,
                    None => active_options(&config)?,
                };
                let input = options::read_hdf5(&config.file, &qid)?;
                println!("{} ({}) {}", qid, input.date, input.description);
                for (name, data) in &input.data {
                    println!("  {:<32} {}", name, format_data(data));
                }
            }
        },
        Commands::Bfield { action } => match action {
            BfieldAction::WriteGs { input } => {
                let gs = GsConfig::from_toml(&std::fs::read_to_string(input)?)?;
                b_gs::write_hdf5(&config.file, &gs.to_input()?)?;
            }
            BfieldAction::Write2d { input } => {
                let gs = GsConfig::from_toml(&std::fs::read_to_string(input)?)?;
                let (rgrid, zgrid) = match (gs.rgrid, gs.zgrid) {
                    (Some(r), Some(z)) => (r, z),
                    _ => {
                        let err = Error::InvalidGrid("rgrid and zgrid are required".into());
                        return Err(err.into());
                    }
                };
                b_gs::write_hdf5_b_2d(&config.file, &gs.equilibrium()?, rgrid, zgrid)?;
            }
            BfieldAction::Show => show_bfield(&config)?,
        },
        Commands::Markers { action } => match action {
            MarkersAction::Show => {
                let set = markers::read_hdf5(&config.file)?;
                println!(
                    "particles: {}  guiding centers: {}  field lines: {}",
                    set.particle.len(),
                    set.guiding_center.len(),
                    set.field_line.len()
                );
                for m in set.to_markers() {
                    println!("  {:?}", m);
                }
            }
        },
        Commands::Eval { quantity } => {
            let ctx = Ascot5::open(&config.file)?;
            let evaluator = ctx.analytic_evaluator()?;
            let request = RzRequest::from_config(&config.rz)?;
            let grid = request.grid();
            let values = evaluator.eval_rz(&request, &quantity)?;
            info!(%quantity, nr = grid.nr(), nz = grid.nz(), "evaluated");
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            println!(
                "{} on {} x {} (phi = {} deg, t = {} s)",
                quantity,
                grid.nr(),
                grid.nz(),
                request.phi_deg,
                request.time
            );
            println!("  min = {:.6e}  max = {:.6e}", min, max);
            if let Some(psi) = evaluator.separatrix_psi() {
                println!("  separatrix psi = {:.6e}", psi);
            }
        }
    }

    Ok(())
}

fn list(config: &Config) -> Result<()> {
    for group in hdf5io::list_inputs(&config.file)? {
        let tag = group.active.or(group.kind).unwrap_or_default();
        println!("{} [{}]", group.name, tag);
        for inst in group.instances {
            println!(
                "  {:<16} {:<20} {}",
                inst.name,
                inst.date.unwrap_or_default(),
                inst.description.unwrap_or_default()
            );
        }
    }
    Ok(())
}

fn active_options(config: &Config) -> Result<Qid> {
    let file = hdf5::File::open(&config.file)?;
    hdf5io::group::get_active(&file, OPTIONS_GROUP)
}

fn show_bfield(config: &Config) -> Result<()> {
    match bfield::active_type(&config.file)? {
        BfieldType::Gs => {
            let gs = b_gs::read_hdf5(&config.file)?;
            println!("B_GS");
            println!("  R0 = {}  z0 = {}  B_phi0 = {}", gs.r0, gs.z0, gs.b_phi0);
            println!("  psi0 = {}  psi1 = {}  psi_mult = {}", gs.psi0, gs.psi1, gs.psi_mult);
            println!("  psi_coeff = {:?}", gs.psi_coeff.as_slice());
        }
        BfieldType::TwoD => {
            let b = b_2d::read_hdf5(&config.file)?;
            let (nz, nr) = b.shape();
            println!("B_2D");
            println!(
                "  R: [{}, {}] x {}  z: [{}, {}] x {}",
                b.rlim[0], b.rlim[1], nr, b.zlim[0], b.zlim[1], nz
            );
            println!(
                "  axis = ({}, {})  psi = [{}, {}]",
                b.axis[0], b.axis[1], b.psivals[0], b.psivals[1]
            );
        }
    }
    Ok(())
}

fn format_data(data: &Data) -> String {
    match data {
        Data::Float(a) => format!("{:?}", a.iter().collect::<Vec<_>>()),
        Data::Int(a) => format!("{:?}", a.iter().collect::<Vec<_>>()),
    }
}
