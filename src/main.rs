use std::{fs::File, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use fasplit::{output_dir_for, resolve_inputs, ErrorCode, FormatOptions, SplitError, SplitOptions};
use log::{error, info};

/// Split a protein FASTA file into residue-balanced chunks.
#[derive(Parser)]
#[clap(version, about)]
struct Args {
    /// Input FASTA file; the file name may contain * and ? wildcards
    #[clap(required = true)]
    input: PathBuf,

    /// Output directory (defaults to the directory of the input)
    #[clap(short, long)]
    output_dir: Option<PathBuf>,

    /// XML parameter file overriding the split options
    #[clap(short, long)]
    param_file: Option<PathBuf>,

    /// Number of files to create
    #[clap(short = 'n', long)]
    split_count: Option<usize>,

    /// Target size of each output file in MB (0 = default)
    #[clap(long)]
    target_size_mb: Option<u32>,

    /// Derive the number of files from --target-size-mb
    #[clap(long)]
    by_size: bool,

    /// Base name of the output files (defaults to the input name)
    #[clap(long)]
    output_name: Option<String>,

    /// Residues per line in the output files
    #[clap(long, default_value_t = fasplit::DEFAULT_RESIDUES_PER_LINE)]
    residues_per_line: usize,

    /// Search subdirectories for matching inputs
    #[clap(short = 's', long)]
    recurse: bool,

    /// Directory levels to search when recursing (0 = unlimited)
    #[clap(long, default_value_t = 0)]
    max_depth: usize,

    /// Alternative output directory for recursed inputs
    #[clap(long)]
    alt_output_dir: Option<PathBuf>,

    /// Re-create the input directory hierarchy under --alt-output-dir
    #[clap(long, requires = "alt_output_dir")]
    mirror_dirs: bool,

    /// Write log messages to this file instead of stderr
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logger(args: &Args) -> Result<()> {
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn options(args: &Args) -> fasplit::Result<SplitOptions> {
    let mut options = SplitOptions {
        format: FormatOptions::default().with_residues_per_line(args.residues_per_line)?,
        output_name: args.output_name.clone().unwrap_or_default(),
        ..Default::default()
    };
    if let Some(split_count) = args.split_count {
        options.split_count = split_count;
    }
    if let Some(target_size_mb) = args.target_size_mb {
        options.target_size_mb = target_size_mb;
    }
    options.use_target_size = args.by_size;
    if let Some(path) = &args.param_file {
        options.load_parameter_file(path)?;
    }
    Ok(options)
}

fn run(args: &Args) -> fasplit::Result<()> {
    let options = options(args)?;
    let inputs = resolve_inputs(&args.input, args.recurse, args.max_depth)?;
    let output_dir = args.output_dir.clone().unwrap_or_default();
    let alt_output_dir = if args.recurse {
        args.alt_output_dir.as_deref()
    } else {
        None
    };

    for input in &inputs {
        let dir = output_dir_for(input, &output_dir, alt_output_dir, args.mirror_dirs);
        let result = options.run(&input.path, &dir)?;
        info!(
            "{}: {} records into {} file(s); stats in {}",
            input.path.display(),
            result.records_processed,
            result.split_count(),
            result.stats_path.display()
        );
    }
    Ok(())
}

fn exit_code(err: &SplitError) -> ExitCode {
    match err.code() {
        ErrorCode::NoError => ExitCode::SUCCESS,
        code => ExitCode::from(u8::try_from(code.exit_code()).unwrap_or(u8::MAX)),
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logger(&args)?;

    match run(&args) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("{}", e);
            if args.log_file.is_some() {
                eprintln!("Error: {}", e);
            }
            Ok(exit_code(&e))
        }
    }
}
