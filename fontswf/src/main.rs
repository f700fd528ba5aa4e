//! binary transcoding tool
//!
//! Replaces a font definition in an SWF container with the outlines of a
//! TrueType font, or lists the tags of a container.

use std::path::{Path, PathBuf};

use clap::Parser;
use fontswf::{convert_font, inspect::describe_container, ConvertOptions, DEFAULT_EM_SQUARE};
use swf_codec::Container;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Rebuild a DefineFont3 tag from a TrueType font
    Convert {
        /// The TrueType font to read outlines from
        #[arg(short, long)]
        font: PathBuf,
        /// The container whose font definition is replaced
        #[arg(short, long)]
        reference: PathBuf,
        /// Where to write the new container
        #[arg(short, long)]
        output: PathBuf,
        /// FontID of the DefineFont3 tag to replace; defaults to the first
        #[arg(long)]
        font_id: Option<u16>,
        /// Font name to store; defaults to the name in the replaced tag
        #[arg(long)]
        font_name: Option<String>,
        /// Language code to store; defaults to the code in the replaced tag
        #[arg(long)]
        language_code: Option<u8>,
        /// Size of the em square in twips
        #[arg(long, default_value_t = DEFAULT_EM_SQUARE)]
        em_square: f64,
        /// Convert glyphs on a single thread
        #[arg(long)]
        no_parallel: bool,
        /// Don't print progress
        #[arg(short, long)]
        quiet: bool,
    },
    /// List the tags of a container
    Inspect {
        /// The container to read
        path: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let result = match args.command {
        Command::Convert {
            font,
            reference,
            output,
            font_id,
            font_name,
            language_code,
            em_square,
            no_parallel,
            quiet,
        } => {
            let options = ConvertOptions {
                font_id,
                font_name,
                language_code,
                em_square,
                parallel: !no_parallel,
                ..Default::default()
            };
            convert(&font, &reference, &output, &options, quiet)
        }
        Command::Inspect { path } => inspect(&path),
    };
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn read(path: &Path) -> Result<Vec<u8>, String> {
    std::fs::read(path).map_err(|e| format!("failed to read '{}': {e}", path.display()))
}

fn convert(
    font: &Path,
    reference: &Path,
    output: &Path,
    options: &ConvertOptions,
    quiet: bool,
) -> Result<(), String> {
    let font_data = read(font)?;
    let reference_data = read(reference)?;
    let mut print = |line: &str| println!("{line}");
    let progress: Option<&mut dyn fontswf::Progress> = if quiet { None } else { Some(&mut print) };
    let bytes = convert_font(&font_data, &reference_data, options, progress)
        .map_err(|e| format!("conversion failed: {e}"))?;
    std::fs::write(output, &bytes)
        .map_err(|e| format!("error writing '{}': {e}", output.display()))?;
    if !quiet {
        println!("wrote {} bytes to {}", bytes.len(), output.display());
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<(), String> {
    let data = read(path)?;
    let container = Container::parse(&data).map_err(|e| format!("{}: {e}", path.display()))?;
    print!("{}", describe_container(&container));
    Ok(())
}
