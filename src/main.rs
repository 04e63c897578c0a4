mod common;
mod formats;

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use formats::cbfs;

#[derive(Parser, Debug)]
#[command(about = "A tool for parsing CBFS ROM images")]
struct Args {
    /// Input ROM image
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints all information for the cbfs
    Print,
    /// Extracts all LARCHIVE's from the cbfs
    Extract {
        /// Destination folder for extracting
        #[arg(short = 'D', long)]
        destination: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cbfstract CBFS parser");
    let args = Args::parse();

    println!("Input file: {}", args.file.display());
    let data = fs::read(&args.file)?;

    match args.command {
        Command::Print => {
            let image = cbfs::parse_cbfs(&data, None)?;
            println!(
                "CBFS info -\nROM size: {}\nAlignment: {}\nComponent table offset: {:#x}",
                image.header.romsize, image.header.align, image.header.offset
            );
            println!();
            cbfs::print_components(&image.components);
        }
        Command::Extract { destination } => {
            println!("Output folder: {}", destination.display());
            println!();
            let image = cbfs::parse_cbfs(&data, Some(&destination))?;
            println!("\nExtracted {} components.", image.components.len());
        }
    }

    Ok(())
}
