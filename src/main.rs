use std::path::Path;
use std::process::ExitCode;

use argh::FromArgs;
use log::{error, info};

use slicing_floorplan::{evaluate, CellLibrary};

// Starting points for an NPE search over the sample cells.
const SAMPLE_NPES: [&str; 3] = [
    "12V3V4V5V6V7V8V9VaVbVcVdVeVfVgViVjVkVlV",
    "12H3H4H5H6H7H8H9HaHbHcHdHeHfHgHiHjHkHlH",
    "213546H7VHVa8V9HcVHgHibdHkVHfeHVlHVjHVH",
];

#[derive(FromArgs)]
/// Slicing floorplan evaluator
struct Args {
    /// cell library file
    #[argh(option, short = 'c', default = "String::from(\"input_file.txt\")")]
    cells: String,

    /// normalized polish expression to evaluate (repeatable)
    #[argh(option, short = 'n')]
    npe: Vec<String>,

    /// write the last floorplan to this PostScript file
    #[argh(option, short = 'p')]
    postscript: Option<String>,

    /// print the placement of every cell
    #[argh(switch, short = 'v')]
    verbose: bool,
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let arguments: Args = argh::from_env();

    let cells = match CellLibrary::read(Path::new(&arguments.cells)) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let npes: Vec<String> = if arguments.npe.is_empty() {
        SAMPLE_NPES.iter().map(|s| s.to_string()).collect()
    } else {
        arguments.npe
    };

    let mut status = ExitCode::SUCCESS;
    let mut last = None;
    for npe in &npes {
        println!("NPE: {}", npe);
        match evaluate(npe, &cells) {
            Ok(fp) => {
                println!("Cost: {}", fp.area);
                if arguments.verbose {
                    print!("{}", fp);
                }
                last = Some(fp);
            }
            Err(e) => {
                error!("{}", e);
                status = ExitCode::FAILURE;
            }
        }
    }

    if let (Some(filename), Some(fp)) = (arguments.postscript, last) {
        if let Err(e) = fp.postscript(filename) {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
        info!("Floorplan written");
    }

    status
}
