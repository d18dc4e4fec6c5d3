use clap::Parser;
use rekheader::header::{HeaderError, PixelFormat, RekHeader, HEADER_SIZE};
use rekheader::logging;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "rekinfo", about = "Show the header of a REK volume file")]
struct Cli {
    input: PathBuf,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Log diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report {
    path:             PathBuf,
    header:           RekHeader,
    format:           PixelFormat,
    file_size:        u64,
    payload_size:     u64,
    expected_payload: u64,
    consistent:       bool,
}

fn inspect(path: PathBuf) -> Result<Report, HeaderError> {
    let (header, file_size) = RekHeader::read_file(&path)?;
    debug!(?header, file_size, "read header");
    let format = header.pixel_format().ok_or(HeaderError::PixelFormat(header.pixel))?;
    let expected_payload = format.bytes_per_sample() * header.voxel_count();
    let payload_size = file_size - HEADER_SIZE as u64;
    Ok(Report {
        path,
        header,
        format,
        file_size,
        payload_size,
        expected_payload,
        consistent: payload_size == expected_payload,
    })
}

fn print_report(r: &Report) {
    println!("── REK volume ───────────────────────────────────────────");
    println!("  Path           {}", r.path.display());
    println!("  Dimensions     {}x{}x{}", r.header.size_x, r.header.size_y, r.header.size_z);
    println!("  Pixel format   {} ({} bit)", r.format.name(), r.header.pixel);
    println!("  Pixel size     {} um", r.header.pixel_size);
    println!("  Slice step     {} um", r.header.slice_dist);
    println!("  File size      {} B", r.file_size);
    println!("  Payload        {} B (expected {} B)", r.payload_size, r.expected_payload);
    println!("  Consistent     {}", r.consistent);
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = logging::init(cli.verbose);

    let report = match inspect(cli.input) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::from(1);
            }
        }
    } else {
        print_report(&report);
    }
    ExitCode::SUCCESS
}
