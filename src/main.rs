use rekheader::args::{self, Invocation, USAGE};
use rekheader::convert::convert;
use rekheader::logging;
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let _ = logging::init(false);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args::parse(std::env::args_os().skip(1)) {
        Ok(Invocation::Help) => {
            let _ = out.write_all(USAGE.as_bytes());
            ExitCode::SUCCESS
        }
        Ok(Invocation::Convert(job)) => match convert(&job, &mut out) {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                let _ = out.flush();
                eprintln!("{e}");
                ExitCode::from(1)
            }
        },
        Err(e) => {
            eprintln!("{e}");
            if e.shows_usage() {
                let _ = out.write_all(USAGE.as_bytes());
            }
            ExitCode::from(1)
        }
    }
}
