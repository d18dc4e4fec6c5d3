//! Command-line grammar for `rekheader`.
//!
//! Flags are single-dash long names matched case-insensitively; values are
//! taken verbatim. A value flag given as the last token has nothing to
//! consume and is treated as a bare positional token instead. Bare tokens
//! fill the input path, then the output path.
//!
//! Numbers follow C `atoi`/`atof` prefix rules: the longest numeric prefix
//! is used and anything unparsable becomes zero.

use std::ffi::OsString;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::header::{PixelFormat, RekHeader};

pub const USAGE: &str = "\
Usage: rekheader -i input.raw -o output.rek
                 [-float32|-int16] -sizeX Size -sizeY Size -sizeZ Size
                 -pixelSize Microns [-sliceStep Microns]
Created by Kirill Gavrilov <kirill@sview.ru>
";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    /// No arguments at all; the usage text should follow.
    #[error("Syntax error: wrong number of arguments")]
    NoArguments,
    #[error("Syntax error: wrong number of arguments")]
    MissingPath,
    #[error("Syntax error: unknown argument '{0}'")]
    UnknownArgument(String),
    #[error("Syntax error: input and output should not match")]
    SamePaths,
    #[error("Syntax error: undefined dimensions")]
    UndefinedDimensions,
    #[error("Syntax error: undefined pixel format")]
    UndefinedPixelFormat,
    #[error("Syntax error: undefined pixel size")]
    UndefinedPixelSize,
}

impl SyntaxError {
    pub fn shows_usage(&self) -> bool {
        matches!(self, SyntaxError::NoArguments)
    }
}

/// A fully validated conversion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertJob {
    pub header: RekHeader,
    pub format: PixelFormat,
    pub input:  PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Help,
    Convert(ConvertJob),
}

/// Parse the argument list (without the program name).
pub fn parse<I, S>(args: I) -> Result<Invocation, SyntaxError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.is_empty() {
        return Err(SyntaxError::NoArguments);
    }
    if args.iter().any(|a| is_help(&flag_name(a))) {
        return Ok(Invocation::Help);
    }

    let mut header = RekHeader::new();
    let mut input  = OsString::new();
    let mut output = OsString::new();

    let mut i = 0;
    while i < args.len() {
        let flag = flag_name(&args[i]);
        let has_value = i + 1 < args.len();
        match flag.as_str() {
            "-float" | "-float32" => header.set_pixel_format(PixelFormat::Float32),
            "-int" | "-int16"     => header.set_pixel_format(PixelFormat::Int16),
            "-width" | "-sizex" | "-x" if has_value => {
                i += 1;
                header.size_x = parse_c_int(&args[i]) as u16;
            }
            "-height" | "-sizey" | "-y" if has_value => {
                i += 1;
                header.size_y = parse_c_int(&args[i]) as u16;
            }
            "-depth" | "-sizez" | "-z" if has_value => {
                i += 1;
                header.size_z = parse_c_int(&args[i]) as u16;
            }
            "-pixelsize" if has_value => {
                i += 1;
                header.pixel_size = parse_c_float(&args[i]);
                // Slice step defaults to the pixel size unless already given.
                if header.slice_dist == 0.0 {
                    header.slice_dist = header.pixel_size;
                }
            }
            "-slicedist" | "-slicestep" if has_value => {
                i += 1;
                header.slice_dist = parse_c_float(&args[i]);
            }
            "-i" | "-input" if has_value => {
                i += 1;
                input = args[i].clone();
            }
            "-o" | "-output" if has_value => {
                i += 1;
                output = args[i].clone();
            }
            _ if input.is_empty()  => input  = args[i].clone(),
            _ if output.is_empty() => output = args[i].clone(),
            _ => {
                return Err(SyntaxError::UnknownArgument(
                    args[i].to_string_lossy().into_owned(),
                ));
            }
        }
        i += 1;
    }

    debug!(?header, ?input, ?output, "parsed arguments");
    validate(header, input, output).map(Invocation::Convert)
}

fn validate(header: RekHeader, input: OsString, output: OsString) -> Result<ConvertJob, SyntaxError> {
    if input.is_empty() || output.is_empty() {
        return Err(SyntaxError::MissingPath);
    }
    if input == output {
        return Err(SyntaxError::SamePaths);
    }
    if header.size_x == 0 || header.size_y == 0 || header.size_z == 0 {
        return Err(SyntaxError::UndefinedDimensions);
    }
    let format = header.pixel_format().ok_or(SyntaxError::UndefinedPixelFormat)?;
    // NaN passes, as with a plain `<= 0` comparison.
    if header.pixel_size <= 0.0 {
        return Err(SyntaxError::UndefinedPixelSize);
    }
    Ok(ConvertJob {
        header,
        format,
        input:  PathBuf::from(input),
        output: PathBuf::from(output),
    })
}

fn flag_name(arg: &OsString) -> String {
    arg.to_string_lossy().to_ascii_lowercase()
}

fn is_help(flag: &str) -> bool {
    flag == "-help" || flag == "--help"
}

fn trim_c_space(s: &str) -> &str {
    s.trim_start_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r'))
}

/// `atoi`: optional sign then decimal digits; saturates instead of overflowing.
pub fn parse_c_int(arg: &OsString) -> i64 {
    let text = arg.to_string_lossy();
    let s = trim_c_space(&text);
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _          => (false, s),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(i64::from(d - b'0')));
    if negative { -magnitude } else { magnitude }
}

/// `atof`: longest decimal floating-point prefix (or `inf`/`nan`), narrowed to `f32`.
pub fn parse_c_float(arg: &OsString) -> f32 {
    let text = arg.to_string_lossy();
    let s = trim_c_space(&text);
    let end = float_prefix_len(s);
    s[..end].parse::<f64>().unwrap_or(0.0) as f32
}

fn float_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let rest = s[i..].to_ascii_lowercase();
    for word in ["infinity", "inf", "nan"] {
        if rest.starts_with(word) {
            return i + word.len();
        }
    }

    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return 0;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}
