use rekheader::header::{RekHeader, HEADER_SIZE};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn rekheader(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rekheader"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_convert_int16_volume() {
    let dir = tempdir().unwrap();
    let payload: Vec<u8> = (0..2 * 10 * 20 * 5).map(|i| (i % 251) as u8).collect();
    fs::write(dir.path().join("scan.raw"), &payload).unwrap();

    let out = rekheader(dir.path(), &["-i", "scan.raw", "-o", "scan.rek", "-sizeX", "10",
                                      "-sizeY", "20", "-sizeZ", "5", "-int16", "-pixelsize", "2.5"]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "Output: 'scan.rek' 10x20x5@int16.\n");

    let written = fs::read(dir.path().join("scan.rek")).unwrap();
    assert_eq!(written.len(), HEADER_SIZE + payload.len());
    assert_eq!(&written[HEADER_SIZE..], payload.as_slice());

    let header = RekHeader::read(&written[..HEADER_SIZE]).unwrap();
    assert_eq!((header.size_x, header.size_y, header.size_z), (10, 20, 5));
    assert_eq!(header.pixel, 16);
    assert_eq!(header.pixel_size, 2.5);
    assert_eq!(header.slice_dist, 2.5);
    assert_eq!(header.some_value, 0.0);
}

#[test]
fn test_convert_float32_positional_paths() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("vol.raw"), vec![0u8; 4 * 3 * 3 * 2]).unwrap();

    let out = rekheader(dir.path(), &["vol.raw", "vol.rek", "-FLOAT32", "-x", "3", "-y", "3",
                                      "-z", "2", "-sliceStep", "7.0", "-pixelSize", "2.5"]);
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "Output: 'vol.rek' 3x3x2@float32.\n");

    let (header, len) = RekHeader::read_file(dir.path().join("vol.rek")).unwrap();
    assert_eq!(len, (HEADER_SIZE + 72) as u64);
    assert_eq!(header.pixel, 32);
    assert_eq!(header.pixel_size, 2.5);
    assert_eq!(header.slice_dist, 7.0);
}

#[test]
fn test_size_mismatch_reports_both_sizes() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("in.raw"), vec![0u8; 99]).unwrap();

    let out = rekheader(dir.path(), &["-i", "in.raw", "-o", "out.rek", "-x", "5", "-y", "5",
                                      "-z", "2", "-int", "-pixelsize", "1"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout(&out), "Output: 'out.rek' 5x5x2@int16.\n");
    assert!(stderr(&out).starts_with("Error: unexpected input file size 99 (expected: 100 bytes)."));
    assert!(!dir.path().join("out.rek").exists());
}

#[test]
fn test_syntax_errors_exit_one_without_output() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("in.raw"), vec![0u8; 2]).unwrap();
    let valid = ["-x", "1", "-y", "1", "-z", "1"];

    let cases: Vec<(Vec<&str>, &str)> = vec![
        (vec!["-x", "1", "-y", "1", "-z", "1", "-int", "-pixelsize", "1"],
         "Syntax error: wrong number of arguments"),
        ([&["in.raw", "in.raw"][..], &valid[..], &["-int", "-pixelsize", "1"][..]].concat(),
         "Syntax error: input and output should not match"),
        (vec!["in.raw", "out.rek", "-sizex", "0", "-y", "1", "-z", "1", "-int", "-pixelsize", "1"],
         "Syntax error: undefined dimensions"),
        ([&["in.raw", "out.rek"][..], &valid[..], &["-pixelsize", "1"][..]].concat(),
         "Syntax error: undefined pixel format"),
        ([&["in.raw", "out.rek"][..], &valid[..], &["-int", "-pixelsize", "0"][..]].concat(),
         "Syntax error: undefined pixel size"),
        ([&["in.raw", "out.rek"][..], &valid[..], &["-int", "-pixelsize", "-1.5"][..]].concat(),
         "Syntax error: undefined pixel size"),
        (vec!["in.raw", "out.rek", "extra"],
         "Syntax error: unknown argument 'extra'"),
    ];

    for (args, message) in cases {
        let out = rekheader(dir.path(), &args);
        assert_eq!(out.status.code(), Some(1), "args {:?}", args);
        assert!(stderr(&out).starts_with(message), "args {:?}: {}", args, stderr(&out));
        assert!(stdout(&out).is_empty(), "args {:?}", args);
        assert!(!dir.path().join("out.rek").exists());
    }
}

#[test]
fn test_no_arguments_prints_usage() {
    let dir = tempdir().unwrap();
    let out = rekheader(dir.path(), &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("Syntax error: wrong number of arguments"));
    assert!(stdout(&out).starts_with("Usage: rekheader"));
}

#[test]
fn test_help_wins_over_everything() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("in.raw"), vec![0u8; 2]).unwrap();

    for args in [
        vec!["-help"],
        vec!["--HELP", "in.raw", "out.rek"],
        vec!["in.raw", "out.rek", "-x", "1", "-y", "1", "-z", "1", "-int", "-pixelsize", "1", "-Help"],
    ] {
        let out = rekheader(dir.path(), &args);
        assert_eq!(out.status.code(), Some(0));
        assert!(stdout(&out).starts_with("Usage: rekheader"));
        assert!(stderr(&out).is_empty());
        assert!(!dir.path().join("out.rek").exists());
    }
}

#[test]
fn test_missing_input_file() {
    let dir = tempdir().unwrap();
    let out = rekheader(dir.path(), &["-i", "absent.raw", "-o", "out.rek", "-x", "1", "-y", "1",
                                      "-z", "1", "-int", "-pixelsize", "1"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).starts_with("Error: unable to read file 'absent.raw'"));
    assert!(stdout(&out).is_empty());
    assert!(!dir.path().join("out.rek").exists());
}

#[test]
fn test_rekinfo_json_report() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("in.raw"), vec![7u8; 2 * 4 * 4 * 4]).unwrap();
    let out = rekheader(dir.path(), &["in.raw", "out.rek", "-x", "4", "-y", "4", "-z", "4",
                                      "-int16", "-pixelsize", "0.5"]);
    assert_eq!(out.status.code(), Some(0));

    let info = Command::new(env!("CARGO_BIN_EXE_rekinfo"))
        .arg(dir.path().join("out.rek"))
        .arg("--json")
        .output()
        .unwrap();
    assert_eq!(info.status.code(), Some(0), "stderr: {}", stderr(&info));

    let report: serde_json::Value = serde_json::from_slice(&info.stdout).unwrap();
    assert_eq!(report["header"]["size_x"], 4);
    assert_eq!(report["header"]["pixel"], 16);
    assert_eq!(report["header"]["slice_dist"], 0.5);
    assert_eq!(report["format"], "int16");
    assert_eq!(report["payload_size"], 128);
    assert_eq!(report["expected_payload"], 128);
    assert_eq!(report["consistent"], true);
}

#[test]
fn test_rekinfo_rejects_truncated_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.rek");
    fs::write(&path, vec![0u8; 100]).unwrap();

    let info = Command::new(env!("CARGO_BIN_EXE_rekinfo")).arg(&path).output().unwrap();
    assert_eq!(info.status.code(), Some(1));
    assert!(stderr(&info).contains("too short"));
}
