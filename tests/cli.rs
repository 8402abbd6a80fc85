use std::path::Path;
use std::process::{Command, Output};

fn chromstrip(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chromstrip"))
        .args(args)
        .output()
        .expect("failed to launch chromstrip")
}

fn s(p: &Path) -> &str {
    p.to_str().unwrap()
}

/// SVG text may sit inline (`>22<`) or on its own line between the tags.
fn svg_has_text(svg: &str, text: &str) -> bool {
    svg.contains(&format!(">{}<", text)) || svg.lines().any(|l| l.trim() == text)
}

#[test]
fn missing_flag_is_rejected_by_argument_parser() {
    let out = chromstrip(&["-c", "1", "-i", "in.csv"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("--outfile"), "{stderr}");
}

#[test]
fn missing_input_file_exits_nonzero_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("absent.csv");
    let outfile = dir.path().join("chr1.png");
    let out = chromstrip(&["-c", "1", "-i", s(&infile), "-o", s(&outfile)]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("[ERROR] Cannot use association file"), "{stderr}");
    assert!(!outfile.exists());
}

#[test]
fn missing_p_column_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("chr1.csv");
    std::fs::write(&infile, "CHR,SNP,BP\n1,rs1,100\n").unwrap();
    let outfile = dir.path().join("chr1.png");
    let out = chromstrip(&["-c", "1", "-i", s(&infile), "-o", s(&outfile)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing required column(s) P"));
    assert!(!outfile.exists());
}

#[test]
fn non_positive_p_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("chr4.csv");
    std::fs::write(&infile, "CHR,BP,P\n4,100,0.5\n4,200,-0.1\n").unwrap();
    let outfile = dir.path().join("chr4.png");
    let out = chromstrip(&["-c", "4", "-i", s(&infile), "-o", s(&outfile)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("line 3"));
    assert!(!outfile.exists());
}

#[test]
fn unsupported_output_extension_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("chr5.csv");
    std::fs::write(&infile, "CHR,BP,P\n5,100,0.5\n").unwrap();
    let outfile = dir.path().join("chr5.pdf");
    let out = chromstrip(&["-c", "5", "-i", s(&infile), "-o", s(&outfile)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unsupported image format"));
    assert!(!outfile.exists());
}

#[test]
#[ignore = "needs a system sans-serif font for text layout"]
fn renders_svg_and_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("chr22.csv");
    std::fs::write(
        &infile,
        "CHR,SNP,BP,P\n22,rs1,100,0.05\n22,rs2,200,\n22,rs3,300,1e-8\n22,rs4,400,0.5\n",
    )
    .unwrap();
    let outfile = dir.path().join("chr22.svg");
    let out = chromstrip(&["-c", "22", "-i", s(&infile), "-o", s(&outfile)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("[INFO] Loaded 3 complete rows (comma delimiter), dropped 1"));
    let svg = std::fs::read_to_string(&outfile).unwrap();
    assert_eq!(svg.matches("<circle").count(), 3);
    // the single category tick is the chromosome label (y ticks stop below 9)
    assert!(svg_has_text(&svg, "22"));
}
