use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::tempdir;

fn tsvclean() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tsvclean"))
}

#[test]
fn cleans_file_and_reports_paths() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("movies.tsv");
    let output = dir.path().join("movies.clean.tsv");
    fs::write(
        &input,
        "tconst\tprimaryTitle\n\
         tt0087469\tIndiana Jones and the Temple of Doom\n\
         tt0087469\tIndiana Jones and the Temple of Doom\n",
    )
    .unwrap();

    let out = tsvclean()
        .arg("--quiet")
        .arg("movies")
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("Cleaned movies: "));
    assert!(stdout.contains("movies.clean.tsv"));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "tconst\tprimaryTitle\ntt0087469\tIndiana Jones and the Temple o\n"
    );
}

#[test]
fn unknown_kind_exits_2_without_creating_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.tsv");
    let output = dir.path().join("out.tsv");
    fs::write(&input, "a\nb\n").unwrap();

    let out = tsvclean()
        .arg("episodes")
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown kind 'episodes'"));
    assert!(!output.exists());
}

#[test]
fn schema_file_adds_kinds() {
    let dir = tempdir().unwrap();
    let schema = dir.path().join("schema.json");
    let input = dir.path().join("in.tsv");
    let output = dir.path().join("out.tsv");
    fs::write(&schema, r#"{"episodes": {"parentTconst": 4}}"#).unwrap();
    fs::write(&input, "tconst\tparentTconst\ntt1\ttt0944947\n").unwrap();

    let out = tsvclean()
        .arg("--schema")
        .arg(&schema)
        .arg("episodes")
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "tconst\tparentTconst\ntt1\ttt09\n"
    );
}

#[test]
fn row_shape_mismatch_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.tsv");
    let output = dir.path().join("out.tsv");
    fs::write(&input, "tconst\tprimaryTitle\ntt1\n").unwrap();

    let out = tsvclean()
        .arg("movies")
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("row shape mismatch at line 2"));

    let lenient = tsvclean()
        .arg("--lenient")
        .arg("movies")
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();
    assert!(lenient.status.success());
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "tconst\tprimaryTitle\ntt1\t\n"
    );
}

#[test]
fn empty_input_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.tsv");
    let output = dir.path().join("out.tsv");
    fs::write(&input, "").unwrap();

    let out = tsvclean()
        .arg("people")
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("malformed input"));
}

#[test]
fn dash_paths_stream_stdin_to_stdout() {
    let mut child = tsvclean()
        .args(["-q", "people", "-", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(
            b"nconst\tprimaryName\n\
              nm0000001\tFred Astaire\n\
              nm0000001\tFred Astaire\n\
              nm00000020000\tLauren Bacall\n",
        )
        .unwrap();
    let out = child.wait_with_output().unwrap();

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "nconst\tprimaryName\nnm0000001\tFred Astaire\nnm00000020\tLauren Bacall\n"
    );
    assert!(String::from_utf8_lossy(&out.stderr).contains("Cleaned people: - → -"));
}

#[test]
fn unwritable_output_names_path() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.tsv");
    let output = dir.path().join("missing").join("out.tsv");
    fs::write(&input, "tconst\tprimaryTitle\ntt1\tAlien\n").unwrap();

    let out = tsvclean()
        .arg("movies")
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("failed to create output"), "stderr: {}", stderr);
    assert!(stderr.contains(&output.display().to_string()), "stderr: {}", stderr);
    assert!(!output.exists());
}
