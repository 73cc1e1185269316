use std::path::PathBuf;
use std::process::Command;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_inkgrid")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "inkgrid.exe"
            } else {
                "inkgrid"
            });
            p
        })
}

fn out_dir() -> PathBuf {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn cli_grid_writes_png_and_snapshot() {
    let dir = out_dir();
    let png = dir.join("grid.png");
    let snap = dir.join("grid.json");
    let _ = std::fs::remove_file(&png);
    let _ = std::fs::remove_file(&snap);

    let status = Command::new(exe())
        .args(["grid", "--seed", "5", "--width", "320", "--height", "200"])
        .args(["--duration-ms", "60000", "--out"])
        .arg(&png)
        .arg("--snapshot")
        .arg(&snap)
        .status()
        .unwrap();
    assert!(status.success());

    let img = image::open(&png).unwrap();
    assert_eq!((img.width(), img.height()), (320, 200));

    let v: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(&snap).unwrap()).unwrap();
    assert_eq!(v["seed"], 5);
    assert_eq!(v["state"]["state"], "complete");
    assert_eq!(v["fill_index"], v["queue_len"]);
}

#[test]
fn cli_grid_reduced_motion_with_config() {
    let dir = out_dir();
    let cfg = dir.join("config.json");
    let png = dir.join("static.png");
    let snap = dir.join("static.json");
    std::fs::write(&cfg, r#"{ "cell_size": 20, "reduced_motion_coverage": 1.0 }"#).unwrap();

    let status = Command::new(exe())
        .args(["grid", "--seed", "9", "--reduced-motion", "--config"])
        .arg(&cfg)
        .args(["--width", "200", "--height", "100", "--out"])
        .arg(&png)
        .arg("--snapshot")
        .arg(&snap)
        .status()
        .unwrap();
    assert!(status.success());

    let v: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(&snap).unwrap()).unwrap();
    assert_eq!(v["cols"], 10);
    assert_eq!(v["rows"], 5);
    assert_eq!(v["state"]["state"], "static");
    assert_eq!(v["fill_index"], v["queue_len"]);
}

#[test]
fn cli_blob_prints_square_path() {
    let out = Command::new(exe())
        .args(["blob", "--params", "shape:square", "--seed", "1"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap().trim(),
        "M300 300 L700 300 L700 700 L300 700z"
    );
}

#[test]
fn cli_blob_writes_png_preview() {
    let png = out_dir().join("blob.png");
    let _ = std::fs::remove_file(&png);

    let status = Command::new(exe())
        .args(["blob", "--params", "seed:42", "--seed", "3", "--size", "96", "--out"])
        .arg(&png)
        .status()
        .unwrap();
    assert!(status.success());
    assert_eq!(image::open(&png).unwrap().width(), 96);
}

#[test]
fn cli_structures_dumps_json() {
    let out = Command::new(exe())
        .args(["structures", "--seed", "11", "--width", "640", "--height", "480"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["cols"], 20);
    assert_eq!(v["rows"], 15);
    assert!(v["structures"].as_array().is_some());
}

#[test]
fn cli_rejects_bad_config() {
    let dir = out_dir();
    let cfg = dir.join("bad.json");
    std::fs::write(&cfg, r#"{ "cell_size": -1 }"#).unwrap();

    let status = Command::new(exe())
        .args(["structures", "--config"])
        .arg(&cfg)
        .status()
        .unwrap();
    assert!(!status.success());
}
