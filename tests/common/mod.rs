#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use microsat::UniformSource;

fn test_file(dir: &str, name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join(dir)
        .join(name)
}

/// Compare `actual` with `tests/snapshots/<name>`, reporting the first line
/// that differs. `MICROSAT_BLESS=1` rewrites the golden file instead.
pub fn assert_golden(name: &str, actual: &str) {
    let path = test_file("snapshots", name);
    if std::env::var_os("MICROSAT_BLESS").is_some() {
        fs::create_dir_all(path.parent().expect("golden file has a parent"))
            .expect("create golden directory");
        fs::write(&path, actual).expect("write golden file");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("golden file {:?} missing", path));
    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();
    for line_no in 1.. {
        match (expected_lines.next(), actual_lines.next()) {
            (None, None) => break,
            (want, got) if want == got => continue,
            (want, got) => panic!(
                "{:?} differs at line {}: expected {:?}, got {:?} (MICROSAT_BLESS=1 regenerates)",
                path, line_no, want, got
            ),
        }
    }
}

pub fn fixture(name: &str) -> String {
    let path = test_file("data", name);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("fixture {:?} not found", path))
}

/// Replays a fixed draw sequence, wrapping around at the end.
#[derive(Debug)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    next: usize,
}

impl ScriptedSource {
    pub fn new(draws: &[f64]) -> Self {
        assert!(!draws.is_empty(), "need at least one draw");
        Self {
            draws: draws.to_vec(),
            next: 0,
        }
    }

    pub fn consumed(&self) -> usize {
        self.next
    }
}

impl UniformSource for ScriptedSource {
    fn next_uniform(&mut self) -> f64 {
        let value = self.draws[self.next % self.draws.len()];
        self.next += 1;
        value
    }
}
