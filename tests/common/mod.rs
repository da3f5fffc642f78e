#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, contents).expect("write temp file bytes");
        path
    }
}

/// Joins rows of fields into tab-separated text with a trailing newline.
pub fn tsv(rows: &[&[&str]]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&row.join("\t"));
        out.push('\n');
    }
    out
}

/// A two-project export with two parcels each and a stray header space.
pub fn sample_export() -> String {
    tsv(&[
        &[
            "ID_Project ",
            "Naam_Aanvrager",
            " E_Tab_Kad_Gem_1",
            "E_Tab_Opp_1",
            "E_Tab_NN_1",
            "E_Tab_Kad_Gem_2",
            "E_Tab_Opp_2",
            "E_Tab_NN_2",
            "E_Tab_Plus_Opp_1",
        ],
        &["P-001", "Jansen", "GMR01", "12.5", "3", "GMR02", "4", "x", "99"],
        &["P-002", "de Vries", "HLM00", "", "1.25", "", "", "", ""],
    ])
}
