//! Layout of a dump directory and of the pipeline's outputs.
//!
//! A dump root holds one directory per game version:
//!
//! ```text
//! <root>/<version>/NDF_Win/pc/ndf/patchable/gfx/everything/<Kind>.xml
//! <root>/<version>/ZZ_Win/pc/localisation/us/localisation/unites_fixed.csv
//! ```
//!
//! Outputs land in `<output>/<version>/`.

use std::fs::{File, read_dir};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::data::DocumentGraph;
use crate::data::loader::load_tables_dir;
use crate::error::{ErrorKind, IResult};

pub const TABLES_DIR: &str = "NDF_Win/pc/ndf/patchable/gfx/everything";
pub const LOCALIZATION_FILE: &str = "ZZ_Win/pc/localisation/us/localisation/unites_fixed.csv";

pub const RAW_UNITS_FILE: &str = "raw_units.json";
pub const FINAL_DATA_FILE: &str = "final_data.csv";
pub const RAW_FOBS_FILE: &str = "raw_fobs.csv";
pub const FINAL_FOBS_FILE: &str = "final_fobs.csv";

/// List the version directories under a dump root, sorted.
pub fn list_available_versions(root: &Path) -> Result<Vec<String>, ErrorKind> {
    let mut versions = Vec::new();
    for entry in read_dir(root).map_err(|err| ErrorKind::io(root, err))? {
        let entry = entry.map_err(|err| ErrorKind::io(root, err))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
            && let Some(name) = entry.file_name().to_str()
        {
            versions.push(name.to_string());
        }
    }
    versions.sort();
    Ok(versions)
}

/// Find the directory of `version` under a dump root.
pub fn find_version(root: &Path, version: &str) -> Result<PathBuf, ErrorKind> {
    let dir = root.join(version);
    if dir.is_dir() {
        return Ok(dir);
    }

    let available = list_available_versions(root)?;
    Err(ErrorKind::VersionNotFound {
        root: root.to_path_buf(),
        version: version.to_string(),
        available: available.join(", "),
    })
}

pub fn tables_dir(root: &Path, version: &str) -> PathBuf {
    root.join(version).join(TABLES_DIR)
}

pub fn localization_path(root: &Path, version: &str) -> PathBuf {
    root.join(version).join(LOCALIZATION_FILE)
}

pub fn output_dir(output: &Path, version: &str) -> PathBuf {
    output.join(version)
}

/// Load every table of one version's dump.
pub fn load_document_graph(root: &Path, version: &str) -> Result<DocumentGraph, ErrorKind> {
    find_version(root, version)?;
    let dir = tables_dir(root, version);
    debug!(dir = %dir.display(), "loading tables");
    load_tables_dir(&dir)
}

/// Writes `path` through a sibling temporary file that is renamed into place
/// once `write` succeeds. A failed write leaves any existing file untouched.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> IResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> IResult<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| ErrorKind::io(parent, err))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let result = write_and_rename(&tmp, path, write);
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn write_and_rename<F>(tmp: &Path, path: &Path, write: F) -> IResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> IResult<()>,
{
    {
        let file = File::create(tmp).map_err(|err| ErrorKind::io(tmp, err))?;
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer.flush().map_err(|err| ErrorKind::io(tmp, err))?;
    }
    std::fs::rename(tmp, path).map_err(|err| ErrorKind::io(path, err))?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn versions_are_listed_and_found() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("510049986")).unwrap();
        std::fs::create_dir_all(root.path().join("430000626")).unwrap();
        std::fs::write(root.path().join("readme.txt"), "").unwrap();

        assert_eq!(
            list_available_versions(root.path()).unwrap(),
            ["430000626", "510049986"]
        );
        assert!(find_version(root.path(), "510049986").is_ok());
        match find_version(root.path(), "1") {
            Err(ErrorKind::VersionNotFound { available, .. }) => {
                assert_eq!(available, "430000626, 510049986")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("final_data.csv");

        write_atomically(&path, |w| {
            w.write_all(b"first").unwrap();
            Ok(())
        })
        .unwrap();
        let result = write_atomically(&path, |w| {
            w.write_all(b"partial").unwrap();
            Err(ErrorKind::MissingTable {
                kind: "TAmmunition".to_string(),
            }
            .into())
        });

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
        assert!(!dir.path().join("out").join("final_data.csv.tmp").exists());
    }
}
