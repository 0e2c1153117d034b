//! The export, clean and FOB stages wired to their files on disk.
//!
//! ```text
//! <dump_root>/<version>/...            tables and localization (input)
//! <output_root>/<version>/raw_units.json
//! <output_root>/<version>/final_data.csv
//! <output_root>/<version>/final_fobs.csv
//! ```

use std::path::PathBuf;

use bon::Builder;
use tracing::{debug, info};

use crate::clean::clean_units;
use crate::constants::{DEFAULT_UNIT_CODES, UnitCodes};
use crate::error::IResult;
use crate::export::{RawUnit, export_units, read_raw_units, write_raw_units};
use crate::fobs::clean_fobs;
use crate::game_data::{
    FINAL_DATA_FILE, FINAL_FOBS_FILE, RAW_FOBS_FILE, RAW_UNITS_FILE, load_document_graph,
    localization_path, output_dir,
};
use crate::localization::Localization;
use crate::table::Table;

#[derive(Debug, Clone, Builder)]
pub struct Pipeline {
    /// Root of the exporter dumps, one directory per version.
    #[builder(into)]
    dump_root: PathBuf,
    #[builder(into)]
    version: String,
    /// Where `<version>/` output directories are written.
    #[builder(into)]
    output_root: PathBuf,
    #[builder(default = DEFAULT_UNIT_CODES.clone())]
    codes: UnitCodes,
}

impl Pipeline {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn output_dir(&self) -> PathBuf {
        output_dir(&self.output_root, &self.version)
    }

    /// Loads the version's tables, exports every unit and saves the raw
    /// dataset.
    pub fn export(&self) -> IResult<Vec<RawUnit>> {
        let graph = load_document_graph(&self.dump_root, &self.version)?;
        let units = export_units(&graph)?;
        let path = self.output_dir().join(RAW_UNITS_FILE);
        write_raw_units(&path, &units)?;
        info!(path = %path.display(), "wrote raw units");
        Ok(units)
    }

    /// Cleans a previously exported raw dataset.
    pub fn clean(&self) -> IResult<PathBuf> {
        let units = read_raw_units(&self.output_dir().join(RAW_UNITS_FILE))?;
        self.clean_units(&units)
    }

    /// Export followed by clean, without rereading the raw dataset.
    pub fn run(&self) -> IResult<PathBuf> {
        let units = self.export()?;
        self.clean_units(&units)
    }

    fn clean_units(&self, units: &[RawUnit]) -> IResult<PathBuf> {
        let strings = Localization::load(&localization_path(&self.dump_root, &self.version))?;
        let table = clean_units(units, &strings, &self.codes)?;
        let path = self.output_dir().join(FINAL_DATA_FILE);
        table.write_csv(&path)?;
        info!(path = %path.display(), rows = table.rows().len(), "wrote final dataset");
        Ok(path)
    }

    /// Cleans the raw FOB dataset. With `combine` the FOBs are appended to
    /// the final unit dataset, otherwise they get a file of their own
    /// without the `ID` column.
    pub fn fobs(&self, combine: bool) -> IResult<PathBuf> {
        let raw = Table::read_csv(&self.raw_fobs_path())?;
        let mut fobs = clean_fobs(&raw, &self.codes);

        let path = if combine {
            let path = self.output_dir().join(FINAL_DATA_FILE);
            let mut data = Table::read_csv(&path)?;
            data.append(fobs);
            data.write_csv(&path)?;
            path
        } else {
            let path = self.output_dir().join(FINAL_FOBS_FILE);
            fobs.drop_column("ID");
            fobs.write_csv(&path)?;
            path
        };
        info!(path = %path.display(), combine, "wrote fobs");
        Ok(path)
    }

    /// `raw_fobs.csv` next to the other outputs, or in the dump directory.
    fn raw_fobs_path(&self) -> PathBuf {
        let output = self.output_dir().join(RAW_FOBS_FILE);
        if output.is_file() {
            return output;
        }
        let dump = self.dump_root.join(&self.version).join(RAW_FOBS_FILE);
        if dump.is_file() {
            debug!(path = %dump.display(), "reading raw fobs from the dump directory");
            return dump;
        }
        output
    }
}
