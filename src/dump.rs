//! Drives the external table exporter over the game's NDF database.
//!
//! The exporter writes one XML file per table kind into `NDF_Win/` under its
//! working directory. Once every table is out, that tree is moved under the
//! version directory the export stage reads from.

use std::path::{Path, PathBuf};
use std::process::Command;

use bon::Builder;
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, IResult};

/// Version directory used when none is given.
pub const DEFAULT_VERSION: &str = "Everything";
pub const DATABASE_FILE: &str = "NDF_Win.dat";
/// Archive inside the database holding the unit tables.
pub const ARCHIVE_PATH: &str = r"pc\ndf\patchable\gfx\everything.ndfbin";
pub const EXPORTED_DIR: &str = "NDF_Win";

/// Every table the export stage reads.
pub const DUMP_TABLES: [&str; 22] = [
    "TAmmunition",
    "TMountedWeaponDescriptor",
    "TTurretUnitDescriptor",
    "TTurretTwoAxisDescriptor",
    "TTurretInfanterieDescriptor",
    "TTurretBombardierDescriptor",
    "TWeaponManagerModuleDescriptor",
    "TModuleSelector",
    "TFuelModuleDescriptor",
    "TMouvementHandlerLandVehicleDescriptor",
    "TMouvementHandlerHelicopterDescriptor",
    "TMouvementHandlerAirplaneDescriptor",
    "TModernWarfareDamageModuleDescriptor",
    "TVisibilityModuleDescriptor",
    "TModernWarfareExperienceModuleDescriptor",
    "TModernWarfareCommmonDamageDescriptor",
    "TBlindageProperties",
    "TArmorDescriptor",
    "TUniteAuSolDescriptor",
    "TMouvementHandler_GuidedMissileDescriptor",
    "TScannerConfigurationDescriptor",
    "TSupplyModuleDescriptor",
];

#[derive(Debug, Clone, Builder)]
pub struct DumpRequest {
    /// The exporter executable.
    #[builder(into)]
    exporter: PathBuf,
    /// The game's data directory holding one directory per version.
    #[builder(into)]
    wargame: PathBuf,
    #[builder(into, default = DEFAULT_VERSION.to_string())]
    version: String,
    /// Dump root; the version's tables end up in `<destination>/<version>/`.
    #[builder(into)]
    destination: PathBuf,
    #[builder(default = DUMP_TABLES.iter().map(|t| t.to_string()).collect())]
    tables: Vec<String>,
}

impl DumpRequest {
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn database_path(&self) -> PathBuf {
        self.wargame.join(&self.version).join(DATABASE_FILE)
    }

    /// Runs the exporter once per table, calling `on_table` before each, and
    /// returns the version directory the tables were moved to.
    pub fn run(&self, mut on_table: impl FnMut(&str)) -> IResult<PathBuf> {
        std::fs::create_dir_all(&self.destination)
            .map_err(|err| ErrorKind::io(&self.destination, err))?;
        let database = self.database_path();

        for table in &self.tables {
            on_table(table);
            let status = Command::new(&self.exporter)
                .arg(&database)
                .arg(ARCHIVE_PATH)
                .arg(table)
                .current_dir(&self.destination)
                .status()
                .map_err(|err| ErrorKind::io(&self.exporter, err))?;
            if !status.success() {
                return Err(ErrorKind::Exporter {
                    table: table.clone(),
                    status: status.to_string(),
                }
                .into());
            }
            debug!(table = %table, "exported table");
        }

        let target = self.destination.join(&self.version);
        move_exported_tree(&self.destination.join(EXPORTED_DIR), &target)?;
        info!(tables = self.tables.len(), dir = %target.display(), "dump complete");
        Ok(target)
    }
}

fn move_exported_tree(exported: &Path, version_dir: &Path) -> IResult<()> {
    std::fs::create_dir_all(version_dir).map_err(|err| ErrorKind::io(version_dir, err))?;
    let target = version_dir.join(EXPORTED_DIR);
    if target.exists() {
        warn!(dir = %target.display(), "replacing previous dump");
        std::fs::remove_dir_all(&target).map_err(|err| ErrorKind::io(&target, err))?;
    }
    std::fs::rename(exported, &target).map_err(|err| ErrorKind::io(exported, err))?;
    Ok(())
}

#[cfg(all(test, unix))]
mod test {
    use super::*;

    /// Runs `sh` as the exporter, so the "database" is a shell script that
    /// gets the archive path and table name as `$1` and `$2`.
    fn request(root: &Path, script: &str) -> DumpRequest {
        let wargame = root.join("game");
        std::fs::create_dir_all(wargame.join("510049986")).unwrap();
        std::fs::write(wargame.join("510049986").join(DATABASE_FILE), script).unwrap();

        DumpRequest::builder()
            .exporter("sh")
            .wargame(wargame)
            .version("510049986")
            .destination(root.join("raws"))
            .tables(vec!["TAmmunition".to_string(), "TUniteAuSolDescriptor".to_string()])
            .build()
    }

    #[test]
    fn dumps_every_table_into_the_version_dir() {
        let root = tempfile::tempdir().unwrap();
        let script = "dir=NDF_Win/pc/ndf/patchable/gfx/everything\n\
                      mkdir -p \"$dir\"\n\
                      echo '<Root/>' > \"$dir/$2.xml\"\n";
        let request = request(root.path(), script);

        let mut seen = Vec::new();
        let dir = request.run(|table| seen.push(table.to_string())).unwrap();

        assert_eq!(seen, ["TAmmunition", "TUniteAuSolDescriptor"]);
        assert_eq!(dir, root.path().join("raws").join("510049986"));
        let tables = dir.join(crate::game_data::TABLES_DIR);
        assert!(tables.join("TAmmunition.xml").is_file());
        assert!(tables.join("TUniteAuSolDescriptor.xml").is_file());
        assert!(!root.path().join("raws").join(EXPORTED_DIR).exists());
    }

    #[test]
    fn failing_exporter_names_the_table() {
        let root = tempfile::tempdir().unwrap();
        let request = request(root.path(), "exit 3\n");

        let err = request.run(|_| {}).unwrap_err();
        match err.kind {
            ErrorKind::Exporter { table, .. } => assert_eq!(table, "TAmmunition"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn default_request_dumps_everything() {
        let request = DumpRequest::builder()
            .exporter("WGTableExporter.exe")
            .wargame("Data/WARGAME/PC")
            .destination("raws")
            .build();
        assert_eq!(request.version(), DEFAULT_VERSION);
        assert_eq!(request.tables().len(), DUMP_TABLES.len());
        assert_eq!(
            request.database_path(),
            Path::new("Data/WARGAME/PC/Everything/NDF_Win.dat")
        );
    }
}
