//! Reads the exporter's XML output into a [`DocumentGraph`].
//!
//! Each table kind lives in its own `<Kind>.xml` file. The root element's
//! children are records, tagged with the kind and carrying an `id`
//! attribute. A record's children are its attributes: leaf text is a scalar,
//! a reference or `null`, and an attribute with element children is a
//! collection.

use std::fs::read_dir;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::data::{DocumentGraph, Record, Table, Value};
use crate::error::ErrorKind;

/// Parses one table file. `kind` names the table, normally the file stem.
pub fn parse_table(kind: &str, xml: &str) -> Result<Table, roxmltree::Error> {
    let doc = roxmltree::Document::parse(xml)?;
    let mut table = Table::new(kind);

    for node in doc.root_element().children().filter(|n| n.is_element()) {
        let Some(id) = node.attribute("id").and_then(|id| id.trim().parse::<u32>().ok()) else {
            warn!(table = kind, tag = node.tag_name().name(), "record without a numeric id, skipping");
            continue;
        };

        let mut record = Record::new(node.tag_name().name(), id);
        for field in node.children().filter(|n| n.is_element()) {
            record.push(field.tag_name().name(), parse_value(&field));
        }
        table.insert(record);
    }

    Ok(table)
}

fn parse_value(node: &roxmltree::Node) -> Value {
    if node.children().any(|n| n.is_element()) {
        Value::Collection(
            node.children()
                .filter(|n| n.is_element())
                .map(|n| parse_value(&n))
                .collect(),
        )
    } else {
        Value::from_text(node.text())
    }
}

/// Loads every `*.xml` file below `dir` (recursively) as a table.
pub fn load_tables_dir(dir: &Path) -> Result<DocumentGraph, ErrorKind> {
    let mut files = Vec::new();
    collect_xml_files(dir, &mut files)?;
    files.sort();

    let mut graph = DocumentGraph::new();
    for path in files {
        let Some(kind) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let data = std::fs::read(&path).map_err(|err| ErrorKind::io(&path, err))?;
        let xml = String::from_utf8_lossy(&data);
        let table = parse_table(kind, &xml).map_err(|err| ErrorKind::Xml {
            path: path.clone(),
            detail: err.to_string(),
        })?;
        debug!(table = kind, records = table.len(), "loaded table");
        graph.insert_table(table);
    }

    Ok(graph)
}

fn collect_xml_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ErrorKind> {
    for entry in read_dir(dir).map_err(|err| ErrorKind::io(dir, err))? {
        let entry = entry.map_err(|err| ErrorKind::io(dir, err))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|err| ErrorKind::io(&path, err))?;
        if file_type.is_dir() {
            collect_xml_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xml")) {
            out.push(path);
        }
    }
    Ok(())
}
