/// Loading exported table dumps from disk
pub mod loader;
/// Plain, module and list reference resolution over a [`DocumentGraph`]
pub mod resolve;
/// Parsing of the exporter's `<label>: <id> <Kind>` reference text
pub mod reference;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::warn;
use variantly::Variantly;

pub use reference::Reference;

/// Looks up a display string by its localization hash.
pub trait StringLookup {
    fn localized(&self, hash: &str) -> Option<&str>;
}

impl StringLookup for HashMap<String, String> {
    fn localized(&self, hash: &str) -> Option<&str> {
        self.get(hash).map(String::as_str)
    }
}

/// A single attribute value as the exporter wrote it.
#[derive(Debug, Clone, PartialEq, Variantly)]
pub enum Value {
    /// The exporter's literal `null`, or no text at all.
    Null,
    Scalar(String),
    Reference(Reference),
    Collection(Vec<Value>),
}

impl Value {
    /// Classifies leaf text. References are recognized here, once, so nothing
    /// downstream re-parses strings.
    pub fn from_text(text: Option<&str>) -> Value {
        let Some(text) = text.map(str::trim) else {
            return Value::Null;
        };
        if text.is_empty() || text == "null" {
            return Value::Null;
        }
        match Reference::parse(text) {
            Some(reference) => Value::Reference(reference),
            None => Value::Scalar(text.to_string()),
        }
    }

    /// Text of a scalar value. References and collections have no scalar text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Scalar(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

/// One object from a table, with its attributes in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: String,
    id: u32,
    fields: Vec<Field>,
}

impl Record {
    pub fn new(kind: impl Into<String>, id: u32) -> Self {
        Self {
            kind: kind.into(),
            id,
            fields: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push(Field {
            name: name.into(),
            value,
        });
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn reference(&self, name: &str) -> Option<&Reference> {
        self.get(name).and_then(Value::reference_ref)
    }

    /// Elements of a collection attribute. Absent and null collections are
    /// empty.
    pub fn collection(&self, name: &str) -> &[Value] {
        self.get(name)
            .and_then(Value::collection_ref)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// `Kind#id`, for log lines.
    pub fn describe(&self) -> String {
        format!("{}#{}", self.kind, self.id)
    }
}

/// All records of one kind, in file order, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct Table {
    kind: String,
    records: Vec<Record>,
    by_id: HashMap<u32, usize>,
}

impl Table {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Adds a record. A repeated id keeps the first record.
    pub fn insert(&mut self, record: Record) {
        match self.by_id.entry(record.id) {
            Entry::Occupied(_) => {
                warn!(table = %self.kind, id = record.id, "duplicate record id, keeping the first");
            }
            Entry::Vacant(slot) => {
                slot.insert(self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn get(&self, id: u32) -> Option<&Record> {
        self.by_id.get(&id).map(|&idx| &self.records[idx])
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Every loaded table, keyed by kind. Built once, then only read.
#[derive(Debug, Clone, Default)]
pub struct DocumentGraph {
    tables: HashMap<String, Table>,
}

impl DocumentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing any earlier table of the same kind.
    pub fn insert_table(&mut self, table: Table) {
        if let Some(previous) = self.tables.insert(table.kind.clone(), table) {
            warn!(table = %previous.kind, "table loaded twice, keeping the later file");
        }
    }

    pub fn table(&self, kind: &str) -> Option<&Table> {
        self.tables.get(kind)
    }

    pub fn record(&self, kind: &str, id: u32) -> Option<&Record> {
        self.table(kind).and_then(|t| t.get(id))
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }
}

impl FromIterator<Table> for DocumentGraph {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        let mut graph = DocumentGraph::new();
        for table in iter {
            graph.insert_table(table);
        }
        graph
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn value_from_text_classifies_leaves() {
        assert_eq!(Value::from_text(None), Value::Null);
        assert_eq!(Value::from_text(Some("null")), Value::Null);
        assert_eq!(Value::from_text(Some("  ")), Value::Null);
        assert_eq!(Value::from_text(Some("52")), Value::Scalar("52".to_string()));
        assert!(
            Value::from_text(Some("Descriptor_Unit_Fuel: 12 TModuleSelector")).is_reference()
        );
    }

    #[test]
    fn table_keeps_first_duplicate() {
        let mut table = Table::new("TAmmunition");
        for arme in ["5", "9"] {
            let mut record = Record::new("TAmmunition", 4);
            record.push("Arme", Value::Scalar(arme.into()));
            table.insert(record);
        }

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(4).and_then(|r| r.text("Arme")), Some("5"));
    }

    #[test]
    fn absent_collection_is_empty() {
        let mut record = Record::new("TUniteAuSolDescriptor", 1);
        record.push("Transporters", Value::Null);
        assert!(record.collection("Transporters").is_empty());
        assert!(record.collection("Modules").is_empty());
    }
}
