use tracing::debug;

use crate::data::{DocumentGraph, Record, Reference, Value};
use crate::error::ErrorKind;
use crate::game_types::ModuleKind;

/// Kind of the indirection records a unit's `Modules` list points at.
pub const MODULE_SELECTOR: &str = "TModuleSelector";

impl DocumentGraph {
    /// Finds the record a reference points at.
    pub fn resolve(&self, reference: &Reference) -> Option<&Record> {
        self.record(reference.kind(), reference.id())
    }

    /// Resolves a single-reference attribute of `record`. Missing attributes,
    /// `null` and non-reference text all resolve to nothing.
    pub fn resolve_attribute(&self, record: &Record, attribute: &str) -> Option<&Record> {
        let reference = record.reference(attribute)?;
        let target = self.resolve(reference);
        if target.is_none() {
            debug!(owner = %record.describe(), attribute, %reference, "dangling reference");
        }
        target
    }

    /// Resolves a module through the owner's `Modules` list.
    ///
    /// The first entry mentioning `token` wins. If it points at a
    /// `TModuleSelector`, the selector's `Default` is followed to the module
    /// itself.
    pub fn resolve_module_named(&self, record: &Record, token: &str) -> Option<&Record> {
        let entry = record
            .collection("Modules")
            .iter()
            .filter_map(Value::reference_ref)
            .find(|r| r.mentions(token))?;
        let target = self.resolve(entry)?;

        if target.kind() == MODULE_SELECTOR {
            self.resolve_attribute(target, "Default")
        } else {
            Some(target)
        }
    }

    pub fn resolve_module(&self, record: &Record, module: ModuleKind) -> Option<&Record> {
        self.resolve_module_named(record, module.token())
    }

    /// Resolves every element of a reference-list attribute, in order.
    ///
    /// A failed element does not affect its neighbours. Callers decide what
    /// to do with the errors; the pipeline logs and skips them.
    pub fn resolve_list<'a>(
        &'a self,
        record: &Record,
        attribute: &str,
    ) -> Vec<Result<&'a Record, ErrorKind>> {
        record
            .collection(attribute)
            .iter()
            .map(|value| {
                value
                    .reference_ref()
                    .and_then(|r| self.resolve(r))
                    .ok_or_else(|| ErrorKind::UnresolvedReference {
                        owner: record.describe(),
                        attribute: attribute.to_string(),
                        reference: describe_value(value),
                    })
            })
            .collect()
    }
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Scalar(text) => text.clone(),
        Value::Reference(r) => r.to_string(),
        Value::Collection(items) => format!("<collection of {}>", items.len()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::loader::parse_table;

    fn graph() -> DocumentGraph {
        let units = r#"<Root>
  <TUniteAuSolDescriptor id="1">
    <Modules>
      <CollectionElement>Descriptor_Unit_ScannerTBA: 50 TModuleSelector</CollectionElement>
      <CollectionElement>Descriptor_Unit_ScannerConfiguration: 51 TModuleSelector</CollectionElement>
      <CollectionElement>Descriptor_Unit_Fuel: 52 TModuleSelector</CollectionElement>
      <CollectionElement>Descriptor_Unit_Experience: 8 TModernWarfareExperienceModuleDescriptor</CollectionElement>
    </Modules>
    <Transporters>
      <CollectionElement>Transport: 2 TUniteAuSolDescriptor</CollectionElement>
      <CollectionElement>Transport: 99 TUniteAuSolDescriptor</CollectionElement>
      <CollectionElement>1500</CollectionElement>
      <CollectionElement>Transport: 1 TUniteAuSolDescriptor</CollectionElement>
    </Transporters>
    <UpgradeRequired>Upgrade: 2 TUniteAuSolDescriptor</UpgradeRequired>
  </TUniteAuSolDescriptor>
  <TUniteAuSolDescriptor id="2" />
</Root>"#;
        let selectors = r#"<Root>
  <TModuleSelector id="50"><Default>Scanner: 60 TScannerConfigurationDescriptor</Default></TModuleSelector>
  <TModuleSelector id="51"><Default>Scanner: 61 TScannerConfigurationDescriptor</Default></TModuleSelector>
  <TModuleSelector id="52"><Default>Fuel: 404 TFuelModuleDescriptor</Default></TModuleSelector>
</Root>"#;
        let scanners = r#"<Root>
  <TScannerConfigurationDescriptor id="60"><PorteeVision>1000</PorteeVision></TScannerConfigurationDescriptor>
  <TScannerConfigurationDescriptor id="61"><PorteeVision>2600</PorteeVision></TScannerConfigurationDescriptor>
</Root>"#;
        let experience = r#"<Root>
  <TModernWarfareExperienceModuleDescriptor id="8"><KillExperienceBonus>1</KillExperienceBonus></TModernWarfareExperienceModuleDescriptor>
</Root>"#;

        [
            parse_table("TUniteAuSolDescriptor", units).unwrap(),
            parse_table("TModuleSelector", selectors).unwrap(),
            parse_table("TScannerConfigurationDescriptor", scanners).unwrap(),
            parse_table("TModernWarfareExperienceModuleDescriptor", experience).unwrap(),
            parse_table("TFuelModuleDescriptor", "<Root/>").unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn plain_reference() {
        let graph = graph();
        let unit = graph.record("TUniteAuSolDescriptor", 1).unwrap();
        let upgrade = graph.resolve_attribute(unit, "UpgradeRequired").unwrap();
        assert_eq!(upgrade.id(), 2);
        assert!(graph.resolve_attribute(unit, "Modules").is_none());
        assert!(graph.resolve_attribute(unit, "NoSuchAttribute").is_none());
    }

    #[test]
    fn module_through_selector() {
        let graph = graph();
        let unit = graph.record("TUniteAuSolDescriptor", 1).unwrap();

        let scanner = graph.resolve_module(unit, ModuleKind::Scanner).unwrap();
        assert_eq!(scanner.text("PorteeVision"), Some("2600"));

        // A loose token takes the first match in list order.
        let first = graph.resolve_module_named(unit, "Scanner").unwrap();
        assert_eq!(first.id(), 60);
    }

    #[test]
    fn module_without_selector_and_dangling_default() {
        let graph = graph();
        let unit = graph.record("TUniteAuSolDescriptor", 1).unwrap();

        let experience = graph.resolve_module(unit, ModuleKind::Experience).unwrap();
        assert_eq!(experience.kind(), "TModernWarfareExperienceModuleDescriptor");
        assert!(graph.resolve_module(unit, ModuleKind::Fuel).is_none());
        assert!(graph.resolve_module(unit, ModuleKind::WeaponManager).is_none());
    }

    #[test]
    fn list_failures_stay_local() {
        let graph = graph();
        let unit = graph.record("TUniteAuSolDescriptor", 1).unwrap();
        let resolved = graph.resolve_list(unit, "Transporters");

        assert_eq!(resolved.len(), 4);
        assert_eq!(resolved[0].as_ref().map(|r| r.id()).ok(), Some(2));
        assert!(matches!(
            &resolved[1],
            Err(ErrorKind::UnresolvedReference { reference, .. }) if reference.contains("99")
        ));
        assert!(resolved[2].is_err());
        assert_eq!(resolved[3].as_ref().map(|r| r.id()).ok(), Some(1));
    }

    #[test]
    fn resolution_is_deterministic() {
        let graph = graph();
        let unit = graph.record("TUniteAuSolDescriptor", 1).unwrap();
        let a = graph.resolve_module(unit, ModuleKind::Scanner).map(Record::id);
        let b = graph.resolve_module(unit, ModuleKind::Scanner).map(Record::id);
        assert_eq!(a, b);
    }
}
