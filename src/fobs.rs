//! Forward operating bases.
//!
//! FOBs are exported separately from fighting units, already flattened to
//! CSV. Their list-valued columns hold Python list literals such as
//! `['8BD43C9757360E00', 'DAD77965E3000000']`.

use tracing::info;

use crate::clean::unit::deck_cell;
use crate::constants::UnitCodes;
use crate::table::{Cell, Row, Table};

const DROPPED_COLUMNS: [&str; 3] = ["_ShortDatabaseName", "Category", "NameInMenuToken"];

const DEPLOYABLE_COLUMNS: [&str; 5] = [
    "RookieDeployableAmount",
    "TrainedDeployableAmount",
    "HardenedDeployableAmount",
    "VeteranDeployableAmount",
    "EliteDeployableAmount",
];

/// Splits a Python list literal into its elements, without quotes.
pub fn parse_list_literal(text: &str) -> Vec<String> {
    let inner = text.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    inner
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"'))
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cleans the raw FOB table into final dataset columns. The `ID` column is
/// kept so the rows can be appended to the unit dataset.
pub fn clean_fobs(raw: &Table, codes: &UnitCodes) -> Table {
    let fobs = Table::from_rows(raw.rows().iter().map(|row| clean_fob(row, codes)));
    info!(fobs = fobs.rows().len(), "cleaned fobs");
    fobs
}

fn clean_fob(raw: &Row, codes: &UnitCodes) -> Row {
    let text = |column: &str| raw.get(column).and_then(Cell::as_str);
    let mut row = Row::new();

    if let Some(id) = raw.get("ID") {
        row.set("ID", Cell::int(id.as_f64().map(|v| v as i64)));
    }

    for column in raw.columns() {
        let cell = raw.get(column).cloned().unwrap_or(Cell::Empty);
        match column {
            "ID" => {}
            _ if DROPPED_COLUMNS.contains(&column) => {}
            "Factory" | "UnitTypeTokens" | "MaxDeployableAmount" => {}
            "NameInMenu" => row.set("Name", cell),
            "MotherCountry" => row.set(
                "MotherCountry",
                Cell::text(text(column).and_then(|c| codes.mother_country(c))),
            ),
            "ProductionPrice" => {
                let first = text(column).map(parse_list_literal).and_then(|l| l.into_iter().next());
                row.set("Price", Cell::number_or_text(first.as_deref()));
            }
            _ => row.set(column, cell),
        }
    }

    let factory = raw.get("Factory").and_then(Cell::as_f64).map(|v| v as i32);
    row.set("Tab", Cell::text(factory.and_then(|f| codes.tab(f))));

    let tokens = text("UnitTypeTokens").map(parse_list_literal).unwrap_or_default();
    row.set("Decks", deck_cell(tokens.iter().map(String::as_str), codes));

    let deployables = text("MaxDeployableAmount")
        .map(parse_list_literal)
        .unwrap_or_default();
    for (idx, column) in DEPLOYABLE_COLUMNS.iter().enumerate() {
        let amount = deployables
            .get(idx)
            .and_then(|v| v.parse::<f64>().ok())
            .map(|v| v as i64);
        row.set(column, Cell::int(amount));
    }

    row
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::DEFAULT_UNIT_CODES;

    const RAW_FOBS: &str = "\
,ID,_ShortDatabaseName,Category,Factory,UnitTypeTokens,NameInMenuToken,MaxDeployableAmount,MotherCountry,ProductionPrice,NameInMenu,SupplyCapacity
0,9001,FOB_US,5,3,\"['DAD77965E3000000', '8BD43C9757360E00']\",AA00,\"[1, 1, 1, 1, 1]\",US,[75],FOB,16000
";

    #[test]
    fn list_literals() {
        assert_eq!(parse_list_literal("['A', \"B\"]"), ["A", "B"]);
        assert_eq!(parse_list_literal("[4, 3, 2]"), ["4", "3", "2"]);
        assert!(parse_list_literal("[]").is_empty());
    }

    #[test]
    fn cleans_raw_fobs() {
        let raw = Table::read_from(RAW_FOBS.as_bytes()).unwrap();
        let fobs = clean_fobs(&raw, &DEFAULT_UNIT_CODES);
        let row = &fobs.rows()[0];

        assert_eq!(row.get("ID"), Some(&Cell::Int(9001)));
        assert_eq!(row.get("Name"), Some(&Cell::Text("FOB".into())));
        assert_eq!(row.get("Tab"), Some(&Cell::Text("LOG".into())));
        assert_eq!(
            row.get("Decks").map(ToString::to_string).as_deref(),
            Some("Mechanized|Support")
        );
        assert_eq!(row.get("MotherCountry"), Some(&Cell::Text("United States".into())));
        assert_eq!(row.get("Price"), Some(&Cell::Float(75.0)));
        assert_eq!(row.get("EliteDeployableAmount"), Some(&Cell::Int(1)));
        assert_eq!(row.get("SupplyCapacity"), Some(&Cell::Text("16000".into())));
        for dropped in [
            "_ShortDatabaseName",
            "Category",
            "Factory",
            "UnitTypeTokens",
            "NameInMenuToken",
            "MaxDeployableAmount",
            "NameInMenu",
        ] {
            assert!(row.get(dropped).is_none(), "{dropped} should not be a column");
        }
    }
}
