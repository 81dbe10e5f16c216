//! Fact and bridge tables.
//!
//! Every builder follows the same contract:
//! - the context key is attached from the row's context columns (null when
//!   it does not resolve),
//! - entity references resolve through the dimension key maps (null when
//!   they do not),
//! - multi-valued cells are exploded into one row per token,
//! - row ids are content hashes over the natural key, never row positions,
//! - numeric columns are parse-or-null,
//! - an absent sheet yields an empty table with the declared columns.

mod actors;
mod brainstorm;
mod characterization;
mod conflicts;
mod ecosystems;
mod survey;
mod threats;

use tracing::debug;

use crate::canonical::KeyGen;
use crate::dimensions::Dimensions;
use crate::table::{Cell, Table, TableMap};

/// Shared inputs of every fact builder.
#[derive(Debug, Clone, Copy)]
pub struct FactInputs<'a> {
    pub raw: &'a TableMap,
    pub dims: &'a Dimensions,
    pub keys: KeyGen,
}

/// Parse-or-null numeric coercion as a cell.
pub(crate) fn numeric(cell: &Cell) -> Cell {
    Cell::from(cell.to_number())
}

/// Builds every TIDY_* table in output order.
pub fn build_facts(raw: &TableMap, dims: &Dimensions, keys: KeyGen) -> Vec<(&'static str, Table)> {
    let inputs = FactInputs { raw, dims, keys };
    let mut out = Vec::new();
    out.push(brainstorm::brainstorm(&inputs));
    out.push(brainstorm::prioritization(&inputs));
    out.extend(characterization::characterization(&inputs));
    out.extend(ecosystems::ecosystems(&inputs));
    out.extend(ecosystems::services_livelihoods(&inputs));
    out.push(threats::threats(&inputs));
    out.extend(threats::threat_impacts(&inputs, &threats::LIVELIHOOD_IMPACTS));
    out.extend(threats::threat_impacts(&inputs, &threats::SERVICE_IMPACTS));
    out.extend(actors::actors(&inputs));
    out.extend(actors::dialogue(&inputs));
    out.push(conflicts::conflict_events(&inputs));
    out.push(conflicts::conflict_actors(&inputs));
    out.extend(survey::survey(&inputs));

    for (name, table) in &out {
        debug!(table = *name, rows = table.len(), "fact table built");
    }
    out
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::table::{Cell, Table};

    /// A sheet from string rows; empty strings become empty cells.
    pub fn sheet(columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new(columns);
        for r in rows {
            t.push(
                r.iter()
                    .map(|v| if v.is_empty() { Cell::Empty } else { Cell::from(*v) })
                    .collect(),
            );
        }
        t
    }

    /// A sheet with the four context columns in front of `columns`.
    pub fn context_sheet(columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut all = vec!["fecha", "admin0", "paisaje", "grupo"];
        all.extend_from_slice(columns);
        let rows: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| {
                let mut row = vec!["2023-07-01", "Panama", "Darien", "G1"];
                row.extend_from_slice(r);
                row
            })
            .collect();
        let refs: Vec<&[&str]> = rows.iter().map(|r| r.as_slice()).collect();
        sheet(&all, &refs)
    }

    pub fn texts(table: &Table, column: &str) -> Vec<String> {
        table.column(column).map(|c| c.text()).collect()
    }
}
