//! Livelihood characterization sheets (3.3 A to D) and their key/value union.

use crate::canonical::Canonical;
use crate::registry::{sheets, tables};
use crate::table::{Cell, Table};

use super::{numeric, FactInputs};

/// Static description of one characterization sheet.
struct CarSpec {
    sheet: &'static str,
    table: &'static str,
    module: &'static str,
    tag: &'static str,
    columns: &'static [&'static str],
    /// Natural-key fields after (context_id, mdv_id).
    key_fields: &'static [&'static str],
    numeric: &'static [&'static str],
}

const CAR_SPECS: [CarSpec; 4] = [
    CarSpec {
        sheet: sheets::CAR_A,
        table: tables::TIDY_3_3_CAR_A,
        module: "A",
        tag: "carA",
        columns: &[
            "car_a_id",
            "context_id",
            "mdv_id",
            "mdv",
            "codigo_mdv",
            "codigo_mapa",
            "sistema",
            "uso_final",
            "cv_importancia",
            "cv_producto",
            "cv_mercado",
        ],
        key_fields: &["codigo_mapa", "codigo_mdv"],
        numeric: &["cv_importancia", "cv_producto", "cv_mercado"],
    },
    CarSpec {
        sheet: sheets::CAR_B,
        table: tables::TIDY_3_3_CAR_B,
        module: "B",
        tag: "carB",
        columns: &[
            "car_b_id",
            "context_id",
            "mdv_id",
            "mdv",
            "codigo_mapa",
            "tenencia",
            "tenencia_descripcion",
        ],
        key_fields: &["codigo_mapa", "tenencia"],
        numeric: &[],
    },
    CarSpec {
        sheet: sheets::CAR_C,
        table: tables::TIDY_3_3_CAR_C,
        module: "C",
        tag: "carC",
        columns: &[
            "car_c_id",
            "context_id",
            "mdv_id",
            "mdv",
            "codigo_mdv",
            "codigo_mapa",
            "tamano",
            "unidad",
            "rango",
            "porcentaje",
        ],
        key_fields: &["codigo_mapa", "tamano", "unidad", "rango"],
        numeric: &["porcentaje"],
    },
    CarSpec {
        sheet: sheets::CAR_D,
        table: tables::TIDY_3_3_CAR_D,
        module: "D",
        tag: "carD",
        columns: &[
            "car_d_id",
            "context_id",
            "mdv_id",
            "mdv",
            "codigo_mdv",
            "codigo_mapa",
            "tenencia",
            "tamano",
            "porcentaje",
        ],
        key_fields: &["codigo_mapa", "tenencia", "tamano"],
        numeric: &["porcentaje"],
    },
];

const LONG_COLUMNS: &[&str] = &[
    "car_long_id",
    "module",
    "record_id",
    "context_id",
    "mdv_id",
    "mdv",
    "codigo_mapa",
    "codigo_mdv",
    "field",
    "value",
];

/// Columns repeated on every long row rather than melted into fields.
const LONG_IDENTITY: &[&str] = &["context_id", "mdv_id", "mdv", "codigo_mapa", "codigo_mdv"];

impl CarSpec {
    fn id_column(&self) -> &'static str {
        self.columns[0]
    }

    fn build(&self, inputs: &FactInputs<'_>) -> Table {
        let mut table = Table::new(self.columns);
        let Some(source) = inputs.raw.get(self.sheet) else {
            return table;
        };
        let dims = inputs.dims;

        for record in source.records() {
            let context_id = dims.contexts.cell(&record);
            let mdv_id = dims.mdv_ids.cell(record.get("mdv"));
            let mut parts: Vec<&dyn Canonical> = vec![&context_id, &mdv_id];
            parts.extend(self.key_fields.iter().map(|f| record.get(f) as &dyn Canonical));
            let id = inputs.keys.key(self.tag, &parts);

            table.push_with(|col| match col {
                "context_id" => context_id.clone(),
                "mdv_id" => mdv_id.clone(),
                c if c == self.id_column() => Cell::from(&id),
                c if self.numeric.contains(&c) => numeric(record.get(c)),
                other => record.get(other).clone(),
            });
        }
        table
    }

    /// Appends one long row per non-identity field of every row in `table`.
    fn melt_into(&self, table: &Table, long: &mut Table, inputs: &FactInputs<'_>) {
        let pk = self.id_column();
        let fields: Vec<&String> = table
            .columns()
            .iter()
            .filter(|c| c.as_str() != pk && !LONG_IDENTITY.contains(&c.as_str()))
            .collect();

        for record in table.records() {
            let record_id = record.get(pk);
            for field in &fields {
                let id = inputs
                    .keys
                    .key("carL", &[&self.module, record_id, *field]);
                long.push_with(|col| match col {
                    "car_long_id" => Cell::from(&id),
                    "module" => Cell::from(self.module),
                    "record_id" => record_id.clone(),
                    "field" => Cell::from(field.as_str()),
                    "value" => record.get(field).clone(),
                    other => record.get(other).clone(),
                });
            }
        }
    }
}

/// TIDY_3_3_CAR_A..D followed by TIDY_3_3_CAR_LONG.
pub fn characterization(inputs: &FactInputs<'_>) -> Vec<(&'static str, Table)> {
    let mut out = Vec::with_capacity(CAR_SPECS.len() + 1);
    let mut long = Table::new(LONG_COLUMNS);
    for spec in &CAR_SPECS {
        let table = spec.build(inputs);
        spec.melt_into(&table, &mut long, inputs);
        out.push((spec.table, table));
    }
    out.push((tables::TIDY_3_3_CAR_LONG, long));
    out
}
