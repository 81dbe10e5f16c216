use crate::canonical::canonical_text;
use crate::registry::{first_existing_column, sheets, tables, PRIORITIZATION_MDV_COLUMNS};
use crate::table::{Cell, Table};

use super::{numeric, FactInputs};

const BRAINSTORM_COLUMNS: &[&str] = &[
    "brainstorm_id",
    "context_id",
    "elemento_SES",
    "nombre",
    "uso_fin_mdv",
    "mdv_id",
    "ecosistema_id",
];

const PRIORITIZATION_COLUMNS: &[&str] = &[
    "priorizacion_id",
    "context_id",
    "mdv_id",
    "mdv_name",
    "producto_principal",
    "i_seg_alim",
    "i_area",
    "i_des_loc",
    "i_ambiente",
    "i_inclusion",
    "i_total",
];

const PRIORITY_SCORES: &[&str] = &[
    "i_seg_alim",
    "i_area",
    "i_des_loc",
    "i_ambiente",
    "i_inclusion",
    "i_total",
];

/// TIDY_3_1_BRAINSTORM. The `nombre` resolves to a livelihood or an
/// ecosystem depending on what `elemento_SES` says it is.
pub fn brainstorm(inputs: &FactInputs<'_>) -> (&'static str, Table) {
    let mut table = Table::new(BRAINSTORM_COLUMNS);
    let Some(source) = inputs.raw.get(sheets::BRAINSTORM) else {
        return (tables::TIDY_3_1_BRAINSTORM, table);
    };
    let dims = inputs.dims;

    for record in source.records() {
        let context_id = dims.contexts.cell(&record);
        let kind = canonical_text(record.get("elemento_SES"));
        let nombre = record.get("nombre");
        let mdv_id = if kind.contains("medio") {
            dims.mdv_ids.cell(nombre)
        } else {
            Cell::Empty
        };
        let ecosistema_id = if kind.contains("ecosistema") {
            dims.ecosistema_ids.cell(nombre)
        } else {
            Cell::Empty
        };
        let id = inputs.keys.key(
            "bs",
            &[
                &context_id,
                record.get("elemento_SES"),
                nombre,
                record.get("uso_fin_mdv"),
            ],
        );

        table.push_with(|col| match col {
            "brainstorm_id" => Cell::from(&id),
            "context_id" => context_id.clone(),
            "mdv_id" => mdv_id.clone(),
            "ecosistema_id" => ecosistema_id.clone(),
            other => record.get(other).clone(),
        });
    }
    (tables::TIDY_3_1_BRAINSTORM, table)
}

/// TIDY_3_2_PRIORIZACION: livelihood prioritization scores per context.
pub fn prioritization(inputs: &FactInputs<'_>) -> (&'static str, Table) {
    let mut table = Table::new(PRIORITIZATION_COLUMNS);
    let Some(source) = inputs.raw.get(sheets::PRIORITIZATION) else {
        return (tables::TIDY_3_2_PRIORIZACION, table);
    };
    let dims = inputs.dims;
    let mdv_column = first_existing_column(source.columns(), PRIORITIZATION_MDV_COLUMNS)
        .unwrap_or(PRIORITIZATION_MDV_COLUMNS[0]);

    for record in source.records() {
        let context_id = dims.contexts.cell(&record);
        let mdv_name = record.get(mdv_column);
        let mdv_id = dims.mdv_ids.cell(mdv_name);
        let id = inputs.keys.key("prio", &[&context_id, &mdv_id]);

        table.push_with(|col| match col {
            "priorizacion_id" => Cell::from(&id),
            "context_id" => context_id.clone(),
            "mdv_id" => mdv_id.clone(),
            "mdv_name" => mdv_name.clone(),
            score if PRIORITY_SCORES.contains(&score) => numeric(record.get(score)),
            other => record.get(other).clone(),
        });
    }
    (tables::TIDY_3_2_PRIORIZACION, table)
}
