//! Conflict evolution events (6.1) and actors involved in conflicts (6.2).

use crate::lists::split_list;
use crate::registry::{sheets, tables};
use crate::table::{Cell, Table};

use super::{numeric, FactInputs};

const EVENT_COLUMNS: &[&str] = &[
    "event_id",
    "context_id",
    "conflicto_id",
    "cod_conflict",
    "evento",
    "ano_evento",
    "diferencias",
    "dif_factor",
    "cooperacion",
    "coop_factor",
    "suma",
];
const EVENT_NUMBERS: &[&str] = &["ano_evento", "diferencias", "cooperacion", "suma"];

const CONFLICT_ACTOR_COLUMNS: &[&str] = &[
    "conflict_actor_id",
    "context_id",
    "conflicto_id",
    "cod_conflict",
    "actor_id",
    "actor",
    "i_en_actor",
    "iea_factor",
    "i_en_conflicto",
    "iec_factor",
];

/// TIDY_6_1_CONFLICT_EVENTS, one row per conflict code of each event.
pub fn conflict_events(inputs: &FactInputs<'_>) -> (&'static str, Table) {
    let mut table = Table::new(EVENT_COLUMNS);
    let Some(source) = inputs.raw.get(sheets::CONFLICT_EVOLUTION) else {
        return (tables::TIDY_6_1_CONFLICT_EVENTS, table);
    };
    let dims = inputs.dims;

    for record in source.records() {
        let context_id = dims.contexts.cell(&record);
        let year = numeric(record.get("ano_evento"));
        for code in split_list(record.get("cod_conflict")) {
            let code = Cell::from(code);
            let conflicto_id = dims.conflicto_ids.cell(&code);
            let id = inputs
                .keys
                .key("ev", &[&context_id, record.get("evento"), &year, &code]);
            table.push_with(|col| match col {
                "event_id" => Cell::from(&id),
                "context_id" => context_id.clone(),
                "conflicto_id" => conflicto_id.clone(),
                "cod_conflict" => code.clone(),
                n if EVENT_NUMBERS.contains(&n) => numeric(record.get(n)),
                other => record.get(other).clone(),
            });
        }
    }
    (tables::TIDY_6_1_CONFLICT_EVENTS, table)
}

/// TIDY_6_2_CONFLICTO_ACTOR. Impact columns are copied as-is.
pub fn conflict_actors(inputs: &FactInputs<'_>) -> (&'static str, Table) {
    let mut table = Table::new(CONFLICT_ACTOR_COLUMNS);
    let Some(source) = inputs.raw.get(sheets::CONFLICT_ACTORS) else {
        return (tables::TIDY_6_2_CONFLICTO_ACTOR, table);
    };
    let dims = inputs.dims;

    for record in source.records() {
        let context_id = dims.contexts.cell(&record);
        let conflicto_id = dims.conflicto_ids.cell(record.get("cod_conflict"));
        let actor_id = dims.actor_ids.cell(record.get("actor"));
        let id = inputs
            .keys
            .key("cact", &[&context_id, &conflicto_id, &actor_id]);
        table.push_with(|col| match col {
            "conflict_actor_id" => Cell::from(&id),
            "context_id" => context_id.clone(),
            "conflicto_id" => conflicto_id.clone(),
            "actor_id" => actor_id.clone(),
            other => record.get(other).clone(),
        });
    }
    (tables::TIDY_6_2_CONFLICTO_ACTOR, table)
}
