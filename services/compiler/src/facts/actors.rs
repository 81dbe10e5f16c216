use crate::lists::split_list;
use crate::registry::{sheets, tables};
use crate::table::{Cell, Table};

use super::FactInputs;

const ACTOR_COLUMNS: &[&str] = &[
    "actor_obs_id",
    "context_id",
    "actor_id",
    "nombre_actor",
    "tipo_actor",
    "rol_paisaje",
    "poder",
    "interes",
];
const RELATION_COLUMNS: &[&str] = &[
    "rel_id",
    "context_id",
    "actor_id",
    "other_actor_id",
    "other_actor_name",
    "rel_type",
];
const DIALOGUE_COLUMNS: &[&str] = &[
    "dialogo_id",
    "context_id",
    "espacio_id",
    "nombre_espacio",
    "tipo",
    "alcance",
    "funcion",
    "incidencia",
    "fortalezas",
    "debilidades",
];
const DIALOGUE_ACTOR_COLUMNS: &[&str] = &["bridge_id", "dialogo_id", "actor_id", "actor_name"];

/// Relation list columns and the `rel_type` each one produces.
const RELATION_SOURCES: [(&str, &str); 2] = [("conflicto", "conflicto_con"), ("colabora", "colabor_con")];

/// TIDY_5_1_ACTORES and TIDY_5_1_RELACIONES. Relations are only emitted for
/// actors that resolved to a key.
pub fn actors(inputs: &FactInputs<'_>) -> [(&'static str, Table); 2] {
    let mut main = Table::new(ACTOR_COLUMNS);
    let mut relations = Table::new(RELATION_COLUMNS);

    if let Some(source) = inputs.raw.get(sheets::ACTORS) {
        let dims = inputs.dims;
        let keys = inputs.keys;
        for record in source.records() {
            let context_id = dims.contexts.cell(&record);
            let actor_id = dims.actor_ids.cell(record.get("nombre_actor"));
            let id = keys.key("actor_obs", &[&context_id, &actor_id]);
            main.push_with(|col| match col {
                "actor_obs_id" => Cell::from(&id),
                "context_id" => context_id.clone(),
                "actor_id" => actor_id.clone(),
                other => record.get(other).clone(),
            });

            if actor_id.is_blank() {
                continue;
            }
            for (rel_type, column) in RELATION_SOURCES {
                for name in split_list(record.get(column)) {
                    let other_id = dims.actor_ids.cell(&name);
                    let rel_id = keys.key("rel", &[&context_id, &actor_id, &other_id, &rel_type]);
                    relations.push(vec![
                        Cell::from(rel_id),
                        context_id.clone(),
                        actor_id.clone(),
                        other_id,
                        Cell::from(name),
                        Cell::from(rel_type),
                    ]);
                }
            }
        }
    }

    [
        (tables::TIDY_5_1_ACTORES, main),
        (tables::TIDY_5_1_RELACIONES, relations),
    ]
}

/// TIDY_5_2_DIALOGO and the actors involved in each dialogue space.
pub fn dialogue(inputs: &FactInputs<'_>) -> [(&'static str, Table); 2] {
    let mut main = Table::new(DIALOGUE_COLUMNS);
    let mut bridge = Table::new(DIALOGUE_ACTOR_COLUMNS);

    if let Some(source) = inputs.raw.get(sheets::DIALOGUE) {
        let dims = inputs.dims;
        let keys = inputs.keys;
        for record in source.records() {
            let context_id = dims.contexts.cell(&record);
            let espacio_id = dims.espacio_ids.cell(record.get("nombre_espacio"));
            let id = keys.key(
                "dialogo",
                &[&context_id, &espacio_id, record.get("tipo"), record.get("alcance")],
            );
            main.push_with(|col| match col {
                "dialogo_id" => Cell::from(&id),
                "context_id" => context_id.clone(),
                "espacio_id" => espacio_id.clone(),
                other => record.get(other).clone(),
            });

            for name in split_list(record.get("actores_invol")) {
                let actor_id = dims.actor_ids.cell(&name);
                let bridge_id = keys.key("dlg_act", &[&id, &actor_id, &name]);
                bridge.push(vec![
                    Cell::from(bridge_id),
                    Cell::from(&id),
                    actor_id,
                    Cell::from(name),
                ]);
            }
        }
    }

    [
        (tables::TIDY_5_2_DIALOGO, main),
        (tables::TIDY_5_2_DIALOGO_ACTOR, bridge),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::KeyGen;
    use crate::dimensions::Dimensions;
    use crate::facts::testing::{context_sheet, texts};
    use crate::table::TableMap;

    fn run(raw: &TableMap, build: fn(&FactInputs<'_>) -> [(&'static str, Table); 2]) -> [(&'static str, Table); 2] {
        let dims = Dimensions::build(raw, KeyGen::default());
        build(&FactInputs {
            raw,
            dims: &dims,
            keys: KeyGen::default(),
        })
    }

    #[test]
    fn test_relations_conflict_before_collaboration() {
        let mut raw = TableMap::new();
        raw.insert(
            sheets::ACTORS,
            context_sheet(
                &["nombre_actor", "tipo_actor", "colabor_con", "conflicto_con"],
                &[
                    &["MiAmbiente", "Estatal", "ONG Verde; Alcaldía", "Minera"],
                    &["", "Privado", "Cooperativa", ""],
                ],
            ),
        );
        let [(_, main), (_, rel)] = run(&raw, actors);
        assert_eq!(main.len(), 2);
        assert_eq!(texts(&rel, "rel_type"), vec!["conflicto", "colabora", "colabora"]);
        assert_eq!(texts(&rel, "other_actor_name"), vec!["Minera", "ONG Verde", "Alcaldía"]);
        assert!(rel.column("other_actor_id").all(|c| !c.is_blank()));
        let actor = main.rows()[0][2].clone();
        assert!(rel.column("actor_id").all(|c| *c == actor));
    }

    #[test]
    fn test_dialogue_bridge_resolves_actors() {
        let mut raw = TableMap::new();
        raw.insert(
            sheets::DIALOGUE,
            context_sheet(
                &["nombre_espacio", "tipo", "alcance", "actores_invol"],
                &[&["Mesa del Agua", "Formal", "Local", "Alcaldía, Cooperativa"]],
            ),
        );
        let [(name, main), (_, bridge)] = run(&raw, dialogue);
        assert_eq!(name, tables::TIDY_5_2_DIALOGO);
        assert!(!main.rows()[0][2].is_blank());
        assert_eq!(bridge.len(), 2);
        assert!(bridge.column("actor_id").all(|c| !c.is_blank()));
        assert!(bridge.column("dialogo_id").all(|c| *c == main.rows()[0][0]));
    }
}
