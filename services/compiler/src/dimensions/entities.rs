use std::collections::HashSet;

use crate::canonical::{canonical_str, canonical_text, KeyGen};
use crate::lists::{split_codes, split_list};
use crate::registry::{first_existing_column, sheets, PRIORITIZATION_MDV_COLUMNS};
use crate::table::{Cell, Table, TableMap};

use super::{sheet_column, Distinct, KeyMap};

/// Brainstorm rows whose `elemento_SES` mentions `kind` ("medio", "ecosistema").
fn brainstorm_names(raw: &TableMap, kind: &str) -> Vec<String> {
    let Some(table) = raw.get(sheets::BRAINSTORM) else {
        return Vec::new();
    };
    if !table.has_columns(&["elemento_SES", "nombre"]) {
        return Vec::new();
    }
    table
        .records()
        .filter(|r| canonical_text(r.get("elemento_SES")).contains(kind))
        .filter_map(|r| r.get("nombre").as_text())
        .collect()
}

/// LOOKUP_MDV: livelihood names from every sheet that mentions one.
pub fn build_mdv(raw: &TableMap, keys: KeyGen) -> (Table, KeyMap) {
    let mut names = Distinct::new();
    names.extend(brainstorm_names(raw, "medio"));
    if let Some(table) = raw.get(sheets::PRIORITIZATION) {
        if let Some(column) = first_existing_column(table.columns(), PRIORITIZATION_MDV_COLUMNS) {
            for cell in table.column(column) {
                names.push_cell(cell);
            }
        }
    }
    for sheet in [sheets::CAR_A, sheets::CAR_B, sheets::CAR_C, sheets::CAR_D] {
        for cell in sheet_column(raw, sheet, "mdv") {
            names.push_cell(cell);
        }
    }
    for sheet in [sheets::ECOSYSTEMS, sheets::SERVICES_LIVELIHOODS] {
        for cell in sheet_column(raw, sheet, "mdv_relacionado") {
            names.extend(split_list(cell));
        }
    }
    for cell in sheet_column(raw, sheets::THREATS_LIVELIHOODS, "mdv") {
        names.extend(split_list(cell));
    }
    for cell in sheet_column(raw, sheets::SURVEY, "Medio de vida") {
        names.push_cell(cell);
    }
    names.into_lookup("mdv", "mdv_id", "mdv_name", keys)
}

/// LOOKUP_ECOSISTEMA, keyed by `cod_es` when present and by name otherwise.
/// Both the code and the name resolve to the row.
pub fn build_ecosistema(raw: &TableMap, keys: KeyGen) -> (Table, KeyMap) {
    let mut candidates: Vec<(String, String)> = brainstorm_names(raw, "ecosistema")
        .into_iter()
        .map(|name| (String::new(), name))
        .collect();
    if let Some(table) = raw.get(sheets::ECOSYSTEMS) {
        for record in table.records() {
            let Some(name) = record.get("ecosistema").as_text() else {
                continue;
            };
            candidates.push((record.text("cod_es"), name));
        }
    }

    let mut table = Table::new(&["ecosistema_id", "cod_es", "ecosistema"]);
    let mut ids = KeyMap::default();
    let mut seen = HashSet::new();
    for (cod_es, name) in candidates {
        let identity = if cod_es.is_empty() { &name } else { &cod_es };
        if !seen.insert(canonical_str(identity)) {
            continue;
        }
        let id = keys.key("eco", &[identity]);
        ids.insert(&cod_es, &id);
        ids.insert(&name, &id);
        table.push(vec![Cell::from(&id), Cell::from(cod_es), Cell::from(name)]);
    }
    (table, ids)
}

/// Service code of a `cod_es_se` value: the part after the first `_`.
pub(crate) fn split_service_code(value: &str) -> (String, String) {
    match value.split_once('_') {
        Some((eco, service)) => (eco.trim().to_string(), service.trim().to_string()),
        None => (String::new(), value.trim().to_string()),
    }
}

/// LOOKUP_SE: ecosystem-service codes.
pub fn build_se(raw: &TableMap, keys: KeyGen) -> (Table, KeyMap) {
    let mut codes = Distinct::new();
    for cell in sheet_column(raw, sheets::ECOSYSTEMS, "servicio_ecosistemico") {
        codes.extend(split_list(cell));
    }
    for cell in sheet_column(raw, sheets::SERVICES_LIVELIHOODS, "cod_es_se") {
        if let Some(text) = cell.as_text() {
            codes.push(&split_service_code(&text).1);
        }
    }
    for cell in sheet_column(raw, sheets::THREATS_SERVICES, "cod_se") {
        codes.push_cell(cell);
    }
    codes.into_lookup("se", "se_id", "cod_se", keys)
}

pub fn build_elemento_se(raw: &TableMap, keys: KeyGen) -> (Table, KeyMap) {
    let mut values = Distinct::new();
    for cell in sheet_column(raw, sheets::SERVICES_LIVELIHOODS, "elemento_se") {
        values.push_cell(cell);
    }
    values.into_lookup("elemento_se", "elemento_se_id", "elemento_se", keys)
}

/// Composite canonical identity of a threat.
pub fn threat_identity(tipo: &Cell, amenaza: &Cell) -> String {
    format!("{}|{}", canonical_text(tipo), canonical_text(amenaza))
}

/// LOOKUP_AMENAZA over (tipo_amenaza, amenaza) pairs where both are present.
pub fn build_amenaza(raw: &TableMap, keys: KeyGen) -> (Table, KeyMap) {
    let mut table = Table::new(&["amenaza_id", "tipo_amenaza", "amenaza"]);
    let mut ids = KeyMap::default();
    let sources = [sheets::THREATS, sheets::THREATS_LIVELIHOODS, sheets::THREATS_SERVICES];
    for sheet in sources {
        let Some(source) = raw.get(sheet) else {
            continue;
        };
        if !source.has_columns(&["tipo_amenaza", "amenaza"]) {
            continue;
        }
        for record in source.records() {
            let (Some(tipo), Some(amenaza)) = (
                record.get("tipo_amenaza").as_text(),
                record.get("amenaza").as_text(),
            ) else {
                continue;
            };
            let identity = threat_identity(record.get("tipo_amenaza"), record.get("amenaza"));
            if ids.get_identity(&identity).is_some() {
                continue;
            }
            let id = keys.key("amenaza", &[&tipo, &amenaza]);
            ids.insert_identity(identity, &id);
            table.push(vec![Cell::from(&id), Cell::from(tipo), Cell::from(amenaza)]);
        }
    }
    (table, ids)
}

/// LOOKUP_ACTOR: named actors plus everyone mentioned in relation lists.
pub fn build_actor(raw: &TableMap, keys: KeyGen) -> (Table, KeyMap) {
    let mut names = Distinct::new();
    for cell in sheet_column(raw, sheets::ACTORS, "nombre_actor") {
        names.push_cell(cell);
    }
    for column in ["colabor_con", "conflicto_con"] {
        for cell in sheet_column(raw, sheets::ACTORS, column) {
            names.extend(split_list(cell));
        }
    }
    for cell in sheet_column(raw, sheets::DIALOGUE, "actores_invol") {
        names.extend(split_list(cell));
    }
    for cell in sheet_column(raw, sheets::CONFLICT_ACTORS, "actor") {
        names.push_cell(cell);
    }
    names.into_lookup("actor", "actor_id", "nombre_actor", keys)
}

pub fn build_espacio(raw: &TableMap, keys: KeyGen) -> (Table, KeyMap) {
    let mut names = Distinct::new();
    for cell in sheet_column(raw, sheets::DIALOGUE, "nombre_espacio") {
        names.push_cell(cell);
    }
    names.into_lookup("espacio", "espacio_id", "nombre_espacio", keys)
}

/// LOOKUP_CONFLICTO: conflict codes from the conflict sheets and from the
/// conflict-map cells of the threat impact sheets.
pub fn build_conflicto(raw: &TableMap, keys: KeyGen) -> (Table, KeyMap) {
    let mut codes = Distinct::new();
    for sheet in [sheets::CONFLICT_EVOLUTION, sheets::CONFLICT_ACTORS] {
        for cell in sheet_column(raw, sheet, "cod_conflict") {
            codes.extend(split_list(cell));
        }
    }
    for sheet in [sheets::THREATS_LIVELIHOODS, sheets::THREATS_SERVICES] {
        for cell in sheet_column(raw, sheet, "mapeo_conflicto") {
            codes.extend(split_codes(cell));
        }
    }
    codes.into_lookup("conflict", "conflicto_id", "cod_conflict", keys)
}
