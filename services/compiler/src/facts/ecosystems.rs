//! Ecosystem observations (3.4) and service/livelihood links (3.5).

use crate::dimensions::split_service_code;
use crate::lists::{parse_month_tokens, split_list};
use crate::registry::{sheets, tables};
use crate::table::{Cell, Table};

use super::{numeric, FactInputs};

const ECOSYSTEM_COLUMNS: &[&str] = &[
    "ecosistema_obs_id",
    "context_id",
    "ecosistema_id",
    "cod_es",
    "ecosistema",
    "tipo",
    "es_salud",
    "causas_deg",
];
const ECO_SE_COLUMNS: &[&str] = &["eco_se_id", "ecosistema_obs_id", "se_id", "cod_se"];
const ECO_MDV_COLUMNS: &[&str] = &["eco_mdv_id", "ecosistema_obs_id", "mdv_id", "mdv_name"];

const SE_MDV_COLUMNS: &[&str] = &[
    "se_mdv_id",
    "context_id",
    "ecosistema_id",
    "se_id",
    "cod_es_se",
    "cod_es",
    "cod_se",
    "elemento_se_id",
    "elemento_se",
    "mdv_id",
    "mdv_name",
    "accesso",
    "barreras",
    "nr_usuarios",
    "impactos_cruzados",
    "incl_descripcion",
];
const SE_MONTH_COLUMNS: &[&str] = &["se_month_id", "se_mdv_id", "month_label", "month_num", "month_type"];
const SE_INCLUSION_COLUMNS: &[&str] = &["se_inclusion_id", "se_mdv_id", "group_label"];

/// Month list columns and the `month_type` each one produces.
const MONTH_SOURCES: [(&str, &str); 2] = [("contrib", "mes_contrib"), ("falta", "mes_falta")];

/// TIDY_3_4_ECOSISTEMAS plus its service and livelihood bridges.
pub fn ecosystems(inputs: &FactInputs<'_>) -> [(&'static str, Table); 3] {
    let mut main = Table::new(ECOSYSTEM_COLUMNS);
    let mut services = Table::new(ECO_SE_COLUMNS);
    let mut livelihoods = Table::new(ECO_MDV_COLUMNS);

    if let Some(source) = inputs.raw.get(sheets::ECOSYSTEMS) {
        let dims = inputs.dims;
        let keys = inputs.keys;
        for record in source.records() {
            let context_id = dims.contexts.cell(&record);
            let cod_es = record.get("cod_es");
            let nombre = record.get("ecosistema");
            let ecosistema_id = dims
                .ecosistema_ids
                .get(cod_es)
                .or_else(|| dims.ecosistema_ids.get(nombre))
                .map(Cell::from)
                .unwrap_or(Cell::Empty);
            let obs_id = keys.key("eco_obs", &[&context_id, cod_es, nombre]);

            main.push_with(|col| match col {
                "ecosistema_obs_id" => Cell::from(&obs_id),
                "context_id" => context_id.clone(),
                "ecosistema_id" => ecosistema_id.clone(),
                other => record.get(other).clone(),
            });

            for cod_se in split_list(record.get("servicio_ecosistemico")) {
                let se_id = dims.se_ids.cell(&cod_se);
                let id = keys.key("eco_se", &[&obs_id, &se_id, &cod_se]);
                services.push(vec![
                    Cell::from(id),
                    Cell::from(&obs_id),
                    se_id,
                    Cell::from(cod_se),
                ]);
            }
            for mdv_name in split_list(record.get("mdv_relacionado")) {
                let mdv_id = dims.mdv_ids.cell(&mdv_name);
                let id = keys.key("eco_mdv", &[&obs_id, &mdv_id, &mdv_name]);
                livelihoods.push(vec![
                    Cell::from(id),
                    Cell::from(&obs_id),
                    mdv_id,
                    Cell::from(mdv_name),
                ]);
            }
        }
    }

    [
        (tables::TIDY_3_4_ECOSISTEMAS, main),
        (tables::TIDY_3_4_ECO_SE, services),
        (tables::TIDY_3_4_ECO_MDV, livelihoods),
    ]
}

/// TIDY_3_5_SE_MDV, one row per related livelihood, plus month and
/// inclusion bridges hanging off each of those rows.
pub fn services_livelihoods(inputs: &FactInputs<'_>) -> [(&'static str, Table); 3] {
    let mut main = Table::new(SE_MDV_COLUMNS);
    let mut months = Table::new(SE_MONTH_COLUMNS);
    let mut inclusion = Table::new(SE_INCLUSION_COLUMNS);

    if let Some(source) = inputs.raw.get(sheets::SERVICES_LIVELIHOODS) {
        let dims = inputs.dims;
        let keys = inputs.keys;
        for record in source.records() {
            let context_id = dims.contexts.cell(&record);
            let cod_es_se = record.get("cod_es_se");
            let (cod_es, cod_se) = cod_es_se
                .as_text()
                .map(|text| split_service_code(&text))
                .unwrap_or_default();
            let ecosistema_id = dims.ecosistema_ids.cell(&cod_es);
            let se_id = dims.se_ids.cell(&cod_se);
            let elemento_se = record.get("elemento_se");
            let elemento_se_id = dims.elemento_se_ids.cell(elemento_se);
            let month_tokens: Vec<(&str, Vec<(String, Option<u32>)>)> = MONTH_SOURCES
                .iter()
                .map(|(kind, column)| (*kind, parse_month_tokens(record.get(column))))
                .collect();
            let groups = split_list(record.get("inclusion"));

            for mdv_name in split_list(record.get("mdv_relacionado")) {
                let mdv_id = dims.mdv_ids.cell(&mdv_name);
                let se_mdv_id = keys.key("semdv", &[&context_id, cod_es_se, elemento_se, &mdv_id]);

                main.push_with(|col| match col {
                    "se_mdv_id" => Cell::from(&se_mdv_id),
                    "context_id" => context_id.clone(),
                    "ecosistema_id" => ecosistema_id.clone(),
                    "se_id" => se_id.clone(),
                    "cod_es" => Cell::from(&cod_es),
                    "cod_se" => Cell::from(&cod_se),
                    "elemento_se_id" => elemento_se_id.clone(),
                    "mdv_id" => mdv_id.clone(),
                    "mdv_name" => Cell::from(&mdv_name),
                    "nr_usuarios" => numeric(record.get("nr_usuarios")),
                    other => record.get(other).clone(),
                });

                for (kind, tokens) in &month_tokens {
                    for (label, num) in tokens {
                        let id = keys.key("se_month", &[&se_mdv_id, kind, label]);
                        months.push(vec![
                            Cell::from(id),
                            Cell::from(&se_mdv_id),
                            Cell::from(label),
                            Cell::from(num.map(f64::from)),
                            Cell::from(*kind),
                        ]);
                    }
                }
                for group in &groups {
                    let id = keys.key("se_incl", &[&se_mdv_id, group]);
                    inclusion.push(vec![Cell::from(id), Cell::from(&se_mdv_id), Cell::from(group)]);
                }
            }
        }
    }

    [
        (tables::TIDY_3_5_SE_MDV, main),
        (tables::TIDY_3_5_SE_MONTHS, months),
        (tables::TIDY_3_5_SE_INCLUSION, inclusion),
    ]
}
