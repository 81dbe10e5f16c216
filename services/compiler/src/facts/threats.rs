//! Threat observations (4.1) and threat impacts on livelihoods (4.2.1) and
//! ecosystem services (4.2.2).

use crate::dimensions::threat_identity;
use crate::lists::{split_codes, split_list};
use crate::registry::{sheets, tables};
use crate::table::{Cell, Record, Table};

use super::{numeric, FactInputs};

const THREAT_COLUMNS: &[&str] = &[
    "amenaza_obs_id",
    "context_id",
    "amenaza_id",
    "tipo_amenaza",
    "amenaza",
    "magnitud",
    "frequencia",
    "tendencia",
    "suma",
    "sitios_afect",
    "cod_mapa",
];
const THREAT_SCORES: &[&str] = &["magnitud", "frequencia", "tendencia", "suma"];

/// Numeric impact columns; the `_coment` columns stay text.
const IMPACT_SCORES: &[&str] = &[
    "i_economia",
    "i_alimentaria",
    "i_sanitaria",
    "i_ambiental",
    "i_personal",
    "i_comunitaria",
    "i_politica",
    "nr_familias",
];

/// What an impact row is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactTarget {
    /// `mdv` is a list; one row per livelihood.
    Livelihood,
    /// `cod_se` is a single service code.
    Service,
}

/// Shape of one threat-impact sheet and the three tables built from it.
#[derive(Debug)]
pub struct ImpactSpec {
    pub sheet: &'static str,
    pub table: &'static str,
    pub dif_table: &'static str,
    pub map_table: &'static str,
    pub tag: &'static str,
    pub target: ImpactTarget,
    pub columns: &'static [&'static str],
}

pub static LIVELIHOOD_IMPACTS: ImpactSpec = ImpactSpec {
    sheet: sheets::THREATS_LIVELIHOODS,
    table: tables::TIDY_4_2_1_AMENAZA_MDV,
    dif_table: tables::TIDY_4_2_1_DIFERENCIADO,
    map_table: tables::TIDY_4_2_1_MAPEO_CONFLICTO,
    tag: "am_mdv",
    target: ImpactTarget::Livelihood,
    columns: &[
        "amenaza_mdv_id",
        "context_id",
        "amenaza_id",
        "tipo_amenaza",
        "amenaza",
        "mdv_id",
        "mdv_name",
        "i_economia",
        "i_econ_coment",
        "i_alimentaria",
        "i_aliment_coment",
        "i_sanitaria",
        "i_sanit_coment",
        "i_ambiental",
        "i_amb_coment",
        "i_personal",
        "i_pers_coment",
        "i_comunitaria",
        "i_comun_coment",
        "i_politica",
        "i_polit_coment",
        "nr_familias",
        "tipo_conflicto",
        "nivel_conflicto",
        "mapeo_conflicto",
    ],
};

pub static SERVICE_IMPACTS: ImpactSpec = ImpactSpec {
    sheet: sheets::THREATS_SERVICES,
    table: tables::TIDY_4_2_2_AMENAZA_SE,
    dif_table: tables::TIDY_4_2_2_DIFERENCIADO,
    map_table: tables::TIDY_4_2_2_MAPEO_CONFLICTO,
    tag: "am_se",
    target: ImpactTarget::Service,
    columns: &[
        "amenaza_se_id",
        "context_id",
        "amenaza_id",
        "tipo_amenaza",
        "amenaza",
        "se_id",
        "cod_se",
        "i_economia",
        "i_econ_coment",
        "i_alimentaria",
        "i_aliment_coment",
        "i_sanitaria",
        "i_sanit_coment",
        "i_ambiental",
        "i_amb_coment",
        "i_personal",
        "i_pers_coment",
        "i_comunitaria",
        "i_comun_coment",
        "i_politica",
        "i_polit_coment",
        "nr_familias",
        "tipo_conflicto",
        "nivel_conflicto",
        "mapeo_conflicto",
    ],
};

impl ImpactSpec {
    pub fn id_column(&self) -> &'static str {
        self.columns[0]
    }

    /// (target key, target display) pairs a source row fans out into.
    fn targets(&self, inputs: &FactInputs<'_>, record: &Record<'_>) -> Vec<(Cell, Cell)> {
        let dims = inputs.dims;
        match self.target {
            ImpactTarget::Livelihood => split_list(record.get("mdv"))
                .into_iter()
                .map(|name| (dims.mdv_ids.cell(&name), Cell::from(name)))
                .collect(),
            ImpactTarget::Service => {
                let cod_se = record.get("cod_se");
                vec![(dims.se_ids.cell(cod_se), cod_se.clone())]
            }
        }
    }

    fn target_columns(&self) -> (&'static str, &'static str) {
        match self.target {
            ImpactTarget::Livelihood => ("mdv_id", "mdv_name"),
            ImpactTarget::Service => ("se_id", "cod_se"),
        }
    }
}

/// `amenaza_id` for a row carrying `tipo_amenaza` and `amenaza`.
fn resolve_threat(inputs: &FactInputs<'_>, record: &Record<'_>) -> Cell {
    let identity = threat_identity(record.get("tipo_amenaza"), record.get("amenaza"));
    inputs
        .dims
        .amenaza_ids
        .get_identity(&identity)
        .map(Cell::from)
        .unwrap_or(Cell::Empty)
}

/// TIDY_4_1_AMENAZAS.
pub fn threats(inputs: &FactInputs<'_>) -> (&'static str, Table) {
    let mut table = Table::new(THREAT_COLUMNS);
    let Some(source) = inputs.raw.get(sheets::THREATS) else {
        return (tables::TIDY_4_1_AMENAZAS, table);
    };

    for record in source.records() {
        let context_id = inputs.dims.contexts.cell(&record);
        let amenaza_id = resolve_threat(inputs, &record);
        let id = inputs.keys.key(
            "amen_obs",
            &[
                &context_id,
                &amenaza_id,
                record.get("cod_mapa"),
                record.get("sitios_afect"),
            ],
        );
        table.push_with(|col| match col {
            "amenaza_obs_id" => Cell::from(&id),
            "context_id" => context_id.clone(),
            "amenaza_id" => amenaza_id.clone(),
            score if THREAT_SCORES.contains(&score) => numeric(record.get(score)),
            other => record.get(other).clone(),
        });
    }
    (tables::TIDY_4_1_AMENAZAS, table)
}

/// The impact table described by `spec` plus its differentiated-group and
/// conflict-map bridges.
pub fn threat_impacts(inputs: &FactInputs<'_>, spec: &ImpactSpec) -> [(&'static str, Table); 3] {
    let parent = spec.id_column();
    let mut main = Table::new(spec.columns);
    let mut dif = Table::new(&["dif_id", parent, "group_label"]);
    let mut map = Table::new(&["map_id", parent, "cod_conflict", "conflicto_id"]);

    if let Some(source) = inputs.raw.get(spec.sheet) {
        let dims = inputs.dims;
        let keys = inputs.keys;
        let (target_id_col, target_name_col) = spec.target_columns();

        for record in source.records() {
            let context_id = dims.contexts.cell(&record);
            let amenaza_id = resolve_threat(inputs, &record);
            let groups = split_list(record.get("i_diferenciado"));
            let codes = split_codes(record.get("mapeo_conflicto"));

            for (target_id, target_name) in spec.targets(inputs, &record) {
                let id = keys.key(
                    spec.tag,
                    &[
                        &context_id,
                        &amenaza_id,
                        &target_id,
                        record.get("tipo_conflicto"),
                        record.get("nivel_conflicto"),
                    ],
                );

                main.push_with(|col| match col {
                    "context_id" => context_id.clone(),
                    "amenaza_id" => amenaza_id.clone(),
                    c if c == parent => Cell::from(&id),
                    c if c == target_id_col => target_id.clone(),
                    c if c == target_name_col => target_name.clone(),
                    c if IMPACT_SCORES.contains(&c) => numeric(record.get(c)),
                    other => record.get(other).clone(),
                });

                for group in &groups {
                    let dif_id = keys.key("dif", &[&id, group]);
                    dif.push(vec![Cell::from(dif_id), Cell::from(&id), Cell::from(group)]);
                }
                for code in &codes {
                    let map_id = keys.key("map", &[&id, code]);
                    map.push(vec![
                        Cell::from(map_id),
                        Cell::from(&id),
                        Cell::from(code),
                        dims.conflicto_ids.cell(code),
                    ]);
                }
            }
        }
    }

    [(spec.table, main), (spec.dif_table, dif), (spec.map_table, map)]
}
