//! Static source/target schema registry.
//!
//! Known sheet names, their required columns, historical column aliases and
//! the key specifications the QA stage checks. This is fixed configuration,
//! not something inferred from the input; it is handed explicitly to the
//! reader, the validator and the QA checks through [`Registry`].

/// Exact worksheet names of the source template.
pub mod sheets {
    pub const VARIABLES: &str = "variables";
    pub const BRAINSTORM: &str = "3.1. Lluvia MdV&SE";
    pub const PRIORITIZATION: &str = "3.2. Priorización";
    pub const CAR_A: &str = "3.3. Car_A";
    pub const CAR_B: &str = "3.3. Car_B";
    pub const CAR_C: &str = "3.3. Car_C";
    pub const CAR_D: &str = "3.3. Car_D";
    pub const ECOSYSTEMS: &str = "3.4. Ecosistemas";
    pub const SERVICES_LIVELIHOODS: &str = "3.5. SE y MdV";
    pub const THREATS: &str = "4.1. Amenazas";
    pub const THREATS_LIVELIHOODS: &str = "4.2.1. Amenazas_MdV";
    pub const THREATS_SERVICES: &str = "4.2.2. Amenazas_SE";
    pub const ACTORS: &str = "5.1. Actores";
    pub const DIALOGUE: &str = "5.2. Diálogo";
    pub const CONFLICT_EVOLUTION: &str = "6.1. Evolución_conflict";
    pub const CONFLICT_ACTORS: &str = "6.2. Actores_conflict";
    pub const SURVEY: &str = "7.1. Encuesta CA";
}

/// Names of every compiled table.
pub mod tables {
    pub const LOOKUP_GEO: &str = "LOOKUP_GEO";
    pub const LOOKUP_CONTEXT: &str = "LOOKUP_CONTEXT";
    pub const LOOKUP_SURVEY_CONTEXT: &str = "LOOKUP_SURVEY_CONTEXT";
    pub const LOOKUP_MDV: &str = "LOOKUP_MDV";
    pub const LOOKUP_ECOSISTEMA: &str = "LOOKUP_ECOSISTEMA";
    pub const LOOKUP_SE: &str = "LOOKUP_SE";
    pub const LOOKUP_ELEMENTO_SE: &str = "LOOKUP_ELEMENTO_SE";
    pub const LOOKUP_AMENAZA: &str = "LOOKUP_AMENAZA";
    pub const LOOKUP_ACTOR: &str = "LOOKUP_ACTOR";
    pub const LOOKUP_ESPACIO: &str = "LOOKUP_ESPACIO";
    pub const LOOKUP_CONFLICTO: &str = "LOOKUP_CONFLICTO";
    pub const LOOKUP_CA_QUESTIONS: &str = "LOOKUP_CA_QUESTIONS";

    pub const TIDY_3_1_BRAINSTORM: &str = "TIDY_3_1_BRAINSTORM";
    pub const TIDY_3_2_PRIORIZACION: &str = "TIDY_3_2_PRIORIZACION";
    pub const TIDY_3_3_CAR_A: &str = "TIDY_3_3_CAR_A";
    pub const TIDY_3_3_CAR_B: &str = "TIDY_3_3_CAR_B";
    pub const TIDY_3_3_CAR_C: &str = "TIDY_3_3_CAR_C";
    pub const TIDY_3_3_CAR_D: &str = "TIDY_3_3_CAR_D";
    pub const TIDY_3_3_CAR_LONG: &str = "TIDY_3_3_CAR_LONG";
    pub const TIDY_3_4_ECOSISTEMAS: &str = "TIDY_3_4_ECOSISTEMAS";
    pub const TIDY_3_4_ECO_SE: &str = "TIDY_3_4_ECO_SE";
    pub const TIDY_3_4_ECO_MDV: &str = "TIDY_3_4_ECO_MDV";
    pub const TIDY_3_5_SE_MDV: &str = "TIDY_3_5_SE_MDV";
    pub const TIDY_3_5_SE_MONTHS: &str = "TIDY_3_5_SE_MONTHS";
    pub const TIDY_3_5_SE_INCLUSION: &str = "TIDY_3_5_SE_INCLUSION";
    pub const TIDY_4_1_AMENAZAS: &str = "TIDY_4_1_AMENAZAS";
    pub const TIDY_4_2_1_AMENAZA_MDV: &str = "TIDY_4_2_1_AMENAZA_MDV";
    pub const TIDY_4_2_1_DIFERENCIADO: &str = "TIDY_4_2_1_DIFERENCIADO";
    pub const TIDY_4_2_1_MAPEO_CONFLICTO: &str = "TIDY_4_2_1_MAPEO_CONFLICTO";
    pub const TIDY_4_2_2_AMENAZA_SE: &str = "TIDY_4_2_2_AMENAZA_SE";
    pub const TIDY_4_2_2_DIFERENCIADO: &str = "TIDY_4_2_2_DIFERENCIADO";
    pub const TIDY_4_2_2_MAPEO_CONFLICTO: &str = "TIDY_4_2_2_MAPEO_CONFLICTO";
    pub const TIDY_5_1_ACTORES: &str = "TIDY_5_1_ACTORES";
    pub const TIDY_5_1_RELACIONES: &str = "TIDY_5_1_RELACIONES";
    pub const TIDY_5_2_DIALOGO: &str = "TIDY_5_2_DIALOGO";
    pub const TIDY_5_2_DIALOGO_ACTOR: &str = "TIDY_5_2_DIALOGO_ACTOR";
    pub const TIDY_6_1_CONFLICT_EVENTS: &str = "TIDY_6_1_CONFLICT_EVENTS";
    pub const TIDY_6_2_CONFLICTO_ACTOR: &str = "TIDY_6_2_CONFLICTO_ACTOR";
    pub const TIDY_7_1_RESPONDENTS: &str = "TIDY_7_1_RESPONDENTS";
    pub const TIDY_7_1_RESPONSES: &str = "TIDY_7_1_RESPONSES";

    pub const QA_INPUT_SCHEMA: &str = "QA_INPUT_SCHEMA";
    pub const QA_TABLE_SUMMARY: &str = "QA_TABLE_SUMMARY";
    pub const QA_PK_DUPLICATES: &str = "QA_PK_DUPLICATES";
    pub const QA_MISSING_IDS: &str = "QA_MISSING_IDS";
    pub const QA_FOREIGN_KEYS: &str = "QA_FOREIGN_KEYS";
}

use tables::*;

/// Context columns shared by every dated observation sheet.
pub const CONTEXT_COLUMNS: &[&str] = &["fecha", "admin0", "paisaje", "grupo"];

/// Columns of the survey sheet that describe the respondent rather than a
/// question.
pub const SURVEY_FIXED_COLUMNS: &[&str] = &["País", "Grupo", "Medio de vida", "Tamaño de propiedad"];

/// Livelihood column of 3.2, preferred first. Older templates drop the
/// trailing space.
pub const PRIORITIZATION_MDV_COLUMNS: &[&str] = &["mdv ", "mdv"];

const IMPACT_COLUMNS: &[&str] = &[
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
    "i_diferenciado",
    "tipo_conflicto",
    "nivel_conflicto",
    "mapeo_conflicto",
];

/// Required columns per sheet, in template order. Names are exact and
/// case-sensitive, including the trailing space of `"mdv "` in 3.2.
pub fn required_columns() -> Vec<(&'static str, Vec<&'static str>)> {
    let ctx = |rest: &[&'static str]| -> Vec<&'static str> {
        CONTEXT_COLUMNS.iter().chain(rest.iter()).copied().collect()
    };
    let threat_impacts = |target: &'static str| -> Vec<&'static str> {
        let mut cols = ctx(&["tipo_amenaza", "amenaza", target]);
        cols.extend_from_slice(IMPACT_COLUMNS);
        cols
    };
    vec![
        (sheets::VARIABLES, vec!["Herramienta/variable"]),
        (
            sheets::BRAINSTORM,
            ctx(&["elemento_SES", "nombre", "uso_fin_mdv"]),
        ),
        (
            sheets::PRIORITIZATION,
            ctx(&[
                "mdv ",
                "producto_principal",
                "i_seg_alim",
                "i_area",
                "i_des_loc",
                "i_ambiente",
                "i_inclusion",
                "i_total",
            ]),
        ),
        (
            sheets::CAR_A,
            ctx(&[
                "mdv",
                "codigo_mdv",
                "codigo_mapa",
                "sistema",
                "uso_final",
                "cv_importancia",
                "cv_producto",
                "cv_mercado",
            ]),
        ),
        (
            sheets::CAR_B,
            ctx(&["mdv", "codigo_mapa", "tenencia", "tenencia_descripcion"]),
        ),
        (
            sheets::CAR_C,
            ctx(&[
                "mdv",
                "codigo_mdv",
                "codigo_mapa",
                "tamano",
                "unidad",
                "rango",
                "porcentaje",
            ]),
        ),
        (
            sheets::CAR_D,
            ctx(&[
                "mdv",
                "codigo_mdv",
                "codigo_mapa",
                "tenencia",
                "tamano",
                "porcentaje",
            ]),
        ),
        (
            sheets::ECOSYSTEMS,
            ctx(&[
                "ecosistema",
                "tipo",
                "mdv_relacionado",
                "es_salud",
                "servicio_ecosistemico",
                "causas_deg",
                "cod_es",
            ]),
        ),
        (
            sheets::SERVICES_LIVELIHOODS,
            ctx(&[
                "cod_es_se",
                "mdv_relacionado",
                "elemento_se",
                "accesso",
                "barreras",
                "nr_usuarios",
                "mes_contrib",
                "mes_falta",
                "inclusion",
                "incl_descripcion",
            ]),
        ),
        (
            sheets::THREATS,
            ctx(&[
                "tipo_amenaza",
                "amenaza",
                "magnitud",
                "frequencia",
                "tendencia",
                "suma",
                "sitios_afect",
                "cod_mapa",
            ]),
        ),
        (sheets::THREATS_LIVELIHOODS, threat_impacts("mdv")),
        (sheets::THREATS_SERVICES, threat_impacts("cod_se")),
        (
            sheets::ACTORS,
            ctx(&[
                "nombre_actor",
                "tipo_actor",
                "rol_paisaje",
                "conflicto_con",
                "colabor_con",
                "poder",
                "interes",
            ]),
        ),
        (
            sheets::DIALOGUE,
            ctx(&[
                "nombre_espacio",
                "tipo",
                "alcance",
                "actores_invol",
                "funcion",
                "incidencia",
                "fortalezas",
                "debilidades",
            ]),
        ),
        (
            sheets::CONFLICT_EVOLUTION,
            ctx(&[
                "cod_conflict",
                "evento",
                "ano_evento",
                "diferencias",
                "dif_factor",
                "cooperacion",
                "coop_factor",
                "suma",
            ]),
        ),
        (
            sheets::CONFLICT_ACTORS,
            ctx(&[
                "cod_conflict",
                "actor",
                "i_en_actor",
                "iea_factor",
                "i_en_conflicto",
                "iec_factor",
            ]),
        ),
        (sheets::SURVEY, SURVEY_FIXED_COLUMNS.to_vec()),
    ]
}

/// Historical / misspelled column names mapped to their canonical name.
pub const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("uso_fin_medio_de_vida", "uso_fin_mdv"),
    ("indice_seguridad_alimentaria", "i_seg_alim"),
    ("imdice_area", "i_area"),
    ("indice_area", "i_area"),
    ("indice_desarrollo_local", "i_des_loc"),
    ("indice_ambiente", "i_ambiente"),
    ("indice_inlcusion", "i_inclusion"),
    ("indice_inclusion", "i_inclusion"),
    ("indice_total", "i_total"),
    ("codigo_medio_de_vida", "codigo_mdv"),
    ("medio_de_vida_relacionado", "mdv_relacionado"),
];

/// Aliases that only apply to one sheet; these win over [`COLUMN_ALIASES`].
pub const SHEET_COLUMN_ALIASES: &[(&str, &str, &str)] = &[
    (sheets::PRIORITIZATION, "medio_de_vida", "mdv "),
    (sheets::CAR_A, "medio_de_vida", "mdv"),
    (sheets::CAR_B, "medio_de_vida", "mdv"),
    (sheets::CAR_C, "medio_de_vida", "mdv"),
    (sheets::CAR_D, "medio_de_vida", "mdv"),
    (sheets::THREATS_LIVELIHOODS, "medio_de_vida", "mdv"),
];

/// Primary key of every compiled dimension and fact table.
pub const PRIMARY_KEYS: &[(&str, &[&str])] = &[
    (LOOKUP_GEO, &["geo_id"]),
    (LOOKUP_CONTEXT, &["context_id"]),
    (LOOKUP_SURVEY_CONTEXT, &["survey_context_id"]),
    (LOOKUP_MDV, &["mdv_id"]),
    (LOOKUP_ECOSISTEMA, &["ecosistema_id"]),
    (LOOKUP_SE, &["se_id"]),
    (LOOKUP_ELEMENTO_SE, &["elemento_se_id"]),
    (LOOKUP_AMENAZA, &["amenaza_id"]),
    (LOOKUP_ACTOR, &["actor_id"]),
    (LOOKUP_ESPACIO, &["espacio_id"]),
    (LOOKUP_CONFLICTO, &["conflicto_id"]),
    (LOOKUP_CA_QUESTIONS, &["question_id"]),
    (TIDY_3_1_BRAINSTORM, &["brainstorm_id"]),
    (TIDY_3_2_PRIORIZACION, &["priorizacion_id"]),
    (TIDY_3_3_CAR_A, &["car_a_id"]),
    (TIDY_3_3_CAR_B, &["car_b_id"]),
    (TIDY_3_3_CAR_C, &["car_c_id"]),
    (TIDY_3_3_CAR_D, &["car_d_id"]),
    (TIDY_3_3_CAR_LONG, &["car_long_id"]),
    (TIDY_3_4_ECOSISTEMAS, &["ecosistema_obs_id"]),
    (TIDY_3_4_ECO_SE, &["eco_se_id"]),
    (TIDY_3_4_ECO_MDV, &["eco_mdv_id"]),
    (TIDY_3_5_SE_MDV, &["se_mdv_id"]),
    (TIDY_3_5_SE_MONTHS, &["se_month_id"]),
    (TIDY_3_5_SE_INCLUSION, &["se_inclusion_id"]),
    (TIDY_4_1_AMENAZAS, &["amenaza_obs_id"]),
    (TIDY_4_2_1_AMENAZA_MDV, &["amenaza_mdv_id"]),
    (TIDY_4_2_1_DIFERENCIADO, &["dif_id"]),
    (TIDY_4_2_1_MAPEO_CONFLICTO, &["map_id"]),
    (TIDY_4_2_2_AMENAZA_SE, &["amenaza_se_id"]),
    (TIDY_4_2_2_DIFERENCIADO, &["dif_id"]),
    (TIDY_4_2_2_MAPEO_CONFLICTO, &["map_id"]),
    (TIDY_5_1_ACTORES, &["actor_obs_id"]),
    (TIDY_5_1_RELACIONES, &["rel_id"]),
    (TIDY_5_2_DIALOGO, &["dialogo_id"]),
    (TIDY_5_2_DIALOGO_ACTOR, &["bridge_id"]),
    (TIDY_6_1_CONFLICT_EVENTS, &["event_id"]),
    (TIDY_6_2_CONFLICTO_ACTOR, &["conflict_actor_id"]),
    (TIDY_7_1_RESPONDENTS, &["respondent_id"]),
    (TIDY_7_1_RESPONSES, &["response_id"]),
];

/// Identifier columns that should always resolve.
pub const IDENTIFIER_COLUMNS: &[(&str, &[&str])] = &[
    (TIDY_3_1_BRAINSTORM, &["context_id"]),
    (TIDY_3_2_PRIORIZACION, &["context_id", "mdv_id"]),
    (TIDY_3_3_CAR_A, &["context_id", "mdv_id"]),
    (TIDY_3_3_CAR_B, &["context_id", "mdv_id"]),
    (TIDY_3_3_CAR_C, &["context_id", "mdv_id"]),
    (TIDY_3_3_CAR_D, &["context_id", "mdv_id"]),
    (TIDY_3_4_ECOSISTEMAS, &["context_id", "ecosistema_id"]),
    (TIDY_3_4_ECO_SE, &["ecosistema_obs_id", "se_id"]),
    (TIDY_3_4_ECO_MDV, &["ecosistema_obs_id", "mdv_id"]),
    (
        TIDY_3_5_SE_MDV,
        &["context_id", "ecosistema_id", "se_id", "elemento_se_id", "mdv_id"],
    ),
    (TIDY_4_1_AMENAZAS, &["context_id", "amenaza_id"]),
    (TIDY_4_2_1_AMENAZA_MDV, &["context_id", "amenaza_id", "mdv_id"]),
    (TIDY_4_2_2_AMENAZA_SE, &["context_id", "amenaza_id", "se_id"]),
    (TIDY_5_1_ACTORES, &["context_id", "actor_id"]),
    (TIDY_5_2_DIALOGO, &["context_id", "espacio_id"]),
    (TIDY_5_2_DIALOGO_ACTOR, &["dialogo_id", "actor_id"]),
    (TIDY_6_1_CONFLICT_EVENTS, &["context_id", "conflicto_id"]),
    (TIDY_6_2_CONFLICTO_ACTOR, &["context_id", "conflicto_id", "actor_id"]),
    (TIDY_7_1_RESPONDENTS, &["survey_context_id", "mdv_id"]),
    (TIDY_7_1_RESPONSES, &["respondent_id", "question_id"]),
];

/// A declared foreign key: `table.column` must exist in `target.target_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub target: &'static str,
    pub target_key: &'static str,
}

const fn fk(
    table: &'static str,
    column: &'static str,
    target: &'static str,
    target_key: &'static str,
) -> ForeignKey {
    ForeignKey {
        table,
        column,
        target,
        target_key,
    }
}

pub const FOREIGN_KEYS: &[ForeignKey] = &[
    fk(LOOKUP_CONTEXT, "geo_id", LOOKUP_GEO, "geo_id"),
    fk(TIDY_3_1_BRAINSTORM, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_3_1_BRAINSTORM, "mdv_id", LOOKUP_MDV, "mdv_id"),
    fk(TIDY_3_1_BRAINSTORM, "ecosistema_id", LOOKUP_ECOSISTEMA, "ecosistema_id"),
    fk(TIDY_3_2_PRIORIZACION, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_3_2_PRIORIZACION, "mdv_id", LOOKUP_MDV, "mdv_id"),
    fk(TIDY_3_3_CAR_A, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_3_3_CAR_A, "mdv_id", LOOKUP_MDV, "mdv_id"),
    fk(TIDY_3_3_CAR_B, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_3_3_CAR_B, "mdv_id", LOOKUP_MDV, "mdv_id"),
    fk(TIDY_3_3_CAR_C, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_3_3_CAR_C, "mdv_id", LOOKUP_MDV, "mdv_id"),
    fk(TIDY_3_3_CAR_D, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_3_3_CAR_D, "mdv_id", LOOKUP_MDV, "mdv_id"),
    fk(TIDY_3_4_ECOSISTEMAS, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_3_4_ECOSISTEMAS, "ecosistema_id", LOOKUP_ECOSISTEMA, "ecosistema_id"),
    fk(TIDY_3_4_ECO_SE, "se_id", LOOKUP_SE, "se_id"),
    fk(TIDY_3_4_ECO_MDV, "mdv_id", LOOKUP_MDV, "mdv_id"),
    fk(TIDY_3_5_SE_MDV, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_3_5_SE_MDV, "ecosistema_id", LOOKUP_ECOSISTEMA, "ecosistema_id"),
    fk(TIDY_3_5_SE_MDV, "se_id", LOOKUP_SE, "se_id"),
    fk(TIDY_3_5_SE_MDV, "elemento_se_id", LOOKUP_ELEMENTO_SE, "elemento_se_id"),
    fk(TIDY_3_5_SE_MDV, "mdv_id", LOOKUP_MDV, "mdv_id"),
    fk(TIDY_4_1_AMENAZAS, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_4_1_AMENAZAS, "amenaza_id", LOOKUP_AMENAZA, "amenaza_id"),
    fk(TIDY_4_2_1_AMENAZA_MDV, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_4_2_1_AMENAZA_MDV, "amenaza_id", LOOKUP_AMENAZA, "amenaza_id"),
    fk(TIDY_4_2_1_AMENAZA_MDV, "mdv_id", LOOKUP_MDV, "mdv_id"),
    fk(TIDY_4_2_1_MAPEO_CONFLICTO, "conflicto_id", LOOKUP_CONFLICTO, "conflicto_id"),
    fk(TIDY_4_2_2_AMENAZA_SE, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_4_2_2_AMENAZA_SE, "amenaza_id", LOOKUP_AMENAZA, "amenaza_id"),
    fk(TIDY_4_2_2_AMENAZA_SE, "se_id", LOOKUP_SE, "se_id"),
    fk(TIDY_4_2_2_MAPEO_CONFLICTO, "conflicto_id", LOOKUP_CONFLICTO, "conflicto_id"),
    fk(TIDY_5_1_ACTORES, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_5_1_ACTORES, "actor_id", LOOKUP_ACTOR, "actor_id"),
    fk(TIDY_5_1_RELACIONES, "actor_id", LOOKUP_ACTOR, "actor_id"),
    fk(TIDY_5_1_RELACIONES, "other_actor_id", LOOKUP_ACTOR, "actor_id"),
    fk(TIDY_5_2_DIALOGO, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_5_2_DIALOGO, "espacio_id", LOOKUP_ESPACIO, "espacio_id"),
    fk(TIDY_5_2_DIALOGO_ACTOR, "actor_id", LOOKUP_ACTOR, "actor_id"),
    fk(TIDY_6_1_CONFLICT_EVENTS, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_6_1_CONFLICT_EVENTS, "conflicto_id", LOOKUP_CONFLICTO, "conflicto_id"),
    fk(TIDY_6_2_CONFLICTO_ACTOR, "context_id", LOOKUP_CONTEXT, "context_id"),
    fk(TIDY_6_2_CONFLICTO_ACTOR, "conflicto_id", LOOKUP_CONFLICTO, "conflicto_id"),
    fk(TIDY_6_2_CONFLICTO_ACTOR, "actor_id", LOOKUP_ACTOR, "actor_id"),
    fk(TIDY_7_1_RESPONDENTS, "survey_context_id", LOOKUP_SURVEY_CONTEXT, "survey_context_id"),
    fk(TIDY_7_1_RESPONDENTS, "mdv_id", LOOKUP_MDV, "mdv_id"),
    fk(TIDY_7_1_RESPONSES, "respondent_id", TIDY_7_1_RESPONDENTS, "respondent_id"),
    fk(TIDY_7_1_RESPONSES, "question_id", LOOKUP_CA_QUESTIONS, "question_id"),
];

/// The full static configuration, passed explicitly into each stage.
#[derive(Debug, Clone)]
pub struct Registry {
    pub required_columns: Vec<(&'static str, Vec<&'static str>)>,
    pub column_aliases: &'static [(&'static str, &'static str)],
    pub sheet_column_aliases: &'static [(&'static str, &'static str, &'static str)],
    pub primary_keys: &'static [(&'static str, &'static [&'static str])],
    pub identifier_columns: &'static [(&'static str, &'static [&'static str])],
    pub foreign_keys: &'static [ForeignKey],
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            required_columns: required_columns(),
            column_aliases: COLUMN_ALIASES,
            sheet_column_aliases: SHEET_COLUMN_ALIASES,
            primary_keys: PRIMARY_KEYS,
            identifier_columns: IDENTIFIER_COLUMNS,
            foreign_keys: FOREIGN_KEYS,
        }
    }
}

impl Registry {
    /// Configured sheet names in template order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.required_columns.iter().map(|(sheet, _)| *sheet)
    }

    /// Alias target for `column` on `sheet`; sheet-specific aliases first.
    pub fn alias_for(&self, sheet: &str, column: &str) -> Option<&'static str> {
        let column = column.trim();
        self.sheet_column_aliases
            .iter()
            .find(|(s, from, _)| *s == sheet && *from == column)
            .map(|(_, _, to)| *to)
            .or_else(|| {
                self.column_aliases
                    .iter()
                    .find(|(from, _)| *from == column)
                    .map(|(_, to)| *to)
            })
    }
}

/// First candidate column present in `columns`, in candidate order.
pub fn first_existing_column<'a>(columns: &[String], candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .find(|candidate| columns.iter().any(|c| c == **candidate))
        .copied()
}
