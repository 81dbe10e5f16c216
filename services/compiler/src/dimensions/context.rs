use std::collections::{BTreeMap, HashMap, HashSet};

use crate::canonical::{canonical_str, canonical_text, coerce_date_iso, KeyGen};
use crate::registry::{sheets, CONTEXT_COLUMNS};
use crate::table::{Cell, Record, Table, TableMap};

const GEO_COLUMNS: &[&str] = &["geo_id", "admin0", "paisaje", "grupo"];
const CONTEXT_TABLE_COLUMNS: &[&str] = &["context_id", "geo_id", "fecha_iso"];
const SURVEY_CONTEXT_COLUMNS: &[&str] = &["survey_context_id", "admin0", "grupo", "paisaje_inferido"];

/// LOOKUP_GEO and LOOKUP_CONTEXT from every sheet carrying the four context
/// columns, in sheet order.
pub fn build_geo_context(raw: &TableMap, keys: KeyGen) -> (Table, Table) {
    let mut geo = Table::new(GEO_COLUMNS);
    let mut context = Table::new(CONTEXT_TABLE_COLUMNS);
    let mut geo_ids: HashMap<(String, String, String), String> = HashMap::new();
    let mut seen_contexts: HashSet<(String, String)> = HashSet::new();

    for (_, table) in raw.iter() {
        if !table.has_columns(CONTEXT_COLUMNS) {
            continue;
        }
        for record in table.records() {
            let admin0 = record.text("admin0");
            let paisaje = record.text("paisaje");
            let grupo = record.text("grupo");
            let fecha_iso = coerce_date_iso(record.get("fecha"));

            let identity = (
                canonical_str(&admin0),
                canonical_str(&paisaje),
                canonical_str(&grupo),
            );
            let geo_id = match geo_ids.get(&identity) {
                Some(id) => id.clone(),
                None => {
                    let id = keys.key("geo", &[&admin0, &paisaje, &grupo]);
                    geo.push(vec![
                        Cell::from(&id),
                        Cell::from(admin0),
                        Cell::from(paisaje),
                        Cell::from(grupo),
                    ]);
                    geo_ids.insert(identity, id.clone());
                    id
                }
            };

            if seen_contexts.insert((geo_id.clone(), fecha_iso.clone())) {
                let context_id = keys.key("ctx", &[&geo_id, &fecha_iso]);
                context.push(vec![
                    Cell::from(context_id),
                    Cell::from(geo_id),
                    Cell::from(fecha_iso),
                ]);
            }
        }
    }
    (geo, context)
}

type ContextIdentity = (String, String, String, String);

/// Resolves (admin0, paisaje, grupo, fecha) on a source row to its
/// `context_id`, comparing canonical text.
#[derive(Debug, Clone, Default)]
pub struct ContextResolver {
    ids: HashMap<ContextIdentity, String>,
}

impl ContextResolver {
    /// Joins LOOKUP_CONTEXT with LOOKUP_GEO once.
    pub fn new(geo: &Table, context: &Table) -> Self {
        let places: HashMap<String, (String, String, String)> = geo
            .records()
            .map(|r| {
                (
                    r.text("geo_id"),
                    (
                        canonical_text(r.get("admin0")),
                        canonical_text(r.get("paisaje")),
                        canonical_text(r.get("grupo")),
                    ),
                )
            })
            .collect();

        let mut ids = HashMap::new();
        for r in context.records() {
            let Some((admin0, paisaje, grupo)) = places.get(&r.text("geo_id")) else {
                continue;
            };
            let identity = (
                admin0.clone(),
                paisaje.clone(),
                grupo.clone(),
                r.text("fecha_iso"),
            );
            ids.entry(identity).or_insert_with(|| r.text("context_id"));
        }
        Self { ids }
    }

    pub fn resolve(&self, record: &Record<'_>) -> Option<&str> {
        let identity = (
            canonical_text(record.get("admin0")),
            canonical_text(record.get("paisaje")),
            canonical_text(record.get("grupo")),
            coerce_date_iso(record.get("fecha")),
        );
        self.ids.get(&identity).map(String::as_str)
    }

    /// `context_id` as a cell, [`Cell::Empty`] when unresolvable.
    pub fn cell(&self, record: &Record<'_>) -> Cell {
        self.resolve(record).map(Cell::from).unwrap_or(Cell::Empty)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Survey (admin0, grupo) to its `survey_context_id` and inferred landscape.
#[derive(Debug, Clone, Default)]
pub struct SurveyResolver {
    ids: HashMap<(String, String), (String, String)>,
}

impl SurveyResolver {
    pub fn resolve(&self, admin0: &str, grupo: &str) -> Option<(&str, &str)> {
        self.ids
            .get(&(canonical_str(admin0), canonical_str(grupo)))
            .map(|(id, paisaje)| (id.as_str(), paisaje.as_str()))
    }
}

/// Most frequent non-empty `paisaje` per canonical (admin0, grupo), over every
/// sheet with those three columns. Ties go to the smallest landscape text.
fn infer_landscapes(raw: &TableMap) -> HashMap<(String, String), String> {
    let mut counts: HashMap<(String, String), BTreeMap<String, usize>> = HashMap::new();
    for (_, table) in raw.iter() {
        if !table.has_columns(&["admin0", "grupo", "paisaje"]) {
            continue;
        }
        for record in table.records() {
            let admin0 = canonical_text(record.get("admin0"));
            if admin0.is_empty() {
                continue;
            }
            let paisaje = record.text("paisaje");
            if paisaje.is_empty() {
                continue;
            }
            let grupo = canonical_text(record.get("grupo"));
            *counts
                .entry((admin0, grupo))
                .or_default()
                .entry(paisaje)
                .or_default() += 1;
        }
    }

    counts
        .into_iter()
        .filter_map(|(pair, landscapes)| {
            let best = landscapes.values().copied().max()?;
            landscapes
                .into_iter()
                .find(|(_, n)| *n == best)
                .map(|(paisaje, _)| (pair, paisaje))
        })
        .collect()
}

/// LOOKUP_SURVEY_CONTEXT from the survey sheet's País/Grupo pairs.
pub fn build_survey_context(raw: &TableMap, keys: KeyGen) -> (Table, SurveyResolver) {
    let mut table = Table::new(SURVEY_CONTEXT_COLUMNS);
    let mut resolver = SurveyResolver::default();
    let Some(survey) = raw.get(sheets::SURVEY) else {
        return (table, resolver);
    };

    let landscapes = infer_landscapes(raw);
    for record in survey.records() {
        let admin0 = record.text("País");
        let grupo = record.text("Grupo");
        let pair = (canonical_str(&admin0), canonical_str(&grupo));
        if resolver.ids.contains_key(&pair) {
            continue;
        }
        let paisaje = landscapes.get(&pair).cloned().unwrap_or_default();
        let id = keys.key("survey", &[&admin0, &grupo, &paisaje]);
        table.push(vec![
            Cell::from(&id),
            Cell::from(admin0),
            Cell::from(grupo),
            Cell::from(&paisaje),
        ]);
        resolver.ids.insert(pair, (id, paisaje));
    }
    (table, resolver)
}
