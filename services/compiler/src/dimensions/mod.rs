//! Dimension (lookup) tables and the key maps fact builders resolve against.
//!
//! Every builder scans a fixed set of (sheet, column) sources, deduplicates
//! by canonical text keeping the first-seen display form, and keys each row
//! with a content hash under its own tag. Missing sources produce an empty
//! table with the right columns.

mod context;
mod entities;
mod questions;

pub use context::{build_geo_context, build_survey_context, ContextResolver, SurveyResolver};
pub use entities::{
    build_actor, build_amenaza, build_conflicto, build_ecosistema, build_elemento_se,
    build_espacio, build_mdv, build_se, threat_identity,
};
pub(crate) use entities::split_service_code;
pub use questions::{build_questions, parse_question_header, Question, QuestionMap};

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::canonical::{canonical_str, Canonical, KeyGen};
use crate::registry::tables;
use crate::table::{Cell, Table, TableMap};

/// Ordered set of display values, deduplicated by canonical form.
#[derive(Debug, Clone, Default)]
pub struct Distinct {
    seen: HashSet<String>,
    values: Vec<String>,
}

impl Distinct {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the trimmed value unless it is blank or canonically present.
    pub fn push(&mut self, value: &str) {
        let value = value.trim();
        let key = canonical_str(value);
        if key.is_empty() || !self.seen.insert(key) {
            return;
        }
        self.values.push(value.to_string());
    }

    pub fn push_cell(&mut self, cell: &Cell) {
        if let Some(text) = cell.as_text() {
            self.push(&text);
        }
    }

    pub fn extend<S: AsRef<str>>(&mut self, values: impl IntoIterator<Item = S>) {
        for v in values {
            self.push(v.as_ref());
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Two-column lookup `(id_col, value_col)` keyed by `tag` + value.
    pub fn into_lookup(
        self,
        tag: &str,
        id_col: &str,
        value_col: &str,
        keys: KeyGen,
    ) -> (Table, KeyMap) {
        let mut table = Table::new(&[id_col, value_col]);
        let mut ids = KeyMap::default();
        for value in self.values {
            let id = keys.key(tag, &[&value]);
            ids.insert(&value, &id);
            table.push(vec![Cell::from(id), Cell::from(value)]);
        }
        (table, ids)
    }
}

/// Canonical value to surrogate key. The first entry for a canonical value
/// wins; later inserts for the same value are ignored.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    ids: HashMap<String, String>,
}

impl KeyMap {
    pub fn insert(&mut self, value: &(impl Canonical + ?Sized), id: &str) {
        let key = value.canonical();
        if key.is_empty() {
            return;
        }
        self.ids.entry(key).or_insert_with(|| id.to_string());
    }

    /// Inserts under an already-canonical composite identity.
    pub fn insert_identity(&mut self, identity: String, id: &str) {
        self.ids.entry(identity).or_insert_with(|| id.to_string());
    }

    pub fn get(&self, value: &(impl Canonical + ?Sized)) -> Option<&str> {
        let key = value.canonical();
        if key.is_empty() {
            return None;
        }
        self.ids.get(&key).map(String::as_str)
    }

    pub fn get_identity(&self, identity: &str) -> Option<&str> {
        self.ids.get(identity).map(String::as_str)
    }

    /// The key as a cell; unresolved values become [`Cell::Empty`].
    pub fn cell(&self, value: &(impl Canonical + ?Sized)) -> Cell {
        self.get(value).map(Cell::from).unwrap_or(Cell::Empty)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Cells of `column` in `sheet`; nothing when either is absent.
pub(crate) fn sheet_column<'a>(
    raw: &'a TableMap,
    sheet: &str,
    column: &str,
) -> impl Iterator<Item = &'a Cell> + 'a {
    let column = column.to_string();
    raw.get(sheet)
        .into_iter()
        .flat_map(move |table| table.column(&column))
}

/// All lookup tables plus the maps used to resolve references into them.
#[derive(Debug, Clone)]
pub struct Dimensions {
    pub geo: Table,
    pub context: Table,
    pub survey_context: Table,
    pub mdv: Table,
    pub ecosistema: Table,
    pub se: Table,
    pub elemento_se: Table,
    pub amenaza: Table,
    pub actor: Table,
    pub espacio: Table,
    pub conflicto: Table,
    pub questions: Table,

    pub contexts: ContextResolver,
    pub surveys: SurveyResolver,
    pub mdv_ids: KeyMap,
    pub ecosistema_ids: KeyMap,
    pub se_ids: KeyMap,
    pub elemento_se_ids: KeyMap,
    pub amenaza_ids: KeyMap,
    pub actor_ids: KeyMap,
    pub espacio_ids: KeyMap,
    pub conflicto_ids: KeyMap,
    pub question_ids: QuestionMap,
}

impl Dimensions {
    pub fn build(raw: &TableMap, keys: KeyGen) -> Self {
        let (geo, context) = build_geo_context(raw, keys);
        let contexts = ContextResolver::new(&geo, &context);
        let (survey_context, surveys) = build_survey_context(raw, keys);
        let (mdv, mdv_ids) = build_mdv(raw, keys);
        let (ecosistema, ecosistema_ids) = build_ecosistema(raw, keys);
        let (se, se_ids) = build_se(raw, keys);
        let (elemento_se, elemento_se_ids) = build_elemento_se(raw, keys);
        let (amenaza, amenaza_ids) = build_amenaza(raw, keys);
        let (actor, actor_ids) = build_actor(raw, keys);
        let (espacio, espacio_ids) = build_espacio(raw, keys);
        let (conflicto, conflicto_ids) = build_conflicto(raw, keys);
        let (questions, question_ids) = build_questions(raw, keys);

        let dims = Self {
            geo,
            context,
            survey_context,
            mdv,
            ecosistema,
            se,
            elemento_se,
            amenaza,
            actor,
            espacio,
            conflicto,
            questions,
            contexts,
            surveys,
            mdv_ids,
            ecosistema_ids,
            se_ids,
            elemento_se_ids,
            amenaza_ids,
            actor_ids,
            espacio_ids,
            conflicto_ids,
            question_ids,
        };
        for (name, table) in dims.tables() {
            debug!(table = name, rows = table.len(), "dimension built");
        }
        dims
    }

    /// Lookup tables in output order.
    pub fn tables(&self) -> [(&'static str, &Table); 12] {
        [
            (tables::LOOKUP_GEO, &self.geo),
            (tables::LOOKUP_CONTEXT, &self.context),
            (tables::LOOKUP_SURVEY_CONTEXT, &self.survey_context),
            (tables::LOOKUP_MDV, &self.mdv),
            (tables::LOOKUP_ECOSISTEMA, &self.ecosistema),
            (tables::LOOKUP_SE, &self.se),
            (tables::LOOKUP_ELEMENTO_SE, &self.elemento_se),
            (tables::LOOKUP_AMENAZA, &self.amenaza),
            (tables::LOOKUP_ACTOR, &self.actor),
            (tables::LOOKUP_ESPACIO, &self.espacio),
            (tables::LOOKUP_CONFLICTO, &self.conflicto),
            (tables::LOOKUP_CA_QUESTIONS, &self.questions),
        ]
    }
}
