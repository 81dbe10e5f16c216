//! Household survey (7.1): one respondent row per survey row and one
//! response row per answered question column.

use crate::dimensions::Question;
use crate::registry::{sheets, tables, SURVEY_FIXED_COLUMNS};
use crate::table::{Cell, Table};

use super::FactInputs;

const RESPONDENT_COLUMNS: &[&str] = &[
    "respondent_id",
    "survey_context_id",
    "admin0",
    "grupo",
    "paisaje_inferido",
    "mdv_id",
    "mdv_name",
    "tamano_propiedad",
];
const RESPONSE_COLUMNS: &[&str] = &[
    "response_id",
    "respondent_id",
    "question_id",
    "question_order",
    "response_raw",
    "response_numeric",
];

pub fn survey(inputs: &FactInputs<'_>) -> [(&'static str, Table); 2] {
    let mut respondents = Table::new(RESPONDENT_COLUMNS);
    let mut responses = Table::new(RESPONSE_COLUMNS);

    if let Some(source) = inputs.raw.get(sheets::SURVEY) {
        let dims = inputs.dims;
        let keys = inputs.keys;
        let questions: Vec<(&str, &Question)> = source
            .columns()
            .iter()
            .filter(|c| !SURVEY_FIXED_COLUMNS.contains(&c.as_str()))
            .filter_map(|c| dims.question_ids.get(c).map(|q| (c.as_str(), q)))
            .collect();

        for record in source.records() {
            let admin0 = record.text("País");
            let grupo = record.text("Grupo");
            let (survey_context_id, paisaje) = match dims.surveys.resolve(&admin0, &grupo) {
                Some((id, paisaje)) => (Cell::from(id), Cell::from(paisaje)),
                None => (Cell::Empty, Cell::Empty),
            };
            let mdv_name = record.text("Medio de vida");
            let mdv_id = dims.mdv_ids.cell(&mdv_name);
            let tamano = record.get("Tamaño de propiedad");
            let respondent_id = keys.key("resp", &[&survey_context_id, &mdv_id, &mdv_name, tamano]);

            respondents.push(vec![
                Cell::from(&respondent_id),
                survey_context_id,
                Cell::from(admin0),
                Cell::from(grupo),
                paisaje,
                mdv_id,
                Cell::from(mdv_name),
                tamano.clone(),
            ]);

            for (column, question) in &questions {
                let answer = record.get(column);
                let id = keys.key("respq", &[&respondent_id, &question.id]);
                responses.push(vec![
                    Cell::from(id),
                    Cell::from(&respondent_id),
                    Cell::from(&question.id),
                    Cell::from(question.order.map(f64::from)),
                    Cell::Text(answer.text()),
                    Cell::from(answer.to_number()),
                ]);
            }
        }
    }

    [
        (tables::TIDY_7_1_RESPONDENTS, respondents),
        (tables::TIDY_7_1_RESPONSES, responses),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::KeyGen;
    use crate::dimensions::Dimensions;
    use crate::facts::testing::{sheet, texts};
    use crate::table::TableMap;

    fn compile(raw: &TableMap) -> [(&'static str, Table); 2] {
        let dims = Dimensions::build(raw, KeyGen::default());
        survey(&FactInputs {
            raw,
            dims: &dims,
            keys: KeyGen::default(),
        })
    }

    fn survey_raw() -> TableMap {
        let mut raw = TableMap::new();
        raw.insert(
            sheets::PRIORITIZATION,
            sheet(
                &["fecha", "admin0", "paisaje", "grupo", "mdv "],
                &[&["2023-07-01", "Panamá", "Darién", "G1", "Pesca"]],
            ),
        );
        raw.insert(
            sheets::SURVEY,
            sheet(
                &["País", "Grupo", "Medio de vida", "Tamaño de propiedad", "1) Edad", "2. Ingreso", "Notas"],
                &[
                    &["panama", "g1", "Pesca", "5 ha", "45", " bajo ", ""],
                    &["Chile", "G9", "", "", "", "", "x"],
                ],
            ),
        );
        raw
    }

    #[test]
    fn test_respondents_carry_inferred_landscape() {
        let [(_, respondents), _] = compile(&survey_raw());
        assert_eq!(respondents.len(), 2);
        assert_eq!(texts(&respondents, "paisaje_inferido"), vec!["Darién", ""]);
        assert_eq!(texts(&respondents, "admin0"), vec!["panama", "Chile"]);
        let first = respondents.records().next().unwrap();
        assert!(!first.get("survey_context_id").is_blank());
        assert!(!first.get("mdv_id").is_blank());
    }

    #[test]
    fn test_responses_one_per_question_column() {
        let [(_, respondents), (_, responses)] = compile(&survey_raw());
        assert_eq!(responses.len(), 2 * 3);
        let first_respondent = respondents.rows()[0][0].clone();
        let answers: Vec<String> = responses
            .records()
            .filter(|r| *r.get("respondent_id") == first_respondent)
            .map(|r| r.text("response_raw"))
            .collect();
        assert_eq!(answers, vec!["45", "bajo", ""]);
        // A blank answer is empty text, not a missing cell.
        assert_eq!(responses.records().nth(2).unwrap().get("response_raw"), &Cell::from(""));
        let numbers: Vec<Cell> = responses.column("response_numeric").take(3).cloned().collect();
        assert_eq!(numbers, vec![Cell::Number(45.0), Cell::Empty, Cell::Empty]);
        let orders: Vec<Cell> = responses.column("question_order").take(3).cloned().collect();
        assert_eq!(orders, vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Empty]);
    }
}
