//! Builds source workbooks on disk for end-to-end tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};

use compiler::registry::{required_columns, sheets};

pub const QUESTION_COLUMNS: &[&str] = &["1) Edad", "2. Ingreso"];

/// One sheet to write: name, header and string rows. `"@date"` writes a
/// real spreadsheet date (2023-07-01); numeric-looking text is written as a
/// number.
pub struct SheetSpec {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetSpec {
    pub fn new(name: &str, columns: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }
}

pub fn write_sheets(path: &Path, specs: &[SheetSpec]) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let date = NaiveDate::from_ymd_opt(2023, 7, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    for spec in specs {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&spec.name).unwrap();
        for (c, name) in spec.columns.iter().enumerate() {
            sheet.write_string(0, c as u16, name).unwrap();
        }
        for (r, row) in spec.rows.iter().enumerate() {
            let r = (r + 1) as u32;
            for (c, value) in row.iter().enumerate() {
                let c = c as u16;
                if value.is_empty() {
                    continue;
                }
                if value == "@date" {
                    sheet
                        .write_datetime_with_format(r, c, &date, &date_format)
                        .unwrap();
                } else if let Ok(n) = value.parse::<f64>() {
                    sheet.write_number(r, c, n).unwrap();
                } else {
                    sheet.write_string(r, c, value).unwrap();
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

/// Cell value for `column` in data row `row` of the full template.
fn template_value(column: &str, row: usize) -> String {
    let v = match column {
        "fecha" => "@date",
        // Differs only by case and whitespace between rows.
        "admin0" => {
            if row == 0 {
                "Panama "
            } else {
                "panama"
            }
        }
        "paisaje" => "Darién",
        "grupo" | "Grupo" => "G1",
        "País" => "Panamá",
        "elemento_SES" => "Medio de vida",
        "nombre" | "mdv" | "mdv " | "mdv_relacionado" | "Medio de vida" => "Pesca",
        "cod_es" => "E1",
        "ecosistema" => "Manglar",
        "servicio_ecosistemico" | "cod_se" => "P1",
        "cod_es_se" => "E1_P1",
        "elemento_se" => "Agua",
        "mes_contrib" => "Ene, Feb",
        "mes_falta" => "Mar",
        "inclusion" | "i_diferenciado" => "Mujeres; Jóvenes",
        "tipo_amenaza" => "Climática",
        "amenaza" => "Sequía",
        "mapeo_conflicto" => "C1_C2",
        "cod_conflict" => "C1",
        "nombre_actor" | "actor" | "actores_invol" => "Alcaldía",
        "conflicto_con" => "Minera",
        "colabor_con" => "ONG Verde, Alcaldía",
        "nombre_espacio" => "Mesa del Agua",
        "Tamaño de propiedad" => "5 ha",
        "1) Edad" => "45",
        "2. Ingreso" => "bajo",
        c if c.starts_with("i_")
            && !c.ends_with("coment")
            && c != "i_en_actor"
            && c != "i_en_conflicto" =>
        {
            return (row + 2).to_string();
        }
        "cv_importancia" | "cv_producto" | "cv_mercado" | "porcentaje" | "nr_usuarios"
        | "nr_familias" | "magnitud" | "frequencia" | "tendencia" | "suma" | "diferencias"
        | "cooperacion" => return (row + 1).to_string(),
        "ano_evento" => return (2019 + row).to_string(),
        other => return format!("{} {}", other.trim(), row + 1),
    };
    v.to_string()
}

/// Every configured sheet with all required columns and two data rows.
pub fn template_sheets() -> Vec<SheetSpec> {
    required_columns()
        .into_iter()
        .map(|(sheet, mut columns)| {
            if sheet == sheets::SURVEY {
                columns.extend_from_slice(QUESTION_COLUMNS);
            }
            let rows = (0..2)
                .map(|row| columns.iter().map(|c| template_value(c, row)).collect())
                .collect();
            SheetSpec {
                name: sheet.to_string(),
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            }
        })
        .collect()
}

pub fn write_template(dir: &Path) -> PathBuf {
    let path = dir.join("template.xlsx");
    write_sheets(&path, &template_sheets());
    path
}
