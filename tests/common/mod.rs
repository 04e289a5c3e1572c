#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

/// One sheet cell as written by the helpers below.
#[derive(Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

pub const HEADERS: [&str; 7] = [
    "Farmer ID",
    "Name of the  Farmer",
    "Mobile No",
    "Village",
    "Total Area Holding (Ha)",
    "Production area for crop",
    "Gender M/F",
];

/// Write `headers` and `rows` into the first sheet of a new workbook at `path`.
pub fn write_workbook(path: &Path, headers: &[&str], rows: &[Vec<Cell>]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Farmers").unwrap();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(r, col as u16, *s).unwrap();
                }
                Cell::Number(n) => {
                    sheet.write_number(r, col as u16, *n).unwrap();
                }
                Cell::Blank => {}
            }
        }
    }
    workbook.save(path).unwrap();
}

fn farmer<'a>(
    id: f64,
    name: &'a str,
    village: &'a str,
    area: Cell<'a>,
    crop: &'a str,
    gender: &'a str,
) -> Vec<Cell<'a>> {
    vec![
        Cell::Number(id),
        Cell::Text(name),
        Cell::Number(9_000_000_000.0 + id),
        Cell::Text(village),
        area,
        Cell::Text(crop),
        Cell::Text(gender),
    ]
}

/// (Rice, M, A), (Rice, F, A), (Wheat, M, B)
pub fn three_farmers(dir: &Path) -> PathBuf {
    let path = dir.join("three.xlsx");
    write_workbook(
        &path,
        &HEADERS,
        &[
            farmer(1.0, "Ravi", "A", Cell::Number(1.0), "Rice", "M"),
            farmer(2.0, "Lakshmi", "A", Cell::Number(2.0), "Rice", "F"),
            farmer(3.0, "Suresh", "B", Cell::Number(3.0), "Wheat", "M"),
        ],
    );
    path
}

/// Kadapa-style sheet with several villages and crops. One area cell is unreadable and
/// one is blank.
pub fn kadapa_farmers(dir: &Path) -> PathBuf {
    let path = dir.join("kadapa.xlsx");
    write_workbook(
        &path,
        &HEADERS,
        &[
            farmer(101.0, "Ravi", "Pulivendula", Cell::Number(1.5), "Groundnut", "M"),
            farmer(102.0, "Lakshmi", "Pulivendula", Cell::Number(2.25), "Groundnut", "F"),
            farmer(103.0, "Suresh", "Rayachoti", Cell::Number(3.0), "Paddy", "M"),
            farmer(104.0, "Anitha", "Pulivendula", Cell::Text("n/a"), "Cotton", "F"),
            farmer(105.0, "Venkat", "Rayachoti", Cell::Number(0.75), "Groundnut", "M"),
            farmer(106.0, "Padma", "Badvel", Cell::Blank, "Paddy", "F"),
            farmer(107.0, "Mahesh", "Pulivendula", Cell::Number(4.0), "Groundnut", "M"),
        ],
    );
    path
}

/// Same shape as [`three_farmers`] without the `Mobile No` column.
pub fn missing_mobile(dir: &Path) -> PathBuf {
    let path = dir.join("no_mobile.xlsx");
    let headers: Vec<&str> = HEADERS.iter().copied().filter(|h| *h != "Mobile No").collect();
    let rows = vec![
        vec![
            Cell::Number(1.0),
            Cell::Text("Ravi"),
            Cell::Text("A"),
            Cell::Number(1.0),
            Cell::Text("Rice"),
            Cell::Text("M"),
        ],
        vec![
            Cell::Number(2.0),
            Cell::Text("Lakshmi"),
            Cell::Text("B"),
            Cell::Number(2.0),
            Cell::Text("Wheat"),
            Cell::Text("F"),
        ],
    ];
    write_workbook(&path, &headers, &rows);
    path
}

/// (Rice, A), (blank crop, A), (Wheat, blank village)
pub fn blank_cells(dir: &Path) -> PathBuf {
    let path = dir.join("blanks.xlsx");
    write_workbook(
        &path,
        &HEADERS,
        &[
            farmer(1.0, "Ravi", "A", Cell::Number(1.0), "Rice", "M"),
            vec![
                Cell::Number(2.0),
                Cell::Text("Lakshmi"),
                Cell::Number(9_000_000_002.0),
                Cell::Text("A"),
                Cell::Number(2.0),
                Cell::Blank,
                Cell::Text("F"),
            ],
            vec![
                Cell::Number(3.0),
                Cell::Text("Suresh"),
                Cell::Number(9_000_000_003.0),
                Cell::Blank,
                Cell::Number(3.0),
                Cell::Text("Wheat"),
                Cell::Text("M"),
            ],
        ],
    );
    path
}
