use crate::inventory::Vehicle;
use crate::inventory::photos::canonicalize_photos;
use crate::sheets::RawRow;
use std::collections::HashSet;

/// Normalize a full ingestion pass. Ids are unique within one snapshot: a
/// repeated source id (or two rows synthesizing the same year-make-model)
/// gets a positional suffix instead of dropping the row. The suffix itself
/// can collide with an id the source already uses, so suffixes are appended
/// until insertion succeeds; the id grows each round, so this terminates.
pub fn normalize_rows(rows: &[RawRow]) -> Vec<Vehicle> {
    let mut seen = HashSet::new();
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let mut vehicle = normalize_row(row, index);
            while !seen.insert(vehicle.id.clone()) {
                vehicle.id = format!("{}-{index}", vehicle.id);
            }
            vehicle
        })
        .collect()
}

/// One shared, pure `RawRow -> Vehicle` pass; every field has a defined
/// fallback and nothing here can fail a row or the batch.
pub fn normalize_row(row: &RawRow, index: usize) -> Vehicle {
    let year = row.number("year").map(|value| value as i32);
    let mileage = row.number("mileage").map(|value| value as i64);
    let price = row.number("price");

    let make = row.text("make");
    let model = row.text("model");

    // The id fallback composes from already-normalized fields, so it is
    // derived after them.
    let id = non_empty(row.text("id"))
        .or_else(|| non_empty(compose("-", year, &make, &model)))
        .unwrap_or_else(|| format!("vehicle-{index}"));

    let title = non_empty(row.text("title"))
        .or_else(|| non_empty(compose(" ", year, &make, &model)))
        .unwrap_or_else(|| id.clone());

    let photos = canonicalize_photos(&collect_photo_cells(row));

    Vehicle {
        id,
        title,
        year,
        make,
        model,
        trim: row.text("trim"),
        mileage,
        price,
        transmission: row.text("transmission"),
        fuel: row.text("fuel"),
        exterior: row.text("exterior"),
        interior: row.text("interior"),
        vin: row.text("vin"),
        status: row.text("status"),
        description: row.text("description"),
        photos,
    }
}

/// Photo URLs may be spread over any number of `photo*` columns (`photo1`,
/// `photo2`, ...). Headers are already lowercased; pair order keeps the
/// source column order, so the joined string keeps the photos ordered.
fn collect_photo_cells(row: &RawRow) -> String {
    row.entries()
        .filter(|(name, _)| name.starts_with("photo"))
        .map(|(_, cell)| cell.as_text())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn compose(separator: &str, year: Option<i32>, make: &str, model: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(year) = year {
        parts.push(year.to_string());
    }
    if !make.is_empty() {
        parts.push(make.to_string());
    }
    if !model.is_empty() {
        parts.push(model.to_string());
    }
    parts.join(separator)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::Cell;

    fn text(value: &str) -> Cell {
        Cell::Text(value.to_string())
    }

    #[test]
    fn prius_scenario_end_to_end() {
        let row = RawRow::from_pairs([
            ("id", text("")),
            ("year", text("2013")),
            ("make", text("Toyota")),
            ("model", text("Prius C")),
            ("photo1", text("https://drive.google.com/file/d/XYZ/view")),
        ]);
        let vehicle = normalize_row(&row, 0);
        assert_eq!(vehicle.id, "2013-Toyota-Prius C");
        assert_eq!(vehicle.title, "2013 Toyota Prius C");
        assert_eq!(vehicle.year, Some(2013));
        assert_eq!(
            vehicle.photos,
            vec!["https://lh3.googleusercontent.com/d/XYZ=w1600".to_string()]
        );
    }

    #[test]
    fn missing_numeric_cells_are_null_not_nan() {
        let row = RawRow::from_pairs([
            ("make", text("Honda")),
            ("mileage", text("unknown")),
            ("price", text("")),
        ]);
        let vehicle = normalize_row(&row, 3);
        assert_eq!(vehicle.year, None);
        assert_eq!(vehicle.mileage, None);
        assert_eq!(vehicle.price, None);
    }

    #[test]
    fn positional_id_when_nothing_composes() {
        let vehicle = normalize_row(&RawRow::default(), 7);
        assert_eq!(vehicle.id, "vehicle-7");
        // title falls back to the id when year/make/model are all empty
        assert_eq!(vehicle.title, "vehicle-7");
    }

    #[test]
    fn explicit_id_and_title_win() {
        let row = RawRow::from_pairs([
            ("id", text("lot-42")),
            ("title", text("Clean 2019 Corolla")),
            ("year", text("2019")),
            ("make", text("Toyota")),
            ("model", text("Corolla")),
        ]);
        let vehicle = normalize_row(&row, 0);
        assert_eq!(vehicle.id, "lot-42");
        assert_eq!(vehicle.title, "Clean 2019 Corolla");
    }

    #[test]
    fn string_fields_default_to_empty() {
        let vehicle = normalize_row(&RawRow::default(), 0);
        assert_eq!(vehicle.make, "");
        assert_eq!(vehicle.vin, "");
        assert_eq!(vehicle.description, "");
        assert!(vehicle.photos.is_empty());
    }

    #[test]
    fn photo_columns_collect_in_header_order() {
        let row = RawRow::from_pairs([
            ("photo1", text("https://example.com/front.jpg")),
            ("make", text("Ford")),
            ("photo2", text("https://example.com/rear.jpg n/a")),
            ("photo3", text("")),
        ]);
        let vehicle = normalize_row(&row, 0);
        assert_eq!(
            vehicle.photos,
            vec![
                "https://example.com/front.jpg".to_string(),
                "https://example.com/rear.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn duplicate_ids_get_positional_suffixes() {
        let rows = vec![
            RawRow::from_pairs([("id", text("lot-1"))]),
            RawRow::from_pairs([("id", text("lot-1"))]),
            RawRow::from_pairs([("id", text("lot-1"))]),
        ];
        let vehicles = normalize_rows(&rows);
        let ids: Vec<&str> = vehicles.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["lot-1", "lot-1-1", "lot-1-2"]);
        let unique: HashSet<&&str> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn suffixed_ids_cannot_collide_with_existing_ones() {
        // "a" repeats at index 2; the first suffix candidate "a-2" is
        // already taken by row 0, so disambiguation must keep going.
        let rows = vec![
            RawRow::from_pairs([("id", text("a-2"))]),
            RawRow::from_pairs([("id", text("a"))]),
            RawRow::from_pairs([("id", text("a"))]),
        ];
        let vehicles = normalize_rows(&rows);
        let ids: Vec<&str> = vehicles.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["a-2", "a", "a-2-2"]);
        let unique: HashSet<&&str> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn normalization_is_idempotent_over_identical_input() {
        let rows = vec![
            RawRow::from_pairs([
                ("year", text("2016")),
                ("make", text("Mazda")),
                ("model", text("3")),
                ("price", text("10500")),
            ]),
            RawRow::from_pairs([("id", text("lot-9"))]),
        ];
        assert_eq!(normalize_rows(&rows), normalize_rows(&rows));
    }
}
