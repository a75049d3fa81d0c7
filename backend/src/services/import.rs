//! Bulk CSV import for chairs and estates.
//!
//! Uploads are headerless CSV with one record per line. Parsing and range
//! derivation happen before the database is touched, so a malformed file never
//! leaves partial rows behind; the insert itself is a single transaction.

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;

use super::conditions::{RangeCondition, SearchConditions};
use crate::database::models::{ChairRecord, EstateRecord};
use crate::database::queries::{ChairRanges, EstateRanges};
use crate::errors::{AppError, AppResult};

/// Decode every non-blank line of `data` into `T`, by position.
pub fn parse_records<T: DeserializeOwned>(data: &[u8]) -> AppResult<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_reader(data);

    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<T>().enumerate() {
        let record = result.map_err(|source| AppError::Csv {
            line: source
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 1),
            source,
        })?;
        records.push(record);
    }
    if records.is_empty() {
        return Err(AppError::bad_request("upload contains no records"));
    }
    Ok(records)
}

fn bucket(condition: &RangeCondition, field: &str, id: i64, value: i64) -> AppResult<i64> {
    condition.range_id(value).ok_or_else(|| {
        AppError::bad_request(format!("record {id}: {field} {value} matches no range"))
    })
}

pub fn chair_ranges(conditions: &SearchConditions, chair: &ChairRecord) -> AppResult<ChairRanges> {
    let c = &conditions.chair;
    Ok(ChairRanges {
        price: bucket(&c.price, "price", chair.id, chair.price)?,
        height: bucket(&c.height, "height", chair.id, chair.height)?,
        width: bucket(&c.width, "width", chair.id, chair.width)?,
        depth: bucket(&c.depth, "depth", chair.id, chair.depth)?,
    })
}

pub fn estate_ranges(
    conditions: &SearchConditions,
    estate: &EstateRecord,
) -> AppResult<EstateRanges> {
    let e = &conditions.estate;
    Ok(EstateRanges {
        rent: bucket(&e.rent, "rent", estate.id, estate.rent)?,
        door_height: bucket(&e.door_height, "door_height", estate.id, estate.door_height)?,
        door_width: bucket(&e.door_width, "door_width", estate.id, estate.door_width)?,
    })
}

/// Parse a chair upload and attach the derived range ids.
pub fn prepare_chairs(
    conditions: &SearchConditions,
    data: &[u8],
) -> AppResult<Vec<(ChairRecord, ChairRanges)>> {
    parse_records::<ChairRecord>(data)?
        .into_iter()
        .map(|chair| {
            let ranges = chair_ranges(conditions, &chair)?;
            Ok((chair, ranges))
        })
        .collect()
}

/// Parse an estate upload and attach the derived range ids.
pub fn prepare_estates(
    conditions: &SearchConditions,
    data: &[u8],
) -> AppResult<Vec<(EstateRecord, EstateRanges)>> {
    parse_records::<EstateRecord>(data)?
        .into_iter()
        .map(|estate| {
            let ranges = estate_ranges(conditions, &estate)?;
            Ok((estate, ranges))
        })
        .collect()
}
