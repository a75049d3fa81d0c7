//! Database query functions (Data Access Objects).
//!
//! This module centralizes all direct database operations. Every function
//! takes a borrowed connection and is meant to run inside [`super::Database::run`].
//! User input only ever reaches SQL as bound parameters.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::models::{
    split_features, Chair, ChairRecord, Estate, EstateRecord, CHAIR_COLUMNS, ESTATE_COLUMNS,
};
use crate::errors::AppResult;
use crate::services::geometry::BoundingBox;

/// Page size of the low-priced and recommendation listings.
pub const LIMIT: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChairFilter {
    pub price_range_id: Option<i64>,
    pub height_range_id: Option<i64>,
    pub width_range_id: Option<i64>,
    pub depth_range_id: Option<i64>,
    pub kind: Option<String>,
    pub color: Option<String>,
    /// A chair must carry every listed feature.
    pub features: Vec<String>,
}

impl ChairFilter {
    pub fn is_empty(&self) -> bool {
        self.price_range_id.is_none()
            && self.height_range_id.is_none()
            && self.width_range_id.is_none()
            && self.depth_range_id.is_none()
            && self.kind.is_none()
            && self.color.is_none()
            && self.features.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EstateFilter {
    pub door_height_range_id: Option<i64>,
    pub door_width_range_id: Option<i64>,
    pub rent_range_id: Option<i64>,
    pub features: Vec<String>,
}

impl EstateFilter {
    pub fn is_empty(&self) -> bool {
        self.door_height_range_id.is_none()
            && self.door_width_range_id.is_none()
            && self.rent_range_id.is_none()
            && self.features.is_empty()
    }
}

/// Range columns derived from a chair row at import time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChairRanges {
    pub price: i64,
    pub height: i64,
    pub width: i64,
    pub depth: i64,
}

/// Range columns derived from an estate row at import time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstateRanges {
    pub rent: i64,
    pub door_height: i64,
    pub door_width: i64,
}

#[derive(Debug, Default)]
struct WhereClause {
    parts: Vec<String>,
    params: Vec<Value>,
}

impl WhereClause {
    fn eq(&mut self, column: &str, value: Value) {
        self.parts.push(format!("{column} = ?"));
        self.params.push(value);
    }

    fn eq_opt_int(&mut self, column: &str, value: Option<i64>) {
        if let Some(v) = value {
            self.eq(column, Value::Integer(v));
        }
    }

    fn eq_opt_text(&mut self, column: &str, value: Option<&String>) {
        if let Some(v) = value {
            self.eq(column, Value::Text(v.clone()));
        }
    }

    /// `id` must appear in `table` once for every feature name.
    fn has_all_features(&mut self, table: &str, owner_column: &str, features: &[String]) {
        if features.is_empty() {
            return;
        }
        let placeholders = vec!["?"; features.len()].join(", ");
        self.parts.push(format!(
            "id IN (SELECT {owner_column} FROM {table} WHERE name IN ({placeholders}) GROUP BY {owner_column} HAVING COUNT(DISTINCT name) = ?)"
        ));
        self.params
            .extend(features.iter().map(|f| Value::Text(f.clone())));
        self.params.push(Value::Integer(features.len() as i64));
    }

    fn raw(&mut self, part: &str) {
        self.parts.push(part.to_string());
    }

    fn sql(&self) -> String {
        if self.parts.is_empty() {
            "1 = 1".to_string()
        } else {
            self.parts.join(" AND ")
        }
    }
}

fn chair_where(filter: &ChairFilter) -> WhereClause {
    let mut clause = WhereClause::default();
    clause.eq_opt_int("price_t", filter.price_range_id);
    clause.eq_opt_int("height_t", filter.height_range_id);
    clause.eq_opt_int("width_t", filter.width_range_id);
    clause.eq_opt_int("depth_t", filter.depth_range_id);
    clause.eq_opt_text("kind", filter.kind.as_ref());
    clause.eq_opt_text("color", filter.color.as_ref());
    clause.has_all_features("chair_features", "chair_id", &filter.features);
    clause.raw("stock > 0");
    clause
}

fn estate_where(filter: &EstateFilter) -> WhereClause {
    let mut clause = WhereClause::default();
    clause.eq_opt_int("door_height_t", filter.door_height_range_id);
    clause.eq_opt_int("door_width_t", filter.door_width_range_id);
    clause.eq_opt_int("rent_t", filter.rent_range_id);
    clause.has_all_features("estate_features", "estate_id", &filter.features);
    clause
}

/// Count and fetch one page of matches from `table`.
fn paged_search<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    clause: WhereClause,
    page: Page,
    map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> AppResult<(i64, Vec<T>)> {
    let condition = clause.sql();

    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE {condition}"),
        params_from_iter(clause.params.iter()),
        |row| row.get(0),
    )?;

    let mut params = clause.params;
    params.push(Value::Integer(page.per_page));
    params.push(Value::Integer(page.offset()));
    let mut stmt = conn.prepare(&format!(
        "SELECT {columns} FROM {table} WHERE {condition} ORDER BY popularity DESC, id ASC LIMIT ? OFFSET ?"
    ))?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), map)?
        .collect::<rusqlite::Result<Vec<T>>>()?;

    Ok((count, rows))
}

pub fn low_priced_chairs(conn: &Connection) -> AppResult<Vec<Chair>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {CHAIR_COLUMNS} FROM chair WHERE stock > 0 ORDER BY price ASC, id ASC LIMIT ?1"
    ))?;
    let chairs = stmt
        .query_map(params![LIMIT], Chair::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(chairs)
}

/// Total number of in-stock matches plus the requested page.
pub fn search_chairs(
    conn: &Connection,
    filter: &ChairFilter,
    page: Page,
) -> AppResult<(i64, Vec<Chair>)> {
    paged_search(
        conn,
        "chair",
        CHAIR_COLUMNS,
        chair_where(filter),
        page,
        Chair::from_row,
    )
}

pub fn find_chair(conn: &Connection, id: i64) -> AppResult<Option<Chair>> {
    let chair = conn
        .prepare_cached(&format!("SELECT {CHAIR_COLUMNS} FROM chair WHERE id = ?1"))?
        .query_row(params![id], Chair::from_row)
        .optional()?;
    Ok(chair)
}

/// Take one unit of stock. Returns false when the chair is missing or sold out.
pub fn buy_chair(conn: &Connection, id: i64) -> AppResult<bool> {
    let updated = conn.execute(
        "UPDATE chair SET stock = stock - 1 WHERE id = ?1 AND stock > 0",
        params![id],
    )?;
    Ok(updated > 0)
}

/// Insert chairs and their feature rows atomically.
pub fn insert_chairs(conn: &mut Connection, rows: &[(ChairRecord, ChairRanges)]) -> AppResult<usize> {
    let tx = conn.transaction()?;
    {
        let mut chair_stmt = tx.prepare(
            "INSERT INTO chair (id, name, description, thumbnail, price, height, width, depth, color, features, kind, popularity, stock, price_t, height_t, width_t, depth_t)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        )?;
        let mut feature_stmt =
            tx.prepare("INSERT INTO chair_features (name, chair_id) VALUES (?1, ?2)")?;

        for (c, r) in rows {
            chair_stmt.execute(params![
                c.id,
                c.name,
                c.description,
                c.thumbnail,
                c.price,
                c.height,
                c.width,
                c.depth,
                c.color,
                c.features,
                c.kind,
                c.popularity,
                c.stock,
                r.price,
                r.height,
                r.width,
                r.depth,
            ])?;
            for feature in split_features(&c.features) {
                feature_stmt.execute(params![feature, c.id])?;
            }
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

pub fn low_priced_estates(conn: &Connection) -> AppResult<Vec<Estate>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ESTATE_COLUMNS} FROM estate ORDER BY rent ASC, id ASC LIMIT ?1"
    ))?;
    let estates = stmt
        .query_map(params![LIMIT], Estate::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(estates)
}

pub fn search_estates(
    conn: &Connection,
    filter: &EstateFilter,
    page: Page,
) -> AppResult<(i64, Vec<Estate>)> {
    paged_search(
        conn,
        "estate",
        ESTATE_COLUMNS,
        estate_where(filter),
        page,
        Estate::from_row,
    )
}

pub fn find_estate(conn: &Connection, id: i64) -> AppResult<Option<Estate>> {
    let estate = conn
        .prepare_cached(&format!("SELECT {ESTATE_COLUMNS} FROM estate WHERE id = ?1"))?
        .query_row(params![id], Estate::from_row)
        .optional()?;
    Ok(estate)
}

/// Every estate inside `bbox` (edges included), most popular first.
pub fn estates_in_bounding_box(conn: &Connection, bbox: &BoundingBox) -> AppResult<Vec<Estate>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ESTATE_COLUMNS} FROM estate
         WHERE latitude <= ?1 AND latitude >= ?2 AND longitude <= ?3 AND longitude >= ?4
         ORDER BY popularity DESC, id ASC"
    ))?;
    let estates = stmt
        .query_map(
            params![
                bbox.max_latitude,
                bbox.min_latitude,
                bbox.max_longitude,
                bbox.min_longitude
            ],
            Estate::from_row,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(estates)
}

/// Estates whose door admits a chair whose two smallest dimensions are
/// `short` and `long`, in either orientation.
pub fn estates_fitting(conn: &Connection, short: i64, long: i64) -> AppResult<Vec<Estate>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ESTATE_COLUMNS} FROM estate
         WHERE (door_width >= ?1 AND door_height >= ?2) OR (door_width >= ?2 AND door_height >= ?1)
         ORDER BY popularity DESC, id ASC LIMIT ?3"
    ))?;
    let estates = stmt
        .query_map(params![short, long, LIMIT], Estate::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(estates)
}

/// Insert estates and their feature rows atomically.
pub fn insert_estates(
    conn: &mut Connection,
    rows: &[(EstateRecord, EstateRanges)],
) -> AppResult<usize> {
    let tx = conn.transaction()?;
    {
        let mut estate_stmt = tx.prepare(
            "INSERT INTO estate (id, name, description, thumbnail, address, latitude, longitude, rent, door_height, door_width, features, popularity, rent_t, door_height_t, door_width_t)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )?;
        let mut feature_stmt =
            tx.prepare("INSERT INTO estate_features (name, estate_id) VALUES (?1, ?2)")?;

        for (e, r) in rows {
            estate_stmt.execute(params![
                e.id,
                e.name,
                e.description,
                e.thumbnail,
                e.address,
                e.latitude,
                e.longitude,
                e.rent,
                e.door_height,
                e.door_width,
                e.features,
                e.popularity,
                r.rent,
                r.door_height,
                r.door_width,
            ])?;
            for feature in split_features(&e.features) {
                feature_stmt.execute(params![feature, e.id])?;
            }
        }
    }
    tx.commit()?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::database::reset_schema(&conn).unwrap();
        conn
    }

    fn chair(id: i64, price: i64, popularity: i64, stock: i64, features: &str) -> ChairRecord {
        ChairRecord {
            id,
            name: format!("chair-{id}"),
            description: String::new(),
            thumbnail: String::new(),
            price,
            height: 100,
            width: 60,
            depth: 70,
            color: "黒".into(),
            features: features.into(),
            kind: "座椅子".into(),
            popularity,
            stock,
        }
    }

    fn ranges() -> ChairRanges {
        ChairRanges {
            price: 0,
            height: 1,
            width: 0,
            depth: 0,
        }
    }

    fn estate(id: i64, lat: f64, lon: f64, popularity: i64, door: (i64, i64)) -> EstateRecord {
        EstateRecord {
            id,
            name: format!("estate-{id}"),
            description: String::new(),
            thumbnail: String::new(),
            address: String::new(),
            latitude: lat,
            longitude: lon,
            rent: 10_000 * id,
            door_width: door.0,
            door_height: door.1,
            features: String::new(),
            popularity,
        }
    }

    fn estate_ranges() -> EstateRanges {
        EstateRanges {
            rent: 0,
            door_height: 1,
            door_width: 1,
        }
    }

    #[test]
    fn low_priced_chairs_skip_sold_out() {
        let mut conn = conn();
        insert_chairs(
            &mut conn,
            &[
                (chair(1, 500, 0, 0, ""), ranges()),
                (chair(2, 900, 0, 3, ""), ranges()),
                (chair(3, 700, 0, 1, ""), ranges()),
            ],
        )
        .unwrap();
        let ids: Vec<_> = low_priced_chairs(&conn).unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn feature_filter_requires_every_feature() {
        let mut conn = conn();
        insert_chairs(
            &mut conn,
            &[
                (chair(1, 500, 5, 1, "肘掛け,キャスター"), ranges()),
                (chair(2, 500, 9, 1, "肘掛け"), ranges()),
                (chair(3, 500, 1, 1, "キャスター,肘掛け,フットレスト"), ranges()),
            ],
        )
        .unwrap();

        let filter = ChairFilter {
            features: vec!["肘掛け".into(), "キャスター".into()],
            ..ChairFilter::default()
        };
        let (count, chairs) = search_chairs(
            &conn,
            &filter,
            Page {
                page: 0,
                per_page: 10,
            },
        )
        .unwrap();
        assert_eq!(count, 2);
        let ids: Vec<_> = chairs.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn search_paginates_but_counts_everything() {
        let mut conn = conn();
        let rows: Vec<_> = (1..=5).map(|id| (chair(id, 500, id, 1, ""), ranges())).collect();
        insert_chairs(&mut conn, &rows).unwrap();

        let filter = ChairFilter {
            price_range_id: Some(0),
            ..ChairFilter::default()
        };
        let (count, chairs) = search_chairs(
            &conn,
            &filter,
            Page {
                page: 1,
                per_page: 2,
            },
        )
        .unwrap();
        assert_eq!(count, 5);
        let ids: Vec<_> = chairs.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn buy_chair_stops_at_zero_stock() {
        let mut conn = conn();
        insert_chairs(&mut conn, &[(chair(1, 500, 0, 1, ""), ranges())]).unwrap();
        assert!(buy_chair(&conn, 1).unwrap());
        assert!(!buy_chair(&conn, 1).unwrap());
        assert!(!buy_chair(&conn, 42).unwrap());
        assert_eq!(find_chair(&conn, 1).unwrap().unwrap().stock, 0);
    }

    #[test]
    fn failed_import_rolls_back() {
        let mut conn = conn();
        insert_chairs(&mut conn, &[(chair(1, 500, 0, 1, "肘掛け"), ranges())]).unwrap();
        // id 1 collides on the primary key after id 2 was written
        let result = insert_chairs(
            &mut conn,
            &[
                (chair(2, 500, 0, 1, "キャスター"), ranges()),
                (chair(1, 500, 0, 1, ""), ranges()),
            ],
        );
        assert!(result.is_err());
        assert!(find_chair(&conn, 2).unwrap().is_none());
        let features: i64 = conn
            .query_row("SELECT COUNT(*) FROM chair_features", [], |r| r.get(0))
            .unwrap();
        assert_eq!(features, 1);
    }

    #[test]
    fn bounding_box_is_inclusive_and_sorted() {
        let mut conn = conn();
        insert_estates(
            &mut conn,
            &[
                (estate(1, 35.0, 139.0, 1, (100, 100)), estate_ranges()),
                (estate(2, 35.5, 139.5, 9, (100, 100)), estate_ranges()),
                (estate(3, 36.5, 139.5, 50, (100, 100)), estate_ranges()),
            ],
        )
        .unwrap();
        let bbox = BoundingBox {
            min_latitude: 35.0,
            max_latitude: 36.0,
            min_longitude: 139.0,
            max_longitude: 140.0,
        };
        let ids: Vec<_> = estates_in_bounding_box(&conn, &bbox)
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn fitting_estates_accept_either_orientation() {
        let mut conn = conn();
        insert_estates(
            &mut conn,
            &[
                // width x height
                (estate(1, 35.0, 139.0, 1, (60, 90)), estate_ranges()),
                (estate(2, 35.0, 139.0, 2, (90, 60)), estate_ranges()),
                (estate(3, 35.0, 139.0, 3, (59, 200)), estate_ranges()),
            ],
        )
        .unwrap();
        let ids: Vec<_> = estates_fitting(&conn, 60, 90)
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn estate_search_without_filters_matches_all() {
        let mut conn = conn();
        insert_estates(
            &mut conn,
            &[(estate(1, 35.0, 139.0, 1, (60, 90)), estate_ranges())],
        )
        .unwrap();
        let (count, _) = search_estates(
            &conn,
            &EstateFilter::default(),
            Page {
                page: 0,
                per_page: 10,
            },
        )
        .unwrap();
        assert_eq!(count, 1);
    }
}
