//! Rust structs that represent database table mappings.
//!
//! `Chair` and `Estate` are what the API returns; `ChairRecord` and
//! `EstateRecord` are the positional CSV rows accepted by the bulk import,
//! before the derived range columns are attached.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Column list matching [`Chair::from_row`].
pub const CHAIR_COLUMNS: &str =
    "id, name, description, thumbnail, price, height, width, depth, color, features, kind, popularity, stock";

/// Column list matching [`Estate::from_row`].
pub const ESTATE_COLUMNS: &str =
    "id, name, description, thumbnail, address, latitude, longitude, rent, door_height, door_width, features, popularity";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chair {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
    pub price: i64,
    pub height: i64,
    pub width: i64,
    pub depth: i64,
    pub color: String,
    pub features: String,
    pub kind: String,
    pub popularity: i64,
    pub stock: i64,
}

impl Chair {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            thumbnail: row.get(3)?,
            price: row.get(4)?,
            height: row.get(5)?,
            width: row.get(6)?,
            depth: row.get(7)?,
            color: row.get(8)?,
            features: row.get(9)?,
            kind: row.get(10)?,
            popularity: row.get(11)?,
            stock: row.get(12)?,
        })
    }

    /// Width, height and depth in ascending order.
    pub fn sorted_dimensions(&self) -> [i64; 3] {
        let mut dims = [self.width, self.height, self.depth];
        dims.sort_unstable();
        dims
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estate {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rent: i64,
    pub door_height: i64,
    pub door_width: i64,
    pub features: String,
    pub popularity: i64,
}

impl Estate {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            thumbnail: row.get(3)?,
            address: row.get(4)?,
            latitude: row.get(5)?,
            longitude: row.get(6)?,
            rent: row.get(7)?,
            door_height: row.get(8)?,
            door_width: row.get(9)?,
            features: row.get(10)?,
            popularity: row.get(11)?,
        })
    }
}

/// One chair CSV row:
/// `id,name,description,thumbnail,price,height,width,depth,color,features,kind,popularity,stock`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChairRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
    pub price: i64,
    pub height: i64,
    pub width: i64,
    pub depth: i64,
    pub color: String,
    pub features: String,
    pub kind: String,
    pub popularity: i64,
    pub stock: i64,
}

/// One estate CSV row:
/// `id,name,description,thumbnail,address,latitude,longitude,rent,door_height,door_width,features,popularity`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EstateRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub thumbnail: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rent: i64,
    pub door_height: i64,
    pub door_width: i64,
    pub features: String,
    pub popularity: i64,
}

/// Split a comma-separated feature column, dropping empty items.
pub fn split_features(features: &str) -> impl Iterator<Item = &str> {
    features.split(',').filter(|f| !f.is_empty())
}

#[derive(Debug, Serialize)]
pub struct ChairList {
    pub chairs: Vec<Chair>,
}

#[derive(Debug, Serialize)]
pub struct ChairSearchResult {
    pub count: i64,
    pub chairs: Vec<Chair>,
}

#[derive(Debug, Serialize)]
pub struct EstateList {
    pub estates: Vec<Estate>,
}

#[derive(Debug, Serialize)]
pub struct EstateSearchResult {
    pub count: i64,
    pub estates: Vec<Estate>,
}
