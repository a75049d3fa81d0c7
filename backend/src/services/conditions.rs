//! Search conditions: the range buckets and value lists offered to clients.
//!
//! The same ranges drive the `*_t` columns written at import time, so the
//! range id a client picks from `/search/condition` is exactly what the
//! search query compares against.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{AppError, AppResult};

pub const CHAIR_CONDITION_FILE: &str = "chair_condition.json";
pub const ESTATE_CONDITION_FILE: &str = "estate_condition.json";

/// Bound value meaning "open ended".
pub const UNBOUNDED: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub id: i64,
    pub min: i64,
    pub max: i64,
}

impl Range {
    pub fn contains(&self, value: i64) -> bool {
        (self.min == UNBOUNDED || value >= self.min) && (self.max == UNBOUNDED || value < self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeCondition {
    pub prefix: String,
    pub suffix: String,
    pub ranges: Vec<Range>,
}

impl RangeCondition {
    /// Build ranges from ascending cut points: `[80, 110]` yields
    /// `<80`, `80..110`, `>=110`.
    pub fn from_bounds(prefix: &str, suffix: &str, bounds: &[i64]) -> Self {
        let mut ranges = Vec::with_capacity(bounds.len() + 1);
        let mut min = UNBOUNDED;
        for (id, &max) in bounds.iter().enumerate() {
            ranges.push(Range {
                id: id as i64,
                min,
                max,
            });
            min = max;
        }
        ranges.push(Range {
            id: bounds.len() as i64,
            min,
            max: UNBOUNDED,
        });
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            ranges,
        }
    }

    pub fn range_id(&self, value: i64) -> Option<i64> {
        self.ranges.iter().find(|r| r.contains(value)).map(|r| r.id)
    }

    fn validate(&self, name: &str) -> AppResult<()> {
        if self.ranges.is_empty() {
            return Err(AppError::Config(format!("{name}: no ranges defined")));
        }
        let mut ids: Vec<i64> = self.ranges.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != self.ranges.len() {
            return Err(AppError::Config(format!("{name}: duplicate range ids")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListCondition {
    pub list: Vec<String>,
}

impl ListCondition {
    fn of(items: &[&str]) -> Self {
        Self {
            list: items.iter().map(|s| s.to_string()).collect(),
        }
    }
}

const DOOR_BOUNDS: [i64; 3] = [80, 110, 150];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChairSearchCondition {
    pub width: RangeCondition,
    pub height: RangeCondition,
    pub depth: RangeCondition,
    pub price: RangeCondition,
    pub color: ListCondition,
    pub feature: ListCondition,
    pub kind: ListCondition,
}

impl Default for ChairSearchCondition {
    fn default() -> Self {
        Self {
            width: RangeCondition::from_bounds("", "cm", &DOOR_BOUNDS),
            height: RangeCondition::from_bounds("", "cm", &DOOR_BOUNDS),
            depth: RangeCondition::from_bounds("", "cm", &DOOR_BOUNDS),
            price: RangeCondition::from_bounds("", "円", &[3000, 6000, 9000, 12000, 15000]),
            color: ListCondition::of(&[
                "黒", "白", "赤", "青", "緑", "黄", "紫", "ピンク", "オレンジ", "水色", "ネイビー",
                "ベージュ",
            ]),
            feature: ListCondition::of(&[
                "折りたたみ可",
                "肘掛け",
                "キャスター",
                "リクライニング",
                "高さ調節可",
                "フットレスト",
            ]),
            kind: ListCondition::of(&["ゲーミングチェア", "座椅子", "エルゴノミクス", "ハンモック"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstateSearchCondition {
    pub door_width: RangeCondition,
    pub door_height: RangeCondition,
    pub rent: RangeCondition,
    pub feature: ListCondition,
}

impl Default for EstateSearchCondition {
    fn default() -> Self {
        Self {
            door_width: RangeCondition::from_bounds("", "cm", &DOOR_BOUNDS),
            door_height: RangeCondition::from_bounds("", "cm", &DOOR_BOUNDS),
            rent: RangeCondition::from_bounds("", "円", &[50000, 100000, 150000]),
            feature: ListCondition::of(&[
                "最上階",
                "防犯カメラ",
                "ウォークインクローゼット",
                "ワンルーム",
                "ルーフバルコニー付",
                "エアコン付き",
                "駐輪場あり",
                "プロパンガス",
                "駐車場あり",
                "防音室",
                "追い焚き風呂",
                "オートロック",
                "即入居可",
                "IHコンロ",
                "敷地内駐車場",
                "トランクルーム",
                "角部屋",
                "カスタマイズ可",
                "DIY可",
                "ロフト",
                "シューズボックス",
                "インターネット無料",
                "地下室",
                "敷地内ゴミ置場",
                "管理人有り",
                "宅配ボックス",
                "ルームシェア可",
                "セキュリティ会社加入済",
                "メゾネット",
                "女性限定",
                "バイク置場あり",
                "エレベーター",
                "ペット相談可",
                "洗面所独立",
                "都市ガス",
                "浴室乾燥機",
                "インターネット接続可",
                "テレビ・通信",
                "専用庭",
                "システムキッチン",
                "高齢者歓迎",
                "ケーブルテレビ",
                "床下収納",
                "バス・トイレ別",
                "駐車場2台以上",
                "楽器相談可",
                "フローリング",
                "オール電化",
                "TVモニタ付きインタホン",
                "デザイナーズ物件",
            ]),
        }
    }
}

/// Both condition sets, shared read-only by all handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConditions {
    pub chair: ChairSearchCondition,
    pub estate: EstateSearchCondition,
}

impl SearchConditions {
    /// Built-in conditions, with any `*_condition.json` found in `dir`
    /// replacing the matching default.
    pub fn load(dir: Option<&Path>) -> AppResult<Self> {
        let Some(dir) = dir else {
            return Ok(Self::default());
        };
        let conditions = Self {
            chair: read_override(&dir.join(CHAIR_CONDITION_FILE))?.unwrap_or_default(),
            estate: read_override(&dir.join(ESTATE_CONDITION_FILE))?.unwrap_or_default(),
        };
        conditions.validate()?;
        Ok(conditions)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.chair.width.validate("chair.width")?;
        self.chair.height.validate("chair.height")?;
        self.chair.depth.validate("chair.depth")?;
        self.chair.price.validate("chair.price")?;
        self.estate.door_width.validate("estate.doorWidth")?;
        self.estate.door_height.validate("estate.doorHeight")?;
        self.estate.rent.validate("estate.rent")?;
        Ok(())
    }
}

fn read_override<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let parsed = serde_json::from_str(&raw)
        .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), "loaded search condition override");
    Ok(Some(parsed))
}
