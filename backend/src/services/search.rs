//! Query-string parsing for the chair and estate search endpoints.
//!
//! An empty parameter is the same as an absent one. Range ids and paging
//! values must be base-10 integers.

use std::collections::HashMap;

use crate::database::queries::{ChairFilter, EstateFilter, Page};
use crate::errors::{AppError, AppResult};

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

fn int_param(params: &HashMap<String, String>, name: &str) -> AppResult<Option<i64>> {
    param(params, name)
        .map(|v| {
            v.parse::<i64>()
                .map_err(|e| AppError::bad_request(format!("invalid {name} '{v}': {e}")))
        })
        .transpose()
}

fn text_param(params: &HashMap<String, String>, name: &str) -> Option<String> {
    param(params, name).map(str::to_string)
}

/// Comma-separated list without blanks or repeats, first occurrence wins.
pub fn parse_features(raw: Option<&str>) -> Vec<String> {
    let mut features: Vec<String> = Vec::new();
    for item in raw.unwrap_or_default().split(',') {
        if !item.is_empty() && !features.iter().any(|f| f == item) {
            features.push(item.to_string());
        }
    }
    features
}

pub fn parse_page(params: &HashMap<String, String>) -> AppResult<Page> {
    let page = int_param(params, "page")?
        .ok_or_else(|| AppError::bad_request("page is required"))?;
    let per_page = int_param(params, "perPage")?
        .ok_or_else(|| AppError::bad_request("perPage is required"))?;
    if page < 0 {
        return Err(AppError::bad_request(format!("page must be >= 0, got {page}")));
    }
    if per_page < 1 {
        return Err(AppError::bad_request(format!(
            "perPage must be >= 1, got {per_page}"
        )));
    }
    Ok(Page { page, per_page })
}

pub fn parse_chair_search(params: &HashMap<String, String>) -> AppResult<(ChairFilter, Page)> {
    let filter = ChairFilter {
        price_range_id: int_param(params, "priceRangeId")?,
        height_range_id: int_param(params, "heightRangeId")?,
        width_range_id: int_param(params, "widthRangeId")?,
        depth_range_id: int_param(params, "depthRangeId")?,
        kind: text_param(params, "kind"),
        color: text_param(params, "color"),
        features: parse_features(param(params, "features")),
    };
    if filter.is_empty() {
        return Err(AppError::bad_request("search condition not found"));
    }
    Ok((filter, parse_page(params)?))
}

pub fn parse_estate_search(params: &HashMap<String, String>) -> AppResult<(EstateFilter, Page)> {
    let filter = EstateFilter {
        door_height_range_id: int_param(params, "doorHeightRangeId")?,
        door_width_range_id: int_param(params, "doorWidthRangeId")?,
        rent_range_id: int_param(params, "rentRangeId")?,
        features: parse_features(param(params, "features")),
    };
    if filter.is_empty() {
        return Err(AppError::bad_request("search condition not found"));
    }
    Ok((filter, parse_page(params)?))
}

/// Path ids are plain base-10 integers.
pub fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .map_err(|e| AppError::bad_request(format!("invalid id '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn chair_search_collects_filters() {
        let p = params(&[
            ("priceRangeId", "2"),
            ("kind", "座椅子"),
            ("color", ""),
            ("features", "肘掛け,キャスター,肘掛け"),
            ("page", "0"),
            ("perPage", "25"),
        ]);
        let (filter, page) = parse_chair_search(&p).unwrap();
        assert_eq!(filter.price_range_id, Some(2));
        assert_eq!(filter.kind.as_deref(), Some("座椅子"));
        assert_eq!(filter.color, None);
        assert_eq!(filter.features, vec!["肘掛け", "キャスター"]);
        assert_eq!(
            page,
            Page {
                page: 0,
                per_page: 25
            }
        );
    }

    #[test]
    fn search_without_conditions_is_rejected() {
        let p = params(&[("page", "0"), ("perPage", "10"), ("kind", "")]);
        let err = parse_chair_search(&p).unwrap_err();
        assert_eq!(err.to_string(), "bad request: search condition not found");

        let err = parse_estate_search(&p).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn non_integer_range_is_rejected() {
        let p = params(&[("rentRangeId", "cheap"), ("page", "0"), ("perPage", "10")]);
        assert!(parse_estate_search(&p).is_err());
    }

    #[test]
    fn paging_is_required_and_bounded() {
        assert!(parse_page(&params(&[("perPage", "10")])).is_err());
        assert!(parse_page(&params(&[("page", "0")])).is_err());
        assert!(parse_page(&params(&[("page", "x"), ("perPage", "10")])).is_err());
        assert!(parse_page(&params(&[("page", "-1"), ("perPage", "10")])).is_err());
        assert!(parse_page(&params(&[("page", "0"), ("perPage", "0")])).is_err());
        assert!(parse_page(&params(&[("page", "3"), ("perPage", "1")])).is_ok());
    }

    #[test]
    fn feature_only_estate_search() {
        let p = params(&[("features", "角部屋"), ("page", "1"), ("perPage", "5")]);
        let (filter, page) = parse_estate_search(&p).unwrap();
        assert_eq!(filter.features, vec!["角部屋"]);
        assert_eq!(page.offset(), 5);
    }

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("4x").is_err());
        assert!(parse_id("").is_err());
    }
}
