//! Column ordering for JSON records, used where the remote store is not
//! doing the sorting.

use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

use crate::entity::Order;

/// Compares two column values. Missing and null values sort after
/// everything else regardless of direction.
fn compare(a: Option<&Value>, b: Option<&Value>, ascending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = match (a, b) {
                (Value::Number(x), Value::Number(y)) => x
                    .as_f64()
                    .partial_cmp(&y.as_f64())
                    .unwrap_or(Ordering::Equal),
                (Value::String(x), Value::String(y)) => x.cmp(y),
                (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                _ => a.to_string().cmp(&b.to_string()),
            };
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
    }
}

/// Stable sort of JSON objects by `order.column`.
#[cfg(test)]
pub(crate) fn sort_records(records: &mut [serde_json::Map<String, Value>], order: &Order) {
    records.sort_by(|a, b| compare(a.get(&order.column), b.get(&order.column), order.ascending));
}

/// Stable sort of serializable records by `order.column`.
pub fn sort_entities<T: Serialize>(records: &mut Vec<T>, order: &Order) {
    let mut keyed: Vec<(Option<Value>, T)> = records
        .drain(..)
        .map(|record| {
            let key = serde_json::to_value(&record)
                .ok()
                .and_then(|v| v.get(&order.column).cloned());
            (key, record)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| compare(a.as_ref(), b.as_ref(), order.ascending));
    records.extend(keyed.into_iter().map(|(_, record)| record));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: Value) -> Vec<serde_json::Map<String, Value>> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn ids(records: &[serde_json::Map<String, Value>]) -> Vec<&str> {
        records.iter().map(|r| r["id"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_sort_dates_descending() {
        let mut records = rows(json!([
            {"id": "R1", "test_date": "2024-01-14"},
            {"id": "R2", "test_date": "2024-01-15"},
            {"id": "R3", "test_date": "2024-01-13"}
        ]));
        sort_records(&mut records, &Order::desc("test_date"));
        assert_eq!(ids(&records), ["R2", "R1", "R3"]);
    }

    #[test]
    fn test_nulls_sort_last_both_directions() {
        let mut records = rows(json!([
            {"id": "a", "n": null},
            {"id": "b", "n": 2},
            {"id": "c"},
            {"id": "d", "n": 1}
        ]));
        sort_records(&mut records, &Order::asc("n"));
        assert_eq!(ids(&records), ["d", "b", "a", "c"]);

        sort_records(&mut records, &Order::desc("n"));
        assert_eq!(ids(&records), ["b", "d", "a", "c"]);
    }

    #[test]
    fn test_sort_entities_is_stable_without_column() {
        #[derive(Serialize)]
        struct Row {
            id: u32,
        }

        let mut records = vec![Row { id: 3 }, Row { id: 1 }, Row { id: 2 }];
        sort_entities(&mut records, &Order::desc("created_at"));
        let order: Vec<u32> = records.iter().map(|r| r.id).collect();
        assert_eq!(order, [3, 1, 2]);
    }
}
