use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::types::DataType;

/// A single column value as it travels through a result cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Datum {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Text(String),
    Timestamp(i64), // microseconds since Unix epoch
    Date(i32),      // days since Unix epoch (1970-01-01)
    Bytea(Vec<u8>),
}

impl Datum {
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Datum::Null => None,
            Datum::Boolean(_) => Some(DataType::Boolean),
            Datum::Int32(_) => Some(DataType::Int32),
            Datum::Int64(_) => Some(DataType::Int64),
            Datum::Float64(_) => Some(DataType::Float64),
            Datum::Text(_) => Some(DataType::Text),
            Datum::Timestamp(_) => Some(DataType::Timestamp),
            Datum::Date(_) => Some(DataType::Date),
            Datum::Bytea(_) => Some(DataType::Bytea),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Datum::Int32(v) => Some(*v as i64),
            Datum::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Parse a textual value into `data_type`, accepting what `Display`
    /// produces for that type. Returns `None` when the text does not parse.
    pub fn parse_as(text: &str, data_type: &DataType) -> Option<Datum> {
        match data_type {
            DataType::Boolean => match text.to_ascii_lowercase().as_str() {
                "t" | "true" | "1" => Some(Datum::Boolean(true)),
                "f" | "false" | "0" => Some(Datum::Boolean(false)),
                _ => None,
            },
            DataType::Int32 => text.parse().ok().map(Datum::Int32),
            DataType::Int64 => text.parse().ok().map(Datum::Int64),
            DataType::Float64 => text.parse().ok().map(Datum::Float64),
            DataType::Text => Some(Datum::Text(text.to_string())),
            DataType::Timestamp => chrono::NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
                .ok()
                .map(|dt| Datum::Timestamp(dt.and_utc().timestamp_micros()))
                .or_else(|| text.parse().ok().map(Datum::Timestamp)),
            DataType::Date => {
                let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1)?;
                let date = chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
                i32::try_from((date - epoch).num_days()).ok().map(Datum::Date)
            }
            DataType::Bytea => decode_hex(text.strip_prefix("\\x")?).map(Datum::Bytea),
        }
    }
}

/// Microsecond precision, so a formatted timestamp parses back unchanged.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

fn decode_hex(digits: &str) -> Option<Vec<u8>> {
    if digits.len() % 2 != 0 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok())
        .collect()
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => write!(f, "NULL"),
            Datum::Boolean(b) => write!(f, "{}", b),
            Datum::Int32(v) => write!(f, "{}", v),
            Datum::Int64(v) => write!(f, "{}", v),
            Datum::Float64(v) => write!(f, "{}", v),
            Datum::Text(s) => write!(f, "{}", s),
            Datum::Timestamp(us) => {
                let secs = us.div_euclid(1_000_000);
                let nsecs = (us.rem_euclid(1_000_000) * 1000) as u32;
                match chrono::DateTime::from_timestamp(secs, nsecs) {
                    Some(dt) => write!(f, "{}", dt.format(TIMESTAMP_FORMAT)),
                    None => write!(f, "{}", us),
                }
            }
            Datum::Date(days) => {
                let date = chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
                    .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(*days as i64)));
                match date {
                    Some(d) => write!(f, "{}", d.format("%Y-%m-%d")),
                    None => write!(f, "{}", days),
                }
            }
            Datum::Bytea(bytes) => {
                write!(f, "\\x")?;
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Datum::Null, Datum::Null) => false, // NULL != NULL in SQL
            (Datum::Boolean(a), Datum::Boolean(b)) => a == b,
            (Datum::Int32(a), Datum::Int32(b)) => a == b,
            (Datum::Int64(a), Datum::Int64(b)) => a == b,
            (Datum::Int32(a), Datum::Int64(b)) => (*a as i64) == *b,
            (Datum::Int64(a), Datum::Int32(b)) => *a == (*b as i64),
            (Datum::Float64(a), Datum::Float64(b)) => a == b,
            (Datum::Float64(a), Datum::Int32(b)) => *a == (*b as f64),
            (Datum::Float64(a), Datum::Int64(b)) => *a == (*b as f64),
            (Datum::Int32(a), Datum::Float64(b)) => (*a as f64) == *b,
            (Datum::Int64(a), Datum::Float64(b)) => (*a as f64) == *b,
            (Datum::Text(a), Datum::Text(b)) => a == b,
            (Datum::Timestamp(a), Datum::Timestamp(b)) => a == b,
            (Datum::Date(a), Datum::Date(b)) => a == b,
            (Datum::Bytea(a), Datum::Bytea(b)) => a == b,
            _ => false,
        }
    }
}

/// Compare two non-null datums. Mismatched or NULL operands compare equal;
/// callers that care about NULL placement go through [`compare_datums`].
pub fn cmp_datum(a: &Datum, b: &Datum) -> Ordering {
    match (a, b) {
        (Datum::Boolean(x), Datum::Boolean(y)) => x.cmp(y),
        (Datum::Int32(x), Datum::Int32(y)) => x.cmp(y),
        (Datum::Int64(x), Datum::Int64(y)) => x.cmp(y),
        (Datum::Int32(x), Datum::Int64(y)) => (*x as i64).cmp(y),
        (Datum::Int64(x), Datum::Int32(y)) => x.cmp(&(*y as i64)),
        (Datum::Float64(x), Datum::Float64(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Datum::Float64(x), Datum::Int64(y)) => x.partial_cmp(&(*y as f64)).unwrap_or(Ordering::Equal),
        (Datum::Int64(x), Datum::Float64(y)) => (*x as f64).partial_cmp(y).unwrap_or(Ordering::Equal),
        (Datum::Float64(x), Datum::Int32(y)) => x.partial_cmp(&(*y as f64)).unwrap_or(Ordering::Equal),
        (Datum::Int32(x), Datum::Float64(y)) => (*x as f64).partial_cmp(y).unwrap_or(Ordering::Equal),
        (Datum::Text(x), Datum::Text(y)) => x.cmp(y),
        (Datum::Timestamp(x), Datum::Timestamp(y)) => x.cmp(y),
        (Datum::Date(x), Datum::Date(y)) => x.cmp(y),
        (Datum::Bytea(x), Datum::Bytea(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Compare two datums in ascending order, placing NULL first or last.
pub fn compare_datums(a: &Datum, b: &Datum, nulls_first: bool) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => {
            if nulls_first {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (false, true) => {
            if nulls_first {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (false, false) => cmp_datum(a, b),
    }
}

/// A row is an ordered list of datums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedRow {
    pub values: Vec<Datum>,
}

impl OwnedRow {
    pub fn new(values: Vec<Datum>) -> Self {
        Self { values }
    }

    pub fn get(&self, idx: usize) -> Option<&Datum> {
        self.values.get(idx)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for OwnedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_never_equals_null() {
        assert_ne!(Datum::Null, Datum::Null);
        assert_eq!(Datum::Int32(7), Datum::Int64(7));
    }

    #[test]
    fn test_compare_datums_null_placement() {
        let one = Datum::Int64(1);
        assert_eq!(compare_datums(&Datum::Null, &one, true), Ordering::Less);
        assert_eq!(compare_datums(&Datum::Null, &one, false), Ordering::Greater);
        assert_eq!(compare_datums(&Datum::Null, &Datum::Null, false), Ordering::Equal);
    }

    #[test]
    fn test_cross_numeric_compare() {
        assert_eq!(cmp_datum(&Datum::Int32(2), &Datum::Int64(3)), Ordering::Less);
        assert_eq!(cmp_datum(&Datum::Float64(2.5), &Datum::Int64(2)), Ordering::Greater);
    }

    #[test]
    fn test_parse_as_typed() {
        assert_eq!(Datum::parse_as("42", &DataType::Int64), Some(Datum::Int64(42)));
        assert_eq!(Datum::parse_as("true", &DataType::Boolean), Some(Datum::Boolean(true)));
        assert_eq!(Datum::parse_as("1970-01-03", &DataType::Date), Some(Datum::Date(2)));
        assert_eq!(Datum::parse_as("nope", &DataType::Int32), None);
        assert_eq!(
            Datum::parse_as("1970-01-01 00:00:01.000002", &DataType::Timestamp),
            Some(Datum::Timestamp(1_000_002))
        );
        assert_eq!(Datum::parse_as("\\xdead", &DataType::Bytea), Some(Datum::Bytea(vec![0xde, 0xad])));
        assert_eq!(Datum::parse_as("dead", &DataType::Bytea), None);
        assert_eq!(Datum::parse_as("\\xabc", &DataType::Bytea), None);
    }

    #[test]
    fn test_parse_as_inverts_display() {
        let values = vec![
            Datum::Boolean(false),
            Datum::Int32(-7),
            Datum::Int64(9_000_000_000),
            Datum::Float64(2.5),
            Datum::Text("a b".into()),
            Datum::Timestamp(1_700_000_000_123_456),
            Datum::Timestamp(-1),
            Datum::Date(19_000),
            Datum::Bytea(vec![0x00, 0xff, 0x10]),
            Datum::Bytea(vec![]),
        ];
        for value in values {
            let data_type = value.data_type().unwrap();
            assert_eq!(Datum::parse_as(&value.to_string(), &data_type), Some(value));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Datum::Date(0).to_string(), "1970-01-01");
        assert_eq!(Datum::Timestamp(1_500_000).to_string(), "1970-01-01 00:00:01.500000");
        assert_eq!(Datum::Bytea(vec![0xde, 0xad]).to_string(), "\\xdead");
        let row = OwnedRow::new(vec![Datum::Int32(1), Datum::Text("x".into())]);
        assert_eq!(row.to_string(), "(1, x)");
    }
}
