use chrono::NaiveDate;
use mongodb::bson::Bson;
use serde::{Deserialize, Deserializer, Serialize};

/// Accepted spellings of `date`, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%y", "%d-%b-%Y", "%d-%m-%Y"];

/// One day of trading data for one company.
///
/// Serialises with camelCase names. Decoding also accepts the CSV header
/// spellings the collections were imported with (`"Open Price"`,
/// `"No. of Trades"`, ...). No schema is enforced on the stored documents, so
/// every field decodes leniently: a value of the wrong type or an unparseable
/// placeholder (`"-"`) becomes `None` and is written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    #[serde(default, alias = "Date", deserialize_with = "deserialize_date")]
    pub date: Option<String>,

    #[serde(default, alias = "Open Price", deserialize_with = "deserialize_decimal")]
    pub open_price: Option<f64>,

    #[serde(default, alias = "High Price", deserialize_with = "deserialize_decimal")]
    pub high_price: Option<f64>,

    #[serde(default, alias = "Low Price", deserialize_with = "deserialize_decimal")]
    pub low_price: Option<f64>,

    #[serde(default, alias = "Close Price", deserialize_with = "deserialize_decimal")]
    pub close_price: Option<f64>,

    #[serde(default, alias = "Average Price", deserialize_with = "deserialize_decimal")]
    pub average_price: Option<f64>,

    #[serde(default, alias = "Volume", deserialize_with = "deserialize_count")]
    pub volume: Option<u64>,

    #[serde(default, alias = "No. of Trades", deserialize_with = "deserialize_count")]
    pub number_of_trades: Option<u64>,

    #[serde(
        default,
        alias = "Total Turnover (Rs.)",
        deserialize_with = "deserialize_decimal"
    )]
    pub total_turnover: Option<f64>,

    #[serde(default, alias = "Deliverable Quantity", deserialize_with = "deserialize_count")]
    pub deliverable_quantity: Option<u64>,

    #[serde(
        default,
        alias = "% Deli. Qty to Traded Qty",
        deserialize_with = "deserialize_decimal"
    )]
    pub percent_deliverable_to_traded: Option<f64>,

    #[serde(default, alias = "Spread High-Low", deserialize_with = "deserialize_decimal")]
    pub spread_high_low: Option<f64>,

    #[serde(default, alias = "Spread Close-Open", deserialize_with = "deserialize_decimal")]
    pub spread_close_open: Option<f64>,
}

impl StockRecord {
    /// Parses `date` in any of the known layouts.
    pub fn trading_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    }
}

/// Strings pass through; BSON datetimes render as `YYYY-MM-DD`.
fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Bson>::deserialize(deserializer)? {
        Some(Bson::String(s)) => Some(s),
        Some(Bson::DateTime(dt)) => Some(dt.to_chrono().format("%Y-%m-%d").to_string()),
        _ => None,
    })
}

fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Bson>::deserialize(deserializer)?.and_then(|value| as_decimal(&value)))
}

/// Counts arrive as int32, int64, whole doubles or numeric strings. Negative or
/// fractional values are not counts and decode as `None`.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Bson>::deserialize(deserializer)?.and_then(|value| as_count(&value)))
}

fn as_decimal(value: &Bson) -> Option<f64> {
    let f = match value {
        Bson::Double(f) => *f,
        Bson::Int32(n) => f64::from(*n),
        Bson::Int64(n) => *n as f64,
        Bson::String(s) => s.trim().replace(',', "").parse().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

fn as_count(value: &Bson) -> Option<u64> {
    match value {
        Bson::Int32(n) => u64::try_from(*n).ok(),
        Bson::Int64(n) => u64::try_from(*n).ok(),
        other => {
            let f = as_decimal(other)?;
            (f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64).then(|| f as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};
    use serde_json::json;

    #[test]
    fn decodes_csv_style_document() {
        let document = doc! {
            "_id": bson::oid::ObjectId::new(),
            "Date": "01-Apr-18",
            "Open Price": 922.0,
            "High Price": 929.9,
            "Low Price": 915.2,
            "Close Price": 921.35,
            "Average Price": 922.41,
            "Volume": 4_317_539_i64,
            "No. of Trades": 98_213_i32,
            "Total Turnover (Rs.)": 3.98e9,
            "Deliverable Quantity": 1_974_402.0,
            "% Deli. Qty to Traded Qty": 45.73,
            "Spread High-Low": 14.7,
            "Spread Close-Open": -0.65,
        };

        let record: StockRecord = bson::from_document(document).unwrap();

        assert_eq!(record.date.as_deref(), Some("01-Apr-18"));
        assert_eq!(record.open_price, Some(922.0));
        assert_eq!(record.volume, Some(4_317_539));
        assert_eq!(record.number_of_trades, Some(98_213));
        assert_eq!(record.deliverable_quantity, Some(1_974_402));
        assert_eq!(record.spread_close_open, Some(-0.65));
    }

    #[test]
    fn placeholder_string_in_numeric_column_is_none() {
        let document = doc! {
            "Date": "01-Apr-18",
            "Open Price": 922.0,
            "% Deli. Qty to Traded Qty": "-",
            "Volume": "",
        };

        let record: StockRecord = bson::from_document(document).unwrap();

        assert_eq!(record.open_price, Some(922.0));
        assert_eq!(record.percent_deliverable_to_traded, None);
        assert_eq!(record.volume, None);
    }

    #[test]
    fn numeric_strings_are_parsed() {
        let document = doc! {
            "Close Price": " 1,234.50 ",
            "No. of Trades": "98213",
        };

        let record: StockRecord = bson::from_document(document).unwrap();

        assert_eq!(record.close_price, Some(1234.5));
        assert_eq!(record.number_of_trades, Some(98_213));
    }

    #[test]
    fn datetime_date_renders_as_iso_day() {
        let date = bson::DateTime::builder()
            .year(2018)
            .month(4)
            .day(2)
            .build()
            .unwrap();

        let record: StockRecord =
            bson::from_document(doc! { "Date": date, "Open Price": 922.0 }).unwrap();

        assert_eq!(record.date.as_deref(), Some("2018-04-02"));
        assert_eq!(
            record.trading_date(),
            NaiveDate::from_ymd_opt(2018, 4, 2)
        );
    }

    #[test]
    fn raw_bytes_decode_like_a_cursor_would() {
        let document = doc! {
            "Date": bson::DateTime::now(),
            "Open Price": "-",
            "Volume": 10_i32,
        };
        let bytes = bson::to_vec(&document).unwrap();

        let record: StockRecord = bson::from_slice(&bytes).unwrap();

        assert!(record.date.is_some());
        assert_eq!(record.open_price, None);
        assert_eq!(record.volume, Some(10));
    }

    #[test]
    fn wrong_types_do_not_fail_the_record() {
        let document = doc! {
            "Date": 20180401_i32,
            "High Price": true,
            "Low Price": { "nested": 1 },
            "Close Price": 930.5,
        };

        let record: StockRecord = bson::from_document(document).unwrap();

        assert_eq!(record.date, None);
        assert_eq!(record.high_price, None);
        assert_eq!(record.low_price, None);
        assert_eq!(record.close_price, Some(930.5));
    }

    #[test]
    fn integer_prices_decode_as_floats() {
        let record: StockRecord = bson::from_document(doc! { "openPrice": 900_i32 }).unwrap();
        assert_eq!(record.open_price, Some(900.0));
    }

    #[test]
    fn missing_fields_serialise_as_null() {
        let record = StockRecord {
            date: Some("2018-04-02".to_string()),
            close_price: Some(930.5),
            ..Default::default()
        };

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["date"], "2018-04-02");
        assert_eq!(value["closePrice"], 930.5);
        assert!(value["openPrice"].is_null());
        assert!(value["percentDeliverableToTraded"].is_null());
        assert_eq!(value.as_object().unwrap().len(), 13);
    }

    #[test]
    fn fractional_count_is_none() {
        let record: StockRecord = serde_json::from_value(json!({ "volume": 12.5 })).unwrap();
        assert_eq!(record.volume, None);
    }

    #[test]
    fn negative_count_is_none() {
        let record: StockRecord =
            serde_json::from_value(json!({ "numberOfTrades": -3 })).unwrap();
        assert_eq!(record.number_of_trades, None);
    }

    #[test]
    fn count_at_two_to_the_64_is_none() {
        let record: StockRecord =
            bson::from_document(doc! { "Volume": 18_446_744_073_709_551_616.0_f64 }).unwrap();
        assert_eq!(record.volume, None);
    }

    #[test]
    fn null_count_is_none() {
        let record: StockRecord = serde_json::from_value(json!({ "volume": null })).unwrap();
        assert_eq!(record.volume, None);
    }

    #[test]
    fn trading_date_understands_known_layouts() {
        let expected = NaiveDate::from_ymd_opt(2018, 4, 1);
        for raw in ["2018-04-01", "01-Apr-18", "01-Apr-2018", "01-04-2018"] {
            let record = StockRecord {
                date: Some(raw.to_string()),
                ..Default::default()
            };
            assert_eq!(record.trading_date(), expected, "layout {}", raw);
        }
    }

    #[test]
    fn trading_date_is_none_for_garbage() {
        let record = StockRecord {
            date: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert_eq!(record.trading_date(), None);
    }
}
