//! Bus configuration records.
//!
//! A record is one line of seven comma-separated fields:
//!
//! ```text
//! name, logb_count, loge_count, offset_width, width_hex, logb_name_hex, loge_name_hex
//! ```
//!
//! See [`crate::codec`] for the layout of the three hex payloads.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::codec;
use crate::error::DecodeError;

const RECORD_FIELDS: usize = 7;

/// One logb channel: a leaf of the merge tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaf {
    pub index: usize,
    pub weight: u32,
    pub name: String,
}

/// A decoded bus record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    pub name: String,
    pub logb_count: usize,
    pub loge_count: usize,
    pub offset_width: u32,
    /// Merged channels, in decode order (`leaves[i].index == i`).
    pub leaves: Vec<Leaf>,
    /// Cataloged channels; never part of the merge tree.
    pub loge_names: Vec<String>,
}

impl BusConfig {
    /// Decode a packed record.
    pub fn from_record(record: &str) -> Result<Self, DecodeError> {
        let fields: Vec<&str> = record.split(',').map(str::trim).collect();
        if fields.len() != RECORD_FIELDS {
            return Err(DecodeError::FieldCount {
                expected: RECORD_FIELDS,
                found: fields.len(),
            });
        }

        let name = fields[0].to_string();
        let logb_count = parse_field("logb_count", fields[1])?;
        let loge_count = parse_field("loge_count", fields[2])?;
        let offset_width = parse_field("offset_width", fields[3])?;

        let widths = codec::decode_widths("width_hex", fields[4], logb_count)?;
        let logb_names = codec::decode_names("logb_name_hex", fields[5], logb_count)?;
        let loge_names = codec::decode_names("loge_name_hex", fields[6], loge_count)?;

        if let Some(index) = widths.iter().position(|&w| w == 0) {
            return Err(DecodeError::ZeroWidth {
                field: "width_hex",
                index,
            });
        }

        let leaves = widths
            .into_iter()
            .zip(logb_names)
            .enumerate()
            .map(|(index, (weight, name))| Leaf {
                index,
                weight,
                name,
            })
            .collect();

        tracing::debug!(bus = %name, logb_count, loge_count, "Decoded bus record");

        Ok(Self {
            name,
            logb_count,
            loge_count,
            offset_width,
            leaves,
            loge_names,
        })
    }

    /// Build a bus from bare widths, naming the channels `ch0`, `ch1`, ...
    pub fn from_widths(name: impl Into<String>, widths: &[u32], offset_width: u32) -> Self {
        let leaves = widths
            .iter()
            .enumerate()
            .map(|(index, &weight)| Leaf {
                index,
                weight,
                name: format!("ch{index}"),
            })
            .collect();
        Self {
            name: name.into(),
            logb_count: widths.len(),
            loge_count: 0,
            offset_width,
            leaves,
            loge_names: Vec::new(),
        }
    }

    /// Encode this bus back into a packed record.
    pub fn to_record(&self) -> Result<String, DecodeError> {
        let logb_names: Vec<&str> = self.leaves.iter().map(|l| l.name.as_str()).collect();
        Ok(format!(
            "{},{},{},{},{},{},{}",
            self.name,
            self.logb_count,
            self.loge_count,
            self.offset_width,
            codec::encode_widths(&self.weights()),
            codec::encode_names("logb_name_hex", &logb_names)?,
            codec::encode_names("loge_name_hex", &self.loge_names)?,
        ))
    }

    /// Leaf weights indexed by leaf index.
    pub fn weights(&self) -> Vec<u32> {
        self.leaves.iter().map(|l| l.weight).collect()
    }

    /// Total width of all merged channels.
    pub fn total_width(&self) -> u64 {
        self.leaves.iter().map(|l| u64::from(l.weight)).sum()
    }

    /// Leaves permuted into the order the hardware receives them.
    ///
    /// `order` is the leaf index sequence of the shuffle plan.
    pub fn shuffled<'a>(&'a self, order: &'a [usize]) -> impl Iterator<Item = &'a Leaf> + 'a {
        order.iter().map(move |&i| &self.leaves[i])
    }
}

impl FromStr for BusConfig {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_record(s)
    }
}

fn parse_field<T: FromStr>(field: &'static str, value: &str) -> Result<T, DecodeError> {
    value.parse().map_err(|_| DecodeError::InvalidInteger {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bus() -> BusConfig {
        BusConfig {
            name: "record".into(),
            logb_count: 3,
            loge_count: 2,
            offset_width: 11,
            leaves: vec![
                Leaf {
                    index: 0,
                    weight: 32,
                    name: "sda_AW".into(),
                },
                Leaf {
                    index: 1,
                    weight: 36,
                    name: "sda_W".into(),
                },
                Leaf {
                    index: 2,
                    weight: 531,
                    name: "pcis_W".into(),
                },
            ],
            loge_names: vec!["sda_B".into(), "sda_R".into()],
        }
    }

    #[test]
    fn record_round_trip() {
        let bus = sample_bus();
        let record = bus.to_record().unwrap();
        let decoded: BusConfig = record.parse().unwrap();
        assert_eq!(decoded, bus);
    }

    #[test]
    fn fields_are_trimmed() {
        let record = sample_bus().to_record().unwrap().replace(',', ",   ");
        let decoded = BusConfig::from_record(&record).unwrap();
        assert_eq!(decoded.logb_count, 3);
        assert_eq!(decoded.offset_width, 11);
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        let err = BusConfig::from_record("record, 1, 0, 11, 00000020").unwrap_err();
        assert_eq!(
            err,
            DecodeError::FieldCount {
                expected: 7,
                found: 5
            }
        );
    }

    #[test]
    fn non_numeric_count_is_rejected() {
        let err = BusConfig::from_record("record, x, 0, 11, , , ").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidInteger {
                field: "logb_count",
                ..
            }
        ));
    }

    #[test]
    fn zero_width_is_rejected() {
        let mut bus = sample_bus();
        bus.leaves[1].weight = 0;
        let err = BusConfig::from_record(&bus.to_record().unwrap()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::ZeroWidth {
                field: "width_hex",
                index: 1
            }
        );
    }

    #[test]
    fn name_payload_error_names_the_field() {
        let record = sample_bus().to_record().unwrap();
        let mut fields: Vec<String> = record.split(',').map(String::from).collect();
        fields[6].pop();
        let err = BusConfig::from_record(&fields.join(",")).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Length {
                field: "loge_name_hex",
                ..
            }
        ));
    }

    #[test]
    fn shuffled_follows_order() {
        let bus = sample_bus();
        let names: Vec<&str> = bus.shuffled(&[2, 0, 1]).map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["pcis_W", "sda_AW", "sda_W"]);
    }

    #[test]
    fn from_widths_names_channels() {
        let bus = BusConfig::from_widths("adhoc", &[8, 16], 4);
        assert_eq!(bus.leaves[1].name, "ch1");
        assert_eq!(bus.total_width(), 24);
        assert!(bus.loge_names.is_empty());
    }
}
