//! Logical column types (spec §3 "Logical types").
//!
//! The type-union tag is a closed, extensible discriminant: this reader
//! rejects tags it does not know (`Error::UnsupportedType`) rather than
//! guessing at a fallback, per the spec's C1 design consequence.

use crate::error::{Error, Result};
use crate::flat::{FlatBuilder, FlatReader, Offset, TableReader};

/// Floating point precision (spec: `FloatingPoint{precision}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Half,
    Single,
    Double,
}

impl Precision {
    fn to_i16(self) -> i16 {
        match self {
            Precision::Half => 0,
            Precision::Single => 1,
            Precision::Double => 2,
        }
    }

    fn from_i16(v: i16) -> Result<Self> {
        match v {
            0 => Ok(Precision::Half),
            1 => Ok(Precision::Single),
            2 => Ok(Precision::Double),
            _ => Err(Error::UnsupportedType { tag: v as u8 }),
        }
    }
}

/// Unit for `Date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    Day,
    Millisecond,
}

impl DateUnit {
    fn to_i16(self) -> i16 {
        match self {
            DateUnit::Day => 0,
            DateUnit::Millisecond => 1,
        }
    }

    fn from_i16(v: i16) -> Result<Self> {
        match v {
            0 => Ok(DateUnit::Day),
            1 => Ok(DateUnit::Millisecond),
            _ => Err(Error::UnsupportedType { tag: v as u8 }),
        }
    }
}

/// Unit shared by `Time` and `Timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl TimeUnit {
    fn to_i16(self) -> i16 {
        match self {
            TimeUnit::Second => 0,
            TimeUnit::Millisecond => 1,
            TimeUnit::Microsecond => 2,
            TimeUnit::Nanosecond => 3,
        }
    }

    fn from_i16(v: i16) -> Result<Self> {
        match v {
            0 => Ok(TimeUnit::Second),
            1 => Ok(TimeUnit::Millisecond),
            2 => Ok(TimeUnit::Microsecond),
            3 => Ok(TimeUnit::Nanosecond),
            _ => Err(Error::UnsupportedType { tag: v as u8 }),
        }
    }
}

/// Unit for `Interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    YearMonth,
    DayTime,
}

impl IntervalUnit {
    fn to_i16(self) -> i16 {
        match self {
            IntervalUnit::YearMonth => 0,
            IntervalUnit::DayTime => 1,
        }
    }

    fn from_i16(v: i16) -> Result<Self> {
        match v {
            0 => Ok(IntervalUnit::YearMonth),
            1 => Ok(IntervalUnit::DayTime),
            _ => Err(Error::UnsupportedType { tag: v as u8 }),
        }
    }
}

/// `Union` layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionMode {
    Sparse,
    Dense,
}

impl UnionMode {
    fn to_i16(self) -> i16 {
        match self {
            UnionMode::Sparse => 0,
            UnionMode::Dense => 1,
        }
    }

    fn from_i16(v: i16) -> Result<Self> {
        match v {
            0 => Ok(UnionMode::Sparse),
            1 => Ok(UnionMode::Dense),
            _ => Err(Error::UnsupportedType { tag: v as u8 }),
        }
    }
}

/// A logical column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Null,
    Int { bit_width: u8, signed: bool },
    FloatingPoint { precision: Precision },
    Binary,
    Utf8,
    Bool,
    Decimal { precision: i32, scale: i32 },
    Date { unit: DateUnit },
    Time { unit: TimeUnit, bit_width: u8 },
    Timestamp { unit: TimeUnit, timezone: Option<String> },
    Interval { unit: IntervalUnit },
    List,
    Struct,
    Union { mode: UnionMode, type_ids: Option<Vec<i32>> },
    FixedSizeBinary { byte_width: i32 },
    FixedSizeList { list_size: i32 },
    Map { keys_sorted: bool },
}

impl DataType {
    fn tag(&self) -> u8 {
        match self {
            DataType::Null => 1,
            DataType::Int { .. } => 2,
            DataType::FloatingPoint { .. } => 3,
            DataType::Binary => 4,
            DataType::Utf8 => 5,
            DataType::Bool => 6,
            DataType::Decimal { .. } => 7,
            DataType::Date { .. } => 8,
            DataType::Time { .. } => 9,
            DataType::Timestamp { .. } => 10,
            DataType::Interval { .. } => 11,
            DataType::List => 12,
            DataType::Struct => 13,
            DataType::Union { .. } => 14,
            DataType::FixedSizeBinary { .. } => 15,
            DataType::FixedSizeList { .. } => 16,
            DataType::Map { .. } => 17,
        }
    }

    /// Returns `(tag, params_offset)`. Parameterless variants have no params
    /// table; their tag alone identifies them.
    pub(crate) fn encode(&self, b: &mut FlatBuilder) -> (u8, Option<Offset>) {
        let tag = self.tag();
        let params = match self {
            DataType::Null
            | DataType::Binary
            | DataType::Utf8
            | DataType::Bool
            | DataType::List
            | DataType::Struct => None,
            DataType::Int { bit_width, signed } => {
                let mut t = b.start_table();
                t.push_i32(0, *bit_width as i32, 0);
                t.push_bool(1, *signed, true);
                Some(t.finish())
            }
            DataType::FloatingPoint { precision } => {
                let mut t = b.start_table();
                t.push_i16(0, precision.to_i16(), Precision::Single.to_i16());
                Some(t.finish())
            }
            DataType::Decimal { precision, scale } => {
                let mut t = b.start_table();
                t.push_i32(0, *precision, 0);
                t.push_i32(1, *scale, 0);
                Some(t.finish())
            }
            DataType::Date { unit } => {
                let mut t = b.start_table();
                t.push_i16(0, unit.to_i16(), DateUnit::Millisecond.to_i16());
                Some(t.finish())
            }
            DataType::Time { unit, bit_width } => {
                let mut t = b.start_table();
                t.push_i16(0, unit.to_i16(), TimeUnit::Millisecond.to_i16());
                t.push_i32(1, *bit_width as i32, 32);
                Some(t.finish())
            }
            DataType::Timestamp { unit, timezone } => {
                let tz_off = timezone.as_deref().map(|s| b.write_string(s));
                let mut t = b.start_table();
                t.push_i16(0, unit.to_i16(), TimeUnit::Millisecond.to_i16());
                t.push_offset(1, tz_off);
                Some(t.finish())
            }
            DataType::Interval { unit } => {
                let mut t = b.start_table();
                t.push_i16(0, unit.to_i16(), IntervalUnit::YearMonth.to_i16());
                Some(t.finish())
            }
            DataType::Union { mode, type_ids } => {
                let ids_off = type_ids
                    .as_ref()
                    .map(|ids| b.write_offset_vector(&ids.iter().map(|&i| i as u32).collect::<Vec<_>>()));
                let mut t = b.start_table();
                t.push_i16(0, mode.to_i16(), UnionMode::Sparse.to_i16());
                t.push_offset(1, ids_off);
                Some(t.finish())
            }
            DataType::FixedSizeBinary { byte_width } => {
                let mut t = b.start_table();
                t.push_i32(0, *byte_width, 0);
                Some(t.finish())
            }
            DataType::FixedSizeList { list_size } => {
                let mut t = b.start_table();
                t.push_i32(0, *list_size, 0);
                Some(t.finish())
            }
            DataType::Map { keys_sorted } => {
                let mut t = b.start_table();
                t.push_bool(0, *keys_sorted, false);
                Some(t.finish())
            }
        };
        (tag, params)
    }

    pub(crate) fn decode(reader: &FlatReader<'_>, tag: u8, params: Option<u32>) -> Result<Self> {
        let params_table = || -> Result<TableReader<'_>> {
            match params {
                Some(off) => reader.table_at(off),
                None => Err(Error::UnexpectedEof),
            }
        };
        Ok(match tag {
            1 => DataType::Null,
            2 => {
                let t = params_table()?;
                DataType::Int {
                    bit_width: t.get_i32(0, 0)? as u8,
                    signed: t.get_bool(1, true)?,
                }
            }
            3 => {
                let t = params_table()?;
                DataType::FloatingPoint {
                    precision: Precision::from_i16(t.get_i16(0, Precision::Single.to_i16())?)?,
                }
            }
            4 => DataType::Binary,
            5 => DataType::Utf8,
            6 => DataType::Bool,
            7 => {
                let t = params_table()?;
                DataType::Decimal {
                    precision: t.get_i32(0, 0)?,
                    scale: t.get_i32(1, 0)?,
                }
            }
            8 => {
                let t = params_table()?;
                DataType::Date {
                    unit: DateUnit::from_i16(t.get_i16(0, DateUnit::Millisecond.to_i16())?)?,
                }
            }
            9 => {
                let t = params_table()?;
                DataType::Time {
                    unit: TimeUnit::from_i16(t.get_i16(0, TimeUnit::Millisecond.to_i16())?)?,
                    bit_width: t.get_i32(1, 32)? as u8,
                }
            }
            10 => {
                let t = params_table()?;
                let tz_off = t.get_offset(1)?;
                let timezone = match tz_off {
                    Some(o) => Some(reader.string_at(o)?.to_owned()),
                    None => None,
                };
                DataType::Timestamp {
                    unit: TimeUnit::from_i16(t.get_i16(0, TimeUnit::Millisecond.to_i16())?)?,
                    timezone,
                }
            }
            11 => {
                let t = params_table()?;
                DataType::Interval {
                    unit: IntervalUnit::from_i16(t.get_i16(0, IntervalUnit::YearMonth.to_i16())?)?,
                }
            }
            12 => DataType::List,
            13 => DataType::Struct,
            14 => {
                let t = params_table()?;
                let ids_off = t.get_offset(1)?;
                let type_ids = match ids_off {
                    Some(o) => Some(
                        reader
                            .offset_vector_at(o)?
                            .into_iter()
                            .map(|v| v as i32)
                            .collect(),
                    ),
                    None => None,
                };
                DataType::Union {
                    mode: UnionMode::from_i16(t.get_i16(0, UnionMode::Sparse.to_i16())?)?,
                    type_ids,
                }
            }
            15 => {
                let t = params_table()?;
                DataType::FixedSizeBinary {
                    byte_width: t.get_i32(0, 0)?,
                }
            }
            16 => {
                let t = params_table()?;
                DataType::FixedSizeList {
                    list_size: t.get_i32(0, 0)?,
                }
            }
            17 => {
                let t = params_table()?;
                DataType::Map {
                    keys_sorted: t.get_bool(0, false)?,
                }
            }
            _ => return Err(Error::UnsupportedType { tag }),
        })
    }

    /// `children` for all variants is empty except where the spec says
    /// otherwise (`List`, `Struct`, `Union`, `FixedSizeList`, `Map` carry
    /// children on the owning `Field`, not on the type itself).
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            DataType::List
                | DataType::Struct
                | DataType::Union { .. }
                | DataType::FixedSizeList { .. }
                | DataType::Map { .. }
        )
    }
}
