//! Plutus data encoding
//!
//! Plutus data is the value model validators see in datums and redeemers. Constructor
//! alternatives 0..=6 map to CBOR tags 121..=127, 7..=127 map to tags 1280..=1400 and
//! anything larger falls back to tag 102 wrapping `[alternative, fields]`.

use ciborium::value::{Integer, Value};

use crate::error::OffchainError;

const COMPACT_TAG_BASE: u64 = 121;
const EXTENDED_TAG_BASE: u64 = 1280;
const GENERAL_CONSTR_TAG: u64 = 102;
const BIGNUM_POSITIVE_TAG: u64 = 2;
const BIGNUM_NEGATIVE_TAG: u64 = 3;
/// Longest bytestring the ledger accepts without chunked (indefinite) encoding
const MAX_BYTES_CHUNK: usize = 64;

/// A Plutus data value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlutusData {
    Constr { tag: u64, fields: Vec<PlutusData> },
    Map(Vec<(PlutusData, PlutusData)>),
    List(Vec<PlutusData>),
    Int(i128),
    Bytes(Vec<u8>),
}

impl PlutusData {
    pub fn constr(tag: u64, fields: Vec<PlutusData>) -> Self {
        PlutusData::Constr { tag, fields }
    }

    /// Constructor without fields, e.g. a plain enum variant.
    pub fn unit(tag: u64) -> Self {
        PlutusData::Constr {
            tag,
            fields: Vec::new(),
        }
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        PlutusData::Bytes(bytes.into())
    }

    pub fn int(value: impl Into<i128>) -> Self {
        PlutusData::Int(value.into())
    }

    /// Returns the constructor alternative and its fields, if this is a constructor.
    pub fn as_constr(&self) -> Option<(u64, &[PlutusData])> {
        match self {
            PlutusData::Constr { tag, fields } => Some((*tag, fields.as_slice())),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PlutusData::Bytes(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i128> {
        match self {
            PlutusData::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Encodes the value as CBOR.
    pub fn to_cbor(&self) -> Result<Vec<u8>, OffchainError> {
        let value = self.to_value()?;
        let mut buffer = Vec::new();
        ciborium::ser::into_writer(&value, &mut buffer)
            .map_err(|e| OffchainError::Cbor(e.to_string()))?;
        Ok(buffer)
    }

    pub fn to_cbor_hex(&self) -> Result<String, OffchainError> {
        Ok(hex::encode(self.to_cbor()?))
    }

    /// Decodes a CBOR-encoded Plutus data value. Both definite and indefinite
    /// length arrays are accepted.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, OffchainError> {
        let value: Value =
            ciborium::de::from_reader(bytes).map_err(|e| OffchainError::Cbor(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_cbor_hex(cbor_hex: &str) -> Result<Self, OffchainError> {
        let bytes = hex::decode(cbor_hex.trim())
            .map_err(|e| OffchainError::Cbor(format!("invalid hex: {}", e)))?;
        Self::from_cbor(&bytes)
    }

    fn to_value(&self) -> Result<Value, OffchainError> {
        match self {
            PlutusData::Constr { tag, fields } => {
                let fields = fields
                    .iter()
                    .map(PlutusData::to_value)
                    .collect::<Result<Vec<_>, _>>()?;
                let value = match *tag {
                    0..=6 => Value::Tag(COMPACT_TAG_BASE + tag, Box::new(Value::Array(fields))),
                    7..=127 => Value::Tag(
                        EXTENDED_TAG_BASE + tag - 7,
                        Box::new(Value::Array(fields)),
                    ),
                    _ => Value::Tag(
                        GENERAL_CONSTR_TAG,
                        Box::new(Value::Array(vec![
                            Value::Integer(Integer::from(*tag)),
                            Value::Array(fields),
                        ])),
                    ),
                };
                Ok(value)
            }
            PlutusData::Map(entries) => {
                let entries = entries
                    .iter()
                    .map(|(k, v)| Ok((k.to_value()?, v.to_value()?)))
                    .collect::<Result<Vec<_>, OffchainError>>()?;
                Ok(Value::Map(entries))
            }
            PlutusData::List(items) => {
                let items = items
                    .iter()
                    .map(PlutusData::to_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(items))
            }
            PlutusData::Int(n) => {
                let integer = Integer::try_from(*n)
                    .map_err(|_| OffchainError::Cbor(format!("integer {} out of range", n)))?;
                Ok(Value::Integer(integer))
            }
            PlutusData::Bytes(bytes) if bytes.len() > MAX_BYTES_CHUNK => Err(OffchainError::Cbor(
                format!(
                    "bytestring of {} bytes exceeds the {}-byte chunk limit",
                    bytes.len(),
                    MAX_BYTES_CHUNK
                ),
            )),
            PlutusData::Bytes(bytes) => Ok(Value::Bytes(bytes.clone())),
        }
    }

    fn from_value(value: Value) -> Result<Self, OffchainError> {
        match value {
            Value::Tag(tag, inner) => Self::from_tagged(tag, *inner),
            Value::Map(entries) => {
                let entries = entries
                    .into_iter()
                    .map(|(k, v)| Ok((Self::from_value(k)?, Self::from_value(v)?)))
                    .collect::<Result<Vec<_>, OffchainError>>()?;
                Ok(PlutusData::Map(entries))
            }
            Value::Array(items) => Ok(PlutusData::List(Self::from_values(items)?)),
            Value::Integer(n) => Ok(PlutusData::Int(i128::from(n))),
            Value::Bytes(bytes) => Ok(PlutusData::Bytes(bytes)),
            other => Err(OffchainError::Cbor(format!(
                "unsupported CBOR value in Plutus data: {:?}",
                other
            ))),
        }
    }

    fn from_tagged(tag: u64, inner: Value) -> Result<Self, OffchainError> {
        match tag {
            121..=127 => Ok(PlutusData::Constr {
                tag: tag - COMPACT_TAG_BASE,
                fields: Self::constr_fields(inner)?,
            }),
            1280..=1400 => Ok(PlutusData::Constr {
                tag: tag - EXTENDED_TAG_BASE + 7,
                fields: Self::constr_fields(inner)?,
            }),
            GENERAL_CONSTR_TAG => {
                let mut parts = match inner {
                    Value::Array(parts) if parts.len() == 2 => parts,
                    _ => {
                        return Err(OffchainError::Cbor(
                            "tag 102 must wrap [alternative, fields]".to_string(),
                        ))
                    }
                };
                let fields = Self::constr_fields(parts.pop().unwrap_or(Value::Null))?;
                let alternative = match parts.pop() {
                    Some(Value::Integer(n)) => u64::try_from(n).map_err(|_| {
                        OffchainError::Cbor("negative constructor alternative".to_string())
                    })?,
                    _ => {
                        return Err(OffchainError::Cbor(
                            "constructor alternative must be an integer".to_string(),
                        ))
                    }
                };
                Ok(PlutusData::Constr {
                    tag: alternative,
                    fields,
                })
            }
            BIGNUM_POSITIVE_TAG | BIGNUM_NEGATIVE_TAG => {
                let bytes = match inner {
                    Value::Bytes(bytes) => bytes,
                    _ => return Err(OffchainError::Cbor("bignum must wrap bytes".to_string())),
                };
                if bytes.len() > 15 {
                    return Err(OffchainError::Cbor(format!(
                        "bignum of {} bytes is too large",
                        bytes.len()
                    )));
                }
                let magnitude = bytes
                    .iter()
                    .fold(0i128, |acc, byte| (acc << 8) | i128::from(*byte));
                if tag == BIGNUM_POSITIVE_TAG {
                    Ok(PlutusData::Int(magnitude))
                } else {
                    Ok(PlutusData::Int(-1 - magnitude))
                }
            }
            other => Err(OffchainError::Cbor(format!(
                "unexpected CBOR tag {} in Plutus data",
                other
            ))),
        }
    }

    fn constr_fields(inner: Value) -> Result<Vec<PlutusData>, OffchainError> {
        match inner {
            Value::Array(items) => Self::from_values(items),
            _ => Err(OffchainError::Cbor(
                "constructor fields must be an array".to_string(),
            )),
        }
    }

    fn from_values(items: Vec<Value>) -> Result<Vec<PlutusData>, OffchainError> {
        items.into_iter().map(Self::from_value).collect()
    }
}
