//! Unit tests for Plutus data encoding

use cardano_offchain::{OffchainError, PlutusData};

// ============================================================================
// ENCODING TESTS
// ============================================================================

/// What is tested: field-less constructors encode under the compact tags
/// Why: escrow actions and states are plain constructors; tags 121..127 are what validators expect
#[test]
fn test_unit_constructors_encode_compact_tags() {
    assert_eq!(PlutusData::unit(0).to_cbor_hex().unwrap(), "d87980");
    assert_eq!(PlutusData::unit(1).to_cbor_hex().unwrap(), "d87a80");
    assert_eq!(PlutusData::unit(2).to_cbor_hex().unwrap(), "d87b80");
}

/// What is tested: integers, lists and maps encode as plain CBOR
/// Why: the datum mixes integers with constructors and bytes
#[test]
fn test_primitive_encoding() {
    assert_eq!(PlutusData::int(-1000).to_cbor_hex().unwrap(), "3903e7");
    assert_eq!(PlutusData::int(5_000_000u64).to_cbor_hex().unwrap(), "1a004c4b40");
    assert_eq!(
        PlutusData::List(vec![PlutusData::int(1), PlutusData::int(2)])
            .to_cbor_hex()
            .unwrap(),
        "820102"
    );
    assert_eq!(
        PlutusData::Map(vec![(PlutusData::int(1), PlutusData::bytes(vec![0xff]))])
            .to_cbor_hex()
            .unwrap(),
        "a10141ff"
    );
}

/// What is tested: bytestrings longer than 64 bytes are rejected
/// Why: the ledger only accepts longer bytestrings in chunked form
#[test]
fn test_long_bytestring_rejected() {
    let result = PlutusData::bytes(vec![0u8; 65]).to_cbor();
    assert!(matches!(result, Err(OffchainError::Cbor(_))));
    assert!(PlutusData::bytes(vec![0u8; 64]).to_cbor().is_ok());
}

// ============================================================================
// DECODING TESTS
// ============================================================================

/// What is tested: decoding returns the value that was encoded
/// Why: escrow UTxOs are listed by decoding their inline datums
#[test]
fn test_decode_nested_value() {
    let value = PlutusData::constr(
        1,
        vec![
            PlutusData::bytes(b"abc".to_vec()),
            PlutusData::List(vec![PlutusData::int(-5), PlutusData::unit(0)]),
        ],
    );
    let decoded = PlutusData::from_cbor(&value.to_cbor().unwrap()).unwrap();
    assert_eq!(decoded, value);
}

/// What is tested: positive bignums decode to integers
/// Why: other tools encode integers above 2^64 as tagged bignums
#[test]
fn test_decode_bignum() {
    // 2(h'010000000000000000') = 2^64
    let decoded = PlutusData::from_cbor_hex("c249010000000000000000").unwrap();
    assert_eq!(decoded, PlutusData::Int(18_446_744_073_709_551_616));
}

/// What is tested: malformed hex and unknown tags are rejected
/// Why: foreign datums at a script address must not be mistaken for valid data
#[test]
fn test_decode_errors() {
    assert!(matches!(
        PlutusData::from_cbor_hex("zz"),
        Err(OffchainError::Cbor(_))
    ));
    // tag 30 is not Plutus data
    assert!(matches!(
        PlutusData::from_cbor_hex("d81e80"),
        Err(OffchainError::Cbor(_))
    ));
}
