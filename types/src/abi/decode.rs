// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use ethereum_types::{Address, U256};

use super::{ParamType, Token, WORD};
use crate::error::AbiError;

/// Decode `data` as a tuple whose components have the given types.
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, AbiError> {
    decode_params(types.iter(), data, 0)
}

/// Decode consecutive parameters whose head starts at `start`. Dynamic offsets
/// are relative to `start` and must point past the end of the head.
fn decode_params<'a>(
    types: impl Iterator<Item = &'a ParamType> + Clone,
    data: &[u8],
    start: usize,
) -> Result<Vec<Token>, AbiError> {
    let mut tokens = Vec::new();
    let mut head = start;
    let head_end = types
        .clone()
        .try_fold(start, |end, param| end.checked_add(param.head_size()))
        .ok_or_else(|| out_of_bounds(start, usize::MAX, data))?;

    for param in types {
        if param.is_dynamic() {
            let offset = read_usize(data, head)?;
            let at = start.checked_add(offset).ok_or_else(|| out_of_bounds(start, offset, data))?;
            if at < head_end {
                return Err(AbiError::InvalidData(format!(
                    "offset {offset} at {head} points into the head ending at {head_end}"
                )));
            }
            tokens.push(decode_param(param, data, at)?);
            head += WORD;
        } else {
            tokens.push(decode_param(param, data, head)?);
            head += param.head_size();
        }
    }

    Ok(tokens)
}

fn decode_param(param: &ParamType, data: &[u8], at: usize) -> Result<Token, AbiError> {
    match param {
        ParamType::Address => {
            let word = read_word(data, at)?;
            if word[..12].iter().any(|b| *b != 0) {
                return Err(AbiError::InvalidData(format!("dirty address padding at {at}")));
            }
            Ok(Token::Address(Address::from_slice(&word[12..])))
        }
        ParamType::Bool => {
            let word = read_word(data, at)?;
            match U256::from_big_endian(word) {
                v if v.is_zero() => Ok(Token::Bool(false)),
                v if v == U256::one() => Ok(Token::Bool(true)),
                _ => Err(AbiError::InvalidData(format!("invalid bool at {at}"))),
            }
        }
        ParamType::Int(_) => Ok(Token::Int(U256::from_big_endian(read_word(data, at)?))),
        ParamType::Uint(_) => Ok(Token::Uint(U256::from_big_endian(read_word(data, at)?))),
        ParamType::FixedBytes(len) => {
            if *len > WORD {
                return Err(AbiError::InvalidData(format!("bytes{len} is not a valid type")));
            }
            Ok(Token::FixedBytes(read_word(data, at)?[..*len].to_vec()))
        }
        ParamType::Bytes => Ok(Token::Bytes(read_dynamic_bytes(data, at)?.to_vec())),
        ParamType::String => {
            let bytes = read_dynamic_bytes(data, at)?;
            let s = String::from_utf8(bytes.to_vec())
                .map_err(|e| AbiError::InvalidData(format!("string at {at}: {e}")))?;
            Ok(Token::String(s))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, at)?;
            let body = at + WORD;
            // Every element occupies at least one word of the array head.
            let available = data.len().saturating_sub(body) / WORD;
            if len > available {
                return Err(out_of_bounds(body, len.saturating_mul(WORD), data));
            }
            let tokens = decode_params(std::iter::repeat(inner.as_ref()).take(len), data, body)?;
            Ok(Token::Array(tokens))
        }
        ParamType::FixedArray(inner, len) => {
            let tokens = decode_params(std::iter::repeat(inner.as_ref()).take(*len), data, at)?;
            Ok(Token::FixedArray(tokens))
        }
        ParamType::Tuple(types) => Ok(Token::Tuple(decode_params(types.iter(), data, at)?)),
    }
}

fn out_of_bounds(offset: usize, len: usize, data: &[u8]) -> AbiError {
    AbiError::OutOfBounds {
        offset,
        len,
        data_len: data.len(),
    }
}

fn read_slice(data: &[u8], at: usize, len: usize) -> Result<&[u8], AbiError> {
    at.checked_add(len)
        .and_then(|end| data.get(at..end))
        .ok_or_else(|| out_of_bounds(at, len, data))
}

fn read_word(data: &[u8], at: usize) -> Result<&[u8], AbiError> {
    read_slice(data, at, WORD)
}

/// A length or offset word. Values larger than the data can never be valid.
fn read_usize(data: &[u8], at: usize) -> Result<usize, AbiError> {
    let v = U256::from_big_endian(read_word(data, at)?);
    if v > U256::from(data.len()) {
        return Err(AbiError::OutOfBounds {
            offset: at,
            len: usize::MAX,
            data_len: data.len(),
        });
    }
    Ok(v.as_usize())
}

fn read_dynamic_bytes(data: &[u8], at: usize) -> Result<&[u8], AbiError> {
    let len = read_usize(data, at)?;
    read_slice(data, at + WORD, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode;

    fn number() -> ParamType {
        ParamType::Tuple(vec![ParamType::Int(128), ParamType::Int(128)])
    }

    #[test]
    fn decodes_what_encode_produces_for_nested_tensors() {
        let tensor_type = ParamType::Tuple(vec![ParamType::String, ParamType::array(number())]);
        let types = vec![ParamType::array(tensor_type), ParamType::Bool];
        let tokens = vec![
            Token::Array(vec![
                Token::Tuple(vec![
                    Token::String("price".into()),
                    Token::Array(vec![
                        Token::Tuple(vec![Token::from_i128(1_500_000), Token::from_i128(6)]),
                        Token::Tuple(vec![Token::from_i128(-25), Token::from_i128(1)]),
                    ]),
                ]),
                Token::Tuple(vec![Token::String(String::new()), Token::Array(vec![])]),
            ]),
            Token::Bool(true),
        ];
        assert_eq!(decode(&types, &encode(&tokens)).unwrap(), tokens);
    }

    #[test]
    fn decodes_fixed_array_of_static_tuples_inline() {
        let types = vec![ParamType::FixedArray(Box::new(number()), 2), ParamType::Uint(256)];
        let tokens = vec![
            Token::FixedArray(vec![
                Token::Tuple(vec![Token::from_i128(1), Token::from_i128(2)]),
                Token::Tuple(vec![Token::from_i128(3), Token::from_i128(4)]),
            ]),
            Token::uint(5u32),
        ];
        let encoded = encode(&tokens);
        assert_eq!(encoded.len(), 5 * WORD);
        assert_eq!(decode(&types, &encoded).unwrap(), tokens);
    }

    #[test]
    fn truncated_data_is_out_of_bounds() {
        let encoded = encode(&[Token::String("hello".into())]);
        let err = decode(&[ParamType::String], &encoded[..WORD + 16]).unwrap_err();
        assert!(matches!(err, AbiError::OutOfBounds { .. }), "{err:?}");
    }

    #[test]
    fn huge_array_length_is_rejected_without_allocating() {
        let mut data = vec![0u8; 2 * WORD];
        data[31] = 0x20;
        // length word just below the data size but far more elements than fit
        data[WORD + 31] = 0x40;
        let err = decode(&[ParamType::array(ParamType::Uint(256))], &data).unwrap_err();
        assert!(matches!(err, AbiError::OutOfBounds { .. }), "{err:?}");
    }

    #[test]
    fn rejects_offsets_into_the_head() {
        // [string, string] where the second offset points back at the first
        // string's offset word.
        let mut data = encode(&[Token::String("a".into()), Token::String("b".into())]);
        data[2 * WORD - 1] = 0;
        let err = decode(&[ParamType::String, ParamType::String], &data).unwrap_err();
        assert!(matches!(err, AbiError::InvalidData(_)), "{err:?}");

        // string[] of one element whose offset aliases the array length word
        let mut data = encode(&[Token::Array(vec![Token::String("x".into())])]);
        data[3 * WORD - 1] = 0;
        let err = decode(&[ParamType::array(ParamType::String)], &data).unwrap_err();
        assert!(matches!(err, AbiError::InvalidData(_)), "{err:?}");
    }

    #[test]
    fn rejects_invalid_bool_and_utf8() {
        let mut word = [0u8; WORD];
        word[31] = 2;
        assert!(decode(&[ParamType::Bool], &word).is_err());

        let mut data = encode(&[Token::Bytes(vec![0xff, 0xfe])]);
        assert!(decode(&[ParamType::String], &data).is_err());
        data.truncate(WORD);
        assert!(decode(&[ParamType::Bytes], &data).is_err());
    }

    #[test]
    fn rejects_dirty_address_padding() {
        let mut word = [0u8; WORD];
        word[0] = 1;
        assert!(matches!(
            decode(&[ParamType::Address], &word),
            Err(AbiError::InvalidData(_))
        ));
    }
}
