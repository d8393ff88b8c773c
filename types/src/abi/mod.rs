// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! Solidity ABI encoding for the subset of types the inference contracts use.
//!
//! Values are encoded with the standard head/tail layout: static values sit
//! inline in 32-byte words, dynamic values (strings, bytes, `T[]` and any
//! tuple containing them) are referenced from the head by a byte offset
//! relative to the start of the enclosing tuple.

mod decode;
mod encode;

use std::fmt;

use ethereum_types::{Address, U256};

use crate::crypto::keccak256;
use crate::error::AbiError;

pub use decode::decode;
pub use encode::encode;

/// Size of an ABI word in bytes.
pub const WORD: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    Address,
    Bool,
    Int(usize),
    Uint(usize),
    String,
    Bytes,
    FixedBytes(usize),
    Array(Box<ParamType>),
    FixedArray(Box<ParamType>, usize),
    Tuple(Vec<ParamType>),
}

impl ParamType {
    pub fn array(inner: ParamType) -> Self {
        ParamType::Array(Box::new(inner))
    }

    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::String | ParamType::Bytes | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(types) => types.iter().any(ParamType::is_dynamic),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head of its enclosing tuple.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD;
        }
        match self {
            ParamType::FixedArray(inner, len) => inner.head_size() * len,
            ParamType::Tuple(types) => types.iter().map(ParamType::head_size).sum(),
            _ => WORD,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::String => write!(f, "string"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::FixedBytes(len) => write!(f, "bytes{len}"),
            ParamType::Array(inner) => write!(f, "{inner}[]"),
            ParamType::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
            ParamType::Tuple(types) => {
                write!(f, "(")?;
                for (i, t) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A runtime ABI value. Signed integers are stored in 256-bit two's complement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Bool(bool),
    Int(U256),
    Uint(U256),
    String(String),
    Bytes(Vec<u8>),
    FixedBytes(Vec<u8>),
    Array(Vec<Token>),
    FixedArray(Vec<Token>),
    Tuple(Vec<Token>),
}

impl Token {
    pub fn from_i128(v: i128) -> Self {
        if v >= 0 {
            Token::Int(U256::from(v as u128))
        } else {
            Token::Int(!U256::from((-1 - v) as u128))
        }
    }

    pub fn uint(v: impl Into<U256>) -> Self {
        Token::Uint(v.into())
    }

    pub fn is_dynamic(&self) -> bool {
        match self {
            Token::String(_) | Token::Bytes(_) | Token::Array(_) => true,
            Token::FixedArray(tokens) | Token::Tuple(tokens) => tokens.iter().any(Token::is_dynamic),
            _ => false,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Token::Address(_) => "address",
            Token::Bool(_) => "bool",
            Token::Int(_) => "int",
            Token::Uint(_) => "uint",
            Token::String(_) => "string",
            Token::Bytes(_) => "bytes",
            Token::FixedBytes(_) => "fixed bytes",
            Token::Array(_) => "array",
            Token::FixedArray(_) => "fixed array",
            Token::Tuple(_) => "tuple",
        }
    }

    fn unexpected(&self, expected: &str) -> AbiError {
        AbiError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.kind().to_string(),
        }
    }

    /// Whether this token can be encoded as `param`.
    pub fn type_check(&self, param: &ParamType) -> bool {
        match (self, param) {
            (Token::Address(_), ParamType::Address)
            | (Token::Bool(_), ParamType::Bool)
            | (Token::Int(_), ParamType::Int(_))
            | (Token::Uint(_), ParamType::Uint(_))
            | (Token::String(_), ParamType::String)
            | (Token::Bytes(_), ParamType::Bytes) => true,
            (Token::FixedBytes(b), ParamType::FixedBytes(len)) => b.len() == *len,
            (Token::Array(tokens), ParamType::Array(inner)) => {
                tokens.iter().all(|t| t.type_check(inner))
            }
            (Token::FixedArray(tokens), ParamType::FixedArray(inner, len)) => {
                tokens.len() == *len && tokens.iter().all(|t| t.type_check(inner))
            }
            (Token::Tuple(tokens), ParamType::Tuple(types)) => {
                tokens.len() == types.len()
                    && tokens.iter().zip(types).all(|(t, p)| t.type_check(p))
            }
            _ => false,
        }
    }

    pub fn into_i128(self) -> Result<i128, AbiError> {
        let out_of_range = || AbiError::InvalidData("integer does not fit in int128".to_string());
        match self {
            Token::Int(v) if v.bit(255) => {
                let magnitude = !v;
                if magnitude > U256::from(i128::MAX as u128) {
                    return Err(out_of_range());
                }
                Ok(-1 - magnitude.as_u128() as i128)
            }
            Token::Int(v) | Token::Uint(v) => {
                if v > U256::from(i128::MAX as u128) {
                    return Err(out_of_range());
                }
                Ok(v.as_u128() as i128)
            }
            other => Err(other.unexpected("int")),
        }
    }

    pub fn into_uint(self) -> Result<U256, AbiError> {
        match self {
            Token::Uint(v) => Ok(v),
            other => Err(other.unexpected("uint")),
        }
    }

    pub fn into_u64(self) -> Result<u64, AbiError> {
        let v = self.into_uint()?;
        if v > U256::from(u64::MAX) {
            return Err(AbiError::InvalidData("integer does not fit in uint64".to_string()));
        }
        Ok(v.as_u64())
    }

    pub fn into_bool(self) -> Result<bool, AbiError> {
        match self {
            Token::Bool(b) => Ok(b),
            other => Err(other.unexpected("bool")),
        }
    }

    pub fn into_address(self) -> Result<Address, AbiError> {
        match self {
            Token::Address(a) => Ok(a),
            other => Err(other.unexpected("address")),
        }
    }

    pub fn into_string(self) -> Result<String, AbiError> {
        match self {
            Token::String(s) => Ok(s),
            other => Err(other.unexpected("string")),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, AbiError> {
        match self {
            Token::Bytes(b) | Token::FixedBytes(b) => Ok(b),
            other => Err(other.unexpected("bytes")),
        }
    }

    /// Elements of a dynamic or fixed-size array.
    pub fn into_array(self) -> Result<Vec<Token>, AbiError> {
        match self {
            Token::Array(tokens) | Token::FixedArray(tokens) => Ok(tokens),
            other => Err(other.unexpected("array")),
        }
    }

    pub fn into_tuple(self) -> Result<Vec<Token>, AbiError> {
        match self {
            Token::Tuple(tokens) => Ok(tokens),
            other => Err(other.unexpected("tuple")),
        }
    }

    /// Destructure a tuple of exactly `N` components.
    pub fn into_fixed_tuple<const N: usize>(self) -> Result<[Token; N], AbiError> {
        let tokens = self.into_tuple()?;
        let found = tokens.len();
        tokens
            .try_into()
            .map_err(|_| AbiError::WrongArity { expected: N, found })
    }
}

/// Conversion between a Rust value and its ABI token.
pub trait Tokenizable: Sized {
    fn into_token(self) -> Token;
    fn from_token(token: Token) -> Result<Self, AbiError>;
}

impl Tokenizable for Token {
    fn into_token(self) -> Token {
        self
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        Ok(token)
    }
}

impl Tokenizable for String {
    fn into_token(self) -> Token {
        Token::String(self)
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        token.into_string()
    }
}

impl Tokenizable for bool {
    fn into_token(self) -> Token {
        Token::Bool(self)
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        token.into_bool()
    }
}

impl Tokenizable for Address {
    fn into_token(self) -> Token {
        Token::Address(self)
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        token.into_address()
    }
}

impl Tokenizable for U256 {
    fn into_token(self) -> Token {
        Token::Uint(self)
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        token.into_uint()
    }
}

impl Tokenizable for u32 {
    fn into_token(self) -> Token {
        Token::uint(self)
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        let v = token.into_uint()?;
        if v > U256::from(u32::MAX) {
            return Err(AbiError::InvalidData("integer does not fit in uint32".to_string()));
        }
        Ok(v.as_u32())
    }
}

impl<T: Tokenizable> Tokenizable for Vec<T> {
    fn into_token(self) -> Token {
        Token::Array(self.into_iter().map(Tokenizable::into_token).collect())
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        token.into_array()?.into_iter().map(T::from_token).collect()
    }
}

fn check_tokens(params: &[ParamType], tokens: &[Token]) -> Result<(), AbiError> {
    if params.len() != tokens.len() {
        return Err(AbiError::WrongArity {
            expected: params.len(),
            found: tokens.len(),
        });
    }
    for (param, token) in params.iter().zip(tokens) {
        if !token.type_check(param) {
            return Err(AbiError::UnexpectedToken {
                expected: param.to_string(),
                found: token.kind().to_string(),
            });
        }
    }
    Ok(())
}

fn signature(name: &str, params: &[ParamType]) -> String {
    let types: Vec<String> = params.iter().map(ToString::to_string).collect();
    format!("{}({})", name, types.join(","))
}

/// A contract function callable by transaction or `eth_call`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub inputs: Vec<ParamType>,
    pub outputs: Vec<ParamType>,
}

impl Function {
    pub fn new(name: impl Into<String>, inputs: Vec<ParamType>, outputs: Vec<ParamType>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
        }
    }

    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Selector followed by the encoded arguments.
    pub fn encode_input(&self, tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
        check_tokens(&self.inputs, tokens)?;
        let mut data = self.selector().to_vec();
        data.extend(encode(tokens));
        Ok(data)
    }

    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<Token>, AbiError> {
        decode(&self.outputs, data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventParam {
    pub kind: ParamType,
    pub indexed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub inputs: Vec<EventParam>,
}

impl Event {
    /// An event whose parameters are all non-indexed.
    pub fn new(name: impl Into<String>, inputs: Vec<ParamType>) -> Self {
        Self {
            name: name.into(),
            inputs: inputs
                .into_iter()
                .map(|kind| EventParam {
                    kind,
                    indexed: false,
                })
                .collect(),
        }
    }

    pub fn signature(&self) -> String {
        let types: Vec<ParamType> = self.inputs.iter().map(|p| p.kind.clone()).collect();
        signature(&self.name, &types)
    }

    /// `topics[0]` of every log this event emits.
    pub fn topic(&self) -> [u8; 32] {
        keccak256(self.signature().as_bytes())
    }

    /// Decode the non-indexed parameters carried in a log's data.
    pub fn decode_data(&self, data: &[u8]) -> Result<Vec<Token>, AbiError> {
        let types: Vec<ParamType> = self
            .inputs
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.kind.clone())
            .collect();
        decode(&types, data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub inputs: Vec<ParamType>,
}

impl Constructor {
    /// Deployment payload: contract bytecode followed by the encoded arguments.
    pub fn encode_input(&self, bytecode: &[u8], tokens: &[Token]) -> Result<Vec<u8>, AbiError> {
        check_tokens(&self.inputs, tokens)?;
        let mut data = bytecode.to_vec();
        data.extend(encode(tokens));
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_type_strings() {
        let number = ParamType::Tuple(vec![ParamType::Int(128), ParamType::Int(128)]);
        let tensor = ParamType::Tuple(vec![ParamType::String, ParamType::array(number)]);
        assert_eq!(
            ParamType::array(tensor).to_string(),
            "(string,(int128,int128)[])[]"
        );
        assert_eq!(
            ParamType::FixedArray(Box::new(ParamType::FixedBytes(32)), 2).to_string(),
            "bytes32[2]"
        );
    }

    #[test]
    fn well_known_selectors() {
        let transfer = Function::new(
            "transfer",
            vec![ParamType::Address, ParamType::Uint(256)],
            vec![ParamType::Bool],
        );
        assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);

        let event = Event::new(
            "Transfer",
            vec![ParamType::Address, ParamType::Address, ParamType::Uint(256)],
        );
        assert_eq!(
            hex::encode(event.topic()),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn signed_integers_use_twos_complement() {
        assert_eq!(Token::from_i128(-1), Token::Int(U256::MAX));
        assert_eq!(Token::from_i128(-1).into_i128().unwrap(), -1);
        assert_eq!(Token::from_i128(i128::MIN).into_i128().unwrap(), i128::MIN);
        assert_eq!(Token::from_i128(i128::MAX).into_i128().unwrap(), i128::MAX);
        assert!(Token::Int(U256::from(u128::MAX)).into_i128().is_err());
    }

    #[test]
    fn type_check_rejects_mismatches() {
        let f = Function::new("f", vec![ParamType::String, ParamType::Uint(8)], vec![]);
        assert!(f
            .encode_input(&[Token::String("a".into()), Token::uint(1u8)])
            .is_ok());
        assert!(matches!(
            f.encode_input(&[Token::String("a".into())]),
            Err(AbiError::WrongArity { expected: 2, found: 1 })
        ));
        assert!(matches!(
            f.encode_input(&[Token::Bool(true), Token::uint(1u8)]),
            Err(AbiError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn tuple_destructuring_checks_arity() {
        let t = Token::Tuple(vec![Token::Bool(true)]);
        assert!(matches!(
            t.into_fixed_tuple::<2>(),
            Err(AbiError::WrongArity { expected: 2, found: 1 })
        ));
    }
}
