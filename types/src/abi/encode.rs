// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use ethereum_types::U256;

use super::{Token, WORD};

/// Encode `tokens` as the components of one tuple.
pub fn encode(tokens: &[Token]) -> Vec<u8> {
    let head_len: usize = tokens.iter().map(head_size).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        if token.is_dynamic() {
            head.extend_from_slice(&uint_word(U256::from(head_len + tail.len())));
            tail.extend(encode_token(token));
        } else {
            head.extend(encode_token(token));
        }
    }

    head.extend(tail);
    head
}

fn head_size(token: &Token) -> usize {
    if token.is_dynamic() {
        return WORD;
    }
    match token {
        Token::FixedArray(tokens) | Token::Tuple(tokens) => tokens.iter().map(head_size).sum(),
        _ => WORD,
    }
}

/// Inline bytes of a static token, or the tail of a dynamic one.
fn encode_token(token: &Token) -> Vec<u8> {
    match token {
        Token::Address(address) => {
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(address.as_bytes());
            word.to_vec()
        }
        Token::Bool(b) => uint_word(U256::from(*b as u8)).to_vec(),
        Token::Int(v) | Token::Uint(v) => uint_word(*v).to_vec(),
        Token::String(s) => encode_bytes(s.as_bytes()),
        Token::Bytes(b) => encode_bytes(b),
        Token::FixedBytes(b) => pad_right(b),
        Token::Array(tokens) => {
            let mut out = uint_word(U256::from(tokens.len())).to_vec();
            out.extend(encode(tokens));
            out
        }
        Token::FixedArray(tokens) | Token::Tuple(tokens) => encode(tokens),
    }
}

fn uint_word(v: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    v.to_big_endian(&mut word);
    word
}

fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = uint_word(U256::from(bytes.len())).to_vec();
    out.extend(pad_right(bytes));
    out
}

fn pad_right(bytes: &[u8]) -> Vec<u8> {
    let padded_len = bytes.len().div_ceil(WORD) * WORD;
    let mut out = bytes.to_vec();
    out.resize(padded_len, 0);
    out
}
