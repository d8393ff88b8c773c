// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! Named tensors exchanged with models running on the network.
//!
//! Inputs are sent as lists of number tensors (fixed-point) and string
//! tensors. Outputs come back with a third kind, JSON tensors, whose payload
//! is a JSON document encoded as a string.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::abi::{ParamType, Token, Tokenizable};
use crate::error::{AbiError, TensorError};
use crate::number::FixedPoint;

pub fn number_type() -> ParamType {
    ParamType::Tuple(vec![ParamType::Int(128), ParamType::Int(128)])
}

pub fn number_tensor_type() -> ParamType {
    ParamType::Tuple(vec![ParamType::String, ParamType::array(number_type())])
}

pub fn string_tensor_type() -> ParamType {
    ParamType::Tuple(vec![ParamType::String, ParamType::array(ParamType::String)])
}

pub fn json_tensor_type() -> ParamType {
    ParamType::Tuple(vec![ParamType::String, ParamType::String])
}

pub fn model_input_type() -> ParamType {
    ParamType::Tuple(vec![
        ParamType::array(number_tensor_type()),
        ParamType::array(string_tensor_type()),
    ])
}

pub fn model_output_type() -> ParamType {
    ParamType::Tuple(vec![
        ParamType::array(number_tensor_type()),
        ParamType::array(string_tensor_type()),
        ParamType::array(json_tensor_type()),
        ParamType::Bool,
    ])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberTensor {
    pub name: String,
    pub values: Vec<FixedPoint>,
}

impl NumberTensor {
    /// Encode floats with the default decimal shift.
    pub fn from_f64s(name: impl Into<String>, values: &[f64]) -> Result<Self, TensorError> {
        Ok(Self {
            name: name.into(),
            values: values
                .iter()
                .map(|v| FixedPoint::from_f64(*v))
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn decode(&self) -> Result<Vec<f64>, TensorError> {
        self.values.iter().map(FixedPoint::decode).collect()
    }
}

impl Tokenizable for NumberTensor {
    fn into_token(self) -> Token {
        Token::Tuple(vec![Token::String(self.name), self.values.into_token()])
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        let [name, values] = token.into_fixed_tuple::<2>()?;
        Ok(Self {
            name: name.into_string()?,
            values: Vec::from_token(values)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringTensor {
    pub name: String,
    pub values: Vec<String>,
}

impl Tokenizable for StringTensor {
    fn into_token(self) -> Token {
        Token::Tuple(vec![Token::String(self.name), self.values.into_token()])
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        let [name, values] = token.into_fixed_tuple::<2>()?;
        Ok(Self {
            name: name.into_string()?,
            values: Vec::from_token(values)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonTensor {
    pub name: String,
    pub value: String,
}

impl Tokenizable for JsonTensor {
    fn into_token(self) -> Token {
        Token::Tuple(vec![Token::String(self.name), Token::String(self.value)])
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        let [name, value] = token.into_fixed_tuple::<2>()?;
        Ok(Self {
            name: name.into_string()?,
            value: value.into_string()?,
        })
    }
}

/// A caller-provided input column before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum InputTensor {
    Numbers(Vec<f64>),
    Strings(Vec<String>),
}

impl From<Vec<f64>> for InputTensor {
    fn from(values: Vec<f64>) -> Self {
        InputTensor::Numbers(values)
    }
}

impl From<Vec<String>> for InputTensor {
    fn from(values: Vec<String>) -> Self {
        InputTensor::Strings(values)
    }
}

impl From<Vec<&str>> for InputTensor {
    fn from(values: Vec<&str>) -> Self {
        InputTensor::Strings(values.into_iter().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelInput {
    pub numbers: Vec<NumberTensor>,
    pub strings: Vec<StringTensor>,
}

impl ModelInput {
    /// Build from a JSON object of arrays.
    ///
    /// An array whose first element is a number is a number tensor; any
    /// other array, including an empty one, is a string tensor.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TensorError> {
        let object = value
            .as_object()
            .ok_or_else(|| TensorError::InvalidInput("expected a JSON object".to_string()))?;

        let mut inputs = Vec::with_capacity(object.len());
        for (name, column) in object {
            let items = column.as_array().ok_or_else(|| {
                TensorError::InvalidInput(format!("tensor [{name}] is not an array"))
            })?;
            let tensor = if items.first().is_some_and(serde_json::Value::is_number) {
                let values = items
                    .iter()
                    .map(|v| {
                        v.as_f64().ok_or_else(|| {
                            TensorError::InvalidInput(format!(
                                "tensor [{name}] mixes numbers with {v}"
                            ))
                        })
                    })
                    .collect::<Result<_, _>>()?;
                InputTensor::Numbers(values)
            } else {
                let values = items
                    .iter()
                    .map(|v| {
                        v.as_str().map(str::to_string).ok_or_else(|| {
                            TensorError::InvalidInput(format!(
                                "tensor [{name}] mixes strings with {v}"
                            ))
                        })
                    })
                    .collect::<Result<_, _>>()?;
                InputTensor::Strings(values)
            };
            inputs.push((name.clone(), tensor));
        }

        convert_to_model_input(inputs)
    }
}

impl Tokenizable for ModelInput {
    fn into_token(self) -> Token {
        Token::Tuple(vec![self.numbers.into_token(), self.strings.into_token()])
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        let [numbers, strings] = token.into_fixed_tuple::<2>()?;
        Ok(Self {
            numbers: Vec::from_token(numbers)?,
            strings: Vec::from_token(strings)?,
        })
    }
}

/// Encode named columns into a [`ModelInput`], keeping their order.
pub fn convert_to_model_input<N, I>(inputs: I) -> Result<ModelInput, TensorError>
where
    N: Into<String>,
    I: IntoIterator<Item = (N, InputTensor)>,
{
    let mut model_input = ModelInput::default();
    for (name, tensor) in inputs {
        match tensor {
            InputTensor::Numbers(values) => {
                model_input.numbers.push(NumberTensor::from_f64s(name, &values)?)
            }
            InputTensor::Strings(values) => model_input.strings.push(StringTensor {
                name: name.into(),
                values,
            }),
        }
    }
    Ok(model_input)
}

/// The model output tuple exactly as emitted by the contracts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawModelOutput {
    pub numbers: Vec<NumberTensor>,
    pub strings: Vec<StringTensor>,
    pub jsons: Vec<JsonTensor>,
    pub is_simulation_result: bool,
}

impl RawModelOutput {
    pub fn decode(&self) -> Result<ModelOutput, TensorError> {
        Ok(ModelOutput {
            numbers: parse_number_tensors(&self.numbers)?,
            strings: parse_string_tensors(&self.strings),
            jsons: parse_json_tensors(&self.jsons)?,
            is_simulation_result: self.is_simulation_result,
        })
    }
}

impl Tokenizable for RawModelOutput {
    fn into_token(self) -> Token {
        Token::Tuple(vec![
            self.numbers.into_token(),
            self.strings.into_token(),
            self.jsons.into_token(),
            Token::Bool(self.is_simulation_result),
        ])
    }

    fn from_token(token: Token) -> Result<Self, AbiError> {
        let [numbers, strings, jsons, is_simulation_result] = token.into_fixed_tuple::<4>()?;
        Ok(Self {
            numbers: Vec::from_token(numbers)?,
            strings: Vec::from_token(strings)?,
            jsons: Vec::from_token(jsons)?,
            is_simulation_result: is_simulation_result.into_bool()?,
        })
    }
}

/// Decoded model output keyed by tensor name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOutput {
    pub numbers: BTreeMap<String, Vec<f64>>,
    pub strings: BTreeMap<String, Vec<String>>,
    pub jsons: BTreeMap<String, serde_json::Value>,
    pub is_simulation_result: bool,
}

pub fn parse_number_tensors(
    tensors: &[NumberTensor],
) -> Result<BTreeMap<String, Vec<f64>>, TensorError> {
    let mut out = BTreeMap::new();
    for tensor in tensors {
        out.insert(tensor.name.clone(), tensor.decode()?);
    }
    Ok(out)
}

pub fn parse_string_tensors(tensors: &[StringTensor]) -> BTreeMap<String, Vec<String>> {
    tensors
        .iter()
        .map(|t| (t.name.clone(), t.values.clone()))
        .collect()
}

pub fn parse_json_tensors(
    tensors: &[JsonTensor],
) -> Result<BTreeMap<String, serde_json::Value>, TensorError> {
    let mut out = BTreeMap::new();
    for tensor in tensors {
        let value = serde_json::from_str(&tensor.value).map_err(|e| TensorError::InvalidJson {
            name: tensor.name.clone(),
            reason: e.to_string(),
        })?;
        out.insert(tensor.name.clone(), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{decode, encode};
    use serde_json::json;

    #[test]
    fn converts_named_columns_in_order() {
        let input = convert_to_model_input(vec![
            ("open", InputTensor::from(vec![1.25, -0.5])),
            ("symbol", InputTensor::from(vec!["ETH", "USDT"])),
            ("close", InputTensor::from(vec![2.0])),
        ])
        .unwrap();

        assert_eq!(
            input.numbers,
            vec![
                NumberTensor {
                    name: "open".into(),
                    values: vec![FixedPoint::new(1_250_000, 6), FixedPoint::new(-500_000, 6)],
                },
                NumberTensor {
                    name: "close".into(),
                    values: vec![FixedPoint::new(2_000_000, 6)],
                },
            ]
        );
        assert_eq!(input.strings[0].values, vec!["ETH", "USDT"]);
    }

    #[test]
    fn from_json_classifies_by_first_element() {
        let input = ModelInput::from_json(&json!({
            "prices": [3.5, 4],
            "tags": ["a"],
            "empty": [],
        }))
        .unwrap();
        assert_eq!(input.numbers.len(), 1);
        assert_eq!(input.numbers[0].name, "prices");
        assert_eq!(input.numbers[0].values[1], FixedPoint::new(4_000_000, 6));
        let names: Vec<_> = input.strings.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["tags", "empty"]);
    }

    #[test]
    fn from_json_keeps_caller_key_order() {
        let input: serde_json::Value =
            serde_json::from_str(r#"{"zeta": [1.0], "alpha": [2.0], "mid": ["x"], "beta": [3]}"#)
                .unwrap();
        let input = ModelInput::from_json(&input).unwrap();
        let names: Vec<_> = input.numbers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "beta"]);
        assert_eq!(input.strings[0].name, "mid");
    }

    #[test]
    fn from_json_rejects_mixed_and_non_array() {
        assert!(ModelInput::from_json(&json!({"x": [1, "a"]})).is_err());
        assert!(ModelInput::from_json(&json!({"x": ["a", 1]})).is_err());
        assert!(ModelInput::from_json(&json!({"x": 1})).is_err());
        assert!(ModelInput::from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let err = convert_to_model_input(vec![("x", InputTensor::Numbers(vec![f64::NAN]))]);
        assert!(matches!(err, Err(TensorError::NonFinite(_))));
    }

    #[test]
    fn raw_output_decodes_every_tensor_kind() {
        let raw = RawModelOutput {
            numbers: vec![
                NumberTensor {
                    name: "y".into(),
                    values: vec![FixedPoint::new(12345, 2), FixedPoint::new(-1, 0)],
                },
                NumberTensor {
                    name: "y".into(),
                    values: vec![FixedPoint::new(7, 1)],
                },
            ],
            strings: vec![StringTensor {
                name: "label".into(),
                values: vec!["up".into()],
            }],
            jsons: vec![JsonTensor {
                name: "meta".into(),
                value: r#"{"confidence": 0.9}"#.into(),
            }],
            is_simulation_result: true,
        };

        let output = raw.decode().unwrap();
        // later tensors with the same name win
        assert_eq!(output.numbers["y"], vec![0.7]);
        assert_eq!(output.strings["label"], vec!["up"]);
        assert_eq!(output.jsons["meta"], json!({"confidence": 0.9}));
        assert!(output.is_simulation_result);

        let serialized = serde_json::to_value(&output).unwrap();
        assert_eq!(serialized["isSimulationResult"], json!(true));
    }

    #[test]
    fn invalid_json_tensor_names_the_tensor() {
        let raw = RawModelOutput {
            jsons: vec![JsonTensor {
                name: "broken".into(),
                value: "{not json".into(),
            }],
            ..Default::default()
        };
        match raw.decode() {
            Err(TensorError::InvalidJson { name, .. }) => assert_eq!(name, "broken"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn model_output_travels_through_the_abi() {
        let raw = RawModelOutput {
            numbers: vec![NumberTensor::from_f64s("p", &[0.25]).unwrap()],
            strings: vec![],
            jsons: vec![JsonTensor {
                name: "j".into(),
                value: "[1,2]".into(),
            }],
            is_simulation_result: false,
        };
        let token = raw.clone().into_token();
        assert!(token.type_check(&model_output_type()));
        let decoded = decode(&[model_output_type()], &encode(&[token])).unwrap();
        let back = RawModelOutput::from_token(decoded.into_iter().next().unwrap()).unwrap();
        assert_eq!(back, raw);
    }
}
