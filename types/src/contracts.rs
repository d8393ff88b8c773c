// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! ABI fragments of the deployed OpenGradient contracts.

use crate::abi::{Constructor, Event, Function, ParamType};
use crate::inference::{chat_response_type, completion_response_type, LlmChatRequest, LlmCompletionRequest};
use crate::tensor::{model_input_type, model_output_type, number_tensor_type};
use crate::workflow::HistoricalInputQuery;

pub mod inference_hub {
    use super::*;

    /// `run(string modelId, uint8 inferenceMode, ModelInput modelInput) returns (ModelOutput)`
    pub fn run() -> Function {
        Function::new(
            "run",
            vec![ParamType::String, ParamType::Uint(8), model_input_type()],
            vec![inference_output_type()],
        )
    }

    /// `InferenceResult(ModelOutput output)`. The emitted output carries only
    /// the number tensors.
    pub fn inference_result() -> Event {
        Event::new("InferenceResult", vec![inference_output_type()])
    }

    /// `(NumberTensor[] numbers)`
    pub fn inference_output_type() -> ParamType {
        ParamType::Tuple(vec![ParamType::array(number_tensor_type())])
    }

    pub fn run_llm_chat() -> Function {
        Function::new(
            "runLLMChat",
            vec![LlmChatRequest::abi_type()],
            vec![chat_response_type()],
        )
    }

    pub fn llm_chat_result() -> Event {
        Event::new("LLMChatResult", vec![chat_response_type()])
    }

    pub fn run_llm_completion() -> Function {
        Function::new(
            "runLLMCompletion",
            vec![LlmCompletionRequest::abi_type()],
            vec![completion_response_type()],
        )
    }

    pub fn llm_completion_result() -> Event {
        Event::new("LLMCompletionResult", vec![completion_response_type()])
    }
}

pub mod price_history_inference {
    use super::*;

    /// `constructor(string modelId, string inputName, HistoricalInputQuery query)`
    pub fn constructor() -> Constructor {
        Constructor {
            inputs: vec![ParamType::String, ParamType::String, HistoricalInputQuery::abi_type()],
        }
    }

    pub fn get_inference_result() -> Function {
        Function::new("getInferenceResult", vec![], vec![model_output_type()])
    }

    pub fn get_last_inference_results() -> Function {
        Function::new(
            "getLastInferenceResults",
            vec![ParamType::Uint(256)],
            vec![ParamType::array(model_output_type())],
        )
    }
}

pub mod workflow_scheduler {
    use super::*;

    /// `registerTask(address contractAddress, uint256 endTime, uint256 frequency)`
    pub fn register_task() -> Function {
        Function::new(
            "registerTask",
            vec![ParamType::Address, ParamType::Uint(256), ParamType::Uint(256)],
            vec![],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signatures_are_canonical() {
        assert_eq!(
            inference_hub::run().signature(),
            "run(string,uint8,((string,(int128,int128)[])[],(string,string[])[]))"
        );
        assert_eq!(
            inference_hub::inference_result().signature(),
            "InferenceResult(((string,(int128,int128)[])[]))"
        );
        assert_eq!(
            inference_hub::llm_completion_result().signature(),
            "LLMCompletionResult((string))"
        );
        assert_eq!(
            workflow_scheduler::register_task().signature(),
            "registerTask(address,uint256,uint256)"
        );
        assert_eq!(
            price_history_inference::get_last_inference_results().signature(),
            "getLastInferenceResults(uint256)"
        );
    }

    #[test]
    fn inference_result_carries_number_tensors_only() {
        use crate::abi::{encode, Token, Tokenizable};
        use crate::tensor::NumberTensor;

        let numbers = vec![NumberTensor::from_f64s("y", &[0.5]).unwrap()];
        let data = encode(&[Token::Tuple(vec![numbers.clone().into_token()])]);
        let event = inference_hub::inference_result();
        let [output] = <[Token; 1]>::try_from(event.decode_data(&data).unwrap()).unwrap();
        let [decoded] = output.into_fixed_tuple::<1>().unwrap();
        assert_eq!(Vec::<NumberTensor>::from_token(decoded).unwrap(), numbers);
        assert_ne!(
            event.topic(),
            Event::new("InferenceResult", vec![model_output_type()]).topic()
        );
    }

    #[test]
    fn selectors_are_distinct() {
        let selectors = [
            inference_hub::run().selector(),
            inference_hub::run_llm_chat().selector(),
            inference_hub::run_llm_completion().selector(),
            price_history_inference::get_inference_result().selector(),
            price_history_inference::get_last_inference_results().selector(),
            workflow_scheduler::register_task().selector(),
        ];
        for (i, a) in selectors.iter().enumerate() {
            for b in &selectors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
