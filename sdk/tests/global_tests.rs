// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! The process-wide default client. Kept in its own test binary so no other
//! test observes the installed client.

mod common;

use std::sync::Arc;

use common::{inference_contract, inference_output, MockNode, ReceiptPlan};
use sdk::error::Error;
use sdk::global;
use types::abi::{Token, Tokenizable};
use types::contracts::inference_hub;
use types::inference::{ChatMessage, InferenceMode, Llm, LlmChatRequest};
use types::tensor::ModelInput;

#[tokio::test]
async fn test_global_client_lifecycle() {
    let err = global::infer("QmModel", InferenceMode::Vanilla, ModelInput::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotInitialized), "{err}");
    assert!(matches!(global::default_client(), Err(Error::NotInitialized)));

    let node = MockNode::new();
    global::set_default_client(Arc::new(node.client()));

    node.push_receipt(ReceiptPlan::with_event(
        &inference_hub::inference_result(),
        inference_contract(),
        vec![inference_output(vec![])],
    ));
    let result = global::infer("QmModel", InferenceMode::Vanilla, ModelInput::default(), None)
        .await
        .unwrap();
    assert!(result.model_output.is_empty());

    node.push_receipt(ReceiptPlan::with_event(
        &inference_hub::llm_chat_result(),
        inference_contract(),
        vec![Token::Tuple(vec![
            Token::String("stop".to_string()),
            ChatMessage::assistant("hello").into_token(),
        ])],
    ));
    let output = global::llm_chat(
        LlmChatRequest::new(Llm::Qwen2_5_72bInstruct, vec![ChatMessage::user("hi")]),
        None,
    )
    .await
    .unwrap();
    assert_eq!(output.chat_output.unwrap().content, "hello");
    assert_eq!(node.sent().len(), 2);
}

#[test]
fn test_init_rejects_bad_key() {
    let err = global::init("not-a-key", None, None).unwrap_err();
    assert!(matches!(err, Error::KeyError(_)), "{err}");
}
