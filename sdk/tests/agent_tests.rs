// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chat model adapter and agent tools.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{inference_contract, inference_output, MockNode, ReceiptPlan};
use sdk::error::Error;
use sdk::llm::{OgChatModel, DEFAULT_CHAT_MAX_TOKENS};
use sdk::tools::{create_read_workflow_tool, create_run_model_tool, Tool, ToolType};
use types::abi::{Token, Tokenizable};
use types::base::Address;
use types::contracts::inference_hub;
use types::inference::{ChatMessage, Llm, ToolCall};
use types::number::FixedPoint;
use types::tensor::{
    convert_to_model_input, InputTensor, ModelOutput, NumberTensor, RawModelOutput, StringTensor,
};

fn raw_output() -> RawModelOutput {
    RawModelOutput {
        numbers: vec![NumberTensor {
            name: "y".to_string(),
            values: vec![FixedPoint::new(42, 1)],
        }],
        strings: vec![StringTensor {
            name: "ignored".to_string(),
            values: vec!["x".to_string()],
        }],
        ..Default::default()
    }
}

// =============================================================================
// Chat model
// =============================================================================

#[tokio::test]
async fn test_chat_model_invoke() {
    let node = MockNode::new();
    let reply = ChatMessage {
        role: "assistant".to_string(),
        content: "Calling a tool".to_string(),
        name: "should-be-dropped".to_string(),
        tool_calls: vec![ToolCall {
            id: "1".to_string(),
            name: "lookup".to_string(),
            arguments: "{}".to_string(),
        }],
        ..Default::default()
    };
    node.push_receipt(ReceiptPlan::with_event(
        &inference_hub::llm_chat_result(),
        inference_contract(),
        vec![Token::Tuple(vec![
            Token::String("tool_calls".to_string()),
            reply.into_token(),
        ])],
    ));

    let model = OgChatModel::from_client(node.client(), Llm::MetaLlama3_1_70bInstruct, None);
    assert_eq!(model.max_tokens(), DEFAULT_CHAT_MAX_TOKENS);

    let answer = model
        .invoke(vec![
            ChatMessage::system("You are a trading assistant"),
            ChatMessage::user("Price of ETH?"),
        ])
        .await
        .unwrap();
    assert_eq!(answer.role, "assistant");
    assert_eq!(answer.content, "Calling a tool");
    assert!(answer.name.is_empty());
    assert_eq!(answer.tool_calls.len(), 1);
}

#[tokio::test]
async fn test_chat_model_propagates_missing_event() {
    let node = MockNode::new();
    node.push_receipt(ReceiptPlan::default());
    let model = OgChatModel::from_client(node.client(), Llm::MetaLlama3_1_70bInstruct, Some(10));

    let err = model.invoke(vec![ChatMessage::user("hi")]).await.unwrap_err();
    assert!(matches!(err, Error::EventNotFound { .. }), "{err}");
}

// =============================================================================
// Tools
// =============================================================================

#[tokio::test]
async fn test_run_model_tool_wraps_numbers() {
    let node = MockNode::new();
    node.push_receipt(ReceiptPlan::with_event(
        &inference_hub::inference_result(),
        inference_contract(),
        vec![inference_output(raw_output().numbers)],
    ));

    let tool = create_run_model_tool(
        ToolType::Swarm,
        "QmVolatility",
        "volatility",
        Arc::new(|| {
            convert_to_model_input(vec![("prices", InputTensor::from(vec![1.0, 2.0]))]).unwrap()
        }),
        None,
        None,
    )
    .with_client(node.client());
    assert_eq!(tool.tool_type(), ToolType::Swarm);

    let formatted = tool.invoke(serde_json::Value::Null).await.unwrap();
    let output: ModelOutput = serde_json::from_str(&formatted).unwrap();
    assert_eq!(output.numbers, BTreeMap::from([("y".to_string(), vec![4.2])]));
    assert!(output.strings.is_empty());
    assert!(output.jsons.is_empty());
    assert!(!output.is_simulation_result);
}

#[tokio::test]
async fn test_read_workflow_tool_uses_formatter() {
    let node = MockNode::new();
    node.push_call_response(vec![raw_output().into_token()]);

    let tool = create_read_workflow_tool(
        ToolType::Langchain,
        Address::repeat_byte(0xd0),
        "eth_forecast",
        "Latest ETH forecast",
        Some(Arc::new(|output: &ModelOutput| {
            format!("forecast: {}", output.numbers["y"][0])
        })),
    )
    .with_client(node.client());

    assert_eq!(tool.name(), "eth_forecast");
    assert_eq!(tool.definition().description, "Latest ETH forecast");
    assert_eq!(
        tool.invoke(serde_json::Value::Null).await.unwrap(),
        "forecast: 4.2"
    );
}

#[tokio::test]
async fn test_tool_without_private_key() {
    std::env::remove_var(types::config::OG_PRIVATE_KEY_ENV);
    let tool = create_read_workflow_tool(
        ToolType::Langchain,
        Address::repeat_byte(0xd0),
        "eth_forecast",
        "Latest ETH forecast",
        None,
    );
    let err = tool.invoke(serde_json::Value::Null).await.unwrap_err();
    assert!(matches!(err, Error::MissingEnvVar(ref var) if var == "OG_PRIVATE_KEY"), "{err}");
}
