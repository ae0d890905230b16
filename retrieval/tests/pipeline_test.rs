//! End-to-end tests for ingestion, retrieval and generation.

use std::sync::Arc;
use std::time::Duration;

use commitrag_retrieval::config::GenerationConfig;
use commitrag_retrieval::{
    Document, Embedder, GenerationError, RagConfig, RagSystem, RetrievalError, WordVectorTable,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Deterministic 4-dimensional stub vectors.
fn stub_embedder() -> Embedder {
    let table = WordVectorTable::from_entries([
        ("the", vec![0.0, 0.0, 1.0, 0.0]),
        ("cat", vec![1.0, 0.0, 0.0, 0.0]),
        ("sat", vec![0.0, 1.0, 0.0, 0.0]),
        ("dog", vec![0.5, 0.5, 0.0, 0.0]),
        ("ran", vec![0.0, 1.0, 0.0, 0.0]),
        ("quantum", vec![0.0, 0.0, 0.0, 1.0]),
        ("entanglement", vec![0.0, 0.0, 0.0, 1.0]),
        ("physics", vec![0.0, 0.0, 0.0, 1.0]),
    ])
    .unwrap()
    .with_name("stub");
    Embedder::new(Arc::new(table)).unwrap()
}

async fn system_for(server: &MockServer) -> RagSystem {
    let config = RagConfig::default().with_generation(GenerationConfig {
        base_url: server.uri(),
        model: "test-model".to_string(),
        timeout_secs: 1,
        prompt_template: Some("Context: {context}\nQuestion: {query}".to_string()),
    });

    let rag = RagSystem::builder()
        .with_config(config)
        .with_embedder(stub_embedder())
        .build()
        .await
        .unwrap();

    rag.add_document(Document::new("A", "the cat sat")).await.unwrap();
    rag.add_document(Document::new("B", "the dog ran")).await.unwrap();
    rag.add_document(Document::new("C", "quantum entanglement physics"))
        .await
        .unwrap();
    rag
}

fn ids(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.id.as_str()).collect()
}

#[tokio::test]
async fn test_cat_query_ranks_animals_first() {
    let server = MockServer::start().await;
    let rag = system_for(&server).await;

    assert_eq!(ids(&rag.search("cat", 3).await.unwrap()), vec!["A", "B", "C"]);
    assert_eq!(ids(&rag.search("cat", 2).await.unwrap()), vec!["A", "B"]);
}

#[tokio::test]
async fn test_generate_returns_model_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "model": "test-model", "stream": false })))
        .and(body_string_contains("Question: What changed?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Fix bug" })))
        .expect(1)
        .mount(&server)
        .await;

    let rag = system_for(&server).await;
    assert_eq!(rag.generate("What changed?").await, "Fix bug");
}

#[tokio::test]
async fn test_prompt_carries_ranked_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "prompt": "Context: the cat sat the dog ran quantum entanglement physics\nQuestion: cat"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let rag = system_for(&server).await;
    assert_eq!(rag.try_generate("cat").await.unwrap(), "ok");
}

#[tokio::test]
async fn test_malformed_json_yields_empty_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let rag = system_for(&server).await;
    assert_eq!(rag.generate("What changed?").await, "");
}

#[tokio::test]
async fn test_timeout_is_distinguishable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "too late" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let rag = system_for(&server).await;
    let err = rag.try_generate("What changed?").await.unwrap_err();
    assert!(matches!(
        err,
        RetrievalError::Generation(GenerationError::Timeout(_))
    ));
}

#[tokio::test]
async fn test_empty_store_still_prompts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "prompt": "Context: \nQuestion: anything"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "" })))
        .expect(1)
        .mount(&server)
        .await;

    let rag = RagSystem::builder()
        .with_config(RagConfig::default().with_generation(GenerationConfig {
            base_url: server.uri(),
            prompt_template: Some("Context: {context}\nQuestion: {query}".to_string()),
            ..GenerationConfig::default()
        }))
        .with_embedder(stub_embedder())
        .build()
        .await
        .unwrap();

    assert!(rag.search("anything", 3).await.unwrap().is_empty());
    assert_eq!(rag.try_generate("anything").await.unwrap(), "");
}
