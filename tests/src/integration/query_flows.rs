//! # Query Flow Integration Tests
//!
//! End-to-end flows through `ContractQueryService`: wire requests in, bytes
//! or typed errors out, with real keeper and VM adapters underneath.
//!
//! ## Flows Tested:
//!
//! 1. **Metadata reads**: `bytecode`, `codeInfo`, `contractInfo`, `parameters`
//! 2. **Raw storage**: exact byte round trips, absent keys, missing contracts
//! 3. **Contract code**: the verifier scenario and contract-level rejections
//! 4. **Fault containment**: gas exhaustion and panics never escape a query

#[cfg(test)]
mod tests {
    use qc_11_contract_queries::prelude::*;
    use qc_11_contract_queries::testing::{self, TestHarness};
    use serde_json::json;
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Claims exhaustion without having spent its budget.
    struct FalseExhaustion;

    impl NativeContract for FalseExhaustion {
        fn query(&self, _env: &mut ContractEnv<'_>, _msg: &[u8]) -> Result<Bytes, VmError> {
            Err(VmError::OutOfGas(OutOfGas {
                descriptor: "x".to_string(),
                consumed: 0,
                limit: 0,
            }))
        }
    }

    fn wire(query: &Query) -> QueryRequest {
        QueryRequest::from_query(query).unwrap()
    }

    // =============================================================================
    // METADATA READS
    // =============================================================================

    #[tokio::test]
    async fn test_code_and_contract_metadata() {
        let harness = TestHarness::new();
        let addr = harness.deploy_verifier();
        let service = harness.service(QueryConfig::default());

        let info = service.contract_info(addr).await.unwrap();
        assert_eq!(info.address, addr);
        assert_eq!(info.owner, harness.creator);
        assert!(!info.migratable);
        let init: serde_json::Value = serde_json::from_slice(info.init_msg.as_slice()).unwrap();
        assert_eq!(init["verifier"], json!(testing::verifier_address()));

        let code = service.code_info(info.code_id).await.unwrap();
        assert_eq!(code.creator, harness.creator);

        let byte_code = service.byte_code(info.code_id).await.unwrap();
        assert_eq!(byte_code.as_slice(), testing::VERIFIER_CODE);
    }

    #[tokio::test]
    async fn test_metadata_responses_are_indented_json() {
        let harness = TestHarness::new();
        let service = harness.service(QueryConfig::default());

        let bz = service
            .handle_query(QueryRequest::new(endpoints::PARAMETERS, Vec::new()))
            .await
            .unwrap();
        let text = String::from_utf8(bz.into_vec()).unwrap();
        assert!(text.starts_with("{\n  \""));
        assert!(text.contains("\"max_contract_size\": 512000"));
    }

    #[tokio::test]
    async fn test_params_roundtrip() {
        let harness = TestHarness::new();
        let params = Params {
            max_contract_size: 600 * 1024,
            max_contract_gas: 1_000_000,
            max_contract_msg_size: 4096,
        };
        harness.keeper.set_params(params);

        let service = harness.service(QueryConfig::default());
        assert_eq!(service.params().await.unwrap(), params);
    }

    #[tokio::test]
    async fn test_missing_code_is_not_found() {
        let service = TestHarness::new().service(QueryConfig::default());
        let err = service.code_info(CodeId(404)).await.unwrap_err();
        assert_eq!(err, QueryError::NotFound("code 404 not found".to_string()));
    }

    // =============================================================================
    // RAW STORAGE
    // =============================================================================

    #[tokio::test]
    async fn test_raw_store_roundtrip() {
        let harness = TestHarness::new();
        let addr = harness.deploy_verifier();
        harness
            .keeper
            .set_contract_store(
                &addr,
                &[
                    Model::new(b"foo", br#""bar""#),
                    Model::new([0u8, 1], br#"{"count":8}"#),
                ],
            )
            .unwrap();
        let service = harness.service(QueryConfig::default());

        let bz = service.raw_store(addr, b"foo").await.unwrap();
        assert_eq!(bz.as_slice(), br#""bar""#);

        let bz = service.raw_store(addr, &[0, 1]).await.unwrap();
        assert_eq!(bz.as_slice(), br#"{"count":8}"#);

        // Absent key: empty bytes, not an error
        assert!(service.raw_store(addr, b"nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_raw_store_wire_format() {
        let harness = TestHarness::new();
        let addr = harness.deploy_verifier();
        harness
            .keeper
            .set_contract_store(&addr, &[Model::new(b"foo", br#""bar""#)])
            .unwrap();
        let service = harness.service(QueryConfig::default());

        // Key travels hex encoded
        let data = json!({ "contract_address": addr, "key": hex::encode(b"foo") });
        let bz = service
            .handle_query(QueryRequest::new(endpoints::RAW_STORE, data.to_string()))
            .await
            .unwrap();
        assert_eq!(bz.as_slice(), br#""bar""#);
    }

    // =============================================================================
    // CONTRACT CODE
    // =============================================================================

    #[tokio::test]
    async fn test_verifier_scenario() {
        let harness = TestHarness::new();
        let addr = harness.deploy_verifier();
        let service = harness.service(QueryConfig::default());

        let bz = service
            .handle_query(wire(&Query::contract_store(addr, json!({ "verifier": {} }))))
            .await
            .unwrap();
        let expected = format!(r#"{{"verifier":"{}"}}"#, testing::verifier_address());
        assert_eq!(String::from_utf8(bz.into_vec()).unwrap(), expected);

        let bz = service
            .contract_store(addr, json!({ "beneficiary": {} }))
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(bz.as_slice()).unwrap();
        assert_eq!(body["beneficiary"], json!(testing::beneficiary_address()));
    }

    #[tokio::test]
    async fn test_unrecognized_contract_message_fails() {
        let harness = TestHarness::new();
        let addr = harness.deploy_verifier();
        let service = harness.service(QueryConfig::default());

        let err = service
            .contract_store(addr, json!({ "raw": { "key": "config" } }))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::ContractFailed(ref msg) if msg.contains("unknown variant `raw`")
        ));
    }

    #[tokio::test]
    async fn test_unknown_endpoint() {
        let service = TestHarness::new().service(QueryConfig::default());
        let err = service
            .handle_query(QueryRequest::new("allContracts", Vec::new()))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownRequest {
                endpoint: "allContracts".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_request() {
        let service = TestHarness::new().service(QueryConfig::default());
        let err = service
            .handle_query(QueryRequest::new(endpoints::CONTRACT_STORE, b"{\"msg\":".to_vec()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "malformed_request");
    }

    // =============================================================================
    // FAULT CONTAINMENT
    // =============================================================================

    #[tokio::test]
    async fn test_out_of_gas_reports_consumption() {
        let harness = TestHarness::new();
        let addr = harness.deploy_gas_burner();
        let service = harness.service(QueryConfig::default().with_gas_limit(100_000));

        match service.contract_store(addr, json!({})).await.unwrap_err() {
            QueryError::OutOfGas {
                descriptor,
                consumed,
                limit,
            } => {
                assert_eq!(descriptor, "burn loop");
                assert_eq!(limit, 100_000);
                assert!(consumed >= limit);
            }
            other => panic!("expected OutOfGas, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_fault() {
        let harness = TestHarness::new();
        let addr = harness.deploy_panicker();
        let service = harness.service(QueryConfig::default());

        match service.contract_store(addr, json!({})).await.unwrap_err() {
            QueryError::InternalFault { message, trace } => {
                assert!(message.contains("index out of bounds"));
                // The trace points at the contract that panicked
                assert!(trace.contains("Panicker"), "trace: {trace}");
            }
            other => panic!("expected InternalFault, got {other:?}"),
        }

        let stats = service.stats().await;
        assert_eq!(stats.internal_faults, 1);
        assert_eq!(stats.failed_queries, 1);
    }

    #[tokio::test]
    async fn test_exhaustion_claim_with_gas_left_is_internal_fault() {
        let harness = TestHarness::new();
        let addr = harness.deploy(
            b"native:false-exhaustion",
            Arc::new(FalseExhaustion),
            &json!({}),
        );
        let service = harness.service(QueryConfig::default());

        let err = service.contract_store(addr, json!({})).await.unwrap_err();
        assert!(
            matches!(
                err,
                QueryError::InternalFault { ref message, .. } if message.contains("gas remaining")
            ),
            "got {err:?}"
        );
        assert_eq!(service.stats().await.out_of_gas, 0);
    }

    #[tokio::test]
    async fn test_gas_budget_is_per_top_level_query() {
        let harness = TestHarness::new();
        let addr = harness.deploy_verifier();
        // Enough for one verifier query, not for two
        let service = harness.service(QueryConfig::default().with_gas_limit(3_000));

        for _ in 0..5 {
            assert!(service
                .contract_store(addr, json!({ "verifier": {} }))
                .await
                .is_ok());
        }
    }
}
