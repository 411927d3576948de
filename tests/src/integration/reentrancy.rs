//! # Reentrancy Integration Tests
//!
//! Nested queries issued by running contract code, and slot allocation
//! under concurrent top-level queries.
//!
//! ## Properties Tested:
//!
//! 1. A nested query runs on its caller's VM slot and sees itself reentrant
//! 2. Only top-level queries advance the slot counter
//! 3. Nested frames draw from the caller's gas budget
//! 4. Concurrent top-level queries receive distinct slots

#[cfg(test)]
mod tests {
    use qc_11_contract_queries::prelude::*;
    use qc_11_contract_queries::testing::TestHarness;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn forward(to: Address, msg: serde_json::Value) -> serde_json::Value {
        json!({ "forward": { "contract": to, "msg": msg } })
    }

    #[tokio::test]
    async fn test_nested_query_shares_slot() {
        let harness = TestHarness::new();
        let probe = harness.deploy_probe();
        let proxy = harness.deploy_proxy();
        let service = harness.service(QueryConfig::default());

        let bz = service
            .contract_store(proxy, forward(probe, json!({})))
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(bz.as_slice()).unwrap();

        assert_eq!(body["reentrant"], json!(false));
        assert_eq!(body["inner"]["reentrant"], json!(true));
        assert_eq!(body["vm_slot"], body["inner"]["vm_slot"]);
    }

    #[tokio::test]
    async fn test_nested_queries_do_not_advance_slot_counter() {
        let harness = TestHarness::new();
        let probe = harness.deploy_probe();
        let proxy = harness.deploy_proxy();
        let service = harness.service(QueryConfig::default());

        // Two levels of nesting, then a plain top-level query
        let msg = forward(proxy, forward(probe, json!({})));
        let bz = service.contract_store(proxy, msg).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(bz.as_slice()).unwrap();
        assert_eq!(body["vm_slot"], json!(0));
        assert_eq!(body["inner"]["vm_slot"], json!(0));
        assert_eq!(body["inner"]["inner"]["vm_slot"], json!(0));
        assert_eq!(body["inner"]["inner"]["reentrant"], json!(true));

        let bz = service.contract_store(probe, json!({})).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(bz.as_slice()).unwrap();
        assert_eq!(body["vm_slot"], json!(1));
    }

    #[tokio::test]
    async fn test_nested_exhaustion_is_out_of_gas() {
        let harness = TestHarness::new();
        let burner = harness.deploy_gas_burner();
        let proxy = harness.deploy_proxy();
        let service = harness.service(QueryConfig::default().with_gas_limit(200_000));

        let err = service
            .contract_store(proxy, forward(burner, json!({})))
            .await
            .unwrap_err();
        match err {
            QueryError::OutOfGas { consumed, limit, .. } => {
                assert_eq!(limit, 200_000);
                assert!(consumed >= limit);
            }
            other => panic!("expected OutOfGas, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nested_panic_is_contained() {
        let harness = TestHarness::new();
        let panicker = harness.deploy_panicker();
        let proxy = harness.deploy_proxy();
        let service = harness.service(QueryConfig::default());

        // The inner fault surfaces to the proxy, which fails its own query
        let err = service
            .contract_store(proxy, forward(panicker, json!({})))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::ContractFailed(ref msg) if msg.contains("internal fault")
        ));
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let harness = TestHarness::new();
        let probe = harness.deploy_probe();
        let proxy = harness.deploy_proxy();
        let service = harness.service(QueryConfig::default().with_max_query_depth(2));

        assert!(service
            .contract_store(proxy, forward(probe, json!({})))
            .await
            .is_ok());

        let err = service
            .contract_store(proxy, forward(proxy, forward(probe, json!({}))))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::ContractFailed(ref msg) if msg.contains("query depth exceeded: 3 > 2")
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_top_level_queries_get_distinct_slots() {
        let harness = TestHarness::new();
        let probe = harness.deploy_probe();
        let service = Arc::new(harness.service(QueryConfig::default()));

        let handles: Vec<_> = (0..DEFAULT_VM_POOL_SIZE)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.contract_store(probe, json!({})).await })
            })
            .collect();

        let mut slots = HashSet::new();
        for handle in handles {
            let bz = handle.await.unwrap().unwrap();
            let body: serde_json::Value = serde_json::from_slice(bz.as_slice()).unwrap();
            slots.insert(body["vm_slot"].as_u64().unwrap());
        }
        // A full rotation hands out every slot exactly once
        assert_eq!(slots.len(), DEFAULT_VM_POOL_SIZE);
        for slot in 0..DEFAULT_VM_POOL_SIZE {
            assert_eq!(harness.vm.slot_invocations(VmSlot(slot)), 1);
        }
    }

    #[test]
    fn test_slot_counter_wraps() {
        let tracker = ReentrancyTracker::default();
        let slots: Vec<_> = (0..DEFAULT_VM_POOL_SIZE + 2)
            .map(|_| tracker.prepare(None, 0).vm_slot())
            .collect();
        assert_eq!(slots[DEFAULT_VM_POOL_SIZE - 1], VmSlot(127));
        assert_eq!(slots[DEFAULT_VM_POOL_SIZE], VmSlot(0));
        assert_eq!(slots[DEFAULT_VM_POOL_SIZE + 1], VmSlot(1));
    }
}
