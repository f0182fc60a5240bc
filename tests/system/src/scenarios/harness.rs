//! The harness against the in-process fake network.
//!
//! These run over real HTTP with real timing, so they exercise the client,
//! the poller and the assertions end to end without a deployed network.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use systest_client::cli::wp_errors;
    use systest_client::{
        converged_within, run_graph_cases, AllocationRequest, BlobberUpdate, ClientError,
        GraphEndpoint, HttpTransport, NetworkClient, OpsError, WaitError,
    };
    use systest_core::expected::{
        expected_allocated, expected_avg_write_price, expected_saved_data, total_capacity,
        write_pool_split, WRITE_PRICE_TOLERANCE,
    };
    use systest_core::{KnownDivergence, Trend};
    use systest_types::tokens::ZCN;
    use systest_types::{
        AllocationId, BlobberGraphMetric, BlobberId, GraphMetric, ProviderType, TotalMetric,
        WritePoolInfo,
    };

    use crate::assertions::{assert_aggregate, assert_cases_passed, assert_known_divergence};
    use crate::context::{ContextError, TestContext};
    use crate::fake::{FakeNetwork, FakeServer};
    use crate::logging;

    struct Fixture {
        net: FakeNetwork,
        ctx: TestContext,
        _server: FakeServer,
    }

    async fn fixture(blobbers: usize) -> Fixture {
        logging::init();
        let net = FakeNetwork::new();
        net.seed_blobbers(blobbers);
        let server = net.serve().await.expect("fake network should start");
        let config = server.config();
        let transport = HttpTransport::new(
            config.network.service_urls(),
            config.network.request_timeout(),
        )
        .unwrap();
        let ctx = TestContext::new(config, NetworkClient::new(transport), Arc::new(net.ops()));
        Fixture {
            net,
            ctx,
            _server: server,
        }
    }

    async fn funded_wallet(ctx: &TestContext, wallet: &str, amount: i64) {
        ctx.ops.register_wallet(wallet).await.unwrap();
        let baseline = ctx.ops.balance(wallet).await.unwrap();
        ctx.ops.faucet(wallet, amount).await.unwrap();
        ctx.wait_for_balance(wallet, baseline, Trend::ChangesBy(amount))
            .await
            .expect("faucet should land");
    }

    #[tokio::test]
    async fn every_graph_endpoint_passes_parameter_cases() {
        let f = fixture(2).await;
        let blobber = f.net.blobbers()[0].id.to_string();
        let latest = f.ctx.client.latest_round().await.unwrap();
        assert_eq!(latest, 1_000);

        let mut endpoints: Vec<GraphEndpoint> = GraphMetric::ALL
            .iter()
            .copied()
            .map(GraphEndpoint::Network)
            .collect();
        endpoints.push(GraphEndpoint::Challenges);
        endpoints.extend(
            BlobberGraphMetric::ALL
                .iter()
                .map(|m| GraphEndpoint::Blobber(*m, blobber.clone())),
        );

        let mut reports = Vec::new();
        for endpoint in &endpoints {
            reports.extend(run_graph_cases(&f.ctx.client, endpoint, latest).await);
        }

        let result = assert_cases_passed(&reports);
        assert!(result.passed, "{:?}", result.failure_details);
        assert_eq!(
            reports.len(),
            (GraphMetric::ALL.len() + 1) * 7 + BlobberGraphMetric::ALL.len() * 7
        );
    }

    #[tokio::test]
    async fn totals_match_values_recomputed_from_paginated_blobbers() {
        let f = fixture(25).await;
        let blobbers = f.ctx.client.all_blobbers().await.unwrap();
        assert_eq!(blobbers.len(), 25);

        let checks = [
            (
                TotalMetric::AverageWritePrice,
                expected_avg_write_price(&blobbers),
                WRITE_PRICE_TOLERANCE,
            ),
            (TotalMetric::TotalAllocatedStorage, expected_allocated(&blobbers), 0),
            (TotalMetric::TotalStoredData, expected_saved_data(&blobbers), 0),
            (TotalMetric::TotalBlobberCapacity, total_capacity(&blobbers), 0),
        ];
        for (metric, expected, tolerance) in checks {
            let actual = f.ctx.client.total(metric).await.unwrap();
            let result = assert_aggregate(metric.slug(), expected, actual, tolerance);
            assert!(result.passed, "{:?}", result.failure_details);
        }
    }

    #[tokio::test]
    async fn stake_converges_on_total_and_graph() {
        let f = fixture(2).await;
        funded_wallet(&f.ctx, "delegate", 10 * ZCN).await;
        let blobber = f.net.blobbers()[0].id.to_string();

        let baseline = f.ctx.client.total(TotalMetric::TotalStaked).await.unwrap();
        let graph_baseline = f
            .ctx
            .latest_graph_value(GraphMetric::TotalStaked)
            .await
            .unwrap();
        assert_eq!(baseline, graph_baseline);

        f.ctx
            .ops
            .stake("delegate", ProviderType::Blobber, &blobber, 5 * ZCN)
            .await
            .unwrap();

        let converged = f
            .ctx
            .wait_for_total(TotalMetric::TotalStaked, baseline, Trend::ChangesBy(5 * ZCN))
            .await
            .expect("stake should land");
        assert_eq!(converged.value, baseline + 5 * ZCN);
        assert!(converged.attempts > 1, "write lands after a delay");

        let on_graph = f
            .ctx
            .wait_for_graph(GraphMetric::TotalStaked, graph_baseline, Trend::Increases)
            .await
            .unwrap();
        assert_eq!(on_graph.attempts, 1);
        assert_eq!(on_graph.value, converged.value);
    }

    #[tokio::test]
    async fn write_that_never_lands_times_out() {
        let mut f = fixture(1).await;
        funded_wallet(&f.ctx, "delegate", 10 * ZCN).await;
        f.ctx.config.poll.timeout_secs = 1;
        f.net.set_drop_writes(true);

        let blobber = f.net.blobbers()[0].id.to_string();
        let baseline = f.ctx.client.total(TotalMetric::TotalStaked).await.unwrap();
        f.ctx
            .ops
            .stake("delegate", ProviderType::Blobber, &blobber, ZCN)
            .await
            .unwrap();

        let start = Instant::now();
        let err = f
            .ctx
            .wait_for_total(TotalMetric::TotalStaked, baseline, Trend::ChangesBy(ZCN))
            .await
            .unwrap_err();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_secs(1));
        assert!(elapsed < Duration::from_secs(3));
        match err {
            WaitError::Timeout {
                attempts,
                last_observed,
                ..
            } => {
                assert!(attempts > 1);
                assert_eq!(last_observed, Some(baseline));
            }
            other => panic!("expected timeout, got {}", other),
        }
    }

    #[tokio::test]
    async fn blobber_capacity_graph_follows_update_and_revert() {
        let f = fixture(1).await;
        let blobber = f.net.blobbers()[0].clone();
        let capacity = blobber.capacity + 1024 * 1024 * 1024;
        let update = |capacity| BlobberUpdate {
            capacity: Some(capacity),
            ..Default::default()
        };

        let baseline = f
            .ctx
            .latest_blobber_graph_value(BlobberGraphMetric::Capacity, blobber.id.as_str())
            .await
            .unwrap();
        assert_eq!(baseline, blobber.capacity);

        f.ctx
            .ops
            .update_blobber("blobber-owner", &blobber.id, &update(capacity))
            .await
            .unwrap();
        let increased = f
            .ctx
            .wait_for_blobber_graph(
                BlobberGraphMetric::Capacity,
                blobber.id.as_str(),
                baseline,
                Trend::Increases,
            )
            .await
            .expect("capacity graph should increase");
        assert_eq!(increased.value, capacity);
        assert!(increased.attempts > 1, "graph lags the write");

        let settled = f
            .ctx
            .wait_for_blobber(blobber.id.as_str(), |b| b.capacity == capacity)
            .await
            .unwrap();
        assert_eq!(settled.value.terms, blobber.terms);

        f.ctx
            .ops
            .update_blobber("blobber-owner", &blobber.id, &update(blobber.capacity))
            .await
            .unwrap();
        f.ctx
            .wait_for_blobber_graph(
                BlobberGraphMetric::Capacity,
                blobber.id.as_str(),
                increased.value,
                Trend::Decreases,
            )
            .await
            .expect("capacity graph should drop back");
    }

    #[tokio::test]
    async fn unknown_blobber_is_fatal_on_first_attempt() {
        let f = fixture(1).await;
        let missing = BlobberId::random();

        let err = f
            .ctx
            .wait_for_blobber(missing.as_str(), |_| true)
            .await
            .unwrap_err();
        match err {
            WaitError::Fatal { attempt, source } => {
                assert_eq!(attempt, 1);
                assert!(matches!(
                    source,
                    ContextError::Client(ClientError::Status { status: 400, .. })
                ));
            }
            other => panic!("expected fatal error, got {}", other),
        }
    }

    #[tokio::test]
    async fn allocation_cancel_keeps_blobber_usage() {
        let mut f = fixture(2).await;
        funded_wallet(&f.ctx, "owner", 5 * ZCN).await;

        let baseline = f
            .ctx
            .client
            .total(TotalMetric::TotalAllocatedStorage)
            .await
            .unwrap();
        let allocation = f
            .ctx
            .ops
            .create_allocation("owner", &AllocationRequest::default())
            .await
            .unwrap();
        let after_create = f
            .ctx
            .wait_for_total(TotalMetric::TotalAllocatedStorage, baseline, Trend::Increases)
            .await
            .unwrap()
            .value;

        f.ctx.ops.cancel_allocation("owner", &allocation).await.unwrap();
        assert!(f.ctx.client.allocation(allocation.as_str()).await.is_err());

        f.ctx.config.poll.timeout_secs = 1;
        let strict = converged_within(
            f.ctx
                .wait_for_total(
                    TotalMetric::TotalAllocatedStorage,
                    after_create,
                    Trend::Decreases,
                )
                .await,
        )
        .expect("strict wait must not fail outright");
        let current = f
            .ctx
            .client
            .total(TotalMetric::TotalAllocatedStorage)
            .await
            .unwrap();

        let result = assert_known_divergence(
            &KnownDivergence::CANCEL_KEEPS_USAGE,
            strict,
            current == after_create,
        );
        assert!(result.passed, "{:?}", result.failure_details);
    }

    #[tokio::test]
    async fn write_pool_is_split_by_write_price() {
        let f = fixture(3).await;
        funded_wallet(&f.ctx, "owner", 10 * ZCN).await;

        let request = AllocationRequest {
            data_shards: 2,
            parity_shards: 1,
            lock: 3 * ZCN,
            ..Default::default()
        };
        let allocation = f
            .ctx
            .ops
            .create_allocation("owner", &request)
            .await
            .unwrap();

        let pools = f.ctx.ops.write_pool_info("owner").await.unwrap();
        let pool = pools
            .iter()
            .find(|p| p.is_allocation_pool())
            .expect("allocation pool");
        assert_eq!(pool.balance, 3 * ZCN);
        assert_eq!(pool.allocation_id, allocation.as_str());

        let details = f.ctx.client.allocation(allocation.as_str()).await.unwrap();
        let mut serving = Vec::new();
        for b in &details.blobbers {
            serving.push(f.ctx.client.blobber(b.id.as_str()).await.unwrap());
        }
        let expected = write_pool_split(pool.balance, &serving);

        assert_eq!(pool.blobbers.len(), expected.len());
        for (id, share) in expected {
            let actual = pool
                .blobbers
                .iter()
                .find(|b| b.blobber_id == id.as_str())
                .expect("blobber share");
            assert_eq!(actual.balance, share);
        }
        let total: i64 = pool.blobbers.iter().map(|b| b.balance).sum();
        assert!(total <= pool.balance);
    }

    #[tokio::test]
    async fn write_pool_info_error_mentions_read_pool() {
        let f = fixture(1).await;
        f.ctx.ops.register_wallet("empty").await.unwrap();

        let err = f.ctx.ops.write_pool_info("empty").await.unwrap_err();
        let output = err.output().join("\n");

        let result = assert_known_divergence(
            &KnownDivergence::WRITE_POOL_INFO_SAYS_READ_POOL,
            output.contains("write pool") && !output.contains("read pool"),
            KnownDivergence::WRITE_POOL_INFO_SAYS_READ_POOL.seen_in(&output),
        );
        assert!(result.passed, "{:?}", result.failure_details);
    }

    #[tokio::test]
    async fn upload_and_delete_move_stored_data() {
        let f = fixture(2).await;
        funded_wallet(&f.ctx, "owner", 5 * ZCN).await;
        let allocation = f
            .ctx
            .ops
            .create_allocation("owner", &AllocationRequest::default())
            .await
            .unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), vec![7u8; 4096]).unwrap();
        let remote = format!("/{}", f.ctx.unique_name("upload"));

        let baseline = f.ctx.client.total(TotalMetric::TotalStoredData).await.unwrap();
        f.ctx
            .ops
            .upload("owner", &allocation, file.path(), &remote)
            .await
            .unwrap();
        let stored = f
            .ctx
            .wait_for_total(TotalMetric::TotalStoredData, baseline, Trend::Increases)
            .await
            .unwrap();
        // One data shard: each of the two blobbers stores the whole file.
        assert_eq!(stored.value, baseline + 2 * 4096);

        f.ctx
            .ops
            .delete_file("owner", &allocation, &remote)
            .await
            .unwrap();
        f.ctx
            .wait_for_total(TotalMetric::TotalStoredData, baseline, Trend::Equals(baseline))
            .await
            .expect("delete should land");
    }

    #[tokio::test]
    async fn concurrent_polls_share_nothing() {
        let f = fixture(2).await;
        funded_wallet(&f.ctx, "delegate", 10 * ZCN).await;
        let blobbers = f.net.blobbers();

        let before: Vec<i64> = blobbers.iter().map(|b| b.total_stake).collect();
        for (i, b) in blobbers.iter().enumerate() {
            f.ctx
                .ops
                .stake("delegate", ProviderType::Blobber, b.id.as_str(), (i as i64 + 1) * ZCN)
                .await
                .unwrap();
        }

        let (first, second) = futures_util::future::join(
            f.ctx.wait_for_blobber(blobbers[0].id.as_str(), |b| {
                b.total_stake == before[0] + ZCN
            }),
            f.ctx.wait_for_blobber(blobbers[1].id.as_str(), |b| {
                b.total_stake == before[1] + 2 * ZCN
            }),
        )
        .await;
        assert_eq!(first.unwrap().value.total_stake, before[0] + ZCN);
        assert_eq!(second.unwrap().value.total_stake, before[1] + 2 * ZCN);
    }

    #[tokio::test]
    async fn sequential_immediate_polls_are_independent() {
        let f = fixture(1).await;
        let current = f.ctx.client.total(TotalMetric::TotalStaked).await.unwrap();

        for _ in 0..2 {
            let converged = f
                .ctx
                .wait_for_total(TotalMetric::TotalStaked, current, Trend::Equals(current))
                .await
                .unwrap();
            assert_eq!(converged.attempts, 1);
            assert!(converged.elapsed < Duration::from_secs(1));
        }
    }

    // ===========================================
    // Graph data
    // ===========================================

    #[tokio::test]
    async fn total_minted_graph_follows_faucet() {
        let f = fixture(1).await;
        let baseline = f
            .ctx
            .latest_graph_value(GraphMetric::TotalMinted)
            .await
            .unwrap();

        f.ctx.ops.register_wallet("minter").await.unwrap();
        f.ctx.ops.faucet("minter", 3 * ZCN).await.unwrap();

        let minted = f
            .ctx
            .wait_for_graph(GraphMetric::TotalMinted, baseline, Trend::ChangesBy(3 * ZCN))
            .await
            .expect("minted tokens should reach the graph");
        let total = f.ctx.client.total(TotalMetric::TotalMinted).await.unwrap();
        assert_eq!(total, minted.value);
    }

    #[tokio::test]
    async fn total_locked_graph_follows_stake_and_write_pool() {
        let f = fixture(2).await;
        funded_wallet(&f.ctx, "locker", 10 * ZCN).await;
        let blobber = f.net.blobbers()[0].id.to_string();
        let baseline = f
            .ctx
            .latest_graph_value(GraphMetric::TotalLocked)
            .await
            .unwrap();

        f.ctx
            .ops
            .stake("locker", ProviderType::Blobber, &blobber, 2 * ZCN)
            .await
            .unwrap();
        let staked = f
            .ctx
            .wait_for_graph(GraphMetric::TotalLocked, baseline, Trend::ChangesBy(2 * ZCN))
            .await
            .expect("stake should be counted as locked");

        let request = AllocationRequest {
            lock: ZCN / 2,
            ..Default::default()
        };
        f.ctx
            .ops
            .create_allocation("locker", &request)
            .await
            .unwrap();
        let with_pool = f
            .ctx
            .wait_for_graph(GraphMetric::TotalLocked, staked.value, Trend::ChangesBy(ZCN / 2))
            .await
            .expect("write pool should be counted as locked");

        f.ctx
            .ops
            .unstake("locker", ProviderType::Blobber, &blobber)
            .await
            .unwrap();
        f.ctx
            .wait_for_graph(
                GraphMetric::TotalLocked,
                with_pool.value,
                Trend::ChangesBy(-2 * ZCN),
            )
            .await
            .expect("unstake should release the lock");
    }

    #[tokio::test]
    async fn challenge_pools_follow_upload_and_cancel() {
        let f = fixture(2).await;
        funded_wallet(&f.ctx, "owner", 5 * ZCN).await;
        let baseline = f
            .ctx
            .latest_graph_value(GraphMetric::TotalChallengePools)
            .await
            .unwrap();

        let allocation = f
            .ctx
            .ops
            .create_allocation("owner", &AllocationRequest::default())
            .await
            .unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), vec![1u8; 2048]).unwrap();
        f.ctx
            .ops
            .upload("owner", &allocation, file.path(), "/challenged")
            .await
            .unwrap();

        let funded = f
            .ctx
            .wait_for_graph(GraphMetric::TotalChallengePools, baseline, Trend::Increases)
            .await
            .expect("upload should fund the challenge pool");

        f.ctx.ops.cancel_allocation("owner", &allocation).await.unwrap();
        f.ctx
            .wait_for_graph(
                GraphMetric::TotalChallengePools,
                funded.value,
                Trend::Decreases,
            )
            .await
            .expect("cancel should drain the challenge pool");
    }

    #[tokio::test]
    async fn token_supply_drops_while_tokens_are_locked() {
        let f = fixture(2).await;
        funded_wallet(&f.ctx, "owner", 5 * ZCN).await;
        let baseline = f
            .ctx
            .latest_graph_value(GraphMetric::TokenSupply)
            .await
            .unwrap();

        let request = AllocationRequest {
            lock: ZCN / 5,
            ..Default::default()
        };
        let allocation = f
            .ctx
            .ops
            .create_allocation("owner", &request)
            .await
            .unwrap();
        let after_allocation = f
            .ctx
            .wait_for_graph(GraphMetric::TokenSupply, baseline, Trend::ChangesBy(-ZCN / 5))
            .await
            .expect("allocation lock should leave the supply");

        f.ctx
            .ops
            .write_pool_lock("owner", &allocation, ZCN, "1h")
            .await
            .unwrap();
        f.ctx
            .wait_for_graph(
                GraphMetric::TokenSupply,
                after_allocation.value,
                Trend::ChangesBy(-ZCN),
            )
            .await
            .expect("write pool lock should leave the supply");

        f.ctx.ops.cancel_allocation("owner", &allocation).await.unwrap();
        f.ctx
            .wait_for_graph(GraphMetric::TokenSupply, baseline, Trend::Equals(baseline))
            .await
            .expect("cancel should return the locked tokens");
    }

    #[tokio::test]
    async fn blobber_graphs_follow_allocation_upload_and_price() {
        let f = fixture(2).await;
        funded_wallet(&f.ctx, "owner", 5 * ZCN).await;
        let blobber = f.net.blobbers()[0].clone();
        let id = blobber.id.as_str();

        let allocated = f
            .ctx
            .latest_blobber_graph_value(BlobberGraphMetric::Allocated, id)
            .await
            .unwrap();
        let request = AllocationRequest::default();
        let allocation = f
            .ctx
            .ops
            .create_allocation("owner", &request)
            .await
            .unwrap();
        f.ctx
            .wait_for_blobber_graph(
                BlobberGraphMetric::Allocated,
                id,
                allocated,
                Trend::ChangesBy(request.size),
            )
            .await
            .expect("allocation should reach the blobber's allocated graph");

        let saved = f
            .ctx
            .latest_blobber_graph_value(BlobberGraphMetric::SavedData, id)
            .await
            .unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), vec![3u8; 4096]).unwrap();
        f.ctx
            .ops
            .upload("owner", &allocation, file.path(), "/saved")
            .await
            .unwrap();
        f.ctx
            .wait_for_blobber_graph(
                BlobberGraphMetric::SavedData,
                id,
                saved,
                Trend::ChangesBy(4096),
            )
            .await
            .expect("upload should reach the blobber's saved data graph");

        let price = f
            .ctx
            .latest_blobber_graph_value(BlobberGraphMetric::WritePrice, id)
            .await
            .unwrap();
        assert_eq!(price, blobber.terms.write_price);
        let update = BlobberUpdate {
            write_price: Some(price + ZCN / 100),
            ..Default::default()
        };
        f.ctx
            .ops
            .update_blobber("blobber-owner", &blobber.id, &update)
            .await
            .unwrap();
        f.ctx
            .wait_for_blobber_graph(
                BlobberGraphMetric::WritePrice,
                id,
                price,
                Trend::ChangesBy(ZCN / 100),
            )
            .await
            .expect("write price should reach the blobber's graph");
    }

    #[tokio::test]
    async fn blobber_stake_and_unstake_totals() {
        let f = fixture(1).await;
        funded_wallet(&f.ctx, "delegate", 5 * ZCN).await;
        let blobber = f.net.blobbers()[0].id.to_string();

        let stake_total = f
            .ctx
            .latest_blobber_graph_value(BlobberGraphMetric::StakeTotal, &blobber)
            .await
            .unwrap();
        let unstake_total = f
            .ctx
            .latest_blobber_graph_value(BlobberGraphMetric::UnstakeTotal, &blobber)
            .await
            .unwrap();

        f.ctx
            .ops
            .stake("delegate", ProviderType::Blobber, &blobber, 2 * ZCN)
            .await
            .unwrap();
        f.ctx
            .wait_for_blobber_graph(
                BlobberGraphMetric::StakeTotal,
                &blobber,
                stake_total,
                Trend::ChangesBy(2 * ZCN),
            )
            .await
            .expect("stake should reach the blobber's stake graph");

        f.ctx
            .ops
            .unstake("delegate", ProviderType::Blobber, &blobber)
            .await
            .unwrap();
        f.ctx
            .wait_for_blobber_graph(
                BlobberGraphMetric::StakeTotal,
                &blobber,
                stake_total,
                Trend::Equals(stake_total),
            )
            .await
            .expect("unstake should leave the stake graph");
        f.ctx
            .wait_for_blobber_graph(
                BlobberGraphMetric::UnstakeTotal,
                &blobber,
                unstake_total,
                Trend::ChangesBy(2 * ZCN),
            )
            .await
            .expect("unstake should reach the blobber's unstake graph");
    }

    // ===========================================
    // Write pools
    // ===========================================

    fn first_line(err: &OpsError) -> &str {
        err.output().first().map(String::as_str).unwrap_or_default()
    }

    async fn locked_pool(
        ctx: &TestContext,
        wallet: &str,
        allocation: &AllocationId,
    ) -> WritePoolInfo {
        ctx.ops
            .write_pool_info(wallet)
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.allocation_id == allocation.as_str() && !p.is_allocation_pool())
            .expect("locked pool")
    }

    fn short_allocation() -> AllocationRequest {
        AllocationRequest {
            size: 1024,
            expire: "5m".to_string(),
            lock: ZCN / 2,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn allocation_and_lock_move_wallet_balance() {
        let f = fixture(2).await;
        funded_wallet(&f.ctx, "wp-owner", 2 * ZCN).await;

        let allocation = f
            .ctx
            .ops
            .create_allocation("wp-owner", &short_allocation())
            .await
            .unwrap();
        assert_eq!(f.ctx.ops.balance("wp-owner").await.unwrap(), 3 * ZCN / 2);

        f.ctx
            .ops
            .write_pool_lock("wp-owner", &allocation, ZCN, "2m")
            .await
            .unwrap();
        assert_eq!(f.ctx.ops.balance("wp-owner").await.unwrap(), ZCN / 2);

        let pool = locked_pool(&f.ctx, "wp-owner", &allocation).await;
        assert_eq!(pool.balance, ZCN);
        assert!(pool.locked);
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        assert!(pool.expire_at > now);
        assert!(pool.expire_at <= now + 2 * 60 + 1);
        assert_eq!(pool.blobbers.len(), 2);
        assert!(pool.blobbers.iter().map(|b| b.balance).sum::<i64>() <= pool.balance);
    }

    #[tokio::test]
    async fn invalid_locks_rejected_without_moving_tokens() {
        let f = fixture(2).await;
        funded_wallet(&f.ctx, "wp-owner", ZCN).await;
        let allocation = f
            .ctx
            .ops
            .create_allocation("wp-owner", &short_allocation())
            .await
            .unwrap();
        assert_eq!(f.ctx.ops.balance("wp-owner").await.unwrap(), ZCN / 2);

        let cases = [
            (ZCN, wp_errors::OVER_BALANCE),
            (-ZCN / 2, wp_errors::NEGATIVE),
            (0, wp_errors::ZERO),
        ];
        for (amount, expected) in cases {
            let err = f
                .ctx
                .ops
                .write_pool_lock("wp-owner", &allocation, amount, "2m")
                .await
                .unwrap_err();
            assert_eq!(first_line(&err), expected, "locking {}", amount);
            assert_eq!(f.ctx.ops.balance("wp-owner").await.unwrap(), ZCN / 2);
        }
    }

    #[tokio::test]
    async fn unlock_waits_for_lock_to_expire() {
        let f = fixture(2).await;
        funded_wallet(&f.ctx, "wp-owner", 2 * ZCN).await;
        let allocation = f
            .ctx
            .ops
            .create_allocation("wp-owner", &short_allocation())
            .await
            .unwrap();
        f.ctx
            .ops
            .write_pool_lock("wp-owner", &allocation, ZCN / 2, "300ms")
            .await
            .unwrap();
        let pool = locked_pool(&f.ctx, "wp-owner", &allocation).await;

        let early = f
            .ctx
            .ops
            .write_pool_unlock("wp-owner", &pool.id)
            .await
            .unwrap_err();
        assert_eq!(first_line(&early), wp_errors::NOT_EXPIRED);

        tokio::time::sleep(Duration::from_millis(400)).await;
        let before = f.ctx.ops.balance("wp-owner").await.unwrap();
        f.ctx
            .ops
            .write_pool_unlock("wp-owner", &pool.id)
            .await
            .unwrap();
        let after = f.ctx.ops.balance("wp-owner").await.unwrap();
        assert!(Trend::ChangesBy(ZCN / 2).holds(before, after));
    }

    #[tokio::test]
    async fn lock_outliving_allocation_is_accepted() {
        let f = fixture(2).await;
        funded_wallet(&f.ctx, "wp-owner", 2 * ZCN).await;
        let allocation = f
            .ctx
            .ops
            .create_allocation("wp-owner", &short_allocation())
            .await
            .unwrap();

        let locked = f
            .ctx
            .ops
            .write_pool_lock("wp-owner", &allocation, ZCN, "10m")
            .await;

        let result = assert_known_divergence(
            &KnownDivergence::LOCK_PAST_ALLOCATION_EXPIRY,
            locked.is_err(),
            locked.is_ok(),
        );
        assert!(result.passed, "{:?}", result.failure_details);
    }
}
