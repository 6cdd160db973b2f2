#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;

const ACCOUNT_BODY: &str = "{\"included\":[\
	{\"type\":\"units\",\"attributes\":{\"label\":\"101\"}},\
	{\"type\":\"buildings\",\"attributes\":{\"name\":\"Oak Tower\"}}\
]}";

#[tokio::test]
async fn query_state_probes_metadata_once() {
	let server = MockServer::start_async().await;
	let lock = common::build_lock(&server, "A1", "R1");
	let account_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/mobile/v3/me").header("authorization", "Bearer A1");
			then.status(200).header("content-type", "application/json").body(ACCOUNT_BODY);
		})
		.await;

	assert!(!lock.query_state().await, "The door state is always reported as off.");
	assert!(!lock.query_state().await);

	account_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn verification_failure_is_swallowed_and_retried() {
	let server = MockServer::start_async().await;
	let lock = common::build_lock(&server, "A1", "R1");
	let account_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/mobile/v3/me");
			then.status(500).body("upstream exploded");
		})
		.await;

	assert!(!lock.query_state().await, "Verification failures never change the reported state.");

	account_mock.assert_calls_async(1).await;

	// The flag is only set on success, so the next query probes again.
	assert!(!lock.query_state().await);

	account_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn metadata_without_unit_or_building_fails_verification() {
	let server = MockServer::start_async().await;
	let lock = common::build_lock(&server, "A1", "R1");
	let account_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/mobile/v3/me");
			then.status(200).header("content-type", "application/json").body("{\"included\":[]}");
		})
		.await;

	assert!(!lock.query_state().await);
	assert!(!lock.query_state().await);

	account_mock.assert_calls_async(2).await;
}
