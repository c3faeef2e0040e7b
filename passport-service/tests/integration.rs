//! End-to-end claim verification tests over gRPC

use passport_core::verify_claim_signature;
use passport_service::grpc::proto::passport_verifier_client::PassportVerifierClient;
use passport_service::grpc::proto::{
    HealthRequest, PublicKeyRequest, RecordClaimRequest, VerifyClaimRequest,
};
use passport_service::testutil::TestServer;
use passport_types::{ClaimPolicy, PublicKey, Signature, SuiAddress, Timestamp};

const HOUR_MS: i64 = 3_600_000;

fn verify_request(stamp_id: &str, code: &str, recipient: [u8; 32]) -> VerifyClaimRequest {
    VerifyClaimRequest {
        stamp_id: stamp_id.to_string(),
        claim_code: code.to_string(),
        recipient: recipient.to_vec(),
        last_claim_time: 1_000,
    }
}

#[tokio::test]
async fn test_valid_claim_returns_verifiable_signature() {
    let server = TestServer::start().await;
    server
        .policy_store()
        .put(&ClaimPolicy::code_gated("launch", "ABC"))
        .unwrap();

    let mut client = PassportVerifierClient::connect(server.url()).await.unwrap();
    let response = client
        .verify_claim(verify_request("launch", "ABC", [7u8; 32]))
        .await
        .unwrap()
        .into_inner();

    assert!(response.valid);
    let signature = Signature::from_slice(&response.signature).unwrap();
    verify_claim_signature(
        server.public_key(),
        &signature,
        &SuiAddress::new([7u8; 32]),
        1_000,
    )
    .unwrap();
}

#[tokio::test]
async fn test_claim_before_window_opens_rejected() {
    let server = TestServer::start().await;

    let mut policy = ClaimPolicy::code_gated("early", "ABC");
    policy.valid_from = Some(Timestamp::now().add_millis(HOUR_MS));
    server.policy_store().put(&policy).unwrap();

    let mut client = PassportVerifierClient::connect(server.url()).await.unwrap();
    let response = client
        .verify_claim(verify_request("early", "ABC", [7u8; 32]))
        .await
        .unwrap()
        .into_inner();

    assert!(!response.valid);
    assert!(response.signature.is_empty());
}

#[tokio::test]
async fn test_claim_inside_window_accepted() {
    let server = TestServer::start().await;

    let mut policy = ClaimPolicy::code_gated("open", "ABC");
    policy.valid_from = Some(Timestamp::now().add_millis(-HOUR_MS));
    policy.valid_until = Some(Timestamp::now().add_millis(HOUR_MS));
    server.policy_store().put(&policy).unwrap();

    let mut client = PassportVerifierClient::connect(server.url()).await.unwrap();
    let response = client
        .verify_claim(verify_request("open", "ABC", [7u8; 32]))
        .await
        .unwrap()
        .into_inner();

    assert!(response.valid);
}

#[tokio::test]
async fn test_expired_window_rejected() {
    let server = TestServer::start().await;

    let mut policy = ClaimPolicy::code_gated("expired", "ABC");
    policy.valid_until = Some(Timestamp::now().add_millis(-HOUR_MS));
    server.policy_store().put(&policy).unwrap();

    let mut client = PassportVerifierClient::connect(server.url()).await.unwrap();
    let response = client
        .verify_claim(verify_request("expired", "ABC", [7u8; 32]))
        .await
        .unwrap()
        .into_inner();

    assert!(!response.valid);
}

#[tokio::test]
async fn test_unknown_stamp_rejected_without_error() {
    let server = TestServer::start().await;

    let mut client = PassportVerifierClient::connect(server.url()).await.unwrap();
    let response = client
        .verify_claim(verify_request("X", "ABC", [7u8; 32]))
        .await
        .unwrap()
        .into_inner();

    // A missing policy is a plain rejection, not a gRPC error
    assert!(!response.valid);
    assert!(response.signature.is_empty());
}

#[tokio::test]
async fn test_wrong_code_rejected() {
    let server = TestServer::start().await;
    server
        .policy_store()
        .put(&ClaimPolicy::code_gated("launch", "ABC"))
        .unwrap();

    let mut client = PassportVerifierClient::connect(server.url()).await.unwrap();
    let response = client
        .verify_claim(verify_request("launch", "XYZ", [7u8; 32]))
        .await
        .unwrap()
        .into_inner();

    assert!(!response.valid);
}

#[tokio::test]
async fn test_malformed_recipient_is_invalid_argument() {
    let server = TestServer::start().await;
    server
        .policy_store()
        .put(&ClaimPolicy::code_gated("launch", "ABC"))
        .unwrap();

    let mut client = PassportVerifierClient::connect(server.url()).await.unwrap();
    let status = client
        .verify_claim(VerifyClaimRequest {
            stamp_id: "launch".to_string(),
            claim_code: "ABC".to_string(),
            recipient: vec![1, 2, 3],
            last_claim_time: 1_000,
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), tonic::Code::InvalidArgument);
}

#[tokio::test]
async fn test_repeat_verification_yields_independent_signatures() {
    let server = TestServer::start().await;
    server
        .policy_store()
        .put(&ClaimPolicy::code_gated("launch", "ABC"))
        .unwrap();

    let mut client = PassportVerifierClient::connect(server.url()).await.unwrap();

    for _ in 0..2 {
        let response = client
            .verify_claim(verify_request("launch", "ABC", [7u8; 32]))
            .await
            .unwrap()
            .into_inner();
        assert!(response.valid);

        // Verification is stateless: each approval verifies on its own
        let signature = Signature::from_slice(&response.signature).unwrap();
        verify_claim_signature(
            server.public_key(),
            &signature,
            &SuiAddress::new([7u8; 32]),
            1_000,
        )
        .unwrap();
    }
}

#[tokio::test]
async fn test_record_claim_lifecycle() {
    let server = TestServer::start().await;
    server
        .policy_store()
        .put(&ClaimPolicy::code_gated("launch", "ABC"))
        .unwrap();

    let mut client = PassportVerifierClient::connect(server.url()).await.unwrap();

    let first = client
        .record_claim(RecordClaimRequest {
            user_id: "0xabc".to_string(),
            stamp_id: "launch".to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(!first.already_claimed);
    assert_eq!(first.claim_count, 1);

    // Second redemption by the same user is a duplicate, not an error
    let second = client
        .record_claim(RecordClaimRequest {
            user_id: "0xabc".to_string(),
            stamp_id: "launch".to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(second.already_claimed);
    assert_eq!(second.claim_count, 1);

    assert!(server.ledger().has_claimed("0xabc", "launch").unwrap());
}

#[tokio::test]
async fn test_record_claim_unknown_stamp_is_not_found() {
    let server = TestServer::start().await;

    let mut client = PassportVerifierClient::connect(server.url()).await.unwrap();
    let status = client
        .record_claim(RecordClaimRequest {
            user_id: "0xabc".to_string(),
            stamp_id: "ghost".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(status.code(), tonic::Code::NotFound);
}

#[tokio::test]
async fn test_public_key_matches_server() {
    let server = TestServer::start().await;

    let mut client = PassportVerifierClient::connect(server.url()).await.unwrap();
    let response = client
        .get_public_key(PublicKeyRequest {})
        .await
        .unwrap()
        .into_inner();

    let key = PublicKey::from_slice(&response.public_key).unwrap();
    assert_eq!(&key, server.public_key());
}

#[tokio::test]
async fn test_health_reports_issued_signatures() {
    let server = TestServer::start().await;
    server
        .policy_store()
        .put(&ClaimPolicy::code_gated("launch", "ABC"))
        .unwrap();

    let mut client = PassportVerifierClient::connect(server.url()).await.unwrap();

    client
        .verify_claim(verify_request("launch", "ABC", [7u8; 32]))
        .await
        .unwrap();
    // Rejected claims issue no signature
    client
        .verify_claim(verify_request("launch", "WRONG", [7u8; 32]))
        .await
        .unwrap();

    let health = client
        .health(HealthRequest {})
        .await
        .unwrap()
        .into_inner();
    assert_eq!(health.signatures_issued, 1);
}
