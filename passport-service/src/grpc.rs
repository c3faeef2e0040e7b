//! gRPC service implementation for the Passport claim verifier

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tonic::{Request, Response, Status};
use tracing::{debug, info, warn};

use crate::ledger::LedgerError;
use crate::service::{ClaimVerifier, ServiceError};
use passport_types::{ClaimRequest, SuiAddress, Timestamp};

// Include the generated protobuf code
pub mod proto {
    tonic::include_proto!("passport");
}

use proto::passport_verifier_server::PassportVerifier;
use proto::{
    health_response::Status as HealthStatus, HealthRequest, HealthResponse, PublicKeyRequest,
    PublicKeyResponse, RecordClaimRequest, RecordClaimResponse, VerifyClaimRequest,
    VerifyClaimResponse,
};

/// The gRPC service implementation
pub struct PassportGrpcService {
    verifier: Arc<ClaimVerifier>,
    start_time: Instant,
    signatures_issued: AtomicU64,
}

impl PassportGrpcService {
    pub fn new(verifier: Arc<ClaimVerifier>) -> Self {
        Self {
            verifier,
            start_time: Instant::now(),
            signatures_issued: AtomicU64::new(0),
        }
    }
}

/// Collapse internal failures to a generic transient error. Callers see only
/// valid, invalid, or retry; never which internal layer failed.
fn service_error_to_status(err: ServiceError) -> Status {
    match err {
        ServiceError::Ledger(LedgerError::NotFound { stamp_id }) => {
            Status::not_found(format!("No claim policy for stamp '{}'", stamp_id))
        }
        other => {
            warn!(error = %other, "claim request failed");
            Status::internal("Temporary failure, please retry")
        }
    }
}

#[tonic::async_trait]
impl PassportVerifier for PassportGrpcService {
    async fn verify_claim(
        &self,
        request: Request<VerifyClaimRequest>,
    ) -> Result<Response<VerifyClaimResponse>, Status> {
        let req = request.into_inner();

        let recipient = SuiAddress::from_slice(&req.recipient).map_err(|e| {
            warn!(error = %e, "malformed recipient in claim request");
            Status::invalid_argument(format!("Invalid recipient: {}", e))
        })?;

        let claim_request = ClaimRequest {
            stamp_id: req.stamp_id,
            claim_code: req.claim_code,
            recipient,
            last_claim_time: req.last_claim_time,
        };

        debug!(stamp_id = %claim_request.stamp_id, "received claim verification request");

        let verdict = self
            .verifier
            .verify_claim(&claim_request, Timestamp::now())
            .map_err(service_error_to_status)?;

        // An approval without a signature must never leave the process.
        let (valid, signature) = match (verdict.valid, verdict.signature) {
            (true, Some(sig)) => {
                self.signatures_issued.fetch_add(1, Ordering::Relaxed);
                (true, sig.as_bytes().to_vec())
            }
            (true, None) => {
                return Err(Status::internal("Signature missing from approved claim"));
            }
            (false, _) => (false, Vec::new()),
        };

        Ok(Response::new(VerifyClaimResponse { valid, signature }))
    }

    async fn record_claim(
        &self,
        request: Request<RecordClaimRequest>,
    ) -> Result<Response<RecordClaimResponse>, Status> {
        let req = request.into_inner();

        if req.user_id.is_empty() {
            return Err(Status::invalid_argument("user_id must not be empty"));
        }

        let outcome = self
            .verifier
            .record_claim(&req.user_id, &req.stamp_id, Timestamp::now())
            .map_err(service_error_to_status)?;

        Ok(Response::new(RecordClaimResponse {
            claim_count: outcome.claim_count,
            already_claimed: outcome.already_claimed,
        }))
    }

    async fn get_public_key(
        &self,
        _request: Request<PublicKeyRequest>,
    ) -> Result<Response<PublicKeyResponse>, Status> {
        info!("Public key requested");

        Ok(Response::new(PublicKeyResponse {
            public_key: self.verifier.public_key().as_bytes().to_vec(),
        }))
    }

    async fn health(
        &self,
        _request: Request<HealthRequest>,
    ) -> Result<Response<HealthResponse>, Status> {
        let uptime = self.start_time.elapsed().as_secs();
        let signatures_issued = self.signatures_issued.load(Ordering::Relaxed);

        Ok(Response::new(HealthResponse {
            status: HealthStatus::Healthy.into(),
            uptime_seconds: uptime,
            signatures_issued,
        }))
    }
}
