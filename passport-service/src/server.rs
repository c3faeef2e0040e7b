//! Passport server implementation

use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;
use tracing::info;

use crate::config::ServiceConfig;
use crate::grpc::{proto::passport_verifier_server::PassportVerifierServer, PassportGrpcService};
use crate::ledger::ClaimLedger;
use crate::service::ClaimVerifier;
use crate::signer::{ClaimSigner, Signer, SignerError};
use crate::store::PolicyStore;

/// The main passport verification server
pub struct PassportServer {
    config: ServiceConfig,
    verifier: Arc<ClaimVerifier>,
    // Held so the database outlives all tree handles
    _db: sled::Db,
}

impl PassportServer {
    /// Create a new passport server.
    ///
    /// Fails fast if the signing seed is absent or malformed: a process that
    /// cannot sign must not start serving claim verification.
    pub fn new(config: ServiceConfig) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing passport server");

        let seed = config
            .signer
            .seed
            .as_deref()
            .ok_or(SignerError::MissingSeed)?;
        let signer = ClaimSigner::from_hex_seed(seed)?;

        info!("Signer initialized, public key: {}", signer.public_key());

        let db = sled::open(&config.store.path)?;
        let store = PolicyStore::open(&db)?;
        let ledger = ClaimLedger::open(&db)?;

        let signer: Arc<dyn Signer> = Arc::new(signer);
        let verifier = Arc::new(ClaimVerifier::new(store, ledger, signer));

        Ok(Self {
            config,
            verifier,
            _db: db,
        })
    }

    /// Get the service's signature verification key
    pub fn public_key(&self) -> &passport_types::PublicKey {
        self.verifier.public_key()
    }

    /// Run the gRPC server
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr: SocketAddr =
            format!("{}:{}", self.config.server.host, self.config.server.port).parse()?;

        info!("Starting gRPC server on {}", addr);
        info!("Public key: {}", self.public_key());

        let service = PassportGrpcService::new(self.verifier.clone());

        Server::builder()
            .concurrency_limit_per_connection(self.config.server.max_connections)
            .add_service(PassportVerifierServer::new(service))
            .serve_with_shutdown(addr, async {
                tokio::signal::ctrl_c().await.ok();
                info!("Shutting down passport server");
            })
            .await?;

        Ok(())
    }
}
