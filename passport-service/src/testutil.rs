//! Test utilities for running an in-process passport server.
//!
//! Enabled via the `test-util` feature flag. Uses a generated software
//! signer and a temporary sled database; exposes store and ledger handles so
//! tests can seed policies and inspect claim state directly.

use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;

use crate::grpc::{proto::passport_verifier_server::PassportVerifierServer, PassportGrpcService};
use crate::ledger::ClaimLedger;
use crate::service::ClaimVerifier;
use crate::signer::{ClaimSigner, Signer};
use crate::store::PolicyStore;
use passport_types::PublicKey;

/// An in-process passport server bound to a random localhost port.
pub struct TestServer {
    addr: SocketAddr,
    public_key: PublicKey,
    store: PolicyStore,
    ledger: ClaimLedger,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    // Temp database directory; removed when the server is dropped
    _data_dir: tempfile::TempDir,
}

impl TestServer {
    /// Start a test server on a random port.
    ///
    /// Returns once the server is ready to accept connections.
    pub async fn start() -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = sled::open(data_dir.path()).expect("Failed to open sled db");

        let store = PolicyStore::open(&db).expect("Failed to open policy store");
        let ledger = ClaimLedger::open(&db).expect("Failed to open claim ledger");

        let signer = ClaimSigner::generate();
        let public_key = signer.public_key().clone();
        let signer: Arc<dyn Signer> = Arc::new(signer);

        let verifier = Arc::new(ClaimVerifier::new(store.clone(), ledger.clone(), signer));
        let service = PassportGrpcService::new(verifier);
        let grpc_service = PassportVerifierServer::new(service);

        // Bind to a random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().expect("Failed to get local address");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        // Convert TcpListener to the stream type tonic expects
        let incoming = tokio_stream::wrappers::TcpListenerStream::new(listener);

        tokio::spawn(async move {
            Server::builder()
                .add_service(grpc_service)
                .serve_with_incoming_shutdown(incoming, async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Test server failed");
        });

        // Give the server a moment to start accepting connections
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        Self {
            addr,
            public_key,
            store,
            ledger,
            shutdown_tx: Some(shutdown_tx),
            _data_dir: data_dir,
        }
    }

    /// Get the server's listening address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the server URL suitable for client connection
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the service's signature verification key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Handle to the policy store, for seeding test policies
    pub fn policy_store(&self) -> &PolicyStore {
        &self.store
    }

    /// Handle to the claim ledger, for inspecting claim state
    pub fn ledger(&self) -> &ClaimLedger {
        &self.ledger
    }

    /// Shut down the test server
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
