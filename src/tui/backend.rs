//! Async backend: bridges the TUI event loop with the authentication manager.
//!
//! Uses an mpsc channel pair. The TUI sends `BackendCommand` values, and a
//! background tokio task executes them and sends `BackendResponse` values back.
//! The task owns the manager, so commands are handled one at a time in order.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::auth::{AuthManager, AuthOutcome, Credentials, TwoFactorHandshake};

/// Commands sent from the TUI event loop to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    /// `None` authenticates from stored tokens.
    Authenticate { credentials: Option<Credentials> },
    VerificationPrompt { index: usize },
    CheckOtc { index: usize, proof: Option<String> },
    CompleteTwoFactor {
        index: usize,
        proof: Option<String>,
        otc: Option<String>,
    },
}

/// Responses from the backend to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendResponse {
    Authenticated(AuthOutcome),
    VerificationPrompt { prompt: Option<String> },
    OtcChecked { needs_otc: bool },
}

/// Manager plus the two-factor exchange currently in progress.
pub struct AuthSession {
    manager: Box<dyn AuthManager>,
    tokens_path: PathBuf,
    handshake: Option<Box<dyn TwoFactorHandshake>>,
}

impl AuthSession {
    pub fn new(manager: Box<dyn AuthManager>, tokens_path: PathBuf) -> Self {
        Self {
            manager,
            tokens_path,
            handshake: None,
        }
    }

    pub async fn handle(&mut self, cmd: BackendCommand) -> BackendResponse {
        match cmd {
            BackendCommand::Authenticate { credentials } => {
                BackendResponse::Authenticated(self.authenticate(credentials).await)
            }
            BackendCommand::VerificationPrompt { index } => match &self.handshake {
                Some(handshake) => BackendResponse::VerificationPrompt {
                    prompt: handshake.verification_prompt(index),
                },
                None => no_handshake(),
            },
            BackendCommand::CheckOtc { index, proof } => {
                let Some(handshake) = self.handshake.as_mut() else {
                    return no_handshake();
                };
                match handshake.check_otc(index, proof.as_deref()).await {
                    Ok(needs_otc) => BackendResponse::OtcChecked { needs_otc },
                    Err(e) => {
                        self.handshake = None;
                        BackendResponse::Authenticated(AuthOutcome::Failed(e.to_string()))
                    }
                }
            }
            BackendCommand::CompleteTwoFactor { index, proof, otc } => {
                let Some(mut handshake) = self.handshake.take() else {
                    return no_handshake();
                };
                match handshake
                    .authenticate(index, proof.as_deref(), otc.as_deref())
                    .await
                {
                    Ok(tokens) => {
                        tracing::debug!("Two-factor authentication completed, installing tokens");
                        self.manager.install_tokens(tokens);
                        BackendResponse::Authenticated(self.authenticate(None).await)
                    }
                    Err(e) => BackendResponse::Authenticated(AuthOutcome::Failed(e.to_string())),
                }
            }
        }
    }

    /// Authenticate (always preferring a refresh), persist tokens on success
    /// and start a handshake when a second factor is requested.
    async fn authenticate(&mut self, credentials: Option<Credentials>) -> AuthOutcome {
        let outcome = self.manager.authenticate(credentials, true).await;
        match outcome {
            AuthOutcome::Success => match self.manager.save(&self.tokens_path) {
                Ok(()) => {
                    tracing::info!("Tokens saved to {}", self.tokens_path.display());
                    AuthOutcome::Success
                }
                Err(e) => AuthOutcome::Failed(format!("Failed to save tokens: {:#}", e)),
            },
            AuthOutcome::TwoFactorRequired(challenge) => {
                if challenge.strategies.is_empty() {
                    return AuthOutcome::Failed(
                        "Two-factor authentication required but no methods were offered"
                            .to_string(),
                    );
                }
                tracing::info!(
                    "Two-factor authentication required, {} method(s) offered",
                    challenge.strategies.len()
                );
                self.handshake = Some(self.manager.begin_two_factor(challenge.clone()));
                AuthOutcome::TwoFactorRequired(challenge)
            }
            failed @ AuthOutcome::Failed(_) => failed,
        }
    }
}

fn no_handshake() -> BackendResponse {
    BackendResponse::Authenticated(AuthOutcome::Failed(
        "No two-factor authentication in progress".to_string(),
    ))
}

/// Handle for interacting with the backend from the TUI side.
pub struct Backend {
    cmd_tx: mpsc::UnboundedSender<BackendCommand>,
    resp_rx: mpsc::UnboundedReceiver<BackendResponse>,
}

impl Backend {
    /// Start the backend. Spawns a tokio task that owns `manager`.
    pub fn start(manager: Box<dyn AuthManager>, tokens_path: PathBuf) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, resp_rx) = mpsc::unbounded_channel();

        tokio::spawn(backend_loop(
            AuthSession::new(manager, tokens_path),
            cmd_rx,
            resp_tx,
        ));

        Self { cmd_tx, resp_rx }
    }

    /// Send a command to the backend (non-blocking).
    pub fn send(&self, cmd: BackendCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::error!("Backend channel closed -- command dropped");
        }
    }

    /// Receive a response from the backend.
    ///
    /// Suspends until a response is available. Returns `None` only when the
    /// backend channel is permanently closed (all senders dropped).
    /// Designed to be used inside `tokio::select!`.
    pub async fn recv(&mut self) -> Option<BackendResponse> {
        self.resp_rx.recv().await
    }
}

async fn backend_loop(
    mut session: AuthSession,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    resp_tx: mpsc::UnboundedSender<BackendResponse>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let resp = session.handle(cmd).await;
        if resp_tx.send(resp).is_err() {
            break;
        }
    }
    tracing::debug!("Backend loop finished");
}
