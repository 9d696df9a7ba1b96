use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;

use crate::core::Change;
use crate::lsp::backend::Backend;

/// Trait for handling completion requests
#[tower_lsp::async_trait]
pub trait HandleCompletion {
    async fn handle_completion(
        &self,
        params: CompletionParams,
    ) -> LspResult<Option<CompletionResponse>>;
}

/// Trait for keeping the document store in sync with the client
#[tower_lsp::async_trait]
pub trait HandleDocumentSync {
    async fn handle_did_open(&self, params: DidOpenTextDocumentParams);
    async fn handle_did_change(&self, params: DidChangeTextDocumentParams);
    async fn handle_did_close(&self, params: DidCloseTextDocumentParams);
}

/// Trait for handling diagnostics
#[tower_lsp::async_trait]
pub trait HandleDiagnostics {
    async fn publish_diagnostics(&self, uri: Url);
}

#[tower_lsp::async_trait]
impl HandleCompletion for Backend {
    async fn handle_completion(
        &self,
        params: CompletionParams,
    ) -> LspResult<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        log::debug!("completion requested for {} (no items offered)", uri);
        Ok(None)
    }
}

#[tower_lsp::async_trait]
impl HandleDocumentSync for Backend {
    async fn handle_did_open(&self, params: DidOpenTextDocumentParams) {
        let item = params.text_document;
        let uri = item.uri.clone();

        self.documents
            .open(item.uri, item.text, Some(item.version))
            .await;

        self.publish_diagnostics(uri).await;
    }

    async fn handle_did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let changes: Vec<Change> = params
            .content_changes
            .into_iter()
            .map(Change::from)
            .collect();

        let version = Some(params.text_document.version);

        match self.documents.change(&uri, &changes, version).await {
            Ok(outcome) if outcome.changed => self.publish_diagnostics(uri).await,
            Ok(_) => log::debug!("{} unchanged, keeping published diagnostics", uri),
            Err(e) => {
                log::warn!("{}", e);
                self.client
                    .log_message(MessageType::WARNING, format!("pgn-ls: {}", e))
                    .await;
            }
        }
    }

    async fn handle_did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        if self.documents.close(&uri).await {
            // Clear whatever the client is still showing for this file
            self.client.publish_diagnostics(uri, Vec::new(), None).await;
        }
    }
}

#[tower_lsp::async_trait]
impl HandleDiagnostics for Backend {
    /// Publish the full diagnostic set for a document
    async fn publish_diagnostics(&self, uri: Url) {
        let Some(document) = self.documents.get(&uri).await else {
            return;
        };

        // Only this document is locked while its diagnostics are computed
        let (diagnostics, version) = {
            let document = document.lock().await;
            (
                self.diagnostics.diagnose(&document),
                document.client_version(),
            )
        };

        self.client
            .publish_diagnostics(uri, diagnostics, version)
            .await;
    }
}
