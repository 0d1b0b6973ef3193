//! Drives the language server through its `LanguageServer` entry points:
//! initialization options, document sync, completion and on-type
//! formatting.

use ib_lsp::IbLanguageServer;
use pretty_assertions::assert_eq;
use serde_json::json;
use tower_lsp::lsp_types::*;
use tower_lsp::{LanguageServer, LspService};

fn uri() -> Url {
    Url::parse("file:///shapes.ib").unwrap()
}

fn snippet_capabilities() -> ClientCapabilities {
    ClientCapabilities {
        text_document: Some(TextDocumentClientCapabilities {
            completion: Some(CompletionClientCapabilities {
                completion_item: Some(CompletionItemCapability {
                    snippet_support: Some(true),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

async fn initialize(server: &IbLanguageServer) -> InitializeResult {
    let params = InitializeParams {
        capabilities: snippet_capabilities(),
        initialization_options: Some(json!({
            "indentUnit": 2,
            "compilerEndpoint": null
        })),
        ..Default::default()
    };
    let result = server.initialize(params).await.unwrap();
    server.initialized(InitializedParams {}).await;
    result
}

async fn open(server: &IbLanguageServer, text: &str) {
    server
        .did_open(DidOpenTextDocumentParams {
            text_document: TextDocumentItem::new(uri(), "ib".to_string(), 1, text.to_string()),
        })
        .await;
}

fn position_params(line: u32, character: u32) -> TextDocumentPositionParams {
    TextDocumentPositionParams {
        text_document: TextDocumentIdentifier::new(uri()),
        position: Position::new(line, character),
    }
}

async fn completion_items(server: &IbLanguageServer, line: u32, character: u32) -> Vec<CompletionItem> {
    let response = server
        .completion(CompletionParams {
            text_document_position: position_params(line, character),
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: None,
        })
        .await
        .unwrap();
    match response {
        Some(CompletionResponse::Array(items)) => items,
        other => panic!("expected completion items, got {other:?}"),
    }
}

#[tokio::test]
async fn test_initialize_reads_options() {
    let (service, _socket) = LspService::new(IbLanguageServer::new);
    let server = service.inner();

    let result = initialize(server).await;

    assert_eq!(
        result.server_info.map(|info| info.name),
        Some("ib-lsp".to_string())
    );
    assert!(result.capabilities.completion_provider.is_some());
    assert!(server.state().is_initialized());
    assert!(server.state().snippet_support());
    assert_eq!(server.state().config().indent_unit, 2);
    assert!(!server.state().diagnostics().is_enabled());
}

#[tokio::test]
async fn test_completion_in_function_body() {
    let (service, _socket) = LspService::new(IbLanguageServer::new);
    let server = service.inner();
    initialize(server).await;
    open(server, "function area(w, h)\n    a\nend\n").await;

    let items = completion_items(server, 1, 5).await;

    let symbols: Vec<_> = items
        .iter()
        .filter(|i| {
            matches!(
                i.kind,
                Some(CompletionItemKind::VARIABLE) | Some(CompletionItemKind::FUNCTION)
            )
        })
        .map(|i| i.label.as_str())
        .collect();
    assert_eq!(symbols, vec!["w", "h", "area"]);

    assert_eq!(
        items[0].text_edit,
        Some(CompletionTextEdit::Edit(TextEdit {
            range: Range {
                start: Position::new(1, 4),
                end: Position::new(1, 5),
            },
            new_text: "if $0 then\n\nend".to_string(),
        }))
    );
    assert_eq!(items[0].insert_text_format, Some(InsertTextFormat::SNIPPET));
}

#[tokio::test]
async fn test_completion_follows_edits() {
    let (service, _socket) = LspService::new(IbLanguageServer::new);
    let server = service.inner();
    initialize(server).await;
    open(server, "count = 0\n").await;

    server
        .did_change(DidChangeTextDocumentParams {
            text_document: VersionedTextDocumentIdentifier::new(uri(), 2),
            content_changes: vec![TextDocumentContentChangeEvent {
                range: Some(Range {
                    start: Position::new(1, 0),
                    end: Position::new(1, 0),
                }),
                range_length: None,
                text: "output co".to_string(),
            }],
        })
        .await;

    let items = completion_items(server, 1, 9).await;
    let count = items.iter().find(|i| i.label == "count").unwrap();
    assert_eq!(count.kind, Some(CompletionItemKind::VARIABLE));
    assert_eq!(server.state().get_document(&uri()).unwrap().version, 2);
}

#[tokio::test]
async fn test_completion_for_unknown_document() {
    let (service, _socket) = LspService::new(IbLanguageServer::new);
    let server = service.inner();
    initialize(server).await;

    let response = server
        .completion(CompletionParams {
            text_document_position: position_params(0, 0),
            work_done_progress_params: Default::default(),
            partial_result_params: Default::default(),
            context: None,
        })
        .await
        .unwrap();
    assert!(response.is_none());
}

#[tokio::test]
async fn test_newline_indents_if_body() {
    let (service, _socket) = LspService::new(IbLanguageServer::new);
    let server = service.inner();
    initialize(server).await;
    open(server, "if x then\n\nend\n").await;

    let edits = server
        .on_type_formatting(DocumentOnTypeFormattingParams {
            text_document_position: position_params(1, 0),
            ch: "\n".to_string(),
            options: FormattingOptions {
                tab_size: 2,
                insert_spaces: true,
                ..Default::default()
            },
        })
        .await
        .unwrap();

    assert_eq!(
        edits,
        Some(vec![TextEdit {
            range: Range {
                start: Position::new(1, 0),
                end: Position::new(1, 0),
            },
            new_text: "  ".to_string(),
        }])
    );
}

#[tokio::test]
async fn test_close_and_shutdown() {
    let (service, _socket) = LspService::new(IbLanguageServer::new);
    let server = service.inner();
    initialize(server).await;
    open(server, "x = 1\n").await;
    assert_eq!(server.state().document_count(), 1);

    server
        .did_close(DidCloseTextDocumentParams {
            text_document: TextDocumentIdentifier::new(uri()),
        })
        .await;
    assert_eq!(server.state().document_count(), 0);

    server.shutdown().await.unwrap();
    assert!(!server.state().is_initialized());
}
