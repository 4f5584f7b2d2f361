//! Integration tests: BackendClient against a local fake backend (np-client).
//!
//! Each test starts its own tiny_http server on an ephemeral port. The
//! server records what it received so assertions can check query strings
//! and multipart bodies.

use np_client::{BackendClient, ClientError, UploadSink, submit};
use np_core::config::AppConfig;
use np_core::error::UploadError;
use np_core::geometry::SurfaceSize;
use np_core::model::InkStyle;
use np_core::sale::SaleFilter;
use np_editor::{InputEvent, SessionState, SigningSession};
use np_render::{DocumentKind, DocumentSurface};
use pretty_assertions::assert_eq;
use std::io::Read;
use std::sync::{Arc, Mutex};
use tiny_http::{Header, Response, Server};

const SALES: &str = r#"[
    {"id": 981, "CODFIL60": 1, "CODCLI60": 4521, "NCAIXA60": "3", "NUMDOC60": 77810,
     "NOME60": "MARIA DA SILVA", "VALOR60": "149.90",
     "DATEMIS60": "2024-03-07", "DATVENC60": "2024-04-07", "NOTAPROMIS": 0},
    {"id": 982, "CODFIL60": 1, "CODCLI60": 4521, "NCAIXA60": "3", "NUMDOC60": 77811,
     "NOME60": "MARIA DA SILVA", "VALOR60": 20, "NOTAPROMIS": "S"}
]"#;

/// `%PDF-1.4`
const PDF_B64: &str = "JVBERi0xLjQ=";
/// The 8-byte PNG signature.
const PNG_B64: &str = "iVBORw0KGgo=";

#[derive(Debug, Clone)]
struct Received {
    method: String,
    url: String,
    body: String,
}

struct FakeBackend {
    base: String,
    log: Arc<Mutex<Vec<Received>>>,
}

impl FakeBackend {
    fn start() -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);

        std::thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut body = Vec::new();
                let _ = request.as_reader().read_to_end(&mut body);
                let received = Received {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                };
                let response = route(&received);
                sink.lock().unwrap().push(received);
                let _ = request.respond(response);
            }
        });

        Self {
            base: format!("http://{addr}"),
            log,
        }
    }

    fn client(&self) -> BackendClient {
        let config = AppConfig {
            api_url: format!("{}/", self.base),
            branch: "1".into(),
            terminal: "3".into(),
            ..AppConfig::default()
        };
        BackendClient::new(&config).unwrap()
    }

    fn received(&self) -> Vec<Received> {
        self.log.lock().unwrap().clone()
    }
}

fn json(body: String) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_header("Content-Type: application/json".parse::<Header>().unwrap())
}

fn route(req: &Received) -> Response<std::io::Cursor<Vec<u8>>> {
    let path = req.url.split('?').next().unwrap_or_default();
    match (req.method.as_str(), path) {
        ("GET", "/conrec") if req.url.contains("documento=missing") => {
            Response::from_string("{\"detail\":\"not found\"}").with_status_code(404)
        }
        ("GET", "/conrec") if req.url.contains("qtd=1&") || req.url.ends_with("qtd=1") => {
            let first: Vec<serde_json::Value> = serde_json::from_str(SALES).unwrap();
            json(serde_json::to_string(&first[..1]).unwrap())
        }
        ("GET", "/conrec") => json(SALES.to_string()),
        ("GET", "/cadcli/") => json(r#"[{"CODCLI10": 4521, "RAZSOC10": "MARIA DA SILVA"}]"#.to_string()),
        ("POST", "/docs/nota-promissoria") => json(format!(r#"{{"base64": "{PDF_B64}"}}"#)),
        ("GET", "/docs/nota-promissoria/assinada") => json(format!(r#"{{"base64": "{PNG_B64}"}}"#)),
        ("POST", "/docs/nota-promissoria/salvar-png") if req.body.contains("reject.png") => {
            Response::from_string("disk full").with_status_code(500)
        }
        ("POST", "/docs/nota-promissoria/salvar-png") => json("{\"ok\": true}".to_string()),
        _ => Response::from_string("Not Found").with_status_code(404),
    }
}

// ─── Sales ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_sales_fills_branch_and_terminal_from_config() {
    let backend = FakeBackend::start();
    let client = backend.client();

    let filter = SaleFilter {
        customer: Some("4521".into()),
        ..SaleFilter::default()
    };
    let sales = client.list_sales(&filter).await.unwrap();
    assert_eq!(sales.len(), 2);
    assert_eq!(sales[0].signed_filename(), "1_4521_3_77810.png");
    assert!(sales[1].signed);

    let received = backend.received();
    assert_eq!(
        received[0].url,
        "/conrec?filial=1&pdv=3&codigocliente=4521&verifica_promissoria=false&qtd=10"
    );
}

#[tokio::test]
async fn not_found_means_no_sales() {
    let backend = FakeBackend::start();
    let filter = SaleFilter {
        document: Some("missing".into()),
        ..SaleFilter::default()
    };
    let sales = backend.client().list_sales(&filter).await.unwrap();
    assert!(sales.is_empty());
}

#[tokio::test]
async fn latest_sale_asks_for_one_row() {
    let backend = FakeBackend::start();
    let sale = backend.client().latest_sale().await.unwrap().unwrap();
    assert_eq!(sale.document, "77810");
    assert_eq!(sale.amount, 149.90);
    assert!(backend.received()[0].url.ends_with("qtd=1"));
}

// ─── Customers ──────────────────────────────────────────────────────────

#[tokio::test]
async fn customer_search_sends_name_and_limit() {
    let backend = FakeBackend::start();
    let customers = backend.client().search_customers("maria").await.unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].code, "4521");
    assert_eq!(backend.received()[0].url, "/cadcli/?nome=maria&limit=10");
}

#[tokio::test]
async fn blank_customer_name_never_hits_the_backend() {
    let backend = FakeBackend::start();
    let err = backend.client().search_customers("   ").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidArgument(_)));
    assert!(backend.received().is_empty());
}

// ─── Documents ──────────────────────────────────────────────────────────

#[tokio::test]
async fn generated_note_is_a_pdf_source() {
    let backend = FakeBackend::start();
    let client = backend.client();
    let sale = client.latest_sale().await.unwrap().unwrap();

    let document = client.generate_promissory(&sale).await.unwrap();
    assert_eq!(document.kind, DocumentKind::Pdf);
    assert_eq!(document.bytes, b"%PDF-1.4");

    let post = &backend.received()[1];
    assert_eq!(post.url, "/docs/nota-promissoria?base64_output=true");
    let payload: serde_json::Value = serde_json::from_str(&post.body).unwrap();
    assert_eq!(payload["numero_cupom"], "77810");
    assert_eq!(payload["codcli"], "4521");
    assert_eq!(payload["filial"], "1");
}

#[tokio::test]
async fn fetch_signed_returns_png_bytes() {
    let backend = FakeBackend::start();
    let bytes = backend.client().fetch_signed("1_4521_3_77810.png").await.unwrap();
    assert_eq!(bytes, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    assert_eq!(
        backend.received()[0].url,
        "/docs/nota-promissoria/assinada?nome_arquivo=1_4521_3_77810.png"
    );
}

#[tokio::test]
async fn unexpected_status_is_reported() {
    let backend = FakeBackend::start();
    let config = AppConfig {
        api_url: format!("{}/nowhere", backend.base),
        branch: "1".into(),
        terminal: "3".into(),
        ..AppConfig::default()
    };
    let client = BackendClient::new(&config).unwrap();
    let err = client.search_customers("maria").await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 404, .. }));
}

#[test]
fn incomplete_config_is_refused() {
    let config = AppConfig {
        api_url: "http://localhost:8000".into(),
        ..AppConfig::default()
    };
    assert!(matches!(BackendClient::new(&config), Err(ClientError::Config(_))));
}

// ─── Upload ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_posts_multipart_png() {
    let backend = FakeBackend::start();
    backend
        .client()
        .upload(b"\x89PNG-data", "1_4521_3_77810.png", "981")
        .await
        .unwrap();

    let post = &backend.received()[0];
    assert_eq!(post.url, "/docs/nota-promissoria/salvar-png");
    assert!(post.body.contains(r#"name="arquivo"; filename="1_4521_3_77810.png""#));
    assert!(post.body.contains("Content-Type: image/png"));
    assert!(post.body.contains(r#"name="vendaId""#));
    assert!(post.body.contains("981"));
}

#[tokio::test]
async fn rejected_upload_carries_status() {
    let backend = FakeBackend::start();
    let err = backend.client().upload(b"png", "reject.png", "1").await.unwrap_err();
    assert_eq!(
        err,
        UploadError::Rejected {
            status: 500,
            body: "disk full".into()
        }
    );
}

#[tokio::test]
async fn signed_session_reaches_the_backend() {
    let backend = FakeBackend::start();
    let client = backend.client();

    let surface = DocumentSurface::filled(SurfaceSize::new(120, 80), [255; 4]);
    let mut session = SigningSession::new(surface, SurfaceSize::new(60, 40), InkStyle::default()).unwrap();
    session.handle(&InputEvent::from_pointer_down(5.0, 5.0)).unwrap();
    session.handle(&InputEvent::from_pointer_move(30.0, 20.0)).unwrap();
    session.handle(&InputEvent::from_pointer_up(55.0, 35.0)).unwrap();

    submit(&mut session, &client, "1_4521_3_77810.png", "981").await.unwrap();
    assert_eq!(session.state(), SessionState::Committed);

    let received = backend.received();
    assert_eq!(received.len(), 1);
    assert!(received[0].body.contains(r#"filename="1_4521_3_77810.png""#));
}
