#![allow(dead_code)]

use std::io::Read;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use once_cell::sync::Lazy;
use restgen::restclient::{self, FromResponse, RestClient};
use serde::Deserialize;

/// What the echo server saw
#[derive(Debug, Deserialize)]
pub struct Echo {
    pub method: String,
    pub url: String,
    pub body: String,
    pub accept: Option<String>,
    pub content_type: Option<String>,
}

impl FromResponse for Echo {
    fn from_response(body: &mut dyn Read) -> restclient::Result<Self> {
        restclient::decode_json(body)
    }
}

/// Base URL of a server that answers every request with an [`Echo`] of it,
/// except under `/broken`, which answers with text that is not JSON.
pub static SERVER: Lazy<String> = Lazy::new(|| {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).unwrap();

            let header = |name: &'static str| {
                request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv(name))
                    .map(|h| h.value.as_str().to_string())
            };

            let payload = if request.url().starts_with("/broken") {
                "this is not json".to_string()
            } else {
                serde_json::json!({
                    "method": request.method().to_string(),
                    "url": request.url(),
                    "body": body,
                    "accept": header("Accept"),
                    "content_type": header("Content-Type"),
                })
                .to_string()
            };

            let response = tiny_http::Response::from_string(payload).with_header(
                tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                    .unwrap(),
            );
            request.respond(response).unwrap();
        }
    });

    format!("http://{addr}")
});

/// Register a client for the echo server.
pub fn register() {
    restclient::register_client(RestClient::with_base_url(SERVER.as_str()).unwrap());
}

/// Base URL on which nothing listens.
pub fn closed_port() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Callback events, in the order they were delivered
#[derive(Debug)]
pub enum Event {
    Start,
    Error(String),
    Success(Echo),
}

/// Forwards callback events to a channel. Test files implement their
/// generated callback traits for it.
pub struct Recorder(pub mpsc::Sender<Event>);

impl Recorder {
    pub fn channel() -> (Box<Recorder>, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel();
        (Box::new(Recorder(tx)), rx)
    }

    pub fn send(&self, event: Event) {
        self.0.send(event).unwrap();
    }
}

/// The one terminal event of an async run.
///
/// `on_start` must already have fired when `run_async` returned, and the
/// callback must be dropped after a single terminal event.
pub fn single_outcome(rx: &mpsc::Receiver<Event>) -> Event {
    assert!(matches!(rx.try_recv(), Ok(Event::Start)));
    let outcome = rx
        .recv_timeout(Duration::from_secs(10))
        .expect("a terminal callback");
    assert!(!matches!(outcome, Event::Start));
    assert!(matches!(
        rx.recv_timeout(Duration::from_secs(10)),
        Err(RecvTimeoutError::Disconnected)
    ));
    outcome
}
