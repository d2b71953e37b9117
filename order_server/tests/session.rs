//! Order-book server sessions exercised with a plain `tungstenite` client.
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use order_server::{OrderBookServer, ServerHandle};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

type Client = WebSocket<MaybeTlsStream<TcpStream>>;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

fn start_server(broadcast: Duration) -> ServerHandle {
    OrderBookServer::bind("127.0.0.1:0")
        .unwrap()
        .with_broadcast_interval(broadcast)
        .start()
        .unwrap()
}

fn connect(server: &ServerHandle) -> Client {
    let url = format!("ws://{}", server.local_addr());
    let (client, _) = tungstenite::connect(url).unwrap();
    if let MaybeTlsStream::Plain(stream) = client.get_ref() {
        stream.set_read_timeout(Some(READ_TIMEOUT)).unwrap();
    }
    client
}

fn next_text(client: &mut Client) -> String {
    loop {
        match client.read().unwrap() {
            Message::Text(text) => return text.as_str().to_owned(),
            _ => continue,
        }
    }
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

#[test]
fn answers_order_requests() {
    let server = start_server(Duration::from_secs(60));
    let mut client = connect(&server);

    client
        .send(Message::text(
            r#"{"method":"place","params":{"order_id":"ETH-123456","amount":2,"price":1000}}"#,
        ))
        .unwrap();
    assert_eq!(next_text(&mut client), r#"{"status":"order placed"}"#);

    client
        .send(Message::text(r#"{"method":"orderbook","params":{"symbol":"ETH-PERPETUAL"}}"#))
        .unwrap();
    assert_eq!(
        next_text(&mut client),
        r#"{"symbol":"ETH-PERPETUAL","bids":{"price":5000,"amount":1},"asks":{"price":5100,"amount":1}}"#
    );

    client
        .send(Message::text(r#"{"method":"currpos","params":{"currency":"ETH"}}"#))
        .unwrap();
    assert_eq!(
        next_text(&mut client),
        r#"{"currency":"ETH","positions":{"type":"future","amount":10}}"#
    );

    server.join().unwrap();
}

#[test]
fn malformed_request_keeps_session_alive() {
    let server = start_server(Duration::from_secs(60));
    let mut client = connect(&server);

    client.send(Message::text("definitely not json")).unwrap();
    client
        .send(Message::text(r#"{"method":"cancel","params":{"order_id":"ETH-1"}}"#))
        .unwrap();
    assert_eq!(next_text(&mut client), r#"{"status":"order cancelled"}"#);

    assert_eq!(
        server.received_frames().unwrap(),
        [
            "definitely not json",
            r#"{"method":"cancel","params":{"order_id":"ETH-1"}}"#
        ]
    );
    server.join().unwrap();
}

#[test]
fn subscriber_receives_snapshots() {
    let server = start_server(Duration::from_millis(50));
    let mut client = connect(&server);

    client
        .send(Message::text(r#"{"method":"subscribe","params":{"symbol":"BTC-PERPETUAL"}}"#))
        .unwrap();

    let expected =
        r#"{"symbol":"BTC-PERPETUAL","bids":{"price":5000,"amount":1},"asks":{"price":5100,"amount":1}}"#;
    assert_eq!(next_text(&mut client), expected);
    assert_eq!(next_text(&mut client), expected);
    assert_eq!(server.subscriber_count("BTC-PERPETUAL").unwrap(), 1);

    server.join().unwrap();
}

#[test]
fn closing_client_drops_subscription() {
    let server = start_server(Duration::from_millis(50));
    let mut client = connect(&server);

    client
        .send(Message::text(r#"{"method":"subscribe","params":{"symbol":"BTC-PERPETUAL"}}"#))
        .unwrap();
    assert!(wait_until(Duration::from_secs(2), || {
        server.subscriber_count("BTC-PERPETUAL").unwrap() == 1
    }));

    client.close(None).unwrap();
    while client.read().is_ok() {}

    assert!(wait_until(Duration::from_secs(2), || {
        server.subscriber_count("BTC-PERPETUAL").unwrap() == 0
            && server.session_count().unwrap() == 0
    }));
    server.join().unwrap();
}

#[test]
fn shutdown_closes_connected_clients() {
    let server = start_server(Duration::from_secs(60));
    let mut client = connect(&server);
    assert!(wait_until(Duration::from_secs(2), || {
        server.session_count().unwrap() == 1
    }));

    let reader = thread::spawn(move || {
        let mut saw_close = false;
        loop {
            match client.read() {
                Ok(Message::Close(_)) => saw_close = true,
                Ok(_) => {}
                Err(_) => return saw_close,
            }
        }
    });

    server.join().unwrap();
    assert!(reader.join().unwrap());
}
