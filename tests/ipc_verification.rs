use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use plugin_scout::api::dto::ReportDto;
use plugin_scout::api::server::ApiServer;
use plugin_scout::infrastructure::build_introspector;
use plugin_scout::infrastructure::config::ScoutConfig;

fn send(stream: &mut TcpStream, reader: &mut BufReader<TcpStream>, request: &str) -> serde_json::Value {
    stream.write_all(request.as_bytes()).unwrap();
    stream.write_all(b"\n").unwrap();
    let mut response = String::new();
    reader.read_line(&mut response).unwrap();
    serde_json::from_str(&response).expect("Response must be one JSON line")
}

#[test]
fn test_ipc_server_lifecycle() {
    // 1. Start server on an ephemeral port
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let introspector = build_introspector(&ScoutConfig::default()).unwrap();
    let server = thread::spawn(move || ApiServer::new(introspector).serve(listener));

    // 2. Connect client
    let mut stream = TcpStream::connect(addr).expect("Failed to connect to server");
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    // 3. PING
    let response = send(&mut stream, &mut reader, r#"{"command": "PING"}"#);
    assert_eq!(response["status"], "success");
    assert_eq!(response["data"], "PONG");

    // 4. INTROSPECT a fixture
    let path = std::fs::canonicalize("tests/fixtures/plugins/logger.js").unwrap();
    let request = serde_json::json!({ "command": "INTROSPECT", "params": { "path": path } });
    let response = send(&mut stream, &mut reader, &request.to_string());
    assert_eq!(response["status"], "success");
    let dto: ReportDto = serde_json::from_value(response["data"].clone()).unwrap();
    let names: Vec<&str> = dto.capabilities.as_ref().unwrap().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["noop", "log", "level", "flush"]);
    assert!(dto.issues.is_empty(), "Unexpected issues: {:?}", dto.issues);

    // 5. Missing file is a report with issues, not a protocol error
    let response = send(&mut stream, &mut reader, r#"{"command": "INTROSPECT", "params": {"path": "/invalid/path/p.js"}}"#);
    assert_eq!(response["status"], "success");
    assert_eq!(response["data"]["issues"][0]["stage"], "read");

    // 6. Protocol errors
    let response = send(&mut stream, &mut reader, r#"{"command": "ANALYZE"}"#);
    assert_eq!(response["status"], "error");
    assert!(response["message"].as_str().unwrap().contains("Unknown command"));

    let response = send(&mut stream, &mut reader, "{not json");
    assert_eq!(response["status"], "error");

    // 7. SHUTDOWN stops the accept loop without exiting the process
    let response = send(&mut stream, &mut reader, r#"{"command": "SHUTDOWN"}"#);
    assert_eq!(response["status"], "success");
    server.join().unwrap().expect("Server should stop cleanly");
}

#[test]
fn test_concurrent_clients() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let introspector = build_introspector(&ScoutConfig::default()).unwrap();
    let server = thread::spawn(move || ApiServer::new(introspector).serve(listener));

    let clients: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(move || {
                let mut stream = TcpStream::connect(addr).unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                send(&mut stream, &mut reader, r#"{"command": "PING"}"#)
            })
        })
        .collect();
    for client in clients {
        assert_eq!(client.join().unwrap()["data"], "PONG");
    }

    let mut stream = TcpStream::connect(addr).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    send(&mut stream, &mut reader, r#"{"command": "SHUTDOWN"}"#);
    server.join().unwrap().unwrap();
}
