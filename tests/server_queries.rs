//! Server queries: MOTD, LUSERS, VERSION, WHO, WHOIS, PING, MODE.

mod common;

use common::{TestClient, TestServer};

#[tokio::test]
async fn motd_file_is_served_line_by_line() {
    use std::io::Write;
    let mut motd = tempfile::NamedTempFile::new().unwrap();
    writeln!(motd, "welcome to the test net").unwrap();
    writeln!(motd, "second line").unwrap();

    let extra = format!("motd_path = '{}'", motd.path().display());
    let server = TestServer::spawn_with(16731, &extra).await.expect("spawn");

    let mut alice = TestClient::connect(&server.address(), "alice")
        .await
        .expect("connect");
    alice.register().await.expect("register");

    alice.send_raw("MOTD").await.unwrap();
    let lines = alice.recv_until(|l| l.contains(" 376 ")).await.expect("376");
    let start = lines
        .iter()
        .position(|l| l == ":srv 375 alice :- srv Message of the day -")
        .expect("375");
    assert_eq!(lines[start + 1], ":srv 372 alice :- welcome to the test net");
    assert_eq!(lines[start + 2], ":srv 372 alice :- second line");
    assert_eq!(lines[start + 3], ":srv 376 alice :End of MOTD command");
}

#[tokio::test]
async fn lusers_reports_counts() {
    let server = TestServer::spawn(16732).await.expect("spawn");
    let mut alice = TestClient::connect(&server.address(), "alice")
        .await
        .expect("connect");
    alice.register().await.expect("register");

    alice.send_raw("LUSERS").await.unwrap();
    let lines = alice.recv_until(|l| l.contains(" 255 ")).await.expect("255");
    assert!(lines
        .iter()
        .any(|l| l == ":srv 251 alice :There are 1 users and 0 services on 1 servers"));
    assert!(lines.iter().any(|l| l == ":srv 254 alice 1 :channels formed"));
    assert!(lines
        .iter()
        .any(|l| l == ":srv 255 alice :I have 1 clients and 1 servers"));
}

#[tokio::test]
async fn version_reports_the_build() {
    let server = TestServer::spawn(16733).await.expect("spawn");
    let mut alice = TestClient::connect(&server.address(), "alice")
        .await
        .expect("connect");
    alice.register().await.expect("register");

    alice.send_raw("VERSION").await.unwrap();
    let lines = alice.recv_until(|l| l.contains(" 351 ")).await.expect("351");
    assert_eq!(
        lines.last().unwrap(),
        ":srv 351 alice ircd v0.1.0 srv :minimal IRC daemon"
    );
}

#[tokio::test]
async fn who_and_whois_describe_a_user() {
    let server = TestServer::spawn(16734).await.expect("spawn");
    let mut alice = TestClient::connect(&server.address(), "alice")
        .await
        .expect("connect");
    alice.register().await.expect("register");

    alice.send_raw("WHO #circuits").await.unwrap();
    let lines = alice.recv_until(|l| l.contains(" 315 ")).await.expect("315");
    assert!(lines
        .iter()
        .any(|l| l == ":srv 352 alice #circuits alice 127.0.0.1 srv alice H :0 alice test"));

    alice.send_raw("WHOIS alice").await.unwrap();
    let lines = alice.recv_until(|l| l.contains(" 318 ")).await.expect("318");
    assert!(lines
        .iter()
        .any(|l| l == ":srv 311 alice alice alice 127.0.0.1 * :alice test"));
    assert!(lines.iter().any(|l| l.starts_with(":srv 319 alice alice :@#circuits")));
}

#[tokio::test]
async fn ping_pong() {
    let server = TestServer::spawn(16735).await.expect("spawn");
    let mut alice = TestClient::connect(&server.address(), "alice")
        .await
        .expect("connect");
    alice.register().await.expect("register");

    alice.send_raw("PING :are-you-there").await.unwrap();
    let lines = alice
        .recv_until(|l| l.contains("PONG"))
        .await
        .expect("pong");
    assert_eq!(lines.last().unwrap(), ":srv PONG are-you-there");
}

#[tokio::test]
async fn user_mode_roundtrip() {
    let server = TestServer::spawn(16736).await.expect("spawn");
    let mut alice = TestClient::connect(&server.address(), "alice")
        .await
        .expect("connect");
    alice.register().await.expect("register");

    alice.send_raw("MODE alice +i").await.unwrap();
    let lines = alice
        .recv_until(|l| l.contains("MODE alice"))
        .await
        .expect("confirmation");
    assert_eq!(lines.last().unwrap(), ":alice MODE alice +i");

    alice.send_raw("MODE alice").await.unwrap();
    let lines = alice.recv_until(|l| l.contains(" 221 ")).await.expect("221");
    assert_eq!(lines.last().unwrap(), ":srv 221 alice +i");
}
