//! Shared HTTP client configuration.

use std::time::Duration;

/// `User-Agent` sent with every request. GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("art-keeper/", env!("CARGO_PKG_VERSION"));

/// Build a `ureq` agent for the given per-phase `timeout`.
///
/// Resolving, connecting, sending the request and awaiting the response
/// head are each bounded by `timeout`. Reading the body is not, so large
/// assets download at whatever pace the link allows.
#[must_use]
pub fn build_agent(timeout: Duration) -> ureq::Agent {
    let phase = Some(timeout);
    let config = ureq::Agent::config_builder()
        .timeout_resolve(phase)
        .timeout_connect(phase)
        .timeout_send_request(phase)
        .timeout_recv_response(phase)
        .build();
    ureq::Agent::new_with_config(config)
}

#[cfg(test)]
pub(crate) mod test_server {
    //! One-shot HTTP server for exercising the real clients.

    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    /// Serve a single canned response on a loopback port.
    ///
    /// Returns the base URL and a handle yielding the raw request head.
    pub(crate) fn serve_once(status: &'static str, body: Vec<u8>) -> (String, JoinHandle<String>) {
        serve_paced(status, body, Duration::ZERO, Duration::ZERO)
    }

    /// Like [`serve_once`], pausing before the response head and again
    /// before the body.
    ///
    /// The exchange ends quietly if the client hangs up first.
    pub(crate) fn serve_paced(
        status: &'static str,
        body: Vec<u8>,
        before_head: Duration,
        before_body: Duration,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut request = Vec::new();
            let mut chunk = [0_u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = stream.read(&mut chunk).expect("read request");
                if read == 0 {
                    break;
                }
                request.extend(chunk.iter().take(read));
            }
            let received = String::from_utf8_lossy(&request).into_owned();
            thread::sleep(before_head);
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let sent = stream
                .write_all(head.as_bytes())
                .and_then(|()| stream.flush())
                .and_then(|()| {
                    thread::sleep(before_body);
                    stream.write_all(&body)
                });
            if let Err(e) = sent {
                log::debug!("client hung up before the response was sent: {e}");
            }
            received
        });
        (format!("http://{addr}"), handle)
    }

    /// Return a loopback URL on which nothing listens.
    pub(crate) fn refused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);
        format!("http://{addr}")
    }
}
