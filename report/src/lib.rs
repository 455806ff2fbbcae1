use std::time::Duration;

use reqwest::{blocking::Client, StatusCode};
use serde::Serialize;

pub mod throttle;

pub use throttle::{ReportThrottle, REPORT_INTERVAL};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/parking/update";
pub const REPORT_TIMEOUT: Duration = Duration::from_secs(1);

/// Body of a parking status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingUpdate {
    pub parking_lot_name: String,
    pub total_spots: usize,
    pub free_spots: usize,
    pub occupied_spots: usize,
}

/// Posts parking updates to the backend.
pub struct ReportClient {
    client: Client,
    endpoint: String,
}

impl ReportClient {
    pub fn new(endpoint: &str) -> anyhow::Result<ReportClient> {
        Self::with_timeout(endpoint, REPORT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> anyhow::Result<ReportClient> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(ReportClient {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts the update. Non-success statuses are errors.
    pub fn send_update(&self, update: &ParkingUpdate) -> anyhow::Result<StatusCode> {
        let response = self.client
            .post(&self.endpoint)
            .json(update)
            .send()?
            .error_for_status()?;

        Ok(response.status())
    }

    /// Sends the update and logs the outcome. Failures are dropped, the next
    /// report carries fresh counts anyway.
    pub fn report(&self, update: &ParkingUpdate) -> bool {
        match self.send_update(update) {
            Ok(status) => {
                log::info!("Data sent ({status}): {update:?}");
                true
            }
            Err(e) => {
                log::error!("Error sending data to {}: {e:#}", self.endpoint);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read, Write},
        net::{TcpListener, TcpStream},
        thread::{self, JoinHandle},
        time::Instant,
    };

    use super::*;

    fn lot_a() -> ParkingUpdate {
        ParkingUpdate {
            parking_lot_name: "Lot A".to_string(),
            total_spots: 69,
            free_spots: 12,
            occupied_spots: 57,
        }
    }

    // Reads one request, headers and body
    fn read_request(stream: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);

            if let Some(header_end) = data.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&data).into_owned()
    }

    // Answers a single request with `status_line` and hands back what was received
    fn serve_once(status_line: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!("{status_line}\r\nContent-Length: 22\r\nConnection: close\r\n\r\nParking data updated!\n");
            stream.write_all(response.as_bytes()).unwrap();
            request
        });

        (format!("http://{addr}/api/parking/update"), handle)
    }

    #[test]
    fn update_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(lot_a()).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "parkingLotName": "Lot A",
                "totalSpots": 69,
                "freeSpots": 12,
                "occupiedSpots": 57,
            })
        );
    }

    #[test]
    fn posts_json_to_endpoint() {
        let (endpoint, server) = serve_once("HTTP/1.1 200 OK");
        let client = ReportClient::new(&endpoint).unwrap();

        let status = client.send_update(&lot_a()).unwrap();
        assert_eq!(status, StatusCode::OK);

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/parking/update "), "{request}");
        assert!(request.to_lowercase().contains("content-type: application/json"), "{request}");

        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let body: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(body, serde_json::to_value(lot_a()).unwrap());
    }

    #[test]
    fn server_error_is_a_failure() {
        let (endpoint, server) = serve_once("HTTP/1.1 500 Internal Server Error");
        let client = ReportClient::new(&endpoint).unwrap();

        assert!(client.send_update(&lot_a()).is_err());
        server.join().unwrap();
    }

    #[test]
    fn unreachable_endpoint_is_logged_not_raised() {
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let client = ReportClient::new(&format!("http://{addr}/api/parking/update")).unwrap();

        assert!(!client.report(&lot_a()));
    }

    #[test]
    fn slow_endpoint_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(3));
            drop(stream);
        });

        let client = ReportClient::with_timeout(&format!("http://{addr}/"), Duration::from_millis(300)).unwrap();
        let started = Instant::now();
        assert!(client.send_update(&lot_a()).is_err());
        assert!(started.elapsed() < Duration::from_secs(2));
        server.join().unwrap();
    }
}
