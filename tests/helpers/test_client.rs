// Thin HTTP client wrapper for driving the two payment endpoints in tests.

use awc::Client;
use serde::Serialize;

pub struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::default(),
            base_url,
        }
    }

    pub fn get(&self, path: &str) -> awc::ClientRequest {
        self.client.get(format!("{}{}", self.base_url, path))
    }

    pub fn post(&self, path: &str) -> awc::ClientRequest {
        self.client.post(format!("{}{}", self.base_url, path))
    }

    pub async fn get_request(&self, path: &str) -> awc::ClientResponse {
        self.get(path).send().await.expect("failed to send GET request")
    }

    /// POST with a JSON body and the idempotency header the payment
    /// endpoint requires.
    pub async fn post_payment<T: Serialize>(&self, path: &str, idempotency_key: &str, body: &T) -> awc::ClientResponse {
        self.post(path)
            .insert_header(("X-Idempotency-Key", idempotency_key))
            .send_json(body)
            .await
            .expect("failed to send POST request")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_stores_base_url() {
        let client = TestClient::new("http://localhost:8081".to_string());
        assert_eq!(client.base_url, "http://localhost:8081");
    }
}
