use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, StatusCode, Uri, header};
use http_body_util::Empty;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("htguard/", env!("APP_VERSION"));

/// Checks whether a logo URL currently serves something
#[async_trait]
pub trait LogoProbe: Send + Sync {
    async fn is_reachable(&self, url: &Uri) -> bool;
}

/// Probe issuing `HEAD` (then `GET` on 405) with a bounded wait
#[derive(Clone)]
pub struct HttpLogoProbe {
    client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    timeout: Duration,
}

impl HttpLogoProbe {
    pub fn new(timeout: Duration) -> Self {
        let builder = match HttpsConnectorBuilder::new().with_native_roots() {
            Ok(builder) => builder,
            Err(err) => {
                warn!(%err, "no native root certificates, using bundled roots");
                HttpsConnectorBuilder::new().with_webpki_roots()
            }
        };
        let connector = builder.https_or_http().enable_http1().build();
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client, timeout }
    }

    async fn status(&self, method: Method, url: &Uri) -> Option<StatusCode> {
        let request = Request::builder()
            .method(method)
            .uri(url.clone())
            .header(header::USER_AGENT, USER_AGENT)
            .body(Empty::new())
            .ok()?;
        match tokio::time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Some(response.status()),
            Ok(Err(err)) => {
                debug!(%err, %url, "logo probe failed");
                None
            }
            Err(_) => {
                debug!(%url, timeout = ?self.timeout, "logo probe timed out");
                None
            }
        }
    }
}

#[async_trait]
impl LogoProbe for HttpLogoProbe {
    async fn is_reachable(&self, url: &Uri) -> bool {
        match self.status(Method::HEAD, url).await {
            Some(StatusCode::METHOD_NOT_ALLOWED) => self
                .status(Method::GET, url)
                .await
                .is_some_and(|status| status.is_success()),
            Some(status) => status.is_success(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = HttpLogoProbe::new(Duration::from_secs(2));
        let url: Uri = format!("http://{addr}/logo.png").parse().unwrap();
        assert!(!probe.is_reachable(&url).await);
    }

    #[tokio::test]
    async fn local_server_status_decides() {
        use axum::{Router, http::StatusCode as AxumStatus, routing::get};

        let app = Router::new()
            .route("/logo.png", get(|| async { "png" }))
            .route("/gone.png", get(|| async { AxumStatus::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let probe = HttpLogoProbe::new(Duration::from_secs(2));
        let ok: Uri = format!("http://{addr}/logo.png").parse().unwrap();
        let gone: Uri = format!("http://{addr}/gone.png").parse().unwrap();
        assert!(probe.is_reachable(&ok).await);
        assert!(!probe.is_reachable(&gone).await);
    }
}
