use std::time::Duration;

use reqwest::redirect::Policy;

use super::validate_url;

const MAX_REDIRECTS: usize = 5;

/// Shared client for feed and article downloads.
///
/// Per-request timeouts are applied by the callers; `timeout` here is only
/// the outer bound for anything that slips past them. Redirect targets go
/// through [`validate_url`] unless `allow_private_hosts` is set.
pub fn build_http_client(
    timeout: Duration,
    allow_private_hosts: bool,
) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(redirect_policy(allow_private_hosts))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .timeout(timeout)
        .build()
}

fn redirect_policy(allow_private_hosts: bool) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error(format!("Too many redirects (max {})", MAX_REDIRECTS));
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        if !allow_private_hosts {
            if let Err(e) = validate_url(url.as_str()) {
                tracing::warn!(to = %url, error = %e, "Refusing redirect");
                let msg = format!("Redirect to {} refused: {}", url, e);
                return attempt.error(msg);
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_follows_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", format!("{}/new", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let client = build_http_client(Duration::from_secs(5), true).unwrap();
        let response = client.get(format!("{}/old", server.uri())).send().await.unwrap();
        assert_eq!(response.text().await.unwrap(), "moved");
    }

    #[tokio::test]
    async fn test_redirect_loop_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("{}/loop", server.uri())),
            )
            .mount(&server)
            .await;

        let client = build_http_client(Duration::from_secs(5), true).unwrap();
        let result = client.get(format!("{}/loop", server.uri())).send().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_redirect_to_private_host_refused() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/to-loopback"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("{}/new", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/to-internal"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", "http://10.0.0.1/admin"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("internal"))
            .expect(0)
            .mount(&server)
            .await;

        let client = build_http_client(Duration::from_secs(5), false).unwrap();
        for hop in ["/to-loopback", "/to-internal"] {
            let result = client.get(format!("{}{}", server.uri(), hop)).send().await;
            let err = result.expect_err(hop);
            assert!(err.is_redirect(), "{}: {}", hop, err);
        }
    }
}
