use std::{convert::Infallible, net::SocketAddr};

use hyper::{
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server,
};
use prometheus::{Encoder, TextEncoder};

/// Handle a single HTTP request against the metrics endpoint.
async fn handle_request(request: Request<Body>) -> Result<Response<Body>, Infallible> {
    if request.method() == Method::GET && request.uri().path() == "/metrics" {
        let metric_families = prometheus::gather();
        let body = {
            let mut buffer = Vec::new();
            let encoder = TextEncoder::new();
            encoder.encode(&metric_families, &mut buffer).unwrap();
            String::from_utf8(buffer).unwrap()
        };
        return Ok(Response::new(Body::from(body)));
    }

    Ok(Response::builder()
        .status(404)
        .body(Body::from("Not found"))
        .unwrap())
}

/// Bring up an HTTP server that serves the process's Prometheus registry on
/// `/metrics` until the process exits.
pub async fn serve_metrics(bind_addr: SocketAddr) {
    let make_service =
        make_service_fn(|_| async { Ok::<_, Infallible>(service_fn(handle_request)) });
    let server = Server::bind(&bind_addr).serve(make_service);

    log::info!("Serving Prometheus metrics on http://{bind_addr}/metrics");
    if let Err(e) = server.await {
        log::error!("Metrics server error: {e}");
    }
}
