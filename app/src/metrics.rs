use hyper::{
    header::{HeaderValue, CONTENT_TYPE},
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec_with_registry, Encoder, IntCounterVec, Registry, TextEncoder,
};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;

lazy_static! {
    pub static ref APX_REGISTRY: Registry =
        Registry::new_custom(Some("apx".to_string()), None).unwrap();
}

// Register metrics with the `apx` registry
lazy_static! {
    pub static ref DEMO_EVENTS_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
        "demo_events_total",
        "Demo analytics events recorded while demo mode is active",
        &["event"],
        APX_REGISTRY
    )
    .unwrap();
    pub static ref WALLET_TRANSACTIONS_TOTAL: IntCounterVec =
        register_int_counter_vec_with_registry!(
            "wallet_transactions_total",
            "Simulated wallet transactions by outcome",
            &["status"],
            APX_REGISTRY
        )
        .unwrap();
    pub static ref CONSENSUS_VOTES_TOTAL: IntCounterVec = register_int_counter_vec_with_registry!(
        "consensus_votes_total",
        "Simulated verifier votes cast by the consensus animation",
        &["vote"],
        APX_REGISTRY
    )
    .unwrap();
    pub static ref GENERATED_CLAIMS_TOTAL: IntCounterVec =
        register_int_counter_vec_with_registry!(
            "generated_claims_total",
            "Mock claims placed in a session dataset",
            &["status"],
            APX_REGISTRY
        )
        .unwrap();
    pub static ref CONSENSUS_SETTLED_TOTAL: IntCounterVec =
        register_int_counter_vec_with_registry!(
            "consensus_settled_total",
            "Consensus rounds that reached a terminal outcome",
            &["outcome"],
            APX_REGISTRY
        )
        .unwrap();
}

fn text_response(status: StatusCode, content_type: &'static str, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

async fn handle_request(req: Request<Body>) -> Result<Response<Body>, Infallible> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => {
            // Gather the metrics from both the `apx` registry and the default registry
            let mut metric_families = APX_REGISTRY.gather();
            metric_families.extend(prometheus::gather());

            let encoder = TextEncoder::new();
            let mut buffer = Vec::new();
            if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
                tracing::error!("Failed to encode metrics: {err}");
                return Ok(text_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "text/plain",
                    Body::empty(),
                ));
            }

            Ok(text_response(
                StatusCode::OK,
                "text/plain; version=0.0.4",
                Body::from(buffer),
            ))
        }
        (&Method::GET, "/health") => {
            let health_status = json!({
                "status": "healthy",
                "timestamp": std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs(),
                "version": env!("CARGO_PKG_VERSION"),
                "metrics_count": APX_REGISTRY.gather().len()
            });

            Ok(text_response(
                StatusCode::OK,
                "application/json",
                Body::from(health_status.to_string()),
            ))
        }
        _ => Ok(text_response(
            StatusCode::NOT_FOUND,
            "text/plain",
            Body::from("Not Found"),
        )),
    }
}

pub async fn start_server(port_number: Option<u16>) {
    const DEFAULT_PORT: u16 = 9001;

    let port = port_number.unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let make_svc =
        make_service_fn(|_conn| async { Ok::<_, Infallible>(service_fn(handle_request)) });

    let server = match Server::try_bind(&addr) {
        Ok(builder) => builder.serve(make_svc),
        Err(err) => {
            tracing::error!("Failed to bind metrics server on {addr}: {err}");
            return;
        }
    };

    tokio::spawn(async move {
        tracing::info!("Starting metrics server on {}", addr);

        if let Err(e) = server.await {
            tracing::error!("Metrics server error: {}", e);
        }
    });
}
