use std::future::Future;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::router;
use crate::sink::{LogstashSink, PrintSink};

pub async fn serve<F>(config: Config, listener: TcpListener, shutdown: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = if config.print_sink {
        router::router(PrintSink {})
    } else {
        tracing::info!("forwarding push events to {}", config.logstash_endpoint);
        let sink = LogstashSink::new(config.logstash_endpoint)
            .expect("failed to create logstash sink");
        router::router(sink)
    };

    tracing::info!("listening on {:?}", listener.local_addr().unwrap());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .unwrap()
}
