use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

fn main() -> Result<(), amplify_server::Error> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    amplify_server::run(true)
}
