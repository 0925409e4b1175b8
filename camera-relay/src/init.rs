//! Tracing setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber for the relay binary
///
/// Each request gets a `tower_http` span and each camera command logs its
/// arguments and exit code under `camera_relay`; both default to `info`.
/// `RUST_LOG` adds further directives (e.g. `camera_relay=debug` to see
/// rewritten `--filename` values).
///
/// `LOG_FORMAT=json` switches to one JSON object per line for the camera
/// host's container log collector. Output always goes to stderr so it never
/// mixes with anything a supervisor captures from stdout.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("camera_relay=info".parse()?)
        .add_directive("tower_http=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if json_format(std::env::var("LOG_FORMAT").ok().as_deref()) {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer.with_ansi(false)).init();
    }

    Ok(())
}

fn json_format(log_format: Option<&str>) -> bool {
    log_format.is_some_and(|v| v.trim().eq_ignore_ascii_case("json"))
}
