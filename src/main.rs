use anyhow::{bail, Context};
use preffy::{AppContext, JournaledBackend, PreferenceBackend, PrefsConfig};
use tracing::info;

// preffy-dump <data_dir> <package_name> [config.json]

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the dump itself stays clean on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("usage: preffy-dump <data_dir> <package_name> [config.json]");
    }

    let config = match args.get(2) {
        Some(path) => PrefsConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => PrefsConfig::default(),
    };

    let ctx = AppContext::new(args[1].as_str(), args[0].as_str());
    let backend = JournaledBackend::open_for(&ctx, &config)
        .with_context(|| format!("opening preferences of {}", ctx.package_name()))?;

    let stats = backend.stats();
    info!(
        "{}: {} keys, ~{} bytes in memory",
        backend.namespace(),
        stats.keys,
        stats.used_memory_bytes
    );

    let mut entries: Vec<_> = backend.snapshot().into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (key, value) in entries {
        println!("{} = {} ({})", key, value, value.type_name());
    }

    Ok(())
}
