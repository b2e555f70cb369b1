use std::env;
use std::sync::Arc;

use termgate::core::config::Config;
use termgate::core::Pipeline;
use termgate::error::AppError;
use termgate::flags::Flags;
use termgate::repl::Repl;
use termgate::server::Server;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), AppError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(());
    }

    if flags.is_set("version") {
        println!("termgate {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(&flags);

    let config = Config::from_flags(&flags)?;
    for (name, _) in config.exports() {
        tracing::debug!(name = %name, "exported from rc file");
    }
    let settings = config.into_settings();
    tracing::info!(
        workdir = %settings.workdir.display(),
        timeout = ?settings.timeout,
        shell = %settings.shell.display(),
        "termgate starting"
    );

    let pipeline = Pipeline::new(&settings);

    if flags.is_set("repl") {
        return Repl::new(pipeline)?.run();
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let server = Server::bind(&settings.bind_addr(), Arc::new(pipeline)).await?;
        server.run().await
    })
}

fn init_logging(flags: &Flags) {
    let default = if flags.is_set("debug") {
        "termgate=debug"
    } else if flags.is_set("quiet") {
        "termgate=warn"
    } else {
        "termgate=info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
