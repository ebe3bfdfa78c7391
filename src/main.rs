use clap::Parser;
use critique::cli::select::{self, SelectArgs};
use critique::report::Reporter;

#[derive(Parser)]
#[command(name = "critique")]
#[command(author = "Chris Cheng <chris.cheng@shopee.com>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Select critics to run based on file changes", long_about = None)]
struct Cli {
    #[command(flatten)]
    select: SelectArgs,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    critique::logging::init_logging(cli.verbose);

    if let Err(e) = select::run(&cli.select) {
        let hint = select::fix_hint(&e);
        let _ = Reporter::stderr().error(&e, hint.as_deref());
        std::process::exit(1);
    }
}
