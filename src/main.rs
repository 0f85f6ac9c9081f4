use clap::Parser;
use clap::Subcommand;
use git_testament::git_testament;
use git_testament::render_testament;

use rnaqc::qc::command;

git_testament!(TESTAMENT);

#[derive(Subcommand)]
enum Subcommands {
    /// Computes the quality control metrics of one sample.
    Sample(command::SampleArgs),

    /// Combines per-sample quality control files into one report.
    Aggregate(command::AggregateArgs),

    /// Computes the metrics of every sample in a sample sheet and combines them
    /// into one report.
    Batch(command::BatchArgs),

    /// Reports the fraction of unresolvable base calls at each read position.
    Profile(command::ProfileArgs),
}

#[derive(Parser)]
#[command(author, version = render_testament!(TESTAMENT), propagate_version = true, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    subcommand: Subcommands,

    /// Only errors are printed to the stderr stream.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// All available information, including debug information, is printed to
    /// stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut level = tracing::Level::INFO;
    if cli.quiet {
        level = tracing::Level::ERROR;
    } else if cli.verbose {
        level = tracing::Level::DEBUG;
    }

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    match cli.subcommand {
        Subcommands::Sample(args) => command::sample(args)?,
        Subcommands::Aggregate(args) => command::aggregate(args)?,
        Subcommands::Batch(args) => command::batch(args)?,
        Subcommands::Profile(args) => command::profile(args)?,
    }

    Ok(())
}
