fn main() -> anyhow::Result<()> {
    rgsstext::cli::run_cli()
}
