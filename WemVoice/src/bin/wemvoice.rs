fn main() -> anyhow::Result<()> {
    wemvoice::cli::run_cli()
}
