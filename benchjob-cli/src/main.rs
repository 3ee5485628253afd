fn main() -> anyhow::Result<()> {
    benchjob_cli::run()
}
